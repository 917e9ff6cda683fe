//! Step extraction.
//!
//! The extractor walks the current topology and the target plan section by
//! section and classifies every difference as a supported step (the update
//! workflow can apply it node by node) or an unsupported one (it needs a full
//! redeploy). Supported steps are returned in execution order.

use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::topology::{
    ExtractorSettings, Node, OperationMap, Relationship, Topology, TopologyValidator, WorkflowDef,
};

use super::differ::{KeyChange, diff_keyed, diff_maps, diff_optional};
use super::entity_id::{EntityIdBuilder, index_segment};
use super::ordering::rank_added_nodes;
use super::relationships::{RelationshipMatch, match_relationships};
use super::sorter::sort_steps;
use super::step::{DeploymentUpdateStep, EntityType, StepAction};

/// Steps extracted from one pair of topologies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedSteps {
    /// Supported steps, in execution order.
    pub steps: Vec<DeploymentUpdateStep>,
    /// Steps the update workflow cannot apply, in extraction order.
    pub unsupported: Vec<DeploymentUpdateStep>,
}

/// Extracts update steps between a current topology and a target plan.
#[derive(Debug)]
pub struct StepExtractor<'a> {
    current: &'a Topology,
    target: &'a Topology,
    settings: ExtractorSettings,
    supported: Vec<DeploymentUpdateStep>,
    unsupported: Vec<DeploymentUpdateStep>,
}

/// Extracts `(ordered supported steps, unsupported steps)` with default
/// settings.
///
/// # Errors
///
/// Returns an error if either input is malformed or the added nodes form a
/// relationship cycle.
pub fn extract_steps(
    current: &Topology,
    target: &Topology,
) -> Result<(Vec<DeploymentUpdateStep>, Vec<DeploymentUpdateStep>)> {
    let extracted = StepExtractor::new(current, target).extract()?;
    Ok((extracted.steps, extracted.unsupported))
}

impl<'a> StepExtractor<'a> {
    /// Creates an extractor with default settings.
    #[must_use]
    pub fn new(current: &'a Topology, target: &'a Topology) -> Self {
        Self {
            current,
            target,
            settings: ExtractorSettings::default(),
            supported: Vec::new(),
            unsupported: Vec::new(),
        }
    }

    /// Replaces the extractor settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ExtractorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Runs the extraction.
    ///
    /// # Errors
    ///
    /// Returns an error if either input is malformed or the added nodes form a
    /// relationship cycle. No partial result is returned.
    pub fn extract(mut self) -> Result<ExtractedSteps> {
        let validator = TopologyValidator::new();
        validator.validate(self.current, "current")?;
        validator.validate(self.target, "target")?;

        let mut ids = EntityIdBuilder::new();
        self.extract_description(&ids);
        self.extract_outputs(&mut ids);
        self.extract_workflows(&mut ids);
        self.extract_nodes(&mut ids)?;
        self.extract_policy_types(&mut ids);
        self.extract_policy_triggers(&mut ids);
        self.extract_groups(&mut ids);

        sort_steps(&mut self.supported);

        info!(
            "Extracted {} supported and {} unsupported update steps",
            self.supported.len(),
            self.unsupported.len()
        );
        Ok(ExtractedSteps {
            steps: self.supported,
            unsupported: self.unsupported,
        })
    }

    fn record(&mut self, step: DeploymentUpdateStep) {
        debug!("Step: {step}");
        if step.is_supported() {
            self.supported.push(step);
        } else {
            self.unsupported.push(step);
        }
    }

    /// Records one step per changed key under the current scope.
    fn record_changes<K: AsRef<str>>(
        &mut self,
        ids: &EntityIdBuilder,
        changes: Vec<KeyChange<K>>,
        entity_type: EntityType,
        supported: bool,
    ) {
        for change in changes {
            let step =
                DeploymentUpdateStep::new(change.action, entity_type, ids.child_path(change.key.as_ref()));
            self.record(if supported { step } else { step.unsupported() });
        }
    }

    fn extract_description(&mut self, ids: &EntityIdBuilder) {
        if let Some(action) =
            diff_optional(self.current.description.as_ref(), self.target.description.as_ref())
        {
            self.record(DeploymentUpdateStep::new(
                action,
                EntityType::Description,
                ids.child_path("description"),
            ));
        }
    }

    fn extract_outputs(&mut self, ids: &mut EntityIdBuilder) {
        let (current, target) = (self.current, self.target);
        let ids = ids.extend("outputs");
        self.record_changes(&ids, diff_maps(&current.outputs, &target.outputs), EntityType::Output, true);
    }

    fn extract_workflows(&mut self, ids: &mut EntityIdBuilder) {
        let (current, target) = (self.current, self.target);
        let ids = ids.extend("workflows");

        let changes = diff_keyed(
            current.workflows.iter().map(|(k, v)| (k.as_str(), v)),
            target.workflows.iter().map(|(k, v)| (k.as_str(), v)),
            |a, b| a.operation == b.operation && a.plugin == b.plugin,
        );

        for change in changes {
            if change.action == StepAction::Modify
                && self.settings.skip_unavailable_workflow_plugins
                && let (Some(old), Some(new)) =
                    (current.workflows.get(change.key), target.workflows.get(change.key))
                && self.workflow_plugin_unavailable(old, new)
            {
                debug!(
                    "Skipping workflow {}: plugin '{}' is not installed",
                    change.key, new.plugin
                );
                continue;
            }
            self.record(DeploymentUpdateStep::new(
                change.action,
                EntityType::Workflow,
                ids.child_path(change.key),
            ));
        }
    }

    /// A workflow switched to a plugin the deployment neither has nor is
    /// about to install.
    fn workflow_plugin_unavailable(&self, old: &WorkflowDef, new: &WorkflowDef) -> bool {
        if old.plugin == new.plugin {
            return false;
        }

        let present = self
            .current
            .workflow_plugins_to_install
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.current.workflows.values().map(|w| w.plugin.as_str()))
            .any(|name| name == new.plugin);
        let scheduled = self
            .target
            .workflow_plugins_to_install
            .iter()
            .any(|p| p.name == new.plugin && p.install);

        !present && !scheduled
    }

    fn extract_nodes(&mut self, ids: &mut EntityIdBuilder) -> Result<()> {
        let (current, target) = (self.current, self.target);
        let mut ids = ids.extend("nodes");

        let current_ids: HashSet<&str> = current.nodes.iter().map(|n| n.id.as_str()).collect();
        let target_ids: HashSet<&str> = target.nodes.iter().map(|n| n.id.as_str()).collect();

        for node in current.nodes.iter().filter(|n| !target_ids.contains(n.id.as_str())) {
            self.record(DeploymentUpdateStep::new(
                StepAction::Remove,
                EntityType::Node,
                ids.child_path(&node.id),
            ));
        }

        let added: Vec<&Node> = target
            .nodes
            .iter()
            .filter(|n| !current_ids.contains(n.id.as_str()))
            .collect();
        let ranks = rank_added_nodes(&added)?;
        for node in &added {
            let mut step =
                DeploymentUpdateStep::new(StepAction::Add, EntityType::Node, ids.child_path(&node.id));
            if let Some(&rank) = ranks.get(&node.id) {
                step = step.with_topology_order(rank);
            }
            self.record(step);
        }

        for new_node in &target.nodes {
            if let Some(old_node) = current.node(&new_node.id) {
                self.extract_node_changes(&mut ids, old_node, new_node);
            }
        }

        Ok(())
    }

    /// Type, host or container changes cannot be applied in place.
    fn is_structural_change(&self, old: &Node, new: &Node) -> bool {
        let marker = self.settings.containment_relationship.as_str();
        old.node_type != new.node_type
            || old.host() != new.host()
            || old.containment_keys(marker) != new.containment_keys(marker)
    }

    fn extract_node_changes(&mut self, ids: &mut EntityIdBuilder, old: &Node, new: &Node) {
        let mut ids = ids.extend(new.id.as_str());

        if self.is_structural_change(old, new) {
            debug!("Node {} changed type or container", new.id);
            self.record(
                DeploymentUpdateStep::new(StepAction::Modify, EntityType::Node, ids.current_path())
                    .unsupported(),
            );
            return;
        }

        {
            let ids = ids.extend("properties");
            self.record_changes(&ids, diff_maps(&old.properties, &new.properties), EntityType::Property, true);
        }

        if self.settings.expand_operation_aliases {
            let (old, new) = (old.with_operation_aliases(), new.with_operation_aliases());
            self.extract_operations(&mut ids, "operations", &old.operations, &new.operations);
        } else {
            self.extract_operations(&mut ids, "operations", &old.operations, &new.operations);
        }

        self.extract_relationships(&mut ids, old, new);
        self.extract_plugins(&mut ids, old, new);
    }

    fn extract_operations(
        &mut self,
        ids: &mut EntityIdBuilder,
        section: &str,
        old: &OperationMap,
        new: &OperationMap,
    ) {
        let ids = ids.extend(section);
        self.record_changes(&ids, diff_maps(old, new), EntityType::Operation, true);
    }

    fn extract_relationships(&mut self, ids: &mut EntityIdBuilder, old: &Node, new: &Node) {
        let mut ids = ids.extend("relationships");
        let matches = match_relationships(&old.relationships, &new.relationships);

        if !matches.is_positionally_identical() {
            debug!("Relationships of {} were reordered or replaced", new.id);
        }

        for &old_index in &matches.removed {
            self.record(DeploymentUpdateStep::new(
                StepAction::Remove,
                EntityType::Relationship,
                ids.child_path(&index_segment(old_index)),
            ));
        }

        for m in &matches.new {
            match *m {
                RelationshipMatch::Added { new_index } => {
                    self.record(DeploymentUpdateStep::new(
                        StepAction::Add,
                        EntityType::Relationship,
                        ids.child_path(&index_segment(new_index)),
                    ));
                }
                RelationshipMatch::Matched {
                    old_index,
                    new_index,
                } => {
                    let mut rel_ids = ids.extend(index_segment(new_index));
                    if old_index != new_index {
                        let moved = rel_ids.prepend_before_last(index_segment(old_index));
                        self.record(DeploymentUpdateStep::new(
                            StepAction::Modify,
                            EntityType::Relationship,
                            moved.current_path(),
                        ));
                    }
                    self.extract_relationship_changes(
                        &mut rel_ids,
                        &old.relationships[old_index],
                        &new.relationships[new_index],
                    );
                }
            }
        }
    }

    fn extract_relationship_changes(
        &mut self,
        ids: &mut EntityIdBuilder,
        old: &Relationship,
        new: &Relationship,
    ) {
        // Relationship properties have no incremental apply path.
        {
            let ids = ids.extend("properties");
            self.record_changes(&ids, diff_maps(&old.properties, &new.properties), EntityType::Property, false);
        }

        self.extract_operations(ids, "source_operations", &old.source_operations, &new.source_operations);
        self.extract_operations(ids, "target_operations", &old.target_operations, &new.target_operations);
    }

    fn extract_plugins(&mut self, ids: &mut EntityIdBuilder, old: &Node, new: &Node) {
        let ids = ids.extend("plugins_to_install");
        let changes = diff_keyed(
            old.plugins_to_install.iter().map(|p| (p.name.as_str(), p)),
            new.plugins_to_install.iter().map(|p| (p.name.as_str(), p)),
            |a, b| a == b,
        );
        self.record_changes(&ids, changes, EntityType::Plugin, true);
    }

    fn extract_policy_types(&mut self, ids: &mut EntityIdBuilder) {
        let (current, target) = (self.current, self.target);
        let ids = ids.extend("policy_types");
        self.record_changes(
            &ids,
            diff_maps(&current.policy_types, &target.policy_types),
            EntityType::PolicyType,
            false,
        );
    }

    fn extract_policy_triggers(&mut self, ids: &mut EntityIdBuilder) {
        let (current, target) = (self.current, self.target);
        let ids = ids.extend("policy_triggers");
        self.record_changes(
            &ids,
            diff_maps(&current.policy_triggers, &target.policy_triggers),
            EntityType::PolicyTrigger,
            false,
        );
    }

    fn extract_groups(&mut self, ids: &mut EntityIdBuilder) {
        let (current, target) = (self.current, self.target);
        let ids = ids.extend("groups");
        self.record_changes(&ids, diff_maps(&current.groups, &target.groups), EntityType::Group, false);
    }
}
