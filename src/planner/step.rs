//! Deployment update steps.
//!
//! A step is one classified unit of difference between two topologies.
//! Equality and hashing ignore `topology_order`: two steps that touch the
//! same entity in the same way are the same step, whatever rank the orderer
//! gave them. The rank only influences sorting.

use serde::Serialize;
use std::hash::{Hash, Hasher};

/// What happens to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    /// Entity exists only in the new plan.
    Add,
    /// Entity exists only in the current topology.
    Remove,
    /// Entity exists in both but differs.
    Modify,
}

/// Kind of entity a step addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A node.
    Node,
    /// A relationship of a node.
    Relationship,
    /// A node or relationship property.
    Property,
    /// A node or relationship operation.
    Operation,
    /// A deployment output.
    Output,
    /// A workflow.
    Workflow,
    /// The deployment description.
    Description,
    /// A policy type.
    PolicyType,
    /// A policy trigger.
    PolicyTrigger,
    /// A group.
    Group,
    /// A plugin to install on a node's host.
    Plugin,
}

/// One update step.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentUpdateStep {
    action: StepAction,
    entity_type: EntityType,
    entity_id: String,
    supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    topology_order: Option<usize>,
}

impl DeploymentUpdateStep {
    /// Creates a supported step without a topology rank.
    #[must_use]
    pub fn new(action: StepAction, entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            action,
            entity_type,
            entity_id: entity_id.into(),
            supported: true,
            topology_order: None,
        }
    }

    /// Marks the step as unsupported.
    #[must_use]
    pub const fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Attaches a topology rank.
    #[must_use]
    pub const fn with_topology_order(mut self, order: usize) -> Self {
        self.topology_order = Some(order);
        self
    }

    /// The action.
    #[must_use]
    pub const fn action(&self) -> StepAction {
        self.action
    }

    /// The entity type.
    #[must_use]
    pub const fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    /// The hierarchical entity id.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Whether the update workflow can apply this step.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.supported
    }

    /// Rank among added nodes, if any.
    #[must_use]
    pub const fn topology_order(&self) -> Option<usize> {
        self.topology_order
    }
}

impl PartialEq for DeploymentUpdateStep {
    fn eq(&self, other: &Self) -> bool {
        self.action == other.action
            && self.entity_type == other.entity_type
            && self.entity_id == other.entity_id
            && self.supported == other.supported
    }
}

impl Eq for DeploymentUpdateStep {}

impl Hash for DeploymentUpdateStep {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.action.hash(state);
        self.entity_type.hash(state);
        self.entity_id.hash(state);
        self.supported.hash(state);
    }
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Modify => "modify",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Node => "node",
            Self::Relationship => "relationship",
            Self::Property => "property",
            Self::Operation => "operation",
            Self::Output => "output",
            Self::Workflow => "workflow",
            Self::Description => "description",
            Self::PolicyType => "policy_type",
            Self::PolicyTrigger => "policy_trigger",
            Self::Group => "group",
            Self::Plugin => "plugin",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for DeploymentUpdateStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.action, self.entity_type, self.entity_id)?;
        if !self.supported {
            write!(f, " (unsupported)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_topology_order() {
        let a = DeploymentUpdateStep::new(StepAction::Add, EntityType::Node, "nodes:a")
            .with_topology_order(1);
        let b = DeploymentUpdateStep::new(StepAction::Add, EntityType::Node, "nodes:a")
            .with_topology_order(7);

        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_supported_flag_participates_in_equality() {
        let a = DeploymentUpdateStep::new(StepAction::Modify, EntityType::Node, "nodes:a");
        assert_ne!(a.clone(), a.unsupported());
    }

    #[test]
    fn test_display() {
        let step = DeploymentUpdateStep::new(StepAction::Add, EntityType::PolicyType, "policy_types:p1")
            .unsupported();
        assert_eq!(step.to_string(), "add policy_type policy_types:p1 (unsupported)");
    }

    #[test]
    fn test_serialize() {
        let step = DeploymentUpdateStep::new(StepAction::Remove, EntityType::Node, "nodes:site2");
        let json = serde_json::to_value(&step).unwrap();

        assert_eq!(json["action"], "remove");
        assert_eq!(json["entity_type"], "node");
        assert!(json.get("topology_order").is_none());
    }
}
