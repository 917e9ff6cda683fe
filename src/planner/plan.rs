//! Update plan reports.
//!
//! An [`UpdatePlan`] wraps one extraction with the fingerprints of both
//! inputs, so callers can tell which pair of topologies a step list belongs
//! to and can skip the walk entirely when nothing changed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::Result;
use crate::topology::{ExtractorSettings, Topology, TopologyHasher, TopologyValidator};

use super::extractor::StepExtractor;
use super::step::{DeploymentUpdateStep, StepAction};

/// A complete deployment update plan.
#[derive(Debug, Clone, Serialize)]
pub struct UpdatePlan {
    /// Plan identifier.
    pub id: Uuid,
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
    /// Fingerprint of the current topology.
    pub current_hash: String,
    /// Fingerprint of the target plan.
    pub target_hash: String,
    /// Supported steps in execution order.
    pub steps: Vec<DeploymentUpdateStep>,
    /// Steps that block an incremental update.
    pub unsupported_steps: Vec<DeploymentUpdateStep>,
}

impl UpdatePlan {
    /// Builds a plan for moving `current` to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if either input is malformed or the planner hits an
    /// internal inconsistency.
    pub fn build(
        current: &Topology,
        target: &Topology,
        settings: &ExtractorSettings,
    ) -> Result<Self> {
        let hasher = TopologyHasher::new();
        let current_hash = hasher.hash_topology(current);
        let target_hash = hasher.hash_topology(target);

        if TopologyHasher::hashes_match(&current_hash, &target_hash) {
            TopologyValidator::new().validate(current, "current")?;
            debug!(
                "Topologies share fingerprint {}, nothing to extract",
                hasher.short_hash(&current_hash)
            );
            return Ok(Self::empty(current_hash, target_hash));
        }

        let extracted = StepExtractor::new(current, target)
            .with_settings(settings.clone())
            .extract()?;

        let plan = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            current_hash,
            target_hash,
            steps: extracted.steps,
            unsupported_steps: extracted.unsupported,
        };
        info!("Built update plan {}: {}", plan.id, plan.summary());
        Ok(plan)
    }

    fn empty(current_hash: String, target_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            current_hash,
            target_hash,
            steps: vec![],
            unsupported_steps: vec![],
        }
    }

    /// Returns true if the plan contains no steps at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.unsupported_steps.is_empty()
    }

    /// Returns true if every change can be applied by the update workflow.
    #[must_use]
    pub const fn can_apply_incrementally(&self) -> bool {
        self.unsupported_steps.is_empty()
    }

    /// Number of supported steps with the given action.
    #[must_use]
    pub fn count(&self, action: StepAction) -> usize {
        self.steps.iter().filter(|s| s.action() == action).count()
    }

    /// One-line summary of the plan.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} to add, {} to modify, {} to remove, {} unsupported",
            self.count(StepAction::Add),
            self.count(StepAction::Modify),
            self.count(StepAction::Remove),
            self.unsupported_steps.len()
        )
    }
}

impl std::fmt::Display for UpdatePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No changes required");
        }

        writeln!(f, "Update Plan ({} steps):", self.steps.len())?;
        for (i, step) in self.steps.iter().enumerate() {
            writeln!(f, "  {i}. {step}")?;
        }

        if !self.unsupported_steps.is_empty() {
            writeln!(f, "\nUnsupported changes:")?;
            for step in &self.unsupported_steps {
                writeln!(f, "  - {} {}", step.entity_type(), step.entity_id())?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::step::EntityType;
    use crate::topology::Node;
    use serde_json::json;

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            node_type: String::from("cloudify.nodes.Root"),
            ..Node::default()
        }
    }

    fn topology(nodes: Vec<Node>) -> Topology {
        Topology {
            nodes,
            ..Topology::default()
        }
    }

    #[test]
    fn test_identical_topologies_give_empty_plan() {
        let topo = topology(vec![node("a"), node("b")]);
        let plan = UpdatePlan::build(&topo, &topo.clone(), &ExtractorSettings::default()).unwrap();

        assert!(plan.is_empty());
        assert!(plan.can_apply_incrementally());
        assert_eq!(plan.current_hash, plan.target_hash);
        assert_eq!(plan.to_string(), "No changes required");
    }

    #[test]
    fn test_identical_but_malformed_is_rejected() {
        let topo = topology(vec![node("a"), node("a")]);
        assert!(UpdatePlan::build(&topo, &topo.clone(), &ExtractorSettings::default()).is_err());
    }

    #[test]
    fn test_plan_counts_and_blocking() {
        let current = topology(vec![node("a"), node("b")]);
        let mut target = topology(vec![node("a"), node("c")]);
        target.policy_types.insert(String::from("p1"), json!("v"));

        let plan = UpdatePlan::build(&current, &target, &ExtractorSettings::default()).unwrap();

        assert_eq!(plan.count(StepAction::Add), 1);
        assert_eq!(plan.count(StepAction::Remove), 1);
        assert!(!plan.can_apply_incrementally());
        assert_eq!(plan.unsupported_steps[0].entity_type(), EntityType::PolicyType);
        assert_eq!(
            plan.summary(),
            "1 to add, 0 to modify, 1 to remove, 1 unsupported"
        );
    }

    #[test]
    fn test_serializes_to_json() {
        let current = topology(vec![node("a")]);
        let target = topology(vec![node("a"), node("b")]);
        let plan = UpdatePlan::build(&current, &target, &ExtractorSettings::default()).unwrap();

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["steps"][0]["entity_id"], "nodes:b");
        assert_eq!(json["steps"][0]["topology_order"], 0);
    }
}
