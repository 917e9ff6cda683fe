//! Execution order of supported steps.
//!
//! Steps are ordered by action (remove, add, modify), then by entity type
//! within the action, then by topology rank descending with unranked steps
//! last. The sort is stable, so steps that compare equal keep their
//! extraction order.

use std::cmp::{Ordering, Reverse};

use super::step::{DeploymentUpdateStep, EntityType, StepAction};

const fn action_priority(action: StepAction) -> u8 {
    match action {
        StepAction::Remove => 0,
        StepAction::Add => 1,
        StepAction::Modify => 2,
    }
}

// Nodes are added before anything that may hang off them, and relationships
// are removed before anything else, nodes included.
const fn entity_priority(action: StepAction, entity_type: EntityType) -> u8 {
    match (action, entity_type) {
        (StepAction::Add, EntityType::Node) | (StepAction::Remove, EntityType::Relationship) => 0,
        _ => 1,
    }
}

/// Compares two steps by execution order.
#[must_use]
pub fn execution_order(a: &DeploymentUpdateStep, b: &DeploymentUpdateStep) -> Ordering {
    action_priority(a.action())
        .cmp(&action_priority(b.action()))
        .then_with(|| {
            entity_priority(a.action(), a.entity_type())
                .cmp(&entity_priority(b.action(), b.entity_type()))
        })
        .then_with(|| rank_key(a).cmp(&rank_key(b)))
}

// `None < Some(_)`, so reversing puts the highest rank first and unranked
// steps last.
fn rank_key(step: &DeploymentUpdateStep) -> Reverse<Option<usize>> {
    Reverse(step.topology_order())
}

/// Sorts steps into execution order in place.
pub fn sort_steps(steps: &mut [DeploymentUpdateStep]) {
    steps.sort_by(execution_order);
}
