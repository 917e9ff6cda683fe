//! Planning module for deployment updates.
//!
//! This module compares a live topology with a newly compiled plan and turns
//! the difference into ordered, classified update steps.

mod differ;
mod entity_id;
mod extractor;
mod ordering;
mod plan;
mod relationships;
mod sorter;
mod step;

pub use differ::{KeyChange, diff_keyed, diff_maps, diff_optional};
pub use entity_id::{EntityIdBuilder, EntityIdScope, SEPARATOR, index_segment};
pub use extractor::{ExtractedSteps, StepExtractor, extract_steps};
pub use ordering::rank_added_nodes;
pub use plan::UpdatePlan;
pub use relationships::{RelationshipMatch, RelationshipMatches, match_relationships};
pub use sorter::{execution_order, sort_steps};
pub use step::{DeploymentUpdateStep, EntityType, StepAction};
