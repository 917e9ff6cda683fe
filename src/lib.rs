// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Deployment Update
//!
//! The diff and plan engine behind in-place deployment updates.
//!
//! ## Overview
//!
//! Given the topology a deployment currently runs and a freshly compiled
//! plan for the same deployment, this crate computes:
//!
//! - An ordered list of supported steps that an update workflow can apply
//!   node by node
//! - A list of unsupported steps that require a full redeploy
//!
//! ## Architecture
//!
//! 1. **Topology**: typed model of both inputs, loaded from YAML or JSON and
//!    validated before use
//! 2. **Extraction**: every section is diffed with its own comparison rule and
//!    each difference becomes a classified step
//! 3. **Ordering**: added nodes are ranked by a topological sort of their
//!    relationships, then all supported steps are sorted for execution
//!
//! ## Modules
//!
//! - [`topology`]: Data model, loader, validator, fingerprints and settings
//! - [`planner`]: Step extraction, ordering and update plans
//! - [`cli`]: Command-line interface
//! - [`error`]: Error types
//!
//! ## Example
//!
//! ```yaml
//! nodes:
//!   - id: vm
//!     type: cloudify.nodes.Compute
//!   - id: app
//!     type: cloudify.nodes.WebServer
//!     host_id: vm
//!     relationships:
//!       - type: cloudify.relationships.contained_in
//!         type_hierarchy: [cloudify.relationships.contained_in]
//!         target_id: vm
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod error;
pub mod planner;
pub mod topology;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, Commands, OutputFormatter};
pub use error::{Result, UpdateError};
pub use planner::{
    DeploymentUpdateStep, EntityType, StepAction, StepExtractor, UpdatePlan, extract_steps,
};
pub use topology::{ExtractorSettings, Topology, TopologyParser, TopologyValidator};
