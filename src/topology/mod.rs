//! Topology module.
//!
//! This module covers everything about the two inputs of an update:
//! - The typed topology / plan model
//! - Loading documents from YAML or JSON
//! - Input validation
//! - Fingerprints for change detection
//! - Extractor settings

mod hash;
mod model;
mod parser;
mod settings;
mod validator;

pub use hash::TopologyHasher;
pub use model::{
    CONTAINED_IN, GroupDef, Node, OperationDef, OperationMap, PluginRef, Relationship, Topology,
    ValueMap, WorkflowDef,
};
pub use parser::{DocumentFormat, TopologyParser};
pub use settings::{
    ENV_CONTAINMENT_TYPE, ENV_EXPAND_OPERATION_ALIASES, ENV_SKIP_WORKFLOW_PLUGINS, ExtractorSettings,
};
pub use validator::{TopologyValidator, ValidationSummary};
