//! Error types for the deployment update engine.
//!
//! This module provides the error hierarchy for every stage of an update
//! extraction: loading and validating topologies, reading settings, and
//! planning the ordered step list.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the deployment update engine.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// Malformed topology or plan input.
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    /// Planner failures (internal inconsistencies, not bad input).
    #[error("Planning error: {0}")]
    Plan(#[from] PlanError),

    /// Settings errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors caused by malformed topology input.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The topology document was not found.
    #[error("Topology file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The topology document could not be decoded.
    #[error("Failed to parse topology: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Two nodes in one topology share an id.
    #[error("Duplicate node id '{node_id}' in {topology} topology")]
    DuplicateNodeId {
        /// Which input carried the duplicate (current or target).
        topology: String,
        /// The duplicated id.
        node_id: String,
    },

    /// A required identifier is empty.
    #[error("Missing required field '{field}' on {entity}")]
    MissingField {
        /// Entity path the field belongs to.
        entity: String,
        /// Name of the missing field.
        field: String,
    },

    /// A relationship target or host id names a node that does not exist.
    #[error("{entity} references unknown node '{node_id}'")]
    UnknownReference {
        /// Entity path holding the reference.
        entity: String,
        /// The unresolved node id.
        node_id: String,
    },
}

/// Internal planner failures.
///
/// These indicate a bug in the planner or in the upstream blueprint compiler
/// rather than bad operator input.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The newly added nodes form a relationship cycle.
    #[error("Relationship cycle detected among added nodes at '{node_id}'")]
    DependencyCycle {
        /// A node participating in the cycle.
        node_id: String,
    },
}

/// Settings errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment override carried an unusable value.
    #[error("Invalid value '{value}' for {name}: {message}")]
    InvalidEnvVar {
        /// Name of the environment variable.
        name: String,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        message: String,
    },

    /// The `.env` file exists but could not be loaded.
    #[error("Failed to load environment file {path}: {message}")]
    DotEnv {
        /// Path of the `.env` file.
        path: PathBuf,
        /// Loader message.
        message: String,
    },
}

/// Result type alias for deployment update operations.
pub type Result<T> = std::result::Result<T, UpdateError>;

impl UpdateError {
    /// Returns true if this error signals a planner bug rather than bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Plan(_))
    }
}

impl TopologyError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn missing(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Creates an unknown-reference error.
    #[must_use]
    pub fn unknown_reference(entity: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self::UnknownReference {
            entity: entity.into(),
            node_id: node_id.into(),
        }
    }

    /// Creates a parse error with an optional location.
    #[must_use]
    pub fn parse(message: impl Into<String>, location: Option<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location,
        }
    }
}
