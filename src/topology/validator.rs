//! Input validation for topologies and plans.
//!
//! The extractor refuses to diff malformed input: duplicate node ids, empty
//! identifiers, and dangling node references all stop extraction before any
//! step is produced.

use crate::error::{Result, TopologyError};
use std::collections::HashSet;
use tracing::debug;

use super::model::{Node, Topology};

/// Validator for topology snapshots and compiled plans.
#[derive(Debug, Default)]
pub struct TopologyValidator;

/// Summary of a validated topology.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of relationships across all nodes.
    pub relationships: usize,
    /// Number of workflows.
    pub workflows: usize,
    /// Non-fatal findings.
    pub warnings: Vec<String>,
}

impl TopologyValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a topology. `label` names the input in error messages.
    ///
    /// # Errors
    ///
    /// Returns the first malformed-input error found.
    pub fn validate(&self, topology: &Topology, label: &str) -> Result<ValidationSummary> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(topology.nodes.len());

        for node in &topology.nodes {
            if node.id.is_empty() {
                return Err(TopologyError::missing(format!("{label} node"), "id").into());
            }
            if !seen.insert(node.id.as_str()) {
                return Err(TopologyError::DuplicateNodeId {
                    topology: label.to_string(),
                    node_id: node.id.clone(),
                }
                .into());
            }
        }

        let mut summary = ValidationSummary {
            nodes: topology.nodes.len(),
            relationships: topology.relationship_count(),
            workflows: topology.workflows.len(),
            warnings: Vec::new(),
        };

        for node in &topology.nodes {
            Self::validate_node(node, &seen, &mut summary)?;
        }

        for (name, group) in &topology.groups {
            for member in &group.members {
                if !seen.contains(member.as_str()) {
                    summary
                        .warnings
                        .push(format!("groups:{name} lists unknown member '{member}'"));
                }
            }
        }

        debug!(
            "Validated {label} topology: {} nodes, {} relationships",
            summary.nodes, summary.relationships
        );
        Ok(summary)
    }

    fn validate_node(
        node: &Node,
        known: &HashSet<&str>,
        summary: &mut ValidationSummary,
    ) -> Result<()> {
        let entity = format!("nodes:{}", node.id);

        if node.node_type.is_empty() {
            return Err(TopologyError::missing(entity, "type").into());
        }

        if let Some(host) = node.host()
            && !known.contains(host)
        {
            return Err(TopologyError::unknown_reference(entity, host).into());
        }

        for (index, rel) in node.relationships.iter().enumerate() {
            let rel_entity = format!("{entity}:relationships:[{index}]");
            if rel.relationship_type.is_empty() {
                return Err(TopologyError::missing(rel_entity, "type").into());
            }
            if rel.target_id.is_empty() {
                return Err(TopologyError::missing(rel_entity, "target_id").into());
            }
            if !known.contains(rel.target_id.as_str()) {
                return Err(TopologyError::unknown_reference(rel_entity, &rel.target_id).into());
            }
            if rel.target_id == node.id {
                summary
                    .warnings
                    .push(format!("{rel_entity} targets its own node"));
            }
        }

        let mut plugin_names = HashSet::new();
        for plugin in &node.plugins_to_install {
            if plugin.name.is_empty() {
                return Err(TopologyError::missing(format!("{entity}:plugins_to_install"), "name").into());
            }
            if !plugin_names.insert(plugin.name.as_str()) {
                summary.warnings.push(format!(
                    "{entity}:plugins_to_install lists '{}' more than once",
                    plugin.name
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdateError;
    use crate::topology::model::{GroupDef, Relationship};

    fn node(id: &str) -> Node {
        Node {
            id: id.to_string(),
            node_type: String::from("cloudify.nodes.Root"),
            ..Node::default()
        }
    }

    fn related(id: &str, target: &str) -> Node {
        Node {
            relationships: vec![Relationship {
                relationship_type: String::from("cloudify.relationships.connected_to"),
                target_id: target.to_string(),
                ..Relationship::default()
            }],
            ..node(id)
        }
    }

    fn topology(nodes: Vec<Node>) -> Topology {
        Topology {
            nodes,
            ..Topology::default()
        }
    }

    #[test]
    fn test_valid_topology() {
        let topo = topology(vec![node("a"), related("b", "a")]);
        let summary = TopologyValidator::new().validate(&topo, "target").unwrap();

        assert_eq!(summary.nodes, 2);
        assert_eq!(summary.relationships, 1);
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_node_id() {
        let topo = topology(vec![node("a"), node("a")]);
        let result = TopologyValidator::new().validate(&topo, "current");

        assert!(matches!(
            result,
            Err(UpdateError::Topology(TopologyError::DuplicateNodeId { ref node_id, .. })) if node_id == "a"
        ));
    }

    #[test]
    fn test_unknown_relationship_target() {
        let topo = topology(vec![related("a", "ghost")]);
        let result = TopologyValidator::new().validate(&topo, "target");

        assert!(matches!(
            result,
            Err(UpdateError::Topology(TopologyError::UnknownReference { .. }))
        ));
    }

    #[test]
    fn test_unknown_host() {
        let mut orphan = node("a");
        orphan.host_id = Some(String::from("vm"));
        let result = TopologyValidator::new().validate(&topology(vec![orphan]), "target");

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_type_rejected() {
        let mut bad = node("a");
        bad.node_type.clear();
        let result = TopologyValidator::new().validate(&topology(vec![bad]), "target");

        assert!(matches!(
            result,
            Err(UpdateError::Topology(TopologyError::MissingField { ref field, .. })) if field == "type"
        ));
    }

    #[test]
    fn test_unknown_group_member_is_warning() {
        let mut topo = topology(vec![node("a")]);
        topo.groups.insert(
            String::from("g"),
            GroupDef {
                members: vec![String::from("a"), String::from("b")],
                ..GroupDef::default()
            },
        );

        let summary = TopologyValidator::new().validate(&topo, "target").unwrap();
        assert_eq!(summary.warnings.len(), 1);
    }
}
