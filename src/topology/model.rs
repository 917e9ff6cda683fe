//! Topology data model.
//!
//! These types describe both inputs of an update extraction: the topology of
//! the live deployment and the freshly compiled plan. Open-ended sections
//! (properties, outputs, policy definitions) are kept as JSON values; maps are
//! ordered so that every walk over them is deterministic.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Open-ended keyed section (properties, outputs, policy definitions).
pub type ValueMap = BTreeMap<String, Value>;

/// Operations keyed by their dotted `interface.operation` name.
pub type OperationMap = BTreeMap<String, OperationDef>;

/// Default type-hierarchy marker for containment relationships.
pub const CONTAINED_IN: &str = "cloudify.relationships.contained_in";

/// A deployment topology or compiled blueprint plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Topology {
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Deployment outputs.
    #[serde(default)]
    pub outputs: ValueMap,
    /// Workflows by name.
    #[serde(default)]
    pub workflows: BTreeMap<String, WorkflowDef>,
    /// Nodes, in document order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Policy type definitions.
    #[serde(default)]
    pub policy_types: ValueMap,
    /// Policy trigger definitions.
    #[serde(default)]
    pub policy_triggers: ValueMap,
    /// Groups by name.
    #[serde(default)]
    pub groups: BTreeMap<String, GroupDef>,
    /// Plugins the deployment's workflows need on the management side.
    #[serde(default)]
    pub workflow_plugins_to_install: Vec<PluginRef>,
}

/// A deployable unit of the topology.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Node id, unique within one topology.
    pub id: String,
    /// Node type name.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Id of the hosting node, if any.
    #[serde(default)]
    pub host_id: Option<String>,
    /// Node properties.
    #[serde(default)]
    pub properties: ValueMap,
    /// Lifecycle operations.
    #[serde(default)]
    pub operations: OperationMap,
    /// Outgoing relationships, in declaration order.
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Agent plugins installed on this node's host.
    #[serde(default)]
    pub plugins_to_install: Vec<PluginRef>,
}

/// A directed association from the owning node to a target node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Relationship {
    /// Relationship type name.
    #[serde(rename = "type")]
    pub relationship_type: String,
    /// Ancestor types, most derived first.
    #[serde(default)]
    pub type_hierarchy: Vec<String>,
    /// Id of the target node.
    pub target_id: String,
    /// Operations run on the source side.
    #[serde(default)]
    pub source_operations: OperationMap,
    /// Operations run on the target side.
    #[serde(default)]
    pub target_operations: OperationMap,
    /// Relationship properties.
    #[serde(default)]
    pub properties: ValueMap,
}

/// A single operation mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OperationDef {
    /// Implementation reference (module path or script).
    #[serde(default)]
    pub operation: String,
    /// Plugin providing the implementation.
    #[serde(default)]
    pub plugin: Option<String>,
    /// Where the operation executes.
    #[serde(default)]
    pub executor: Option<String>,
    /// Operation inputs.
    #[serde(default)]
    pub inputs: ValueMap,
    /// Any further compiler metadata, compared opaquely.
    #[serde(flatten)]
    pub extra: ValueMap,
}

/// A workflow mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowDef {
    /// Implementation reference.
    pub operation: String,
    /// Plugin providing the implementation.
    pub plugin: String,
    /// Declared workflow parameters.
    #[serde(default)]
    pub parameters: ValueMap,
}

/// A group of nodes with attached policies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupDef {
    /// Member node ids. Order carries no meaning.
    #[serde(default)]
    pub members: Vec<String>,
    /// Policies attached to the group.
    #[serde(default)]
    pub policies: ValueMap,
}

/// A plugin reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginRef {
    /// Plugin name, the identity used for diffing.
    pub name: String,
    /// Whether the plugin is installed as part of the update.
    #[serde(default = "default_install")]
    pub install: bool,
    /// Executor the plugin runs under.
    #[serde(default)]
    pub executor: Option<String>,
    /// Source archive or URL.
    #[serde(default)]
    pub source: Option<String>,
    /// Remaining metadata, compared opaquely.
    #[serde(flatten)]
    pub extra: ValueMap,
}

const fn default_install() -> bool {
    true
}

impl Topology {
    /// Finds a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Total relationship count across all nodes.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.nodes.iter().map(|n| n.relationships.len()).sum()
    }
}

impl Node {
    /// Returns the host id, treating an empty string as no host.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host_id.as_deref().filter(|h| !h.is_empty())
    }

    /// Resolves an operation by its full dotted name or by its short alias.
    ///
    /// The short alias is the final dotted segment and only resolves when
    /// exactly one full name ends with it.
    #[must_use]
    pub fn operation(&self, name: &str) -> Option<&OperationDef> {
        if let Some(op) = self.operations.get(name) {
            return Some(op);
        }

        let mut candidates = self
            .operations
            .iter()
            .filter(|(key, _)| short_operation_name(key) == Some(name));
        match (candidates.next(), candidates.next()) {
            (Some((_, op)), None) => Some(op),
            _ => None,
        }
    }

    /// Returns a copy of this node whose operation map also carries the
    /// unambiguous short aliases of its dotted operation names.
    #[must_use]
    pub fn with_operation_aliases(&self) -> Self {
        let mut node = self.clone();
        node.operations = operations_with_aliases(&self.operations);
        node
    }

    /// Sorted `(type, target_id)` keys of this node's containment
    /// relationships.
    #[must_use]
    pub fn containment_keys(&self, marker: &str) -> Vec<(&str, &str)> {
        let mut keys: Vec<(&str, &str)> = self
            .relationships
            .iter()
            .filter(|r| r.is_containment(marker))
            .map(Relationship::match_key)
            .collect();
        keys.sort_unstable();
        keys
    }
}

impl Relationship {
    /// Returns true if this relationship's type hierarchy contains `marker`.
    #[must_use]
    pub fn is_containment(&self, marker: &str) -> bool {
        self.relationship_type == marker || self.type_hierarchy.iter().any(|t| t == marker)
    }

    /// Identity used when matching relationships across topologies.
    #[must_use]
    pub fn match_key(&self) -> (&str, &str) {
        (&self.relationship_type, &self.target_id)
    }
}

impl PartialEq for GroupDef {
    fn eq(&self, other: &Self) -> bool {
        let mut mine: Vec<&String> = self.members.iter().collect();
        let mut theirs: Vec<&String> = other.members.iter().collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs && self.policies == other.policies
    }
}

/// Final dotted segment of an operation name, if the name is dotted.
fn short_operation_name(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, short)| short)
}

/// Adds unambiguous short aliases to an operation map.
fn operations_with_aliases(operations: &OperationMap) -> OperationMap {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for short in operations.keys().filter_map(|k| short_operation_name(k)) {
        *counts.entry(short).or_default() += 1;
    }

    let mut expanded = operations.clone();
    for (key, op) in operations {
        if let Some(short) = short_operation_name(key)
            && counts.get(short) == Some(&1)
            && !operations.contains_key(short)
        {
            expanded.insert(short.to_string(), op.clone());
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(operation: &str) -> OperationDef {
        OperationDef {
            operation: operation.to_string(),
            ..OperationDef::default()
        }
    }

    fn node_with_ops(keys: &[&str]) -> Node {
        Node {
            id: String::from("node1"),
            node_type: String::from("type"),
            operations: keys.iter().map(|k| ((*k).to_string(), op(k))).collect(),
            ..Node::default()
        }
    }

    #[test]
    fn test_operation_resolves_full_and_short_name() {
        let node = node_with_ops(&["cloudify.interfaces.lifecycle.create"]);

        let full = node.operation("cloudify.interfaces.lifecycle.create");
        let short = node.operation("create");

        assert!(full.is_some());
        assert_eq!(full, short);
    }

    #[test]
    fn test_ambiguous_short_name_does_not_resolve() {
        let node = node_with_ops(&["a.lifecycle.start", "b.lifecycle.start"]);
        assert!(node.operation("start").is_none());
    }

    #[test]
    fn test_with_operation_aliases() {
        let node = node_with_ops(&["a.lifecycle.start", "b.lifecycle.start", "a.lifecycle.stop"]);
        let aliased = node.with_operation_aliases();

        assert!(aliased.operations.contains_key("stop"));
        assert!(!aliased.operations.contains_key("start"));
        assert_eq!(aliased.operations.len(), 4);
    }

    #[test]
    fn test_group_member_order_ignored() {
        let a = GroupDef {
            members: vec![String::from("x"), String::from("y")],
            policies: ValueMap::new(),
        };
        let b = GroupDef {
            members: vec![String::from("y"), String::from("x")],
            policies: ValueMap::new(),
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_containment_detection() {
        let rel = Relationship {
            relationship_type: String::from("my.hosted_on"),
            type_hierarchy: vec![String::from(CONTAINED_IN), String::from("my.hosted_on")],
            target_id: String::from("vm"),
            ..Relationship::default()
        };
        assert!(rel.is_containment(CONTAINED_IN));
        assert!(!rel.is_containment("cloudify.relationships.connected_to"));
    }

    #[test]
    fn test_containment_keys_sorted() {
        let contained = |target: &str| Relationship {
            relationship_type: String::from(CONTAINED_IN),
            target_id: target.to_string(),
            ..Relationship::default()
        };
        let node = Node {
            relationships: vec![
                contained("vm2"),
                Relationship {
                    relationship_type: String::from("cloudify.relationships.connected_to"),
                    target_id: String::from("db"),
                    ..Relationship::default()
                },
                contained("vm1"),
            ],
            ..Node::default()
        };

        assert_eq!(
            node.containment_keys(CONTAINED_IN),
            vec![(CONTAINED_IN, "vm1"), (CONTAINED_IN, "vm2")]
        );
    }

    #[test]
    fn test_empty_host_is_none() {
        let node = Node {
            host_id: Some(String::new()),
            ..Node::default()
        };
        assert!(node.host().is_none());
    }
}
