//! Install ordering for newly added nodes.
//!
//! Added nodes form a graph with an edge from each node to every added node
//! it has a relationship to. The graph is sorted topologically and every node
//! is ranked by its position: relationship sources get lower ranks than their
//! targets. Sorting "add node" steps by rank descending therefore creates
//! hosts and other targets before the nodes that point at them.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::topology::Node;

/// Computes the topology rank of every added node.
///
/// `added` must hold the new-plan definitions of the added nodes in plan
/// order; relationships pointing outside this set are ignored.
///
/// # Errors
///
/// Returns [`PlanError::DependencyCycle`] if the added nodes' relationships
/// form a cycle.
pub fn rank_added_nodes(added: &[&Node]) -> Result<BTreeMap<String, usize>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(added.len());

    for node in added {
        let idx = graph.add_node(node.id.as_str());
        indices.insert(node.id.as_str(), idx);
    }

    for node in added {
        let source = indices[node.id.as_str()];
        for rel in &node.relationships {
            // A node cannot wait for itself.
            if rel.target_id == node.id {
                continue;
            }
            if let Some(&target) = indices.get(rel.target_id.as_str()) {
                graph.update_edge(source, target, ());
            }
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| PlanError::DependencyCycle {
        node_id: graph[cycle.node_id()].to_string(),
    })?;

    let ranks: BTreeMap<String, usize> = sorted
        .into_iter()
        .enumerate()
        .map(|(rank, idx)| (graph[idx].to_string(), rank))
        .collect();

    debug!("Ranked {} added nodes", ranks.len());
    Ok(ranks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdateError;
    use crate::topology::Relationship;

    fn node(id: &str, targets: &[&str]) -> Node {
        Node {
            id: id.to_string(),
            node_type: String::from("cloudify.nodes.Root"),
            relationships: targets
                .iter()
                .map(|t| Relationship {
                    relationship_type: String::from("cloudify.relationships.connected_to"),
                    target_id: (*t).to_string(),
                    ..Relationship::default()
                })
                .collect(),
            ..Node::default()
        }
    }

    #[test]
    fn test_rank_respects_edges() {
        let nodes = [
            node("a", &["c"]),
            node("b", &["c"]),
            node("c", &["e"]),
            node("d", &["e"]),
            node("e", &[]),
            node("f", &[]),
        ];
        let refs: Vec<&Node> = nodes.iter().collect();
        let ranks = rank_added_nodes(&refs).unwrap();

        assert_eq!(ranks.len(), 6);
        assert!(ranks["e"] > ranks["c"]);
        assert!(ranks["c"] > ranks["a"]);
        assert!(ranks["c"] > ranks["b"]);
        assert!(ranks["e"] > ranks["d"]);
    }

    #[test]
    fn test_ranks_are_dense() {
        let nodes = [node("x", &[]), node("y", &["x"])];
        let refs: Vec<&Node> = nodes.iter().collect();
        let ranks = rank_added_nodes(&refs).unwrap();

        let mut values: Vec<usize> = ranks.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1]);
    }

    #[test]
    fn test_targets_outside_added_set_ignored() {
        let nodes = [node("new", &["existing"])];
        let refs: Vec<&Node> = nodes.iter().collect();
        let ranks = rank_added_nodes(&refs).unwrap();

        assert_eq!(ranks["new"], 0);
    }

    #[test]
    fn test_self_relationship_ignored() {
        let nodes = [node("loop", &["loop"])];
        let refs: Vec<&Node> = nodes.iter().collect();
        assert!(rank_added_nodes(&refs).is_ok());
    }

    #[test]
    fn test_cycle_is_fatal() {
        let nodes = [node("a", &["b"]), node("b", &["a"])];
        let refs: Vec<&Node> = nodes.iter().collect();
        let result = rank_added_nodes(&refs);

        assert!(matches!(
            result,
            Err(UpdateError::Plan(PlanError::DependencyCycle { .. }))
        ));
    }

    #[test]
    fn test_empty() {
        assert!(rank_added_nodes(&[]).unwrap().is_empty());
    }
}
