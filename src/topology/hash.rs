//! Topology fingerprints for change detection.
//!
//! A fingerprint is the SHA-256 of a topology's JSON serialisation. All maps
//! in the model are ordered, so equal topologies always hash equally and an
//! unchanged plan can be recognised without walking it.

use sha2::{Digest, Sha256};

use super::model::Topology;

/// Hasher for computing topology fingerprints.
#[derive(Debug, Default)]
pub struct TopologyHasher;

impl TopologyHasher {
    /// Creates a new topology hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Computes the fingerprint of a topology.
    #[must_use]
    pub fn hash_topology(&self, topology: &Topology) -> String {
        let mut hasher = Sha256::new();

        // All keys are strings, so JSON encoding does not fail in practice.
        // The Debug form is ordered too and keeps the fingerprint total.
        let encoded = serde_json::to_vec(topology)
            .unwrap_or_else(|_| format!("{topology:?}").into_bytes());
        hasher.update((encoded.len() as u64).to_be_bytes());
        hasher.update(&encoded);

        hex::encode(hasher.finalize())
    }

    /// Computes a short hash (first 8 characters) for display purposes.
    #[must_use]
    pub fn short_hash(&self, hash: &str) -> String {
        hash.chars().take(8).collect()
    }

    /// Compares two hashes to determine if they are equal.
    #[must_use]
    pub fn hashes_match(hash1: &str, hash2: &str) -> bool {
        hash1.len() == hash2.len()
            && hash1
                .bytes()
                .zip(hash2.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::model::Node;
    use serde_json::json;

    fn topology_with(prop: &str) -> Topology {
        let mut node = Node {
            id: String::from("site1"),
            node_type: String::from("cloudify.nodes.Root"),
            ..Node::default()
        };
        node.properties.insert(String::from("prop1"), json!(prop));
        Topology {
            nodes: vec![node],
            ..Topology::default()
        }
    }

    #[test]
    fn test_hash_deterministic() {
        let hasher = TopologyHasher::new();
        let topology = topology_with("v");

        assert_eq!(hasher.hash_topology(&topology), hasher.hash_topology(&topology.clone()));
    }

    #[test]
    fn test_property_change_changes_hash() {
        let hasher = TopologyHasher::new();
        assert_ne!(
            hasher.hash_topology(&topology_with("v1")),
            hasher.hash_topology(&topology_with("v2"))
        );
    }

    #[test]
    fn test_short_hash() {
        let hasher = TopologyHasher::new();
        let short = hasher.short_hash("abcdef1234567890abcdef1234567890");

        assert_eq!(short, "abcdef12");
    }

    #[test]
    fn test_hashes_match() {
        assert!(TopologyHasher::hashes_match("abc123", "abc123"));
        assert!(!TopologyHasher::hashes_match("abc123", "abc124"));
        assert!(!TopologyHasher::hashes_match("abc123", "abc12"));
    }
}
