//! Relationship matching between two versions of a node.
//!
//! A node's relationship list is a multiset keyed by `(type, target_id)`.
//! Every new relationship is paired with the first still-unclaimed old one
//! carrying the same key, so duplicates pair one-to-one and a permutation of
//! the list is recognised as a reorder rather than remove-plus-add.

use crate::topology::Relationship;

/// Pairing of one new relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipMatch {
    /// Paired with the old relationship at `old_index`.
    Matched {
        /// Position in the old list.
        old_index: usize,
        /// Position in the new list.
        new_index: usize,
    },
    /// No old relationship carries this key.
    Added {
        /// Position in the new list.
        new_index: usize,
    },
}

/// Result of matching two relationship lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipMatches {
    /// One entry per new relationship, in new-list order.
    pub new: Vec<RelationshipMatch>,
    /// Old positions nothing was paired with, ascending.
    pub removed: Vec<usize>,
}

/// Matches old and new relationship lists of one node.
#[must_use]
pub fn match_relationships(old: &[Relationship], new: &[Relationship]) -> RelationshipMatches {
    let mut claimed = vec![false; old.len()];
    let mut matches = Vec::with_capacity(new.len());

    for (new_index, rel) in new.iter().enumerate() {
        let key = rel.match_key();
        let found = old
            .iter()
            .enumerate()
            .find(|(i, candidate)| !claimed[*i] && candidate.match_key() == key)
            .map(|(i, _)| i);

        matches.push(match found {
            Some(old_index) => {
                claimed[old_index] = true;
                RelationshipMatch::Matched {
                    old_index,
                    new_index,
                }
            }
            None => RelationshipMatch::Added { new_index },
        });
    }

    let removed = claimed
        .iter()
        .enumerate()
        .filter(|(_, used)| !**used)
        .map(|(i, _)| i)
        .collect();

    RelationshipMatches {
        new: matches,
        removed,
    }
}

impl RelationshipMatches {
    /// Returns true if the lists hold the same keys at the same positions.
    #[must_use]
    pub fn is_positionally_identical(&self) -> bool {
        self.removed.is_empty()
            && self.new.iter().all(|m| {
                matches!(m, RelationshipMatch::Matched { old_index, new_index } if old_index == new_index)
            })
    }
}
