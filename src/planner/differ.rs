//! Keyed collection diffing.
//!
//! Maps and name-keyed lists (plugins) are compared key by key. Removed keys
//! are reported first in key order, then added and modified keys in key
//! order, so identical inputs always yield identical change lists.

use std::collections::BTreeMap;

use super::step::StepAction;

/// One changed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChange<K> {
    /// What happened to the key.
    pub action: StepAction,
    /// The key.
    pub key: K,
}

/// Diffs two keyed collections, comparing shared keys with `same`.
pub fn diff_keyed<K, V, F>(
    old: impl IntoIterator<Item = (K, V)>,
    new: impl IntoIterator<Item = (K, V)>,
    mut same: F,
) -> Vec<KeyChange<K>>
where
    K: Ord + Copy,
    F: FnMut(&V, &V) -> bool,
{
    let old: BTreeMap<K, V> = old.into_iter().collect();
    let new: BTreeMap<K, V> = new.into_iter().collect();
    let mut changes = Vec::new();

    for key in old.keys() {
        if !new.contains_key(key) {
            changes.push(KeyChange {
                action: StepAction::Remove,
                key: *key,
            });
        }
    }

    for (key, new_value) in &new {
        match old.get(key) {
            None => changes.push(KeyChange {
                action: StepAction::Add,
                key: *key,
            }),
            Some(old_value) if !same(old_value, new_value) => changes.push(KeyChange {
                action: StepAction::Modify,
                key: *key,
            }),
            Some(_) => {}
        }
    }

    changes
}

/// Diffs two string-keyed maps by value equality.
pub fn diff_maps<'a, V: PartialEq>(
    old: &'a BTreeMap<String, V>,
    new: &'a BTreeMap<String, V>,
) -> Vec<KeyChange<&'a str>> {
    diff_keyed(
        old.iter().map(|(k, v)| (k.as_str(), v)),
        new.iter().map(|(k, v)| (k.as_str(), v)),
        |a, b| a == b,
    )
}

/// Diffs two optional scalar values as a single entity.
pub fn diff_optional<T: PartialEq>(old: Option<&T>, new: Option<&T>) -> Option<StepAction> {
    match (old, new) {
        (None, Some(_)) => Some(StepAction::Add),
        (Some(_), None) => Some(StepAction::Remove),
        (Some(a), Some(b)) if a != b => Some(StepAction::Modify),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn map(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_identical_maps() {
        let a = map(&[("x", json!(1)), ("y", json!({"nested": [1, 2]}))]);
        assert!(diff_maps(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_add_remove_modify() {
        let old = map(&[("keep", json!(1)), ("gone", json!(2)), ("changed", json!("a"))]);
        let new = map(&[("keep", json!(1)), ("changed", json!("b")), ("fresh", json!(3))]);

        let changes = diff_maps(&old, &new);
        assert_eq!(
            changes,
            vec![
                KeyChange { action: StepAction::Remove, key: "gone" },
                KeyChange { action: StepAction::Modify, key: "changed" },
                KeyChange { action: StepAction::Add, key: "fresh" },
            ]
        );
    }

    #[test]
    fn test_custom_comparison() {
        let old = [("a", (1, "ignored")), ("b", (2, "x"))];
        let new = [("a", (1, "different")), ("b", (3, "x"))];

        let changes = diff_keyed(old, new, |x, y| x.0 == y.0);
        assert_eq!(changes, vec![KeyChange { action: StepAction::Modify, key: "b" }]);
    }

    #[test]
    fn test_diff_optional() {
        let a = String::from("a");
        let b = String::from("b");
        assert_eq!(diff_optional(None, Some(&a)), Some(StepAction::Add));
        assert_eq!(diff_optional(Some(&a), None), Some(StepAction::Remove));
        assert_eq!(diff_optional(Some(&a), Some(&b)), Some(StepAction::Modify));
        assert_eq!(diff_optional(Some(&a), Some(&a)), None);
        assert_eq!(diff_optional::<String>(None, None), None);
    }
}
