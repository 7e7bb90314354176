//! Ordered category lookup with an explicit fallback

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category → value map fitted on training data.
///
/// Lookups never fail: a category absent from the map resolves to
/// `fallback`, which is recorded alongside the entries when the map is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMap<V> {
    entries: BTreeMap<String, V>,
    fallback: V,
}

impl<V: Copy> CategoryMap<V> {
    pub fn new(entries: BTreeMap<String, V>, fallback: V) -> Self {
        Self { entries, fallback }
    }

    /// Value for `category`, or the fallback for unseen categories
    pub fn resolve(&self, category: &str) -> V {
        self.lookup(category).unwrap_or(self.fallback)
    }

    /// Value for a category seen during fit
    pub fn lookup(&self, category: &str) -> Option<V> {
        self.entries.get(category).copied()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }

    pub fn fallback(&self) -> V {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in category order
    pub fn iter(&self) -> impl Iterator<Item = (&str, V)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_fallback() {
        let mut entries = BTreeMap::new();
        entries.insert("own".to_string(), 1.0);
        entries.insert("rent".to_string(), 2.0);
        let map = CategoryMap::new(entries, -1.0);

        assert_eq!(map.resolve("own"), 1.0);
        assert_eq!(map.resolve("castle"), -1.0);
        assert_eq!(map.lookup("castle"), None);
        assert!(map.contains("rent"));
        assert_eq!(map.len(), 2);

        let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["own", "rent"]);
    }
}
