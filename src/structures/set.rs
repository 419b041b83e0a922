//! Symbol sets with proposed and effective membership

use crate::decay::DecayTag;
use std::collections::BTreeSet;

/// A set of symbol names (or the empty word)
///
/// Like grammar rewrites, `add` and `remove` only change the *proposed*
/// membership; [`SymbolSet::contains`] keeps answering from the effective set
/// until the step is archived. `add_now` / `remove_now` bypass the deferral.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolSet {
    effective: BTreeSet<String>,
    proposed: BTreeSet<String>,
    tag: DecayTag,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Propose adding `item`; true if it is not yet effectively present
    pub fn add(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        let absent = !self.effective.contains(&item);
        self.proposed.insert(item);
        absent
    }

    /// Add `item` with immediate effect; true if it was absent
    pub fn add_now(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        self.proposed.insert(item.clone());
        self.effective.insert(item)
    }

    /// Propose removing `item`; true if it is effectively present
    pub fn remove(&mut self, item: &str) -> bool {
        self.proposed.remove(item);
        self.effective.contains(item)
    }

    pub fn remove_now(&mut self, item: &str) -> bool {
        self.proposed.remove(item);
        self.effective.remove(item)
    }

    pub fn contains(&self, item: &str) -> bool {
        self.effective.contains(item)
    }

    /// Effective members
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.effective.iter().map(String::as_str)
    }

    /// Members once this step is archived
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.proposed.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.effective.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effective.is_empty()
    }

    pub fn tag(&self) -> DecayTag {
        self.tag
    }

    pub fn mark(&mut self, tag: DecayTag) -> DecayTag {
        self.tag = DecayTag::resolve(self.tag, tag);
        self.tag
    }

    /// Make proposed membership effective and decay the tag
    pub(crate) fn finalize(&mut self) {
        self.effective = self.proposed.clone();
        self.tag = self.tag.decay();
    }

    /// Rebuild from archived members, all effective at once
    pub(crate) fn restore(items: impl IntoIterator<Item = String>, tag: DecayTag) -> Self {
        let effective: BTreeSet<String> = items.into_iter().collect();
        SymbolSet {
            proposed: effective.clone(),
            effective,
            tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_deferred() {
        let mut set = SymbolSet::new();
        assert!(set.add("A"));
        assert!(!set.contains("A"));
        assert!(set.add("A"), "still not effective within the same step");
        set.finalize();
        assert!(set.contains("A"));
        assert!(!set.add("A"));
    }

    #[test]
    fn test_immediate_changes() {
        let mut set = SymbolSet::new();
        assert!(set.add_now("a"));
        assert!(set.contains("a"));
        assert!(!set.add_now("a"));
        assert!(set.remove_now("a"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_is_deferred() {
        let mut set = SymbolSet::restore(["x".to_string(), "y".to_string()], DecayTag::None);
        assert!(set.remove("x"));
        assert!(set.contains("x"));
        assert_eq!(set.pending().collect::<Vec<_>>(), vec!["y"]);
        set.finalize();
        assert_eq!(set.items().collect::<Vec<_>>(), vec!["y"]);
    }
}
