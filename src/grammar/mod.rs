//! Rewritable grammar
//!
//! This module provides the grammar half of a snapshot:
//! - [`symbol`]: terminals, nonterminals and their naming rules
//! - [`rule`]: words and production rules
//! - [`data`]: the archived representation ([`GrammarData`])
//!
//! # Proposed changes
//!
//! Rewrite operations only *propose* changes while a step runs. Additions are
//! inserted with a `New` tag, removals merely tag the entity `Removed`. The
//! structural effect of a removal happens in [`Grammar::finalize`], which the
//! controller calls when it archives a step:
//!
//! ```text
//! Removed      →  deleted from the grammar
//! any other    →  tag.decay()
//! ```
//!
//! Removal never cascades. A step that removes a symbol must also remove the
//! rules mentioning it, otherwise finalizing reports a dangling symbol.

pub mod data;
pub mod rule;
pub mod symbol;

pub use data::{GrammarData, PlainGrammar};
pub use rule::{Rule, RuleKey, Word};
pub use symbol::{Symbol, SymbolKind};

use crate::constants::RENAME_SUFFIX;
use crate::decay::DecayTag;
use crate::error::{EngineError, Result};
use std::collections::BTreeMap;
use tracing::trace;

/// Context-free grammar whose entities carry decay tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: BTreeMap<String, Symbol>,
    terminals: BTreeMap<String, Symbol>,
    rules: BTreeMap<String, BTreeMap<Word, Rule>>,
    start: String,
}

impl Grammar {
    /// Create a grammar containing only its start nonterminal
    pub fn new(start: &str) -> Result<Self> {
        let mut grammar = Grammar {
            nonterminals: BTreeMap::new(),
            terminals: BTreeMap::new(),
            rules: BTreeMap::new(),
            start: start.to_string(),
        };
        grammar.insert_symbol(start, DecayTag::None, Some(SymbolKind::Nonterminal))?;
        Ok(grammar)
    }

    /// Rebuild a grammar from archived data, validating every reference
    pub fn from_data(data: &GrammarData) -> Result<Self> {
        let mut grammar = Grammar {
            nonterminals: BTreeMap::new(),
            terminals: BTreeMap::new(),
            rules: BTreeMap::new(),
            start: data.start.clone(),
        };

        for (name, tag) in &data.nonterminals {
            grammar.insert_symbol(name, *tag, Some(SymbolKind::Nonterminal))?;
        }
        for (name, tag) in &data.terminals {
            grammar.insert_symbol(name, *tag, Some(SymbolKind::Terminal))?;
        }

        grammar.require_nonterminal(&data.start)?;

        for (left, rights) in &data.rules {
            grammar.require_nonterminal(left)?;
            for (right, tag) in rights {
                let right = Word::parse(right);
                grammar.require_word(&right)?;
                let key = RuleKey::new(left.clone(), right.clone());
                grammar
                    .rules
                    .entry(left.clone())
                    .or_default()
                    .insert(right, Rule::new(key, *tag));
            }
        }

        Ok(grammar)
    }

    pub fn from_plain(plain: PlainGrammar) -> Result<Self> {
        Grammar::from_data(&GrammarData::from(plain))
    }

    /// Archived representation with every tag as it currently is
    pub fn to_data(&self) -> GrammarData {
        let tags = |symbols: &BTreeMap<String, Symbol>| {
            symbols
                .iter()
                .map(|(name, symbol)| (name.clone(), symbol.tag()))
                .collect::<BTreeMap<_, _>>()
        };
        GrammarData {
            nonterminals: tags(&self.nonterminals),
            terminals: tags(&self.terminals),
            rules: self
                .rules
                .iter()
                .filter(|(_, rights)| !rights.is_empty())
                .map(|(left, rights)| {
                    let rights = rights
                        .iter()
                        .map(|(right, rule)| (right.to_string(), rule.tag()))
                        .collect();
                    (left.clone(), rights)
                })
                .collect(),
            start: self.start.clone(),
        }
    }

    // ========== Read access ==========

    /// Name of the start nonterminal
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.nonterminals
            .get(name)
            .or_else(|| self.terminals.get(name))
    }

    pub fn contains_symbol(&self, name: &str) -> bool {
        self.symbol(name).is_some()
    }

    /// Nonterminals, start symbol first, then by name
    pub fn nonterminals(&self) -> impl Iterator<Item = &Symbol> {
        let start = self.nonterminals.get(&self.start);
        start.into_iter().chain(
            self.nonterminals
                .values()
                .filter(move |symbol| symbol.name() != self.start),
        )
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Symbol> {
        self.terminals.values()
    }

    /// Nonterminals followed by terminals
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.nonterminals().chain(self.terminals())
    }

    /// All rules grouped by left side, the start symbol's group first
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        let start = self.rules.get(&self.start);
        start
            .into_iter()
            .chain(
                self.rules
                    .iter()
                    .filter(move |(left, _)| **left != self.start)
                    .map(|(_, rights)| rights),
            )
            .flat_map(|rights| rights.values())
    }

    pub fn rules_for<'a>(&'a self, left: &str) -> impl Iterator<Item = &'a Rule> {
        self.rules
            .get(left)
            .into_iter()
            .flat_map(|rights| rights.values())
    }

    pub fn rule(&self, key: &RuleKey) -> Option<&Rule> {
        self.rules.get(&key.left)?.get(&key.right)
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(BTreeMap::len).sum()
    }

    // ========== Proposed rewrites ==========

    /// Add a symbol (kind follows from its name); an existing one is returned unchanged
    pub fn add_symbol(&mut self, name: &str) -> Result<&Symbol> {
        if !self.contains_symbol(name) {
            self.insert_symbol(name, DecayTag::New, None)?;
        }
        self.symbol(name)
            .ok_or_else(|| EngineError::UnknownSymbol {
                name: name.to_string(),
            })
    }

    /// Add a fresh nonterminal, renaming `desired` until it is free
    pub fn new_nonterminal(&mut self, desired: &str) -> Result<String> {
        if SymbolKind::of(desired) != Some(SymbolKind::Nonterminal) {
            return Err(EngineError::InvalidSymbolName {
                name: desired.to_string(),
                expected: SymbolKind::Nonterminal.as_str(),
            });
        }
        let mut name = desired.to_string();
        while self.contains_symbol(&name) {
            name.push_str(RENAME_SUFFIX);
        }
        self.add_symbol(&name)?;
        Ok(name)
    }

    /// Tag a symbol for removal at the end of this step
    pub fn remove_symbol(&mut self, name: &str) -> Result<()> {
        self.symbol_mut(name)?.mark(DecayTag::Removed);
        Ok(())
    }

    /// Add a rule; an identical existing rule is tagged `Duplicate` instead
    pub fn add_rule(&mut self, left: &str, right: Word) -> Result<RuleKey> {
        self.require_nonterminal(left)?;
        self.require_word(&right)?;

        let key = RuleKey::new(left, right.clone());
        let rights = self.rules.entry(left.to_string()).or_default();
        match rights.get_mut(&right) {
            Some(existing) => {
                existing.mark(DecayTag::Duplicate);
            }
            None => {
                rights.insert(right, Rule::new(key.clone(), DecayTag::New));
            }
        }
        Ok(key)
    }

    /// Tag a rule for removal at the end of this step
    pub fn remove_rule(&mut self, key: &RuleKey) -> Result<()> {
        self.rule_mut(key)?.mark(DecayTag::Removed);
        Ok(())
    }

    /// Remove `old` and add a rule with the same left side and `new_right`
    pub fn replace_rule(&mut self, old: &RuleKey, new_right: Word) -> Result<RuleKey> {
        self.remove_rule(old)?;
        let key = self.add_rule(&old.left, new_right)?;
        self.rule_mut(&key)?.mark(DecayTag::Replaced);
        Ok(key)
    }

    pub fn change_start(&mut self, name: &str) -> Result<()> {
        self.require_nonterminal(name)?;
        self.start = name.to_string();
        Ok(())
    }

    /// Assign a tag to a symbol, returning the tag that survived resolution
    pub fn mark_symbol(&mut self, name: &str, tag: DecayTag) -> Result<DecayTag> {
        Ok(self.symbol_mut(name)?.mark(tag))
    }

    pub fn mark_rule(&mut self, key: &RuleKey, tag: DecayTag) -> Result<DecayTag> {
        Ok(self.rule_mut(key)?.mark(tag))
    }

    /// Reset every tag to `None`, except pending removals
    pub fn clear_tags(&mut self) {
        for symbol in self
            .nonterminals
            .values_mut()
            .chain(self.terminals.values_mut())
        {
            symbol.mark(DecayTag::None);
        }
        for rule in self.rules.values_mut().flat_map(|rights| rights.values_mut()) {
            rule.mark(DecayTag::None);
        }
    }

    /// Apply pending removals and decay every remaining tag
    pub fn finalize(&mut self) -> Result<()> {
        let removed_symbols: Vec<String> = self
            .symbols()
            .filter(|symbol| symbol.tag() == DecayTag::Removed)
            .map(|symbol| symbol.name().to_string())
            .collect();
        let removed_rules: Vec<RuleKey> = self
            .rules()
            .filter(|rule| rule.tag() == DecayTag::Removed)
            .map(|rule| rule.key().clone())
            .collect();

        for name in &removed_symbols {
            trace!(symbol = %name, "deleting removed symbol");
            self.nonterminals.remove(name);
            self.terminals.remove(name);
        }
        for key in &removed_rules {
            trace!(rule = %key, "deleting removed rule");
            if let Some(rights) = self.rules.get_mut(&key.left) {
                rights.remove(&key.right);
            }
        }
        self.rules.retain(|_, rights| !rights.is_empty());

        for symbol in self
            .nonterminals
            .values_mut()
            .chain(self.terminals.values_mut())
        {
            let decayed = symbol.tag().decay();
            symbol.set_tag(decayed);
        }
        for rule in self.rules.values_mut().flat_map(|rights| rights.values_mut()) {
            let decayed = rule.tag().decay();
            rule.set_tag(decayed);
        }

        self.check_references()
    }

    // ========== Internal helpers ==========

    fn insert_symbol(
        &mut self,
        name: &str,
        tag: DecayTag,
        expected: Option<SymbolKind>,
    ) -> Result<()> {
        let kind = SymbolKind::of(name).ok_or_else(|| EngineError::InvalidSymbolName {
            name: name.to_string(),
            expected: expected.map_or("symbol", SymbolKind::as_str),
        })?;
        if let Some(expected) = expected {
            if kind != expected {
                return Err(EngineError::InvalidSymbolName {
                    name: name.to_string(),
                    expected: expected.as_str(),
                });
            }
        }
        let symbol = Symbol::new(name.to_string(), kind, tag);
        match kind {
            SymbolKind::Nonterminal => self.nonterminals.insert(name.to_string(), symbol),
            SymbolKind::Terminal => self.terminals.insert(name.to_string(), symbol),
        };
        Ok(())
    }

    fn symbol_mut(&mut self, name: &str) -> Result<&mut Symbol> {
        if let Some(symbol) = self.nonterminals.get_mut(name) {
            return Ok(symbol);
        }
        self.terminals
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownSymbol {
                name: name.to_string(),
            })
    }

    fn rule_mut(&mut self, key: &RuleKey) -> Result<&mut Rule> {
        self.rules
            .get_mut(&key.left)
            .and_then(|rights| rights.get_mut(&key.right))
            .ok_or_else(|| EngineError::UnknownRule {
                left: key.left.clone(),
                right: key.right.to_string(),
            })
    }

    fn require_nonterminal(&self, name: &str) -> Result<()> {
        match self.symbol(name) {
            Some(symbol) if symbol.is_nonterminal() => Ok(()),
            Some(_) => Err(EngineError::SymbolKind {
                name: name.to_string(),
                expected: SymbolKind::Nonterminal.as_str(),
            }),
            None => Err(EngineError::UnknownSymbol {
                name: name.to_string(),
            }),
        }
    }

    fn require_word(&self, word: &Word) -> Result<()> {
        match word.symbols().iter().find(|s| !self.contains_symbol(s)) {
            Some(missing) => Err(EngineError::UnknownSymbol {
                name: missing.clone(),
            }),
            None => Ok(()),
        }
    }

    fn check_references(&self) -> Result<()> {
        if !self.nonterminals.contains_key(&self.start) {
            return Err(EngineError::DanglingSymbol {
                symbol: self.start.clone(),
                used_by: "the start symbol".to_string(),
            });
        }
        for rule in self.rules.values().flat_map(BTreeMap::values) {
            let missing = std::iter::once(rule.left())
                .chain(rule.right().symbols().iter().map(String::as_str))
                .find(|name| !self.contains_symbol(name));
            if let Some(symbol) = missing {
                return Err(EngineError::DanglingSymbol {
                    symbol: symbol.to_string(),
                    used_by: format!("rule {}", rule),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_rule_grammar() -> Grammar {
        Grammar::from_plain(PlainGrammar {
            nonterminals: vec!["S".into()],
            terminals: vec!["a".into(), "b".into()],
            rules: [("S".to_string(), vec!["a".to_string(), "b".to_string()])]
                .into_iter()
                .collect(),
            start: "S".into(),
        })
        .expect("valid grammar")
    }

    #[test]
    fn test_remove_rule_is_deferred() {
        let mut g = two_rule_grammar();
        let key = RuleKey::new("S", Word::parse("a"));
        g.remove_rule(&key).unwrap();

        assert_eq!(g.rule_count(), 2);
        assert_eq!(g.rule(&key).map(Rule::tag), Some(DecayTag::Removed));

        g.finalize().unwrap();
        assert_eq!(g.rule_count(), 1);
        assert!(g.rule(&key).is_none());
        let remaining = g.rule(&RuleKey::new("S", Word::parse("b"))).unwrap();
        assert_eq!(remaining.tag(), DecayTag::None);
    }

    #[test]
    fn test_add_existing_rule_is_duplicate() {
        let mut g = two_rule_grammar();
        let key = g.add_rule("S", Word::parse("a")).unwrap();
        assert_eq!(g.rule(&key).unwrap().tag(), DecayTag::Duplicate);
        assert_eq!(g.rule_count(), 2);
    }

    #[test]
    fn test_add_rule_requires_known_symbols() {
        let mut g = two_rule_grammar();
        assert_eq!(
            g.add_rule("S", Word::parse("a X")),
            Err(EngineError::UnknownSymbol { name: "X".into() })
        );
        assert_eq!(
            g.add_rule("a", Word::parse("b")),
            Err(EngineError::SymbolKind {
                name: "a".into(),
                expected: "nonterminal"
            })
        );
    }

    #[test]
    fn test_replace_rule_tags() {
        let mut g = two_rule_grammar();
        let old = RuleKey::new("S", Word::parse("a"));
        let new = g.replace_rule(&old, Word::parse("a a")).unwrap();

        assert_eq!(g.rule(&old).unwrap().tag(), DecayTag::Removed);
        assert_eq!(g.rule(&new).unwrap().tag(), DecayTag::Replaced);

        g.finalize().unwrap();
        assert!(g.rule(&old).is_none());
        assert_eq!(g.rule(&new).unwrap().tag(), DecayTag::None);
    }

    #[test]
    fn test_new_nonterminal_avoids_conflicts() {
        let mut g = two_rule_grammar();
        assert_eq!(g.new_nonterminal("S").unwrap(), "S/0");
        assert_eq!(g.new_nonterminal("S").unwrap(), "S/0/0");
        assert_eq!(g.new_nonterminal("A").unwrap(), "A");
        assert_eq!(g.symbol("A").unwrap().tag(), DecayTag::New);
        assert!(g.new_nonterminal("a").is_err());
    }

    #[test]
    fn test_add_symbol_returns_existing_unchanged() {
        let mut g = two_rule_grammar();
        let symbol = g.add_symbol("a").unwrap();
        assert_eq!(symbol.tag(), DecayTag::None);
        assert_eq!(g.add_symbol("c").unwrap().tag(), DecayTag::New);
    }

    #[test]
    fn test_remove_symbol_without_rule_removal_dangles() {
        let mut g = two_rule_grammar();
        g.remove_symbol("a").unwrap();
        assert!(matches!(
            g.finalize(),
            Err(EngineError::DanglingSymbol { symbol, .. }) if symbol == "a"
        ));
    }

    #[test]
    fn test_remove_symbol_with_its_rules() {
        let mut g = two_rule_grammar();
        g.remove_symbol("a").unwrap();
        g.remove_rule(&RuleKey::new("S", Word::parse("a"))).unwrap();
        g.finalize().unwrap();
        assert!(!g.contains_symbol("a"));
        assert_eq!(g.terminal_count(), 1);
    }

    #[test]
    fn test_change_start_orders_traversal() {
        let mut g = two_rule_grammar();
        g.add_symbol("A").unwrap();
        g.add_rule("A", Word::parse("b")).unwrap();
        g.change_start("S").unwrap();
        let names: Vec<&str> = g.nonterminals().map(Symbol::name).collect();
        assert_eq!(names, vec!["S", "A"]);

        assert!(g.change_start("a").is_err());
        assert!(g.change_start("Q").is_err());
    }

    #[test]
    fn test_finalize_twice_keeps_fixed_points() {
        let mut g = two_rule_grammar();
        g.mark_symbol("S", DecayTag::AttentionPersistent).unwrap();
        g.mark_symbol("a", DecayTag::AttentionWillTransfer).unwrap();
        g.finalize().unwrap();
        let once = g.clone();
        g.finalize().unwrap();
        assert_eq!(g, once);
        assert_eq!(g.symbol("a").unwrap().tag(), DecayTag::AttentionWasSet);
    }

    #[test]
    fn test_clear_tags_keeps_removals() {
        let mut g = two_rule_grammar();
        let key = RuleKey::new("S", Word::parse("b"));
        g.remove_rule(&key).unwrap();
        g.mark_symbol("a", DecayTag::AttentionPersistent).unwrap();
        g.clear_tags();
        assert_eq!(g.rule(&key).unwrap().tag(), DecayTag::Removed);
        assert_eq!(g.symbol("a").unwrap().tag(), DecayTag::None);
    }

    #[test]
    fn test_data_round_trip() {
        let mut g = two_rule_grammar();
        g.add_rule("S", Word::epsilon()).unwrap();
        let data = g.to_data();
        assert_eq!(data.rules["S"]["eps"], DecayTag::New);
        assert_eq!(Grammar::from_data(&data).unwrap(), g);
    }
}
