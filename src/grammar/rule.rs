//! Words and production rules

use crate::constants::EPSILON;
use crate::decay::DecayTag;
use std::fmt;

/// A sequence of symbol names; the empty word is written `eps`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Word(Vec<String>);

impl Word {
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Word(symbols.into_iter().map(Into::into).collect())
    }

    pub fn epsilon() -> Self {
        Word(Vec::new())
    }

    /// Split on whitespace; `eps` (or blank text) is the empty word
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == EPSILON {
            return Word::epsilon();
        }
        Word::new(text.split_whitespace())
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.0.iter().any(|s| s == symbol)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str(EPSILON)
        } else {
            f.write_str(&self.0.join(" "))
        }
    }
}

/// Identifies a rule inside a grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub left: String,
    pub right: Word,
}

impl RuleKey {
    pub fn new(left: impl Into<String>, right: Word) -> Self {
        RuleKey {
            left: left.into(),
            right,
        }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.left, self.right)
    }
}

/// A production rule with its decay tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    key: RuleKey,
    tag: DecayTag,
}

impl Rule {
    pub(crate) fn new(key: RuleKey, tag: DecayTag) -> Self {
        Rule { key, tag }
    }

    pub fn key(&self) -> &RuleKey {
        &self.key
    }

    pub fn left(&self) -> &str {
        &self.key.left
    }

    pub fn right(&self) -> &Word {
        &self.key.right
    }

    pub fn tag(&self) -> DecayTag {
        self.tag
    }

    pub(crate) fn mark(&mut self, tag: DecayTag) -> DecayTag {
        self.tag = DecayTag::resolve(self.tag, tag);
        self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: DecayTag) {
        self.tag = tag;
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_parse() {
        assert_eq!(Word::parse("a B  c"), Word::new(["a", "B", "c"]));
        assert!(Word::parse("eps").is_empty());
        assert!(Word::parse("   ").is_empty());
    }

    #[test]
    fn test_word_display() {
        assert_eq!(Word::new(["A", "b"]).to_string(), "A b");
        assert_eq!(Word::epsilon().to_string(), "eps");
        assert_eq!(Word::parse(&Word::new(["x", "Y"]).to_string()), Word::new(["x", "Y"]));
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::new(RuleKey::new("S", Word::parse("a S")), DecayTag::None);
        assert_eq!(rule.to_string(), "S -> a S");
    }
}
