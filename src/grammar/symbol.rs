//! Grammar symbols and their naming rules

use crate::constants::EPSILON;
use crate::decay::DecayTag;
use std::fmt;

/// Characters allowed in symbol names besides ASCII letters and digits
const SYMBOL_PUNCTUATION: &str = "~!@#_';:+-*/()[]?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

impl SymbolKind {
    /// Classify a symbol name (None if the text is not a valid symbol)
    ///
    /// Nonterminals start with an uppercase letter, everything else that is
    /// made of allowed characters is a terminal. The empty word text is reserved.
    pub fn of(name: &str) -> Option<SymbolKind> {
        let first = name.chars().next()?;
        if name == EPSILON || !name.chars().all(is_symbol_char) {
            return None;
        }
        if first.is_ascii_uppercase() {
            Some(SymbolKind::Nonterminal)
        } else {
            Some(SymbolKind::Terminal)
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Terminal => "terminal",
            SymbolKind::Nonterminal => "nonterminal",
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || SYMBOL_PUNCTUATION.contains(c)
}

/// A terminal or nonterminal together with its decay tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
    tag: DecayTag,
}

impl Symbol {
    pub(crate) fn new(name: String, kind: SymbolKind, tag: DecayTag) -> Self {
        Symbol { name, kind, tag }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_nonterminal(&self) -> bool {
        self.kind == SymbolKind::Nonterminal
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    pub fn tag(&self) -> DecayTag {
        self.tag
    }

    /// Assign a tag through [`DecayTag::resolve`], returning the surviving tag
    pub(crate) fn mark(&mut self, tag: DecayTag) -> DecayTag {
        self.tag = DecayTag::resolve(self.tag, tag);
        self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: DecayTag) {
        self.tag = tag;
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_classification() {
        assert_eq!(SymbolKind::of("S"), Some(SymbolKind::Nonterminal));
        assert_eq!(SymbolKind::of("Expr/0"), Some(SymbolKind::Nonterminal));
        assert_eq!(SymbolKind::of("a"), Some(SymbolKind::Terminal));
        assert_eq!(SymbolKind::of("+"), Some(SymbolKind::Terminal));
        assert_eq!(SymbolKind::of("id"), Some(SymbolKind::Terminal));
    }

    #[test]
    fn test_invalid_symbol_names() {
        assert_eq!(SymbolKind::of(""), None);
        assert_eq!(SymbolKind::of("eps"), None);
        assert_eq!(SymbolKind::of("A B"), None);
        assert_eq!(SymbolKind::of("a$"), None);
    }
}
