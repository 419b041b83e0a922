//! Constant symbol mappings (renaming tables shown next to the grammar)

/// Ordered list of `from → to` symbol pairs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolMapping {
    pairs: Vec<(String, String)>,
}

impl SymbolMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        SymbolMapping { pairs }
    }

    pub fn push(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.pairs.push((from.into(), to.into()));
    }

    /// Mapped value of the first pair starting at `from`
    pub fn get(&self, from: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(f, _)| f == from)
            .map(|(_, to)| to.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
