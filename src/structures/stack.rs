//! Parser stack

/// Stack of symbols (or automaton state ids); changes take effect immediately
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SymbolStack {
    items: Vec<String>,
}

impl SymbolStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<String>) -> Self {
        SymbolStack { items }
    }

    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.items.pop()
    }

    pub fn top(&self) -> Option<&str> {
        self.items.last().map(String::as_str)
    }

    /// Bottom to top
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
