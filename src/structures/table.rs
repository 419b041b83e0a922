//! Tables of symbol sets (FIRST/FOLLOW tables, LL parse tables, ...)

use super::set::SymbolSet;
use std::collections::BTreeMap;

/// Rows × columns grid of [`SymbolSet`] cells
///
/// Rows and columns are addressed by id and carry a display name. Every
/// (row, column) pair always has a cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub(crate) rows: BTreeMap<String, String>,
    pub(crate) columns: BTreeMap<String, String>,
    pub(crate) cells: BTreeMap<String, BTreeMap<String, SymbolSet>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row with an empty cell per column; existing rows are left alone
    pub fn add_row(&mut self, id: &str, name: &str) -> &mut Self {
        if self.rows.contains_key(id) {
            return self;
        }
        self.rows.insert(id.to_string(), name.to_string());
        let row = self
            .columns
            .keys()
            .map(|column| (column.clone(), SymbolSet::new()))
            .collect();
        self.cells.insert(id.to_string(), row);
        self
    }

    pub fn remove_row(&mut self, id: &str) -> &mut Self {
        self.rows.remove(id);
        self.cells.remove(id);
        self
    }

    /// Add a column with an empty cell per row; existing columns are left alone
    pub fn add_column(&mut self, id: &str, name: &str) -> &mut Self {
        if self.columns.contains_key(id) {
            return self;
        }
        self.columns.insert(id.to_string(), name.to_string());
        for row in self.cells.values_mut() {
            row.insert(id.to_string(), SymbolSet::new());
        }
        self
    }

    pub fn remove_column(&mut self, id: &str) -> &mut Self {
        self.columns.remove(id);
        for row in self.cells.values_mut() {
            row.remove(id);
        }
        self
    }

    pub fn cell(&self, row: &str, column: &str) -> Option<&SymbolSet> {
        self.cells.get(row)?.get(column)
    }

    pub fn cell_mut(&mut self, row: &str, column: &str) -> Option<&mut SymbolSet> {
        self.cells.get_mut(row)?.get_mut(column)
    }

    /// (id, name) pairs
    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rows.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
    }

    pub(crate) fn finalize(&mut self) {
        for cell in self.cells.values_mut().flat_map(|row| row.values_mut()) {
            cell.finalize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_columns_keep_cells_complete() {
        let mut table = Table::new();
        table.add_row("S", "S").add_column("a", "a");
        table.add_row("A", "A").add_column("b", "b");

        for row in ["S", "A"] {
            for column in ["a", "b"] {
                assert!(table.cell(row, column).is_some(), "missing {} {}", row, column);
            }
        }

        table.remove_column("a");
        assert!(table.cell("S", "a").is_none());
        assert_eq!(table.columns().count(), 1);
    }

    #[test]
    fn test_cells_follow_set_semantics() {
        let mut table = Table::new();
        table.add_row("S", "S").add_column("a", "a");
        let cell = table.cell_mut("S", "a").unwrap();
        cell.add("S -> a");
        assert!(table.cell("S", "a").unwrap().is_empty());
        table.finalize();
        assert!(table.cell("S", "a").unwrap().contains("S -> a"));
    }
}
