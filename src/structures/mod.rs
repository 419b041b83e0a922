//! Structure bag
//!
//! The second half of a snapshot: auxiliary objects a procedure builds next to
//! the grammar, keyed by a string id chosen by the procedure.
//! - [`set`]: [`SymbolSet`] with proposed/effective membership
//! - [`table`]: [`Table`] of symbol-set cells
//! - [`mapping`]: constant [`SymbolMapping`]
//! - [`stack`]: [`SymbolStack`] for parser runs
//! - [`data`]: archived payloads ([`StructureData`])
//!
//! Unlike grammar entities, removing a structure from the bag takes effect
//! immediately.

pub mod data;
pub mod mapping;
pub mod set;
pub mod stack;
pub mod table;

pub use data::{CellData, StructureBodyData, StructureData};
pub use mapping::SymbolMapping;
pub use set::SymbolSet;
pub use stack::SymbolStack;
pub use table::Table;

use crate::constants::EPSILON;
use crate::decay::DecayTag;
use crate::error::{EngineError, Result};
use crate::grammar::Grammar;
use std::collections::BTreeMap;

/// Which kind of object a structure holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureKind {
    SymbolSet,
    Table,
    SymbolMapping,
    Stack,
}

impl StructureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StructureKind::SymbolSet => "symbol set",
            StructureKind::Table => "table",
            StructureKind::SymbolMapping => "symbol mapping",
            StructureKind::Stack => "stack",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureBody {
    SymbolSet(SymbolSet),
    Table(Table),
    SymbolMapping(SymbolMapping),
    Stack(SymbolStack),
}

impl StructureBody {
    pub fn kind(&self) -> StructureKind {
        match self {
            StructureBody::SymbolSet(_) => StructureKind::SymbolSet,
            StructureBody::Table(_) => StructureKind::Table,
            StructureBody::SymbolMapping(_) => StructureKind::SymbolMapping,
            StructureBody::Stack(_) => StructureKind::Stack,
        }
    }

    fn empty(kind: StructureKind) -> Self {
        match kind {
            StructureKind::SymbolSet => StructureBody::SymbolSet(SymbolSet::new()),
            StructureKind::Table => StructureBody::Table(Table::new()),
            StructureKind::SymbolMapping => StructureBody::SymbolMapping(SymbolMapping::new()),
            StructureKind::Stack => StructureBody::Stack(SymbolStack::new()),
        }
    }
}

/// One entry of the bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    id: String,
    name: String,
    tag: DecayTag,
    /// Lower is displayed first; the grammar itself sits at 0
    priority: i32,
    body: StructureBody,
}

impl Structure {
    fn new(id: &str, name: &str, body: StructureBody) -> Self {
        Structure {
            id: id.to_string(),
            name: name.to_string(),
            tag: DecayTag::None,
            priority: 1,
            body,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn tag(&self) -> DecayTag {
        self.tag
    }

    pub fn mark(&mut self, tag: DecayTag) -> DecayTag {
        self.tag = DecayTag::resolve(self.tag, tag);
        self.tag
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub fn body(&self) -> &StructureBody {
        &self.body
    }

    pub fn kind(&self) -> StructureKind {
        self.body.kind()
    }

    fn finalize(&mut self) {
        self.tag = self.tag.decay();
        match &mut self.body {
            StructureBody::SymbolSet(set) => set.finalize(),
            StructureBody::Table(table) => table.finalize(),
            StructureBody::SymbolMapping(_) | StructureBody::Stack(_) => {}
        }
    }

    fn to_data(&self) -> StructureData {
        let body = match &self.body {
            StructureBody::SymbolSet(set) => StructureBodyData::SymbolSet {
                set: set.pending().map(str::to_string).collect(),
                set_tag: set.tag(),
            },
            StructureBody::Table(table) => StructureBodyData::Table {
                rows: table.rows.clone(),
                columns: table.columns.clone(),
                cells: table
                    .cells
                    .iter()
                    .map(|(row, cells)| {
                        let cells = cells
                            .iter()
                            .map(|(column, cell)| {
                                let data = CellData {
                                    tag: cell.tag(),
                                    set: cell.pending().map(str::to_string).collect(),
                                };
                                (column.clone(), data)
                            })
                            .collect();
                        (row.clone(), cells)
                    })
                    .collect(),
            },
            StructureBody::SymbolMapping(mapping) => StructureBodyData::SymbolMapping {
                pairs: mapping.pairs().to_vec(),
            },
            StructureBody::Stack(stack) => StructureBodyData::Stack {
                items: stack.items().to_vec(),
            },
        };
        StructureData {
            id: self.id.clone(),
            name: self.name.clone(),
            tag: self.tag,
            priority: self.priority,
            body,
        }
    }

    /// Symbol-set members must exist in `grammar` (or be the empty word);
    /// table cells hold free-form entries
    fn from_data(data: &StructureData, grammar: &Grammar) -> Result<Self> {
        let body = match &data.body {
            StructureBodyData::SymbolSet { set, set_tag } => {
                if let Some(unknown) = set
                    .iter()
                    .find(|item| *item != EPSILON && !grammar.contains_symbol(item))
                {
                    return Err(EngineError::InvalidData {
                        message: format!(
                            "symbol set '{}' contains unknown symbol '{}'",
                            data.id, unknown
                        ),
                    });
                }
                StructureBody::SymbolSet(SymbolSet::restore(set.iter().cloned(), *set_tag))
            }
            StructureBodyData::Table {
                rows,
                columns,
                cells,
            } => {
                let mut table = Table {
                    rows: rows.clone(),
                    columns: columns.clone(),
                    cells: BTreeMap::new(),
                };
                for row in rows.keys() {
                    let mut restored = BTreeMap::new();
                    for column in columns.keys() {
                        let cell = cells
                            .get(row)
                            .and_then(|r| r.get(column))
                            .map(|cell| SymbolSet::restore(cell.set.iter().cloned(), cell.tag))
                            .unwrap_or_default();
                        restored.insert(column.clone(), cell);
                    }
                    table.cells.insert(row.clone(), restored);
                }
                StructureBody::Table(table)
            }
            StructureBodyData::SymbolMapping { pairs } => {
                StructureBody::SymbolMapping(SymbolMapping::from_pairs(pairs.clone()))
            }
            StructureBodyData::Stack { items } => {
                StructureBody::Stack(SymbolStack::from_items(items.clone()))
            }
        };
        Ok(Structure {
            id: data.id.clone(),
            name: data.name.clone(),
            tag: data.tag,
            priority: data.priority,
            body,
        })
    }
}

/// String-keyed collection of structures
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Structures {
    entries: BTreeMap<String, Structure>,
}

macro_rules! typed_access {
    ($create:ident, $get:ident, $get_mut:ident, $variant:ident, $ty:ty) => {
        /// Fetch the entry under `id`, creating an empty one named `name` if absent
        pub fn $create(&mut self, id: &str, name: &str) -> Result<&mut $ty> {
            match &mut self.entry(id, name, StructureKind::$variant)?.body {
                StructureBody::$variant(inner) => Ok(inner),
                other => Err(kind_error(id, StructureKind::$variant, other.kind())),
            }
        }

        pub fn $get(&self, id: &str) -> Result<&$ty> {
            match &self.require(id)?.body {
                StructureBody::$variant(inner) => Ok(inner),
                other => Err(kind_error(id, StructureKind::$variant, other.kind())),
            }
        }

        pub fn $get_mut(&mut self, id: &str) -> Result<&mut $ty> {
            match &mut self.require_mut(id)?.body {
                StructureBody::$variant(inner) => Ok(inner),
                other => Err(kind_error(id, StructureKind::$variant, other.kind())),
            }
        }
    };
}

impl Structures {
    pub fn new() -> Self {
        Self::default()
    }

    typed_access!(symbol_set, get_symbol_set, get_symbol_set_mut, SymbolSet, SymbolSet);
    typed_access!(table, get_table, get_table_mut, Table, Table);
    typed_access!(mapping, get_mapping, get_mapping_mut, SymbolMapping, SymbolMapping);
    typed_access!(stack, get_stack, get_stack_mut, Stack, SymbolStack);

    pub fn get(&self, id: &str) -> Option<&Structure> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Structure> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Remove an entry right away
    pub fn remove(&mut self, id: &str) -> Result<Structure> {
        self.entries
            .remove(id)
            .ok_or_else(|| EngineError::UnknownStructure { id: id.to_string() })
    }

    /// Entries in display order (priority, then id)
    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        let mut entries: Vec<&Structure> = self.entries.values().collect();
        entries.sort_by_key(|s| s.priority);
        entries.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Archived payloads keyed by structure id
    pub fn to_data(&self) -> BTreeMap<String, StructureData> {
        self.entries
            .iter()
            .map(|(id, structure)| (id.clone(), structure.to_data()))
            .collect()
    }

    pub fn from_data(data: &BTreeMap<String, StructureData>, grammar: &Grammar) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for (id, structure) in data {
            entries.insert(id.clone(), Structure::from_data(structure, grammar)?);
        }
        Ok(Structures { entries })
    }

    /// Decay every tag and commit proposed set membership
    pub fn finalize(&mut self) {
        for structure in self.entries.values_mut() {
            structure.finalize();
        }
    }

    fn entry(&mut self, id: &str, name: &str, kind: StructureKind) -> Result<&mut Structure> {
        let structure = self
            .entries
            .entry(id.to_string())
            .or_insert_with(|| Structure::new(id, name, StructureBody::empty(kind)));
        if structure.kind() != kind {
            return Err(kind_error(id, kind, structure.kind()));
        }
        Ok(structure)
    }

    fn require(&self, id: &str) -> Result<&Structure> {
        self.entries
            .get(id)
            .ok_or_else(|| EngineError::UnknownStructure { id: id.to_string() })
    }

    fn require_mut(&mut self, id: &str) -> Result<&mut Structure> {
        self.entries
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownStructure { id: id.to_string() })
    }
}

fn kind_error(id: &str, expected: StructureKind, found: StructureKind) -> EngineError {
    EngineError::StructureKind {
        id: id.to_string(),
        expected: expected.as_str(),
        found: found.as_str(),
    }
}
