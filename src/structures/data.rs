//! Archived structure payloads

use crate::decay::DecayTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One archived structure-bag entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tag: DecayTag,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(flatten)]
    pub body: StructureBodyData,
}

fn default_priority() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructureBodyData {
    SymbolSet {
        set: Vec<String>,
        /// Emphasis on the set itself, separate from the entry's tag
        #[serde(default)]
        set_tag: DecayTag,
    },
    Table {
        rows: BTreeMap<String, String>,
        columns: BTreeMap<String, String>,
        cells: BTreeMap<String, BTreeMap<String, CellData>>,
    },
    SymbolMapping {
        pairs: Vec<(String, String)>,
    },
    Stack {
        items: Vec<String>,
    },
}

/// Archived table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    #[serde(default)]
    pub tag: DecayTag,
    pub set: Vec<String>,
}
