// Snapshot management for step replay

use crate::error::Result;
use crate::grammar::{Grammar, GrammarData};
use crate::structures::{StructureData, Structures};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Live state a step operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub grammar: Grammar,
    pub structures: Structures,
}

impl Snapshot {
    pub fn new(grammar: Grammar) -> Self {
        Snapshot {
            grammar,
            structures: Structures::new(),
        }
    }

    /// Plain-data copy, tags exactly as they are now
    pub fn to_data(&self) -> SnapshotData {
        SnapshotData {
            grammar: self.grammar.to_data(),
            structures: self.structures.to_data(),
        }
    }

    /// Apply deferred removals and decay every tag
    pub fn finalize(&mut self) -> Result<()> {
        self.grammar.finalize()?;
        self.structures.finalize();
        Ok(())
    }

    /// Finalize and convert to plain data; the live objects are consumed
    pub fn archive(mut self) -> Result<SnapshotData> {
        self.finalize()?;
        Ok(self.to_data())
    }
}

/// Archived state: serializable, no live objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub grammar: GrammarData,
    #[serde(default)]
    pub structures: BTreeMap<String, StructureData>,
}

impl SnapshotData {
    /// Rebuild live objects; structures are resolved against the grammar
    pub fn materialize(&self) -> Result<Snapshot> {
        let grammar = Grammar::from_data(&self.grammar)?;
        let structures = Structures::from_data(&self.structures, &grammar)?;
        Ok(Snapshot {
            grammar,
            structures,
        })
    }
}

/// State held by a timeline node: live while it runs, archived otherwise
#[derive(Debug, Clone)]
pub enum SnapshotState {
    /// Not yet handed over by the predecessor
    Pending,
    Live(Snapshot),
    Archived(SnapshotData),
}

impl SnapshotState {
    /// Turn archived data into live objects in place, then borrow them
    pub fn materialize(&mut self) -> Result<Option<&mut Snapshot>> {
        if let SnapshotState::Archived(data) = self {
            *self = SnapshotState::Live(data.materialize()?);
        }
        match self {
            SnapshotState::Live(snapshot) => Ok(Some(snapshot)),
            _ => Ok(None),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SnapshotState::Live(_))
    }

    pub fn archived(&self) -> Option<&SnapshotData> {
        match self {
            SnapshotState::Archived(data) => Some(data),
            _ => None,
        }
    }
}
