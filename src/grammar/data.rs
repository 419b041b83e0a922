//! Archived (plain data) grammar representation

use crate::decay::DecayTag;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Archived grammar: symbol name → tag maps and rules keyed by left side
///
/// ```json
/// { "N": { "S": "none" }, "T": { "a": "new" },
///   "P": { "S": { "a S": "none", "eps": "removed" } }, "S": "S" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarData {
    #[serde(rename = "N", default)]
    pub nonterminals: BTreeMap<String, DecayTag>,
    #[serde(rename = "T", default)]
    pub terminals: BTreeMap<String, DecayTag>,
    #[serde(rename = "P", default)]
    pub rules: BTreeMap<String, BTreeMap<String, DecayTag>>,
    #[serde(rename = "S")]
    pub start: String,
}

/// Untagged grammar input: plain symbol lists, every tag starts as `none`
///
/// ```json
/// { "N": ["S"], "T": ["a", "b"], "P": { "S": ["a", "b"] }, "S": "S" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainGrammar {
    #[serde(rename = "N", default)]
    pub nonterminals: Vec<String>,
    #[serde(rename = "T", default)]
    pub terminals: Vec<String>,
    #[serde(rename = "P", default)]
    pub rules: BTreeMap<String, Vec<String>>,
    #[serde(rename = "S")]
    pub start: String,
}

impl From<PlainGrammar> for GrammarData {
    fn from(plain: PlainGrammar) -> Self {
        let untagged = |names: Vec<String>| {
            names
                .into_iter()
                .map(|name| (name, DecayTag::None))
                .collect::<BTreeMap<_, _>>()
        };
        GrammarData {
            nonterminals: untagged(plain.nonterminals),
            terminals: untagged(plain.terminals),
            rules: plain
                .rules
                .into_iter()
                .map(|(left, rights)| (left, untagged(rights)))
                .collect(),
            start: plain.start,
        }
    }
}
