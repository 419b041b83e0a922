//! Conversion to reduced normal form
//!
//! ```text
//! remove rules X -> X
//! remove non-generating nonterminals
//!     initialize S/0
//!     (repeat) S/i -> S/i+1
//!     remove nonterminals outside S
//! remove non-reachable nonterminals
//!     initialize H/0
//!     (repeat) H/i -> H/i+1
//!     remove nonterminals outside H
//! clean up
//! ```
//!
//! Removing a nonterminal also removes every rule that mentions it.

use crate::controller::{Controller, Program};
use crate::decay::DecayTag;
use crate::error::{EngineError, Result};
use crate::grammar::{Grammar, RuleKey};
use crate::snapshot::Snapshot;
use crate::structures::Structures;
use std::collections::BTreeSet;

const GENERATING: &str = "generating";
const REACHABLE: &str = "reachable";

pub fn program() -> Program {
    Program::new(main)
}

fn main(c: &mut Controller) -> Result<()> {
    c.set_name("convert to reduced normal form")?;
    c.schedule(Program::new(remove_self_loops))?;
    c.schedule(Program::new(remove_nongenerating))?;
    c.schedule(Program::new(remove_unreachable))?;
    c.schedule(Program::new(clean_up))?;
    Ok(())
}

fn remove_self_loops(c: &mut Controller) -> Result<()> {
    c.set_name("remove rules of type X -> X")?;
    let grammar = c.grammar_mut()?;
    let loops: Vec<RuleKey> = grammar
        .rules()
        .filter(|rule| rule.right().len() == 1 && rule.right().contains(rule.left()))
        .map(|rule| rule.key().clone())
        .collect();
    for key in &loops {
        grammar.remove_rule(key)?;
    }
    Ok(())
}

// ========== Generating nonterminals ==========

fn remove_nongenerating(c: &mut Controller) -> Result<()> {
    c.set_name("remove nonterminals that are not 'generating' - can't produce a terminal word")?;
    c.schedule(Program::new(init_generating))?;
    c.schedule(Program::new(generating_step))?;
    c.schedule(Program::new(remove_outside_generating))?;
    Ok(())
}

fn init_generating(c: &mut Controller) -> Result<()> {
    c.set_name("initialize 'generating' set construction")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;

    let terminals: Vec<String> = grammar.terminals().map(|t| t.name().to_string()).collect();
    for terminal in &terminals {
        grammar.mark_symbol(terminal, DecayTag::AttentionWasSet)?;
    }

    let terminal_rules: Vec<RuleKey> = grammar
        .rules()
        .filter(|rule| {
            rule.right()
                .symbols()
                .iter()
                .all(|symbol| !is_nonterminal(grammar, symbol))
        })
        .map(|rule| rule.key().clone())
        .collect();

    let set = structures.symbol_set(GENERATING, "S/0")?;
    for key in &terminal_rules {
        set.add(key.left.as_str());
        grammar.mark_rule(key, DecayTag::AttentionWasSet)?;
        grammar.mark_symbol(&key.left, DecayTag::AttentionWillTransfer)?;
    }
    Ok(())
}

fn generating_step(c: &mut Controller) -> Result<()> {
    c.set_name("iterate 'generating' set construction")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;
    bump_iteration(structures, GENERATING, "S")?;

    let set = structures.get_symbol_set_mut(GENERATING)?;
    let mut grown = Vec::new();
    for rule in grammar.rules() {
        let generating = rule
            .right()
            .symbols()
            .iter()
            .all(|symbol| !is_nonterminal(grammar, symbol) || set.contains(symbol));
        if generating && set.add(rule.left()) {
            grown.push(rule.left().to_string());
        }
    }
    for symbol in &grown {
        grammar.mark_symbol(symbol, DecayTag::AttentionWillTransfer)?;
    }

    if !grown.is_empty() {
        c.request_repeat()?;
    }
    Ok(())
}

fn remove_outside_generating(c: &mut Controller) -> Result<()> {
    c.set_name("remove other nonterminals")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;
    rename(structures, GENERATING, "S");

    let set = structures.get_symbol_set(GENERATING)?;
    let start = grammar.start().to_string();
    let doomed: BTreeSet<String> = grammar
        .nonterminals()
        .map(|n| n.name().to_string())
        .filter(|name| !set.contains(name) && *name != start)
        .collect();
    remove_nonterminals(grammar, &doomed)
}

// ========== Reachable nonterminals ==========

fn remove_unreachable(c: &mut Controller) -> Result<()> {
    c.set_name("remove non-reachable nonterminals")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;
    grammar.clear_tags();
    structures.remove(GENERATING)?;

    c.schedule(Program::new(init_reachable))?;
    c.schedule(Program::new(reachable_step))?;
    c.schedule(Program::new(remove_outside_reachable))?;
    Ok(())
}

fn init_reachable(c: &mut Controller) -> Result<()> {
    c.set_name("initialize 'reachable' set construction")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;
    let start = grammar.start().to_string();
    structures.symbol_set(REACHABLE, "H/0")?.add(start.as_str());
    grammar.mark_symbol(&start, DecayTag::AttentionWillTransfer)?;
    Ok(())
}

fn reachable_step(c: &mut Controller) -> Result<()> {
    c.set_name("iterate 'reachable' set construction")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;
    bump_iteration(structures, REACHABLE, "H")?;

    let set = structures.get_symbol_set_mut(REACHABLE)?;
    let mut grown = Vec::new();
    for rule in grammar.rules() {
        if !set.contains(rule.left()) {
            continue;
        }
        for symbol in rule.right().symbols() {
            if is_nonterminal(grammar, symbol) && set.add(symbol.as_str()) {
                grown.push(symbol.clone());
            }
        }
    }
    for symbol in &grown {
        grammar.mark_symbol(symbol, DecayTag::AttentionWillTransfer)?;
    }

    if !grown.is_empty() {
        c.request_repeat()?;
    }
    Ok(())
}

fn remove_outside_reachable(c: &mut Controller) -> Result<()> {
    c.set_name("remove other nonterminals")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;
    rename(structures, REACHABLE, "H");

    let set = structures.get_symbol_set(REACHABLE)?;
    let doomed: BTreeSet<String> = grammar
        .nonterminals()
        .map(|n| n.name().to_string())
        .filter(|name| !set.contains(name))
        .collect();
    remove_nonterminals(grammar, &doomed)
}

fn clean_up(c: &mut Controller) -> Result<()> {
    c.set_name("done")?;
    let Snapshot {
        grammar,
        structures,
    } = c.snapshot_mut()?;
    grammar.clear_tags();
    structures.remove(REACHABLE)?;
    Ok(())
}

// ========== Helpers ==========

fn is_nonterminal(grammar: &Grammar, symbol: &str) -> bool {
    grammar
        .symbol(symbol)
        .is_some_and(|symbol| symbol.is_nonterminal())
}

/// Remove `doomed` nonterminals together with every rule mentioning one
fn remove_nonterminals(grammar: &mut Grammar, doomed: &BTreeSet<String>) -> Result<()> {
    let rules: Vec<RuleKey> = grammar
        .rules()
        .filter(|rule| {
            doomed.contains(rule.left())
                || rule.right().symbols().iter().any(|s| doomed.contains(s))
        })
        .map(|rule| rule.key().clone())
        .collect();
    for key in &rules {
        grammar.remove_rule(key)?;
    }
    for name in doomed {
        grammar.remove_symbol(name)?;
    }
    Ok(())
}

/// `S/3` becomes `S/4`
fn bump_iteration(structures: &mut Structures, id: &str, prefix: &str) -> Result<()> {
    let structure = structures
        .get_mut(id)
        .ok_or_else(|| EngineError::UnknownStructure { id: id.to_string() })?;
    let iteration = structure
        .name()
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|n| n.parse::<u32>().ok())
        .unwrap_or(0);
    structure.set_name(format!("{}/{}", prefix, iteration + 1));
    Ok(())
}

fn rename(structures: &mut Structures, id: &str, name: &str) {
    if let Some(structure) = structures.get_mut(id) {
        structure.set_name(name);
    }
}

/// True when every nonterminal is generating (the start symbol may be the
/// exception) and reachable, and no `X -> X` rule exists
pub fn check(grammar: &Grammar) -> bool {
    if grammar
        .rules()
        .any(|rule| rule.right().len() == 1 && rule.right().contains(rule.left()))
    {
        return false;
    }

    let mut generating = BTreeSet::new();
    loop {
        let before = generating.len();
        for rule in grammar.rules() {
            if rule
                .right()
                .symbols()
                .iter()
                .all(|s| !is_nonterminal(grammar, s) || generating.contains(s.as_str()))
            {
                generating.insert(rule.left());
            }
        }
        if generating.len() == before {
            break;
        }
    }
    let count = grammar.nonterminal_count();
    let all_generating = generating.len() == count
        || (generating.len() + 1 == count && !generating.contains(grammar.start()));
    if !all_generating {
        return false;
    }

    let mut reachable = BTreeSet::from([grammar.start()]);
    loop {
        let before = reachable.len();
        for rule in grammar.rules() {
            if reachable.contains(rule.left()) {
                reachable.extend(
                    rule.right()
                        .symbols()
                        .iter()
                        .filter(|s| is_nonterminal(grammar, s))
                        .map(String::as_str),
                );
            }
        }
        if reachable.len() == before {
            break;
        }
    }
    reachable.len() == count
}
