//! Decay tags
//!
//! Every mutable entity in a snapshot (grammar symbols, rules, structures)
//! carries a [`DecayTag`]. The tag drives visual emphasis and fades across step
//! boundaries according to its [`Decay`] behavior:
//!
//! ```text
//! Vanish    tag  →  None
//! Persist   tag  →  tag
//! Transfer  tag  →  next tag in DecayTag::ALL
//! ```
//!
//! Tags are never overwritten directly. [`DecayTag::resolve`] decides which of
//! the current tag and a candidate survives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a tag changes at a step boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decay {
    Vanish,
    Persist,
    Transfer,
}

/// Emphasis marker carried by every taggable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayTag {
    #[default]
    None,
    New,
    Duplicate,
    Removed,
    Replaced,
    AttentionNow,
    AttentionPersistent,
    AttentionWillTransfer,
    AttentionWasSet,
    SpecialPersistent,
    SpecialTemporary,
}

impl DecayTag {
    /// All tags in enumeration order (the order `Transfer` walks)
    pub const ALL: [DecayTag; 11] = [
        DecayTag::None,
        DecayTag::New,
        DecayTag::Duplicate,
        DecayTag::Removed,
        DecayTag::Replaced,
        DecayTag::AttentionNow,
        DecayTag::AttentionPersistent,
        DecayTag::AttentionWillTransfer,
        DecayTag::AttentionWasSet,
        DecayTag::SpecialPersistent,
        DecayTag::SpecialTemporary,
    ];

    pub fn behavior(self) -> Decay {
        match self {
            DecayTag::None
            | DecayTag::AttentionPersistent
            | DecayTag::AttentionWasSet
            | DecayTag::SpecialPersistent => Decay::Persist,
            DecayTag::AttentionWillTransfer => Decay::Transfer,
            DecayTag::New
            | DecayTag::Duplicate
            | DecayTag::Removed
            | DecayTag::Replaced
            | DecayTag::AttentionNow
            | DecayTag::SpecialTemporary => Decay::Vanish,
        }
    }

    /// Position in [`DecayTag::ALL`]
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<DecayTag> {
        DecayTag::ALL.get(index as usize).copied()
    }

    /// The tag this one turns into after a step boundary
    pub fn decay(self) -> DecayTag {
        match self.behavior() {
            Decay::Vanish => DecayTag::None,
            Decay::Persist => self,
            // the last tag has nowhere to transfer to
            Decay::Transfer => DecayTag::from_index(self.index() + 1).unwrap_or(DecayTag::None),
        }
    }

    /// Pick the tag that stays when `candidate` is assigned over `old`
    ///
    /// `Removed` is sticky, a `None` candidate clears anything else, and `New`
    /// only yields to `Replaced` or `AttentionWillTransfer`.
    pub fn resolve(old: DecayTag, candidate: DecayTag) -> DecayTag {
        if old == DecayTag::Removed {
            return old;
        }
        if candidate == DecayTag::None {
            return candidate;
        }
        if old == DecayTag::New
            && candidate != DecayTag::Replaced
            && candidate != DecayTag::AttentionWillTransfer
        {
            return old;
        }
        candidate
    }

    /// Human readable meaning of the tag
    pub fn description(self) -> &'static str {
        match self {
            DecayTag::None => "",
            DecayTag::New => "entity was created in this step",
            DecayTag::Duplicate => {
                "entity would be added in this step, but was already present"
            }
            DecayTag::Removed => "entity was removed in this step",
            DecayTag::Replaced => "entity was changed in this step",
            DecayTag::AttentionNow
            | DecayTag::AttentionWillTransfer => "entity was marked important in this step",
            DecayTag::AttentionPersistent => "entity was marked important",
            DecayTag::AttentionWasSet => "entity was marked important in some previous step",
            DecayTag::SpecialPersistent | DecayTag::SpecialTemporary => {
                "there is something special about the entity"
            }
        }
    }

    pub fn is_none(self) -> bool {
        self == DecayTag::None
    }
}

impl fmt::Display for DecayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DecayTag::None => "none",
            DecayTag::New => "new",
            DecayTag::Duplicate => "duplicate",
            DecayTag::Removed => "removed",
            DecayTag::Replaced => "replaced",
            DecayTag::AttentionNow => "attention-now",
            DecayTag::AttentionPersistent => "attention-persistent",
            DecayTag::AttentionWillTransfer => "attention-will-transfer",
            DecayTag::AttentionWasSet => "attention-was-set",
            DecayTag::SpecialPersistent => "special-persistent",
            DecayTag::SpecialTemporary => "special-temporary",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_behaviors() {
        assert_eq!(DecayTag::New.decay(), DecayTag::None);
        assert_eq!(DecayTag::Removed.decay(), DecayTag::None);
        assert_eq!(DecayTag::SpecialTemporary.decay(), DecayTag::None);
        assert_eq!(DecayTag::None.decay(), DecayTag::None);
        assert_eq!(DecayTag::AttentionPersistent.decay(), DecayTag::AttentionPersistent);
        assert_eq!(DecayTag::SpecialPersistent.decay(), DecayTag::SpecialPersistent);
        assert_eq!(DecayTag::AttentionWillTransfer.decay(), DecayTag::AttentionWasSet);
        assert_eq!(DecayTag::AttentionWasSet.decay(), DecayTag::AttentionWasSet);
    }

    #[test]
    fn test_decay_reaches_fixed_point() {
        for tag in DecayTag::ALL {
            let once = tag.decay();
            assert_eq!(once.decay(), once, "{} is not stable after one decay", tag);
        }
    }

    #[test]
    fn test_removed_is_sticky() {
        for candidate in DecayTag::ALL {
            assert_eq!(DecayTag::resolve(DecayTag::Removed, candidate), DecayTag::Removed);
        }
    }

    #[test]
    fn test_none_candidate_wins() {
        for old in DecayTag::ALL.into_iter().filter(|t| *t != DecayTag::Removed) {
            assert_eq!(DecayTag::resolve(old, DecayTag::None), DecayTag::None);
        }
    }

    #[test]
    fn test_new_resists_replacement() {
        assert_eq!(DecayTag::resolve(DecayTag::New, DecayTag::Replaced), DecayTag::Replaced);
        assert_eq!(
            DecayTag::resolve(DecayTag::New, DecayTag::AttentionWillTransfer),
            DecayTag::AttentionWillTransfer
        );
        for candidate in [
            DecayTag::New,
            DecayTag::Duplicate,
            DecayTag::AttentionNow,
            DecayTag::AttentionPersistent,
            DecayTag::AttentionWasSet,
            DecayTag::SpecialPersistent,
            DecayTag::SpecialTemporary,
        ] {
            assert_eq!(DecayTag::resolve(DecayTag::New, candidate), DecayTag::New);
        }
    }

    #[test]
    fn test_candidate_wins_otherwise() {
        assert_eq!(
            DecayTag::resolve(DecayTag::Duplicate, DecayTag::AttentionNow),
            DecayTag::AttentionNow
        );
        assert_eq!(DecayTag::resolve(DecayTag::None, DecayTag::Removed), DecayTag::Removed);
    }

    #[test]
    fn test_index_round_trip() {
        for tag in DecayTag::ALL {
            assert_eq!(DecayTag::from_index(tag.index()), Some(tag));
        }
        assert_eq!(DecayTag::from_index(11), None);
    }
}
