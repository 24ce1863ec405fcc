//! Forbidden behaviors
//!
//! Sources such as status effects ban behavior kinds on an entity. Each
//! source ("forbidder") keeps its own independent ban list; a kind is
//! forbidden while any forbidder lists it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::BehaviorKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenRegistry {
    by_forbidder: BTreeMap<String, BTreeSet<BehaviorKind>>,
}

impl ForbiddenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole ban list of `forbidder` with `kinds`
    pub fn forbid(&mut self, forbidder: &str, kinds: &[BehaviorKind]) {
        self.by_forbidder.remove(forbidder);
        if !kinds.is_empty() {
            self.by_forbidder
                .insert(forbidder.to_string(), kinds.iter().copied().collect());
        }
    }

    /// Lift `kinds` from the ban list of `forbidder` only
    pub fn allow(&mut self, forbidder: &str, kinds: &[BehaviorKind]) {
        if let Some(banned) = self.by_forbidder.get_mut(forbidder) {
            for kind in kinds {
                banned.remove(kind);
            }
            if banned.is_empty() {
                self.by_forbidder.remove(forbidder);
            }
        }
    }

    /// Drop everything `forbidder` banned
    pub fn allow_all_from(&mut self, forbidder: &str) {
        self.by_forbidder.remove(forbidder);
    }

    /// Drop every ban from every forbidder
    pub fn allow_all(&mut self) {
        self.by_forbidder.clear();
    }

    pub fn is_forbidden(&self, kind: BehaviorKind) -> bool {
        self.by_forbidder.values().any(|banned| banned.contains(&kind))
    }

    /// Forbidders currently banning `kind`
    pub fn forbidders_of(&self, kind: BehaviorKind) -> impl Iterator<Item = &str> + '_ {
        self.by_forbidder
            .iter()
            .filter(move |(_, banned)| banned.contains(&kind))
            .map(|(forbidder, _)| forbidder.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.by_forbidder.is_empty()
    }
}
