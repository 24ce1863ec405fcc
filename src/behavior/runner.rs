//! Entity behavior runner
//!
//! Holds the behaviors of one entity and drives them each tick:
//!
//! - a behavior that claims an occupied slot evicts the occupant
//! - a finishing behavior frees its slot at once, so behaviors later in the
//!   same pass can claim it; it is pooled once the pass completes
//! - a paused, slotted behavior resumes as soon as its slot is free

use serde::{Deserialize, Serialize};

use super::{
    Behavior, BehaviorContext, BehaviorError, BehaviorId, BehaviorKind, BehaviorOwner,
    BehaviorParams, BehaviorPool, ForbiddenRegistry, SavedBehavior, Slot, SlotTable,
};

#[derive(Debug)]
struct Entry {
    id: BehaviorId,
    behavior: Box<dyn Behavior>,
    /// Finished or removed during the current pass
    removed: bool,
}

#[derive(Debug, Default)]
pub struct BehaviorRunner {
    entries: Vec<Entry>,
    slots: SlotTable,
    pool: BehaviorPool,
    forbidden: ForbiddenRegistry,
    next_id: u64,
}

/// One behavior as written to a save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRunnerEntry {
    pub behavior: SavedBehavior,
    /// Whether the behavior held its slot when saved
    pub holds_slot: bool,
}

/// Serialized form of a runner. The pool is not saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedRunner {
    pub behaviors: Vec<SavedRunnerEntry>,
    #[serde(default)]
    pub forbidden: ForbiddenRegistry,
}

impl BehaviorRunner {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Adding and removing
    // ========================================================================

    /// Whether a behavior of `kind` may currently be added
    pub fn can_perform(&self, kind: BehaviorKind) -> bool {
        !self.forbidden.is_forbidden(kind)
    }

    /// Create, initialize and start a behavior of `kind`.
    ///
    /// Returns `Ok(None)` when the kind is forbidden. The new behavior
    /// evicts whatever held its slot.
    pub fn add_behavior(
        &mut self,
        kind: BehaviorKind,
        owner: &BehaviorOwner<'_>,
        params: &BehaviorParams,
    ) -> Result<Option<BehaviorId>, BehaviorError> {
        let Some(behavior) = self.prepare(kind, owner, params)? else {
            return Ok(None);
        };
        Ok(Some(self.insert(behavior)))
    }

    /// Like [`add_behavior`](Self::add_behavior), but the behavior starts
    /// paused and waits for its slot to become free instead of evicting.
    pub fn enqueue_behavior(
        &mut self,
        kind: BehaviorKind,
        owner: &BehaviorOwner<'_>,
        params: &BehaviorParams,
    ) -> Result<Option<BehaviorId>, BehaviorError> {
        let Some(mut behavior) = self.prepare(kind, owner, params)? else {
            return Ok(None);
        };
        behavior.pause();
        Ok(Some(self.push(behavior)))
    }

    /// Start an already built behavior, evicting the occupant of its slot
    pub fn insert(&mut self, behavior: Box<dyn Behavior>) -> BehaviorId {
        let slot = behavior.slot();
        if let Some(previous) = self.slots.occupant(slot) {
            log::debug!("{} evicted from slot {:?}", self.kind_of(previous), slot);
            self.remove_behavior(previous);
        }
        let id = self.push(behavior);
        self.slots.claim(slot, id);
        id
    }

    fn prepare(
        &mut self,
        kind: BehaviorKind,
        owner: &BehaviorOwner<'_>,
        params: &BehaviorParams,
    ) -> Result<Option<Box<dyn Behavior>>, BehaviorError> {
        if !self.can_perform(kind) {
            log::debug!("{} may not perform {}", owner.internal_id, kind);
            return Ok(None);
        }
        let mut behavior = self.pool.obtain(kind);
        if let Err(err) = behavior.init(owner, params) {
            self.pool.retire(behavior);
            return Err(err);
        }
        Ok(Some(behavior))
    }

    fn push(&mut self, behavior: Box<dyn Behavior>) -> BehaviorId {
        let id = BehaviorId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            behavior,
            removed: false,
        });
        id
    }

    fn kind_of(&self, id: BehaviorId) -> String {
        self.get(id)
            .map(|behavior| behavior.kind().to_string())
            .unwrap_or_else(|| format!("{:?}", id))
    }

    /// Remove a behavior right away. Returns false if it is not in this runner.
    pub fn remove_behavior(&mut self, id: BehaviorId) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.id == id && !entry.removed)
        else {
            return false;
        };
        let mut entry = self.entries.remove(index);
        entry.behavior.on_remove();
        self.slots.release(entry.behavior.slot(), entry.id);
        self.pool.retire(entry.behavior);
        true
    }

    pub fn remove_all(&mut self) {
        self.remove_where(|_| true);
    }

    /// Remove every verb behavior, e.g. when the player issues a new command
    pub fn remove_all_verbs(&mut self) {
        self.remove_where(|behavior| behavior.is_verb());
    }

    fn remove_where(&mut self, mut predicate: impl FnMut(&dyn Behavior) -> bool) {
        let ids: Vec<BehaviorId> = self
            .entries
            .iter()
            .filter(|entry| !entry.removed && predicate(entry.behavior.as_ref()))
            .map(|entry| entry.id)
            .collect();
        for id in ids {
            self.remove_behavior(id);
        }
    }

    /// Pause every behavior. Unslotted ones resume on the next tick.
    pub fn pause_all(&mut self) {
        for entry in &mut self.entries {
            entry.behavior.pause();
        }
    }

    pub fn resume_all(&mut self) {
        for entry in &mut self.entries {
            entry.behavior.resume();
        }
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Advance every behavior by `delta` seconds
    pub fn tick(&mut self, ctx: &mut BehaviorContext<'_>, delta: f32) {
        // Newest first, so later additions win contention for freed slots
        for index in (0..self.entries.len()).rev() {
            let entry = &mut self.entries[index];
            if entry.removed {
                continue;
            }
            let slot = entry.behavior.slot();

            if !entry.behavior.is_paused() {
                entry.behavior.update(ctx, delta);
                if entry.behavior.is_finished() {
                    entry.behavior.on_remove();
                    entry.removed = true;
                    self.slots.release(slot, entry.id);
                }
            } else if !slot.is_exclusive() {
                // Nothing can hold the unslotted channel
                entry.behavior.resume();
            } else if self.slots.is_free(slot) {
                self.slots.claim(slot, entry.id);
                entry.behavior.resume();
            }
        }
        self.compact();
    }

    fn compact(&mut self) {
        let mut index = 0;
        while index < self.entries.len() {
            if self.entries[index].removed {
                let entry = self.entries.remove(index);
                self.pool.retire(entry.behavior);
            } else {
                index += 1;
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, id: BehaviorId) -> Option<&dyn Behavior> {
        self.entries
            .iter()
            .find(|entry| entry.id == id && !entry.removed)
            .map(|entry| entry.behavior.as_ref())
    }

    pub fn get_mut(&mut self, id: BehaviorId) -> Option<&mut (dyn Behavior + 'static)> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id && !entry.removed)
            .map(|entry| entry.behavior.as_mut())
    }

    /// Downcast helper for callers that know the concrete type
    pub fn get_as<T: 'static>(&self, id: BehaviorId) -> Option<&T> {
        self.get(id).and_then(|behavior| behavior.as_any().downcast_ref::<T>())
    }

    /// First behavior of the `kind` family
    pub fn get_active(&self, kind: BehaviorKind) -> Option<&dyn Behavior> {
        self.get_active_excluding(kind, |_| false)
    }

    /// First running behavior of the `kind` family for which `exclude` is
    /// false. Paused and finished behaviors are not considered.
    pub fn get_active_excluding(
        &self,
        kind: BehaviorKind,
        exclude: impl Fn(&dyn Behavior) -> bool,
    ) -> Option<&dyn Behavior> {
        self.iter().find(|behavior| {
            !behavior.is_paused()
                && !behavior.is_finished()
                && behavior.kind().is_a(kind)
                && !exclude(*behavior)
        })
    }

    /// Is any behavior of any of the given families running?
    pub fn has_active(&self, kinds: &[BehaviorKind]) -> bool {
        self.has_active_excluding(kinds, |_| false)
    }

    pub fn has_active_excluding(
        &self,
        kinds: &[BehaviorKind],
        exclude: impl Fn(&dyn Behavior) -> bool,
    ) -> bool {
        kinds
            .iter()
            .any(|kind| self.get_active_excluding(*kind, &exclude).is_some())
    }

    /// Whether any behavior keeps the combat turn from passing
    pub fn has_any_blocking(&self) -> bool {
        self.iter().any(|behavior| behavior.blocking_in_combat())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Behavior> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.removed)
            .map(|entry| entry.behavior.as_ref())
    }

    pub fn ids(&self) -> impl Iterator<Item = BehaviorId> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.removed)
            .map(|entry| entry.id)
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.removed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slot_occupant(&self, slot: Slot) -> Option<BehaviorId> {
        self.slots.occupant(slot)
    }

    pub fn pool(&self) -> &BehaviorPool {
        &self.pool
    }

    // ========================================================================
    // Forbidding
    // ========================================================================

    /// Replace the ban list of `forbidder`
    pub fn forbid(&mut self, forbidder: &str, kinds: &[BehaviorKind]) {
        self.forbidden.forbid(forbidder, kinds);
    }

    pub fn allow(&mut self, forbidder: &str, kinds: &[BehaviorKind]) {
        self.forbidden.allow(forbidder, kinds);
    }

    pub fn allow_all_from(&mut self, forbidder: &str) {
        self.forbidden.allow_all_from(forbidder);
    }

    pub fn allow_all(&mut self) {
        self.forbidden.allow_all();
    }

    pub fn forbidden(&self) -> &ForbiddenRegistry {
        &self.forbidden
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn to_saved(&self) -> SavedRunner {
        SavedRunner {
            behaviors: self
                .entries
                .iter()
                .filter(|entry| !entry.removed)
                .map(|entry| SavedRunnerEntry {
                    behavior: entry.behavior.to_saved(),
                    holds_slot: self.slots.holds(entry.id),
                })
                .collect(),
            forbidden: self.forbidden.clone(),
        }
    }

    pub fn from_saved(saved: SavedRunner) -> Self {
        let mut runner = Self {
            forbidden: saved.forbidden,
            ..Self::default()
        };
        for entry in saved.behaviors {
            let behavior = entry.behavior.into_behavior();
            let slot = behavior.slot();
            let id = runner.push(behavior);
            if entry.holds_slot {
                runner.slots.claim(slot, id);
            }
        }
        runner
    }
}
