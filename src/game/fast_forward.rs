//! Fast-forwarding
//!
//! A session compresses a span of game hours (resting, travelling) into a few
//! real seconds. It ends in exactly one of: finished, cancelled, interrupted
//! or ambushed. The session and its callback are consumed when it ends, so
//! no outcome can fire twice.

use rand::Rng;

use super::state::{Simulation, TickPhase};
use crate::combat::CombatSystem;
use crate::ui::{MessageCategory, Ui};
use crate::world::EncounterGroup;

/// Why a session is being interrupted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    Ambush,
    /// Raised by game scripts, e.g. a visitor wakes the party
    Scripted,
}

/// The callback's answer to an interruption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptDecision {
    /// Stop fast-forwarding
    Accept,
    /// Keep going
    Decline,
}

/// Result of asking a session to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// There was no session
    NotRunning,
    /// The callback declined, the session goes on
    Continued,
    /// The session has ended
    Cancelled,
}

/// How the last session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FastForwardOutcome {
    Finished,
    Cancelled,
    Interrupted(InterruptReason),
    /// Ended by an encounter on a world map, without a callback
    Ambushed,
}

/// Notified when a session ends
pub trait FastForwardCallback {
    fn on_finished(&mut self);
    fn on_cancelled(&mut self, hours_passed: f32);
    fn on_interrupted(&mut self, reason: InterruptReason, hours_passed: f32) -> InterruptDecision;
}

/// What to fast-forward
#[derive(Debug, Clone, PartialEq)]
pub struct FastForwardRequest {
    /// Shown on the progress indicator
    pub label: String,
    pub hours: f32,
    pub allow_random_encounter: bool,
}

impl FastForwardRequest {
    pub fn new(label: impl Into<String>, hours: f32) -> Self {
        Self {
            label: label.into(),
            hours,
            allow_random_encounter: false,
        }
    }

    pub fn with_random_encounter(mut self) -> Self {
        self.allow_random_encounter = true;
        self
    }
}

/// An encounter waiting to trigger partway through a session
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEncounter {
    pub group: EncounterGroup,
    /// Real seconds into the session
    pub trigger_at: f32,
}

pub struct FastForwardSession {
    /// Real seconds the session should run for
    target_duration: f32,
    elapsed: f32,
    encounter: Option<PendingEncounter>,
    callback: Option<Box<dyn FastForwardCallback>>,
    cancel_requested: bool,
}

impl std::fmt::Debug for FastForwardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastForwardSession")
            .field("target_duration", &self.target_duration)
            .field("elapsed", &self.elapsed)
            .field("encounter", &self.encounter)
            .field("has_callback", &self.callback.is_some())
            .field("cancel_requested", &self.cancel_requested)
            .finish()
    }
}

impl FastForwardSession {
    pub fn new(
        target_duration: f32,
        callback: Option<Box<dyn FastForwardCallback>>,
        encounter: Option<PendingEncounter>,
    ) -> Self {
        Self {
            target_duration,
            elapsed: 0.0,
            encounter,
            callback,
            cancel_requested: false,
        }
    }

    pub fn target_duration(&self) -> f32 {
        self.target_duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.target_duration
    }

    pub fn advance(&mut self, step: f32) {
        self.elapsed += step;
    }

    /// Game hours covered so far at `multiplier`
    pub fn hours_passed(&self, multiplier: u32) -> f32 {
        self.elapsed / 3600.0 * multiplier as f32
    }

    pub fn pending_encounter(&self) -> Option<&PendingEncounter> {
        self.encounter.as_ref()
    }

    /// Whether the pending encounter should trigger now
    pub fn encounter_due(&self) -> bool {
        self.encounter
            .as_ref()
            .is_some_and(|encounter| self.elapsed >= encounter.trigger_at)
    }

    pub fn take_encounter(&mut self) -> Option<EncounterGroup> {
        self.encounter.take().map(|encounter| encounter.group)
    }

    /// Ask for the session to be cancelled on the next tick
    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    /// Ask the callback whether to stop. Without a callback the answer is
    /// always yes.
    pub fn interrupt(&mut self, reason: InterruptReason, multiplier: u32) -> InterruptDecision {
        let hours = self.hours_passed(multiplier);
        match self.callback.as_mut() {
            Some(callback) => callback.on_interrupted(reason, hours),
            None => InterruptDecision::Accept,
        }
    }

    /// End the session as finished
    pub fn finish(self) {
        if let Some(mut callback) = self.callback {
            callback.on_finished();
        }
    }

    /// End the session as cancelled
    pub fn cancel(self, multiplier: u32) {
        let hours = self.hours_passed(multiplier);
        if let Some(mut callback) = self.callback {
            callback.on_cancelled(hours);
        }
    }
}

// ============================================================================
// Driving the session from the simulation
// ============================================================================

impl<C: CombatSystem, U: Ui> Simulation<C, U> {
    pub fn is_fast_forwarding(&self) -> bool {
        self.fast_forward.is_some()
    }

    pub fn fast_forward_session(&self) -> Option<&FastForwardSession> {
        self.fast_forward.as_ref()
    }

    /// How the most recent session ended
    pub fn last_fast_forward_outcome(&self) -> Option<FastForwardOutcome> {
        self.last_fast_forward_outcome
    }

    /// Start compressing `request.hours` of game time. Returns false if a
    /// session is already running or no map is active.
    pub fn begin_fast_forward(
        &mut self,
        request: FastForwardRequest,
        callback: Option<Box<dyn FastForwardCallback>>,
    ) -> bool {
        if self.fast_forward.is_some() {
            log::warn!("Fast-forward '{}' refused, another one is running", request.label);
            return false;
        }
        // Time only runs on a map
        let Some(multiplier) = self.active_time_multiplier() else {
            log::warn!("Fast-forward '{}' refused, no active map", request.label);
            return false;
        };
        self.unpause_game(false);

        let target_duration = request.hours.max(0.0) * 3600.0 / multiplier as f32;
        let encounter = if request.allow_random_encounter {
            self.roll_fast_forward_encounter(target_duration)
        } else {
            None
        };

        log::info!(
            "Fast-forwarding '{}' for {} hours ({:.1}s){}",
            request.label,
            request.hours,
            target_duration,
            if encounter.is_some() { ", encounter pending" } else { "" }
        );
        self.ui.show_progress(&request.label, request.hours);
        self.fast_forward = Some(FastForwardSession::new(target_duration, callback, encounter));
        true
    }

    fn roll_fast_forward_encounter(&mut self, target_duration: f32) -> Option<PendingEncounter> {
        let on_world_map = self.on_world_map();
        let traveler = self.party.traveler(on_world_map)?;
        let tile = self.entities.tile(traveler)?;
        let average_level = self.party.average_level();

        let id = self.active_map.clone()?;
        let map = self.maps.get_mut(&id)?;
        let group = map.random_encounter(tile, average_level, &mut self.rng)?;
        let trigger_at = if target_duration > 0.0 {
            self.rng.gen_range(0.0..target_duration)
        } else {
            0.0
        };
        Some(PendingEncounter { group, trigger_at })
    }

    /// Ask for the running session to be cancelled. Observed on the next tick.
    pub fn request_fast_forward_cancel(&mut self) -> bool {
        match self.fast_forward.as_mut() {
            Some(session) => {
                session.request_cancel();
                true
            }
            None => false,
        }
    }

    /// Ask the running session to stop for `reason`
    pub fn interrupt_fast_forward(&mut self, reason: InterruptReason) -> InterruptOutcome {
        let multiplier = self.active_time_multiplier().unwrap_or(1);
        let Some(session) = self.fast_forward.as_mut() else {
            return InterruptOutcome::NotRunning;
        };

        match session.interrupt(reason, multiplier) {
            InterruptDecision::Decline => {
                log::info!("Fast-forward interruption ({:?}) declined", reason);
                InterruptOutcome::Continued
            }
            InterruptDecision::Accept => {
                self.fast_forward = None;
                self.ui.hide_progress();
                self.last_fast_forward_outcome = Some(FastForwardOutcome::Interrupted(reason));
                log::info!("Fast-forward interrupted ({:?})", reason);
                if reason == InterruptReason::Ambush {
                    self.ui
                        .log_message("You have been ambushed!", MessageCategory::Combat);
                }
                InterruptOutcome::Cancelled
            }
        }
    }

    /// End the session without any callback, for ambushes on world maps
    pub(super) fn abort_fast_forward(&mut self) {
        if self.fast_forward.take().is_some() {
            self.ui.hide_progress();
            self.last_fast_forward_outcome = Some(FastForwardOutcome::Ambushed);
            log::info!("Fast-forward ended by an ambush");
        }
    }

    /// Run the fast-forward step of a tick and return the delta the rest of
    /// the tick should use
    pub(super) fn update_fast_forward(&mut self, delta: f32) -> f32 {
        let (cancel_requested, complete) = match self.fast_forward.as_ref() {
            Some(session) => (session.cancel_requested(), session.is_complete()),
            None => return delta,
        };
        self.trace(TickPhase::FastForward);
        let multiplier = self.active_time_multiplier();

        if cancel_requested {
            if let Some(session) = self.fast_forward.take() {
                self.ui.hide_progress();
                self.last_fast_forward_outcome = Some(FastForwardOutcome::Cancelled);
                log::info!("Fast-forward cancelled after {:.1}s", session.elapsed());
                session.cancel(multiplier.unwrap_or(1));
            }
            return delta;
        }

        if complete {
            if let Some(session) = self.fast_forward.take() {
                self.ui.hide_progress();
                self.last_fast_forward_outcome = Some(FastForwardOutcome::Finished);
                log::info!("Fast-forward finished");
                session.finish();
            }
            return delta;
        }

        if self.clock.is_paused() {
            return delta;
        }
        let Some(multiplier) = multiplier else {
            return delta;
        };

        let step = self.config.fast_forward_step * self.config.max_time_multiplier() as f32
            / multiplier as f32;
        let Some(session) = self.fast_forward.as_mut() else {
            return delta;
        };
        session.advance(step);
        let hours = session.hours_passed(multiplier);
        let encounter_due = session.encounter_due();
        self.ui.update_progress(hours);

        if encounter_due {
            self.resolve_fast_forward_encounter();
        }
        step
    }
}
