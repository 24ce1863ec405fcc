//! Game module - simulation clock, fast-forwarding and combat orchestration

mod combat_mode;
mod encounter;
mod fast_forward;
mod state;
mod time;
mod transition;

#[cfg(test)]
mod tests;

pub use fast_forward::{
    FastForwardCallback, FastForwardOutcome, FastForwardRequest, FastForwardSession,
    InterruptDecision, InterruptOutcome, InterruptReason, PendingEncounter,
};
pub use state::{Simulation, TickPhase};
pub use time::{GameDate, WorldClock};
pub use transition::MapTransition;
