//! Entity groupings
//!
//! The player party and its members.

pub mod party;

pub use party::{PartyMember, PlayerParty};
