//! Combat system

pub mod turn;

pub use turn::{CombatSystem, Side, TurnBasedCombat};
