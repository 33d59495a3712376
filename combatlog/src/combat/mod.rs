//! Combat system module
//!
//! Implements the combat-logging flag:
//! - Per-player combat countdowns with a self-stopping decay timer
//! - Message templates and the kill-message health indicator

pub mod messages;
mod state;

pub use messages::health_indicator;
pub use state::{CombatSession, CombatTracker, DecayTimer, DECAY_PERIOD};
