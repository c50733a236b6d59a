//! The try-on session: one state machine from input selection through
//! result or error.

pub mod controller;
pub mod types;

pub use controller::{RunOutcome, TryOnController, STAGE_DELAY};
pub use types::*;
