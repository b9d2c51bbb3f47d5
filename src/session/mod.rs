//! Session domain: countdown engine and the session lifecycle state machine.

mod countdown;
mod errors;
mod machine;
mod types;

#[cfg(test)]
mod tests;

pub use countdown::{format_countdown, seconds_left};
pub use errors::{SessionError, ValidationError};
pub use machine::{SessionEffect, SessionEvent, SessionMachine, SessionRules};
pub use types::{ActiveSession, RewardPayload, SessionId, SessionStatus};
