//! Session domain: rejected inputs.

use thiserror::Error;

use super::SessionStatus;
use crate::content::Room;

/// Local checks that stop a start request before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select a task before starting a session.")]
    NoTemplateSelected,
    #[error("{minutes} minutes is not an available duration.")]
    UnsupportedDuration { minutes: u32 },
    #[error("This task requires the {required} room.")]
    WrongRoom { required: Room },
}

/// Why the state machine refused an input. State is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("response no longer matches the active session")]
    StaleResponse,
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: SessionStatus,
        action: &'static str,
    },
}
