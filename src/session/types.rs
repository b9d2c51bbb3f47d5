//! Session domain: identifiers, lifecycle status and the live session record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::countdown::seconds_left_at;
use crate::backend::CompleteSessionResponse;
use crate::content::TaskRoom;
use crate::progression::InventoryItem;

/// Server-assigned session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// The one session currently running. `ends_at` is the sole source of truth
/// for remaining time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub session_id: SessionId,
    pub template_id: String,
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub room: TaskRoom,
}

impl ActiveSession {
    pub fn seconds_left(&self, now: DateTime<Utc>) -> u64 {
        seconds_left_at(self.ends_at, now)
    }
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Pending,
    Running,
    Success,
    Cancelled,
    Timeout,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 6] = [
        SessionStatus::Idle,
        SessionStatus::Pending,
        SessionStatus::Running,
        SessionStatus::Success,
        SessionStatus::Cancelled,
        SessionStatus::Timeout,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Success => "success",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Timeout => "timeout",
        }
    }

    /// The lifecycle graph. Anything not listed here is rejected.
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Idle, Pending)
                | (Pending, Running)
                | (Pending, Idle)
                | (Running, Success)
                | (Running, Cancelled)
                | (Success, Idle)
                | (Cancelled, Idle)
                | (Timeout, Idle)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Success | SessionStatus::Cancelled | SessionStatus::Timeout
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reward figures of one completed session, held only for the modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardPayload {
    pub exp_reward: u32,
    pub gold_reward: u32,
    pub dropped_item: Option<InventoryItem>,
}

impl From<&CompleteSessionResponse> for RewardPayload {
    fn from(response: &CompleteSessionResponse) -> Self {
        Self {
            exp_reward: response.exp_reward,
            gold_reward: response.gold_reward,
            dropped_item: response.dropped_item.clone(),
        }
    }
}
