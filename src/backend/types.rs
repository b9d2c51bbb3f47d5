//! Backend domain: request and response shapes exchanged with the authority.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ItemType, SessionTemplate, TaskRoom};
use crate::progression::{Hero, InventoryItem, WorldState};
use crate::session::SessionId;

/// Generation tag attached to every request so replies can be matched to intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSessionResponse {
    pub success: bool,
    pub exp_reward: u32,
    pub gold_reward: u32,
    pub dropped_item: Option<InventoryItem>,
    pub hero: Hero,
    pub world_state: WorldState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipAck {
    pub item_id: String,
    pub slot: ItemType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSummary {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user: UserSummary,
    pub organization: OrganizationSummary,
    pub hero: Hero,
    pub world_state: WorldState,
}

/// Server-side lifecycle of a recorded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Pending,
    Active,
    Success,
    Cancel,
    Timeout,
}

impl RecordStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, RecordStatus::Pending | RecordStatus::Active)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Active => "active",
            RecordStatus::Success => "success",
            RecordStatus::Cancel => "cancelled",
            RecordStatus::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistoryEntry {
    pub id: SessionId,
    pub template_id: String,
    pub status: RecordStatus,
    pub duration_minutes: u32,
    pub room: TaskRoom,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub reward_exp: Option<u32>,
    pub reward_gold: Option<u32>,
}

// ============================================================================
// Request envelope
// ============================================================================

/// Every operation the client can ask of the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendRequest {
    StartSession {
        template_id: String,
        duration_minutes: u32,
    },
    CompleteSession {
        session_id: SessionId,
    },
    CancelSession {
        session_id: SessionId,
    },
    EquipItem {
        item_id: String,
    },
    FetchProfile,
    FetchTemplates,
    FetchInventory,
    FetchHistory {
        limit: usize,
    },
}

impl BackendRequest {
    pub fn label(&self) -> &'static str {
        match self {
            BackendRequest::StartSession { .. } => "session/start",
            BackendRequest::CompleteSession { .. } => "session/complete",
            BackendRequest::CancelSession { .. } => "session/cancel",
            BackendRequest::EquipItem { .. } => "inventory/equip",
            BackendRequest::FetchProfile => "profile",
            BackendRequest::FetchTemplates => "tasks",
            BackendRequest::FetchInventory => "inventory",
            BackendRequest::FetchHistory { .. } => "sessions/history",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendResponse {
    Started(StartSessionResponse),
    Completed(CompleteSessionResponse),
    Cancelled(SessionHistoryEntry),
    Equipped(EquipAck),
    Profile(Profile),
    Templates(Vec<SessionTemplate>),
    Inventory(Vec<InventoryItem>),
    History(Vec<SessionHistoryEntry>),
}

impl BackendResponse {
    pub fn kind(&self) -> &'static str {
        match self {
            BackendResponse::Started(_) => "started",
            BackendResponse::Completed(_) => "completed",
            BackendResponse::Cancelled(_) => "cancelled",
            BackendResponse::Equipped(_) => "equipped",
            BackendResponse::Profile(_) => "profile",
            BackendResponse::Templates(_) => "templates",
            BackendResponse::Inventory(_) => "inventory",
            BackendResponse::History(_) => "history",
        }
    }
}
