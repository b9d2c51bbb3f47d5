//! Backend domain: the authoritative side of every session and progression rule.
//!
//! The client never computes rewards itself. It talks to a [`SessionBackend`]
//! through a [`BackendLink`], which adds per-request latency and hands replies
//! back in arrival order. [`LocalBackend`] is the in-process authority used
//! when no remote server is configured.

mod link;
mod local;
mod types;


pub use link::{BackendLink, Reply};
pub use local::LocalBackend;
pub use types::*;

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::content::{ContentRegistry, GameplayDefaults, SessionTemplate};
use crate::progression::InventoryItem;
use crate::session::SessionId;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The authority refused the request, with an HTTP-like status.
    #[error("{detail} ({status})")]
    Rejected { status: u16, detail: String },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl RequestError {
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::rejected(404, detail)
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::rejected(409, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::rejected(422, detail)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Rejected { status, .. } => Some(*status),
            RequestError::Unavailable(_) => None,
        }
    }
}

// ============================================================================
// Authority interface
// ============================================================================

/// Operations the client consumes. `now` is the moment the request arrives.
pub trait SessionBackend: Send + Sync {
    fn start_session(
        &mut self,
        template_id: &str,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<StartSessionResponse, RequestError>;

    fn complete_session(
        &mut self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<CompleteSessionResponse, RequestError>;

    fn cancel_session(
        &mut self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionHistoryEntry, RequestError>;

    fn equip_item(&mut self, item_id: &str) -> Result<EquipAck, RequestError>;

    fn profile(&self) -> Result<Profile, RequestError>;

    fn task_templates(&self) -> Result<Vec<SessionTemplate>, RequestError>;

    /// Owned items, newest first.
    fn inventory(&self) -> Result<Vec<InventoryItem>, RequestError>;

    /// Recorded sessions, newest first.
    fn session_history(&self, limit: usize) -> Result<Vec<SessionHistoryEntry>, RequestError>;
}

/// Runs one request against the authority.
pub fn dispatch(
    backend: &mut dyn SessionBackend,
    request: &BackendRequest,
    now: DateTime<Utc>,
) -> Result<BackendResponse, RequestError> {
    let response = match request {
        BackendRequest::StartSession {
            template_id,
            duration_minutes,
        } => BackendResponse::Started(backend.start_session(template_id, *duration_minutes, now)?),
        BackendRequest::CompleteSession { session_id } => {
            BackendResponse::Completed(backend.complete_session(session_id, now)?)
        }
        BackendRequest::CancelSession { session_id } => {
            BackendResponse::Cancelled(backend.cancel_session(session_id, now)?)
        }
        BackendRequest::EquipItem { item_id } => BackendResponse::Equipped(backend.equip_item(item_id)?),
        BackendRequest::FetchProfile => BackendResponse::Profile(backend.profile()?),
        BackendRequest::FetchTemplates => BackendResponse::Templates(backend.task_templates()?),
        BackendRequest::FetchInventory => BackendResponse::Inventory(backend.inventory()?),
        BackendRequest::FetchHistory { limit } => {
            BackendResponse::History(backend.session_history(*limit)?)
        }
    };
    Ok(response)
}

// ============================================================================
// Plugin
// ============================================================================

/// The authority the link delivers requests to.
#[derive(Resource)]
pub struct Authority(pub Box<dyn SessionBackend>);

impl Authority {
    pub fn backend_mut(&mut self) -> &mut dyn SessionBackend {
        self.0.as_mut()
    }
}

pub struct BackendPlugin;

impl Plugin for BackendPlugin {
    fn build(&self, app: &mut App) {
        let defaults = app
            .world()
            .get_resource::<GameplayDefaults>()
            .cloned()
            .unwrap_or_default();
        let registry = app
            .world()
            .get_resource::<ContentRegistry>()
            .cloned()
            .unwrap_or_else(ContentRegistry::fallback);

        let backend = LocalBackend::new(&registry, &defaults.session.allowed_durations, defaults.backend.clone());
        info!(
            "Local authority ready: {} templates, {} cosmetics, latency {}ms",
            registry.templates.len(),
            registry.cosmetics.len(),
            defaults.backend.latency_ms
        );
        debug!(
            "Authority hero {} at level {}, world {} with {} successes",
            backend.hero().id,
            backend.hero().level,
            backend.world().id,
            backend.world().total_sessions_success
        );

        app.insert_resource(Authority(Box::new(backend)))
            .insert_resource(BackendLink::new(defaults.backend.latency_ms));
    }
}
