//! Session domain: the lifecycle reducer.
//!
//! [`SessionMachine::apply`] takes one [`SessionEvent`] and returns the side
//! effects to run. An `Err` means the input was rejected and nothing changed.
//! Backend replies are matched against the request generation that produced
//! them, so a late reply for a superseded request is never applied.

use bevy::prelude::*;
use chrono::{DateTime, Utc};

use super::{ActiveSession, RewardPayload, SessionError, SessionId, SessionStatus, ValidationError};
use crate::backend::{
    BackendRequest, CompleteSessionResponse, RequestError, RequestId, StartSessionResponse,
};
use crate::bus::SceneCommand;
use crate::client::Notice;
use crate::content::{Room, SessionDefaults, SessionTemplate};

// ============================================================================
// Inputs and outputs
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RoomEntered(Room),
    RoomLeft(Room),
    StartRequested {
        template: Option<SessionTemplate>,
        duration_minutes: u32,
    },
    StartResolved {
        request: RequestId,
        result: Result<StartSessionResponse, RequestError>,
    },
    Tick {
        now: DateTime<Utc>,
    },
    TimerDone {
        session_id: SessionId,
    },
    CompleteRequested,
    CompletionResolved {
        request: RequestId,
        result: Result<CompleteSessionResponse, RequestError>,
    },
    CancelRequested,
    CancelResolved {
        request: RequestId,
        result: Result<(), RequestError>,
    },
    RewardDismissed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    Command(SceneCommand),
    Request(RequestId, BackendRequest),
    /// A confirmed completion for the progression resolver.
    Resolve(CompleteSessionResponse),
    Notify(Notice),
}

/// Limits the machine enforces locally before asking the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRules {
    pub allowed_durations: Vec<u32>,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self::from(&SessionDefaults::default())
    }
}

impl From<&SessionDefaults> for SessionRules {
    fn from(defaults: &SessionDefaults) -> Self {
        Self {
            allowed_durations: defaults.allowed_durations.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PendingStart {
    request: RequestId,
    template: SessionTemplate,
}

#[derive(Debug, Clone, PartialEq)]
struct CompletionInFlight {
    request: RequestId,
    session_id: SessionId,
}

// ============================================================================
// Machine
// ============================================================================

#[derive(Debug, Default)]
pub struct SessionMachine {
    rules: SessionRules,
    status: SessionStatus,
    active_room: Room,
    active: Option<ActiveSession>,
    pending: Option<PendingStart>,
    completion: Option<CompletionInFlight>,
    auto_completed: Option<SessionId>,
    reward: Option<RewardPayload>,
    seconds_left: u64,
    movement_locked: bool,
    next_request: u64,
}

impl SessionMachine {
    pub fn new(rules: SessionRules) -> Self {
        Self {
            rules,
            ..default()
        }
    }

    pub fn rules(&self) -> &SessionRules {
        &self.rules
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn active_room(&self) -> Room {
        self.active_room
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn reward(&self) -> Option<&RewardPayload> {
        self.reward.as_ref()
    }

    pub fn seconds_left(&self) -> u64 {
        self.seconds_left
    }

    /// Whether the last movement command this machine issued was a lock.
    pub fn movement_locked(&self) -> bool {
        self.movement_locked
    }

    pub fn completion_in_flight(&self) -> bool {
        self.completion.is_some()
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|p| p.request)
    }

    /// Next request generation. Shared with every other request the client sends.
    pub fn allocate_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    /// Checks a start request without sending it.
    pub fn validate_start(
        &self,
        template: Option<&SessionTemplate>,
        duration_minutes: u32,
    ) -> Result<(), ValidationError> {
        let template = template.ok_or(ValidationError::NoTemplateSelected)?;
        if !self.rules.allowed_durations.contains(&duration_minutes) {
            return Err(ValidationError::UnsupportedDuration {
                minutes: duration_minutes,
            });
        }
        let required = Room::from(template.room);
        if required != self.active_room && !self.active_room.is_hub() {
            return Err(ValidationError::WrongRoom { required });
        }
        Ok(())
    }

    pub fn apply(&mut self, event: SessionEvent) -> Result<Vec<SessionEffect>, SessionError> {
        match event {
            SessionEvent::RoomEntered(room) => {
                debug!("Active room: {} -> {}", self.active_room, room);
                self.active_room = room;
                Ok(Vec::new())
            }
            SessionEvent::RoomLeft(room) => {
                if self.active_room == room {
                    self.active_room = Room::Plaza;
                }
                Ok(Vec::new())
            }
            SessionEvent::StartRequested {
                template,
                duration_minutes,
            } => self.request_start(template, duration_minutes),
            SessionEvent::StartResolved { request, result } => self.resolve_start(request, result),
            SessionEvent::Tick { now } => Ok(self.tick(now)),
            SessionEvent::TimerDone { session_id } => {
                let matches = self
                    .active
                    .as_ref()
                    .is_some_and(|a| a.session_id == session_id);
                if self.status != SessionStatus::Running || !matches {
                    return Err(SessionError::StaleResponse);
                }
                Ok(self.trigger_completion(true))
            }
            SessionEvent::CompleteRequested => {
                self.ensure_running("complete a session")?;
                Ok(self.trigger_completion(false))
            }
            SessionEvent::CompletionResolved { request, result } => {
                self.resolve_completion(request, result)
            }
            SessionEvent::CancelRequested => self.cancel(),
            SessionEvent::CancelResolved { request, result } => {
                match result {
                    Ok(()) => debug!("Cancellation {} acknowledged", request),
                    Err(err) => warn!("Cancellation {} failed, ignored: {}", request, err),
                }
                Ok(Vec::new())
            }
            SessionEvent::RewardDismissed => {
                if self.status != SessionStatus::Success {
                    return Err(self.invalid("dismiss the reward"));
                }
                self.reward = None;
                self.transition(SessionStatus::Idle);
                Ok(Vec::new())
            }
        }
    }

    // ========================================================================
    // Start
    // ========================================================================

    fn request_start(
        &mut self,
        template: Option<SessionTemplate>,
        duration_minutes: u32,
    ) -> Result<Vec<SessionEffect>, SessionError> {
        if self.status != SessionStatus::Idle {
            return Err(self.invalid("start a session"));
        }
        self.validate_start(template.as_ref(), duration_minutes)?;
        let template = template.ok_or(ValidationError::NoTemplateSelected)?;

        let request = self.allocate_request();
        let effect = SessionEffect::Request(
            request,
            BackendRequest::StartSession {
                template_id: template.id.clone(),
                duration_minutes,
            },
        );
        self.pending = Some(PendingStart { request, template });
        self.transition(SessionStatus::Pending);
        Ok(vec![effect])
    }

    fn resolve_start(
        &mut self,
        request: RequestId,
        result: Result<StartSessionResponse, RequestError>,
    ) -> Result<Vec<SessionEffect>, SessionError> {
        let current = self.pending.as_ref().map(|p| p.request);
        if self.status != SessionStatus::Pending || current != Some(request) {
            return Err(SessionError::StaleResponse);
        }
        let Some(pending) = self.pending.take() else {
            return Err(SessionError::StaleResponse);
        };

        match result {
            Ok(response) => {
                let session = ActiveSession {
                    session_id: response.session_id,
                    template_id: pending.template.id,
                    duration_minutes: response.duration_minutes,
                    started_at: response.started_at,
                    ends_at: response.ends_at,
                    room: pending.template.room,
                };
                self.seconds_left = session.seconds_left(response.started_at);
                info!(
                    "Session {} running until {}",
                    session.session_id, session.ends_at
                );
                self.active = Some(session);
                self.movement_locked = true;
                self.transition(SessionStatus::Running);
                Ok(vec![SessionEffect::Command(SceneCommand::LockMovement)])
            }
            Err(err) => {
                self.transition(SessionStatus::Idle);
                Ok(vec![SessionEffect::Notify(Notice::error(
                    "Unable to start session",
                    err.to_string(),
                ))])
            }
        }
    }

    // ========================================================================
    // Countdown and completion
    // ========================================================================

    fn tick(&mut self, now: DateTime<Utc>) -> Vec<SessionEffect> {
        if self.status != SessionStatus::Running {
            return Vec::new();
        }
        let Some(active) = &self.active else {
            return Vec::new();
        };
        self.seconds_left = active.seconds_left(now);
        if self.seconds_left == 0 {
            self.trigger_completion(true)
        } else {
            Vec::new()
        }
    }

    /// Issues at most one completion request per session at a time. The
    /// automatic path fires once per session; retries after that are manual.
    fn trigger_completion(&mut self, automatic: bool) -> Vec<SessionEffect> {
        let Some(session_id) = self.active.as_ref().map(|a| a.session_id.clone()) else {
            return Vec::new();
        };
        if self.completion.is_some() {
            debug!("Completion for {} already in flight", session_id);
            return Vec::new();
        }
        if automatic {
            if self.auto_completed.as_ref() == Some(&session_id) {
                return Vec::new();
            }
            self.auto_completed = Some(session_id.clone());
        }

        let request = self.allocate_request();
        self.completion = Some(CompletionInFlight {
            request,
            session_id: session_id.clone(),
        });
        vec![SessionEffect::Request(
            request,
            BackendRequest::CompleteSession { session_id },
        )]
    }

    fn resolve_completion(
        &mut self,
        request: RequestId,
        result: Result<CompleteSessionResponse, RequestError>,
    ) -> Result<Vec<SessionEffect>, SessionError> {
        let fresh = match (&self.completion, &self.active) {
            (Some(in_flight), Some(active)) => {
                in_flight.request == request && in_flight.session_id == active.session_id
            }
            _ => false,
        };
        if self.status != SessionStatus::Running || !fresh {
            return Err(SessionError::StaleResponse);
        }
        self.completion = None;
        self.movement_locked = false;

        let failure = match result {
            Ok(response) if response.success => {
                info!(
                    "Session completed: +{} exp, +{} gold",
                    response.exp_reward, response.gold_reward
                );
                self.active = None;
                self.seconds_left = 0;
                self.reward = Some(RewardPayload::from(&response));
                self.transition(SessionStatus::Success);
                return Ok(vec![
                    SessionEffect::Command(SceneCommand::UnlockMovement),
                    SessionEffect::Resolve(response),
                ]);
            }
            Ok(_) => "The session was not accepted as complete.".to_string(),
            Err(err) => err.to_string(),
        };

        Ok(vec![
            SessionEffect::Command(SceneCommand::UnlockMovement),
            SessionEffect::Notify(Notice::error("Unable to complete session", failure)),
        ])
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    fn cancel(&mut self) -> Result<Vec<SessionEffect>, SessionError> {
        self.ensure_running("cancel a session")?;
        let Some(session) = self.active.take() else {
            return Err(self.invalid("cancel a session"));
        };

        self.completion = None;
        self.seconds_left = 0;
        self.movement_locked = false;
        self.transition(SessionStatus::Cancelled);
        self.transition(SessionStatus::Idle);
        info!("Session {} cancelled", session.session_id);

        let request = self.allocate_request();
        Ok(vec![
            SessionEffect::Command(SceneCommand::UnlockMovement),
            SessionEffect::Request(
                request,
                BackendRequest::CancelSession {
                    session_id: session.session_id,
                },
            ),
            SessionEffect::Notify(Notice::info("Session cancelled")),
        ])
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_running(&self, action: &'static str) -> Result<(), SessionError> {
        if self.status == SessionStatus::Running && self.active.is_some() {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            from: self.status,
            action,
        }
    }

    fn transition(&mut self, next: SessionStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition {} -> {}",
            self.status,
            next
        );
        debug!("Session status: {} -> {}", self.status, next);
        self.status = next;
    }
}
