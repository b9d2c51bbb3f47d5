//! Client domain: the owned state container behind the whole HUD.
//!
//! `ClientCore` combines the session machine and the progression state. Every
//! entry point returns [`Effect`]s instead of touching the bus or the network,
//! so the systems stay thin and the logic runs headless in tests.

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::Notice;
use crate::backend::{BackendRequest, BackendResponse, RequestError, RequestId, Reply, SessionHistoryEntry};
use crate::bus::{SceneCommand, WorldEvent};
use crate::content::{Room, SessionTemplate};
use crate::progression::{InventoryItem, ProgressionState};
use crate::session::{
    SessionEffect, SessionError, SessionEvent, SessionMachine, SessionRules, SessionStatus,
    ValidationError,
};

pub const HISTORY_LIMIT: usize = 10;

/// Side effects the systems carry out on behalf of [`ClientCore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Command(SceneCommand),
    Request(RequestId, BackendRequest),
    Notify(Notice),
}

/// Template and duration picked in the session form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionForm {
    pub template_id: Option<String>,
    pub duration_minutes: u32,
}

#[derive(Resource, Debug)]
pub struct ClientCore {
    pub session: SessionMachine,
    pub progression: ProgressionState,
    templates: Vec<SessionTemplate>,
    form: SessionForm,
    inventory_cursor: usize,
    pending_equips: HashMap<RequestId, String>,
    history: Vec<SessionHistoryEntry>,
}

impl ClientCore {
    pub fn new(rules: SessionRules, default_duration: u32) -> Self {
        Self {
            session: SessionMachine::new(rules),
            progression: ProgressionState::default(),
            templates: Vec::new(),
            form: SessionForm {
                template_id: None,
                duration_minutes: default_duration,
            },
            inventory_cursor: 0,
            pending_equips: HashMap::new(),
            history: Vec::new(),
        }
    }

    /// Initial fetches: profile, templates, inventory, history.
    pub fn bootstrap(&mut self) -> Vec<Effect> {
        [
            BackendRequest::FetchProfile,
            BackendRequest::FetchTemplates,
            BackendRequest::FetchInventory,
            BackendRequest::FetchHistory {
                limit: HISTORY_LIMIT,
            },
        ]
        .into_iter()
        .map(|request| self.request(request))
        .collect()
    }

    /// Commands that bring a freshly mounted scene up to date.
    pub fn scene_sync(&self) -> Vec<Effect> {
        let mut effects = vec![
            Effect::Command(SceneCommand::UpdateWorld(self.progression.decor())),
            Effect::Command(SceneCommand::ApplyCosmetics(self.progression.cosmetic_keys())),
        ];
        if self.session.movement_locked() {
            effects.push(Effect::Command(SceneCommand::LockMovement));
        }
        effects
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn templates(&self) -> &[SessionTemplate] {
        &self.templates
    }

    pub fn form(&self) -> &SessionForm {
        &self.form
    }

    pub fn selected_template(&self) -> Option<&SessionTemplate> {
        let id = self.form.template_id.as_deref()?;
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn history(&self) -> &[SessionHistoryEntry] {
        &self.history
    }

    pub fn active_room(&self) -> Room {
        self.session.active_room()
    }

    /// Inline guidance shown under the form while the avatar is in the wrong room.
    pub fn form_guidance(&self) -> Option<String> {
        let template = self.selected_template()?;
        match self
            .session
            .validate_start(Some(template), self.form.duration_minutes)
        {
            Err(ValidationError::WrongRoom { required }) => Some(format!(
                "Move your avatar to the {} room to begin this session.",
                required
            )),
            _ => None,
        }
    }

    pub fn selected_item(&self) -> Option<&InventoryItem> {
        self.progression.inventory.get(self.inventory_cursor)
    }

    pub fn inventory_cursor(&self) -> usize {
        self.inventory_cursor
    }

    pub fn pending_equips(&self) -> usize {
        self.pending_equips.len()
    }

    // ========================================================================
    // Form
    // ========================================================================

    pub fn select_template(&mut self, index: usize) -> bool {
        let Some(template) = self.templates.get(index) else {
            return false;
        };
        self.form.template_id = Some(template.id.clone());
        if self
            .session
            .rules()
            .allowed_durations
            .contains(&template.default_duration_minutes)
        {
            self.form.duration_minutes = template.default_duration_minutes;
        }
        true
    }

    pub fn cycle_duration(&mut self) -> u32 {
        let allowed = &self.session.rules().allowed_durations;
        if let Some(first) = allowed.first() {
            let next = allowed
                .iter()
                .position(|d| *d == self.form.duration_minutes)
                .and_then(|i| allowed.get(i + 1))
                .unwrap_or(first);
            self.form.duration_minutes = *next;
        }
        self.form.duration_minutes
    }

    pub fn cycle_inventory(&mut self) -> Option<&InventoryItem> {
        let len = self.progression.inventory.len();
        if len == 0 {
            self.inventory_cursor = 0;
            return None;
        }
        self.inventory_cursor = (self.inventory_cursor + 1) % len;
        self.selected_item()
    }

    // ========================================================================
    // User and scene input
    // ========================================================================

    pub fn submit_start(&mut self) -> Vec<Effect> {
        let template = self.selected_template().cloned();
        let duration_minutes = self.form.duration_minutes;
        self.run(SessionEvent::StartRequested {
            template,
            duration_minutes,
        })
    }

    pub fn complete_now(&mut self) -> Vec<Effect> {
        self.run(SessionEvent::CompleteRequested)
    }

    pub fn cancel(&mut self) -> Vec<Effect> {
        self.run(SessionEvent::CancelRequested)
    }

    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        self.run(SessionEvent::Tick { now })
    }

    pub fn dismiss_reward(&mut self) -> Vec<Effect> {
        let effects = self.run(SessionEvent::RewardDismissed);
        if self.session.status() == SessionStatus::Idle {
            self.progression.dismiss_reward();
        }
        effects
    }

    pub fn on_world_event(&mut self, event: &WorldEvent) -> Vec<Effect> {
        let event = match event {
            WorldEvent::RoomEnter { room } => SessionEvent::RoomEntered(*room),
            WorldEvent::RoomLeave { room } => SessionEvent::RoomLeft(*room),
            WorldEvent::TimerDone { session_id } => SessionEvent::TimerDone {
                session_id: session_id.clone(),
            },
        };
        self.run(event)
    }

    pub fn equip_selected(&mut self) -> Vec<Effect> {
        match self.selected_item().map(|item| item.id.clone()) {
            Some(item_id) => self.equip(&item_id),
            None => vec![Effect::Notify(Notice::info("Inventory is empty"))],
        }
    }

    pub fn equip(&mut self, item_id: &str) -> Vec<Effect> {
        if let Err(err) = self.progression.owned_item(item_id) {
            return vec![Effect::Notify(Notice::error("Unable to equip item", err.to_string()))];
        }
        let effect = self.request(BackendRequest::EquipItem {
            item_id: item_id.to_string(),
        });
        if let Effect::Request(id, _) = &effect {
            self.pending_equips.insert(*id, item_id.to_string());
        }
        vec![effect]
    }

    // ========================================================================
    // Backend replies
    // ========================================================================

    pub fn on_reply(&mut self, reply: Reply) -> Vec<Effect> {
        let Reply {
            id,
            request,
            result,
        } = reply;
        match request {
            BackendRequest::StartSession { .. } => {
                let result = result.and_then(|response| match response {
                    BackendResponse::Started(started) => Ok(started),
                    other => Err(unexpected(&other)),
                });
                self.run(SessionEvent::StartResolved {
                    request: id,
                    result,
                })
            }
            BackendRequest::CompleteSession { .. } => {
                let result = result.and_then(|response| match response {
                    BackendResponse::Completed(completed) => Ok(completed),
                    other => Err(unexpected(&other)),
                });
                self.run(SessionEvent::CompletionResolved {
                    request: id,
                    result,
                })
            }
            BackendRequest::CancelSession { session_id } => {
                // 409: the authority finished the session first, so its
                // snapshot is ahead of ours.
                let finished_first = matches!(&result, Err(err) if err.status() == Some(409));
                let mut effects = self.run(SessionEvent::CancelResolved {
                    request: id,
                    result: result.map(|_| ()),
                });
                if finished_first {
                    info!("Session {} finished before the cancel arrived, refreshing", session_id);
                    effects.extend(self.refresh_snapshot());
                }
                effects
            }
            BackendRequest::EquipItem { item_id } => {
                self.pending_equips.remove(&id);
                match result {
                    Ok(BackendResponse::Equipped(ack)) => match self.progression.apply_equip(&ack.item_id) {
                        Ok(scene) => {
                            let name = self
                                .progression
                                .owned_item(&ack.item_id)
                                .map_or_else(|_| ack.item_id.clone(), |item| item.name.clone());
                            let mut effects = commands(scene);
                            effects.push(Effect::Notify(
                                Notice::success("Item equipped").with_detail(name),
                            ));
                            effects
                        }
                        Err(err) => vec![Effect::Notify(Notice::error(
                            "Unable to equip item",
                            err.to_string(),
                        ))],
                    },
                    Ok(other) => vec![fetch_failed("equip", &unexpected(&other))],
                    Err(err) => {
                        warn!("Equip of {} failed: {}", item_id, err);
                        vec![Effect::Notify(Notice::error("Unable to equip item", err.to_string()))]
                    }
                }
            }
            BackendRequest::FetchProfile => match result {
                Ok(BackendResponse::Profile(profile)) => {
                    info!(
                        "Profile loaded: level {} hero, {} successful sessions",
                        profile.hero.level, profile.world_state.total_sessions_success
                    );
                    commands(self.progression.apply_profile(profile))
                }
                Ok(other) => vec![fetch_failed("profile", &unexpected(&other))],
                Err(err) => vec![fetch_failed("profile", &err)],
            },
            BackendRequest::FetchTemplates => match result {
                Ok(BackendResponse::Templates(templates)) => {
                    self.set_templates(templates);
                    Vec::new()
                }
                Ok(other) => vec![fetch_failed("tasks", &unexpected(&other))],
                Err(err) => vec![fetch_failed("tasks", &err)],
            },
            BackendRequest::FetchInventory => match result {
                Ok(BackendResponse::Inventory(items)) => {
                    let scene = self.progression.set_inventory(items);
                    if self.inventory_cursor >= self.progression.inventory.len() {
                        self.inventory_cursor = 0;
                    }
                    commands(scene)
                }
                Ok(other) => vec![fetch_failed("inventory", &unexpected(&other))],
                Err(err) => vec![fetch_failed("inventory", &err)],
            },
            BackendRequest::FetchHistory { .. } => match result {
                Ok(BackendResponse::History(entries)) => {
                    self.history = entries;
                    Vec::new()
                }
                Ok(other) => vec![fetch_failed("history", &unexpected(&other))],
                Err(err) => vec![fetch_failed("history", &err)],
            },
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn set_templates(&mut self, templates: Vec<SessionTemplate>) {
        self.templates = templates;
        let still_listed = self
            .form
            .template_id
            .as_deref()
            .is_some_and(|id| self.templates.iter().any(|t| t.id == id));
        if !still_listed {
            self.form.template_id = None;
            self.select_template(0);
        }
    }

    /// Refetches everything the authority can change behind our back.
    fn refresh_snapshot(&mut self) -> Vec<Effect> {
        [
            BackendRequest::FetchProfile,
            BackendRequest::FetchInventory,
            BackendRequest::FetchHistory {
                limit: HISTORY_LIMIT,
            },
        ]
        .into_iter()
        .map(|request| self.request(request))
        .collect()
    }

    fn request(&mut self, request: BackendRequest) -> Effect {
        Effect::Request(self.session.allocate_request(), request)
    }

    /// Feeds the machine and translates its effects.
    fn run(&mut self, event: SessionEvent) -> Vec<Effect> {
        let effects = match self.session.apply(event) {
            Ok(effects) => effects,
            Err(SessionError::Validation(err)) => {
                let title = match err {
                    ValidationError::WrongRoom { .. } => "Move to the correct room",
                    _ => "Cannot start session",
                };
                return vec![Effect::Notify(Notice::warning(title, err.to_string()))];
            }
            Err(SessionError::StaleResponse) => {
                debug!("Discarded stale session input");
                return Vec::new();
            }
            Err(err @ SessionError::InvalidTransition { .. }) => {
                debug!("Ignored session input: {}", err);
                return Vec::new();
            }
        };

        let mut out = Vec::new();
        for effect in effects {
            match effect {
                SessionEffect::Command(command) => out.push(Effect::Command(command)),
                SessionEffect::Request(id, request) => out.push(Effect::Request(id, request)),
                SessionEffect::Notify(notice) => out.push(Effect::Notify(notice)),
                SessionEffect::Resolve(response) => {
                    out.extend(commands(self.progression.resolve_completion(response)));
                    out.push(self.request(BackendRequest::FetchInventory));
                    out.push(self.request(BackendRequest::FetchHistory {
                        limit: HISTORY_LIMIT,
                    }));
                }
            }
        }
        out
    }
}

fn commands(commands: Vec<SceneCommand>) -> Vec<Effect> {
    commands.into_iter().map(Effect::Command).collect()
}

fn unexpected(response: &BackendResponse) -> RequestError {
    RequestError::Unavailable(format!("unexpected {} response", response.kind()))
}

fn fetch_failed(what: &str, err: &RequestError) -> Effect {
    warn!("Fetching {} failed: {}", what, err);
    Effect::Notify(Notice::error(format!("Unable to load {}", what), err.to_string()))
}
