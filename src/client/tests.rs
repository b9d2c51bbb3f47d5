//! Client domain: end-to-end scenarios against scripted and local authorities.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::VecDeque;

use super::notice::NoticeLevel;
use super::state::HISTORY_LIMIT;
use super::*;
use crate::backend::{
    BackendLink, BackendRequest, CompleteSessionResponse, EquipAck, LocalBackend,
    OrganizationSummary, Profile, RequestError, SessionBackend, SessionHistoryEntry,
    StartSessionResponse, UserSummary,
};
use crate::bus::{EventBus, SceneCommand, WorldEvent};
use crate::content::{BackendDefaults, ContentRegistry, ItemType, Room, SessionTemplate};
use crate::progression::{Hero, InventoryItem, WorldState};
use crate::session::{SessionId, SessionRules, SessionStatus};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 15, 9, 0, 0).unwrap()
}

// -----------------------------------------------------------------------------
// Scripted authority
// -----------------------------------------------------------------------------

/// Hands out queued replies and records which operations were called.
#[derive(Default)]
struct ScriptedBackend {
    templates: Vec<SessionTemplate>,
    starts: VecDeque<Result<StartSessionResponse, RequestError>>,
    completions: VecDeque<Result<CompleteSessionResponse, RequestError>>,
    cancels: VecDeque<Result<SessionHistoryEntry, RequestError>>,
    inventory: Vec<InventoryItem>,
    calls: Vec<&'static str>,
}

fn unscripted() -> RequestError {
    RequestError::Unavailable("no scripted reply".into())
}

impl SessionBackend for ScriptedBackend {
    fn start_session(
        &mut self,
        _template_id: &str,
        _duration_minutes: u32,
        _now: DateTime<Utc>,
    ) -> Result<StartSessionResponse, RequestError> {
        self.calls.push("start");
        self.starts.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    fn complete_session(
        &mut self,
        _session_id: &SessionId,
        _now: DateTime<Utc>,
    ) -> Result<CompleteSessionResponse, RequestError> {
        self.calls.push("complete");
        self.completions.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    fn cancel_session(
        &mut self,
        _session_id: &SessionId,
        _now: DateTime<Utc>,
    ) -> Result<SessionHistoryEntry, RequestError> {
        self.calls.push("cancel");
        self.cancels.pop_front().unwrap_or_else(|| Err(unscripted()))
    }

    fn equip_item(&mut self, item_id: &str) -> Result<EquipAck, RequestError> {
        self.calls.push("equip");
        self.inventory
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| EquipAck {
                item_id: i.id.clone(),
                slot: i.item_type,
            })
            .ok_or_else(|| RequestError::not_found("Item not owned."))
    }

    fn profile(&self) -> Result<Profile, RequestError> {
        Ok(Profile {
            user: UserSummary {
                id: "u".into(),
                email: "u@example.com".into(),
                full_name: None,
            },
            organization: OrganizationSummary {
                id: "o".into(),
                name: "Org".into(),
                slug: "org".into(),
            },
            hero: Hero::new("hero"),
            world_state: WorldState::new("world", "u"),
        })
    }

    fn task_templates(&self) -> Result<Vec<SessionTemplate>, RequestError> {
        Ok(self.templates.clone())
    }

    fn inventory(&self) -> Result<Vec<InventoryItem>, RequestError> {
        Ok(self.inventory.clone())
    }

    fn session_history(&self, _limit: usize) -> Result<Vec<SessionHistoryEntry>, RequestError> {
        Ok(Vec::new())
    }
}

// -----------------------------------------------------------------------------
// Harness
// -----------------------------------------------------------------------------

/// Runs ClientCore effects the way the systems do, with a manual clock.
struct Harness<B: SessionBackend> {
    core: ClientCore,
    link: BackendLink,
    backend: B,
    now: DateTime<Utc>,
    commands: Vec<SceneCommand>,
    notices: Vec<Notice>,
    sent: Vec<BackendRequest>,
}

impl<B: SessionBackend> Harness<B> {
    fn new(backend: B) -> Self {
        let mut harness = Self {
            core: ClientCore::new(SessionRules::default(), 50),
            link: BackendLink::new(200),
            backend,
            now: t0(),
            commands: Vec::new(),
            notices: Vec::new(),
            sent: Vec::new(),
        };
        let effects = harness.core.bootstrap();
        harness.run(effects);
        harness.advance(Duration::seconds(1));
        harness.commands.clear();
        harness
    }

    fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Command(command) => self.commands.push(command),
                Effect::Request(id, request) => {
                    self.sent.push(request.clone());
                    self.link.submit(id, request, self.now);
                }
                Effect::Notify(notice) => self.notices.push(notice),
            }
        }
    }

    fn advance(&mut self, by: Duration) {
        self.now += by;
        for reply in self.link.poll(&mut self.backend, self.now) {
            let effects = self.core.on_reply(reply);
            self.run(effects);
        }
    }

    fn tick(&mut self) {
        let effects = self.core.tick(self.now);
        self.run(effects);
    }

    fn world_event(&mut self, event: WorldEvent) {
        let effects = self.core.on_world_event(&event);
        self.run(effects);
    }

    fn start(&mut self) {
        let effects = self.core.submit_start();
        self.run(effects);
        self.advance(Duration::seconds(1));
    }

    fn sent_count(&self, label: &str) -> usize {
        self.sent.iter().filter(|r| r.label() == label).count()
    }
}

fn scripted() -> ScriptedBackend {
    ScriptedBackend {
        templates: ContentRegistry::fallback().sorted_templates(),
        ..Default::default()
    }
}

fn started(minutes: u32, at: DateTime<Utc>) -> StartSessionResponse {
    StartSessionResponse {
        session_id: SessionId::from("s-1"),
        duration_minutes: minutes,
        started_at: at,
        ends_at: at + Duration::minutes(i64::from(minutes)),
    }
}

fn completed() -> CompleteSessionResponse {
    let mut hero = Hero::new("hero");
    hero.exp = 50;
    hero.gold = 25;
    let mut world = WorldState::new("world", "u");
    world.total_sessions_success = 1;
    world.day_streak = 1;
    CompleteSessionResponse {
        success: true,
        exp_reward: 50,
        gold_reward: 25,
        dropped_item: None,
        hero,
        world_state: world,
    }
}

// -----------------------------------------------------------------------------
// Bootstrap and form
// -----------------------------------------------------------------------------

#[test]
fn test_bootstrap_loads_profile_and_templates() {
    let harness = Harness::new(scripted());

    assert!(harness.core.progression.hero.is_some());
    assert_eq!(harness.core.templates().len(), 3);
    // first sorted template: task_deep_reading, 50 minutes
    let selected = harness.core.selected_template().unwrap();
    assert_eq!(selected.id, "task_deep_reading");
    assert_eq!(harness.core.form().duration_minutes, 50);
}

#[test]
fn test_duration_cycles_through_allowed_values() {
    let mut harness = Harness::new(scripted());
    assert_eq!(harness.core.cycle_duration(), 90);
    assert_eq!(harness.core.cycle_duration(), 25);
    assert_eq!(harness.core.cycle_duration(), 50);
}

#[test]
fn test_form_guidance_names_required_room() {
    let mut harness = Harness::new(scripted());
    assert_eq!(harness.core.form_guidance(), None);

    harness.world_event(WorldEvent::RoomEnter { room: Room::Build });

    assert_eq!(
        harness.core.form_guidance().as_deref(),
        Some("Move your avatar to the study room to begin this session.")
    );
}

// -----------------------------------------------------------------------------
// Session scenarios
// -----------------------------------------------------------------------------

#[test]
fn test_wrong_room_start_sends_nothing() {
    let mut harness = Harness::new(scripted());
    harness.world_event(WorldEvent::RoomEnter { room: Room::Build });

    harness.start();

    assert_eq!(harness.sent_count("session/start"), 0);
    assert!(harness.backend.calls.is_empty());
    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    assert_eq!(harness.notices.last().unwrap().title, "Move to the correct room");
}

#[test]
fn test_countdown_to_zero_completes_once_and_resolves_reward() {
    let mut backend = scripted();
    backend.starts.push_back(Ok(started(50, t0())));
    backend.completions.push_back(Ok(completed()));
    let mut harness = Harness::new(backend);
    harness.world_event(WorldEvent::RoomEnter { room: Room::Study });

    harness.start();
    assert_eq!(harness.core.session.status(), SessionStatus::Running);
    assert_eq!(harness.commands, vec![SceneCommand::LockMovement]);

    harness.now = t0() + Duration::minutes(50);
    harness.tick();
    harness.world_event(WorldEvent::TimerDone {
        session_id: SessionId::from("s-1"),
    });
    harness.tick();
    let manual = harness.core.complete_now();
    harness.run(manual);
    harness.advance(Duration::seconds(1));

    assert_eq!(harness.backend.calls.iter().filter(|c| **c == "complete").count(), 1);
    assert_eq!(harness.core.session.status(), SessionStatus::Success);

    let expected = completed();
    assert_eq!(harness.core.progression.hero.as_ref(), Some(&expected.hero));
    assert_eq!(harness.core.progression.world.as_ref(), Some(&expected.world_state));
    let modal = harness.core.progression.reward_modal.as_ref().unwrap();
    assert_eq!((modal.exp_reward, modal.gold_reward), (50, 25));

    assert!(harness.commands.contains(&SceneCommand::UnlockMovement));
    assert!(harness.commands.contains(&SceneCommand::RewardFx { dropped_item: None }));
    // inventory and history are refetched after the reward
    assert_eq!(harness.sent_count("inventory"), 2);
    assert_eq!(harness.sent_count("sessions/history"), 2);

    let effects = harness.core.dismiss_reward();
    harness.run(effects);
    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    assert!(harness.core.progression.reward_modal.is_none());
}

#[test]
fn test_cancel_is_idle_before_backend_answers() {
    let mut backend = scripted();
    backend.starts.push_back(Ok(started(25, t0())));
    let mut harness = Harness::new(backend);
    harness.start();

    let effects = harness.core.cancel();
    harness.run(effects);

    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    assert!(harness.commands.contains(&SceneCommand::UnlockMovement));
    assert_eq!(harness.link.in_flight(), 1);

    // the cancel reply is an unscripted failure and is swallowed
    let notices_before = harness.notices.len();
    harness.advance(Duration::seconds(1));
    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    assert_eq!(harness.notices.len(), notices_before);
}

#[test]
fn test_start_failure_returns_to_idle_with_notice() {
    let mut backend = scripted();
    backend
        .starts
        .push_back(Err(RequestError::conflict("Too many sessions in progress.")));
    let mut harness = Harness::new(backend);

    harness.start();

    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    let notice = harness.notices.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.detail.as_deref().unwrap().contains("Too many sessions"));
}

#[test]
fn test_completion_failure_unlocks_and_allows_retry() {
    let mut backend = scripted();
    backend.starts.push_back(Ok(started(25, t0())));
    backend
        .completions
        .push_back(Err(RequestError::unprocessable("Session cannot be completed yet.")));
    backend.completions.push_back(Ok(completed()));
    let mut harness = Harness::new(backend);
    harness.start();

    let effects = harness.core.complete_now();
    harness.run(effects);
    harness.advance(Duration::seconds(1));

    assert_eq!(harness.core.session.status(), SessionStatus::Running);
    assert_eq!(harness.commands.last(), Some(&SceneCommand::UnlockMovement));

    let effects = harness.core.complete_now();
    harness.run(effects);
    harness.advance(Duration::seconds(1));
    assert_eq!(harness.core.session.status(), SessionStatus::Success);
}

// -----------------------------------------------------------------------------
// Equip
// -----------------------------------------------------------------------------

#[test]
fn test_equip_updates_slot_after_ack() {
    let mut backend = scripted();
    backend.inventory = vec![InventoryItem {
        id: "outfit_robe".into(),
        name: "Scholar Robe".into(),
        item_type: ItemType::Outfit,
        rarity: crate::content::Rarity::Rare,
        sprite_key: "outfit_robe".into(),
        obtained_at: t0(),
    }];
    let mut harness = Harness::new(backend);

    let effects = harness.core.equip_selected();
    harness.run(effects);
    assert_eq!(harness.core.pending_equips(), 1);
    assert!(!harness.core.progression.is_equipped("outfit_robe"));

    harness.advance(Duration::seconds(1));

    assert_eq!(harness.core.pending_equips(), 0);
    assert!(harness.core.progression.is_equipped("outfit_robe"));
    assert!(matches!(
        harness.commands.last(),
        Some(SceneCommand::ApplyCosmetics(keys)) if keys.outfit_key.as_deref() == Some("outfit_robe")
    ));
    let notice = harness.notices.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.detail.as_deref(), Some("Scholar Robe"));
}

#[test]
fn test_equip_unowned_is_rejected_locally() {
    let mut harness = Harness::new(scripted());
    let effects = harness.core.equip("hat_missing");
    harness.run(effects);

    assert!(!harness.backend.calls.contains(&"equip"));
    assert_eq!(harness.notices.last().unwrap().level, NoticeLevel::Error);
}

// -----------------------------------------------------------------------------
// Against the local authority
// -----------------------------------------------------------------------------

#[test]
fn test_full_session_against_local_authority() {
    let rules = BackendDefaults {
        seed: Some(11),
        drop_chance: 1.0,
        ..BackendDefaults::default()
    };
    let backend = LocalBackend::new(&ContentRegistry::fallback(), &[25, 50, 90], rules);
    let mut harness = Harness::new(backend);
    harness.core.select_template(2); // task_workout, training
    harness.world_event(WorldEvent::RoomEnter { room: Room::Training });

    harness.start();
    let ends_at = harness.core.session.active().unwrap().ends_at;

    harness.now = ends_at;
    harness.tick();
    harness.advance(Duration::seconds(1));
    // inventory refetch arrives on the next poll
    harness.advance(Duration::seconds(1));

    assert_eq!(harness.core.session.status(), SessionStatus::Success);
    let hero = harness.core.progression.hero.as_ref().unwrap();
    assert_eq!(hero.exp, 50);
    assert_eq!(hero.gold, 25);
    assert_eq!(harness.core.progression.inventory.len(), 1);
    let drop = harness.core.progression.reward_modal.as_ref().unwrap().dropped_item.clone();
    assert_eq!(drop.as_ref(), harness.core.progression.inventory.first());
}

#[test]
fn test_cancel_after_authority_completed_refreshes_snapshot() {
    let rules = BackendDefaults {
        seed: Some(11),
        drop_chance: 1.0,
        ..BackendDefaults::default()
    };
    let backend = LocalBackend::new(&ContentRegistry::fallback(), &[25, 50, 90], rules);
    let mut harness = Harness::new(backend);
    harness.core.select_template(2);
    harness.world_event(WorldEvent::RoomEnter { room: Room::Training });
    harness.start();
    let ends_at = harness.core.session.active().unwrap().ends_at;

    // completion goes out on the tick, the cancel lands right behind it
    harness.now = ends_at;
    harness.tick();
    let effects = harness.core.cancel();
    harness.run(effects);
    assert_eq!(harness.link.in_flight(), 2);

    harness.advance(Duration::seconds(1));
    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    assert_eq!(harness.sent_count("profile"), 2);

    harness.advance(Duration::seconds(1));
    let server = harness.backend.profile().unwrap();
    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    assert!(harness.core.progression.reward_modal.is_none());
    assert_eq!(harness.core.progression.hero.as_ref(), Some(&server.hero));
    assert_eq!(harness.core.progression.world.as_ref(), Some(&server.world_state));
    assert_eq!(harness.core.progression.world.as_ref().unwrap().total_sessions_success, 1);
    assert_eq!(harness.core.progression.inventory, harness.backend.inventory().unwrap());
    assert_eq!(harness.core.history(), harness.backend.session_history(HISTORY_LIMIT).unwrap().as_slice());
}

#[test]
fn test_cancel_rejected_for_other_reasons_does_not_refetch() {
    let mut backend = scripted();
    backend.starts.push_back(Ok(started(25, t0())));
    backend.cancels.push_back(Err(RequestError::not_found("Session not found.")));
    let mut harness = Harness::new(backend);
    harness.start();

    let effects = harness.core.cancel();
    harness.run(effects);
    harness.advance(Duration::seconds(1));

    assert_eq!(harness.core.session.status(), SessionStatus::Idle);
    assert_eq!(harness.sent_count("profile"), 1);
}

#[test]
fn test_scene_sync_relocks_running_session() {
    let mut backend = scripted();
    backend.starts.push_back(Ok(started(25, t0())));
    let mut harness = Harness::new(backend);
    harness.start();

    let sync = harness.core.scene_sync();

    assert_eq!(sync.last(), Some(&Effect::Command(SceneCommand::LockMovement)));
    assert_eq!(sync.len(), 3);
}

#[test]
fn test_world_inbox_release_stops_delivery() {
    let mut bus = EventBus::default();
    let mut inbox = WorldInbox::subscribe(&mut bus);
    bus.world.emit(&WorldEvent::RoomEnter { room: Room::Study });

    assert_eq!(inbox.release(&mut bus), WorldEvent::NAMES.len());
    assert_eq!(inbox.release(&mut bus), 0);
    assert_eq!(bus.world.emit(&WorldEvent::RoomLeave { room: Room::Study }), 0);
    assert!(inbox.inbox.drain().is_empty());
}

// -----------------------------------------------------------------------------
// Notice board
// -----------------------------------------------------------------------------

#[test]
fn test_notice_board_expires_and_caps() {
    let mut board = NoticeBoard::default();
    for n in 0..6 {
        board.push(Notice::info(format!("n{}", n)));
    }
    assert_eq!(board.toasts().len(), 4);
    assert_eq!(board.toasts()[0].notice.title, "n2");

    assert!(!board.tick(1.0));
    assert!(board.tick(3.5));
    assert!(board.toasts().is_empty());
}
