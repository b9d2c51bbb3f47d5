//! Session domain: tests for the countdown engine and the lifecycle reducer.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::countdown::seconds_left_at;
use super::*;
use crate::backend::{BackendRequest, CompleteSessionResponse, RequestError, RequestId, StartSessionResponse};
use crate::bus::SceneCommand;
use crate::content::{Room, SessionTemplate, TaskCategory, TaskRoom};
use crate::progression::{Hero, WorldState};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 15, 9, 0, 0).unwrap()
}

fn template(room: TaskRoom) -> SessionTemplate {
    SessionTemplate {
        id: format!("task_{}", room),
        name: "Focus".into(),
        category: TaskCategory::Study,
        default_duration_minutes: 25,
        room,
    }
}

fn started(id: &str, minutes: u32) -> StartSessionResponse {
    StartSessionResponse {
        session_id: SessionId::from(id),
        duration_minutes: minutes,
        started_at: t0(),
        ends_at: t0() + Duration::minutes(i64::from(minutes)),
    }
}

fn completed(success: bool) -> CompleteSessionResponse {
    let mut hero = Hero::new("hero");
    hero.exp = 50;
    hero.gold = 25;
    let mut world = WorldState::new("world", "user");
    world.total_sessions_success = 1;
    CompleteSessionResponse {
        success,
        exp_reward: 50,
        gold_reward: 25,
        dropped_item: None,
        hero,
        world_state: world,
    }
}

fn requests(effects: &[SessionEffect]) -> Vec<(RequestId, BackendRequest)> {
    effects
        .iter()
        .filter_map(|e| match e {
            SessionEffect::Request(id, request) => Some((*id, request.clone())),
            _ => None,
        })
        .collect()
}

fn start_request(machine: &mut SessionMachine, room: TaskRoom) -> RequestId {
    let effects = machine
        .apply(SessionEvent::StartRequested {
            template: Some(template(room)),
            duration_minutes: 25,
        })
        .unwrap();
    requests(&effects)[0].0
}

/// Drives a fresh machine into `running` for session "s-1".
fn running_machine() -> SessionMachine {
    let mut machine = SessionMachine::default();
    let request = start_request(&mut machine, TaskRoom::Study);
    machine
        .apply(SessionEvent::StartResolved {
            request,
            result: Ok(started("s-1", 25)),
        })
        .unwrap();
    machine
}

fn completion_request(effects: &[SessionEffect]) -> RequestId {
    let found = requests(effects);
    assert_eq!(found.len(), 1);
    assert!(matches!(found[0].1, BackendRequest::CompleteSession { .. }));
    found[0].0
}

// -----------------------------------------------------------------------------
// Countdown
// -----------------------------------------------------------------------------

#[test]
fn test_seconds_left_is_zero_for_past_deadlines() {
    let now = t0();
    for offset in [1, 59, 3600, 86_400] {
        assert_eq!(seconds_left_at(now - Duration::seconds(offset), now), 0);
    }
    assert_eq!(seconds_left_at(now, now), 0);
}

#[test]
fn test_seconds_left_counts_whole_seconds() {
    let now = t0();
    for n in [1_i64, 65, 1500, 5400] {
        assert_eq!(seconds_left_at(now + Duration::seconds(n), now), n as u64);
    }
    // floor, not round
    assert_eq!(seconds_left_at(now + Duration::milliseconds(1999), now), 1);
}

#[test]
fn test_seconds_left_uses_wall_clock() {
    let left = seconds_left(Utc::now() + Duration::seconds(30));
    assert!((29..=30).contains(&left));
}

#[test]
fn test_format_countdown() {
    assert_eq!(format_countdown(65), "01:05");
    assert_eq!(format_countdown(0), "00:00");
    assert_eq!(format_countdown(3599), "59:59");
    assert_eq!(format_countdown(5400), "90:00");
}

// -----------------------------------------------------------------------------
// Transition graph
// -----------------------------------------------------------------------------

#[test]
fn test_transition_graph() {
    use SessionStatus::*;
    let reachable = |from: SessionStatus| -> Vec<SessionStatus> {
        SessionStatus::ALL
            .into_iter()
            .filter(|to| from.can_transition_to(*to))
            .collect()
    };

    assert_eq!(reachable(Idle), vec![Pending]);
    assert_eq!(reachable(Pending), vec![Idle, Running]);
    assert_eq!(reachable(Running), vec![Success, Cancelled]);
    assert_eq!(reachable(Success), vec![Idle]);
    assert_eq!(reachable(Cancelled), vec![Idle]);
    assert_eq!(reachable(Timeout), vec![Idle]);
}

// -----------------------------------------------------------------------------
// Room gating
// -----------------------------------------------------------------------------

#[test]
fn test_start_rejected_in_wrong_room_without_request() {
    let mut machine = SessionMachine::default();
    machine.apply(SessionEvent::RoomEntered(Room::Build)).unwrap();

    let result = machine.apply(SessionEvent::StartRequested {
        template: Some(template(TaskRoom::Study)),
        duration_minutes: 25,
    });

    assert_eq!(
        result,
        Err(SessionError::Validation(ValidationError::WrongRoom {
            required: Room::Study
        }))
    );
    assert_eq!(machine.status(), SessionStatus::Idle);
    assert_eq!(machine.pending_request(), None);
}

#[test]
fn test_start_accepted_in_plaza_or_matching_room() {
    for room in [Room::Plaza, Room::Study] {
        let mut machine = SessionMachine::default();
        machine.apply(SessionEvent::RoomEntered(room)).unwrap();

        let effects = machine
            .apply(SessionEvent::StartRequested {
                template: Some(template(TaskRoom::Study)),
                duration_minutes: 50,
            })
            .unwrap();

        assert_eq!(machine.status(), SessionStatus::Pending);
        let sent = requests(&effects);
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].1,
            BackendRequest::StartSession {
                template_id: "task_study".into(),
                duration_minutes: 50
            }
        );
    }
}

#[test]
fn test_start_requires_template_and_allowed_duration() {
    let mut machine = SessionMachine::default();
    assert_eq!(
        machine.apply(SessionEvent::StartRequested {
            template: None,
            duration_minutes: 25
        }),
        Err(SessionError::Validation(ValidationError::NoTemplateSelected))
    );
    assert_eq!(
        machine.apply(SessionEvent::StartRequested {
            template: Some(template(TaskRoom::Build)),
            duration_minutes: 30
        }),
        Err(SessionError::Validation(ValidationError::UnsupportedDuration {
            minutes: 30
        }))
    );
    assert_eq!(machine.status(), SessionStatus::Idle);
}

#[test]
fn test_leaving_active_room_falls_back_to_plaza() {
    let mut machine = SessionMachine::default();
    machine.apply(SessionEvent::RoomEntered(Room::Training)).unwrap();
    machine.apply(SessionEvent::RoomLeft(Room::Training)).unwrap();
    assert_eq!(machine.active_room(), Room::Plaza);
}

// -----------------------------------------------------------------------------
// Start resolution
// -----------------------------------------------------------------------------

#[test]
fn test_start_accepted_locks_movement_and_uses_server_deadline() {
    let mut machine = SessionMachine::default();
    let request = start_request(&mut machine, TaskRoom::Study);

    let mut response = started("s-1", 25);
    response.ends_at = t0() + Duration::minutes(24);
    let effects = machine
        .apply(SessionEvent::StartResolved {
            request,
            result: Ok(response),
        })
        .unwrap();

    assert_eq!(effects, vec![SessionEffect::Command(SceneCommand::LockMovement)]);
    assert_eq!(machine.status(), SessionStatus::Running);
    let active = machine.active().unwrap();
    assert_eq!(active.session_id, SessionId::from("s-1"));
    assert_eq!(active.room, TaskRoom::Study);
    assert_eq!(machine.seconds_left(), 24 * 60);
}

#[test]
fn test_start_rejected_returns_to_idle_with_notice() {
    let mut machine = SessionMachine::default();
    let request = start_request(&mut machine, TaskRoom::Study);

    let effects = machine
        .apply(SessionEvent::StartResolved {
            request,
            result: Err(RequestError::conflict("Too many sessions in progress.")),
        })
        .unwrap();

    assert_eq!(machine.status(), SessionStatus::Idle);
    assert!(machine.active().is_none());
    assert!(matches!(effects.as_slice(), [SessionEffect::Notify(_)]));
}

#[test]
fn test_start_reply_with_wrong_generation_is_stale() {
    let mut machine = SessionMachine::default();
    let request = start_request(&mut machine, TaskRoom::Study);

    let result = machine.apply(SessionEvent::StartResolved {
        request: RequestId(request.0 + 100),
        result: Ok(started("s-9", 25)),
    });

    assert_eq!(result, Err(SessionError::StaleResponse));
    assert_eq!(machine.status(), SessionStatus::Pending);
}

#[test]
fn test_second_start_while_pending_is_rejected() {
    let mut machine = SessionMachine::default();
    start_request(&mut machine, TaskRoom::Study);

    let result = machine.apply(SessionEvent::StartRequested {
        template: Some(template(TaskRoom::Study)),
        duration_minutes: 25,
    });

    assert!(matches!(result, Err(SessionError::InvalidTransition { .. })));
}

// -----------------------------------------------------------------------------
// Completion
// -----------------------------------------------------------------------------

#[test]
fn test_tick_before_deadline_updates_countdown_only() {
    let mut machine = running_machine();
    let effects = machine
        .apply(SessionEvent::Tick {
            now: t0() + Duration::seconds(65),
        })
        .unwrap();

    assert!(effects.is_empty());
    assert_eq!(machine.seconds_left(), 25 * 60 - 65);
}

#[test]
fn test_countdown_zero_issues_exactly_one_completion() {
    let mut machine = running_machine();
    let deadline = t0() + Duration::minutes(25);

    let first = machine.apply(SessionEvent::Tick { now: deadline }).unwrap();
    completion_request(&first);

    let second = machine
        .apply(SessionEvent::Tick {
            now: deadline + Duration::seconds(1),
        })
        .unwrap();
    let timer_done = machine
        .apply(SessionEvent::TimerDone {
            session_id: SessionId::from("s-1"),
        })
        .unwrap();
    let manual = machine.apply(SessionEvent::CompleteRequested).unwrap();

    assert!(second.is_empty());
    assert!(timer_done.is_empty());
    assert!(manual.is_empty());
    assert!(machine.completion_in_flight());
}

#[test]
fn test_manual_completion_twice_sends_one_request() {
    let mut machine = running_machine();
    let first = machine.apply(SessionEvent::CompleteRequested).unwrap();
    let second = machine.apply(SessionEvent::CompleteRequested).unwrap();

    completion_request(&first);
    assert!(second.is_empty());
}

#[test]
fn test_completion_success_replaces_snapshot_and_unlocks() {
    let mut machine = running_machine();
    let effects = machine
        .apply(SessionEvent::Tick {
            now: t0() + Duration::minutes(25),
        })
        .unwrap();
    let request = completion_request(&effects);

    let response = completed(true);
    let effects = machine
        .apply(SessionEvent::CompletionResolved {
            request,
            result: Ok(response.clone()),
        })
        .unwrap();

    assert_eq!(
        effects,
        vec![
            SessionEffect::Command(SceneCommand::UnlockMovement),
            SessionEffect::Resolve(response),
        ]
    );
    assert_eq!(machine.status(), SessionStatus::Success);
    assert!(machine.active().is_none());
    let reward = machine.reward().unwrap();
    assert_eq!((reward.exp_reward, reward.gold_reward), (50, 25));
}

#[test]
fn test_completion_failure_keeps_running_and_unlocks() {
    let mut machine = running_machine();
    let request = completion_request(&machine.apply(SessionEvent::CompleteRequested).unwrap());

    let effects = machine
        .apply(SessionEvent::CompletionResolved {
            request,
            result: Err(RequestError::unprocessable("Session cannot be completed yet.")),
        })
        .unwrap();

    assert_eq!(machine.status(), SessionStatus::Running);
    assert!(!machine.completion_in_flight());
    assert!(!machine.movement_locked());
    assert_eq!(effects[0], SessionEffect::Command(SceneCommand::UnlockMovement));
    assert!(matches!(effects[1], SessionEffect::Notify(_)));

    // the user may retry
    let retry = machine.apply(SessionEvent::CompleteRequested).unwrap();
    completion_request(&retry);
}

#[test]
fn test_unsuccessful_completion_payload_is_a_failure() {
    let mut machine = running_machine();
    let request = completion_request(&machine.apply(SessionEvent::CompleteRequested).unwrap());

    machine
        .apply(SessionEvent::CompletionResolved {
            request,
            result: Ok(completed(false)),
        })
        .unwrap();

    assert_eq!(machine.status(), SessionStatus::Running);
    assert!(machine.reward().is_none());
}

#[test]
fn test_automatic_completion_fires_once_per_session() {
    let mut machine = running_machine();
    let deadline = t0() + Duration::minutes(25);
    let request = completion_request(&machine.apply(SessionEvent::Tick { now: deadline }).unwrap());
    machine
        .apply(SessionEvent::CompletionResolved {
            request,
            result: Err(RequestError::Unavailable("offline".into())),
        })
        .unwrap();

    let later = machine
        .apply(SessionEvent::Tick {
            now: deadline + Duration::seconds(5),
        })
        .unwrap();

    assert!(later.is_empty());
}

#[test]
fn test_timer_done_for_other_session_is_stale() {
    let mut machine = running_machine();
    let result = machine.apply(SessionEvent::TimerDone {
        session_id: SessionId::from("s-other"),
    });
    assert_eq!(result, Err(SessionError::StaleResponse));
    assert!(!machine.completion_in_flight());
}

#[test]
fn test_reward_dismissal_returns_to_idle() {
    let mut machine = running_machine();
    let request = completion_request(&machine.apply(SessionEvent::CompleteRequested).unwrap());
    machine
        .apply(SessionEvent::CompletionResolved {
            request,
            result: Ok(completed(true)),
        })
        .unwrap();

    machine.apply(SessionEvent::RewardDismissed).unwrap();

    assert_eq!(machine.status(), SessionStatus::Idle);
    assert!(machine.reward().is_none());
    assert!(matches!(
        machine.apply(SessionEvent::RewardDismissed),
        Err(SessionError::InvalidTransition { .. })
    ));
}

// -----------------------------------------------------------------------------
// Cancellation
// -----------------------------------------------------------------------------

#[test]
fn test_cancel_goes_idle_immediately() {
    let mut machine = running_machine();
    let effects = machine.apply(SessionEvent::CancelRequested).unwrap();

    assert_eq!(machine.status(), SessionStatus::Idle);
    assert!(machine.active().is_none());
    assert_eq!(effects[0], SessionEffect::Command(SceneCommand::UnlockMovement));
    let sent = requests(&effects);
    assert_eq!(
        sent[0].1,
        BackendRequest::CancelSession {
            session_id: SessionId::from("s-1")
        }
    );

    // the cancellation outcome changes nothing
    let outcome = machine
        .apply(SessionEvent::CancelResolved {
            request: sent[0].0,
            result: Err(RequestError::Unavailable("offline".into())),
        })
        .unwrap();
    assert!(outcome.is_empty());
    assert_eq!(machine.status(), SessionStatus::Idle);
}

#[test]
fn test_completion_reply_after_cancel_is_stale() {
    let mut machine = running_machine();
    let request = completion_request(&machine.apply(SessionEvent::CompleteRequested).unwrap());
    machine.apply(SessionEvent::CancelRequested).unwrap();

    let result = machine.apply(SessionEvent::CompletionResolved {
        request,
        result: Ok(completed(true)),
    });

    assert_eq!(result, Err(SessionError::StaleResponse));
    assert_eq!(machine.status(), SessionStatus::Idle);
    assert!(machine.reward().is_none());
}

#[test]
fn test_completion_reply_for_superseded_session_is_stale() {
    let mut machine = running_machine();
    let old = completion_request(&machine.apply(SessionEvent::CompleteRequested).unwrap());
    machine.apply(SessionEvent::CancelRequested).unwrap();

    let request = start_request(&mut machine, TaskRoom::Study);
    machine
        .apply(SessionEvent::StartResolved {
            request,
            result: Ok(started("s-2", 25)),
        })
        .unwrap();
    let current = completion_request(&machine.apply(SessionEvent::CompleteRequested).unwrap());

    assert_eq!(
        machine.apply(SessionEvent::CompletionResolved {
            request: old,
            result: Ok(completed(true)),
        }),
        Err(SessionError::StaleResponse)
    );
    assert_eq!(machine.status(), SessionStatus::Running);

    machine
        .apply(SessionEvent::CompletionResolved {
            request: current,
            result: Ok(completed(true)),
        })
        .unwrap();
    assert_eq!(machine.status(), SessionStatus::Success);
}

#[test]
fn test_cancel_outside_running_is_rejected() {
    let mut machine = SessionMachine::default();
    assert!(matches!(
        machine.apply(SessionEvent::CancelRequested),
        Err(SessionError::InvalidTransition {
            from: SessionStatus::Idle,
            ..
        })
    ));
}
