//! Client domain: systems wiring ClientCore to the bus, the backend and the keyboard.

use bevy::app::AppExit;
use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use chrono::{DateTime, Utc};

use super::{ClientCore, Effect, NoticeBoard};
use crate::backend::{Authority, BackendLink};
use crate::bus::{EventBus, Inbox, SubscriptionSet, WorldEvent};
use crate::scene::SceneMounted;
use crate::session::SessionStatus;

/// Scene-to-app events waiting for the client. Subscribed for the app's lifetime.
#[derive(Resource, Debug)]
pub struct WorldInbox {
    pub inbox: Inbox<WorldEvent>,
    subscriptions: SubscriptionSet,
}

impl WorldInbox {
    pub fn subscribe(bus: &mut EventBus) -> Self {
        let inbox = Inbox::new();
        let subscriptions = bus.world.subscribe_inbox(&WorldEvent::NAMES, &inbox);
        Self {
            inbox,
            subscriptions,
        }
    }

    /// Drops every world subscription and anything still queued.
    pub fn release(&mut self, bus: &mut EventBus) -> usize {
        let released = self.subscriptions.release(&mut bus.world);
        self.inbox.clear();
        released
    }
}

/// Drives the countdown at a fixed cadence. The cadence is cosmetic.
#[derive(Resource, Debug)]
pub struct CountdownTicker {
    pub timer: Timer,
}

impl CountdownTicker {
    pub fn new(seconds: f32) -> Self {
        Self {
            timer: Timer::from_seconds(seconds.max(0.05), TimerMode::Repeating),
        }
    }
}

// ============================================================================
// Effect runner
// ============================================================================

pub(crate) fn run_effects(
    effects: Vec<Effect>,
    bus: &mut EventBus,
    link: &mut BackendLink,
    notices: &mut NoticeBoard,
    now: DateTime<Utc>,
) {
    for effect in effects {
        match effect {
            Effect::Command(command) => {
                let delivered = bus.commands.emit(&command);
                if delivered == 0 {
                    debug!("No scene listening for {:?}", command);
                }
            }
            Effect::Request(id, request) => link.submit(id, request, now),
            Effect::Notify(notice) => {
                info!("Notice: {}", notice);
                notices.push(notice);
            }
        }
    }
}

// ============================================================================
// Systems
// ============================================================================

pub(crate) fn bootstrap_client(
    mut core: ResMut<ClientCore>,
    mut bus: ResMut<EventBus>,
    mut link: ResMut<BackendLink>,
    mut notices: ResMut<NoticeBoard>,
) {
    let effects = core.bootstrap();
    run_effects(effects, &mut bus, &mut link, &mut notices, Utc::now());
}

/// A freshly mounted scene starts from defaults; replay lock, decor and cosmetics.
pub(crate) fn resync_scene(
    mut mounted: MessageReader<SceneMounted>,
    core: Res<ClientCore>,
    mut bus: ResMut<EventBus>,
    mut link: ResMut<BackendLink>,
    mut notices: ResMut<NoticeBoard>,
) {
    let Some(last) = mounted.read().last() else {
        return;
    };
    debug!("Resyncing scene generation {}", last.generation);
    run_effects(core.scene_sync(), &mut bus, &mut link, &mut notices, Utc::now());
}

pub(crate) fn drain_world_events(
    inbox: Res<WorldInbox>,
    mut core: ResMut<ClientCore>,
    mut bus: ResMut<EventBus>,
    mut link: ResMut<BackendLink>,
    mut notices: ResMut<NoticeBoard>,
) {
    for event in inbox.inbox.drain() {
        let effects = core.on_world_event(&event);
        run_effects(effects, &mut bus, &mut link, &mut notices, Utc::now());
    }
}

/// Recomputes remaining time. Reaching zero triggers completion inside the machine.
pub(crate) fn tick_countdown(
    time: Res<Time>,
    mut ticker: ResMut<CountdownTicker>,
    mut core: ResMut<ClientCore>,
    mut bus: ResMut<EventBus>,
    mut link: ResMut<BackendLink>,
    mut notices: ResMut<NoticeBoard>,
) {
    ticker.timer.tick(time.delta());
    if !ticker.timer.just_finished() {
        return;
    }

    let now = Utc::now();
    let effects = core.tick(now);
    run_effects(effects, &mut bus, &mut link, &mut notices, now);
}

pub(crate) fn poll_backend(
    mut authority: ResMut<Authority>,
    mut core: ResMut<ClientCore>,
    mut bus: ResMut<EventBus>,
    mut link: ResMut<BackendLink>,
    mut notices: ResMut<NoticeBoard>,
) {
    if link.is_idle() {
        return;
    }
    let now = Utc::now();
    let replies = link.poll(authority.backend_mut(), now);
    for reply in replies {
        let effects = core.on_reply(reply);
        run_effects(effects, &mut bus, &mut link, &mut notices, now);
    }
}

pub(crate) fn handle_session_keys(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut core: ResMut<ClientCore>,
    mut bus: ResMut<EventBus>,
    mut link: ResMut<BackendLink>,
    mut notices: ResMut<NoticeBoard>,
) {
    const TEMPLATE_KEYS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];

    let mut effects = Vec::new();

    if core.session.status() == SessionStatus::Idle {
        for (index, key) in TEMPLATE_KEYS.iter().enumerate() {
            if keyboard.just_pressed(*key) && core.select_template(index) {
                debug!("Selected template {}", index + 1);
            }
        }
        if keyboard.just_pressed(KeyCode::Tab) {
            core.cycle_duration();
        }
        if keyboard.just_pressed(KeyCode::Enter) {
            effects.extend(core.submit_start());
        }
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        effects.extend(core.complete_now());
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        effects.extend(core.cancel());
    }
    let dismiss = keyboard.just_pressed(KeyCode::Space) || keyboard.just_pressed(KeyCode::Escape);
    if dismiss && core.session.status().is_terminal() {
        effects.extend(core.dismiss_reward());
    }
    if keyboard.just_pressed(KeyCode::KeyI) {
        core.cycle_inventory();
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        effects.extend(core.equip_selected());
    }

    if !effects.is_empty() {
        run_effects(effects, &mut bus, &mut link, &mut notices, Utc::now());
    }
}

pub(crate) fn release_on_exit(
    mut exit: MessageReader<AppExit>,
    mut inbox: ResMut<WorldInbox>,
    mut bus: ResMut<EventBus>,
) {
    if exit.is_empty() {
        return;
    }
    exit.clear();
    let released = inbox.release(&mut bus);
    info!("Client released {} world subscriptions", released);
}

pub(crate) fn tick_notices(time: Res<Time>, mut notices: ResMut<NoticeBoard>) {
    if notices.toasts().is_empty() {
        return;
    }
    // mark changed only on expiry
    let expired = notices.bypass_change_detection().tick(time.delta_secs());
    if expired {
        notices.set_changed();
    }
}
