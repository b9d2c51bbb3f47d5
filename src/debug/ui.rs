//! Debug domain: the info overlay.

use bevy::prelude::*;

use crate::backend::BackendLink;
use crate::bus::{EventBus, LOCK_MOVEMENT};
use crate::client::ClientCore;
use crate::debug::state::DebugState;
use crate::scene::WorldScene;
use crate::session::seconds_left;

/// Marker for the debug info overlay
#[derive(Component, Debug)]
pub struct DebugInfoOverlay;

pub(crate) fn spawn_debug_info_overlay(commands: &mut Commands) {
    commands.spawn((
        DebugInfoOverlay,
        Text::new("Loading..."),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.9, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(40.0),
            bottom: Val::Px(20.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ZIndex(500),
    ));
}

pub(crate) fn update_debug_info_overlay(
    mut commands: Commands,
    debug_state: Res<DebugState>,
    core: Res<ClientCore>,
    scene: Res<WorldScene>,
    link: Res<BackendLink>,
    bus: Res<EventBus>,
    mut overlay_query: Query<&mut Text, With<DebugInfoOverlay>>,
    existing_overlay: Query<Entity, With<DebugInfoOverlay>>,
) {
    if !debug_state.show_info {
        for entity in &existing_overlay {
            commands.entity(entity).despawn();
        }
        return;
    }

    if existing_overlay.is_empty() {
        spawn_debug_info_overlay(&mut commands);
        return;
    }

    let Ok(mut text) = overlay_query.single_mut() else {
        return;
    };
    let (position, locked, bursts) = scene
        .controller()
        .map_or((Vec2::ZERO, false, 0), |c| (c.position(), c.is_locked(), c.bursts().len()));
    let mut info = format!(
        "Session: {}\nRoom: {}\nPos: ({:.0}, {:.0}) locked: {}\nBursts: {}\nScene generation: {}\nIn flight: {} (latency {} ms)\nHistory: {}",
        core.session.status(),
        core.active_room(),
        position.x,
        position.y,
        locked,
        bursts,
        scene.generation,
        link.in_flight(),
        link.latency().num_milliseconds(),
        core.history().len(),
    );
    if let Some(request) = core.session.pending_request() {
        info.push_str(&format!("\nPending start: {}", request));
    }
    if let Some(active) = core.session.active() {
        info.push_str(&format!(
            "\nDeadline: {}s by wall clock",
            seconds_left(active.ends_at)
        ));
    }
    info.push_str(&format!(
        "\nBus: {} world / {} command subscribers ({} on lockMovement)",
        bus.world.subscriber_count(),
        bus.commands.subscriber_count(),
        bus.commands.listener_count(LOCK_MOVEMENT),
    ));
    if let Some((message, _)) = &debug_state.status_message {
        info.push_str(&format!("\n> {}", message));
    }
    **text = info;
}
