//! UI domain: HUD panels, reward overlay and notices.

mod format;
mod hud_hero;
mod inventory_panel;
mod reward_modal;
mod room_badge;
mod session_panel;
mod toasts;

#[cfg(test)]
mod tests;

use bevy::prelude::*;

use crate::ui::hud_hero::{spawn_hero_hud, update_hero_hud};
use crate::ui::inventory_panel::{spawn_inventory_panel, update_inventory_panel};
use crate::ui::reward_modal::sync_reward_modal;
use crate::ui::room_badge::{spawn_room_badge, update_room_badge};
use crate::ui::session_panel::{spawn_session_panel, update_session_panel};
use crate::ui::toasts::{spawn_toast_stack, sync_toasts};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                spawn_hero_hud,
                spawn_room_badge,
                spawn_session_panel,
                spawn_inventory_panel,
                spawn_toast_stack,
            ),
        )
        .add_systems(
            Update,
            (
                update_hero_hud,
                update_room_badge,
                update_session_panel,
                update_inventory_panel,
                sync_reward_modal,
                sync_toasts,
            ),
        );
    }
}
