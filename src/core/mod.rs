//! Core domain: window-level setup shared by every other plugin.

use bevy::prelude::*;

/// Matches the world background so letterboxing is invisible.
pub const CLEAR_COLOR: Color = Color::srgb(0.008, 0.024, 0.09);

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(CLEAR_COLOR))
            .add_systems(Startup, setup_camera);
    }
}

pub(crate) fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
