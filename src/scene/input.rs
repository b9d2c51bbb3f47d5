//! Scene domain: keyboard sampling for avatar movement.

use bevy::prelude::*;

/// Movement direction for this frame in world space (y down).
#[derive(Resource, Debug, Default)]
pub struct SceneInput {
    pub direction: Vec2,
}

pub(crate) fn read_scene_input(keyboard: Res<ButtonInput<KeyCode>>, mut input: ResMut<SceneInput>) {
    let mut x = 0.0;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        x += 1.0;
    }

    let mut y = 0.0;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        y += 1.0;
    }

    input.direction = Vec2::new(x, y);
}
