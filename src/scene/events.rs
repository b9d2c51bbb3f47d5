//! Scene domain: ECS messages around the scene lifecycle.

use bevy::ecs::message::Message;

/// Ask for the scene to be torn down and mounted again.
#[derive(Debug)]
pub struct RemountScene;

impl Message for RemountScene {}

/// Fired after a scene is mounted, so state owners can resend what it needs.
#[derive(Debug)]
pub struct SceneMounted {
    pub generation: u32,
}

impl Message for SceneMounted {}
