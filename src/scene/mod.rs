//! Scene domain: the explorable world and its bridge to the ECS.
//!
//! [`SceneController`] holds all scene logic without touching the ECS, so it
//! can be mounted, driven and torn down from tests. The systems here feed it
//! frame time and input and mirror its state onto sprites.

mod controller;
mod events;
mod input;
mod render;


pub use controller::{SceneConfig, SceneController};
pub use events::{RemountScene, SceneMounted};
pub use input::SceneInput;
pub use render::SceneEntity;

use bevy::app::AppExit;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::bus::EventBus;
use crate::content::GameplayDefaults;
use input::read_scene_input;
use render::{spawn_scene_entities, sync_avatar, sync_bursts, sync_cosmetic_layers, sync_zone_decor};

/// The mounted scene, if any, plus bookkeeping for rendered bursts.
#[derive(Resource, Debug, Default)]
pub struct WorldScene {
    pub controller: Option<SceneController>,
    pub spawned_bursts: Vec<u64>,
    pub generation: u32,
}

impl WorldScene {
    pub fn controller(&self) -> Option<&SceneController> {
        self.controller.as_ref()
    }

    /// Tears down the mounted controller. Returns the released subscription count.
    pub fn unmount(&mut self, bus: &mut EventBus) -> usize {
        self.spawned_bursts.clear();
        self.controller
            .take()
            .map_or(0, |mut controller| controller.teardown(bus))
    }

    /// Tears down the current controller (if any) and mounts a fresh one.
    pub fn remount(&mut self, config: SceneConfig, bus: &mut EventBus) -> &SceneController {
        self.unmount(bus);
        self.generation += 1;
        self.controller.insert(SceneController::mount(config, bus))
    }
}

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EventBus>()
            .init_resource::<WorldScene>()
            .init_resource::<SceneInput>()
            .add_message::<RemountScene>()
            .add_message::<SceneMounted>()
            .add_systems(Startup, mount_scene)
            .add_systems(
                Update,
                (
                    handle_remount,
                    read_scene_input,
                    update_scene,
                    sync_avatar,
                    sync_cosmetic_layers,
                    sync_zone_decor,
                    sync_bursts,
                )
                    .chain(),
            )
            .add_systems(Last, unmount_on_exit);
    }
}

fn scene_config(defaults: Option<&GameplayDefaults>) -> SceneConfig {
    defaults
        .map(|d| SceneConfig::from_defaults(&d.world, &d.fx))
        .unwrap_or_default()
}

// ============================================================================
// Systems
// ============================================================================

fn mount_scene(
    mut commands: Commands,
    defaults: Option<Res<GameplayDefaults>>,
    mut bus: ResMut<EventBus>,
    mut scene: ResMut<WorldScene>,
    mut mounted: MessageWriter<SceneMounted>,
) {
    let controller = scene.remount(scene_config(defaults.as_deref()), &mut bus);
    spawn_scene_entities(&mut commands, controller);
    mounted.write(SceneMounted {
        generation: scene.generation,
    });
}

fn handle_remount(
    mut commands: Commands,
    mut requests: MessageReader<RemountScene>,
    defaults: Option<Res<GameplayDefaults>>,
    mut bus: ResMut<EventBus>,
    mut scene: ResMut<WorldScene>,
    entities: Query<Entity, With<SceneEntity>>,
    mut mounted: MessageWriter<SceneMounted>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    for entity in &entities {
        commands.entity(entity).despawn();
    }
    let controller = scene.remount(scene_config(defaults.as_deref()), &mut bus);
    spawn_scene_entities(&mut commands, controller);
    info!("Scene remounted (generation {})", scene.generation);
    mounted.write(SceneMounted {
        generation: scene.generation,
    });
}

fn unmount_on_exit(
    mut exit: MessageReader<AppExit>,
    mut bus: ResMut<EventBus>,
    mut scene: ResMut<WorldScene>,
) {
    if exit.is_empty() {
        return;
    }
    exit.clear();
    scene.unmount(&mut bus);
}

fn update_scene(
    time: Res<Time>,
    input: Res<SceneInput>,
    mut bus: ResMut<EventBus>,
    mut scene: ResMut<WorldScene>,
) {
    if let Some(controller) = scene.controller.as_mut() {
        controller.update(time.delta_secs(), input.direction, &mut bus);
    }
}
