//! Client domain: application state layer between the scene and the authority.

mod notice;
mod state;
mod systems;

#[cfg(test)]
mod tests;

pub use notice::{Notice, NoticeBoard};
pub use state::{ClientCore, Effect};
pub use systems::{CountdownTicker, WorldInbox};

use bevy::prelude::*;

use crate::bus::EventBus;
use crate::content::GameplayDefaults;
use crate::session::SessionRules;
use systems::{
    bootstrap_client, drain_world_events, handle_session_keys, poll_backend, release_on_exit,
    resync_scene, tick_countdown, tick_notices,
};

pub struct ClientPlugin;

impl Plugin for ClientPlugin {
    fn build(&self, app: &mut App) {
        let defaults = app
            .world()
            .get_resource::<GameplayDefaults>()
            .cloned()
            .unwrap_or_default();

        // Subscribe before any scene mounts so its first room:enter is not missed.
        app.init_resource::<EventBus>();
        let inbox = WorldInbox::subscribe(&mut app.world_mut().resource_mut::<EventBus>());

        app.insert_resource(inbox)
        .insert_resource(ClientCore::new(
            SessionRules::from(&defaults.session),
            defaults.session.default_duration,
        ))
        .insert_resource(CountdownTicker::new(defaults.session.tick_seconds))
        .init_resource::<NoticeBoard>()
        .add_systems(Startup, bootstrap_client)
        .add_systems(
            Update,
            (
                resync_scene,
                drain_world_events,
                handle_session_keys,
                tick_countdown,
                poll_backend,
                tick_notices,
            )
                .chain(),
        )
        .add_systems(Last, release_on_exit);
    }
}
