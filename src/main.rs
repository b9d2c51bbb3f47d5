mod backend;
mod bus;
mod client;
mod content;
mod core;
#[cfg(feature = "dev-tools")]
mod debug;
mod progression;
mod scene;
mod session;
mod ui;

use bevy::prelude::*;
use bevy::window::WindowResolution;

fn main() {
    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Focus Realm".to_string(),
            resolution: WindowResolution::new(1280, 720),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    // Content first: later plugins read the registry and defaults in build().
    .add_plugins((
        content::ContentPlugin,
        bus::BusPlugin,
        backend::BackendPlugin,
        core::CorePlugin,
        scene::ScenePlugin,
        client::ClientPlugin,
        ui::UiPlugin,
    ));

    #[cfg(feature = "dev-tools")]
    app.add_plugins(debug::DebugPlugin);

    app.run();
}
