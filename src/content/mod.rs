//! Content domain: RON catalog loading, registry and validation.

mod data;
mod loader;
mod registry;
mod validation;


pub use data::*;
pub use loader::load_all_content;
pub use registry::ContentRegistry;
pub use validation::validate_content;

use bevy::prelude::*;
use std::path::PathBuf;

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        // Loaded eagerly so every other plugin's Startup systems can read it.
        let (registry, defaults) = load_or_fallback();
        app.register_type::<Room>()
            .register_type::<TaskRoom>()
            .register_type::<SessionTemplate>()
            .register_type::<CosmeticDef>()
            .insert_resource(registry)
            .insert_resource(defaults);
    }
}

/// Directory holding the RON data files.
pub fn data_dir() -> PathBuf {
    let root = std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    root.join("assets").join("data")
}

fn load_or_fallback() -> (ContentRegistry, GameplayDefaults) {
    let dir = data_dir();
    let (registry, defaults) = match load_all_content(&dir) {
        Ok(loaded) => loaded,
        Err(errors) => {
            for e in &errors {
                error!("{}", e);
            }
            error!(
                "Content in {} failed to load, using built-in catalog and defaults",
                dir.display()
            );
            (ContentRegistry::fallback(), GameplayDefaults::default())
        }
    };

    info!("{}", registry.summary());
    for issue in validate_content(&registry, &defaults) {
        warn!("Content validation: {}", issue);
    }

    (registry, defaults)
}
