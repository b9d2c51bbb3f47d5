//! ContentRegistry resource providing HashMap lookups for all loaded content.

use bevy::prelude::*;
use std::collections::HashMap;

use super::data::*;

/// Central registry for loaded catalog content.
#[derive(Resource, Debug, Default, Clone)]
pub struct ContentRegistry {
    pub templates: HashMap<String, SessionTemplate>,
    pub cosmetics: HashMap<String, CosmeticDef>,
}

impl ContentRegistry {
    /// Returns a summary of loaded content counts for logging.
    pub fn summary(&self) -> String {
        format!(
            "ContentRegistry loaded:\n\
             - Task Templates: {}\n\
             - Cosmetics: {}",
            self.templates.len(),
            self.cosmetics.len(),
        )
    }

    /// Templates in a stable order (by id) for display and key bindings.
    pub fn sorted_templates(&self) -> Vec<SessionTemplate> {
        let mut templates: Vec<SessionTemplate> = self.templates.values().cloned().collect();
        templates.sort_by(|a, b| a.id.cmp(&b.id));
        templates
    }

    /// Built-in catalog used when the data files cannot be read.
    pub fn fallback() -> Self {
        let mut registry = Self::default();
        for template in [
            template("task_deep_reading", "Deep Reading", TaskCategory::Study, 50, TaskRoom::Study),
            template("task_side_project", "Side Project", TaskCategory::Build, 90, TaskRoom::Build),
            template("task_workout", "Workout", TaskCategory::Training, 25, TaskRoom::Training),
        ] {
            registry.templates.insert(template.id.clone(), template);
        }
        for cosmetic in [
            cosmetic("hat_scholar_cap", "Scholar Cap", ItemType::Hat, Rarity::Common, "hat_scholar"),
            cosmetic("outfit_forge_apron", "Forge Apron", ItemType::Outfit, Rarity::Rare, "outfit_apron"),
            cosmetic("acc_star_pin", "Star Pin", ItemType::Accessory, Rarity::Epic, "acc_star"),
        ] {
            registry.cosmetics.insert(cosmetic.id.clone(), cosmetic);
        }
        registry
    }
}

fn template(
    id: &str,
    name: &str,
    category: TaskCategory,
    minutes: u32,
    room: TaskRoom,
) -> SessionTemplate {
    SessionTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category,
        default_duration_minutes: minutes,
        room,
    }
}

fn cosmetic(id: &str, name: &str, item_type: ItemType, rarity: Rarity, sprite: &str) -> CosmeticDef {
    CosmeticDef {
        id: id.to_string(),
        name: name.to_string(),
        item_type,
        rarity,
        sprite_key: sprite.to_string(),
        unlock_level: 1,
        room_affinity: None,
    }
}
