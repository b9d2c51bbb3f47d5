//! Data definitions for all RON content files.
//!
//! These structs mirror the structure in assets/data/*.ron and are used
//! for deserialization. The ContentRegistry provides lookup by id.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// Common wrapper for RON files with schema_version and items
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile<T> {
    pub schema_version: u32,
    pub items: Vec<T>,
}

// ============================================================================
// Rooms
// ============================================================================

/// A named zone of the world. `Plaza` is the neutral hub, the others host tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum Room {
    #[default]
    Plaza,
    Study,
    Build,
    Training,
}

impl Room {
    pub const ALL: [Room; 4] = [Room::Plaza, Room::Study, Room::Build, Room::Training];

    /// Wire name used in event payloads.
    pub fn key(&self) -> &'static str {
        match self {
            Room::Plaza => "plaza",
            Room::Study => "study",
            Room::Build => "build",
            Room::Training => "training",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Room::Plaza => "Central Plaza",
            Room::Study => "Study Room",
            Room::Build => "Build Room",
            Room::Training => "Training Grounds",
        }
    }

    pub fn is_hub(&self) -> bool {
        matches!(self, Room::Plaza)
    }

    pub fn base_color(&self) -> Color {
        match self {
            Room::Plaza => Color::srgb(0.06, 0.09, 0.16),
            Room::Study => Color::srgb(0.19, 0.18, 0.51),
            Room::Build => Color::srgb(0.02, 0.31, 0.23),
            Room::Training => Color::srgb(0.49, 0.18, 0.07),
        }
    }
}

impl std::fmt::Display for Room {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Rooms a task can target. The plaza is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum TaskRoom {
    Study,
    Build,
    Training,
}

impl From<TaskRoom> for Room {
    fn from(room: TaskRoom) -> Self {
        match room {
            TaskRoom::Study => Room::Study,
            TaskRoom::Build => Room::Build,
            TaskRoom::Training => Room::Training,
        }
    }
}

impl std::fmt::Display for TaskRoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Room::from(*self).fmt(f)
    }
}

// ============================================================================
// Task templates (task_templates.ron)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    #[default]
    Study,
    Build,
    Training,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Reflect)]
#[serde(rename_all = "camelCase")]
pub struct SessionTemplate {
    pub id: String,
    pub name: String,
    pub category: TaskCategory,
    pub default_duration_minutes: u32,
    pub room: TaskRoom,
}

// ============================================================================
// Cosmetics (cosmetics.ron)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Hat,
    Outfit,
    Accessory,
}

impl ItemType {
    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Hat => "hat",
            ItemType::Outfit => "outfit",
            ItemType::Accessory => "accessory",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Reflect)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
}

impl Rarity {
    /// Relative drop weight used when a cosmetic roll succeeds.
    pub fn drop_weight(&self) -> f64 {
        match self {
            Rarity::Common => 0.75,
            Rarity::Rare => 0.2,
            Rarity::Epic => 0.05,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
        }
    }

    pub fn accent_color(&self) -> Color {
        match self {
            Rarity::Common => Color::srgb(0.6, 0.65, 0.7),
            Rarity::Rare => Color::srgb(0.3, 0.55, 0.95),
            Rarity::Epic => Color::srgb(0.75, 0.4, 0.95),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Reflect)]
pub struct CosmeticDef {
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub sprite_key: String,
    #[serde(default = "default_unlock_level")]
    pub unlock_level: u32,
    #[serde(default)]
    pub room_affinity: Option<TaskRoom>,
}

fn default_unlock_level() -> u32 {
    1
}

// ============================================================================
// Gameplay defaults (gameplay_defaults.ron)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize, Resource)]
pub struct GameplayDefaults {
    pub world: WorldDefaults,
    pub session: SessionDefaults,
    pub backend: BackendDefaults,
    pub fx: FxDefaults,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorldDefaults {
    pub width: f32,
    pub height: f32,
    pub spawn: (f32, f32),
    pub avatar_half_size: (f32, f32),
    pub max_speed: f32,
    pub zones: Vec<ZoneDef>,
}

impl Default for WorldDefaults {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 720.0,
            spawn: (600.0, 360.0),
            avatar_half_size: (12.0, 16.0),
            max_speed: 230.0,
            zones: vec![
                ZoneDef::new(Room::Plaza, 450.0, 220.0, 300.0, 260.0),
                ZoneDef::new(Room::Study, 150.0, 120.0, 260.0, 220.0),
                ZoneDef::new(Room::Build, 800.0, 120.0, 260.0, 220.0),
                ZoneDef::new(Room::Training, 800.0, 440.0, 260.0, 200.0),
            ],
        }
    }
}

/// Axis-aligned zone rectangle in world units, origin at the top-left corner.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZoneDef {
    pub room: Room,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ZoneDef {
    pub fn new(room: Room, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            room,
            x,
            y,
            width,
            height,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionDefaults {
    pub allowed_durations: Vec<u32>,
    pub default_duration: u32,
    pub tick_seconds: f32,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            allowed_durations: vec![25, 50, 90],
            default_duration: 50,
            tick_seconds: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendDefaults {
    pub latency_ms: u64,
    pub seed: Option<u64>,
    pub drop_chance: f64,
    pub completion_ratio: f64,
    pub max_open_sessions: usize,
    pub study_upgrade_at: u32,
    pub build_upgrade_at: u32,
}

impl Default for BackendDefaults {
    fn default() -> Self {
        Self {
            latency_ms: 350,
            seed: None,
            drop_chance: 0.10,
            completion_ratio: 0.8,
            max_open_sessions: 2,
            study_upgrade_at: 5,
            build_upgrade_at: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FxDefaults {
    pub reward_fx_seconds: f32,
    pub particle_count: u32,
    pub particle_speed: f32,
    #[serde(default = "default_particle_lifetime")]
    pub particle_lifetime: f32,
}

fn default_particle_lifetime() -> f32 {
    0.4
}

impl Default for FxDefaults {
    fn default() -> Self {
        Self {
            reward_fx_seconds: 0.6,
            particle_count: 30,
            particle_speed: 120.0,
            particle_lifetime: default_particle_lifetime(),
        }
    }
}
