//! Progression domain: hero, world and inventory snapshots.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::content::{ItemType, Rarity};

/// Milestone of successful sessions at which the plaza is decorated.
pub const PLAZA_UPGRADE_THRESHOLD: u32 = 30;

// ============================================================================
// Hero
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: String,
    pub level: u32,
    pub exp: u32,
    pub gold: u32,
    pub streak: u32,
    #[serde(default)]
    pub equipped_hat_id: Option<String>,
    #[serde(default)]
    pub equipped_outfit_id: Option<String>,
    #[serde(default)]
    pub equipped_accessory_id: Option<String>,
}

impl Hero {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: 1,
            exp: 0,
            gold: 0,
            streak: 0,
            equipped_hat_id: None,
            equipped_outfit_id: None,
            equipped_accessory_id: None,
        }
    }

    pub fn equipped(&self, slot: ItemType) -> Option<&str> {
        match slot {
            ItemType::Hat => self.equipped_hat_id.as_deref(),
            ItemType::Outfit => self.equipped_outfit_id.as_deref(),
            ItemType::Accessory => self.equipped_accessory_id.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, slot: ItemType) -> &mut Option<String> {
        match slot {
            ItemType::Hat => &mut self.equipped_hat_id,
            ItemType::Outfit => &mut self.equipped_outfit_id,
            ItemType::Accessory => &mut self.equipped_accessory_id,
        }
    }

    pub fn progress(&self) -> HeroProgress {
        HeroProgress::of(self)
    }
}

pub fn exp_to_next_level(level: u32) -> u32 {
    level.max(1) * 100
}

/// Level bar numbers shown on the HUD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroProgress {
    pub exp_to_next_level: u32,
    pub progress_percent: f32,
}

impl HeroProgress {
    pub fn of(hero: &Hero) -> Self {
        let exp_to_next_level = exp_to_next_level(hero.level);
        let within = hero.exp % exp_to_next_level;
        Self {
            exp_to_next_level,
            progress_percent: (within as f32 / exp_to_next_level as f32 * 100.0).min(100.0),
        }
    }

    pub fn empty() -> Self {
        Self {
            exp_to_next_level: 0,
            progress_percent: 0.0,
        }
    }
}

// ============================================================================
// World
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub id: String,
    pub user_id: String,
    pub study_room_level: u8,
    pub build_room_level: u8,
    pub training_room_level: u8,
    pub total_sessions_success: u32,
    pub day_streak: u32,
    pub last_session_date: Option<NaiveDate>,
}

impl WorldState {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            study_room_level: 1,
            build_room_level: 1,
            training_room_level: 1,
            total_sessions_success: 0,
            day_streak: 0,
            last_session_date: None,
        }
    }

    pub fn decor(&self) -> WorldDecorState {
        WorldDecorState {
            study_level: self.study_room_level,
            build_level: self.build_room_level,
            plaza_upgrade: self.total_sessions_success >= PLAZA_UPGRADE_THRESHOLD,
        }
    }

    /// True if `next` lowers any level or the success counter.
    pub fn regressed_by(&self, next: &WorldState) -> bool {
        next.study_room_level < self.study_room_level
            || next.build_room_level < self.build_room_level
            || next.training_room_level < self.training_room_level
            || next.total_sessions_success < self.total_sessions_success
    }
}

/// Render-only projection of [`WorldState`]. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDecorState {
    pub study_level: u8,
    pub build_level: u8,
    pub plaza_upgrade: bool,
}

impl Default for WorldDecorState {
    fn default() -> Self {
        Self {
            study_level: 1,
            build_level: 1,
            plaza_upgrade: false,
        }
    }
}

// ============================================================================
// Inventory
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub sprite_key: String,
    pub obtained_at: DateTime<Utc>,
}

/// Visual keys for each cosmetic slot, as consumed by the scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticKeys {
    pub hat_key: Option<String>,
    pub outfit_key: Option<String>,
    pub accessory_key: Option<String>,
}

impl CosmeticKeys {
    pub fn key(&self, slot: ItemType) -> Option<&str> {
        match slot {
            ItemType::Hat => self.hat_key.as_deref(),
            ItemType::Outfit => self.outfit_key.as_deref(),
            ItemType::Accessory => self.accessory_key.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hat_key.is_none() && self.outfit_key.is_none() && self.accessory_key.is_none()
    }
}
