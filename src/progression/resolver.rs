//! Progression domain: merges authoritative snapshots into client state.
//!
//! The server is the only source of hero and world numbers. Every merge here
//! replaces the slice wholesale and reports the scene commands that make the
//! world reflect it.

use bevy::prelude::*;
use thiserror::Error;

use super::{CosmeticKeys, Hero, HeroProgress, InventoryItem, WorldDecorState, WorldState};
use crate::backend::{CompleteSessionResponse, OrganizationSummary, Profile, UserSummary};
use crate::bus::SceneCommand;
use crate::content::ItemType;
use crate::session::RewardPayload;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipError {
    #[error("Item not owned.")]
    NotOwned,
    #[error("Profile not loaded yet.")]
    NoHero,
}

/// Hero, world and inventory as last confirmed by the authority.
#[derive(Debug, Clone, Default)]
pub struct ProgressionState {
    pub user: Option<UserSummary>,
    pub organization: Option<OrganizationSummary>,
    pub hero: Option<Hero>,
    pub world: Option<WorldState>,
    /// Newest first.
    pub inventory: Vec<InventoryItem>,
    pub reward_modal: Option<RewardPayload>,
}

impl ProgressionState {
    pub fn apply_profile(&mut self, profile: Profile) -> Vec<SceneCommand> {
        self.user = Some(profile.user);
        self.organization = Some(profile.organization);
        self.hero = Some(profile.hero);
        self.replace_world(profile.world_state);
        self.scene_snapshot()
    }

    /// Applies a successful completion and opens the reward modal.
    pub fn resolve_completion(&mut self, response: CompleteSessionResponse) -> Vec<SceneCommand> {
        let reward = RewardPayload::from(&response);
        self.hero = Some(response.hero);
        self.replace_world(response.world_state);
        if let Some(item) = &response.dropped_item {
            if !self.inventory.iter().any(|owned| owned.id == item.id) {
                self.inventory.insert(0, item.clone());
            }
            info!("Dropped {} ({})", item.name, item.rarity.display_name());
        }
        self.reward_modal = Some(reward);

        let mut commands = self.scene_snapshot();
        commands.push(SceneCommand::RewardFx {
            dropped_item: response.dropped_item,
        });
        commands
    }

    pub fn set_inventory(&mut self, items: Vec<InventoryItem>) -> Vec<SceneCommand> {
        self.inventory = items;
        vec![SceneCommand::ApplyCosmetics(self.cosmetic_keys())]
    }

    pub fn owned_item(&self, item_id: &str) -> Result<&InventoryItem, EquipError> {
        if self.hero.is_none() {
            return Err(EquipError::NoHero);
        }
        self.inventory
            .iter()
            .find(|item| item.id == item_id)
            .ok_or(EquipError::NotOwned)
    }

    /// Sets the hero slot matching the item's type once the equip is acknowledged.
    pub fn apply_equip(&mut self, item_id: &str) -> Result<Vec<SceneCommand>, EquipError> {
        let slot = self.owned_item(item_id)?.item_type;
        let hero = self.hero.as_mut().ok_or(EquipError::NoHero)?;
        *hero.slot_mut(slot) = Some(item_id.to_string());
        Ok(vec![SceneCommand::ApplyCosmetics(self.cosmetic_keys())])
    }

    pub fn is_equipped(&self, item_id: &str) -> bool {
        self.hero.as_ref().is_some_and(|hero| {
            [ItemType::Hat, ItemType::Outfit, ItemType::Accessory]
                .into_iter()
                .any(|slot| hero.equipped(slot) == Some(item_id))
        })
    }

    /// Equipped ids resolved to sprite keys. Unknown ids pass through as keys.
    pub fn cosmetic_keys(&self) -> CosmeticKeys {
        let Some(hero) = &self.hero else {
            return CosmeticKeys::default();
        };
        let resolve = |slot: ItemType| {
            hero.equipped(slot).map(|id| {
                self.inventory
                    .iter()
                    .find(|item| item.id == id)
                    .map_or_else(|| id.to_string(), |item| item.sprite_key.clone())
            })
        };
        CosmeticKeys {
            hat_key: resolve(ItemType::Hat),
            outfit_key: resolve(ItemType::Outfit),
            accessory_key: resolve(ItemType::Accessory),
        }
    }

    pub fn decor(&self) -> WorldDecorState {
        self.world.as_ref().map(WorldState::decor).unwrap_or_default()
    }

    pub fn progress(&self) -> HeroProgress {
        self.hero.as_ref().map_or_else(HeroProgress::empty, HeroProgress::of)
    }

    pub fn dismiss_reward(&mut self) -> Option<RewardPayload> {
        self.reward_modal.take()
    }

    fn replace_world(&mut self, next: WorldState) {
        if let Some(current) = &self.world {
            if current.regressed_by(&next) {
                warn!(
                    "World snapshot regressed (sessions {} -> {}), applying anyway",
                    current.total_sessions_success, next.total_sessions_success
                );
            }
        }
        self.world = Some(next);
    }

    fn scene_snapshot(&self) -> Vec<SceneCommand> {
        vec![
            SceneCommand::UpdateWorld(self.decor()),
            SceneCommand::ApplyCosmetics(self.cosmetic_keys()),
        ]
    }
}
