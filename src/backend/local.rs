//! Backend domain: in-process authority applying the progression rules.

use bevy::prelude::*;
use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use super::{
    CompleteSessionResponse, EquipAck, OrganizationSummary, Profile, RecordStatus, RequestError,
    SessionBackend, SessionHistoryEntry, StartSessionResponse, UserSummary,
};
use crate::content::{BackendDefaults, ContentRegistry, CosmeticDef, Rarity, SessionTemplate, TaskRoom};
use crate::progression::{Hero, InventoryItem, WorldState, exp_to_next_level};
use crate::session::SessionId;

#[derive(Debug, Clone)]
struct SessionRecord {
    id: SessionId,
    template_id: String,
    room: TaskRoom,
    duration_minutes: u32,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    status: RecordStatus,
    reward_exp: Option<u32>,
    reward_gold: Option<u32>,
}

impl SessionRecord {
    fn entry(&self) -> SessionHistoryEntry {
        SessionHistoryEntry {
            id: self.id.clone(),
            template_id: self.template_id.clone(),
            status: self.status,
            duration_minutes: self.duration_minutes,
            room: self.room,
            started_at: self.started_at,
            ended_at: self.ended_at,
            reward_exp: self.reward_exp,
            reward_gold: self.reward_gold,
        }
    }
}

/// Single-user authority holding hero, world, inventory and session records.
pub struct LocalBackend {
    rules: BackendDefaults,
    allowed_durations: Vec<u32>,
    templates: Vec<SessionTemplate>,
    catalog: Vec<CosmeticDef>,
    user: UserSummary,
    organization: OrganizationSummary,
    hero: Hero,
    world: WorldState,
    owned: Vec<InventoryItem>,
    sessions: Vec<SessionRecord>,
    rng: ChaCha8Rng,
}

impl LocalBackend {
    pub fn new(registry: &ContentRegistry, allowed_durations: &[u32], rules: BackendDefaults) -> Self {
        let seed = rules.seed.unwrap_or_else(rand::random::<u64>);
        let mut catalog: Vec<CosmeticDef> = registry.cosmetics.values().cloned().collect();
        catalog.sort_by(|a, b| a.id.cmp(&b.id));

        let user_id = "user-local".to_string();
        Self {
            rules,
            allowed_durations: allowed_durations.to_vec(),
            templates: registry.sorted_templates(),
            catalog,
            user: UserSummary {
                id: user_id.clone(),
                email: "hero@focus.local".into(),
                full_name: Some("Local Hero".into()),
            },
            organization: OrganizationSummary {
                id: "org-local".into(),
                name: "Focus Guild".into(),
                slug: "focus-guild".into(),
            },
            hero: Hero::new("hero-local"),
            world: WorldState::new("world-local", user_id),
            owned: Vec::new(),
            sessions: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn hero(&self) -> &Hero {
        &self.hero
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions.iter().filter(|s| s.status.is_open()).count()
    }

    /// Adds a catalog item to the inventory without a drop roll.
    #[cfg(test)]
    pub fn grant_item(&mut self, item_id: &str, now: DateTime<Utc>) -> Option<InventoryItem> {
        if self.owns(item_id) {
            return None;
        }
        let def = self.catalog.iter().find(|d| d.id == item_id)?;
        let item = inventory_item(def, now);
        self.owned.push(item.clone());
        Some(item)
    }

    fn owns(&self, item_id: &str) -> bool {
        self.owned.iter().any(|i| i.id == item_id)
    }

    fn open_record_mut(&mut self, session_id: &SessionId) -> Result<&mut SessionRecord, RequestError> {
        let record = self
            .sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| RequestError::not_found("Session not found."))?;
        if !record.status.is_open() {
            return Err(RequestError::conflict("Session already finished."));
        }
        Ok(record)
    }

    // ========================================================================
    // Rules
    // ========================================================================

    fn apply_rewards(&mut self, exp: u32, gold: u32) {
        self.hero.exp += exp;
        self.hero.gold += gold;
        while self.hero.exp >= exp_to_next_level(self.hero.level) {
            self.hero.exp -= exp_to_next_level(self.hero.level);
            self.hero.level += 1;
        }
    }

    fn record_success(&mut self, now: DateTime<Utc>) {
        let world = &mut self.world;
        world.total_sessions_success += 1;

        let today = now.date_naive();
        world.day_streak = match world.last_session_date {
            Some(last) => match (today - last).num_days() {
                0 => world.day_streak.max(1),
                1 => world.day_streak + 1,
                _ => 1,
            },
            None => 1,
        };
        world.last_session_date = Some(today);

        if world.total_sessions_success >= self.rules.study_upgrade_at {
            world.study_room_level = 2;
        }
        if world.total_sessions_success >= self.rules.build_upgrade_at {
            world.build_room_level = 2;
        }
        self.hero.streak = world.day_streak;
    }

    fn roll_drop(&mut self, room: TaskRoom, now: DateTime<Utc>) -> Option<InventoryItem> {
        if self.rng.random::<f64>() >= self.rules.drop_chance {
            return None;
        }

        let level = self.hero.level;
        let owned = &self.owned;
        let available: Vec<&CosmeticDef> = self
            .catalog
            .iter()
            .filter(|def| !owned.iter().any(|i| i.id == def.id))
            .filter(|def| def.unlock_level <= level)
            .filter(|def| def.room_affinity.is_none_or(|affinity| affinity == room))
            .collect();
        if available.is_empty() {
            return None;
        }

        let present: Vec<Rarity> = available.iter().map(|d| d.rarity).collect();
        let rarity = choose_weighted_rarity(&present, self.rng.random::<f64>());
        let mut candidates: Vec<&CosmeticDef> =
            available.iter().copied().filter(|d| d.rarity == rarity).collect();
        if candidates.is_empty() {
            candidates = available;
        }
        let def = candidates.choose(&mut self.rng)?;
        let item = inventory_item(def, now);

        let slot = self.hero.slot_mut(item.item_type);
        if slot.is_none() {
            *slot = Some(item.id.clone());
        }
        self.owned.push(item.clone());
        Some(item)
    }
}

/// Picks a rarity among those present, weighted by [`Rarity::drop_weight`].
/// `roll` is uniform in `[0, 1)`.
pub fn choose_weighted_rarity(present: &[Rarity], roll: f64) -> Rarity {
    let unique: Vec<Rarity> = [Rarity::Common, Rarity::Rare, Rarity::Epic]
        .into_iter()
        .filter(|r| present.contains(r))
        .collect();
    let total: f64 = unique.iter().map(|r| r.drop_weight()).sum();
    if total <= 0.0 {
        return Rarity::Common;
    }

    let pick = roll * total;
    let mut cumulative = 0.0;
    for rarity in unique {
        cumulative += rarity.drop_weight();
        if pick <= cumulative {
            return rarity;
        }
    }
    Rarity::Common
}

fn inventory_item(def: &CosmeticDef, now: DateTime<Utc>) -> InventoryItem {
    InventoryItem {
        id: def.id.clone(),
        name: def.name.clone(),
        item_type: def.item_type,
        rarity: def.rarity,
        sprite_key: def.sprite_key.clone(),
        obtained_at: now,
    }
}

impl SessionBackend for LocalBackend {
    fn start_session(
        &mut self,
        template_id: &str,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<StartSessionResponse, RequestError> {
        if !self.allowed_durations.contains(&duration_minutes) {
            return Err(RequestError::unprocessable("Duration is not allowed."));
        }
        let template = self
            .templates
            .iter()
            .find(|t| t.id == template_id)
            .ok_or_else(|| RequestError::not_found("Task template not found."))?;
        if self.open_sessions() >= self.rules.max_open_sessions {
            return Err(RequestError::conflict("Too many sessions in progress."));
        }

        let record = SessionRecord {
            id: SessionId::from(Uuid::new_v4().to_string()),
            template_id: template.id.clone(),
            room: template.room,
            duration_minutes,
            started_at: now,
            ended_at: None,
            status: RecordStatus::Active,
            reward_exp: None,
            reward_gold: None,
        };
        let response = StartSessionResponse {
            session_id: record.id.clone(),
            duration_minutes,
            started_at: now,
            ends_at: now + Duration::minutes(i64::from(duration_minutes)),
        };
        info!("Session {} started ({} min, {})", record.id, duration_minutes, record.room);
        self.sessions.push(record);
        Ok(response)
    }

    fn complete_session(
        &mut self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<CompleteSessionResponse, RequestError> {
        let ratio = self.rules.completion_ratio;
        let record = self.open_record_mut(session_id)?;

        let elapsed_ms = (now - record.started_at).num_milliseconds() as f64;
        let required_ms = f64::from(record.duration_minutes) * 60_000.0 * ratio;
        if elapsed_ms < required_ms {
            return Err(RequestError::unprocessable("Session cannot be completed yet."));
        }

        let exp_reward = record.duration_minutes * 2;
        let gold_reward = record.duration_minutes;
        record.status = RecordStatus::Success;
        record.ended_at = Some(now);
        record.reward_exp = Some(exp_reward);
        record.reward_gold = Some(gold_reward);
        let room = record.room;

        self.apply_rewards(exp_reward, gold_reward);
        self.record_success(now);
        let dropped_item = self.roll_drop(room, now);

        Ok(CompleteSessionResponse {
            success: true,
            exp_reward,
            gold_reward,
            dropped_item,
            hero: self.hero.clone(),
            world_state: self.world.clone(),
        })
    }

    fn cancel_session(
        &mut self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<SessionHistoryEntry, RequestError> {
        let record = self.open_record_mut(session_id)?;
        record.status = RecordStatus::Cancel;
        record.ended_at = Some(now);
        Ok(record.entry())
    }

    fn equip_item(&mut self, item_id: &str) -> Result<EquipAck, RequestError> {
        let item = self
            .owned
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| RequestError::not_found("Item not owned."))?;
        let slot = item.item_type;
        *self.hero.slot_mut(slot) = Some(item.id.clone());
        Ok(EquipAck {
            item_id: item_id.to_string(),
            slot,
        })
    }

    fn profile(&self) -> Result<Profile, RequestError> {
        Ok(Profile {
            user: self.user.clone(),
            organization: self.organization.clone(),
            hero: self.hero.clone(),
            world_state: self.world.clone(),
        })
    }

    fn task_templates(&self) -> Result<Vec<SessionTemplate>, RequestError> {
        Ok(self.templates.clone())
    }

    fn inventory(&self) -> Result<Vec<InventoryItem>, RequestError> {
        Ok(self.owned.iter().rev().cloned().collect())
    }

    fn session_history(&self, limit: usize) -> Result<Vec<SessionHistoryEntry>, RequestError> {
        Ok(self.sessions.iter().rev().take(limit).map(SessionRecord::entry).collect())
    }
}
