//! Scene domain: the headless scene controller.
//!
//! Positions are world units with the origin at the top-left corner and y
//! pointing down. The controller owns the avatar, the zone geometry and the
//! movement lock. It only talks to the rest of the app through the
//! [`EventBus`]: commands arrive in its inbox, room changes leave on the world
//! channel.

use bevy::prelude::*;
use std::f32::consts::TAU;

use crate::bus::{EventBus, Inbox, SceneCommand, SubscriptionSet, WorldEvent};
use crate::content::{FxDefaults, Room, WorldDefaults};
use crate::progression::{CosmeticKeys, InventoryItem, WorldDecorState};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RewardFxConfig {
    pub lifetime: f32,
    pub particle_count: u32,
    pub particle_speed: f32,
    pub particle_lifetime: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub size: Vec2,
    pub spawn: Vec2,
    pub avatar_half_size: Vec2,
    pub max_speed: f32,
    /// Checked in order; the first zone containing the avatar wins.
    pub zones: Vec<(Room, Rect)>,
    pub fx: RewardFxConfig,
}

impl SceneConfig {
    pub fn from_defaults(world: &WorldDefaults, fx: &FxDefaults) -> Self {
        Self {
            size: Vec2::new(world.width, world.height),
            spawn: Vec2::new(world.spawn.0, world.spawn.1),
            avatar_half_size: Vec2::new(world.avatar_half_size.0, world.avatar_half_size.1),
            max_speed: world.max_speed,
            zones: world.zones.iter().map(|z| (z.room, z.rect())).collect(),
            fx: RewardFxConfig {
                lifetime: fx.reward_fx_seconds,
                particle_count: fx.particle_count,
                particle_speed: fx.particle_speed,
                particle_lifetime: fx.particle_lifetime,
            },
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::from_defaults(&WorldDefaults::default(), &FxDefaults::default())
    }
}

// ============================================================================
// Reward effect
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub velocity: Vec2,
}

/// A burst of particles at a fixed origin. Removed once `elapsed` reaches `lifetime`.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardBurst {
    pub id: u64,
    pub origin: Vec2,
    pub elapsed: f32,
    pub lifetime: f32,
    pub particle_lifetime: f32,
    pub particles: Vec<Particle>,
    pub dropped_item: Option<InventoryItem>,
}

impl RewardBurst {
    fn new(id: u64, origin: Vec2, fx: &RewardFxConfig, dropped_item: Option<InventoryItem>) -> Self {
        let count = fx.particle_count.max(1);
        let particles = (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                // spread speeds so the ring breaks up
                let spread = 0.6 + 0.4 * ((i * 7) % 5) as f32 / 4.0;
                Particle {
                    velocity: Vec2::from_angle(angle) * fx.particle_speed * spread,
                }
            })
            .collect();
        Self {
            id,
            origin,
            elapsed: 0.0,
            lifetime: fx.lifetime,
            particle_lifetime: fx.particle_lifetime.min(fx.lifetime),
            particles,
            dropped_item,
        }
    }

    pub fn particle_position(&self, particle: &Particle) -> Vec2 {
        let t = self.elapsed.min(self.particle_lifetime);
        self.origin + particle.velocity * t
    }

    /// 1.0 at spawn, 0.0 once particles have faded.
    pub fn particle_scale(&self) -> f32 {
        if self.particle_lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed / self.particle_lifetime).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.lifetime
    }
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug)]
pub struct SceneController {
    config: SceneConfig,
    position: Vec2,
    velocity: Vec2,
    current_room: Room,
    locked: bool,
    cosmetics: CosmeticKeys,
    decor: WorldDecorState,
    bursts: Vec<RewardBurst>,
    next_burst: u64,
    inbox: Inbox<SceneCommand>,
    subscriptions: SubscriptionSet,
}

impl SceneController {
    /// Subscribes to every command and announces the starting room.
    pub fn mount(config: SceneConfig, bus: &mut EventBus) -> Self {
        let inbox = Inbox::new();
        let subscriptions = bus.commands.subscribe_inbox(&SceneCommand::NAMES, &inbox);

        let mut scene = Self {
            position: config.spawn,
            config,
            velocity: Vec2::ZERO,
            current_room: Room::Plaza,
            locked: false,
            cosmetics: CosmeticKeys::default(),
            decor: WorldDecorState::default(),
            bursts: Vec::new(),
            next_burst: 0,
            inbox,
            subscriptions,
        };
        scene.current_room = scene.detect_room(scene.position);
        bus.world.emit(&WorldEvent::RoomEnter {
            room: scene.current_room,
        });
        info!(
            "Scene mounted in {} with {} command subscriptions",
            scene.current_room,
            scene.subscriptions.len()
        );
        scene
    }

    /// Releases every command subscription. Calling it again is harmless.
    pub fn teardown(&mut self, bus: &mut EventBus) -> usize {
        let released = self.subscriptions.release(&mut bus.commands);
        self.inbox.clear();
        self.bursts.clear();
        self.velocity = Vec2::ZERO;
        if released > 0 {
            info!("Scene torn down, released {} subscriptions", released);
        }
        released
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    // ========================================================================
    // Per-frame update
    // ========================================================================

    /// Advances one frame. `direction` is the raw input axis in world space.
    pub fn update(&mut self, dt: f32, direction: Vec2, bus: &mut EventBus) {
        if !self.is_mounted() {
            return;
        }
        self.process_commands();

        self.velocity = self.velocity_for(direction);
        let min = self.config.avatar_half_size;
        let max = (self.config.size - self.config.avatar_half_size).max(min);
        self.position = (self.position + self.velocity * dt).clamp(min, max);

        self.check_room_transition(bus);
        self.advance_bursts(dt);
    }

    pub fn process_commands(&mut self) -> usize {
        let commands = self.inbox.drain();
        let count = commands.len();
        for command in commands {
            self.apply_command(command);
        }
        count
    }

    pub fn apply_command(&mut self, command: SceneCommand) {
        match command {
            SceneCommand::LockMovement => {
                self.locked = true;
                self.velocity = Vec2::ZERO;
            }
            SceneCommand::UnlockMovement => self.locked = false,
            SceneCommand::UpdateWorld(decor) => self.decor = decor,
            SceneCommand::ApplyCosmetics(keys) => self.cosmetics = keys,
            SceneCommand::RewardFx { dropped_item } => {
                self.next_burst += 1;
                self.bursts.push(RewardBurst::new(
                    self.next_burst,
                    self.position,
                    &self.config.fx,
                    dropped_item,
                ));
            }
        }
    }

    pub fn velocity_for(&self, direction: Vec2) -> Vec2 {
        if self.locked {
            return Vec2::ZERO;
        }
        (direction.normalize_or_zero() * self.config.max_speed).clamp_length_max(self.config.max_speed)
    }

    /// The room whose zone contains `point`, or the plaza outside every zone.
    pub fn detect_room(&self, point: Vec2) -> Room {
        self.config
            .zones
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(room, _)| *room)
            .unwrap_or(Room::Plaza)
    }

    fn check_room_transition(&mut self, bus: &mut EventBus) {
        let room = self.detect_room(self.position);
        if room == self.current_room {
            return;
        }
        debug!("Avatar moved {} -> {}", self.current_room, room);
        bus.world.emit(&WorldEvent::RoomLeave {
            room: self.current_room,
        });
        self.current_room = room;
        bus.world.emit(&WorldEvent::RoomEnter { room });
    }

    fn advance_bursts(&mut self, dt: f32) {
        for burst in &mut self.bursts {
            burst.elapsed += dt;
        }
        self.bursts.retain(|b| !b.is_finished());
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn current_room(&self) -> Room {
        self.current_room
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn cosmetics(&self) -> &CosmeticKeys {
        &self.cosmetics
    }

    pub fn decor(&self) -> WorldDecorState {
        self.decor
    }

    pub fn bursts(&self) -> &[RewardBurst] {
        &self.bursts
    }

    #[cfg(test)]
    pub(crate) fn place_avatar(&mut self, position: Vec2) {
        self.position = position;
    }
}
