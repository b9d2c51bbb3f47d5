//! Bus domain: event and command payloads shared by the session layer and the scene.

use crate::content::Room;
use crate::progression::{CosmeticKeys, InventoryItem, WorldDecorState};
use crate::session::SessionId;

/// Anything that travels over a [`Channel`](super::Channel) has a stable wire name.
pub trait BusEvent {
    fn name(&self) -> &'static str;
}

pub const ROOM_ENTER: &str = "room:enter";
pub const ROOM_LEAVE: &str = "room:leave";
pub const SESSION_TIMER_DONE: &str = "session:timer:done";

pub const LOCK_MOVEMENT: &str = "lockMovement";
pub const UNLOCK_MOVEMENT: &str = "unlockMovement";
pub const UPDATE_WORLD: &str = "updateWorld";
pub const APPLY_COSMETICS: &str = "applyCosmetics";
pub const REWARD_FX: &str = "rewardFx";

/// Scene to app: things that happened in the world.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    RoomEnter { room: Room },
    RoomLeave { room: Room },
    TimerDone { session_id: SessionId },
}

impl WorldEvent {
    pub const NAMES: [&'static str; 3] = [ROOM_ENTER, ROOM_LEAVE, SESSION_TIMER_DONE];
}

impl BusEvent for WorldEvent {
    fn name(&self) -> &'static str {
        match self {
            WorldEvent::RoomEnter { .. } => ROOM_ENTER,
            WorldEvent::RoomLeave { .. } => ROOM_LEAVE,
            WorldEvent::TimerDone { .. } => SESSION_TIMER_DONE,
        }
    }
}

/// App to scene: commands the rendering surface must obey.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    LockMovement,
    UnlockMovement,
    UpdateWorld(WorldDecorState),
    ApplyCosmetics(CosmeticKeys),
    RewardFx { dropped_item: Option<InventoryItem> },
}

impl SceneCommand {
    pub const NAMES: [&'static str; 5] = [
        LOCK_MOVEMENT,
        UNLOCK_MOVEMENT,
        UPDATE_WORLD,
        APPLY_COSMETICS,
        REWARD_FX,
    ];
}

impl BusEvent for SceneCommand {
    fn name(&self) -> &'static str {
        match self {
            SceneCommand::LockMovement => LOCK_MOVEMENT,
            SceneCommand::UnlockMovement => UNLOCK_MOVEMENT,
            SceneCommand::UpdateWorld(_) => UPDATE_WORLD,
            SceneCommand::ApplyCosmetics(_) => APPLY_COSMETICS,
            SceneCommand::RewardFx { .. } => REWARD_FX,
        }
    }
}
