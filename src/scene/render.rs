//! Scene domain: sprites, labels and particles mirroring the controller.

use bevy::prelude::*;

use super::{SceneConfig, SceneController, WorldScene};
use crate::content::{ItemType, Room};
use crate::progression::{CosmeticKeys, WorldDecorState};

const BACKGROUND: Color = crate::core::CLEAR_COLOR;
const LABEL_COLOR: Color = Color::srgb(0.89, 0.91, 0.94);
const PLAZA_UPGRADE_LABEL: Color = Color::srgb(0.99, 0.83, 0.3);
const COSMETIC_TINT: Color = Color::srgb(0.49, 0.83, 0.99);

// ============================================================================
// Components
// ============================================================================

/// Everything spawned for one mounted scene. Despawned together on remount.
#[derive(Component)]
pub struct SceneEntity;

#[derive(Component)]
pub struct ZoneTile(pub Room);

#[derive(Component)]
pub struct ZoneOutline(pub Room);

#[derive(Component)]
pub struct ZoneLabel(pub Room);

#[derive(Component)]
pub struct AvatarSprite;

#[derive(Component)]
pub struct CosmeticLayer(pub ItemType);

#[derive(Component)]
pub struct BurstParticle {
    pub burst: u64,
    pub index: usize,
}

#[derive(Component)]
pub struct BurstLabel {
    pub burst: u64,
}

// ============================================================================
// Coordinates and colours
// ============================================================================

/// World space (top-left origin, y down) to Bevy space (centred, y up).
pub fn world_to_screen(config: &SceneConfig, point: Vec2) -> Vec2 {
    Vec2::new(point.x - config.size.x / 2.0, config.size.y / 2.0 - point.y)
}

fn rect_center(config: &SceneConfig, rect: Rect) -> Vec2 {
    world_to_screen(config, rect.center())
}

/// Stable colour for a sprite key, so each cosmetic reads differently.
pub fn key_color(key: &str) -> Color {
    let hash = key
        .bytes()
        .fold(2166136261_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(16777619));
    Color::hsl((hash % 360) as f32, 0.65, 0.6)
}

pub fn avatar_tint(cosmetics: &CosmeticKeys) -> Color {
    if cosmetics.is_empty() {
        Color::WHITE
    } else {
        COSMETIC_TINT
    }
}

fn tile_color(room: Room, decor: &WorldDecorState) -> Color {
    let upgraded = room == Room::Study && decor.study_level >= 2;
    room.base_color().with_alpha(if upgraded { 0.8 } else { 0.6 })
}

fn outline_color(room: Room, decor: &WorldDecorState) -> Color {
    if room == Room::Build && decor.build_level >= 2 {
        Color::srgba(0.22, 0.74, 0.97, 0.6)
    } else {
        Color::srgba(1.0, 1.0, 1.0, 0.08)
    }
}

fn label_color(room: Room, decor: &WorldDecorState) -> Color {
    if room == Room::Plaza && decor.plaza_upgrade {
        PLAZA_UPGRADE_LABEL
    } else {
        LABEL_COLOR
    }
}

// ============================================================================
// Spawning
// ============================================================================

pub(crate) fn spawn_scene_entities(commands: &mut Commands, scene: &SceneController) {
    let config = scene.config();
    let decor = scene.decor();

    commands.spawn((
        SceneEntity,
        Sprite {
            color: BACKGROUND,
            custom_size: Some(config.size),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));

    for (room, rect) in &config.zones {
        let center = rect_center(config, *rect);
        commands.spawn((
            SceneEntity,
            ZoneOutline(*room),
            Sprite {
                color: outline_color(*room, &decor),
                custom_size: Some(rect.size() + Vec2::splat(4.0)),
                ..default()
            },
            Transform::from_xyz(center.x, center.y, 0.5),
        ));
        commands.spawn((
            SceneEntity,
            ZoneTile(*room),
            Sprite {
                color: tile_color(*room, &decor),
                custom_size: Some(rect.size()),
                ..default()
            },
            Transform::from_xyz(center.x, center.y, 1.0),
        ));
        commands.spawn((
            SceneEntity,
            ZoneLabel(*room),
            Text2d::new(room.label()),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(label_color(*room, &decor)),
            Transform::from_xyz(center.x, center.y, 2.0),
        ));
    }

    let avatar = world_to_screen(config, scene.position());
    let half = config.avatar_half_size;
    commands
        .spawn((
            SceneEntity,
            AvatarSprite,
            Sprite {
                color: avatar_tint(scene.cosmetics()),
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_xyz(avatar.x, avatar.y, 5.0),
        ))
        .with_children(|parent| {
            let layers = [
                (ItemType::Hat, Vec2::new(half.x * 1.6, 6.0), Vec2::new(0.0, half.y + 3.0)),
                (ItemType::Outfit, Vec2::new(half.x * 1.8, half.y), Vec2::new(0.0, -half.y * 0.35)),
                (ItemType::Accessory, Vec2::splat(6.0), Vec2::new(half.x + 2.0, 2.0)),
            ];
            for (slot, size, offset) in layers {
                parent.spawn((
                    CosmeticLayer(slot),
                    Sprite {
                        color: Color::WHITE,
                        custom_size: Some(size),
                        ..default()
                    },
                    Transform::from_xyz(offset.x, offset.y, 0.1),
                    Visibility::Hidden,
                ));
            }
        });
}

// ============================================================================
// Sync systems
// ============================================================================

pub(crate) fn sync_avatar(
    scene: Res<WorldScene>,
    mut avatars: Query<(&mut Transform, &mut Sprite), With<AvatarSprite>>,
) {
    let Some(controller) = scene.controller() else {
        return;
    };
    let position = world_to_screen(controller.config(), controller.position());
    for (mut transform, mut sprite) in &mut avatars {
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        sprite.color = avatar_tint(controller.cosmetics());
    }
}

pub(crate) fn sync_cosmetic_layers(
    scene: Res<WorldScene>,
    mut layers: Query<(&CosmeticLayer, &mut Sprite, &mut Visibility)>,
) {
    let Some(controller) = scene.controller() else {
        return;
    };
    let keys = controller.cosmetics();
    for (layer, mut sprite, mut visibility) in &mut layers {
        match keys.key(layer.0) {
            Some(key) => {
                sprite.color = key_color(key);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

pub(crate) fn sync_zone_decor(
    scene: Res<WorldScene>,
    mut tiles: Query<(&ZoneTile, &mut Sprite), Without<ZoneOutline>>,
    mut outlines: Query<(&ZoneOutline, &mut Sprite), Without<ZoneTile>>,
    mut labels: Query<(&ZoneLabel, &mut TextColor)>,
) {
    let Some(controller) = scene.controller() else {
        return;
    };
    let decor = controller.decor();
    for (tile, mut sprite) in &mut tiles {
        sprite.color = tile_color(tile.0, &decor);
    }
    for (outline, mut sprite) in &mut outlines {
        sprite.color = outline_color(outline.0, &decor);
    }
    for (label, mut color) in &mut labels {
        color.0 = label_color(label.0, &decor);
    }
}

/// Spawns sprites for new bursts, moves live ones and despawns finished ones.
pub(crate) fn sync_bursts(
    mut commands: Commands,
    mut scene: ResMut<WorldScene>,
    mut particles: Query<(Entity, &BurstParticle, &mut Transform, &mut Sprite)>,
    burst_labels: Query<(Entity, &BurstLabel)>,
) {
    let WorldScene {
        controller,
        spawned_bursts,
        ..
    } = &mut *scene;
    let Some(controller) = controller.as_ref() else {
        return;
    };
    let config = controller.config();
    let bursts = controller.bursts();

    for burst in bursts {
        if spawned_bursts.contains(&burst.id) {
            continue;
        }
        spawned_bursts.push(burst.id);
        let color = burst
            .dropped_item
            .as_ref()
            .map_or(PLAZA_UPGRADE_LABEL, |item| item.rarity.accent_color());
        for (index, particle) in burst.particles.iter().enumerate() {
            let at = world_to_screen(config, burst.particle_position(particle));
            commands.spawn((
                SceneEntity,
                BurstParticle {
                    burst: burst.id,
                    index,
                },
                Sprite {
                    color,
                    custom_size: Some(Vec2::splat(4.0)),
                    ..default()
                },
                Transform::from_xyz(at.x, at.y, 6.0),
            ));
        }
        if let Some(item) = &burst.dropped_item {
            let at = world_to_screen(config, burst.origin);
            commands.spawn((
                SceneEntity,
                BurstLabel { burst: burst.id },
                Text2d::new(format!("{} ({})", item.name, item.rarity.display_name())),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(item.rarity.accent_color()),
                Transform::from_xyz(at.x, at.y + 36.0, 7.0),
            ));
        }
    }

    for (entity, marker, mut transform, mut sprite) in &mut particles {
        let live = bursts.iter().find(|b| b.id == marker.burst);
        match live.and_then(|b| b.particles.get(marker.index).map(|p| (b, p))) {
            Some((burst, particle)) => {
                let at = world_to_screen(config, burst.particle_position(particle));
                transform.translation.x = at.x;
                transform.translation.y = at.y;
                sprite.custom_size = Some(Vec2::splat(4.0 * burst.particle_scale().max(0.05)));
            }
            None => commands.entity(entity).despawn(),
        }
    }
    for (entity, label) in &burst_labels {
        if !bursts.iter().any(|b| b.id == label.burst) {
            commands.entity(entity).despawn();
        }
    }

    spawned_bursts.retain(|id| bursts.iter().any(|b| b.id == *id));
}
