//! Validation for catalog entries and world layout.

use thiserror::Error;

use super::data::*;
use super::registry::ContentRegistry;

/// A validation finding with context about what failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentIssue {
    #[error("Template '{template_id}' uses unsupported default duration {minutes} min")]
    UnsupportedTemplateDuration { template_id: String, minutes: u32 },
    #[error("Default session duration {0} min is not in the allowed list")]
    UnsupportedDefaultDuration(u32),
    #[error("Cosmetic '{0}' has an empty sprite key")]
    MissingSpriteKey(String),
    #[error("Room {0} has no zone")]
    MissingZone(Room),
    #[error("Room {0} has more than one zone")]
    DuplicateZone(Room),
    #[error("Zones for {first} and {second} overlap")]
    OverlappingZones { first: Room, second: Room },
    #[error("Zone for {0} extends past the world bounds")]
    ZoneOutOfBounds(Room),
    #[error("Spawn point ({x}, {y}) is outside the world")]
    SpawnOutOfBounds { x: f32, y: f32 },
}

/// Validate catalog entries and the world layout.
/// Returns a list of issues, empty if everything is consistent.
pub fn validate_content(registry: &ContentRegistry, defaults: &GameplayDefaults) -> Vec<ContentIssue> {
    let mut issues = Vec::new();
    let allowed = &defaults.session.allowed_durations;

    for (id, template) in &registry.templates {
        if !allowed.contains(&template.default_duration_minutes) {
            issues.push(ContentIssue::UnsupportedTemplateDuration {
                template_id: id.clone(),
                minutes: template.default_duration_minutes,
            });
        }
    }

    if !allowed.contains(&defaults.session.default_duration) {
        issues.push(ContentIssue::UnsupportedDefaultDuration(
            defaults.session.default_duration,
        ));
    }

    for (id, cosmetic) in &registry.cosmetics {
        if cosmetic.sprite_key.trim().is_empty() {
            issues.push(ContentIssue::MissingSpriteKey(id.clone()));
        }
    }

    issues.extend(validate_world(&defaults.world));
    issues
}

/// Zones must cover every room exactly once, stay inside the world and never overlap.
pub fn validate_world(world: &WorldDefaults) -> Vec<ContentIssue> {
    let mut issues = Vec::new();

    for room in Room::ALL {
        match world.zones.iter().filter(|z| z.room == room).count() {
            0 => issues.push(ContentIssue::MissingZone(room)),
            1 => {}
            _ => issues.push(ContentIssue::DuplicateZone(room)),
        }
    }

    for zone in &world.zones {
        if zone.x < 0.0
            || zone.y < 0.0
            || zone.x + zone.width > world.width
            || zone.y + zone.height > world.height
        {
            issues.push(ContentIssue::ZoneOutOfBounds(zone.room));
        }
    }

    for (i, first) in world.zones.iter().enumerate() {
        for second in world.zones.iter().skip(i + 1) {
            let overlap = first.rect().intersect(second.rect());
            // Shared edges are fine, only a positive-area intersection counts.
            if overlap.width() > 0.0 && overlap.height() > 0.0 {
                issues.push(ContentIssue::OverlappingZones {
                    first: first.room,
                    second: second.room,
                });
            }
        }
    }

    let (x, y) = world.spawn;
    if x < 0.0 || y < 0.0 || x > world.width || y > world.height {
        issues.push(ContentIssue::SpawnOutOfBounds { x, y });
    }

    issues
}
