//! UI domain: reward summary shown after a successful session.

use bevy::prelude::*;

use super::format::reward_lines;
use crate::client::ClientCore;
use crate::session::RewardPayload;

/// Marker for the reward overlay
#[derive(Component)]
pub struct RewardModalUI;

pub(crate) fn sync_reward_modal(
    mut commands: Commands,
    core: Res<ClientCore>,
    existing: Query<Entity, With<RewardModalUI>>,
) {
    if !core.is_changed() {
        return;
    }
    match (&core.progression.reward_modal, existing.is_empty()) {
        (Some(reward), true) => spawn_reward_modal(&mut commands, reward),
        (None, false) => {
            for entity in &existing {
                commands.entity(entity).despawn();
            }
        }
        _ => {}
    }
}

fn spawn_reward_modal(commands: &mut Commands, reward: &RewardPayload) {
    let accent = reward
        .dropped_item
        .as_ref()
        .map_or(Color::srgb(0.9, 0.9, 0.95), |item| item.rarity.accent_color());

    commands
        .spawn((
            RewardModalUI,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(0.0),
                right: Val::Px(0.0),
                top: Val::Px(0.0),
                bottom: Val::Px(0.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            ZIndex(100),
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(10.0),
                        padding: UiRect::all(Val::Px(28.0)),
                        border: UiRect::all(Val::Px(3.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.06, 0.09, 0.16)),
                    BorderColor::all(accent),
                ))
                .with_children(|card| {
                    card.spawn((
                        Text::new("Session Complete!"),
                        TextFont {
                            font_size: 36.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.99, 0.83, 0.3)),
                    ));
                    for (i, line) in reward_lines(reward).into_iter().enumerate() {
                        // the item line carries the rarity colour
                        let color = if i == 2 { accent } else { Color::srgb(0.9, 0.9, 0.95) };
                        card.spawn((
                            Text::new(line),
                            TextFont {
                                font_size: 20.0,
                                ..default()
                            },
                            TextColor(color),
                        ));
                    }
                    card.spawn((
                        Text::new("Press Space to continue"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.6, 0.6, 0.7)),
                        Node {
                            margin: UiRect::top(Val::Px(16.0)),
                            ..default()
                        },
                    ));
                });
        });
}
