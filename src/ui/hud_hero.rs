//! UI domain: hero level, experience bar and wallet.

use bevy::prelude::*;

use super::format::{exp_line, level_line, wallet_line};
use crate::client::ClientCore;

pub(crate) const HUD_PADDING: f32 = 16.0;
pub(crate) const EXP_BAR_WIDTH: f32 = 220.0;
const EXP_BAR_HEIGHT: f32 = 14.0;

/// Marker for the hero HUD container
#[derive(Component)]
pub struct HeroHudUI;

#[derive(Component)]
pub struct HeroLevelText;

#[derive(Component)]
pub struct HeroExpFill;

#[derive(Component)]
pub struct HeroExpText;

#[derive(Component)]
pub struct HeroWalletText;

pub(crate) fn spawn_hero_hud(mut commands: Commands) {
    commands
        .spawn((
            HeroHudUI,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(HUD_PADDING),
                top: Val::Px(HUD_PADDING),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                HeroLevelText,
                Text::new("Level -"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.9, 0.95)),
            ));

            // Experience bar
            parent
                .spawn((
                    Node {
                        width: Val::Px(EXP_BAR_WIDTH),
                        height: Val::Px(EXP_BAR_HEIGHT),
                        border: UiRect::all(Val::Px(2.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.1, 0.1, 0.1, 0.8)),
                    BorderColor::all(Color::srgb(0.3, 0.3, 0.3)),
                ))
                .with_children(|bar| {
                    bar.spawn((
                        HeroExpFill,
                        Node {
                            width: Val::Percent(0.0),
                            height: Val::Percent(100.0),
                            ..default()
                        },
                        BackgroundColor(Color::srgb(0.35, 0.6, 0.95)),
                    ));
                });

            parent.spawn((
                HeroExpText,
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.7, 0.75, 0.85)),
            ));

            parent.spawn((
                HeroWalletText,
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.85, 0.5)),
            ));
        });
}

pub(crate) fn update_hero_hud(
    core: Res<ClientCore>,
    mut fill_query: Query<&mut Node, With<HeroExpFill>>,
    mut level_query: Query<&mut Text, (With<HeroLevelText>, Without<HeroExpText>, Without<HeroWalletText>)>,
    mut exp_query: Query<&mut Text, (With<HeroExpText>, Without<HeroLevelText>, Without<HeroWalletText>)>,
    mut wallet_query: Query<&mut Text, (With<HeroWalletText>, Without<HeroLevelText>, Without<HeroExpText>)>,
) {
    if !core.is_changed() {
        return;
    }
    let hero = core.progression.hero.as_ref();
    let progress = core.progression.progress();

    for mut node in &mut fill_query {
        node.width = Val::Percent(progress.progress_percent);
    }
    for mut text in &mut level_query {
        **text = level_line(hero);
    }
    for mut text in &mut exp_query {
        **text = exp_line(hero, progress.exp_to_next_level);
    }
    for mut text in &mut wallet_query {
        **text = wallet_line(hero);
    }
}
