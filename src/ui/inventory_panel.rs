//! UI domain: owned cosmetics with the selection cursor.

use bevy::prelude::*;

use super::format::inventory_lines;
use super::hud_hero::HUD_PADDING;
use crate::client::ClientCore;

#[derive(Component)]
pub struct InventoryPanelUI;

#[derive(Component)]
pub struct InventoryListText;

pub(crate) fn spawn_inventory_panel(mut commands: Commands) {
    commands
        .spawn((
            InventoryPanelUI,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(HUD_PADDING),
                bottom: Val::Px(HUD_PADDING),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                padding: UiRect::all(Val::Px(10.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.06, 0.09, 0.16, 0.85)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Inventory"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.7, 0.3)),
            ));
            parent.spawn((
                InventoryListText,
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.85, 0.85, 0.9)),
            ));
        });
}

pub(crate) fn update_inventory_panel(
    core: Res<ClientCore>,
    mut query: Query<&mut Text, With<InventoryListText>>,
) {
    if core.is_changed() {
        let mut lines = inventory_lines(&core);
        if core.pending_equips() > 0 {
            lines.push("Equipping...".to_string());
        }
        for mut text in &mut query {
            **text = lines.join("\n");
        }
    }
}
