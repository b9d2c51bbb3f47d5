//! UI domain: badge naming the room the avatar stands in.

use bevy::prelude::*;

use super::format::room_line;
use crate::client::ClientCore;

#[derive(Component)]
pub struct RoomBadgeUI;

#[derive(Component)]
pub struct RoomBadgeText;

pub(crate) fn spawn_room_badge(mut commands: Commands) {
    commands
        .spawn((
            RoomBadgeUI,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(16.0),
                left: Val::Percent(40.0),
                padding: UiRect::axes(Val::Px(14.0), Val::Px(6.0)),
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.06, 0.09, 0.16, 0.9)),
            BorderColor::all(Color::srgb(0.3, 0.3, 0.4)),
        ))
        .with_children(|parent| {
            parent.spawn((
                RoomBadgeText,
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.89, 0.91, 0.94)),
            ));
        });
}

pub(crate) fn update_room_badge(
    core: Res<ClientCore>,
    mut badge_query: Query<&mut BorderColor, With<RoomBadgeUI>>,
    mut text_query: Query<&mut Text, With<RoomBadgeText>>,
) {
    if !core.is_changed() {
        return;
    }
    let room = core.active_room();
    for mut border in &mut badge_query {
        *border = BorderColor::all(room.base_color());
    }
    for mut text in &mut text_query {
        **text = room_line(room);
    }
}
