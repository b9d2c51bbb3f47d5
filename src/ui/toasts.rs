//! UI domain: transient notices stacked at the bottom right.

use bevy::prelude::*;

use crate::client::NoticeBoard;

#[derive(Component)]
pub struct ToastStackUI;

#[derive(Component)]
pub struct ToastEntry;

pub(crate) fn spawn_toast_stack(mut commands: Commands) {
    commands.spawn((
        ToastStackUI,
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(16.0),
            bottom: Val::Px(16.0),
            width: Val::Px(340.0),
            flex_direction: FlexDirection::ColumnReverse,
            row_gap: Val::Px(6.0),
            ..default()
        },
        ZIndex(50),
    ));
}

/// Rebuilds the stack whenever the board changes.
pub(crate) fn sync_toasts(
    mut commands: Commands,
    notices: Res<NoticeBoard>,
    stack: Query<Entity, With<ToastStackUI>>,
    entries: Query<Entity, With<ToastEntry>>,
) {
    if !notices.is_changed() {
        return;
    }
    let Ok(stack) = stack.single() else {
        return;
    };

    for entity in &entries {
        commands.entity(entity).despawn();
    }

    commands.entity(stack).with_children(|parent| {
        for toast in notices.toasts() {
            let notice = &toast.notice;
            parent
                .spawn((
                    ToastEntry,
                    Node {
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(8.0)),
                        border: UiRect::left(Val::Px(4.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.06, 0.09, 0.16, 0.95)),
                    BorderColor::all(notice.level.color()),
                ))
                .with_children(|entry| {
                    entry.spawn((
                        Text::new(notice.title.clone()),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(notice.level.color()),
                    ));
                    if let Some(detail) = &notice.detail {
                        entry.spawn((
                            Text::new(detail.clone()),
                            TextFont {
                                font_size: 13.0,
                                ..default()
                            },
                            TextColor(Color::srgb(0.8, 0.8, 0.85)),
                        ));
                    }
                });
        }
    });
}
