//! UI domain: task form, session countdown and recent history.

use bevy::prelude::*;

use super::format::{KEY_HELP, form_line, history_line, status_line, template_lines};
use crate::client::ClientCore;

const PANEL_WIDTH: f32 = 340.0;
const HISTORY_SHOWN: usize = 5;

#[derive(Component)]
pub struct SessionPanelUI;

#[derive(Component)]
pub struct TemplateListText;

#[derive(Component)]
pub struct SessionFormText;

#[derive(Component)]
pub struct SessionStatusText;

/// Inline guidance when the selected task needs another room.
#[derive(Component)]
pub struct SessionGuidanceText;

#[derive(Component)]
pub struct SessionHistoryText;

fn label(font_size: f32, color: Color) -> (Text, TextFont, TextColor) {
    (
        Text::new(""),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    )
}

pub(crate) fn spawn_session_panel(mut commands: Commands) {
    commands
        .spawn((
            SessionPanelUI,
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(16.0),
                top: Val::Px(16.0),
                width: Val::Px(PANEL_WIDTH),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(8.0),
                padding: UiRect::all(Val::Px(12.0)),
                border: UiRect::all(Val::Px(2.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.06, 0.09, 0.16, 0.9)),
            BorderColor::all(Color::srgb(0.2, 0.25, 0.35)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Focus Session"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.7, 0.3)),
            ));
            parent.spawn((TemplateListText, label(14.0, Color::srgb(0.85, 0.85, 0.9))));
            parent.spawn((SessionFormText, label(16.0, Color::srgb(0.9, 0.9, 0.95))));
            parent.spawn((SessionStatusText, label(22.0, Color::srgb(0.55, 0.85, 0.6))));
            parent.spawn((SessionGuidanceText, label(14.0, Color::srgb(0.99, 0.75, 0.35))));
            parent.spawn((SessionHistoryText, label(13.0, Color::srgb(0.6, 0.6, 0.7))));
            parent.spawn((
                Text::new(KEY_HELP),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgb(0.5, 0.5, 0.6)),
            ));
        });
}

pub(crate) fn update_session_panel(
    core: Res<ClientCore>,
    mut texts: ParamSet<(
        Query<&mut Text, With<TemplateListText>>,
        Query<&mut Text, With<SessionFormText>>,
        Query<&mut Text, With<SessionStatusText>>,
        Query<&mut Text, With<SessionGuidanceText>>,
        Query<&mut Text, With<SessionHistoryText>>,
    )>,
) {
    if !core.is_changed() {
        return;
    }

    let templates = template_lines(&core).join("\n");
    for mut text in &mut texts.p0() {
        **text = templates.clone();
    }
    for mut text in &mut texts.p1() {
        **text = form_line(&core);
    }
    for mut text in &mut texts.p2() {
        **text = status_line(&core);
    }
    let guidance = core.form_guidance().unwrap_or_default();
    for mut text in &mut texts.p3() {
        **text = guidance.clone();
    }

    let history: Vec<String> = core
        .history()
        .iter()
        .take(HISTORY_SHOWN)
        .map(|entry| history_line(entry, core.templates()))
        .collect();
    let history = if history.is_empty() {
        "No sessions yet".to_string()
    } else {
        format!("Recent:\n{}", history.join("\n"))
    };
    for mut text in &mut texts.p4() {
        **text = history.clone();
    }
}
