//! UI domain: text shown by the HUD panels, kept free of ECS types.

use crate::backend::SessionHistoryEntry;
use crate::client::ClientCore;
use crate::content::{Room, SessionTemplate};
use crate::progression::Hero;
use crate::session::{RewardPayload, SessionStatus, format_countdown};

pub const KEY_HELP: &str = "[1-9] task  [Tab] duration  [Enter] start\n\
                            [C] complete  [Backspace] cancel\n\
                            [I] next item  [E] equip  [WASD] move";

pub fn level_line(hero: Option<&Hero>) -> String {
    match hero {
        Some(hero) => format!("Level {}", hero.level),
        None => "Level -".to_string(),
    }
}

pub fn exp_line(hero: Option<&Hero>, exp_to_next_level: u32) -> String {
    match hero {
        Some(hero) => format!("{} / {} EXP", hero.exp, exp_to_next_level),
        None => "Loading hero...".to_string(),
    }
}

pub fn wallet_line(hero: Option<&Hero>) -> String {
    let Some(hero) = hero else {
        return String::new();
    };
    let days = if hero.streak == 1 { "day" } else { "days" };
    format!("{} gold   {} {} streak", hero.gold, hero.streak, days)
}

pub fn room_line(room: Room) -> String {
    format!("Current room: {}", room.label())
}

/// One line per template, the selected one marked.
pub fn template_lines(core: &ClientCore) -> Vec<String> {
    if core.templates().is_empty() {
        return vec!["No tasks loaded".to_string()];
    }
    let selected = core.form().template_id.as_deref();
    core.templates()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if selected == Some(t.id.as_str()) { ">" } else { " " };
            format!(
                "{} [{}] {} ({}, {} min)",
                marker,
                i + 1,
                t.name,
                t.room,
                t.default_duration_minutes
            )
        })
        .collect()
}

pub fn form_line(core: &ClientCore) -> String {
    let task = core
        .selected_template()
        .map_or("no task selected", |t| t.name.as_str());
    format!("{} for {} min", task, core.form().duration_minutes)
}

pub fn status_line(core: &ClientCore) -> String {
    let session = &core.session;
    match session.status() {
        SessionStatus::Idle => "Ready to focus".to_string(),
        SessionStatus::Pending => "Starting session...".to_string(),
        SessionStatus::Running => {
            let countdown = format_countdown(session.seconds_left());
            if session.completion_in_flight() {
                format!("{} left, completing...", countdown)
            } else {
                format!("{} left in the {} room", countdown, session.active_room())
            }
        }
        SessionStatus::Success => "Session complete!".to_string(),
        SessionStatus::Cancelled => "Session cancelled".to_string(),
        SessionStatus::Timeout => "Session timed out".to_string(),
    }
}

pub fn history_line(entry: &SessionHistoryEntry, templates: &[SessionTemplate]) -> String {
    let name = templates
        .iter()
        .find(|t| t.id == entry.template_id)
        .map_or(entry.template_id.as_str(), |t| t.name.as_str());
    let mut line = format!(
        "{} {}m {}",
        name,
        entry.duration_minutes,
        entry.status.name()
    );
    if let Some(exp) = entry.reward_exp {
        line.push_str(&format!(" +{} EXP", exp));
    }
    line
}

pub fn inventory_lines(core: &ClientCore) -> Vec<String> {
    let items = &core.progression.inventory;
    if items.is_empty() {
        return vec!["No cosmetics yet".to_string()];
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let cursor = if i == core.inventory_cursor() { ">" } else { " " };
            let equipped = if core.progression.is_equipped(&item.id) {
                " [equipped]"
            } else {
                ""
            };
            format!(
                "{} {} ({} {}){}",
                cursor,
                item.name,
                item.rarity.display_name(),
                item.item_type.name(),
                equipped
            )
        })
        .collect()
}

pub fn reward_lines(reward: &RewardPayload) -> Vec<String> {
    let mut lines = vec![
        format!("+{} EXP", reward.exp_reward),
        format!("+{} gold", reward.gold_reward),
    ];
    match &reward.dropped_item {
        Some(item) => lines.push(format!(
            "New {} item: {}",
            item.rarity.display_name(),
            item.name
        )),
        None => lines.push("No item this time".to_string()),
    }
    lines
}
