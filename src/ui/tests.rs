//! UI domain: tests for the text shown by the HUD panels.

use chrono::{TimeZone, Utc};

use super::format::{
    exp_line, form_line, history_line, inventory_lines, level_line, reward_lines, room_line,
    status_line, template_lines, wallet_line,
};
use crate::backend::{BackendRequest, BackendResponse, RecordStatus, Reply, RequestId, SessionHistoryEntry};
use crate::client::ClientCore;
use crate::content::{ContentRegistry, ItemType, Rarity, Room, TaskRoom};
use crate::progression::{Hero, InventoryItem};
use crate::session::{RewardPayload, SessionId, SessionRules};

fn core_with_templates() -> ClientCore {
    let mut core = ClientCore::new(SessionRules::default(), 50);
    core.on_reply(Reply {
        id: RequestId(1),
        request: BackendRequest::FetchTemplates,
        result: Ok(BackendResponse::Templates(
            ContentRegistry::fallback().sorted_templates(),
        )),
    });
    core
}

// -----------------------------------------------------------------------------
// Hero HUD
// -----------------------------------------------------------------------------

#[test]
fn test_hero_lines_before_profile_loads() {
    assert_eq!(level_line(None), "Level -");
    assert_eq!(exp_line(None, 0), "Loading hero...");
    assert_eq!(wallet_line(None), "");
}

#[test]
fn test_hero_lines_show_level_exp_and_wallet() {
    let mut hero = Hero::new("hero-1");
    hero.level = 3;
    hero.exp = 120;
    hero.gold = 45;
    hero.streak = 1;

    assert_eq!(level_line(Some(&hero)), "Level 3");
    assert_eq!(exp_line(Some(&hero), 300), "120 / 300 EXP");
    assert_eq!(wallet_line(Some(&hero)), "45 gold   1 day streak");

    hero.streak = 4;
    assert_eq!(wallet_line(Some(&hero)), "45 gold   4 days streak");
}

#[test]
fn test_room_line_uses_display_label() {
    assert_eq!(room_line(Room::Training), "Current room: Training Grounds");
}

// -----------------------------------------------------------------------------
// Session panel
// -----------------------------------------------------------------------------

#[test]
fn test_template_lines_mark_the_selected_task() {
    let mut core = core_with_templates();
    assert!(core.select_template(1));

    let lines = template_lines(&core);

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("  [1] Deep Reading"));
    assert_eq!(lines[1], "> [2] Side Project (build, 90 min)");
    assert_eq!(form_line(&core), "Side Project for 90 min");
}

#[test]
fn test_template_lines_without_templates() {
    let core = ClientCore::new(SessionRules::default(), 50);

    assert_eq!(template_lines(&core), vec!["No tasks loaded".to_string()]);
    assert_eq!(form_line(&core), "no task selected for 50 min");
    assert_eq!(status_line(&core), "Ready to focus");
}

#[test]
fn test_history_line_resolves_template_names() {
    let core = core_with_templates();
    let mut entry = SessionHistoryEntry {
        id: SessionId::from("s-1"),
        template_id: "task_workout".to_string(),
        status: RecordStatus::Success,
        duration_minutes: 25,
        room: TaskRoom::Training,
        started_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        ended_at: None,
        reward_exp: Some(50),
        reward_gold: Some(25),
    };

    assert_eq!(history_line(&entry, core.templates()), "Workout 25m success +50 EXP");

    entry.template_id = "task_retired".to_string();
    entry.status = RecordStatus::Cancel;
    entry.reward_exp = None;
    assert_eq!(history_line(&entry, core.templates()), "task_retired 25m cancelled");
}

// -----------------------------------------------------------------------------
// Inventory and rewards
// -----------------------------------------------------------------------------

fn scholar_cap() -> InventoryItem {
    InventoryItem {
        id: "inv-1".to_string(),
        name: "Scholar Cap".to_string(),
        item_type: ItemType::Hat,
        rarity: Rarity::Common,
        sprite_key: "hat_scholar".to_string(),
        obtained_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
    }
}

#[test]
fn test_inventory_lines_show_cursor_and_equipped_marker() {
    let mut core = ClientCore::new(SessionRules::default(), 50);
    assert_eq!(inventory_lines(&core), vec!["No cosmetics yet".to_string()]);

    let mut hero = Hero::new("hero-1");
    hero.equipped_hat_id = Some("inv-1".to_string());
    core.progression.hero = Some(hero);
    core.progression.inventory = vec![scholar_cap()];

    assert_eq!(
        inventory_lines(&core),
        vec!["> Scholar Cap (Common hat) [equipped]".to_string()]
    );
}

#[test]
fn test_reward_lines_with_and_without_drop() {
    let mut reward = RewardPayload {
        exp_reward: 100,
        gold_reward: 50,
        dropped_item: None,
    };
    assert_eq!(
        reward_lines(&reward),
        vec!["+100 EXP", "+50 gold", "No item this time"]
    );

    reward.dropped_item = Some(scholar_cap());
    assert_eq!(reward_lines(&reward)[2], "New Common item: Scholar Cap");
}
