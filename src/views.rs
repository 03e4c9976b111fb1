//! Terminal rendering of the service's models.

use std::fmt::Write;

use itertools::Itertools;

use crate::api::models::*;

pub fn heading(title: &str) -> String {
    format!("\n--- {} ---", title)
}

pub fn profile(profile: &Profile) -> String {
    [
        format!("  Username:  {}", profile.username),
        format!("  Level:     {}", profile.level),
        format!("  Currency:  {}g", profile.currency),
        format!("  Rating:    {}", profile.rating),
        format!("  Roster:    {} units", profile.roster_count),
        format!("  Teams:     {} teams", profile.team_count),
    ]
    .join("\n")
}

fn stats(stats: &UnitStats) -> String {
    format!(
        "HP:{:>3}  ATK:{:>3}  DEF:{:>3}  SPD:{:>3}",
        stats.health, stats.attack, stats.defense, stats.speed,
    )
}

pub fn shop_unit(unit: &ShopUnit) -> String {
    format!(
        "  [{:7}] {:20}  {}  Cost:{:>4}g{}",
        unit.class_,
        unit.name,
        stats(&unit.stats),
        unit.unlock_cost,
        if unit.already_owned { " (owned)" } else { "" },
    )
}

pub fn roster_unit(unit: &RosterUnit) -> String {
    let abilities = unit.abilities.iter().map(|ability| &ability.name).join(", ");
    format!(
        "  [{:7}] {:20}  Lv.{}  {}  Abilities: {}",
        unit.class_,
        unit.name,
        unit.level,
        stats(&unit.stats),
        if abilities.is_empty() { "none" } else { abilities.as_str() },
    )
}

pub fn roster(units: &[RosterUnit]) -> String {
    if units.is_empty() {
        return "  (empty, buy units from the shop)".to_string();
    }
    units.iter().map(roster_unit).join("\n")
}

pub fn team(team: &Team) -> String {
    format!("  Team '{}' (#{}) with {} units", team.name, team.id, team.units.len())
}

pub fn queue_status(status: &QueueStatus) -> String {
    format!("  Battle ID: {}\n  Status:    {}", status.battle_id, status.status)
}

/// Renders the battle outcome with at most `n_log_entries` combat log entries.
pub fn battle_result(result: &BattleResult, n_log_entries: usize) -> String {
    let mut output = String::new();
    match result.turns {
        Some(turns) => writeln!(output, "  Turns:         {}", turns),
        None => writeln!(output, "  Turns:         ?"),
    }
    .ok();
    match &result.winner_id {
        Some(winner_id) => writeln!(output, "  Winner:        {}", winner_id),
        None => writeln!(output, "  Winner:        draw"),
    }
    .ok();
    if let Some(rewards) = &result.rewards {
        writeln!(output, "  Rating Change: {:+}", rewards.rating_change).ok();
        writeln!(output, "  Gold Earned:   {}g", rewards.currency).ok();
        writeln!(output, "  XP Earned:     {}", rewards.experience_earned).ok();
    }

    let log = result.battle_log();
    if !log.is_empty() {
        writeln!(output, "\n  --- Combat Log ({} entries) ---", log.len()).ok();
        for entry in log.iter().take(n_log_entries) {
            match entry {
                serde_json::Value::String(entry) => writeln!(output, "    {}", entry),
                entry => writeln!(output, "    {}", entry),
            }
            .ok();
        }
    }
    output.truncate(output.trim_end().len());
    output
}
