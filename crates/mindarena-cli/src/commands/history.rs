//! History commands - sessions, metrics, achievements, artifacts

use super::require_user;
use crate::display;
use colored::*;
use mindarena_sdk::ArenaClient;
use mindarena_types::{SessionId, SessionStatus};

/// Most recent sessions first
pub async fn sessions(client: &ArenaClient, limit: usize) -> anyhow::Result<()> {
    let user_id = require_user(client)?;
    let mut sessions = client.user_sessions(&user_id).await?;
    sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));

    display::section("Arena Sessions");
    if sessions.is_empty() {
        println!("  {}", "No sessions yet. Run `mindarena play`.".yellow());
        return Ok(());
    }

    for session in sessions.iter().take(limit) {
        let status = match session.status {
            SessionStatus::Active => "active".bright_yellow(),
            SessionStatus::Completed => "completed".bright_green(),
            SessionStatus::Abandoned => "abandoned".bright_black(),
        };
        let started = session
            .started_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  {} {:<10} {}  {}",
            "●".bright_cyan(),
            status,
            session.problem_id.as_str().bright_white(),
            started.bright_black()
        );
        println!("      {}", session.session_id.as_str().bright_black());
    }
    if sessions.len() > limit {
        println!("  {}", format!("... and {} more", sessions.len() - limit).bright_black());
    }
    Ok(())
}

/// Coaching metrics recorded for one session
pub async fn metrics(client: &ArenaClient, session: &str) -> anyhow::Result<()> {
    require_user(client)?;
    let metrics = client.metrics(&SessionId::from(session)).await?;

    display::section(&format!("Session {}", session));
    display::labeled("Typing speed", &format!("{:.1} chars/min", metrics.typing_speed));
    display::labeled("Pauses", &metrics.pause_count.to_string());
    display::labeled("Edits", &metrics.edit_count.to_string());

    let mut extra: Vec<_> = metrics.extra.iter().collect();
    extra.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in extra {
        display::labeled(key, &value.to_string());
    }
    Ok(())
}

pub async fn achievements(client: &ArenaClient) -> anyhow::Result<()> {
    let user_id = require_user(client)?;
    let achievements = client.achievements(&user_id).await?;

    display::section("Achievements");
    if achievements.is_empty() {
        println!("  {}", "No achievements yet".yellow());
        return Ok(());
    }

    let unlocked = achievements.iter().filter(|a| a.unlocked).count();
    for achievement in &achievements {
        if achievement.unlocked {
            println!("  {} {}", "★".bright_yellow(), achievement.title.bright_white().bold());
        } else {
            println!("  {} {}", "☆".bright_black(), achievement.title.bright_black());
        }
        if !achievement.description.is_empty() {
            println!("      {}", achievement.description.bright_black());
        }
    }
    println!();
    display::info(&format!("{}/{} unlocked", unlocked, achievements.len()));
    Ok(())
}

pub async fn artifacts(client: &ArenaClient) -> anyhow::Result<()> {
    let user_id = require_user(client)?;
    let mut artifacts = client.artifacts(&user_id).await?;
    artifacts.sort_by(|a, b| b.rarity.cmp(&a.rarity));

    display::section("Artifacts");
    if artifacts.is_empty() {
        println!("  {}", "No artifacts earned yet".yellow());
        return Ok(());
    }
    for artifact in &artifacts {
        println!(
            "  {} {} ({})",
            "◆".bright_magenta(),
            artifact.name.bright_white(),
            display::rarity(artifact.rarity)
        );
        if !artifact.description.is_empty() {
            println!("      {}", artifact.description.bright_black());
        }
    }
    Ok(())
}
