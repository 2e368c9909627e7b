//! Display utilities for the CLI

use colored::*;
use mindarena_types::{Archetype, ArchetypeXp, Problem, Rarity, UserProfile};

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", "━".repeat(60).bright_black());
    println!(" {}", title.bright_white().bold());
    println!("{}", "━".repeat(60).bright_black());
}

/// Print a success message
pub fn success(message: &str) {
    println!("  {} {}", "✓".bright_green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    println!("  {} {}", "✗".bright_red(), message.bright_red());
}

/// Print an info message
pub fn info(message: &str) {
    println!("  {} {}", "→".bright_blue(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("  {} {}", "⚠".yellow(), message.yellow());
}

/// Print a labeled value
pub fn labeled(label: &str, value: &str) {
    println!("  {}: {}", label.bright_white(), value.bright_cyan());
}

/// One-line summary used in lists and pickers
pub fn problem_line(problem: &Problem) -> String {
    let focus = problem
        .archetype_focus
        .map(|a| format!(" [{}]", a.display_name()))
        .unwrap_or_default();
    format!(
        "{} {}  (difficulty {}, ~{} min){}",
        problem.problem_id,
        problem.title,
        problem.difficulty,
        problem.estimated_time,
        focus
    )
}

/// Full problem statement
pub fn problem(problem: &Problem) {
    section(&problem.title);
    labeled("Difficulty", &problem.difficulty.to_string());
    labeled("Estimated time", &format!("{} min", problem.estimated_time));
    println!();
    println!("  {}", "Context".bright_white().bold());
    println!("  {}", problem.context);
    println!();
    println!("  {}", "Objective".bright_white().bold());
    println!("  {}", problem.objective);
    if !problem.constraints.is_empty() {
        println!();
        println!("  {}", "Constraints".bright_white().bold());
        for constraint in &problem.constraints {
            println!("    • {}", constraint);
        }
    }
    println!();
}

/// Horizontal XP bars scaled to the largest counter
pub fn xp_bars(xp: &ArchetypeXp) {
    let top = Archetype::ALL.iter().map(|a| xp.get(*a)).max().unwrap_or(0).max(1);
    for archetype in Archetype::ALL {
        let value = xp.get(archetype);
        let width = (value as u64 * 30 / top as u64) as usize;
        println!(
            "  {:<12} {} {}",
            archetype.display_name(),
            "█".repeat(width).bright_cyan(),
            value.to_string().bright_white()
        );
    }
}

/// Profile summary
pub fn profile(profile: &UserProfile) {
    labeled("User", profile.user_id.as_str());
    labeled("Difficulty", &profile.current_difficulty.to_string());
    labeled("Language", &profile.language);
    labeled(
        "Calibrated",
        if profile.calibration_completed { "yes" } else { "no" },
    );
    labeled("Total XP", &profile.total_xp().to_string());
    labeled("Dominant archetype", profile.xp.dominant().display_name());
    println!();
    xp_bars(&profile.xp);
}

pub fn rarity(rarity: Rarity) -> ColoredString {
    match rarity {
        Rarity::Common => "common".white(),
        Rarity::Rare => "rare".bright_blue(),
        Rarity::Epic => "epic".bright_magenta(),
        Rarity::Legendary => "legendary".bright_yellow().bold(),
    }
}
