//! Problem commands - list and generate

use super::require_user;
use crate::display;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use mindarena_sdk::{ArenaClient, Route, SdkError};
use mindarena_types::{
    Archetype, DifficultyWindow, ProblemCustomization, ProblemFilter, UserProfile, MAX_DIFFICULTY,
    MIN_DIFFICULTY,
};
use std::time::Duration;

async fn calibrated_profile(client: &ArenaClient) -> anyhow::Result<Option<UserProfile>> {
    let user_id = require_user(client)?;
    match client.fetch_profile(&user_id).await {
        Ok(profile) if profile.calibration_completed => Ok(Some(profile)),
        Ok(_) | Err(SdkError::ProfileNotFound { .. }) => {
            client.navigate(Route::Calibration);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// List problems, by default only those inside the player's window
pub async fn list(client: &ArenaClient, all: bool) -> anyhow::Result<()> {
    let Some(profile) = calibrated_profile(client).await? else {
        return Ok(());
    };

    let window = DifficultyWindow::around(profile.current_difficulty);
    let problems = if all {
        client
            .list_problems(&ProblemFilter {
                is_active: Some(true),
                ..Default::default()
            })
            .await?
    } else {
        let listed = client.list_problems(&ProblemFilter::for_profile(&profile)).await?;
        window.apply(listed)
    };

    display::section(&format!(
        "Problems (difficulty {}-{})",
        if all { MIN_DIFFICULTY } else { window.min },
        if all { MAX_DIFFICULTY } else { window.max }
    ));
    if problems.is_empty() {
        println!("  {}", "No problems available. Try `mindarena generate`.".yellow());
        return Ok(());
    }
    for problem in &problems {
        let marker = if window.contains(problem.difficulty) {
            "●".bright_green()
        } else {
            "○".bright_black()
        };
        println!("  {} {}", marker, display::problem_line(problem));
    }
    Ok(())
}

/// Ask the server to generate a problem for this profile
pub async fn generate(
    client: &ArenaClient,
    topic: Option<String>,
    archetype: Option<Archetype>,
    difficulty: Option<u8>,
) -> anyhow::Result<()> {
    let Some(profile) = calibrated_profile(client).await? else {
        return Ok(());
    };

    let customization = if topic.is_some() || archetype.is_some() || difficulty.is_some() {
        Some(ProblemCustomization {
            topic,
            archetype_focus: archetype,
            difficulty,
        })
    } else {
        None
    };

    let spinner = generation_spinner();
    let outcome = client.generate_problem(&profile, customization).await;
    spinner.finish_and_clear();

    let problem = outcome?;
    display::success("New problem generated");
    display::problem(&problem);
    display::info(&format!(
        "Start it with `mindarena play` and pick {}",
        problem.problem_id.as_str().bright_cyan()
    ));
    Ok(())
}

pub(crate) fn generation_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message("Generating a problem for you...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
