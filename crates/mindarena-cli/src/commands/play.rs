//! Interactive arena - drives the selection → battle → result flow

use super::problems::generation_spinner;
use crate::display;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use mindarena_sdk::{
    ArenaClient, ArenaFlow, ArenaView, BattleView, ResultView, SelectionView, SubmitOutcome,
    TelemetryQueue,
};
use mindarena_types::{AbandonOutcome, Archetype, NextActionKind, ProblemCustomization};
use serde_json::json;
use tracing::debug;

/// What the player wants after a step
enum Step {
    Continue,
    Quit,
}

pub async fn run(client: ArenaClient) -> anyhow::Result<()> {
    let queue = TelemetryQueue::spawn(client.clone());
    let mut flow = ArenaFlow::new(client).with_telemetry(queue.sender());
    let theme = ColorfulTheme::default();

    flow.load().await?;

    loop {
        let step = match flow.view().clone() {
            ArenaView::Loading => {
                flow.load().await?;
                Step::Continue
            }
            ArenaView::Redirect(_) => Step::Quit,
            ArenaView::LoadFailed { message } => {
                display::error(&format!("Could not load the arena: {}", message));
                if Confirm::with_theme(&theme)
                    .with_prompt("Retry?")
                    .default(true)
                    .interact()?
                {
                    flow.retry().await?;
                    Step::Continue
                } else {
                    Step::Quit
                }
            }
            ArenaView::Selection(selection) => select(&mut flow, &theme, &selection).await?,
            ArenaView::Battle(battle) => fight(&mut flow, &theme, &battle).await?,
            ArenaView::Result(result) => {
                show_result(&result);
                if Confirm::with_theme(&theme)
                    .with_prompt("Back to problem selection?")
                    .default(true)
                    .interact()?
                {
                    flow.continue_to_selection().await?;
                    Step::Continue
                } else {
                    Step::Quit
                }
            }
        };

        if let Step::Quit = step {
            break;
        }
    }

    // Release the flow's sender so the queue can drain
    drop(flow);
    let delivered = queue.shutdown().await;
    debug!(delivered, "telemetry drained");
    Ok(())
}

async fn select(
    flow: &mut ArenaFlow,
    theme: &ColorfulTheme,
    selection: &SelectionView,
) -> anyhow::Result<Step> {
    display::section(&format!(
        "Arena - difficulty {} - {} XP",
        selection.profile.current_difficulty,
        selection.profile.total_xp()
    ));

    let mut items: Vec<String> = selection.problems.iter().map(display::problem_line).collect();
    let generate_idx = items.len();
    items.push("✨ Generate a new problem".to_string());
    items.push("↻ Refresh".to_string());
    items.push("Quit".to_string());

    if selection.problems.is_empty() {
        println!("  {}", "No problems at your level right now.".yellow());
    }

    let choice = Select::with_theme(theme)
        .with_prompt("Pick a problem")
        .items(&items)
        .default(0)
        .interact()?;

    if choice < generate_idx {
        let problem_id = selection.problems[choice].problem_id.clone();
        if let Err(e) = flow.start(&problem_id).await {
            display::error(&e.to_string());
        }
        return Ok(Step::Continue);
    }

    match choice - generate_idx {
        0 => {
            let topic: String = Input::with_theme(theme)
                .with_prompt("Topic (optional)")
                .allow_empty(true)
                .interact_text()?;
            let customization = (!topic.trim().is_empty()).then(|| ProblemCustomization {
                topic: Some(topic.trim().to_string()),
                archetype_focus: None,
                difficulty: None,
            });

            let spinner = generation_spinner();
            let outcome = flow.generate(customization).await;
            spinner.finish_and_clear();
            match outcome {
                Ok(problem) => display::success(&format!("Generated: {}", problem.title)),
                Err(e) => display::error(&e.to_string()),
            }
            Ok(Step::Continue)
        }
        1 => {
            flow.refresh().await?;
            Ok(Step::Continue)
        }
        _ => Ok(Step::Quit),
    }
}

async fn fight(
    flow: &mut ArenaFlow,
    theme: &ColorfulTheme,
    battle: &BattleView,
) -> anyhow::Result<Step> {
    display::problem(&battle.problem);
    display::info(&format!(
        "Session {} - {}s elapsed",
        battle.session.session_id.as_str().bright_black(),
        battle.elapsed_seconds()
    ));

    let actions = ["Write and submit a solution", "Ask the coach", "Abandon"];
    let choice = Select::with_theme(theme)
        .with_prompt("Your move")
        .items(&actions)
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let solution: String = Input::with_theme(theme)
                .with_prompt("Solution")
                .interact_text()?;
            let chars = u32::try_from(solution.chars().count()).unwrap_or(u32::MAX);
            flow.track_keystrokes(chars, chars, Some(solution.clone()));

            let elapsed = battle.elapsed_seconds();
            let metadata = json!({ "client": "mindarena-cli" });
            match flow.submit(&solution, elapsed, Some(metadata)).await {
                Ok(SubmitOutcome::Applied) => {}
                Ok(SubmitOutcome::Discarded) => display::warning("Submission arrived too late"),
                Err(e) => {
                    display::error(&format!("Submit failed: {}", e));
                    display::info("Your attempt is still open; submitting again is safe.");
                }
            }
            Ok(Step::Continue)
        }
        1 => {
            coach(flow, theme).await?;
            Ok(Step::Continue)
        }
        _ => {
            if Confirm::with_theme(theme)
                .with_prompt("Abandon this problem?")
                .default(false)
                .interact()?
            {
                match flow.abandon().await? {
                    AbandonOutcome::Abandoned => display::info("Session abandoned"),
                    AbandonOutcome::AlreadyClosed => display::info("Session was already closed"),
                    AbandonOutcome::Unconfirmed => display::warning(
                        "Could not reach the server; the session may still be open there",
                    ),
                }
            }
            Ok(Step::Continue)
        }
    }
}

async fn coach(flow: &ArenaFlow, theme: &ColorfulTheme) -> anyhow::Result<()> {
    let Some(action) = flow.next_action().await else {
        display::warning("The coach is unavailable right now");
        return Ok(());
    };

    let message = action.message.clone().unwrap_or_default();
    match action.action {
        NextActionKind::Continue | NextActionKind::Unknown => {
            display::info(if message.is_empty() { "Keep going, you're on track." } else { message.as_str() });
        }
        NextActionKind::Hint => display::info(&format!("Hint: {}", message)),
        NextActionKind::Break => display::info(&format!("Take a breather. {}", message)),
        NextActionKind::Intervention => {
            display::warning(&message);
            if let Some(intervention_id) = action.intervention_id {
                let accepted = Confirm::with_theme(theme)
                    .with_prompt("Accept the coach's suggestion?")
                    .default(true)
                    .interact()?;
                flow.respond_to_intervention(intervention_id, accepted, None);
            }
        }
    }
    Ok(())
}

fn show_result(result: &ResultView) {
    display::section(&format!("Result - {}", result.problem.title));

    if result.leveled_up() {
        println!("  {}", "LEVEL UP!".bright_yellow().bold());
        println!();
    }
    display::labeled("XP earned", &format!("+{}", result.result.xp_earned));
    display::labeled(
        "Total XP",
        &format!("{} → {}", result.xp_total_before, result.xp_total_after),
    );
    display::labeled("Difficulty", &result.profile.current_difficulty.to_string());

    for archetype in Archetype::ALL {
        let gained = result.result.xp_breakdown.get(archetype);
        if gained > 0 {
            println!("    {} +{}", archetype.display_name(), gained.to_string().bright_green());
        }
    }

    if !result.result.criteria_met.is_empty() {
        println!();
        println!("  {}", "Criteria met".bright_white().bold());
        for criterion in &result.result.criteria_met {
            display::success(criterion);
        }
    }
    if !result.result.evaluation.is_empty() {
        println!();
        println!("  {}", "Evaluation".bright_white().bold());
        println!("  {}", result.result.evaluation);
    }
    if !result.result.insight.is_empty() {
        println!();
        println!("  {} {}", "Insight:".bright_magenta(), result.result.insight);
    }
    println!();
    display::xp_bars(&result.profile.xp);
    println!();
}
