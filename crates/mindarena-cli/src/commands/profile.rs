//! Profile commands - show, edit, calibrate

use super::require_user;
use crate::display;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use mindarena_sdk::{ArenaClient, Route, SdkError};
use mindarena_types::{
    CalibrationAnswer, CalibrationAnswers, ProfileUpdate, MAX_DIFFICULTY, MIN_DIFFICULTY,
};

struct Question {
    id: &'static str,
    prompt: &'static str,
    options: &'static [&'static str],
}

const QUESTIONS: &[Question] = &[
    Question {
        id: "first_move",
        prompt: "Facing an unfamiliar problem, your first move is to...",
        options: &[
            "Try something bold and see what happens",
            "Collect data and look for patterns",
            "Build a rough prototype",
            "Map out the long-term plan",
        ],
    },
    Question {
        id: "uncertainty",
        prompt: "When the outcome is uncertain, you...",
        options: &[
            "Take the bet if the upside is big",
            "Quantify the odds before deciding",
            "Reduce the risk with a small experiment",
            "Keep options open until the picture is clearer",
        ],
    },
    Question {
        id: "team_role",
        prompt: "In a team you usually end up...",
        options: &[
            "Pushing for the ambitious option",
            "Checking the numbers",
            "Making things actually work",
            "Setting direction and priorities",
        ],
    },
    Question {
        id: "experience",
        prompt: "How much experience do you have with open-ended problems?",
        options: &["Just starting", "Some", "A lot", "It's my job"],
    },
];

/// Show difficulty and XP
pub async fn show(client: &ArenaClient) -> anyhow::Result<()> {
    let user_id = require_user(client)?;

    match client.fetch_profile(&user_id).await {
        Ok(profile) => {
            display::section("Profile");
            display::profile(&profile);
            if !profile.calibration_completed {
                println!();
                client.navigate(Route::Calibration);
            }
            Ok(())
        }
        Err(SdkError::ProfileNotFound { .. }) => {
            client.navigate(Route::Calibration);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Change language or difficulty
pub async fn update(
    client: &ArenaClient,
    language: Option<String>,
    difficulty: Option<u8>,
) -> anyhow::Result<()> {
    if let Some(d) = difficulty {
        if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&d) {
            anyhow::bail!(
                "difficulty must be between {} and {}, got {}",
                MIN_DIFFICULTY,
                MAX_DIFFICULTY,
                d
            );
        }
    }

    let update = ProfileUpdate {
        language,
        current_difficulty: difficulty,
    };
    if update.is_empty() {
        display::info("Nothing to change. Use --language or --difficulty.");
        return Ok(());
    }

    let user_id = require_user(client)?;
    let profile = client.update_profile(&user_id, &update).await?;
    display::success("Profile updated");
    display::profile(&profile);
    Ok(())
}

/// Run the onboarding questionnaire and create the profile
pub async fn calibrate(client: &ArenaClient, language: Option<String>) -> anyhow::Result<()> {
    let user_id = require_user(client)?;

    display::section("Calibration");
    println!(
        "  {}",
        "A few questions to set your starting difficulty and archetype leanings.".bright_black()
    );
    println!();

    let theme = ColorfulTheme::default();
    let mut answers = Vec::with_capacity(QUESTIONS.len());
    for question in QUESTIONS {
        let choice = Select::with_theme(&theme)
            .with_prompt(question.prompt)
            .items(question.options)
            .default(0)
            .interact()?;
        answers.push(CalibrationAnswer {
            question_id: question.id.to_string(),
            answer: question.options[choice].to_string(),
        });
    }

    let profile = client
        .calibrate(&CalibrationAnswers {
            user_id,
            answers,
            language,
        })
        .await?;

    display::success("Calibration complete");
    display::profile(&profile);
    println!();
    client.navigate(Route::Arena);
    Ok(())
}
