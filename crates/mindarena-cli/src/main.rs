//! MindArena CLI - solve open-ended problems, earn archetype XP
//!
//! Talks to the MindArena API (default: http://localhost:8000/api, override
//! with `--server` or `MINDARENA_API_URL`). Credentials from `login` are kept
//! in the user config directory until `logout` or a rejected token.
//!
//! # Quick Start
//!
//! ```bash
//! mindarena login --email ada@example.com --token <token>
//! mindarena calibrate
//! mindarena play
//! mindarena profile show
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use mindarena_sdk::{ArenaClient, ClientConfig, SessionContext};
use mindarena_types::Archetype;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::{auth, history, play, problems, profile, TerminalNavigator};

/// MindArena CLI - the problem-solving arena in your terminal
#[derive(Parser)]
#[command(name = "mindarena")]
#[command(author = "MindArena Contributors")]
#[command(version)]
#[command(about = "Solve open-ended problems, get scored, grow your archetypes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// API endpoint (overrides MINDARENA_API_URL)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Log SDK activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store credentials issued by the auth provider
    Login {
        /// Account email (profiles are keyed by it)
        #[arg(short, long)]
        email: String,

        /// Bearer token (prompted for when omitted)
        #[arg(short, long)]
        token: Option<String>,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Forget stored credentials
    Logout,

    /// Show the logged-in identity
    Whoami,

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },

    /// Answer the onboarding questionnaire
    Calibrate {
        /// Preferred language for generated problems
        #[arg(long)]
        language: Option<String>,
    },

    /// List problems at your level
    Problems {
        /// Include problems outside your difficulty window
        #[arg(long)]
        all: bool,
    },

    /// Generate a new problem for your profile
    Generate {
        /// Topic hint
        #[arg(short, long)]
        topic: Option<String>,

        /// Archetype to focus on (risk_taker, analyst, builder, strategist)
        #[arg(short, long)]
        archetype: Option<Archetype>,

        /// Requested difficulty (1-10)
        #[arg(short, long)]
        difficulty: Option<u8>,
    },

    /// Enter the arena: pick, solve, get scored
    Play,

    /// Show your arena sessions
    Sessions {
        /// Number of sessions to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show coaching metrics for a session
    Metrics {
        /// Session ID
        session: String,
    },

    /// Show unlocked achievements
    Achievements,

    /// Show earned artifacts
    Artifacts,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show difficulty and archetype XP
    Show,

    /// Change profile settings
    Set {
        /// Language code
        #[arg(long)]
        language: Option<String>,

        /// Difficulty level (1-10)
        #[arg(long)]
        difficulty: Option<u8>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with command output
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = ClientConfig::from_env()?;
    if let Some(server) = &cli.server {
        config = config.with_endpoint(server);
    }

    let session = SessionContext::restore(config.credential_store())?;
    let client = ArenaClient::new(config, session)?.with_navigator(Arc::new(TerminalNavigator));

    match cli.command {
        Commands::Login { email, token, name } => {
            auth::login(&client, &email, token, name)?;
        }
        Commands::Logout => {
            auth::logout(&client)?;
        }
        Commands::Whoami => {
            auth::whoami(&client)?;
        }
        Commands::Profile { action } => match action {
            ProfileCommands::Show => {
                profile::show(&client).await?;
            }
            ProfileCommands::Set { language, difficulty } => {
                profile::update(&client, language, difficulty).await?;
            }
        },
        Commands::Calibrate { language } => {
            profile::calibrate(&client, language).await?;
        }
        Commands::Problems { all } => {
            problems::list(&client, all).await?;
        }
        Commands::Generate { topic, archetype, difficulty } => {
            problems::generate(&client, topic, archetype, difficulty).await?;
        }
        Commands::Play => {
            print_banner();
            play::run(client).await?;
        }
        Commands::Sessions { limit } => {
            history::sessions(&client, limit).await?;
        }
        Commands::Metrics { session } => {
            history::metrics(&client, &session).await?;
        }
        Commands::Achievements => {
            history::achievements(&client).await?;
        }
        Commands::Artifacts => {
            history::artifacts(&client).await?;
        }
    }

    Ok(())
}

fn print_banner() {
    println!();
    println!("{}", "╔══════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}{}{}",
        "║  ".bright_cyan(),
        "MindArena".bright_white().bold(),
        " - think it through, then ship it            ║".bright_cyan()
    );
    println!("{}", "╚══════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_parses_archetype() {
        let cli = Cli::parse_from(["mindarena", "generate", "--archetype", "risk_taker", "-d", "4"]);
        match cli.command {
            Commands::Generate { archetype, difficulty, .. } => {
                assert_eq!(archetype, Some(Archetype::RiskTaker));
                assert_eq!(difficulty, Some(4));
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_server_flag_is_global() {
        let cli = Cli::parse_from(["mindarena", "play", "--server", "http://arena.test/api"]);
        assert_eq!(cli.server.as_deref(), Some("http://arena.test/api"));
    }
}
