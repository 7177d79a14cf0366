pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "almanac",
    about = "Almanac operator CLI",
    long_about = "Check Almanac runtime readiness, apply migrations, inspect configuration, and read stored events.",
    after_help = "Examples:\n  almanac doctor --json\n  almanac config\n  almanac events --before 2026-12-31"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run startup preflight checks and return structured status output")]
    Start,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, Telegram token shape, classifier key, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "List stored events without going through the bot")]
    Events {
        #[arg(long, value_name = "YYYY-MM-DD", help = "Only events on or before this date")]
        before: Option<String>,
        #[arg(long, conflicts_with = "before", help = "Only events with exactly this name")]
        name: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Start => commands::start::run(),
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Events { before, name } => {
            commands::events::run(commands::events::EventsQuery { before, name })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
