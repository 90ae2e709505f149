//! Kanban board driver
//!
//! Seeds an in-memory board, optionally replays an intent script through the
//! board controller, and prints the result as markdown or JSON.

use anyhow::{Result, anyhow};
use clap::Parser;
use kanban_board::board::seed::{demo_board, load_seed};
use kanban_board::cli::{Cli, Command};
use kanban_board::config::{ConfigLoader, ConfigPaths};
use kanban_board::controller::BoardController;
use kanban_board::format::{
    OutputFormat, format_board_markdown, format_outcome_markdown, format_stats_markdown,
    to_json_string,
};
use kanban_board::logging::{self, LogTarget};
use kanban_board::replay::{load_script, replay};
use kanban_board::types::Board;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let format = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| anyhow!("Unknown output format '{}'", cli.format))?;

    let mut paths = ConfigPaths::discover();
    if let Some(ref path) = cli.config {
        paths = paths.with_explicit_file(path);
    }
    let loader = ConfigLoader::load_with_paths(paths)?;
    for (tier, path) in loader.sources() {
        debug!(tier = %tier, path = %path.display(), "Loaded config");
    }
    if !loader.env_overrides().is_empty() {
        debug!(vars = ?loader.env_overrides(), "Applied environment overrides");
    }
    // Validated by the loader.
    let config = loader.into_config();

    let board: Board = match cli.seed {
        Some(ref path) => load_seed(path)?,
        None => demo_board(),
    };
    info!(
        columns = board.column_count(),
        tasks = board.task_count(),
        "Board seeded"
    );

    let mut controller = BoardController::new(board, config);

    let output = match cli.command.unwrap_or(Command::Show) {
        Command::Show => match format {
            OutputFormat::Json => to_json_string(&controller.view())?,
            OutputFormat::Markdown => format_board_markdown(&controller.view()),
        },
        Command::Stats => match format {
            OutputFormat::Json => to_json_string(&controller.stats())?,
            OutputFormat::Markdown => format_stats_markdown(&controller.stats()),
        },
        Command::Replay { script } => {
            let intents = load_script(&script)?;
            let report = replay(&mut controller, intents).await;
            match format {
                OutputFormat::Json => to_json_string(&report)?,
                OutputFormat::Markdown => {
                    let mut md = String::from("# Replay\n\n");
                    for (i, step) in report.steps.iter().enumerate() {
                        md.push_str(&format_outcome_markdown(i, step.intent, &step.outcome));
                    }
                    md.push('\n');
                    md.push_str(&format_board_markdown(&report.view));
                    md
                }
            }
        }
    };

    println!("{}", output);
    Ok(())
}
