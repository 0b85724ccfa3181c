//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod pipeline;
mod task;

pub use pipeline::PipelineCommands;
pub use task::TaskCommands;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use colored::*;
use runwatch_core::domain::condition::ExecutionState;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and wait on pipeline runs
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Create, inspect and wait on task runs
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Task { command } => task::handle_task_command(command, config).await,
    }
}

/// Colorize an execution state for display
fn colorize_state(state: ExecutionState) -> ColoredString {
    let state_str = state.to_string();
    match state {
        ExecutionState::Pending => state_str.yellow(),
        ExecutionState::Running => state_str.cyan(),
        ExecutionState::Succeeded => state_str.green(),
        ExecutionState::Failed => state_str.red(),
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print start, completion, and duration lines
fn print_timing(start: Option<&DateTime<Utc>>, completion: Option<&DateTime<Utc>>) {
    if let Some(started) = start {
        println!("  Started:     {}", format_time(started));
    }

    if let Some(completed) = completion {
        println!("  Completed:   {}", format_time(completed));

        if let Some(started) = start {
            let seconds = completed.signed_duration_since(*started).num_seconds();
            println!("  Duration:    {}s", seconds);
        }
    }
}
