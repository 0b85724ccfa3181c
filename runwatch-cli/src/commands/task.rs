//! Task run command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use runwatch_core::domain::condition::{Execution, ExecutionState};
use runwatch_core::domain::meta::ObjectMeta;
use runwatch_core::domain::task::{TASK_RUN_KIND, TaskExecution};
use runwatch_core::dto::task::ImageCopyRequest;
use runwatch_tracker::{TaskRunner, TrackError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use super::{colorize_state, print_timing};
use crate::config::Config;
use crate::types::WaitFor;

/// Prefix for task runs created without a name
const DEFAULT_NAME_PREFIX: &str = "runwatch-";

/// Task run subcommands
#[derive(Subcommand)]
pub enum TaskCommands {
    /// Show a task run
    Get {
        /// Task run name
        name: String,

        /// Print the raw object as JSON
        #[arg(long)]
        json: bool,
    },
    /// Wait for a task run to finish or succeed
    Wait {
        /// Task run name
        name: String,

        /// Condition to wait for
        #[arg(long, value_enum, default_value_t = WaitFor::Finished)]
        until: WaitFor,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 3600)]
        timeout: u64,
    },
    /// Create a task run from a YAML or JSON file and wait for it
    Run {
        /// Path to the TaskRun manifest
        file: PathBuf,

        /// Give up after this many seconds [default: RUNWATCH_RUN_TIMEOUT]
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Copy an image to a second repository with the skopeo-copy task
    Copy {
        /// Source image reference
        src: String,
        /// Destination image reference
        dest: String,

        /// Service account the copy runs under
        #[arg(long, default_value = "pipeline")]
        service_account: String,

        /// Task run name (generated if omitted)
        #[arg(long)]
        name: Option<String>,

        /// Wait for the copy to finish
        #[arg(long)]
        wait: bool,
    },
    /// Delete every task run in the namespace
    Purge {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Handle task commands
///
/// Routes task subcommands to their respective handlers.
pub async fn handle_task_command(command: TaskCommands, config: &Config) -> Result<()> {
    match command {
        TaskCommands::Get { name, json } => get_task_run(config, &name, json).await,
        TaskCommands::Wait {
            name,
            until,
            timeout,
        } => wait_task_run(config, &name, until, Duration::from_secs(timeout)).await,
        TaskCommands::Run { file, timeout } => {
            run_task(config, &file, timeout.map(Duration::from_secs)).await
        }
        TaskCommands::Copy {
            src,
            dest,
            service_account,
            name,
            wait,
        } => copy_image(config, src, dest, service_account, name, wait).await,
        TaskCommands::Purge { yes } => purge(config, yes).await,
    }
}

fn runner(config: &Config) -> TaskRunner {
    TaskRunner::new(config.store(), config.tracker.clone()).with_cancellation(config.cancel.clone())
}

async fn get_task_run(config: &Config, name: &str, json: bool) -> Result<()> {
    let task = config
        .store()
        .get_task_execution(name, &config.namespace)
        .await
        .with_context(|| format!("Failed to get task run {}/{}", config.namespace, name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&task)?);
    } else {
        print_task_run(&task);
    }

    Ok(())
}

/// Print a task run's state, params and results
fn print_task_run(task: &TaskExecution) {
    println!("{}", "Task Run:".bold());
    println!("  Name:        {}", task.metadata.to_string().cyan());
    println!("  State:       {}", colorize_state(task.state()));

    if let Some(task_ref) = &task.spec.task_ref {
        println!("  Task:        {}", task_ref.name);
    }
    if !task.status.pod_name.is_empty() {
        println!("  Pod:         {}", task.status.pod_name.dimmed());
    }
    print_timing(task.status.start_time.as_ref(), task.completion_time());

    if !task.spec.params.is_empty() {
        println!("\n{}", "Params:".bold());
        for param in &task.spec.params {
            println!("  {} = {}", param.name.cyan(), param.value.as_str());
        }
    }

    if !task.status.results.is_empty() {
        println!("\n{}", "Results:".bold());
        for result in &task.status.results {
            println!("  {} = {}", result.name.cyan(), result.value.as_str().trim_end());
        }
    }
}

async fn wait_task_run(config: &Config, name: &str, until: WaitFor, timeout: Duration) -> Result<()> {
    let poller = config.poller();

    let task = match until {
        WaitFor::Finished => poller.wait_task_finished(name, &config.namespace, timeout).await?,
        WaitFor::Succeeded => poller.wait_task_succeeded(name, &config.namespace, timeout).await?,
    };

    report_outcome(&task)
}

/// Load a TaskRun manifest; YAML is a superset of JSON so one parser serves both
fn load_manifest(path: &Path) -> Result<TaskExecution> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let task = parse_manifest(&content)
        .with_context(|| format!("Failed to parse TaskRun manifest: {}", path.display()))?;

    debug!(
        "Loaded {} with {} params and {} extra spec fields",
        task.metadata.name,
        task.spec.params.len(),
        task.spec.extra.len()
    );
    Ok(task)
}

/// Parse a manifest, naming the run when it only has `generateName`
fn parse_manifest(content: &str) -> Result<TaskExecution> {
    let mut task: TaskExecution = serde_yaml::from_str(content)?;

    if task.kind != TASK_RUN_KIND {
        anyhow::bail!("expected kind {}, found {}", TASK_RUN_KIND, task.kind);
    }

    if task.metadata.name.is_empty() {
        let prefix = task
            .metadata
            .generate_name
            .take()
            .unwrap_or_else(|| DEFAULT_NAME_PREFIX.to_string());
        task.metadata.name = ObjectMeta::unique_name(&prefix);
    }

    Ok(task)
}

async fn run_task(config: &Config, file: &Path, timeout: Option<Duration>) -> Result<()> {
    let task = load_manifest(file)?;
    println!("{} {}", "Creating task run".bold(), task.metadata.name.cyan());

    let runner = runner(config);
    let outcome = match timeout {
        Some(timeout) => runner.run_and_await_with_timeout(&task, &config.namespace, timeout).await,
        None => runner.run_and_await(&task, &config.namespace).await,
    };
    let task = outcome.map_err(|e| explain_create_error(e, &task.metadata.name, config))?;

    print_task_run(&task);
    report_outcome(&task)
}

async fn copy_image(
    config: &Config,
    src: String,
    dest: String,
    service_account: String,
    name: Option<String>,
    wait: bool,
) -> Result<()> {
    let request = ImageCopyRequest {
        name: name.unwrap_or_else(|| ObjectMeta::unique_name("copy-image-")),
        namespace: config.namespace.clone(),
        service_account,
        src_image_url: src,
        dest_image_url: dest,
    };

    let runner = runner(config);

    let name = request.name.clone();

    if !wait {
        let task = runner
            .create_image_copy(request)
            .await
            .map_err(|e| explain_create_error(e, &name, config))?;
        println!("{} {}", "✓ Created task run".green(), task.metadata.to_string().cyan());
        return Ok(());
    }

    let task = request.into_task_execution();
    let task = runner
        .run_and_await(&task, &config.namespace)
        .await
        .map_err(|e| explain_create_error(e, &name, config))?;
    report_outcome(&task)
}

/// Turn an `AlreadyExists` answer into an actionable message
fn explain_create_error(error: TrackError, name: &str, config: &Config) -> anyhow::Error {
    match error {
        TrackError::Fetch(e) if e.is_conflict() => anyhow::anyhow!(
            "task run {}/{} already exists; pick another name or omit it",
            config.namespace,
            name
        ),
        other => other.into(),
    }
}

async fn purge(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!(
            "refusing to delete all task runs in namespace {} without --yes",
            config.namespace
        );
    }

    runner(config).purge(&config.namespace).await?;
    println!(
        "{} {}",
        "✓ Deleted all task runs in".green(),
        config.namespace.cyan()
    );
    Ok(())
}

/// Print the final state and fail the command if the run failed
fn report_outcome(task: &TaskExecution) -> Result<()> {
    let state = task.state();
    println!("{} {}", task.metadata.to_string().cyan(), colorize_state(state));

    if state == ExecutionState::Failed {
        match task.status.conditions.first().filter(|c| !c.message.is_empty()) {
            Some(condition) => anyhow::bail!("task run {} failed: {}", task.metadata, condition.message),
            None => anyhow::bail!("task run {} failed", task.metadata),
        }
    }

    Ok(())
}
