//! Pipeline run command handlers
//!
//! Read outcomes of a pipeline run: task states, results, params, env vars
//! and logs, and wait for the run to end.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use runwatch_core::domain::condition::{Execution, ExecutionState};
use runwatch_core::domain::pipeline::PipelineExecution;
use runwatch_core::dto::status::PipelineTaskStatus;
use runwatch_tracker::{
    ChildResolver, LOG_FETCH_FAILED, LogAggregator, ResultExtractor, get_env,
};
use std::time::Duration;

use super::{colorize_state, print_timing};
use crate::config::Config;
use crate::types::WaitFor;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Show the state of a pipeline run and its tasks
    Status {
        /// Pipeline run name
        name: String,

        /// Only show this pipeline task
        #[arg(long)]
        task: Option<String>,
    },
    /// Print a result of a pipeline task
    Result {
        /// Pipeline run name
        name: String,
        /// Pipeline task name
        task: String,
        /// Result name
        result: String,
    },
    /// Print a param of a pipeline task
    Param {
        /// Pipeline run name
        name: String,
        /// Pipeline task name
        task: String,
        /// Param name
        param: String,
    },
    /// Print a step template env var of a pipeline task
    Env {
        /// Pipeline run name
        name: String,
        /// Pipeline task name
        task: String,
        /// Env var name
        var: String,
    },
    /// Print the logs of every container of a pipeline task
    Logs {
        /// Pipeline run name
        name: String,
        /// Pipeline task name
        task: String,
    },
    /// Wait for a pipeline run to finish or succeed
    Wait {
        /// Pipeline run name
        name: String,

        /// Condition to wait for
        #[arg(long, value_enum, default_value_t = WaitFor::Finished)]
        until: WaitFor,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 3600)]
        timeout: u64,
    },
}

/// Handle pipeline commands
///
/// Routes pipeline subcommands to their respective handlers.
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    match command {
        PipelineCommands::Status { name, task } => show_status(config, &name, task.as_deref()).await,
        PipelineCommands::Result { name, task, result } => {
            let run = get_pipeline_run(config, &name).await?;
            let extractor = ResultExtractor::new(ChildResolver::new(config.store()));
            println!("{}", extractor.get_result_for_task(&run, &task, &result).await?);
            Ok(())
        }
        PipelineCommands::Param { name, task, param } => {
            let run = get_pipeline_run(config, &name).await?;
            let extractor = ResultExtractor::new(ChildResolver::new(config.store()));
            println!("{}", extractor.get_param_for_task(&run, &task, &param).await?);
            Ok(())
        }
        PipelineCommands::Env { name, task, var } => {
            let run = get_pipeline_run(config, &name).await?;
            let task = ChildResolver::new(config.store()).resolve(&run, &task).await?;
            println!("{}", get_env(&task, &var)?);
            Ok(())
        }
        PipelineCommands::Logs { name, task } => show_logs(config, &name, &task).await,
        PipelineCommands::Wait {
            name,
            until,
            timeout,
        } => wait_pipeline_run(config, &name, until, Duration::from_secs(timeout)).await,
    }
}

async fn get_pipeline_run(config: &Config, name: &str) -> Result<PipelineExecution> {
    config
        .store()
        .get_pipeline_execution(name, &config.namespace)
        .await
        .with_context(|| format!("Failed to get pipeline run {}/{}", config.namespace, name))
}

/// Show a pipeline run with all its tasks, or a single task
async fn show_status(config: &Config, name: &str, task: Option<&str>) -> Result<()> {
    let run = get_pipeline_run(config, name).await?;
    let resolver = ChildResolver::new(config.store());

    if let Some(task) = task {
        let report = ResultExtractor::new(resolver).get_status_for_task(&run, task).await?;
        print_task_status(&report);
        return Ok(());
    }

    println!("{}", "Pipeline Run:".bold());
    println!("  Name:        {}", run.metadata.to_string().cyan());
    println!("  State:       {}", colorize_state(run.state()));
    print_timing(run.status.start_time.as_ref(), run.completion_time());

    let children = resolver.resolve_all(&run).await?;
    if children.is_empty() {
        println!("\n{}", "No tasks scheduled yet.".yellow());
        return Ok(());
    }

    println!("\n{}", format!("Tasks ({}):", children.len()).bold());
    for (child, task) in children {
        println!(
            "  {} {:<24} {:<10} {}",
            "▸".cyan(),
            child.pipeline_task_name,
            colorize_state(task.state()),
            task.metadata.name.dimmed()
        );
    }

    Ok(())
}

/// Print the full status of one pipeline task
fn print_task_status(report: &PipelineTaskStatus) {
    let status = &report.status;

    println!("{}", "Task Status:".bold());
    println!("  Task:        {}", report.pipeline_task_name.cyan());
    println!("  State:       {}", colorize_state(report.state()));
    if !status.pod_name.is_empty() {
        println!("  Pod:         {}", status.pod_name.dimmed());
    }
    print_timing(status.start_time.as_ref(), status.completion_time.as_ref());

    if let Some(condition) = status.conditions.first() {
        if !condition.message.is_empty() {
            println!("  Message:     {}", condition.message);
        }
    }

    if !status.results.is_empty() {
        println!("\n{}", "Results:".bold());
        for result in &status.results {
            println!("  {} = {}", result.name.cyan(), result.value.as_str().trim_end());
        }
    }
}

/// Print all container logs of a pipeline task
async fn show_logs(config: &Config, name: &str, task: &str) -> Result<()> {
    let logs = LogAggregator::new(config.store())
        .collect_logs(name, task, &config.namespace)
        .await?;

    if logs.is_empty() {
        println!("{}", "Pod has no containers.".yellow());
        return Ok(());
    }

    for (container, text) in &logs {
        println!("{}", format!("── {} ", container).bold());
        if text == LOG_FETCH_FAILED {
            println!("{}", text.red());
        } else {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}

/// Wait for a pipeline run and report how it ended
async fn wait_pipeline_run(config: &Config, name: &str, until: WaitFor, timeout: Duration) -> Result<()> {
    let poller = config.poller();

    let run = match until {
        WaitFor::Finished => poller.wait_pipeline_finished(name, &config.namespace, timeout).await?,
        WaitFor::Succeeded => poller.wait_pipeline_succeeded(name, &config.namespace, timeout).await?,
    };

    let state = run.state();
    println!("{} {}", run.metadata.to_string().cyan(), colorize_state(state));

    if state == ExecutionState::Failed {
        anyhow::bail!("pipeline run {} failed", run.metadata);
    }

    Ok(())
}
