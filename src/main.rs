use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

mod command;
mod compiler;
mod config;
mod error;
mod executor;
mod framework;
mod registry;
mod spec;

use config::{Config, LoggingConfig};
use executor::Executor;
use framework::ProcessRunner;
use spec::JobSchema;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "job-executor")]
#[command(about = "Compile a job description into repository commands and run them", long_about = None)]
struct Cli {
    /// Job description (JSON).
    job: PathBuf,

    /// Report the commands without executing them.
    #[arg(long)]
    dry_run: bool,

    /// Logging configuration (TOML).
    #[arg(long)]
    logging: Option<PathBuf>,

    /// JSON Schema used instead of the bundled one.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Executor configuration (TOML): task packages, overrides, runner.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = match &cli.logging {
        Some(path) => LoggingConfig::load(path)?,
        None => LoggingConfig::default(),
    };
    logging.init()?;

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // 1) Validate + parse the job description.
    let schema = match &cli.schema {
        Some(path) => JobSchema::from_file(path)?,
        None => JobSchema::bundled()?,
    };
    let text = fs::read_to_string(&cli.job)
        .with_context(|| format!("read job file {}", cli.job.display()))?;
    let job = spec::load_job(&text, &schema)
        .with_context(|| format!("invalid job description {}", cli.job.display()))?;

    // 2) Build the task registry.
    let registry = config.build_registry()?;
    info!(tasks = registry.len(), "task registry ready");
    debug!(names = ?registry.names().collect::<Vec<_>>(), "registered tasks");

    // 3) Compile.
    let queue = compiler::compile(&job, &registry)
        .with_context(|| format!("cannot compile job {}", cli.job.display()))?;
    info!(commands = queue.len(), task = %job.task.name, "job compiled");

    // 4) Execute (or report).
    let runner = ProcessRunner::new(config.runner.clone());
    let summary = Executor::new(&runner).dry_run(cli.dry_run).run(&queue)?;
    info!(
        commands = summary.commands,
        dry_run = summary.dry_run,
        "job finished"
    );

    Ok(())
}
