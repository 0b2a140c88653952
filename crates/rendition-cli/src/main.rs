//! Rendition CLI: identify objects and run conversion pipelines.
//!
//! Configuration comes from the environment (see `rendition_core::Config`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use rendition_cli::{build_factory, init_tracing, parse_run_options};
use rendition_core::{Config, TaskStatus};
use rendition_processing::{identify, Pipeline};
use rendition_worker::WorkQueue;
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

#[derive(Parser)]
#[command(name = "rendition", about = "Conversion pipeline runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pipeline variant for an object key
    Identify {
        /// Object key, e.g. models/chair.glb
        key: String,
        /// Declared media type, used when the extension is unknown
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Run one pipeline and print its report
    Run {
        /// Run options as JSON
        options: Option<String>,
        /// Read run options from a file instead
        #[arg(long, conflicts_with = "options")]
        file: Option<PathBuf>,
    },
    /// Read run options as JSON lines from stdin and process them on a worker pool
    Work,
}

#[derive(Serialize)]
struct Identified<'a> {
    key: &'a str,
    variant: String,
}

#[derive(Serialize, Default)]
struct WorkSummary {
    submitted: usize,
    succeeded: usize,
    failed: usize,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    Config::from_env().context("Failed to load configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Identify { key, content_type } => {
            let variant = identify(&key, content_type.as_deref())?;
            print_json(&Identified {
                key: &key,
                variant: variant.to_string(),
            })?;
        }
        Commands::Run { options, file } => {
            let json = match (options, file) {
                (Some(json), _) => json,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("Pass run options as JSON or with --file"),
            };
            let opts = parse_run_options(&json)?;

            let config = load_config()?;
            let factory = build_factory(&config).await?;
            let pipeline = factory.for_options(&opts)?;
            let report = pipeline.run(&opts).await?;
            print_json(&report)?;
        }
        Commands::Work => {
            let config = load_config()?;
            let factory = build_factory(&config).await?;
            let (finished_tx, finished_rx) = mpsc::channel(64);
            let (total_tx, total_rx) = oneshot::channel();
            let queue = WorkQueue::new(factory, config.worker, Some(finished_tx));
            let collector = tokio::spawn(collect_outcomes(finished_rx, total_rx));

            let mut submitted = 0usize;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
                if line.trim().is_empty() {
                    continue;
                }
                match parse_run_options(&line) {
                    Ok(opts) => {
                        queue.submit(opts).await?;
                        submitted += 1;
                    }
                    Err(e) => tracing::warn!(error = %e, "Skipping malformed job line"),
                }
            }
            let _ = total_tx.send(submitted);

            let mut summary = collector.await.context("Outcome collector failed")?;
            summary.submitted = submitted;
            queue.shutdown().await;
            print_json(&summary)?;
        }
    }

    Ok(())
}

impl WorkSummary {
    fn record(&mut self, status: TaskStatus) {
        match status {
            TaskStatus::Success => self.succeeded += 1,
            _ => self.failed += 1,
        }
    }

    fn finished(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Count job outcomes until as many as were submitted have arrived. The
/// total is only known once stdin is exhausted.
async fn collect_outcomes(
    mut finished_rx: mpsc::Receiver<(String, TaskStatus)>,
    mut total_rx: oneshot::Receiver<usize>,
) -> WorkSummary {
    let mut summary = WorkSummary::default();
    let mut expected = None;
    loop {
        if expected.is_some_and(|total| summary.finished() >= total) {
            break;
        }
        tokio::select! {
            total = &mut total_rx, if expected.is_none() => {
                expected = Some(total.unwrap_or(0));
            }
            outcome = finished_rx.recv() => match outcome {
                Some((task_id, status)) => {
                    tracing::debug!(task_id = %task_id, status = %status, "Job finished");
                    summary.record(status);
                }
                None => break,
            },
        }
    }
    summary
}
