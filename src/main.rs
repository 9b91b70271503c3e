//! Chew command line
//!
//! Distills one or more URLs and prints the results.

use anyhow::{Context, Result};
use chew::{DistillConfig, Distiller, OutputFormat};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Chew content distiller
#[derive(Parser, Debug)]
#[command(name = "chew")]
#[command(version)]
#[command(about = "Fetch web documents and print their main content as clean text")]
struct Args {
    /// URLs to distill (http, https or file)
    #[arg(required = true)]
    urls: Vec<String>,

    /// Output format: plain or markdown
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Concurrent fetches
    #[arg(short, long)]
    workers: Option<usize>,

    /// Deadline for the whole batch in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> DistillConfig {
        let mut config = DistillConfig::from_env();
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(ms) = self.timeout_ms {
            config.fetch_timeout_ms = ms;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(ms) = self.deadline_ms {
            config.batch_deadline_ms = ms;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("{} {} distilling {} URL(s)", chew::NAME, chew::VERSION, args.urls.len());

    let distiller = Distiller::new(args.config()).context("invalid configuration")?;
    let results = distiller.process(&args.urls).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            println!("==> {} [{}]", result.url, result.status);
            match (&result.reason, &result.message) {
                (Some(reason), Some(message)) => println!("{}: {}\n", reason, message),
                _ => println!("{}\n", result.text),
            }
        }
    }

    if results.succeeded() == 0 {
        anyhow::bail!("no URL produced content");
    }
    Ok(())
}
