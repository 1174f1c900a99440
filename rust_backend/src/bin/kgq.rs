//! KG quality evaluation binary
//!
//! Filters the analyzer snapshots down to LOD Cloud KGs, evaluates the
//! quality statistics of every scope and renders the chart descriptions.
//!
//! # Usage
//!
//! ```bash
//! # Full run: filtering, evaluation and charts for the corpus and every topic
//! kgq
//!
//! # Reuse the filtered snapshots
//! kgq --skip-filtering
//!
//! # Only the whole LOD Cloud, with a custom configuration
//! kgq --whole-corpus --config analysis.toml
//! ```
//!
//! # Environment Variables
//!
//! - `KGQ_CONFIG`: Configuration file (default: `analysis.toml` search)
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use kgq_rust::charts::JsonChartRenderer;
use kgq_rust::config::AnalysisConfig;
use kgq_rust::preprocessing::{EvaluationPipeline, ScopeSelection};

#[derive(Parser, Debug)]
#[command(name = "kgq", about = "Quality of LOD Cloud knowledge graphs over time")]
#[command(version)]
#[command(group(ArgGroup::new("mode").multiple(false)))]
struct Cli {
    /// Evaluate the already filtered snapshots
    #[arg(short = 'j', long, group = "mode")]
    skip_filtering: bool,

    /// Only render the charts of existing evaluation tables
    #[arg(short, long, group = "mode")]
    charts_only: bool,

    /// Evaluate the topics only, not the whole corpus
    #[arg(short, long, group = "mode")]
    topics_only: bool,

    /// Evaluate the whole corpus only, without the topic breakdown
    #[arg(short = 'l', long, group = "mode")]
    whole_corpus: bool,

    /// Configuration file
    #[arg(long, env = "KGQ_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn selection(&self) -> ScopeSelection {
        if self.topics_only {
            ScopeSelection::TopicsOnly
        } else if self.whole_corpus {
            ScopeSelection::WholeCorpus
        } else {
            ScopeSelection::Everything
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => match AnalysisConfig::from_default_location()
            .context("Failed to load analysis.toml")?
        {
            Some(config) => Ok(config),
            None => {
                warn!("No analysis.toml found; using the built-in configuration");
                Ok(AnalysisConfig::default())
            }
        },
    }
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let pipeline = EvaluationPipeline::new(config);
    let scopes = pipeline.scopes(cli.selection());

    if !cli.charts_only {
        if !cli.skip_filtering {
            pipeline.filter_corpus()?;
        }
        for scope in &scopes {
            let report = pipeline.evaluate_scope(scope)?;
            info!(
                "{}: {} snapshots, {} tables",
                report.scope, report.snapshots, report.tables_written
            );
        }
    }

    for scope in &scopes {
        let summary = pipeline.render_charts(scope, JsonChartRenderer);
        if summary.failed > 0 {
            warn!("{}: {} charts could not be rendered", scope, summary.failed);
        }
    }

    Ok(())
}
