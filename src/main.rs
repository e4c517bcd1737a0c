use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topicalign::config::Config;
use topicalign::corpus::loader;
use topicalign::corpus::records::{ItemRecord, Level, LevelParser, StandardRecord};
use topicalign::corpus::stopwords::StopwordSet;
use topicalign::output::terminal;
use topicalign::pipeline::alignment;
use topicalign::topics::labels::TopicLabels;
use topicalign::topics::lda::GibbsLda;

/// Topicalign: topic-model alignment of test items to curriculum standards.
///
/// Fits LDA on the standards, folds the items into the fitted model and
/// reports how each difficulty level covers each topic.
#[derive(Parser)]
#[command(name = "topicalign", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the report
    Run {
        /// Number of topics (overrides ALIGN_TOPICS)
        #[arg(long)]
        topics: Option<usize>,

        /// Fitting seed (overrides ALIGN_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory (overrides ALIGN_OUTPUT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Fit the standards model and print top terms per topic
    Topics {
        /// Terms to show per topic (default: 10)
        #[arg(long, default_value = "10")]
        top_n: usize,

        /// Number of topics (overrides ALIGN_TOPICS)
        #[arg(long)]
        topics: Option<usize>,

        /// Fitting seed (overrides ALIGN_SEED)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Load and validate the input tables, then print corpus statistics
    Check,
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topicalign=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { topics, seed, out } => {
            let mut config = Config::load()?;
            apply_overrides(&mut config, topics, seed)?;
            if let Some(out) = out {
                config.output_dir = out;
            }

            let (standards, stopwords, items) = load_inputs(&config)?;
            let labels = load_labels(&config)?;
            let pipeline = config.pipeline();
            let fitter = GibbsLda::new(pipeline.fitter.clone());

            println!(
                "Fitting {} topics on {} standards, scoring {} items...",
                config.topics,
                standards.len(),
                items.len()
            );

            let run = alignment::run(&standards, &items, &stopwords, &labels, &pipeline, &fitter)?;

            terminal::display_top_terms(&run.model.top_terms(8), &labels);
            terminal::display_coverage(&run.coverage, &labels);
            terminal::display_findings(
                &run.dropped_standards,
                &run.dropped_items,
                &run.posterior.zero_overlap_items(),
            );

            let artifacts =
                alignment::write_artifacts(&run, &items, &labels, &config.output_dir)?;

            println!("\n{}", "Alignment complete.".bold());
            println!("  Posterior table: {}", artifacts.posterior.display());
            println!("  Coverage chart:  {}", artifacts.coverage_chart.display());
            println!("  Item chart:      {}", artifacts.item_chart.display());
            println!("  Report:          {}", artifacts.report.display());
        }

        Commands::Topics { top_n, topics, seed } => {
            let mut config = Config::load()?;
            apply_overrides(&mut config, topics, seed)?;

            let standards = loader::load_standards(&config.standards_path)?;
            let supplement = loader::load_stopwords(&config.stopwords_path)?;
            let stopwords = StopwordSet::english_with(&supplement);
            let labels = load_labels(&config)?;
            let pipeline = config.pipeline();
            let fitter = GibbsLda::new(pipeline.fitter.clone());

            let fit = alignment::fit_standards(&standards, &stopwords, &pipeline, &fitter)?;
            terminal::display_top_terms(&fit.model.top_terms(top_n), &labels);
            terminal::display_findings(&fit.dropped, &[], &[]);
            println!(
                "{}",
                "Label topics by setting ALIGN_LABELS_PATH to a JSON file like {\"1\": \"Motion\"}."
                    .dimmed()
            );
        }

        Commands::Check => {
            let config = Config::load()?;
            let (standards, stopwords, items) = load_inputs(&config)?;
            print_corpus_stats(&standards, &stopwords, &items);
            if let Some(path) = &config.labels_path {
                TopicLabels::load(path, config.topics)?;
                println!("Labels: {} topics from {}", config.topics, path.display());
            }
            println!("\n{}", "Inputs are valid.".bold());
        }
    }

    Ok(())
}

/// Apply CLI overrides and re-validate.
fn apply_overrides(config: &mut Config, topics: Option<usize>, seed: Option<u64>) -> Result<()> {
    if let Some(topics) = topics {
        config.topics = topics;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(())
}

fn load_inputs(config: &Config) -> Result<(Vec<StandardRecord>, StopwordSet, Vec<ItemRecord>)> {
    let levels = LevelParser::new(&config.level_pattern)?;
    let standards = loader::load_standards(&config.standards_path)?;
    let supplement = loader::load_stopwords(&config.stopwords_path)?;
    let items = loader::load_items(&config.items_path, &levels)?;
    let stopwords = StopwordSet::english_with(&supplement);
    info!(stopwords = stopwords.len(), "Built stop-word set");
    Ok((standards, stopwords, items))
}

fn load_labels(config: &Config) -> Result<TopicLabels> {
    match &config.labels_path {
        Some(path) => Ok(TopicLabels::load(path, config.topics)?),
        None => Ok(TopicLabels::numbered(config.topics)),
    }
}

fn print_corpus_stats(standards: &[StandardRecord], stopwords: &StopwordSet, items: &[ItemRecord]) {
    let domains: BTreeSet<&str> = standards.iter().map(|s| s.domain.as_str()).collect();
    println!("Standards: {} rows across {} domains", standards.len(), domains.len());
    for domain in &domains {
        let count = standards.iter().filter(|s| s.domain == *domain).count();
        println!("  {:<24} {:>4}", domain, count);
    }

    println!("Items: {}", items.len());
    for level in Level::ALL {
        let count = items.iter().filter(|i| i.level == level).count();
        println!("  {:<24} {:>4}", level, count);
    }

    println!("Stop words: {}", stopwords.len());
}
