//! policycheck: index contract documents and check them against the rule catalog.
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use policycheck_core::config::{Config, JudgeProvider, Settings};
use policycheck_core::data_processor::DataProcessor;
use policycheck_core::rules;
use policycheck_core::samples::SampleContracts;
use policycheck_core::traits::DocumentProvisioner;
use policycheck_eval::{rating, recommendations, render_summary, Evaluator, ReportAggregator, ReportStore};
use policycheck_index::Retriever;
use policycheck_judge::default_judge;

#[derive(Parser)]
#[command(name = "policycheck")]
#[command(about = "Retrieval-backed contract compliance checker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk the document directory and rebuild the index
    Index,

    /// Show the chunks most similar to a query
    Search {
        query: String,

        /// Number of results
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Evaluate every rule and write the report
    Check {
        /// Use the offline keyword judge instead of Gemini
        #[arg(long)]
        offline: bool,
    },

    /// Print the summary of the last report
    Summary,

    /// List the rule catalog
    Rules,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("loading configuration")?;
    let settings = config.settings().context("invalid configuration")?;

    match cli.command {
        Commands::Index => index(&settings),
        Commands::Search { query, k } => search(&settings, &query, k.unwrap_or(settings.search.top_k_default)),
        Commands::Check { offline } => check(settings, offline),
        Commands::Summary => summary(&settings),
        Commands::Rules => {
            for (id, rule) in rules::all_rules() {
                println!("{:<30} {}", id, rule.title);
                println!("{:<30} {}", "", rule.description);
                println!("{:<30} keywords: {}\n", "", rule.keywords.join(", "));
            }
            Ok(())
        }
    }
}

fn index(settings: &Settings) -> anyhow::Result<()> {
    let document_dir = settings.document_directory();
    if DataProcessor::new(settings.chunking).list_documents(&document_dir).is_empty() {
        let written = SampleContracts.provision(&document_dir).context("writing sample contracts")?;
        println!("No documents in {}; wrote {} sample contracts", document_dir.display(), written);
    }
    let stats = Retriever::new(settings).build().context("building index")?;
    println!("Indexed {} documents ({} chunks, {} terms)", stats.documents, stats.chunks, stats.vocabulary_size);
    println!("Index written to {}", settings.index_directory().display());
    Ok(())
}

fn search(settings: &Settings, query: &str, k: usize) -> anyhow::Result<()> {
    let retriever = Retriever::open(settings, &SampleContracts).context("opening index")?;
    let results = retriever.search(query, k)?;
    if results.is_empty() {
        println!("No matching chunks for '{}'", query);
        return Ok(());
    }
    for (rank, r) in results.iter().enumerate() {
        let preview: String = r.chunk.text.chars().take(300).collect();
        println!(
            "{}. {} [chunk {}/{}] similarity {:.3}\n   {}\n",
            rank + 1,
            r.chunk.source_document,
            r.chunk.sequence_index + 1,
            r.chunk.total_chunks_in_document,
            r.similarity,
            preview.replace('\n', " ")
        );
    }
    Ok(())
}

fn check(mut settings: Settings, offline: bool) -> anyhow::Result<()> {
    if offline {
        settings.judge.provider = JudgeProvider::Offline;
    }
    let retriever = Retriever::open(&settings, &SampleContracts).context("opening index")?;
    let judge = default_judge(&settings.judge).context("configuring judge")?;
    let catalog = rules::all_rules();

    let pb = ProgressBar::new(catalog.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rules {msg}")
            .context("progress bar template")?
            .progress_chars("#>-"),
    );
    let store = ReportStore::new(settings.report_path());
    let aggregator = ReportAggregator::new(Evaluator::new(&retriever, judge.as_ref(), settings.search.top_k_default), store);
    let report = aggregator.run_with_progress(&catalog, |verdict| {
        pb.set_message(format!("{}: {}", verdict.rule_title, verdict.status));
        pb.inc(1);
    });
    let report = match report {
        Ok(r) => {
            pb.finish_with_message("done");
            r
        }
        Err(e) => {
            pb.abandon_with_message("failed");
            bail!("compliance check failed, no report written: {}", e);
        }
    };

    println!("\n{}", render_summary(&report));
    if report.summary.errors > 0 {
        println!("{} rules could not be analysed; see the report for details", report.summary.errors);
    }
    println!("Recommendations:");
    for r in recommendations(&report) {
        println!("  - {}", r);
    }
    let grade = rating(report.score());
    println!("\n{}: {}", grade, grade.message());
    println!("Results saved to: {}", settings.report_path().display());
    Ok(())
}

fn summary(settings: &Settings) -> anyhow::Result<()> {
    match ReportStore::new(settings.report_path()).load().context("reading report")? {
        Some(report) => {
            println!("Report from {}\n", report.timestamp);
            println!("{}", render_summary(&report));
            for (id, v) in &report.rule_results {
                println!("{:<30} {:<14} confidence {:.2}", id, v.status.as_str(), v.confidence);
            }
        }
        None => println!("No compliance results found. Please run a compliance check first."),
    }
    Ok(())
}
