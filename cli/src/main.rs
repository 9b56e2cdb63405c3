//! pdfblocks CLI - block feature extraction and classification tool

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfblocks::classifier::{evaluate, permutation_importance, CrossValidationReport};
use pdfblocks::dataset::save_error_report;
use pdfblocks::{
    load_document, BuildOptions, Corpus, DatasetBuilder, FeatureSchema, FeatureTable,
    ModelArtifact, MulticlassMetrics, TrainOptions, Trainer,
};

#[derive(Parser)]
#[command(name = "pdfblocks")]
#[command(version)]
#[command(about = "Extract block features from parsed PDF pages and classify them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a labeled feature table from document dumps and ground truth
    Features {
        /// Directory with document dumps and PAGE-XML ground truth
        #[arg(value_name = "DATA_DIR")]
        input: PathBuf,

        /// Output CSV file
        #[arg(short, long, value_name = "FILE", default_value = "features.csv")]
        output: PathBuf,

        /// Feature schema
        #[arg(long, value_enum, default_value = "v2")]
        schema: SchemaVersion,

        /// Number of documents to sample (0 = all)
        #[arg(long, default_value = "0")]
        docs: usize,

        /// Sampling seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Cross-validate and train a model on a feature table
    Train {
        /// Feature table (CSV)
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Output model file
        #[arg(short, long, value_name = "FILE", default_value = "model.json.gz")]
        output: PathBuf,

        /// Expected feature schema (detected from the header if omitted)
        #[arg(long, value_enum)]
        schema: Option<SchemaVersion>,

        /// Number of cross-validation folds
        #[arg(long, default_value = "5")]
        folds: usize,

        /// Fold assignment seed
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Boosting iterations per category
        #[arg(long)]
        iterations: Option<usize>,
    },

    /// Evaluate a model on a feature table
    Evaluate {
        /// Model file
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// Feature table (CSV)
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Shuffles per column for permutation importance (0 = skip)
        #[arg(long, default_value = "30")]
        permutations: usize,

        /// Permutation seed
        #[arg(long, default_value = "1")]
        seed: u64,

        /// Print the metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify the pre-segmented blocks of a document dump
    Classify {
        /// Model file
        #[arg(value_name = "MODEL")]
        model: PathBuf,

        /// Document dump (JSON)
        #[arg(value_name = "DOCUMENT")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SchemaVersion {
    /// 13 columns, fully contained glyphs
    V1,
    /// 17 columns, adds block shape and outline similarity
    V2,
}

impl From<SchemaVersion> for FeatureSchema {
    fn from(version: SchemaVersion) -> Self {
        match version {
            SchemaVersion::V1 => FeatureSchema::V1,
            SchemaVersion::V2 => FeatureSchema::V2,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Features {
            input,
            output,
            schema,
            docs,
            seed,
            sequential,
        } => {
            let mut options = BuildOptions::new()
                .with_schema(schema.into())
                .with_sample_size(docs)
                .with_seed(seed);
            if sequential {
                options = options.sequential();
            }
            cmd_features(&input, &output, options)
        }
        Commands::Train {
            input,
            output,
            schema,
            folds,
            seed,
            iterations,
        } => {
            let mut options = TrainOptions::new().with_folds(folds).with_seed(seed);
            if let Some(n) = iterations {
                options.booster = options.booster.with_iterations(n);
            }
            cmd_train(&input, &output, schema.map(Into::into), options)
        }
        Commands::Evaluate {
            model,
            input,
            permutations,
            seed,
            json,
        } => cmd_evaluate(&model, &input, permutations, seed, json),
        Commands::Classify { model, input } => cmd_classify(&model, &input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Path of the rejected-document report written next to `output`.
fn error_report_path(output: &Path) -> PathBuf {
    let stem = output.file_stem().unwrap_or_default().to_string_lossy();
    output.with_file_name(format!("invalid_{}.txt", stem))
}

fn cmd_features(
    input: &Path,
    output: &Path,
    options: BuildOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let progress = pb.clone();
    let builder = DatasetBuilder::new(options).with_progress(move |outcome| {
        if !outcome.is_valid() {
            progress.println(format!("{} {}", "Rejected".yellow(), outcome.id));
        }
        progress.inc(1);
    });

    pb.set_message("Discovering documents...");
    let corpus = Corpus::discover(input, builder.source())?;
    pb.set_length(builder.select(&corpus)?.len() as u64);

    pb.set_message("Extracting features...");
    let report = builder.build(&corpus)?;
    pb.finish_with_message("Done!");

    let rows = report.samples.len();
    let table = FeatureTable::new(report.schema, report.samples)?;
    table.save(output)?;

    let ids: Vec<&str> = report.rejected.iter().map(|r| r.id.as_str()).collect();
    let report_path = error_report_path(output);
    save_error_report(&report_path, &ids)?;

    println!("\n{}", "Dataset".green().bold());
    println!("  {} {} documents processed", "├─".dimmed(), report.documents);
    println!(
        "  {} {} valid, {} rejected",
        "├─".dimmed(),
        report.documents - report.rejected.len(),
        report.rejected.len()
    );
    println!("  {} {} rotated pages skipped", "├─".dimmed(), report.skipped_pages);
    println!("  {} {} rows ({})", "├─".dimmed(), rows, report.schema);
    println!("  {} {}", "├─".dimmed(), output.display());
    println!("  {} {}", "└─".dimmed(), report_path.display());

    for rejected in &report.rejected {
        log::debug!("{}: {}", rejected.id, rejected.reason);
    }

    Ok(())
}

fn print_cross_validation(report: &CrossValidationReport) {
    println!("{}", "Cross-validation".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    println!("{}: {}", "Micro-accuracy".bold(), report.micro_accuracy);
    println!("{}: {}", "Macro-accuracy".bold(), report.macro_accuracy);
    println!("{}: {}", "Log-loss".bold(), report.log_loss);
    println!("{}: {}", "Log-loss reduction".bold(), report.log_loss_reduction);
    println!();
    for category in pdfblocks::BlockCategory::ALL {
        println!(
            "  {:<10} F1 {}  log-loss {}",
            category.name(),
            report.per_class_f1[category.id()],
            report.per_class_log_loss[category.id()]
        );
    }
    println!();
}

fn print_metrics(metrics: &MulticlassMetrics) {
    println!("{}", "Metrics".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    println!("{}: {:.4}", "Micro-accuracy".bold(), metrics.micro_accuracy);
    println!("{}: {:.4}", "Macro-accuracy".bold(), metrics.macro_accuracy);
    println!("{}: {:.4}", "Log-loss".bold(), metrics.log_loss);
    println!(
        "{}: {:.4}",
        "Log-loss reduction".bold(),
        metrics.log_loss_reduction
    );
    println!();
    println!(
        "  {:<10} {:>9} {:>9} {:>9} {:>9}",
        "class", "precision", "recall", "f1", "support"
    );
    for class in metrics.per_class() {
        println!(
            "  {:<10} {:>9.4} {:>9.4} {:>9.4} {:>9}",
            class.category.name(),
            class.precision,
            class.recall,
            class.f1,
            class.support
        );
    }
    println!();
    println!("{}", metrics.confusion);
}

fn cmd_train(
    input: &Path,
    output: &Path,
    schema: Option<FeatureSchema>,
    options: TrainOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let table = FeatureTable::load(input)?;
    if let Some(expected) = schema {
        table.ensure_schema(expected)?;
    }

    let trainer = Trainer::gbdt(options.clone());

    let pb = spinner(format!("Cross-validating ({} folds)...", options.folds));
    let cv = trainer.cross_validate(&table)?;
    pb.finish_and_clear();
    print_cross_validation(&cv);

    let pb = spinner("Training final model...");
    let model = trainer.fit(&table)?;
    pb.finish_and_clear();

    let artifact = ModelArtifact::new(model, options.booster, table.len());
    artifact.save(output)?;
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

/// A spinner that keeps redrawing while the caller blocks.
fn spinner(message: impl Into<std::borrow::Cow<'static, str>>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn cmd_evaluate(
    model: &Path,
    input: &Path,
    permutations: usize,
    seed: u64,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = ModelArtifact::load(model)?;
    let table = FeatureTable::load(input)?;
    table.ensure_schema(artifact.schema)?;

    let metrics = evaluate(&artifact.model, &table)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print_metrics(&metrics);
    }

    if permutations > 0 {
        let pb = spinner("Computing permutation importance...");
        let ranking = permutation_importance(&artifact.model, &table, permutations, seed)?;
        pb.finish_and_clear();

        println!("{}", "Permutation feature importance".cyan().bold());
        println!("{}", "─".repeat(60).dimmed());
        for (rank, importance) in ranking.iter().enumerate() {
            println!(
                "  {:>2}. {:<22} {:>+9.5} ± {:.5}",
                rank + 1,
                importance.column,
                importance.mean_delta,
                importance.ci95
            );
        }
    }

    Ok(())
}

fn cmd_classify(model: &Path, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = ModelArtifact::load(model)?.into_classifier();
    let doc = load_document(input)?;

    for page in &doc.pages {
        if page.blocks.is_empty() {
            continue;
        }
        println!("{} {}", "Page".cyan().bold(), page.number);
        let bookmarks = doc.bookmarks_on_page(page.number);
        for (block, result) in classifier.classify_page(page, bookmarks)? {
            let text: String = block.text().chars().take(60).collect();
            println!(
                "  {:<10} {:.3}  {}",
                result.category.name().green(),
                result.score,
                text.replace('\n', " ").dimmed()
            );
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfblocks".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF block feature extraction and classification tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_report_path() {
        assert_eq!(
            error_report_path(Path::new("out/features.csv")),
            PathBuf::from("out/invalid_features.txt")
        );
        assert_eq!(
            error_report_path(Path::new("train.csv")),
            PathBuf::from("invalid_train.txt")
        );
    }

    #[test]
    fn test_spinner_ticks_until_finished() {
        let pb = spinner("Working...");
        assert_eq!(pb.message(), "Working...");
        assert!(!pb.is_finished());
        pb.finish_and_clear();
        assert!(pb.is_finished());
    }

    #[test]
    fn test_schema_version_conversion() {
        assert_eq!(FeatureSchema::from(SchemaVersion::V1), FeatureSchema::V1);
        assert_eq!(FeatureSchema::from(SchemaVersion::V2), FeatureSchema::V2);
    }
}
