//! Sinistro CLI binary.
//!
//! Runs the claim pipeline and manages its artifacts.

mod error;
mod logging;

use clap::{Args, Parser, Subcommand, ValueEnum};
use error::CliError;
use indicatif::{ProgressBar, ProgressStyle};
use sinistro::clean::RegionCode;
use sinistro::data::io::separator_byte;
use sinistro::data::source::DEFAULT_EXTENSION;
use sinistro::{
    Artifact, InputSource, Pipeline, PipelineConfig, PipelineRun, StageOutcome, ZeroWeightPolicy,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::debug;

#[derive(Parser)]
#[command(name = "sinistro")]
#[command(about = "Sinistro: insurance-claim ETL into a daily feature table", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline, reusing existing artifacts
    Run {
        /// Source files, or a single directory of extracts
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        artifacts: ArtifactArgs,

        /// Reader pool size (0 = all cores)
        #[arg(long, short, default_value = "0")]
        jobs: usize,

        /// Cap on each reader's internal threads
        #[arg(long, default_value = "2")]
        inner_threads: usize,

        /// Extension of files picked up from an input directory
        #[arg(long, default_value = DEFAULT_EXTENSION)]
        extension: String,

        /// Recompute every stage even when its artifact exists
        #[arg(long)]
        refresh: bool,

        /// Weighted means for dates with zero total indemnity (zero, null or exclude)
        #[arg(long, default_value = "zero")]
        zero_weight: ZeroWeightPolicy,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },

    /// Show which artifacts exist
    Status {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete an artifact and everything derived from it
    Reset {
        #[command(flatten)]
        artifacts: ArtifactArgs,

        /// First stage to invalidate
        #[arg(long, value_enum, default_value = "combined")]
        from: StageArg,
    },

    /// List the accepted region codes
    Regions,
}

/// Where the artifacts live.
#[derive(Args)]
struct ArtifactArgs {
    /// Directory holding the three artifacts under their default names
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Combined-table artifact (overrides --out-dir)
    #[arg(long)]
    combined: Option<PathBuf>,

    /// Cleaned-table artifact (overrides --out-dir)
    #[arg(long)]
    cleaned: Option<PathBuf>,

    /// Final-table artifact (overrides --out-dir)
    #[arg(long = "final")]
    final_table: Option<PathBuf>,

    /// Field separator of sources and artifacts
    #[arg(long, default_value = ";")]
    separator: char,
}

impl ArtifactArgs {
    fn apply(self, mut config: PipelineConfig) -> Result<PipelineConfig, CliError> {
        config = config
            .with_artifact_dir(&self.out_dir)
            .with_separator(separator_byte(self.separator)?);
        if let Some(path) = self.combined {
            config = config.with_combined_path(path);
        }
        if let Some(path) = self.cleaned {
            config = config.with_cleaned_path(path);
        }
        if let Some(path) = self.final_table {
            config = config.with_final_path(path);
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StageArg {
    Combined,
    Cleaned,
    Final,
}

impl From<StageArg> for Artifact {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Combined => Self::Combined,
            StageArg::Cleaned => Self::Cleaned,
            StageArg::Final => Self::Final,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Run {
            inputs,
            artifacts,
            jobs,
            inner_threads,
            extension,
            refresh,
            zero_weight,
            format,
            no_progress,
        } => {
            let config = artifacts.apply(PipelineConfig::new(InputSource::from_paths(inputs)))?;
            let config = config
                .with_jobs(jobs)
                .with_inner_threads(Some(inner_threads))
                .with_extension(extension)
                .with_force_refresh(refresh)
                .with_zero_weight_policy(zero_weight);
            run_pipeline(config, format, !no_progress)
        }
        Commands::Status { artifacts, format } => {
            let config = artifacts.apply(PipelineConfig::default())?;
            show_status(&config, format)
        }
        Commands::Reset { artifacts, from } => {
            let config = artifacts.apply(PipelineConfig::default())?;
            reset_artifacts(&config, from.into())
        }
        Commands::Regions => {
            list_all_regions();
            Ok(())
        }
    }
}

fn run_pipeline(
    config: PipelineConfig,
    format: OutputFormat,
    show_progress: bool,
) -> Result<(), CliError> {
    debug!(?config, "Pipeline configuration");
    let pipeline = Pipeline::new(config);

    let pb = if show_progress && std::io::stderr().is_terminal() {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("█▓░"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    } else {
        ProgressBar::hidden()
    };

    let result = pipeline.run(Some(&pb));
    pb.finish_and_clear();
    let run = result?;

    let output = pipeline.config().final_path.clone();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&run.summary(output))?);
        }
        OutputFormat::Text => print_run(&run, &output),
    }
    Ok(())
}

fn print_run(run: &PipelineRun, output: &std::path::Path) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "SINISTRO PIPELINE");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!(
        "{:<30} {:>10} {:>10}",
        "File Aggregator",
        run.combine.outcome.to_string(),
        rows_label(run.combine.outcome, run.combine.rows)
    );
    if run.combine.outcome == StageOutcome::Computed {
        println!("  Files read: {}", run.combine.files);
    }

    println!(
        "{:<30} {:>10} {:>10}",
        "Domain Cleaner",
        run.clean.outcome.to_string(),
        rows_label(run.clean.outcome, run.clean.rows)
    );
    if let Some(report) = &run.clean.report {
        println!("  Input rows:          {:>10}", report.rows_in);
        println!("  Duplicates:          {:>10}", report.duplicates);
        println!("  Invalid sex:         {:>10}", report.invalid_sex);
        println!("  Invalid region:      {:>10}", report.invalid_region);
        println!("  Invalid cause/event: {:>10}", report.invalid_code);
    }

    println!(
        "{:<30} {:>10} {:>10}",
        "Temporal Feature Aggregator",
        run.features.outcome.to_string(),
        rows_label(run.features.outcome, run.features.rows)
    );
    if let Some(report) = &run.features.report {
        println!("  Malformed dates:     {:>10}", report.malformed_dates);
        println!("  Impossible dates:    {:>10}", report.impossible_dates);
        println!("  Zero-weight dates:   {:>10}", report.zero_weight_groups);
        println!("  Indicator columns:   {:>10}", report.indicator_columns);
    }

    println!(
        "\nFinal table: {} dates x {} columns -> {}",
        run.frame.height(),
        run.frame.width(),
        output.display()
    );
    println!("\n════════════════════════════════════════════════════════════════\n");
}

fn rows_label(outcome: StageOutcome, rows: usize) -> String {
    match outcome {
        StageOutcome::Skipped => "-".to_string(),
        _ => format!("{rows} rows"),
    }
}

fn show_status(config: &PipelineConfig, format: OutputFormat) -> Result<(), CliError> {
    let status = config.cache().status();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => {
            for entry in status {
                let state = if entry.present { "present" } else { "missing" };
                println!(
                    "{:<10} {:<8} {}",
                    entry.artifact.to_string(),
                    state,
                    entry.path.display()
                );
            }
        }
    }
    Ok(())
}

fn reset_artifacts(config: &PipelineConfig, from: Artifact) -> Result<(), CliError> {
    let removed = config.cache().invalidate(from)?;
    if removed.is_empty() {
        println!("Nothing to remove from {from} onward");
    }
    for path in removed {
        println!("Removed {}", path.display());
    }
    Ok(())
}

fn list_all_regions() {
    println!("Region codes:");
    println!("=============\n");

    for region in RegionCode::all() {
        println!("{} {} - {}", region.code(), region.abbreviation(), region.name());
    }
}
