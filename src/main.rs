use std::process;

use clap::{Parser, Subcommand};

use accident_insights::logging::{self, LogLevel, Stage};
use accident_insights::model::PipelineError;
use accident_insights::pipelines::{db_check, extract, load, merge, run, transform, visualize};

#[derive(Parser)]
#[command(
    name = "accident-insights",
    version,
    about = "ETL and charts for the UK road-safety accident dataset"
)]
struct Cli {
    /// Minimum level printed: debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Also append timestamped entries to this file
    #[arg(long, global = true)]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract, merge, load a sample and render every chart
    Run(run::RunArgs),
    /// Download the dataset files from Kaggle
    Extract(extract::ExtractArgs),
    /// Join the accident and vehicle files
    Merge(merge::MergeArgs),
    /// Keep a subset of columns and write them `;`-separated
    Transform(transform::TransformArgs),
    /// Persist the first rows into the accidents table
    Load(load::LoadArgs),
    /// Render the charts from the merged file
    Visualize(visualize::VisualizeArgs),
    /// Print the database server version
    DbCheck(db_check::DbCheckArgs),
}

impl Commands {
    fn stage(&self) -> Stage {
        match self {
            Commands::Run(_) => Stage::System,
            Commands::Extract(_) => Stage::Extract,
            Commands::Merge(_) => Stage::Merge,
            Commands::Transform(_) => Stage::Transform,
            Commands::Load(_) => Stage::Load,
            Commands::Visualize(_) => Stage::Visualize,
            Commands::DbCheck(_) => Stage::Database,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Commands::Run(_) => "run",
            Commands::Extract(_) => "extract",
            Commands::Merge(_) => "merge",
            Commands::Transform(_) => "transform",
            Commands::Load(_) => "load",
            Commands::Visualize(_) => "visualize",
            Commands::DbCheck(_) => "db-check",
        }
    }
}

fn dispatch(command: &Commands) -> Result<(), PipelineError> {
    match command {
        Commands::Run(args) => {
            let report = run::run(args)?;
            let loaded = report
                .loaded_rows
                .map(|n| n.to_string())
                .unwrap_or_else(|| "skipped".to_string());
            logging::info(
                Stage::System,
                None,
                &format!(
                    "Done: {} merged rows, load {}, {} charts",
                    report.merged_rows, loaded, report.charts
                ),
            );
        }
        Commands::Extract(args) => {
            extract::run(args)?;
        }
        Commands::Merge(args) => {
            merge::run(args)?;
        }
        Commands::Transform(args) => {
            transform::run(args)?;
        }
        Commands::Load(args) => {
            load::run(args)?;
        }
        Commands::Visualize(args) => {
            visualize::run(args)?;
        }
        Commands::DbCheck(args) => {
            println!("{}", db_check::run(args)?);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init_logger(cli.log_level, cli.log_file.as_deref(), false);

    if let Err(e) = dispatch(&cli.command) {
        logging::log_stage_failure(cli.command.stage(), None, cli.command.name(), &e);
        process::exit(1);
    }
}
