use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use neuro_engines::config::AppConfig;
use neuro_engines::error::AppError;
use neuro_engines::{telemetry, EngineTables, PatientSnapshot, PatientState, Pipeline};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "neuro-engines",
    about = "Score pediatric neuro-inflammatory cases with the five clinical engines",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline on a JSON snapshot and print the populated patient state
    Score(ScoreArgs),
    /// Print the effective engine tables
    Tables(OutputArgs),
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Path to the current snapshot (JSON)
    #[arg(long)]
    snapshot: PathBuf,
    /// Snapshot from an earlier day, scored first to seed the score history
    #[arg(long)]
    previous: Option<PathBuf>,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Emit single-line JSON instead of pretty output
    #[arg(long)]
    compact: bool,
}

#[derive(Serialize)]
struct ScoreReport<'a> {
    generated_at: DateTime<Utc>,
    environment: &'static str,
    state: &'a PatientState,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let tables = config.engine_tables()?;

    match cli.command {
        Command::Score(args) => score(args, tables, config.environment.label()),
        Command::Tables(output) => emit(&tables, &output),
    }
}

fn score(args: ScoreArgs, tables: EngineTables, environment: &'static str) -> Result<(), AppError> {
    let pipeline = Pipeline::new(tables);

    let mut state = match &args.previous {
        Some(path) => {
            let mut previous = PatientState::new(read_snapshot(path)?)?;
            pipeline.run(&mut previous)?;
            info!(
                previous = %path.display(),
                day = previous.snapshot().hospital_day,
                "seeded score history"
            );
            PatientState::follow_up(&previous, read_snapshot(&args.snapshot)?)?
        }
        None => PatientState::new(read_snapshot(&args.snapshot)?)?,
    };

    pipeline.run(&mut state)?;
    info!(
        snapshot = %args.snapshot.display(),
        alerts = state.alerts().len(),
        "snapshot scored"
    );

    let report = ScoreReport {
        generated_at: Utc::now(),
        environment,
        state: &state,
    };
    emit(&report, &args.output)
}

fn read_snapshot(path: &Path) -> Result<PatientSnapshot, AppError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn emit<T: Serialize>(value: &T, output: &OutputArgs) -> Result<(), AppError> {
    let rendered = if output.compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}
