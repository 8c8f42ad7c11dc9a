use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use injury_evidence_eval::model::Config;
use injury_evidence_eval::{
    EvidenceError, Layer1Evidence, evaluate, evaluate_with_trace, validate_evidence,
};

/// Evaluate extracted injury evidence into the final injury list
#[derive(Debug, Parser)]
#[command(name = "injury-eval", version, about)]
struct Cli {
    /// Evidence JSON file, or `-` for stdin
    #[arg(long, required_unless_present = "schema")]
    evidence: Option<PathBuf>,

    /// Source note; when given, evidence is checked for grounding first
    #[arg(long)]
    note: Option<PathBuf>,

    /// YAML config file (overrides INJURY_EVAL_CONFIG_PATH)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the decision for every mention alongside the result
    #[arg(long)]
    trace: bool,

    /// Print the evidence JSON Schema and exit
    #[arg(long)]
    schema: bool,
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    /// Validation against the note found ungrounded evidence
    #[error("Evidence is not grounded in the note: {0}")]
    Ungrounded(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> Result<(), AppError> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.schema {
        println!(
            "{}",
            serde_json::to_string_pretty(&Layer1Evidence::json_schema())?
        );
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::from_env(),
    };

    let Some(evidence_path) = cli.evidence.as_deref() else {
        return Ok(());
    };
    let evidence = Layer1Evidence::from_json(&read_source(evidence_path)?)?;

    if let Some(note_path) = cli.note.as_deref() {
        let note = read_source(note_path)?;
        let validation = validate_evidence(&evidence, &note);

        if !validation.warnings.is_empty() {
            tracing::warn!(
                warnings = ?validation.warnings,
                "Evidence validation produced quality warnings"
            );
        }

        if !validation.is_valid {
            tracing::error!(
                errors = ?validation.errors,
                "Evidence validation failed - evidence not grounded in note"
            );
            return Err(AppError::Ungrounded(validation.errors.join("; ")));
        }
    }

    tracing::info!(
        mentions = evidence.injury_mentions.len(),
        no_injury_statements = evidence.no_injury_statements.len(),
        model = ?evidence.metadata.model,
        "Evaluating evidence"
    );

    let output = if cli.trace {
        serde_json::to_string_pretty(&evaluate_with_trace(&evidence, &config.evaluator))?
    } else {
        serde_json::to_string_pretty(&evaluate(&evidence, &config.evaluator))?
    };
    println!("{output}");

    Ok(())
}

/// Read a file, or stdin when the path is `-`
fn read_source(path: &Path) -> Result<String, EvidenceError> {
    let read_error = |source| EvidenceError::Read {
        path: path.to_path_buf(),
        source,
    };

    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(read_error)?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).map_err(read_error)
    }
}
