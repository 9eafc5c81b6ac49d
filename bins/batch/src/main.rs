//! Journalflow batch runner
//!
//! Seeds an in-memory store from a JSON fixture, validates one bulk
//! operation over the given ids and, unless asked to stop there, executes
//! it. Validations and the result are printed as JSON.
//!
//! Usage: journalflow-batch --fixtures fixtures/entries.json --operation post \
//!        --ids je-1001,je-1002 --reason "month close"

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use journalflow_core::engine::{
    EventChannel, InMemoryJournalStore, JournalEngine, OperationRequest, OperationValidation,
    ValidationSummary,
};
use journalflow_core::ledger::JournalEntry;
use journalflow_core::lifecycle::{Actor, Operation, UserRole};
use journalflow_shared::AppConfig;
use journalflow_shared::types::UserId;

#[derive(Parser, Debug)]
#[command(name = "journalflow-batch")]
#[command(about = "Validate and run a bulk journal entry operation")]
struct Cli {
    /// JSON file holding the entries to load.
    #[arg(long, env = "JOURNALFLOW_FIXTURES")]
    fixtures: PathBuf,

    /// Operation to run: submit, approve, post, cancel, reverse or reset.
    #[arg(long, value_parser = parse_operation)]
    operation: Operation,

    /// Comma-separated entry ids.
    #[arg(long, value_delimiter = ',', required = true)]
    ids: Vec<String>,

    /// Reason recorded with the operation.
    #[arg(long)]
    reason: Option<String>,

    /// Bypass soft business-rule warnings.
    #[arg(long)]
    force: bool,

    /// Stop after the validation pass.
    #[arg(long)]
    validate_only: bool,

    /// Role of the acting user.
    #[arg(long, default_value = "admin", value_parser = parse_role)]
    role: UserRole,
}

#[derive(Serialize)]
struct ValidationReport<'a> {
    summary: ValidationSummary,
    validations: &'a [OperationValidation],
}

fn parse_operation(s: &str) -> Result<Operation, String> {
    Operation::parse(s).ok_or_else(|| format!("unknown operation: {s}"))
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    UserRole::parse(s).ok_or_else(|| format!("unknown role: {s}"))
}

fn load_fixtures(path: &Path) -> anyhow::Result<Vec<JournalEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixtures from {}", path.display()))?;
    let mut entries: Vec<JournalEntry> =
        serde_json::from_str(&raw).context("Fixtures are not a list of journal entries")?;
    for entry in &mut entries {
        entry.recompute_totals();
    }
    Ok(entries)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let json_logs = config.logging.json;
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    let entries = load_fixtures(&cli.fixtures)?;
    info!(count = entries.len(), path = %cli.fixtures.display(), "Fixtures loaded");

    let store = Arc::new(InMemoryJournalStore::with_entries(entries));
    let engine = JournalEngine::new(store, EventChannel::new(), &config.engine);
    engine.channel().on(cli.operation.event_type(), |event| {
        info!(
            event = %event.event_type,
            entry_id = %event.entry_id,
            "Lifecycle event published"
        );
    });

    let actor = Actor::new(UserId::new(), cli.role);

    let validations = engine
        .validate_bulk(&cli.ids, cli.operation, &actor)
        .await;
    let summary = ValidationSummary::from_validations(&validations);
    let report = ValidationReport {
        summary,
        validations: &validations,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if cli.validate_only {
        return Ok(());
    }
    if summary.runnable(cli.force) < summary.total {
        warn!(
            runnable = summary.runnable(cli.force),
            total = summary.total,
            "Some entries will fail"
        );
    }

    let mut request = OperationRequest::new(cli.operation, actor).with_force(cli.force);
    request.reason = cli.reason;

    let result = engine
        .execute_bulk(&cli.ids, &request)
        .await
        .map_err(|err| anyhow!("{} ({})", err, err.error_code()))?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
