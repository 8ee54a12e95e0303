//! Credit Intake - multi-step credit-application conversation engine
//!
//! A per-user state machine collects an application step by step,
//! persists completed applications to SQLite, and notifies a reviewer.
//! This binary wires the engine to a line-oriented console transport.

mod console;
mod db;
mod runtime;
mod session;
mod state_machine;
mod texts;

use std::path::PathBuf;
use std::sync::Arc;

use db::Database;
use runtime::ProductionEngine;
use state_machine::UserId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_intake=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let db_path = std::env::var("INTAKE_DB_PATH").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        format!("{home}/.credit-intake/intake.db")
    });

    let reviewer: UserId = std::env::var("INTAKE_REVIEWER_ID")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| {
            tracing::warn!("INTAKE_REVIEWER_ID not set; reviewer features disabled");
            0
        });

    // Ensure database directory exists
    if let Some(parent) = PathBuf::from(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %db_path, "Opening database");
    let db = Database::open(&db_path)?;

    let transport = Arc::new(console::ConsoleTransport);
    let engine = Arc::new(ProductionEngine::with_database(db, transport, reviewer));

    tracing::info!(reviewer, "intake engine ready");
    console::run(engine, 1).await;

    Ok(())
}
