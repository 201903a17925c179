// src/main.rs
use std::env;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use tracing::Instrument;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equipment_console::config::{load_config, Config};
use equipment_console::history::SearchHistory;
use equipment_console::models::Equipment;
use equipment_console::notification::NotificationSlot;
use equipment_console::orchestrator::{QueryOrchestrator, QuerySettings};
use equipment_console::projection::{SortDirection, SortField, SortState};
use equipment_console::services::HttpEquipmentService;
use equipment_console::stats::{system_clock, DerivedStats};
use equipment_console::storage::SqliteStore;
use equipment_console::store::{LoadingState, StateStore};

const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (this calls load_env_file internally)
    let config = load_config()?;

    setup_logging(&config)?;
    config.print_startup_info();

    let term = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let span = tracing::info_span!("equipment_console", service = %config.service.base_url);
    run(config, term).instrument(span).await
}

async fn run(config: Config, term: String) -> anyhow::Result<()> {
    let service = HttpEquipmentService::from_config(&config.service)
        .context("Failed to build equipment service client")?;

    let history_store = SqliteStore::connect(&config.history.database_url)
        .await
        .with_context(|| format!("Failed to open search history at {}", config.history.database_url))?;
    let history = SearchHistory::load(Arc::new(history_store), config.history.settings()).await;

    let slot = NotificationSlot::new();
    let orchestrator = QueryOrchestrator::new(
        Arc::new(service),
        Arc::new(slot.clone()),
        StateStore::new(config.stats, system_clock()),
        history,
        QuerySettings::from(&config.search),
    );

    if term.trim().is_empty() {
        // failures are already in the state and the notification slot
        let _ = orchestrator.refresh().await;
    } else {
        let mut rx = orchestrator.subscribe();
        orchestrator.set_search_term(&term);
        if let Some(hint) = orchestrator.search_hint() {
            println!("{}", hint);
        }
        orchestrator.commit_search().await;
        rx.wait_for(|state| state.applied_seq > 0)
            .await
            .context("Console state closed before the search resolved")?;
    }

    if let Some(notification) = slot.current() {
        println!("[{}] {}", notification.kind, notification.message);
    }

    let state = orchestrator.snapshot();
    if state.loading == LoadingState::Error {
        anyhow::bail!(state.error.unwrap_or_else(|| "Equipment query failed".to_string()));
    }

    print_stats(&state.stats);
    orchestrator.set_sort(SortState::by(SortField::Name, SortDirection::Asc));
    print_table(&orchestrator.rows());

    let history = orchestrator.history();
    if !history.is_empty() {
        println!();
        println!("Recent searches: {}", history.join(", "));
    }

    Ok(())
}

fn setup_logging(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            let level = config.logging.level.as_str();
            tracing_subscriber::EnvFilter::new(level)
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn print_stats(stats: &DerivedStats) {
    println!(
        "Total: {}  Active: {}  Maintenance: {}  Upcoming: {}  Overdue: {}  Stale: {}  Recent: {}",
        stats.total,
        stats.active,
        stats.maintenance,
        stats.upcoming,
        stats.overdue,
        stats.stale,
        stats.recent
    );
    println!();
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_table(rows: &[Equipment]) {
    if rows.is_empty() {
        println!("No equipment found");
        return;
    }

    let name_width = rows
        .iter()
        .map(|e| e.name.chars().count())
        .chain(std::iter::once(SortField::Name.header().len()))
        .max()
        .unwrap_or(0);

    println!(
        "{:<5} {:<name_width$} {:<12} {:<17} {}",
        "ID",
        SortField::Name.header(),
        SortField::Status.header(),
        SortField::LastMaintenance.header(),
        SortField::NextMaintenance.header(),
    );
    for equipment in rows {
        println!(
            "{:<5} {:<name_width$} {:<12} {:<17} {}",
            equipment.id,
            equipment.name,
            equipment.status.label(),
            format_date(equipment.last_maintenance),
            format_date(equipment.next_maintenance),
        );
    }
}
