//! Idempotent sample dataset for local development.

use crate::db::Repository;
use crate::domain::{Decimal, Email, Symbol};
use anyhow::Context;
use chrono::{Duration, Utc};
use std::str::FromStr;
use tracing::info;

/// Seed the database with a small demo dataset.
///
/// Skips entirely when any investor already exists, so repeated launches
/// with seeding enabled do not duplicate data.
///
/// # Errors
/// Returns an error if any insert fails.
pub async fn seed_sample_data(repo: &Repository) -> anyhow::Result<()> {
    if repo.count_investors().await.context("counting investors")? > 0 {
        info!("Sample data already present, skipping seeding");
        return Ok(());
    }

    info!("Seeding sample data...");

    let investor_rows = [
        ("Joao Silva", "joao@email.com"),
        ("Maria Santos", "maria@email.com"),
        ("Pedro Oliveira", "pedro@email.com"),
        ("Ana Costa", "ana@email.com"),
    ];
    let mut investors = Vec::with_capacity(investor_rows.len());
    for (name, email) in investor_rows {
        let email = Email::parse(email).context("sample email")?;
        let investor = repo
            .insert_investor(name, &email)
            .await
            .with_context(|| format!("inserting sample investor {}", name))?;
        investors.push(investor);
    }

    let instrument_rows = [
        ("JURO11", "Sparta Inf FIC FIII RF CP RL"),
        ("CDII11", "Sparta Infra CDI FIC de FI em Infraestrutura RF"),
        ("CRAA11", "Sparta Fiagro"),
        ("DIVS11", "Sparta Infra Inflacao Longa FIC de FI em Infraestrutura RF RL"),
    ];
    let mut instruments = Vec::with_capacity(instrument_rows.len());
    for (symbol, name) in instrument_rows {
        let instrument = repo
            .insert_instrument(&Symbol::new(symbol), name)
            .await
            .with_context(|| format!("inserting sample instrument {}", symbol))?;
        instruments.push(instrument);
    }

    // (investor index, instrument index, recorded value, days ago)
    let movement_rows = [
        (0, 0, "150.00", 30),
        (0, 1, "125.50", 25),
        (0, 0, "155.00", 20),
        (1, 1, "126.00", 28),
        (1, 2, "95.75", 22),
        (1, 3, "88.30", 15),
        (2, 0, "152.80", 35),
        (2, 2, "98.45", 18),
        (3, 3, "92.10", 32),
        (3, 1, "125.20", 12),
        (3, 3, "93.50", 5),
    ];
    let now = Utc::now();
    for (investor_idx, instrument_idx, value, days_ago) in movement_rows {
        let recorded_value = Decimal::from_str(value).context("sample recorded value")?;
        repo.insert_movement(
            investors[investor_idx].id,
            instruments[instrument_idx].id,
            recorded_value,
            now - Duration::days(days_ago),
        )
        .await
        .context("inserting sample movement")?;
    }

    info!(
        investors = investors.len(),
        instruments = instruments.len(),
        movements = movement_rows.len(),
        "Sample data created"
    );
    Ok(())
}
