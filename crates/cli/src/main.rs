//! Demo binary: seeds sample employee data, then runs the naive serial
//! dispatch and the waved dispatch against the simulated mailer and logs
//! both elapsed times.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use herald_common::config::DispatchConfig;
use herald_common::types::{
    AddressRecord, EmployeeProfile, PayrollEntry, ReferenceDate,
};
use herald_engine::backend::MailBackend;
use herald_engine::dispatch::Dispatcher;
use herald_engine::render::VacationRenderer;
use herald_mailer::SimulatedMailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herald_cli=info,herald_engine=info,herald_mailer=info".into()),
        )
        .json()
        .init();

    tracing::info!("Herald demo starting...");

    // Load configuration
    let config = DispatchConfig::from_env()?;
    let employees = env_or("HERALD_EMPLOYEES", 100usize)?;
    let latency = Duration::from_millis(env_or("HERALD_SEND_LATENCY_MS", 50u64)?);
    let reference = match std::env::var("HERALD_REFERENCE_DATE").as_deref() {
        Ok("end") => ReferenceDate::End,
        _ => ReferenceDate::Start,
    };

    let (payroll, addresses, profiles) = seed(employees);
    tracing::info!(
        employees,
        batch_size = config.batch_size,
        wave_width = config.wave_width,
        latency_ms = latency.as_millis() as u64,
        reference = %reference,
        "Sample data seeded"
    );

    // Naive baseline: one giant batch, linear-scan joins.
    let mailer = SimulatedMailer::new(latency);
    let started = Instant::now();
    grant_vacation_naive(&mailer, &payroll, &addresses, &profiles).await?;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        sent = mailer.sent_count(),
        "Naive serial dispatch finished"
    );

    // Waved dispatch: indexed joins, bounded concurrent batches.
    let mailer = Arc::new(SimulatedMailer::new(latency));
    let renderer = VacationRenderer::new(addresses, profiles, reference)?;
    let dispatcher = Dispatcher::new(mailer.clone(), config)?;

    let started = Instant::now();
    let report = dispatcher
        .dispatch_all(payroll, |entry| renderer.render(entry))
        .await;
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        sent = mailer.sent_count(),
        "Waved dispatch finished"
    );

    println!("{}", serde_json::to_string_pretty(&report.summary())?);

    tracing::info!("Herald demo stopped.");
    Ok(())
}

/// Read a parseable value from the environment, falling back to `default`.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

/// Generate `count` employees with matching payroll, address, and profile
/// records.
fn seed(count: usize) -> (Vec<PayrollEntry>, Vec<AddressRecord>, Vec<EmployeeProfile>) {
    let now = Utc::now();
    let mut payroll = Vec::with_capacity(count);
    let mut addresses = Vec::with_capacity(count);
    let mut profiles = Vec::with_capacity(count);

    for i in 0..count {
        let id = i.to_string();
        payroll.push(PayrollEntry {
            emp_id: id.clone(),
            vacation_days: 1.0,
        });
        addresses.push(AddressRecord {
            emp_id: id.clone(),
            first: format!("{id} first"),
            last: format!("{id} last"),
            email: format!("{id}@example.com"),
        });
        profiles.push(EmployeeProfile {
            id: id.clone(),
            name: format!("{id} name"),
            start_date: now,
            end_date: Some(now),
        });
    }
    (payroll, addresses, profiles)
}

/// The baseline this project replaces: one batch for everything, a linear
/// scan per lookup, and a single flush at the end.
async fn grant_vacation_naive(
    mailer: &SimulatedMailer,
    payroll: &[PayrollEntry],
    addresses: &[AddressRecord],
    profiles: &[EmployeeProfile],
) -> anyhow::Result<()> {
    let batch = mailer.open_batch();
    let now = Utc::now();

    for entry in payroll {
        let address = addresses
            .iter()
            .find(|a| a.emp_id == entry.emp_id)
            .ok_or_else(|| anyhow::anyhow!("no address record for employee {}", entry.emp_id))?;
        let profile = profiles
            .iter()
            .find(|p| p.id == entry.emp_id)
            .ok_or_else(|| anyhow::anyhow!("no profile record for employee {}", entry.emp_id))?;

        let reference = profile.end_date.unwrap_or(profile.start_date);
        let years_employed =
            (now - reference).num_milliseconds() as f64 / (365.0 * 24.0 * 60.0 * 60.0 * 1000.0);
        let new_balance = years_employed + entry.vacation_days;

        mailer.enqueue(
            batch,
            &herald_common::types::OutboundEmail {
                to: address.email.clone(),
                subject: "Good news!".to_string(),
                body: format!(
                    "Dear {}\nbased on your {} years of employment, you have been granted {} days of vacation, bringing your total to {}",
                    profile.name, years_employed, years_employed, new_balance
                ),
            },
        );
    }

    mailer.flush(batch).await?;
    Ok(())
}
