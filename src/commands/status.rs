use anyhow::{Context, Result};
use serde::Serialize;

use zdd::compare::{compare_deployments, DeploymentStatus};
use zdd::config::Config;
use zdd::db::{DatabaseProvider, PostgresDb};
use zdd::models::Deployment;
use zdd::parser::load_deployments;

pub fn run(config: &Config, json: bool) -> Result<()> {
    let root = config.absolute_deployments_path();
    let local = load_deployments(&root).context("failed to load local deployments")?;

    // Without a database everything local is reported as pending.
    let ledger = match config.database_url.as_deref() {
        Some(url) => {
            let mut db = PostgresDb::connect(url).context("failed to connect to database")?;
            db.init_ledger()
                .context("failed to initialize deployment ledger")?;
            db.applied_deployments()
                .context("failed to fetch applied deployments")?
        }
        None => Vec::new(),
    };

    let status = compare_deployments(local, &ledger);

    if json {
        print_json(&status)
    } else {
        print_report(&status);
        Ok(())
    }
}

fn print_report(status: &DeploymentStatus) {
    println!("Deployment Status:");
    println!("==================");

    if !status.applied.is_empty() {
        println!("\nApplied ({}):", status.applied.len());
        for d in &status.applied {
            println!("  ✓ {} - {} (applied: {})", d.id, d.name, applied_at(d));
        }
    }

    if !status.pending.is_empty() {
        println!("\nPending ({}):", status.pending.len());
        for d in &status.pending {
            println!("  ○ {} - {}{}", d.id, d.name, phase_flags(d));
        }
    }

    if !status.missing.is_empty() {
        println!("\nMissing Locally ({}):", status.missing.len());
        for d in &status.missing {
            println!("  ! {} - {} (applied: {})", d.id, d.name, applied_at(d));
        }
    }

    if status.pending.is_empty() && status.missing.is_empty() {
        println!("\nAll deployments are up to date!");
    }
}

fn applied_at(deployment: &Deployment) -> String {
    deployment
        .applied_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// `[expand+contract]`-style marker for pending deployments that carry real
/// schema SQL, so stacked schema-changing units are visible before a run.
fn phase_flags(deployment: &Deployment) -> String {
    let phases = deployment.phases_with_sql();
    if phases.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = phases.iter().map(|p| p.as_str()).collect();
    format!(" [{}]", names.join("+"))
}

#[derive(Serialize)]
struct StatusRow<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    applied_at: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sql_phases: Vec<&'static str>,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    applied: Vec<StatusRow<'a>>,
    pending: Vec<StatusRow<'a>>,
    missing: Vec<StatusRow<'a>>,
}

fn row(d: &Deployment) -> StatusRow<'_> {
    StatusRow {
        id: d.id.as_str(),
        name: &d.name,
        applied_at: d.applied_at.map(|t| t.to_rfc3339()),
        sql_phases: d.phases_with_sql().iter().map(|p| p.as_str()).collect(),
    }
}

fn print_json(status: &DeploymentStatus) -> Result<()> {
    let report = StatusReport {
        applied: status.applied.iter().map(row).collect(),
        pending: status.pending.iter().map(row).collect(),
        missing: status.missing.iter().map(row).collect(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
