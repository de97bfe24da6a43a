//! Terminal and JSON rendering of a finished batch.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use reposync_core::{SyncResult, SyncStatus, SyncSummary};

#[derive(Serialize)]
struct ReportJson<'a> {
    summary: SyncSummary,
    results: &'a [SyncResult],
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "target")]
    target: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "message")]
    message: String,
}

pub fn print_json(results: &[SyncResult]) -> Result<()> {
    println!("{}", render_json(results)?);
    Ok(())
}

fn render_json(results: &[SyncResult]) -> Result<String> {
    let payload = ReportJson {
        summary: SyncSummary::from_results(results),
        results,
    };
    serde_json::to_string_pretty(&payload).context("failed to serialize sync report")
}

pub fn print_summary(results: &[SyncResult]) {
    let summary = SyncSummary::from_results(results);
    let separator = "■".repeat(67).bright_black().to_string();

    println!("{separator}");
    println!("{}", "SYNC SUMMARY".bold());
    println!("{}", summary_line(&summary));
    println!("{separator}");

    if results.is_empty() {
        println!("No repositories were processed.");
        return;
    }

    let rows: Vec<ResultRow> = results
        .iter()
        .map(|r| ResultRow {
            target: r.target_slug(),
            status: status_label(r.status).to_string(),
            message: r.message.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let errors = with_status(results, SyncStatus::Error);
    if !errors.is_empty() {
        println!("{separator}");
        println!("{}", "Errors encountered:".red().bold());
        for r in errors {
            println!("  {} {}: {}", status_indicator(r.status), r.target_slug(), r.message);
        }
    }

    let skipped = with_status(results, SyncStatus::Skipped);
    if !skipped.is_empty() {
        println!("{separator}");
        println!("{}", "Skipped repositories:".yellow().bold());
        for r in skipped {
            println!("  {} {}: {}", status_indicator(r.status), r.target_slug(), r.message);
        }
    }
    println!("{separator}");
}

/// Pre-flight policy warnings, one per line.
pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("{}", "Actions policy warnings:".yellow().bold());
    for warning in warnings {
        println!("  {} {warning}", "!".yellow().bold());
    }
}

fn summary_line(summary: &SyncSummary) -> String {
    format!(
        "{} total | {} {} created  {} {} updated  {} {} skipped  {} {} errors",
        summary.total,
        status_indicator(SyncStatus::Created),
        summary.created,
        status_indicator(SyncStatus::Updated),
        summary.updated,
        status_indicator(SyncStatus::Skipped),
        summary.skipped,
        status_indicator(SyncStatus::Error),
        summary.errors,
    )
}

fn with_status(results: &[SyncResult], status: SyncStatus) -> Vec<&SyncResult> {
    results.iter().filter(|r| r.status == status).collect()
}

fn status_label(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Created => "CREATED",
        SyncStatus::Updated => "UPDATED",
        SyncStatus::Skipped => "SKIPPED",
        SyncStatus::Error => "ERROR",
    }
}

fn status_indicator(status: SyncStatus) -> String {
    match status {
        SyncStatus::Created => "■".green().bold().to_string(),
        SyncStatus::Updated => "■".cyan().bold().to_string(),
        SyncStatus::Skipped => "■".yellow().bold().to_string(),
        SyncStatus::Error => "■".red().bold().to_string(),
    }
}
