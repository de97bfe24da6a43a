//! `reposync validate`: check the config without touching the network.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use super::ConfigArgs;

/// Arguments for `reposync validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Tabled)]
struct PairRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "source")]
    source: String,
    #[tabled(rename = "target")]
    target: String,
}

impl ValidateArgs {
    pub fn run(self) -> Result<ExitCode> {
        let config = self.config.load()?;
        let spec = &config.spec;

        println!(
            "{} {} is valid",
            "✓".green().bold(),
            self.config.config.display()
        );
        println!(
            "{} repositories × {} target orgs = {} operations",
            spec.repositories().len(),
            spec.target_orgs().len(),
            spec.total_operations()
        );
        println!("api: {}  git: {}", config.host.api_url, config.host.git_url);

        let rows: Vec<PairRow> = spec
            .pairs()
            .enumerate()
            .map(|(i, (repo, org))| PairRow {
                index: i + 1,
                source: format!("{}/{repo}", spec.source_org()),
                target: format!("{org}/{repo}"),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(ExitCode::SUCCESS)
    }
}
