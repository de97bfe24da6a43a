//! `reposync verify`: Actions policy pre-flight only.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use reposync_github::verify_permissions;

use super::{api_client, ConfigArgs, TokenArgs};
use crate::report;

/// Arguments for `reposync verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub token: TokenArgs,
}

impl VerifyArgs {
    /// Warnings never fail the command.
    pub fn run(self) -> Result<ExitCode> {
        let config = self.config.load()?;
        let token = self.token.require()?;
        let warnings = verify_permissions(&api_client(&config, token), &config.spec);
        if warnings.is_empty() {
            println!(
                "✓ Actions policy looks good in all {} organizations",
                config.spec.target_orgs().len() + 1
            );
        } else {
            report::print_warnings(&warnings);
        }
        Ok(ExitCode::SUCCESS)
    }
}
