//! `reposync sync`: mirror the whole matrix.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use reposync_core::SyncSummary;
use reposync_engine::{
    EngineOptions, NoopObserver, ProcessRunner, RemoteUrls, SyncEngine, SyncObserver,
};
use reposync_github::verify_permissions;

use super::{api_client, ConfigArgs, TokenArgs};
use crate::notify::{SlackConfig, SlackNotifier};
use crate::report;

/// Arguments for `reposync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub token: TokenArgs,

    /// Read, clone and check ancestry, but never create, push or write settings.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the results as JSON instead of the summary table.
    #[arg(long)]
    pub json: bool,

    /// Skip the Actions policy pre-flight check.
    #[arg(long)]
    pub skip_verify: bool,

    /// Do not send Slack notifications even if configured.
    #[arg(long)]
    pub no_notify: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<ExitCode> {
        let config = self.config.load()?;
        let token = self.token.require()?;
        let client = api_client(&config, token);

        if !self.skip_verify {
            let warnings = verify_permissions(&client, &config.spec);
            if !self.json {
                report::print_warnings(&warnings);
            }
        }

        let remotes = RemoteUrls::new(config.host.git_url.as_str(), token);
        let runner = ProcessRunner::new(config.host.git_timeout, remotes.redactor());
        let engine = SyncEngine::new(&client, &runner, remotes).with_options(EngineOptions {
            dry_run: self.dry_run,
            workspace_root: config.host.workspace_root.clone(),
        });

        let mut observer: Box<dyn SyncObserver> = match SlackConfig::from_env() {
            Some(slack) if !self.no_notify => {
                Box::new(SlackNotifier::new(slack, config.spec.source_org()))
            }
            _ => Box::new(NoopObserver),
        };
        let results = engine.sync_all_with(&config.spec, observer.as_mut());

        if self.json {
            report::print_json(&results)?;
        } else {
            report::print_summary(&results);
        }

        if SyncSummary::from_results(&results).has_errors() {
            Ok(ExitCode::FAILURE)
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }
}
