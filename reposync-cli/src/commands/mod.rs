pub mod sync;
pub mod validate;
pub mod verify;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use reposync_core::{config, Config, DEFAULT_CONFIG_FILE};
use reposync_github::GitHubClient;

/// `--config`, shared by every subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Path to the sync configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<Config> {
        let config = config::load(&self.config)
            .with_context(|| format!("failed to load config {}", self.config.display()))?;
        tracing::info!(
            "config loaded: {} repos, {} target orgs",
            config.spec.repositories().len(),
            config.spec.target_orgs().len()
        );
        Ok(config)
    }
}

/// `--token` / `GITHUB_TOKEN`.
#[derive(Args, Debug)]
pub struct TokenArgs {
    /// GitHub token with repo and admin:org scope.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

impl TokenArgs {
    pub fn require(&self) -> Result<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .context("GitHub token required: pass --token or set GITHUB_TOKEN")
    }
}

pub fn api_client(config: &Config, token: &str) -> GitHubClient {
    GitHubClient::new(config.host.api_url.as_str(), token, config.host.api_timeout)
}
