//! YAML sync configuration.
//!
//! # File layout
//!
//! ```text
//! source_org: acme
//! target_orgs: [acme-mirror-eu, acme-mirror-us]
//! repositories: [foo, bar]
//! # optional host settings
//! api_url: https://api.github.com
//! git_url: https://github.com
//! workspace_root: /var/tmp/reposync
//! git_timeout_secs: 600
//! api_timeout_secs: 30
//! ```
//!
//! Validation happens entirely at load time, before any network or process
//! call is attempted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{invalid, ConfigError};

/// Config file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "repo-sync.yaml";

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GIT_URL: &str = "https://github.com";
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Immutable per-run matrix: one source org mirrored into every target org.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSpec {
    source_org: String,
    target_orgs: Vec<String>,
    repositories: Vec<String>,
}

impl SyncSpec {
    /// Build a validated spec. Both sequences must be non-empty and no entry
    /// may be blank or duplicated.
    pub fn new(
        source_org: impl Into<String>,
        target_orgs: Vec<String>,
        repositories: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let source_org = source_org.into().trim().to_string();
        if source_org.is_empty() {
            return Err(invalid("source_org", "must not be empty"));
        }
        let target_orgs = normalize_list("target_orgs", target_orgs)?;
        let repositories = normalize_list("repositories", repositories)?;
        if target_orgs.iter().any(|org| *org == source_org) {
            return Err(invalid(
                "target_orgs",
                format!("must not contain the source org '{source_org}'"),
            ));
        }
        Ok(Self {
            source_org,
            target_orgs,
            repositories,
        })
    }

    pub fn source_org(&self) -> &str {
        &self.source_org
    }

    pub fn target_orgs(&self) -> &[String] {
        &self.target_orgs
    }

    pub fn repositories(&self) -> &[String] {
        &self.repositories
    }

    /// Every (repository, target org) pair, repositories outer, targets inner.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.repositories.iter().flat_map(move |repo| {
            self.target_orgs
                .iter()
                .map(move |org| (repo.as_str(), org.as_str()))
        })
    }

    pub fn total_operations(&self) -> usize {
        self.repositories.len() * self.target_orgs.len()
    }
}

/// Where the hosting API and git remotes live, plus resource bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostSettings {
    /// REST API base, without trailing slash.
    pub api_url: String,
    /// Git remote base (`https://host`, `git@host:` or a local directory).
    pub git_url: String,
    /// Parent directory for mirror workspaces; system temp dir when `None`.
    pub workspace_root: Option<PathBuf>,
    /// Per git command; `None` disables the bound.
    pub git_timeout: Option<Duration>,
    pub api_timeout: Duration,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            git_url: DEFAULT_GIT_URL.to_string(),
            workspace_root: None,
            git_timeout: Some(Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS)),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }
}

/// A fully loaded configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub spec: SyncSpec,
    pub host: HostSettings,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    source_org: String,
    target_orgs: Vec<String>,
    repositories: Vec<String>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    git_url: Option<String>,
    #[serde(default)]
    workspace_root: Option<PathBuf>,
    #[serde(default)]
    git_timeout_secs: Option<u64>,
    #[serde(default)]
    api_timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load and validate the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with path
/// and line context) if malformed or mistyped, `ConfigError::Invalid` if a
/// field fails validation.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_yaml_str(&contents, path)
}

/// Parse and validate config text; `origin` is only used in error messages.
pub fn from_yaml_str(contents: &str, origin: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = serde_yaml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let spec = SyncSpec::new(file.source_org, file.target_orgs, file.repositories)?;

    let defaults = HostSettings::default();
    let api_url = base_url("api_url", file.api_url, defaults.api_url)?;
    let git_url = base_url("git_url", file.git_url, defaults.git_url)?;
    let git_timeout = match file.git_timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => defaults.git_timeout,
    };
    let api_timeout = match file.api_timeout_secs {
        Some(0) => return Err(invalid("api_timeout_secs", "must be greater than zero")),
        Some(secs) => Duration::from_secs(secs),
        None => defaults.api_timeout,
    };

    Ok(Config {
        spec,
        host: HostSettings {
            api_url,
            git_url,
            workspace_root: file.workspace_root,
            git_timeout,
            api_timeout,
        },
    })
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn normalize_list(field: &'static str, values: Vec<String>) -> Result<Vec<String>, ConfigError> {
    if values.is_empty() {
        return Err(invalid(field, "must list at least one entry"));
    }
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(invalid(field, "must not contain blank entries"));
        }
        if !seen.insert(value.clone()) {
            return Err(invalid(field, format!("lists '{value}' more than once")));
        }
        out.push(value);
    }
    Ok(out)
}

fn base_url(
    field: &'static str,
    value: Option<String>,
    default: String,
) -> Result<String, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    let trimmed = value.trim().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
