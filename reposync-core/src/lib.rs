//! reposync core library: domain types, configuration loading, errors.
//!
//! - [`types`]: metadata snapshot, per-pair results, summaries
//! - [`config`]: [`SyncSpec`] + [`HostSettings`] loading and validation
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, HostSettings, SyncSpec, DEFAULT_CONFIG_FILE};
pub use error::ConfigError;
pub use types::{
    AccessLevel, ActionsPermissions, ActionsSettings, AllowedActions, DefaultWorkflowPermissions,
    MergeCommitMessage, MergeCommitTitle, RepositoryMetadata, SelectedActions,
    SquashMergeCommitMessage, SquashMergeCommitTitle, SyncResult, SyncStatus, SyncSummary,
    WorkflowAccess, WorkflowPermissions,
};
