//! # reposync-github
//!
//! Blocking GitHub REST client and the two consumers built on it:
//!
//! - [`gateway`]: the [`MetadataGateway`] used by the sync engine to read,
//!   create and reconcile repositories
//! - [`verify`]: the pre-flight Actions policy check, warnings only
//!
//! Every request goes through [`retry::with_retry`], which backs off on rate
//! limits and transport failures and gives up on anything else.

pub mod client;
mod convert;
pub mod error;
pub mod gateway;
pub mod retry;
#[cfg(test)]
mod test_server;
pub mod verify;
mod wire;

pub use client::GitHubClient;
pub use error::GatewayError;
pub use gateway::{GroupOutcome, MetadataApplyReport, MetadataGateway, SettingGroup};
pub use retry::RetryConfig;
pub use verify::{verify_permissions, EnabledRepositories, OrgActionsPolicy, PolicyGateway};
