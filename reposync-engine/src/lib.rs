//! # reposync-engine
//!
//! Git-side half of the mirror: command execution, workspaces, transport,
//! the ancestry check and the per-pair decision engine.
//!
//! Build a [`SyncEngine`] from a [`reposync_github::MetadataGateway`], a
//! [`CommandRunner`] and [`RemoteUrls`], then call [`SyncEngine::sync_all`].

pub mod ancestry;
pub mod cache;
pub mod engine;
pub mod error;
pub mod remote;
pub mod runner;
pub mod transport;
pub mod workspace;

pub use ancestry::{can_fast_forward, FastForward};
pub use cache::LookupCache;
pub use engine::{EngineOptions, NoopObserver, SyncEngine, SyncObserver};
pub use error::EngineError;
pub use remote::{authenticated_url, Redactor, RemoteUrls};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
pub use transport::{mirror_clone, push_mirror};
pub use workspace::MirrorWorkspace;
