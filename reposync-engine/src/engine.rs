//! Sync decision engine.
//!
//! Per pair:
//!
//! ```text
//! workspace -> source metadata -> target exists?
//!   no  -> create -> clone -> push -> metadata        => created
//!   yes -> clone -> ancestry
//!            diverged  ->                             => skipped
//!            permitted -> push -> metadata            => updated
//! ```
//!
//! Any failure ends the pair with `error`; the workspace is removed at every
//! terminal state. The batch never aborts.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use reposync_core::{RepositoryMetadata, SyncResult, SyncSpec, SyncStatus};
use reposync_github::MetadataGateway;

use crate::ancestry::{can_fast_forward, FastForward};
use crate::cache::LookupCache;
use crate::remote::RemoteUrls;
use crate::runner::CommandRunner;
use crate::transport::{mirror_clone, push_mirror};
use crate::workspace::MirrorWorkspace;

pub const DRY_RUN_PREFIX: &str = "[dry-run]";

/// Progress callbacks for a batch. All methods default to no-ops.
pub trait SyncObserver {
    fn on_batch_start(&mut self, _spec: &SyncSpec) {}

    /// `index` is 1-based.
    fn on_result(&mut self, _index: usize, _total: usize, _result: &SyncResult) {}

    fn on_batch_end(&mut self, _results: &[SyncResult], _elapsed: Duration) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Read, clone and check ancestry, but never create, push or write
    /// settings.
    pub dry_run: bool,
    /// Parent for mirror workspaces; system temp dir when `None`.
    pub workspace_root: Option<PathBuf>,
}

pub struct SyncEngine<'a> {
    gateway: &'a dyn MetadataGateway,
    runner: &'a dyn CommandRunner,
    remotes: RemoteUrls,
    options: EngineOptions,
}

impl fmt::Debug for SyncEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("remotes", &self.remotes)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        gateway: &'a dyn MetadataGateway,
        runner: &'a dyn CommandRunner,
        remotes: RemoteUrls,
    ) -> Self {
        Self {
            gateway,
            runner,
            remotes,
            options: EngineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    // -----------------------------------------------------------------------
    // Batch
    // -----------------------------------------------------------------------

    /// Sync every (repository, target org) pair in configured order.
    pub fn sync_all(&self, spec: &SyncSpec) -> Vec<SyncResult> {
        self.sync_all_with(spec, &mut NoopObserver)
    }

    pub fn sync_all_with(&self, spec: &SyncSpec, observer: &mut dyn SyncObserver) -> Vec<SyncResult> {
        let started = Instant::now();
        let total = spec.total_operations();
        tracing::info!(
            "starting sync: {} repositories to {} target organizations ({total} total operations)",
            spec.repositories().len(),
            spec.target_orgs().len(),
        );
        observer.on_batch_start(spec);

        let mut cache = LookupCache::new();
        let mut results = Vec::with_capacity(total);
        for (index, (repo, target_org)) in spec.pairs().enumerate() {
            let index = index + 1;
            tracing::info!("[{index}/{total}] processing {repo} -> {target_org}");

            let result = self.sync_repository(spec.source_org(), repo, target_org, &mut cache);
            log_result(&result);
            observer.on_result(index, total, &result);
            results.push(result);
        }

        observer.on_batch_end(&results, started.elapsed());
        results
    }

    // -----------------------------------------------------------------------
    // Single pair
    // -----------------------------------------------------------------------

    /// Sync one pair. Never fails: every problem is folded into an `error`
    /// result.
    pub fn sync_repository(
        &self,
        source_org: &str,
        repo: &str,
        target_org: &str,
        cache: &mut LookupCache,
    ) -> SyncResult {
        tracing::info!(repo, org = target_org, "syncing {repo}: {source_org} -> {target_org}");

        let workspace =
            match MirrorWorkspace::create(self.options.workspace_root.as_deref(), repo) {
                Ok(ws) => ws,
                Err(err) => {
                    return SyncResult::error(
                        repo,
                        target_org,
                        format!("Failed to create workspace: {err}"),
                    )
                }
            };

        let result = self.sync_in_workspace(source_org, repo, target_org, cache, &workspace);
        workspace.cleanup();
        result
    }

    fn sync_in_workspace(
        &self,
        source_org: &str,
        repo: &str,
        target_org: &str,
        cache: &mut LookupCache,
        workspace: &MirrorWorkspace,
    ) -> SyncResult {
        let fail = |context: &str, err: &dyn fmt::Display| {
            SyncResult::error(repo, target_org, format!("{context}: {err}"))
        };

        let meta = match cache.source_metadata(self.gateway, source_org, repo) {
            Ok(meta) => meta,
            Err(err) => return fail("Failed to get source metadata", &err),
        };
        let branch = meta.default_branch.as_str();

        let exists = match self.gateway.repository_exists(target_org, repo) {
            Ok(exists) => exists,
            Err(err) => return fail("Failed to check target repository", &err),
        };

        if !exists {
            if !self.options.dry_run {
                if let Err(err) = self.gateway.create_repository(target_org, repo, meta) {
                    return fail("Failed to create repository in target org", &err);
                }
            }
            if let Err(err) =
                mirror_clone(self.runner, &self.remotes, source_org, repo, workspace, branch)
            {
                return fail("Failed to mirror clone from source", &err);
            }
            if self.options.dry_run {
                return self.dry_run_result(
                    repo,
                    target_org,
                    SyncStatus::Created,
                    format!("Would create repository and push '{branch}' with tags"),
                );
            }
            if let Err(err) =
                push_mirror(self.runner, &self.remotes, repo, workspace, target_org, branch)
            {
                return fail("Failed to push to target", &err);
            }
            let note = self.sync_metadata(target_org, repo, meta);
            return SyncResult::new(
                repo,
                target_org,
                SyncStatus::Created,
                format!("Repository created and mirrored successfully{note}"),
            );
        }

        if let Err(err) = mirror_clone(self.runner, &self.remotes, source_org, repo, workspace, branch)
        {
            return fail("Failed to mirror clone from source", &err);
        }

        match can_fast_forward(self.runner, &self.remotes, workspace, target_org, repo, branch) {
            Err(err) => fail("Failed to check ancestry", &err),
            Ok(FastForward::Diverged(reason)) => {
                let message = format!("Skipped: {reason}");
                if self.options.dry_run {
                    self.dry_run_result(repo, target_org, SyncStatus::Skipped, message)
                } else {
                    SyncResult::new(repo, target_org, SyncStatus::Skipped, message)
                }
            }
            Ok(FastForward::Permitted) if self.options.dry_run => self.dry_run_result(
                repo,
                target_org,
                SyncStatus::Updated,
                format!("Would fast-forward '{branch}' and push tags"),
            ),
            Ok(FastForward::Permitted) => {
                if let Err(err) =
                    push_mirror(self.runner, &self.remotes, repo, workspace, target_org, branch)
                {
                    return fail("Failed to push updates to target", &err);
                }
                let note = self.sync_metadata(target_org, repo, meta);
                SyncResult::new(
                    repo,
                    target_org,
                    SyncStatus::Updated,
                    format!("Repository updated successfully{note}"),
                )
            }
        }
    }

    /// Best-effort settings reconciliation. Returns a suffix for the result
    /// message naming groups that failed; never changes the status.
    fn sync_metadata(&self, target_org: &str, repo: &str, meta: &RepositoryMetadata) -> String {
        let report = self.gateway.set_repository_metadata(target_org, repo, meta);
        let failed: Vec<String> = report.failures().map(|(group, _)| group.to_string()).collect();
        if failed.is_empty() {
            return String::new();
        }
        tracing::warn!(
            repo,
            org = target_org,
            "settings partially applied; failed: {}",
            failed.join(", ")
        );
        format!(" (settings not applied: {})", failed.join(", "))
    }

    fn dry_run_result(
        &self,
        repo: &str,
        target_org: &str,
        status: SyncStatus,
        message: String,
    ) -> SyncResult {
        tracing::info!(repo, org = target_org, "{DRY_RUN_PREFIX} {message}");
        SyncResult::new(repo, target_org, status, format!("{DRY_RUN_PREFIX} {message}"))
    }
}

fn log_result(result: &SyncResult) {
    let slug = result.target_slug();
    match result.status {
        SyncStatus::Created => tracing::info!(status = %result.status, "created: {slug}"),
        SyncStatus::Updated => tracing::info!(status = %result.status, "updated: {slug}"),
        SyncStatus::Skipped => {
            tracing::warn!(status = %result.status, "skipped: {slug} - {}", result.message)
        }
        SyncStatus::Error => {
            tracing::error!(status = %result.status, "error: {slug} - {}", result.message)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
