//! Mirror transport: bare single-branch clone plus tags, and the matching
//! fast-forward push.

use crate::error::{git_err, EngineError};
use crate::remote::RemoteUrls;
use crate::runner::CommandRunner;
use crate::workspace::MirrorWorkspace;

/// Refspec that copies every tag under the same name.
pub const TAGS_REFSPEC: &str = "refs/tags/*:refs/tags/*";

/// Clone `source_org/repo`'s `branch` into `<workspace>/<repo>.git`, then
/// fetch all tags. A failed tag fetch is only logged.
pub fn mirror_clone(
    runner: &dyn CommandRunner,
    remotes: &RemoteUrls,
    source_org: &str,
    repo: &str,
    workspace: &MirrorWorkspace,
    branch: &str,
) -> Result<(), EngineError> {
    let url = remotes.authenticated(source_org, repo);
    let repo_dir = workspace.repo_dir();
    let repo_dir_arg = repo_dir.to_string_lossy();

    tracing::debug!(repo, org = source_org, branch, "cloning");
    let output = runner.run(
        "git",
        &[
            "clone",
            "--bare",
            "--single-branch",
            "--branch",
            branch,
            &url,
            &repo_dir_arg,
        ],
        Some(workspace.path()),
    )?;
    if !output.success() {
        return Err(git_err(format!("clone {source_org}/{repo}"), &output.stderr));
    }

    let output = runner.run("git", &["fetch", "origin", TAGS_REFSPEC], Some(&repo_dir))?;
    if !output.success() {
        tracing::warn!(
            repo,
            org = source_org,
            "failed to fetch tags: {}",
            output.stderr.trim()
        );
    }
    Ok(())
}

/// Push `branch` (never forced) and then all tags to `target_org/repo`.
/// The branch push is fatal on failure; the tag push only warns.
pub fn push_mirror(
    runner: &dyn CommandRunner,
    remotes: &RemoteUrls,
    repo: &str,
    workspace: &MirrorWorkspace,
    target_org: &str,
    branch: &str,
) -> Result<(), EngineError> {
    let url = remotes.authenticated(target_org, repo);
    let repo_dir = workspace.repo_dir();
    let branch_refspec = format!("refs/heads/{branch}:refs/heads/{branch}");

    tracing::debug!(repo, org = target_org, branch, "pushing");
    let output = runner.run("git", &["push", &url, &branch_refspec], Some(&repo_dir))?;
    if !output.success() {
        return Err(git_err(
            format!("push {branch} to {target_org}/{repo}"),
            &output.stderr,
        ));
    }

    let output = runner.run("git", &["push", &url, TAGS_REFSPEC], Some(&repo_dir))?;
    if !output.success() {
        tracing::warn!(
            repo,
            org = target_org,
            "failed to push tags: {}",
            output.stderr.trim()
        );
    }
    Ok(())
}
