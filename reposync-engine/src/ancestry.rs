//! Fast-forward check between the target's branch tip and the source's.

use crate::error::{git_err, EngineError};
use crate::remote::RemoteUrls;
use crate::runner::CommandRunner;
use crate::workspace::MirrorWorkspace;

/// Remote name the target is registered under inside the bare clone.
pub const TARGET_REMOTE: &str = "target";

pub const DIVERGED_REASON: &str = "Target has diverged from source (cannot fast-forward)";

/// Outcome of the ancestry check. Divergence is an answer, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastForward {
    Permitted,
    Diverged(String),
}

/// Decide whether pushing the source `branch` onto `target_org/repo` is a
/// fast-forward.
///
/// Target tags are not fetched so they cannot overwrite source tags that
/// are about to be pushed. A target without `branch` is an error.
pub fn can_fast_forward(
    runner: &dyn CommandRunner,
    remotes: &RemoteUrls,
    workspace: &MirrorWorkspace,
    target_org: &str,
    repo: &str,
    branch: &str,
) -> Result<FastForward, EngineError> {
    let repo_dir = workspace.repo_dir();
    let url = remotes.authenticated(target_org, repo);

    let output = runner.run(
        "git",
        &["remote", "add", TARGET_REMOTE, &url],
        Some(&repo_dir),
    )?;
    if !output.success() {
        return Err(git_err("remote add target", &output.stderr));
    }

    let output = runner.run(
        "git",
        &["fetch", "--no-tags", TARGET_REMOTE],
        Some(&repo_dir),
    )?;
    if !output.success() {
        return Err(git_err(
            format!("fetch from {target_org}/{repo}"),
            &output.stderr,
        ));
    }

    let target_ref = format!("refs/remotes/{TARGET_REMOTE}/{branch}");
    let output = runner.run(
        "git",
        &["rev-parse", "--verify", "--quiet", &format!("{target_ref}^{{commit}}")],
        Some(&repo_dir),
    )?;
    if !output.success() {
        return Err(EngineError::Git {
            operation: "rev-parse".to_string(),
            message: format!("{target_org}/{repo} has no branch '{branch}'"),
        });
    }

    let source_ref = format!("refs/heads/{branch}");
    let output = runner.run(
        "git",
        &["merge-base", "--is-ancestor", &target_ref, &source_ref],
        Some(&repo_dir),
    )?;
    match output.exit_code {
        0 => Ok(FastForward::Permitted),
        1 => Ok(FastForward::Diverged(DIVERGED_REASON.to_string())),
        _ => Err(git_err("merge-base --is-ancestor", &output.stderr)),
    }
}
