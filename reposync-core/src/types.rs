//! Domain types shared by the gateway, the engine and the CLI.
//!
//! Optional settings are modelled as `Option<T>` and skipped on
//! serialization, so a write-back never sends a value the source did not
//! express.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sync outcome
// ---------------------------------------------------------------------------

/// Terminal state of one (repository, target org) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Created,
    Updated,
    Skipped,
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Created => write!(f, "created"),
            SyncStatus::Updated => write!(f, "updated"),
            SyncStatus::Skipped => write!(f, "skipped"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

/// Outcome record for a single (repository, target org) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub repo_name: String,
    pub target_org: String,
    pub status: SyncStatus,
    pub message: String,
}

impl SyncResult {
    pub fn new(
        repo_name: impl Into<String>,
        target_org: impl Into<String>,
        status: SyncStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            repo_name: repo_name.into(),
            target_org: target_org.into(),
            status,
            message: message.into(),
        }
    }

    pub fn error(
        repo_name: impl Into<String>,
        target_org: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(repo_name, target_org, SyncStatus::Error, message)
    }

    /// `<target_org>/<repo_name>`
    pub fn target_slug(&self) -> String {
        format!("{}/{}", self.target_org, self.repo_name)
    }
}

/// Aggregate counts over a batch of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl SyncSummary {
    pub fn from_results(results: &[SyncResult]) -> Self {
        results.iter().fold(
            Self {
                total: results.len(),
                ..Self::default()
            },
            |mut acc, r| {
                match r.status {
                    SyncStatus::Created => acc.created += 1,
                    SyncStatus::Updated => acc.updated += 1,
                    SyncStatus::Skipped => acc.skipped += 1,
                    SyncStatus::Error => acc.errors += 1,
                }
                acc
            },
        )
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

// ---------------------------------------------------------------------------
// Commit message formats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquashMergeCommitTitle {
    PrTitle,
    CommitOrPrTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquashMergeCommitMessage {
    PrBody,
    CommitMessages,
    Blank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeCommitTitle {
    PrTitle,
    MergeMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeCommitMessage {
    PrBody,
    PrTitle,
    Blank,
}

// ---------------------------------------------------------------------------
// Actions policy
// ---------------------------------------------------------------------------

/// Which actions a repository or organization allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowedActions {
    All,
    LocalOnly,
    Selected,
}

impl fmt::Display for AllowedActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowedActions::All => write!(f, "all"),
            AllowedActions::LocalOnly => write!(f, "local_only"),
            AllowedActions::Selected => write!(f, "selected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultWorkflowPermissions {
    Read,
    Write,
}

/// Who may call a private repository's reusable workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    None,
    User,
    Organization,
    Enterprise,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::None => write!(f, "none"),
            AccessLevel::User => write!(f, "user"),
            AccessLevel::Organization => write!(f, "organization"),
            AccessLevel::Enterprise => write!(f, "enterprise"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsPermissions {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_actions: Option<AllowedActions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha_pinning_required: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_owned_allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_allowed: Option<bool>,
    #[serde(default)]
    pub patterns_allowed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPermissions {
    pub default_workflow_permissions: DefaultWorkflowPermissions,
    pub can_approve_pull_request_reviews: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowAccess {
    pub access_level: AccessLevel,
}

/// CI policy of a repository. Every sub-record is optional: a sub-setting
/// that could not be read is simply absent and never written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<ActionsPermissions>,
    /// Present only when `permissions.allowed_actions == selected`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_actions: Option<SelectedActions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_permissions: Option<WorkflowPermissions>,
    /// Present only for private repositories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_access: Option<WorkflowAccess>,
}

impl ActionsSettings {
    pub fn is_empty(&self) -> bool {
        self.permissions.is_none()
            && self.selected_actions.is_none()
            && self.workflow_permissions.is_none()
            && self.workflow_access.is_none()
    }
}

// ---------------------------------------------------------------------------
// Repository metadata
// ---------------------------------------------------------------------------

/// Snapshot of repository settings read from the source organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub topics: BTreeSet<String>,
    #[serde(default)]
    pub private: bool,
    pub default_branch: String,

    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub has_projects: bool,
    #[serde(default)]
    pub has_discussions: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_update_branch: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squash_merge_commit_title: Option<SquashMergeCommitTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squash_merge_commit_message: Option<SquashMergeCommitMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_commit_title: Option<MergeCommitTitle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_commit_message: Option<MergeCommitMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_forking: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_commit_signoff_required: Option<bool>,

    #[serde(default, skip_serializing_if = "ActionsSettings::is_empty")]
    pub actions: ActionsSettings,
}

impl RepositoryMetadata {
    /// Minimal metadata with only the required default branch set.
    pub fn with_default_branch(branch: impl Into<String>) -> Self {
        Self {
            default_branch: branch.into(),
            ..Self::default()
        }
    }

    pub fn visibility(&self) -> &'static str {
        if self.private {
            "private"
        } else {
            "public"
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: SyncStatus) -> SyncResult {
        SyncResult::new("foo", "mirror", status, "msg")
    }

    #[test]
    fn summary_counts_each_status() {
        let results = vec![
            result(SyncStatus::Created),
            result(SyncStatus::Updated),
            result(SyncStatus::Updated),
            result(SyncStatus::Skipped),
            result(SyncStatus::Error),
        ];
        let summary = SyncSummary::from_results(&results);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.errors, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn empty_summary_has_no_errors() {
        let summary = SyncSummary::from_results(&[]);
        assert_eq!(summary, SyncSummary::default());
        assert!(!summary.has_errors());
    }

    #[test]
    fn target_slug_is_org_slash_repo() {
        assert_eq!(result(SyncStatus::Created).target_slug(), "mirror/foo");
    }

    #[test]
    fn absent_optional_settings_are_not_serialized() {
        let meta = RepositoryMetadata::with_default_branch("main");
        let json = serde_json::to_value(&meta).expect("serialize");
        let obj = json.as_object().expect("object");
        assert!(!obj.contains_key("allow_squash_merge"));
        assert!(!obj.contains_key("archived"));
        assert!(!obj.contains_key("actions"));
        assert_eq!(obj["default_branch"], "main");
    }

    #[test]
    fn commit_format_enums_use_api_spelling() {
        let json = serde_json::to_string(&SquashMergeCommitTitle::CommitOrPrTitle).unwrap();
        assert_eq!(json, "\"COMMIT_OR_PR_TITLE\"");
        let json = serde_json::to_string(&AllowedActions::LocalOnly).unwrap();
        assert_eq!(json, "\"local_only\"");
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(SyncStatus::Skipped.to_string(), "skipped");
        assert_eq!(AccessLevel::Organization.to_string(), "organization");
    }
}
