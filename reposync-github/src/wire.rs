//! GitHub REST payload shapes.
//!
//! Response structs accept missing fields (older Enterprise Server versions
//! omit newer settings); request structs skip every `None`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use reposync_core::{
    AccessLevel, AllowedActions, DefaultWorkflowPermissions, MergeCommitMessage,
    MergeCommitTitle, SquashMergeCommitMessage, SquashMergeCommitTitle,
};

/// Deserialize an optional field, treating values this client does not know
/// (e.g. a commit-title format added after this was written) as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RepoResponse {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,

    #[serde(default)]
    pub has_issues: Option<bool>,
    #[serde(default)]
    pub has_wiki: Option<bool>,
    #[serde(default)]
    pub has_projects: Option<bool>,
    #[serde(default)]
    pub has_discussions: Option<bool>,

    #[serde(default)]
    pub allow_squash_merge: Option<bool>,
    #[serde(default)]
    pub allow_merge_commit: Option<bool>,
    #[serde(default)]
    pub allow_rebase_merge: Option<bool>,
    #[serde(default)]
    pub allow_auto_merge: Option<bool>,
    #[serde(default)]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(default)]
    pub allow_update_branch: Option<bool>,

    #[serde(default, deserialize_with = "lenient")]
    pub squash_merge_commit_title: Option<SquashMergeCommitTitle>,
    #[serde(default, deserialize_with = "lenient")]
    pub squash_merge_commit_message: Option<SquashMergeCommitMessage>,
    #[serde(default, deserialize_with = "lenient")]
    pub merge_commit_title: Option<MergeCommitTitle>,
    #[serde(default, deserialize_with = "lenient")]
    pub merge_commit_message: Option<MergeCommitMessage>,

    #[serde(default)]
    pub allow_forking: Option<bool>,
    #[serde(default)]
    pub is_template: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub web_commit_signoff_required: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Topics {
    #[serde(default)]
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionsPermissionsResponse {
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub allowed_actions: Option<AllowedActions>,
    #[serde(default)]
    pub sha_pinning_required: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowPermissionsResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub default_workflow_permissions: Option<DefaultWorkflowPermissions>,
    #[serde(default)]
    pub can_approve_pull_request_reviews: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowAccessResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub access_level: Option<AccessLevel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrgActionsPermissionsResponse {
    #[serde(default)]
    pub enabled_repositories: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub allowed_actions: Option<AllowedActions>,
}

/// GitHub error body: `{"message": "...", "documentation_url": "..."}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `PATCH /repos/{owner}/{repo}` body for the basic settings group.
#[derive(Debug, Default, Serialize)]
pub(crate) struct EditRepoRequest<'a> {
    pub description: &'a str,
    pub homepage: &'a str,
    pub private: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_projects: bool,
    pub has_discussions: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_update_branch: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash_merge_commit_title: Option<SquashMergeCommitTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squash_merge_commit_message: Option<SquashMergeCommitMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_commit_title: Option<MergeCommitTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_commit_message: Option<MergeCommitMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_forking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_commit_signoff_required: Option<bool>,
}

/// `POST /orgs/{org}/repos` body.
#[derive(Debug, Serialize)]
pub(crate) struct CreateRepoRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub homepage: &'a str,
    pub private: bool,
    pub has_issues: bool,
    pub has_wiki: bool,
    pub has_projects: bool,
    pub has_discussions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    /// Always `false`: the first mirror push supplies the history.
    pub auto_init: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct DefaultBranchRequest<'a> {
    pub default_branch: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ArchiveRequest {
    pub archived: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ActionsPermissionsRequest {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_actions: Option<AllowedActions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha_pinning_required: Option<bool>,
}
