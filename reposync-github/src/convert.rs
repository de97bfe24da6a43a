//! Conversions between REST payloads and [`RepositoryMetadata`].

use reposync_core::{
    ActionsPermissions, RepositoryMetadata, WorkflowAccess, WorkflowPermissions,
};

use crate::error::GatewayError;
use crate::wire::{
    ActionsPermissionsRequest, ActionsPermissionsResponse, CreateRepoRequest, EditRepoRequest,
    RepoResponse, WorkflowAccessResponse, WorkflowPermissionsResponse,
};

/// Build metadata from a get-repository response. Actions settings are
/// filled in separately by the caller.
pub(crate) fn metadata_from_repo(
    resource: &str,
    repo: RepoResponse,
) -> Result<RepositoryMetadata, GatewayError> {
    let default_branch = repo
        .default_branch
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .ok_or_else(|| GatewayError::decode(resource, "repository has no default branch"))?;

    Ok(RepositoryMetadata {
        description: repo.description.unwrap_or_default(),
        homepage: repo.homepage.unwrap_or_default(),
        topics: repo.topics.into_iter().collect(),
        private: repo.private,
        default_branch,
        has_issues: repo.has_issues.unwrap_or(false),
        has_wiki: repo.has_wiki.unwrap_or(false),
        has_projects: repo.has_projects.unwrap_or(false),
        has_discussions: repo.has_discussions.unwrap_or(false),
        allow_squash_merge: repo.allow_squash_merge,
        allow_merge_commit: repo.allow_merge_commit,
        allow_rebase_merge: repo.allow_rebase_merge,
        allow_auto_merge: repo.allow_auto_merge,
        delete_branch_on_merge: repo.delete_branch_on_merge,
        allow_update_branch: repo.allow_update_branch,
        squash_merge_commit_title: repo.squash_merge_commit_title,
        squash_merge_commit_message: repo.squash_merge_commit_message,
        merge_commit_title: repo.merge_commit_title,
        merge_commit_message: repo.merge_commit_message,
        allow_forking: repo.allow_forking,
        is_template: repo.is_template,
        archived: repo.archived,
        web_commit_signoff_required: repo.web_commit_signoff_required,
        actions: Default::default(),
    })
}

pub(crate) fn actions_permissions(resp: ActionsPermissionsResponse) -> ActionsPermissions {
    ActionsPermissions {
        enabled: resp.enabled,
        allowed_actions: resp.allowed_actions,
        sha_pinning_required: resp.sha_pinning_required,
    }
}

/// `None` when the server omitted the default permission level.
pub(crate) fn workflow_permissions(resp: WorkflowPermissionsResponse) -> Option<WorkflowPermissions> {
    Some(WorkflowPermissions {
        default_workflow_permissions: resp.default_workflow_permissions?,
        can_approve_pull_request_reviews: resp.can_approve_pull_request_reviews,
    })
}

pub(crate) fn workflow_access(resp: WorkflowAccessResponse) -> Option<WorkflowAccess> {
    resp.access_level.map(|access_level| WorkflowAccess { access_level })
}

/// Body of the basic edit call. Archive state is deliberately left out;
/// it is applied as its own final step.
pub(crate) fn edit_request(meta: &RepositoryMetadata) -> EditRepoRequest<'_> {
    EditRepoRequest {
        description: &meta.description,
        homepage: &meta.homepage,
        private: meta.private,
        has_issues: meta.has_issues,
        has_wiki: meta.has_wiki,
        has_projects: meta.has_projects,
        has_discussions: meta.has_discussions,
        allow_squash_merge: meta.allow_squash_merge,
        allow_merge_commit: meta.allow_merge_commit,
        allow_rebase_merge: meta.allow_rebase_merge,
        allow_auto_merge: meta.allow_auto_merge,
        delete_branch_on_merge: meta.delete_branch_on_merge,
        allow_update_branch: meta.allow_update_branch,
        squash_merge_commit_title: meta.squash_merge_commit_title,
        squash_merge_commit_message: meta.squash_merge_commit_message,
        merge_commit_title: meta.merge_commit_title,
        merge_commit_message: meta.merge_commit_message,
        allow_forking: meta.allow_forking,
        is_template: meta.is_template,
        web_commit_signoff_required: meta.web_commit_signoff_required,
    }
}

pub(crate) fn create_request<'a>(name: &'a str, meta: &'a RepositoryMetadata) -> CreateRepoRequest<'a> {
    CreateRepoRequest {
        name,
        description: &meta.description,
        homepage: &meta.homepage,
        private: meta.private,
        has_issues: meta.has_issues,
        has_wiki: meta.has_wiki,
        has_projects: meta.has_projects,
        has_discussions: meta.has_discussions,
        is_template: meta.is_template,
        auto_init: false,
    }
}

pub(crate) fn actions_permissions_request(perms: &ActionsPermissions) -> ActionsPermissionsRequest {
    ActionsPermissionsRequest {
        enabled: perms.enabled,
        allowed_actions: perms.allowed_actions,
        sha_pinning_required: perms.sha_pinning_required,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposync_core::{AccessLevel, AllowedActions, SquashMergeCommitTitle};
    use serde_json::json;

    fn repo(value: serde_json::Value) -> RepoResponse {
        serde_json::from_value(value).expect("decode repo")
    }

    #[test]
    fn missing_default_branch_is_a_decode_error() {
        let err = metadata_from_repo("repos/acme/foo", repo(json!({ "private": true })))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }), "got: {err}");
    }

    #[test]
    fn empty_default_branch_is_a_decode_error() {
        let err = metadata_from_repo("repos/acme/foo", repo(json!({ "default_branch": "  " })))
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }

    #[test]
    fn null_description_and_homepage_become_empty() {
        let meta = metadata_from_repo(
            "repos/acme/foo",
            repo(json!({
                "description": null,
                "homepage": null,
                "default_branch": "main",
                "topics": ["rust", "cli"],
            })),
        )
        .unwrap();
        assert_eq!(meta.description, "");
        assert_eq!(meta.homepage, "");
        assert_eq!(meta.default_branch, "main");
        assert_eq!(meta.topics.len(), 2);
    }

    #[test]
    fn unknown_commit_format_is_treated_as_absent() {
        let meta = metadata_from_repo(
            "repos/acme/foo",
            repo(json!({
                "default_branch": "main",
                "squash_merge_commit_title": "SOMETHING_NEW",
                "merge_commit_title": "PR_TITLE",
            })),
        )
        .unwrap();
        assert_eq!(meta.squash_merge_commit_title, None);
        assert!(meta.merge_commit_title.is_some());
    }

    #[test]
    fn edit_request_omits_absent_settings() {
        let mut meta = RepositoryMetadata::with_default_branch("main");
        meta.allow_squash_merge = Some(false);
        meta.squash_merge_commit_title = Some(SquashMergeCommitTitle::PrTitle);
        meta.archived = Some(true);

        let body = serde_json::to_value(edit_request(&meta)).unwrap();
        let obj = body.as_object().unwrap();
        assert_eq!(obj["allow_squash_merge"], false);
        assert_eq!(obj["squash_merge_commit_title"], "PR_TITLE");
        assert!(!obj.contains_key("allow_rebase_merge"));
        assert!(!obj.contains_key("merge_commit_message"));
        assert!(!obj.contains_key("archived"));
        assert_eq!(obj["private"], false);
    }

    #[test]
    fn create_request_never_auto_initializes() {
        let mut meta = RepositoryMetadata::with_default_branch("main");
        meta.private = true;
        meta.description = "mirror".into();

        let body = serde_json::to_value(create_request("foo", &meta)).unwrap();
        assert_eq!(body["name"], "foo");
        assert_eq!(body["private"], true);
        assert_eq!(body["auto_init"], false);
        assert!(body.get("is_template").is_none());
    }

    #[test]
    fn workflow_permissions_without_default_level_is_absent() {
        let resp: WorkflowPermissionsResponse =
            serde_json::from_value(json!({ "can_approve_pull_request_reviews": true })).unwrap();
        assert_eq!(workflow_permissions(resp), None);
    }

    #[test]
    fn actions_sub_settings_decode() {
        let perms: ActionsPermissionsResponse =
            serde_json::from_value(json!({ "enabled": true, "allowed_actions": "selected" }))
                .unwrap();
        let perms = actions_permissions(perms);
        assert_eq!(perms.allowed_actions, Some(AllowedActions::Selected));
        assert_eq!(perms.sha_pinning_required, None);

        let access: WorkflowAccessResponse =
            serde_json::from_value(json!({ "access_level": "organization" })).unwrap();
        assert_eq!(
            workflow_access(access).map(|a| a.access_level),
            Some(AccessLevel::Organization)
        );
    }
}
