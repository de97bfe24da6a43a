//! Metadata gateway: the repository-level operations the sync engine needs.
//!
//! Reads are all-or-error for the repository itself and best-effort for the
//! Actions sub-settings. Writes are split into independent setting groups so
//! that one rejected group (say, a policy the target org forbids) never
//! prevents the others from landing.

use std::fmt;

use serde::Serialize;

use reposync_core::{ActionsSettings, RepositoryMetadata, SelectedActions};

use crate::client::GitHubClient;
use crate::convert;
use crate::error::GatewayError;
use crate::wire::{
    ActionsPermissionsResponse, ArchiveRequest, DefaultBranchRequest, RepoResponse, Topics,
    WorkflowAccessResponse, WorkflowPermissionsResponse,
};

// ---------------------------------------------------------------------------
// 1. Trait
// ---------------------------------------------------------------------------

/// Repository operations used by the sync engine.
pub trait MetadataGateway {
    /// Read a repository's settings, including whatever Actions policy is
    /// readable. A missing default branch is a decode error.
    fn get_repository_metadata(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<RepositoryMetadata, GatewayError>;

    /// Reconcile `metadata` onto `org/repo`, one group at a time.
    fn set_repository_metadata(
        &self,
        org: &str,
        repo: &str,
        metadata: &RepositoryMetadata,
    ) -> MetadataApplyReport;

    /// `NotFound` folds into `Ok(false)`; every other failure is returned.
    fn repository_exists(&self, org: &str, repo: &str) -> Result<bool, GatewayError>;

    /// Create an empty repository (no auto-init commit).
    fn create_repository(
        &self,
        org: &str,
        repo: &str,
        metadata: &RepositoryMetadata,
    ) -> Result<(), GatewayError>;
}

// ---------------------------------------------------------------------------
// 2. Apply report
// ---------------------------------------------------------------------------

/// Independently applied slice of repository settings, in apply order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingGroup {
    Basic,
    Topics,
    DefaultBranch,
    ActionsPermissions,
    SelectedActions,
    WorkflowPermissions,
    WorkflowAccess,
    Archive,
}

impl SettingGroup {
    pub const ALL: [SettingGroup; 8] = [
        SettingGroup::Basic,
        SettingGroup::Topics,
        SettingGroup::DefaultBranch,
        SettingGroup::ActionsPermissions,
        SettingGroup::SelectedActions,
        SettingGroup::WorkflowPermissions,
        SettingGroup::WorkflowAccess,
        SettingGroup::Archive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingGroup::Basic => "basic",
            SettingGroup::Topics => "topics",
            SettingGroup::DefaultBranch => "default_branch",
            SettingGroup::ActionsPermissions => "actions_permissions",
            SettingGroup::SelectedActions => "selected_actions",
            SettingGroup::WorkflowPermissions => "workflow_permissions",
            SettingGroup::WorkflowAccess => "workflow_access",
            SettingGroup::Archive => "archive",
        }
    }
}

impl fmt::Display for SettingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum GroupOutcome {
    Applied,
    Skipped(String),
    Failed(String),
}

impl GroupOutcome {
    fn from_result(result: Result<(), GatewayError>) -> Self {
        match result {
            Ok(()) => GroupOutcome::Applied,
            Err(err) => GroupOutcome::Failed(err.to_string()),
        }
    }
}

/// Per-group outcome of [`MetadataGateway::set_repository_metadata`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataApplyReport {
    entries: Vec<(SettingGroup, GroupOutcome)>,
}

impl MetadataApplyReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, group: SettingGroup, outcome: GroupOutcome) {
        self.entries.push((group, outcome));
    }

    pub fn outcome(&self, group: SettingGroup) -> Option<&GroupOutcome> {
        self.entries
            .iter()
            .find(|(g, _)| *g == group)
            .map(|(_, outcome)| outcome)
    }

    /// True iff the basic edit was applied.
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome(SettingGroup::Basic), Some(GroupOutcome::Applied))
    }

    pub fn failures(&self) -> impl Iterator<Item = (SettingGroup, &str)> + '_ {
        self.entries.iter().filter_map(|(group, outcome)| match outcome {
            GroupOutcome::Failed(message) => Some((*group, message.as_str())),
            _ => None,
        })
    }
}

/// Why `group` is not sent for `meta`, or `None` when it should be.
///
/// The default-branch group has further conditions that depend on the
/// target's current state and are checked at apply time.
pub fn skip_reason(group: SettingGroup, meta: &RepositoryMetadata) -> Option<&'static str> {
    let actions = &meta.actions;
    match group {
        SettingGroup::Basic | SettingGroup::DefaultBranch => None,
        SettingGroup::Topics if meta.topics.is_empty() => Some("source has no topics"),
        SettingGroup::Topics => None,
        SettingGroup::ActionsPermissions if actions.permissions.is_none() => {
            Some("not readable on source")
        }
        SettingGroup::SelectedActions if actions.selected_actions.is_none() => {
            Some("source does not restrict to selected actions")
        }
        SettingGroup::WorkflowPermissions if actions.workflow_permissions.is_none() => {
            Some("not readable on source")
        }
        SettingGroup::WorkflowAccess if actions.workflow_access.is_none() => {
            Some("source is not private or access is unset")
        }
        SettingGroup::Archive if meta.archived != Some(true) => Some("source is not archived"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// 3. REST implementation
// ---------------------------------------------------------------------------

fn repo_path(org: &str, repo: &str) -> String {
    format!("repos/{org}/{repo}")
}

impl MetadataGateway for GitHubClient {
    fn get_repository_metadata(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<RepositoryMetadata, GatewayError> {
        let path = repo_path(org, repo);
        let response: RepoResponse = self.get(&path)?;
        let mut meta = convert::metadata_from_repo(&path, response)?;

        match self.get::<Topics>(&format!("{path}/topics")) {
            Ok(topics) => meta.topics = topics.names.into_iter().collect(),
            Err(err) => tracing::debug!(org, repo, error = %err, "topics not readable"),
        }

        meta.actions = self.read_actions_settings(org, repo, meta.private);
        tracing::debug!(org, repo, branch = %meta.default_branch, "read repository metadata");
        Ok(meta)
    }

    fn set_repository_metadata(
        &self,
        org: &str,
        repo: &str,
        metadata: &RepositoryMetadata,
    ) -> MetadataApplyReport {
        let mut report = MetadataApplyReport::new();
        for group in SettingGroup::ALL {
            let outcome = match skip_reason(group, metadata) {
                Some(reason) => GroupOutcome::Skipped(reason.to_string()),
                None => self.apply_group(org, repo, group, metadata),
            };
            match &outcome {
                GroupOutcome::Failed(message) => {
                    tracing::warn!(org, repo, group = %group, "failed to apply settings: {message}");
                }
                GroupOutcome::Skipped(reason) => {
                    tracing::debug!(org, repo, group = %group, "skipped: {reason}");
                }
                GroupOutcome::Applied => {
                    tracing::debug!(org, repo, group = %group, "applied");
                }
            }
            report.record(group, outcome);
        }
        report
    }

    fn repository_exists(&self, org: &str, repo: &str) -> Result<bool, GatewayError> {
        match self.check(&repo_path(org, repo)) {
            Ok(()) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn create_repository(
        &self,
        org: &str,
        repo: &str,
        metadata: &RepositoryMetadata,
    ) -> Result<(), GatewayError> {
        let body = convert::create_request(repo, metadata);
        if let Err(err) = self.send_once("POST", &format!("orgs/{org}/repos"), &body) {
            // The create may have landed even though the response was lost.
            let landed = matches!(err, GatewayError::Network { .. })
                && self.repository_exists(org, repo).unwrap_or(false);
            if !landed {
                return Err(err);
            }
            tracing::warn!(org, repo, error = %err, "create response lost; repository exists");
        }
        tracing::info!(org, repo, visibility = metadata.visibility(), "created repository");
        Ok(())
    }
}

impl GitHubClient {
    fn read_actions_settings(&self, org: &str, repo: &str, private: bool) -> ActionsSettings {
        let base = format!("{}/actions/permissions", repo_path(org, repo));
        let mut actions = ActionsSettings::default();

        match self.get::<ActionsPermissionsResponse>(&base) {
            Ok(resp) => actions.permissions = Some(convert::actions_permissions(resp)),
            Err(err) => log_unreadable(org, repo, "actions permissions", &err),
        }

        let selected = actions
            .permissions
            .as_ref()
            .and_then(|p| p.allowed_actions)
            == Some(reposync_core::AllowedActions::Selected);
        if selected {
            match self.get::<SelectedActions>(&format!("{base}/selected-actions")) {
                Ok(resp) => actions.selected_actions = Some(resp),
                Err(err) => log_unreadable(org, repo, "selected actions", &err),
            }
        }

        match self.get::<WorkflowPermissionsResponse>(&format!("{base}/workflow")) {
            Ok(resp) => actions.workflow_permissions = convert::workflow_permissions(resp),
            Err(err) => log_unreadable(org, repo, "workflow permissions", &err),
        }

        if private {
            match self.get::<WorkflowAccessResponse>(&format!("{base}/access")) {
                Ok(resp) => actions.workflow_access = convert::workflow_access(resp),
                Err(err) => log_unreadable(org, repo, "workflow access", &err),
            }
        }

        actions
    }

    fn apply_group(
        &self,
        org: &str,
        repo: &str,
        group: SettingGroup,
        meta: &RepositoryMetadata,
    ) -> GroupOutcome {
        let path = repo_path(org, repo);
        let actions = format!("{path}/actions/permissions");
        let result = match group {
            SettingGroup::Basic => self.send("PATCH", &path, &convert::edit_request(meta)),
            SettingGroup::Topics => {
                let body = Topics {
                    names: meta.topics.iter().cloned().collect(),
                };
                self.send("PUT", &format!("{path}/topics"), &body)
            }
            SettingGroup::DefaultBranch => return self.apply_default_branch(&path, meta),
            SettingGroup::ActionsPermissions => match &meta.actions.permissions {
                Some(perms) => {
                    self.send("PUT", &actions, &convert::actions_permissions_request(perms))
                }
                None => return GroupOutcome::Skipped("not readable on source".into()),
            },
            SettingGroup::SelectedActions => match &meta.actions.selected_actions {
                Some(selected) => self.send("PUT", &format!("{actions}/selected-actions"), selected),
                None => return GroupOutcome::Skipped("not set on source".into()),
            },
            SettingGroup::WorkflowPermissions => match &meta.actions.workflow_permissions {
                Some(perms) => self.send("PUT", &format!("{actions}/workflow"), perms),
                None => return GroupOutcome::Skipped("not readable on source".into()),
            },
            SettingGroup::WorkflowAccess => match &meta.actions.workflow_access {
                Some(access) => self.send("PUT", &format!("{actions}/access"), access),
                None => return GroupOutcome::Skipped("not set on source".into()),
            },
            SettingGroup::Archive => self.send("PATCH", &path, &ArchiveRequest { archived: true }),
        };
        GroupOutcome::from_result(result)
    }

    /// Switch the target's default branch only when it differs and the
    /// branch has already been pushed.
    fn apply_default_branch(&self, path: &str, meta: &RepositoryMetadata) -> GroupOutcome {
        let branch = meta.default_branch.as_str();
        let current = match self.get::<RepoResponse>(path) {
            Ok(target) => target.default_branch.unwrap_or_default(),
            Err(err) => return GroupOutcome::Failed(err.to_string()),
        };
        if current == branch {
            return GroupOutcome::Skipped(format!("already '{branch}'"));
        }
        match self.check(&format!("{path}/branches/{branch}")) {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                return GroupOutcome::Skipped(format!("branch '{branch}' not present in target"));
            }
            Err(err) => return GroupOutcome::Failed(err.to_string()),
        }
        GroupOutcome::from_result(self.send(
            "PATCH",
            path,
            &DefaultBranchRequest {
                default_branch: branch,
            },
        ))
    }
}

fn log_unreadable(org: &str, repo: &str, what: &str, err: &GatewayError) {
    if err.is_not_found() {
        tracing::debug!(org, repo, "{what} not configured");
    } else {
        tracing::warn!(org, repo, error = %err, "could not read {what}; leaving it out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use crate::test_server::{Recorded, Reply, TestServer};
    use reposync_core::{
        AccessLevel, ActionsPermissions, AllowedActions, DefaultWorkflowPermissions,
        WorkflowAccess, WorkflowPermissions,
    };
    use rstest::rstest;
    use std::time::Duration;

    fn meta() -> RepositoryMetadata {
        RepositoryMetadata::with_default_branch("main")
    }

    #[test]
    fn report_succeeds_only_when_basic_applied() {
        let mut report = MetadataApplyReport::new();
        report.record(SettingGroup::Basic, GroupOutcome::Applied);
        report.record(SettingGroup::Topics, GroupOutcome::Failed("422".into()));
        assert!(report.succeeded());
        assert_eq!(
            report.failures().collect::<Vec<_>>(),
            vec![(SettingGroup::Topics, "422")]
        );

        let mut report = MetadataApplyReport::new();
        report.record(SettingGroup::Basic, GroupOutcome::Failed("403".into()));
        report.record(SettingGroup::Topics, GroupOutcome::Applied);
        assert!(!report.succeeded());
        assert_eq!(report.outcome(SettingGroup::Topics), Some(&GroupOutcome::Applied));
    }

    #[test]
    fn empty_report_has_not_succeeded() {
        assert!(!MetadataApplyReport::new().succeeded());
    }

    #[test]
    fn archive_is_the_last_group() {
        assert_eq!(SettingGroup::ALL.last(), Some(&SettingGroup::Archive));
        assert_eq!(SettingGroup::ALL.first(), Some(&SettingGroup::Basic));
    }

    #[test]
    fn bare_metadata_only_sends_basic_and_default_branch() {
        let meta = meta();
        let sent: Vec<_> = SettingGroup::ALL
            .into_iter()
            .filter(|g| skip_reason(*g, &meta).is_none())
            .collect();
        assert_eq!(sent, vec![SettingGroup::Basic, SettingGroup::DefaultBranch]);
    }

    #[test]
    fn present_sub_settings_are_sent() {
        let mut meta = meta();
        meta.topics.insert("rust".into());
        meta.archived = Some(true);
        meta.actions.permissions = Some(ActionsPermissions {
            enabled: true,
            allowed_actions: Some(AllowedActions::Selected),
            sha_pinning_required: None,
        });
        meta.actions.workflow_access = Some(WorkflowAccess {
            access_level: AccessLevel::Organization,
        });

        assert_eq!(skip_reason(SettingGroup::Topics, &meta), None);
        assert_eq!(skip_reason(SettingGroup::Archive, &meta), None);
        assert_eq!(skip_reason(SettingGroup::ActionsPermissions, &meta), None);
        assert_eq!(skip_reason(SettingGroup::WorkflowAccess, &meta), None);
        assert!(skip_reason(SettingGroup::SelectedActions, &meta).is_some());
        assert!(skip_reason(SettingGroup::WorkflowPermissions, &meta).is_some());
    }

    #[test]
    fn unarchived_source_never_unarchives_target() {
        let mut meta = meta();
        meta.archived = Some(false);
        assert!(skip_reason(SettingGroup::Archive, &meta).is_some());
    }

    // -----------------------------------------------------------------------
    // Against a local HTTP server
    // -----------------------------------------------------------------------

    fn client(server: &TestServer) -> GitHubClient {
        GitHubClient::new(server.base_url(), "t", Duration::from_secs(5))
            .with_retry_config(
                RetryConfig::new(Duration::ZERO, Duration::from_millis(1), 3).with_jitter(false),
            )
    }

    fn patches(server: &TestServer) -> Vec<Recorded> {
        server
            .requests()
            .into_iter()
            .filter(|r| r.method == "PATCH")
            .collect()
    }

    #[test]
    fn default_branch_is_not_switched_to_a_missing_branch() {
        let server = TestServer::start(|method, path| match (method, path) {
            ("GET", "/repos/mirror/foo") => Reply::Json(200, r#"{"default_branch":"main"}"#),
            ("GET", "/repos/mirror/foo/branches/trunk") => {
                Reply::Json(404, r#"{"message":"Branch not found"}"#)
            }
            _ => Reply::Json(200, "{}"),
        });

        let report = client(&server).set_repository_metadata(
            "mirror",
            "foo",
            &RepositoryMetadata::with_default_branch("trunk"),
        );

        assert!(report.succeeded());
        assert!(matches!(
            report.outcome(SettingGroup::DefaultBranch),
            Some(GroupOutcome::Skipped(_))
        ));
        let patches = patches(&server);
        assert_eq!(patches.len(), 1, "only the basic edit: {:?}", server.lines());
        assert!(!patches[0].body.contains("trunk"));
    }

    #[test]
    fn default_branch_is_switched_once_the_branch_exists() {
        let server = TestServer::start(|method, path| match (method, path) {
            ("GET", "/repos/mirror/foo") => Reply::Json(200, r#"{"default_branch":"main"}"#),
            ("GET", "/repos/mirror/foo/branches/trunk") => Reply::Json(200, r#"{"name":"trunk"}"#),
            _ => Reply::Json(200, "{}"),
        });

        let report = client(&server).set_repository_metadata(
            "mirror",
            "foo",
            &RepositoryMetadata::with_default_branch("trunk"),
        );

        assert_eq!(
            report.outcome(SettingGroup::DefaultBranch),
            Some(&GroupOutcome::Applied)
        );
        let patches = patches(&server);
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[1].body, r#"{"default_branch":"trunk"}"#);
    }

    #[test]
    fn rejected_group_does_not_stop_later_groups() {
        let server = TestServer::start(|method, path| match (method, path) {
            ("GET", "/repos/mirror/foo") => Reply::Json(200, r#"{"default_branch":"main"}"#),
            ("PUT", "/repos/mirror/foo/actions/permissions") => {
                Reply::Json(403, r#"{"message":"Forbidden by organization policy"}"#)
            }
            _ => Reply::Json(204, ""),
        });
        let mut meta = RepositoryMetadata::with_default_branch("main");
        meta.topics.insert("rust".into());
        meta.actions.permissions = Some(ActionsPermissions {
            enabled: true,
            allowed_actions: Some(AllowedActions::All),
            sha_pinning_required: None,
        });
        meta.actions.workflow_permissions = Some(WorkflowPermissions {
            default_workflow_permissions: DefaultWorkflowPermissions::Read,
            can_approve_pull_request_reviews: false,
        });

        let report = client(&server).set_repository_metadata("mirror", "foo", &meta);

        assert!(report.succeeded());
        assert_eq!(report.outcome(SettingGroup::Topics), Some(&GroupOutcome::Applied));
        assert!(matches!(
            report.outcome(SettingGroup::ActionsPermissions),
            Some(GroupOutcome::Failed(_))
        ));
        assert_eq!(
            report.outcome(SettingGroup::WorkflowPermissions),
            Some(&GroupOutcome::Applied)
        );
        assert_eq!(server.count("PUT", "/repos/mirror/foo/topics"), 1);
        assert_eq!(server.count("PUT", "/repos/mirror/foo/actions/permissions"), 1);
        assert_eq!(
            server.count("PUT", "/repos/mirror/foo/actions/permissions/workflow"),
            1
        );
        assert_eq!(
            report.failures().map(|(g, _)| g).collect::<Vec<_>>(),
            vec![SettingGroup::ActionsPermissions]
        );
    }

    #[test]
    fn missing_actions_sub_resources_are_left_out() {
        let server = TestServer::start(|method, path| match (method, path) {
            ("GET", "/repos/acme/foo") => {
                Reply::Json(200, r#"{"default_branch":"main","private":true}"#)
            }
            ("GET", "/repos/acme/foo/topics") => Reply::Json(200, r#"{"names":["rust","cli"]}"#),
            ("GET", "/repos/acme/foo/actions/permissions") => {
                Reply::Json(200, r#"{"enabled":true,"allowed_actions":"selected"}"#)
            }
            _ => Reply::Json(404, r#"{"message":"Not Found"}"#),
        });

        let meta = client(&server)
            .get_repository_metadata("acme", "foo")
            .unwrap();

        assert_eq!(meta.default_branch, "main");
        assert_eq!(meta.topics.len(), 2);
        assert_eq!(
            meta.actions.permissions.as_ref().and_then(|p| p.allowed_actions),
            Some(AllowedActions::Selected)
        );
        assert!(meta.actions.selected_actions.is_none());
        assert!(meta.actions.workflow_permissions.is_none());
        assert!(meta.actions.workflow_access.is_none());
        assert_eq!(
            server.count("GET", "/repos/acme/foo/actions/permissions/selected-actions"),
            1
        );
        assert_eq!(
            server.count("GET", "/repos/acme/foo/actions/permissions/access"),
            1
        );
    }

    #[test]
    fn public_repository_skips_workflow_access_read() {
        let server = TestServer::start(|method, path| match (method, path) {
            ("GET", "/repos/acme/foo") => Reply::Json(200, r#"{"default_branch":"main"}"#),
            _ => Reply::Json(404, r#"{"message":"Not Found"}"#),
        });

        let meta = client(&server)
            .get_repository_metadata("acme", "foo")
            .unwrap();

        assert!(meta.actions.is_empty());
        assert_eq!(
            server.count("GET", "/repos/acme/foo/actions/permissions/access"),
            0
        );
        assert_eq!(
            server.count("GET", "/repos/acme/foo/actions/permissions/selected-actions"),
            0
        );
    }

    #[test]
    fn repository_without_default_branch_is_a_decode_error() {
        let server = TestServer::start(|_, _| Reply::Json(200, r#"{"default_branch":""}"#));
        let err = client(&server)
            .get_repository_metadata("acme", "empty")
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }), "got: {err}");
    }

    #[rstest]
    #[case(200, Some(true))]
    #[case(404, Some(false))]
    #[case(401, None)]
    #[case(403, None)]
    fn exists_folds_only_not_found(#[case] status: u16, #[case] expected: Option<bool>) {
        let server = TestServer::start(move |_, _| Reply::Json(status, r#"{"message":"x"}"#));
        let result = client(&server).repository_exists("mirror", "foo");
        match expected {
            Some(exists) => assert_eq!(result.unwrap(), exists),
            None => assert!(
                matches!(result, Err(GatewayError::AuthFailure { .. })),
                "got: {result:?}"
            ),
        }
    }

    #[test]
    fn create_is_sent_once_and_confirmed_after_lost_response() {
        let server = TestServer::start(|method, path| match (method, path) {
            ("POST", "/orgs/mirror/repos") => Reply::Hangup,
            ("GET", "/repos/mirror/foo") => Reply::Json(200, r#"{"default_branch":"main"}"#),
            _ => Reply::Json(404, r#"{"message":"Not Found"}"#),
        });

        client(&server)
            .create_repository("mirror", "foo", &RepositoryMetadata::with_default_branch("main"))
            .unwrap();

        assert_eq!(server.count("POST", "/orgs/mirror/repos"), 1);
        assert_eq!(server.count("GET", "/repos/mirror/foo"), 1);
    }

    #[test]
    fn lost_create_response_without_repository_is_an_error() {
        let server = TestServer::start(|method, path| match (method, path) {
            ("POST", "/orgs/mirror/repos") => Reply::Hangup,
            _ => Reply::Json(404, r#"{"message":"Not Found"}"#),
        });

        let err = client(&server)
            .create_repository("mirror", "foo", &RepositoryMetadata::with_default_branch("main"))
            .unwrap_err();

        assert!(matches!(err, GatewayError::Network { .. }), "got: {err}");
        assert_eq!(server.count("POST", "/orgs/mirror/repos"), 1);
    }

    #[test]
    fn rejected_create_is_not_second_guessed() {
        let server = TestServer::start(|_, _| {
            Reply::Json(422, r#"{"message":"name already exists on this account"}"#)
        });

        let err = client(&server)
            .create_repository("mirror", "foo", &RepositoryMetadata::with_default_branch("main"))
            .unwrap_err();

        assert!(matches!(err, GatewayError::Api { status: 422, .. }), "got: {err}");
        assert_eq!(server.lines(), vec!["POST /orgs/mirror/repos".to_string()]);
    }

    #[test]
    fn group_names_are_snake_case() {
        assert_eq!(SettingGroup::DefaultBranch.to_string(), "default_branch");
        let json = serde_json::to_string(&SettingGroup::WorkflowAccess).unwrap();
        assert_eq!(json, "\"workflow_access\"");
    }
}
