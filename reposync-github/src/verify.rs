//! Pre-flight Actions policy check.
//!
//! Mirrored workflows only run if the target orgs allow them, and reusable
//! workflows in private repositories are only callable when their access
//! level permits it. None of this blocks a sync; every finding (including a
//! failed read) is returned as a human-readable warning.

use reposync_core::{AccessLevel, AllowedActions, SelectedActions, SyncSpec};

use crate::client::GitHubClient;
use crate::error::GatewayError;
use crate::wire::{OrgActionsPermissionsResponse, RepoResponse, WorkflowAccessResponse};

/// Which repositories of an org may run Actions at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnabledRepositories {
    All,
    None,
    Selected,
}

impl EnabledRepositories {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "none" => Some(Self::None),
            "selected" => Some(Self::Selected),
            _ => None,
        }
    }
}

/// Org-level Actions policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgActionsPolicy {
    pub enabled_repositories: Option<EnabledRepositories>,
    pub allowed_actions: Option<AllowedActions>,
}

/// Read-only policy queries used by [`verify_permissions`].
pub trait PolicyGateway {
    fn org_actions_permissions(&self, org: &str) -> Result<OrgActionsPolicy, GatewayError>;

    fn org_selected_actions(&self, org: &str) -> Result<SelectedActions, GatewayError>;

    fn repository_private(&self, org: &str, repo: &str) -> Result<bool, GatewayError>;

    /// `None` when the repository has no access level configured.
    fn repository_workflow_access(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Option<AccessLevel>, GatewayError>;
}

impl PolicyGateway for GitHubClient {
    fn org_actions_permissions(&self, org: &str) -> Result<OrgActionsPolicy, GatewayError> {
        let resp: OrgActionsPermissionsResponse =
            self.get(&format!("orgs/{org}/actions/permissions"))?;
        Ok(OrgActionsPolicy {
            enabled_repositories: resp
                .enabled_repositories
                .as_deref()
                .and_then(EnabledRepositories::parse),
            allowed_actions: resp.allowed_actions,
        })
    }

    fn org_selected_actions(&self, org: &str) -> Result<SelectedActions, GatewayError> {
        self.get(&format!("orgs/{org}/actions/permissions/selected-actions"))
    }

    fn repository_private(&self, org: &str, repo: &str) -> Result<bool, GatewayError> {
        let resp: RepoResponse = self.get(&format!("repos/{org}/{repo}"))?;
        Ok(resp.private)
    }

    fn repository_workflow_access(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Option<AccessLevel>, GatewayError> {
        let resp: WorkflowAccessResponse =
            self.get(&format!("repos/{org}/{repo}/actions/permissions/access"))?;
        Ok(resp.access_level)
    }
}

/// Repositories whose name suggests they hold shared workflows.
pub fn is_workflow_source(repo: &str) -> bool {
    let name = repo.to_ascii_lowercase();
    name == ".github" || name.contains("workflow") || name.contains("actions")
}

/// Whether an allow-list pattern admits every action owned by `org`.
fn covers_org(pattern: &str, org: &str) -> bool {
    let pattern = pattern.trim();
    if pattern == "*" {
        return true;
    }
    match pattern.split_once('/') {
        Some((owner, rest)) => owner.eq_ignore_ascii_case(org) && rest.starts_with('*'),
        None => false,
    }
}

/// Check org and repository CI policy for every org in `spec`.
pub fn verify_permissions<G: PolicyGateway + ?Sized>(gateway: &G, spec: &SyncSpec) -> Vec<String> {
    let mut warnings = Vec::new();
    let orgs: Vec<&str> = std::iter::once(spec.source_org())
        .chain(spec.target_orgs().iter().map(String::as_str))
        .collect();

    for org in &orgs {
        check_org(gateway, org, &mut warnings);
    }

    for repo in spec.repositories().iter().filter(|r| is_workflow_source(r)) {
        for org in &orgs {
            check_workflow_access(gateway, org, repo, &mut warnings);
        }
    }

    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    warnings
}

fn check_org<G: PolicyGateway + ?Sized>(gateway: &G, org: &str, warnings: &mut Vec<String>) {
    let policy = match gateway.org_actions_permissions(org) {
        Ok(policy) => policy,
        Err(err) => {
            warnings.push(format!("{org}: could not read Actions policy: {err}"));
            return;
        }
    };

    if policy.enabled_repositories == Some(EnabledRepositories::None) {
        warnings.push(format!(
            "{org}: GitHub Actions is disabled for all repositories; mirrored workflows will not run"
        ));
    }

    if policy.allowed_actions == Some(AllowedActions::Selected) {
        match gateway.org_selected_actions(org) {
            Ok(selected) => {
                if !selected.patterns_allowed.iter().any(|p| covers_org(p, org)) {
                    warnings.push(format!(
                        "{org}: only selected actions are allowed and '{org}/*' is not in the allow-list; workflows calling actions from this org may be blocked"
                    ));
                }
            }
            Err(err) => warnings.push(format!("{org}: could not read selected actions: {err}")),
        }
    }
}

fn check_workflow_access<G: PolicyGateway + ?Sized>(
    gateway: &G,
    org: &str,
    repo: &str,
    warnings: &mut Vec<String>,
) {
    let private = match gateway.repository_private(org, repo) {
        Ok(private) => private,
        // Not created yet in this org; the first sync creates it.
        Err(err) if err.is_not_found() => return,
        Err(err) => {
            warnings.push(format!("{org}/{repo}: could not read repository: {err}"));
            return;
        }
    };
    if !private {
        return;
    }
    match gateway.repository_workflow_access(org, repo) {
        Ok(Some(AccessLevel::None)) => warnings.push(format!(
            "{org}/{repo}: workflow access level is 'none'; other repositories cannot call its reusable workflows"
        )),
        Ok(_) => {}
        Err(err) => warnings.push(format!("{org}/{repo}: could not read workflow access: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakePolicy {
        orgs: HashMap<String, OrgActionsPolicy>,
        selected: HashMap<String, Vec<String>>,
        private: HashMap<String, bool>,
        access: HashMap<String, AccessLevel>,
    }

    fn not_found(resource: &str) -> GatewayError {
        GatewayError::NotFound {
            resource: resource.to_string(),
        }
    }

    impl PolicyGateway for FakePolicy {
        fn org_actions_permissions(&self, org: &str) -> Result<OrgActionsPolicy, GatewayError> {
            self.orgs.get(org).cloned().ok_or_else(|| GatewayError::AuthFailure {
                status: 403,
                resource: org.to_string(),
                message: "Must have admin rights".into(),
            })
        }

        fn org_selected_actions(&self, org: &str) -> Result<SelectedActions, GatewayError> {
            let patterns = self.selected.get(org).cloned().ok_or_else(|| not_found(org))?;
            Ok(SelectedActions {
                github_owned_allowed: Some(true),
                verified_allowed: None,
                patterns_allowed: patterns,
            })
        }

        fn repository_private(&self, org: &str, repo: &str) -> Result<bool, GatewayError> {
            let key = format!("{org}/{repo}");
            self.private.get(&key).copied().ok_or_else(|| not_found(&key))
        }

        fn repository_workflow_access(
            &self,
            org: &str,
            repo: &str,
        ) -> Result<Option<AccessLevel>, GatewayError> {
            Ok(self.access.get(&format!("{org}/{repo}")).copied())
        }
    }

    fn open_policy() -> OrgActionsPolicy {
        OrgActionsPolicy {
            enabled_repositories: Some(EnabledRepositories::All),
            allowed_actions: Some(AllowedActions::All),
        }
    }

    fn spec(repos: &[&str]) -> SyncSpec {
        SyncSpec::new(
            "acme",
            vec!["mirror".into()],
            repos.iter().map(|r| r.to_string()).collect(),
        )
        .unwrap()
    }

    fn permissive() -> FakePolicy {
        let mut fake = FakePolicy::default();
        fake.orgs.insert("acme".into(), open_policy());
        fake.orgs.insert("mirror".into(), open_policy());
        fake
    }

    #[test]
    fn open_orgs_produce_no_warnings() {
        assert!(verify_permissions(&permissive(), &spec(&["foo"])).is_empty());
    }

    #[test]
    fn disabled_actions_warn() {
        let mut fake = permissive();
        fake.orgs.insert(
            "mirror".into(),
            OrgActionsPolicy {
                enabled_repositories: Some(EnabledRepositories::None),
                allowed_actions: None,
            },
        );
        let warnings = verify_permissions(&fake, &spec(&["foo"]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("mirror:"), "got: {warnings:?}");
    }

    #[test]
    fn selected_actions_without_org_pattern_warn() {
        let mut fake = permissive();
        fake.orgs.insert(
            "mirror".into(),
            OrgActionsPolicy {
                enabled_repositories: Some(EnabledRepositories::All),
                allowed_actions: Some(AllowedActions::Selected),
            },
        );
        fake.selected
            .insert("mirror".into(), vec!["actions/checkout@*".into()]);
        let warnings = verify_permissions(&fake, &spec(&["foo"]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'mirror/*'"));

        fake.selected.insert("mirror".into(), vec!["mirror/*".into()]);
        assert!(verify_permissions(&fake, &spec(&["foo"])).is_empty());
    }

    #[test]
    fn read_failure_becomes_a_warning() {
        let mut fake = permissive();
        fake.orgs.remove("acme");
        let warnings = verify_permissions(&fake, &spec(&["foo"]));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("could not read Actions policy"));
    }

    #[test]
    fn private_workflow_repo_with_no_access_warns() {
        let mut fake = permissive();
        fake.private.insert("acme/shared-workflows".into(), true);
        fake.access
            .insert("acme/shared-workflows".into(), AccessLevel::None);
        let warnings = verify_permissions(&fake, &spec(&["shared-workflows", "app"]));
        assert_eq!(warnings.len(), 1, "got: {warnings:?}");
        assert!(warnings[0].starts_with("acme/shared-workflows"));
    }

    #[test]
    fn missing_target_repo_is_not_a_warning() {
        let mut fake = permissive();
        fake.private.insert("acme/.github".into(), true);
        fake.access
            .insert("acme/.github".into(), AccessLevel::Organization);
        assert!(verify_permissions(&fake, &spec(&[".github"])).is_empty());
    }

    #[rstest]
    #[case(".github", true)]
    #[case("ci-workflows", true)]
    #[case("shared-actions", true)]
    #[case("Reusable-Workflow", true)]
    #[case("backend", false)]
    fn workflow_source_heuristic(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_workflow_source(name), expected);
    }

    #[rstest]
    #[case("*", "acme", true)]
    #[case("acme/*", "acme", true)]
    #[case("ACME/*@*", "acme", true)]
    #[case("acme/build@v1", "acme", false)]
    #[case("other/*", "acme", false)]
    fn org_pattern_coverage(#[case] pattern: &str, #[case] org: &str, #[case] expected: bool) {
        assert_eq!(covers_org(pattern, org), expected);
    }
}
