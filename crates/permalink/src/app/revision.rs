//! Choosing the published revision a link points at.
//!
//! The branch is picked by the first tier that yields one:
//!
//! 1. the default branch the remote advertises, asked live when allowed and otherwise (or when
//!    the remote cannot be reached) as last recorded locally,
//! 2. the first conventional branch name that exists locally,
//! 3. the checked-out branch, unless HEAD is detached,
//! 4. the configured fallback name (`main`).
//!
//! The branch is then resolved through the remote-tracking ref `refs/remotes/<remote>/<branch>`
//! so links never point at unpushed local commits. Failures inside a tier only skip that tier
//! and are kept as diagnostics.

use serde::Serialize;

use crate::domain::errors::LinkError;
use crate::domain::model::Remote;
use crate::infra::git::VcsBackend;

/// Which tier picked the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchSource {
    RemoteHead,
    Conventional,
    CurrentBranch,
    Fallback,
}

/// Branch and commit a link is built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalRevision {
    pub remote: String,
    pub branch: String,
    pub source: BranchSource,
    pub commit: String,
    /// Failures swallowed while falling back between tiers.
    pub diagnostics: Vec<String>,
}

pub struct RevisionResolver<'a> {
    backend: &'a dyn VcsBackend,
    conventional: Vec<String>,
    fallback: String,
    query_remote: bool,
}

impl<'a> RevisionResolver<'a> {
    pub fn new(backend: &'a dyn VcsBackend, conventional: Vec<String>, fallback: String) -> Self {
        Self {
            backend,
            conventional,
            fallback,
            query_remote: true,
        }
    }

    /// Allow or forbid contacting the remote host during tier 1.
    pub fn with_remote_query(mut self, enabled: bool) -> Self {
        self.query_remote = enabled;
        self
    }

    pub fn resolve(&self, remote: &Remote) -> Result<CanonicalRevision, LinkError> {
        let mut diagnostics = Vec::new();
        let (branch, source) = self.default_branch(&remote.name, &mut diagnostics);
        tracing::debug!(remote = %remote.name, %branch, ?source, "selected branch");

        let reference = format!("refs/remotes/{}/{}", remote.name, branch);
        let commit = self.backend.resolve(&reference).map_err(|err| {
            LinkError::RevisionResolutionFailed {
                remote: remote.name.clone(),
                branch: branch.clone(),
                detail: format!("{err:#}"),
            }
        })?;
        tracing::debug!(%reference, %commit, "resolved canonical revision");

        Ok(CanonicalRevision {
            remote: remote.name.clone(),
            branch,
            source,
            commit,
            diagnostics,
        })
    }

    /// Walk the tiers in order. Never fails: the last tier is a constant.
    pub fn default_branch(
        &self,
        remote: &str,
        diagnostics: &mut Vec<String>,
    ) -> (String, BranchSource) {
        if let Some(branch) = self.advertised_branch(remote, diagnostics) {
            return (branch, BranchSource::RemoteHead);
        }
        if let Some(branch) = self.conventional_branch(diagnostics) {
            return (branch, BranchSource::Conventional);
        }
        if let Some(branch) = self.checked_out_branch(diagnostics) {
            return (branch, BranchSource::CurrentBranch);
        }
        (self.fallback.clone(), BranchSource::Fallback)
    }

    fn advertised_branch(&self, remote: &str, diagnostics: &mut Vec<String>) -> Option<String> {
        if self.query_remote {
            match self.backend.query_remote_default_branch(remote) {
                Ok(Some(branch)) => return Some(branch),
                Ok(None) => record(
                    diagnostics,
                    format!("remote '{remote}' advertises no default branch"),
                ),
                Err(err) => record(
                    diagnostics,
                    format!("failed to query default branch of '{remote}': {err:#}"),
                ),
            }
        }

        match self.backend.remote_default_branch(remote) {
            Ok(Some(branch)) => Some(branch),
            Ok(None) => {
                record(
                    diagnostics,
                    format!("no default branch recorded for '{remote}'"),
                );
                None
            }
            Err(err) => {
                record(
                    diagnostics,
                    format!("failed to read recorded default branch of '{remote}': {err:#}"),
                );
                None
            }
        }
    }

    fn conventional_branch(&self, diagnostics: &mut Vec<String>) -> Option<String> {
        for branch in &self.conventional {
            match self.backend.local_branch_exists(branch) {
                Ok(true) => return Some(branch.clone()),
                Ok(false) => {}
                Err(err) => record(
                    diagnostics,
                    format!("failed to probe local branch '{branch}': {err:#}"),
                ),
            }
        }
        record(diagnostics, "no conventional branch exists locally".into());
        None
    }

    fn checked_out_branch(&self, diagnostics: &mut Vec<String>) -> Option<String> {
        match self.backend.current_branch() {
            Ok(Some(branch)) if branch != "HEAD" => Some(branch),
            Ok(_) => {
                record(diagnostics, "HEAD is detached".into());
                None
            }
            Err(err) => {
                record(
                    diagnostics,
                    format!("failed to read current branch: {err:#}"),
                );
                None
            }
        }
    }
}

fn record(diagnostics: &mut Vec<String>, message: String) {
    tracing::debug!("{message}");
    diagnostics.push(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::testing::FakeBackend;

    fn resolver(backend: &FakeBackend) -> RevisionResolver<'_> {
        RevisionResolver::new(
            backend,
            ["main", "master", "develop", "dev", "trunk"]
                .into_iter()
                .map(String::from)
                .collect(),
            "main".into(),
        )
    }

    fn origin() -> Remote {
        Remote::new("origin", "git@github.com:acme/widgets.git")
    }

    #[test]
    fn live_default_branch_beats_stale_record() {
        let backend = FakeBackend::default()
            .with_remote_head("origin", "master")
            .with_advertised_head("origin", "main")
            .with_local_branch("master")
            .with_ref("refs/remotes/origin/main", "abc123");

        let revision = resolver(&backend).resolve(&origin()).unwrap();
        assert_eq!(revision.branch, "main");
        assert_eq!(revision.source, BranchSource::RemoteHead);
        assert_eq!(revision.commit, "abc123");
        assert!(revision.diagnostics.is_empty());
    }

    #[test]
    fn recorded_default_branch_used_when_remote_unreachable() {
        let mut backend = FakeBackend::default()
            .with_remote_head("origin", "release")
            .with_local_branch("main")
            .with_ref("refs/remotes/origin/release", "abc124");
        backend.offline = true;

        let revision = resolver(&backend).resolve(&origin()).unwrap();
        assert_eq!(revision.branch, "release");
        assert_eq!(revision.source, BranchSource::RemoteHead);
        assert_eq!(revision.diagnostics.len(), 1);
        assert!(revision.diagnostics[0].contains("could not reach origin"));
    }

    #[test]
    fn recorded_default_branch_used_when_query_disabled() {
        let backend = FakeBackend::default()
            .with_remote_head("origin", "release")
            .with_advertised_head("origin", "main");

        let mut diagnostics = Vec::new();
        let (branch, source) = resolver(&backend)
            .with_remote_query(false)
            .default_branch("origin", &mut diagnostics);
        assert_eq!((branch.as_str(), source), ("release", BranchSource::RemoteHead));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn remote_query_can_be_disabled() {
        let backend = FakeBackend::default()
            .with_advertised_head("origin", "develop")
            .with_local_branch("main");

        let mut diagnostics = Vec::new();
        let (branch, source) = resolver(&backend)
            .with_remote_query(false)
            .default_branch("origin", &mut diagnostics);
        assert_eq!(branch, "main");
        assert_eq!(source, BranchSource::Conventional);
    }

    #[test]
    fn conventional_names_probed_in_order_after_remote_failure() {
        let mut backend = FakeBackend::default()
            .with_local_branch("trunk")
            .with_local_branch("master")
            .with_ref("refs/remotes/origin/master", "def456");
        backend.offline = true;

        let revision = resolver(&backend).resolve(&origin()).unwrap();
        assert_eq!(revision.branch, "master");
        assert_eq!(revision.source, BranchSource::Conventional);
        assert!(
            revision
                .diagnostics
                .iter()
                .any(|message| message.contains("could not reach origin"))
        );
    }

    #[test]
    fn current_branch_used_when_no_conventional_branch_exists() {
        let backend = FakeBackend::default()
            .with_current_branch("feature/login")
            .with_ref("refs/remotes/origin/feature/login", "0a1b2c");

        let revision = resolver(&backend).resolve(&origin()).unwrap();
        assert_eq!(revision.branch, "feature/login");
        assert_eq!(revision.source, BranchSource::CurrentBranch);
    }

    #[test]
    fn defaults_to_main_when_every_tier_fails() {
        let mut backend = FakeBackend::default().with_ref("refs/remotes/origin/main", "fff000");
        backend.offline = true;
        backend.fail_local_branches = true;

        let mut diagnostics = Vec::new();
        let (branch, source) = resolver(&backend).default_branch("origin", &mut diagnostics);
        assert_eq!(branch, "main");
        assert_eq!(source, BranchSource::Fallback);
        // query failed, nothing recorded, five probes, the summary, and the detached HEAD
        assert_eq!(diagnostics.len(), 9);

        let revision = resolver(&backend).resolve(&origin()).unwrap();
        assert_eq!(revision.commit, "fff000");
    }

    #[test]
    fn detached_head_is_skipped() {
        let backend = FakeBackend::default().with_current_branch("HEAD");
        let mut diagnostics = Vec::new();
        let (branch, source) = resolver(&backend).default_branch("origin", &mut diagnostics);
        assert_eq!((branch.as_str(), source), ("main", BranchSource::Fallback));
    }

    #[test]
    fn resolves_through_remote_tracking_ref_only() {
        let backend = FakeBackend::default()
            .with_remote_head("origin", "main")
            .with_ref("main", "local-only");

        let err = resolver(&backend).resolve(&origin()).unwrap_err();
        match err {
            LinkError::RevisionResolutionFailed { remote, branch, .. } => {
                assert_eq!(remote, "origin");
                assert_eq!(branch, "main");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
