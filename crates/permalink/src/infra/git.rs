//! Git integration utilities.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, anyhow, bail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::Remote;

static HEAD_BRANCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*HEAD branch:\s*(\S+)\s*$").expect("valid regex"));

/// Read-only view of a repository, as much as link generation needs.
pub trait VcsBackend {
    /// Working tree root of the repository.
    fn root(&self) -> &Path;

    /// Configured remotes with their fetch URLs, in enumeration order.
    fn remotes(&self) -> Result<Vec<Remote>>;

    /// Raw text of `path` (repository-relative, `/`-separated) as of `revision`.
    fn file_at(&self, revision: &str, path: &str) -> Result<String>;

    /// Resolve a reference such as `refs/remotes/origin/main`, `main` or `HEAD` to a commit id.
    fn resolve(&self, reference: &str) -> Result<String>;

    /// Default branch of `remote` as last recorded locally (`refs/remotes/<remote>/HEAD`).
    fn remote_default_branch(&self, remote: &str) -> Result<Option<String>>;

    /// Ask the remote host which branch it currently advertises as its default.
    fn query_remote_default_branch(&self, remote: &str) -> Result<Option<String>>;

    /// Whether `refs/heads/<branch>` exists.
    fn local_branch_exists(&self, branch: &str) -> Result<bool>;

    /// Short name of the checked-out branch, `None` when HEAD is detached.
    fn current_branch(&self) -> Result<Option<String>>;
}

/// [`VcsBackend`] backed by a discovered [`gix::Repository`].
pub struct GixBackend {
    repo: gix::Repository,
    root: PathBuf,
}

impl GixBackend {
    /// Locate the repository containing `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = gix::discover(path)
            .with_context(|| format!("no git repository contains {}", path.display()))?;
        let root = repo
            .work_dir()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("repository at {} has no work tree", path.display()))?;
        Ok(Self { repo, root })
    }
}

impl VcsBackend for GixBackend {
    fn root(&self) -> &Path {
        &self.root
    }

    fn remotes(&self) -> Result<Vec<Remote>> {
        let mut remotes = Vec::new();
        for name in self.repo.remote_names() {
            let remote = self
                .repo
                .find_remote(&*name)
                .with_context(|| format!("failed to read remote '{name}'"))?;
            match remote.url(gix::remote::Direction::Fetch) {
                Some(url) => {
                    remotes.push(Remote::new(name.to_string(), url.to_bstring().to_string()))
                }
                None => tracing::debug!(remote = %name, "skipping remote without fetch url"),
            }
        }
        Ok(remotes)
    }

    fn file_at(&self, revision: &str, path: &str) -> Result<String> {
        let spec = format!("{revision}:{path}");
        let object = self
            .repo
            .rev_parse_single(spec.as_str())
            .with_context(|| format!("{path} does not exist at {revision}"))?
            .object()
            .with_context(|| format!("failed to read {path} at {revision}"))?;
        if object.kind != gix::object::Kind::Blob {
            bail!("{path} is a {:?} at {revision}, not a file", object.kind);
        }
        Ok(String::from_utf8_lossy(&object.data).into_owned())
    }

    fn resolve(&self, reference: &str) -> Result<String> {
        let spec = format!("{reference}^{{commit}}");
        let id = self
            .repo
            .rev_parse_single(spec.as_str())
            .with_context(|| format!("failed to resolve {reference}"))?;
        Ok(id.detach().to_string())
    }

    fn remote_default_branch(&self, remote: &str) -> Result<Option<String>> {
        let name = format!("refs/remotes/{remote}/HEAD");
        let Some(reference) = self
            .repo
            .try_find_reference(name.as_str())
            .with_context(|| format!("failed to read {name}"))?
        else {
            return Ok(None);
        };

        let prefix = format!("refs/remotes/{remote}/");
        Ok(reference
            .inner
            .target
            .try_name()
            .map(|target| target.as_bstr().to_string())
            .and_then(|target| target.strip_prefix(&prefix).map(str::to_owned)))
    }

    fn query_remote_default_branch(&self, remote: &str) -> Result<Option<String>> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(["remote", "show", remote])
            .output()
            .context("failed to spawn git")?;
        if !output.status.success() {
            bail!(
                "git remote show {remote} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(parse_head_branch(&String::from_utf8_lossy(&output.stdout)))
    }

    fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        let name = format!("refs/heads/{branch}");
        let found = self
            .repo
            .try_find_reference(name.as_str())
            .with_context(|| format!("failed to look up {name}"))?;
        Ok(found.is_some())
    }

    fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.head_name().context("failed to read HEAD")?;
        Ok(head.map(|name| name.shorten().to_string()))
    }
}

/// Extract the `HEAD branch:` value from `git remote show` output.
fn parse_head_branch(output: &str) -> Option<String> {
    HEAD_BRANCH
        .captures(output)
        .map(|captures| captures[1].to_string())
        .filter(|branch| branch != "(unknown)")
}
