//! In-memory backend for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::domain::model::Remote;
use crate::infra::git::VcsBackend;

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub root: PathBuf,
    pub remotes: Vec<Remote>,
    pub remote_heads: HashMap<String, String>,
    pub advertised_heads: HashMap<String, String>,
    pub refs: HashMap<String, String>,
    pub local_branches: HashSet<String>,
    pub current_branch: Option<String>,
    pub files: HashMap<(String, String), String>,
    pub offline: bool,
    pub fail_local_branches: bool,
}

impl FakeBackend {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.push(Remote::new(name, url));
        self
    }

    pub fn with_remote_head(mut self, remote: &str, branch: &str) -> Self {
        self.remote_heads.insert(remote.into(), branch.into());
        self
    }

    pub fn with_advertised_head(mut self, remote: &str, branch: &str) -> Self {
        self.advertised_heads.insert(remote.into(), branch.into());
        self
    }

    pub fn with_ref(mut self, reference: &str, commit: &str) -> Self {
        self.refs.insert(reference.into(), commit.into());
        self
    }

    pub fn with_local_branch(mut self, branch: &str) -> Self {
        self.local_branches.insert(branch.into());
        self
    }

    pub fn with_current_branch(mut self, branch: &str) -> Self {
        self.current_branch = Some(branch.into());
        self
    }

    pub fn with_file(mut self, revision: &str, path: &str, contents: &str) -> Self {
        self.files
            .insert((revision.into(), path.into()), contents.into());
        self
    }
}

impl VcsBackend for FakeBackend {
    fn root(&self) -> &Path {
        &self.root
    }

    fn remotes(&self) -> Result<Vec<Remote>> {
        Ok(self.remotes.clone())
    }

    fn file_at(&self, revision: &str, path: &str) -> Result<String> {
        self.files
            .get(&(revision.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("{path} does not exist at {revision}"))
    }

    fn resolve(&self, reference: &str) -> Result<String> {
        self.refs
            .get(reference)
            .cloned()
            .ok_or_else(|| anyhow!("unknown reference {reference}"))
    }

    fn remote_default_branch(&self, remote: &str) -> Result<Option<String>> {
        Ok(self.remote_heads.get(remote).cloned())
    }

    fn query_remote_default_branch(&self, remote: &str) -> Result<Option<String>> {
        if self.offline {
            return Err(anyhow!("could not reach {remote}"));
        }
        Ok(self.advertised_heads.get(remote).cloned())
    }

    fn local_branch_exists(&self, branch: &str) -> Result<bool> {
        if self.fail_local_branches {
            return Err(anyhow!("refs unreadable"));
        }
        Ok(self.local_branches.contains(branch))
    }

    fn current_branch(&self) -> Result<Option<String>> {
        Ok(self.current_branch.clone())
    }
}
