//! Remote enumeration and ranking.

use crate::domain::errors::LinkError;
use crate::domain::model::Remote;
use crate::infra::git::VcsBackend;

/// Lists a repository's remotes, most authoritative first.
///
/// Authority is approximated by name: remotes listed in `preferred` come first in that order
/// (`upstream`, then `origin` by default), everything else keeps its enumeration order.
pub struct RemoteCatalog<'a> {
    backend: &'a dyn VcsBackend,
    preferred: Vec<String>,
}

impl<'a> RemoteCatalog<'a> {
    pub fn new(backend: &'a dyn VcsBackend, preferred: Vec<String>) -> Self {
        Self { backend, preferred }
    }

    /// Remotes read fresh from the backend and ranked.
    pub fn ranked(&self) -> Result<Vec<Remote>, LinkError> {
        let remotes = self.backend.remotes().unwrap_or_else(|err| {
            tracing::warn!("failed to list remotes: {err:#}");
            Vec::new()
        });
        if remotes.is_empty() {
            return Err(LinkError::NoRemotesConfigured {
                root: self.backend.root().to_path_buf(),
            });
        }
        Ok(rank_remotes(remotes, &self.preferred))
    }

    /// The remote links should point at: `pinned` when given, otherwise the top-ranked one.
    pub fn select(&self, pinned: Option<&str>) -> Result<Remote, LinkError> {
        let ranked = self.ranked()?;
        tracing::debug!(
            remotes = ?ranked.iter().map(|remote| remote.name.as_str()).collect::<Vec<_>>(),
            "ranked remotes"
        );

        match pinned {
            Some(name) => ranked
                .into_iter()
                .find(|remote| remote.name == name)
                .ok_or_else(|| LinkError::UnknownRemote {
                    remote: name.to_string(),
                    root: self.backend.root().to_path_buf(),
                }),
            None => ranked
                .into_iter()
                .next()
                .ok_or_else(|| LinkError::NoRemotesConfigured {
                    root: self.backend.root().to_path_buf(),
                }),
        }
    }
}

/// Stable sort by position in `preferred`; unlisted remotes share the last rank.
pub fn rank_remotes(mut remotes: Vec<Remote>, preferred: &[String]) -> Vec<Remote> {
    remotes.sort_by_key(|remote| {
        preferred
            .iter()
            .position(|name| *name == remote.name)
            .unwrap_or(preferred.len())
    });
    remotes
}
