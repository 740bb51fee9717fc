//! Repository roots known to the host and the backends that serve them.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::domain::errors::LinkError;
use crate::infra::git::{GixBackend, VcsBackend};

/// Maps repository roots to backends. Built once, then shared by reference across requests.
#[derive(Default)]
pub struct RepositoryCatalog {
    entries: Vec<(PathBuf, Box<dyn VcsBackend>)>,
}

impl RepositoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the repository containing each of `roots` with gix.
    pub fn discover(roots: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self::new();
        for root in roots {
            let backend = GixBackend::discover(root)?;
            catalog.insert(backend.root().to_path_buf(), Box::new(backend));
        }
        Ok(catalog)
    }

    /// Open the repository containing `file`, the only root known when the host names none.
    pub fn for_file(file: &Path) -> Result<Self, LinkError> {
        let start = file.parent().unwrap_or(file);
        let backend = GixBackend::discover(start).map_err(|err| {
            tracing::debug!("{err:#}");
            LinkError::NoRepositoryForFile {
                path: file.to_path_buf(),
            }
        })?;
        let mut catalog = Self::new();
        catalog.insert(backend.root().to_path_buf(), Box::new(backend));
        Ok(catalog)
    }

    /// Register `backend` for files under `root`. A root registered twice keeps the latest
    /// backend.
    pub fn insert(&mut self, root: impl Into<PathBuf>, backend: Box<dyn VcsBackend>) {
        let root = root.into();
        self.entries.retain(|(existing, _)| *existing != root);
        self.entries.push((root, backend));
    }

    /// Root of the repository governing `path`, if any.
    pub fn root_for(&self, path: &Path) -> Option<&Path> {
        self.governing(path).ok().map(|(root, _)| root)
    }

    /// Root and backend of the repository governing `path`: the root that is the longest
    /// prefix of it.
    pub fn governing(&self, path: &Path) -> Result<(&Path, &dyn VcsBackend), LinkError> {
        self.entries
            .iter()
            .filter(|(root, _)| path.starts_with(root))
            .max_by_key(|(root, _)| root.components().count())
            .map(|(root, backend)| (root.as_path(), &**backend))
            .ok_or_else(|| LinkError::NoRepositoryForFile {
                path: path.to_path_buf(),
            })
    }
}

/// `path` relative to `root`, `/`-separated as it appears in URLs and tree lookups.
pub fn repository_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if segments.is_empty() {
        return None;
    }
    Some(segments.join("/"))
}
