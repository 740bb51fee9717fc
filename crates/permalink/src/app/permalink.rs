//! Producing a permanent link for a working-copy selection.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::app::disambiguate::{Placement, disambiguate};
use crate::app::link::{build_url, coordinates};
use crate::app::locate::SnippetLocator;
use crate::app::remotes::RemoteCatalog;
use crate::app::revision::{CanonicalRevision, RevisionResolver};
use crate::app::workspace::{RepositoryCatalog, repository_path};
use crate::domain::errors::LinkError;
use crate::domain::model::{LineRange, Remote, ResolvedLink, Selection};
use crate::infra::config::Config;

/// What the host hands over for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    /// Absolute path of the file in the working copy.
    pub path: PathBuf,
    /// Selected lines. `None` links the whole file.
    pub range: Option<LineRange>,
    /// Exact selected text. When absent the selected lines are read from `path`.
    pub text: Option<String>,
}

impl LinkRequest {
    pub fn new(path: impl Into<PathBuf>, range: Option<LineRange>) -> Self {
        Self {
            path: path.into(),
            range,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Everything learned while producing a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOutcome {
    pub url: String,
    pub link: ResolvedLink,
    pub remote: Remote,
    pub revision: CanonicalRevision,
    /// `None` for whole-file links.
    pub placement: Option<Placement>,
}

impl LinkOutcome {
    /// False when the selection could not be found at the revision and the live line numbers
    /// were used instead.
    pub fn is_verified(&self) -> bool {
        self.placement != Some(Placement::Unverified)
    }
}

/// Runs one request at a time against a shared [`RepositoryCatalog`].
pub struct LinkService<'a> {
    catalog: &'a RepositoryCatalog,
    config: &'a Config,
}

impl<'a> LinkService<'a> {
    pub fn new(catalog: &'a RepositoryCatalog, config: &'a Config) -> Self {
        Self { catalog, config }
    }

    pub fn produce(&self, request: &LinkRequest) -> Result<LinkOutcome, LinkError> {
        let (root, backend) = self.catalog.governing(&request.path)?;
        let path = repository_path(root, &request.path).ok_or_else(|| {
            LinkError::NoRepositoryForFile {
                path: request.path.clone(),
            }
        })?;

        let selection = request
            .range
            .map(|range| read_selection(request, range))
            .transpose()?;

        let remote = RemoteCatalog::new(backend, self.config.remotes.preferred())
            .select(self.config.remotes.pinned())?;
        let coordinates = coordinates(&remote, &self.config.link.hosts())?;

        let revision = RevisionResolver::new(
            backend,
            self.config.branches.conventional(),
            self.config.branches.fallback(),
        )
        .with_remote_query(self.config.branches.query_remote())
        .resolve(&remote)?;

        let located = match &selection {
            Some(selection) => {
                let candidates =
                    SnippetLocator::new(backend).locate(&revision.commit, &path, selection)?;
                Some(disambiguate(&candidates, selection.range))
            }
            None => None,
        };
        if let Some(located) = located {
            tracing::debug!(
                selected = %located.range,
                placement = ?located.placement,
                "placed selection"
            );
        }

        let link = ResolvedLink {
            coordinates,
            commit: revision.commit.clone(),
            path,
            range: located.map(|located| located.range),
        };
        let url = build_url(&link);
        tracing::info!(%url, "built link");

        Ok(LinkOutcome {
            url,
            link,
            remote,
            revision,
            placement: located.map(|located| located.placement),
        })
    }
}

fn read_selection(request: &LinkRequest, range: LineRange) -> Result<Selection, LinkError> {
    let selection = match &request.text {
        Some(text) => Selection::from_text(range, text),
        None => {
            let buffer = fs::read_to_string(&request.path).map_err(|err| {
                LinkError::NoActiveSelection {
                    path: request.path.clone(),
                    detail: format!("failed to read working copy: {err}"),
                }
            })?;
            Selection::from_buffer(range, &buffer).map_err(|line_count| {
                LinkError::NoActiveSelection {
                    path: request.path.clone(),
                    detail: format!("lines {range} lie outside the file ({line_count} lines)"),
                }
            })?
        }
    };
    selection.ok_or_else(|| LinkError::EmptySelection {
        path: request.path.clone(),
        range,
    })
}
