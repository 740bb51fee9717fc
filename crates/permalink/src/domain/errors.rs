//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::LineRange;

/// Failures that abort link generation. Each variant carries enough context to diagnose the
/// request without re-running it.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no active selection in {}: {detail}", path.display())]
    NoActiveSelection { path: PathBuf, detail: String },

    #[error("no git repository found for {}", path.display())]
    NoRepositoryForFile { path: PathBuf },

    #[error("selected lines {range} of {} contain no text", path.display())]
    EmptySelection { path: PathBuf, range: LineRange },

    #[error("repository at {} has no remotes configured", root.display())]
    NoRemotesConfigured { root: PathBuf },

    #[error("remote '{remote}' not found in {}", root.display())]
    UnknownRemote { remote: String, root: PathBuf },

    #[error("could not determine owner/repo from remote '{remote}' url '{url}'")]
    UnrecognizedRemoteFormat { remote: String, url: String },

    #[error("could not resolve {remote}/{branch} to a commit: {detail}")]
    RevisionResolutionFailed {
        remote: String,
        branch: String,
        detail: String,
    },

    #[error("'{path}' is not available at revision {revision}: {detail}")]
    RevisionFileUnavailable {
        revision: String,
        path: String,
        detail: String,
    },
}
