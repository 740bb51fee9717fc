//! Finding a snippet inside a historical revision of a file.

use crate::domain::errors::LinkError;
use crate::domain::model::{LineRange, Selection};
use crate::infra::git::VcsBackend;

pub struct SnippetLocator<'a> {
    backend: &'a dyn VcsBackend,
}

impl<'a> SnippetLocator<'a> {
    pub fn new(backend: &'a dyn VcsBackend) -> Self {
        Self { backend }
    }

    /// Every line range of `path` at `revision` that holds `selection`, in file order.
    pub fn locate(
        &self,
        revision: &str,
        path: &str,
        selection: &Selection,
    ) -> Result<Vec<LineRange>, LinkError> {
        let contents = self.backend.file_at(revision, path).map_err(|err| {
            LinkError::RevisionFileUnavailable {
                revision: revision.to_string(),
                path: path.to_string(),
                detail: format!("{err:#}"),
            }
        })?;
        let candidates = find_selection(&contents, selection);
        tracing::debug!(%revision, %path, count = candidates.len(), "located snippet candidates");
        Ok(candidates)
    }
}

/// Candidates for the selection's snippet, widened again by the blank lines trimmed off its
/// edges and clamped to the file.
pub fn find_selection(contents: &str, selection: &Selection) -> Vec<LineRange> {
    let last_line = contents.lines().count();
    find_candidates(contents, &selection.snippet)
        .into_iter()
        .map(|found| {
            LineRange::new(
                found.start.saturating_sub(selection.leading_blank),
                (found.end + selection.trailing_blank).min(last_line),
            )
        })
        .collect()
}

/// Slide a window as tall as the snippet over `contents` and keep each window whose joined
/// text contains the joined snippet.
///
/// Containment rather than equality lets an edge-trimmed snippet match lines that still carry
/// their indentation. An empty snippet matches nothing.
pub fn find_candidates(contents: &str, snippet: &str) -> Vec<LineRange> {
    let needle: Vec<&str> = snippet.lines().collect();
    let lines: Vec<&str> = contents.lines().collect();
    if needle.is_empty() || needle.len() > lines.len() {
        return Vec::new();
    }

    let height = needle.len();
    let needle = needle.join("\n");
    lines
        .windows(height)
        .enumerate()
        .filter(|(_, window)| window.join("\n").contains(&needle))
        .map(|(offset, _)| LineRange::new(offset + 1, offset + height))
        .collect()
}
