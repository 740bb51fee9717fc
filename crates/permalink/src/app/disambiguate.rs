//! Picking one located range for a selection.

use serde::Serialize;

use crate::domain::model::LineRange;

/// How the final range was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Placement {
    /// The snippet occurs exactly once at the revision.
    Unique,
    /// The snippet recurs; the occurrence nearest the selection was taken.
    Closest { candidates: usize },
    /// The snippet was not found; the live-buffer lines are used as-is and may be off.
    Unverified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocatedRange {
    pub range: LineRange,
    pub placement: Placement,
}

impl LocatedRange {
    pub fn is_verified(&self) -> bool {
        self.placement != Placement::Unverified
    }
}

/// Choose among `candidates` for a selection at `selection`.
///
/// Recurring snippets resolve to the candidate whose start line is nearest the selection's
/// start. That assumes nearby edits, so heavily reordered files can pick the wrong occurrence.
/// Equal distances go to the earlier candidate; callers should not rely on that.
pub fn disambiguate(candidates: &[LineRange], selection: LineRange) -> LocatedRange {
    match candidates {
        [] => LocatedRange {
            range: selection,
            placement: Placement::Unverified,
        },
        [only] => LocatedRange {
            range: *only,
            placement: Placement::Unique,
        },
        many => {
            let nearest = many
                .iter()
                .min_by_key(|candidate| candidate.start.abs_diff(selection.start))
                .copied()
                .unwrap_or(selection);
            LocatedRange {
                range: nearest,
                placement: Placement::Closest {
                    candidates: many.len(),
                },
            }
        }
    }
}
