//! Positions on a sequence and all index arithmetic used when sequences and patterns are edited

use serde::{Deserialize, Serialize};

use crate::parameters::{ParseJson, use_serde};

/// A position on a sequence
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize,
)]
pub enum SequencePosition {
    /// N-terminal
    NTerm,
    /// A residue at the given index (0 based)
    Index(usize),
    /// C-terminal
    CTerm,
}

impl Default for SequencePosition {
    fn default() -> Self {
        Self::Index(0)
    }
}

impl std::fmt::Display for SequencePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NTerm => write!(f, "N-terminal"),
            Self::Index(index) => write!(f, "{index}"),
            Self::CTerm => write!(f, "C-terminal"),
        }
    }
}

/// Shift an index that lies at or after `from` by `by` places, indices before `from` are untouched.
pub const fn shift_index(index: usize, from: usize, by: usize) -> usize {
    if index >= from { index + by } else { index }
}

/// The index that `index` ends up at when a sequence of `length` is reversed.
pub const fn mirror_index(index: usize, length: usize) -> usize {
    length.saturating_sub(index + 1)
}

impl SequencePosition {
    /// Reverse this position, if the sequence would be reversed what would this location be in that reversed sequence.
    #[must_use]
    pub const fn reverse(self, sequence_length: usize) -> Self {
        match self {
            Self::NTerm => Self::CTerm,
            Self::Index(i) => Self::Index(mirror_index(i, sequence_length)),
            Self::CTerm => Self::NTerm,
        }
    }

    /// Make room for an insertion of `inserted` residues at index `offset` of a sequence of
    /// `length` residues. Residue positions at or after the insertion point move along. A
    /// terminal position that is covered by the insertion is pinned to the residue it was next to.
    #[must_use]
    pub const fn shift_for_insertion(self, offset: usize, inserted: usize, length: usize) -> Self {
        match self {
            Self::Index(i) => Self::Index(shift_index(i, offset, inserted)),
            Self::NTerm if offset == 0 && inserted > 0 && length > 0 => Self::Index(inserted),
            Self::CTerm if offset == length && inserted > 0 && length > 0 => {
                Self::Index(length - 1)
            }
            n => n,
        }
    }

    /// Re-base a position of a fragment of `fragment_length` residues that is placed at `offset`
    /// in a sequence of `total_length` residues. A terminal position that is no longer on the
    /// terminus of the full sequence is pinned to the first or last residue of the fragment.
    #[must_use]
    pub const fn rebase(self, offset: usize, fragment_length: usize, total_length: usize) -> Self {
        match self {
            Self::Index(i) => Self::Index(i + offset),
            Self::NTerm if offset > 0 && fragment_length > 0 => Self::Index(offset),
            Self::CTerm if offset + fragment_length < total_length && fragment_length > 0 => {
                Self::Index(offset + fragment_length - 1)
            }
            n => n,
        }
    }

    /// The 1 based site on a sequence of the given length, where the N terminus is site 1 and the
    /// C terminus is the last site.
    pub const fn site(self, sequence_length: usize) -> usize {
        match self {
            Self::NTerm => 1,
            Self::Index(i) => i + 1,
            Self::CTerm => sequence_length,
        }
    }
}

impl ParseJson for SequencePosition {
    fn from_json_value(
        value: serde_json::Value,
    ) -> Result<Self, context_error::BoxedError<'static, crate::MotifError>> {
        use_serde(value)
    }
}
