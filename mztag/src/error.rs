//! The [`MotifError`] which makes it easy for downstream users of the error type to match on the exact error.

use context_error::ErrorKind;

/// The kind of error returned by all fallible operations in this crate. The absence of a match
/// is never an error, it is returned as `None` or as an empty list.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum MotifError {
    /// A pattern literal is structurally invalid, for example unbalanced brackets
    #[default]
    InvalidPattern,
    /// A residue code could not be resolved in the residue alphabet
    UnknownResidue,
    /// A modification name could not be resolved in the modification lookup
    UnknownModification,
    /// A position or index was outside of the valid range for the operation
    InvalidPosition,
    /// Matching parameters could not be read
    InvalidParameters,
}

impl ErrorKind for MotifError {
    type Settings = ();
    fn descriptor(&self) -> &'static str {
        "error"
    }
    fn ignored(&self, _settings: Self::Settings) -> bool {
        false
    }
    fn is_error(&self, _settings: Self::Settings) -> bool {
        true
    }
}
