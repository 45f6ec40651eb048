#![doc = include_str!("../README.md")]

mod error;
pub mod parameters;
/// Residues, patterns, concrete sequences, modifications, and matching them against each other
pub mod sequence;
/// Sequence tags: exact segments separated by mass gaps, and matching them on protein sequences
pub mod tag;

pub use error::MotifError;

/// A subset of the types and traits that are envisioned to be used the most, importing this is a good starting point for working with the crate
pub mod prelude {
    pub use crate::MotifError;
    pub use crate::parameters::{
        GapStrategy, MatchingType, ParseJson, SequenceMatchingParameters,
    };
    pub use crate::sequence::{
        AminoAcid, CompiledMatcher, ConcreteSequence, MatchTarget, Modification,
        ModificationKind, ModificationLookup, ModificationMatch, ModificationTable,
        PositionalPattern, ResidueAlphabet, STANDARD_ALPHABET, SequencePosition,
    };
    pub use crate::tag::{GapModifications, Segment, Tag, TagComponent};
}
