use std::borrow::Cow;

use context_error::*;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    MotifError,
    parameters::MatchingType,
    sequence::{
        ConcreteSequence, MatchTarget, ModificationLookup, ModificationMatch, PositionalPattern,
        ResidueAlphabet, SequencePosition, Slot,
    },
};

/// A single element of a [`crate::tag::Tag`]
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TagComponent {
    /// A stretch of residues that is known exactly, or known as a set of options per position
    ExactSegment(Segment),
    /// An unresolved stretch of residues, only known by its total mass in Dalton
    MassGap(OrderedFloat<f64>),
}

/// The residues of an exact segment.
/// ```
/// use mztag::{sequence::{PositionalPattern, STANDARD_ALPHABET, ConcreteSequence}, tag::Segment};
/// let mut segment = Segment::from(ConcreteSequence::new("PEP", &STANDARD_ALPHABET).unwrap());
/// segment.append(&Segment::from(PositionalPattern::from_literal("[IL]K").unwrap()));
/// assert_eq!(segment.to_string(), "PEP[IL]K");
/// assert!(segment.as_sequence().is_none());
/// ```
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Segment {
    /// Residues known one by one, possibly modified
    Sequence(ConcreteSequence),
    /// A set of allowed residues per position, for example `[IL]` for residues that cannot be
    /// told apart. Pattern segments do not carry modifications.
    Pattern(PositionalPattern),
}

impl Segment {
    /// The number of residues
    pub fn len(&self) -> usize {
        match self {
            Self::Sequence(sequence) => sequence.len(),
            Self::Pattern(pattern) => pattern.len(),
        }
    }

    /// Check if there are no residues
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the concrete sequence, if this segment is one
    pub const fn as_sequence(&self) -> Option<&ConcreteSequence> {
        match self {
            Self::Sequence(sequence) => Some(sequence),
            Self::Pattern(_) => None,
        }
    }

    /// The residues as a pattern, a concrete sequence has a single residue per position
    pub fn as_pattern(&self) -> Cow<'_, PositionalPattern> {
        match self {
            Self::Sequence(sequence) => Cow::Owned(sequence.as_pattern()),
            Self::Pattern(pattern) => Cow::Borrowed(pattern),
        }
    }

    /// The modifications placed on this segment
    pub fn modifications(&self) -> &[ModificationMatch] {
        match self {
            Self::Sequence(sequence) => sequence.modifications(),
            Self::Pattern(_) => &[],
        }
    }

    /// The first modification at the given position
    pub fn modification_at(&self, position: SequencePosition) -> Option<&ModificationMatch> {
        self.modifications().iter().find(|m| m.position == position)
    }

    /// The mass of the residues and modifications. A pattern position counts with the lightest
    /// residue it allows.
    /// # Errors
    /// If a residue is not part of the alphabet, a modification cannot be resolved, or a pattern
    /// position is a wildcard.
    pub fn mass<L: ModificationLookup + ?Sized>(
        &self,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<f64, BoxedError<'static, MotifError>> {
        match self {
            Self::Sequence(sequence) => sequence.mass(alphabet, lookup),
            Self::Pattern(pattern) => {
                let mut mass = 0.0;
                for (index, set) in pattern.positions().iter().enumerate() {
                    if set.is_empty() {
                        return Err(BoxedError::new(
                            MotifError::InvalidPattern,
                            "Undefined mass",
                            format!("Position {index} is a wildcard which has no defined mass"),
                            Context::show(pattern.to_string()),
                        ));
                    }
                    let mut lightest = f64::INFINITY;
                    for code in set {
                        lightest = lightest.min(alphabet.mass(*code)?);
                    }
                    mass += lightest;
                }
                Ok(mass)
            }
        }
    }

    /// Add the residues of another segment at the C terminal side. Two concrete sequences stay
    /// a concrete sequence with the modifications shifted along, otherwise the result is a
    /// pattern and the modifications are lost.
    pub fn append(&mut self, other: &Self) {
        if let (Self::Sequence(sequence), Self::Sequence(other)) = (&mut *self, other) {
            sequence.append_c_term(other);
            return;
        }
        if !self.modifications().is_empty() || !other.modifications().is_empty() {
            tracing::warn!(
                segment = %self,
                other = %other,
                "modifications are dropped when merging into a pattern segment"
            );
        }
        let mut pattern = self.as_pattern().into_owned();
        pattern.append(&other.as_pattern());
        *self = Self::Pattern(pattern);
    }

    /// The segment read from the other side
    #[must_use]
    pub fn reverse(&self) -> Self {
        match self {
            Self::Sequence(sequence) => Self::Sequence(sequence.reverse()),
            Self::Pattern(pattern) => Self::Pattern(pattern.reverse()),
        }
    }

    /// Check if both segments match each other. Two concrete sequences are compared with
    /// [`ConcreteSequence::is_same_as`], otherwise the patterns are compared and neither side
    /// may carry modifications.
    /// # Errors
    /// If a residue is not part of the alphabet or a modification cannot be resolved.
    pub fn is_same_as<L: ModificationLookup + ?Sized>(
        &self,
        other: &Self,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        match (self, other) {
            (Self::Sequence(a), Self::Sequence(b)) => {
                a.is_same_as(b, matching_type, alphabet, lookup)
            }
            _ if !self.modifications().is_empty() || !other.modifications().is_empty() => {
                Ok(false)
            }
            _ => self
                .as_pattern()
                .is_same_as(&other.as_pattern(), matching_type, alphabet),
        }
    }

    /// Write the residues with the modifications on residues inline.
    pub(crate) fn fmt_residues(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        match self {
            Self::Sequence(sequence) => sequence.fmt_residues(f),
            Self::Pattern(pattern) => write!(f, "{pattern}"),
        }
    }
}

impl MatchTarget for Segment {
    fn slot_count(&self) -> usize {
        self.len()
    }
    fn slot(&self, index: usize) -> Option<Slot<'_>> {
        match self {
            Self::Sequence(sequence) => sequence.slot(index),
            Self::Pattern(pattern) => pattern.slot(index),
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequence(sequence) => write!(f, "{}", sequence.residues()),
            Self::Pattern(pattern) => write!(f, "{pattern}"),
        }
    }
}

impl From<ConcreteSequence> for Segment {
    fn from(value: ConcreteSequence) -> Self {
        Self::Sequence(value)
    }
}

impl From<PositionalPattern> for Segment {
    fn from(value: PositionalPattern) -> Self {
        Self::Pattern(value)
    }
}

impl TagComponent {
    /// The mass of this component, for an exact segment the residue and modification masses.
    /// # Errors
    /// If a residue is not part of the alphabet, a modification cannot be resolved, or a pattern
    /// segment has a wildcard.
    pub fn mass<L: ModificationLookup + ?Sized>(
        &self,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<f64, BoxedError<'static, MotifError>> {
        match self {
            Self::ExactSegment(segment) => segment.mass(alphabet, lookup),
            Self::MassGap(mass) => Ok(mass.0),
        }
    }

    /// The number of residues, a mass gap counts as a single residue.
    pub fn length_in_residues(&self) -> usize {
        match self {
            Self::ExactSegment(segment) => segment.len(),
            Self::MassGap(_) => 1,
        }
    }

    /// Get the exact segment, if this is one
    pub const fn as_exact(&self) -> Option<&Segment> {
        match self {
            Self::ExactSegment(segment) => Some(segment),
            Self::MassGap(_) => None,
        }
    }

    /// Get the gap mass, if this is a gap
    pub const fn as_gap(&self) -> Option<f64> {
        match self {
            Self::ExactSegment(_) => None,
            Self::MassGap(mass) => Some(mass.0),
        }
    }

    /// Check if both components are of the same kind and are the same. Exact segments are
    /// compared with [`Segment::is_same_as`], gaps should have the same mass.
    /// # Errors
    /// If a residue is not part of the alphabet or a modification cannot be resolved.
    pub fn is_same_as<L: ModificationLookup + ?Sized>(
        &self,
        other: &Self,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        match (self, other) {
            (Self::ExactSegment(a), Self::ExactSegment(b)) => {
                a.is_same_as(b, matching_type, alphabet, lookup)
            }
            (Self::MassGap(a), Self::MassGap(b)) => Ok(a == b),
            _ => Ok(false),
        }
    }
}

impl std::fmt::Display for TagComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExactSegment(segment) => write!(f, "{segment}"),
            Self::MassGap(mass) => write!(f, "<{:.2}>", mass.0),
        }
    }
}

impl From<Segment> for TagComponent {
    fn from(value: Segment) -> Self {
        Self::ExactSegment(value)
    }
}

impl From<ConcreteSequence> for TagComponent {
    fn from(value: ConcreteSequence) -> Self {
        Self::ExactSegment(Segment::Sequence(value))
    }
}

impl From<PositionalPattern> for TagComponent {
    fn from(value: PositionalPattern) -> Self {
        Self::ExactSegment(Segment::Pattern(value))
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::sequence::{ModificationTable, STANDARD_ALPHABET};

    #[test]
    fn pattern_segments() {
        let a = &*STANDARD_ALPHABET;
        let table = ModificationTable::new();
        let pattern = Segment::from(PositionalPattern::from_literal("[IL][KR]").unwrap());
        let mass = pattern.mass(a, &table).unwrap();
        let expected = a.mass('L').unwrap() + a.mass('K').unwrap();
        assert!((mass - expected).abs() < 1e-9);
        assert_eq!(pattern.len(), 2);
        assert!(pattern.modifications().is_empty());
        assert_eq!(pattern.reverse().to_string(), "[KR][IL]");

        let sequence = Segment::from(ConcreteSequence::new("LR", a).unwrap());
        assert!(
            pattern
                .is_same_as(&sequence, MatchingType::Strict, a, &table)
                .unwrap()
        );
        let modified = Segment::from(
            ConcreteSequence::new("LR", a)
                .unwrap()
                .with_modification("Oxidation", SequencePosition::Index(0))
                .unwrap(),
        );
        assert!(
            !modified
                .is_same_as(&pattern, MatchingType::Strict, a, &table)
                .unwrap()
        );

        let wildcard = Segment::from(PositionalPattern::from_literal("K[]").unwrap());
        assert!(matches!(
            wildcard.mass(a, &table).unwrap_err().get_kind(),
            MotifError::InvalidPattern
        ));
    }

    #[test]
    fn appending() {
        let a = &*STANDARD_ALPHABET;
        let mut segment = Segment::from(ConcreteSequence::new("PE", a).unwrap());
        segment.append(&Segment::from(ConcreteSequence::new("P", a).unwrap()));
        assert_eq!(segment.as_sequence().unwrap().residues(), "PEP");
        segment.append(&Segment::from(PositionalPattern::from_literal("[DE]").unwrap()));
        assert_eq!(
            segment,
            Segment::Pattern(PositionalPattern::from_literal("PEP[DE]").unwrap())
        );
        assert_eq!(TagComponent::from(segment).length_in_residues(), 4);
    }
}
