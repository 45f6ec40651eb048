use std::collections::BTreeMap;

use context_error::*;
use itertools::{Either, Itertools};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thin_vec::ThinVec;

use crate::{
    MotifError,
    parameters::MatchingType,
    sequence::{
        MatchTarget, ModificationLookup, ModificationMatch, PositionalPattern, ResidueAlphabet,
        SequencePosition, Slot, alphabet::unknown_residue,
    },
};

/// A sequence of residues with modifications placed on it. Modification positions are always
/// expressed in the current indexing of the residues, every edit shifts them along.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ConcreteSequence {
    residues: String,
    modifications: ThinVec<ModificationMatch>,
}

impl ConcreteSequence {
    /// Create a sequence from residue codes, these are stored in uppercase.
    /// # Errors
    /// If any residue is not part of the alphabet.
    pub fn new(text: &str, alphabet: &ResidueAlphabet) -> Result<Self, BoxedError<'static, MotifError>> {
        for (offset, c) in text.char_indices() {
            if !alphabet.contains(c) {
                return Err(unknown_residue(c).replace_context(
                    Context::line(None, text, offset, c.len_utf8()).to_owned(),
                ));
            }
        }
        Ok(Self {
            residues: text.to_ascii_uppercase(),
            modifications: ThinVec::new(),
        })
    }

    /// The residue codes
    pub fn residues(&self) -> &str {
        &self.residues
    }

    /// The number of residues
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Check if there are no residues
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// All modifications
    pub fn modifications(&self) -> &[ModificationMatch] {
        &self.modifications
    }

    /// The modifications at the given position
    pub fn modifications_at(
        &self,
        position: SequencePosition,
    ) -> impl Iterator<Item = &ModificationMatch> {
        self.modifications
            .iter()
            .filter(move |m| m.position == position)
    }

    /// Place a modification on this sequence.
    /// # Errors
    /// If the position is a residue index outside of this sequence.
    pub fn add_modification(
        &mut self,
        name: impl Into<String>,
        position: SequencePosition,
    ) -> Result<(), BoxedError<'static, MotifError>> {
        match position {
            SequencePosition::Index(index) if index >= self.len() => {
                return Err(BoxedError::new(
                    MotifError::InvalidPosition,
                    "Invalid modification position",
                    format!(
                        "Index {index} is outside of the sequence of length {}",
                        self.len()
                    ),
                    Context::show(self.residues.clone()),
                ));
            }
            _ => (),
        }
        self.modifications.push(ModificationMatch::new(name, position));
        Ok(())
    }

    /// Place a modification on this sequence, see [`Self::add_modification`].
    /// # Errors
    /// If the position is a residue index outside of this sequence.
    pub fn with_modification(
        mut self,
        name: impl Into<String>,
        position: SequencePosition,
    ) -> Result<Self, BoxedError<'static, MotifError>> {
        self.add_modification(name, position)?;
        Ok(self)
    }

    /// The monoisotopic mass of the residues plus all modifications (without water).
    /// # Errors
    /// If a residue is not part of the alphabet or a modification cannot be resolved.
    pub fn mass<L: ModificationLookup + ?Sized>(
        &self,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<f64, BoxedError<'static, MotifError>> {
        let mut mass = 0.0;
        for residue in self.residues.chars() {
            mass += alphabet.mass(residue)?;
        }
        for modification in &self.modifications {
            mass += lookup.get(&modification.name)?.mass;
        }
        Ok(mass)
    }

    /// The lowest possible residue mass of a sequence, combination codes count with their
    /// lightest sub-residue.
    /// # Errors
    /// If a residue is not part of the alphabet.
    pub fn minimal_mass(
        text: &str,
        alphabet: &ResidueAlphabet,
    ) -> Result<f64, BoxedError<'static, MotifError>> {
        let mut mass = 0.0;
        for code in text.chars() {
            let residue = alphabet.residue(code)?;
            if residue.is_combination() {
                let mut lightest = f64::INFINITY;
                for sub in &residue.sub_residues {
                    lightest = lightest.min(alphabet.mass(*sub)?);
                }
                mass += if lightest.is_finite() {
                    lightest
                } else {
                    residue.mass
                };
            } else {
                mass += residue.mass;
            }
        }
        Ok(mass)
    }

    /// Check if any of the residues is a combination code.
    /// # Errors
    /// If a residue is not part of the alphabet.
    pub fn has_combination(
        &self,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        for residue in self.residues.chars() {
            if alphabet.is_combination(residue)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Insert another sequence at the given residue offset. The modifications of this sequence
    /// at or after the offset are moved along, the modifications of the other sequence are placed
    /// relative to the offset. Terminal modifications that end up inside the sequence are pinned
    /// to the residue they were next to.
    /// # Errors
    /// If the offset lies beyond the end of this sequence.
    pub fn insert(
        &mut self,
        offset: usize,
        other: &Self,
    ) -> Result<(), BoxedError<'static, MotifError>> {
        if offset > self.len() {
            return Err(BoxedError::new(
                MotifError::InvalidPosition,
                "Invalid insertion offset",
                format!(
                    "Offset {offset} is outside of the sequence of length {}",
                    self.len()
                ),
                Context::show(self.residues.clone()),
            ));
        }
        self.splice(offset, other);
        Ok(())
    }

    /// Add another sequence on the C terminal side of this sequence.
    pub fn append_c_term(&mut self, other: &Self) {
        self.splice(self.len(), other);
    }

    /// Add another sequence on the N terminal side of this sequence.
    pub fn append_n_term(&mut self, other: &Self) {
        self.splice(0, other);
    }

    /// The offset has to be within `0..=len`.
    fn splice(&mut self, offset: usize, other: &Self) {
        let length = self.len();
        let inserted = other.len();
        let total = length + inserted;
        for modification in &mut self.modifications {
            modification.position = modification
                .position
                .shift_for_insertion(offset, inserted, length);
        }
        self.modifications
            .extend(other.modifications.iter().map(|m| ModificationMatch {
                name: m.name.clone(),
                position: m.position.rebase(offset, inserted, total),
            }));
        self.residues.insert_str(offset, &other.residues);
    }

    /// All sequences that result from replacing every combination code with each of its
    /// sub-residues, in order. The modifications are carried over to every expansion. The
    /// expansions are generated lazily, every call starts anew.
    /// # Errors
    /// If a residue is not part of the alphabet.
    pub fn ambiguity_expansions(
        &self,
        alphabet: &ResidueAlphabet,
    ) -> Result<impl Iterator<Item = Self> + use<>, BoxedError<'static, MotifError>> {
        if self.is_empty() {
            return Ok(Either::Left(std::iter::once(self.clone())));
        }
        let choices = self
            .residues
            .chars()
            .map(|c| {
                alphabet
                    .sub_residues(c)
                    .map(|set| set.iter().copied().collect_vec())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let modifications = self.modifications.clone();
        Ok(Either::Right(
            choices
                .into_iter()
                .multi_cartesian_product()
                .map(move |residues| Self {
                    residues: residues.into_iter().collect(),
                    modifications: modifications.clone(),
                }),
        ))
    }

    /// The reversed sequence, modification positions are mirrored.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let length = self.len();
        Self {
            residues: self.residues.chars().rev().collect(),
            modifications: self
                .modifications
                .iter()
                .map(|m| ModificationMatch {
                    name: m.name.clone(),
                    position: m.position.reverse(length),
                })
                .collect(),
        }
    }

    /// A pattern with the residues of this sequence as single residue positions.
    pub fn as_pattern(&self) -> PositionalPattern {
        let mut pattern = PositionalPattern::new();
        for (index, residue) in self.residues.chars().enumerate() {
            pattern.set_targeted(index, [residue]);
        }
        pattern
    }

    /// Check if the other sequence has matching residues and carries modifications with the same
    /// masses at the same positions.
    /// # Errors
    /// If a residue is not part of the alphabet or a modification cannot be resolved.
    pub fn is_same_as<L: ModificationLookup + ?Sized>(
        &self,
        other: &Self,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        if !self.as_pattern().matches(other, matching_type, alphabet)? {
            return Ok(false);
        }
        Ok(self.modification_masses(lookup)? == other.modification_masses(lookup)?)
    }

    fn modification_masses<L: ModificationLookup + ?Sized>(
        &self,
        lookup: &L,
    ) -> Result<BTreeMap<SequencePosition, Vec<OrderedFloat<f64>>>, BoxedError<'static, MotifError>>
    {
        let mut masses: BTreeMap<SequencePosition, Vec<OrderedFloat<f64>>> = BTreeMap::new();
        for modification in &self.modifications {
            masses
                .entry(modification.position)
                .or_default()
                .push(OrderedFloat(lookup.get(&modification.name)?.mass));
        }
        for list in masses.values_mut() {
            list.sort_unstable();
        }
        Ok(masses)
    }

    /// Write the residues with the modifications on residues inline as `X[name]`.
    pub(crate) fn fmt_residues(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        for (index, residue) in self.residues.chars().enumerate() {
            write!(f, "{residue}")?;
            for modification in self.modifications_at(SequencePosition::Index(index)) {
                write!(f, "[{}]", modification.name)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ConcreteSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for modification in self.modifications_at(SequencePosition::NTerm) {
            write!(f, "[{}]-", modification.name)?;
        }
        self.fmt_residues(f)?;
        for modification in self.modifications_at(SequencePosition::CTerm) {
            write!(f, "-[{}]", modification.name)?;
        }
        Ok(())
    }
}

impl MatchTarget for ConcreteSequence {
    fn slot_count(&self) -> usize {
        self.residues.slot_count()
    }
    fn slot(&self, index: usize) -> Option<Slot<'_>> {
        self.residues.slot(index)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::sequence::{
        Modification, ModificationKind, ModificationTable, STANDARD_ALPHABET,
    };

    fn table() -> ModificationTable {
        ModificationTable::new()
            .with(Modification::new(
                "Oxidation",
                15.994_915,
                PositionalPattern::from_literal("M").unwrap(),
                ModificationKind::Residue,
            ))
            .with(Modification::new(
                "Acetyl",
                42.010_565,
                PositionalPattern::new(),
                ModificationKind::NTerm,
            ))
            .with(Modification::new(
                "Amidated",
                -0.984_016,
                PositionalPattern::new(),
                ModificationKind::CTerm,
            ))
    }

    #[test]
    fn new_validates() {
        let sequence = ConcreteSequence::new("pepTIDE", &STANDARD_ALPHABET).unwrap();
        assert_eq!(sequence.residues(), "PEPTIDE");
        assert!(matches!(
            ConcreteSequence::new("PEP1", &STANDARD_ALPHABET)
                .unwrap_err()
                .get_kind(),
            MotifError::UnknownResidue
        ));
    }

    #[test]
    fn mass() {
        let sequence = ConcreteSequence::new("GAM", &STANDARD_ALPHABET)
            .unwrap()
            .with_modification("Oxidation", SequencePosition::Index(2))
            .unwrap();
        let expected = 57.021_464 + 71.037_114 + 131.040_485 + 15.994_915;
        assert!((sequence.mass(&STANDARD_ALPHABET, &table()).unwrap() - expected).abs() < 1e-9);
        let unknown = sequence
            .with_modification("Phospho", SequencePosition::Index(0))
            .unwrap();
        assert!(unknown.mass(&STANDARD_ALPHABET, &table()).is_err());
    }

    #[test]
    fn out_of_range_modification() {
        let mut sequence = ConcreteSequence::new("GA", &STANDARD_ALPHABET).unwrap();
        assert!(
            sequence
                .add_modification("Oxidation", SequencePosition::Index(2))
                .is_err()
        );
        assert!(
            sequence
                .add_modification("Amidated", SequencePosition::CTerm)
                .is_ok()
        );
    }

    #[test]
    fn append_shifts_modifications() {
        let mut first = ConcreteSequence::new("MAK", &STANDARD_ALPHABET)
            .unwrap()
            .with_modification("Oxidation", SequencePosition::Index(0))
            .unwrap()
            .with_modification("Amidated", SequencePosition::CTerm)
            .unwrap();
        let second = ConcreteSequence::new("GM", &STANDARD_ALPHABET)
            .unwrap()
            .with_modification("Oxidation", SequencePosition::Index(1))
            .unwrap()
            .with_modification("Acetyl", SequencePosition::NTerm)
            .unwrap();
        first.append_c_term(&second);
        assert_eq!(first.residues(), "MAKGM");
        assert_eq!(
            first.modifications().iter().map(|m| m.position).collect_vec(),
            vec![
                SequencePosition::Index(0),
                SequencePosition::Index(2),
                SequencePosition::Index(4),
                SequencePosition::Index(3),
            ]
        );

        let mut third = ConcreteSequence::new("PE", &STANDARD_ALPHABET)
            .unwrap()
            .with_modification("Acetyl", SequencePosition::NTerm)
            .unwrap();
        third.append_n_term(&second);
        assert_eq!(third.residues(), "GMPE");
        assert_eq!(
            third.modifications().iter().map(|m| m.position).collect_vec(),
            vec![
                SequencePosition::Index(2),
                SequencePosition::Index(1),
                SequencePosition::NTerm,
            ]
        );
    }

    #[test]
    fn insert_in_the_middle() {
        let mut sequence = ConcreteSequence::new("AAMM", &STANDARD_ALPHABET)
            .unwrap()
            .with_modification("Oxidation", SequencePosition::Index(1))
            .unwrap()
            .with_modification("Oxidation", SequencePosition::Index(2))
            .unwrap();
        let insert = ConcreteSequence::new("GM", &STANDARD_ALPHABET)
            .unwrap()
            .with_modification("Oxidation", SequencePosition::Index(1))
            .unwrap();
        sequence.insert(2, &insert).unwrap();
        assert_eq!(sequence.residues(), "AAGMMM");
        assert_eq!(
            sequence.modifications().iter().map(|m| m.position).collect_vec(),
            vec![
                SequencePosition::Index(1),
                SequencePosition::Index(4),
                SequencePosition::Index(3),
            ]
        );
        assert!(sequence.insert(7, &insert).is_err());
    }

    #[test]
    fn expansions() {
        let sequence = ConcreteSequence::new("BAJ", &STANDARD_ALPHABET).unwrap();
        let expanded = sequence
            .ambiguity_expansions(&STANDARD_ALPHABET)
            .unwrap()
            .map(|s| s.residues().to_string())
            .collect_vec();
        assert_eq!(expanded, vec!["DAI", "DAL", "NAI", "NAL"]);
        // Every call starts anew
        assert_eq!(
            sequence
                .ambiguity_expansions(&STANDARD_ALPHABET)
                .unwrap()
                .count(),
            4
        );
        assert_eq!(
            ConcreteSequence::default()
                .ambiguity_expansions(&STANDARD_ALPHABET)
                .unwrap()
                .count(),
            1
        );
        assert!(sequence.has_combination(&STANDARD_ALPHABET).unwrap());
    }

    #[test]
    fn minimal_mass() {
        let mass = ConcreteSequence::minimal_mass("BZG", &STANDARD_ALPHABET).unwrap();
        assert!((mass - (114.042_927 + 128.058_578 + 57.021_464)).abs() < 1e-9);
        assert!(ConcreteSequence::minimal_mass("B?", &STANDARD_ALPHABET).is_err());
    }

    #[test]
    fn reverse_and_compare() {
        let sequence = ConcreteSequence::new("MAK", &STANDARD_ALPHABET)
            .unwrap()
            .with_modification("Oxidation", SequencePosition::Index(0))
            .unwrap()
            .with_modification("Acetyl", SequencePosition::NTerm)
            .unwrap();
        let reversed = sequence.reverse();
        assert_eq!(reversed.residues(), "KAM");
        assert_eq!(
            reversed.modifications()[0].position,
            SequencePosition::Index(2)
        );
        assert_eq!(reversed.modifications()[1].position, SequencePosition::CTerm);
        assert_eq!(reversed.to_string(), "KAM[Oxidation]-[Acetyl]");
        assert_eq!(sequence.to_string(), "[Acetyl]-M[Oxidation]AK");
        assert!(
            sequence
                .is_same_as(
                    &reversed.reverse(),
                    MatchingType::Strict,
                    &STANDARD_ALPHABET,
                    &table()
                )
                .unwrap()
        );
        assert!(
            !sequence
                .is_same_as(
                    &ConcreteSequence::new("MAK", &STANDARD_ALPHABET).unwrap(),
                    MatchingType::Strict,
                    &STANDARD_ALPHABET,
                    &table()
                )
                .unwrap()
        );
    }
}
