//! Matching of patterns against sequences and other patterns

use std::collections::BTreeSet;

use context_error::*;
use itertools::Itertools;
use regex::Regex;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::{
    MotifError,
    parameters::MatchingType,
    sequence::{PositionalPattern, ResidueAlphabet},
};

/// A single slot of something a pattern can be matched against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Slot<'a> {
    /// A single residue
    Residue(char),
    /// A set of residues of which any can be present, an empty set means any residue
    Set(&'a BTreeSet<char>),
}

/// Anything a [`PositionalPattern`] can be matched against, sequences as well as other patterns.
pub trait MatchTarget {
    /// The number of slots
    fn slot_count(&self) -> usize;
    /// The slot at the given index, `None` if the index is out of range
    fn slot(&self, index: usize) -> Option<Slot<'_>>;
}

impl MatchTarget for str {
    fn slot_count(&self) -> usize {
        self.len()
    }
    fn slot(&self, index: usize) -> Option<Slot<'_>> {
        self.as_bytes().get(index).map(|b| Slot::Residue(char::from(*b)))
    }
}

impl MatchTarget for String {
    fn slot_count(&self) -> usize {
        self.as_str().slot_count()
    }
    fn slot(&self, index: usize) -> Option<Slot<'_>> {
        self.as_str().slot(index)
    }
}

impl MatchTarget for PositionalPattern {
    fn slot_count(&self) -> usize {
        self.len()
    }
    fn slot(&self, index: usize) -> Option<Slot<'_>> {
        self.positions.get(index).map(Slot::Set)
    }
}

impl<T: MatchTarget + ?Sized> MatchTarget for &T {
    fn slot_count(&self) -> usize {
        (**self).slot_count()
    }
    fn slot(&self, index: usize) -> Option<Slot<'_>> {
        (**self).slot(index)
    }
}

/// A pattern compiled into a case insensitive regular expression with a character class per
/// position. This is only valid for the pattern and matching type it was compiled from.
#[derive(Clone, Debug)]
pub struct CompiledMatcher {
    regex: Regex,
    length: usize,
    matching_type: MatchingType,
}

impl CompiledMatcher {
    /// The matching type this matcher was compiled for
    pub const fn matching_type(&self) -> MatchingType {
        self.matching_type
    }

    /// The number of residues matched
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Check if this matches the empty sequence only
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The underlying regular expression
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Check if the pattern occurs anywhere in the target
    pub fn is_match(&self, target: &str) -> bool {
        self.regex.is_match(target)
    }

    /// The 0 based index of the first occurrence at or after `from`
    pub fn first_index(&self, target: &str, from: usize) -> Option<usize> {
        if from > target.len() || !target.is_char_boundary(from) {
            return None;
        }
        self.regex.find_at(target, from).map(|m| m.start())
    }

    /// The 1 based indices of all, possibly overlapping, occurrences
    pub fn indexes(&self, target: &str) -> Vec<usize> {
        let mut result = Vec::new();
        let mut from = 0;
        while let Some(index) = self.first_index(target, from) {
            result.push(index + 1);
            from = index + target[index..].chars().next().map_or(1, char::len_utf8);
        }
        result
    }
}

impl std::fmt::Display for CompiledMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.regex)
    }
}

impl PositionalPattern {
    /// Check if a residue is allowed at a position of this pattern. A wildcard position allows any
    /// residue of the alphabet, a position outside of the pattern allows nothing.
    /// # Errors
    /// If the residue or any of the residues at this position are not part of the alphabet, this
    /// is checked for wildcard positions as well.
    pub fn is_targeted(
        &self,
        residue: char,
        position: usize,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        let Some(set) = self.positions.get(position) else {
            return Ok(false);
        };
        if set.is_empty() {
            alphabet.residue(residue)?;
            return Ok(true);
        }
        for code in set {
            if alphabet.is_compatible(*code, residue, matching_type)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn slot_matches(
        &self,
        slot: Slot<'_>,
        position: usize,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        match slot {
            Slot::Residue(residue) => self.is_targeted(residue, position, matching_type, alphabet),
            Slot::Set(set) if set.is_empty() => Ok(true),
            Slot::Set(set) => {
                let mut targeted = false;
                for residue in set {
                    targeted |= self.is_targeted(*residue, position, matching_type, alphabet)?;
                }
                Ok(targeted)
            }
        }
    }

    /// Check if the full pattern matches the target at the given offset.
    fn window_matches<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        offset: usize,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        for position in 0..self.len() {
            let Some(slot) = target.slot(offset + position) else {
                return Ok(false);
            };
            if !self.slot_matches(slot, position, matching_type, alphabet)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Find the first 0 based index at or after `from` where this pattern matches the target.
    /// `Ok(None)` if the pattern does not occur.
    /// # Errors
    /// If a residue code in the pattern or the target is not part of the alphabet.
    pub fn first_index<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        matching_type: MatchingType,
        from: usize,
        alphabet: &ResidueAlphabet,
    ) -> Result<Option<usize>, BoxedError<'static, MotifError>> {
        let Some(last) = target.slot_count().checked_sub(self.len()) else {
            return Ok(None);
        };
        for offset in from..=last {
            if self.window_matches(target, offset, matching_type, alphabet)? {
                return Ok(Some(offset));
            }
        }
        Ok(None)
    }

    /// All 1 based indices where this pattern matches the target, overlapping matches included.
    /// # Errors
    /// If a residue code in the pattern or the target is not part of the alphabet.
    pub fn indexes<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<Vec<usize>, BoxedError<'static, MotifError>> {
        let mut result = Vec::new();
        let mut from = 0;
        while let Some(index) = self.first_index(target, matching_type, from, alphabet)? {
            result.push(index + 1);
            from = index + 1;
        }
        Ok(result)
    }

    /// The 1 based match indices for many targets at once, the targets are handled in parallel
    /// when the `rayon` feature is enabled.
    /// # Errors
    /// If a residue code in the pattern or any target is not part of the alphabet.
    pub fn indexes_in_all<T: MatchTarget + Sync>(
        &self,
        targets: &[T],
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<Vec<Vec<usize>>, BoxedError<'static, MotifError>> {
        #[cfg(feature = "rayon")]
        let iter = targets.par_iter();
        #[cfg(not(feature = "rayon"))]
        let iter = targets.iter();
        iter.map(|target| self.indexes(target, matching_type, alphabet))
            .collect()
    }

    /// Check if the pattern occurs anywhere in the target
    /// # Errors
    /// If a residue code in the pattern or the target is not part of the alphabet.
    pub fn matches_in<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        Ok(self
            .first_index(target, matching_type, 0, alphabet)?
            .is_some())
    }

    /// Check if the pattern matches the target at exactly this 0 based index
    /// # Errors
    /// If a residue code in the pattern or the target is not part of the alphabet.
    pub fn matches_at<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        index: usize,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        if index + self.len() > target.slot_count() {
            return Ok(false);
        }
        self.window_matches(target, index, matching_type, alphabet)
    }

    /// Check if the pattern matches the full target, so with the same length
    /// # Errors
    /// If a residue code in the pattern or the target is not part of the alphabet.
    pub fn matches<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        if target.slot_count() != self.len() {
            return Ok(false);
        }
        self.window_matches(target, 0, matching_type, alphabet)
    }

    /// Check if the target starts with this pattern
    /// # Errors
    /// If a residue code in the pattern or the target is not part of the alphabet.
    pub fn is_starting<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        self.matches_at(target, 0, matching_type, alphabet)
    }

    /// Check if the target ends with this pattern
    /// # Errors
    /// If a residue code in the pattern or the target is not part of the alphabet.
    pub fn is_ending<T: MatchTarget + ?Sized>(
        &self,
        target: &T,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        let Some(start) = target.slot_count().checked_sub(self.len()) else {
            return Ok(false);
        };
        self.window_matches(target, start, matching_type, alphabet)
    }

    /// Check if the other pattern occurs somewhere in this pattern
    /// # Errors
    /// If a residue code in either pattern is not part of the alphabet.
    pub fn contains(
        &self,
        other: &Self,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        other.matches_in(self, matching_type, alphabet)
    }

    /// Check if both patterns have the same length and this pattern matches the other one
    /// # Errors
    /// If a residue code in either pattern is not part of the alphabet.
    pub fn is_same_as(
        &self,
        other: &Self,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        self.matches(other, matching_type, alphabet)
    }

    /// The sorted set of all codes that can match the given position, a wildcard allows every
    /// code of the alphabet.
    fn expanded_class(
        &self,
        position: usize,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<BTreeSet<char>, BoxedError<'static, MotifError>> {
        let set = &self.positions[position];
        if set.is_empty() {
            return Ok(alphabet.codes().collect());
        }
        let mut class = BTreeSet::new();
        for code in set {
            class.extend(alphabet.compatible_codes(*code, matching_type)?);
        }
        Ok(class)
    }

    /// Compile this pattern into a case insensitive matcher with one character class per
    /// position. The matcher is built anew on every call and is only valid for the given
    /// matching type and the current state of this pattern.
    /// # Errors
    /// If a residue code in the pattern is not part of the alphabet.
    pub fn compile_matcher(
        &self,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<CompiledMatcher, BoxedError<'static, MotifError>> {
        let mut expression = String::from("(?i)");
        for position in 0..self.len() {
            let class = self.expanded_class(position, matching_type, alphabet)?;
            expression.push('[');
            expression.push_str(
                &class
                    .iter()
                    .map(|c| regex::escape(&c.to_string()))
                    .join(""),
            );
            expression.push(']');
        }
        tracing::debug!(pattern = %self, %expression, ?matching_type, "compiled pattern matcher");
        let regex = Regex::new(&expression).map_err(|err| {
            BoxedError::new(
                MotifError::InvalidPattern,
                "Invalid pattern",
                format!("The pattern could not be compiled: {err}"),
                Context::show(self.to_string()),
            )
        })?;
        Ok(CompiledMatcher {
            regex,
            length: self.len(),
            matching_type,
        })
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::sequence::STANDARD_ALPHABET;

    #[test]
    fn trypsin_example() {
        let trypsin = PositionalPattern::trypsin();
        for matching_type in [
            MatchingType::Strict,
            MatchingType::Chemical,
            MatchingType::Isobaric,
        ] {
            assert_eq!(
                trypsin
                    .indexes("KTESTRTESTKPTESTK", matching_type, &STANDARD_ALPHABET)
                    .unwrap(),
                vec![1, 6]
            );
            let matcher = trypsin
                .compile_matcher(matching_type, &STANDARD_ALPHABET)
                .unwrap();
            assert_eq!(matcher.indexes("KTESTRTESTKPTESTK"), vec![1, 6]);
        }
    }

    #[test]
    fn isobaric_example() {
        let pattern = PositionalPattern::from_literal("IJX").unwrap();
        let matcher = pattern
            .compile_matcher(MatchingType::Isobaric, &STANDARD_ALPHABET)
            .unwrap();
        for target in ["IJX", "IIX", "JJX", "JJJ", "XXX", "ljx"] {
            assert!(
                pattern
                    .matches(target, MatchingType::Isobaric, &STANDARD_ALPHABET)
                    .unwrap(),
                "{target}"
            );
            assert!(matcher.is_match(target), "{target}");
        }
        assert!(
            !pattern
                .matches("KJX", MatchingType::Isobaric, &STANDARD_ALPHABET)
                .unwrap()
        );
        assert!(
            !pattern
                .matches("LJX", MatchingType::Strict, &STANDARD_ALPHABET)
                .unwrap()
        );
    }

    #[test]
    fn targeted() {
        let pattern = PositionalPattern::from_literal("B[]").unwrap();
        let a = &*STANDARD_ALPHABET;
        assert!(pattern.is_targeted('N', 0, MatchingType::Chemical, a).unwrap());
        assert!(!pattern.is_targeted('N', 0, MatchingType::Strict, a).unwrap());
        assert!(pattern.is_targeted('W', 1, MatchingType::Strict, a).unwrap());
        assert!(!pattern.is_targeted('W', 2, MatchingType::Strict, a).unwrap());
        assert!(pattern.is_targeted('?', 0, MatchingType::Strict, a).is_err());
    }

    #[test]
    fn wildcard_checks_residues() {
        let a = &*STANDARD_ALPHABET;
        let pattern = PositionalPattern::from_literal("K[]").unwrap();
        assert!(pattern.is_targeted('?', 1, MatchingType::Strict, a).is_err());
        assert!(matches!(
            pattern
                .indexes("K?", MatchingType::Strict, a)
                .unwrap_err()
                .get_kind(),
            MotifError::UnknownResidue
        ));
        assert!(pattern.matches("KW", MatchingType::Strict, a).unwrap());
        let mut target = PositionalPattern::from_literal("K").unwrap();
        target.set_targeted(1, ['W', '?']);
        assert!(pattern.matches(&target, MatchingType::Strict, a).is_err());
    }

    #[test]
    fn first_index() {
        let pattern = PositionalPattern::from_literal("[ST]").unwrap();
        let a = &*STANDARD_ALPHABET;
        assert_eq!(
            pattern.first_index("AASAT", MatchingType::Strict, 0, a).unwrap(),
            Some(2)
        );
        assert_eq!(
            pattern.first_index("AASAT", MatchingType::Strict, 3, a).unwrap(),
            Some(4)
        );
        assert_eq!(
            pattern.first_index("AASAT", MatchingType::Strict, 5, a).unwrap(),
            None
        );
        assert_eq!(
            pattern.first_index("", MatchingType::Strict, 0, a).unwrap(),
            None
        );
        assert!(pattern.first_index("AA?", MatchingType::Strict, 0, a).is_err());
    }

    #[test]
    fn pattern_targets() {
        let a = &*STANDARD_ALPHABET;
        let pattern = PositionalPattern::from_literal("K[DE]").unwrap();
        let target = PositionalPattern::from_literal("A[KR][]G").unwrap();
        assert_eq!(
            pattern.first_index(&target, MatchingType::Strict, 0, a).unwrap(),
            Some(1)
        );
        assert!(target.contains(&pattern, MatchingType::Strict, a).unwrap());
        assert!(
            pattern
                .is_same_as(
                    &PositionalPattern::from_literal("[KR][]").unwrap(),
                    MatchingType::Strict,
                    a
                )
                .unwrap()
        );
    }

    #[test]
    fn starting_and_ending() {
        let a = &*STANDARD_ALPHABET;
        let pattern = PositionalPattern::from_literal("[KR]").unwrap();
        assert!(pattern.is_starting("KPEPR", MatchingType::Strict, a).unwrap());
        assert!(pattern.is_ending("KPEPR", MatchingType::Strict, a).unwrap());
        assert!(!pattern.is_ending("KPEP", MatchingType::Strict, a).unwrap());
        assert!(!pattern.is_starting("", MatchingType::Strict, a).unwrap());
        assert!(pattern.matches_at("AAKA", 2, MatchingType::Strict, a).unwrap());
        assert!(!pattern.matches_at("AAKA", 4, MatchingType::Strict, a).unwrap());
    }

    #[test]
    fn many_targets() {
        let result = PositionalPattern::trypsin()
            .indexes_in_all(
                &["PEPTIDEK", "KAKPR", "AAAA"],
                MatchingType::Strict,
                &STANDARD_ALPHABET,
            )
            .unwrap();
        assert_eq!(result, vec![vec![], vec![1], vec![]]);
    }

    #[test]
    fn empty_pattern_matches_everywhere() {
        let pattern = PositionalPattern::new();
        assert_eq!(
            pattern
                .indexes("AK", MatchingType::Strict, &STANDARD_ALPHABET)
                .unwrap(),
            vec![1, 2, 3]
        );
    }
}
