use std::collections::BTreeSet;

use context_error::*;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    MotifError,
    sequence::{ResidueAlphabet, STANDARD_ALPHABET, alphabet::unknown_residue, mirror_index},
};

/// Sets with more residues than this are written as the complement in PROSITE format
pub const PROSITE_EXCLUSION_THRESHOLD: usize = 15;

/// A pattern of residues, every position has a set of allowed residues where an empty set
/// means that any residue is allowed at that position. The anchor marks the position of interest,
/// for example the cleavage site of a protease.
/// ```rust
/// use mztag::{parameters::MatchingType, sequence::*};
/// let pattern = PositionalPattern::from_literal("[KR]X").unwrap();
/// assert_eq!(pattern.len(), 2);
/// assert_eq!(pattern.to_string(), "[KR]X");
/// assert_eq!(
///     pattern.indexes("AKPRT", MatchingType::Strict, &STANDARD_ALPHABET).unwrap(),
///     Vec::<usize>::new()
/// );
/// assert_eq!(
///     pattern.indexes("AKXRX", MatchingType::Strict, &STANDARD_ALPHABET).unwrap(),
///     vec![2, 4]
/// );
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PositionalPattern {
    /// The allowed residues per position, always uppercase
    pub(super) positions: Vec<BTreeSet<char>>,
    /// The index of the position of interest
    pub(super) anchor: isize,
}

impl PositionalPattern {
    /// An empty pattern
    pub const fn new() -> Self {
        Self {
            positions: Vec::new(),
            anchor: 0,
        }
    }

    /// Parse a pattern literal using the standard alphabet, see [`Self::parse`].
    /// # Errors
    /// If the literal is not a valid pattern.
    pub fn from_literal(text: &str) -> Result<Self, BoxedError<'static, MotifError>> {
        Self::parse(text, 0, &STANDARD_ALPHABET)
    }

    /// Parse a pattern literal using the standard alphabet and set the anchor.
    /// # Errors
    /// If the literal is not a valid pattern.
    pub fn from_literal_anchored(
        text: &str,
        anchor: isize,
    ) -> Result<Self, BoxedError<'static, MotifError>> {
        Self::parse(text, anchor, &STANDARD_ALPHABET)
    }

    /// Parse a pattern literal. Every residue code is a position on its own, a group of residues
    /// between square brackets forms a single position that allows any of those residues. An
    /// empty group (`[]`) allows any residue.
    /// # Errors
    /// * If a bracket is unmatched or brackets are nested.
    /// * If a residue is not part of the alphabet.
    pub fn parse(
        text: &str,
        anchor: isize,
        alphabet: &ResidueAlphabet,
    ) -> Result<Self, BoxedError<'static, MotifError>> {
        let mut positions = Vec::new();
        let mut group: Option<(usize, BTreeSet<char>)> = None;
        for (offset, c) in text.char_indices() {
            match c {
                '[' => {
                    if group.is_some() {
                        return Err(BoxedError::new(
                            MotifError::InvalidPattern,
                            "Invalid pattern",
                            "Residue groups cannot be nested",
                            Context::line(None, text, offset, 1).to_owned(),
                        ));
                    }
                    group = Some((offset, BTreeSet::new()));
                }
                ']' => match group.take() {
                    Some((_, set)) => positions.push(set),
                    None => {
                        return Err(BoxedError::new(
                            MotifError::InvalidPattern,
                            "Invalid pattern",
                            "This closing bracket does not have a matching opening bracket",
                            Context::line(None, text, offset, 1).to_owned(),
                        ));
                    }
                },
                c => {
                    if !alphabet.contains(c) {
                        return Err(unknown_residue(c).replace_context(
                            Context::line(None, text, offset, c.len_utf8()).to_owned(),
                        ));
                    }
                    let c = c.to_ascii_uppercase();
                    match &mut group {
                        Some((_, set)) => {
                            set.insert(c);
                        }
                        None => positions.push(BTreeSet::from([c])),
                    }
                }
            }
        }
        if let Some((start, _)) = group {
            return Err(BoxedError::new(
                MotifError::InvalidPattern,
                "Invalid pattern",
                "This opening bracket is never closed",
                Context::line(None, text, start, text.len() - start).to_owned(),
            ));
        }
        Ok(Self { positions, anchor })
    }

    /// The example trypsin pattern: K or R, not followed by P.
    pub fn trypsin() -> Self {
        let mut pattern = Self::new();
        pattern.set_targeted(0, ['K', 'R']);
        pattern.set_excluded(1, ['P'], &STANDARD_ALPHABET);
        pattern
    }

    /// The number of positions
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if there are no positions
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All positions, an empty set is a wildcard
    pub fn positions(&self) -> &[BTreeSet<char>] {
        &self.positions
    }

    /// The allowed residues at a position, `None` if the position is outside of the pattern
    pub fn residues_at(&self, position: usize) -> Option<&BTreeSet<char>> {
        self.positions.get(position)
    }

    /// Check if a position allows any residue
    pub fn is_wildcard(&self, position: usize) -> bool {
        self.positions.get(position).is_some_and(BTreeSet::is_empty)
    }

    /// The anchor, the index of the position of interest
    pub const fn anchor(&self) -> isize {
        self.anchor
    }

    /// Set the anchor
    pub const fn set_anchor(&mut self, anchor: isize) {
        self.anchor = anchor;
    }

    /// The allowed residues at the anchor, `None` if the anchor lies outside of the pattern
    pub fn residues_at_anchor(&self) -> Option<&BTreeSet<char>> {
        usize::try_from(self.anchor)
            .ok()
            .and_then(|a| self.positions.get(a))
    }

    /// A single position pattern with the residues at the anchor of this pattern.
    pub fn standard_search_pattern(&self) -> Self {
        Self {
            positions: vec![self.residues_at_anchor().cloned().unwrap_or_default()],
            anchor: 0,
        }
    }

    fn extend_to(&mut self, position: usize) {
        if self.positions.len() <= position {
            self.positions.resize(position + 1, BTreeSet::new());
        }
    }

    /// Set the allowed residues at a position, overwriting the previous set. Positions between
    /// the current end and the given position become wildcards. An empty set is a wildcard.
    pub fn set_targeted(&mut self, position: usize, residues: impl IntoIterator<Item = char>) {
        self.extend_to(position);
        self.positions[position] = residues
            .into_iter()
            .map(|c| c.to_ascii_uppercase())
            .collect();
    }

    /// Exclude residues from a position. If the position already has residues these are
    /// filtered, otherwise all concrete residues of the alphabet except the exceptions are
    /// allowed. Without exceptions the position becomes a wildcard. Positions between the current
    /// end and the given position become wildcards.
    pub fn set_excluded(
        &mut self,
        position: usize,
        exceptions: impl IntoIterator<Item = char>,
        alphabet: &ResidueAlphabet,
    ) {
        let exceptions: BTreeSet<char> = exceptions
            .into_iter()
            .map(|c| c.to_ascii_uppercase())
            .collect();
        self.extend_to(position);
        let current = &mut self.positions[position];
        if exceptions.is_empty() {
            current.clear();
        } else if current.is_empty() {
            *current = alphabet
                .concrete_residues()
                .filter(|c| !exceptions.contains(c))
                .collect();
        } else {
            current.retain(|c| !exceptions.contains(c));
        }
    }

    /// Remove a position, all later positions move one place forward.
    /// # Errors
    /// If the position is outside of the pattern.
    pub fn remove_at(&mut self, position: usize) -> Result<(), BoxedError<'static, MotifError>> {
        if position >= self.len() {
            return Err(self.invalid_position(position));
        }
        self.positions.remove(position);
        Ok(())
    }

    /// Swap the residues at two positions.
    /// # Errors
    /// If either position is outside of the pattern.
    pub fn swap_positions(
        &mut self,
        a: usize,
        b: usize,
    ) -> Result<(), BoxedError<'static, MotifError>> {
        for position in [a, b] {
            if position >= self.len() {
                return Err(self.invalid_position(position));
            }
        }
        self.positions.swap(a, b);
        Ok(())
    }

    fn invalid_position(&self, position: usize) -> BoxedError<'static, MotifError> {
        BoxedError::new(
            MotifError::InvalidPosition,
            "Invalid position",
            format!(
                "Position {position} is outside of the pattern of length {}",
                self.len()
            ),
            Context::show(self.to_string()),
        )
    }

    /// Merge another pattern into this one. The allowed residues at every position are combined,
    /// a wildcard on either side results in a wildcard. The anchor is left untouched.
    pub fn merge(&mut self, other: &Self) {
        for (index, theirs) in other.positions.iter().enumerate() {
            match self.positions.get_mut(index) {
                None => self.positions.push(theirs.clone()),
                Some(ours) if ours.is_empty() => (),
                Some(ours) if theirs.is_empty() => ours.clear(),
                Some(ours) => ours.extend(theirs.iter().copied()),
            }
        }
    }

    /// Merge two patterns into a new pattern, see [`Self::merge`].
    #[must_use]
    pub fn merged(a: &Self, b: &Self) -> Self {
        let mut result = a.clone();
        result.merge(b);
        result
    }

    /// Add all positions of another pattern after the positions of this pattern. The anchor is
    /// left untouched.
    pub fn append(&mut self, other: &Self) {
        self.positions.extend(other.positions.iter().cloned());
    }

    /// Get the positions `start..=end` as a new pattern. If `shift_anchor` is set the anchor is
    /// moved to keep pointing to the same position, otherwise it is copied as is.
    #[must_use]
    pub fn sub_pattern(&self, start: usize, end: usize, shift_anchor: bool) -> Self {
        let positions = if start > end || start >= self.len() {
            Vec::new()
        } else {
            self.positions[start..=end.min(self.len() - 1)].to_vec()
        };
        Self {
            positions,
            anchor: if shift_anchor {
                self.anchor - start as isize
            } else {
                self.anchor
            },
        }
    }

    /// Reverse the pattern. Note that the anchor is not carried over and is reset to 0, so it is
    /// undefined for the reversed pattern.
    #[must_use]
    pub fn reverse(&self) -> Self {
        let length = self.len();
        let mut positions = vec![BTreeSet::new(); length];
        for (index, set) in self.positions.iter().enumerate() {
            positions[mirror_index(index, length)].clone_from(set);
        }
        Self {
            positions,
            anchor: 0,
        }
    }

    /// All sequences that fit this pattern, wildcard positions are written as `X`.
    pub fn all_possible_sequences(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        self.positions
            .iter()
            .map(|set| {
                if set.is_empty() {
                    vec!['X']
                } else {
                    set.iter().copied().collect_vec()
                }
            })
            .multi_cartesian_product()
            .map(|residues| residues.into_iter().collect())
            .collect()
    }

    /// Write this pattern in PROSITE format. Runs of wildcards are written as `(n)`, sets are
    /// written as `[..]` unless they contain more than [`PROSITE_EXCLUSION_THRESHOLD`] residues,
    /// then the complement (over the concrete residues of the alphabet) is written as `{..}`. The
    /// first position is followed by `!`, so a leading wildcard is written as `(1)!`.
    pub fn to_prosite(&self, alphabet: &ResidueAlphabet) -> String {
        let mut result = String::new();
        let mut wildcards = 0;
        let flush = |result: &mut String, wildcards: &mut usize| {
            if *wildcards > 0 {
                result.push_str(&format!("({wildcards})"));
                *wildcards = 0;
            }
        };
        for (index, set) in self.positions.iter().enumerate() {
            if set.is_empty() {
                wildcards += 1;
            } else if set.len() > PROSITE_EXCLUSION_THRESHOLD {
                flush(&mut result, &mut wildcards);
                result.push('{');
                result.extend(alphabet.concrete_residues().filter(|c| !set.contains(c)));
                result.push('}');
            } else {
                flush(&mut result, &mut wildcards);
                result.push('[');
                result.extend(set.iter());
                result.push(']');
            }
            if index == 0 {
                flush(&mut result, &mut wildcards);
                result.push('!');
            }
        }
        flush(&mut result, &mut wildcards);
        result
    }
}

impl std::fmt::Display for PositionalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for set in &self.positions {
            match set.len() {
                0 => write!(f, "[]")?,
                1 => write!(f, "{}", set.iter().join(""))?,
                _ => write!(f, "[{}]", set.iter().join(""))?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for PositionalPattern {
    type Err = BoxedError<'static, MotifError>;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_literal(s)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn parse_literal() {
        let pattern = PositionalPattern::from_literal("A[kr]C[]").unwrap();
        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern.residues_at(1), Some(&BTreeSet::from(['K', 'R'])));
        assert!(pattern.is_wildcard(3));
        assert_eq!(pattern.to_string(), "A[KR]C[]");
        assert!(PositionalPattern::from_literal("").unwrap().is_empty());
    }

    #[test]
    fn parse_errors() {
        for (text, kind) in [
            ("[KR", MotifError::InvalidPattern),
            ("KR]", MotifError::InvalidPattern),
            ("[K[R]]", MotifError::InvalidPattern),
            ("K!R", MotifError::UnknownResidue),
            ("[K1]", MotifError::UnknownResidue),
        ] {
            let error = PositionalPattern::from_literal(text).unwrap_err();
            assert_eq!(error.get_kind(), kind, "{text}");
        }
    }

    #[test]
    fn round_trip() {
        for text in ["K", "[KR]P", "IJX", "A[DE]GX[ST]", "K[]D", "[]K", "X[][]"] {
            assert_eq!(
                PositionalPattern::from_literal(text).unwrap().to_string(),
                text
            );
        }
    }

    #[test]
    fn targeting() {
        let mut pattern = PositionalPattern::new();
        pattern.set_targeted(2, ['c']);
        assert_eq!(pattern.len(), 3);
        assert!(pattern.is_wildcard(0));
        assert!(pattern.is_wildcard(1));
        pattern.set_excluded(1, ['P'], &STANDARD_ALPHABET);
        assert_eq!(pattern.residues_at(1).unwrap().len(), 21);
        pattern.set_excluded(2, ['C'], &STANDARD_ALPHABET);
        assert!(pattern.is_wildcard(2));
        pattern.set_targeted(0, ['K', 'R']);
        pattern.set_excluded(0, ['R'], &STANDARD_ALPHABET);
        assert_eq!(pattern.residues_at(0), Some(&BTreeSet::from(['K'])));
        pattern.set_excluded(0, [], &STANDARD_ALPHABET);
        assert!(pattern.is_wildcard(0));
    }

    #[test]
    fn remove_and_swap() {
        let mut pattern = PositionalPattern::from_literal("AKC").unwrap();
        pattern.swap_positions(0, 2).unwrap();
        assert_eq!(pattern.to_string(), "CKA");
        pattern.remove_at(1).unwrap();
        assert_eq!(pattern.to_string(), "CA");
        assert!(pattern.remove_at(2).is_err());
        assert!(pattern.swap_positions(0, 5).is_err());
    }

    #[test]
    fn merge() {
        let mut pattern = PositionalPattern::from_literal("K[]D").unwrap();
        pattern.merge(&PositionalPattern::from_literal("[RK]AX[]C").unwrap());
        assert_eq!(pattern.to_string(), "[KR][][DX][]C");
        assert!(pattern.is_wildcard(1));
        assert!(!pattern.is_wildcard(2));
        assert!(pattern.is_wildcard(3));
        let p = PositionalPattern::from_literal("[KR]X[ST]").unwrap();
        assert_eq!(PositionalPattern::merged(&p, &p), p);
    }

    #[test]
    fn append_and_sub_pattern() {
        let mut pattern = PositionalPattern::from_literal_anchored("AK", 1).unwrap();
        pattern.append(&PositionalPattern::from_literal("[DE]").unwrap());
        assert_eq!(pattern.to_string(), "AK[DE]");
        assert_eq!(pattern.anchor(), 1);
        let sub = pattern.sub_pattern(1, 5, true);
        assert_eq!(sub.to_string(), "K[DE]");
        assert_eq!(sub.anchor(), 0);
        assert_eq!(sub.residues_at_anchor(), Some(&BTreeSet::from(['K'])));
        let sub = pattern.sub_pattern(2, 2, false);
        assert_eq!(sub.to_string(), "[DE]");
        assert_eq!(sub.anchor(), 1);
        assert_eq!(sub.residues_at_anchor(), None);
        assert!(pattern.sub_pattern(3, 1, false).is_empty());
    }

    #[test]
    fn reverse() {
        let pattern = PositionalPattern::from_literal_anchored("A[KR]X", 2).unwrap();
        let reversed = pattern.reverse();
        assert_eq!(reversed.to_string(), "X[KR]A");
        assert_eq!(reversed.anchor(), 0);
        assert_eq!(reversed.reverse().to_string(), pattern.to_string());
    }

    #[test]
    fn possible_sequences() {
        let pattern = PositionalPattern::from_literal("[KR][]A").unwrap();
        assert_eq!(pattern.all_possible_sequences(), vec!["KXA", "RXA"]);
        assert!(PositionalPattern::new().all_possible_sequences().is_empty());
        assert_eq!(
            PositionalPattern::trypsin().standard_search_pattern().to_string(),
            "[KR]"
        );
    }

    #[test]
    fn prosite() {
        assert_eq!(
            PositionalPattern::trypsin().to_prosite(&STANDARD_ALPHABET),
            "[KR]!{P}"
        );
        let pattern = PositionalPattern::from_literal("C[][][]H[]").unwrap();
        assert_eq!(pattern.to_prosite(&STANDARD_ALPHABET), "[C]!(3)[H](1)");
    }

    #[test]
    fn prosite_leading_wildcard() {
        let pattern = PositionalPattern::from_literal("[]K").unwrap();
        assert_eq!(pattern.to_prosite(&STANDARD_ALPHABET), "(1)![K]");
        let pattern = PositionalPattern::from_literal("[][]K").unwrap();
        assert_eq!(pattern.to_prosite(&STANDARD_ALPHABET), "(1)!(1)[K]");
        let pattern = PositionalPattern::from_literal("[]").unwrap();
        assert_eq!(pattern.to_prosite(&STANDARD_ALPHABET), "(1)!");
    }

    #[test]
    fn prosite_threshold() {
        let concrete = STANDARD_ALPHABET.concrete_residues().collect_vec();
        let mut fifteen = PositionalPattern::new();
        fifteen.set_targeted(0, concrete[..15].iter().copied());
        let rendered = fifteen.to_prosite(&STANDARD_ALPHABET);
        assert!(rendered.starts_with('['));
        assert_eq!(rendered.len(), 15 + 3);

        let mut sixteen = PositionalPattern::new();
        sixteen.set_targeted(0, concrete[..16].iter().copied());
        let rendered = sixteen.to_prosite(&STANDARD_ALPHABET);
        assert_eq!(
            rendered,
            format!("{{{}}}!", concrete[16..].iter().collect::<String>())
        );
    }
}
