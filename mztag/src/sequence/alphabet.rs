use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{
    MotifError,
    parameters::{MatchingType, ParseJson, use_serde},
    sequence::AminoAcid,
};

/// The standard amino acid alphabet, all 26 one letter codes including B/J/Z/X/U/O.
pub static STANDARD_ALPHABET: LazyLock<ResidueAlphabet> = LazyLock::new(ResidueAlphabet::standard);

/// A single entry in a [`ResidueAlphabet`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Residue {
    /// The one letter code, always uppercase
    pub code: char,
    /// The full name
    pub name: String,
    /// The monoisotopic residue mass in Dalton
    pub mass: f64,
    /// The concrete residues this code stands for, a concrete residue only contains itself
    pub sub_residues: BTreeSet<char>,
    /// The combination codes that include this residue
    pub combinations: BTreeSet<char>,
    /// The residues that cannot be told apart from this one by mass
    pub isobaric_siblings: BTreeSet<char>,
}

impl Residue {
    /// A residue that stands only for itself.
    pub fn concrete(code: char, name: impl Into<String>, mass: f64) -> Self {
        let code = code.to_ascii_uppercase();
        Self {
            code,
            name: name.into(),
            mass,
            sub_residues: BTreeSet::from([code]),
            combinations: BTreeSet::new(),
            isobaric_siblings: BTreeSet::new(),
        }
    }

    /// A combination code that stands for any of the given residues.
    pub fn combination(
        code: char,
        name: impl Into<String>,
        mass: f64,
        sub_residues: impl IntoIterator<Item = char>,
    ) -> Self {
        Self {
            code: code.to_ascii_uppercase(),
            name: name.into(),
            mass,
            sub_residues: sub_residues
                .into_iter()
                .map(|c| c.to_ascii_uppercase())
                .collect(),
            combinations: BTreeSet::new(),
            isobaric_siblings: BTreeSet::new(),
        }
    }

    /// Set the isobaric sibling class of this residue.
    #[must_use]
    pub fn with_isobaric_siblings(mut self, siblings: impl IntoIterator<Item = char>) -> Self {
        self.isobaric_siblings = siblings
            .into_iter()
            .map(|c| c.to_ascii_uppercase())
            .collect();
        self
    }

    /// Check if this code stands for more than only itself.
    pub fn is_combination(&self) -> bool {
        self.sub_residues.len() != 1 || !self.sub_residues.contains(&self.code)
    }
}

impl From<AminoAcid> for Residue {
    fn from(value: AminoAcid) -> Self {
        Self {
            code: value.one_letter_code(),
            name: value.name().to_string(),
            mass: value.monoisotopic_mass(),
            sub_residues: value
                .sub_residues()
                .iter()
                .map(|aa| aa.one_letter_code())
                .collect(),
            combinations: value
                .combinations()
                .iter()
                .map(|aa| aa.one_letter_code())
                .collect(),
            isobaric_siblings: value
                .isobaric_siblings()
                .iter()
                .map(|aa| aa.one_letter_code())
                .collect(),
        }
    }
}

/// A lookup table from one letter residue codes to their mass and ambiguity relations. All
/// lookups are case insensitive. This is passed explicitly to every operation that needs it, so
/// tests can use small fixture alphabets.
/// ```rust
/// use mztag::sequence::*;
/// let alphabet = ResidueAlphabet::new()
///     .with_residue(Residue::concrete('A', "Alanine", 71.037114))
///     .and_then(|a| a.with_residue(Residue::concrete('G', "Glycine", 57.021464)))
///     .and_then(|a| a.with_residue(Residue::combination('X', "Unknown", 64.029289, ['A', 'G'])))
///     .unwrap();
/// assert_eq!(alphabet.combinations_of('g').unwrap().iter().copied().collect::<Vec<_>>(), vec!['X']);
/// assert!(alphabet.mass('Y').is_err());
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ResidueAlphabet {
    residues: BTreeMap<char, Residue>,
}

impl ResidueAlphabet {
    /// An empty alphabet
    pub const fn new() -> Self {
        Self {
            residues: BTreeMap::new(),
        }
    }

    /// The standard amino acid alphabet, prefer [`STANDARD_ALPHABET`] to reuse a single instance.
    pub fn standard() -> Self {
        Self {
            residues: AminoAcid::ALL_AMINO_ACIDS
                .iter()
                .map(|aa| (aa.one_letter_code(), Residue::from(*aa)))
                .collect(),
        }
    }

    /// Add a residue. For a combination code the code is also registered as a combination on all
    /// of its sub-residues that are already present.
    /// # Errors
    /// If any code of the residue is not an ASCII letter. Sequences are indexed per byte, so every
    /// code has to be a single byte.
    pub fn with_residue(
        mut self,
        residue: Residue,
    ) -> Result<Self, BoxedError<'static, MotifError>> {
        let codes = std::iter::once(&residue.code)
            .chain(&residue.sub_residues)
            .chain(&residue.combinations)
            .chain(&residue.isobaric_siblings);
        for code in codes {
            if !code.is_ascii_alphabetic() {
                return Err(BoxedError::new(
                    MotifError::InvalidParameters,
                    "Invalid residue code",
                    format!(
                        "The code '{code}' used for residue '{}' is not an ASCII letter",
                        residue.name
                    ),
                    Context::show(code.to_string()),
                ));
            }
        }
        if residue.is_combination() {
            for sub in &residue.sub_residues {
                if let Some(entry) = self.residues.get_mut(sub) {
                    entry.combinations.insert(residue.code);
                }
            }
        }
        self.residues.insert(residue.code, residue);
        Ok(self)
    }

    /// Get the residue for a code
    /// # Errors
    /// If the code is not part of this alphabet
    pub fn residue(&self, code: char) -> Result<&Residue, BoxedError<'static, MotifError>> {
        self.residues
            .get(&code.to_ascii_uppercase())
            .ok_or_else(|| unknown_residue(code))
    }

    /// Check if this code is part of the alphabet
    pub fn contains(&self, code: char) -> bool {
        self.residues.contains_key(&code.to_ascii_uppercase())
    }

    /// The monoisotopic residue mass for a code
    /// # Errors
    /// If the code is not part of this alphabet
    pub fn mass(&self, code: char) -> Result<f64, BoxedError<'static, MotifError>> {
        self.residue(code).map(|r| r.mass)
    }

    /// The concrete residues a code stands for, a concrete residue stands only for itself
    /// # Errors
    /// If the code is not part of this alphabet
    pub fn sub_residues(
        &self,
        code: char,
    ) -> Result<&BTreeSet<char>, BoxedError<'static, MotifError>> {
        self.residue(code).map(|r| &r.sub_residues)
    }

    /// The combination codes that include this code
    /// # Errors
    /// If the code is not part of this alphabet
    pub fn combinations_of(
        &self,
        code: char,
    ) -> Result<&BTreeSet<char>, BoxedError<'static, MotifError>> {
        self.residue(code).map(|r| &r.combinations)
    }

    /// The codes that cannot be distinguished from this code by mass
    /// # Errors
    /// If the code is not part of this alphabet
    pub fn isobaric_siblings(
        &self,
        code: char,
    ) -> Result<&BTreeSet<char>, BoxedError<'static, MotifError>> {
        self.residue(code).map(|r| &r.isobaric_siblings)
    }

    /// Check if this code is a combination code
    /// # Errors
    /// If the code is not part of this alphabet
    pub fn is_combination(&self, code: char) -> Result<bool, BoxedError<'static, MotifError>> {
        self.residue(code).map(Residue::is_combination)
    }

    /// All codes in this alphabet in sorted order
    pub fn codes(&self) -> impl Iterator<Item = char> + '_ {
        self.residues.keys().copied()
    }

    /// All codes that are not combination codes in sorted order
    pub fn concrete_residues(&self) -> impl Iterator<Item = char> + '_ {
        self.residues
            .values()
            .filter(|r| !r.is_combination())
            .map(|r| r.code)
    }

    /// The number of codes in this alphabet
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Check if this alphabet is empty
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Check if `candidate` can be matched by a pattern position that allows `pattern_code`.
    ///  * [`MatchingType::Strict`]: the codes are identical
    ///  * [`MatchingType::Chemical`]: additionally, the candidate is one of the residues the
    ///    pattern code stands for or one of the combinations that include it, or the pattern code
    ///    is one of the combinations that include the candidate
    ///  * [`MatchingType::Isobaric`]: additionally, the candidate is an isobaric sibling
    /// # Errors
    /// If either code is not part of this alphabet
    pub fn is_compatible(
        &self,
        pattern_code: char,
        candidate: char,
        matching_type: MatchingType,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        let pattern = self.residue(pattern_code)?;
        let candidate = self.residue(candidate)?;
        if pattern.code == candidate.code {
            return Ok(true);
        }
        if matching_type == MatchingType::Strict {
            return Ok(false);
        }
        if pattern.sub_residues.contains(&candidate.code)
            || pattern.combinations.contains(&candidate.code)
            || candidate.combinations.contains(&pattern.code)
        {
            return Ok(true);
        }
        Ok(matching_type == MatchingType::Isobaric
            && pattern.isobaric_siblings.contains(&candidate.code))
    }

    /// All codes that are compatible with the given pattern code, in sorted order
    /// # Errors
    /// If the code is not part of this alphabet
    pub fn compatible_codes(
        &self,
        pattern_code: char,
        matching_type: MatchingType,
    ) -> Result<BTreeSet<char>, BoxedError<'static, MotifError>> {
        let mut result = BTreeSet::new();
        for code in self.codes() {
            if self.is_compatible(pattern_code, code, matching_type)? {
                result.insert(code);
            }
        }
        Ok(result)
    }
}

pub(crate) fn unknown_residue(code: char) -> BoxedError<'static, MotifError> {
    BoxedError::new(
        MotifError::UnknownResidue,
        "Unknown residue",
        format!("The residue code '{code}' is not part of the residue alphabet"),
        Context::show(code.to_string()),
    )
}

impl ParseJson for ResidueAlphabet {
    /// Every residue is added with [`ResidueAlphabet::with_residue`], so the codes are checked.
    fn from_json_value(value: serde_json::Value) -> Result<Self, BoxedError<'static, MotifError>> {
        let raw: Self = use_serde(value)?;
        raw.residues
            .into_values()
            .try_fold(Self::new(), Self::with_residue)
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn standard_lookups() {
        let alphabet = &*STANDARD_ALPHABET;
        assert_eq!(alphabet.len(), 26);
        assert!((alphabet.mass('k').unwrap() - 128.094_963).abs() < 1e-6);
        assert_eq!(
            alphabet.sub_residues('B').unwrap(),
            &BTreeSet::from(['D', 'N'])
        );
        assert_eq!(
            alphabet.combinations_of('L').unwrap(),
            &BTreeSet::from(['J', 'X'])
        );
        assert!(alphabet.isobaric_siblings('J').unwrap().contains(&'I'));
        assert_eq!(alphabet.concrete_residues().count(), 22);
        assert!(alphabet.is_combination('Z').unwrap());
        assert!(!alphabet.is_combination('K').unwrap());
        assert!(matches!(
            alphabet.mass('!').unwrap_err().get_kind(),
            MotifError::UnknownResidue
        ));
    }

    #[test]
    fn compatibility() {
        let alphabet = &*STANDARD_ALPHABET;
        assert!(alphabet.is_compatible('K', 'k', MatchingType::Strict).unwrap());
        assert!(!alphabet.is_compatible('B', 'D', MatchingType::Strict).unwrap());
        assert!(alphabet.is_compatible('B', 'D', MatchingType::Chemical).unwrap());
        assert!(alphabet.is_compatible('D', 'B', MatchingType::Chemical).unwrap());
        assert!(alphabet.is_compatible('X', 'J', MatchingType::Chemical).unwrap());
        assert!(!alphabet.is_compatible('I', 'L', MatchingType::Chemical).unwrap());
        assert!(alphabet.is_compatible('I', 'L', MatchingType::Isobaric).unwrap());
        assert!(!alphabet.is_compatible('K', 'Q', MatchingType::Isobaric).unwrap());
        assert!(alphabet.is_compatible('K', '?', MatchingType::Isobaric).is_err());
    }

    fn fixture() -> ResidueAlphabet {
        [
            Residue::concrete('a', "A", 10.0),
            Residue::concrete('B', "B", 20.0).with_isobaric_siblings(['C']),
            Residue::concrete('C', "C", 20.0),
            Residue::combination('Q', "A or B", 15.0, ['A', 'B']),
        ]
        .into_iter()
        .try_fold(ResidueAlphabet::new(), ResidueAlphabet::with_residue)
        .unwrap()
    }

    #[test]
    fn ascii_codes_only() {
        for residue in [
            Residue::concrete('é', "E acute", 10.0),
            Residue::concrete('[', "Bracket", 10.0),
            Residue::combination('Q', "A or Ω", 15.0, ['A', 'Ω']),
            Residue::concrete('B', "B", 20.0).with_isobaric_siblings(['1']),
        ] {
            let error = fixture().with_residue(residue).unwrap_err();
            assert!(matches!(error.get_kind(), MotifError::InvalidParameters));
        }
        let alphabet = ResidueAlphabet::from_json(
            r#"{"residues": {"É": {"code": "É", "name": "E acute", "mass": 10.0,
                "sub_residues": ["É"], "combinations": [], "isobaric_siblings": []}}}"#,
        );
        assert!(alphabet.is_err());
        let standard = serde_json::to_string(&*STANDARD_ALPHABET).unwrap();
        let loaded = ResidueAlphabet::from_json(&standard).unwrap();
        assert_eq!(loaded.len(), 26);
        assert_eq!(
            loaded.combinations_of('L').unwrap(),
            &BTreeSet::from(['J', 'X'])
        );
    }

    #[test]
    fn fixture_alphabet() {
        let alphabet = fixture();
        assert_eq!(alphabet.codes().collect::<String>(), "ABCQ");
        assert_eq!(alphabet.concrete_residues().collect::<String>(), "ABC");
        assert!(alphabet.is_compatible('A', 'Q', MatchingType::Chemical).unwrap());
        assert!(!alphabet.is_compatible('B', 'C', MatchingType::Chemical).unwrap());
        assert!(alphabet.is_compatible('B', 'C', MatchingType::Isobaric).unwrap());
        assert_eq!(
            alphabet
                .compatible_codes('Q', MatchingType::Chemical)
                .unwrap()
                .into_iter()
                .collect::<String>(),
            "ABQ"
        );
    }
}
