//! The parameters that steer sequence matching, these can be stored and loaded as JSON.

use std::any::type_name;

use context_error::*;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::MotifError;

/// The equivalence discipline used when comparing a residue against a pattern position.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum MatchingType {
    /// Only identical residue codes match
    Strict,
    /// Ambiguity codes match the residues they stand for and the other way around (B matches D and N)
    Chemical,
    /// Same as [`Self::Chemical`] but residues that cannot be distinguished by mass also match (I/L/J)
    #[default]
    Isobaric,
}

impl std::fmt::Display for MatchingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Strict => "Character Sequence",
                Self::Chemical => "Amino Acids",
                Self::Isobaric => "Indistinguishable Amino Acids",
            }
        )
    }
}

/// How a mass gap in a tag is mapped onto the residues of a sequence.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum GapStrategy {
    /// Accumulate residues one at a time and accept the first stretch within tolerance. This never
    /// revisits a gap, so a longer stretch that is also within tolerance is not explored.
    #[default]
    Greedy,
    /// Try every stretch of residues within tolerance for every gap and backtrack when the rest of
    /// the tag does not fit.
    Exhaustive,
}

/// Parameters for matching patterns and tags against sequences.
/// ```rust
/// use mztag::parameters::*;
/// let parameters = SequenceMatchingParameters::from_json(
///     r#"{"matching_type": "Chemical", "mass_tolerance": 0.05}"#,
/// ).unwrap();
/// assert_eq!(parameters.matching_type, MatchingType::Chemical);
/// assert_eq!(parameters.gap_strategy, GapStrategy::Greedy);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct SequenceMatchingParameters {
    /// The residue equivalence used
    pub matching_type: MatchingType,
    /// The absolute mass tolerance in Dalton used when resolving mass gaps
    pub mass_tolerance: f64,
    /// How mass gaps are resolved
    pub gap_strategy: GapStrategy,
    /// The maximal share of `X` residues in a matched stretch
    pub limit_x: f64,
}

impl Default for SequenceMatchingParameters {
    fn default() -> Self {
        Self::default_sequence_matching()
    }
}

impl SequenceMatchingParameters {
    /// Exact character matching, without any ambiguity handling.
    pub const fn string_matching() -> Self {
        Self {
            matching_type: MatchingType::Strict,
            mass_tolerance: 0.02,
            gap_strategy: GapStrategy::Greedy,
            limit_x: 0.25,
        }
    }

    /// The default: isobaric matching with a greedy gap walk.
    pub const fn default_sequence_matching() -> Self {
        Self {
            matching_type: MatchingType::Isobaric,
            mass_tolerance: 0.02,
            gap_strategy: GapStrategy::Greedy,
            limit_x: 0.25,
        }
    }

    /// Use the given matching type.
    #[must_use]
    pub const fn with_matching_type(mut self, matching_type: MatchingType) -> Self {
        self.matching_type = matching_type;
        self
    }

    /// Use the given mass tolerance (in Dalton).
    #[must_use]
    pub const fn with_tolerance(mut self, mass_tolerance: f64) -> Self {
        self.mass_tolerance = mass_tolerance;
        self
    }

    /// Use the given gap strategy.
    #[must_use]
    pub const fn with_gap_strategy(mut self, gap_strategy: GapStrategy) -> Self {
        self.gap_strategy = gap_strategy;
        self
    }

    /// Check if a matched stretch contains more `X` residues than allowed.
    pub fn exceeds_x_limit(&self, stretch: &str) -> bool {
        if stretch.is_empty() {
            return false;
        }
        let x = stretch.chars().filter(|c| c.eq_ignore_ascii_case(&'X')).count();
        x as f64 / stretch.chars().count() as f64 > self.limit_x
    }
}

impl std::fmt::Display for SequenceMatchingParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Method: {}.", self.matching_type)?;
        writeln!(f, "Mass tolerance: {} Da.", self.mass_tolerance)?;
        writeln!(f, "Gap strategy: {:?}.", self.gap_strategy)?;
        write!(f, "Max share of x's: {}.", self.limit_x)
    }
}

/// Parse a structure from JSON, all errors are reported as [`MotifError::InvalidParameters`].
pub trait ParseJson: Sized {
    /// Parse a JSON value element into this structure
    /// # Errors
    /// If the JSON is not valid to the format
    fn from_json_value(value: Value) -> Result<Self, BoxedError<'static, MotifError>>;

    /// Parse a string containing JSON into this structure
    /// # Errors
    /// If the JSON is not valid to the format
    fn from_json(value: &str) -> Result<Self, BoxedError<'static, MotifError>> {
        let value = serde_json::from_str::<Value>(value).map_err(|err| {
            BoxedError::new(
                MotifError::InvalidParameters,
                format!("Invalid JSON (for {})", type_name::<Self>()),
                err.to_string(),
                Context::show(value.to_string()),
            )
        })?;
        Self::from_json_value(value)
    }
}

/// Parse a JSON value element into this structure using the serde JSON parser
/// # Errors
/// If the JSON is not valid to the format
#[expect(clippy::needless_pass_by_value)]
pub fn use_serde<T: DeserializeOwned>(value: Value) -> Result<T, BoxedError<'static, MotifError>> {
    serde_json::from_value(value.clone()).map_err(|err| {
        BoxedError::new(
            MotifError::InvalidParameters,
            format!("Could not parse JSON into {}", type_name::<T>()),
            err.to_string(),
            Context::show(value.to_string()),
        )
    })
}

impl ParseJson for SequenceMatchingParameters {
    fn from_json_value(value: Value) -> Result<Self, BoxedError<'static, MotifError>> {
        use_serde(value)
    }
}

impl ParseJson for MatchingType {
    fn from_json_value(value: Value) -> Result<Self, BoxedError<'static, MotifError>> {
        use_serde(value)
    }
}
