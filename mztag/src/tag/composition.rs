use std::collections::BTreeMap;

use context_error::*;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{
    MotifError,
    parameters::{MatchingType, ParseJson, use_serde},
    sequence::{ModificationLookup, ResidueAlphabet},
    tag::{Segment, TagComponent},
};

/// The monoisotopic mass of water
pub const WATER_MASS: f64 = 18.010_565;

/// A partial sequence reconstruction: exactly known stretches of residues separated by mass gaps.
/// Two exact segments are never next to each other, pushing an exact segment after another one
/// merges them.
/// ```
/// use mztag::{sequence::{ConcreteSequence, STANDARD_ALPHABET}, tag::Tag};
/// let mut tag = Tag::new();
/// tag.push_mass_gap(228.11);
/// tag.push_exact(ConcreteSequence::new("PEP", &STANDARD_ALPHABET).unwrap());
/// tag.push_exact(ConcreteSequence::new("TIDE", &STANDARD_ALPHABET).unwrap());
/// tag.push_mass_gap(0.0);
/// assert_eq!(tag.content().len(), 2);
/// assert_eq!(tag.to_string(), "<228.11>PEPTIDE");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Tag {
    content: Vec<TagComponent>,
}

impl Tag {
    /// An empty tag
    pub const fn new() -> Self {
        Self {
            content: Vec::new(),
        }
    }

    /// A tag with an N terminal gap, an exact segment, and a C terminal gap. Gaps of zero are left
    /// out.
    pub fn from_parts(n_term_gap: f64, segment: impl Into<Segment>, c_term_gap: f64) -> Self {
        let mut tag = Self::new();
        tag.push_mass_gap(n_term_gap);
        tag.push_exact(segment);
        tag.push_mass_gap(c_term_gap);
        tag
    }

    /// The components
    pub fn content(&self) -> &[TagComponent] {
        &self.content
    }

    /// Check if there are no components
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Add a mass gap at the C terminal side, a gap of zero is ignored.
    pub fn push_mass_gap(&mut self, mass: f64) {
        if mass != 0.0 {
            self.content.push(TagComponent::MassGap(OrderedFloat(mass)));
        }
    }

    /// Add an exact segment at the C terminal side. If the last component is an exact segment
    /// as well the two are merged with [`Segment::append`]. An empty segment is ignored.
    pub fn push_exact(&mut self, segment: impl Into<Segment>) {
        let segment = segment.into();
        if segment.is_empty() {
            return;
        }
        match self.content.last_mut() {
            Some(TagComponent::ExactSegment(last)) => last.append(&segment),
            _ => self.content.push(TagComponent::ExactSegment(segment)),
        }
    }

    /// Add a component using the push rules of [`Self::push_mass_gap`] and [`Self::push_exact`].
    pub fn push(&mut self, component: TagComponent) {
        match component {
            TagComponent::ExactSegment(segment) => self.push_exact(segment),
            TagComponent::MassGap(mass) => self.push_mass_gap(mass.0),
        }
    }

    /// The sum of the masses of all components, the terminal gaps are only counted if asked
    /// for. A tag that is a single gap has that gap as both terminal gaps, it is only left out
    /// once. No water is added.
    /// # Errors
    /// If a residue is not part of the alphabet, a modification cannot be resolved, or a pattern
    /// segment has a wildcard.
    pub fn mass<L: ModificationLookup + ?Sized>(
        &self,
        include_c_term_gap: bool,
        include_n_term_gap: bool,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<f64, BoxedError<'static, MotifError>> {
        let mut mass = 0.0;
        for component in &self.content {
            mass += component.mass(alphabet, lookup)?;
        }
        let single = self.content.len() == 1;
        if !include_c_term_gap {
            mass -= self.c_terminal_gap();
        }
        if !include_n_term_gap && (include_c_term_gap || !single) {
            mass -= self.n_terminal_gap();
        }
        Ok(mass)
    }

    /// The mass of the first component if that is a gap, zero otherwise
    pub fn n_terminal_gap(&self) -> f64 {
        self.content
            .first()
            .and_then(TagComponent::as_gap)
            .unwrap_or_default()
    }

    /// The mass of the last component if that is a gap, zero otherwise
    pub fn c_terminal_gap(&self) -> f64 {
        self.content
            .last()
            .and_then(TagComponent::as_gap)
            .unwrap_or_default()
    }

    /// The number of residues, every gap counts as one residue.
    pub fn length_in_residues(&self) -> usize {
        self.content
            .iter()
            .map(TagComponent::length_in_residues)
            .sum()
    }

    /// The tag as plain text, for example `<115.20>TAG<110.50>`.
    pub fn as_sequence(&self) -> String {
        self.content.iter().join("")
    }

    /// The longest exact segment, the first one if there is a tie
    pub fn longest_exact_sequence(&self) -> Option<&Segment> {
        self.content
            .iter()
            .filter_map(TagComponent::as_exact)
            .rev()
            .max_by_key(|s| s.len())
    }

    /// The tag read from the other side. Terminal gaps are corrected for the water that moves
    /// from one terminus to the other, which direction depends on the ion series the tag was
    /// read from.
    #[must_use]
    pub fn reverse(&self, y_ion: bool) -> Self {
        let mut reversed = Self::new();
        let last = self.content.len().saturating_sub(1);
        for (index, component) in self.content.iter().enumerate().rev() {
            match component {
                TagComponent::MassGap(mass) => {
                    let correction = if index == last {
                        WATER_MASS
                    } else if index == 0 {
                        -WATER_MASS
                    } else {
                        0.0
                    };
                    reversed.push_mass_gap(if y_ion {
                        mass.0 + correction
                    } else {
                        mass.0 - correction
                    });
                }
                TagComponent::ExactSegment(segment) => reversed.push_exact(segment.reverse()),
            }
        }
        reversed
    }

    /// Check if both termini are gaps of at least the mass of water, so the tag can be reversed
    pub fn can_reverse(&self) -> bool {
        match (self.content.first(), self.content.last()) {
            (Some(TagComponent::MassGap(first)), Some(TagComponent::MassGap(last))) => {
                first.0 >= WATER_MASS && last.0 >= WATER_MASS
            }
            _ => false,
        }
    }

    /// The modifications on this tag as `name(site,site)` joined by commas, with 1 based sites
    /// where every gap counts as one residue. The names are sorted.
    pub fn modifications_summary(&self) -> String {
        let mut sites: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        let mut offset = 0;
        for component in &self.content {
            match component {
                TagComponent::MassGap(_) => offset += 1,
                TagComponent::ExactSegment(segment) => {
                    for modification in segment.modifications() {
                        sites
                            .entry(modification.name.as_str())
                            .or_default()
                            .push(modification.position.site(segment.len()) + offset);
                    }
                    offset += segment.len();
                }
            }
        }
        sites
            .into_iter()
            .map(|(name, sites)| format!("{name}({})", sites.iter().join(",")))
            .join(",")
    }

    /// Check if both tags have the same components in the same order, this includes the
    /// location of the modifications.
    /// # Errors
    /// If a residue is not part of the alphabet or a modification cannot be resolved.
    pub fn is_same_as<L: ModificationLookup + ?Sized>(
        &self,
        other: &Self,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
        lookup: &L,
    ) -> Result<bool, BoxedError<'static, MotifError>> {
        if self.content.len() != other.content.len() {
            return Ok(false);
        }
        for (a, b) in self.content.iter().zip(&other.content) {
            if !a.is_same_as(b, matching_type, alphabet, lookup)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl FromIterator<TagComponent> for Tag {
    fn from_iter<T: IntoIterator<Item = TagComponent>>(iter: T) -> Self {
        let mut tag = Self::new();
        for component in iter {
            tag.push(component);
        }
        tag
    }
}

impl ParseJson for Tag {
    fn from_json_value(value: serde_json::Value) -> Result<Self, BoxedError<'static, MotifError>> {
        let raw: Self = use_serde(value)?;
        Ok(raw.content.into_iter().collect())
    }
}
