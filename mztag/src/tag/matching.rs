use std::collections::{BTreeMap, BTreeSet};

use context_error::*;

use crate::{
    MotifError,
    parameters::{GapStrategy, MatchingType, SequenceMatchingParameters},
    sequence::{Modification, ModificationKind, ModificationLookup, ResidueAlphabet},
    tag::{Segment, Tag, TagComponent},
};

/// The modification masses a residue can carry, a fixed mass that is always present and
/// variable masses of which at most one is present.
#[derive(Clone, Debug, Default, PartialEq)]
struct ModificationMasses {
    fixed: f64,
    variable: Vec<f64>,
}

/// Residue code to modification masses, `None` applies to any residue.
type ModificationMap = BTreeMap<Option<char>, ModificationMasses>;

/// The fixed and variable modifications the residues in a mass gap can carry. Residue
/// modifications apply anywhere in the gap, protein terminal modifications only on the first or
/// last residue of the protein sequence. Peptide terminal modifications are not placed in gaps.
/// ```
/// use mztag::{sequence::*, tag::GapModifications};
/// let table = ModificationTable::new().with(Modification::new(
///     "Oxidation",
///     15.994_915,
///     PositionalPattern::from_literal("M").unwrap(),
///     ModificationKind::Residue,
/// ));
/// let modifications = GapModifications::resolve(&table, &[], &["Oxidation"]).unwrap();
/// assert!(!modifications.is_empty());
/// assert!(GapModifications::resolve(&table, &["Phospho"], &[]).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GapModifications {
    residues: ModificationMap,
    protein_n_term: ModificationMap,
    protein_c_term: ModificationMap,
}

impl GapModifications {
    /// No modifications, gaps are filled with bare residue masses
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the fixed and variable modifications by name.
    /// # Errors
    /// * If a name cannot be resolved.
    /// * If a fixed residue modification has a pattern of more than one position.
    /// * If the anchor of a residue specific modification pattern lies outside of the pattern.
    pub fn resolve<L: ModificationLookup + ?Sized>(
        lookup: &L,
        fixed: &[&str],
        variable: &[&str],
    ) -> Result<Self, BoxedError<'static, MotifError>> {
        let mut result = Self::new();
        for (names, is_fixed) in [(fixed, true), (variable, false)] {
            for name in names {
                let modification = lookup.get(name)?;
                if is_fixed
                    && modification.kind.is_residue_specific()
                    && modification.pattern.len() > 1
                {
                    return Err(BoxedError::new(
                        MotifError::InvalidParameters,
                        "Unsupported fixed modification",
                        format!(
                            "The fixed modification '{name}' targets a pattern of more than one residue, use it as a variable modification instead"
                        ),
                        Context::show(modification.pattern.to_string()),
                    ));
                }
                let map = match modification.kind {
                    ModificationKind::Residue => &mut result.residues,
                    ModificationKind::NTermProtein | ModificationKind::NTermProteinResidue => {
                        &mut result.protein_n_term
                    }
                    ModificationKind::CTermProtein | ModificationKind::CTermProteinResidue => {
                        &mut result.protein_c_term
                    }
                    ModificationKind::NTerm
                    | ModificationKind::CTerm
                    | ModificationKind::NTermResidue
                    | ModificationKind::CTermResidue => {
                        tracing::debug!(name, "peptide terminal modification ignored in gaps");
                        continue;
                    }
                };
                for target in targets(modification)? {
                    let masses = map.entry(target).or_default();
                    if is_fixed {
                        masses.fixed += modification.mass;
                    } else {
                        masses.variable.push(modification.mass);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Check if there are no modifications
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
            && self.protein_n_term.is_empty()
            && self.protein_c_term.is_empty()
    }

    /// The summed fixed mass and the variable masses for the residue at `index` of a protein
    /// sequence of `length` residues.
    fn masses_at(&self, residue: char, index: usize, length: usize) -> (f64, Vec<f64>) {
        let residue = residue.to_ascii_uppercase();
        let mut fixed = 0.0;
        let mut variable = Vec::new();
        let mut collect = |map: &ModificationMap| {
            for key in [None, Some(residue)] {
                if let Some(masses) = map.get(&key) {
                    fixed += masses.fixed;
                    variable.extend_from_slice(&masses.variable);
                }
            }
        };
        collect(&self.residues);
        if index == 0 {
            collect(&self.protein_n_term);
        }
        if index + 1 == length {
            collect(&self.protein_c_term);
        }
        (fixed, variable)
    }
}

/// The residues a modification can be placed on, `None` if it is not residue specific or allows
/// any residue.
fn targets(
    modification: &Modification,
) -> Result<Vec<Option<char>>, BoxedError<'static, MotifError>> {
    if !modification.kind.is_residue_specific() || modification.pattern.is_empty() {
        return Ok(vec![None]);
    }
    match modification.pattern.residues_at_anchor() {
        Some(set) if set.is_empty() => Ok(vec![None]),
        Some(set) => Ok(set.iter().map(|c| Some(*c)).collect()),
        None => Err(BoxedError::new(
            MotifError::InvalidParameters,
            "Invalid modification pattern",
            format!(
                "The anchor {} of the pattern of '{}' lies outside of the pattern",
                modification.pattern.anchor(),
                modification.name
            ),
            Context::show(modification.pattern.to_string()),
        )),
    }
}

/// The side of the anchor a walk moves towards
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Direction {
    /// Towards the N terminus, decreasing indices
    NTerminal,
    /// Towards the C terminus, increasing indices
    CTerminal,
}

/// A cursor is the boundary of the matched stretch. Moving towards the N terminus it is the index
/// of the first matched residue, moving towards the C terminus it is one past the last matched
/// residue.
type Cursor = usize;

impl Tag {
    /// Match this tag on a protein sequence, starting from an exact segment that is placed at a
    /// known location. The exact segment at `anchor_component_index` has to match with its first
    /// residue at the 0 based `anchor_index` of the sequence. From there the components to the N
    /// terminal side and C terminal side are placed in turn: exact segments have to match the
    /// residues next to the matched stretch, mass gaps take residues until their summed mass is
    /// within the tolerance of the gap mass.
    ///
    /// With [`GapStrategy::Greedy`] a gap takes the first stretch that fits and never
    /// reconsiders, with [`GapStrategy::Exhaustive`] every stretch that fits is followed.
    ///
    /// Returns the inclusive 0 based span on the sequence, `Ok(None)` if the tag does not match
    /// or the span holds more `X` residues than the parameters allow. If more than one span
    /// matches the shortest one is returned.
    ///
    /// The gaps are filled with bare residue masses, see
    /// [`Self::anchored_match_with_modifications`] to take modifications into account.
    /// # Errors
    /// If the anchor component is not an exact segment, or a residue code in the tag or the
    /// sequence is not part of the alphabet.
    pub fn anchored_match(
        &self,
        sequence: &str,
        anchor_index: usize,
        anchor_component_index: usize,
        parameters: &SequenceMatchingParameters,
        alphabet: &ResidueAlphabet,
    ) -> Result<Option<(usize, usize)>, BoxedError<'static, MotifError>> {
        self.anchored_match_with_modifications(
            sequence,
            anchor_index,
            anchor_component_index,
            parameters,
            alphabet,
            &GapModifications::new(),
        )
    }

    /// Match this tag on a protein sequence like [`Self::anchored_match`], but the residues that
    /// fill a mass gap can carry modifications. Fixed modifications always add their mass, every
    /// residue can additionally carry one of the variable modifications that target it.
    /// # Errors
    /// If the anchor component is not an exact segment, or a residue code in the tag or the
    /// sequence is not part of the alphabet.
    pub fn anchored_match_with_modifications(
        &self,
        sequence: &str,
        anchor_index: usize,
        anchor_component_index: usize,
        parameters: &SequenceMatchingParameters,
        alphabet: &ResidueAlphabet,
        modifications: &GapModifications,
    ) -> Result<Option<(usize, usize)>, BoxedError<'static, MotifError>> {
        let anchor = match self.content().get(anchor_component_index) {
            Some(TagComponent::ExactSegment(segment)) => segment,
            Some(TagComponent::MassGap(_)) => {
                return Err(BoxedError::new(
                    MotifError::InvalidPosition,
                    "Invalid anchor component",
                    format!(
                        "Component {anchor_component_index} is a mass gap, only exact segments can be used as anchor"
                    ),
                    Context::show(self.to_string()),
                ));
            }
            None => {
                return Err(BoxedError::new(
                    MotifError::InvalidPosition,
                    "Invalid anchor component",
                    format!(
                        "Component {anchor_component_index} is outside of the tag with {} components",
                        self.content().len()
                    ),
                    Context::show(self.to_string()),
                ));
            }
        };
        let Some(anchor_end) = place_exact(
            anchor,
            sequence,
            anchor_index,
            Direction::CTerminal,
            parameters.matching_type,
            alphabet,
        )?
        else {
            tracing::debug!(tag = %self, anchor_index, "anchor segment does not match");
            return Ok(None);
        };

        let starts = walk(
            self.content()[..anchor_component_index].iter().rev(),
            sequence,
            anchor_index,
            Direction::NTerminal,
            parameters,
            alphabet,
            modifications,
        )?;
        if starts.is_empty() {
            tracing::debug!(tag = %self, anchor_index, "N terminal side does not match");
            return Ok(None);
        }
        let ends = walk(
            self.content()[anchor_component_index + 1..].iter(),
            sequence,
            anchor_end,
            Direction::CTerminal,
            parameters,
            alphabet,
            modifications,
        )?;
        if ends.is_empty() {
            tracing::debug!(tag = %self, anchor_index, "C terminal side does not match");
            return Ok(None);
        }

        for start in starts.iter().rev() {
            for end in &ends {
                let stretch = sequence.get(*start..*end).unwrap_or_default();
                if parameters.exceeds_x_limit(stretch) {
                    tracing::trace!(start, end, stretch, "too many X residues");
                    continue;
                }
                tracing::debug!(tag = %self, start, end = end - 1, "tag matched");
                return Ok(Some((*start, end - 1)));
            }
        }
        tracing::debug!(tag = %self, anchor_index, "all matched stretches exceed the X limit");
        Ok(None)
    }

    /// The 1 based sites on this tag where the modification could be placed, every mass gap
    /// counts as a single site. Residue modifications are searched in every exact segment,
    /// terminal modifications give the first or last site. Terminal modifications with a residue
    /// restriction are only possible if the terminal exact segment starts or ends with the
    /// modification pattern, a terminal gap could hold any residue so always qualifies.
    /// # Errors
    /// If a residue code in the tag or the modification pattern is not part of the alphabet.
    pub fn potential_modification_sites(
        &self,
        modification: &Modification,
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<Vec<usize>, BoxedError<'static, MotifError>> {
        let pattern = &modification.pattern;
        let mut sites = Vec::new();
        match modification.kind {
            ModificationKind::Residue => {
                let mut offset = 0;
                for component in self.content() {
                    match component {
                        TagComponent::ExactSegment(segment) => {
                            for index in pattern.indexes(segment, matching_type, alphabet)? {
                                let site = index.checked_add_signed(pattern.anchor());
                                if let Some(site) = site.filter(|s| *s > 0) {
                                    sites.push(site + offset);
                                }
                            }
                            offset += segment.len();
                        }
                        TagComponent::MassGap(_) => offset += 1,
                    }
                }
            }
            ModificationKind::NTerm | ModificationKind::NTermProtein => sites.push(1),
            ModificationKind::CTerm | ModificationKind::CTermProtein => {
                sites.push(self.length_in_residues());
            }
            ModificationKind::NTermResidue | ModificationKind::NTermProteinResidue => {
                match self.content().first() {
                    Some(TagComponent::ExactSegment(segment)) => {
                        if pattern.is_starting(segment, matching_type, alphabet)? {
                            sites.push(1);
                        }
                    }
                    Some(TagComponent::MassGap(_)) => sites.push(1),
                    None => (),
                }
            }
            ModificationKind::CTermResidue | ModificationKind::CTermProteinResidue => {
                match self.content().last() {
                    Some(TagComponent::ExactSegment(segment)) => {
                        if pattern.is_ending(segment, matching_type, alphabet)? {
                            sites.push(self.length_in_residues());
                        }
                    }
                    Some(TagComponent::MassGap(_)) => sites.push(self.length_in_residues()),
                    None => (),
                }
            }
        }
        Ok(sites)
    }
}

/// Place all components in order, starting from the cursor. Returns all cursors the walk can
/// end on, empty if the components cannot be placed.
fn walk<'a>(
    components: impl Iterator<Item = &'a TagComponent>,
    sequence: &str,
    cursor: Cursor,
    direction: Direction,
    parameters: &SequenceMatchingParameters,
    alphabet: &ResidueAlphabet,
    modifications: &GapModifications,
) -> Result<BTreeSet<Cursor>, BoxedError<'static, MotifError>> {
    let mut frontier = BTreeSet::from([cursor]);
    for component in components {
        let mut next = BTreeSet::new();
        for cursor in frontier {
            match component {
                TagComponent::ExactSegment(segment) => {
                    next.extend(place_exact(
                        segment,
                        sequence,
                        cursor,
                        direction,
                        parameters.matching_type,
                        alphabet,
                    )?);
                }
                TagComponent::MassGap(mass) => next.extend(place_gap(
                    mass.0,
                    sequence,
                    cursor,
                    direction,
                    parameters,
                    alphabet,
                    modifications,
                )?),
            }
        }
        if next.is_empty() {
            return Ok(next);
        }
        frontier = next;
    }
    Ok(frontier)
}

/// Place an exact segment next to the cursor, every position of a pattern segment allows any of
/// its residues.
fn place_exact(
    segment: &Segment,
    sequence: &str,
    cursor: Cursor,
    direction: Direction,
    matching_type: MatchingType,
    alphabet: &ResidueAlphabet,
) -> Result<Option<Cursor>, BoxedError<'static, MotifError>> {
    let (start, next) = match direction {
        Direction::NTerminal => {
            let Some(start) = cursor.checked_sub(segment.len()) else {
                return Ok(None);
            };
            (start, start)
        }
        Direction::CTerminal => (cursor, cursor + segment.len()),
    };
    let matched = segment
        .as_pattern()
        .matches_at(sequence, start, matching_type, alphabet)?;
    Ok(matched.then_some(next))
}

/// Place a mass gap next to the cursor by taking residues one by one until the summed mass is
/// within tolerance. Variable modifications split the summed mass into several options, the
/// walk goes on as long as any option is not too high. The greedy strategy stops at the first
/// fit, the exhaustive one continues until every option is too high and reports every fit.
fn place_gap(
    mass: f64,
    sequence: &str,
    mut cursor: Cursor,
    direction: Direction,
    parameters: &SequenceMatchingParameters,
    alphabet: &ResidueAlphabet,
    modifications: &GapModifications,
) -> Result<Vec<Cursor>, BoxedError<'static, MotifError>> {
    let residues = sequence.as_bytes();
    let maximum = mass + parameters.mass_tolerance;
    let mut fits = Vec::new();
    let mut totals = vec![0.0];
    loop {
        let index = match direction {
            Direction::NTerminal => {
                let Some(index) = cursor.checked_sub(1).filter(|i| *i < residues.len()) else {
                    break;
                };
                cursor = index;
                index
            }
            Direction::CTerminal => {
                if cursor >= residues.len() {
                    break;
                }
                cursor += 1;
                cursor - 1
            }
        };
        let residue = char::from(residues[index]);
        let residue_mass = alphabet.mass(residue)?;
        let (fixed, variable) = modifications.masses_at(residue, index, residues.len());
        let mut next = Vec::with_capacity(totals.len() * (variable.len() + 1));
        for total in &totals {
            let base = total + residue_mass + fixed;
            for extra in std::iter::once(0.0).chain(variable.iter().copied()) {
                if base + extra <= maximum {
                    next.push(base + extra);
                }
            }
        }
        next.sort_by(f64::total_cmp);
        next.dedup();
        tracing::trace!(gap = mass, ?next, cursor, %residue, "gap walk step");
        if next.is_empty() {
            break;
        }
        if next
            .iter()
            .any(|total| (total - mass).abs() <= parameters.mass_tolerance)
        {
            fits.push(cursor);
            if parameters.gap_strategy == GapStrategy::Greedy {
                break;
            }
        }
        totals = next;
    }
    Ok(fits)
}
