use std::fmt::Write;

use context_error::*;

use crate::{
    MotifError,
    parameters::MatchingType,
    sequence::{Modification, ModificationMatch, ResidueAlphabet, SequencePosition},
    tag::{Segment, Tag, TagComponent},
};

impl Tag {
    /// The tag with termini and modifications, for example `NH2-PEP<97.05>TM[Oxidation]-COOH`.
    ///
    /// An exact segment on a terminus is labelled `NH2`/`COOH`, or with the name of its terminal
    /// modification (with `-` replaced by a space). A terminal gap is shown as its mass only if
    /// `include_terminal_gaps` is set and as `...` otherwise.
    pub fn tagged_sequence(&self, include_terminal_gaps: bool) -> String {
        self.render_tagged(include_terminal_gaps, |_, _| Ok(None))
            .unwrap_or_default()
    }

    /// The tag with termini and modifications like [`Self::tagged_sequence`], where a terminus
    /// is labelled with the first fixed modification that can be placed on it. A fixed
    /// modification takes precedence over a modification placed on the segment. Terminal
    /// modifications with a residue restriction only apply if the segment starts or ends with
    /// the modification pattern.
    /// # Errors
    /// If a residue code in the tag or a modification pattern is not part of the alphabet.
    pub fn tagged_sequence_with_fixed(
        &self,
        include_terminal_gaps: bool,
        fixed_modifications: &[&Modification],
        matching_type: MatchingType,
        alphabet: &ResidueAlphabet,
    ) -> Result<String, BoxedError<'static, MotifError>> {
        self.render_tagged(include_terminal_gaps, |segment, n_terminal| {
            for modification in fixed_modifications.iter().copied() {
                let kind = modification.kind;
                let placed = if n_terminal {
                    kind.is_n_terminal()
                        && (!kind.is_residue_specific()
                            || modification
                                .pattern
                                .is_starting(segment, matching_type, alphabet)?)
                } else {
                    kind.is_c_terminal()
                        && (!kind.is_residue_specific()
                            || modification
                                .pattern
                                .is_ending(segment, matching_type, alphabet)?)
                };
                if placed {
                    return Ok(Some(modification.name.as_str()));
                }
            }
            Ok(None)
        })
    }

    /// Render the tagged sequence, `fixed_label` gives the name of the fixed modification on the
    /// N terminus (`true`) or C terminus (`false`) of a segment if there is one.
    fn render_tagged<'a>(
        &self,
        include_terminal_gaps: bool,
        fixed_label: impl Fn(
            &Segment,
            bool,
        ) -> Result<Option<&'a str>, BoxedError<'static, MotifError>>,
    ) -> Result<String, BoxedError<'static, MotifError>> {
        let mut output = String::new();
        let last = self.content().len().saturating_sub(1);
        for (index, component) in self.content().iter().enumerate() {
            match component {
                TagComponent::MassGap(mass) => {
                    if include_terminal_gaps || (index != 0 && index != last) {
                        write!(&mut output, "<{:.2}>", mass.0).ok();
                    } else {
                        output.push_str("...");
                    }
                }
                TagComponent::ExactSegment(segment) => {
                    if index == 0 {
                        output.push_str(&terminal_label(
                            fixed_label(segment, true)?,
                            segment.modification_at(SequencePosition::NTerm),
                            "NH2",
                        ));
                        output.push('-');
                    }
                    segment.fmt_residues(&mut output).ok();
                    if index == last {
                        output.push('-');
                        output.push_str(&terminal_label(
                            fixed_label(segment, false)?,
                            segment.modification_at(SequencePosition::CTerm),
                            "COOH",
                        ));
                    }
                }
            }
        }
        Ok(output)
    }
}

fn terminal_label(
    fixed: Option<&str>,
    placed: Option<&ModificationMatch>,
    default: &str,
) -> String {
    fixed
        .or_else(|| placed.map(|m| m.name.as_str()))
        .map_or_else(|| default.to_string(), |name| name.replace('-', " "))
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for component in self.content() {
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::sequence::{
        ConcreteSequence, ModificationKind, PositionalPattern, STANDARD_ALPHABET,
    };

    fn exact(text: &str) -> ConcreteSequence {
        ConcreteSequence::new(text, &STANDARD_ALPHABET).unwrap()
    }

    #[test]
    fn closed_termini() {
        let mut tag = Tag::new();
        tag.push_exact(
            exact("PEP")
                .with_modification("Acetyl", SequencePosition::NTerm)
                .unwrap(),
        );
        tag.push_mass_gap(97.052_764);
        tag.push_exact(
            exact("TM")
                .with_modification("Oxidation", SequencePosition::Index(1))
                .unwrap(),
        );
        assert_eq!(
            tag.tagged_sequence(false),
            "Acetyl-PEP<97.05>TM[Oxidation]-COOH"
        );
        assert_eq!(tag.to_string(), "PEP<97.05>TM");
    }

    #[test]
    fn open_termini() {
        let tag = Tag::from_parts(
            100.0,
            exact("PEP")
                .with_modification("Amidated-ish", SequencePosition::CTerm)
                .unwrap(),
            0.0,
        );
        assert_eq!(tag.tagged_sequence(false), "...PEP-Amidated ish");
        assert_eq!(tag.tagged_sequence(true), "<100.00>PEP-Amidated ish");
        let both = Tag::from_parts(1.0, exact("K"), 2.5);
        assert_eq!(both.tagged_sequence(false), "...K...");
        assert_eq!(both.tagged_sequence(true), "<1.00>K<2.50>");
        assert_eq!(Tag::new().tagged_sequence(true), "");
    }

    #[test]
    fn pattern_segment() {
        let tag = Tag::from_parts(
            0.0,
            PositionalPattern::from_literal("P[IL]").unwrap(),
            97.052_764,
        );
        assert_eq!(tag.tagged_sequence(true), "NH2-P[IL]<97.05>");
    }

    #[test]
    fn fixed_terminal_labels() {
        let a = &*STANDARD_ALPHABET;
        let tag = Tag::from_parts(0.0, exact("QPEK"), 0.0);
        let tmt = Modification::new(
            "TMT-6plex",
            229.162_932,
            PositionalPattern::new(),
            ModificationKind::NTerm,
        );
        let pyro = Modification::new(
            "Pyro-glu",
            -17.026_549,
            PositionalPattern::from_literal("E").unwrap(),
            ModificationKind::NTermResidue,
        );
        let amidation = Modification::new(
            "Amidated",
            -0.984_016,
            PositionalPattern::from_literal("K").unwrap(),
            ModificationKind::CTermResidue,
        );
        assert_eq!(
            tag.tagged_sequence_with_fixed(false, &[&tmt], MatchingType::Strict, a)
                .unwrap(),
            "TMT 6plex-QPEK-COOH"
        );
        // Pyro-glu needs an E at the N terminus
        assert_eq!(
            tag.tagged_sequence_with_fixed(
                false,
                &[&pyro, &amidation],
                MatchingType::Strict,
                a
            )
            .unwrap(),
            "NH2-QPEK-Amidated"
        );
        // The fixed modification wins over a placed one
        let placed = Tag::from_parts(
            0.0,
            exact("QPEK")
                .with_modification("Acetyl", SequencePosition::NTerm)
                .unwrap(),
            0.0,
        );
        assert_eq!(
            placed
                .tagged_sequence_with_fixed(false, &[&tmt], MatchingType::Strict, a)
                .unwrap(),
            "TMT 6plex-QPEK-COOH"
        );
        assert_eq!(
            placed
                .tagged_sequence_with_fixed(false, &[], MatchingType::Strict, a)
                .unwrap(),
            placed.tagged_sequence(false)
        );
    }
}
