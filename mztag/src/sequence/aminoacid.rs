//! The standard amino acids with their masses and ambiguity relations

use serde::{Deserialize, Serialize};

/// An amino acid, alongside the standard ones some [ambiguous (B/J/Z/X) and non-standard (U/O)](https://www.insdc.org/submitting-standards/feature-table/#7.4.3) are included.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
pub enum AminoAcid {
    /// Ala, A
    #[default]
    Alanine = 0,
    /// Arg, R
    Arginine,
    /// Asn, N
    Asparagine,
    /// Asp, D
    AsparticAcid,
    /// Cys, C
    Cysteine,
    /// Gln, Q
    Glutamine,
    /// Glu, E
    GlutamicAcid,
    /// Gly, G
    Glycine,
    /// His, H
    Histidine,
    /// Ile, I
    Isoleucine,
    /// Leu, L
    Leucine,
    /// Lys, K
    Lysine,
    /// Met, M
    Methionine,
    /// Phe, F
    Phenylalanine,
    /// Pro, P
    Proline,
    /// Ser, S
    Serine,
    /// Thr, T
    Threonine,
    /// Trp, W
    Tryptophan,
    /// Tyr, Y
    Tyrosine,
    /// Val, V
    Valine,
    /// Asx, B
    AmbiguousAsparagine,
    /// Xle, J
    AmbiguousLeucine,
    /// Glx, Z
    AmbiguousGlutamine,
    /// Sec, U
    Selenocysteine,
    /// Pyl, O
    Pyrrolysine,
    /// Xxx, X
    Unknown,
}

impl AminoAcid {
    /// The total number of amino acids
    pub const TOTAL_NUMBER: usize = Self::Unknown as usize + 1;

    /// All amino acids, ambiguous ones included
    pub const ALL_AMINO_ACIDS: &'static [Self] = &[
        Self::Alanine,
        Self::Arginine,
        Self::Asparagine,
        Self::AsparticAcid,
        Self::Cysteine,
        Self::Glutamine,
        Self::GlutamicAcid,
        Self::Glycine,
        Self::Histidine,
        Self::Isoleucine,
        Self::Leucine,
        Self::Lysine,
        Self::Methionine,
        Self::Phenylalanine,
        Self::Proline,
        Self::Serine,
        Self::Threonine,
        Self::Tryptophan,
        Self::Tyrosine,
        Self::Valine,
        Self::AmbiguousAsparagine,
        Self::AmbiguousLeucine,
        Self::AmbiguousGlutamine,
        Self::Selenocysteine,
        Self::Pyrrolysine,
        Self::Unknown,
    ];

    /// All amino acids that stand for exactly one residue (everything except B/J/Z/X)
    pub const CONCRETE_AMINO_ACIDS: &'static [Self] = &[
        Self::Alanine,
        Self::Arginine,
        Self::Asparagine,
        Self::AsparticAcid,
        Self::Cysteine,
        Self::Glutamine,
        Self::GlutamicAcid,
        Self::Glycine,
        Self::Histidine,
        Self::Isoleucine,
        Self::Leucine,
        Self::Lysine,
        Self::Methionine,
        Self::Phenylalanine,
        Self::Proline,
        Self::Serine,
        Self::Threonine,
        Self::Tryptophan,
        Self::Tyrosine,
        Self::Valine,
        Self::Selenocysteine,
        Self::Pyrrolysine,
    ];

    /// Get the single letter representation of the amino acid
    pub const fn one_letter_code(self) -> char {
        match self {
            Self::Alanine => 'A',
            Self::AmbiguousAsparagine => 'B',
            Self::Cysteine => 'C',
            Self::AsparticAcid => 'D',
            Self::GlutamicAcid => 'E',
            Self::Phenylalanine => 'F',
            Self::Glycine => 'G',
            Self::Histidine => 'H',
            Self::Isoleucine => 'I',
            Self::AmbiguousLeucine => 'J',
            Self::Lysine => 'K',
            Self::Leucine => 'L',
            Self::Methionine => 'M',
            Self::Asparagine => 'N',
            Self::Pyrrolysine => 'O',
            Self::Proline => 'P',
            Self::Glutamine => 'Q',
            Self::Arginine => 'R',
            Self::Serine => 'S',
            Self::Threonine => 'T',
            Self::Selenocysteine => 'U',
            Self::Valine => 'V',
            Self::Tryptophan => 'W',
            Self::Unknown => 'X',
            Self::Tyrosine => 'Y',
            Self::AmbiguousGlutamine => 'Z',
        }
    }

    /// Get the 3 letter code for the amino acid
    pub const fn three_letter_code(self) -> &'static str {
        match self {
            Self::Alanine => "Ala",
            Self::AmbiguousAsparagine => "Asx",
            Self::Cysteine => "Cys",
            Self::AsparticAcid => "Asp",
            Self::GlutamicAcid => "Glu",
            Self::Phenylalanine => "Phe",
            Self::Glycine => "Gly",
            Self::Histidine => "His",
            Self::Isoleucine => "Ile",
            Self::AmbiguousLeucine => "Xle",
            Self::Lysine => "Lys",
            Self::Leucine => "Leu",
            Self::Methionine => "Met",
            Self::Asparagine => "Asn",
            Self::Pyrrolysine => "Pyl",
            Self::Proline => "Pro",
            Self::Glutamine => "Gln",
            Self::Arginine => "Arg",
            Self::Serine => "Ser",
            Self::Threonine => "Thr",
            Self::Selenocysteine => "Sec",
            Self::Valine => "Val",
            Self::Tryptophan => "Trp",
            Self::Unknown => "Xaa",
            Self::Tyrosine => "Tyr",
            Self::AmbiguousGlutamine => "Glx",
        }
    }

    /// Get the full name for the amino acid
    pub const fn name(self) -> &'static str {
        match self {
            Self::Alanine => "Alanine",
            Self::AmbiguousAsparagine => "Asparagine or Aspartic Acid",
            Self::Cysteine => "Cysteine",
            Self::AsparticAcid => "Aspartic Acid",
            Self::GlutamicAcid => "Glutamic Acid",
            Self::Phenylalanine => "Phenylalanine",
            Self::Glycine => "Glycine",
            Self::Histidine => "Histidine",
            Self::Isoleucine => "Isoleucine",
            Self::AmbiguousLeucine => "Isoleucine or Leucine",
            Self::Lysine => "Lysine",
            Self::Leucine => "Leucine",
            Self::Methionine => "Methionine",
            Self::Asparagine => "Asparagine",
            Self::Pyrrolysine => "Pyrrolysine",
            Self::Proline => "Proline",
            Self::Glutamine => "Glutamine",
            Self::Arginine => "Arginine",
            Self::Serine => "Serine",
            Self::Threonine => "Threonine",
            Self::Selenocysteine => "Selenocysteine",
            Self::Valine => "Valine",
            Self::Tryptophan => "Tryptophan",
            Self::Unknown => "Unknown",
            Self::Tyrosine => "Tyrosine",
            Self::AmbiguousGlutamine => "Glutamine or Glutamic Acid",
        }
    }

    /// The monoisotopic mass of the residue (so without water). The ambiguous amino acids have the
    /// average of the monoisotopic masses of the residues they stand for.
    pub fn monoisotopic_mass(self) -> f64 {
        match self {
            Self::Alanine => 71.037_114,
            Self::Arginine => 156.101_111,
            Self::Asparagine => 114.042_927,
            Self::AsparticAcid => 115.026_943,
            Self::Cysteine => 103.009_185,
            Self::GlutamicAcid => 129.042_593,
            Self::Glutamine => 128.058_578,
            Self::Glycine => 57.021_464,
            Self::Histidine => 137.058_912,
            Self::Isoleucine | Self::Leucine | Self::AmbiguousLeucine => 113.084_064,
            Self::Lysine => 128.094_963,
            Self::Methionine => 131.040_485,
            Self::Phenylalanine => 147.068_414,
            Self::Proline => 97.052_764,
            Self::Serine => 87.032_028,
            Self::Threonine => 101.047_679,
            Self::Selenocysteine => 150.953_636,
            Self::Tryptophan => 186.079_313,
            Self::Tyrosine => 163.063_32,
            Self::Valine => 99.068_414,
            Self::Pyrrolysine => 237.147_727,
            Self::AmbiguousAsparagine | Self::AmbiguousGlutamine | Self::Unknown => {
                let options = self.sub_residues();
                options.iter().map(|aa| aa.monoisotopic_mass()).sum::<f64>() / options.len() as f64
            }
        }
    }

    /// The concrete amino acids this amino acid can stand for, a concrete amino acid only stands for itself
    pub const fn sub_residues(self) -> &'static [Self] {
        match self {
            Self::AmbiguousAsparagine => &[Self::AsparticAcid, Self::Asparagine],
            Self::AmbiguousLeucine => &[Self::Isoleucine, Self::Leucine],
            Self::AmbiguousGlutamine => &[Self::GlutamicAcid, Self::Glutamine],
            Self::Unknown => Self::CONCRETE_AMINO_ACIDS,
            Self::Alanine => &[Self::Alanine],
            Self::Arginine => &[Self::Arginine],
            Self::Asparagine => &[Self::Asparagine],
            Self::AsparticAcid => &[Self::AsparticAcid],
            Self::Cysteine => &[Self::Cysteine],
            Self::Glutamine => &[Self::Glutamine],
            Self::GlutamicAcid => &[Self::GlutamicAcid],
            Self::Glycine => &[Self::Glycine],
            Self::Histidine => &[Self::Histidine],
            Self::Isoleucine => &[Self::Isoleucine],
            Self::Leucine => &[Self::Leucine],
            Self::Lysine => &[Self::Lysine],
            Self::Methionine => &[Self::Methionine],
            Self::Phenylalanine => &[Self::Phenylalanine],
            Self::Proline => &[Self::Proline],
            Self::Serine => &[Self::Serine],
            Self::Threonine => &[Self::Threonine],
            Self::Tryptophan => &[Self::Tryptophan],
            Self::Tyrosine => &[Self::Tyrosine],
            Self::Valine => &[Self::Valine],
            Self::Selenocysteine => &[Self::Selenocysteine],
            Self::Pyrrolysine => &[Self::Pyrrolysine],
        }
    }

    /// The ambiguous amino acids that include this amino acid
    pub const fn combinations(self) -> &'static [Self] {
        match self {
            Self::Asparagine | Self::AsparticAcid => &[Self::AmbiguousAsparagine, Self::Unknown],
            Self::Isoleucine | Self::Leucine => &[Self::AmbiguousLeucine, Self::Unknown],
            Self::Glutamine | Self::GlutamicAcid => &[Self::AmbiguousGlutamine, Self::Unknown],
            Self::Unknown => &[],
            _ => &[Self::Unknown],
        }
    }

    /// The amino acids that cannot be distinguished from this one based on mass alone
    pub const fn isobaric_siblings(self) -> &'static [Self] {
        match self {
            Self::Isoleucine | Self::Leucine | Self::AmbiguousLeucine => {
                &[Self::Isoleucine, Self::AmbiguousLeucine, Self::Leucine]
            }
            _ => &[],
        }
    }

    /// Check if this amino acid stands for more than one residue
    pub const fn is_ambiguous(self) -> bool {
        matches!(
            self,
            Self::AmbiguousAsparagine
                | Self::AmbiguousLeucine
                | Self::AmbiguousGlutamine
                | Self::Unknown
        )
    }
}

impl std::fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.one_letter_code())
    }
}

impl std::str::FromStr for AminoAcid {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

impl TryFrom<&str> for AminoAcid {
    type Error = ();
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => ch.try_into(),
            _ => Err(()),
        }
    }
}

impl TryFrom<char> for AminoAcid {
    type Error = ();
    fn try_from(value: char) -> Result<Self, Self::Error> {
        if value.is_ascii() {
            let num = value as u8;
            num.try_into()
        } else {
            Err(())
        }
    }
}

impl TryFrom<&u8> for AminoAcid {
    type Error = ();
    fn try_from(value: &u8) -> Result<Self, Self::Error> {
        match value {
            b'A' | b'a' => Ok(Self::Alanine),
            b'B' | b'b' => Ok(Self::AmbiguousAsparagine),
            b'C' | b'c' => Ok(Self::Cysteine),
            b'D' | b'd' => Ok(Self::AsparticAcid),
            b'E' | b'e' => Ok(Self::GlutamicAcid),
            b'F' | b'f' => Ok(Self::Phenylalanine),
            b'G' | b'g' => Ok(Self::Glycine),
            b'H' | b'h' => Ok(Self::Histidine),
            b'I' | b'i' => Ok(Self::Isoleucine),
            b'J' | b'j' => Ok(Self::AmbiguousLeucine),
            b'K' | b'k' => Ok(Self::Lysine),
            b'L' | b'l' => Ok(Self::Leucine),
            b'M' | b'm' => Ok(Self::Methionine),
            b'N' | b'n' => Ok(Self::Asparagine),
            b'O' | b'o' => Ok(Self::Pyrrolysine),
            b'P' | b'p' => Ok(Self::Proline),
            b'Q' | b'q' => Ok(Self::Glutamine),
            b'R' | b'r' => Ok(Self::Arginine),
            b'S' | b's' => Ok(Self::Serine),
            b'T' | b't' => Ok(Self::Threonine),
            b'U' | b'u' => Ok(Self::Selenocysteine),
            b'V' | b'v' => Ok(Self::Valine),
            b'W' | b'w' => Ok(Self::Tryptophan),
            b'X' | b'x' => Ok(Self::Unknown),
            b'Y' | b'y' => Ok(Self::Tyrosine),
            b'Z' | b'z' => Ok(Self::AmbiguousGlutamine),
            _ => Err(()),
        }
    }
}

impl TryFrom<u8> for AminoAcid {
    type Error = ();
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(&value)
    }
}
