//! Modifications: their definitions, a lookup table to resolve them by name, and their placements on sequences

use std::collections::HashMap;

use context_error::*;
use serde::{Deserialize, Serialize};

use crate::{
    MotifError,
    parameters::{ParseJson, use_serde},
    sequence::{PositionalPattern, SequencePosition},
};

/// Where a modification can be placed.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum ModificationKind {
    /// On any residue that matches the modification pattern
    #[default]
    Residue,
    /// On the peptide N terminus
    NTerm,
    /// On the protein N terminus
    NTermProtein,
    /// On the peptide C terminus
    CTerm,
    /// On the protein C terminus
    CTermProtein,
    /// On the peptide N terminus, only if the first residues match the modification pattern
    NTermResidue,
    /// On the protein N terminus, only if the first residues match the modification pattern
    NTermProteinResidue,
    /// On the peptide C terminus, only if the last residues match the modification pattern
    CTermResidue,
    /// On the protein C terminus, only if the last residues match the modification pattern
    CTermProteinResidue,
}

impl ModificationKind {
    /// Check if this kind is placed on the N terminus
    pub const fn is_n_terminal(self) -> bool {
        matches!(
            self,
            Self::NTerm | Self::NTermProtein | Self::NTermResidue | Self::NTermProteinResidue
        )
    }

    /// Check if this kind is placed on the C terminus
    pub const fn is_c_terminal(self) -> bool {
        matches!(
            self,
            Self::CTerm | Self::CTermProtein | Self::CTermResidue | Self::CTermProteinResidue
        )
    }

    /// Check if this kind has a residue restriction
    pub const fn is_residue_specific(self) -> bool {
        matches!(
            self,
            Self::Residue
                | Self::NTermResidue
                | Self::NTermProteinResidue
                | Self::CTermResidue
                | Self::CTermProteinResidue
        )
    }
}

/// A modification definition
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Modification {
    /// The name, unique within a [`ModificationLookup`]
    pub name: String,
    /// The monoisotopic mass difference in Dalton
    pub mass: f64,
    /// The residues the modification can be placed on, empty if not residue specific
    pub pattern: PositionalPattern,
    /// Where the modification is placed
    pub kind: ModificationKind,
}

impl Modification {
    /// Create a new modification
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        pattern: PositionalPattern,
        kind: ModificationKind,
    ) -> Self {
        Self {
            name: name.into(),
            mass,
            pattern,
            kind,
        }
    }
}

impl ParseJson for Modification {
    fn from_json_value(value: serde_json::Value) -> Result<Self, BoxedError<'static, MotifError>> {
        use_serde(value)
    }
}

/// Something that can resolve modification names into definitions.
pub trait ModificationLookup {
    /// Get the modification with this name
    fn resolve(&self, name: &str) -> Option<&Modification>;

    /// Get the modification with this name or an error if it is not known
    /// # Errors
    /// If the name is not known to this lookup
    fn get(&self, name: &str) -> Result<&Modification, BoxedError<'static, MotifError>> {
        self.resolve(name).ok_or_else(|| {
            BoxedError::new(
                MotifError::UnknownModification,
                "Unknown modification",
                format!("The modification '{name}' could not be resolved"),
                Context::show(name.to_string()),
            )
        })
    }
}

/// A simple modification lookup keyed by name.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ModificationTable {
    modifications: HashMap<String, Modification>,
}

impl ModificationTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modification, replacing any previous modification with the same name
    #[must_use]
    pub fn with(mut self, modification: Modification) -> Self {
        self.insert(modification);
        self
    }

    /// Add a modification, returning the previous modification with the same name if any
    pub fn insert(&mut self, modification: Modification) -> Option<Modification> {
        self.modifications
            .insert(modification.name.clone(), modification)
    }

    /// The number of modifications
    pub fn len(&self) -> usize {
        self.modifications.len()
    }

    /// Check if this table is empty
    pub fn is_empty(&self) -> bool {
        self.modifications.is_empty()
    }
}

impl ModificationLookup for ModificationTable {
    fn resolve(&self, name: &str) -> Option<&Modification> {
        self.modifications.get(name)
    }
}

impl FromIterator<Modification> for ModificationTable {
    fn from_iter<T: IntoIterator<Item = Modification>>(iter: T) -> Self {
        Self {
            modifications: iter.into_iter().map(|m| (m.name.clone(), m)).collect(),
        }
    }
}

impl ParseJson for ModificationTable {
    fn from_json_value(value: serde_json::Value) -> Result<Self, BoxedError<'static, MotifError>> {
        let list: Vec<Modification> = use_serde(value)?;
        Ok(list.into_iter().collect())
    }
}

/// A modification placed on a sequence, referred to by name
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ModificationMatch {
    /// The name of the modification, resolved through a [`ModificationLookup`]
    pub name: String,
    /// The location on the sequence
    pub position: SequencePosition,
}

impl ModificationMatch {
    /// Create a new placement
    pub fn new(name: impl Into<String>, position: SequencePosition) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        let table = ModificationTable::new().with(Modification::new(
            "Oxidation",
            15.994_915,
            PositionalPattern::from_literal("M").unwrap(),
            ModificationKind::Residue,
        ));
        assert_eq!(table.len(), 1);
        assert!(table.resolve("Oxidation").is_some());
        assert!(table.resolve("oxidation").is_none());
        assert!(matches!(
            table.get("Phospho").unwrap_err().get_kind(),
            MotifError::UnknownModification
        ));
    }

    #[test]
    fn kinds() {
        assert!(ModificationKind::NTermProteinResidue.is_n_terminal());
        assert!(ModificationKind::NTermProteinResidue.is_residue_specific());
        assert!(!ModificationKind::CTerm.is_residue_specific());
        assert!(ModificationKind::CTerm.is_c_terminal());
        assert!(!ModificationKind::Residue.is_c_terminal());
    }

    #[test]
    fn table_from_json() {
        let table = ModificationTable::from_json(
            r#"[{"name": "Acetyl", "mass": 42.010565, "pattern": {"positions": [], "anchor": 0}, "kind": "NTerm"}]"#,
        )
        .unwrap();
        let acetyl = table.get("Acetyl").unwrap();
        assert_eq!(acetyl.kind, ModificationKind::NTerm);
        assert!(acetyl.pattern.is_empty());
    }
}
