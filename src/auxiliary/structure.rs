//! Periodic structures with kind-labelled sites.

use std::fmt;

use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::auxiliary::element::ELEMENT_MAP;
use crate::transform::{self, SingularLattice};

#[cfg(test)]
#[path = "structure_tests.rs"]
mod structure_tests;

// ==================
// Struct definitions
// ==================

/// An opaque site label used as the symmetry-equivalence class of a site.
///
/// Kinds are deliberately distinct from atomic numbers: two sites of the same
/// element but with different kinds (*e.g.* two spin sublattices, isotopes, or
/// oxidation states) are *not* symmetry-equivalent. The label itself carries
/// no chemical meaning inside this crate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Kind(String);

impl Kind {
    /// Creates a new kind label from any string-like value.
    pub fn new<S: Into<String>>(label: S) -> Self {
        Kind(label.into())
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Kind {
    fn from(label: &str) -> Self {
        Kind(label.to_string())
    }
}

/// A single atomic site of a periodic structure.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    /// The kind label of the site.
    pub kind: Kind,

    /// The atomic number of the site.
    pub atomic_number: u32,

    /// The Cartesian position of the site.
    pub position: Point3<f64>,
}

/// A periodic arrangement of atomic sites.
///
/// The lattice is stored row-wise: row $`i`$ of the matrix is the $`i`$-th
/// lattice basis vector, so that a fractional row vector $`\mathbf{f}`$ maps
/// to the Cartesian row vector $`\mathbf{f} \mathbf{L}`$. Structures are never
/// mutated in place; every transformation in this crate returns a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    lattice: Matrix3<f64>,
    sites: Vec<Site>,
    pbc: [bool; 3],
}

/// The plain nested-mapping external representation of a [`Structure`].
///
/// This is the shape exchanged with workflow engines and configuration files:
/// everything is a plain list or mapping, with coordinates offered in both
/// bases where available.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StructureData {
    /// The row-wise lattice matrix.
    pub lattice: [[f64; 3]; 3],

    /// Cartesian site coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ccoords: Option<Vec<[f64; 3]>>,

    /// Fractional site coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fcoords: Option<Vec<[f64; 3]>>,

    /// Atomic numbers, one per site.
    #[serde(default)]
    pub atomic_numbers: Vec<u32>,

    /// Element symbols, one per site.
    #[serde(default)]
    pub symbols: Vec<String>,

    /// Kind labels, one per site. Defaults to the element symbols when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<String>>,

    /// Periodic-boundary flags per lattice axis.
    pub pbc: [bool; 3],
}

// =================
// Error definitions
// =================

/// Errors arising while validating structure inputs.
#[derive(Debug, Clone)]
pub enum StructureError {
    /// The number of entries in a per-site field does not match the site count.
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    /// An element symbol could not be resolved to an atomic number.
    UnknownElement(String),

    /// An atomic number could not be resolved to an element symbol.
    UnknownAtomicNumber(u32),

    /// Neither Cartesian nor fractional coordinates were supplied.
    MissingCoordinates,
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::LengthMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "Structure error: `{field}` has {found} entries but {expected} sites are present."
            ),
            StructureError::UnknownElement(symbol) => {
                write!(f, "Structure error: unknown element symbol `{symbol}`.")
            }
            StructureError::UnknownAtomicNumber(number) => {
                write!(f, "Structure error: unknown atomic number {number}.")
            }
            StructureError::MissingCoordinates => write!(
                f,
                "Structure error: neither Cartesian nor fractional coordinates were supplied."
            ),
        }
    }
}

impl std::error::Error for StructureError {}

/// Error raised when an operation only defined for fully-periodic (3D)
/// structures encounters other periodic-boundary patterns.
#[derive(Debug, Clone)]
pub struct NotSupportedDimensionality {
    /// The offending periodic-boundary flags.
    pub pbc: [bool; 3],
}

impl fmt::Display for NotSupportedDimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dimensionality not supported: required pbc = [true, true, true], found {:?}.",
            self.pbc
        )
    }
}

impl std::error::Error for NotSupportedDimensionality {}

// =====================
// Struct implementation
// =====================

impl Structure {
    /// Creates a structure from a lattice, a list of sites and periodic-boundary flags.
    #[must_use]
    pub fn new(lattice: Matrix3<f64>, sites: Vec<Site>, pbc: [bool; 3]) -> Self {
        Structure {
            lattice,
            sites,
            pbc,
        }
    }

    /// Creates a fully-periodic structure from Cartesian coordinates.
    ///
    /// # Arguments
    ///
    /// * `lattice` - The row-wise lattice matrix.
    /// * `kinds` - One kind label per site.
    /// * `atomic_numbers` - One atomic number per site.
    /// * `ccoords` - One Cartesian coordinate triple per site.
    ///
    /// # Errors
    ///
    /// [`StructureError::LengthMismatch`] if the per-site lists disagree in length.
    pub fn from_cartesian(
        lattice: Matrix3<f64>,
        kinds: Vec<Kind>,
        atomic_numbers: Vec<u32>,
        ccoords: Vec<Point3<f64>>,
    ) -> Result<Self, StructureError> {
        let expected = ccoords.len();
        ensure_length("kinds", expected, kinds.len())?;
        ensure_length("atomic_numbers", expected, atomic_numbers.len())?;
        let sites = itertools::izip!(kinds, atomic_numbers, ccoords)
            .map(|(kind, atomic_number, position)| Site {
                kind,
                atomic_number,
                position,
            })
            .collect();
        Ok(Structure::new(lattice, sites, [true; 3]))
    }

    /// Creates a fully-periodic structure from fractional coordinates.
    ///
    /// # Errors
    ///
    /// [`StructureError::LengthMismatch`] if the per-site lists disagree in length.
    pub fn from_fractional(
        lattice: Matrix3<f64>,
        kinds: Vec<Kind>,
        atomic_numbers: Vec<u32>,
        fcoords: Vec<Vector3<f64>>,
    ) -> Result<Self, StructureError> {
        let ccoords = transform::fractional_to_cartesian(&lattice, &fcoords)
            .into_iter()
            .map(Point3::from)
            .collect();
        Structure::from_cartesian(lattice, kinds, atomic_numbers, ccoords)
    }

    /// Returns the row-wise lattice matrix.
    #[must_use]
    pub fn lattice(&self) -> &Matrix3<f64> {
        &self.lattice
    }

    /// Returns the sites of the structure.
    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Returns the periodic-boundary flags.
    #[must_use]
    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    /// Returns the number of sites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns `true` if the structure has no sites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Returns the atomic numbers of the sites, in order.
    #[must_use]
    pub fn atomic_numbers(&self) -> Vec<u32> {
        self.sites.iter().map(|site| site.atomic_number).collect()
    }

    /// Returns the kind labels of the sites, in order.
    #[must_use]
    pub fn kinds(&self) -> Vec<&Kind> {
        self.sites.iter().map(|site| &site.kind).collect()
    }

    /// Returns the Cartesian coordinates of the sites, in order.
    #[must_use]
    pub fn cartesian_coords(&self) -> Vec<Vector3<f64>> {
        self.sites.iter().map(|site| site.position.coords).collect()
    }

    /// Returns the fractional coordinates of the sites, in order.
    ///
    /// # Errors
    ///
    /// [`SingularLattice`] if the lattice matrix is not invertible.
    pub fn fractional_coords(&self) -> Result<Vec<Vector3<f64>>, SingularLattice> {
        transform::cartesian_to_fractional(&self.lattice, &self.cartesian_coords())
    }

    /// Checks that the structure is periodic along all three lattice axes.
    ///
    /// # Errors
    ///
    /// [`NotSupportedDimensionality`] for any other periodic-boundary pattern.
    pub fn require_fully_periodic(&self) -> Result<(), NotSupportedDimensionality> {
        if self.pbc == [true; 3] {
            Ok(())
        } else {
            Err(NotSupportedDimensionality { pbc: self.pbc })
        }
    }

    /// Converts the structure into its plain nested-mapping representation.
    ///
    /// Fractional coordinates are included when the lattice is invertible and
    /// omitted otherwise; symbols are resolved from the atomic numbers where
    /// known, with the kind label standing in for exotic numbers.
    #[must_use]
    pub fn to_data(&self) -> StructureData {
        let symbols = self
            .sites
            .iter()
            .map(|site| {
                ELEMENT_MAP
                    .symbol(site.atomic_number)
                    .map(|symbol| symbol.to_string())
                    .unwrap_or_else(|| site.kind.to_string())
            })
            .collect();
        StructureData {
            lattice: matrix_to_rows(&self.lattice),
            ccoords: Some(
                self.sites
                    .iter()
                    .map(|site| site.position.coords.into())
                    .collect(),
            ),
            fcoords: self
                .fractional_coords()
                .ok()
                .map(|fracs| fracs.into_iter().map(Into::into).collect()),
            atomic_numbers: self.atomic_numbers(),
            symbols,
            kinds: Some(self.sites.iter().map(|site| site.kind.to_string()).collect()),
            pbc: self.pbc,
        }
    }

    /// Reconstructs a structure from its plain nested-mapping representation.
    ///
    /// Cartesian coordinates are preferred when both bases are present. Atomic
    /// numbers are taken verbatim when supplied and resolved from the symbols
    /// otherwise; kinds default to the symbols.
    ///
    /// # Errors
    ///
    /// [`StructureError`] on missing coordinates, unknown symbols or
    /// mismatched per-site list lengths.
    pub fn from_data(data: &StructureData) -> Result<Self, StructureError> {
        let lattice = matrix_from_rows(&data.lattice);
        let ccoords: Vec<Point3<f64>> = if let Some(ccoords) = data.ccoords.as_ref() {
            ccoords.iter().map(|c| Point3::from(*c)).collect()
        } else if let Some(fcoords) = data.fcoords.as_ref() {
            let fracs: Vec<Vector3<f64>> = fcoords.iter().map(|f| Vector3::from(*f)).collect();
            transform::fractional_to_cartesian(&lattice, &fracs)
                .into_iter()
                .map(Point3::from)
                .collect()
        } else {
            return Err(StructureError::MissingCoordinates);
        };

        let atomic_numbers = if data.atomic_numbers.is_empty() && !data.symbols.is_empty() {
            data.symbols
                .iter()
                .map(|symbol| {
                    ELEMENT_MAP
                        .atomic_number(symbol)
                        .ok_or_else(|| StructureError::UnknownElement(symbol.clone()))
                })
                .collect::<Result<Vec<u32>, StructureError>>()?
        } else {
            data.atomic_numbers.clone()
        };

        let kinds: Vec<Kind> = if let Some(kinds) = data.kinds.as_ref() {
            kinds.iter().map(|kind| Kind::new(kind.clone())).collect()
        } else if !data.symbols.is_empty() {
            data.symbols.iter().map(Kind::new).collect()
        } else {
            atomic_numbers
                .iter()
                .map(|number| {
                    ELEMENT_MAP
                        .symbol(*number)
                        .map(Kind::from)
                        .ok_or(StructureError::UnknownAtomicNumber(*number))
                })
                .collect::<Result<Vec<Kind>, StructureError>>()?
        };

        let expected = ccoords.len();
        ensure_length("kinds", expected, kinds.len())?;
        ensure_length("atomic_numbers", expected, atomic_numbers.len())?;
        let sites = itertools::izip!(kinds, atomic_numbers, ccoords)
            .map(|(kind, atomic_number, position)| Site {
                kind,
                atomic_number,
                position,
            })
            .collect();
        Ok(Structure::new(lattice, sites, data.pbc))
    }
}

// =================
// Utility functions
// =================

/// Returns the periodic-boundary pattern for a geometry-file dimensionality.
///
/// The fixed table is 0 → `[false, false, false]`, 1 → `[true, false, false]`,
/// 2 → `[true, true, false]`, 3 → `[true, true, true]`; other values yield
/// [`None`].
#[must_use]
pub fn pbc_from_dimensionality(dimensionality: u8) -> Option<[bool; 3]> {
    match dimensionality {
        0 => Some([false, false, false]),
        1 => Some([true, false, false]),
        2 => Some([true, true, false]),
        3 => Some([true, true, true]),
        _ => None,
    }
}

/// Returns the geometry-file dimensionality for a periodic-boundary pattern,
/// or [`None`] if the pattern does not correspond to one.
#[must_use]
pub fn dimensionality_from_pbc(pbc: [bool; 3]) -> Option<u8> {
    match pbc {
        [false, false, false] => Some(0),
        [true, false, false] => Some(1),
        [true, true, false] => Some(2),
        [true, true, true] => Some(3),
        _ => None,
    }
}

/// Converts a row-wise lattice matrix to its nested-array representation.
#[must_use]
pub fn matrix_to_rows(matrix: &Matrix3<f64>) -> [[f64; 3]; 3] {
    [
        [matrix[(0, 0)], matrix[(0, 1)], matrix[(0, 2)]],
        [matrix[(1, 0)], matrix[(1, 1)], matrix[(1, 2)]],
        [matrix[(2, 0)], matrix[(2, 1)], matrix[(2, 2)]],
    ]
}

/// Builds a row-wise lattice matrix from its nested-array representation.
#[must_use]
pub fn matrix_from_rows(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::new(
        rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
        rows[2][1], rows[2][2],
    )
}

fn ensure_length(field: &'static str, expected: usize, found: usize) -> Result<(), StructureError> {
    if expected == found {
        Ok(())
    } else {
        Err(StructureError::LengthMismatch {
            field,
            expected,
            found,
        })
    }
}
