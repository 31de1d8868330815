//! Space-group symmetry records and their supporting machinery.
//!
//! The types here hold the *results* of symmetry computations: ordered lists
//! of basis-tagged operations together with space-group identifiers,
//! per-site equivalence classes and provenance. The computations themselves
//! are delegated to a [`SpaceGroupOracle`](crate::symmetry::oracle::SpaceGroupOracle)
//! through the [`adapter`] module.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use approx::abs_diff_eq;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

pub mod adapter;
pub mod classifier;
pub mod oracle;
#[cfg(feature = "spglib")]
pub mod spglib;
#[cfg(test)]
pub(crate) mod test_oracle;

#[cfg(test)]
#[path = "symmetry_tests.rs"]
mod symmetry_tests;

// ================
// Enum definitions
// ================

/// An enumerated type indicating the coordinate basis in which a list of
/// symmetry operations is expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationBasis {
    /// The operations act on fractional coordinates.
    Fractional,

    /// The operations act on Cartesian coordinates.
    Cartesian,
}

impl fmt::Display for OperationBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationBasis::Fractional => write!(f, "fractional"),
            OperationBasis::Cartesian => write!(f, "cartesian"),
        }
    }
}

/// Error raised when a basis tag is neither `fractional` nor `cartesian`.
#[derive(Debug, Clone)]
pub struct UnknownBasis(pub String);

impl fmt::Display for UnknownBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown operation basis `{}`: expected `fractional` or `cartesian`.",
            self.0
        )
    }
}

impl std::error::Error for UnknownBasis {}

impl FromStr for OperationBasis {
    type Err = UnknownBasis;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fractional" => Ok(OperationBasis::Fractional),
            "cartesian" => Ok(OperationBasis::Cartesian),
            other => Err(UnknownBasis(other.to_string())),
        }
    }
}

// ==================
// Struct definitions
// ==================

/// One element of a space group: a point part and a translation part.
///
/// The numbers are interpreted in whichever basis the surrounding context
/// (usually a [`SymmetryRecord`]) tags them with. On the wire an operation is
/// flattened to twelve numbers: the rotation rows followed by the translation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymmetryOperation {
    /// The 3×3 rotation (point) part.
    pub rotation: Matrix3<f64>,

    /// The translation part.
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    /// Returns the identity operation.
    #[must_use]
    pub fn identity() -> Self {
        SymmetryOperation {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Builds an operation from its flattened twelve-number encoding
    /// (r00, r01, r02, r10, r11, r12, r20, r21, r22, t0, t1, t2).
    #[must_use]
    pub fn from_flat(flat: [f64; 12]) -> Self {
        SymmetryOperation {
            rotation: Matrix3::new(
                flat[0], flat[1], flat[2], flat[3], flat[4], flat[5], flat[6], flat[7], flat[8],
            ),
            translation: Vector3::new(flat[9], flat[10], flat[11]),
        }
    }

    /// Builds an operation from integer rotation rows and a translation, as
    /// returned by space-group oracles in the fractional basis.
    #[must_use]
    pub fn from_oracle_parts(rotation: &[[i32; 3]; 3], translation: &[f64; 3]) -> Self {
        SymmetryOperation {
            rotation: Matrix3::new(
                f64::from(rotation[0][0]),
                f64::from(rotation[0][1]),
                f64::from(rotation[0][2]),
                f64::from(rotation[1][0]),
                f64::from(rotation[1][1]),
                f64::from(rotation[1][2]),
                f64::from(rotation[2][0]),
                f64::from(rotation[2][1]),
                f64::from(rotation[2][2]),
            ),
            translation: Vector3::from(*translation),
        }
    }

    /// Flattens the operation to its twelve-number encoding.
    #[must_use]
    pub fn to_flat(&self) -> [f64; 12] {
        let r = &self.rotation;
        let t = &self.translation;
        [
            r[(0, 0)],
            r[(0, 1)],
            r[(0, 2)],
            r[(1, 0)],
            r[(1, 1)],
            r[(1, 2)],
            r[(2, 0)],
            r[(2, 1)],
            r[(2, 2)],
            t[0],
            t[1],
            t[2],
        ]
    }

    /// Checks whether the operation is the identity to within an absolute
    /// tolerance.
    #[must_use]
    pub fn is_identity(&self, tolerance: f64) -> bool {
        abs_diff_eq!(self.rotation, Matrix3::identity(), epsilon = tolerance)
            && abs_diff_eq!(self.translation, Vector3::zeros(), epsilon = tolerance)
    }
}

/// Provenance of a symmetry computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// The name of the oracle that performed the computation.
    pub oracle: String,

    /// The version of the oracle.
    pub oracle_version: String,

    /// The name of this library.
    pub library: String,

    /// The version of this library.
    pub library_version: String,

    /// The distance tolerance handed to the oracle.
    pub symprec: f64,

    /// The angle tolerance handed to the oracle, or [`None`] for the oracle's
    /// automatic tuning.
    pub angle_tolerance: Option<f64>,
}

/// The result of a symmetry computation for one structure.
///
/// Records are produced fresh by the [`adapter`] (or by the geometry-file
/// reader) and are immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryRecord {
    /// The ordered symmetry operations.
    pub operations: Vec<SymmetryOperation>,

    /// The basis in which the operations are expressed.
    pub basis: OperationBasis,

    /// The Hall number of the detected setting, if known.
    pub hall_number: Option<i32>,

    /// The international space-group number, if known.
    pub space_group: Option<u32>,

    /// The centring code relating the primitive and conventional cells, if
    /// known.
    pub centring_code: Option<u8>,

    /// The crystal-type code of the space group, if known.
    pub crystal_type: Option<u8>,

    /// For each site, the index of the representative site of its
    /// symmetry-equivalence class.
    pub equivalent: Vec<usize>,

    /// Provenance of the computation, if it came from an oracle.
    pub provenance: Option<Provenance>,
}

impl SymmetryRecord {
    /// Returns the number of operations held by the record.
    #[must_use]
    pub fn num_symops(&self) -> usize {
        self.operations.len()
    }

    /// Converts the record into its plain nested-mapping representation.
    #[must_use]
    pub fn to_data(&self) -> SymmetryData {
        SymmetryData {
            operations: self.operations.iter().map(SymmetryOperation::to_flat).collect(),
            basis: self.basis,
            hall_number: self.hall_number,
            space_group: self.space_group,
            centring_code: self.centring_code,
            crystal_type: self.crystal_type,
            equivalent: self.equivalent.clone(),
        }
    }

    /// Reconstructs a record from its plain nested-mapping representation.
    #[must_use]
    pub fn from_data(data: &SymmetryData) -> Self {
        SymmetryRecord {
            operations: data
                .operations
                .iter()
                .map(|flat| SymmetryOperation::from_flat(*flat))
                .collect(),
            basis: data.basis,
            hall_number: data.hall_number,
            space_group: data.space_group,
            centring_code: data.centring_code,
            crystal_type: data.crystal_type,
            equivalent: data.equivalent.clone(),
            provenance: None,
        }
    }
}

/// The plain nested-mapping external representation of a [`SymmetryRecord`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SymmetryData {
    /// The operations as flattened twelve-number rows.
    pub operations: Vec<[f64; 12]>,

    /// The basis tag, `fractional` or `cartesian`.
    pub basis: OperationBasis,

    /// The Hall number, if known.
    #[serde(default)]
    pub hall_number: Option<i32>,

    /// The international space-group number, if known.
    #[serde(default)]
    pub space_group: Option<u32>,

    /// The centring code, if known.
    #[serde(default)]
    pub centring_code: Option<u8>,

    /// The crystal-type code, if known.
    #[serde(default)]
    pub crystal_type: Option<u8>,

    /// Per-site equivalence-class representative indices.
    #[serde(default)]
    pub equivalent: Vec<usize>,
}

// =================
// Utility functions
// =================

/// Rounds an operation to a fixed number of decimals and encodes it as an
/// integer key suitable for exact set comparisons.
fn rounded_key(operation: &SymmetryOperation, decimals: u32) -> [i64; 12] {
    let factor = 10_f64.powi(decimals as i32);
    let flat = operation.to_flat();
    let mut key = [0_i64; 12];
    for (slot, value) in key.iter_mut().zip(flat.iter()) {
        *slot = (value * factor).round() as i64;
    }
    key
}

/// Returns the operations of `left` that have no counterpart in `right`.
///
/// Each operation is rounded to `decimals` decimal places before comparison;
/// exact floating-point equality is never used.
#[must_use]
pub fn operations_difference(
    left: &[SymmetryOperation],
    right: &[SymmetryOperation],
    decimals: u32,
) -> Vec<SymmetryOperation> {
    let right_keys: BTreeSet<[i64; 12]> =
        right.iter().map(|op| rounded_key(op, decimals)).collect();
    left.iter()
        .filter(|op| !right_keys.contains(&rounded_key(op, decimals)))
        .cloned()
        .collect()
}

/// Checks whether two operation lists contain the same operations up to a
/// rounding precision, irrespective of order.
#[must_use]
pub fn operations_match(
    left: &[SymmetryOperation],
    right: &[SymmetryOperation],
    decimals: u32,
) -> bool {
    operations_difference(left, right, decimals).is_empty()
        && operations_difference(right, left, decimals).is_empty()
}
