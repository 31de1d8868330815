//! Bridging between [`Structure`] values and the space-group oracle.
//!
//! The adapter owns the kind bookkeeping: kind labels are enumerated into the
//! opaque integer classes the oracle understands, and the resulting
//! [`KindTable`] translates oracle output back into labelled sites. Two sites
//! of the same element but different kinds always receive different classes,
//! which is what makes the symmetry analysis kind-aware rather than merely
//! element-aware.

use std::collections::HashMap;
use std::fmt;

use log;
use nalgebra::Matrix3;

use crate::auxiliary::structure::{Kind, Structure};
use crate::symmetry::classifier;
use crate::symmetry::oracle::{OracleCell, SpaceGroupOracle, ANGLE_TOLERANCE_AUTO};
use crate::symmetry::{OperationBasis, Provenance, SymmetryOperation, SymmetryRecord};
use crate::transform;

#[cfg(test)]
#[path = "adapter_tests.rs"]
mod adapter_tests;

// ==================
// Struct definitions
// ==================

/// The translation table from oracle equivalence-class integers back to kind
/// labels and atomic numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct KindTable {
    entries: Vec<(Kind, u32)>,
}

impl KindTable {
    /// Returns the number of distinct classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no classes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the kind label of a class.
    #[must_use]
    pub fn kind(&self, class: usize) -> Option<&Kind> {
        self.entries.get(class).map(|(kind, _)| kind)
    }

    /// Returns the atomic number of a class.
    #[must_use]
    pub fn atomic_number(&self, class: usize) -> Option<u32> {
        self.entries.get(class).map(|(_, number)| *number)
    }
}

// =================
// Error definitions
// =================

/// Errors arising at the oracle boundary.
#[derive(Debug, Clone)]
pub enum SymmetryError {
    /// The oracle returned its failure sentinel for a symmetry computation.
    /// This indicates a numerical or tolerance problem rather than malformed
    /// data, so the attempted cell and the tolerances are carried along.
    ComputationFailed {
        cell: OracleCell,
        symprec: f64,
        angle_tolerance: Option<f64>,
    },

    /// The oracle returned its failure sentinel for a cell standardization.
    StandardizationFailed {
        cell: OracleCell,
        symprec: f64,
        angle_tolerance: Option<f64>,
    },

    /// The oracle returned its failure sentinel for a primitive-cell search.
    PrimitiveCellNotFound {
        cell: OracleCell,
        symprec: f64,
        angle_tolerance: Option<f64>,
    },

    /// The oracle knows no Hall number consistent with the given operations.
    NoMatchingHallNumber { num_operations: usize, symprec: f64 },

    /// Cartesian operations were supplied without the lattice needed to
    /// convert them.
    MissingLattice,
}

impl fmt::Display for SymmetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymmetryError::ComputationFailed {
                cell,
                symprec,
                angle_tolerance,
            } => write!(
                f,
                "Symmetry computation failed for a cell of {} site(s) with lattice {:?} \
                 (symprec = {symprec:e}, angle_tolerance = {}).",
                cell.positions.len(),
                cell.lattice,
                angle_tolerance
                    .map(|tol| format!("{tol:e}"))
                    .unwrap_or_else(|| "auto".to_string()),
            ),
            SymmetryError::StandardizationFailed {
                cell,
                symprec,
                angle_tolerance,
            } => write!(
                f,
                "Cell standardization failed for a cell of {} site(s) \
                 (symprec = {symprec:e}, angle_tolerance = {}).",
                cell.positions.len(),
                angle_tolerance
                    .map(|tol| format!("{tol:e}"))
                    .unwrap_or_else(|| "auto".to_string()),
            ),
            SymmetryError::PrimitiveCellNotFound {
                cell,
                symprec,
                angle_tolerance,
            } => write!(
                f,
                "Primitive-cell search failed for a cell of {} site(s) \
                 (symprec = {symprec:e}, angle_tolerance = {}).",
                cell.positions.len(),
                angle_tolerance
                    .map(|tol| format!("{tol:e}"))
                    .unwrap_or_else(|| "auto".to_string()),
            ),
            SymmetryError::NoMatchingHallNumber {
                num_operations,
                symprec,
            } => write!(
                f,
                "No Hall number is consistent with the {num_operations} supplied operation(s) \
                 (symprec = {symprec:e})."
            ),
            SymmetryError::MissingLattice => write!(
                f,
                "Cartesian operations cannot be converted without a lattice."
            ),
        }
    }
}

impl std::error::Error for SymmetryError {}

// ==================
// Adapter operations
// ==================

/// Builds the oracle input cell for a structure, together with the table
/// translating class integers back to kinds.
///
/// Classes are assigned by enumerating the distinct kind labels in the order
/// they are first encountered. The assignment is by kind, never by element:
/// two sites of the same element but different kinds receive different
/// classes.
///
/// # Errors
///
/// [`crate::auxiliary::structure::NotSupportedDimensionality`] unless the
/// structure is fully periodic, and
/// [`crate::transform::SingularLattice`] if its lattice is not invertible.
pub fn prepare_oracle_input(
    structure: &Structure,
) -> Result<(OracleCell, KindTable), anyhow::Error> {
    structure.require_fully_periodic()?;
    let fcoords = structure.fractional_coords()?;

    let mut class_by_kind: HashMap<&Kind, i32> = HashMap::new();
    let mut entries: Vec<(Kind, u32)> = Vec::new();
    let mut types: Vec<i32> = Vec::with_capacity(structure.len());
    for site in structure.sites() {
        let class = *class_by_kind.entry(&site.kind).or_insert_with(|| {
            entries.push((site.kind.clone(), site.atomic_number));
            i32::try_from(entries.len() - 1).expect("More kind classes than i32 can index.")
        });
        types.push(class);
    }

    let cell = OracleCell {
        lattice: crate::auxiliary::structure::matrix_to_rows(structure.lattice()),
        positions: fcoords.iter().map(|frac| (*frac).into()).collect(),
        types,
    };
    Ok((cell, KindTable { entries }))
}

/// Computes the symmetry of a structure through the oracle and assembles a
/// fresh [`SymmetryRecord`].
///
/// # Arguments
///
/// * `oracle` - The space-group oracle.
/// * `structure` - The structure to analyse; it is never mutated.
/// * `symprec` - The distance tolerance.
/// * `angle_tolerance` - The angle tolerance, or [`None`] to let the oracle
///   auto-tune (encoded to the oracle as [`ANGLE_TOLERANCE_AUTO`]).
///
/// # Returns
///
/// A record with fractional-basis operations, the Hall and space-group
/// numbers, the centring and crystal-type codes, the per-site equivalence
/// classes and full provenance.
///
/// # Errors
///
/// [`SymmetryError::ComputationFailed`] when the oracle returns its failure
/// sentinel, [`classifier::InvalidSpaceGroupNumber`] if the oracle reports a
/// space-group number outside 1..=230, besides the input errors of
/// [`prepare_oracle_input`].
pub fn compute_symmetry(
    oracle: &dyn SpaceGroupOracle,
    structure: &Structure,
    symprec: f64,
    angle_tolerance: Option<f64>,
) -> Result<SymmetryRecord, anyhow::Error> {
    let (cell, _) = prepare_oracle_input(structure)?;
    log::debug!(
        "Requesting symmetry from {} for {} site(s) (symprec = {symprec:e}).",
        oracle.name(),
        cell.positions.len(),
    );
    let dataset = oracle
        .get_symmetry(&cell, symprec, angle_tolerance_or_auto(angle_tolerance))
        .ok_or_else(|| SymmetryError::ComputationFailed {
            cell: cell.clone(),
            symprec,
            angle_tolerance,
        })?;

    let operations = dataset
        .rotations
        .iter()
        .zip(dataset.translations.iter())
        .map(|(rotation, translation)| SymmetryOperation::from_oracle_parts(rotation, translation))
        .collect();

    Ok(SymmetryRecord {
        operations,
        basis: OperationBasis::Fractional,
        hall_number: Some(dataset.hall_number),
        space_group: Some(dataset.space_group),
        centring_code: Some(classifier::centering_code(
            dataset.space_group,
            &dataset.international_symbol,
        )?),
        crystal_type: Some(classifier::crystal_type_code(dataset.space_group)?),
        equivalent: dataset.equivalent_atoms,
        provenance: Some(Provenance {
            oracle: oracle.name().to_string(),
            oracle_version: oracle.version(),
            library: env!("CARGO_PKG_NAME").to_string(),
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            symprec,
            angle_tolerance,
        }),
    })
}

/// Identifies the Hall number consistent with an explicit operation list.
///
/// Cartesian operations are first converted to the fractional basis, for
/// which the lattice is required; fractional rotations are rounded to the
/// nearest integers before being handed to the oracle.
///
/// # Errors
///
/// [`SymmetryError::MissingLattice`] for Cartesian input without a lattice,
/// [`crate::transform::SingularLattice`] if the conversion fails, and
/// [`SymmetryError::NoMatchingHallNumber`] when the oracle finds no setting.
pub fn hall_number_from_operations(
    oracle: &dyn SpaceGroupOracle,
    operations: &[SymmetryOperation],
    basis: OperationBasis,
    lattice: Option<&Matrix3<f64>>,
    symprec: f64,
) -> Result<i32, anyhow::Error> {
    let fractional_ops: Vec<SymmetryOperation> = match basis {
        OperationBasis::Fractional => operations.to_vec(),
        OperationBasis::Cartesian => {
            let lattice = lattice.ok_or(SymmetryError::MissingLattice)?;
            transform::operations_cart_to_frac(lattice, operations)?
        }
    };

    let mut rotations: Vec<[[i32; 3]; 3]> = Vec::with_capacity(fractional_ops.len());
    let mut translations: Vec<[f64; 3]> = Vec::with_capacity(fractional_ops.len());
    for op in &fractional_ops {
        let mut rotation = [[0_i32; 3]; 3];
        for (i, row) in rotation.iter_mut().enumerate() {
            for (j, entry) in row.iter_mut().enumerate() {
                *entry = op.rotation[(i, j)].round() as i32;
            }
        }
        rotations.push(rotation);
        translations.push(op.translation.into());
    }

    let hall_number = oracle.hall_number_from_symmetry(&rotations, &translations, symprec);
    if hall_number > 0 {
        Ok(hall_number)
    } else {
        Err(SymmetryError::NoMatchingHallNumber {
            num_operations: operations.len(),
            symprec,
        }
        .into())
    }
}

/// Encodes an optional angle tolerance for the oracle boundary.
#[must_use]
pub fn angle_tolerance_or_auto(angle_tolerance: Option<f64>) -> f64 {
    angle_tolerance.unwrap_or(ANGLE_TOLERANCE_AUTO)
}
