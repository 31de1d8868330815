//! High-level operations on structures: oracle-backed cell reduction and
//! pure structure mutators.
//!
//! Every operation here returns a fresh [`Structure`]; inputs are never
//! mutated. Validation always runs before any oracle call, so a failed
//! request leaves nothing half-done.

use std::collections::HashMap;
use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::auxiliary::structure::{matrix_from_rows, Kind, Site, Structure};
use crate::symmetry::adapter::{self, KindTable, SymmetryError};
use crate::symmetry::oracle::{OracleCell, SpaceGroupOracle};
use crate::transform;

#[cfg(test)]
#[path = "drivers_tests.rs"]
mod drivers_tests;

// =================
// Error definitions
// =================

/// Errors raised by the pure structure mutators.
#[derive(Debug, Clone)]
pub enum MutationError {
    /// The number of new kind names does not match the site count.
    KindNameCountMismatch { expected: usize, found: usize },

    /// A new kind name would merge sites of different elements into one
    /// equivalence class.
    InconsistentKindMerge {
        name: String,
        atomic_numbers: (u32, u32),
    },
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationError::KindNameCountMismatch { expected, found } => write!(
                f,
                "Kind-name count mismatch: {found} name(s) supplied for {expected} site(s)."
            ),
            MutationError::InconsistentKindMerge {
                name,
                atomic_numbers,
            } => write!(
                f,
                "Inconsistent kind merge: the name `{name}` would cover sites of atomic \
                 numbers {} and {}.",
                atomic_numbers.0, atomic_numbers.1
            ),
        }
    }
}

impl std::error::Error for MutationError {}

// =================
// Oracle-backed operations
// =================

/// Standardizes the cell of a fully-periodic structure through the oracle.
///
/// # Arguments
///
/// * `oracle` - The space-group oracle.
/// * `structure` - The structure to standardize; it is never mutated.
/// * `symprec` - The distance tolerance.
/// * `angle_tolerance` - The angle tolerance, or [`None`] for automatic tuning.
/// * `to_primitive` - Boolean indicating if the cell is also to be reduced to
///   its primitive setting.
/// * `no_idealize` - Boolean indicating if lattice idealization is to be
///   skipped.
///
/// # Errors
///
/// [`SymmetryError::StandardizationFailed`] when the oracle returns its
/// failure sentinel, besides the usual input errors.
pub fn standardize_cell(
    oracle: &dyn SpaceGroupOracle,
    structure: &Structure,
    symprec: f64,
    angle_tolerance: Option<f64>,
    to_primitive: bool,
    no_idealize: bool,
) -> Result<Structure, anyhow::Error> {
    let (cell, table) = adapter::prepare_oracle_input(structure)?;
    log::debug!(
        "Requesting cell standardization from {} for {} site(s) \
         (to_primitive = {to_primitive}, no_idealize = {no_idealize}).",
        oracle.name(),
        cell.positions.len(),
    );
    let standardized = oracle
        .standardize_cell(
            &cell,
            to_primitive,
            no_idealize,
            symprec,
            adapter::angle_tolerance_or_auto(angle_tolerance),
        )
        .ok_or_else(|| SymmetryError::StandardizationFailed {
            cell,
            symprec,
            angle_tolerance,
        })?;
    structure_from_cell(&standardized, &table)
}

/// Finds the primitive cell of a fully-periodic structure through the oracle.
///
/// # Errors
///
/// [`SymmetryError::PrimitiveCellNotFound`] when the oracle returns its
/// failure sentinel, besides the usual input errors.
pub fn find_primitive_cell(
    oracle: &dyn SpaceGroupOracle,
    structure: &Structure,
    symprec: f64,
    angle_tolerance: Option<f64>,
) -> Result<Structure, anyhow::Error> {
    let (cell, table) = adapter::prepare_oracle_input(structure)?;
    log::debug!(
        "Requesting a primitive cell from {} for {} site(s) (symprec = {symprec:e}).",
        oracle.name(),
        cell.positions.len(),
    );
    let primitive = oracle
        .find_primitive(
            &cell,
            symprec,
            adapter::angle_tolerance_or_auto(angle_tolerance),
        )
        .ok_or_else(|| SymmetryError::PrimitiveCellNotFound {
            cell,
            symprec,
            angle_tolerance,
        })?;
    structure_from_cell(&primitive, &table)
}

/// Rebuilds a labelled structure from an oracle cell and the kind table that
/// accompanied the original request.
fn structure_from_cell(cell: &OracleCell, table: &KindTable) -> Result<Structure, anyhow::Error> {
    let lattice = matrix_from_rows(&cell.lattice);
    let fcoords: Vec<Vector3<f64>> = cell
        .positions
        .iter()
        .map(|frac| Vector3::from(*frac))
        .collect();
    let ccoords = transform::fractional_to_cartesian(&lattice, &fcoords);

    let sites = cell
        .types
        .iter()
        .zip(ccoords.into_iter())
        .map(|(class, position)| {
            let class = *class as usize;
            let kind = table.kind(class).ok_or_else(|| {
                anyhow::format_err!("The oracle returned the unknown equivalence class {class}.")
            })?;
            let atomic_number = table.atomic_number(class).ok_or_else(|| {
                anyhow::format_err!("The oracle returned the unknown equivalence class {class}.")
            })?;
            Ok(Site {
                kind: kind.clone(),
                atomic_number,
                position: Point3::from(position),
            })
        })
        .collect::<Result<Vec<Site>, anyhow::Error>>()?;
    // Oracle cells are always fully periodic.
    Ok(Structure::new(lattice, sites, [true; 3]))
}

// =================
// Pure mutators
// =================

/// Relabels the kinds of a structure, one new name per site.
///
/// The relabelling is validated before anything is built: the name list must
/// match the site count, and a name may only merge sites of the same element.
/// Merging sites of one element that previously carried different kinds is
/// allowed; that is the point of the operation.
///
/// # Errors
///
/// [`MutationError::KindNameCountMismatch`] or
/// [`MutationError::InconsistentKindMerge`] on invalid input.
pub fn reset_kind_names(
    structure: &Structure,
    names: &[String],
) -> Result<Structure, MutationError> {
    if names.len() != structure.len() {
        return Err(MutationError::KindNameCountMismatch {
            expected: structure.len(),
            found: names.len(),
        });
    }

    let mut element_by_name: HashMap<&str, u32> = HashMap::new();
    for (name, site) in names.iter().zip(structure.sites()) {
        match element_by_name.get(name.as_str()) {
            Some(previous) if *previous != site.atomic_number => {
                return Err(MutationError::InconsistentKindMerge {
                    name: name.clone(),
                    atomic_numbers: (*previous, site.atomic_number),
                });
            }
            Some(_) => {}
            None => {
                element_by_name.insert(name, site.atomic_number);
            }
        }
    }

    let sites = names
        .iter()
        .zip(structure.sites())
        .map(|(name, site)| Site {
            kind: Kind::new(name.clone()),
            atomic_number: site.atomic_number,
            position: site.position,
        })
        .collect();
    Ok(Structure::new(*structure.lattice(), sites, structure.pbc()))
}
