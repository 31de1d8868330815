//! Stateless conversions between fractional and Cartesian bases.
//!
//! All conversions follow the row-vector convention of the structure type: a
//! fractional row vector $`\mathbf{f}`$ corresponds to the Cartesian row
//! vector $`\mathbf{f} \mathbf{L}`$, where $`\mathbf{L}`$ is the row-wise
//! lattice matrix. With coordinates held as column vectors this reads
//! $`\mathbf{c} = \mathbf{L}^{\mathrm{T}} \mathbf{f}`$.

use std::fmt;

use nalgebra::{Matrix3, Vector3};

use crate::symmetry::SymmetryOperation;


// =================
// Error definitions
// =================

/// Error raised when a conversion requires the inverse of a singular lattice
/// matrix.
#[derive(Debug, Clone)]
pub struct SingularLattice {
    /// The offending lattice matrix.
    pub lattice: Matrix3<f64>,
}

impl fmt::Display for SingularLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Singular lattice matrix: rows {:?}, {:?}, {:?} do not span three dimensions.",
            [
                self.lattice[(0, 0)],
                self.lattice[(0, 1)],
                self.lattice[(0, 2)]
            ],
            [
                self.lattice[(1, 0)],
                self.lattice[(1, 1)],
                self.lattice[(1, 2)]
            ],
            [
                self.lattice[(2, 0)],
                self.lattice[(2, 1)],
                self.lattice[(2, 2)]
            ],
        )
    }
}

impl std::error::Error for SingularLattice {}

// =================
// Coordinate bases
// =================

/// Converts fractional coordinates to Cartesian coordinates.
///
/// # Arguments
///
/// * `lattice` - The row-wise lattice matrix.
/// * `fcoords` - The fractional coordinates to convert.
///
/// # Returns
///
/// The Cartesian coordinates, in the same order.
#[must_use]
pub fn fractional_to_cartesian(
    lattice: &Matrix3<f64>,
    fcoords: &[Vector3<f64>],
) -> Vec<Vector3<f64>> {
    let basis = lattice.transpose();
    fcoords.iter().map(|frac| basis * frac).collect()
}

/// Converts Cartesian coordinates to fractional coordinates.
///
/// # Arguments
///
/// * `lattice` - The row-wise lattice matrix.
/// * `ccoords` - The Cartesian coordinates to convert.
///
/// # Returns
///
/// The fractional coordinates, in the same order.
///
/// # Errors
///
/// [`SingularLattice`] if the lattice matrix is not invertible.
pub fn cartesian_to_fractional(
    lattice: &Matrix3<f64>,
    ccoords: &[Vector3<f64>],
) -> Result<Vec<Vector3<f64>>, SingularLattice> {
    let inverse_basis = inverse_transposed(lattice)?;
    Ok(ccoords.iter().map(|cart| inverse_basis * cart).collect())
}

// ================
// Operation bases
// ================

/// Converts one symmetry operation from the fractional to the Cartesian basis.
///
/// The rotation conjugates with the transposed lattice,
/// $`\mathbf{R}' = \mathbf{L}^{\mathrm{T}} \mathbf{R} (\mathbf{L}^{\mathrm{T}})^{-1}`$,
/// and the translation transforms like a fractional coordinate.
///
/// # Errors
///
/// [`SingularLattice`] if the lattice matrix is not invertible.
pub fn operation_frac_to_cart(
    lattice: &Matrix3<f64>,
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
) -> Result<(Matrix3<f64>, Vector3<f64>), SingularLattice> {
    let basis = lattice.transpose();
    let inverse_basis = inverse_transposed(lattice)?;
    Ok((basis * rotation * inverse_basis, basis * translation))
}

/// Converts one symmetry operation from the Cartesian to the fractional basis.
///
/// This is the exact inverse of [`operation_frac_to_cart`].
///
/// # Errors
///
/// [`SingularLattice`] if the lattice matrix is not invertible.
pub fn operation_cart_to_frac(
    lattice: &Matrix3<f64>,
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
) -> Result<(Matrix3<f64>, Vector3<f64>), SingularLattice> {
    let basis = lattice.transpose();
    let inverse_basis = inverse_transposed(lattice)?;
    Ok((
        inverse_basis * rotation * basis,
        inverse_basis * translation,
    ))
}

/// Converts a list of symmetry operations from the fractional to the Cartesian
/// basis, preserving order.
///
/// # Errors
///
/// [`SingularLattice`] if the lattice matrix is not invertible.
pub fn operations_frac_to_cart(
    lattice: &Matrix3<f64>,
    operations: &[SymmetryOperation],
) -> Result<Vec<SymmetryOperation>, SingularLattice> {
    operations
        .iter()
        .map(|op| {
            operation_frac_to_cart(lattice, &op.rotation, &op.translation)
                .map(|(rotation, translation)| SymmetryOperation {
                    rotation,
                    translation,
                })
        })
        .collect()
}

/// Converts a list of symmetry operations from the Cartesian to the fractional
/// basis, preserving order.
///
/// # Errors
///
/// [`SingularLattice`] if the lattice matrix is not invertible.
pub fn operations_cart_to_frac(
    lattice: &Matrix3<f64>,
    operations: &[SymmetryOperation],
) -> Result<Vec<SymmetryOperation>, SingularLattice> {
    operations
        .iter()
        .map(|op| {
            operation_cart_to_frac(lattice, &op.rotation, &op.translation)
                .map(|(rotation, translation)| SymmetryOperation {
                    rotation,
                    translation,
                })
        })
        .collect()
}

fn inverse_transposed(lattice: &Matrix3<f64>) -> Result<Matrix3<f64>, SingularLattice> {
    lattice
        .transpose()
        .try_inverse()
        .ok_or(SingularLattice { lattice: *lattice })
}
