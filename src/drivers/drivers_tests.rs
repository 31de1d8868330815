use approx::assert_abs_diff_eq;
use nalgebra::{Matrix3, Point3, Vector3};

use crate::auxiliary::structure::{Kind, Structure};
use crate::drivers::{find_primitive_cell, reset_kind_names, standardize_cell, MutationError};
use crate::symmetry::adapter::SymmetryError;
use crate::symmetry::oracle::OracleCell;
use crate::symmetry::test_oracle::ScriptedOracle;

fn rock_salt_conventional() -> Structure {
    let lattice = Matrix3::from_diagonal_element(4.164);
    Structure::from_fractional(
        lattice,
        vec![Kind::from("Mg"), Kind::from("O")],
        vec![12, 8],
        vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
    )
    .unwrap()
}

fn halved_cell() -> OracleCell {
    OracleCell {
        lattice: [[2.082, 0.0, 0.0], [0.0, 2.082, 0.0], [0.0, 0.0, 2.082]],
        positions: vec![[0.0, 0.0, 0.0]],
        types: vec![0],
    }
}

#[test]
fn test_drivers_standardize_cell() {
    let oracle = ScriptedOracle {
        standardized: Some(halved_cell()),
        ..ScriptedOracle::default()
    };
    let standardized =
        standardize_cell(&oracle, &rock_salt_conventional(), 0.01, None, true, true).unwrap();
    assert_eq!(standardized.len(), 1);
    assert_eq!(standardized.pbc(), [true; 3]);
    // Class 0 maps back to the magnesium kind of the input.
    assert_eq!(standardized.kinds()[0], &Kind::from("Mg"));
    assert_eq!(standardized.atomic_numbers(), vec![12]);
    assert_abs_diff_eq!(
        standardized.sites()[0].position,
        Point3::origin(),
        epsilon = 1e-12
    );
}

#[test]
fn test_drivers_standardize_cell_failure() {
    let error = standardize_cell(
        &ScriptedOracle::failing(),
        &rock_salt_conventional(),
        0.01,
        None,
        false,
        true,
    )
    .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<SymmetryError>(),
        Some(SymmetryError::StandardizationFailed { .. })
    ));
}

#[test]
fn test_drivers_find_primitive_cell() {
    let oracle = ScriptedOracle {
        primitive: Some(halved_cell()),
        ..ScriptedOracle::default()
    };
    let primitive = find_primitive_cell(&oracle, &rock_salt_conventional(), 0.01, None).unwrap();
    assert_eq!(primitive.len(), 1);
    assert_eq!(primitive.lattice()[(0, 0)], 2.082);
}

#[test]
fn test_drivers_find_primitive_cell_failure() {
    let error = find_primitive_cell(
        &ScriptedOracle::failing(),
        &rock_salt_conventional(),
        0.01,
        None,
    )
    .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<SymmetryError>(),
        Some(SymmetryError::PrimitiveCellNotFound { .. })
    ));
}

#[test]
fn test_drivers_reset_kind_names() {
    let lattice = Matrix3::from_diagonal_element(4.0);
    let structure = Structure::from_fractional(
        lattice,
        vec![Kind::from("Ni1"), Kind::from("Ni2"), Kind::from("O")],
        vec![28, 28, 8],
        vec![
            Vector3::zeros(),
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(0.25, 0.25, 0.25),
        ],
    )
    .unwrap();

    // Merging the two nickel kinds is allowed; both sites share the element.
    let names = vec!["Ni".to_string(), "Ni".to_string(), "O".to_string()];
    let relabelled = reset_kind_names(&structure, &names).unwrap();
    assert_eq!(relabelled.kinds()[0], relabelled.kinds()[1]);
    assert_eq!(relabelled.atomic_numbers(), structure.atomic_numbers());
    // Geometry is untouched.
    assert_eq!(relabelled.lattice(), structure.lattice());
    assert_eq!(
        relabelled.sites()[1].position,
        structure.sites()[1].position
    );
    // The input structure itself keeps its original labels.
    assert_eq!(structure.kinds()[0], &Kind::from("Ni1"));
}

#[test]
fn test_drivers_reset_kind_names_count_mismatch() {
    let structure = rock_salt_conventional();
    let names = vec!["Mg".to_string()];
    assert!(matches!(
        reset_kind_names(&structure, &names),
        Err(MutationError::KindNameCountMismatch {
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn test_drivers_reset_kind_names_inconsistent_merge() {
    let structure = rock_salt_conventional();
    // One name across a magnesium and an oxygen site is rejected.
    let names = vec!["A".to_string(), "A".to_string()];
    let error = reset_kind_names(&structure, &names).unwrap_err();
    assert!(matches!(
        error,
        MutationError::InconsistentKindMerge {
            atomic_numbers: (12, 8),
            ..
        }
    ));
}
