use std::str::FromStr;

use nalgebra::{Matrix3, Vector3};

use crate::symmetry::{
    operations_difference, operations_match, OperationBasis, SymmetryOperation, SymmetryRecord,
};

#[test]
fn test_symmetry_operation_flat_encoding() {
    let flat = [
        0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.5, 0.5, 0.0,
    ];
    let op = SymmetryOperation::from_flat(flat);
    assert_eq!(op.rotation[(0, 1)], -1.0);
    assert_eq!(op.rotation[(1, 0)], 1.0);
    assert_eq!(op.translation, Vector3::new(0.5, 0.5, 0.0));
    assert_eq!(op.to_flat(), flat);
}

#[test]
fn test_symmetry_operation_from_oracle_parts() {
    let rotation = [[-1, 0, 0], [0, -1, 0], [0, 0, -1]];
    let translation = [0.0, 0.5, 0.5];
    let op = SymmetryOperation::from_oracle_parts(&rotation, &translation);
    assert_eq!(op.rotation, -Matrix3::identity());
    assert_eq!(op.translation, Vector3::new(0.0, 0.5, 0.5));
}

#[test]
fn test_symmetry_operation_identity() {
    assert!(SymmetryOperation::identity().is_identity(1e-12));

    let mut nearly = SymmetryOperation::identity();
    nearly.translation[0] = 1e-10;
    assert!(nearly.is_identity(1e-9));
    assert!(!nearly.is_identity(1e-12));

    let inversion = SymmetryOperation {
        rotation: -Matrix3::identity(),
        translation: Vector3::zeros(),
    };
    assert!(!inversion.is_identity(1e-9));
}

#[test]
fn test_symmetry_operations_match_ignores_order() {
    let identity = SymmetryOperation::identity();
    let inversion = SymmetryOperation {
        rotation: -Matrix3::identity(),
        translation: Vector3::zeros(),
    };
    let left = vec![identity.clone(), inversion.clone()];
    let right = vec![inversion, identity];
    assert!(operations_match(&left, &right, 9));
}

#[test]
fn test_symmetry_operations_match_rounds_before_comparing() {
    let exact = vec![SymmetryOperation::identity()];
    let mut perturbed = SymmetryOperation::identity();
    perturbed.rotation[(0, 0)] = 1.0 + 4.0e-10;
    let noisy = vec![perturbed];
    assert!(operations_match(&exact, &noisy, 9));
    assert!(!operations_match(&exact, &noisy, 12));
}

#[test]
fn test_symmetry_operations_difference() {
    let identity = SymmetryOperation::identity();
    let inversion = SymmetryOperation {
        rotation: -Matrix3::identity(),
        translation: Vector3::zeros(),
    };
    let left = vec![identity.clone(), inversion.clone()];
    let right = vec![identity];
    let missing = operations_difference(&left, &right, 9);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0], inversion);
    assert!(operations_difference(&right, &left, 9).is_empty());
}

#[test]
fn test_symmetry_basis_tags() {
    assert_eq!(
        OperationBasis::from_str("fractional").unwrap(),
        OperationBasis::Fractional
    );
    assert_eq!(
        OperationBasis::from_str("cartesian").unwrap(),
        OperationBasis::Cartesian
    );
    assert!(OperationBasis::from_str("reciprocal").is_err());
    assert_eq!(OperationBasis::Fractional.to_string(), "fractional");
}

#[test]
fn test_symmetry_record_data_round_trip() {
    let record = SymmetryRecord {
        operations: vec![
            SymmetryOperation::identity(),
            SymmetryOperation {
                rotation: -Matrix3::identity(),
                translation: Vector3::new(0.5, 0.5, 0.5),
            },
        ],
        basis: OperationBasis::Fractional,
        hall_number: Some(523),
        space_group: Some(221),
        centring_code: Some(1),
        crystal_type: Some(6),
        equivalent: vec![0, 0, 2],
        provenance: None,
    };
    let data = record.to_data();
    assert_eq!(data.operations.len(), 2);
    assert_eq!(
        data.operations[1],
        [
            -1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, -1.0, 0.5, 0.5, 0.5
        ]
    );

    let rebuilt = SymmetryRecord::from_data(&data);
    assert_eq!(rebuilt, record);
}

#[test]
fn test_symmetry_data_yaml_round_trip() {
    let record = SymmetryRecord {
        operations: vec![SymmetryOperation::identity()],
        basis: OperationBasis::Cartesian,
        hall_number: None,
        space_group: Some(1),
        centring_code: None,
        crystal_type: None,
        equivalent: vec![0],
        provenance: None,
    };
    let yaml = serde_yaml::to_string(&record.to_data()).unwrap();
    assert!(yaml.contains("cartesian"));
    let data = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(SymmetryRecord::from_data(&data), record);
}
