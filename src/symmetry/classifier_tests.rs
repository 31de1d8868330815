use crate::symmetry::classifier::{
    centering_code, crystal_system, crystal_type_code, lattice_type, CrystalSystem, LatticeType,
};

#[test]
fn test_classifier_crystal_system_boundaries() {
    assert_eq!(crystal_system(1).unwrap(), CrystalSystem::Triclinic);
    assert_eq!(crystal_system(2).unwrap(), CrystalSystem::Triclinic);
    assert_eq!(crystal_system(3).unwrap(), CrystalSystem::Monoclinic);
    assert_eq!(crystal_system(15).unwrap(), CrystalSystem::Monoclinic);
    assert_eq!(crystal_system(16).unwrap(), CrystalSystem::Orthorhombic);
    assert_eq!(crystal_system(74).unwrap(), CrystalSystem::Orthorhombic);
    assert_eq!(crystal_system(75).unwrap(), CrystalSystem::Tetragonal);
    assert_eq!(crystal_system(142).unwrap(), CrystalSystem::Tetragonal);
    assert_eq!(crystal_system(143).unwrap(), CrystalSystem::Trigonal);
    assert_eq!(crystal_system(167).unwrap(), CrystalSystem::Trigonal);
    assert_eq!(crystal_system(168).unwrap(), CrystalSystem::Hexagonal);
    assert_eq!(crystal_system(194).unwrap(), CrystalSystem::Hexagonal);
    assert_eq!(crystal_system(195).unwrap(), CrystalSystem::Cubic);
    assert_eq!(crystal_system(230).unwrap(), CrystalSystem::Cubic);
}

#[test]
fn test_classifier_rejects_out_of_range_numbers() {
    assert!(crystal_system(0).is_err());
    assert!(crystal_system(231).is_err());
    assert!(lattice_type(0).is_err());
    assert!(centering_code(231, "P1").is_err());
    assert!(crystal_type_code(0).is_err());
}

#[test]
fn test_classifier_total_over_valid_domain() {
    for number in 1..=230 {
        crystal_system(number).unwrap();
        lattice_type(number).unwrap();
        centering_code(number, "P1").unwrap();
        crystal_type_code(number).unwrap();
    }
}

#[test]
fn test_classifier_rhombohedral_lattices() {
    for number in [146, 148, 155, 160, 161, 166, 167] {
        assert_eq!(lattice_type(number).unwrap(), LatticeType::Rhombohedral);
    }
    // All other trigonal groups sit on hexagonal lattices.
    for number in 143..=167 {
        if ![146, 148, 155, 160, 161, 166, 167].contains(&number) {
            assert_eq!(lattice_type(number).unwrap(), LatticeType::Hexagonal);
        }
    }
}

#[test]
fn test_classifier_centering_codes() {
    let _ = env_logger::builder().is_test(true).try_init();
    // Primitive lattices.
    assert_eq!(centering_code(205, "Pa-3").unwrap(), 1);
    assert_eq!(centering_code(129, "P4/nmm").unwrap(), 1);
    assert_eq!(centering_code(58, "Pnnm").unwrap(), 1);
    assert_eq!(centering_code(190, "P-62c").unwrap(), 1);
    // Rhombohedral lattices stay at 1 even though the symbol carries R.
    assert_eq!(centering_code(166, "R-3m").unwrap(), 1);
    // Body, face and C centring.
    assert_eq!(centering_code(229, "Im-3m").unwrap(), 6);
    assert_eq!(centering_code(225, "Fm-3m").unwrap(), 5);
    assert_eq!(centering_code(227, "Fd-3m").unwrap(), 5);
    assert_eq!(centering_code(63, "Cmcm").unwrap(), 4);
    assert_eq!(centering_code(15, "C2/c").unwrap(), 4);
}

#[test]
fn test_classifier_crystal_type_codes() {
    assert_eq!(crystal_type_code(1).unwrap(), 1);
    assert_eq!(crystal_type_code(14).unwrap(), 2);
    assert_eq!(crystal_type_code(58).unwrap(), 3);
    assert_eq!(crystal_type_code(129).unwrap(), 4);
    // Trigonal collapses onto the hexagonal code.
    assert_eq!(crystal_type_code(147).unwrap(), 5);
    assert_eq!(crystal_type_code(166).unwrap(), 5);
    assert_eq!(crystal_type_code(194).unwrap(), 5);
    assert_eq!(crystal_type_code(225).unwrap(), 6);
}
