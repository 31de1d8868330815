//! Pure classification of space-group numbers.
//!
//! These look-ups relate the international space-group number to the crystal
//! system, the lattice type and the centring code used by the geometry-file
//! codec to relate primitive and conventional cells. They are total over the
//! domain 1..=230 and reject everything else.

use std::fmt;

use log;

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod classifier_tests;

// ================
// Enum definitions
// ================

/// The seven crystal systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrystalSystem {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Trigonal,
    Hexagonal,
    Cubic,
}

impl fmt::Display for CrystalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrystalSystem::Triclinic => "triclinic",
            CrystalSystem::Monoclinic => "monoclinic",
            CrystalSystem::Orthorhombic => "orthorhombic",
            CrystalSystem::Tetragonal => "tetragonal",
            CrystalSystem::Trigonal => "trigonal",
            CrystalSystem::Hexagonal => "hexagonal",
            CrystalSystem::Cubic => "cubic",
        };
        write!(f, "{name}")
    }
}

/// The seven lattice types: the crystal systems with the trigonal system
/// resolved into its rhombohedral and hexagonal lattices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LatticeType {
    Triclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Rhombohedral,
    Hexagonal,
    Cubic,
}

impl fmt::Display for LatticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LatticeType::Triclinic => "triclinic",
            LatticeType::Monoclinic => "monoclinic",
            LatticeType::Orthorhombic => "orthorhombic",
            LatticeType::Tetragonal => "tetragonal",
            LatticeType::Rhombohedral => "rhombohedral",
            LatticeType::Hexagonal => "hexagonal",
            LatticeType::Cubic => "cubic",
        };
        write!(f, "{name}")
    }
}

// =================
// Error definitions
// =================

/// Error raised when a space-group number falls outside 1..=230.
#[derive(Debug, Clone)]
pub struct InvalidSpaceGroupNumber(pub u32);

impl fmt::Display for InvalidSpaceGroupNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid space-group number {}: expected a value in 1..=230.",
            self.0
        )
    }
}

impl std::error::Error for InvalidSpaceGroupNumber {}

// =========
// Look-ups
// =========

/// The space-group numbers whose trigonal lattices are rhombohedral rather
/// than hexagonal.
const RHOMBOHEDRAL_NUMBERS: [u32; 7] = [146, 148, 155, 160, 161, 166, 167];

/// Returns the crystal system of a space-group number.
///
/// # Errors
///
/// [`InvalidSpaceGroupNumber`] outside 1..=230.
pub fn crystal_system(space_group: u32) -> Result<CrystalSystem, InvalidSpaceGroupNumber> {
    match space_group {
        1..=2 => Ok(CrystalSystem::Triclinic),
        3..=15 => Ok(CrystalSystem::Monoclinic),
        16..=74 => Ok(CrystalSystem::Orthorhombic),
        75..=142 => Ok(CrystalSystem::Tetragonal),
        143..=167 => Ok(CrystalSystem::Trigonal),
        168..=194 => Ok(CrystalSystem::Hexagonal),
        195..=230 => Ok(CrystalSystem::Cubic),
        other => Err(InvalidSpaceGroupNumber(other)),
    }
}

/// Returns the lattice type of a space-group number.
///
/// This agrees with [`crystal_system`] except in the trigonal system, where
/// the numbers in the rhombohedral exception set yield
/// [`LatticeType::Rhombohedral`] and all others yield
/// [`LatticeType::Hexagonal`].
///
/// # Errors
///
/// [`InvalidSpaceGroupNumber`] outside 1..=230.
pub fn lattice_type(space_group: u32) -> Result<LatticeType, InvalidSpaceGroupNumber> {
    let system = crystal_system(space_group)?;
    Ok(match system {
        CrystalSystem::Triclinic => LatticeType::Triclinic,
        CrystalSystem::Monoclinic => LatticeType::Monoclinic,
        CrystalSystem::Orthorhombic => LatticeType::Orthorhombic,
        CrystalSystem::Tetragonal => LatticeType::Tetragonal,
        CrystalSystem::Trigonal => {
            if RHOMBOHEDRAL_NUMBERS.contains(&space_group) {
                LatticeType::Rhombohedral
            } else {
                LatticeType::Hexagonal
            }
        }
        CrystalSystem::Hexagonal => LatticeType::Hexagonal,
        CrystalSystem::Cubic => LatticeType::Cubic,
    })
}

/// Returns the centring code relating the primitive and conventional cells of
/// a space group.
///
/// The branch outcomes reproduce the established CRYSTAL convention exactly,
/// since downstream geometry files depend on the specific integers:
/// primitive and hexagonal lattices give 1, rhombohedral lattices give 1,
/// body centring gives 6, face centring gives 5 and C centring gives 4.
///
/// # Arguments
///
/// * `space_group` - The international space-group number.
/// * `international_symbol` - The Hermann--Mauguin symbol of the group.
///
/// # Errors
///
/// [`InvalidSpaceGroupNumber`] outside 1..=230.
pub fn centering_code(
    space_group: u32,
    international_symbol: &str,
) -> Result<u8, InvalidSpaceGroupNumber> {
    let lattice = lattice_type(space_group)?;
    if international_symbol.contains('P') || lattice == LatticeType::Hexagonal {
        Ok(1)
    } else if lattice == LatticeType::Rhombohedral {
        Ok(1)
    } else if international_symbol.contains('I') {
        Ok(6)
    } else if international_symbol.contains('F') {
        Ok(5)
    } else if international_symbol.contains('C') {
        // TODO confirm the C-centred monoclinic code against the CRYSTAL
        // origin-setting tables; 4 is kept for compatibility but may be 3.
        if crystal_system(space_group)? == CrystalSystem::Monoclinic {
            log::warn!(
                "Centring code 4 for C-centred monoclinic group {space_group} \
                 ({international_symbol}) is unverified."
            );
        }
        Ok(4)
    } else {
        Ok(1)
    }
}

/// Returns the crystal-type code written into geometry files.
///
/// The codes are 1 triclinic, 2 monoclinic, 3 orthorhombic, 4 tetragonal,
/// 5 hexagonal and 6 cubic; the trigonal system collapses onto the hexagonal
/// code.
///
/// # Errors
///
/// [`InvalidSpaceGroupNumber`] outside 1..=230.
pub fn crystal_type_code(space_group: u32) -> Result<u8, InvalidSpaceGroupNumber> {
    Ok(match crystal_system(space_group)? {
        CrystalSystem::Triclinic => 1,
        CrystalSystem::Monoclinic => 2,
        CrystalSystem::Orthorhombic => 3,
        CrystalSystem::Tetragonal => 4,
        CrystalSystem::Trigonal | CrystalSystem::Hexagonal => 5,
        CrystalSystem::Cubic => 6,
    })
}
