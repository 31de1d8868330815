//! The spglib backend of the space-group oracle.
//!
//! This module binds the spglib C library (`libsymspg`) and adapts it to the
//! [`SpaceGroupOracle`] contract. It is only compiled with the `spglib`
//! feature, and expects the library to be available on the system linker
//! path.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use crate::symmetry::oracle::{OracleCell, OracleSymmetry, SpaceGroupOracle};

mod ffi {
    use std::os::raw::{c_char, c_int};

    #[repr(C)]
    pub struct SpglibDataset {
        pub spacegroup_number: c_int,
        pub hall_number: c_int,
        pub international_symbol: [c_char; 11],
        pub hall_symbol: [c_char; 17],
        pub choice: [c_char; 6],
        pub transformation_matrix: [[f64; 3]; 3],
        pub origin_shift: [f64; 3],
        pub n_operations: c_int,
        pub rotations: *mut [[c_int; 3]; 3],
        pub translations: *mut [f64; 3],
        pub n_atoms: c_int,
        pub wyckoffs: *mut c_int,
        pub site_symmetry_symbols: *mut [c_char; 7],
        pub equivalent_atoms: *mut c_int,
        pub crystallographic_orbits: *mut c_int,
        pub primitive_lattice: [[f64; 3]; 3],
        pub mapping_to_primitive: *mut c_int,
        pub n_std_atoms: c_int,
        pub std_lattice: [[f64; 3]; 3],
        pub std_types: *mut c_int,
        pub std_positions: *mut [f64; 3],
        pub std_rotation_matrix: [[f64; 3]; 3],
        pub std_mapping_to_primitive: *mut c_int,
        pub pointgroup_symbol: [c_char; 6],
    }

    #[link(name = "symspg")]
    extern "C" {
        pub fn spgat_get_dataset(
            lattice: *const [f64; 3],
            position: *const [f64; 3],
            types: *const c_int,
            num_atom: c_int,
            symprec: f64,
            angle_tolerance: f64,
        ) -> *mut SpglibDataset;

        pub fn spg_free_dataset(dataset: *mut SpglibDataset);

        pub fn spgat_standardize_cell(
            lattice: *mut [f64; 3],
            position: *mut [f64; 3],
            types: *mut c_int,
            num_atom: c_int,
            to_primitive: c_int,
            no_idealize: c_int,
            symprec: f64,
            angle_tolerance: f64,
        ) -> c_int;

        pub fn spgat_find_primitive(
            lattice: *mut [f64; 3],
            position: *mut [f64; 3],
            types: *mut c_int,
            num_atom: c_int,
            symprec: f64,
            angle_tolerance: f64,
        ) -> c_int;

        pub fn spg_get_hall_number_from_symmetry(
            rotation: *const [[c_int; 3]; 3],
            translation: *const [f64; 3],
            num_operations: c_int,
            symprec: f64,
        ) -> c_int;

        pub fn spg_get_major_version() -> c_int;
        pub fn spg_get_minor_version() -> c_int;
        pub fn spg_get_micro_version() -> c_int;
    }
}

/// The spglib space-group oracle.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spglib;

// spglib stores basis vectors column-wise; the oracle cell stores them
// row-wise.
fn lattice_to_spglib(lattice: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut columns = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            columns[j][i] = lattice[i][j];
        }
    }
    columns
}

fn lattice_from_spglib(columns: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    lattice_to_spglib(columns)
}

fn c_string(chars: &[c_char]) -> String {
    unsafe { CStr::from_ptr(chars.as_ptr()) }
        .to_string_lossy()
        .trim()
        .to_string()
}

impl SpaceGroupOracle for Spglib {
    fn name(&self) -> &str {
        "spglib"
    }

    fn version(&self) -> String {
        unsafe {
            format!(
                "{}.{}.{}",
                ffi::spg_get_major_version(),
                ffi::spg_get_minor_version(),
                ffi::spg_get_micro_version(),
            )
        }
    }

    fn get_symmetry(
        &self,
        cell: &OracleCell,
        symprec: f64,
        angle_tolerance: f64,
    ) -> Option<OracleSymmetry> {
        let lattice = lattice_to_spglib(&cell.lattice);
        let num_atom = c_int::try_from(cell.positions.len()).ok()?;
        let dataset_ptr = unsafe {
            ffi::spgat_get_dataset(
                lattice.as_ptr(),
                cell.positions.as_ptr(),
                cell.types.as_ptr(),
                num_atom,
                symprec,
                angle_tolerance,
            )
        };
        if dataset_ptr.is_null() {
            return None;
        }
        let symmetry = unsafe {
            let dataset = &*dataset_ptr;
            if dataset.spacegroup_number <= 0 {
                None
            } else {
                let n_operations = dataset.n_operations as usize;
                let n_atoms = dataset.n_atoms as usize;
                Some(OracleSymmetry {
                    space_group: dataset.spacegroup_number as u32,
                    hall_number: dataset.hall_number,
                    international_symbol: c_string(&dataset.international_symbol),
                    rotations: std::slice::from_raw_parts(dataset.rotations, n_operations)
                        .to_vec(),
                    translations: std::slice::from_raw_parts(dataset.translations, n_operations)
                        .to_vec(),
                    equivalent_atoms: std::slice::from_raw_parts(
                        dataset.equivalent_atoms,
                        n_atoms,
                    )
                    .iter()
                    .map(|class| *class as usize)
                    .collect(),
                })
            }
        };
        unsafe { ffi::spg_free_dataset(dataset_ptr) };
        symmetry
    }

    fn standardize_cell(
        &self,
        cell: &OracleCell,
        to_primitive: bool,
        no_idealize: bool,
        symprec: f64,
        angle_tolerance: f64,
    ) -> Option<OracleCell> {
        let mut lattice = lattice_to_spglib(&cell.lattice);
        // The conventional cell may hold up to four times as many atoms.
        let capacity = cell.positions.len() * 4;
        let mut positions = cell.positions.clone();
        positions.resize(capacity, [0.0; 3]);
        let mut types = cell.types.clone();
        types.resize(capacity, 0);
        let num_atom = c_int::try_from(cell.positions.len()).ok()?;
        let new_count = unsafe {
            ffi::spgat_standardize_cell(
                lattice.as_mut_ptr(),
                positions.as_mut_ptr(),
                types.as_mut_ptr(),
                num_atom,
                c_int::from(to_primitive),
                c_int::from(no_idealize),
                symprec,
                angle_tolerance,
            )
        };
        if new_count <= 0 {
            return None;
        }
        positions.truncate(new_count as usize);
        types.truncate(new_count as usize);
        Some(OracleCell {
            lattice: lattice_from_spglib(&lattice),
            positions,
            types,
        })
    }

    fn find_primitive(
        &self,
        cell: &OracleCell,
        symprec: f64,
        angle_tolerance: f64,
    ) -> Option<OracleCell> {
        let mut lattice = lattice_to_spglib(&cell.lattice);
        let mut positions = cell.positions.clone();
        let mut types = cell.types.clone();
        let num_atom = c_int::try_from(cell.positions.len()).ok()?;
        let new_count = unsafe {
            ffi::spgat_find_primitive(
                lattice.as_mut_ptr(),
                positions.as_mut_ptr(),
                types.as_mut_ptr(),
                num_atom,
                symprec,
                angle_tolerance,
            )
        };
        if new_count <= 0 {
            return None;
        }
        positions.truncate(new_count as usize);
        types.truncate(new_count as usize);
        Some(OracleCell {
            lattice: lattice_from_spglib(&lattice),
            positions,
            types,
        })
    }

    fn hall_number_from_symmetry(
        &self,
        rotations: &[[[i32; 3]; 3]],
        translations: &[[f64; 3]],
        symprec: f64,
    ) -> i32 {
        let num_operations = match c_int::try_from(rotations.len().min(translations.len())) {
            Ok(count) => count,
            Err(_) => return 0,
        };
        unsafe {
            ffi::spg_get_hall_number_from_symmetry(
                rotations.as_ptr(),
                translations.as_ptr(),
                num_operations,
                symprec,
            )
        }
    }
}
