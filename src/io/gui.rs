//! The CRYSTAL `.gui`/fort.34 geometry-file codec.
//!
//! The file format is a fixed sequence of whitespace-separated lines:
//!
//! ```text
//! <dim> <origin_setting> <crystal_type>
//! <a_x> <a_y> <a_z>             three %17.9E fields per lattice row
//! <b_x> <b_y> <b_z>
//! <c_x> <c_y> <c_z>
//! <num_symops>
//! <rot_row0 x3>                 four lines per operation: three rotation
//! <rot_row1 x3>                 rows, then the translation, all Cartesian
//! <rot_row2 x3>
//! <trans x3>
//! <num_atoms>
//! <atomic_number> <x> <y> <z>   %3d then three %17.9E fields
//! <space_group_number> <num_symops>
//! ```
//!
//! The reader is a straight line-by-line cursor with no backtracking; every
//! token-count or range violation fails immediately with the offending line.
//! The identity operation is implicit: it is never written, and the operator
//! counts on the wire exclude it.

use std::fmt;

use anyhow::format_err;
use derive_builder::Builder;
use nalgebra::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::auxiliary::element::ELEMENT_MAP;
use crate::auxiliary::structure::{
    dimensionality_from_pbc, matrix_from_rows, pbc_from_dimensionality, Kind,
    NotSupportedDimensionality, Site, Structure,
};
use crate::io::format::{round_9dp, triplet_17_9};
use crate::symmetry::adapter::{self, SymmetryError};
use crate::symmetry::classifier;
use crate::symmetry::oracle::SpaceGroupOracle;
use crate::symmetry::{OperationBasis, SymmetryOperation, SymmetryRecord};
use crate::transform;

#[cfg(test)]
#[path = "gui_tests.rs"]
mod gui_tests;

/// The CRYSTAL major version whose geometry files this codec speaks.
///
/// Earlier versions store only the symmetry-irreducible atoms in the atom
/// block; version 17 stores all of them.
pub const GUI_FORMAT_VERSION: u32 = 17;

/// Tolerance below which a rounded operation is considered the identity.
const IDENTITY_TOLERANCE: f64 = 1.0e-12;

// =================
// Error definitions
// =================

/// Errors raised while reading a geometry file.
///
/// These are data errors, deliberately distinct from the oracle errors of
/// [`SymmetryError`]: a malformed file is not a tolerance problem. Line
/// numbers are one-based.
#[derive(Debug, Clone)]
pub enum GuiError {
    /// The requested format version is not supported by this reader.
    UnsupportedFormatVersion(u32),

    /// The file ended before a required line.
    UnexpectedEnd { line: usize, expected: &'static str },

    /// A line did not hold the expected fields.
    MalformedLine {
        line: usize,
        content: String,
        expected: &'static str,
    },

    /// The dimensionality token was outside 0..=3.
    InvalidDimensionality { line: usize, value: i64 },

    /// The crystal-type token was outside 1..=6.
    InvalidCrystalType { line: usize, value: i64 },

    /// A rotation or translation line of the symmetry block did not hold
    /// exactly three numbers.
    MalformedSymmetryBlock { line: usize, content: String },

    /// The footer operator count disagrees with the parsed symmetry block.
    SymmetryCountMismatch { header: usize, footer: usize },
}

impl fmt::Display for GuiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuiError::UnsupportedFormatVersion(version) => write!(
                f,
                "Geometry-file format for CRYSTAL version {version} is not supported: \
                 only version {GUI_FORMAT_VERSION} files can be read."
            ),
            GuiError::UnexpectedEnd { line, expected } => write!(
                f,
                "Geometry file ended at line {line}, where {expected} was expected."
            ),
            GuiError::MalformedLine {
                line,
                content,
                expected,
            } => write!(
                f,
                "Malformed line {line} of geometry file: expected {expected}, found `{content}`."
            ),
            GuiError::InvalidDimensionality { line, value } => write!(
                f,
                "Invalid dimensionality {value} on line {line} of geometry file: \
                 expected a value in 0..=3."
            ),
            GuiError::InvalidCrystalType { line, value } => write!(
                f,
                "Invalid crystal type {value} on line {line} of geometry file: \
                 expected a value in 1..=6."
            ),
            GuiError::MalformedSymmetryBlock { line, content } => write!(
                f,
                "Malformed symmetry block at line {line} of geometry file: \
                 expected exactly three numbers, found `{content}`."
            ),
            GuiError::SymmetryCountMismatch { header, footer } => write!(
                f,
                "Symmetry count mismatch in geometry file: the symmetry block holds {header} \
                 operation(s) but the footer declares {footer}."
            ),
        }
    }
}

impl std::error::Error for GuiError {}

// ===========
// Line cursor
// ===========

/// A forward-only cursor over the pre-split lines of a geometry file.
struct LineCursor<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> LineCursor<'a> {
    fn new(content: &'a str) -> Self {
        LineCursor {
            lines: content.lines().collect(),
            position: 0,
        }
    }

    /// Returns the next line together with its one-based line number.
    fn next_line(&mut self, expected: &'static str) -> Result<(usize, &'a str), GuiError> {
        let line = self
            .lines
            .get(self.position)
            .copied()
            .ok_or(GuiError::UnexpectedEnd {
                line: self.position + 1,
                expected,
            })?;
        self.position += 1;
        Ok((self.position, line))
    }

    /// Reads a line of exactly three floats from the symmetry block.
    fn next_symmetry_row(&mut self) -> Result<[f64; 3], GuiError> {
        let (number, line) = self.next_line("a symmetry-operation row")?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(GuiError::MalformedSymmetryBlock {
                line: number,
                content: line.to_string(),
            });
        }
        let mut row = [0.0; 3];
        for (slot, field) in row.iter_mut().zip(fields.iter()) {
            *slot = field
                .parse::<f64>()
                .map_err(|_| GuiError::MalformedSymmetryBlock {
                    line: number,
                    content: line.to_string(),
                })?;
        }
        Ok(row)
    }

    /// Reads a line of exactly three floats.
    fn next_triplet(&mut self, expected: &'static str) -> Result<[f64; 3], GuiError> {
        let (number, line) = self.next_line(expected)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let malformed = || GuiError::MalformedLine {
            line: number,
            content: line.to_string(),
            expected,
        };
        if fields.len() != 3 {
            return Err(malformed());
        }
        let mut triplet = [0.0; 3];
        for (slot, field) in triplet.iter_mut().zip(fields.iter()) {
            *slot = field.parse::<f64>().map_err(|_| malformed())?;
        }
        Ok(triplet)
    }

    /// Reads a line holding a single integer count.
    fn next_count(&mut self, expected: &'static str) -> Result<usize, GuiError> {
        let (number, line) = self.next_line(expected)?;
        line.trim().parse::<usize>().map_err(|_| GuiError::MalformedLine {
            line: number,
            content: line.to_string(),
            expected,
        })
    }
}

// ==================
// Struct definitions
// ==================

/// The exact fields serialized to a geometry file.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryFile {
    /// The dimensionality of the system (0..=3).
    pub dimensionality: u8,

    /// The origin-setting/centring code.
    pub origin_setting: i32,

    /// The crystal-type code (1..=6).
    pub crystal_type: u8,

    /// The row-wise lattice matrix.
    pub lattice: Matrix3<f64>,

    /// The Cartesian symmetry operations, identity omitted.
    pub operations: Vec<SymmetryOperation>,

    /// The atomic numbers of all atoms.
    pub atomic_numbers: Vec<u32>,

    /// The Cartesian positions of all atoms.
    pub positions: Vec<Point3<f64>>,

    /// The international space-group number repeated in the footer.
    pub space_group: u32,
}

impl GeometryFile {
    /// Returns the periodic-boundary flags implied by the dimensionality.
    #[must_use]
    pub fn pbc(&self) -> [bool; 3] {
        pbc_from_dimensionality(self.dimensionality)
            .expect("A geometry file holds a validated dimensionality.")
    }

    /// Builds the structure described by the file.
    ///
    /// Kind labels default to the element symbols; atomic numbers without a
    /// known element keep a synthetic `Z<number>` label.
    #[must_use]
    pub fn structure(&self) -> Structure {
        let sites = self
            .atomic_numbers
            .iter()
            .zip(self.positions.iter())
            .map(|(atomic_number, position)| Site {
                kind: ELEMENT_MAP
                    .symbol(*atomic_number)
                    .map(Kind::from)
                    .unwrap_or_else(|| Kind::new(format!("Z{atomic_number}"))),
                atomic_number: *atomic_number,
                position: *position,
            })
            .collect();
        Structure::new(self.lattice, sites, self.pbc())
    }

    /// Builds the symmetry record described by the file, with operations
    /// tagged as Cartesian.
    ///
    /// The identity operation stays implicit, so the record's operator count
    /// matches the file's.
    #[must_use]
    pub fn symmetry(&self) -> SymmetryRecord {
        SymmetryRecord {
            operations: self.operations.clone(),
            basis: OperationBasis::Cartesian,
            hall_number: None,
            space_group: Some(self.space_group),
            centring_code: u8::try_from(self.origin_setting).ok(),
            crystal_type: Some(self.crystal_type),
            equivalent: Vec::new(),
            provenance: None,
        }
    }
}

impl fmt::Display for GeometryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {} {}",
            self.dimensionality, self.origin_setting, self.crystal_type
        )?;
        for row in 0..3 {
            writeln!(
                f,
                "{}",
                triplet_17_9(&[
                    self.lattice[(row, 0)],
                    self.lattice[(row, 1)],
                    self.lattice[(row, 2)],
                ])
            )?;
        }

        let operations: Vec<SymmetryOperation> = self
            .operations
            .iter()
            .map(|op| SymmetryOperation::from_flat(op.to_flat().map(round_9dp)))
            .filter(|op| !op.is_identity(IDENTITY_TOLERANCE))
            .collect();
        writeln!(f, "{}", operations.len())?;
        for op in &operations {
            for row in 0..3 {
                writeln!(
                    f,
                    "{}",
                    triplet_17_9(&[
                        op.rotation[(row, 0)],
                        op.rotation[(row, 1)],
                        op.rotation[(row, 2)],
                    ])
                )?;
            }
            writeln!(f, "{}", triplet_17_9(&op.translation.into()))?;
        }

        writeln!(f, "{}", self.positions.len())?;
        for (atomic_number, position) in self.atomic_numbers.iter().zip(self.positions.iter()) {
            writeln!(
                f,
                "{:>3} {}",
                atomic_number,
                triplet_17_9(&position.coords.into())
            )?;
        }
        writeln!(f, "{} {}", self.space_group, operations.len())
    }
}

// =========
// Read path
// =========

/// Reads a geometry file into its [`GeometryFile`] record.
///
/// # Arguments
///
/// * `content` - The full text of the file.
/// * `version` - The CRYSTAL major version the file was produced for; only
///   [`GUI_FORMAT_VERSION`] is accepted.
///
/// # Errors
///
/// A [`GuiError`] carrying the offending line on any format violation; no
/// partial record is ever returned.
pub fn read_gui(content: &str, version: u32) -> Result<GeometryFile, GuiError> {
    if version != GUI_FORMAT_VERSION {
        return Err(GuiError::UnsupportedFormatVersion(version));
    }
    let mut cursor = LineCursor::new(content);

    let (header_number, header) = cursor.next_line("the geometry-file header")?;
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    // A fourth header token (an energy) is tolerated and ignored.
    if !(3..=4).contains(&header_fields.len()) {
        return Err(GuiError::MalformedLine {
            line: header_number,
            content: header.to_string(),
            expected: "dimensionality, origin setting and crystal type",
        });
    }
    let mut header_values = [0_i64; 3];
    for (slot, field) in header_values.iter_mut().zip(header_fields.iter()) {
        *slot = field.parse::<i64>().map_err(|_| GuiError::MalformedLine {
            line: header_number,
            content: header.to_string(),
            expected: "dimensionality, origin setting and crystal type",
        })?;
    }
    let [dimensionality, origin_setting, crystal_type] = header_values;
    if !(0..=3).contains(&dimensionality) {
        return Err(GuiError::InvalidDimensionality {
            line: header_number,
            value: dimensionality,
        });
    }
    if !(1..=6).contains(&crystal_type) {
        return Err(GuiError::InvalidCrystalType {
            line: header_number,
            value: crystal_type,
        });
    }

    let mut lattice_rows = [[0.0; 3]; 3];
    for row in lattice_rows.iter_mut() {
        *row = cursor.next_triplet("a lattice row")?;
    }

    let num_symops = cursor.next_count("the symmetry-operation count")?;
    let mut operations = Vec::with_capacity(num_symops);
    for _ in 0..num_symops {
        let row0 = cursor.next_symmetry_row()?;
        let row1 = cursor.next_symmetry_row()?;
        let row2 = cursor.next_symmetry_row()?;
        let translation = cursor.next_symmetry_row()?;
        operations.push(SymmetryOperation::from_flat([
            row0[0],
            row0[1],
            row0[2],
            row1[0],
            row1[1],
            row1[2],
            row2[0],
            row2[1],
            row2[2],
            translation[0],
            translation[1],
            translation[2],
        ]));
    }

    let num_atoms = cursor.next_count("the atom count")?;
    let mut atomic_numbers = Vec::with_capacity(num_atoms);
    let mut positions = Vec::with_capacity(num_atoms);
    for _ in 0..num_atoms {
        let (number, line) = cursor.next_line("an atom line")?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let malformed = || GuiError::MalformedLine {
            line: number,
            content: line.to_string(),
            expected: "an atomic number and three coordinates",
        };
        if fields.len() != 4 {
            return Err(malformed());
        }
        atomic_numbers.push(fields[0].parse::<u32>().map_err(|_| malformed())?);
        let mut coords = [0.0; 3];
        for (slot, field) in coords.iter_mut().zip(fields[1..].iter()) {
            *slot = field.parse::<f64>().map_err(|_| malformed())?;
        }
        positions.push(Point3::from(coords));
    }

    let (footer_number, footer) = cursor.next_line("the space-group footer")?;
    let footer_fields: Vec<&str> = footer.split_whitespace().collect();
    let malformed_footer = || GuiError::MalformedLine {
        line: footer_number,
        content: footer.to_string(),
        expected: "the space-group number and operator count",
    };
    if footer_fields.len() != 2 {
        return Err(malformed_footer());
    }
    let space_group = footer_fields[0]
        .parse::<u32>()
        .map_err(|_| malformed_footer())?;
    let footer_symops = footer_fields[1]
        .parse::<usize>()
        .map_err(|_| malformed_footer())?;
    if footer_symops != num_symops {
        return Err(GuiError::SymmetryCountMismatch {
            header: num_symops,
            footer: footer_symops,
        });
    }

    Ok(GeometryFile {
        dimensionality: dimensionality as u8,
        origin_setting: origin_setting as i32,
        crystal_type: crystal_type as u8,
        lattice: matrix_from_rows(&lattice_rows),
        operations,
        atomic_numbers,
        positions,
        space_group,
    })
}

// ==========
// Write path
// ==========

/// Control parameters for writing a geometry file from a bare structure.
#[derive(Clone, Builder, Debug, Serialize, Deserialize)]
pub struct GuiWriteParams {
    /// Boolean indicating if the cell is to be standardized by the oracle
    /// before symmetry detection.
    #[builder(default = "true")]
    pub standardize: bool,

    /// Boolean indicating if the cell is to be reduced to its primitive
    /// setting.
    #[builder(default = "true")]
    pub to_primitive: bool,

    /// Boolean indicating if the lattice vectors are to be idealized during
    /// standardization.
    #[builder(default = "false")]
    pub idealize: bool,

    /// Pre-supplied Cartesian operations. When present, the oracle is never
    /// consulted and the operations are serialized as given.
    #[builder(default = "None")]
    pub symops: Option<Vec<SymmetryOperation>>,

    /// Optional override for the crystal-type code.
    #[builder(default = "None")]
    pub crystal_type: Option<u8>,

    /// Optional override for the origin-setting code.
    #[builder(default = "None")]
    pub origin_setting: Option<i32>,

    /// Optional space-group number for the footer when `symops` is supplied.
    #[builder(default = "None")]
    pub space_group: Option<u32>,

    /// The distance tolerance for the oracle.
    #[builder(default = "0.01")]
    pub symprec: f64,

    /// The angle tolerance for the oracle, or [`None`] for automatic tuning.
    #[builder(default = "None")]
    pub angle_tolerance: Option<f64>,
}

impl GuiWriteParams {
    /// Returns a builder to construct a [`GuiWriteParams`] structure.
    pub fn builder() -> GuiWriteParamsBuilder {
        GuiWriteParamsBuilder::default()
    }
}

impl Default for GuiWriteParams {
    fn default() -> Self {
        GuiWriteParams::builder()
            .build()
            .expect("Unable to build default geometry-write parameters.")
    }
}

/// Writes a structure to geometry-file text.
///
/// With pre-supplied operations the structure is serialized as-is; otherwise
/// the full pipeline runs: standardize (when requested), re-derive Cartesian
/// coordinates, detect symmetry, classify the crystal type, convert the
/// operations to the Cartesian basis and derive the origin setting.
///
/// # Arguments
///
/// * `structure` - The structure to serialize; it is never mutated.
/// * `oracle` - The space-group oracle consulted when no operations are
///   supplied.
/// * `params` - The write parameters.
///
/// # Errors
///
/// [`NotSupportedDimensionality`] for non-3D structures on the computed
/// path (or irregular periodic-boundary patterns on the pre-supplied path),
/// and the oracle/classifier errors of the pipeline otherwise.
pub fn write_gui(
    structure: &Structure,
    oracle: &dyn SpaceGroupOracle,
    params: &GuiWriteParams,
) -> Result<String, anyhow::Error> {
    if let Some(symops) = params.symops.as_ref() {
        let dimensionality = dimensionality_from_pbc(structure.pbc())
            .ok_or(NotSupportedDimensionality {
                pbc: structure.pbc(),
            })?;
        let file = GeometryFile {
            dimensionality,
            origin_setting: params.origin_setting.unwrap_or(1),
            crystal_type: params.crystal_type.unwrap_or(1),
            lattice: *structure.lattice(),
            operations: symops.clone(),
            atomic_numbers: structure.atomic_numbers(),
            positions: structure.sites().iter().map(|site| site.position).collect(),
            space_group: params.space_group.unwrap_or(1),
        };
        return Ok(file.to_string());
    }

    structure.require_fully_periodic()?;
    let (mut cell, table) = adapter::prepare_oracle_input(structure)?;
    let angle_tolerance = adapter::angle_tolerance_or_auto(params.angle_tolerance);

    if params.standardize || params.to_primitive {
        cell = oracle
            .standardize_cell(
                &cell,
                params.to_primitive,
                !params.idealize,
                params.symprec,
                angle_tolerance,
            )
            .ok_or_else(|| SymmetryError::StandardizationFailed {
                cell: cell.clone(),
                symprec: params.symprec,
                angle_tolerance: params.angle_tolerance,
            })?;
    }

    let lattice = matrix_from_rows(&cell.lattice);
    let fcoords: Vec<Vector3<f64>> = cell.positions.iter().map(|frac| Vector3::from(*frac)).collect();
    let positions: Vec<Point3<f64>> = transform::fractional_to_cartesian(&lattice, &fcoords)
        .into_iter()
        .map(Point3::from)
        .collect();

    let dataset = oracle
        .get_symmetry(&cell, params.symprec, angle_tolerance)
        .ok_or_else(|| SymmetryError::ComputationFailed {
            cell: cell.clone(),
            symprec: params.symprec,
            angle_tolerance: params.angle_tolerance,
        })?;

    let fractional_ops: Vec<SymmetryOperation> = dataset
        .rotations
        .iter()
        .zip(dataset.translations.iter())
        .map(|(rotation, translation)| SymmetryOperation::from_oracle_parts(rotation, translation))
        .collect();
    let operations = transform::operations_frac_to_cart(&lattice, &fractional_ops)?;

    let crystal_type = match params.crystal_type {
        Some(code) => code,
        None => classifier::crystal_type_code(dataset.space_group)?,
    };
    let origin_setting = match params.origin_setting {
        Some(code) => code,
        None if params.to_primitive => {
            i32::from(classifier::centering_code(
                dataset.space_group,
                &dataset.international_symbol,
            )?)
        }
        None => 1,
    };

    let atomic_numbers = cell
        .types
        .iter()
        .map(|class| {
            table.atomic_number(*class as usize).ok_or_else(|| {
                format_err!("The oracle returned the unknown equivalence class {class}.")
            })
        })
        .collect::<Result<Vec<u32>, anyhow::Error>>()?;

    let file = GeometryFile {
        dimensionality: 3,
        origin_setting,
        crystal_type,
        lattice,
        operations,
        atomic_numbers,
        positions,
        space_group: dataset.space_group,
    };
    Ok(file.to_string())
}
