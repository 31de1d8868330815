//! The typed boundary to the external space-group oracle.
//!
//! The oracle owns all of the actual space-group mathematics: given a cell it
//! determines the space group, its operations and the equivalence classes of
//! the atoms. This crate never reimplements any of that; it only prepares
//! oracle inputs and interprets oracle outputs. A concrete backend binding
//! the spglib C library is available behind the `spglib` feature as
//! [`crate::symmetry::spglib::Spglib`].

/// A cell in the representation understood by space-group oracles: a row-wise
/// lattice, fractional coordinates and one opaque integer label per site.
///
/// The integer labels are equivalence classes, not atomic numbers: the oracle
/// treats two sites as potentially symmetry-related only when their labels
/// agree.
#[derive(Clone, Debug, PartialEq)]
pub struct OracleCell {
    /// The row-wise lattice matrix.
    pub lattice: [[f64; 3]; 3],

    /// Fractional coordinates, one triple per site.
    pub positions: Vec<[f64; 3]>,

    /// Opaque equivalence-class labels, one per site.
    pub types: Vec<i32>,
}

/// The symmetry dataset returned by an oracle for one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct OracleSymmetry {
    /// The international space-group number (1..=230).
    pub space_group: u32,

    /// The Hall number of the detected setting (1..=530).
    pub hall_number: i32,

    /// The international (Hermann--Mauguin) symbol of the space group.
    pub international_symbol: String,

    /// The rotation parts of the operations, in the fractional basis.
    pub rotations: Vec<[[i32; 3]; 3]>,

    /// The translation parts of the operations, in the fractional basis.
    pub translations: Vec<[f64; 3]>,

    /// For each site of the input cell, the index of the representative site
    /// of its symmetry-equivalence class.
    pub equivalent_atoms: Vec<usize>,
}

/// The sentinel handed to oracles in place of an explicit angle tolerance,
/// requesting their automatic tuning.
pub const ANGLE_TOLERANCE_AUTO: f64 = -1.0;

/// The contract this crate expects of an external space-group oracle.
///
/// All methods are blocking and must be free of side effects on the inputs.
/// A [`None`] return represents the oracle's failure sentinel; callers in
/// this crate translate it into a typed error rather than retrying.
pub trait SpaceGroupOracle {
    /// Returns the oracle's name, for provenance records.
    fn name(&self) -> &str;

    /// Returns the oracle's version, for provenance records.
    fn version(&self) -> String;

    /// Determines the space-group symmetry of a cell.
    ///
    /// # Arguments
    ///
    /// * `cell` - The cell to analyse.
    /// * `symprec` - The distance tolerance.
    /// * `angle_tolerance` - The angle tolerance, or [`ANGLE_TOLERANCE_AUTO`].
    ///
    /// # Returns
    ///
    /// The symmetry dataset, or [`None`] if no symmetry could be determined.
    fn get_symmetry(
        &self,
        cell: &OracleCell,
        symprec: f64,
        angle_tolerance: f64,
    ) -> Option<OracleSymmetry>;

    /// Standardizes a cell, optionally reducing it to its primitive setting.
    ///
    /// # Arguments
    ///
    /// * `cell` - The cell to standardize.
    /// * `to_primitive` - Whether to reduce to the primitive cell.
    /// * `no_idealize` - Whether to skip idealization of the lattice vectors.
    /// * `symprec` - The distance tolerance.
    /// * `angle_tolerance` - The angle tolerance, or [`ANGLE_TOLERANCE_AUTO`].
    ///
    /// # Returns
    ///
    /// The standardized cell, or [`None`] on failure.
    fn standardize_cell(
        &self,
        cell: &OracleCell,
        to_primitive: bool,
        no_idealize: bool,
        symprec: f64,
        angle_tolerance: f64,
    ) -> Option<OracleCell>;

    /// Finds the primitive cell of a cell.
    ///
    /// # Returns
    ///
    /// The primitive cell, or [`None`] on failure.
    fn find_primitive(
        &self,
        cell: &OracleCell,
        symprec: f64,
        angle_tolerance: f64,
    ) -> Option<OracleCell>;

    /// Identifies the Hall number consistent with an explicit set of
    /// fractional-basis operations.
    ///
    /// # Returns
    ///
    /// The Hall number, or `0` if no setting matches.
    fn hall_number_from_symmetry(
        &self,
        rotations: &[[[i32; 3]; 3]],
        translations: &[[f64; 3]],
        symprec: f64,
    ) -> i32;
}
