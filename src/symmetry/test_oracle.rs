//! A scripted space-group oracle for tests.
//!
//! The scripted oracle replays canned answers instead of performing any
//! symmetry mathematics, so adapter, driver and codec behaviour can be tested
//! deterministically and without the spglib backend.

use crate::symmetry::oracle::{OracleCell, OracleSymmetry, SpaceGroupOracle};

/// An oracle that replays pre-recorded answers.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedOracle {
    pub symmetry: Option<OracleSymmetry>,
    pub standardized: Option<OracleCell>,
    pub primitive: Option<OracleCell>,
    pub hall_number: i32,
}

impl ScriptedOracle {
    /// An oracle that fails every request.
    pub(crate) fn failing() -> Self {
        ScriptedOracle::default()
    }

    /// An oracle that answers symmetry requests with the given dataset.
    pub(crate) fn with_symmetry(symmetry: OracleSymmetry) -> Self {
        ScriptedOracle {
            symmetry: Some(symmetry),
            ..ScriptedOracle::default()
        }
    }
}

impl SpaceGroupOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    fn version(&self) -> String {
        "0.0.0".to_string()
    }

    fn get_symmetry(
        &self,
        _cell: &OracleCell,
        _symprec: f64,
        _angle_tolerance: f64,
    ) -> Option<OracleSymmetry> {
        self.symmetry.clone()
    }

    fn standardize_cell(
        &self,
        _cell: &OracleCell,
        _to_primitive: bool,
        _no_idealize: bool,
        _symprec: f64,
        _angle_tolerance: f64,
    ) -> Option<OracleCell> {
        self.standardized.clone()
    }

    fn find_primitive(
        &self,
        _cell: &OracleCell,
        _symprec: f64,
        _angle_tolerance: f64,
    ) -> Option<OracleCell> {
        self.primitive.clone()
    }

    fn hall_number_from_symmetry(
        &self,
        _rotations: &[[[i32; 3]; 3]],
        _translations: &[[f64; 3]],
        _symprec: f64,
    ) -> i32 {
        self.hall_number
    }
}
