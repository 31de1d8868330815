//! # crysym: crystallographic symmetry records and the CRYSTAL geometry codec
//!
//! crysym is the symmetry and geometry-file core of a driver for the
//! CRYSTAL family of periodic quantum-chemistry codes. It provides:
//! - periodic [`Structure`](crate::auxiliary::structure::Structure) values whose
//!   sites carry opaque *kind* labels that partition atoms into
//!   symmetry-equivalence classes stricter than chemical identity,
//! - stateless conversions between fractional and Cartesian coordinates and
//!   between the two bases of space-group operations,
//! - an adapter around an external space-group *oracle* (such as spglib,
//!   available behind the `spglib` feature) that turns oracle output into
//!   immutable [`SymmetryRecord`](crate::symmetry::SymmetryRecord) values,
//! - pure classification of space-group numbers into crystal systems, lattice
//!   types and centring codes, and
//! - a bidirectional codec for the fixed-format `.gui`/fort.34 geometry file
//!   consumed by CRYSTAL17.
//!
//! Symmetry *detection* is deliberately not implemented here: every function
//! that needs it takes a [`SpaceGroupOracle`](crate::symmetry::oracle::SpaceGroupOracle)
//! and treats a null oracle answer as a terminal, typed error. All public
//! entry points are synchronous, take immutable inputs and return freshly
//! constructed values.
//!
//! ## Features
//!
//! - `spglib`: links the spglib C library (`libsymspg`) and exposes it as the
//!   default oracle backend.

pub mod auxiliary;
pub mod drivers;
pub mod io;
pub mod symmetry;
pub mod transform;
