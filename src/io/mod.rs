//! Readers and writers for the fixed-format files exchanged with external
//! quantum-chemistry codes.

pub(crate) mod format;
pub mod gui;
