//! Helper items to assist the working of crysym.

pub mod element;
pub mod structure;
