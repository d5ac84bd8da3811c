//! Input models for the formulation engine

mod formula;
mod oil;

pub use formula::*;
pub use oil::*;
