//! Business logic services for the formulation server

pub mod formula;

pub use formula::FormulaService;
