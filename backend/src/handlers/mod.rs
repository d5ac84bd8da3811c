//! HTTP handlers

pub mod formula;
pub mod health;

pub use formula::*;
pub use health::*;
