//! Saponification formulation engine
//!
//! Turns a list of oils plus lye and water settings into a complete soap
//! formula. Shared between the HTTP backend and the browser (via WASM). The
//! engine performs no I/O; every entry point is a pure function.

pub mod engine;
pub mod error;
pub mod models;
pub mod types;
pub mod validation;

pub use engine::*;
pub use error::CalcError;
pub use models::*;
pub use types::*;
pub use validation::*;
