//! Formulation engine stages
//!
//! Stages are pure functions of their inputs. [`calculator::calculate`] runs
//! them in order; the nudge is a separate entry point.

pub mod additives;
pub mod blend_tips;
pub mod calculator;
pub mod export;
pub mod fatty_acids;
pub mod lye_water;
pub mod nudge;
pub mod quality;

pub use additives::{AdditiveAmount, AdditivesResult, FragranceRow};
pub use calculator::{calculate, calculate_raw, ComputeResult, OilRow};
pub use export::{render_html, ExportPayload, ExportRow, SheetDocument, SheetEntry, SheetSection};
pub use fatty_acids::{FattyAcidMetrics, QualityScores};
pub use lye_water::LyeWaterResult;
pub use nudge::{
    nudge, nudge_response, AdjustedOilRow, NudgeError, NudgeProposal, NudgeRequest, NudgeResponse,
};
pub use quality::QualityReport;
