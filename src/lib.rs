//! InsightLens metrics & decision engine.
//!
//! Turns pull-request and file-churn telemetry into risk scores (PSRI, TDI),
//! AI-vs-human attribution, and prioritized, persisted recommendations.

pub mod analysis;
pub mod cache;
pub mod commands;
pub mod error;
pub mod models;
pub mod protocol;

pub use cache::{OverviewCache, SharedOverviewCache};
pub use error::EngineError;
