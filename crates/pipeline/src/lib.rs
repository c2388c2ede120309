//! # vegscan pipeline
//!
//! The change-detection orchestrator: wires the pure raster algebra of
//! `vegscan-algorithms` to durable storage and the geoprocessing provider,
//! one scene (and its 16-day-earlier comparison scene) per run.

pub mod config;
pub mod layout;
pub mod orchestrator;

pub use config::DetectionConfig;
pub use layout::SceneLayout;
pub use orchestrator::{Orchestrator, Outcome, PipelineState, PipelineTask};
