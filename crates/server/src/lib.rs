//! Server crate for the TasteTrail feed service.
//!
//! This crate contains the orchestrator that coordinates context
//! building, candidate gathering, visibility filtering, and summaries.

pub mod orchestrator;

pub use orchestrator::{FeedOptions, FeedOrchestrator};

// Re-exported for callers that only depend on this crate
pub use pipeline::FeedEntry;
