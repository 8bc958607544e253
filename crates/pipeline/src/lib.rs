//! Pipeline for visibility filtering and narrowing of feed candidates.
//!
//! This crate provides:
//! - The visibility policy (`is_visible`) deciding every (viewer, item)
//!   pair
//! - Filter trait and implementations (visibility, dietary preference,
//!   allergen safety, tag narrowing)
//! - FilterPipeline for composing filters
//! - SummaryBuilder for turning surviving candidates into feed entries
//!
//! ## Architecture
//! The pipeline processes candidates in stages:
//! 1. The visibility filter removes everything the viewer may not see
//!    (privacy level × follow graph × share-token capability)
//! 2. Optional narrowing filters shrink the set (dietary, allergen, tag)
//! 3. SummaryBuilder resolves the survivors into renderable entries
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, SummaryBuilder};
//! use pipeline::filters::*;
//!
//! // Build the filter pipeline
//! let pipeline = FilterPipeline::new()
//!     .add_filter(VisibilityFilter::new(index.clone()))
//!     .add_filter(AllergenSafetyFilter::new(index.clone(), allergens))
//!     .add_filter(DietaryPreferenceFilter::new(index.clone(), prefs));
//!
//! // Apply filters
//! let filtered = pipeline.apply(candidates, &context)?;
//!
//! // Build summaries
//! let builder = SummaryBuilder::new(index.clone());
//! let entries = builder.build(&filtered);
//! ```

pub mod traits;
pub mod visibility;
pub mod filters;
pub mod filter_pipeline;
pub mod summary;

// Re-export main types
pub use traits::Filter;
pub use visibility::is_visible;
pub use filter_pipeline::FilterPipeline;
pub use summary::{FeedEntry, SummaryBuilder};
