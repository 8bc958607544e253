//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filter implementations
//! that can be composed into a FilterPipeline.

pub mod visibility;
pub mod dietary_preference;
pub mod allergen_safety;
pub mod tag;

// Re-export for convenience
pub use visibility::VisibilityFilter;
pub use dietary_preference::DietaryPreferenceFilter;
pub use allergen_safety::AllergenSafetyFilter;
pub use tag::TagFilter;
