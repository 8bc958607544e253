//! # Store Crate
//!
//! This crate holds the TasteTrail entity model and the in-memory
//! content/follow-graph store the rest of the workspace queries.
//!
//! ## Main Components
//!
//! - **types**: Entities (User, Recipe, Restaurant, line items), enum
//!   vocabularies, and the StoreIndex itself
//! - **parser**: Parse JSONL snapshot files into entities
//! - **index**: Snapshot loading, secondary indices, and the
//!   declarative query methods
//! - **error**: Error types for loading and mutation
//!
//! ## Example Usage
//!
//! ```ignore
//! use store::StoreIndex;
//! use std::path::Path;
//!
//! // Load a snapshot directory
//! let index = StoreIndex::load_from_files(Path::new("data/snapshot"))?;
//!
//! // Query data
//! let user = index.find_user_by_username("alice").unwrap();
//! let feed_authors = index.following_of(user.id);
//! let items = index.items_by_authors(&feed_authors);
//! ```
//!
//! ## Consistency Model
//!
//! Reads are `&self` and lock-free; share the index behind an `Arc`.
//! Each mutation is one `&mut self` call that leaves every index
//! consistent — in particular `follow`/`unfollow` update the stored
//! `following` relation and its derived `followers` transpose together.

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
pub use types::{
    // Type aliases
    UserId,
    ItemId,
    // Core types
    User,
    Recipe,
    RecipeIngredient,
    Restaurant,
    MenuItem,
    FollowEdge,
    StoreIndex,
    ItemRef,
    // Enums
    ItemKind,
    PrivacyLevel,
    DietaryPreference,
    PriceRange,
    // Helpers
    share_token_is_well_formed,
};
