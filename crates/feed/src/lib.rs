//! # Feed Crate
//!
//! This crate implements candidate gathering for TasteTrail feeds.
//!
//! ## Components
//!
//! ### Followed Source (In-Network)
//! The home feed's candidate set:
//! - Items authored by the viewer or by users the viewer follows
//! - Bounded by the viewer's outbound follow edges, matching the
//!   Friends-visibility direction exactly
//!
//! ### Discover Source (Out-of-Network)
//! Exploration through multiple strategies:
//! - Recent: newest Public items from any author
//! - Dietary-matched: Public items tagged with the viewer's declared
//!   preferences
//!
//! ## Example Usage
//!
//! ```ignore
//! use feed::{FollowedSource, DiscoverSource, viewer_context::build_viewer_context};
//! use store::StoreIndex;
//! use std::sync::Arc;
//!
//! // Load data
//! let index = Arc::new(StoreIndex::load_from_files("data/snapshot".as_ref())?);
//!
//! // Build viewer context
//! let context = build_viewer_context(&index, viewer_id)?;
//!
//! // Gather candidates
//! let followed = FollowedSource::new(index.clone());
//! let discover = DiscoverSource::new(index.clone());
//!
//! let feed_candidates = followed.get_candidates(&context, 200);
//! let discover_candidates = discover.get_candidates(&context, 100);
//! ```
//!
//! Candidates are raw: neither source decides visibility. The pipeline
//! crate's filters apply the privacy/ownership/token policy and any
//! dietary/allergen/tag narrowing.

// Public modules
pub mod types;
pub mod viewer_context;
pub mod followed;
pub mod discover;

// Re-export commonly used types
pub use types::{Candidate, CandidateSource, ViewerContext};
pub use followed::FollowedSource;
pub use discover::DiscoverSource;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use store::{ItemRef, PrivacyLevel, Recipe, StoreIndex, User};

    fn create_test_index() -> StoreIndex {
        let mut index = StoreIndex::new();

        index
            .insert_user(User {
                id: 1,
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                first_name: None,
                last_name: None,
                privacy_level: PrivacyLevel::Public,
                dietary_preferences: HashSet::new(),
                allergies: HashSet::new(),
                created_at: 1_700_000_000,
            })
            .unwrap();

        index
            .insert_recipe(Recipe {
                id: 10,
                author_id: 1,
                title: "Test Recipe".to_string(),
                description: None,
                instructions: None,
                servings: None,
                prep_time_minutes: None,
                cook_time_minutes: None,
                difficulty: None,
                privacy_level: PrivacyLevel::Public,
                categories: HashSet::new(),
                tags: HashSet::new(),
                dietary_preferences: HashSet::new(),
                allergens: HashSet::new(),
                ingredients: Vec::new(),
                share_token: None,
                created_at: 1_700_000_100,
            })
            .unwrap();

        index
    }

    #[test]
    fn test_followed_source_creation() {
        let index = create_test_index();
        let source = FollowedSource::new(Arc::new(index));
        let context = ViewerContext::new(1);
        // Context without the aggregated follow set still sees own items
        let candidates = source.get_candidates(&context, 10);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_discover_source_creation() {
        let index = create_test_index();
        let source = DiscoverSource::new(Arc::new(index));
        let candidates = source.get_candidates(&ViewerContext::anonymous(), 10);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_candidate_creation() {
        let candidate =
            Candidate::new(ItemRef::recipe(10), CandidateSource::Followed, 1_700_000_100);
        assert_eq!(candidate.item, ItemRef::recipe(10));
        assert_eq!(candidate.source, CandidateSource::Followed);
        assert_eq!(candidate.created_at, 1_700_000_100);
    }
}
