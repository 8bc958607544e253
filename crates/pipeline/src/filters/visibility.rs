//! Filter that applies the visibility policy to a candidate set.
//!
//! This is always the first filter in a feed pipeline: nothing the
//! viewer may not see should ever reach the narrowing filters or the
//! summaries.

use crate::traits::Filter;
use crate::visibility::is_visible;
use anyhow::Result;
use feed::{Candidate, ViewerContext};
use std::sync::Arc;
use store::StoreIndex;

/// Keeps only candidates the viewer may see.
///
/// The full rule set lives in [`crate::visibility::is_visible`];
/// candidates whose item no longer resolves are dropped the same as
/// hidden ones.
pub struct VisibilityFilter {
    index: Arc<StoreIndex>,
}

impl VisibilityFilter {
    pub fn new(index: Arc<StoreIndex>) -> Self {
        Self { index }
    }
}

impl Filter for VisibilityFilter {
    fn name(&self) -> &str {
        "VisibilityFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &ViewerContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| is_visible(&self.index, context, candidate.item))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feed::CandidateSource;
    use std::collections::HashSet;
    use store::{ItemRef, PrivacyLevel, Recipe, User};

    fn create_test_index() -> StoreIndex {
        let mut index = StoreIndex::new();

        for (id, name) in [(1, "alice"), (2, "bob")] {
            index
                .insert_user(User {
                    id,
                    username: name.to_string(),
                    email: format!("{}@example.com", name),
                    first_name: None,
                    last_name: None,
                    privacy_level: PrivacyLevel::Public,
                    dietary_preferences: HashSet::new(),
                    allergies: HashSet::new(),
                    created_at: 1_700_000_000,
                })
                .unwrap();
        }

        for (id, privacy) in [
            (10, PrivacyLevel::Public),
            (11, PrivacyLevel::Friends),
            (12, PrivacyLevel::Private),
        ] {
            index
                .insert_recipe(Recipe {
                    id,
                    author_id: 1,
                    title: format!("recipe {}", id),
                    description: None,
                    instructions: None,
                    servings: None,
                    prep_time_minutes: None,
                    cook_time_minutes: None,
                    difficulty: None,
                    privacy_level: privacy,
                    categories: HashSet::new(),
                    tags: HashSet::new(),
                    dietary_preferences: HashSet::new(),
                    allergens: HashSet::new(),
                    ingredients: Vec::new(),
                    share_token: None,
                    created_at: 1_700_000_000,
                })
                .unwrap();
        }

        index
    }

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::new(ItemRef::recipe(10), CandidateSource::Followed, 100),
            Candidate::new(ItemRef::recipe(11), CandidateSource::Followed, 200),
            Candidate::new(ItemRef::recipe(12), CandidateSource::Followed, 300),
        ]
    }

    #[test]
    fn test_non_follower_sees_public_only() {
        let index = Arc::new(create_test_index());
        let filter = VisibilityFilter::new(Arc::clone(&index));

        // Bob doesn't follow Alice
        let context = ViewerContext::new(2);
        let filtered = filter.apply(candidates(), &context).unwrap();

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item, ItemRef::recipe(10));
    }

    #[test]
    fn test_owner_sees_everything() {
        let index = Arc::new(create_test_index());
        let filter = VisibilityFilter::new(index);

        let context = ViewerContext::new(1);
        let filtered = filter.apply(candidates(), &context).unwrap();

        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_follower_gains_friends_items() {
        let mut raw = create_test_index();
        raw.follow(2, 1).unwrap();
        let index = Arc::new(raw);
        let filter = VisibilityFilter::new(Arc::clone(&index));

        let mut context = ViewerContext::new(2);
        context.following = index.following_of(2);
        let filtered = filter.apply(candidates(), &context).unwrap();

        let items: Vec<ItemRef> = filtered.iter().map(|c| c.item).collect();
        assert_eq!(items, vec![ItemRef::recipe(10), ItemRef::recipe(11)]);
    }
}
