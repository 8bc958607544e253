//! Helper functions to build a ViewerContext from the StoreIndex.
//!
//! The context gathers the viewer's outbound follow set and declared
//! dietary preferences/allergies once, so candidate generation and
//! filtering never query the graph mid-pipeline.

use crate::types::ViewerContext;
use anyhow::{Result, anyhow};
use store::{StoreIndex, UserId};

/// Build a ViewerContext for an authenticated viewer.
///
/// Fails if the viewer does not exist; callers that want the
/// "unknown viewer behaves like an empty feed" semantics map the error
/// at the orchestration layer.
pub fn build_viewer_context(index: &StoreIndex, viewer_id: UserId) -> Result<ViewerContext> {
    let user = index
        .get_user(viewer_id)
        .ok_or_else(|| anyhow!("User {} not found", viewer_id))?;

    let mut context = ViewerContext::new(viewer_id);
    context.following = index.following_of(viewer_id);
    context.dietary_preferences = user.dietary_preferences.clone();
    context.allergens = user.allergies.clone();

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use store::{DietaryPreference, PrivacyLevel, User};

    fn user(id: UserId, username: &str) -> User {
        User {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: None,
            last_name: None,
            privacy_level: PrivacyLevel::Public,
            dietary_preferences: HashSet::new(),
            allergies: HashSet::new(),
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_build_viewer_context() {
        let mut index = StoreIndex::new();
        let mut alice = user(1, "alice");
        alice.dietary_preferences.insert(DietaryPreference::Vegan);
        alice.allergies.insert("peanut".to_string());
        index.insert_user(alice).unwrap();
        index.insert_user(user(2, "bob")).unwrap();
        index.follow(1, 2).unwrap();

        let context = build_viewer_context(&index, 1).unwrap();
        assert_eq!(context.viewer, Some(1));
        assert!(context.follows(2));
        assert!(!context.follows(1));
        assert!(context.dietary_preferences.contains(&DietaryPreference::Vegan));
        assert!(context.allergens.contains("peanut"));
    }

    #[test]
    fn test_viewer_not_found() {
        let index = StoreIndex::new();
        assert!(build_viewer_context(&index, 999).is_err());
    }

    #[test]
    fn test_anonymous_context() {
        let context = ViewerContext::anonymous();
        assert!(!context.is_authenticated());
        assert!(context.following.is_empty());
    }
}
