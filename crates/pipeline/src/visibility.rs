//! The content visibility policy.
//!
//! One rule set decides every (viewer, item) pair, evaluated in
//! precedence order — the first matching rule wins:
//!
//! 1. The viewer owns the item: visible, at any privacy level.
//! 2. The request carries the item's share token: visible. The token is
//!    a capability — any holder sees the item, anonymous viewers
//!    included.
//! 3. Private: not visible.
//! 4. Public: visible to anyone, anonymous included.
//! 5. Friends: visible iff the viewer is authenticated and the OWNER is
//!    among the users the VIEWER follows. The edge runs viewer -> owner;
//!    whether the owner follows the viewer back is irrelevant. Reversing
//!    this direction silently changes the product's social semantics.
//!
//! An item that does not resolve is simply not visible, so callers
//! cannot distinguish "hidden" from "nonexistent". A malformed
//! presented token is treated as absent and falls through to the
//! privacy rules; it never produces an error.

use feed::ViewerContext;
use store::{ItemRef, PrivacyLevel, StoreIndex, share_token_is_well_formed};

/// The share token presented with the request, with malformed tokens
/// already discarded
pub fn presented_token(context: &ViewerContext) -> Option<&str> {
    context
        .share_token
        .as_deref()
        .filter(|t| share_token_is_well_formed(t))
}

/// Decide whether `context`'s principal may see `item`
pub fn is_visible(index: &StoreIndex, context: &ViewerContext, item: ItemRef) -> bool {
    let Some(owner) = index.owner_of(item) else {
        return false;
    };

    // Rule 1: owners always see their own content
    if context.viewer == Some(owner) {
        return true;
    }

    // Rule 2: a valid share token bypasses the privacy level entirely
    if let (Some(presented), Some(actual)) =
        (presented_token(context), index.share_token_of(item))
    {
        if presented == actual {
            return true;
        }
    }

    // Rules 3-5: the item's privacy level
    match index.privacy_level_of(item) {
        Some(PrivacyLevel::Private) => false,
        Some(PrivacyLevel::Public) => true,
        Some(PrivacyLevel::Friends) => context.is_authenticated() && context.follows(owner),
        // owner_of resolved, so this arm is unreachable in practice
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use store::{PrivacyLevel, Recipe, User, UserId};

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

    fn recipe(id: u64, author_id: UserId, privacy: PrivacyLevel) -> Recipe {
        Recipe {
            id,
            author_id,
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
        }
    }

    /// Alice owns the content; Bob follows Alice; Carol follows nobody.
    /// Alice follows nobody, so the Bob edge is strictly one-way.
    fn create_test_index() -> StoreIndex {
        let mut index = StoreIndex::new();
        index.insert_user(user(1, "alice")).unwrap();
        index.insert_user(user(2, "bob")).unwrap();
        index.insert_user(user(3, "carol")).unwrap();
        index.follow(2, 1).unwrap();

        index.insert_recipe(recipe(10, 1, PrivacyLevel::Public)).unwrap();
        index.insert_recipe(recipe(11, 1, PrivacyLevel::Friends)).unwrap();
        let mut private = recipe(12, 1, PrivacyLevel::Private);
        private.share_token = Some("tok-secret".to_string());
        index.insert_recipe(private).unwrap();

        index
    }

    fn context_for(index: &StoreIndex, viewer: UserId) -> ViewerContext {
        let mut context = ViewerContext::new(viewer);
        context.following = index.following_of(viewer);
        context
    }

    #[test]
    fn test_public_visible_to_everyone() {
        let index = create_test_index();
        let item = ItemRef::recipe(10);

        assert!(is_visible(&index, &context_for(&index, 1), item));
        assert!(is_visible(&index, &context_for(&index, 2), item));
        assert!(is_visible(&index, &context_for(&index, 3), item));
        assert!(is_visible(&index, &ViewerContext::anonymous(), item));
    }

    #[test]
    fn test_friends_follows_viewer_outbound_edge() {
        let index = create_test_index();
        let item = ItemRef::recipe(11);

        // Bob follows Alice -> sees her Friends content, even though
        // Alice does not follow Bob back
        assert!(is_visible(&index, &context_for(&index, 2), item));
        // Carol doesn't follow Alice
        assert!(!is_visible(&index, &context_for(&index, 3), item));
        // Anonymous is never a friend
        assert!(!is_visible(&index, &ViewerContext::anonymous(), item));
        // The reverse direction alone grants nothing: followers of the
        // viewer are irrelevant
        let mut backwards = ViewerContext::new(3);
        backwards.following = index.followers_of(3);
        assert!(!is_visible(&index, &backwards, item));
    }

    #[test]
    fn test_private_owner_only() {
        let index = create_test_index();
        let item = ItemRef::recipe(12);

        assert!(is_visible(&index, &context_for(&index, 1), item));
        assert!(!is_visible(&index, &context_for(&index, 2), item));
        assert!(!is_visible(&index, &ViewerContext::anonymous(), item));
    }

    #[test]
    fn test_share_token_bypasses_privacy() {
        let index = create_test_index();
        let item = ItemRef::recipe(12);

        // Anonymous holder of the token sees a Private item
        let anon = ViewerContext::anonymous().with_share_token("tok-secret");
        assert!(is_visible(&index, &anon, item));

        // Wrong token grants nothing
        let wrong = ViewerContext::anonymous().with_share_token("tok-wrong");
        assert!(!is_visible(&index, &wrong, item));
    }

    #[test]
    fn test_malformed_token_treated_as_absent() {
        let index = create_test_index();
        let item = ItemRef::recipe(12);

        // Malformed tokens fall through to the privacy rules instead of
        // erroring
        let malformed = ViewerContext::anonymous().with_share_token("not a token!");
        assert!(!is_visible(&index, &malformed, item));

        // ...and the fallthrough still grants Public items
        assert!(is_visible(&index, &malformed, ItemRef::recipe(10)));
    }

    #[test]
    fn test_missing_item_behaves_like_hidden() {
        let index = create_test_index();
        assert!(!is_visible(
            &index,
            &context_for(&index, 1),
            ItemRef::recipe(999)
        ));
    }
}
