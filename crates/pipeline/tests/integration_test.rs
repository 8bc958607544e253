//! Integration tests for the pipeline.
//!
//! These tests run realistic visibility + narrowing scenarios through
//! the composed filter pipeline, the way the orchestrator uses it.

use feed::{Candidate, CandidateSource, ViewerContext};
use pipeline::filters::*;
use pipeline::{FilterPipeline, SummaryBuilder, is_visible};
use std::collections::HashSet;
use std::sync::Arc;
use store::{
    DietaryPreference, ItemRef, PrivacyLevel, Recipe, StoreIndex, User, UserId,
};

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

fn recipe(id: u64, author_id: UserId, title: &str, created_at: i64) -> Recipe {
    Recipe {
        id,
        author_id,
        title: title.to_string(),
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
        created_at,
    }
}

fn context_for(index: &StoreIndex, viewer: UserId) -> ViewerContext {
    let mut context = ViewerContext::new(viewer);
    context.following = index.following_of(viewer);
    context
}

fn candidates_for_all(index: &StoreIndex) -> Vec<Candidate> {
    let mut refs = index.all_item_refs();
    refs.sort_unstable();
    refs.into_iter()
        .map(|item| {
            Candidate::new(
                item,
                CandidateSource::Followed,
                index.created_at_of(item).unwrap_or(0),
            )
        })
        .collect()
}

/// The follow-flip scenario: owner A has a recipe, viewer B does not
/// follow A. Public: visible. Flipped to Friends: invisible. B follows
/// A: visible again.
#[test]
fn test_privacy_and_follow_flip_scenario() {
    let mut index = StoreIndex::new();
    index.insert_user(user(1, "a")).unwrap();
    index.insert_user(user(2, "b")).unwrap();

    let mut vegan = recipe(10, 1, "vegan bowl", 100);
    vegan.dietary_preferences.insert(DietaryPreference::Vegan);
    index.insert_recipe(vegan).unwrap();
    let item = ItemRef::recipe(10);

    // Public recipe, B not following A
    assert!(is_visible(&index, &context_for(&index, 2), item));

    // Owner flips it to Friends
    index.set_privacy_level(1, item, PrivacyLevel::Friends).unwrap();
    assert!(!is_visible(&index, &context_for(&index, 2), item));

    // B follows A
    index.follow(2, 1).unwrap();
    assert!(is_visible(&index, &context_for(&index, 2), item));
}

/// The peanut/soy scenario: an item with allergens {peanut} must be
/// excluded for a viewer with allergies {peanut, soy}; an item with no
/// declared allergens is always included.
#[test]
fn test_allergen_scenario() {
    let mut index = StoreIndex::new();
    index.insert_user(user(1, "a")).unwrap();

    let mut satay = recipe(10, 1, "satay", 100);
    satay.allergens.insert("peanut".to_string());
    index.insert_recipe(satay).unwrap();
    index.insert_recipe(recipe(11, 1, "rice", 200)).unwrap();

    let index = Arc::new(index);
    let pipeline = FilterPipeline::new().add_filter(AllergenSafetyFilter::new(
        index.clone(),
        HashSet::from(["peanut".to_string(), "soy".to_string()]),
    ));

    let filtered = pipeline
        .apply(candidates_for_all(&index), &ViewerContext::anonymous())
        .unwrap();
    let items: Vec<ItemRef> = filtered.iter().map(|c| c.item).collect();

    assert!(!items.contains(&ItemRef::recipe(10)));
    assert!(items.contains(&ItemRef::recipe(11)));
}

/// Visibility composed with both narrowing filters, then summarized —
/// the full feed shape.
#[test]
fn test_full_pipeline_filters_correctly() {
    let mut index = StoreIndex::new();
    index.insert_user(user(1, "a")).unwrap();
    index.insert_user(user(2, "b")).unwrap();

    // b's candidates over a's content:
    // 10: public, untagged, clean          -> survives
    // 11: public, keto-tagged              -> dropped by dietary (viewer allows vegan)
    // 12: public, peanut allergen          -> dropped by allergen safety
    // 13: private                          -> dropped by visibility
    index.insert_recipe(recipe(10, 1, "clean", 400)).unwrap();
    let mut keto = recipe(11, 1, "keto thing", 300);
    keto.dietary_preferences.insert(DietaryPreference::Keto);
    index.insert_recipe(keto).unwrap();
    let mut nutty = recipe(12, 1, "nutty", 200);
    nutty.allergens.insert("peanut".to_string());
    index.insert_recipe(nutty).unwrap();
    let mut hidden = recipe(13, 1, "hidden", 100);
    hidden.privacy_level = PrivacyLevel::Private;
    index.insert_recipe(hidden).unwrap();

    let index = Arc::new(index);
    let pipeline = FilterPipeline::new()
        .add_filter(VisibilityFilter::new(index.clone()))
        .add_filter(AllergenSafetyFilter::new(
            index.clone(),
            HashSet::from(["peanut".to_string()]),
        ))
        .add_filter(DietaryPreferenceFilter::new(
            index.clone(),
            HashSet::from([DietaryPreference::Vegan]),
        ));

    let context = context_for(&index, 2);
    let filtered = pipeline
        .apply(candidates_for_all(&index), &context)
        .unwrap();

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].item, ItemRef::recipe(10));

    // Summaries resolve for every survivor
    let builder = SummaryBuilder::new(index.clone());
    let entries = builder.build(&filtered);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "clean");
    assert_eq!(entries[0].author_username, "a");
}

/// Applying the same pipeline twice to the same snapshot yields the
/// same result in the same order.
#[test]
fn test_pipeline_is_deterministic() {
    let mut index = StoreIndex::new();
    index.insert_user(user(1, "a")).unwrap();
    // Identical timestamps force the tie-break path
    index.insert_recipe(recipe(10, 1, "one", 100)).unwrap();
    index.insert_recipe(recipe(11, 1, "two", 100)).unwrap();
    index.insert_recipe(recipe(12, 1, "three", 100)).unwrap();

    let index = Arc::new(index);
    let pipeline = FilterPipeline::new().add_filter(VisibilityFilter::new(index.clone()));
    let context = context_for(&index, 1);

    let first = pipeline
        .apply(candidates_for_all(&index), &context)
        .unwrap();
    let second = pipeline
        .apply(candidates_for_all(&index), &context)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

/// A share token carried in the viewer context lets the whole pipeline
/// pass a Private item through.
#[test]
fn test_share_token_through_pipeline() {
    let mut index = StoreIndex::new();
    index.insert_user(user(1, "a")).unwrap();
    let mut secret = recipe(10, 1, "secret", 100);
    secret.privacy_level = PrivacyLevel::Private;
    secret.share_token = Some("tok-abc123".to_string());
    index.insert_recipe(secret).unwrap();

    let index = Arc::new(index);
    let pipeline = FilterPipeline::new().add_filter(VisibilityFilter::new(index.clone()));

    let anon = ViewerContext::anonymous();
    let with_token = ViewerContext::anonymous().with_share_token("tok-abc123");

    let blocked = pipeline.apply(candidates_for_all(&index), &anon).unwrap();
    let allowed = pipeline
        .apply(candidates_for_all(&index), &with_token)
        .unwrap();

    assert!(blocked.is_empty());
    assert_eq!(allowed.len(), 1);
}
