//! Core domain types for the TasteTrail content store.
//!
//! This module defines the entities (User, Recipe, Restaurant and their
//! owned line items), the fixed enum vocabularies (privacy levels,
//! dietary preferences, price ranges), and the [`StoreIndex`] that holds
//! everything in memory with the indices the query layer needs.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, StoreError};

// =============================================================================
// Type Aliases
// =============================================================================
// These keep the domain clear and prevent mixing up user ids with item ids

/// Unique identifier for a user
pub type UserId = u64;

/// Unique identifier for a content item (recipe or restaurant)
pub type ItemId = u64;

// =============================================================================
// Enum Vocabularies
// =============================================================================

/// Who may see a piece of content by default.
///
/// The share token bypasses this entirely; see the visibility policy in
/// the pipeline crate.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum PrivacyLevel {
    /// Anyone can see, including anonymous viewers
    #[default]
    Public,
    /// Only viewers who follow the owner can see
    Friends,
    /// Only the owner can see
    Private,
}

/// Fixed vocabulary of dietary constraints.
///
/// Used both as a user preference and as a content tag; intersection
/// tests between the two sets drive the dietary narrowing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DietaryPreference {
    Vegetarian,
    Vegan,
    Pescatarian,
    GlutenFree,
    DairyFree,
    Keto,
    Paleo,
    LowCarb,
    LowFat,
    Halal,
    Kosher,
    Organic,
    RawFood,
    Mediterranean,
    DiabeticFriendly,
}

/// Price bracket for a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceRange {
    Budget,
    Moderate,
    Expensive,
    Luxury,
}

impl PriceRange {
    /// Display symbol, "$" through "$$$$"
    pub fn symbol(&self) -> &'static str {
        match self {
            PriceRange::Budget => "$",
            PriceRange::Moderate => "$$",
            PriceRange::Expensive => "$$$",
            PriceRange::Luxury => "$$$$",
        }
    }
}

// =============================================================================
// Item Addressing
// =============================================================================

/// Which content table an item lives in
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ItemKind {
    Recipe,
    Restaurant,
}

/// Uniform address for a content item.
///
/// The derived `Ord` (kind, then id) is the tie-breaker for feed
/// ordering, so identical timestamps still produce a deterministic
/// sequence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: ItemId,
}

impl ItemRef {
    pub fn recipe(id: ItemId) -> Self {
        Self {
            kind: ItemKind::Recipe,
            id,
        }
    }

    pub fn restaurant(id: ItemId) -> Self {
        Self {
            kind: ItemKind::Restaurant,
            id,
        }
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A registered user.
///
/// The follow graph is NOT stored on the user — the store keeps the
/// outbound `following` relation authoritatively and derives the inverse
/// (see [`StoreIndex::follow`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
    #[serde(default)]
    pub dietary_preferences: HashSet<DietaryPreference>,
    #[serde(default)]
    pub allergies: HashSet<String>,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

/// One line item of a recipe, ordered by `display_order`.
///
/// Strictly owned by its recipe: embedded in the parent and destroyed
/// with it, no independent lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub display_order: u32,
}

impl RecipeIngredient {
    /// Render as a single display line, e.g. "2 cups flour (sifted)"
    pub fn display_text(&self) -> String {
        let mut out = String::new();
        if let Some(quantity) = self.quantity {
            out.push_str(&quantity.to_string());
            if let Some(unit) = self.unit.as_deref().filter(|u| !u.trim().is_empty()) {
                out.push(' ');
                out.push_str(unit);
            }
            out.push(' ');
        }
        out.push_str(&self.name);
        if let Some(notes) = self.notes.as_deref().filter(|n| !n.trim().is_empty()) {
            out.push_str(" (");
            out.push_str(notes);
            out.push(')');
        }
        out
    }
}

/// A recipe owned by exactly one author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: ItemId,
    pub author_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub cook_time_minutes: Option<u32>,
    /// 1-5 scale
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
    #[serde(default)]
    pub categories: HashSet<String>,
    #[serde(default)]
    pub tags: HashSet<String>,
    #[serde(default)]
    pub dietary_preferences: HashSet<DietaryPreference>,
    #[serde(default)]
    pub allergens: HashSet<String>,
    /// Kept sorted by `display_order` (normalized at insert)
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    /// Opaque capability: any holder sees this recipe regardless of
    /// privacy level
    #[serde(default)]
    pub share_token: Option<String>,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

impl Recipe {
    /// Total of prep and cook time; None when neither is set
    pub fn total_time_minutes(&self) -> Option<u32> {
        match (self.prep_time_minutes, self.cook_time_minutes) {
            (None, None) => None,
            (prep, cook) => Some(prep.unwrap_or(0) + cook.unwrap_or(0)),
        }
    }
}

/// One dish on a restaurant's menu, owned by the restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Personal rating for this dish, 1.0-5.0
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub notes: Option<String>,
    /// appetizer, main, dessert, ...
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub dietary_preferences: HashSet<DietaryPreference>,
    #[serde(default)]
    pub allergens: HashSet<String>,
}

/// A restaurant entry owned by exactly one author
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: ItemId,
    pub author_id: UserId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Personal rating, 1.0-5.0
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
    #[serde(default)]
    pub cuisines: HashSet<String>,
    #[serde(default)]
    pub tags: HashSet<String>,
    #[serde(default)]
    pub dietary_options: HashSet<DietaryPreference>,
    #[serde(default)]
    pub menu_items: Vec<MenuItem>,
    #[serde(default)]
    pub share_token: Option<String>,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

/// One directed edge of the follow graph, as it appears in the snapshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FollowEdge {
    pub follower: UserId,
    pub followed: UserId,
}

/// Share tokens are opaque but bounded: ASCII alphanumerics plus `-`/`_`,
/// at most 64 bytes. Anything else is treated as absent by the
/// visibility policy rather than rejected with an error.
pub fn share_token_is_well_formed(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= 64
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

// =============================================================================
// StoreIndex - The In-Memory Entity Store
// =============================================================================

/// Main data structure that holds all entities and indices.
///
/// Reads are `&self` and never fail; every mutation is a single
/// `&mut self` call that updates the primary map and every affected
/// index together, so a reader can never observe a half-applied change
/// (the follow graph in particular: `following` is authoritative and
/// `followers` is its maintained transpose).
#[derive(Debug)]
pub struct StoreIndex {
    // Primary entity stores
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) recipes: HashMap<ItemId, Recipe>,
    pub(crate) restaurants: HashMap<ItemId, Restaurant>,

    // Uniqueness indices
    pub(crate) usernames: HashMap<String, UserId>,
    pub(crate) emails: HashMap<String, UserId>,

    // Ownership indices
    pub(crate) recipes_by_author: HashMap<UserId, Vec<ItemId>>,
    pub(crate) restaurants_by_author: HashMap<UserId, Vec<ItemId>>,

    // Follow graph: `following` is the stored direction, `followers` is
    // derived from it and never mutated independently
    pub(crate) following: HashMap<UserId, HashSet<UserId>>,
    pub(crate) followers: HashMap<UserId, HashSet<UserId>>,

    // Active share tokens, globally unique
    pub(crate) share_tokens: HashMap<String, ItemRef>,

    // Secondary indices for tag-style queries (built after load)
    pub(crate) category_index: HashMap<String, Vec<ItemRef>>,
    pub(crate) cuisine_index: HashMap<String, Vec<ItemRef>>,
    pub(crate) tag_index: HashMap<String, Vec<ItemRef>>,
}

impl StoreIndex {
    /// Creates a new, empty StoreIndex
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
            recipes: HashMap::new(),
            restaurants: HashMap::new(),
            usernames: HashMap::new(),
            emails: HashMap::new(),
            recipes_by_author: HashMap::new(),
            restaurants_by_author: HashMap::new(),
            following: HashMap::new(),
            followers: HashMap::new(),
            share_tokens: HashMap::new(),
            category_index: HashMap::new(),
            cuisine_index: HashMap::new(),
            tag_index: HashMap::new(),
        }
    }

    // Getters - these return references or small owned values; unknown
    // ids resolve to None/empty rather than errors

    /// Get a user by id
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a recipe by id
    pub fn get_recipe(&self, id: ItemId) -> Option<&Recipe> {
        self.recipes.get(&id)
    }

    /// Get a restaurant by id
    pub fn get_restaurant(&self, id: ItemId) -> Option<&Restaurant> {
        self.restaurants.get(&id)
    }

    /// Look a user up by exact username
    pub fn find_user_by_username(&self, username: &str) -> Option<&User> {
        self.usernames.get(username).and_then(|id| self.users.get(id))
    }

    /// Look a user up by exact email
    pub fn find_user_by_email(&self, email: &str) -> Option<&User> {
        self.emails.get(email).and_then(|id| self.users.get(id))
    }

    /// Resolve a share token to the item carrying it
    pub fn find_by_share_token(&self, token: &str) -> Option<ItemRef> {
        self.share_tokens.get(token).copied()
    }

    // Uniform item accessors - the external interface the visibility
    // policy and filters consume. All of them treat an unknown ItemRef
    // as absent.

    /// Owner of an item
    pub fn owner_of(&self, item: ItemRef) -> Option<UserId> {
        match item.kind {
            ItemKind::Recipe => self.recipes.get(&item.id).map(|r| r.author_id),
            ItemKind::Restaurant => self.restaurants.get(&item.id).map(|r| r.author_id),
        }
    }

    /// Privacy level of an item
    pub fn privacy_level_of(&self, item: ItemRef) -> Option<PrivacyLevel> {
        match item.kind {
            ItemKind::Recipe => self.recipes.get(&item.id).map(|r| r.privacy_level),
            ItemKind::Restaurant => {
                self.restaurants.get(&item.id).map(|r| r.privacy_level)
            }
        }
    }

    /// Active share token of an item, if issued
    pub fn share_token_of(&self, item: ItemRef) -> Option<&str> {
        match item.kind {
            ItemKind::Recipe => {
                self.recipes.get(&item.id).and_then(|r| r.share_token.as_deref())
            }
            ItemKind::Restaurant => self
                .restaurants
                .get(&item.id)
                .and_then(|r| r.share_token.as_deref()),
        }
    }

    /// Creation timestamp of an item
    pub fn created_at_of(&self, item: ItemRef) -> Option<i64> {
        match item.kind {
            ItemKind::Recipe => self.recipes.get(&item.id).map(|r| r.created_at),
            ItemKind::Restaurant => self.restaurants.get(&item.id).map(|r| r.created_at),
        }
    }

    /// Display title of an item (recipe title / restaurant name)
    pub fn title_of(&self, item: ItemRef) -> Option<&str> {
        match item.kind {
            ItemKind::Recipe => self.recipes.get(&item.id).map(|r| r.title.as_str()),
            ItemKind::Restaurant => {
                self.restaurants.get(&item.id).map(|r| r.name.as_str())
            }
        }
    }

    /// Dietary tag set of an item; empty for unknown items
    pub fn dietary_tags_of(&self, item: ItemRef) -> HashSet<DietaryPreference> {
        match item.kind {
            ItemKind::Recipe => self
                .recipes
                .get(&item.id)
                .map(|r| r.dietary_preferences.clone())
                .unwrap_or_default(),
            ItemKind::Restaurant => self
                .restaurants
                .get(&item.id)
                .map(|r| r.dietary_options.clone())
                .unwrap_or_default(),
        }
    }

    /// Allergen set of an item; empty for unknown items.
    ///
    /// Restaurants declare allergens per menu item, so their effective
    /// set is the union over the menu.
    pub fn allergens_of(&self, item: ItemRef) -> HashSet<String> {
        match item.kind {
            ItemKind::Recipe => self
                .recipes
                .get(&item.id)
                .map(|r| r.allergens.clone())
                .unwrap_or_default(),
            ItemKind::Restaurant => self
                .restaurants
                .get(&item.id)
                .map(|r| {
                    r.menu_items
                        .iter()
                        .flat_map(|m| m.allergens.iter().cloned())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Combined category/cuisine/free-tag set of an item; empty for
    /// unknown items
    pub fn tags_of(&self, item: ItemRef) -> HashSet<String> {
        match item.kind {
            ItemKind::Recipe => self
                .recipes
                .get(&item.id)
                .map(|r| r.categories.union(&r.tags).cloned().collect())
                .unwrap_or_default(),
            ItemKind::Restaurant => self
                .restaurants
                .get(&item.id)
                .map(|r| r.cuisines.union(&r.tags).cloned().collect())
                .unwrap_or_default(),
        }
    }

    // Follow graph reads

    /// Whether `follower` has an outbound edge to `followed`
    pub fn is_following(&self, follower: UserId, followed: UserId) -> bool {
        self.following
            .get(&follower)
            .is_some_and(|set| set.contains(&followed))
    }

    /// The set of users `user_id` follows; empty for unknown users
    pub fn following_of(&self, user_id: UserId) -> HashSet<UserId> {
        self.following.get(&user_id).cloned().unwrap_or_default()
    }

    /// The set of users following `user_id` (the derived transpose);
    /// empty for unknown users
    pub fn followers_of(&self, user_id: UserId) -> HashSet<UserId> {
        self.followers.get(&user_id).cloned().unwrap_or_default()
    }

    // Mutators - each call leaves every index consistent

    /// Insert a user, enforcing username and email uniqueness
    pub fn insert_user(&mut self, user: User) -> Result<()> {
        if self.users.contains_key(&user.id) {
            return Err(StoreError::Duplicate {
                field: "user id".to_string(),
                value: user.id.to_string(),
            });
        }
        if self.usernames.contains_key(&user.username) {
            return Err(StoreError::Duplicate {
                field: "username".to_string(),
                value: user.username.clone(),
            });
        }
        if self.emails.contains_key(&user.email) {
            return Err(StoreError::Duplicate {
                field: "email".to_string(),
                value: user.email.clone(),
            });
        }
        self.usernames.insert(user.username.clone(), user.id);
        self.emails.insert(user.email.clone(), user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    /// Insert a recipe and update the ownership and token indices.
    ///
    /// Ingredients are normalized to display order here so the rest of
    /// the system can rely on the list being sorted.
    pub fn insert_recipe(&mut self, mut recipe: Recipe) -> Result<()> {
        if self.recipes.contains_key(&recipe.id) {
            return Err(StoreError::Duplicate {
                field: "recipe id".to_string(),
                value: recipe.id.to_string(),
            });
        }
        if !self.users.contains_key(&recipe.author_id) {
            return Err(StoreError::MissingReference {
                entity: "User".to_string(),
                id: recipe.author_id,
            });
        }
        if let Some(difficulty) = recipe.difficulty {
            if !(1..=5).contains(&difficulty) {
                return Err(StoreError::InvalidValue {
                    field: "difficulty".to_string(),
                    value: difficulty.to_string(),
                });
            }
        }
        let item = ItemRef::recipe(recipe.id);
        self.register_share_token(recipe.share_token.as_deref(), item)?;
        recipe.ingredients.sort_by_key(|i| i.display_order);
        self.recipes_by_author
            .entry(recipe.author_id)
            .or_default()
            .push(recipe.id);
        self.recipes.insert(recipe.id, recipe);
        Ok(())
    }

    /// Insert a restaurant and update the ownership and token indices
    pub fn insert_restaurant(&mut self, restaurant: Restaurant) -> Result<()> {
        if self.restaurants.contains_key(&restaurant.id) {
            return Err(StoreError::Duplicate {
                field: "restaurant id".to_string(),
                value: restaurant.id.to_string(),
            });
        }
        if !self.users.contains_key(&restaurant.author_id) {
            return Err(StoreError::MissingReference {
                entity: "User".to_string(),
                id: restaurant.author_id,
            });
        }
        if let Some(rating) = restaurant.rating {
            if !(1.0..=5.0).contains(&rating) {
                return Err(StoreError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.to_string(),
                });
            }
        }
        let item = ItemRef::restaurant(restaurant.id);
        self.register_share_token(restaurant.share_token.as_deref(), item)?;
        self.restaurants_by_author
            .entry(restaurant.author_id)
            .or_default()
            .push(restaurant.id);
        self.restaurants.insert(restaurant.id, restaurant);
        Ok(())
    }

    /// Add a follow edge.
    ///
    /// Both directions of the relation are updated in this one call;
    /// self-follows are rejected.
    pub fn follow(&mut self, follower: UserId, followed: UserId) -> Result<()> {
        if follower == followed {
            return Err(StoreError::Validation(format!(
                "user {} cannot follow themselves",
                follower
            )));
        }
        if !self.users.contains_key(&follower) {
            return Err(StoreError::MissingReference {
                entity: "User".to_string(),
                id: follower,
            });
        }
        if !self.users.contains_key(&followed) {
            return Err(StoreError::MissingReference {
                entity: "User".to_string(),
                id: followed,
            });
        }
        self.following.entry(follower).or_default().insert(followed);
        self.followers.entry(followed).or_default().insert(follower);
        Ok(())
    }

    /// Remove a follow edge; removing an absent edge is a no-op
    pub fn unfollow(&mut self, follower: UserId, followed: UserId) {
        if let Some(set) = self.following.get_mut(&follower) {
            set.remove(&followed);
        }
        if let Some(set) = self.followers.get_mut(&followed) {
            set.remove(&follower);
        }
    }

    /// Change an item's privacy level. Only the owner may do this.
    pub fn set_privacy_level(
        &mut self,
        acting_user: UserId,
        item: ItemRef,
        level: PrivacyLevel,
    ) -> Result<()> {
        let owner = self.owner_of(item).ok_or_else(|| StoreError::MissingReference {
            entity: "Item".to_string(),
            id: item.id,
        })?;
        if owner != acting_user {
            return Err(StoreError::Validation(format!(
                "user {} does not own item {}",
                acting_user, item.id
            )));
        }
        match item.kind {
            ItemKind::Recipe => {
                if let Some(recipe) = self.recipes.get_mut(&item.id) {
                    recipe.privacy_level = level;
                }
            }
            ItemKind::Restaurant => {
                if let Some(restaurant) = self.restaurants.get_mut(&item.id) {
                    restaurant.privacy_level = level;
                }
            }
        }
        Ok(())
    }

    /// Attach a share token to an item. Only the owner may issue one,
    /// a token is stable once issued, and tokens are unique among
    /// active tokens.
    pub fn issue_share_token(
        &mut self,
        acting_user: UserId,
        item: ItemRef,
        token: String,
    ) -> Result<()> {
        let owner = self.owner_of(item).ok_or_else(|| StoreError::MissingReference {
            entity: "Item".to_string(),
            id: item.id,
        })?;
        if owner != acting_user {
            return Err(StoreError::Validation(format!(
                "user {} does not own item {}",
                acting_user, item.id
            )));
        }
        if self.share_token_of(item).is_some() {
            return Err(StoreError::Validation(format!(
                "item {} already has a share token",
                item.id
            )));
        }
        if !share_token_is_well_formed(&token) {
            return Err(StoreError::InvalidValue {
                field: "share_token".to_string(),
                value: token,
            });
        }
        if self.share_tokens.contains_key(&token) {
            return Err(StoreError::Duplicate {
                field: "share_token".to_string(),
                value: token,
            });
        }
        self.share_tokens.insert(token.clone(), item);
        match item.kind {
            ItemKind::Recipe => {
                if let Some(recipe) = self.recipes.get_mut(&item.id) {
                    recipe.share_token = Some(token);
                }
            }
            ItemKind::Restaurant => {
                if let Some(restaurant) = self.restaurants.get_mut(&item.id) {
                    restaurant.share_token = Some(token);
                }
            }
        }
        Ok(())
    }

    /// Record an item's pre-existing token in the uniqueness index
    fn register_share_token(&mut self, token: Option<&str>, item: ItemRef) -> Result<()> {
        let Some(token) = token else {
            return Ok(());
        };
        if !share_token_is_well_formed(token) {
            return Err(StoreError::InvalidValue {
                field: "share_token".to_string(),
                value: token.to_string(),
            });
        }
        if self.share_tokens.contains_key(token) {
            return Err(StoreError::Duplicate {
                field: "share_token".to_string(),
                value: token.to_string(),
            });
        }
        self.share_tokens.insert(token.to_string(), item);
        Ok(())
    }

    /// All user ids, unordered
    pub fn all_user_ids(&self) -> Vec<UserId> {
        self.users.keys().copied().collect()
    }

    /// Entity counts (users, recipes, restaurants) for logging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.recipes.len(), self.restaurants.len())
    }
}

impl Default for StoreIndex {
    fn default() -> Self {
        Self::new()
    }
}
