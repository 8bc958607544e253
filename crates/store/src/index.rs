//! StoreIndex loading, secondary indexing, and declarative queries.
//!
//! This module builds the StoreIndex from a parsed snapshot:
//! - Insert entities through the invariant-checking mutators
//! - Apply the follow edges
//! - Build secondary indices (category, cuisine, free tags)
//! - Validate referential integrity
//!
//! It also hosts the query methods that mirror the application's
//! declarative repository interface (search, by-category, by-cuisine,
//! by-price-range, author listings).

use crate::error::{Result, StoreError};
use crate::parser;
use crate::types::*;
use std::cmp::Reverse;
use std::collections::HashSet;
use std::path::Path;

impl StoreIndex {
    /// Load an entire snapshot directory.
    ///
    /// This is the main entry point for loading data.
    ///
    /// Steps:
    /// 1. Parse all four files (users, recipes, restaurants, follows)
    /// 2. Insert entities through the checked mutators
    /// 3. Build secondary indices (category, cuisine, tag)
    /// 4. Validate referential integrity
    pub fn load_from_files(snapshot_dir: &Path) -> Result<Self> {
        println!("Loading TasteTrail snapshot from {:?}", snapshot_dir);

        let users_path = snapshot_dir.join("users.jsonl");
        let recipes_path = snapshot_dir.join("recipes.jsonl");
        let restaurants_path = snapshot_dir.join("restaurants.jsonl");
        let follows_path = snapshot_dir.join("follows.jsonl");

        // Parse the four files in parallel; rayon::join runs two
        // closures concurrently, so we nest joins for four-way
        // parallelism
        let ((users, recipes), (restaurants, follows)) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_recipes(&recipes_path),
                )
            },
            || {
                rayon::join(
                    || parser::parse_restaurants(&restaurants_path),
                    || parser::parse_follows(&follows_path),
                )
            },
        );

        let users = users?;
        let recipes = recipes?;
        let restaurants = restaurants?;
        let follows = follows?;

        println!(
            "Loaded {} users, {} recipes, {} restaurants, {} follow edges",
            users.len(),
            recipes.len(),
            restaurants.len(),
            follows.len()
        );

        let mut index = StoreIndex::new();

        // Users first so item inserts can check author references
        for user in users {
            index.insert_user(user)?;
        }
        for recipe in recipes {
            index.insert_recipe(recipe)?;
        }
        for restaurant in restaurants {
            index.insert_restaurant(restaurant)?;
        }
        for edge in follows {
            index.follow(edge.follower, edge.followed)?;
        }

        index.build_secondary_indices();
        index.validate()?;

        Ok(index)
    }

    /// Build secondary indices after primary data is loaded.
    ///
    /// Populates the category index (recipes), cuisine index
    /// (restaurants), and the shared free-tag index.
    pub fn build_secondary_indices(&mut self) {
        self.category_index.clear();
        self.cuisine_index.clear();
        self.tag_index.clear();

        for (id, recipe) in &self.recipes {
            let item = ItemRef::recipe(*id);
            for category in &recipe.categories {
                self.category_index
                    .entry(category.clone())
                    .or_default()
                    .push(item);
            }
            for tag in &recipe.tags {
                self.tag_index.entry(tag.clone()).or_default().push(item);
            }
        }

        for (id, restaurant) in &self.restaurants {
            let item = ItemRef::restaurant(*id);
            for cuisine in &restaurant.cuisines {
                self.cuisine_index
                    .entry(cuisine.clone())
                    .or_default()
                    .push(item);
            }
            for tag in &restaurant.tags {
                self.tag_index.entry(tag.clone()).or_default().push(item);
            }
        }

        // Deterministic order within each bucket
        for bucket in self
            .category_index
            .values_mut()
            .chain(self.cuisine_index.values_mut())
            .chain(self.tag_index.values_mut())
        {
            bucket.sort_unstable();
        }
    }

    /// Validate referential integrity.
    ///
    /// The checked mutators already reject bad references on the load
    /// path; this re-verifies the whole index so a hand-assembled store
    /// can be checked too.
    pub fn validate(&self) -> Result<()> {
        for recipe in self.recipes.values() {
            if !self.users.contains_key(&recipe.author_id) {
                return Err(StoreError::MissingReference {
                    entity: "User".to_string(),
                    id: recipe.author_id,
                });
            }
        }
        for restaurant in self.restaurants.values() {
            if !self.users.contains_key(&restaurant.author_id) {
                return Err(StoreError::MissingReference {
                    entity: "User".to_string(),
                    id: restaurant.author_id,
                });
            }
        }
        for (follower, followed_set) in &self.following {
            if !self.users.contains_key(follower) {
                return Err(StoreError::MissingReference {
                    entity: "User".to_string(),
                    id: *follower,
                });
            }
            for followed in followed_set {
                if !self.users.contains_key(followed) {
                    return Err(StoreError::MissingReference {
                        entity: "User".to_string(),
                        id: *followed,
                    });
                }
                if follower == followed {
                    return Err(StoreError::Validation(format!(
                        "self-follow edge on user {}",
                        follower
                    )));
                }
                // The derived transpose must agree with the stored edge
                if !self
                    .followers
                    .get(followed)
                    .is_some_and(|set| set.contains(follower))
                {
                    return Err(StoreError::Validation(format!(
                        "follower index out of sync for edge {} -> {}",
                        follower, followed
                    )));
                }
            }
        }
        Ok(())
    }

    // Ordering helper shared by every listing: creation time descending,
    // ties broken by (kind, id) ascending so pagination is stable.
    fn sort_items_newest_first(&self, items: &mut Vec<ItemRef>) {
        items.sort_by_key(|item| (Reverse(self.created_at_of(*item).unwrap_or(0)), *item));
    }

    /// All content items authored by any of `authors`, newest first
    pub fn items_by_authors(&self, authors: &HashSet<UserId>) -> Vec<ItemRef> {
        let mut items: Vec<ItemRef> = Vec::new();
        for author in authors {
            if let Some(ids) = self.recipes_by_author.get(author) {
                items.extend(ids.iter().map(|id| ItemRef::recipe(*id)));
            }
            if let Some(ids) = self.restaurants_by_author.get(author) {
                items.extend(ids.iter().map(|id| ItemRef::restaurant(*id)));
            }
        }
        self.sort_items_newest_first(&mut items);
        items
    }

    /// Items authored by one user at a specific privacy level, newest
    /// first
    pub fn items_by_author_and_privacy(
        &self,
        author: UserId,
        level: PrivacyLevel,
    ) -> Vec<ItemRef> {
        // items_by_authors is already in feed order
        self.items_by_authors(&HashSet::from([author]))
            .into_iter()
            .filter(|item| self.privacy_level_of(*item) == Some(level))
            .collect()
    }

    /// All Public items across all authors, newest first
    pub fn public_items(&self) -> Vec<ItemRef> {
        let mut items: Vec<ItemRef> = self
            .all_item_refs()
            .into_iter()
            .filter(|item| self.privacy_level_of(*item) == Some(PrivacyLevel::Public))
            .collect();
        self.sort_items_newest_first(&mut items);
        items
    }

    /// Every item ref in the store, unordered
    pub fn all_item_refs(&self) -> Vec<ItemRef> {
        self.recipes
            .keys()
            .map(|id| ItemRef::recipe(*id))
            .chain(self.restaurants.keys().map(|id| ItemRef::restaurant(*id)))
            .collect()
    }

    /// Recipes in a category
    pub fn recipes_by_category(&self, category: &str) -> &[ItemRef] {
        self.category_index
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Restaurants serving a cuisine
    pub fn restaurants_by_cuisine(&self, cuisine: &str) -> &[ItemRef] {
        self.cuisine_index
            .get(cuisine)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Items (either kind) carrying a free tag
    pub fn items_by_tag(&self, tag: &str) -> &[ItemRef] {
        self.tag_index.get(tag).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Restaurants in a price bracket, newest first
    pub fn restaurants_by_price_range(&self, price_range: PriceRange) -> Vec<ItemRef> {
        let mut items: Vec<ItemRef> = self
            .restaurants
            .values()
            .filter(|r| r.price_range == Some(price_range))
            .map(|r| ItemRef::restaurant(r.id))
            .collect();
        self.sort_items_newest_first(&mut items);
        items
    }

    /// Recipes declaring no allergens at all, newest first
    pub fn recipes_without_allergens(&self) -> Vec<ItemRef> {
        let mut items: Vec<ItemRef> = self
            .recipes
            .values()
            .filter(|r| r.allergens.is_empty())
            .map(|r| ItemRef::recipe(r.id))
            .collect();
        self.sort_items_newest_first(&mut items);
        items
    }

    /// Case-insensitive substring search over recipe title/description,
    /// newest first
    pub fn search_recipes(&self, query: &str) -> Vec<ItemRef> {
        let needle = query.to_lowercase();
        let mut items: Vec<ItemRef> = self
            .recipes
            .values()
            .filter(|r| {
                r.title.to_lowercase().contains(&needle)
                    || r.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .map(|r| ItemRef::recipe(r.id))
            .collect();
        self.sort_items_newest_first(&mut items);
        items
    }

    /// Case-insensitive substring search over restaurant
    /// name/description/address, newest first
    pub fn search_restaurants(&self, query: &str) -> Vec<ItemRef> {
        let needle = query.to_lowercase();
        let mut items: Vec<ItemRef> = self
            .restaurants
            .values()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || r.address
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&needle))
            })
            .map(|r| ItemRef::restaurant(r.id))
            .collect();
        self.sort_items_newest_first(&mut items);
        items
    }

    /// Case-insensitive substring search over username and first/last
    /// name, sorted by id
    pub fn search_users(&self, query: &str) -> Vec<UserId> {
        let needle = query.to_lowercase();
        let mut ids: Vec<UserId> = self
            .users
            .values()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u.first_name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
                    || u.last_name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .map(|u| u.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Restaurants whose name and address both contain the given
    /// fragments, excluding `exclude_id` — used to flag likely
    /// duplicate entries before saving a new one
    pub fn find_potential_duplicates(
        &self,
        name: &str,
        address: &str,
        exclude_id: ItemId,
    ) -> Vec<ItemId> {
        let name_needle = name.to_lowercase();
        let address_needle = address.to_lowercase();
        let mut ids: Vec<ItemId> = self
            .restaurants
            .values()
            .filter(|r| r.id != exclude_id)
            .filter(|r| {
                r.name.to_lowercase().contains(&name_needle)
                    && r.address
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&address_needle))
            })
            .map(|r| r.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
