//! Filter to drop items containing any of the viewer's allergens.
//!
//! An item with no declared allergens always passes. A declared item
//! passes only if its allergen set is DISJOINT from the given set —
//! the inverse of the dietary-preference combinator, which requires
//! overlap. Conflating the two is the classic bug here; keep them
//! separate.
//!
//! Allergen strings are free text and compared exactly; any
//! normalization (case, synonyms) is the caller's concern.

use crate::traits::Filter;
use anyhow::Result;
use feed::{Candidate, ViewerContext};
use std::collections::HashSet;
use std::sync::Arc;
use store::StoreIndex;

/// Keeps candidates whose allergen set is empty or disjoint from the
/// given allergens.
pub struct AllergenSafetyFilter {
    index: Arc<StoreIndex>,
    allergens: HashSet<String>,
}

impl AllergenSafetyFilter {
    /// Create a new AllergenSafetyFilter.
    ///
    /// # Arguments
    /// * `index` - Shared reference to the store for allergen lookups
    /// * `allergens` - The substances the viewer wants excluded
    pub fn new(index: Arc<StoreIndex>, allergens: HashSet<String>) -> Self {
        Self { index, allergens }
    }
}

impl Filter for AllergenSafetyFilter {
    fn name(&self) -> &str {
        "AllergenSafetyFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &ViewerContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                let item_allergens = self.index.allergens_of(candidate.item);
                item_allergens.is_empty()
                    || item_allergens.is_disjoint(&self.allergens)
            })
            .collect();
        Ok(filtered)
    }
}
