//! Filter to keep only items compatible with a set of dietary
//! preferences.
//!
//! An item with no dietary tags declares no restriction and always
//! passes. A tagged item passes only if its tags intersect the allowed
//! set — so an EMPTY allowed set excludes every tagged item. That
//! conservative default is intentional and load-bearing: "I allowed
//! nothing" must not degrade into "show me everything tagged".
//!
//! Compare [`super::allergen_safety`], which is the inverse combinator
//! (must NOT overlap or be unrestricted). The two are deliberately
//! separate types.

use crate::traits::Filter;
use anyhow::Result;
use feed::{Candidate, ViewerContext};
use std::collections::HashSet;
use std::sync::Arc;
use store::{DietaryPreference, StoreIndex};

/// Keeps candidates whose dietary tag set is empty or overlaps the
/// allowed preferences.
pub struct DietaryPreferenceFilter {
    index: Arc<StoreIndex>,
    allowed: HashSet<DietaryPreference>,
}

impl DietaryPreferenceFilter {
    /// Create a new DietaryPreferenceFilter.
    ///
    /// # Arguments
    /// * `index` - Shared reference to the store for tag lookups
    /// * `allowed` - The preferences the viewer wants matched
    pub fn new(index: Arc<StoreIndex>, allowed: HashSet<DietaryPreference>) -> Self {
        Self { index, allowed }
    }
}

impl Filter for DietaryPreferenceFilter {
    fn name(&self) -> &str {
        "DietaryPreferenceFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &ViewerContext,
    ) -> Result<Vec<Candidate>> {
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                let tags = self.index.dietary_tags_of(candidate.item);
                // Untagged items declare no restriction
                tags.is_empty() || tags.intersection(&self.allowed).next().is_some()
            })
            .collect();
        Ok(filtered)
    }
}
