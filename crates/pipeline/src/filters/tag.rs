//! Optional filter for category/cuisine/free-tag narrowing.
//!
//! Matches against an item's combined tag set (recipe categories +
//! tags, restaurant cuisines + tags). An empty requested set means "no
//! narrowing requested" and passes everything through — unlike the
//! dietary filter, where an empty set is a meaningful restriction.

use crate::traits::Filter;
use anyhow::Result;
use feed::{Candidate, ViewerContext};
use std::collections::HashSet;
use std::sync::Arc;
use store::StoreIndex;

/// Keeps candidates carrying at least one of the requested tags.
pub struct TagFilter {
    index: Arc<StoreIndex>,
    tags: HashSet<String>,
}

impl TagFilter {
    /// Create a new TagFilter.
    ///
    /// # Arguments
    /// * `index` - Shared reference to the store for tag lookups
    /// * `tags` - The categories/cuisines/tags to narrow to
    pub fn new(index: Arc<StoreIndex>, tags: HashSet<String>) -> Self {
        Self { index, tags }
    }
}

impl Filter for TagFilter {
    fn name(&self) -> &str {
        "TagFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        _context: &ViewerContext,
    ) -> Result<Vec<Candidate>> {
        if self.tags.is_empty() {
            return Ok(candidates);
        }
        let filtered: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| {
                self.index
                    .tags_of(candidate.item)
                    .intersection(&self.tags)
                    .next()
                    .is_some()
            })
            .collect();
        Ok(filtered)
    }
}
