//! Discover Source - Out-of-Network Candidate Gathering
//!
//! Gathers Public items from across the whole store for the explore
//! view, through two strategies:
//! - Recent: the newest Public items regardless of author
//! - Dietary-matched: Public items whose dietary tags intersect the
//!   viewer's declared preferences (skipped for viewers without any)
//!
//! Results from both strategies are deduplicated by item ref. Only
//! Public items are gathered here — a Friends item from an unfollowed
//! author would be dropped by the visibility filter anyway, so there is
//! no point carrying it.

use crate::types::{Candidate, CandidateSource, ViewerContext};
use std::collections::HashMap;
use std::sync::Arc;
use store::{ItemRef, StoreIndex};
use tracing::{debug, instrument};

/// Discover source gathers public candidates for exploration
#[derive(Clone)]
pub struct DiscoverSource {
    /// Shared reference to the store
    index: Arc<StoreIndex>,
}

impl DiscoverSource {
    pub fn new(index: Arc<StoreIndex>) -> Self {
        Self { index }
    }

    /// Gather discovery candidates. Works for anonymous viewers too —
    /// they simply get the recent-Public strategy only.
    #[instrument(skip(self, context), fields(viewer = ?context.viewer))]
    pub fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        // Run both strategies in parallel; the dietary strategy is a
        // no-op for viewers without declared preferences
        let (recent, dietary_matched) = rayon::join(
            || self.get_recent_public(limit),
            || {
                if context.dietary_preferences.is_empty() {
                    Vec::new()
                } else {
                    self.get_dietary_matched(context, limit / 2)
                }
            },
        );

        let mut all_candidates: HashMap<ItemRef, Candidate> = HashMap::new();
        for candidate in recent {
            all_candidates.insert(candidate.item, candidate);
        }
        for candidate in dietary_matched {
            all_candidates.entry(candidate.item).or_insert(candidate);
        }

        // Newest first, ties by item ref
        let mut candidates: Vec<Candidate> = all_candidates.into_values().collect();
        candidates.sort_by_key(|c| (std::cmp::Reverse(c.created_at), c.item));
        candidates.truncate(limit);

        debug!("Gathered {} discover candidates", candidates.len());
        candidates
    }

    /// Recent-Public strategy: newest public items across all authors
    fn get_recent_public(&self, limit: usize) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .index
            .public_items()
            .into_iter()
            .map(|item| {
                Candidate::new(
                    item,
                    CandidateSource::Discover,
                    self.index.created_at_of(item).unwrap_or(0),
                )
            })
            .collect();
        candidates.truncate(limit);
        candidates
    }

    /// Dietary-matched strategy: public items tagged with any of the
    /// viewer's declared preferences
    fn get_dietary_matched(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .index
            .public_items()
            .into_iter()
            .filter(|item| {
                self.index
                    .dietary_tags_of(*item)
                    .intersection(&context.dietary_preferences)
                    .next()
                    .is_some()
            })
            .map(|item| {
                Candidate::new(
                    item,
                    CandidateSource::Discover,
                    self.index.created_at_of(item).unwrap_or(0),
                )
            })
            .collect();
        candidates.truncate(limit);
        candidates
    }
}
