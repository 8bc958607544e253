//! Followed Source - In-network Candidate Gathering
//!
//! Gathers the candidate set for the home feed: every content item
//! authored by the viewer or by someone the viewer follows. The store
//! returns items newest-first, so the gathered set is already in feed
//! order.
//!
//! Visibility is NOT decided here. The follow restriction only bounds
//! which authors contribute candidates; the visibility filter in the
//! pipeline crate applies the privacy/ownership/token rules per item.

use crate::types::{Candidate, CandidateSource, ViewerContext};
use std::collections::HashSet;
use std::sync::Arc;
use store::{StoreIndex, UserId};
use tracing::{debug, instrument};

/// Followed source gathers in-network candidates from the follow graph
#[derive(Clone)]
pub struct FollowedSource {
    /// Shared reference to the store (read-only, so no locking needed)
    index: Arc<StoreIndex>,
}

impl FollowedSource {
    pub fn new(index: Arc<StoreIndex>) -> Self {
        Self { index }
    }

    /// Gather candidates for a viewer's feed.
    ///
    /// Anonymous viewers have no network, so this returns nothing for
    /// them — their feed comes entirely from the discover source.
    #[instrument(skip(self, context), fields(viewer = ?context.viewer))]
    pub fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        let Some(viewer) = context.viewer else {
            return Vec::new();
        };

        // Candidate authors: the viewer plus their outbound follow set
        let mut authors: HashSet<UserId> = context.following.clone();
        authors.insert(viewer);

        let mut candidates: Vec<Candidate> = self
            .index
            .items_by_authors(&authors)
            .into_iter()
            .map(|item| {
                Candidate::new(
                    item,
                    CandidateSource::Followed,
                    self.index.created_at_of(item).unwrap_or(0),
                )
            })
            .collect();
        candidates.truncate(limit);

        debug!("Gathered {} followed candidates", candidates.len());
        candidates
    }
}
