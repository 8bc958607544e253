//! Feed-entry summaries for candidates that survived filtering.
//!
//! The orchestrator hands the surviving candidates here to be turned
//! into the summaries callers actually render. Items or authors that no
//! longer resolve are silently dropped — by this point visibility has
//! been decided, so a dangling ref is just a stale candidate.

use feed::{Candidate, CandidateSource};
use rayon::prelude::*;
use std::sync::Arc;
use store::{ItemRef, PrivacyLevel, StoreIndex, UserId};

/// What the feed returns per item: enough to render a list row without
/// another store round-trip.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub item: ItemRef,
    pub title: String,
    pub author_id: UserId,
    pub author_username: String,
    pub privacy_level: PrivacyLevel,
    pub created_at: i64,
    pub source: CandidateSource,
}

/// Builds FeedEntry summaries for candidates in parallel.
#[derive(Clone)]
pub struct SummaryBuilder {
    index: Arc<StoreIndex>,
}

impl SummaryBuilder {
    /// Create a new SummaryBuilder.
    pub fn new(index: Arc<StoreIndex>) -> Self {
        Self { index }
    }

    /// Build summaries for all candidates, preserving their order.
    ///
    /// Candidates whose item or author cannot be resolved are dropped.
    pub fn build(&self, candidates: &[Candidate]) -> Vec<FeedEntry> {
        candidates
            .par_iter()
            .filter_map(|candidate| self.build_single(candidate))
            .collect()
    }

    fn build_single(&self, candidate: &Candidate) -> Option<FeedEntry> {
        let title = self.index.title_of(candidate.item)?.to_string();
        let author_id = self.index.owner_of(candidate.item)?;
        let author = self.index.get_user(author_id)?;
        let privacy_level = self.index.privacy_level_of(candidate.item)?;

        Some(FeedEntry {
            item: candidate.item,
            title,
            author_id,
            author_username: author.username.clone(),
            privacy_level,
            created_at: candidate.created_at,
            source: candidate.source,
        })
    }
}
