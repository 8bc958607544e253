//! Core types for feed candidate generation.

use std::collections::HashSet;
use store::{DietaryPreference, ItemRef, UserId};

/// Where a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// In-network: authored by the viewer or someone they follow
    Followed,
    /// Out-of-network: public discovery
    Discover,
    /// Reached through a share link rather than a feed
    Shared,
}

/// A content item flowing through the filter pipeline.
///
/// The creation timestamp is carried along so ordering and merging
/// never need to go back to the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub item: ItemRef,
    pub source: CandidateSource,
    pub created_at: i64,
}

impl Candidate {
    pub fn new(item: ItemRef, source: CandidateSource, created_at: i64) -> Self {
        Self {
            item,
            source,
            created_at,
        }
    }
}

/// Everything the visibility policy and filters need to know about the
/// requesting principal, gathered once per request.
///
/// `viewer` is `None` for the anonymous principal; `following` is the
/// viewer's OUTBOUND edge set (the users the viewer follows), which is
/// the direction Friends visibility is defined over.
#[derive(Debug, Clone)]
pub struct ViewerContext {
    pub viewer: Option<UserId>,
    pub following: HashSet<UserId>,
    pub dietary_preferences: HashSet<DietaryPreference>,
    pub allergens: HashSet<String>,
    /// Share token presented with the request, if any
    pub share_token: Option<String>,
}

impl ViewerContext {
    /// Context for an authenticated viewer, before graph/preference
    /// aggregation (see `build_viewer_context`)
    pub fn new(viewer: UserId) -> Self {
        Self {
            viewer: Some(viewer),
            following: HashSet::new(),
            dietary_preferences: HashSet::new(),
            allergens: HashSet::new(),
            share_token: None,
        }
    }

    /// The unauthenticated principal
    pub fn anonymous() -> Self {
        Self {
            viewer: None,
            following: HashSet::new(),
            dietary_preferences: HashSet::new(),
            allergens: HashSet::new(),
            share_token: None,
        }
    }

    /// Attach a presented share token
    pub fn with_share_token(mut self, token: impl Into<String>) -> Self {
        self.share_token = Some(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.viewer.is_some()
    }

    /// Whether the viewer follows `owner` (outbound edge viewer -> owner)
    pub fn follows(&self, owner: UserId) -> bool {
        self.following.contains(&owner)
    }
}
