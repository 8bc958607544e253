//! # Feed Orchestrator
//!
//! This module coordinates the feed pipeline end to end:
//! 1. Build the viewer context (follow set, preferences, allergies)
//! 2. Gather candidates (followed source; plus discover for explore)
//! 3. Merge and deduplicate candidates
//! 4. Apply the visibility filter and any requested narrowing
//! 5. Order deterministically and truncate
//! 6. Build feed-entry summaries
//!
//! It also hosts the single-item entry points: `is_visible` for a
//! point visibility check (with optional share token) and
//! `resolve_share_token` for share links.
//!
//! Candidate gathering walks the store, so it runs on `spawn_blocking`;
//! the explore view joins both sources in parallel with `tokio::join!`.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use feed::viewer_context::build_viewer_context;
use feed::{
    Candidate, CandidateSource, DiscoverSource, FollowedSource, ViewerContext,
};
use pipeline::filters::{
    AllergenSafetyFilter, DietaryPreferenceFilter, TagFilter, VisibilityFilter,
};
use pipeline::{FeedEntry, FilterPipeline, SummaryBuilder};
use store::{DietaryPreference, ItemRef, StoreIndex, UserId};

/// How many candidates each source gathers before filtering
const FOLLOWED_CANDIDATE_LIMIT: usize = 500;
const DISCOVER_CANDIDATE_LIMIT: usize = 200;

/// Per-request feed parameters.
///
/// `None` for a narrowing set means "no narrowing requested" — note
/// that `Some(empty)` is different for the dietary filter, where an
/// empty allowed set excludes every tagged item.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub limit: usize,
    pub dietary: Option<HashSet<DietaryPreference>>,
    pub exclude_allergens: Option<HashSet<String>>,
    pub tags: HashSet<String>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            limit: 20,
            dietary: None,
            exclude_allergens: None,
            tags: HashSet::new(),
        }
    }
}

/// Main orchestrator that coordinates the feed pipeline
#[derive(Clone)]
pub struct FeedOrchestrator {
    index: Arc<StoreIndex>,
    followed: FollowedSource,
    discover: DiscoverSource,
    summary_builder: SummaryBuilder,
}

impl FeedOrchestrator {
    /// Create a new orchestrator over a loaded store
    pub fn new(index: Arc<StoreIndex>) -> Self {
        let followed = FollowedSource::new(index.clone());
        let discover = DiscoverSource::new(index.clone());
        let summary_builder = SummaryBuilder::new(index.clone());
        Self {
            index,
            followed,
            discover,
            summary_builder,
        }
    }

    /// The home feed: items authored by the viewer or by users the
    /// viewer follows, visibility-filtered, newest first.
    ///
    /// A viewer id that does not resolve yields an empty feed rather
    /// than an error — the caller cannot tell a missing viewer from a
    /// viewer who sees nothing.
    pub async fn feed_for(
        &self,
        viewer_id: UserId,
        options: &FeedOptions,
    ) -> Result<Vec<FeedEntry>> {
        let start_time = Instant::now();

        let Ok(context) = build_viewer_context(&self.index, viewer_id) else {
            debug!("Viewer {} not found, returning empty feed", viewer_id);
            return Ok(Vec::new());
        };
        info!("Built viewer context for user {}", viewer_id);

        // Gather candidates off the async runtime
        let followed_candidates = {
            let followed = self.followed.clone();
            let context = context.clone();
            tokio::task::spawn_blocking(move || {
                followed.get_candidates(&context, FOLLOWED_CANDIDATE_LIMIT)
            })
            .await
            .context("Followed gather task panicked")?
        };
        info!("Gathered {} followed candidates", followed_candidates.len());

        let entries = self.filter_rank_summarize(followed_candidates, &context, options)?;
        info!(
            "Feed for user {} built in {:.2?} ({} entries)",
            viewer_id,
            start_time.elapsed(),
            entries.len()
        );
        Ok(entries)
    }

    /// The explore view: the home-feed candidates merged with public
    /// discovery, same filtering and ordering. Works for anonymous
    /// viewers (who get discovery only).
    pub async fn explore_for(
        &self,
        viewer_id: Option<UserId>,
        options: &FeedOptions,
    ) -> Result<Vec<FeedEntry>> {
        let start_time = Instant::now();
        let context = self.context_for(viewer_id, None);

        // Run both sources in parallel
        let (followed_result, discover_result) = tokio::join!(
            tokio::task::spawn_blocking({
                let followed = self.followed.clone();
                let context = context.clone();
                move || followed.get_candidates(&context, FOLLOWED_CANDIDATE_LIMIT)
            }),
            tokio::task::spawn_blocking({
                let discover = self.discover.clone();
                let context = context.clone();
                move || discover.get_candidates(&context, DISCOVER_CANDIDATE_LIMIT)
            })
        );
        let followed_candidates = followed_result.context("Followed gather task panicked")?;
        let discover_candidates = discover_result.context("Discover gather task panicked")?;
        info!(
            "Gathered {} followed and {} discover candidates",
            followed_candidates.len(),
            discover_candidates.len()
        );

        let merged = merge_candidates(followed_candidates, discover_candidates);
        info!("Merged candidates, total after deduplication: {}", merged.len());

        let entries = self.filter_rank_summarize(merged, &context, options)?;
        info!(
            "Explore view for {:?} built in {:.2?} ({} entries)",
            viewer_id,
            start_time.elapsed(),
            entries.len()
        );
        Ok(entries)
    }

    /// Point visibility check for one item, optionally with a presented
    /// share token. Unknown viewers and unknown items are simply not
    /// visible.
    pub fn is_visible(
        &self,
        viewer_id: Option<UserId>,
        item: ItemRef,
        token: Option<&str>,
    ) -> bool {
        let context = self.context_for(viewer_id, token);
        pipeline::is_visible(&self.index, &context, item)
    }

    /// Resolve a share token to the item summary it unlocks. Malformed
    /// or unknown tokens resolve to None, never an error.
    pub fn resolve_share_token(&self, token: &str) -> Option<FeedEntry> {
        let item = self.index.find_by_share_token(token)?;
        let candidate = Candidate::new(
            item,
            CandidateSource::Shared,
            self.index.created_at_of(item).unwrap_or(0),
        );
        self.summary_builder.build(&[candidate]).into_iter().next()
    }

    /// Title search over recipes and restaurants, restricted to what
    /// the viewer may see.
    pub fn search(&self, viewer_id: Option<UserId>, query: &str) -> Result<Vec<FeedEntry>> {
        let context = self.context_for(viewer_id, None);

        let mut candidates: Vec<Candidate> = self
            .index
            .search_recipes(query)
            .into_iter()
            .chain(self.index.search_restaurants(query))
            .map(|item| {
                Candidate::new(
                    item,
                    CandidateSource::Discover,
                    self.index.created_at_of(item).unwrap_or(0),
                )
            })
            .collect();
        sort_candidates(&mut candidates);

        let pipeline =
            FilterPipeline::new().add_filter(VisibilityFilter::new(self.index.clone()));
        let visible = pipeline.apply(candidates, &context)?;
        Ok(self.summary_builder.build(&visible))
    }

    /// Shared tail of every listing: filter, order, truncate, summarize
    fn filter_rank_summarize(
        &self,
        candidates: Vec<Candidate>,
        context: &ViewerContext,
        options: &FeedOptions,
    ) -> Result<Vec<FeedEntry>> {
        let pipeline = self.build_pipeline(options);
        let mut filtered = pipeline.apply(candidates, context)?;
        info!("Applied filters, candidates remaining: {}", filtered.len());

        sort_candidates(&mut filtered);
        filtered.truncate(options.limit);

        Ok(self.summary_builder.build(&filtered))
    }

    /// Visibility always runs first; narrowing filters are added only
    /// when requested
    fn build_pipeline(&self, options: &FeedOptions) -> FilterPipeline {
        let mut pipeline =
            FilterPipeline::new().add_filter(VisibilityFilter::new(self.index.clone()));
        if let Some(allergens) = &options.exclude_allergens {
            pipeline = pipeline.add_filter(AllergenSafetyFilter::new(
                self.index.clone(),
                allergens.clone(),
            ));
        }
        if let Some(dietary) = &options.dietary {
            pipeline = pipeline.add_filter(DietaryPreferenceFilter::new(
                self.index.clone(),
                dietary.clone(),
            ));
        }
        if !options.tags.is_empty() {
            pipeline = pipeline
                .add_filter(TagFilter::new(self.index.clone(), options.tags.clone()));
        }
        pipeline
    }

    /// Context for an optional viewer; unknown viewer ids degrade to
    /// the anonymous principal
    fn context_for(&self, viewer_id: Option<UserId>, token: Option<&str>) -> ViewerContext {
        let mut context = match viewer_id {
            Some(id) => {
                build_viewer_context(&self.index, id).unwrap_or_else(|_| {
                    debug!("Viewer {} not found, treating as anonymous", id);
                    ViewerContext::anonymous()
                })
            }
            None => ViewerContext::anonymous(),
        };
        if let Some(token) = token {
            context = context.with_share_token(token);
        }
        context
    }
}

/// Feed order: creation time descending, ties by (kind, id) ascending.
/// Deterministic, so two identical requests paginate identically.
fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by_key(|c| (Reverse(c.created_at), c.item));
}

/// Merge candidates from both sources and deduplicate by item ref.
/// In-network provenance wins when both sources found the same item.
fn merge_candidates(
    followed_candidates: Vec<Candidate>,
    discover_candidates: Vec<Candidate>,
) -> Vec<Candidate> {
    let mut map: HashMap<ItemRef, Candidate> = HashMap::new();

    for candidate in discover_candidates {
        map.insert(candidate.item, candidate);
    }
    // Second pass overwrites, so Followed provenance survives
    for candidate in followed_candidates {
        map.insert(candidate.item, candidate);
    }

    map.into_values().collect()
}
