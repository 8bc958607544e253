//! Example: Gather feed candidates for a user
//!
//! Run with: cargo run --package feed --example generate_feed
//!
//! This example shows how to:
//! 1. Load a snapshot
//! 2. Build the viewer context
//! 3. Gather in-network (followed) candidates
//! 4. Gather out-of-network (discover) candidates
//! 5. Display the results

use feed::{CandidateSource, DiscoverSource, FollowedSource, viewer_context::build_viewer_context};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use store::StoreIndex;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    println!("=== TasteTrail Candidate Gathering Example ===\n");

    // Load snapshot
    println!("Loading snapshot...");
    let start = Instant::now();
    let snapshot_dir = Path::new("data/snapshot");
    let index = Arc::new(StoreIndex::load_from_files(snapshot_dir)?);
    println!("Loaded snapshot in {:?}\n", start.elapsed());

    // Choose a test viewer
    let viewer_id = 1;
    let user = index.get_user(viewer_id).expect("User not found");
    println!("Viewer: {} ({})", user.username, viewer_id);
    println!("  Dietary preferences: {:?}", user.dietary_preferences);
    println!("  Allergies: {:?}\n", user.allergies);

    // Build viewer context
    let start = Instant::now();
    let context = build_viewer_context(&index, viewer_id)?;
    println!("Built viewer context in {:?}", start.elapsed());
    println!("  Following: {} users\n", context.following.len());

    // Gather followed candidates
    println!("Gathering followed (in-network) candidates...");
    let followed = FollowedSource::new(index.clone());
    let start = Instant::now();
    let followed_candidates = followed.get_candidates(&context, 200);
    println!(
        "Gathered {} followed candidates in {:?}",
        followed_candidates.len(),
        start.elapsed()
    );

    // Gather discover candidates
    println!("\nGathering discover (out-of-network) candidates...");
    let discover = DiscoverSource::new(index.clone());
    let start = Instant::now();
    let discover_candidates = discover.get_candidates(&context, 100);
    println!(
        "Gathered {} discover candidates in {:?}",
        discover_candidates.len(),
        start.elapsed()
    );

    // Show the top of each list
    println!("\nTop 5 followed candidates:");
    for (i, candidate) in followed_candidates.iter().take(5).enumerate() {
        if let Some(title) = index.title_of(candidate.item) {
            println!("  {}. {} ({:?})", i + 1, title, candidate.item.kind);
        }
    }

    println!("\nTop 5 discover candidates:");
    for (i, candidate) in discover_candidates.iter().take(5).enumerate() {
        if let Some(title) = index.title_of(candidate.item) {
            println!("  {}. {} ({:?})", i + 1, title, candidate.item.kind);
        }
    }

    // Overlap between the two sources
    let followed_items: std::collections::HashSet<_> =
        followed_candidates.iter().map(|c| c.item).collect();
    let discover_items: std::collections::HashSet<_> =
        discover_candidates.iter().map(|c| c.item).collect();
    let overlap = followed_items.intersection(&discover_items).count();

    println!("\n=== Summary ===");
    println!(
        "Total candidates: {}",
        followed_candidates.len() + discover_candidates.len()
    );
    println!("Overlap between sources: {} items", overlap);
    assert!(
        followed_candidates
            .iter()
            .all(|c| c.source == CandidateSource::Followed)
    );

    Ok(())
}
