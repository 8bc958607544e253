//! Simple test harness for the feed orchestrator.
//!
//! This binary lets you exercise the end-to-end pipeline by requesting
//! the feed for a specific user from a snapshot on disk.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber;

use server::{FeedOptions, FeedOrchestrator};
use store::StoreIndex;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,feed=debug,pipeline=debug")
        .init();

    info!("Starting TasteTrail feed harness");

    info!("Loading snapshot...");
    let path = Path::new("data/snapshot");
    let index = Arc::new(StoreIndex::load_from_files(path)?);
    let (users, recipes, restaurants) = index.counts();
    info!(
        "Snapshot loaded: {} users, {} recipes, {} restaurants",
        users, recipes, restaurants
    );

    let orchestrator = FeedOrchestrator::new(index.clone());

    let viewer_id = 1;
    let options = FeedOptions {
        limit: 20,
        ..Default::default()
    };

    info!("Building feed for user {} (limit: {})", viewer_id, options.limit);
    let entries = orchestrator.feed_for(viewer_id, &options).await?;

    info!("Received {} feed entries:", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        info!(
            "{}. {} by {} [{:?}, {:?}]",
            i + 1,
            entry.title,
            entry.author_username,
            entry.item.kind,
            entry.privacy_level,
        );
    }

    Ok(())
}
