use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use server::{FeedOptions, FeedOrchestrator};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use store::{ItemId, ItemKind, ItemRef, StoreIndex, UserId};

/// TasteTrail - Social Recipe & Restaurant Tracker
#[derive(Parser)]
#[command(name = "tastetrail")]
#[command(about = "Social recipe and restaurant tracker with privacy-aware feeds", long_about = None)]
struct Cli {
    /// Path to the snapshot directory
    #[arg(short, long, default_value = "data/snapshot")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the home feed for a user
    Feed {
        /// User ID to build the feed for
        #[arg(long)]
        user_id: UserId,

        /// Number of entries to return
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Exclude items containing the user's declared allergens
        #[arg(long)]
        safe: bool,

        /// Narrow to the user's declared dietary preferences
        #[arg(long)]
        dietary: bool,

        /// Narrow to items carrying any of these categories/cuisines/tags
        #[arg(long)]
        tag: Vec<String>,
    },

    /// Show the explore view (in-network plus public discovery)
    Explore {
        /// User ID; omit for the anonymous view
        #[arg(long)]
        user_id: Option<UserId>,

        /// Number of entries to return
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show a user's profile
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search recipes and restaurants by title (visibility-checked)
    Search {
        /// Query string (case-insensitive substring match)
        #[arg(long)]
        query: String,

        /// Viewing user; omit to search as anonymous
        #[arg(long)]
        viewer: Option<UserId>,
    },

    /// Check whether one item is visible to a viewer
    Visible {
        /// Item kind: "recipe" or "restaurant"
        #[arg(long)]
        kind: String,

        /// Item ID
        #[arg(long)]
        id: ItemId,

        /// Viewing user; omit for anonymous
        #[arg(long)]
        viewer: Option<UserId>,

        /// Share token presented with the request
        #[arg(long)]
        token: Option<String>,
    },

    /// Resolve a share link token to its item
    Share {
        /// The share token
        #[arg(long)]
        token: String,
    },

    /// Run benchmark to test feed performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load the snapshot (this may take a moment)
    println!("Loading snapshot from {}...", cli.data_dir.display());
    let start = Instant::now();
    let index = Arc::new(
        StoreIndex::load_from_files(&cli.data_dir).context("Failed to load snapshot")?,
    );
    println!("{} Loaded snapshot in {:?}", "✓".green(), start.elapsed());

    let orchestrator = FeedOrchestrator::new(index.clone());

    // Dispatch to the command handler
    match cli.command {
        Commands::Feed {
            user_id,
            limit,
            safe,
            dietary,
            tag,
        } => handle_feed(index, orchestrator, user_id, limit, safe, dietary, tag).await?,
        Commands::Explore { user_id, limit } => {
            handle_explore(orchestrator, user_id, limit).await?
        }
        Commands::User { user_id } => handle_user(index, user_id)?,
        Commands::Search { query, viewer } => handle_search(orchestrator, query, viewer)?,
        Commands::Visible {
            kind,
            id,
            viewer,
            token,
        } => handle_visible(orchestrator, kind, id, viewer, token)?,
        Commands::Share { token } => handle_share(orchestrator, token)?,
        Commands::Benchmark { requests } => {
            handle_benchmark(index, orchestrator, requests).await?
        }
    }

    Ok(())
}

/// Handle the 'feed' command
async fn handle_feed(
    index: Arc<StoreIndex>,
    orchestrator: FeedOrchestrator,
    user_id: UserId,
    limit: usize,
    safe: bool,
    dietary: bool,
    tag: Vec<String>,
) -> Result<()> {
    let user = index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    // The --safe/--dietary flags narrow using the viewer's own profile
    let options = FeedOptions {
        limit,
        dietary: dietary.then(|| user.dietary_preferences.clone()),
        exclude_allergens: safe.then(|| user.allergies.clone()),
        tags: tag.into_iter().collect::<HashSet<String>>(),
    };

    let entries = orchestrator.feed_for(user_id, &options).await?;
    print_entries(&format!("Feed for {}", user.username), &entries, &index);
    Ok(())
}

/// Handle the 'explore' command
async fn handle_explore(
    orchestrator: FeedOrchestrator,
    user_id: Option<UserId>,
    limit: usize,
) -> Result<()> {
    let options = FeedOptions {
        limit,
        ..Default::default()
    };
    let entries = orchestrator.explore_for(user_id, &options).await?;
    let header = match user_id {
        Some(id) => format!("Explore for user {}", id),
        None => "Explore (anonymous)".to_string(),
    };
    println!("{}", header.bold().blue());
    for (i, entry) in entries.iter().enumerate() {
        println!(
            "{}. {} by {} [{:?}] ({:?})",
            (i + 1).to_string().green(),
            entry.title,
            entry.author_username,
            entry.item.kind,
            entry.source,
        );
    }
    Ok(())
}

/// Handle the 'user' command
fn handle_user(index: Arc<StoreIndex>, user_id: UserId) -> Result<()> {
    let user = index
        .get_user(user_id)
        .ok_or_else(|| anyhow!("User {} not found", user_id))?;

    print!("{}", format!("User: {} (id {})\n", user.username, user.id).bold().blue());
    print!("{}Email: {}\n", "• ".green(), user.email);
    if let (Some(first), Some(last)) = (&user.first_name, &user.last_name) {
        print!("{}Name: {} {}\n", "• ".green(), first, last);
    }
    print!("{}Profile privacy: {:?}\n", "• ".green(), user.privacy_level);
    print!(
        "{}Dietary preferences: {:?}\n",
        "• ".green(),
        user.dietary_preferences
    );
    print!("{}Allergies: {:?}\n", "• ".green(), user.allergies);

    let following = index.following_of(user_id);
    let followers = index.followers_of(user_id);
    print!("{}Following: {}\n", "• ".cyan(), following.len());
    print!("{}Followers: {}\n", "• ".cyan(), followers.len());

    let items = index.items_by_authors(&HashSet::from([user_id]));
    let recipes = items.iter().filter(|i| i.kind == ItemKind::Recipe).count();
    let restaurants = items.len() - recipes;
    print!("{}Recipes: {}\n", "• ".cyan(), recipes);
    print!("{}Restaurants: {}\n", "• ".cyan(), restaurants);

    print!("Most recent items:\n");
    for item in items.iter().take(5) {
        if let Some(title) = index.title_of(*item) {
            let privacy = index.privacy_level_of(*item);
            print!("  - {} [{:?}]\n", title, privacy.unwrap_or_default());
        }
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(
    orchestrator: FeedOrchestrator,
    query: String,
    viewer: Option<UserId>,
) -> Result<()> {
    let entries = orchestrator.search(viewer, &query)?;

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if entries.is_empty() {
        println!("  (nothing visible matched)");
    }
    for entry in entries.iter().take(20) {
        println!(
            "{:?} {}: {} by {}",
            entry.item.kind, entry.item.id, entry.title, entry.author_username
        );
    }
    Ok(())
}

/// Handle the 'visible' command
fn handle_visible(
    orchestrator: FeedOrchestrator,
    kind: String,
    id: ItemId,
    viewer: Option<UserId>,
    token: Option<String>,
) -> Result<()> {
    let item = match kind.as_str() {
        "recipe" => ItemRef::recipe(id),
        "restaurant" => ItemRef::restaurant(id),
        other => return Err(anyhow!("Unknown item kind: {}", other)),
    };

    let visible = orchestrator.is_visible(viewer, item, token.as_deref());
    let viewer_label = viewer
        .map(|v| format!("user {}", v))
        .unwrap_or_else(|| "anonymous".to_string());
    if visible {
        println!("{} {:?} {} is visible to {}", "✓".green(), item.kind, id, viewer_label);
    } else {
        println!("{} {:?} {} is not visible to {}", "✗".red(), item.kind, id, viewer_label);
    }
    Ok(())
}

/// Handle the 'share' command
fn handle_share(orchestrator: FeedOrchestrator, token: String) -> Result<()> {
    match orchestrator.resolve_share_token(&token) {
        Some(entry) => {
            println!(
                "{} {:?} {}: {} by {}",
                "✓".green(),
                entry.item.kind,
                entry.item.id,
                entry.title,
                entry.author_username
            );
        }
        None => println!("{} Nothing found for that token", "✗".red()),
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    index: Arc<StoreIndex>,
    orchestrator: FeedOrchestrator,
    requests: usize,
) -> Result<()> {
    let user_ids = index.all_user_ids();
    if user_ids.is_empty() {
        return Err(anyhow!("Snapshot has no users"));
    }

    // Sample random viewers from the snapshot
    let viewers: Vec<UserId> = (0..requests)
        .map(|_| user_ids[rand::random::<u64>() as usize % user_ids.len()])
        .collect();

    // Concurrent feed requests; the filter performs no writes, so no
    // coordination is needed
    let mut handles = vec![];
    for viewer in viewers {
        let orchestrator = orchestrator.clone();
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            orchestrator.feed_for(viewer, &FeedOptions::default()).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }

    let total_time: std::time::Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper to format and print feed entries
fn print_entries(header: &str, entries: &[server::FeedEntry], index: &StoreIndex) {
    println!("{}", header.bold().blue());
    for (i, entry) in entries.iter().enumerate() {
        let tags = index.tags_of(entry.item);
        let mut line = format!(
            "{}. {} by {} [{:?}, {:?}]",
            (i + 1).to_string().green(),
            entry.title,
            entry.author_username,
            entry.item.kind,
            entry.privacy_level,
        );
        if !tags.is_empty() {
            let mut tags: Vec<String> = tags.into_iter().collect();
            tags.sort();
            line.push_str(&format!(" ({})", tags.join(", ")));
        }
        println!("{}", line);
    }
}
