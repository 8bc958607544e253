use std::path::Path;
use std::time::Instant;
use store::StoreIndex;

fn main() {
    let snapshot_dir = Path::new("data/snapshot");

    println!("Loading TasteTrail snapshot...\n");

    let start = Instant::now();
    let index = StoreIndex::load_from_files(snapshot_dir)
        .expect("Failed to load snapshot");
    let elapsed = start.elapsed();

    let (users, recipes, restaurants) = index.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Recipes: {}", recipes);
    println!("Restaurants: {}", restaurants);
    println!(
        "\nPerformance: {:.0} items/second",
        (recipes + restaurants) as f64 / elapsed.as_secs_f64()
    );
}
