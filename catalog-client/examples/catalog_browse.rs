use catalog_client::models::product::ProductQuery;
use catalog_client::{CatalogClient, Config};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::init();

    let config_path = std::env::args().nth(1);
    let config = Config::load(config_path.as_deref().map(Path::new))?;
    let client = CatalogClient::from_config(&config)?;

    println!("=== Concurrent page load ===");
    let query = ProductQuery::default();
    let start = std::time::Instant::now();
    let (products, categories) = tokio::join!(
        client.products(&query),
        client.categories(),
    );
    println!("First load took: {:?}", start.elapsed());
    println!("Found {} products in {} categories", products?.len(), categories?.len());

    println!("\n=== Repeat load within TTL ===");
    let start = std::time::Instant::now();
    let products = client.products(&query).await?;
    println!("Cached load took: {:?} ({} products)", start.elapsed(), products.len());

    if let Some(product) = products.first() {
        let related = client.related_products(&product.id).await?;
        println!(
            "{}: {} related, {} others",
            product.name,
            related.related_products.len(),
            related.other_products.len()
        );
    }

    println!("\nCache stats: {:?}", client.fetcher().cache_stats());
    println!("Deduplication stats: {:?}", client.fetcher().deduplication_stats());

    Ok(())
}
