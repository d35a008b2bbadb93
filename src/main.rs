use std::sync::Arc;

use marketplace_client::{classify, config, Catalog, HttpMarketplaceClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client_config = config::load()?;
    let browse = config::load_browse()?;

    info!("🏠 Marketplace client");
    info!("API: {}", client_config.api_url);

    let api = Arc::new(HttpMarketplaceClient::new(&client_config)?);
    let catalog = Catalog::new(api);

    // Filters from the environment play the part of the page URL and form.
    catalog
        .edit_filters(|filters| {
            filters.city = browse.city.clone();
            filters.min_price = browse.min_price.clone();
            filters.max_price = browse.max_price.clone();
        })
        .await;
    catalog.sync_from_url(&browse.url_filters).await.map_err(|err| {
        warn!("Listing request failed: {}", err.user_message());
        err
    })?;
    if browse.page > 1 && !catalog.go_to_page(browse.page).await? {
        warn!("Page {} is out of range, staying on page 1", browse.page);
    }

    let properties = catalog.properties().await;
    let pagination = catalog.pagination().await;

    info!(
        "✅ Page {}/{} ({} listings in total)\n",
        pagination.current_page, pagination.total_pages, pagination.total
    );

    for (i, property) in properties.iter().enumerate() {
        let classification = classify(property, None);
        let kind = property
            .property_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "Listing".to_string());

        println!("{}. {} ({})", i + 1, property.title, kind);
        println!("   {} · {} · {}", property.city, property.price, classification.label);
        if let Some(purpose) = property.purpose {
            println!("   For: {}", purpose);
        }
        if classification.affordances.can_order {
            println!("   Can be ordered");
        }
        if let Some(image) = property.cover_image() {
            println!("   Image: {}", image);
        }
        println!("   ID: {}", property.id);
        println!();
    }

    Ok(())
}
