//! Show store status.

use anyhow::Result;
use breed_types::PageCursor;

use crate::settings::Settings;

/// Run the status command.
pub async fn run(settings: &Settings) -> Result<()> {
    let client = settings.open().await?;
    let repository = client.repository();

    let breeds = repository.breeds().snapshot().len();
    let favorites = client.favorites().breeds().snapshot().len();
    let cursor = repository.last_page().await?;

    println!("=== breeds status ===");
    println!();
    println!("Store:");
    println!("  Database:  {}", settings.database.display());
    println!("  Breeds:    {}", breeds);
    println!("  Favorites: {}", favorites);
    println!("  Last page: {}", format_cursor(cursor));
    println!();
    println!("Remote:");
    println!("  URL:     {}", settings.config.remote.base_url);
    println!(
        "  API key: {}",
        if settings.config.remote.api_key.is_some() {
            "set"
        } else {
            "not set"
        }
    );

    Ok(())
}

fn format_cursor(cursor: PageCursor) -> String {
    if cursor == PageCursor::NONE {
        "none (nothing fetched yet)".to_string()
    } else {
        cursor.value().to_string()
    }
}
