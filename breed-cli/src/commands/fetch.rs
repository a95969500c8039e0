//! Load pages from the remote into the local store.

use anyhow::{Context, Result};
use breed_client::FetchOutcome;

use crate::settings::Settings;

/// Run the fetch command.
pub async fn run(settings: &Settings, pages: u32) -> Result<()> {
    let client = settings.open().await?;
    let repository = client.repository();

    tracing::debug!("Fetching up to {} pages", pages);
    for _ in 0..pages {
        let outcome = repository
            .fetch_more_breeds()
            .await
            .context("Failed to fetch breeds")?;

        match outcome {
            FetchOutcome::Fetched { page, count: 0 } => {
                println!("Page {}: no more breeds", page);
                break;
            }
            FetchOutcome::Fetched { page, count } => {
                println!("Page {}: {} breeds", page, count);
            }
            FetchOutcome::Skipped => {
                tracing::warn!("Fetch skipped, another one is in flight");
                println!("A fetch is already running");
                break;
            }
        }
    }

    let stored = repository.breeds().snapshot().len();
    tracing::info!("Store holds {} breeds", stored);
    println!("{} breeds stored", stored);
    Ok(())
}
