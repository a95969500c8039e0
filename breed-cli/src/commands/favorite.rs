//! Mark and unmark favorites.

use anyhow::{Context, Result};
use breed_types::BreedId;

use crate::settings::Settings;

/// Run the favorite command.
pub async fn set(settings: &Settings, id: &str) -> Result<()> {
    let client = settings.open().await?;
    client
        .favorites()
        .set_as_favorite(&BreedId::new(id))
        .await
        .context("Failed to save favorite")?;
    tracing::info!("Marked {} as favorite", id);
    println!("Marked {} as favorite", id);
    Ok(())
}

/// Run the unfavorite command.
pub async fn unset(settings: &Settings, id: &str) -> Result<()> {
    let client = settings.open().await?;
    let favorites = client.favorites();
    if !favorites.contains(id) {
        tracing::debug!("{} is not a favorite, nothing to remove", id);
        println!("{} is not a favorite", id);
        return Ok(());
    }
    favorites
        .unset_as_favorite(&BreedId::new(id))
        .await
        .context("Failed to remove favorite")?;
    tracing::info!("Removed {} from favorites", id);
    println!("Removed {} from favorites", id);
    Ok(())
}
