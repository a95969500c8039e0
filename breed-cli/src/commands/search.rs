//! Search breeds by name.

use anyhow::{bail, Context, Result};
use breed_client::BreedSearchViewModel;
use breed_core::{join_breeds, normalize_keyword};
use std::time::Duration;

use super::list::format_row;
use crate::settings::Settings;

/// Run the search command.
///
/// The remote is queried first; when it is unreachable the local store is
/// searched instead.
pub async fn run(settings: &Settings, name: &str, local: bool) -> Result<()> {
    let Some(term) = normalize_keyword(name) else {
        bail!("Search term is empty");
    };
    let client = settings.open().await?;

    tracing::debug!("Searching for {:?} (local: {})", term, local);
    let rows = if local {
        let breeds = client
            .repository()
            .search_by_name_locally(term)
            .await
            .context("Local search failed")?;
        join_breeds(&breeds, &client.favorites().breeds().snapshot(), false)
    } else {
        // One keystroke, nothing to coalesce
        let search = BreedSearchViewModel::new(
            client.repository().clone(),
            client.favorites().clone(),
            Duration::ZERO,
        );
        let mut state = search.state();
        search.update_keyword(term);
        let done = state
            .wait_for(|s| !s.loading)
            .await
            .context("Search was interrupted")?
            .clone();
        if done.error {
            tracing::warn!("Search for {:?} failed: {}", term, done.error_message);
            bail!("Search failed: {}", done.error_message);
        }
        done.breeds
    };

    tracing::info!("Search for {:?} matched {} breeds", term, rows.len());
    if rows.is_empty() {
        println!("No breeds found.");
    }
    for row in &rows {
        println!("{}", format_row(row));
    }
    Ok(())
}
