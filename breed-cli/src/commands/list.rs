//! List stored breeds.

use anyhow::Result;
use breed_core::join_breeds;
use breed_types::BreedListModel;

use crate::settings::Settings;

/// Run the list command.
pub async fn run(settings: &Settings, favorites_only: bool, json: bool) -> Result<()> {
    let client = settings.open().await?;
    let breeds = client.repository().breeds().snapshot();
    let favorite_ids = client.favorites().breeds().snapshot();
    let rows = join_breeds(&breeds, &favorite_ids, favorites_only);

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        if favorites_only {
            println!("No favorites.");
        } else {
            println!("No breeds stored. Run 'breeds fetch' first.");
        }
        return Ok(());
    }

    for row in &rows {
        println!("{}", format_row(row));
    }
    Ok(())
}

/// One table line: favorite marker, id, name, origin.
pub fn format_row(row: &BreedListModel) -> String {
    let marker = if row.favorite { '*' } else { ' ' };
    format!("{} {:<6} {:<28} {}", marker, row.id.as_str(), row.name, row.origin)
        .trim_end()
        .to_string()
}
