//! Show one breed.

use anyhow::{bail, Result};
use breed_client::BreedDetailsState;

use crate::settings::Settings;

/// Run the show command.
pub async fn run(settings: &Settings, id: &str) -> Result<()> {
    let client = settings.open().await?;
    // Reading the feed loads stored breeds into the lookup cache
    client.repository().breeds().snapshot();

    let details = client.details_view();
    details.set_id(id);
    let state = details.current();
    if state.breed.is_empty() {
        bail!(
            "Breed not found: {}. Run 'breeds fetch' or 'breeds search' first.",
            id
        );
    }

    print!("{}", render(&state));
    Ok(())
}

fn render(state: &BreedDetailsState) -> String {
    let breed = &state.breed;
    let mut out = format!("{} ({})\n", breed.name, breed.id);
    if state.favorite {
        out.push_str("  Favorite:    yes\n");
    }
    for (label, value) in [
        ("Origin", &breed.origin),
        ("Life span", &breed.life_span),
        ("Temperament", &breed.temperament),
        ("Image", &breed.image_url),
    ] {
        if !value.is_empty() {
            out.push_str(&format!("  {:<12} {}\n", format!("{}:", label), value));
        }
    }
    if !breed.description.is_empty() {
        out.push('\n');
        out.push_str(&breed.description);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use breed_store::{BreedStore, SqliteStore};
    use breed_types::{Breed, BreedDetailsModel};
    use tempfile::tempdir;

    #[test]
    fn render_skips_empty_fields() {
        let mut breed = Breed::named("abys", "Abyssinian");
        breed.origin = "Egypt".into();
        let state = BreedDetailsState {
            loading: false,
            breed: BreedDetailsModel::from(&breed),
            favorite: true,
            error: false,
            error_message: String::new(),
        };

        let out = render(&state);
        assert!(out.starts_with("Abyssinian (abys)\n"));
        assert!(out.contains("Favorite:    yes"));
        assert!(out.contains("Origin:      Egypt"));
        assert!(!out.contains("Life span"));
    }

    #[tokio::test]
    async fn stored_breed_is_shown() {
        let dir = tempdir().unwrap();
        let settings = Settings::resolve(Some(dir.path().to_path_buf()), None, None, None)
            .await
            .unwrap();
        SqliteStore::new(&settings.database)
            .await
            .unwrap()
            .upsert_breed(&Breed::named("abys", "Abyssinian"))
            .await
            .unwrap();

        assert!(run(&settings, "abys").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_breed_fails() {
        let dir = tempdir().unwrap();
        let settings = Settings::resolve(Some(dir.path().to_path_buf()), None, None, None)
            .await
            .unwrap();

        let err = run(&settings, "nope").await.unwrap_err();
        assert!(err.to_string().contains("Breed not found"));
    }
}
