//! Presentation projections of [`Breed`].

use serde::{Deserialize, Serialize};

use crate::{Breed, BreedId};

/// A breed as shown in a list row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedListModel {
    /// Breed id
    pub id: BreedId,
    /// Display name
    pub name: String,
    /// Thumbnail URL
    pub image_url: String,
    /// Country of origin
    pub origin: String,
    /// Whether the breed is a favorite
    pub favorite: bool,
}

impl BreedListModel {
    /// Project a breed into a list row.
    pub fn from_breed(breed: &Breed, favorite: bool) -> Self {
        Self {
            id: breed.id.clone(),
            name: breed.name.clone(),
            image_url: breed.image.url.clone(),
            origin: breed.origin.clone(),
            favorite,
        }
    }
}

/// A breed as shown on its details page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreedDetailsModel {
    /// Breed id
    pub id: BreedId,
    /// Display name
    pub name: String,
    /// Image URL
    pub image_url: String,
    /// Country of origin
    pub origin: String,
    /// Free text description
    pub description: String,
    /// Temperament keywords
    pub temperament: String,
    /// Life span range
    pub life_span: String,
}

impl BreedDetailsModel {
    /// Placeholder shown when the breed is not in the lookup cache.
    pub const EMPTY: BreedDetailsModel = BreedDetailsModel {
        id: BreedId::empty(),
        name: String::new(),
        image_url: String::new(),
        origin: String::new(),
        description: String::new(),
        temperament: String::new(),
        life_span: String::new(),
    };

    /// Whether this is the placeholder.
    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

impl From<&Breed> for BreedDetailsModel {
    fn from(breed: &Breed) -> Self {
        Self {
            id: breed.id.clone(),
            name: breed.name.clone(),
            image_url: breed.image.url.clone(),
            origin: breed.origin.clone(),
            description: breed.description.clone(),
            temperament: breed.temperament.clone(),
            life_span: breed.life_span.clone(),
        }
    }
}

impl Default for BreedDetailsModel {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Image;

    fn sample() -> Breed {
        Breed {
            id: BreedId::new("id"),
            name: "name".into(),
            image: Image {
                url: "url".into(),
                ..Image::default()
            },
            origin: "origin".into(),
            description: "description".into(),
            temperament: "temperament".into(),
            life_span: "lifeSpan".into(),
            ..Breed::default()
        }
    }

    #[test]
    fn list_model_projection() {
        let expected = BreedListModel {
            id: BreedId::new("id"),
            name: "name".into(),
            image_url: "url".into(),
            origin: "origin".into(),
            favorite: false,
        };
        assert_eq!(BreedListModel::from_breed(&sample(), false), expected);
        assert!(BreedListModel::from_breed(&sample(), true).favorite);
    }

    #[test]
    fn details_model_projection() {
        let expected = BreedDetailsModel {
            id: BreedId::new("id"),
            name: "name".into(),
            image_url: "url".into(),
            origin: "origin".into(),
            description: "description".into(),
            temperament: "temperament".into(),
            life_span: "lifeSpan".into(),
        };
        assert_eq!(BreedDetailsModel::from(&sample()), expected);
    }

    #[test]
    fn empty_details_is_placeholder() {
        assert!(BreedDetailsModel::EMPTY.is_empty());
        assert!(BreedDetailsModel::default().is_empty());
        assert!(!BreedDetailsModel::from(&sample()).is_empty());
    }
}
