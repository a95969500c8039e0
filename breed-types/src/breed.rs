//! The canonical breed record.
//!
//! Field names follow the JSON served by the breeds API. Every field is
//! optional on the wire and falls back to an empty string or 0.

use serde::{Deserialize, Serialize};

use crate::{BreedError, BreedId};

/// A cat breed as returned by the remote API.
///
/// `id` is the only stable attribute; everything else is denormalized and
/// replaced wholesale on refetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breed {
    /// Stable identifier
    pub id: BreedId,
    /// Display name
    pub name: String,
    /// Weight ranges
    pub weight: Weight,
    /// Cat Fanciers' Association page
    pub cfa_url: String,
    /// Vetstreet page
    pub vetstreet_url: String,
    /// VCA Hospitals page
    pub vcahospitals_url: String,
    /// Comma separated temperament keywords
    pub temperament: String,
    /// Country of origin
    pub origin: String,
    /// Country codes
    pub country_codes: String,
    /// Primary country code
    pub country_code: String,
    /// Free text description
    pub description: String,
    /// Life span range in years
    pub life_span: String,
    /// Alternate names
    pub alt_names: String,
    /// Wikipedia page
    pub wikipedia_url: String,
    /// Id of the reference image
    pub reference_image_id: String,
    /// Reference image
    pub image: Image,

    /// Indoor flag
    pub indoor: i32,
    /// Lap cat flag
    pub lap: i32,
    /// Adaptability score
    pub adaptability: i32,
    /// Affection level score
    pub affection_level: i32,
    /// Child friendliness score
    pub child_friendly: i32,
    /// Dog friendliness score
    pub dog_friendly: i32,
    /// Energy level score
    pub energy_level: i32,
    /// Grooming needs score
    pub grooming: i32,
    /// Health issues score
    pub health_issues: i32,
    /// Intelligence score
    pub intelligence: i32,
    /// Shedding level score
    pub shedding_level: i32,
    /// Social needs score
    pub social_needs: i32,
    /// Stranger friendliness score
    pub stranger_friendly: i32,
    /// Vocalisation score
    pub vocalisation: i32,
    /// Experimental breed flag
    pub experimental: i32,
    /// Hairless flag
    pub hairless: i32,
    /// Natural breed flag
    pub natural: i32,
    /// Rare breed flag
    pub rare: i32,
    /// Rex coat flag
    pub rex: i32,
    /// Suppressed tail flag
    pub suppressed_tail: i32,
    /// Short legs flag
    pub short_legs: i32,
    /// Hypoallergenic flag
    pub hypoallergenic: i32,
}

/// Weight range of a breed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weight {
    /// Range in pounds, e.g. "7 - 10"
    pub imperial: String,
    /// Range in kilograms, e.g. "3 - 5"
    pub metric: String,
}

/// Reference image of a breed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Image id
    pub id: String,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Download URL
    pub url: String,
}

impl Breed {
    /// Create a breed with only `id` and `name` set.
    pub fn named(id: impl Into<BreedId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Decode a JSON array of breeds (the shape of every list endpoint).
    pub fn list_from_json(bytes: &[u8]) -> Result<Vec<Self>, BreedError> {
        serde_json::from_slice(bytes).map_err(BreedError::Deserialization)
    }

    /// Check that the breed can be stored. Every field is optional on the
    /// wire, but a breed without an id has nothing to be keyed by.
    pub fn validate(&self) -> Result<(), BreedError> {
        if self.id.as_str().trim().is_empty() {
            return Err(BreedError::InvalidData(format!(
                "breed {:?} has no id",
                self.name
            )));
        }
        Ok(())
    }
}
