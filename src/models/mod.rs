mod record;

pub use record::DecodeError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column names of the remote `properties` table
pub mod field {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const PROPERTY_TYPE: &str = "property_type";
    pub const LOCATION: &str = "location";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";
    pub const PRICE: &str = "price";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGES: &str = "images";
    pub const SQUARE_METERS: &str = "square_meters";
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms";
    pub const AMENITIES: &str = "amenities";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
}

/// Category preselected on a fresh draft
pub const DEFAULT_PROPERTY_TYPE: &str = "Casa";

/// Categories offered by the listing form
pub const PROPERTY_TYPES: [&str; 8] = [
    "Casa",
    "Departamento",
    "Monoambiente",
    "Duplex",
    "PH",
    "Terreno",
    "Local",
    "Rural",
];

/// Whether `category` is one of the form's [`PROPERTY_TYPES`]
pub fn is_form_category(category: &str) -> bool {
    PROPERTY_TYPES.contains(&category)
}

/// Lifecycle stage of a listing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListingStatus {
    #[default]
    #[serde(rename = "disponible")]
    Available,
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "vendido")]
    Sold,
    #[serde(rename = "alquilado")]
    Rented,
}

impl ListingStatus {
    /// Every status, in dashboard order
    pub const ALL: [ListingStatus; 4] = [
        ListingStatus::Available,
        ListingStatus::Pending,
        ListingStatus::Sold,
        ListingStatus::Rented,
    ];

    /// Wire token stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "disponible",
            ListingStatus::Pending => "pendiente",
            ListingStatus::Sold => "vendido",
            ListingStatus::Rented => "alquilado",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Available => "Disponible",
            ListingStatus::Pending => "Pendiente",
            ListingStatus::Sold => "Vendido",
            ListingStatus::Rented => "Alquilado",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ListingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| DecodeError::InvalidStatus(s.to_string()))
    }
}

/// Fields a user supplies for a listing, before the store assigns an id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub property_type: String,
    pub location: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub price: f64,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub square_meters: f64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    #[serde(default, deserialize_with = "unique_labels")]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub status: ListingStatus,
}

// Drafts read from JSON get the same treatment as `add_amenity`.
fn unique_labels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Vec::<String>::deserialize(deserializer)?;
    let mut labels = Vec::with_capacity(raw.len());
    for label in &raw {
        push_unique(&mut labels, label);
    }
    Ok(labels)
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            property_type: DEFAULT_PROPERTY_TYPE.to_string(),
            location: String::new(),
            city: None,
            state: None,
            price: 0.0,
            description: String::new(),
            images: Vec::new(),
            square_meters: 0.0,
            bedrooms: 0,
            bathrooms: 0,
            amenities: Vec::new(),
            status: ListingStatus::Available,
        }
    }
}

impl ListingDraft {
    /// Append an amenity label. Blank labels and repeats are ignored.
    pub fn add_amenity(&mut self, label: &str) -> bool {
        push_unique(&mut self.amenities, label)
    }

    pub fn remove_amenity(&mut self, label: &str) {
        self.amenities.retain(|a| a != label);
    }

    /// Append an image URL. Blank URLs and repeats are ignored.
    pub fn add_image(&mut self, url: &str) -> bool {
        push_unique(&mut self.images, url)
    }

    pub fn remove_image(&mut self, url: &str) {
        self.images.retain(|i| i != url);
    }
}

fn push_unique(items: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || items.iter().any(|existing| existing == value) {
        return false;
    }
    items.push(value.to_string());
    true
}

/// A listing as persisted by the store
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    id: String,
    #[serde(flatten)]
    pub fields: ListingDraft,
    /// Legacy dashboard tag. Always decoded as empty and never derived from
    /// `property_type`; breakdowns and filters ignore it.
    #[serde(rename = "type")]
    pub tag: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Listing {
    pub fn new(id: impl Into<String>, fields: ListingDraft) -> Self {
        Self {
            id: id.into(),
            fields,
            tag: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Store-assigned identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mutable field set, as submitted on edit
    pub fn draft(&self) -> &ListingDraft {
        &self.fields
    }

    pub fn status(&self) -> ListingStatus {
        self.fields.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_tokens() {
        for status in ListingStatus::ALL {
            assert_eq!(status.as_str().parse::<ListingStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_value(ListingStatus::Rented).unwrap(),
            serde_json::json!("alquilado")
        );
        assert!("available".parse::<ListingStatus>().is_err());
        assert!("Disponible".parse::<ListingStatus>().is_err());
    }

    #[test]
    fn test_draft_defaults() {
        let draft = ListingDraft::default();
        assert_eq!(draft.property_type, "Casa");
        assert!(PROPERTY_TYPES.contains(&draft.property_type.as_str()));
        assert_eq!(draft.status, ListingStatus::Available);
        assert!(draft.amenities.is_empty());
    }

    #[test]
    fn test_amenities_stay_unique() {
        let mut draft = ListingDraft::default();
        assert!(draft.add_amenity("Pileta"));
        assert!(draft.add_amenity("  Cochera "));
        assert!(!draft.add_amenity("Pileta"));
        assert!(!draft.add_amenity("   "));
        assert_eq!(draft.amenities, vec!["Pileta", "Cochera"]);

        draft.remove_amenity("Pileta");
        assert_eq!(draft.amenities, vec!["Cochera"]);
    }

    #[test]
    fn test_form_categories() {
        for category in ["Casa", "Departamento", "Monoambiente", "Duplex", "PH", "Terreno", "Local", "Rural"] {
            assert!(is_form_category(category), "missing form category {}", category);
        }
        assert!(!is_form_category("casa"));
        assert!(!is_form_category("Castillo"));
    }

    #[test]
    fn test_json_draft_drops_repeated_amenities() {
        let draft: ListingDraft = serde_json::from_value(serde_json::json!({
            "title": "Casa con patio",
            "property_type": "Casa",
            "location": "Calle 5",
            "price": 90000,
            "description": "Patio amplio",
            "square_meters": 80,
            "bedrooms": 2,
            "bathrooms": 1,
            "amenities": ["Patio", " Patio ", "Cochera", "Patio", ""]
        }))
        .unwrap();
        assert_eq!(draft.amenities, vec!["Patio", "Cochera"]);

        let mut row = draft.to_record();
        row.insert("id".into(), serde_json::json!("1"));
        let back = Listing::from_record(&serde_json::Value::Object(row)).unwrap();
        assert_eq!(back.draft().to_record(), draft.to_record());
    }

    #[test]
    fn test_images_keep_order() {
        let mut draft = ListingDraft::default();
        draft.add_image("https://img.example/a.jpg");
        draft.add_image("https://img.example/b.jpg");
        draft.add_image("https://img.example/a.jpg");
        assert_eq!(draft.images.len(), 2);
        draft.remove_image("https://img.example/a.jpg");
        assert_eq!(draft.images, vec!["https://img.example/b.jpg"]);
    }
}
