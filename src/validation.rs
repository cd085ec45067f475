use crate::models::{field, ListingDraft};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Field name to message, one entry per failed check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn add(&mut self, field: &'static str, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

fn has_repeats(labels: &[String]) -> bool {
    let mut seen = HashSet::new();
    labels.iter().any(|label| !seen.insert(label.as_str()))
}

/// Check whether a draft may be submitted to the store.
///
/// Every check runs; an empty result means the draft is valid.
pub fn validate(draft: &ListingDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if draft.title.trim().is_empty() {
        errors.add(field::TITLE, "El título es requerido");
    }
    if draft.location.trim().is_empty() {
        errors.add(field::LOCATION, "La ubicación es requerida");
    }
    // Written as a negated comparison so NaN is rejected too.
    if !(draft.price > 0.0) {
        errors.add(field::PRICE, "El precio debe ser mayor a 0");
    }
    if draft.description.trim().is_empty() {
        errors.add(field::DESCRIPTION, "La descripción es requerida");
    }
    if !(draft.square_meters > 0.0) {
        errors.add(field::SQUARE_METERS, "Los metros cuadrados deben ser mayor a 0");
    }
    if draft.bedrooms < 0 {
        errors.add(field::BEDROOMS, "El número de ambientes no puede ser negativo");
    }
    if draft.bathrooms < 0 {
        errors.add(field::BATHROOMS, "El número de baños no puede ser negativo");
    }
    if has_repeats(&draft.amenities) {
        errors.add(field::AMENITIES, "Las comodidades no pueden repetirse");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_a() -> ListingDraft {
        ListingDraft {
            title: "Flat A".to_string(),
            location: "Main St".to_string(),
            price: 0.0,
            description: "nice".to_string(),
            square_meters: 40.0,
            bedrooms: 1,
            bathrooms: 1,
            ..ListingDraft::default()
        }
    }

    #[test]
    fn test_flat_a_scenario() {
        let mut draft = flat_a();
        let errors = validate(&draft);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("price"));

        draft.price = 1000.0;
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let mut draft = ListingDraft::default();
        draft.bedrooms = -1;
        draft.bathrooms = -2;
        let errors = validate(&draft);
        for name in [
            "title",
            "location",
            "description",
            "price",
            "square_meters",
            "bedrooms",
            "bathrooms",
        ] {
            assert!(errors.contains(name), "expected a message for {}", name);
        }
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn test_title_message_tracks_trimmed_title() {
        for (title, flagged) in [("", true), ("   ", true), ("\t\n", true), ("x", false), (" Loft ", false)] {
            let mut draft = flat_a();
            draft.title = title.to_string();
            assert_eq!(validate(&draft).contains("title"), flagged, "title {:?}", title);
        }
    }

    #[test]
    fn test_checks_are_independent() {
        let mut draft = flat_a();
        draft.title.clear();
        for price in [-5.0, 0.0, 1.0, 250_000.0, f64::NAN] {
            draft.price = price;
            let errors = validate(&draft);
            assert!(errors.contains("title"));
            assert!(!errors.contains("description"));
            assert_eq!(errors.contains("price"), !(price > 0.0));
        }
    }

    #[test]
    fn test_repeated_amenities_are_reported() {
        let mut draft = flat_a();
        draft.price = 1000.0;
        draft.amenities = vec!["Patio".to_string(), "Cochera".to_string(), "Patio".to_string()];
        let errors = validate(&draft);
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("amenities"));

        draft.amenities.pop();
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_zero_rooms_are_valid() {
        let mut draft = flat_a();
        draft.price = 1.0;
        draft.bedrooms = 0;
        draft.bathrooms = 0;
        assert!(validate(&draft).is_empty());
    }

    #[test]
    fn test_display_lists_fields() {
        let mut draft = flat_a();
        draft.description = " ".to_string();
        let rendered = validate(&draft).to_string();
        assert!(rendered.contains("description: La descripción es requerida"));
        assert!(rendered.contains("price: El precio debe ser mayor a 0"));
    }
}
