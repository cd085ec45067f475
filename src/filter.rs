use crate::models::{DecodeError, Listing, ListingStatus};
use std::convert::Infallible;
use std::str::FromStr;

/// Value the list screen uses for "no restriction"
pub const ANY: &str = "all";

/// Status restriction for the property list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ListingStatus),
}

impl StatusFilter {
    fn matches(&self, status: ListingStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ANY {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// Category restriction for the property list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(String),
}

impl TypeFilter {
    fn matches(&self, property_type: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(wanted) => wanted == property_type,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == ANY {
            TypeFilter::All
        } else {
            TypeFilter::Only(s.to_string())
        })
    }
}

/// Search box plus the two dropdowns of the property list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    pub search_term: String,
    pub status: StatusFilter,
    pub property_type: TypeFilter,
}

impl ListingQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search_term: term.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn with_type(mut self, property_type: TypeFilter) -> Self {
        self.property_type = property_type;
        self
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.matches_lowered(&self.search_term.to_lowercase(), listing)
    }

    fn matches_lowered(&self, term: &str, listing: &Listing) -> bool {
        let text_matches = term.is_empty()
            || listing.fields.title.to_lowercase().contains(term)
            || listing.fields.location.to_lowercase().contains(term);

        text_matches
            && self.status.matches(listing.status())
            && self.property_type.matches(&listing.fields.property_type)
    }
}

/// Listings matching every predicate of `query`, in input order
pub fn filter_listings(listings: &[Listing], query: &ListingQuery) -> Vec<Listing> {
    let term = query.search_term.to_lowercase();
    listings
        .iter()
        .filter(|l| query.matches_lowered(&term, l))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingDraft;

    fn listing(id: &str, title: &str, location: &str, status: ListingStatus, property_type: &str) -> Listing {
        Listing::new(
            id,
            ListingDraft {
                title: title.to_string(),
                location: location.to_string(),
                property_type: property_type.to_string(),
                status,
                price: 1.0,
                square_meters: 1.0,
                description: "d".to_string(),
                ..ListingDraft::default()
            },
        )
    }

    fn catalog() -> Vec<Listing> {
        vec![
            listing("1", "Lake House", "1 Shore Dr", ListingStatus::Available, "Casa"),
            listing("2", "Mountain Cabin", "5 Hill St", ListingStatus::Sold, "Casa"),
            listing("3", "Loft", "123 Lake Rd", ListingStatus::Pending, "Departamento"),
            listing("4", "Oficina", "Centro", ListingStatus::Available, "Local"),
        ]
    }

    fn ids(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(Listing::id).collect()
    }

    #[test]
    fn test_identity_query() {
        let listings = catalog();
        let query = ListingQuery::default();
        assert_eq!(filter_listings(&listings, &query), listings);
    }

    #[test]
    fn test_search_title_or_location() {
        let found = filter_listings(&catalog(), &ListingQuery::search("lake"));
        assert_eq!(ids(&found), vec!["1", "3"]);

        let found = filter_listings(&catalog(), &ListingQuery::search("LOFT"));
        assert_eq!(ids(&found), vec!["3"]);
    }

    #[test]
    fn test_status_filter() {
        let query = ListingQuery::default().with_status("disponible".parse().unwrap());
        assert_eq!(ids(&filter_listings(&catalog(), &query)), vec!["1", "4"]);
    }

    #[test]
    fn test_type_filter_is_case_sensitive() {
        let query = ListingQuery::default().with_type("Casa".parse().unwrap());
        assert_eq!(ids(&filter_listings(&catalog(), &query)), vec!["1", "2"]);

        let query = ListingQuery::default().with_type("casa".parse().unwrap());
        assert!(filter_listings(&catalog(), &query).is_empty());
    }

    #[test]
    fn test_predicates_are_anded() {
        let query = ListingQuery::search("lake")
            .with_status(StatusFilter::Only(ListingStatus::Pending))
            .with_type(TypeFilter::Only("Departamento".to_string()));
        assert_eq!(ids(&filter_listings(&catalog(), &query)), vec!["3"]);

        let query = ListingQuery::search("lake").with_status(StatusFilter::Only(ListingStatus::Sold));
        assert!(filter_listings(&catalog(), &query).is_empty());
    }

    #[test]
    fn test_matches_agrees_with_filter() {
        let query = ListingQuery::search("a").with_type(TypeFilter::Only("Casa".to_string()));
        let listings = catalog();
        let expected: Vec<&str> = listings
            .iter()
            .filter(|l| query.matches(l))
            .map(Listing::id)
            .collect();
        assert_eq!(ids(&filter_listings(&listings, &query)), expected);
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("archived".parse::<StatusFilter>().is_err());
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "PH".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only("PH".to_string())
        );
    }
}
