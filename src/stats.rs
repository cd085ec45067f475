//! Dashboard statistics over an already-fetched collection.

use crate::models::{Listing, ListingStatus};
use serde::Serialize;

/// Categories broken down on the dashboard
pub const DASHBOARD_CATEGORIES: [&str; 4] = ["Casa", "Departamento", "PH", "Local"];

/// How many listings the dashboard shows as recent
pub const RECENT_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: ListingStatus,
    pub count: usize,
    /// Whole percent of the collection, rounded half up
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

pub fn total_count(listings: &[Listing]) -> usize {
    listings.len()
}

pub fn available_count(listings: &[Listing]) -> usize {
    count_with_status(listings, ListingStatus::Available)
}

fn count_with_status(listings: &[Listing], status: ListingStatus) -> usize {
    listings.iter().filter(|l| l.status() == status).count()
}

/// Sum of prices, accumulated left to right
pub fn total_value(listings: &[Listing]) -> f64 {
    listings.iter().fold(0.0, |sum, l| sum + l.fields.price)
}

/// Mean price, or 0 for an empty collection
pub fn average_price(listings: &[Listing]) -> f64 {
    if listings.is_empty() {
        return 0.0;
    }
    total_value(listings) / listings.len() as f64
}

pub fn status_breakdown(listings: &[Listing]) -> [StatusShare; 4] {
    let total = listings.len();
    ListingStatus::ALL.map(|status| {
        let count = count_with_status(listings, status);
        // round(100 * count / total), multiplied first: 7 of 40 is exactly
        // 17.5 and rounds to 18, where count / total * 100 gives 17.499...
        let percentage = if total > 0 {
            (100.0 * count as f64 / total as f64).round() as u32
        } else {
            0
        };
        StatusShare {
            status,
            count,
            percentage,
        }
    })
}

/// Count per label, matching `property_type` exactly (case-sensitive)
pub fn category_breakdown<S: AsRef<str>>(listings: &[Listing], categories: &[S]) -> Vec<CategoryCount> {
    categories
        .iter()
        .map(|category| {
            let category = category.as_ref();
            CategoryCount {
                category: category.to_string(),
                count: listings
                    .iter()
                    .filter(|l| l.fields.property_type == category)
                    .count(),
            }
        })
        .collect()
}

/// Leading `n` listings of a newest-first collection
pub fn recent(listings: &[Listing], n: usize) -> &[Listing] {
    &listings[..n.min(listings.len())]
}

/// Everything the dashboard screen shows
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_count: usize,
    pub available_count: usize,
    pub total_value: f64,
    pub average_price: f64,
    pub statuses: [StatusShare; 4],
    pub categories: Vec<CategoryCount>,
    pub recent: Vec<Listing>,
}

impl DashboardSummary {
    pub fn from_listings(listings: &[Listing]) -> Self {
        Self {
            total_count: total_count(listings),
            available_count: available_count(listings),
            total_value: total_value(listings),
            average_price: average_price(listings),
            statuses: status_breakdown(listings),
            categories: category_breakdown(listings, &DASHBOARD_CATEGORIES),
            recent: recent(listings, RECENT_LIMIT).to_vec(),
        }
    }
}

/// Render an amount as `$1,234,567`, rounded to whole units
pub fn format_price(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}
