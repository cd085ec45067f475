//! Listing model, validation, dashboard statistics and store clients for a
//! real-estate admin dashboard.

pub mod admin;
pub mod config;
pub mod filter;
pub mod models;
pub mod stats;
pub mod store;
pub mod validation;

pub use models::{DecodeError, Listing, ListingDraft, ListingStatus};
pub use store::{Credentials, ListingStore, Session, StoreError};
