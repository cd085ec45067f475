use crate::models::{field, Listing, ListingDraft, ListingStatus};
use crate::store::error::StoreError;
use crate::store::traits::ListingStore;
use crate::store::types::{Credentials, Session};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Sign-in accepted by [`MemoryStore::demo`]
pub const DEMO_EMAIL: &str = "admin@demo.local";
pub const DEMO_PASSWORD: &str = "demo";

#[derive(Default)]
struct Inner {
    /// Newest first
    listings: Vec<Listing>,
    sessions: HashSet<String>,
    next_id: u64,
}

/// In-process listing store, for offline use and tests
pub struct MemoryStore {
    credentials: Credentials,
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Empty store accepting a single credential pair
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            inner: RwLock::new(Inner {
                next_id: 1,
                ..Inner::default()
            }),
        }
    }

    /// Seed with listings given newest first
    pub fn with_listings(mut self, listings: Vec<Listing>) -> Self {
        let inner = self.inner.get_mut();
        inner.next_id += listings.len() as u64;
        inner.listings = listings;
        self
    }

    /// Store pre-filled with sample listings
    pub fn demo() -> Self {
        Self::new(Credentials::new(DEMO_EMAIL, DEMO_PASSWORD)).with_listings(demo_listings())
    }

    async fn check(&self, session: &Session) -> Result<(), StoreError> {
        if self.inner.read().await.sessions.contains(&session.access_token) {
            Ok(())
        } else {
            Err(StoreError::Auth("session not recognised".to_string()))
        }
    }
}

/// Row for `listing` with `changes` laid over its columns
fn merged_row(listing: &Listing, changes: &Map<String, Value>) -> Value {
    let mut row = listing.draft().to_record();
    row.insert(field::ID.into(), json!(listing.id()));
    row.insert(field::CREATED_AT.into(), json!(listing.created_at.map(|t| t.to_rfc3339())));
    for (key, value) in changes {
        if key != field::ID && key != field::CREATED_AT {
            row.insert(key.clone(), value.clone());
        }
    }
    row.insert(field::UPDATED_AT.into(), json!(Utc::now().to_rfc3339()));
    Value::Object(row)
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StoreError> {
        if credentials != &self.credentials {
            return Err(StoreError::Auth("Invalid login credentials".to_string()));
        }

        let mut inner = self.inner.write().await;
        let token = format!("memory-session-{}", inner.sessions.len() + 1);
        inner.sessions.insert(token.clone());
        info!("Signed in as {}", credentials.email);

        Ok(Session {
            access_token: token,
            user_id: "memory-user".to_string(),
            email: Some(credentials.email.clone()),
        })
    }

    async fn list_all(&self, session: &Session) -> Result<Vec<Listing>, StoreError> {
        self.check(session).await?;
        let mut listings = self.inner.read().await.listings.clone();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listings)
    }

    async fn get_by_id(&self, session: &Session, id: &str) -> Result<Listing, StoreError> {
        self.check(session).await?;
        self.inner
            .read()
            .await
            .listings
            .iter()
            .find(|l| l.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn insert(&self, session: &Session, record: &Map<String, Value>) -> Result<Listing, StoreError> {
        self.check(session).await?;
        let mut inner = self.inner.write().await;

        let mut row = record.clone();
        row.insert(field::ID.into(), json!(inner.next_id.to_string()));
        row.insert(field::CREATED_AT.into(), json!(Utc::now().to_rfc3339()));
        let listing = Listing::from_record(&Value::Object(row)).map_err(|e| StoreError::Rejected(e.to_string()))?;

        inner.next_id += 1;
        inner.listings.insert(0, listing.clone());
        debug!("Inserted listing {}", listing.id());
        Ok(listing)
    }

    async fn update(&self, session: &Session, id: &str, record: &Map<String, Value>) -> Result<(), StoreError> {
        self.check(session).await?;
        let mut inner = self.inner.write().await;

        let slot = inner
            .listings
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let updated = Listing::from_record(&merged_row(slot, record)).map_err(|e| StoreError::Rejected(e.to_string()))?;
        *slot = updated;
        debug!("Updated listing {}", id);
        Ok(())
    }

    async fn delete_by_id(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        self.check(session).await?;
        let mut inner = self.inner.write().await;

        let before = inner.listings.len();
        inner.listings.retain(|l| l.id() != id);
        if inner.listings.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!("Deleted listing {}", id);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "Memory"
    }
}

fn demo_listings() -> Vec<Listing> {
    let now = Utc::now();
    let seed = |id: &str, age_days: i64, fields: ListingDraft| {
        Listing::new(id, fields).with_timestamps(Some(now - Duration::days(age_days)), None)
    };

    vec![
        seed(
            "demo-5",
            1,
            ListingDraft {
                title: "PH reciclado con terraza".to_string(),
                property_type: "PH".to_string(),
                location: "Gorriti 4800".to_string(),
                city: Some("Buenos Aires".to_string()),
                state: Some("CABA".to_string()),
                price: 210_000.0,
                description: "PH de tres ambientes con terraza propia y parrilla.".to_string(),
                square_meters: 95.0,
                bedrooms: 3,
                bathrooms: 1,
                amenities: vec!["Terraza".to_string(), "Parrilla".to_string()],
                status: ListingStatus::Available,
                ..ListingDraft::default()
            },
        ),
        seed(
            "demo-4",
            3,
            ListingDraft {
                title: "Departamento frente al lago".to_string(),
                property_type: "Departamento".to_string(),
                location: "Av. Costanera 120".to_string(),
                city: Some("Bariloche".to_string()),
                state: Some("Río Negro".to_string()),
                price: 145_000.0,
                description: "Dos ambientes con vista al lago Nahuel Huapi.".to_string(),
                square_meters: 52.0,
                bedrooms: 2,
                bathrooms: 1,
                amenities: vec!["Balcón".to_string(), "Cochera".to_string()],
                status: ListingStatus::Pending,
                ..ListingDraft::default()
            },
        ),
        seed(
            "demo-3",
            8,
            ListingDraft {
                title: "Casa con jardín".to_string(),
                property_type: "Casa".to_string(),
                location: "Los Aromos 350".to_string(),
                city: Some("Pilar".to_string()),
                state: Some("Buenos Aires".to_string()),
                price: 320_000.0,
                description: "Casa de cuatro ambientes con pileta y jardín.".to_string(),
                square_meters: 180.0,
                bedrooms: 4,
                bathrooms: 2,
                amenities: vec!["Pileta".to_string(), "Jardín".to_string(), "Cochera".to_string()],
                status: ListingStatus::Sold,
                ..ListingDraft::default()
            },
        ),
        seed(
            "demo-2",
            15,
            ListingDraft {
                title: "Local a la calle".to_string(),
                property_type: "Local".to_string(),
                location: "Av. Corrientes 1500".to_string(),
                city: Some("Buenos Aires".to_string()),
                state: Some("CABA".to_string()),
                price: 1_200.0,
                description: "Local comercial con vidriera, ideal gastronomía.".to_string(),
                square_meters: 70.0,
                status: ListingStatus::Rented,
                ..ListingDraft::default()
            },
        ),
        seed(
            "demo-1",
            30,
            ListingDraft {
                title: "Terreno en barrio abierto".to_string(),
                property_type: "Terreno".to_string(),
                location: "Lote 14, Calle 9".to_string(),
                city: Some("Cañuelas".to_string()),
                state: Some("Buenos Aires".to_string()),
                price: 38_000.0,
                description: "Lote de 600 m2 con servicios.".to_string(),
                square_meters: 600.0,
                status: ListingStatus::Available,
                ..ListingDraft::default()
            },
        ),
    ]
}
