//! Screen-level workflows: each call re-fetches, and drafts are validated
//! before anything is sent to the store.

use crate::filter::{filter_listings, ListingQuery};
use crate::models::{is_form_category, Listing, ListingDraft};
use crate::stats::DashboardSummary;
use crate::store::{ListingStore, Session, StoreError};
use crate::validation::{validate, ValidationErrors};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("listing is not valid: {0}")]
    Invalid(ValidationErrors),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn ensure_valid(draft: &ListingDraft) -> Result<(), AdminError> {
    if !is_form_category(&draft.property_type) {
        warn!("Category {:?} is not one of the form categories", draft.property_type);
    }
    let errors = validate(draft);
    if errors.is_empty() {
        Ok(())
    } else {
        warn!("Draft rejected with {} field errors", errors.len());
        Err(AdminError::Invalid(errors))
    }
}

pub async fn dashboard<S: ListingStore + ?Sized>(store: &S, session: &Session) -> Result<DashboardSummary, AdminError> {
    let listings = store.list_all(session).await?;
    Ok(DashboardSummary::from_listings(&listings))
}

pub async fn search<S: ListingStore + ?Sized>(
    store: &S,
    session: &Session,
    query: &ListingQuery,
) -> Result<Vec<Listing>, AdminError> {
    let listings = store.list_all(session).await?;
    Ok(filter_listings(&listings, query))
}

pub async fn create_listing<S: ListingStore + ?Sized>(
    store: &S,
    session: &Session,
    draft: &ListingDraft,
) -> Result<Listing, AdminError> {
    ensure_valid(draft)?;
    let listing = store.insert(session, &draft.to_record()).await?;
    info!("Created listing {} ({})", listing.id(), listing.fields.title);
    Ok(listing)
}

/// Submit the full field set of `draft` for an existing listing
pub async fn update_listing<S: ListingStore + ?Sized>(
    store: &S,
    session: &Session,
    id: &str,
    draft: &ListingDraft,
) -> Result<(), AdminError> {
    ensure_valid(draft)?;
    store.update(session, id, &draft.to_record()).await?;
    info!("Updated listing {}", id);
    Ok(())
}

pub async fn delete_listing<S: ListingStore + ?Sized>(store: &S, session: &Session, id: &str) -> Result<(), AdminError> {
    store.delete_by_id(session, id).await?;
    info!("Deleted listing {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ListingStatus;
    use crate::store::memory::{DEMO_EMAIL, DEMO_PASSWORD};
    use crate::store::{Credentials, MemoryStore};

    fn flat_a(price: f64) -> ListingDraft {
        ListingDraft {
            title: "Flat A".to_string(),
            location: "Main St".to_string(),
            price,
            description: "nice".to_string(),
            square_meters: 40.0,
            bedrooms: 1,
            bathrooms: 1,
            ..ListingDraft::default()
        }
    }

    async fn setup() -> (MemoryStore, Session) {
        let store = MemoryStore::demo();
        let session = store
            .sign_in(&Credentials::new(DEMO_EMAIL, DEMO_PASSWORD))
            .await
            .unwrap();
        (store, session)
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_store() {
        let (store, session) = setup().await;
        let before = store.list_all(&session).await.unwrap().len();

        let err = create_listing(&store, &session, &flat_a(0.0)).await.unwrap_err();
        match err {
            AdminError::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors.contains("price"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(store.list_all(&session).await.unwrap().len(), before);
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (store, session) = setup().await;
        let created = create_listing(&store, &session, &flat_a(1000.0)).await.unwrap();
        let fetched = store.get_by_id(&session, created.id()).await.unwrap();
        assert_eq!(fetched.draft(), &flat_a(1000.0));
    }

    #[tokio::test]
    async fn test_update_validates_and_overwrites() {
        let (store, session) = setup().await;
        let mut draft = store.get_by_id(&session, "demo-2").await.unwrap().draft().clone();

        draft.title = "  ".to_string();
        assert!(matches!(
            update_listing(&store, &session, "demo-2", &draft).await,
            Err(AdminError::Invalid(_))
        ));

        draft.title = "Local renovado".to_string();
        draft.status = ListingStatus::Available;
        update_listing(&store, &session, "demo-2", &draft).await.unwrap();
        let fetched = store.get_by_id(&session, "demo-2").await.unwrap();
        assert_eq!(fetched.fields.title, "Local renovado");
        assert_eq!(fetched.status(), ListingStatus::Available);
    }

    #[tokio::test]
    async fn test_custom_category_is_accepted() {
        let (store, session) = setup().await;
        let mut draft = flat_a(1000.0);
        draft.property_type = "Cochera".to_string();
        let created = create_listing(&store, &session, &draft).await.unwrap();
        assert_eq!(created.fields.property_type, "Cochera");
    }

    #[tokio::test]
    async fn test_update_missing_listing() {
        let (store, session) = setup().await;
        assert!(matches!(
            update_listing(&store, &session, "missing", &flat_a(1.0)).await,
            Err(AdminError::Store(StoreError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (store, session) = setup().await;
        delete_listing(&store, &session, "demo-1").await.unwrap();
        assert!(matches!(
            store.get_by_id(&session, "demo-1").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_dashboard_and_search() {
        let (store, session) = setup().await;
        let summary = dashboard(&store, &session).await.unwrap();
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.available_count, 2);
        assert_eq!(summary.recent.len(), 3);

        let found = search(&store, &session, &ListingQuery::search("lago")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "demo-4");
    }

    #[tokio::test]
    async fn test_dyn_store() {
        let (store, session) = setup().await;
        let store: Box<dyn ListingStore> = Box::new(store);
        let summary = dashboard(store.as_ref(), &session).await.unwrap();
        assert_eq!(summary.total_count, 5);
    }
}
