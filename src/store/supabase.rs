use crate::config::StoreConfig;
use crate::models::Listing;
use crate::store::error::StoreError;
use crate::store::traits::ListingStore;
use crate::store::types::{Credentials, Session};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

const TABLE: &str = "properties";

/// Listing store backed by a Supabase project (PostgREST + GoTrue)
pub struct SupabaseStore {
    client: Client,
    config: StoreConfig,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: String,
    email: Option<String>,
}

impl SupabaseStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("property-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, TABLE)
    }

    fn token_url(&self) -> String {
        format!("{}/auth/v1/token", self.config.url)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
    }

    /// Rows touched by a write, returned thanks to `Prefer: return=representation`
    async fn returned_rows(&self, response: Response, write: bool) -> Result<Vec<Value>, StoreError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} returned status: {}", TABLE, status);
            return Err(failure(status, &body, write));
        }
        Ok(response.json::<Vec<Value>>().await?)
    }
}

fn id_filter(id: &str) -> String {
    format!("eq.{}", id)
}

/// Pull a human-readable message out of a PostgREST or GoTrue error body
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// 4xx on a write means the store refused the shape; everything else is an outage
fn failure(status: StatusCode, body: &str, write: bool) -> StoreError {
    let message = error_message(status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(message),
        s if write && s.is_client_error() => StoreError::Rejected(message),
        _ => StoreError::Unavailable(message),
    }
}

fn decode_rows(rows: &[Value]) -> Result<Vec<Listing>, StoreError> {
    rows.iter()
        .map(|row| Listing::from_record(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl ListingStore for SupabaseStore {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, StoreError> {
        info!("Signing in as {}", credentials.email);

        let response = self
            .client
            .post(self.token_url())
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Sign-in refused with status: {}", status);
            return Err(if status.is_client_error() {
                StoreError::Auth(error_message(status, &body))
            } else {
                StoreError::Unavailable(error_message(status, &body))
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(Session {
            access_token: token.access_token,
            user_id: token.user.id,
            email: token.user.email,
        })
    }

    async fn list_all(&self, session: &Session) -> Result<Vec<Listing>, StoreError> {
        let url = self.table_url();
        debug!("Fetching URL: {}", url);

        let response = self
            .authorized(self.client.get(&url), session)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        let rows = self.returned_rows(response, false).await?;
        debug!("Fetched {} rows", rows.len());
        decode_rows(&rows)
    }

    async fn get_by_id(&self, session: &Session, id: &str) -> Result<Listing, StoreError> {
        let response = self
            .authorized(self.client.get(self.table_url()), session)
            .query(&[("select", "*".to_string()), ("id", id_filter(id))])
            .send()
            .await?;

        let rows = self.returned_rows(response, false).await?;
        let row = rows.first().ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Listing::from_record(row)?)
    }

    async fn insert(&self, session: &Session, record: &Map<String, Value>) -> Result<Listing, StoreError> {
        let response = self
            .authorized(self.client.post(self.table_url()), session)
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;

        let rows = self.returned_rows(response, true).await?;
        let row = rows
            .first()
            .ok_or_else(|| StoreError::Rejected("insert returned no row".to_string()))?;
        let listing = Listing::from_record(row)?;
        info!("Inserted listing {}", listing.id());
        Ok(listing)
    }

    async fn update(&self, session: &Session, id: &str, record: &Map<String, Value>) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.patch(self.table_url()), session)
            .query(&[("id", id_filter(id))])
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;

        if self.returned_rows(response, true).await?.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!("Updated listing {}", id);
        Ok(())
    }

    async fn delete_by_id(&self, session: &Session, id: &str) -> Result<(), StoreError> {
        let response = self
            .authorized(self.client.delete(self.table_url()), session)
            .query(&[("id", id_filter(id))])
            .header("Prefer", "return=representation")
            .send()
            .await?;

        if self.returned_rows(response, false).await?.is_empty() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        info!("Deleted listing {}", id);
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        "Supabase"
    }
}
