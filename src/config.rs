use crate::store::Credentials;
use anyhow::{Context, Result};
use std::time::Duration;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const EMAIL_VAR: &str = "ADMIN_EMAIL";
pub const PASSWORD_VAR: &str = "ADMIN_PASSWORD";

/// Connection settings for the hosted store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: String,
    /// Public anon key sent as `apikey` on every request
    pub anon_key: String,
    pub timeout: Duration,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Read `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{} is not set", URL_VAR))?;
        let anon_key = lookup(ANON_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{} is not set", ANON_KEY_VAR))?;

        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("{} must be an http(s) URL, got {}", URL_VAR, url);
        }

        Ok(Self::new(url.trim(), anon_key.trim()))
    }
}

/// Sign-in credentials from flags, falling back to `ADMIN_EMAIL` / `ADMIN_PASSWORD`
pub fn credentials(
    email: Option<String>,
    password: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Credentials> {
    let email = email
        .or_else(|| lookup(EMAIL_VAR))
        .with_context(|| format!("no email given (use --email or {})", EMAIL_VAR))?;
    let password = password
        .or_else(|| lookup(PASSWORD_VAR))
        .with_context(|| format!("no password given (use --password or {})", PASSWORD_VAR))?;
    Ok(Credentials::new(email, password))
}
