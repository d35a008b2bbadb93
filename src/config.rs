use anyhow::{Context, Result};
use std::str::FromStr;

use crate::filters::UrlFilters;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Connection settings for the marketplace API
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }
}

/// What the CLI browses: the filters a listing page would receive from its URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseConfig {
    pub url_filters: UrlFilters,
    pub city: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: u32,
}

pub fn load() -> Result<ClientConfig> {
    dotenvy::dotenv().ok();

    let defaults = ClientConfig::default();

    Ok(ClientConfig {
        api_url: var("MARKETPLACE_API_URL").unwrap_or(defaults.api_url),
        token: var("MARKETPLACE_TOKEN"),
        timeout_secs: parsed("MARKETPLACE_TIMEOUT_SECS")?.unwrap_or(defaults.timeout_secs),
        login_path: var("MARKETPLACE_LOGIN_PATH").unwrap_or(defaults.login_path),
    })
}

pub fn load_browse() -> Result<BrowseConfig> {
    dotenvy::dotenv().ok();

    let min_price = var("MARKETPLACE_MIN_PRICE");
    let max_price = var("MARKETPLACE_MAX_PRICE");
    // Forwarded verbatim, but a typo here should fail loudly rather than filter nothing.
    for (key, value) in [("MARKETPLACE_MIN_PRICE", &min_price), ("MARKETPLACE_MAX_PRICE", &max_price)] {
        if let Some(value) = value {
            value
                .parse::<f64>()
                .with_context(|| format!("{} is invalid: {}", key, value))?;
        }
    }

    Ok(BrowseConfig {
        url_filters: UrlFilters {
            property_type: var("MARKETPLACE_PROPERTY_TYPE"),
            search: var("MARKETPLACE_SEARCH"),
        },
        city: var("MARKETPLACE_CITY"),
        min_price,
        max_price,
        page: parsed("MARKETPLACE_PAGE")?.unwrap_or(1),
    })
}

fn var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var(key)
        .map(|value| {
            value
                .parse::<T>()
                .with_context(|| format!("{} is invalid: {}", key, value))
        })
        .transpose()
}
