//! # Remote API Client
//!
//! Thin JSON-over-HTTP client for the remote source of truth. The client is
//! an explicit resource: constructed once at the composition root and handed
//! to the components that need it, never a module-level global.
//!
//! All methods return [`RemoteError`] classified per the transport/server
//! distinction - callers decide policy (degrade offline, block, drop a
//! queue entry); this layer only reports faithfully what happened.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};
use cantina_core::{StockSnapshot, WorkdayStatus};

/// Default per-request timeout. Short: a slow probe must not stall a sync
/// cycle, and every operation is retried by the queue anyway.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Wire Types
// =============================================================================

/// A product row as the remote serves it. Remote ids live in a different id
/// space than local rowids; the pull path matches by `name` only.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProduct {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub current_stock: i64,
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A workday row as the remote serves it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteWorkday {
    pub id: i64,
    pub date: String,
    pub status: WorkdayStatus,
    pub opening_stock: StockSnapshot,
    #[serde(default)]
    pub closing_stock: Option<StockSnapshot>,
    #[serde(default)]
    pub opened_at: Option<String>,
    #[serde(default)]
    pub closed_at: Option<String>,
    pub responsible_person: String,
}

/// Error body shape the remote uses for every non-2xx response.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the remote store.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    /// Creates a client against `base_url` (e.g. `http://192.168.1.10:3000`).
    pub fn new(base_url: impl Into<String>) -> RemoteResult<Self> {
        let base_url = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RemoteError::InvalidUrl(base_url));
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;

        Ok(RemoteClient { http, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Connectivity probe. Ok(()) means the server is reachable AND healthy.
    pub async fn ping(&self) -> RemoteResult<()> {
        let response = self.http.get(self.url("/ping")).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Convenience wrapper over [`RemoteClient::ping`] for callers that only
    /// branch on reachability.
    pub async fn is_online(&self) -> bool {
        self.ping().await.is_ok()
    }

    /// Fetches the full remote product catalog.
    pub async fn fetch_products(&self) -> RemoteResult<Vec<RemoteProduct>> {
        let response = self.http.get(self.url("/products")).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let products: Vec<RemoteProduct> = response.json().await?;
        debug!(count = products.len(), "Fetched remote products");
        Ok(products)
    }

    /// Fetches the remote open workday, if any. `None` is a definitive
    /// answer ("no one holds the lock"), not an error.
    pub async fn fetch_open_workday(&self) -> RemoteResult<Option<RemoteWorkday>> {
        let response = self
            .http
            .get(self.url("/workdays"))
            .query(&[("status", "open")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let workday: Option<RemoteWorkday> = response.json().await?;
        Ok(workday)
    }

    /// Opens a workday remotely (the synchronous confirmation path).
    ///
    /// A 409 means another session already holds the open workday; the
    /// conflict carries who, best-effort re-fetched from the remote row.
    pub async fn open_workday(
        &self,
        date: &str,
        opening_stock: &StockSnapshot,
        responsible_person: &str,
    ) -> RemoteResult<RemoteWorkday> {
        let body = json!({
            "action": "open",
            "date": date,
            "openingStock": opening_stock,
            "responsiblePerson": responsible_person,
        });

        let response = self
            .http
            .post(self.url("/workdays"))
            .json(&body)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::CONFLICT {
            // Who holds it? Best effort; the open is refused either way.
            let responsible = match self.fetch_open_workday().await {
                Ok(Some(open)) => Some(open.responsible_person),
                _ => None,
            };
            return Err(RemoteError::Conflict { responsible });
        }

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(response.json().await?)
    }

    /// Closes the remote open workday. 404 maps to [`RemoteError::NotFound`]
    /// ("already closed"), which callers treat as success.
    pub async fn close_workday(&self, closing_stock: &StockSnapshot) -> RemoteResult<()> {
        let body = json!({
            "action": "close",
            "closingStock": closing_stock,
        });

        let response = self
            .http
            .post(self.url("/workdays"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    /// POSTs a queued payload verbatim to an endpoint. The push engine's
    /// single send primitive.
    pub async fn post_raw(&self, endpoint: &str, payload: &serde_json::Value) -> RemoteResult<()> {
        let response = self
            .http
            .post(self.url(endpoint))
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(())
    }

    /// Maps a non-2xx response to the error taxonomy, reading the
    /// `{error: message}` body when present.
    async fn error_from(response: reqwest::Response) -> RemoteError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };

        match status {
            reqwest::StatusCode::NOT_FOUND => RemoteError::NotFound,
            reqwest::StatusCode::CONFLICT => RemoteError::Conflict { responsible: None },
            _ => RemoteError::Server { status: status.as_u16(), message },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
