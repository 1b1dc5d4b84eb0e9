//! Spreadsheet backend client.
//!
//! Talks to the deployed web-app endpoint: reads are plain GETs with an
//! `action` query parameter, writes are JSON POSTs whose responses are not
//! readable by the caller, so only transport errors are reported for them.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{
    master::MasterEntry,
    record::RecordDraft,
    remote::{Backend, BackendError, BackendResult, ConfirmedRow},
    types::RowIndex,
};

/// Timeout applied to every backend request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Normalise a user-entered endpoint URL:
/// - trim whitespace
/// - ensure a scheme is present (https, or http for localhost)
/// - strip trailing slashes
pub fn normalize_endpoint_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> BackendError {
    if err.is_connect() {
        return BackendError::Transport(format!("cannot reach backend at {url}"));
    }
    if err.is_timeout() {
        return BackendError::Transport(format!("connection to {url} timed out"));
    }
    if err.is_builder() {
        return BackendError::InvalidUrl(url.to_string());
    }
    BackendError::Transport(format!("network error communicating with {url}: {err}"))
}

/// HTTP implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    /// Builds a client for the given endpoint URL (normalised first).
    pub fn new(url: &str) -> BackendResult<Self> {
        let endpoint = normalize_endpoint_url(url);
        if endpoint == "https://" || endpoint == "http://" {
            return Err(BackendError::InvalidUrl(url.to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// The normalised endpoint this client talks to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json(&self, query: &str) -> BackendResult<Value> {
        let url = format!("{}?{query}", self.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| friendly_error(&self.endpoint, &e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| friendly_error(&self.endpoint, &e))?;
        Ok(serde_json::from_str(&body)?)
    }

    // Writes assume success once the request goes out; the response body is
    // not readable under the deployment's cross-origin mode.
    async fn post_fire_and_forget(&self, body: Value) -> BackendResult<()> {
        self.client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| friendly_error(&self.endpoint, &e))?;
        Ok(())
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_records(&self, years: &[String]) -> BackendResult<Vec<ConfirmedRow>> {
        let query = format!("action=getData&years={}", years.join(","));
        let value = self.get_json(&query).await?;
        let rows: Vec<ConfirmedRow> = serde_json::from_value(value)?;
        debug!(rows = rows.len(), "fetched record snapshot");
        Ok(rows)
    }

    async fn fetch_master_data(&self) -> BackendResult<Vec<MasterEntry>> {
        let value = self.get_json("action=getMasterData").await?;
        let raw: Vec<Value> = serde_json::from_value(value)?;

        // Segments edited by hand can hold rows with unknown categories;
        // skip those instead of failing the whole refresh.
        let mut entries = Vec::with_capacity(raw.len());
        for item in raw {
            match serde_json::from_value::<MasterEntry>(item.clone()) {
                Ok(entry) => entries.push(entry),
                Err(_) => warn!(%item, "skipping master-data row with unknown shape"),
            }
        }
        debug!(entries = entries.len(), "fetched master data");
        Ok(entries)
    }

    async fn save_record(&self, draft: &RecordDraft) -> BackendResult<()> {
        self.post_fire_and_forget(json!({
            "action": "saveTransaction",
            "date": draft.date,
            "id": draft.id,
            "order": draft.order,
            "pantsCode": draft.pants_code,
            "shirtCode": draft.shirt_code,
            "color": draft.color,
            "group": draft.group,
            "quantity": draft.quantity,
        }))
        .await
    }

    async fn save_master_entry(&self, entry: &MasterEntry) -> BackendResult<()> {
        self.post_fire_and_forget(json!({
            "action": "saveConfig",
            "type": entry.category.as_str(),
            "value": entry.value,
        }))
        .await
    }

    async fn update_quantity(
        &self,
        year: &str,
        row_index: RowIndex,
        quantity: &str,
    ) -> BackendResult<()> {
        self.post_fire_and_forget(json!({
            "action": "updateQuantity",
            "year": year,
            "rowIndex": row_index,
            "quantity": quantity,
        }))
        .await
    }
}
