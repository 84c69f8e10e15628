//! Spot store: the client-side owner of the user's spot list.
//!
//! [`HttpSpotStore`] talks to `/api/spots` with [`reqwest`] and keeps an
//! in-memory copy of every spot it has seen, updated only after the server
//! confirms a write.

use std::future::Future;

use catchlog_core::types::DbId;
use reqwest::Method;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::models::{ErrorBody, Spot, SpotPayload};

/// Persistence operations the editor page needs.
pub trait SpotApi {
    /// Fetch all spots and replace the cached list.
    fn list(&mut self) -> impl Future<Output = Result<Vec<Spot>, ClientError>> + Send;

    fn get(&mut self, id: DbId) -> impl Future<Output = Result<Spot, ClientError>> + Send;

    fn create(
        &mut self,
        payload: &SpotPayload,
    ) -> impl Future<Output = Result<Spot, ClientError>> + Send;

    fn update(
        &mut self,
        id: DbId,
        payload: &SpotPayload,
    ) -> impl Future<Output = Result<Spot, ClientError>> + Send;

    fn delete(&mut self, id: DbId) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// The cached spots, as of the last successful call.
    fn spots(&self) -> &[Spot];
}

/// Keep `spot` in `cache`, replacing any entry with the same id.
pub(crate) fn upsert(cache: &mut Vec<Spot>, spot: Spot) {
    match cache.iter_mut().find(|s| s.id == spot.id) {
        Some(existing) => *existing = spot,
        None => cache.push(spot),
    }
}

/// [`SpotApi`] over HTTP.
pub struct HttpSpotStore {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
    spots: Vec<Spot>,
}

impl HttpSpotStore {
    /// Build a store with its own connection pool.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            token: config.token.clone(),
            spots: Vec::new(),
        }
    }

    /// Drop cached spots. Called when the user logs out.
    pub fn reset(&mut self) {
        tracing::debug!(cached = self.spots.len(), "Clearing spot cache");
        self.spots.clear();
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api/spots{path}", self.api_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ---- private helpers ----

    /// Returns the response unchanged on success, or a
    /// [`ClientError::Api`] carrying the server's `error` text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &body))
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Turn a non-2xx body into [`ClientError::Api`], preferring the JSON
/// `error` field over the raw text.
pub(crate) fn api_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    ClientError::Api { status, message }
}

impl SpotApi for HttpSpotStore {
    async fn list(&mut self) -> Result<Vec<Spot>, ClientError> {
        let response = self.request(Method::GET, "").send().await?;
        let spots: Vec<Spot> = Self::parse_response(response).await?;
        self.spots = spots.clone();
        Ok(spots)
    }

    async fn get(&mut self, id: DbId) -> Result<Spot, ClientError> {
        let response = self.request(Method::GET, &format!("/{id}")).send().await?;
        let spot: Spot = Self::parse_response(response).await?;
        upsert(&mut self.spots, spot.clone());
        Ok(spot)
    }

    async fn create(&mut self, payload: &SpotPayload) -> Result<Spot, ClientError> {
        let response = self.request(Method::POST, "").json(payload).send().await?;
        let spot: Spot = Self::parse_response(response).await?;
        tracing::info!(spot_id = spot.id, "Spot created");
        upsert(&mut self.spots, spot.clone());
        Ok(spot)
    }

    async fn update(&mut self, id: DbId, payload: &SpotPayload) -> Result<Spot, ClientError> {
        let response = self
            .request(Method::PUT, &format!("/{id}"))
            .json(payload)
            .send()
            .await?;
        let spot: Spot = Self::parse_response(response).await?;
        tracing::info!(spot_id = spot.id, "Spot updated");
        upsert(&mut self.spots, spot.clone());
        Ok(spot)
    }

    async fn delete(&mut self, id: DbId) -> Result<(), ClientError> {
        let response = self.request(Method::DELETE, &format!("/{id}")).send().await?;
        Self::ensure_success(response).await?;
        tracing::info!(spot_id = id, "Spot deleted");
        self.spots.retain(|s| s.id != id);
        Ok(())
    }

    fn spots(&self) -> &[Spot] {
        &self.spots
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn spot(id: DbId, name: &str) -> Spot {
        Spot {
            id,
            name: name.into(),
            latitude: 0.0,
            longitude: 0.0,
            coordinates: vec![],
            notes: String::new(),
            map_image_url: None,
            is_favorite: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_api_error_reads_error_field() {
        let err = api_error(400, r#"{"error": "Latitude is required", "code": "VALIDATION_ERROR"}"#);
        assert_matches!(err, ClientError::Api { status: 400, ref message } if message == "Latitude is required");
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = api_error(502, "Bad Gateway\n");
        assert_matches!(err, ClientError::Api { status: 502, ref message } if message == "Bad Gateway");
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let mut cache = vec![spot(1, "a"), spot(2, "b")];
        upsert(&mut cache, spot(2, "B"));
        upsert(&mut cache, spot(3, "c"));

        let names: Vec<_> = cache.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "B", "c"]);
    }

    #[test]
    fn test_reset_clears_cache() {
        let config = ClientConfig {
            api_url: "http://localhost:3000".into(),
            token: None,
            timeout: std::time::Duration::from_secs(1),
        };
        let mut store = HttpSpotStore::with_client(reqwest::Client::new(), &config);
        store.spots.push(spot(1, "a"));

        store.reset();

        assert!(store.spots().is_empty());
    }
}
