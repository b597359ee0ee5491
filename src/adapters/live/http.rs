//! Live adapter for the `Backend` port over HTTP/JSON.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::BackendError;
use crate::ports::backend::{
    Backend, BackendFuture, ChatRequest, ChatResponse, LookupRequest, LookupResponse,
    ShoppingListRequest, ShoppingListResponse,
};

const LOOKUP_PATH: &str = "/api/barcode-lookup";
const CHAT_PATH: &str = "/api/chat";
const SHOPPING_LIST_PATH: &str = "/api/shopping-list";

/// Backend client that POSTs JSON to the recipe assistant.
pub struct HttpBackend {
    client: Client,
    base: String,
}

impl HttpBackend {
    /// Creates a client for the backend at `base` (e.g. `http://localhost:5001`).
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self { client: Client::new(), base: base.trim_end_matches('/').to_string() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn post<B, R>(&self, path: &'static str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        tracing::debug!(endpoint = path, "backend request");

        let response = self.client.post(self.url(path)).json(body).send().await.map_err(|e| {
            BackendError::Transport { endpoint: path.to_string(), message: e.to_string() }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| BackendError::Transport {
            endpoint: path.to_string(),
            message: format!("failed to read body: {e}"),
        })?;

        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| BackendError::Decode {
            endpoint: path.to_string(),
            message: e.to_string(),
        })
    }
}

impl Backend for HttpBackend {
    fn lookup_barcode(&self, upc: &str) -> BackendFuture<'_, LookupResponse> {
        let body = LookupRequest { upc: upc.to_string() };
        Box::pin(async move { self.post(LOOKUP_PATH, &body).await })
    }

    fn chat(&self, request: &ChatRequest) -> BackendFuture<'_, ChatResponse> {
        let body = request.clone();
        Box::pin(async move { self.post(CHAT_PATH, &body).await })
    }

    fn shopping_list(
        &self,
        request: &ShoppingListRequest,
    ) -> BackendFuture<'_, ShoppingListResponse> {
        let body = request.clone();
        Box::pin(async move { self.post(SHOPPING_LIST_PATH, &body).await })
    }
}
