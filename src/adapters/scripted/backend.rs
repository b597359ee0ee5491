//! Backend that answers from per-endpoint queues.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::BackendError;
use crate::ports::backend::{
    Backend, BackendFuture, ChatRequest, ChatResponse, LookupResponse, ShoppingListRequest,
    ShoppingListResponse,
};

#[derive(Default)]
struct Script {
    lookups: VecDeque<Result<LookupResponse, BackendError>>,
    chats: VecDeque<Result<ChatResponse, BackendError>>,
    shopping_lists: VecDeque<Result<ShoppingListResponse, BackendError>>,
    lookup_requests: Vec<String>,
    chat_requests: Vec<ChatRequest>,
    shopping_list_requests: Vec<ShoppingListRequest>,
}

/// Scripted backend. Every call pops the next queued answer for its
/// endpoint and records the request; an empty queue answers with a
/// transport error, as if the backend were down.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
}

impl ScriptedBackend {
    /// Creates a backend with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a barcode lookup answer.
    #[must_use]
    pub fn with_lookup(self, answer: Result<LookupResponse, BackendError>) -> Self {
        self.lock().lookups.push_back(answer);
        self
    }

    /// Queues a chat answer.
    #[must_use]
    pub fn with_chat(self, answer: Result<ChatResponse, BackendError>) -> Self {
        self.lock().chats.push_back(answer);
        self
    }

    /// Queues a shopping-list answer.
    #[must_use]
    pub fn with_shopping_list(self, answer: Result<ShoppingListResponse, BackendError>) -> Self {
        self.lock().shopping_lists.push_back(answer);
        self
    }

    /// UPCs looked up so far.
    #[must_use]
    pub fn lookup_requests(&self) -> Vec<String> {
        self.lock().lookup_requests.clone()
    }

    /// Chat requests sent so far.
    #[must_use]
    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.lock().chat_requests.clone()
    }

    /// Shopping-list requests sent so far.
    #[must_use]
    pub fn shopping_list_requests(&self) -> Vec<ShoppingListRequest> {
        self.lock().shopping_list_requests.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().expect("backend script lock poisoned")
    }
}

fn unscripted(endpoint: &str) -> BackendError {
    BackendError::Transport {
        endpoint: endpoint.to_string(),
        message: "connection refused (nothing scripted)".to_string(),
    }
}

impl Backend for ScriptedBackend {
    fn lookup_barcode(&self, upc: &str) -> BackendFuture<'_, LookupResponse> {
        let answer = {
            let mut script = self.lock();
            script.lookup_requests.push(upc.to_string());
            script.lookups.pop_front()
        };
        Box::pin(async move { answer.unwrap_or_else(|| Err(unscripted("/api/barcode-lookup"))) })
    }

    fn chat(&self, request: &ChatRequest) -> BackendFuture<'_, ChatResponse> {
        let answer = {
            let mut script = self.lock();
            script.chat_requests.push(request.clone());
            script.chats.pop_front()
        };
        Box::pin(async move { answer.unwrap_or_else(|| Err(unscripted("/api/chat"))) })
    }

    fn shopping_list(
        &self,
        request: &ShoppingListRequest,
    ) -> BackendFuture<'_, ShoppingListResponse> {
        let answer = {
            let mut script = self.lock();
            script.shopping_list_requests.push(request.clone());
            script.shopping_lists.pop_front()
        };
        Box::pin(async move { answer.unwrap_or_else(|| Err(unscripted("/api/shopping-list"))) })
    }
}
