//! Chat transport over `fetch`, via `gloo-net`.

use crate::chat::{ChatRequest, ChatTransport};
use crate::error::PageError;

pub(super) struct FetchTransport;

impl ChatTransport for FetchTransport {
    async fn post_chat(&self, endpoint: &str, request: &ChatRequest) -> Result<String, PageError> {
        let resp = gloo_net::http::Request::post(endpoint)
            .json(request)
            .map_err(|e| PageError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| PageError::Request(e.to_string()))?;
        // Error statuses still carry a JSON body; let the caller decode it.
        if !resp.ok() {
            log::warn!("chat: {endpoint} answered {}", resp.status());
        }
        resp.text()
            .await
            .map_err(|e| PageError::Request(e.to_string()))
    }
}
