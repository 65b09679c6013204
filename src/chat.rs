//! Chat widget: panel visibility, message submission, and the reply log.
//!
//! SYSTEM CONTEXT
//! ==============
//! Submission is split in two. `begin_submit` runs synchronously inside the
//! submit event (trim, echo the user message, clear the input) and returns
//! a [`PendingChat`]. `complete` performs the network exchange and appends
//! the assistant reply, and is spawned on the event loop by the browser
//! layer.
//!
//! ERROR HANDLING
//! ==============
//! Transport and decoding failures collapse into one fixed assistant
//! message. Nothing is retried and no error reaches the caller.
//!
//! Overlapping submissions are not serialized. Each exchange appends its
//! reply when it completes, so replies can land out of submission order;
//! the request id on [`PendingChat`] ties log lines back to the request.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use serde::Serialize;
use uuid::Uuid;

use crate::config::PageConfig;
use crate::error::PageError;

/// Author of a chat log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Class suffix used on the rendered bubble.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry in the append-only conversation log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// Open/closed state of the chat panel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

impl PanelState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

/// Wire body for `POST /api/ai/chat`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Decoded server reply.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatReply {
    /// Non-empty reply text, if the server sent one.
    pub reply: Option<String>,
    /// Length of the `suggestions` array, logged but not rendered.
    pub suggestion_count: usize,
}

/// Decode a response body.
///
/// Any JSON value is accepted. A missing, empty, or non-string `reply`
/// yields `reply: None`; a missing or non-array `suggestions` counts as zero.
///
/// # Errors
///
/// Returns [`PageError::Decode`] if the body is not JSON at all.
pub fn parse_reply(body: &str) -> Result<ChatReply, PageError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    let reply = value
        .get("reply")
        .and_then(serde_json::Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_owned);
    let suggestion_count = value
        .get("suggestions")
        .and_then(serde_json::Value::as_array)
        .map_or(0, Vec::len);
    Ok(ChatReply {
        reply,
        suggestion_count,
    })
}

/// A submitted message waiting for its network exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingChat {
    pub id: Uuid,
    pub request: ChatRequest,
}

/// DOM side of the widget. Implementations no-op for absent elements.
pub trait ChatView {
    fn panel_state(&self) -> PanelState;
    fn set_panel_state(&self, state: PanelState);
    fn focus_input(&self);
    fn input_text(&self) -> String;
    fn clear_input(&self);
    /// Append `message` as literal text and scroll it into view.
    fn append(&self, message: &ChatMessage);
}

/// Sends one chat request and returns the raw response body.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    /// # Errors
    ///
    /// Returns [`PageError::Request`] when the request cannot complete.
    async fn post_chat(&self, endpoint: &str, request: &ChatRequest) -> Result<String, PageError>;
}

pub struct ChatWidget<V, T> {
    view: V,
    transport: T,
    endpoint: String,
    error_text: String,
}

impl<V: ChatView, T: ChatTransport> ChatWidget<V, T> {
    pub fn new(view: V, transport: T, endpoint: impl Into<String>, error_text: impl Into<String>) -> Self {
        Self {
            view,
            transport,
            endpoint: endpoint.into(),
            error_text: error_text.into(),
        }
    }

    pub fn from_config(view: V, transport: T, config: &PageConfig) -> Self {
        Self::new(view, transport, &config.chat_endpoint, &config.chat_error_text)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Flip panel visibility, focusing the input when it opens.
    pub fn toggle_panel(&self) -> PanelState {
        let next = self.view.panel_state().toggled();
        self.view.set_panel_state(next);
        if next == PanelState::Open {
            self.view.focus_input();
        }
        next
    }

    /// Synchronous half of a submit. Returns `None` for blank input.
    pub fn begin_submit(&self) -> Option<PendingChat> {
        let text = self.view.input_text().trim().to_owned();
        if text.is_empty() {
            return None;
        }
        self.view.append(&ChatMessage::user(text.clone()));
        self.view.clear_input();
        let pending = PendingChat {
            id: Uuid::new_v4(),
            request: ChatRequest { message: text },
        };
        log::debug!("chat: request {} queued", pending.id);
        Some(pending)
    }

    /// Exchange `pending` with the server and append the outcome.
    ///
    /// Returns the assistant message appended, if any.
    pub async fn complete(&self, pending: PendingChat) -> Option<ChatMessage> {
        let message = match self.exchange(&pending.request).await {
            Ok(reply) => {
                log::debug!(
                    "chat: request {} answered ({} suggestion(s))",
                    pending.id,
                    reply.suggestion_count
                );
                reply.reply.map(ChatMessage::assistant)?
            }
            Err(e) => {
                log::warn!("chat: request {} failed: {e}", pending.id);
                ChatMessage::assistant(self.error_text.clone())
            }
        };
        self.view.append(&message);
        Some(message)
    }

    /// Both halves of a submit, for callers that can await in place.
    pub async fn submit(&self) -> Option<ChatMessage> {
        let pending = self.begin_submit()?;
        self.complete(pending).await
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<ChatReply, PageError> {
        let body = self.transport.post_chat(&self.endpoint, request).await?;
        parse_reply(&body)
    }
}
