//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the controller with mock implementations.

use super::store::SearchSession;
use crate::frames::Locator;
use crate::state_machine::Choice;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Chat the search runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference to a message owned by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    pub conversation: ConversationId,
    pub message_id: i64,
}

/// One button under a choice message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceButton {
    pub label: String,
    pub data: String,
}

impl From<Choice> for ChoiceButton {
    fn from(choice: Choice) -> Self {
        Self {
            label: choice.label().to_string(),
            data: choice.data().to_string(),
        }
    }
}

/// Gateway error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub kind: GatewayErrorKind,
    pub message: String,
}

impl GatewayError {
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn content_unchanged(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::ContentUnchanged, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Transport, message)
    }

    pub fn is_content_unchanged(&self) -> bool {
        self.kind == GatewayErrorKind::ContentUnchanged
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Edit rejected because the message already has this content - harmless
    ContentUnchanged,
    /// Any other send/edit failure
    Transport,
}

/// Chat transport that displays probes and collects answers
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a message showing `frame` with `text` and a row of choice buttons
    async fn send_choice_message(
        &self,
        conversation: ConversationId,
        text: &str,
        frame: &Locator,
        choices: &[ChoiceButton],
    ) -> Result<MessageHandle, GatewayError>;

    /// Replace the text (and optionally the frame) of a choice message.
    /// An empty `choices` removes the buttons.
    async fn update_choice_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        frame: Option<&Locator>,
        choices: &[ChoiceButton],
    ) -> Result<(), GatewayError>;

    /// Send a plain text message
    async fn send_text(&self, conversation: ConversationId, text: &str)
        -> Result<(), GatewayError>;

    /// Acknowledge an inbound choice event
    async fn acknowledge(&self, event_id: &str) -> Result<(), GatewayError>;
}

/// Storage for per-conversation search sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, conversation: ConversationId) -> Option<SearchSession>;

    /// Insert or replace the session for `conversation`
    async fn put(&self, conversation: ConversationId, session: SearchSession);

    /// Remove the session; returns whether one existed
    async fn delete(&self, conversation: ConversationId) -> bool;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: MessagingGateway + ?Sized> MessagingGateway for Arc<T> {
    async fn send_choice_message(
        &self,
        conversation: ConversationId,
        text: &str,
        frame: &Locator,
        choices: &[ChoiceButton],
    ) -> Result<MessageHandle, GatewayError> {
        (**self)
            .send_choice_message(conversation, text, frame, choices)
            .await
    }

    async fn update_choice_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        frame: Option<&Locator>,
        choices: &[ChoiceButton],
    ) -> Result<(), GatewayError> {
        (**self)
            .update_choice_message(handle, text, frame, choices)
            .await
    }

    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<(), GatewayError> {
        (**self).send_text(conversation, text).await
    }

    async fn acknowledge(&self, event_id: &str) -> Result<(), GatewayError> {
        (**self).acknowledge(event_id).await
    }
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, conversation: ConversationId) -> Option<SearchSession> {
        (**self).get(conversation).await
    }

    async fn put(&self, conversation: ConversationId, session: SearchSession) {
        (**self).put(conversation, session).await;
    }

    async fn delete(&self, conversation: ConversationId) -> bool {
        (**self).delete(conversation).await
    }
}
