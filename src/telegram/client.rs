//! Telegram Bot API client
//!
//! Every method is a JSON `POST {api}/bot{token}/{method}`. The Bot API
//! answers with an `{ok, result | description}` envelope even for 4xx
//! responses, so classification works off the envelope rather than the
//! HTTP status.

use super::types::{inline_keyboard, ApiResponse, Message, Update};
use crate::config::TelegramConfig;
use crate::frames::Locator;
use crate::runtime::{ChoiceButton, ConversationId, GatewayError, MessageHandle, MessagingGateway};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

/// Timeout for ordinary API calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack on top of the long-poll timeout before giving up on `getUpdates`
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Bot API rejection for an edit that would leave the message as it is
const NOT_MODIFIED: &str = "message is not modified";

/// Update kinds the bot subscribes to
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Messaging gateway backed by the Telegram Bot API
pub struct TelegramGateway {
    client: Client,
    /// `{api}/bot{token}`; contains the token, never log it
    bot_url: String,
}

impl TelegramGateway {
    pub fn new(config: &TelegramConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            bot_url: config.bot_url(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &Value,
    ) -> Result<T, GatewayError> {
        self.call_with_timeout(method, payload, REQUEST_TIMEOUT).await
    }

    async fn call_with_timeout<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.bot_url))
            .timeout(timeout)
            .json(payload)
            .send()
            .await
            // The URL carries the bot token
            .map_err(|e| GatewayError::transport(format!("{method} failed: {}", e.without_url())))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            GatewayError::transport(format!(
                "{method}: failed to read response: {}",
                e.without_url()
            ))
        })?;

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            GatewayError::transport(format!("{method}: HTTP {status}, unreadable response: {e}"))
        })?;

        if !envelope.ok {
            let description = envelope
                .description
                .unwrap_or_else(|| format!("HTTP {status}"));
            if description.contains(NOT_MODIFIED) {
                return Err(GatewayError::content_unchanged(description));
            }
            tracing::debug!(method, code = ?envelope.error_code, %description, "Bot API call rejected");
            return Err(GatewayError::transport(format!("{method}: {description}")));
        }

        envelope
            .result
            .ok_or_else(|| GatewayError::transport(format!("{method}: response has no result")))
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> Result<Vec<Update>, GatewayError> {
        let mut payload = json!({
            "timeout": timeout.as_secs(),
            "allowed_updates": ALLOWED_UPDATES,
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }
        self.call_with_timeout("getUpdates", &payload, timeout + POLL_GRACE)
            .await
    }

    /// Point Telegram at `url` for update delivery
    pub async fn set_webhook(&self, url: &str) -> Result<(), GatewayError> {
        let _: bool = self
            .call(
                "setWebhook",
                &json!({ "url": url, "allowed_updates": ALLOWED_UPDATES }),
            )
            .await?;
        Ok(())
    }

    /// Remove any webhook so `getUpdates` is allowed
    pub async fn delete_webhook(&self) -> Result<(), GatewayError> {
        let _: bool = self.call("deleteWebhook", &json!({})).await?;
        Ok(())
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_choice_message(
        &self,
        conversation: ConversationId,
        text: &str,
        frame: &Locator,
        choices: &[ChoiceButton],
    ) -> Result<MessageHandle, GatewayError> {
        let message: Message = self
            .call(
                "sendPhoto",
                &json!({
                    "chat_id": conversation.0,
                    "photo": frame.as_str(),
                    "caption": text,
                    "reply_markup": inline_keyboard(choices),
                }),
            )
            .await?;

        Ok(MessageHandle {
            conversation,
            message_id: message.message_id,
        })
    }

    async fn update_choice_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        frame: Option<&Locator>,
        choices: &[ChoiceButton],
    ) -> Result<(), GatewayError> {
        // Both edits answer with the edited message, or `true` for inline ones
        let _: Value = match frame {
            Some(frame) => {
                self.call(
                    "editMessageMedia",
                    &json!({
                        "chat_id": handle.conversation.0,
                        "message_id": handle.message_id,
                        "media": {
                            "type": "photo",
                            "media": frame.as_str(),
                            "caption": text,
                        },
                        "reply_markup": inline_keyboard(choices),
                    }),
                )
                .await?
            }
            None => {
                self.call(
                    "editMessageCaption",
                    &json!({
                        "chat_id": handle.conversation.0,
                        "message_id": handle.message_id,
                        "caption": text,
                        "reply_markup": inline_keyboard(choices),
                    }),
                )
                .await?
            }
        };
        Ok(())
    }

    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<(), GatewayError> {
        let _: Value = self
            .call(
                "sendMessage",
                &json!({ "chat_id": conversation.0, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn acknowledge(&self, event_id: &str) -> Result<(), GatewayError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &json!({ "callback_query_id": event_id }),
            )
            .await?;
        Ok(())
    }
}
