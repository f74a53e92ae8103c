//! Telegram Bot API wire types
//!
//! Only the fields the bot reads are modelled; everything else in an update
//! is ignored by serde.

use crate::runtime::{ChoiceButton, ConversationId, Inbound};
use serde::Deserialize;
use serde_json::{json, Value};

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    /// Name to show in logs
    pub fn display_name(&self) -> String {
        self.first_name
            .clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

impl Update {
    /// Convert to an inbound event, or `None` for updates the bot ignores
    pub fn into_inbound(self) -> Option<Inbound> {
        if let Some(query) = self.callback_query {
            // Inline-mode queries carry no chat message and cannot be edited
            let message = query.message?;
            return Some(Inbound::Choice {
                conversation: ConversationId(message.chat.id),
                event_id: query.id,
                data: query.data.unwrap_or_default(),
            });
        }

        let message = self.message?;
        if !message.text.as_deref().is_some_and(is_start_command) {
            return None;
        }
        Some(Inbound::Start {
            conversation: ConversationId(message.chat.id),
            user: message.from.as_ref().map(User::display_name),
        })
    }
}

/// `/start`, `/start@SomeBot` and `/start <payload>` all start a search
pub fn is_start_command(text: &str) -> bool {
    let Some(command) = text.split_whitespace().next() else {
        return false;
    };
    command == "/start"
        || command
            .strip_prefix("/start@")
            .is_some_and(|bot| !bot.is_empty())
}

/// Single-row inline keyboard; no buttons removes the keyboard
pub fn inline_keyboard(choices: &[ChoiceButton]) -> Value {
    if choices.is_empty() {
        return json!({ "inline_keyboard": [] });
    }
    let row: Vec<Value> = choices
        .iter()
        .map(|c| json!({ "text": c.label, "callback_data": c.data }))
        .collect();
    json!({ "inline_keyboard": [row] })
}
