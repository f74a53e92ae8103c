//! Telegram transport
//!
//! Bot API client (also the production messaging gateway), wire types, and
//! the two ways updates arrive: long polling and webhook.

mod client;
mod polling;
mod types;
mod webhook;

#[cfg(test)]
pub mod testing;

pub use client::TelegramGateway;
pub use polling::run_polling;
pub use webhook::{create_router, serve};
