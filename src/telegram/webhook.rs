//! Webhook receiver (MODE=prod)
//!
//! Telegram posts each update to `{WEBHOOK_URL}/{token}`; the secret path is
//! the only authentication, so every other path answers 404.

use super::types::Update;
use crate::runtime::ConversationDispatcher;
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct WebhookState {
    pub dispatcher: Arc<ConversationDispatcher>,
    pub token: Arc<str>,
}

pub fn create_router(dispatcher: Arc<ConversationDispatcher>, token: &str) -> Router {
    let state = WebhookState {
        dispatcher,
        token: Arc::from(token),
    };

    Router::new()
        .route("/:token", post(receive_update))
        .layer(
            // Spans carry only the method; the path is the bot token
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<Body>| {
                    tracing::debug_span!("webhook", method = %req.method())
                }),
        )
        .with_state(state)
}

async fn receive_update(
    State(state): State<WebhookState>,
    Path(token): Path<String>,
    body: Bytes,
) -> StatusCode {
    // The path is checked before the body is looked at
    if !constant_time_eq(&state.token, &token) {
        return StatusCode::NOT_FOUND;
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable update");
            return StatusCode::BAD_REQUEST;
        }
    };

    let update_id = update.update_id;
    match update.into_inbound() {
        Some(inbound) => state.dispatcher.dispatch(inbound).await,
        None => tracing::debug!(update_id, "Ignoring update"),
    }
    StatusCode::OK
}

/// Comparison whose timing does not depend on where the inputs differ
fn constant_time_eq(expected: &str, presented: &str) -> bool {
    let expected = expected.as_bytes();
    let presented = presented.as_bytes();
    let mut diff = expected.len() ^ presented.len();
    for idx in 0..expected.len().max(presented.len()) {
        let left = expected.get(idx).copied().unwrap_or(0);
        let right = presented.get(idx).copied().unwrap_or(0);
        diff |= usize::from(left ^ right);
    }
    diff == 0
}

/// Serve `router` until `shutdown` is cancelled
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Webhook server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
