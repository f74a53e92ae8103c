//! Long-polling update loop (MODE=dev)

use super::TelegramGateway;
use crate::runtime::ConversationDispatcher;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause after a failed `getUpdates` before trying again
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Poll for updates until `shutdown` is cancelled
///
/// Each update is confirmed by advancing the offset past it, whether or not
/// it produced an inbound event.
pub async fn run_polling(
    gateway: &TelegramGateway,
    dispatcher: &ConversationDispatcher,
    timeout: Duration,
    shutdown: CancellationToken,
) {
    if let Err(e) = gateway.delete_webhook().await {
        tracing::warn!(error = %e, "Failed to delete webhook before polling");
    }
    tracing::info!(timeout_secs = timeout.as_secs(), "Polling for updates");

    let mut offset: Option<i64> = None;
    loop {
        let updates = tokio::select! {
            () = shutdown.cancelled() => break,
            result = gateway.get_updates(offset, timeout) => result,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, retrying");
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let update_id = update.update_id;
            match update.into_inbound() {
                Some(inbound) => dispatcher.dispatch(inbound).await,
                None => tracing::debug!(update_id, "Ignoring update"),
            }
        }
    }

    tracing::info!("Polling stopped");
}
