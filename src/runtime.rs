//! Runtime for executing conversations
//!
//! Inbound events are routed to one worker task per conversation, so events
//! for the same chat are handled strictly in order while different chats
//! proceed in parallel.

mod controller;
mod store;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use controller::{ControllerError, ConversationController};
pub use store::MemorySessionStore;
#[allow(unused_imports)] // Part of the SessionStore interface
pub use store::SearchSession;
pub use traits::*;

use crate::frames::FrameXSource;
use crate::telegram::TelegramGateway;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Type alias for production controller with concrete implementations
pub type ProductionController =
    ConversationController<Arc<TelegramGateway>, FrameXSource, MemorySessionStore>;

/// Queue depth per conversation worker
const WORKER_QUEUE: usize = 32;

/// How long a worker waits for its next event before shutting down
const WORKER_IDLE_TIMEOUT: Duration = Duration::from_secs(600);

type WorkerMap = Arc<RwLock<HashMap<ConversationId, mpsc::Sender<Inbound>>>>;

/// Inbound events, already stripped of transport details
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `/start` command
    Start {
        conversation: ConversationId,
        user: Option<String>,
    },
    /// Choice button pressed; `event_id` must be acknowledged
    Choice {
        conversation: ConversationId,
        event_id: String,
        data: String,
    },
}

impl Inbound {
    pub fn conversation(&self) -> ConversationId {
        match self {
            Inbound::Start { conversation, .. } | Inbound::Choice { conversation, .. } => {
                *conversation
            }
        }
    }
}

/// Something that handles inbound events for a conversation
#[async_trait]
pub trait InboundHandler: Send + Sync + 'static {
    async fn handle(&self, inbound: Inbound) -> Result<(), ControllerError>;
}

/// Routes inbound events to per-conversation workers
///
/// Enqueueing never waits: a conversation whose queue is full drops the
/// event, so one flooding chat cannot hold up the others. Every send happens
/// under the map lock, and an idle worker only removes itself under the
/// write lock, so no event is lost to a worker that is shutting down.
pub struct ConversationDispatcher {
    handler: Arc<dyn InboundHandler>,
    workers: WorkerMap,
    idle_timeout: Duration,
}

impl ConversationDispatcher {
    pub fn new(handler: Arc<dyn InboundHandler>) -> Self {
        Self::with_idle_timeout(handler, WORKER_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(handler: Arc<dyn InboundHandler>, idle_timeout: Duration) -> Self {
        Self {
            handler,
            workers: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Queue an event for its conversation, starting a worker if needed
    pub async fn dispatch(&self, inbound: Inbound) {
        let conversation = inbound.conversation();

        let inbound = {
            let workers = self.workers.read().await;
            match workers.get(&conversation) {
                Some(tx) => match offer(conversation, tx, inbound) {
                    Some(inbound) => inbound,
                    None => return,
                },
                None => inbound,
            }
        };

        let mut workers = self.workers.write().await;
        let inbound = match workers.get(&conversation) {
            Some(tx) => match offer(conversation, tx, inbound) {
                Some(inbound) => inbound,
                None => return,
            },
            None => inbound,
        };

        // No worker, or its task died: start a fresh one
        let (tx, rx) = mpsc::channel(WORKER_QUEUE);
        tokio::spawn(run_worker(
            self.handler.clone(),
            self.workers.clone(),
            conversation,
            rx,
            self.idle_timeout,
        ));
        tracing::debug!(%conversation, "Started conversation worker");
        offer(conversation, &tx, inbound);
        workers.insert(conversation, tx);
    }

    /// Number of conversations with a running worker
    #[allow(dead_code)] // Diagnostics
    pub async fn worker_count(&self) -> usize {
        self.workers.read().await.len()
    }
}

/// Try to enqueue without waiting. Returns the event back only when the
/// worker is gone and a new one is needed.
fn offer(
    conversation: ConversationId,
    tx: &mpsc::Sender<Inbound>,
    inbound: Inbound,
) -> Option<Inbound> {
    match tx.try_send(inbound) {
        Ok(()) => None,
        Err(TrySendError::Full(dropped)) => {
            tracing::warn!(
                %conversation,
                event = ?dropped,
                "Conversation queue full, dropping event"
            );
            None
        }
        Err(TrySendError::Closed(inbound)) => Some(inbound),
    }
}

async fn run_worker(
    handler: Arc<dyn InboundHandler>,
    workers: WorkerMap,
    conversation: ConversationId,
    mut rx: mpsc::Receiver<Inbound>,
    idle_timeout: Duration,
) {
    loop {
        let inbound = match tokio::time::timeout(idle_timeout, rx.recv()).await {
            Ok(Some(inbound)) => inbound,
            Ok(None) => break,
            Err(_) => {
                // Senders only push under the map lock, so with the write
                // lock held the queue cannot grow behind our back.
                let mut workers = workers.write().await;
                match rx.try_recv() {
                    Ok(inbound) => inbound,
                    Err(_) => {
                        workers.remove(&conversation);
                        break;
                    }
                }
            }
        };

        match handler.handle(inbound).await {
            Ok(()) => {}
            Err(e) if e.is_benign() => {
                tracing::warn!(%conversation, error = %e, "Ignored event");
            }
            Err(e) => {
                tracing::error!(%conversation, error = %e, "Error handling event");
            }
        }
    }
    tracing::debug!(%conversation, "Conversation worker stopped");
}
