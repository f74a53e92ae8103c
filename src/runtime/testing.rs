//! Mock implementations for testing
//!
//! These mocks enable controller and dispatcher tests without real I/O.

use super::controller::ControllerError;
use super::traits::{ChoiceButton, ConversationId, GatewayError, MessageHandle, MessagingGateway};
use super::{Inbound, InboundHandler};
use crate::frames::Locator;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Messaging Gateway
// ============================================================================

/// A call made against the mock gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    SendChoice {
        conversation: ConversationId,
        text: String,
        frame: Locator,
        choices: Vec<String>,
    },
    Update {
        message_id: i64,
        text: String,
        frame: Option<Locator>,
        choices: Vec<String>,
    },
    SendText {
        conversation: ConversationId,
        text: String,
    },
    Acknowledge {
        event_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Displayed {
    text: String,
    frame: Locator,
    choices: Vec<String>,
}

/// Mock gateway that records calls and keeps message contents, rejecting
/// edits that would not change anything the way a real chat service does.
pub struct MockGateway {
    calls: Mutex<Vec<GatewayCall>>,
    messages: Mutex<HashMap<i64, Displayed>>,
    next_message_id: AtomicI64,
    update_failures: Mutex<VecDeque<GatewayError>>,
    fail_acks: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            messages: Mutex::new(HashMap::new()),
            next_message_id: AtomicI64::new(100),
            update_failures: Mutex::new(VecDeque::new()),
            fail_acks: AtomicBool::new(false),
        }
    }

    /// Get recorded calls
    pub fn recorded_calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Forget recorded calls (message contents are kept)
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Make the next `update_choice_message` fail with `error`
    pub fn fail_next_update(&self, error: GatewayError) {
        self.update_failures.lock().unwrap().push_back(error);
    }

    /// Make every acknowledgement fail
    pub fn fail_acknowledgements(&self) {
        self.fail_acks.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn choice_data(choices: &[ChoiceButton]) -> Vec<String> {
    choices.iter().map(|c| c.data.clone()).collect()
}

#[async_trait]
impl MessagingGateway for MockGateway {
    async fn send_choice_message(
        &self,
        conversation: ConversationId,
        text: &str,
        frame: &Locator,
        choices: &[ChoiceButton],
    ) -> Result<MessageHandle, GatewayError> {
        self.record(GatewayCall::SendChoice {
            conversation,
            text: text.to_string(),
            frame: frame.clone(),
            choices: choice_data(choices),
        });

        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().insert(
            message_id,
            Displayed {
                text: text.to_string(),
                frame: frame.clone(),
                choices: choice_data(choices),
            },
        );
        Ok(MessageHandle {
            conversation,
            message_id,
        })
    }

    async fn update_choice_message(
        &self,
        handle: &MessageHandle,
        text: &str,
        frame: Option<&Locator>,
        choices: &[ChoiceButton],
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::Update {
            message_id: handle.message_id,
            text: text.to_string(),
            frame: frame.cloned(),
            choices: choice_data(choices),
        });

        if let Some(error) = self.update_failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut messages = self.messages.lock().unwrap();
        let Some(current) = messages.get_mut(&handle.message_id) else {
            return Err(GatewayError::transport("Bad Request: message to edit not found"));
        };

        let next = Displayed {
            text: text.to_string(),
            frame: frame.cloned().unwrap_or_else(|| current.frame.clone()),
            choices: choice_data(choices),
        };
        if *current == next {
            return Err(GatewayError::content_unchanged(
                "Bad Request: message is not modified",
            ));
        }
        *current = next;
        Ok(())
    }

    async fn send_text(
        &self,
        conversation: ConversationId,
        text: &str,
    ) -> Result<(), GatewayError> {
        self.record(GatewayCall::SendText {
            conversation,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn acknowledge(&self, event_id: &str) -> Result<(), GatewayError> {
        self.record(GatewayCall::Acknowledge {
            event_id: event_id.to_string(),
        });
        if self.fail_acks.load(Ordering::SeqCst) {
            return Err(GatewayError::transport("query is too old"));
        }
        Ok(())
    }
}

// ============================================================================
// Recording Inbound Handler
// ============================================================================

/// Handler that records inbound events, optionally slowly or failing
pub struct RecordingHandler {
    handled: Mutex<Vec<Inbound>>,
    delay: Duration,
    fail: AtomicBool,
    /// Notified after each handled event
    pub handled_notify: Notify,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            handled: Mutex::new(Vec::new()),
            delay,
            fail: AtomicBool::new(false),
            handled_notify: Notify::new(),
        }
    }

    /// Make every handled event return an error
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn handled(&self) -> Vec<Inbound> {
        self.handled.lock().unwrap().clone()
    }

    /// Wait until at least `count` events were handled
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.handled_notify.notified();
            if self.handled.lock().unwrap().len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl InboundHandler for RecordingHandler {
    async fn handle(&self, inbound: Inbound) -> Result<(), ControllerError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let conversation = inbound.conversation();
        self.handled.lock().unwrap().push(inbound);
        self.handled_notify.notify_waiters();
        if self.fail.load(Ordering::SeqCst) {
            return Err(ControllerError::NoSession(conversation));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway_rejects_identical_edit() {
        let gateway = MockGateway::new();
        let conv = ConversationId(1);
        let frame = Locator::Url("http://frames.test/1".to_string());
        let handle = gateway
            .send_choice_message(conv, "hello", &frame, &[])
            .await
            .unwrap();

        let err = gateway
            .update_choice_message(&handle, "hello", None, &[])
            .await
            .unwrap_err();
        assert!(err.is_content_unchanged());

        gateway
            .update_choice_message(&handle, "hello again", None, &[])
            .await
            .unwrap();
        assert_eq!(gateway.recorded_calls().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_gateway_unknown_message() {
        let gateway = MockGateway::new();
        let handle = MessageHandle {
            conversation: ConversationId(1),
            message_id: 5,
        };
        let err = gateway
            .update_choice_message(&handle, "x", None, &[])
            .await
            .unwrap_err();
        assert!(!err.is_content_unchanged());
    }
}
