//! Conversation controller
//!
//! Runs the search state machine for one inbound event at a time and turns
//! its effects into frame lookups and gateway calls.

use super::store::SearchSession;
use super::traits::{
    ChoiceButton, ConversationId, GatewayError, MessageHandle, MessagingGateway, SessionStore,
};
use super::{Inbound, InboundHandler};
use crate::frames::{FrameError, FrameSource};
use crate::state_machine::{transition, Choice, Effect, Event, SearchState, TransitionError};
use async_trait::async_trait;
use thiserror::Error;

pub const RESTART_TEXT: &str = "Great! Let's go!!";
pub const FAREWELL_TEXT: &str = "See you next time!";
pub const UNAVAILABLE_TEXT: &str =
    "Sorry, I could not load the video right now. Send /start to try again.";

pub fn probe_caption(step: u32, index: u64) -> String {
    format!("({step}) frame {index} - Has the rocket launched yet?")
}

pub fn result_caption(index: u64) -> String {
    format!("Found! Take-off = {index} - Do you want to play again?")
}

fn yes_no() -> [ChoiceButton; 2] {
    [Choice::Yes.into(), Choice::No.into()]
}

/// Treat "content unchanged" edit rejections as success
pub fn tolerate_unchanged(result: Result<(), GatewayError>) -> Result<(), GatewayError> {
    match result {
        Err(e) if e.is_content_unchanged() => {
            tracing::debug!(error = %e, "Message already up to date");
            Ok(())
        }
        other => other,
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Frames(#[from] FrameError),
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("No search session for conversation {0}")]
    NoSession(ConversationId),
    #[error("Unknown choice data {0:?}")]
    UnknownChoice(String),
    #[error("No probe message for conversation {0}")]
    MissingProbe(ConversationId),
}

impl ControllerError {
    /// Stale or malformed input rather than a fault on our side
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            ControllerError::NoSession(_)
                | ControllerError::UnknownChoice(_)
                | ControllerError::Transition(TransitionError::NotSearching)
        )
    }
}

/// Orchestrates search sessions against a frame source and a gateway
pub struct ConversationController<G, F, S>
where
    G: MessagingGateway,
    F: FrameSource,
    S: SessionStore,
{
    gateway: G,
    frames: F,
    sessions: S,
}

impl<G, F, S> ConversationController<G, F, S>
where
    G: MessagingGateway,
    F: FrameSource,
    S: SessionStore,
{
    pub fn new(gateway: G, frames: F, sessions: S) -> Self {
        Self {
            gateway,
            frames,
            sessions,
        }
    }

    /// Begin a fresh search, discarding any previous one for this conversation
    pub async fn on_start(&self, conversation: ConversationId) -> Result<(), ControllerError> {
        self.process(conversation, SearchSession::default(), Event::Start)
            .await
    }

    /// Handle a choice button press
    ///
    /// The event is acknowledged exactly once, before anything that can fail.
    pub async fn on_answer(
        &self,
        conversation: ConversationId,
        event_id: &str,
        data: &str,
    ) -> Result<(), ControllerError> {
        if let Err(e) = self.gateway.acknowledge(event_id).await {
            tracing::warn!(%conversation, error = %e, "Failed to acknowledge choice");
        }

        let choice = Choice::from_data(data)
            .ok_or_else(|| ControllerError::UnknownChoice(data.to_string()))?;
        let session = self
            .sessions
            .get(conversation)
            .await
            .ok_or(ControllerError::NoSession(conversation))?;

        match (session.state, choice) {
            (SearchState::Found { .. }, Choice::Yes) => self.on_restart(conversation, session).await,
            (SearchState::Found { .. }, Choice::No) => self.on_decline(conversation, session).await,
            _ => {
                self.process(conversation, session, Event::Answer(choice))
                    .await
            }
        }
    }

    /// "Play again": close the old result, then search again from scratch
    pub async fn on_restart(
        &self,
        conversation: ConversationId,
        session: SearchSession,
    ) -> Result<(), ControllerError> {
        tracing::info!(%conversation, "Restarting search");
        self.process(conversation, session, Event::Answer(Choice::Yes))
            .await
    }

    /// "No more": say goodbye and forget the session
    pub async fn on_decline(
        &self,
        conversation: ConversationId,
        session: SearchSession,
    ) -> Result<(), ControllerError> {
        self.process(conversation, session, Event::Answer(Choice::No))
            .await
    }

    async fn process(
        &self,
        conversation: ConversationId,
        mut session: SearchSession,
        event: Event,
    ) -> Result<(), ControllerError> {
        let mut events = vec![event];

        while let Some(event) = events.pop() {
            let result = match transition(&session.state, event) {
                Ok(r) => r,
                Err(TransitionError::EmptyDomain) => {
                    self.abandon(conversation).await;
                    return Err(TransitionError::EmptyDomain.into());
                }
                Err(e) => return Err(e.into()),
            };

            // Bounds are committed before the display is touched; a failed
            // edit leaves the search advanced.
            session.state = result.new_state;
            self.sessions.put(conversation, session.clone()).await;

            for effect in result.effects {
                if let Some(next) = self.execute_effect(conversation, &mut session, effect).await? {
                    events.push(next);
                }
            }
        }

        Ok(())
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(
        &self,
        conversation: ConversationId,
        session: &mut SearchSession,
        effect: Effect,
    ) -> Result<Option<Event>, ControllerError> {
        match effect {
            Effect::ResolveFrameCount => match self.frames.count().await {
                Ok(frame_count) => Ok(Some(Event::Begin { frame_count })),
                Err(e) => {
                    tracing::error!(%conversation, error = %e, "Could not resolve frame count");
                    self.abandon(conversation).await;
                    Err(e.into())
                }
            },

            Effect::SendProbe { index, step } => {
                let frame = self.frames.frame(index)?;
                let handle = self
                    .gateway
                    .send_choice_message(conversation, &probe_caption(step, index), &frame, &yes_no())
                    .await?;
                session.probe_ref = Some(handle);
                self.sessions.put(conversation, session.clone()).await;
                tracing::info!(%conversation, step, probe = index, "Probe sent");
                Ok(None)
            }

            Effect::SendResult { index } => {
                let frame = self.frames.frame(index)?;
                let handle = self
                    .gateway
                    .send_choice_message(conversation, &result_caption(index), &frame, &yes_no())
                    .await?;
                session.probe_ref = Some(handle);
                self.sessions.put(conversation, session.clone()).await;
                tracing::info!(%conversation, index, steps = session.state.step(), "Take-off frame found");
                Ok(None)
            }

            Effect::ShowProbe { index, step } => {
                let handle = session
                    .probe_ref
                    .ok_or(ControllerError::MissingProbe(conversation))?;
                let frame = self.frames.frame(index)?;
                tolerate_unchanged(
                    self.gateway
                        .update_choice_message(
                            &handle,
                            &probe_caption(step, index),
                            Some(&frame),
                            &yes_no(),
                        )
                        .await,
                )?;
                tracing::debug!(%conversation, step, probe = index, "Probe updated");
                Ok(None)
            }

            Effect::ShowResult {
                index,
                refresh_frame,
            } => {
                let handle = session
                    .probe_ref
                    .ok_or(ControllerError::MissingProbe(conversation))?;
                let frame = if refresh_frame {
                    Some(self.frames.frame(index)?)
                } else {
                    None
                };
                tolerate_unchanged(
                    self.gateway
                        .update_choice_message(&handle, &result_caption(index), frame.as_ref(), &yes_no())
                        .await,
                )?;
                tracing::info!(%conversation, index, steps = session.state.step(), "Take-off frame found");
                Ok(None)
            }

            Effect::AnnounceRestart { index } => {
                if let Some(handle) = session.probe_ref {
                    self.close_message(&handle, &result_caption(index)).await;
                }
                self.gateway.send_text(conversation, RESTART_TEXT).await?;
                Ok(None)
            }

            Effect::Farewell => {
                if let Some(handle) = session.probe_ref {
                    self.close_message(&handle, FAREWELL_TEXT).await;
                }
                Ok(None)
            }

            Effect::DiscardSession => {
                self.sessions.delete(conversation).await;
                tracing::info!(%conversation, "Conversation ended");
                Ok(None)
            }
        }
    }

    /// Replace the caption of a finished message and remove its buttons.
    /// The session has already moved on, so a failure is only logged.
    async fn close_message(&self, handle: &MessageHandle, text: &str) {
        let result = tolerate_unchanged(
            self.gateway
                .update_choice_message(handle, text, None, &[])
                .await,
        );
        if let Err(e) = result {
            tracing::warn!(
                conversation = %handle.conversation,
                message_id = handle.message_id,
                error = %e,
                "Failed to close finished message"
            );
        }
    }

    /// Drop the session and tell the user the search could not start
    async fn abandon(&self, conversation: ConversationId) {
        self.sessions.delete(conversation).await;
        if let Err(e) = self.gateway.send_text(conversation, UNAVAILABLE_TEXT).await {
            tracing::error!(%conversation, error = %e, "Failed to report unavailable video");
        }
    }
}

#[async_trait]
impl<G, F, S> InboundHandler for ConversationController<G, F, S>
where
    G: MessagingGateway + 'static,
    F: FrameSource + 'static,
    S: SessionStore + 'static,
{
    async fn handle(&self, inbound: Inbound) -> Result<(), ControllerError> {
        match inbound {
            Inbound::Start { conversation, user } => {
                tracing::info!(
                    %conversation,
                    user = user.as_deref().unwrap_or("unknown"),
                    "User started the conversation"
                );
                self.on_start(conversation).await
            }
            Inbound::Choice {
                conversation,
                event_id,
                data,
            } => self.on_answer(conversation, &event_id, &data).await,
        }
    }
}
