//! Chat orchestrator.
//!
//! The `ChatOrchestrator` is the state machine of one chat session. It owns
//! the conversation log and the pending request state, and coordinates the
//! assistant gateway and the share repository.
//!
//! # States
//!
//! ```text
//!            send (guarded)
//!   Idle ─────────────────────▶ AwaitingAssistant
//!    ▲  ◀───────────────────────────┘
//!    │    assistant replied / assistant failed
//!    └── new chat, reply, cancel reply, share (Idle only)
//! ```
//!
//! Exactly one gateway request may be outstanding. A send while awaiting is
//! refused without error.

use super::view::{ChatView, ShareLink};
use penguin_core::auth::ChatAuthorization;
use penguin_core::chat::{
    Attachment, ChatPhase, Conversation, HistoryEntry, Message, MessageId, PendingState,
};
use penguin_core::gateway::{AssistantGateway, AssistantReply, GatewayError};
use penguin_core::share::{ShareRepository, ShareSnapshot, ShareToken, share_url};
use penguin_core::{ChatError, Result};
use std::sync::Arc;

/// Body of the assistant message appended when the gateway fails.
pub const APOLOGY: &str = "I'm sorry, I couldn't process your request right now. Please try again in a moment.";

/// A gateway request produced by an accepted send.
///
/// The caller must run it against the gateway and feed the result back
/// through [`ChatOrchestrator::complete_send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingRequest {
    /// The user message that triggered the request.
    pub user_message_id: MessageId,
    /// Text handed to the gateway.
    pub message: String,
    /// History before the triggering user message.
    pub history: Vec<HistoryEntry>,
}

/// Result of a send intent that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The user message was appended and a request was issued.
    Dispatched(OutgoingRequest),
    /// A request is already in flight; nothing changed.
    Busy,
    /// Neither text nor files; nothing changed.
    Empty,
}

impl SendOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Self::Dispatched(_))
    }
}

/// State machine of a single chat session.
///
/// One instance per session; nothing here is shared between sessions.
pub struct ChatOrchestrator {
    conversation: Conversation,
    pending: PendingState,
    share_token: Option<ShareToken>,
    share_origin: String,
    gateway: Arc<dyn AssistantGateway>,
    share_repository: Arc<dyn ShareRepository>,
    authorization: Arc<dyn ChatAuthorization>,
}

impl ChatOrchestrator {
    /// Creates a session seeded with the greeting.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Assistant backend
    /// * `share_repository` - Snapshot store used by `share`
    /// * `authorization` - "May chat" capability, consulted on every send
    /// * `share_origin` - Origin used to build share URLs
    pub fn new(
        gateway: Arc<dyn AssistantGateway>,
        share_repository: Arc<dyn ShareRepository>,
        authorization: Arc<dyn ChatAuthorization>,
        share_origin: impl Into<String>,
    ) -> Self {
        Self {
            conversation: Conversation::seed(),
            pending: PendingState::default(),
            share_token: None,
            share_origin: share_origin.into(),
            gateway,
            share_repository,
            authorization,
        }
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    pub fn phase(&self) -> ChatPhase {
        self.pending.phase
    }

    pub fn share_token(&self) -> Option<&ShareToken> {
        self.share_token.as_ref()
    }

    pub fn may_chat(&self) -> bool {
        self.authorization.may_chat()
    }

    pub fn gateway(&self) -> Arc<dyn AssistantGateway> {
        Arc::clone(&self.gateway)
    }

    /// Snapshot of everything the presentation layer renders.
    pub fn view(&self) -> ChatView {
        ChatView {
            messages: self.conversation.messages().to_vec(),
            phase: self.pending.phase,
            reply_target: self.pending.reply_target.clone(),
            share: self.share_token.as_ref().map(|token| self.share_link(token)),
            last_error: self.pending.last_error.clone(),
            may_chat: self.may_chat(),
        }
    }

    // ============================================================================
    // Send
    // ============================================================================

    /// Sends a message and awaits the assistant inline.
    ///
    /// Gateway failures are recovered into the apology message and do not
    /// surface here.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the account may not chat. Nothing is changed.
    pub async fn send(&mut self, text: &str, files: Vec<Attachment>) -> Result<SendOutcome> {
        let outcome = self.begin_send(text, files)?;
        if let SendOutcome::Dispatched(request) = &outcome {
            let result = self.gateway.ask(&request.message, &request.history).await;
            self.complete_send(result);
        }
        Ok(outcome)
    }

    /// First half of a send: validates, appends the user message and returns
    /// the request to issue.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the account may not chat. Nothing is changed.
    pub fn begin_send(&mut self, text: &str, files: Vec<Attachment>) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() && files.is_empty() {
            return Ok(SendOutcome::Empty);
        }
        if !self.authorization.may_chat() {
            tracing::warn!("Send refused: account is not approved to chat");
            return Err(ChatError::Unauthorized);
        }
        if self.pending.is_awaiting() {
            tracing::warn!("Send refused: assistant request already in flight");
            return Ok(SendOutcome::Busy);
        }

        let body = if text.is_empty() {
            describe_uploads(&files)
        } else {
            text.to_string()
        };

        // The history excludes the message being sent.
        let history = self.conversation.history();
        let message = Message::user(body.clone(), files, self.pending.reply_target.clone());
        let user_message_id = message.id.clone();
        self.conversation.push(message)?;

        self.pending.reply_target = None;
        self.pending.phase = ChatPhase::AwaitingAssistant;
        tracing::info!(
            message_id = %user_message_id,
            history_len = history.len(),
            "User message sent, awaiting assistant"
        );

        Ok(SendOutcome::Dispatched(OutgoingRequest {
            user_message_id,
            message: body,
            history,
        }))
    }

    /// Second half of a send: records the gateway result.
    pub fn complete_send(&mut self, result: std::result::Result<AssistantReply, GatewayError>) {
        match result {
            Ok(reply) => self.assistant_replied(reply.response),
            Err(err) => self.assistant_failed(&err),
        }
    }

    /// Appends the assistant's reply and returns to Idle.
    pub fn assistant_replied(&mut self, body: impl Into<String>) {
        if !self.pending.is_awaiting() {
            tracing::warn!("Ignoring assistant reply: no request in flight");
            return;
        }

        self.append_assistant(body.into());
        self.pending.last_error = None;
        tracing::info!("Assistant replied");
    }

    /// Appends the apology and returns to Idle.
    ///
    /// `reason` goes to the error log and the `last_error` banner, never into
    /// the conversation.
    pub fn assistant_failed(&mut self, reason: &dyn std::fmt::Display) {
        if !self.pending.is_awaiting() {
            tracing::warn!("Ignoring assistant failure: no request in flight");
            return;
        }

        let reason = reason.to_string();
        tracing::error!(reason = %reason, "Assistant request failed");
        self.append_assistant(APOLOGY.to_string());
        self.pending.last_error = Some(reason);
    }

    fn append_assistant(&mut self, body: String) {
        // An assistant message has no reply target and a fresh id, so the
        // append checks cannot fail.
        if let Err(err) = self.conversation.push(Message::assistant(body)) {
            tracing::error!(error = %err, "Failed to append assistant message");
        }
        self.pending.phase = ChatPhase::Idle;
    }

    // ============================================================================
    // Idle-only intents
    // ============================================================================

    /// Replaces the conversation with a fresh greeting.
    ///
    /// Returns `false` (no-op) while a request is in flight.
    pub fn new_chat(&mut self) -> bool {
        if self.refuse_while_awaiting("new chat") {
            return false;
        }

        self.conversation = Conversation::reset();
        self.pending.reply_target = None;
        self.pending.last_error = None;
        self.share_token = None;
        tracing::info!("Started a new chat");
        true
    }

    /// Marks `id` as the target of the next send.
    ///
    /// Returns `false` (no-op) if the id is unknown or a request is in flight.
    pub fn reply(&mut self, id: &MessageId) -> bool {
        if self.refuse_while_awaiting("reply") {
            return false;
        }
        if !self.conversation.contains(id) {
            tracing::debug!(message_id = %id, "Reply target not in conversation, ignoring");
            return false;
        }

        self.pending.reply_target = Some(id.clone());
        true
    }

    /// Clears the reply target.
    pub fn cancel_reply(&mut self) -> bool {
        if self.refuse_while_awaiting("cancel reply") {
            return false;
        }
        self.pending.reply_target = None;
        true
    }

    /// Stores a snapshot of the current conversation and exposes its link.
    ///
    /// Returns `Ok(None)` while a request is in flight. The conversation is
    /// not modified.
    pub async fn share(&mut self) -> Result<Option<ShareLink>> {
        if self.refuse_while_awaiting("share") {
            return Ok(None);
        }

        let token = self
            .share_repository
            .save(self.conversation.messages())
            .await?;
        let link = self.share_link(&token);
        tracing::info!(token = %token, url = %link.url, "Conversation shared");

        self.share_token = Some(token);
        Ok(Some(link))
    }

    /// Loads a previously shared conversation for read-only display.
    pub async fn open_shared(&self, token: &ShareToken) -> Result<Option<ShareSnapshot>> {
        self.share_repository.load(token).await
    }

    fn share_link(&self, token: &ShareToken) -> ShareLink {
        ShareLink {
            token: token.clone(),
            url: share_url(&self.share_origin, token),
        }
    }

    fn refuse_while_awaiting(&self, intent: &str) -> bool {
        if self.pending.is_awaiting() {
            tracing::warn!(intent, "Intent refused: assistant request in flight");
            true
        } else {
            false
        }
    }
}

/// Body of a message that carries files but no text.
pub fn describe_uploads(files: &[Attachment]) -> String {
    let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
    format!("Uploaded {} file(s): {}", files.len(), names.join(", "))
}
