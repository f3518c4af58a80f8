//! Event-queue runner around [`ChatOrchestrator`].
//!
//! All intents and gateway completions go through one queue and are applied
//! by a single task, so transitions never interleave. Gateway calls run on
//! their own tasks and report back through the same queue. The latest
//! [`ChatView`] is published on a watch channel after every event.

use super::orchestrator::{ChatOrchestrator, SendOutcome};
use super::view::{ChatView, ShareLink};
use penguin_core::chat::{Attachment, HistoryEntry, MessageId};
use penguin_core::gateway::{AssistantReply, GatewayError};
use penguin_core::share::{ShareSnapshot, ShareToken};
use penguin_core::{ChatError, Result};
use tokio::sync::{mpsc, oneshot, watch};

/// User intents accepted by a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatIntent {
    Send {
        text: String,
        files: Vec<Attachment>,
    },
    Reply(MessageId),
    CancelReply,
    NewChat,
    Share,
    OpenShared(ShareToken),
}

/// What an intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Sent(SendOutcome),
    /// `false` when the intent was refused as a no-op.
    Applied(bool),
    Shared(Option<ShareLink>),
    Opened(Option<ShareSnapshot>),
}

enum SessionEvent {
    Intent {
        intent: ChatIntent,
        respond_to: oneshot::Sender<Result<IntentOutcome>>,
    },
    AssistantFinished(std::result::Result<AssistantReply, GatewayError>),
    Shutdown,
}

/// Owner of the session task.
pub struct ChatSession {
    orchestrator: ChatOrchestrator,
    events: mpsc::WeakUnboundedSender<SessionEvent>,
    inbox: mpsc::UnboundedReceiver<SessionEvent>,
    view: watch::Sender<ChatView>,
}

impl ChatSession {
    /// Starts the session task and returns a handle to it.
    ///
    /// Must be called from within a Tokio runtime. The task stops when every
    /// handle is dropped or [`ChatSessionHandle::shutdown`] is called.
    pub fn spawn(orchestrator: ChatOrchestrator) -> ChatSessionHandle {
        let (events, inbox) = mpsc::unbounded_channel();
        let (view, view_rx) = watch::channel(orchestrator.view());

        let session = Self {
            orchestrator,
            events: events.downgrade(),
            inbox,
            view,
        };
        tokio::spawn(session.run());

        ChatSessionHandle {
            events,
            view: view_rx,
        }
    }

    async fn run(mut self) {
        tracing::debug!("Chat session started");

        while let Some(event) = self.inbox.recv().await {
            match event {
                SessionEvent::Intent { intent, respond_to } => {
                    let outcome = self.apply(intent).await;
                    // Publish first so the caller sees the new view on return.
                    self.publish();
                    let _ = respond_to.send(outcome);
                }
                SessionEvent::AssistantFinished(result) => {
                    self.orchestrator.complete_send(result);
                    self.publish();
                }
                SessionEvent::Shutdown => break,
            }
        }

        tracing::debug!("Chat session stopped");
    }

    fn publish(&self) {
        self.view.send_replace(self.orchestrator.view());
    }

    async fn apply(&mut self, intent: ChatIntent) -> Result<IntentOutcome> {
        match intent {
            ChatIntent::Send { text, files } => {
                let outcome = self.orchestrator.begin_send(&text, files)?;
                if let SendOutcome::Dispatched(request) = &outcome {
                    self.dispatch_to_gateway(request.message.clone(), request.history.clone());
                }
                Ok(IntentOutcome::Sent(outcome))
            }
            ChatIntent::Reply(id) => Ok(IntentOutcome::Applied(self.orchestrator.reply(&id))),
            ChatIntent::CancelReply => Ok(IntentOutcome::Applied(self.orchestrator.cancel_reply())),
            ChatIntent::NewChat => Ok(IntentOutcome::Applied(self.orchestrator.new_chat())),
            ChatIntent::Share => Ok(IntentOutcome::Shared(self.orchestrator.share().await?)),
            ChatIntent::OpenShared(token) => Ok(IntentOutcome::Opened(
                self.orchestrator.open_shared(&token).await?,
            )),
        }
    }

    fn dispatch_to_gateway(&self, message: String, history: Vec<HistoryEntry>) {
        let gateway = self.orchestrator.gateway();
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = gateway.ask(&message, &history).await;
            match events.upgrade() {
                Some(events) => {
                    let _ = events.send(SessionEvent::AssistantFinished(result));
                }
                None => tracing::debug!("Session closed before the assistant answered"),
            }
        });
    }
}

/// Cloneable handle used by the presentation layer.
#[derive(Clone)]
pub struct ChatSessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    view: watch::Receiver<ChatView>,
}

impl ChatSessionHandle {
    /// Queues an intent and waits until it has been applied.
    ///
    /// For a send this returns once the user message is appended, not when
    /// the assistant answers. Watch [`subscribe`](Self::subscribe) for that.
    pub async fn dispatch(&self, intent: ChatIntent) -> Result<IntentOutcome> {
        let (respond_to, response) = oneshot::channel();
        self.events
            .send(SessionEvent::Intent { intent, respond_to })
            .map_err(|_| session_stopped())?;
        response.await.map_err(|_| session_stopped())?
    }

    pub async fn send(&self, text: impl Into<String>, files: Vec<Attachment>) -> Result<SendOutcome> {
        match self
            .dispatch(ChatIntent::Send {
                text: text.into(),
                files,
            })
            .await?
        {
            IntentOutcome::Sent(outcome) => Ok(outcome),
            other => Err(ChatError::internal(format!("unexpected outcome for send: {other:?}"))),
        }
    }

    /// Current view.
    pub fn view(&self) -> ChatView {
        self.view.borrow().clone()
    }

    /// Receiver notified after every applied event.
    pub fn subscribe(&self) -> watch::Receiver<ChatView> {
        self.view.clone()
    }

    /// Waits until no assistant request is in flight and returns that view.
    pub async fn wait_idle(&self) -> Result<ChatView> {
        let mut view = self.view.clone();
        let idle = view
            .wait_for(|view| !view.is_typing())
            .await
            .map_err(|_| session_stopped())?;
        Ok(idle.clone())
    }

    /// Stops the session task after already queued events.
    pub fn shutdown(&self) {
        let _ = self.events.send(SessionEvent::Shutdown);
    }
}

fn session_stopped() -> ChatError {
    ChatError::internal("chat session has stopped")
}
