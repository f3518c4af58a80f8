//! Read-only projection of a chat session for the presentation layer.

use penguin_core::auth::PENDING_APPROVAL_NOTICE;
use penguin_core::chat::{ChatPhase, Message, MessageId};
use penguin_core::share::ShareToken;
use serde::{Deserialize, Serialize};

/// A stored share and the URL that opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub token: ShareToken,
    pub url: String,
}

/// Everything needed to render one chat session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub phase: ChatPhase,
    pub reply_target: Option<MessageId>,
    pub share: Option<ShareLink>,
    /// Reason of the most recent gateway failure, cleared on success.
    pub last_error: Option<String>,
    pub may_chat: bool,
}

impl ChatView {
    /// Whether the typing indicator should be shown.
    pub fn is_typing(&self) -> bool {
        self.phase == ChatPhase::AwaitingAssistant
    }

    /// Whether the input should accept a send.
    pub fn can_send(&self) -> bool {
        self.may_chat && !self.is_typing()
    }

    /// Notice shown instead of the input, if any.
    pub fn notice(&self) -> Option<&'static str> {
        (!self.may_chat).then_some(PENDING_APPROVAL_NOTICE)
    }

    /// The message the next send will reply to.
    pub fn reply_message(&self) -> Option<&Message> {
        let target = self.reply_target.as_ref()?;
        self.messages.iter().find(|message| &message.id == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use penguin_core::chat::Conversation;

    fn view(phase: ChatPhase, may_chat: bool) -> ChatView {
        ChatView {
            messages: Conversation::seed().into_messages(),
            phase,
            reply_target: None,
            share: None,
            last_error: None,
            may_chat,
        }
    }

    #[test]
    fn test_typing_blocks_send() {
        let awaiting = view(ChatPhase::AwaitingAssistant, true);
        assert!(awaiting.is_typing());
        assert!(!awaiting.can_send());

        let idle = view(ChatPhase::Idle, true);
        assert!(!idle.is_typing());
        assert!(idle.can_send());
        assert!(idle.notice().is_none());
    }

    #[test]
    fn test_pending_account_shows_notice() {
        let pending = view(ChatPhase::Idle, false);
        assert!(!pending.can_send());
        assert_eq!(pending.notice(), Some(PENDING_APPROVAL_NOTICE));
    }

    #[test]
    fn test_reply_message_lookup() {
        let mut idle = view(ChatPhase::Idle, true);
        assert!(idle.reply_message().is_none());

        let greeting = idle.messages[0].id.clone();
        idle.reply_target = Some(greeting.clone());
        assert_eq!(idle.reply_message().map(|m| &m.id), Some(&greeting));
    }
}
