//! Chat domain module.
//!
//! # Module Structure
//!
//! - `message`: Message, role, attachment and id types
//! - `conversation`: The append-only conversation log (`Conversation`)
//! - `pending`: Transient request state (`ChatPhase`, `PendingState`)

mod conversation;
mod message;
mod pending;

pub use conversation::{Conversation, GREETING, HistoryEntry};
pub use message::{Attachment, AttachmentKind, Message, MessageId, MessageRole};
pub use pending::{ChatPhase, PendingState};
