//! Chat session orchestration.

pub mod orchestrator;
pub mod session;
pub mod view;

#[cfg(test)]
mod test_support;

pub use orchestrator::{APOLOGY, ChatOrchestrator, OutgoingRequest, SendOutcome, describe_uploads};
pub use session::{ChatIntent, ChatSession, ChatSessionHandle, IntentOutcome};
pub use view::{ChatView, ShareLink};
