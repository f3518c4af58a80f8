//! Application layer for Penguin.
//!
//! This crate drives a chat session: it applies user intents to the
//! conversation, talks to the assistant gateway and stores share snapshots.

pub mod bootstrap;
pub mod chat;

pub use bootstrap::ChatBootstrap;
pub use chat::{ChatIntent, ChatOrchestrator, ChatSession, ChatSessionHandle, ChatView};
