//! Conversation core of the Penguin chat client.
//!
//! This crate holds the domain: the message log, the content parser, and the
//! contracts of the external collaborators (assistant gateway, snapshot store,
//! account authorization). It performs no I/O itself.

pub mod auth;
pub mod chat;
pub mod config;
pub mod content;
pub mod error;
pub mod gateway;
pub mod share;

// Re-export common error type
pub use error::{ChatError, Result};
