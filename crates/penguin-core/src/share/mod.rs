//! Conversation sharing domain module.
//!
//! - `model`: Snapshot and token types (`ShareSnapshot`, `ShareToken`)
//! - `repository`: Repository trait for snapshot persistence

mod model;
mod repository;

pub use model::{ShareSnapshot, ShareToken, share_url};
pub use repository::ShareRepository;
