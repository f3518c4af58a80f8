//! Chat authorization.
//!
//! Accounts are managed outside the chat core. The core only asks one
//! question before every send: may this account chat?

/// Notice shown instead of the chat while an account awaits approval.
pub const PENDING_APPROVAL_NOTICE: &str = "Your account is pending admin approval. Please wait for approval to use the AI.";

/// Capability check consulted on every send.
///
/// This trait abstracts the account approval workflow, allowing different
/// implementations (static flags, a profile service, test doubles).
pub trait ChatAuthorization: Send + Sync {
    /// Returns `true` if the current account may chat.
    fn may_chat(&self) -> bool;
}

/// Approval flags of the signed-in account's profile.
///
/// # Example
///
/// ```
/// use penguin_core::auth::{AccountStatus, ChatAuthorization};
///
/// assert!(AccountStatus::admin().may_chat());
/// assert!(!AccountStatus::pending().may_chat());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccountStatus {
    pub approved: bool,
    pub admin: bool,
}

impl AccountStatus {
    pub fn approved() -> Self {
        Self {
            approved: true,
            admin: false,
        }
    }

    pub fn admin() -> Self {
        Self {
            approved: false,
            admin: true,
        }
    }

    pub fn pending() -> Self {
        Self::default()
    }
}

impl ChatAuthorization for AccountStatus {
    fn may_chat(&self) -> bool {
        self.approved || self.admin
    }
}
