//! Inbox capability for the bot's command loop.

use modgate_types::AccountHandle;
use serde::{Deserialize, Serialize};

use crate::PlatformError;

/// A single unread item from the bot account's inbox.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: String,
    pub author: AccountHandle,
    pub subject: String,
    pub body: String,
    /// Comment replies land in the same inbox; the bot ignores them.
    pub was_comment: bool,
}

/// Trait for the bot's message traffic.
pub trait Mailbox {
    /// Fetch the currently unread inbox items, oldest first.
    fn unread(&self) -> Result<Vec<InboxMessage>, PlatformError>;

    /// Mark an inbox item as read.
    fn mark_read(&self, id: &str) -> Result<(), PlatformError>;

    /// Reply to an inbox item.
    fn reply(&self, id: &str, body: &str) -> Result<(), PlatformError>;

    /// List the moderators of the community the bot serves.
    fn list_moderators(&self) -> Result<Vec<AccountHandle>, PlatformError>;

    /// Send a direct message to an account (used to alert the operator).
    fn send_message(
        &self,
        to: &AccountHandle,
        subject: &str,
        body: &str,
    ) -> Result<(), PlatformError>;
}
