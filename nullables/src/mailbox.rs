//! Nullable mailbox — scripted inbox traffic for testing.

use std::cell::RefCell;

use modgate_platform::{InboxMessage, Mailbox, PlatformError};
use modgate_types::AccountHandle;

#[derive(Default)]
pub struct NullMailbox {
    unread: RefCell<Vec<InboxMessage>>,
    read_ids: RefCell<Vec<String>>,
    replies: RefCell<Vec<(String, String)>>,
    moderators: RefCell<Vec<AccountHandle>>,
    sent_messages: RefCell<Vec<(AccountHandle, String, String)>>,
}

impl NullMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a message into the unread queue.
    pub fn push_message(&self, message: InboxMessage) {
        self.unread.borrow_mut().push(message);
    }

    pub fn set_moderators(&self, moderators: Vec<AccountHandle>) {
        *self.moderators.borrow_mut() = moderators;
    }

    pub fn read_ids(&self) -> Vec<String> {
        self.read_ids.borrow().clone()
    }

    /// Replies sent during the test as `(message id, body)` pairs.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.borrow().clone()
    }

    /// Direct messages sent during the test as `(to, subject, body)` triples.
    pub fn sent_messages(&self) -> Vec<(AccountHandle, String, String)> {
        self.sent_messages.borrow().clone()
    }
}

impl Mailbox for NullMailbox {
    fn unread(&self) -> Result<Vec<InboxMessage>, PlatformError> {
        Ok(self.unread.borrow().clone())
    }

    fn mark_read(&self, id: &str) -> Result<(), PlatformError> {
        self.unread.borrow_mut().retain(|m| m.id != id);
        self.read_ids.borrow_mut().push(id.to_string());
        Ok(())
    }

    fn reply(&self, id: &str, body: &str) -> Result<(), PlatformError> {
        self.replies
            .borrow_mut()
            .push((id.to_string(), body.to_string()));
        Ok(())
    }

    fn list_moderators(&self) -> Result<Vec<AccountHandle>, PlatformError> {
        Ok(self.moderators.borrow().clone())
    }

    fn send_message(
        &self,
        to: &AccountHandle,
        subject: &str,
        body: &str,
    ) -> Result<(), PlatformError> {
        self.sent_messages
            .borrow_mut()
            .push((to.clone(), subject.to_string(), body.to_string()));
        Ok(())
    }
}
