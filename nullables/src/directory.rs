//! Nullable account directory — deterministic lookups for testing.

use std::collections::HashMap;

use modgate_platform::{AccountDirectory, PlatformError};
use modgate_types::{Account, AccountHandle, Comment, CommunityId, ModNote};

/// A directory backed by programmable in-memory data.
///
/// Handles with no registered account resolve to a not-found fault, matching
/// how the real directory reports unknown accounts.
#[derive(Default)]
pub struct NullDirectory {
    accounts: HashMap<AccountHandle, Account>,
    comments: HashMap<AccountHandle, Vec<Comment>>,
    notes: HashMap<(AccountHandle, CommunityId), Vec<ModNote>>,
    fail_all: Option<String>,
}

impl NullDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory whose every call fails with an API fault.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_all: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn insert_account(&mut self, account: Account) {
        self.accounts.insert(account.handle.clone(), account);
    }

    pub fn insert_comments(&mut self, handle: impl Into<AccountHandle>, comments: Vec<Comment>) {
        self.comments.insert(handle.into(), comments);
    }

    pub fn insert_notes(
        &mut self,
        handle: impl Into<AccountHandle>,
        community: impl Into<CommunityId>,
        notes: Vec<ModNote>,
    ) {
        self.notes.insert((handle.into(), community.into()), notes);
    }

    fn check_fault(&self) -> Result<(), PlatformError> {
        match &self.fail_all {
            Some(message) => Err(PlatformError::Api(message.clone())),
            None => Ok(()),
        }
    }
}

impl AccountDirectory for NullDirectory {
    fn resolve(&self, handle: &AccountHandle) -> Result<Account, PlatformError> {
        self.check_fault()?;
        self.accounts
            .get(handle)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(handle.to_string()))
    }

    fn list_comments(
        &self,
        handle: &AccountHandle,
        limit: usize,
    ) -> Result<Vec<Comment>, PlatformError> {
        self.check_fault()?;
        Ok(self
            .comments
            .get(handle)
            .map(|comments| comments.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn list_mod_notes(
        &self,
        handle: &AccountHandle,
        community: &CommunityId,
    ) -> Result<Vec<ModNote>, PlatformError> {
        self.check_fault()?;
        Ok(self
            .notes
            .get(&(handle.clone(), community.clone()))
            .cloned()
            .unwrap_or_default())
    }
}
