//! Read-only account lookup capability.

use modgate_types::{Account, AccountHandle, Comment, CommunityId, ModNote};

use crate::PlatformError;

/// Trait for resolving accounts and fetching their history.
///
/// Account lookups are expected to fail with [`PlatformError::NotFound`] for
/// handles that never existed or were deleted; callers treat that as data,
/// not as a fault. Any other error is a genuine platform fault.
pub trait AccountDirectory {
    /// Resolve a handle to a platform account.
    fn resolve(&self, handle: &AccountHandle) -> Result<Account, PlatformError>;

    /// Fetch up to `limit` of the account's most recent comments across all
    /// communities, newest first. The backing API caps how far back this can
    /// reach, so the result is not exhaustive history.
    fn list_comments(
        &self,
        handle: &AccountHandle,
        limit: usize,
    ) -> Result<Vec<Comment>, PlatformError>;

    /// Fetch all moderation notes for the account within one community.
    fn list_mod_notes(
        &self,
        handle: &AccountHandle,
        community: &CommunityId,
    ) -> Result<Vec<ModNote>, PlatformError>;
}
