//! Outcome delivery capability.

use modgate_types::AccountHandle;

use crate::PlatformError;

/// Trait for delivering verification outcomes back to the community.
///
/// Consumed by the orchestration layer, never by the engine itself.
pub trait ReportSink {
    /// Grant the account a standing contributor permission in the community.
    ///
    /// The backing platform rate-limits this; implementations surface that as
    /// [`PlatformError::RateLimited`] so the caller can queue a retry.
    fn grant_contributor(&self, handle: &AccountHandle) -> Result<(), PlatformError>;

    /// Post a passing verification report into the moderator-visible thread
    /// for this account.
    fn post_verified_report(
        &self,
        handle: &AccountHandle,
        report: &str,
    ) -> Result<(), PlatformError>;

    /// Post a failing verification report into the shared failed-verification
    /// conversation.
    fn post_failed_report(&self, report: &str) -> Result<(), PlatformError>;

    /// List every account currently holding the contributor permission.
    fn list_contributors(&self) -> Result<Vec<AccountHandle>, PlatformError>;
}
