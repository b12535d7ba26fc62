//! Single-account processing: evaluate, deliver the outcome.

use modgate_platform::{AccountDirectory, PlatformError, ReportSink};
use modgate_store::{GrantQueueStore, QueuedGrant, StoreError};
use modgate_types::{AccountHandle, CommunityId, Timestamp};
use modgate_verification::{EligibilityThresholds, Verification};

use crate::BotError;

/// Run the verification for a single account and deliver the outcome.
///
/// On a passing verdict the account is granted the contributor permission
/// and the report is posted to its moderator-visible thread. If the platform
/// rate-limits the grant, the grant (with the already-rendered report) is
/// queued for retry instead and nothing is posted yet. Failing verdicts post
/// to the shared failed-verification conversation.
///
/// Returns the verdict and the rendered report.
pub fn process_account<D, S, Q>(
    directory: &D,
    sink: &S,
    queue: &Q,
    community: &CommunityId,
    thresholds: EligibilityThresholds,
    handle: &AccountHandle,
    now: Timestamp,
) -> Result<(bool, String), BotError>
where
    D: AccountDirectory,
    S: ReportSink,
    Q: GrantQueueStore,
{
    let mut verification = Verification::new(handle.clone(), community.clone(), thresholds);
    let passed = verification.verify(directory)?;
    let report = verification.report()?;

    if passed {
        match sink.grant_contributor(handle) {
            Ok(()) => sink.post_verified_report(handle, &report)?,
            Err(PlatformError::RateLimited(reason)) => {
                tracing::warn!("contributor grant for {handle} rate limited: {reason}");
                let grant = QueuedGrant {
                    handle: handle.clone(),
                    report: report.clone(),
                    created_at: now,
                };
                match queue.enqueue(&grant) {
                    Ok(()) => tracing::info!("queued contributor grant for {handle}"),
                    Err(StoreError::Duplicate(_)) => {
                        tracing::warn!("contributor grant for {handle} is already queued");
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        sink.post_failed_report(&report)?;
    }
    Ok((passed, report))
}
