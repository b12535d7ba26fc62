//! Nullable report sink — records outcome deliveries for inspection.

use std::cell::{Cell, RefCell};

use modgate_platform::{PlatformError, ReportSink};
use modgate_types::AccountHandle;

/// A sink that records everything delivered to it.
///
/// Can be armed to rate-limit grant attempts, mimicking the platform's
/// contributor-grant throttle.
#[derive(Default)]
pub struct NullSink {
    rate_limited_grants: Cell<u32>,
    granted: RefCell<Vec<AccountHandle>>,
    contributors: RefCell<Vec<AccountHandle>>,
    verified_reports: RefCell<Vec<(AccountHandle, String)>>,
    failed_reports: RefCell<Vec<String>>,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` grant attempts fail with a rate-limit fault.
    pub fn rate_limit_next(&self, count: u32) {
        self.rate_limited_grants.set(count);
    }

    /// Seed the contributor list (accounts granted before the test started).
    pub fn seed_contributor(&self, handle: impl Into<AccountHandle>) {
        self.contributors.borrow_mut().push(handle.into());
    }

    /// Handles granted during the test, in order.
    pub fn granted(&self) -> Vec<AccountHandle> {
        self.granted.borrow().clone()
    }

    pub fn verified_reports(&self) -> Vec<(AccountHandle, String)> {
        self.verified_reports.borrow().clone()
    }

    pub fn failed_reports(&self) -> Vec<String> {
        self.failed_reports.borrow().clone()
    }
}

impl ReportSink for NullSink {
    fn grant_contributor(&self, handle: &AccountHandle) -> Result<(), PlatformError> {
        let remaining = self.rate_limited_grants.get();
        if remaining > 0 {
            self.rate_limited_grants.set(remaining - 1);
            return Err(PlatformError::RateLimited(
                "contributor grants throttled".to_string(),
            ));
        }
        self.granted.borrow_mut().push(handle.clone());
        self.contributors.borrow_mut().push(handle.clone());
        Ok(())
    }

    fn post_verified_report(
        &self,
        handle: &AccountHandle,
        report: &str,
    ) -> Result<(), PlatformError> {
        self.verified_reports
            .borrow_mut()
            .push((handle.clone(), report.to_string()));
        Ok(())
    }

    fn post_failed_report(&self, report: &str) -> Result<(), PlatformError> {
        self.failed_reports.borrow_mut().push(report.to_string());
        Ok(())
    }

    fn list_contributors(&self) -> Result<Vec<AccountHandle>, PlatformError> {
        Ok(self.contributors.borrow().clone())
    }
}
