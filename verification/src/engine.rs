//! The eligibility pipeline.
//!
//! One [`Verification`] is created per evaluation and discarded after the
//! report is rendered. Stages run in a fixed order and short-circuit: account
//! status, then moderation notes, then comment history. A later stage never
//! runs once an earlier stage disqualifies.

use std::collections::BTreeMap;

use modgate_platform::{AccountDirectory, PlatformError};
use modgate_types::{note_kind, AccountHandle, Comment, CommunityId, Timestamp};

use crate::report;
use crate::thresholds::EligibilityThresholds;
use crate::{VerificationError, COMMENT_SCAN_LIMIT};

/// Outcome of an evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Unevaluated,
    Failed,
    Passed,
}

/// Analyzes an account's activity history and renders a report on it.
///
/// Single-use: `verify` resolves the verdict exactly once, and `report` may
/// only be called afterwards.
pub struct Verification {
    handle: AccountHandle,
    community: CommunityId,
    thresholds: EligibilityThresholds,
    verdict: Verdict,
    /// Human-readable disqualification reason. First writer wins; set if and
    /// only if the verdict resolves to `Failed`.
    error: Option<String>,
    account_created: Option<Timestamp>,
    found_comments: u64,
    /// In-community comments, ascending by creation time after the scan.
    comments: Vec<Comment>,
    /// Comment count per community, in discovery order.
    community_activity: Vec<(CommunityId, u64)>,
    note_kinds: BTreeMap<String, u64>,
    karma: Option<i64>,
    karma_average: Option<f64>,
}

impl Verification {
    pub fn new(
        handle: AccountHandle,
        community: CommunityId,
        thresholds: EligibilityThresholds,
    ) -> Self {
        Self {
            handle,
            community,
            thresholds,
            verdict: Verdict::Unevaluated,
            error: None,
            account_created: None,
            found_comments: 0,
            comments: Vec::new(),
            community_activity: Vec::new(),
            note_kinds: BTreeMap::new(),
            karma: None,
            karma_average: None,
        }
    }

    /// Run the eligibility pipeline and resolve the verdict.
    ///
    /// Returns the verdict as a bool. Calling this a second time is a
    /// contract violation and fails with
    /// [`VerificationError::AlreadyEvaluated`]. A platform fault (anything
    /// other than the resolver's not-found signal) propagates and leaves the
    /// verdict unevaluated.
    pub fn verify<D: AccountDirectory>(
        &mut self,
        directory: &D,
    ) -> Result<bool, VerificationError> {
        if self.verdict != Verdict::Unevaluated {
            return Err(VerificationError::AlreadyEvaluated);
        }

        self.check_account(directory)?;
        let passed = if self.error.is_some() {
            false
        } else if !self.check_notes(directory)? {
            false
        } else {
            self.check_comments(directory)?
        };

        self.verdict = if passed { Verdict::Passed } else { Verdict::Failed };
        Ok(passed)
    }

    /// Render the final report text.
    ///
    /// Calling this before `verify` has resolved a verdict is a contract
    /// violation, never a partial report.
    pub fn report(&self) -> Result<String, VerificationError> {
        match self.verdict {
            Verdict::Unevaluated => Err(VerificationError::NotYetEvaluated),
            Verdict::Passed => Ok(report::results(self)),
            Verdict::Failed => {
                let reason = self
                    .error
                    .as_deref()
                    .expect("failed verdict always records a reason");
                Ok(format!(
                    "u/{}: verification fail\n\nAccount {}",
                    self.handle, reason
                ))
            }
        }
    }

    /// Account-status stage. Disqualifies by recording `error`; only a
    /// genuine platform fault becomes an `Err`.
    fn check_account<D: AccountDirectory>(
        &mut self,
        directory: &D,
    ) -> Result<(), VerificationError> {
        let account = match directory.resolve(&self.handle) {
            Ok(account) => account,
            Err(PlatformError::NotFound(_)) => {
                self.error = Some("is not found. No history information available.".to_string());
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        self.account_created = Some(account.created);

        if account.suspended {
            self.error = Some("is suspended. No history information available.".to_string());
            return Ok(());
        }

        if account.created > self.thresholds.created {
            self.error = Some(format!(
                "was created too recently ({}). Skipped history collection.",
                account.created
            ));
        }
        Ok(())
    }

    /// Moderation-note stage. Tallies every note kind; only bans and mutes
    /// gate the verdict, bans first. Returns whether evaluation continues.
    fn check_notes<D: AccountDirectory>(
        &mut self,
        directory: &D,
    ) -> Result<bool, VerificationError> {
        for note in directory.list_mod_notes(&self.handle, &self.community)? {
            *self.note_kinds.entry(note.kind).or_insert(0) += 1;
        }

        let bans = self.note_kinds.get(note_kind::BAN).copied().unwrap_or(0);
        if bans > 0 {
            self.error = Some(format!("has {bans} ban(s). Skipped history collection."));
            return Ok(false);
        }
        let mutes = self.note_kinds.get(note_kind::MUTE).copied().unwrap_or(0);
        if mutes > 0 {
            self.error = Some(format!("has {mutes} mute(s). Skipped history collection."));
            return Ok(false);
        }
        Ok(true)
    }

    /// Comment-history stage. Returns the final verdict of the pipeline.
    fn check_comments<D: AccountDirectory>(
        &mut self,
        directory: &D,
    ) -> Result<bool, VerificationError> {
        tracing::info!("fetching comments for {}", self.handle);
        for comment in directory.list_comments(&self.handle, COMMENT_SCAN_LIMIT)? {
            self.found_comments += 1;
            self.tally_community(&comment.community);
            if comment.community == self.community {
                self.comments.push(comment);
            }
        }
        self.comments.sort_by_key(|c| c.created);

        if self.comments.is_empty() {
            self.error = Some(format!("has no r/{} history.", self.community));
            return Ok(false);
        }

        let oldest = self.comments[0].created;
        if oldest > self.thresholds.positive_karma {
            self.error = Some(format!(
                "oldest r/{} comment is too recent ({oldest})",
                self.community
            ));
            return Ok(false);
        }

        let karma: i64 = self.comments.iter().map(|c| c.score).sum();
        let karma_average = karma as f64 / self.comments.len() as f64;
        self.karma = Some(karma);
        self.karma_average = Some(karma_average);

        if oldest > self.thresholds.history && karma_average < 1.0 {
            self.error = Some("too low of karma average".to_string());
            return Ok(false);
        }
        Ok(true)
    }

    fn tally_community(&mut self, community: &CommunityId) {
        match self
            .community_activity
            .iter_mut()
            .find(|(c, _)| c == community)
        {
            Some((_, count)) => *count += 1,
            None => self.community_activity.push((community.clone(), 1)),
        }
    }

    pub fn handle(&self) -> &AccountHandle {
        &self.handle
    }

    pub fn community(&self) -> &CommunityId {
        &self.community
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// The recorded disqualification reason, if the verdict failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the account was created, if the resolver found it.
    pub fn account_created(&self) -> Option<Timestamp> {
        self.account_created
    }

    /// Comments scanned across all communities.
    pub fn found_comments(&self) -> u64 {
        self.found_comments
    }

    /// In-community comments, ascending by creation time.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Comment count per community, in discovery order.
    pub fn community_activity(&self) -> &[(CommunityId, u64)] {
        &self.community_activity
    }

    /// Occurrences per note kind in the target community.
    pub fn note_kinds(&self) -> &BTreeMap<String, u64> {
        &self.note_kinds
    }

    pub fn karma(&self) -> Option<i64> {
        self.karma
    }

    pub fn karma_average(&self) -> Option<f64> {
        self.karma_average
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgate_nullables::NullDirectory;
    use modgate_types::{Account, ModNote};

    const CREATED_CUTOFF: u64 = 1_750_000_000;
    const HISTORY_CUTOFF: u64 = 1_730_000_000;
    const POSITIVE_KARMA_CUTOFF: u64 = 1_737_000_000;

    fn thresholds() -> EligibilityThresholds {
        EligibilityThresholds::new(
            Timestamp::new(CREATED_CUTOFF),
            Timestamp::new(HISTORY_CUTOFF),
            Timestamp::new(POSITIVE_KARMA_CUTOFF),
        )
    }

    fn account(name: &str, created: u64) -> Account {
        Account {
            handle: AccountHandle::new(name),
            created: Timestamp::new(created),
            suspended: false,
        }
    }

    fn comment(community: &str, created: u64, score: i64) -> Comment {
        Comment {
            community: CommunityId::new(community),
            created: Timestamp::new(created),
            score,
        }
    }

    fn engine(name: &str) -> Verification {
        Verification::new(
            AccountHandle::new(name),
            CommunityId::new("santabarbara"),
            thresholds(),
        )
    }

    #[test]
    fn not_found() {
        let directory = NullDirectory::new();
        let mut verification = engine("notfound");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/notfound: verification fail\n\nAccount is not found. No history information available."
        );
    }

    #[test]
    fn suspended() {
        let mut directory = NullDirectory::new();
        let mut suspended = account("suspended", CREATED_CUTOFF);
        suspended.suspended = true;
        directory.insert_account(suspended);

        let mut verification = engine("suspended");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/suspended: verification fail\n\nAccount is suspended. No history information available."
        );
    }

    #[test]
    fn created_too_recently() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("toonew", CREATED_CUTOFF + 1));

        let mut verification = engine("toonew");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            format!(
                "u/toonew: verification fail\n\nAccount was created too recently ({}). Skipped history collection.",
                Timestamp::new(CREATED_CUTOFF + 1)
            )
        );
    }

    #[test]
    fn created_at_cutoff_clears_account_stage() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("boundary", CREATED_CUTOFF));

        let mut verification = engine("boundary");
        assert!(!verification.verify(&directory).unwrap());
        // The failure comes from the history stage, so the age check passed.
        assert_eq!(
            verification.error(),
            Some("has no r/santabarbara history.")
        );
    }

    #[test]
    fn single_ban() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("hasban", CREATED_CUTOFF));
        directory.insert_notes("hasban", "santabarbara", vec![ModNote::new("BAN")]);

        let mut verification = engine("hasban");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/hasban: verification fail\n\nAccount has 1 ban(s). Skipped history collection."
        );
    }

    #[test]
    fn multiple_bans() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("hasbans", CREATED_CUTOFF));
        directory.insert_notes(
            "hasbans",
            "santabarbara",
            vec![ModNote::new("BAN"), ModNote::new("BAN")],
        );

        let mut verification = engine("hasbans");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/hasbans: verification fail\n\nAccount has 2 ban(s). Skipped history collection."
        );
    }

    #[test]
    fn mutes_without_bans() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("hasmutes", CREATED_CUTOFF));
        directory.insert_notes(
            "hasmutes",
            "santabarbara",
            vec![ModNote::new("MUTE"), ModNote::new("MUTE")],
        );

        let mut verification = engine("hasmutes");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/hasmutes: verification fail\n\nAccount has 2 mute(s). Skipped history collection."
        );
    }

    #[test]
    fn ban_reported_over_mute() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("both", CREATED_CUTOFF));
        directory.insert_notes(
            "both",
            "santabarbara",
            vec![ModNote::new("MUTE"), ModNote::new("BAN"), ModNote::new("MUTE")],
        );

        let mut verification = engine("both");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/both: verification fail\n\nAccount has 1 ban(s). Skipped history collection."
        );
    }

    #[test]
    fn no_community_history() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("nohistory", CREATED_CUTOFF));
        directory.insert_comments("nohistory", vec![comment("elsewhere", 1_700_000_000, 5)]);

        let mut verification = engine("nohistory");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/nohistory: verification fail\n\nAccount has no r/santabarbara history."
        );
        assert_eq!(verification.found_comments(), 1);
        assert_eq!(verification.karma(), None);
    }

    #[test]
    fn oldest_comment_too_recent() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("recent", CREATED_CUTOFF));
        directory.insert_comments(
            "recent",
            vec![comment("santabarbara", POSITIVE_KARMA_CUTOFF + 1, 1)],
        );

        let mut verification = engine("recent");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            format!(
                "u/recent: verification fail\n\nAccount oldest r/santabarbara comment is too recent ({})",
                Timestamp::new(POSITIVE_KARMA_CUTOFF + 1)
            )
        );
    }

    #[test]
    fn low_average_after_history_cutoff() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("redditor", CREATED_CUTOFF));
        directory.insert_comments(
            "redditor",
            vec![comment("santabarbara", HISTORY_CUTOFF + 1, 0)],
        );

        let mut verification = engine("redditor");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/redditor: verification fail\n\nAccount too low of karma average"
        );
    }

    #[test]
    fn low_average_at_positive_karma_boundary() {
        // Oldest comment exactly at the positive-karma cutoff clears that
        // check, but a zero average after the history cutoff still fails.
        let mut directory = NullDirectory::new();
        directory.insert_account(account("redditor", CREATED_CUTOFF));
        directory.insert_comments(
            "redditor",
            vec![comment("santabarbara", POSITIVE_KARMA_CUTOFF, 0)],
        );

        let mut verification = engine("redditor");
        assert!(!verification.verify(&directory).unwrap());
        assert_eq!(
            verification.report().unwrap(),
            "u/redditor: verification fail\n\nAccount too low of karma average"
        );
    }

    #[test]
    fn average_of_one_passes_after_history_cutoff() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("redditor", CREATED_CUTOFF));
        directory.insert_comments(
            "redditor",
            vec![comment("santabarbara", HISTORY_CUTOFF + 1, 1)],
        );

        let mut verification = engine("redditor");
        assert!(verification.verify(&directory).unwrap());
        assert_eq!(verification.karma_average(), Some(1.0));
    }

    #[test]
    fn passes_with_low_karma_at_history_cutoff() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("redditor", CREATED_CUTOFF));
        directory.insert_comments(
            "redditor",
            vec![
                comment("santabarbara", HISTORY_CUTOFF, 0),
                comment("a", 1_700_000_000, 1),
            ],
        );

        let mut verification = engine("redditor");
        assert!(verification.verify(&directory).unwrap());
        let created = Timestamp::new(CREATED_CUTOFF);
        let oldest = Timestamp::new(HISTORY_CUTOFF);
        let expected = [
            "                    User: redditor".to_string(),
            format!("                 Created: {created}"),
            "    Commented subreddits: 2".to_string(),
            "                          - santabarbara (1 comments)".to_string(),
            "                          - a (1 comments)".to_string(),
            "    Total comments found: 2".to_string(),
            String::new(),
            "    r/santabarbara specific".to_string(),
            "                Comments: 1".to_string(),
            "           Comment karma: 0".to_string(),
            "           Average karma: 0.00".to_string(),
            format!("          Newest comment: {oldest}"),
            format!("          Oldest comment: {oldest}"),
        ]
        .join("\n");
        assert_eq!(verification.report().unwrap(), expected);
    }

    #[test]
    fn truncates_to_busiest_communities() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("redditor", CREATED_CUTOFF));
        let mut comments = vec![comment("santabarbara", HISTORY_CUTOFF, 0)];
        for name in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"] {
            comments.push(comment(name, 1_700_000_000, 1));
        }
        directory.insert_comments("redditor", comments);

        let mut verification = engine("redditor");
        assert!(verification.verify(&directory).unwrap());
        let report = verification.report().unwrap();
        assert!(report.contains("    Commented subreddits: 11\n"));
        assert!(report.contains("       Top 10 subreddits:\n"));
        // Ties keep discovery order, so "j" is the one community dropped.
        assert!(report.contains("                          - i (1 comments)\n"));
        assert!(!report.contains("- j (1 comments)"));
        assert!(report.contains("    Total comments found: 11\n"));
    }

    #[test]
    fn passing_report_lists_note_kinds() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("redditor", CREATED_CUTOFF));
        directory.insert_comments(
            "redditor",
            vec![comment("santabarbara", HISTORY_CUTOFF, 0)],
        );
        directory.insert_notes(
            "redditor",
            "santabarbara",
            vec![
                ModNote::new("REMOVAL"),
                ModNote::new("APPROVAL"),
                ModNote::new("APPROVAL"),
            ],
        );

        let mut verification = engine("redditor");
        assert!(verification.verify(&directory).unwrap());
        let report = verification.report().unwrap();
        let lines: Vec<&str> = report.lines().collect();
        // Alphabetical, right-aligned kind column.
        assert_eq!(lines[lines.len() - 2], "          APPROVAL count: 2");
        assert_eq!(lines[lines.len() - 1], "           REMOVAL count: 1");
    }

    #[test]
    fn report_before_verify_is_an_error() {
        let verification = engine("early");
        assert!(matches!(
            verification.report(),
            Err(VerificationError::NotYetEvaluated)
        ));
    }

    #[test]
    fn verify_twice_is_an_error() {
        let directory = NullDirectory::new();
        let mut verification = engine("once");
        verification.verify(&directory).unwrap();
        assert!(matches!(
            verification.verify(&directory),
            Err(VerificationError::AlreadyEvaluated)
        ));
    }

    #[test]
    fn platform_fault_leaves_verdict_unevaluated() {
        let directory = NullDirectory::failing("backend down");
        let mut verification = engine("unlucky");
        assert!(matches!(
            verification.verify(&directory),
            Err(VerificationError::Platform(_))
        ));
        assert_eq!(verification.verdict(), Verdict::Unevaluated);
        assert!(matches!(
            verification.report(),
            Err(VerificationError::NotYetEvaluated)
        ));
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let mut directory = NullDirectory::new();
        directory.insert_account(account("redditor", CREATED_CUTOFF));
        directory.insert_comments(
            "redditor",
            vec![
                comment("santabarbara", HISTORY_CUTOFF, 3),
                comment("santabarbara", HISTORY_CUTOFF - 10, 1),
            ],
        );

        let mut verification = engine("redditor");
        assert!(verification.verify(&directory).unwrap());
        assert_eq!(verification.report().unwrap(), verification.report().unwrap());
    }
}
