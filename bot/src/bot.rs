//! The bot's command loop and scheduled work.

use std::collections::HashSet;
use std::io::BufRead;
use std::thread;
use std::time::Duration;

use modgate_platform::{AccountDirectory, InboxMessage, Mailbox, PlatformError, ReportSink};
use modgate_store::GrantQueueStore;
use modgate_types::{AccountHandle, Timestamp};
use modgate_utils::seconds_to_next_hour;
use modgate_verification::EligibilityThresholds;

use crate::process::process_account;
use crate::{BotConfig, BotError};

/// Result of one poll pass over the inbox.
#[derive(Clone, Copy, Debug, Default)]
pub struct PollSummary {
    /// Inbox items seen this pass.
    pub handled: usize,
    /// Items whose processing failed; they stay unread for the next pass.
    pub faults: usize,
}

/// Bot that encompasses most of the work.
///
/// All remote surfaces are borrowed trait objects, so the same struct runs
/// against the real platform client and against nullables in tests.
pub struct Bot<'a, D, S, M, Q> {
    config: BotConfig,
    thresholds: EligibilityThresholds,
    directory: &'a D,
    sink: &'a S,
    mailbox: &'a M,
    queue: &'a Q,
    /// Moderator list, fetched once per bot lifetime.
    moderators: Option<Vec<AccountHandle>>,
    /// Queued grants are left alone until this instant.
    grant_drain_not_before: Timestamp,
}

impl<'a, D, S, M, Q> Bot<'a, D, S, M, Q>
where
    D: AccountDirectory,
    S: ReportSink,
    M: Mailbox,
    Q: GrantQueueStore,
{
    pub fn new(
        config: BotConfig,
        thresholds: EligibilityThresholds,
        directory: &'a D,
        sink: &'a S,
        mailbox: &'a M,
        queue: &'a Q,
    ) -> Self {
        Self {
            config,
            thresholds,
            directory,
            sink,
            mailbox,
            queue,
            moderators: None,
            grant_drain_not_before: Timestamp::EPOCH,
        }
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Evaluate one account and deliver the outcome.
    pub fn process(
        &self,
        handle: &AccountHandle,
        now: Timestamp,
    ) -> Result<(bool, String), BotError> {
        process_account(
            self.directory,
            self.sink,
            self.queue,
            &self.config.community,
            self.thresholds,
            handle,
            now,
        )
    }

    /// Run verifications for every handle in `reader`, one per line.
    ///
    /// Blank lines and accounts that already hold the contributor permission
    /// are skipped.
    pub fn process_from_list<R: BufRead>(
        &mut self,
        reader: R,
        now: Timestamp,
    ) -> Result<(), BotError> {
        let contributors: HashSet<AccountHandle> =
            self.sink.list_contributors()?.into_iter().collect();
        tracing::info!("found {} contributors", contributors.len());

        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if name.is_empty() {
                continue;
            }
            let handle = AccountHandle::new(name);
            if contributors.contains(&handle) {
                tracing::info!("already a contributor: {handle}");
                continue;
            }
            self.process(&handle, now)?;
        }
        Ok(())
    }

    /// Process a single inbox message.
    pub fn handle_message(
        &mut self,
        message: &InboxMessage,
        now: Timestamp,
    ) -> Result<(), BotError> {
        let is_moderator = self.moderators()?.contains(&message.author);
        if !is_moderator {
            tracing::info!("ignoring message from non-moderator user {}", message.author);
            return Ok(());
        }

        let subject = message.subject.trim();
        if subject != "verify" {
            tracing::info!("invalid subject {subject:?} from {}", message.author);
            self.mailbox.reply(
                &message.id,
                &format!("`{subject}` is not a valid command. Try `verify`."),
            )?;
            return Ok(());
        }

        let body = message.body.trim();
        if body.split_whitespace().count() != 1 {
            tracing::info!("invalid body {body:?} from {}", message.author);
            self.mailbox
                .reply(&message.id, "Message body must contain only a username")?;
            return Ok(());
        }

        let mut name = body;
        for prefix in ["u/", "/u/"] {
            if name.to_lowercase().starts_with(prefix) {
                name = &name[prefix.len()..];
            }
        }

        tracing::info!("processing {name} ...");
        self.mailbox
            .reply(&message.id, &format!("processing {name} ..."))?;
        self.process(&AccountHandle::new(name), now)?;
        Ok(())
    }

    /// Attempt up to the configured batch of queued grants.
    ///
    /// A rate-limited attempt stops the pass and defers the next one to the
    /// top of the hour, when the platform resets its grant throttle.
    pub fn drain_queued_grants(&mut self, now: Timestamp) -> Result<(), BotError> {
        if now < self.grant_drain_not_before {
            return Ok(());
        }

        for _ in 0..self.config.grant_drain_batch {
            let Some(grant) = self.queue.next_pending()? else {
                return Ok(());
            };

            tracing::info!("attempting queued contributor grant for {}", grant.handle);
            match self.sink.grant_contributor(&grant.handle) {
                Ok(()) => {
                    self.sink.post_verified_report(&grant.handle, &grant.report)?;
                    self.queue.remove(&grant.handle)?;
                }
                Err(PlatformError::RateLimited(_)) => {
                    let secs = seconds_to_next_hour(now);
                    self.grant_drain_not_before = now.saturating_add_secs(secs);
                    tracing::info!("next contributor grant attempt in {secs} seconds");
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// One pass over the unread inbox, then a drain pass over the queue.
    pub fn poll_once(&mut self, now: Timestamp) -> Result<PollSummary, BotError> {
        let messages = self.mailbox.unread()?;
        let mut summary = PollSummary {
            handled: messages.len(),
            faults: 0,
        };

        for message in messages {
            if message.was_comment {
                self.mailbox.mark_read(&message.id)?;
                continue;
            }
            match self.handle_message(&message, now) {
                Ok(()) => self.mailbox.mark_read(&message.id)?,
                Err(e) => {
                    summary.faults += 1;
                    tracing::error!("failed to process message {}: {e}", message.id);
                    self.notify_operator(&message, &e)?;
                }
            }
        }

        self.drain_queued_grants(now)?;
        Ok(summary)
    }

    /// Provide the primary bot loop. Runs until the process is stopped.
    pub fn run(&mut self) {
        tracing::info!("waiting for inbox messages");
        loop {
            match self.poll_once(Timestamp::now()) {
                Ok(summary) if summary.faults > 0 => {
                    // Slow things down if there are issues.
                    thread::sleep(Duration::from_secs(self.config.fault_sleep_secs));
                }
                Ok(summary) if summary.handled == 0 => {
                    thread::sleep(Duration::from_secs(self.config.poll_idle_secs));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        "platform fault in poll loop: {e}. Sleeping for {} seconds.",
                        self.config.fault_sleep_secs
                    );
                    thread::sleep(Duration::from_secs(self.config.fault_sleep_secs));
                }
            }
        }
    }

    fn moderators(&mut self) -> Result<&[AccountHandle], BotError> {
        if self.moderators.is_none() {
            self.moderators = Some(self.mailbox.list_moderators()?);
        }
        Ok(self.moderators.as_deref().expect("just populated"))
    }

    fn notify_operator(
        &self,
        message: &InboxMessage,
        error: &BotError,
    ) -> Result<(), PlatformError> {
        let Some(operator) = &self.config.operator else {
            return Ok(());
        };
        let body = format!(
            "Error processing message from {}:\n\n{error}\n\nSubject: {}\nBody: {}",
            message.author, message.subject, message.body
        );
        self.mailbox.send_message(
            operator,
            &format!("{} exception", self.config.user_agent),
            &body,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modgate_nullables::{NullDirectory, NullGrantQueue, NullMailbox, NullSink};
    use modgate_types::{Account, Comment, CommunityId};

    const NOW: u64 = 1_755_000_000;
    const CREATED_CUTOFF: u64 = 1_750_000_000;
    const HISTORY_CUTOFF: u64 = 1_730_000_000;
    const POSITIVE_KARMA_CUTOFF: u64 = 1_737_000_000;

    fn config() -> BotConfig {
        BotConfig {
            community: CommunityId::new("santabarbara"),
            operator: Some(AccountHandle::new("operator")),
            failed_report_conversation: "2i4snm".to_string(),
            ..BotConfig::default()
        }
    }

    fn thresholds() -> EligibilityThresholds {
        EligibilityThresholds::new(
            Timestamp::new(CREATED_CUTOFF),
            Timestamp::new(HISTORY_CUTOFF),
            Timestamp::new(POSITIVE_KARMA_CUTOFF),
        )
    }

    fn eligible_directory(name: &str) -> NullDirectory {
        let mut directory = NullDirectory::new();
        directory.insert_account(Account {
            handle: AccountHandle::new(name),
            created: Timestamp::new(CREATED_CUTOFF),
            suspended: false,
        });
        directory.insert_comments(
            name,
            vec![Comment {
                community: CommunityId::new("santabarbara"),
                created: Timestamp::new(HISTORY_CUTOFF),
                score: 2,
            }],
        );
        directory
    }

    fn message(author: &str, subject: &str, body: &str) -> InboxMessage {
        InboxMessage {
            id: "m1".to_string(),
            author: AccountHandle::new(author),
            subject: subject.to_string(),
            body: body.to_string(),
            was_comment: false,
        }
    }

    #[test]
    fn passing_account_granted_and_report_posted() {
        let directory = eligible_directory("eligible");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        let bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        let (passed, report) = bot
            .process(&AccountHandle::new("eligible"), Timestamp::new(NOW))
            .unwrap();
        assert!(passed);
        assert_eq!(sink.granted(), vec![AccountHandle::new("eligible")]);
        assert_eq!(sink.verified_reports().len(), 1);
        assert_eq!(sink.verified_reports()[0].1, report);
        assert!(sink.failed_reports().is_empty());
    }

    #[test]
    fn failing_account_posts_failure_report() {
        let directory = NullDirectory::new();
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        let bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        let (passed, report) = bot
            .process(&AccountHandle::new("ghost"), Timestamp::new(NOW))
            .unwrap();
        assert!(!passed);
        assert!(sink.granted().is_empty());
        assert_eq!(sink.failed_reports(), vec![report]);
    }

    #[test]
    fn rate_limited_grant_is_queued_once() {
        let directory = eligible_directory("eligible");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        let bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        sink.rate_limit_next(2);
        let (passed, _) = bot
            .process(&AccountHandle::new("eligible"), Timestamp::new(NOW))
            .unwrap();
        assert!(passed);
        assert_eq!(queue.pending_count().unwrap(), 1);
        // Nothing posted until the grant actually lands.
        assert!(sink.verified_reports().is_empty());

        // A second evaluation while the grant is queued must not crash or
        // merge; the existing row wins.
        bot.process(&AccountHandle::new("eligible"), Timestamp::new(NOW))
            .unwrap();
        assert_eq!(queue.pending_count().unwrap(), 1);
    }

    #[test]
    fn drain_applies_queued_grant() {
        let directory = eligible_directory("eligible");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        sink.rate_limit_next(1);
        bot.process(&AccountHandle::new("eligible"), Timestamp::new(NOW))
            .unwrap();
        assert_eq!(queue.pending_count().unwrap(), 1);

        bot.drain_queued_grants(Timestamp::new(NOW)).unwrap();
        assert_eq!(sink.granted(), vec![AccountHandle::new("eligible")]);
        assert_eq!(sink.verified_reports().len(), 1);
        assert_eq!(queue.pending_count().unwrap(), 0);
    }

    #[test]
    fn drain_defers_to_next_hour_when_rate_limited() {
        let directory = eligible_directory("eligible");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        sink.rate_limit_next(2);
        bot.process(&AccountHandle::new("eligible"), Timestamp::new(NOW))
            .unwrap();
        bot.drain_queued_grants(Timestamp::new(NOW)).unwrap();
        assert_eq!(queue.pending_count().unwrap(), 1);

        // Still gated: one second later nothing is attempted even though the
        // sink would now accept the grant.
        bot.drain_queued_grants(Timestamp::new(NOW + 1)).unwrap();
        assert!(sink.granted().is_empty());

        // Past the top of the hour the grant goes through.
        bot.drain_queued_grants(Timestamp::new(NOW + 3600)).unwrap();
        assert_eq!(sink.granted(), vec![AccountHandle::new("eligible")]);
        assert_eq!(queue.pending_count().unwrap(), 0);
    }

    #[test]
    fn non_moderator_messages_ignored() {
        let directory = eligible_directory("eligible");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        mailbox.set_moderators(vec![AccountHandle::new("mod")]);
        mailbox.push_message(message("rando", "verify", "eligible"));
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        let summary = bot.poll_once(Timestamp::new(NOW)).unwrap();
        assert_eq!(summary.handled, 1);
        assert_eq!(summary.faults, 0);
        assert!(mailbox.replies().is_empty());
        assert!(sink.granted().is_empty());
        assert_eq!(mailbox.read_ids(), vec!["m1".to_string()]);
    }

    #[test]
    fn invalid_subject_gets_usage_reply() {
        let directory = NullDirectory::new();
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        mailbox.set_moderators(vec![AccountHandle::new("mod")]);
        mailbox.push_message(message("mod", "velify", "eligible"));
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        bot.poll_once(Timestamp::new(NOW)).unwrap();
        assert_eq!(
            mailbox.replies(),
            vec![(
                "m1".to_string(),
                "`velify` is not a valid command. Try `verify`.".to_string()
            )]
        );
    }

    #[test]
    fn multi_token_body_rejected() {
        let directory = NullDirectory::new();
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        mailbox.set_moderators(vec![AccountHandle::new("mod")]);
        mailbox.push_message(message("mod", "verify", "two users"));
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        bot.poll_once(Timestamp::new(NOW)).unwrap();
        assert_eq!(
            mailbox.replies(),
            vec![(
                "m1".to_string(),
                "Message body must contain only a username".to_string()
            )]
        );
        assert!(sink.failed_reports().is_empty());
    }

    #[test]
    fn handle_prefix_is_stripped() {
        let directory = eligible_directory("Eligible");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        mailbox.set_moderators(vec![AccountHandle::new("mod")]);
        mailbox.push_message(message("mod", "verify", "/u/Eligible"));
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        bot.poll_once(Timestamp::new(NOW)).unwrap();
        assert_eq!(
            mailbox.replies(),
            vec![("m1".to_string(), "processing Eligible ...".to_string())]
        );
        assert_eq!(sink.granted(), vec![AccountHandle::new("Eligible")]);
    }

    #[test]
    fn comment_replies_marked_read_without_processing() {
        let directory = NullDirectory::new();
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        let mut item = message("anyone", "reply", "nice bot");
        item.was_comment = true;
        mailbox.push_message(item);
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        bot.poll_once(Timestamp::new(NOW)).unwrap();
        assert_eq!(mailbox.read_ids(), vec!["m1".to_string()]);
        assert!(mailbox.replies().is_empty());
    }

    #[test]
    fn processing_fault_notifies_operator_and_leaves_unread() {
        let directory = NullDirectory::failing("backend down");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        mailbox.set_moderators(vec![AccountHandle::new("mod")]);
        mailbox.push_message(message("mod", "verify", "whoever"));
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        let summary = bot.poll_once(Timestamp::new(NOW)).unwrap();
        assert_eq!(summary.faults, 1);
        let sent = mailbox.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, AccountHandle::new("operator"));
        assert!(mailbox.read_ids().is_empty());
    }

    #[test]
    fn from_list_skips_blank_lines_and_contributors() {
        let directory = eligible_directory("fresh");
        let sink = NullSink::new();
        let mailbox = NullMailbox::new();
        let queue = NullGrantQueue::new();
        sink.seed_contributor("veteran");
        let mut bot = Bot::new(config(), thresholds(), &directory, &sink, &mailbox, &queue);

        let input = "veteran\n\nfresh\n";
        bot.process_from_list(input.as_bytes(), Timestamp::new(NOW))
            .unwrap();
        // "veteran" skipped, "fresh" granted.
        assert_eq!(sink.granted(), vec![AccountHandle::new("fresh")]);
    }
}
