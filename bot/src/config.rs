//! Bot configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use modgate_types::{AccountHandle, CommunityId, Timestamp};
use modgate_verification::EligibilityThresholds;

use crate::BotError;

/// Configuration for the modgate bot.
///
/// Can be loaded from a TOML file via [`BotConfig::from_toml_file`] or built
/// programmatically (e.g. for tests). Platform credentials are not part of
/// this file; they come from the environment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// The community whose posting eligibility this bot manages.
    pub community: CommunityId,

    /// The bot's own account handle.
    #[serde(default = "default_bot_handle")]
    pub bot_handle: AccountHandle,

    /// Account to message when processing a command fails unexpectedly.
    #[serde(default)]
    pub operator: Option<AccountHandle>,

    /// Modmail conversation that collects failed-verification reports.
    pub failed_report_conversation: String,

    /// Data directory for the grant-queue database.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Minimum account age, in days, measured at startup.
    #[serde(default = "default_min_account_age_days")]
    pub min_account_age_days: u64,

    /// Epoch seconds. In-community history starting after this instant must
    /// carry a positive karma average.
    #[serde(default = "default_history_cutoff")]
    pub history_cutoff_secs: u64,

    /// Epoch seconds. In-community history starting after this instant fails
    /// verification outright.
    #[serde(default = "default_positive_karma_cutoff")]
    pub positive_karma_cutoff_secs: u64,

    /// Pause after a platform fault before polling again.
    #[serde(default = "default_fault_sleep_secs")]
    pub fault_sleep_secs: u64,

    /// Pause between polls when the inbox is empty.
    #[serde(default = "default_poll_idle_secs")]
    pub poll_idle_secs: u64,

    /// Queued grants attempted per drain pass.
    #[serde(default = "default_grant_drain_batch")]
    pub grant_drain_batch: usize,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// User agent reported to the platform.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, BotError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BotError::Config(format!("read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| BotError::Config(format!("parse {}: {e}", path.display())))
    }

    /// The eligibility cutoffs for evaluations started at `now`.
    pub fn thresholds(&self, now: Timestamp) -> EligibilityThresholds {
        EligibilityThresholds::relative_to(
            now,
            self.min_account_age_days,
            Timestamp::new(self.history_cutoff_secs),
            Timestamp::new(self.positive_karma_cutoff_secs),
        )
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            community: CommunityId::new("sandbox"),
            bot_handle: default_bot_handle(),
            operator: None,
            failed_report_conversation: String::new(),
            data_dir: default_data_dir(),
            min_account_age_days: default_min_account_age_days(),
            history_cutoff_secs: default_history_cutoff(),
            positive_karma_cutoff_secs: default_positive_karma_cutoff(),
            fault_sleep_secs: default_fault_sleep_secs(),
            poll_idle_secs: default_poll_idle_secs(),
            grant_drain_batch: default_grant_drain_batch(),
            log_level: default_log_level(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_bot_handle() -> AccountHandle {
    AccountHandle::new("modgate-bot")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./modgate_data")
}

fn default_min_account_age_days() -> u64 {
    14
}

/// 2024-11-05 00:00:00 UTC.
fn default_history_cutoff() -> u64 {
    1_730_764_800
}

/// 2025-01-20 00:00:00 UTC.
fn default_positive_karma_cutoff() -> u64 {
    1_737_331_200
}

fn default_fault_sleep_secs() -> u64 {
    60
}

fn default_poll_idle_secs() -> u64 {
    30
}

fn default_grant_drain_batch() -> usize {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_agent() -> String {
    format!("modgate v{}", env!("CARGO_PKG_VERSION"))
}
