//! Reddit REST implementation of the modgate platform traits.
//!
//! A thin, blocking client: OAuth2 password grant, bearer-token requests,
//! and the handful of endpoints the bot needs. No retry logic lives here —
//! faults surface as [`PlatformError`](modgate_platform::PlatformError) and
//! the orchestration layer owns backoff.

pub mod client;
pub mod config;
pub mod wire;

pub use client::RedditClient;
pub use config::RedditConfig;
