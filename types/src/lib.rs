//! Fundamental types for the modgate moderation tool.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: account identities, history records, moderation notes, and
//! timestamps.

pub mod account;
pub mod community;
pub mod note;
pub mod time;

pub use account::{Account, AccountHandle, Comment};
pub use community::CommunityId;
pub use note::{note_kind, ModNote};
pub use time::Timestamp;
