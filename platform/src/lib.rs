//! Abstract platform capabilities for modgate.
//!
//! Every remote surface (the real REST client, in-memory test doubles)
//! implements these traits. The rest of the codebase depends only on the
//! traits.

pub mod directory;
pub mod error;
pub mod mailbox;
pub mod sink;

pub use directory::AccountDirectory;
pub use error::PlatformError;
pub use mailbox::{InboxMessage, Mailbox};
pub use sink::ReportSink;
