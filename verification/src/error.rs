use modgate_platform::PlatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    /// `verify` was called on an engine that already holds a verdict.
    #[error("verification has already been evaluated")]
    AlreadyEvaluated,

    /// `report` was called before `verify`.
    #[error("verify has not been called yet")]
    NotYetEvaluated,

    /// A platform fault unrelated to the decision itself. The caller owns
    /// retry and backoff; the verdict stays unevaluated.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}
