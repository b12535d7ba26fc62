use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("verification error: {0}")]
    Verification(#[from] modgate_verification::VerificationError),

    #[error("platform error: {0}")]
    Platform(#[from] modgate_platform::PlatformError),

    #[error("store error: {0}")]
    Store(#[from] modgate_store::StoreError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
