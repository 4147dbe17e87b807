use std::io;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure to set up the remote error-reporting backend. Never fatal for the caller.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid remote destination {dsn:?}: {reason}")]
    InvalidDsn { dsn: String, reason: &'static str },

    #[error("failed to configure remote transport")]
    Transport(#[source] BoxError),

    #[error("failed to start remote delivery runtime")]
    Runtime(#[source] io::Error),

    #[error("remote backend is already connected")]
    AlreadyConnected,
}

/// A sink that failed to flush or release while its logger was closing.
#[derive(Debug, Error)]
#[error("Failed to close log {sink}: {source}")]
pub struct CloseError {
    pub sink: String,
    #[source]
    pub source: io::Error,
}
