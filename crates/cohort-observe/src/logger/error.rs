use thiserror::Error;

/// Failures while configuring or installing the `cohort` log subscriber.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?}; use text, json or journald")]
    InvalidFormat(String),
    #[error("journald logging needs a Linux build with the `journald` feature")]
    JournaldNotSupported,
    #[error("a global log subscriber is already installed")]
    AlreadyInitialized,
    #[error("cannot install log subscriber: {0}")]
    InitializationFailed(String),
    #[error("bad log filter directive {0:?}")]
    InvalidLogLevel(String),
}
