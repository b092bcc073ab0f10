use std::{fmt, str::FromStr};

use tracing_subscriber::EnvFilter;

use crate::logger::error::LoggerError;

/// Validated `EnvFilter` directive such as `"info"` or `"warn,cohort.core=debug"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerLevel(String);

impl LoggerLevel {
    pub fn new(directive: impl Into<String>) -> Result<Self, LoggerError> {
        let directive = directive.into();
        EnvFilter::try_new(&directive)
            .map_err(|_| LoggerError::InvalidLogLevel(directive.clone()))?;
        Ok(Self(directive))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn filter(&self) -> Result<EnvFilter, LoggerError> {
        EnvFilter::try_new(&self.0).map_err(|_| LoggerError::InvalidLogLevel(self.0.clone()))
    }
}

impl Default for LoggerLevel {
    fn default() -> Self {
        Self("info".to_string())
    }
}

impl FromStr for LoggerLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl fmt::Display for LoggerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
