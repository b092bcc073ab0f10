use std::str::FromStr;

use crate::logger::error::LoggerError;

/// Where and how log records are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerFormat {
    Text,
    Json,
    Journald,
}

impl LoggerFormat {
    /// Whether this build can send records to the systemd journal.
    pub const JOURNALD_AVAILABLE: bool = cfg!(all(target_os = "linux", feature = "journald"));
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("text") {
            Ok(Self::Text)
        } else if name.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if name.eq_ignore_ascii_case("journald") || name.eq_ignore_ascii_case("journal") {
            if Self::JOURNALD_AVAILABLE {
                Ok(Self::Journald)
            } else {
                Err(LoggerError::JournaldNotSupported)
            }
        } else {
            Err(LoggerError::InvalidFormat(s.to_string()))
        }
    }
}
