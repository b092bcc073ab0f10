use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Positive number identifying a pipeline step (`04-prep-fmriprep` is step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepNumber(NonZeroU32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepNumberError {
    #[error("step number must consist of ascii digits only: {0:?}")]
    NotDigits(String),
    #[error("step number must be positive")]
    Zero,
    #[error("step number is too large: {0}")]
    Overflow(String),
}

impl StepNumber {
    /// Returns `None` for zero.
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl FromStr for StepNumber {
    type Err = StepNumberError;

    /// Parses a run of ascii digits, zero-padding allowed (`"04"` is 4).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StepNumberError::NotDigits(s.to_string()));
        }
        let digits = s.trim_start_matches('0');
        if digits.is_empty() {
            return Err(StepNumberError::Zero);
        }
        let n: u32 = digits
            .parse()
            .map_err(|_| StepNumberError::Overflow(s.to_string()))?;
        Self::new(n).ok_or(StepNumberError::Zero)
    }
}

impl fmt::Display for StepNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zero_padded_digits() {
        assert_eq!("04".parse::<StepNumber>().unwrap().get(), 4);
        assert_eq!("12".parse::<StepNumber>().unwrap().get(), 12);
        assert_eq!("0007".parse::<StepNumber>().unwrap().get(), 7);
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert_eq!("0".parse::<StepNumber>(), Err(StepNumberError::Zero));
        assert_eq!("000".parse::<StepNumber>(), Err(StepNumberError::Zero));
        assert!(matches!("".parse::<StepNumber>(), Err(StepNumberError::NotDigits(_))));
        assert!(matches!("+3".parse::<StepNumber>(), Err(StepNumberError::NotDigits(_))));
        assert!(matches!("3a".parse::<StepNumber>(), Err(StepNumberError::NotDigits(_))));
    }

    #[test]
    fn rejects_overflow() {
        assert!(matches!(
            "99999999999".parse::<StepNumber>(),
            Err(StepNumberError::Overflow(_))
        ));
    }

    #[test]
    fn serde_is_a_bare_number() {
        let n = StepNumber::new(3).unwrap();
        assert_eq!(serde_json::to_string(&n).unwrap(), "3");
        let back: StepNumber = serde_json::from_str("3").unwrap();
        assert_eq!(back, n);
    }
}
