//! Delivery contact phone number.
//!
//! Addresses carry a phone number that must be exactly ten digits (Indian
//! mobile format, no country code). The check runs before any network call
//! so a bad number is a field-level validation error, never a round trip.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number is required")]
    Empty,
    /// The input contains something other than ASCII digits.
    #[error("phone number must contain digits only")]
    NonDigit,
    /// The input is not exactly the required number of digits.
    #[error("phone number must be exactly {expected} digits (got {got})")]
    WrongLength { expected: usize, got: usize },
}

/// A ten-digit phone number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Required digit count.
    pub const DIGITS: usize = 10;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digit
    /// characters, or is not exactly ten digits long.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }
        if s.len() != Self::DIGITS {
            return Err(PhoneError::WrongLength {
                expected: Self::DIGITS,
                got: s.len(),
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_digits_accepted() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
    }

    #[test]
    fn test_short_number_rejected() {
        assert_eq!(
            Phone::parse("12345"),
            Err(PhoneError::WrongLength {
                expected: 10,
                got: 5
            })
        );
    }

    #[test]
    fn test_non_digits_rejected() {
        assert_eq!(Phone::parse("98765abcde"), Err(PhoneError::NonDigit));
        assert_eq!(Phone::parse("+919876543210"), Err(PhoneError::NonDigit));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(Phone::parse("   "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        assert!(Phone::parse(" 9876543210 ").is_ok());
    }
}
