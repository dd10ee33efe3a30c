//! Numeric keypad and the answer buffer it fills
//!
//! The keypad has the digits `0`-`9`, a clear key and a submit key. Typed
//! digits collect in an [`AnswerInput`] that holds at most three digits and
//! never starts with a zero.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::keypad::MAX_DIGITS;

/// Errors that can occur when reading keypad input
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The number is larger than nine
    #[error("{0} is not a single digit")]
    OutOfRange(u8),
    /// The character is not a decimal digit
    #[error("{0:?} is not a digit")]
    NotADigit(char),
    /// A stored answer has more digits than the display holds
    #[error("answer has {0} digits, at most three allowed")]
    TooLong(usize),
    /// A stored answer starts with a zero
    #[error("answer cannot start with a zero")]
    LeadingZero,
}

/// A single decimal digit
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// The zero digit
    pub const ZERO: Self = Self(0);

    /// Numeric value of the digit
    pub fn value(self) -> u8 {
        self.0
    }

    fn to_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value <= 9 {
            Ok(Self(value))
        } else {
            Err(Error::OutOfRange(value))
        }
    }
}

impl TryFrom<char> for Digit {
    type Error = Error;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        value
            .to_digit(10)
            .map(|d| Self(d as u8))
            .ok_or(Error::NotADigit(value))
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

/// A keypad button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// One of the ten digit keys
    Digit(Digit),
    /// The clear (✘) key
    Clear,
    /// The submit (✓) key
    Submit,
}

impl From<Digit> for Key {
    fn from(digit: Digit) -> Self {
        Self::Digit(digit)
    }
}

/// The digits typed for the current question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnswerInput {
    digits: String,
}

impl TryFrom<String> for AnswerInput {
    type Error = Error;

    /// Rebuilds a buffer that [`AnswerInput::push`] could have produced
    ///
    /// # Errors
    ///
    /// Returns an error for non-digit characters, more than three digits or
    /// a leading zero.
    fn try_from(digits: String) -> Result<Self, Self::Error> {
        if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(Error::NotADigit(c));
        }
        if digits.len() > MAX_DIGITS {
            return Err(Error::TooLong(digits.len()));
        }
        if digits.starts_with('0') {
            return Err(Error::LeadingZero);
        }
        Ok(Self { digits })
    }
}

impl From<AnswerInput> for String {
    fn from(input: AnswerInput) -> Self {
        input.digits
    }
}

impl AnswerInput {
    /// Appends a digit
    ///
    /// Nothing happens when the buffer is full or when a zero would become
    /// the first digit.
    ///
    /// # Returns
    ///
    /// `true` if the digit was appended
    pub fn push(&mut self, digit: Digit) -> bool {
        if self.is_full() || (self.is_empty() && digit == Digit::ZERO) {
            return false;
        }
        self.digits.push(digit.to_char());
        true
    }

    /// Empties the buffer
    pub fn clear(&mut self) {
        self.digits.clear();
    }

    /// Whether no digit has been typed
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Whether the buffer holds the maximum number of digits
    pub fn is_full(&self) -> bool {
        self.digits.len() >= MAX_DIGITS
    }

    /// Number of digits typed
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// The typed digits
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// The typed number, or `None` when empty
    pub fn value(&self) -> Option<u32> {
        self.digits.parse().ok()
    }

    /// Text for the answer display, `"0"` while nothing has been typed
    pub fn display(&self) -> &str {
        if self.is_empty() { "0" } else { &self.digits }
    }
}
