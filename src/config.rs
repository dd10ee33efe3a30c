//! Game configuration chosen on the settings screen
//!
//! A [`GameConfig`] fixes how many questions a session asks and the highest
//! times table the first factor is drawn from. It is validated with `garde`
//! before any session is built from it.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::settings::*;

/// Errors that can occur while building or changing a configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The question count or max multiplier is outside the accepted bounds
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Settings of a single play-through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct GameConfig {
    /// Number of questions asked in the session
    #[garde(range(min = MIN_QUESTION_COUNT))]
    question_count: usize,
    /// Highest times table used for the first factor
    #[garde(range(min = MIN_MAX_MULTIPLIER, max = MAX_MAX_MULTIPLIER))]
    max_multiplier: u32,
}

impl Default for GameConfig {
    /// Five questions on the two times table
    fn default() -> Self {
        Self {
            question_count: DEFAULT_QUESTION_COUNT,
            max_multiplier: DEFAULT_MAX_MULTIPLIER,
        }
    }
}

impl GameConfig {
    /// Creates a validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `question_count` is zero or
    /// `max_multiplier` is outside `[2, 12]`.
    pub fn new(question_count: usize, max_multiplier: u32) -> Result<Self, Error> {
        Self {
            question_count,
            max_multiplier,
        }
        .validated()
    }

    /// Runs the `garde` rules and hands the configuration back if they pass
    ///
    /// Configurations can also arrive through deserialization, which skips
    /// [`GameConfig::new`], so sessions re-check with this before use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] with the validation report.
    pub fn validated(self) -> Result<Self, Error> {
        self.validate()
            .map_err(|report| Error::InvalidConfiguration(report.to_string()))?;
        Ok(self)
    }

    /// Returns a copy with a different question count
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the count is zero.
    pub fn with_question_count(self, question_count: usize) -> Result<Self, Error> {
        Self {
            question_count,
            ..self
        }
        .validated()
    }

    /// Returns a copy with a different max multiplier
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the value is outside `[2, 12]`.
    pub fn with_max_multiplier(self, max_multiplier: u32) -> Result<Self, Error> {
        Self {
            max_multiplier,
            ..self
        }
        .validated()
    }

    /// Number of questions asked in the session
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    /// Highest times table used for the first factor
    pub fn max_multiplier(&self) -> u32 {
        self.max_multiplier
    }
}
