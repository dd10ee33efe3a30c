//! Multiplication questions and their generation
//!
//! Every question multiplies a factor drawn from the configured times
//! tables by a second factor drawn from the full `[2, 12]` range.

use std::iter;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    config::GameConfig,
    constants::question::{MAX_SECOND_FACTOR, MIN_FACTOR},
};

/// A single "a x b" question with its expected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[display("{prompt}")]
pub struct Question {
    /// The two factors, in the order they are shown
    factors: (u32, u32),
    /// Human-readable question text
    prompt: String,
    /// Product of the two factors
    answer: u32,
}

impl Question {
    /// Creates the question `a x b`
    pub(crate) fn new(a: u32, b: u32) -> Self {
        Self {
            factors: (a, b),
            prompt: format!("{a} x {b}"),
            answer: a * b,
        }
    }

    /// Draws a random question
    ///
    /// The first factor is uniform over `[2, max_multiplier]` and the second
    /// over `[2, 12]`, both inclusive. `max_multiplier` must be at least 2.
    pub(crate) fn random(max_multiplier: u32, rng: &mut fastrand::Rng) -> Self {
        let a = rng.u32(MIN_FACTOR..=max_multiplier);
        let b = rng.u32(MIN_FACTOR..=MAX_SECOND_FACTOR);
        Self::new(a, b)
    }

    /// The question text, e.g. `"7 x 9"`
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The expected answer
    pub fn answer(&self) -> u32 {
        self.answer
    }

    /// The two factors
    pub fn factors(&self) -> (u32, u32) {
        self.factors
    }

    /// Whether `answer` matches the product
    pub fn is_correct(&self, answer: u32) -> bool {
        self.answer == answer
    }

    /// Whether this question could have been generated from `config`
    ///
    /// Checks the factor ranges and that the prompt and answer agree with
    /// the factors.
    pub fn fits(&self, config: &GameConfig) -> bool {
        let (a, b) = self.factors;
        (MIN_FACTOR..=config.max_multiplier()).contains(&a)
            && (MIN_FACTOR..=MAX_SECOND_FACTOR).contains(&b)
            && *self == Self::new(a, b)
    }
}

/// Generates the question list for a session from a validated config
pub(crate) fn generate(config: &GameConfig, rng: &mut fastrand::Rng) -> Vec<Question> {
    iter::repeat_with(|| Question::random(config.max_multiplier(), rng))
        .take(config.question_count())
        .collect_vec()
}
