//! Configuration constants for the times tables game
//!
//! This module contains the limits, defaults and transition timings used
//! throughout the game so the settings screen, the question generator and
//! the keypad agree on the same boundaries.

/// Settings screen constants
pub mod settings {
    /// Question counts offered by the settings screen
    pub const QUESTION_COUNT_OPTIONS: [usize; 4] = [5, 10, 15, 20];
    /// Question count selected when the app opens or a new game is requested
    pub const DEFAULT_QUESTION_COUNT: usize = 5;
    /// Smallest question count a session accepts
    pub const MIN_QUESTION_COUNT: usize = 1;
    /// Lowest value of the max times table slider
    pub const MIN_MAX_MULTIPLIER: u32 = 2;
    /// Highest value of the max times table slider
    pub const MAX_MAX_MULTIPLIER: u32 = 12;
    /// Max times table selected when the app opens or a new game is requested
    pub const DEFAULT_MAX_MULTIPLIER: u32 = 2;
}

/// Question generation constants
pub mod question {
    /// Smallest value of either factor
    pub const MIN_FACTOR: u32 = 2;
    /// Largest value of the second factor, regardless of settings
    pub const MAX_SECOND_FACTOR: u32 = 12;
}

/// Keypad constants
pub mod keypad {
    /// Number of digits the answer display can hold
    pub const MAX_DIGITS: usize = 3;
}

/// Timings of the cosmetic transitions between screens and questions
pub mod transition {
    use web_time::Duration;

    /// Time between confirming the settings and revealing the first question
    pub const START_REVEAL_DELAY: Duration = Duration::from_millis(1500);
    /// Time the correct/incorrect feedback stays on screen before advancing
    pub const FEEDBACK_DELAY: Duration = Duration::from_millis(1000);
    /// Time between advancing and revealing the next question
    pub const NEXT_REVEAL_DELAY: Duration = Duration::from_millis(1000);
}
