//! Screen flow of the app
//!
//! [`App`] owns the settings and at most one [`GameSession`], and moves
//! between the settings screen and the game screen. Transitions that the
//! player should see happen after a delay: the app hands an
//! [`AlarmMessage`] and a duration to a caller supplied scheduler and acts
//! on it once it comes back through [`App::receive_alarm`]. Each alarm is
//! tagged with the round it was scheduled in, so starting over silently
//! cancels everything still in flight.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::Duration;

use crate::{
    config::{self, GameConfig},
    constants::{settings::QUESTION_COUNT_OPTIONS, transition::*},
    game::{AdvanceResult, AnswerRecord, GameSession, SubmitResult},
    keypad::Key,
    session::Tunnel,
};

/// Errors returned by screen transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested settings are invalid
    #[error(transparent)]
    Config(#[from] config::Error),
    /// Settings can only change, and a game only start, from the settings screen
    #[error("a game is already in progress")]
    GameInProgress,
}

/// The screen currently shown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Screen {
    /// Choosing the question count and max times table
    Settings,
    /// Playing through a session
    Game(Box<GameSession>),
}

/// Delayed transitions, handed to the scheduler and delivered back later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Show the question at `index` once it has slid in
    RevealQuestion {
        /// Round the alarm belongs to
        round: u64,
        /// Question to reveal
        index: usize,
    },
    /// Leave the feedback for the question at `index` and move on
    Advance {
        /// Round the alarm belongs to
        round: u64,
        /// Question that was answered
        index: usize,
    },
}

/// Final results shown when the game ends
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMessage {
    /// Number of correct answers
    pub score: usize,
    /// Number of questions asked
    pub count: usize,
    /// Every submitted answer in order
    pub answers: Vec<AnswerRecord>,
}

impl SummaryMessage {
    fn from_session(session: &GameSession) -> Self {
        Self {
            score: session.score(),
            count: session.len(),
            answers: session.history().to_vec(),
        }
    }
}

/// Incremental changes sent to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub enum UpdateMessage {
    /// The settings changed
    Settings {
        /// Selected number of questions
        question_count: usize,
        /// Selected max times table
        max_multiplier: u32,
    },
    /// A question is current but still hidden behind a transition
    QuestionHidden {
        /// Index of the question (0-indexing)
        index: usize,
        /// Total number of questions
        count: usize,
    },
    /// A question becomes visible
    QuestionAnnouncement {
        /// Index of the question (0-indexing)
        index: usize,
        /// Total number of questions
        count: usize,
        /// Question text
        prompt: String,
    },
    /// The answer display changed
    Input {
        /// Text of the answer display
        answer: String,
        /// Whether the submit key is enabled
        can_submit: bool,
    },
    /// An answer was checked; the keypad is disabled until the next question
    Feedback {
        /// Whether the answer was right
        result: SubmitResult,
        /// The submitted answer
        answer: String,
    },
    /// The game ended
    Summary(SummaryMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Complete state of the current screen
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub enum SyncMessage {
    /// The settings screen
    Settings {
        /// Selected number of questions
        question_count: usize,
        /// Selected max times table
        max_multiplier: u32,
        /// Question counts the player can pick from
        question_count_options: Vec<usize>,
    },
    /// The game screen while questions remain
    Question {
        /// Index of the question (0-indexing)
        index: usize,
        /// Total number of questions
        count: usize,
        /// Question text, absent while a transition hides it
        prompt: Option<String>,
        /// Text of the answer display
        answer: String,
        /// Whether the submit key is enabled
        can_submit: bool,
        /// Whether the keypad is disabled
        input_locked: bool,
        /// Result of the last submission while it is being shown
        feedback: Option<SubmitResult>,
        /// Correct answers so far
        score: usize,
    },
    /// The game screen after the last question
    Summary(SummaryMessage),
}

impl SyncMessage {
    /// Converts the sync message to a JSON string
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Owner of the settings and the running game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    /// Settings used for the next session
    config: GameConfig,
    /// Screen being shown
    screen: Screen,
    /// Incremented whenever a session starts or is abandoned
    round: u64,
    /// Whether the current question is hidden behind a transition
    revealing: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Opens the app on the settings screen with the default settings
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            screen: Screen::Settings,
            round: 0,
            revealing: false,
        }
    }

    /// Settings used for the next session
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Screen being shown
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The running session, if any
    pub fn session(&self) -> Option<&GameSession> {
        match &self.screen {
            Screen::Game(session) => Some(session),
            Screen::Settings => None,
        }
    }

    /// Current round number
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Whether the current question is hidden behind a transition
    pub fn is_revealing(&self) -> bool {
        self.revealing
    }

    /// Whether the keypad is disabled
    ///
    /// The keypad is disabled while feedback for a submitted answer is
    /// shown and after the last question.
    pub fn is_input_locked(&self) -> bool {
        self.session()
            .is_none_or(|session| session.is_over() || session.current_result().is_some())
    }

    /// Changes the number of questions
    ///
    /// # Errors
    ///
    /// Returns [`Error::GameInProgress`] outside the settings screen and
    /// [`Error::Config`] if the count is zero.
    pub fn set_question_count<T: Tunnel>(
        &mut self,
        question_count: usize,
        tunnel: &T,
    ) -> Result<(), Error> {
        self.ensure_settings()?;
        self.config = self.config.with_question_count(question_count)?;
        self.announce_settings(tunnel);
        Ok(())
    }

    /// Changes the max times table
    ///
    /// # Errors
    ///
    /// Returns [`Error::GameInProgress`] outside the settings screen and
    /// [`Error::Config`] if the value is outside `[2, 12]`.
    pub fn set_max_multiplier<T: Tunnel>(
        &mut self,
        max_multiplier: u32,
        tunnel: &T,
    ) -> Result<(), Error> {
        self.ensure_settings()?;
        self.config = self.config.with_max_multiplier(max_multiplier)?;
        self.announce_settings(tunnel);
        Ok(())
    }

    /// Leaves the settings screen and starts a game
    ///
    /// The first question stays hidden until the scheduled
    /// [`AlarmMessage::RevealQuestion`] arrives.
    ///
    /// # Errors
    ///
    /// Returns [`Error::GameInProgress`] if a game is already running.
    pub fn start<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        schedule_message: S,
        tunnel: &T,
    ) -> Result<(), Error> {
        self.ensure_settings()?;
        self.play_again(schedule_message, tunnel)
    }

    /// Starts a fresh game with the current settings
    ///
    /// Works from either screen and abandons any game in progress along
    /// with its pending alarms.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the stored settings fail validation.
    pub fn play_again<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        mut schedule_message: S,
        tunnel: &T,
    ) -> Result<(), Error> {
        match &mut self.screen {
            Screen::Game(session) => session.reset(self.config)?,
            screen @ Screen::Settings => {
                *screen = Screen::Game(Box::new(GameSession::create(self.config)?));
            }
        }

        self.round += 1;
        self.revealing = true;

        tracing::debug!(round = self.round, config = ?self.config, "game started");

        if let Screen::Game(session) = &self.screen {
            tunnel.send_message(&UpdateMessage::QuestionHidden {
                index: 0,
                count: session.len(),
            });
        }
        schedule_message(
            AlarmMessage::RevealQuestion {
                round: self.round,
                index: 0,
            },
            START_REVEAL_DELAY,
        );

        Ok(())
    }

    /// Abandons the current game and returns to the settings screen
    ///
    /// The settings go back to their defaults.
    pub fn new_game<T: Tunnel>(&mut self, tunnel: &T) {
        self.round += 1;
        self.revealing = false;
        self.config = GameConfig::default();
        self.screen = Screen::Settings;

        tracing::debug!(round = self.round, "back to settings");

        self.announce_settings(tunnel);
    }

    /// Handles a keypad press
    ///
    /// Ignored outside a game and while the keypad is disabled. Submitting
    /// is ignored unless [`GameSession::can_submit`] allows it; otherwise the
    /// feedback is announced and an [`AlarmMessage::Advance`] is scheduled.
    pub fn press<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        key: Key,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        if self.is_input_locked() {
            tracing::trace!(?key, "keypad locked");
            return;
        }
        let Screen::Game(session) = &mut self.screen else {
            return;
        };

        match key {
            Key::Digit(digit) => session.append_digit(digit),
            Key::Clear => session.clear_answer(),
            Key::Submit => {
                if !session.can_submit() {
                    return;
                }
                let result = session.submit_answer();
                tunnel.send_message(&UpdateMessage::Feedback {
                    result,
                    answer: session.pending_answer().to_owned(),
                });
                schedule_message(
                    AlarmMessage::Advance {
                        round: self.round,
                        index: session.current_index(),
                    },
                    FEEDBACK_DELAY,
                );
                return;
            }
        }

        tunnel.send_message(&UpdateMessage::Input {
            answer: session.answer_input().display().to_owned(),
            can_submit: session.can_submit(),
        });
    }

    /// Acts on an alarm previously handed to the scheduler
    ///
    /// Alarms from an earlier round or for a question that is no longer
    /// current are ignored.
    pub fn receive_alarm<T: Tunnel, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        alarm: AlarmMessage,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        let Screen::Game(session) = &mut self.screen else {
            tracing::trace!(?alarm, "alarm outside a game");
            return;
        };

        match alarm {
            AlarmMessage::Advance { round, index }
                if round == self.round && index == session.current_index() =>
            {
                match session.advance() {
                    AdvanceResult::NextQuestion(next) => {
                        self.revealing = true;
                        tunnel.send_message(&UpdateMessage::QuestionHidden {
                            index: next,
                            count: session.len(),
                        });
                        schedule_message(
                            AlarmMessage::RevealQuestion {
                                round: self.round,
                                index: next,
                            },
                            NEXT_REVEAL_DELAY,
                        );
                    }
                    AdvanceResult::GameOver(..) => {
                        self.revealing = false;
                        tunnel.send_message(&UpdateMessage::Summary(
                            SummaryMessage::from_session(session),
                        ));
                    }
                }
            }
            AlarmMessage::RevealQuestion { round, index }
                if round == self.round && index == session.current_index() && self.revealing =>
            {
                self.revealing = false;
                if let Some(question) = session.current_question() {
                    tunnel.send_message(&UpdateMessage::QuestionAnnouncement {
                        index,
                        count: session.len(),
                        prompt: question.prompt().to_owned(),
                    });
                }
            }
            _ => {
                tracing::trace!(?alarm, round = self.round, "stale alarm ignored");
            }
        }
    }

    /// Sends the complete state of the current screen
    pub fn sync<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&self.state_message());
    }

    fn state_message(&self) -> SyncMessage {
        match &self.screen {
            Screen::Settings => SyncMessage::Settings {
                question_count: self.config.question_count(),
                max_multiplier: self.config.max_multiplier(),
                question_count_options: QUESTION_COUNT_OPTIONS.to_vec(),
            },
            Screen::Game(session) if session.is_over() => {
                SyncMessage::Summary(SummaryMessage::from_session(session))
            }
            Screen::Game(session) => SyncMessage::Question {
                index: session.current_index(),
                count: session.len(),
                prompt: if self.revealing {
                    None
                } else {
                    session.current_prompt().map(str::to_owned)
                },
                answer: session.answer_input().display().to_owned(),
                can_submit: session.can_submit(),
                input_locked: self.is_input_locked(),
                feedback: session.current_result(),
                score: session.score(),
            },
        }
    }

    fn ensure_settings(&self) -> Result<(), Error> {
        match self.screen {
            Screen::Settings => Ok(()),
            Screen::Game(_) => Err(Error::GameInProgress),
        }
    }

    fn announce_settings<T: Tunnel>(&self, tunnel: &T) {
        tracing::debug!(config = ?self.config, "settings changed");
        tunnel.send_message(&UpdateMessage::Settings {
            question_count: self.config.question_count(),
            max_multiplier: self.config.max_multiplier(),
        });
    }
}
