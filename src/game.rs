//! Core game session logic
//!
//! This module contains [`GameSession`], the state of one play-through:
//! the generated questions, the current position, the score and the
//! answer being typed. All operations are synchronous and never depend on
//! wall-clock time; any delays between them are up to the caller.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    config::{self, Error, GameConfig},
    keypad::{AnswerInput, Digit},
    question::{self, Question},
};

/// Outcome of submitting an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitResult {
    /// The answer matched the product
    Correct,
    /// The answer did not match the product
    Incorrect,
}

/// Outcome of moving past the current question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceResult {
    /// The question at this index is now current
    NextQuestion(usize),
    /// No questions are left: final score and question count
    GameOver(usize, usize),
}

/// A submitted answer, kept for the end-of-game summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Index of the question that was answered
    pub index: usize,
    /// The question text
    pub prompt: String,
    /// The correct answer
    pub expected: u32,
    /// The answer that was submitted
    pub given: u32,
    /// Whether the submitted answer was correct
    pub correct: bool,
}

/// Reasons a stored session is rejected when it is deserialized
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The stored configuration is invalid
    #[error(transparent)]
    Config(#[from] config::Error),
    /// The number of questions differs from the configured count
    #[error("expected {expected} questions, found {found}")]
    QuestionCount {
        /// Configured question count
        expected: usize,
        /// Stored question count
        found: usize,
    },
    /// A question could not have been generated from the configuration
    #[error("question {0} does not fit the configuration")]
    Question(usize),
    /// The current index is past the end of the question list
    #[error("question index {index} is past the {count} questions")]
    IndexOutOfRange {
        /// Stored index
        index: usize,
        /// Number of questions
        count: usize,
    },
    /// The answer history disagrees with the index, result or score
    #[error("answer history does not match the session progress")]
    History,
    /// A finished session still holds typed digits
    #[error("finished session has a pending answer")]
    AnswerAfterEnd,
}

/// Serialization helper for GameSession, checked on the way in
#[derive(Deserialize)]
struct GameSessionSerde {
    config: GameConfig,
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    pending_answer: AnswerInput,
    current_result: Option<SubmitResult>,
    history: Vec<AnswerRecord>,
}

impl TryFrom<GameSessionSerde> for GameSession {
    type Error = LoadError;

    /// Rebuilds a session, rejecting any state the operations cannot reach
    fn try_from(serde: GameSessionSerde) -> Result<Self, Self::Error> {
        let GameSessionSerde {
            config,
            questions,
            current_index,
            score,
            pending_answer,
            current_result,
            history,
        } = serde;

        let config = config.validated()?;
        if questions.len() != config.question_count() {
            return Err(LoadError::QuestionCount {
                expected: config.question_count(),
                found: questions.len(),
            });
        }
        if let Some(index) = questions.iter().position(|q| !q.fits(&config)) {
            return Err(LoadError::Question(index));
        }
        if current_index > questions.len() {
            return Err(LoadError::IndexOutOfRange {
                index: current_index,
                count: questions.len(),
            });
        }

        let answered_current = history.last().is_some_and(|r| r.index == current_index);
        let history_fits = history.iter().tuple_windows().all(|(a, b)| a.index < b.index)
            && history.iter().all(|record| {
                record.index <= current_index
                    && questions.get(record.index).is_some_and(|q| {
                        q.prompt() == record.prompt
                            && q.answer() == record.expected
                            && q.is_correct(record.given) == record.correct
                    })
            })
            && history.iter().filter(|record| record.correct).count() == score
            && match current_result {
                Some(result) => {
                    answered_current
                        && history.last().is_some_and(|r| {
                            r.correct == matches!(result, SubmitResult::Correct)
                        })
                }
                None => !answered_current,
            };
        if !history_fits {
            return Err(LoadError::History);
        }
        if current_index == questions.len() && !pending_answer.is_empty() {
            return Err(LoadError::AnswerAfterEnd);
        }

        Ok(Self {
            config,
            questions,
            current_index,
            score,
            pending_answer,
            current_result,
            history,
        })
    }
}

/// One play-through of the quiz
///
/// The session is complete once [`GameSession::current_index`] equals the
/// number of questions, which happens when [`GameSession::advance`] is
/// called on the last question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GameSessionSerde")]
pub struct GameSession {
    /// Settings the questions were generated from
    config: GameConfig,
    /// Questions in the order they are asked
    questions: Vec<Question>,
    /// Index of the current question, equal to `questions.len()` when done
    current_index: usize,
    /// Number of correct answers so far
    score: usize,
    /// Digits typed for the current question
    pending_answer: AnswerInput,
    /// Result of the submission for the current question, if any
    current_result: Option<SubmitResult>,
    /// Every submission made during the session
    history: Vec<AnswerRecord>,
}

impl GameSession {
    /// Creates a session with freshly generated questions
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration asks for
    /// no questions or a max multiplier outside `[2, 12]`.
    pub fn create(config: GameConfig) -> Result<Self, Error> {
        Self::with_rng(config, &mut fastrand::Rng::new())
    }

    /// Creates a session drawing its questions from `rng`
    ///
    /// # Errors
    ///
    /// Same as [`GameSession::create`].
    pub fn with_rng(config: GameConfig, rng: &mut fastrand::Rng) -> Result<Self, Error> {
        let config = config.validated()?;
        let questions = question::generate(&config, rng);

        tracing::debug!(
            question_count = config.question_count(),
            max_multiplier = config.max_multiplier(),
            "session created"
        );

        Ok(Self {
            config,
            questions,
            current_index: 0,
            score: 0,
            pending_answer: AnswerInput::default(),
            current_result: None,
            history: Vec::new(),
        })
    }

    /// Replaces this session with a new one built from `config`
    ///
    /// On error the current session is left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`GameSession::create`].
    pub fn reset(&mut self, config: GameConfig) -> Result<(), Error> {
        self.reset_with_rng(config, &mut fastrand::Rng::new())
    }

    /// Like [`GameSession::reset`], drawing the new questions from `rng`
    ///
    /// # Errors
    ///
    /// Same as [`GameSession::create`].
    pub fn reset_with_rng(
        &mut self,
        config: GameConfig,
        rng: &mut fastrand::Rng,
    ) -> Result<(), Error> {
        *self = Self::with_rng(config, rng)?;
        Ok(())
    }

    /// Types a digit into the pending answer
    ///
    /// Ignored once the session is over, when three digits are already
    /// typed, or when a zero would be the first digit.
    pub fn append_digit(&mut self, digit: Digit) {
        if self.is_over() {
            return;
        }
        self.pending_answer.push(digit);
    }

    /// Erases the pending answer
    pub fn clear_answer(&mut self) {
        self.pending_answer.clear();
    }

    /// Whether [`GameSession::submit_answer`] may be called
    ///
    /// Requires a non-empty pending answer on a question that has not been
    /// answered yet.
    pub fn can_submit(&self) -> bool {
        !self.is_over() && !self.pending_answer.is_empty() && self.current_result.is_none()
    }

    /// Checks the pending answer against the current question
    ///
    /// The score goes up by one on a correct answer. Neither the index nor
    /// the pending answer change; call [`GameSession::advance`] to move on.
    ///
    /// # Panics
    ///
    /// Panics if [`GameSession::can_submit`] is `false`. Callers are expected
    /// to disable submission instead of handling a failure.
    pub fn submit_answer(&mut self) -> SubmitResult {
        assert!(
            self.can_submit(),
            "submit_answer called with an empty answer, twice for question {}, or after the game ended",
            self.current_index
        );
        let (Some(question), Some(given)) = (self.current_question(), self.pending_answer.value())
        else {
            unreachable!("can_submit guarantees a question and a typed answer");
        };

        let correct = question.is_correct(given);
        let record = AnswerRecord {
            index: self.current_index,
            prompt: question.prompt().to_owned(),
            expected: question.answer(),
            given,
            correct,
        };

        let result = if correct {
            self.score += 1;
            SubmitResult::Correct
        } else {
            SubmitResult::Incorrect
        };

        tracing::debug!(index = self.current_index, given, ?result, "answer submitted");

        self.history.push(record);
        self.current_result = Some(result);
        result
    }

    /// Moves to the next question, or ends the game after the last one
    ///
    /// The pending answer is cleared in both cases. Once the game is over,
    /// further calls keep returning the same [`AdvanceResult::GameOver`].
    pub fn advance(&mut self) -> AdvanceResult {
        self.pending_answer.clear();
        self.current_result = None;

        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            tracing::trace!(index = self.current_index, "next question");
            AdvanceResult::NextQuestion(self.current_index)
        } else {
            if !self.is_over() {
                tracing::debug!(score = self.score, count = self.questions.len(), "game over");
            }
            self.current_index = self.questions.len();
            AdvanceResult::GameOver(self.score, self.questions.len())
        }
    }

    /// Whether every question has been passed
    pub fn is_over(&self) -> bool {
        self.current_index >= self.questions.len()
    }

    /// Index of the current question
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of correct answers so far
    pub fn score(&self) -> usize {
        self.score
    }

    /// The digits typed so far
    pub fn pending_answer(&self) -> &str {
        self.pending_answer.as_str()
    }

    /// The answer buffer, including its display form
    pub fn answer_input(&self) -> &AnswerInput {
        &self.pending_answer
    }

    /// The question being asked, `None` once the game is over
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Text of the question being asked, `None` once the game is over
    pub fn current_prompt(&self) -> Option<&str> {
        self.current_question().map(Question::prompt)
    }

    /// Result of the submission for the current question, if any
    pub fn current_result(&self) -> Option<SubmitResult> {
        self.current_result
    }

    /// All questions of the session
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions in the session
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false`; a valid session has at least one question
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Settings the session was created with
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Every submission made so far, oldest first
    pub fn history(&self) -> &[AnswerRecord] {
        &self.history
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn digit(value: u8) -> Digit {
        Digit::try_from(value).unwrap()
    }

    fn type_number(session: &mut GameSession, number: u32) {
        for c in number.to_string().chars() {
            session.append_digit(Digit::try_from(c).unwrap());
        }
    }

    fn answer_current(session: &mut GameSession, correct: bool) -> SubmitResult {
        let expected = session.current_question().unwrap().answer();
        type_number(session, if correct { expected } else { expected + 1 });
        session.submit_answer()
    }

    fn seeded(count: usize, max: u32, seed: u64) -> GameSession {
        GameSession::with_rng(
            GameConfig::new(count, max).unwrap(),
            &mut fastrand::Rng::with_seed(seed),
        )
        .unwrap()
    }

    #[test]
    fn test_create_initial_state() {
        let session = GameSession::create(GameConfig::default()).unwrap();
        assert_eq!(session.len(), 5);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.pending_answer(), "");
        assert!(!session.is_over());
        assert!(!session.can_submit());
        assert!(session.history().is_empty());
        assert!(session.current_prompt().is_some());
    }

    #[test]
    fn test_create_question_count_and_ranges() {
        for count in [1, 5, 10, 15, 20] {
            for max in 2..=12 {
                let session = seeded(count, max, u64::from(max) * 31 + count as u64);
                assert_eq!(session.questions().len(), count);
                for question in session.questions() {
                    let (a, b) = question.factors();
                    assert!((2..=max).contains(&a));
                    assert!((2..=12).contains(&b));
                    assert_eq!(question.answer(), a * b);
                }
            }
        }
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let config: GameConfig =
            serde_json::from_str(r#"{"question_count":0,"max_multiplier":5}"#).unwrap();
        assert!(matches!(
            GameSession::create(config),
            Err(Error::InvalidConfiguration(_))
        ));

        let config: GameConfig =
            serde_json::from_str(r#"{"question_count":5,"max_multiplier":1}"#).unwrap();
        assert!(GameSession::create(config).is_err());
    }

    #[test]
    fn test_clear_answer_twice() {
        let mut session = seeded(3, 5, 1);
        session.append_digit(digit(4));
        session.clear_answer();
        session.clear_answer();
        assert_eq!(session.pending_answer(), "");
    }

    #[test]
    fn test_append_digit_caps_at_three() {
        let mut session = seeded(3, 5, 2);
        for _ in 0..20 {
            session.append_digit(digit(7));
        }
        assert_eq!(session.pending_answer(), "777");
    }

    #[test]
    fn test_leading_zero_rule() {
        let mut session = seeded(3, 5, 3);
        session.append_digit(digit(0));
        assert_eq!(session.pending_answer(), "");
        session.append_digit(digit(5));
        session.append_digit(digit(0));
        assert_eq!(session.pending_answer(), "50");
    }

    #[test]
    fn test_submit_does_not_advance_or_clear() {
        let mut session = seeded(3, 5, 4);
        let result = answer_current(&mut session, true);
        assert_eq!(result, SubmitResult::Correct);
        assert_eq!(session.current_index(), 0);
        assert!(!session.pending_answer().is_empty());
        assert_eq!(session.current_result(), Some(SubmitResult::Correct));
        assert!(!session.can_submit());
    }

    #[test]
    fn test_correct_incorrect_correct_scores_two() {
        let mut session = seeded(3, 12, 5);

        assert_eq!(answer_current(&mut session, true), SubmitResult::Correct);
        assert_eq!(session.advance(), AdvanceResult::NextQuestion(1));

        assert_eq!(answer_current(&mut session, false), SubmitResult::Incorrect);
        assert_eq!(session.advance(), AdvanceResult::NextQuestion(2));

        assert_eq!(answer_current(&mut session, true), SubmitResult::Correct);
        assert_eq!(session.score(), 2);
        assert_eq!(session.advance(), AdvanceResult::GameOver(2, 3));

        assert!(session.is_over());
        assert_eq!(session.current_index(), 3);
        assert!(session.current_prompt().is_none());
    }

    #[test]
    fn test_history_records_submissions() {
        let mut session = seeded(2, 6, 6);
        let first = session.current_question().unwrap().clone();
        answer_current(&mut session, false);
        session.advance();
        answer_current(&mut session, true);

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].index, 0);
        assert_eq!(history[0].prompt, first.prompt());
        assert_eq!(history[0].expected, first.answer());
        assert_eq!(history[0].given, first.answer() + 1);
        assert!(!history[0].correct);
        assert!(history[1].correct);
    }

    #[test]
    fn test_advance_clears_pending_answer() {
        let mut session = seeded(3, 5, 7);
        session.append_digit(digit(9));
        session.advance();
        assert_eq!(session.pending_answer(), "");
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_advance_after_game_over_is_stable() {
        let mut session = seeded(1, 2, 8);
        answer_current(&mut session, true);
        assert_eq!(session.advance(), AdvanceResult::GameOver(1, 1));
        assert_eq!(session.advance(), AdvanceResult::GameOver(1, 1));
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn test_append_digit_ignored_after_game_over() {
        let mut session = seeded(1, 2, 9);
        session.advance();
        session.append_digit(digit(4));
        assert_eq!(session.pending_answer(), "");
        assert!(!session.can_submit());
    }

    #[test]
    fn test_single_question_boundary() {
        let mut session = GameSession::create(GameConfig::new(1, 2).unwrap()).unwrap();
        assert_eq!(session.len(), 1);
        let (a, b) = session.questions()[0].factors();
        assert_eq!(a, 2);
        assert!((2..=12).contains(&b));

        answer_current(&mut session, true);
        assert_eq!(session.advance(), AdvanceResult::GameOver(session.score(), 1));
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut session = seeded(4, 9, 10);
        answer_current(&mut session, true);
        session.advance();
        session.append_digit(digit(3));

        let config = GameConfig::new(10, 4).unwrap();
        session.reset(config).unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.pending_answer(), "");
        assert_eq!(session.len(), 10);
        assert_eq!(session.config(), &config);
        assert!(session.history().is_empty());
        assert!(session.current_result().is_none());
    }

    #[test]
    fn test_reset_with_invalid_config_keeps_session() {
        let mut session = seeded(4, 9, 11);
        answer_current(&mut session, true);
        let config: GameConfig =
            serde_json::from_str(r#"{"question_count":0,"max_multiplier":9}"#).unwrap();

        assert!(session.reset(config).is_err());
        assert_eq!(session.len(), 4);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn test_full_game_five_by_five() {
        let mut session = GameSession::create(GameConfig::new(5, 5).unwrap()).unwrap();
        let mut last = None;
        for round in 0..5 {
            answer_current(&mut session, round % 2 == 0);
            last = Some(session.advance());
        }
        let Some(AdvanceResult::GameOver(score, count)) = last else {
            panic!("expected game over, got {last:?}");
        };
        assert_eq!(count, 5);
        assert_eq!(score, 3);
        assert!(score <= count);
    }

    #[test]
    fn test_score_never_exceeds_submissions() {
        let mut session = seeded(6, 12, 12);
        while !session.is_over() {
            answer_current(&mut session, true);
            assert!(session.score() <= session.history().len());
            session.advance();
        }
        assert_eq!(session.score(), 6);
    }

    #[test]
    #[should_panic(expected = "submit_answer called")]
    fn test_submit_with_empty_answer_panics() {
        let mut session = seeded(2, 3, 13);
        session.submit_answer();
    }

    #[test]
    #[should_panic(expected = "submit_answer called")]
    fn test_submit_twice_panics() {
        let mut session = seeded(2, 3, 14);
        answer_current(&mut session, true);
        session.submit_answer();
    }

    fn reload(value: serde_json::Value) -> Result<GameSession, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn load_error(value: serde_json::Value) -> String {
        reload(value).unwrap_err().to_string()
    }

    #[test]
    fn test_serialized_session_reloads() {
        let mut session = seeded(3, 5, 20);
        answer_current(&mut session, true);
        session.advance();
        session.append_digit(digit(4));

        let mut reloaded = reload(serde_json::to_value(&session).unwrap()).unwrap();
        assert_eq!(reloaded.current_index(), 1);
        assert_eq!(reloaded.score(), 1);
        assert_eq!(reloaded.pending_answer(), "4");
        assert_eq!(reloaded.questions(), session.questions());
        assert_eq!(reloaded.history(), session.history());
        assert!(reloaded.can_submit());
        reloaded.submit_answer();
        assert_eq!(reloaded.history().len(), 2);
    }

    #[test]
    fn test_reload_after_submit_and_after_game_over() {
        let mut session = seeded(2, 7, 21);
        answer_current(&mut session, false);
        let reloaded = reload(serde_json::to_value(&session).unwrap()).unwrap();
        assert_eq!(reloaded.current_result(), Some(SubmitResult::Incorrect));
        assert!(!reloaded.can_submit());

        session.advance();
        answer_current(&mut session, true);
        session.advance();
        let reloaded = reload(serde_json::to_value(&session).unwrap()).unwrap();
        assert!(reloaded.is_over());
        assert_eq!(reloaded.score(), 1);
    }

    #[test]
    fn test_reload_rejects_bad_pending_answer() {
        let session = seeded(3, 5, 22);
        for bad in ["0x12", "1234", "07", "12a"] {
            let mut value = serde_json::to_value(&session).unwrap();
            value["pending_answer"] = serde_json::json!(bad);
            assert!(reload(value).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_reload_rejects_invalid_config() {
        let mut value = serde_json::to_value(seeded(3, 5, 23)).unwrap();
        value["config"]["max_multiplier"] = serde_json::json!(13);
        assert!(load_error(value).contains("invalid configuration"));
    }

    #[test]
    fn test_reload_rejects_question_count_mismatch() {
        let mut value = serde_json::to_value(seeded(3, 5, 24)).unwrap();
        value["questions"].as_array_mut().unwrap().pop();
        assert!(load_error(value).contains("expected 3 questions, found 2"));
    }

    #[test]
    fn test_reload_rejects_tampered_question() {
        let mut value = serde_json::to_value(seeded(3, 5, 25)).unwrap();
        let answer = value["questions"][1]["answer"].as_u64().unwrap();
        value["questions"][1]["answer"] = serde_json::json!(answer + 1);
        assert!(load_error(value).contains("question 1 does not fit"));

        let mut value = serde_json::to_value(seeded(3, 5, 25)).unwrap();
        value["questions"][0]["factors"] = serde_json::json!([9, 3]);
        assert!(load_error(value).contains("question 0 does not fit"));
    }

    #[test]
    fn test_reload_rejects_index_past_end() {
        let mut value = serde_json::to_value(seeded(3, 5, 26)).unwrap();
        value["current_index"] = serde_json::json!(4);
        assert!(load_error(value).contains("past the 3 questions"));
    }

    #[test]
    fn test_reload_rejects_score_without_answers() {
        let mut value = serde_json::to_value(seeded(3, 5, 27)).unwrap();
        value["score"] = serde_json::json!(2);
        assert!(load_error(value).contains("answer history"));

        let mut value = serde_json::to_value(seeded(3, 5, 27)).unwrap();
        value["current_result"] = serde_json::json!("Correct");
        assert!(load_error(value).contains("answer history"));
    }

    #[test]
    fn test_reload_rejects_pending_answer_after_game_over() {
        let mut session = seeded(1, 2, 28);
        session.advance();
        let mut value = serde_json::to_value(&session).unwrap();
        value["pending_answer"] = serde_json::json!("12");
        assert!(load_error(value).contains("pending answer"));
    }
}
