//! # Times Tables Game Library
//!
//! This library provides the game logic for a single-player multiplication
//! quiz. It generates random times table questions, collects keypad input,
//! scores answers and drives the settings and game screens through timed
//! transitions, while leaving all drawing to the caller.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod app;
pub mod config;
pub mod constants;
pub mod game;
pub mod keypad;
pub mod question;
pub mod session;

pub use app::App;
pub use config::GameConfig;
pub use game::{AdvanceResult, GameSession, SubmitResult};
pub use keypad::{Digit, Key};
pub use question::Question;
pub use session::Tunnel;
