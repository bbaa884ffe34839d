//! # Streakboard
//!
//! A terminal goal-tracking dashboard. Define goals with a daily time target,
//! log the minutes you spend each day, and watch your progress and streaks grow.
//! After each log a coach replies with a short motivational message.
//!
//! The library holds the data model ([`models`]), the repository and its
//! persistence port ([`repository`], [`storage`]), the streak/progress
//! calculator ([`progress`]), and the lifecycle manager ([`manager`]) that the
//! CLI and TUI drive.

pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod manager;
pub mod models;
pub mod motivation;
pub mod progress;
pub mod repository;
pub mod storage;
pub mod tui;

pub use error::{Error, Result};
