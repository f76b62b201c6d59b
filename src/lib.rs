//! fitlink - Workout routines and live training session tracker

pub mod db;
pub mod exercises;
pub mod routine;
pub mod session;
pub mod tui;

pub use db::Database;
