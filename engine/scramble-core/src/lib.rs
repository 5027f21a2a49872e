//! Core engine for Memory Scramble
//!
//! A shared, mutable grid of cards that many concurrent players flip, watch and
//! rewrite. This crate provides:
//! - `Board`: the engine exposing `look`, `flip`, `watch` and `map`
//! - `Card` / `Position`: validated card values and grid coordinates
//! - `BoardError`: every failure the engine can report
//! - Board-file parsing (`Board::parse`, `Board::from_file`)
//!
//! All board state lives behind a single lock. Blocking operations (`flip` on a
//! card held by someone else, `watch`) register a one-shot wake-up token while
//! holding the lock and await it only after releasing the lock.

mod board;
mod card;
mod error;
mod flip;
mod grid;
mod map;
mod parse;
mod render;
mod state;
mod tracker;
mod waiters;

pub use board::Board;
pub use card::{Card, Position};
pub use error::{BoardError, Result};
