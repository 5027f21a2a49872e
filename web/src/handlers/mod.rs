//! HTTP request handlers.

mod board;
mod health;

pub use board::*;
pub use health::*;
