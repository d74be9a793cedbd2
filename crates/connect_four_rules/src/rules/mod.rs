//! Game rules for Connect Four.
//!
//! This module contains pure functions for evaluating a board
//! according to Connect Four rules. Rules are separated from board
//! storage so the reducer and the contracts can share them.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{CONNECT, winner};
