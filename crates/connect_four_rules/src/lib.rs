//! Pure Connect Four game logic.
//!
//! Everything in this crate is deterministic and free of I/O so that every
//! peer evaluating the same move history reaches the same verdict.
//!
//! # Architecture
//!
//! - **Board**: geometry, piece placement, plain-text rendering
//! - **Rules**: win and draw detection
//! - **Replay**: the move history reducer
//! - **Contracts**: move preconditions and postconditions
//! - **Invariants**: properties every replay state satisfies
//!
//! # Example
//!
//! ```
//! use connect_four_rules::{BoardSize, Outcome, Play, Player, replay};
//!
//! let plays = [Play::drop_piece(Player::Two, 3), Play::drop_piece(Player::One, 3)];
//! let state = replay(BoardSize::STANDARD, &plays).unwrap();
//! assert_eq!(*state.outcome(), Outcome::InProgress);
//! assert_eq!(*state.next_to_move(), Player::Two);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod contracts;
mod invariants;
mod replay;
mod rules;
mod types;

pub use action::{MoveError, MoveType, Play};
pub use board::{Board, BoardSize};
pub use contracts::{Contract, GameNotOver, LegalMove, MoveContract, MoveFits, PlayersTurn};
pub use invariants::{
    AlternatingTurnInvariant, GravityInvariant, HistoryConsistentInvariant, Invariant,
    InvariantSet, InvariantViolation, ReplayInvariants,
};
pub use replay::{Replay, replay};
pub use rules::{CONNECT, is_draw, is_full, winner};
pub use types::{Cell, Outcome, Player};
