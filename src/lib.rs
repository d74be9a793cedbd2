//! Distributed Connect Four - peer-validated game core
//!
//! Two agents play Connect Four over a content-addressed store. Each agent
//! publishes its own moves; every peer re-validates the causal chain of moves
//! it receives and derives the same board from it.
//!
//! # Architecture
//!
//! - **Entries**: immutable game and move entries addressed by Blake3 hash
//! - **Store**: the storage substrate seam plus an in-memory implementation
//! - **Chain**: canonical history resolution with per-peer re-validation
//! - **Validation**: the ordered checks every candidate move goes through
//! - **Lifecycle**: game creation, move authoring and state queries
//!
//! The board, reducer and rule contracts live in the `connect_four_rules`
//! crate.
//!
//! # Example
//!
//! ```
//! use connect_four_rules::{Cell, MoveType, Player};
//! use distributed_connect_four::{GameManager, MemoryStore, NewMove};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let alice = GameManager::new(Arc::clone(&store), "alice".into());
//! let bob = GameManager::new(store, "bob".into());
//!
//! let game = alice.create_game("bob".into(), 0).await?;
//! bob.make_move(NewMove::new(game, MoveType::DropPiece { column: 3 }, 1)).await?;
//!
//! let state = alice.get_state(&game).await?;
//! assert_eq!(state.board().get(3, 0), Some(Cell::Occupied(Player::Two)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod chain;
mod config;
mod entry;
mod error;
mod lifecycle;
mod store;
mod validation;

pub mod telemetry;

// Crate-level exports - Entries
pub use entry::{AgentId, Entry, EntryHash, GameEntry, MoveEntry};

// Crate-level exports - Storage
pub use store::{ContentStore, LinkTag, MemoryStore, StoreError};

// Crate-level exports - Validation
pub use chain::{CanonicalChain, LinkedMove};
pub use error::{GameError, ValidationError};
pub use validation::{
    AcceptedMove, check_successor, validate_game, validate_move, validate_on_chain,
};

// Crate-level exports - Lifecycle
pub use lifecycle::{GameManager, GameState, NewMove};

// Crate-level exports - Configuration
pub use config::{ConfigError, NodeConfig};
