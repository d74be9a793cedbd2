//! Canonical chain resolution.
//!
//! Every peer derives a game's accepted history the same way: start at the
//! game entry, follow `NextMove` links in acceptance order and take the first
//! linked move that passes the rules against the replay so far. Moves that
//! fail (forged forks, out-of-turn moves, moves for another game) are ignored,
//! as are links to entries this peer has not received yet.

use crate::entry::{Entry, EntryHash, GameEntry, MoveEntry};
use crate::error::ValidationError;
use crate::store::{ContentStore, LinkTag, StoreError};
use crate::validation::check_successor;
use connect_four_rules::{Play, Replay};
use derive_getters::Getters;
use tracing::{debug, instrument, warn};

/// An accepted move together with its content hash.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct LinkedMove {
    /// Address of the move entry.
    hash: EntryHash,
    /// The move itself.
    entry: MoveEntry,
}

/// Accepted history of one game, as seen by this peer.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CanonicalChain {
    /// Address of the game entry.
    game_id: EntryHash,
    /// The game entry.
    game: GameEntry,
    /// Accepted moves in causal order.
    moves: Vec<LinkedMove>,
    /// Replay state after the last accepted move.
    state: Replay,
}

impl CanonicalChain {
    /// Walks the game's history and re-validates every move on the way.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownGame`] if `game_id` is not a game entry
    /// - [`ValidationError::StoreUnavailable`] if the store fails
    #[instrument(skip(store), fields(game = %game_id.short()))]
    pub async fn resolve<S>(store: &S, game_id: &EntryHash) -> Result<Self, ValidationError>
    where
        S: ContentStore + ?Sized,
    {
        let game = match store.get_entry(game_id).await? {
            Some(Entry::Game(game)) => game,
            Some(other) => {
                debug!(kind = other.kind(), "Hash names a non-game entry");
                return Err(ValidationError::UnknownGame(*game_id));
            }
            None => return Err(ValidationError::UnknownGame(*game_id)),
        };

        let mut chain = Self {
            game_id: *game_id,
            state: Replay::start(*game.board()),
            game,
            moves: Vec::new(),
        };

        while let Some((linked, state)) = chain.first_valid_successor(store).await? {
            chain.moves.push(linked);
            chain.state = state;
        }

        debug!(
            moves = chain.moves.len(),
            outcome = %chain.state.outcome(),
            "Resolved canonical chain"
        );
        Ok(chain)
    }

    /// Finds the first move linked from the tip that is a valid successor.
    async fn first_valid_successor<S>(
        &self,
        store: &S,
    ) -> Result<Option<(LinkedMove, Replay)>, ValidationError>
    where
        S: ContentStore + ?Sized,
    {
        let anchor = self.anchor();
        for hash in store.get_links(&anchor, LinkTag::NextMove).await? {
            let Some(entry) = store.get_entry(&hash).await? else {
                debug!(hash = %hash.short(), "Linked move not held yet, skipping");
                continue;
            };

            if entry.address().map_err(StoreError::from)? != hash {
                warn!(hash = %hash.short(), "Linked entry does not match its address, skipping");
                continue;
            }

            let Entry::Move(candidate) = entry else {
                warn!(hash = %hash.short(), "Linked entry is not a move, skipping");
                continue;
            };

            if *candidate.game() != self.game_id || *candidate.previous_move() != self.tip() {
                debug!(hash = %hash.short(), "Linked move belongs to another parent, skipping");
                continue;
            }

            match check_successor(&self.game, &self.state, &candidate) {
                Ok(state) => return Ok(Some((LinkedMove { hash, entry: candidate }, state))),
                Err(reason) => {
                    warn!(hash = %hash.short(), %reason, "Ignoring linked move that breaks the rules");
                }
            }
        }
        Ok(None)
    }

    /// Entry the next move must link from: the tip, or the game at the root.
    pub fn anchor(&self) -> EntryHash {
        self.tip().unwrap_or(self.game_id)
    }

    /// Hash of the last accepted move, `None` before the first move.
    pub fn tip(&self) -> Option<EntryHash> {
        self.moves.last().map(|m| m.hash)
    }

    /// Returns true if `hash` is an accepted move of this game.
    pub fn contains(&self, hash: &EntryHash) -> bool {
        self.moves.iter().any(|m| m.hash == *hash)
    }

    /// Number of accepted moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// Returns true before the first accepted move.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Accepted moves in causal order, without their hashes.
    pub fn entries(&self) -> Vec<MoveEntry> {
        self.moves.iter().map(|m| m.entry.clone()).collect()
    }

    /// Accepted moves as seat-resolved plays.
    pub fn plays(&self) -> &[Play] {
        self.state.history()
    }

    /// Checks that `parent` is the tip a new move must build on.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownParent`] if `parent` is not an accepted move
    /// - [`ValidationError::StaleParent`] if another move already extends it
    #[instrument(skip(self), fields(game = %self.game_id.short(), moves = self.moves.len()))]
    pub fn check_parent(&self, parent: Option<EntryHash>) -> Result<(), ValidationError> {
        if let Some(p) = parent.filter(|p| !self.contains(p)) {
            debug!(parent = %p.short(), "Parent is not an accepted move");
            return Err(ValidationError::UnknownParent(p));
        }

        if parent != self.tip() {
            debug!("Parent is behind the tip");
            return Err(ValidationError::StaleParent { tip: self.tip() });
        }

        Ok(())
    }
}
