//! Game lifecycle manager.
//!
//! A [`GameManager`] acts for one agent against one store handle. It creates
//! games, authors moves and answers queries about a game's derived state.

use crate::chain::CanonicalChain;
use crate::entry::{AgentId, Entry, EntryHash, GameEntry, MoveEntry};
use crate::error::{GameError, ValidationError};
use crate::store::{ContentStore, LinkTag, StoreError};
use crate::validation::{validate_game, validate_on_chain};
use connect_four_rules::{Board, BoardSize, MoveType, Outcome, Player};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Request to play a move on the current tip of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct NewMove {
    /// Game to play in.
    game: EntryHash,
    /// What to do.
    move_type: MoveType,
    /// Logical timestamp recorded in the entry.
    timestamp: u32,
}

/// Derived view of a game at its canonical tip.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameState {
    /// Address of the game entry.
    game: EntryHash,
    /// Board after the last accepted move.
    board: Board,
    /// Seat to move next.
    next_to_move: Player,
    /// Agent holding that seat.
    next_agent: AgentId,
    /// Whether the game is running, won or drawn.
    outcome: Outcome,
    /// Number of accepted moves.
    moves: usize,
    /// Last accepted move.
    tip: Option<EntryHash>,
    /// Winning agent, if any.
    winner: Option<AgentId>,
}

impl GameState {
    /// Builds the view from a resolved chain.
    pub fn from_chain(chain: &CanonicalChain) -> Self {
        let state = chain.state();
        let next_to_move = *state.next_to_move();
        Self {
            game: *chain.game_id(),
            board: state.board().clone(),
            next_to_move,
            next_agent: chain.game().agent_for(next_to_move).clone(),
            outcome: *state.outcome(),
            moves: chain.len(),
            tip: chain.tip(),
            winner: state
                .outcome()
                .winner()
                .map(|seat| chain.game().agent_for(seat).clone()),
        }
    }

    /// Board dump followed by a status line.
    pub fn render(&self) -> String {
        let status = match self.outcome {
            Outcome::InProgress => format!(
                "{} ({}) to move",
                self.next_agent,
                self.next_to_move.symbol()
            ),
            Outcome::Won(seat) => match &self.winner {
                Some(agent) => format!("{} ({}) wins", agent, seat.symbol()),
                None => format!("{} wins", seat),
            },
            Outcome::Draw => "Draw".to_string(),
        };
        format!("{}\n{}", self.board.render(), status)
    }
}

/// Creates games and authors moves on behalf of one agent.
#[derive(Debug)]
pub struct GameManager<S> {
    store: Arc<S>,
    agent: AgentId,
    board: BoardSize,
}

impl<S> Clone for GameManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            agent: self.agent.clone(),
            board: self.board,
        }
    }
}

impl<S: ContentStore> GameManager<S> {
    /// Creates a manager that plays on the standard board.
    #[instrument(skip(store), fields(agent = %agent))]
    pub fn new(store: Arc<S>, agent: AgentId) -> Self {
        Self {
            store,
            agent,
            board: BoardSize::STANDARD,
        }
    }

    /// Uses `board` for games this manager creates.
    pub fn with_board(mut self, board: BoardSize) -> Self {
        self.board = board;
        self
    }

    /// Agent this manager acts for.
    pub fn agent(&self) -> &AgentId {
        &self.agent
    }

    /// Board size used for new games.
    pub fn board(&self) -> BoardSize {
        self.board
    }

    /// Store handle shared with other peers.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Starts a game against `opponent`, who makes the first move.
    ///
    /// # Errors
    ///
    /// - [`GameError::InvalidOpponent`] if `opponent` is this agent
    /// - [`GameError::InvalidBoardSize`] if the configured board is unplayable
    /// - [`GameError::StoreUnavailable`] if the store fails
    #[instrument(skip(self), fields(agent = %self.agent, board = %self.board))]
    pub async fn create_game(
        &self,
        opponent: AgentId,
        timestamp: u32,
    ) -> Result<EntryHash, GameError> {
        let game = GameEntry::new(self.agent.clone(), opponent, timestamp, self.board);
        validate_game(&game)?;

        let id = self.store.publish(Entry::Game(game)).await?;
        info!(game = %id.short(), "Game created");
        Ok(id)
    }

    /// Plays a move on the current tip of the game.
    ///
    /// # Errors
    ///
    /// See [`GameManager::submit_move`].
    #[instrument(skip(self), fields(agent = %self.agent, game = %new_move.game().short()))]
    pub async fn make_move(&self, new_move: NewMove) -> Result<EntryHash, ValidationError> {
        let chain = self.resolve(new_move.game()).await?;

        // A retry of a request whose move already became the tip.
        if let Some(last) = chain.moves().last() {
            let replayed = MoveEntry::new(
                new_move.game,
                self.agent.clone(),
                new_move.move_type,
                new_move.timestamp,
                *last.entry().previous_move(),
            );
            if replayed == *last.entry() {
                debug!(move_hash = %last.hash().short(), "Move already accepted");
                return Ok(*last.hash());
            }
        }

        let candidate = MoveEntry::new(
            new_move.game,
            self.agent.clone(),
            new_move.move_type,
            new_move.timestamp,
            chain.tip(),
        );
        self.submit_move(candidate).await
    }

    /// Validates and publishes a fully formed move.
    ///
    /// Submitting a move that is already accepted returns its hash. The tip
    /// is read again just before publishing. The `NextMove` link is written
    /// last; after it the move must be the first valid successor of its
    /// parent, and a move that lost the race stays in the store as a fork
    /// every peer ignores.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownGame`] if the game does not exist
    /// - [`ValidationError::UnknownParent`] if the parent is not an accepted move
    /// - [`ValidationError::StaleParent`] if another move already extends the parent
    /// - [`ValidationError::Rule`] if the move breaks a game rule
    /// - [`ValidationError::StoreUnavailable`] if the store fails; resubmitting
    ///   the same move is safe
    #[instrument(skip_all, fields(agent = %self.agent, game = %candidate.game().short()))]
    pub async fn submit_move(&self, candidate: MoveEntry) -> Result<EntryHash, ValidationError> {
        let game = *candidate.game();
        let parent = *candidate.previous_move();
        let hash = Entry::Move(candidate.clone())
            .address()
            .map_err(StoreError::from)?;

        let chain = self.resolve(&game).await?;
        if chain.contains(&hash) {
            debug!(move_hash = %hash.short(), "Move already accepted");
            return Ok(hash);
        }

        let accepted = validate_on_chain(chain, &candidate)?;
        debug!(outcome = %accepted.state().outcome(), "Candidate passed validation");

        self.resolve(&game).await?.check_parent(parent)?;

        self.store.publish(Entry::Move(candidate)).await?;
        self.store.link(&game, &hash, LinkTag::Moves).await?;
        self.store
            .link(&parent.unwrap_or(game), &hash, LinkTag::NextMove)
            .await?;

        let confirmed = self.resolve(&game).await?;
        if !confirmed.contains(&hash) {
            warn!(move_hash = %hash.short(), "Another move claimed the parent first");
            return Err(ValidationError::StaleParent {
                tip: confirmed.tip(),
            });
        }

        info!(
            move_hash = %hash.short(),
            moves = confirmed.len(),
            outcome = %confirmed.state().outcome(),
            "Move accepted"
        );
        Ok(hash)
    }

    /// Fetches the game entry.
    ///
    /// # Errors
    ///
    /// - [`GameError::UnknownGame`] if `game` is not a game entry
    /// - [`GameError::StoreUnavailable`] if the store fails
    #[instrument(skip(self), fields(game = %game.short()))]
    pub async fn get_game(&self, game: &EntryHash) -> Result<GameEntry, GameError> {
        match self.store.get_entry(game).await? {
            Some(Entry::Game(entry)) => Ok(entry),
            _ => Err(GameError::UnknownGame(*game)),
        }
    }

    /// Accepted moves of the game in causal order.
    #[instrument(skip(self), fields(game = %game.short()))]
    pub async fn get_moves(&self, game: &EntryHash) -> Result<Vec<MoveEntry>, ValidationError> {
        Ok(self.resolve(game).await?.entries())
    }

    /// Board, turn and outcome at the canonical tip.
    #[instrument(skip(self), fields(game = %game.short()))]
    pub async fn get_state(&self, game: &EntryHash) -> Result<GameState, ValidationError> {
        Ok(GameState::from_chain(&self.resolve(game).await?))
    }

    /// Hash of the last accepted move, `None` before the first move.
    #[instrument(skip(self), fields(game = %game.short()))]
    pub async fn tip(&self, game: &EntryHash) -> Result<Option<EntryHash>, ValidationError> {
        Ok(self.resolve(game).await?.tip())
    }

    /// Resolves the canonical chain of the game.
    pub async fn resolve(&self, game: &EntryHash) -> Result<CanonicalChain, ValidationError> {
        CanonicalChain::resolve(self.store.as_ref(), game).await
    }
}
