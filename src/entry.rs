//! Content-addressed entries published to the shared store.
//!
//! An entry's identity is the Blake3 hash of its canonical JSON encoding, so
//! two peers holding the same entry always agree on its address.

use connect_four_rules::{BoardSize, MoveType, Player};
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Domain separator mixed into every entry hash.
const ENTRY_HASH_PREFIX: &[u8] = b"connect-four:entry:";

/// A 32-byte content hash (Blake3), rendered as 64 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryHash([u8; 32]);

impl EntryHash {
    /// Length of the hex rendering.
    pub const HEX_LEN: usize = 64;

    /// Create a hash from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash an encoded entry.
    pub fn digest(encoded: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ENTRY_HASH_PREFIX);
        hasher.update(encoded);
        Self(*hasher.finalize().as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }

    /// First eight hex characters, for log lines.
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl std::fmt::Display for EntryHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for EntryHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntryHash({}...)", self.short())
    }
}

impl FromStr for EntryHash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for EntryHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EntryHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque identifier of an agent (a peer acting as a player).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an agent identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AgentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One match between two agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct GameEntry {
    /// The creator.
    player_one: AgentId,
    /// The invited opponent, who opens.
    player_two: AgentId,
    /// Logical timestamp supplied by the creator.
    created_at: u32,
    /// Board geometry every peer validates against.
    board: BoardSize,
}

impl GameEntry {
    /// Seat held by `agent`, if the agent plays in this game.
    pub fn seat_of(&self, agent: &AgentId) -> Option<Player> {
        if *agent == self.player_one {
            Some(Player::One)
        } else if *agent == self.player_two {
            Some(Player::Two)
        } else {
            None
        }
    }

    /// Agent sitting in `seat`.
    pub fn agent_for(&self, seat: Player) -> &AgentId {
        match seat {
            Player::One => &self.player_one,
            Player::Two => &self.player_two,
        }
    }
}

/// One turn, linked to its causal parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct MoveEntry {
    /// Game this move belongs to.
    game: EntryHash,
    /// Agent that authored the move.
    author: AgentId,
    /// What the author does.
    move_type: MoveType,
    /// Logical timestamp supplied by the author. Never used for ordering.
    timestamp: u32,
    /// Move this one was built on, `None` for the first move.
    previous_move: Option<EntryHash>,
}

/// Unit of publication in the shared store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entry {
    /// A game creation.
    Game(GameEntry),
    /// A move.
    Move(MoveEntry),
}

impl Entry {
    /// Canonical encoding used for hashing and transport.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decodes an entry from its canonical encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Content address of this entry.
    pub fn address(&self) -> Result<EntryHash, serde_json::Error> {
        Ok(EntryHash::digest(&self.encode()?))
    }

    /// Short name of the entry kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Game(_) => "game",
            Entry::Move(_) => "move",
        }
    }
}

impl From<GameEntry> for Entry {
    fn from(game: GameEntry) -> Self {
        Entry::Game(game)
    }
}

impl From<MoveEntry> for Entry {
    fn from(game_move: MoveEntry) -> Self {
        Entry::Move(game_move)
    }
}
