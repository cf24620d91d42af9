//! Game State Definitions
//!
//! The Game record and its identifiers.
//! Every mutation goes through a method that enforces the write-once and
//! forward-only rules, so a record can never be walked backwards.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize, Serializer, Deserializer};

use crate::core::hash::{Hash32, StateHasher};
use crate::game::error::GameError;
use crate::game::moves::{Move, Outcome};

/// Sequential, never-reused game identifier.
pub type GameId = u64;

/// Funds in base units (wei-style, 10^18 per whole coin).
pub type Amount = u128;

/// One whole coin in base units.
pub const COIN: Amount = 1_000_000_000_000_000_000;

/// Serde adapter writing amounts as decimal strings.
///
/// JSON numbers lose precision past 2^53 in most clients, and serde cannot
/// buffer `u128` inside internally tagged enums.
pub mod amount_str {
    use super::Amount;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize as a decimal string.
    pub fn serialize<S: Serializer>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(amount)
    }

    /// Parse a decimal string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// ADDRESS
// =============================================================================

/// Account address (20 bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Never a valid opponent.
    pub const ZERO: Address = Address([0; 20]);

    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Check for the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 20]
    }

    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// COMMITMENT
// =============================================================================

/// Opaque 32-byte binding value published before a move is disclosed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Commitment(pub Hash32);

impl Commitment {
    /// The zero commitment. Always rejected.
    pub const ZERO: Commitment = Commitment([0; 32]);

    /// Create from raw bytes.
    pub const fn new(bytes: Hash32) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &Hash32 {
        &self.0
    }

    /// Check for the zero commitment.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 32]
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Commitment {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Commitment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// PARTY & STATE
// =============================================================================

/// One of the two seats in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    /// The creator.
    A,
    /// The joiner.
    B,
}

impl Party {
    /// Outcome in which this party wins.
    pub fn as_winner(self) -> Outcome {
        match self {
            Party::A => Outcome::PartyA,
            Party::B => Outcome::PartyB,
        }
    }
}

/// Game lifecycle state. Transitions only move forward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GameState {
    /// Created and funded by party A; waiting for a joiner.
    AwaitingOpponent = 0,
    /// Both commitments recorded; waiting for reveals (reveal flow).
    AwaitingReveal = 1,
    /// Both commitments recorded; waiting for a proof (proof flow).
    AwaitingResolution = 2,
    /// Settled. Terminal.
    Completed = 3,
}

impl GameState {
    /// Check whether `next` is a legal forward transition from `self`.
    pub fn can_advance_to(self, next: GameState) -> bool {
        use GameState::*;
        matches!(
            (self, next),
            (AwaitingOpponent, AwaitingReveal)
                | (AwaitingOpponent, AwaitingResolution)
                | (AwaitingOpponent, Completed)
                | (AwaitingReveal, Completed)
                | (AwaitingResolution, Completed)
        )
    }

    /// Check for the terminal state.
    #[inline]
    pub fn is_terminal(self) -> bool {
        self == GameState::Completed
    }
}

/// A disclosed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    /// The plaintext move.
    pub mv: Move,
    /// When it was revealed (unix seconds).
    pub revealed_at: u64,
}

// =============================================================================
// GAME
// =============================================================================

/// The central settlement record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Sequential identifier.
    pub id: GameId,

    /// Party A: opened and funded the game.
    pub creator: Address,

    /// Party B. `None` on an open game until someone joins.
    pub opponent: Option<Address>,

    /// The opponent was fixed at creation (private game).
    pub invited: bool,

    /// Per-side deposit.
    #[serde(with = "amount_str")]
    pub stake: Amount,

    /// Funds currently held for this game.
    #[serde(with = "amount_str")]
    pub pool: Amount,

    /// Party A's commitment.
    pub commitment_a: Commitment,

    /// Party B's commitment, set on join.
    pub commitment_b: Option<Commitment>,

    /// Lifecycle state.
    pub state: GameState,

    /// Final outcome, set exactly once.
    pub winner: Option<Outcome>,

    /// Creation time (unix seconds).
    pub created_at: u64,

    /// Time of the last state-changing action (unix seconds).
    pub last_action_at: u64,

    /// Party A's disclosed move (reveal flow).
    pub reveal_a: Option<Reveal>,

    /// Party B's disclosed move (reveal flow).
    pub reveal_b: Option<Reveal>,
}

impl Game {
    /// Create a freshly opened, creator-funded game.
    pub fn open(
        id: GameId,
        creator: Address,
        opponent: Option<Address>,
        stake: Amount,
        commitment: Commitment,
        now: u64,
    ) -> Self {
        Self {
            id,
            creator,
            opponent,
            invited: opponent.is_some(),
            stake,
            pool: stake,
            commitment_a: commitment,
            commitment_b: None,
            state: GameState::AwaitingOpponent,
            winner: None,
            created_at: now,
            last_action_at: now,
            reveal_a: None,
            reveal_b: None,
        }
    }

    /// Seat held by `address`, if any.
    pub fn party_of(&self, address: &Address) -> Option<Party> {
        if *address == self.creator {
            Some(Party::A)
        } else if self.opponent.as_ref() == Some(address) {
            Some(Party::B)
        } else {
            None
        }
    }

    /// Address sitting in a seat.
    pub fn address_of(&self, party: Party) -> Option<Address> {
        match party {
            Party::A => Some(self.creator),
            Party::B => self.opponent,
        }
    }

    /// Commitment stored for a seat.
    pub fn commitment_of(&self, party: Party) -> Option<Commitment> {
        match party {
            Party::A => Some(self.commitment_a),
            Party::B => self.commitment_b,
        }
    }

    /// Reveal recorded for a seat.
    pub fn reveal_of(&self, party: Party) -> Option<&Reveal> {
        match party {
            Party::A => self.reveal_a.as_ref(),
            Party::B => self.reveal_b.as_ref(),
        }
    }

    /// Open game: anyone except the creator may join.
    pub fn is_open(&self) -> bool {
        self.state == GameState::AwaitingOpponent && !self.invited
    }

    /// Check for the terminal state.
    pub fn is_completed(&self) -> bool {
        self.state.is_terminal()
    }

    /// Bind party B. The slot never changes once bound.
    pub fn bind_opponent(&mut self, address: Address) -> Result<(), GameError> {
        if address == self.creator {
            return Err(GameError::Unauthorized);
        }
        match self.opponent {
            Some(bound) if bound != address => Err(GameError::Unauthorized),
            _ => {
                self.opponent = Some(address);
                Ok(())
            }
        }
    }

    /// Record party B's commitment. Write-once.
    pub fn set_commitment_b(&mut self, commitment: Commitment) -> Result<(), GameError> {
        if commitment.is_zero() || self.commitment_b.is_some() {
            return Err(GameError::InvalidCommitment);
        }
        self.commitment_b = Some(commitment);
        Ok(())
    }

    /// Record a seat's reveal. Each seat reveals at most once.
    pub fn record_reveal(&mut self, party: Party, mv: Move, now: u64) -> Result<(), GameError> {
        let slot = match party {
            Party::A => &mut self.reveal_a,
            Party::B => &mut self.reveal_b,
        };
        if slot.is_some() {
            return Err(GameError::AlreadyRevealed);
        }
        *slot = Some(Reveal { mv, revealed_at: now });
        self.last_action_at = now;
        Ok(())
    }

    /// Move to a later state.
    pub fn advance(&mut self, next: GameState) -> Result<(), GameError> {
        if !self.state.can_advance_to(next) {
            return Err(GameError::wrong_state(self.state));
        }
        self.state = next;
        Ok(())
    }

    /// Set the final outcome. Write-once.
    pub fn set_winner(&mut self, outcome: Outcome) -> Result<(), GameError> {
        if self.winner.is_some() {
            return Err(GameError::wrong_state(self.state));
        }
        self.winner = Some(outcome);
        Ok(())
    }

    /// Winning address, if the outcome names one.
    pub fn winner_address(&self) -> Option<Address> {
        match self.winner? {
            Outcome::PartyA => self.address_of(Party::A),
            Outcome::PartyB => self.address_of(Party::B),
            Outcome::Draw => None,
        }
    }

    /// Digest of every field, for detecting any change to the record.
    pub fn compute_hash(&self) -> Hash32 {
        let mut hasher = StateHasher::for_game_record();
        hasher.update_u64(self.id);
        hasher.update_bytes(&self.creator.0);
        hasher.update_option(self.opponent.as_ref().map(|a| &a.0[..]));
        hasher.update_bool(self.invited);
        hasher.update_u128(self.stake);
        hasher.update_u128(self.pool);
        hasher.update_bytes(&self.commitment_a.0);
        hasher.update_option(self.commitment_b.as_ref().map(|c| &c.0[..]));
        hasher.update_u8(self.state as u8);
        hasher.update_option(self.winner.map(|w| [w.code()]).as_ref().map(|b| &b[..]));
        hasher.update_u64(self.created_at);
        hasher.update_u64(self.last_action_at);
        for reveal in [&self.reveal_a, &self.reveal_b] {
            match reveal {
                Some(r) => {
                    hasher.update_u8(1);
                    hasher.update_u8(r.mv.code());
                    hasher.update_u64(r.revealed_at);
                }
                None => hasher.update_u8(0),
            }
        }
        hasher.finalize()
    }
}
