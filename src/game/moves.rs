//! Moves and Outcomes
//!
//! The closed move set and the pure winner function.

use serde::{Serialize, Deserialize};

use crate::game::error::GameError;

/// A Rock-Paper-Scissors move.
///
/// Wire codes start at 1 so that a zeroed value is never a valid move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Move {
    /// Beats Scissors.
    Rock = 1,
    /// Beats Rock.
    Paper = 2,
    /// Beats Paper.
    Scissors = 3,
}

impl Move {
    /// All moves, in code order.
    pub const ALL: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    /// Decode a wire code, rejecting anything outside the closed set.
    pub fn from_code(code: u8) -> Result<Move, GameError> {
        match code {
            1 => Ok(Move::Rock),
            2 => Ok(Move::Paper),
            3 => Ok(Move::Scissors),
            other => Err(GameError::InvalidMove(other)),
        }
    }

    /// Wire code of this move.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// The unique move this move beats.
    pub fn beats(self) -> Move {
        match self {
            Move::Rock => Move::Scissors,
            Move::Paper => Move::Rock,
            Move::Scissors => Move::Paper,
        }
    }
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Move::from_code(code)
    }
}

/// Result of a settled game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Outcome {
    /// Nobody wins; each party is refunded.
    Draw = 0,
    /// The creator wins the pool.
    PartyA = 1,
    /// The joiner wins the pool.
    PartyB = 2,
}

impl Outcome {
    /// Decode a wire code (0 = draw, 1 = party A, 2 = party B).
    pub fn from_code(code: u8) -> Option<Outcome> {
        match code {
            0 => Some(Outcome::Draw),
            1 => Some(Outcome::PartyA),
            2 => Some(Outcome::PartyB),
            _ => None,
        }
    }

    /// Wire code of this outcome.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Decide a game from two plaintext moves.
///
/// Total over the 3x3 grid: equal moves draw, otherwise the cyclic
/// dominance table picks the winner.
pub fn resolve(move_a: Move, move_b: Move) -> Outcome {
    if move_a == move_b {
        Outcome::Draw
    } else if move_a.beats() == move_b {
        Outcome::PartyA
    } else {
        Outcome::PartyB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_table() {
        use Move::*;

        let table = [
            (Rock, Rock, Outcome::Draw),
            (Rock, Paper, Outcome::PartyB),
            (Rock, Scissors, Outcome::PartyA),
            (Paper, Rock, Outcome::PartyA),
            (Paper, Paper, Outcome::Draw),
            (Paper, Scissors, Outcome::PartyB),
            (Scissors, Rock, Outcome::PartyB),
            (Scissors, Paper, Outcome::PartyA),
            (Scissors, Scissors, Outcome::Draw),
        ];

        for (a, b, expected) in table {
            assert_eq!(resolve(a, b), expected, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_resolve_is_antisymmetric() {
        for a in Move::ALL {
            for b in Move::ALL {
                let forward = resolve(a, b);
                let mirrored = resolve(b, a);
                let expected = match forward {
                    Outcome::Draw => Outcome::Draw,
                    Outcome::PartyA => Outcome::PartyB,
                    Outcome::PartyB => Outcome::PartyA,
                };
                assert_eq!(mirrored, expected);
            }
        }
    }

    #[test]
    fn test_move_codes() {
        for mv in Move::ALL {
            assert_eq!(Move::from_code(mv.code()), Ok(mv));
        }
        assert_eq!(Move::from_code(0), Err(GameError::InvalidMove(0)));
        assert_eq!(Move::try_from(4), Err(GameError::InvalidMove(4)));
    }

    #[test]
    fn test_outcome_codes() {
        assert_eq!(Outcome::from_code(0), Some(Outcome::Draw));
        assert_eq!(Outcome::from_code(1), Some(Outcome::PartyA));
        assert_eq!(Outcome::from_code(2), Some(Outcome::PartyB));
        assert_eq!(Outcome::from_code(3), None);
    }
}
