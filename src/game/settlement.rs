//! Payout Settlement
//!
//! Turns an outcome into transfers and retires the pool. Only the engine
//! calls [`settle`], once per game, right before the game becomes terminal.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::game::error::GameError;
use crate::game::moves::Outcome;
use crate::game::state::{amount_str, Address, Amount, Game, GameState, Party};
use crate::host::ledger::Ledger;

/// A single payout from a game's pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Recipient.
    pub to: Address,
    /// Amount paid.
    #[serde(with = "amount_str")]
    pub amount: Amount,
}

/// Compute the payouts for an outcome.
///
/// A win sends the whole pool to the winner. A draw refunds `stake` to each
/// party that funded the game (only the creator, if nobody joined).
/// The transfers always sum to exactly `game.pool`.
pub fn payouts(game: &Game, outcome: Outcome) -> Result<Vec<Transfer>, GameError> {
    let transfers = match outcome {
        Outcome::PartyA | Outcome::PartyB => {
            let party = if outcome == Outcome::PartyA { Party::A } else { Party::B };
            let to = game
                .address_of(party)
                .ok_or_else(|| GameError::wrong_state(game.state))?;
            vec![Transfer { to, amount: game.pool }]
        }
        Outcome::Draw => {
            let mut refunds = vec![Transfer { to: game.creator, amount: game.stake }];
            if let (Some(opponent), Some(_)) = (game.opponent, game.commitment_b) {
                refunds.push(Transfer { to: opponent, amount: game.stake });
            }
            refunds
        }
    };

    debug_assert_eq!(
        transfers.iter().map(|t| t.amount).sum::<Amount>(),
        game.pool,
        "payouts must drain the pool exactly"
    );

    Ok(transfers)
}

/// Record the outcome, complete the game and pay out.
///
/// `game` must be a working copy: on error the caller discards it, so the
/// stored record is never touched. The ledger applies the batch
/// all-or-nothing, which makes the fund movement and the state change one unit.
pub(crate) fn settle<L: Ledger>(
    game: &mut Game,
    outcome: Outcome,
    ledger: &mut L,
) -> Result<Vec<Transfer>, GameError> {
    let transfers = payouts(game, outcome)?;

    game.set_winner(outcome)?;
    game.advance(GameState::Completed)?;
    game.pool = 0;

    ledger.disburse(&transfers)?;

    debug!(
        game_id = game.id,
        outcome = ?outcome,
        transfers = transfers.len(),
        "Game settled"
    );

    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::{Commitment, COIN};
    use crate::host::ledger::InMemoryLedger;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn joined_game() -> Game {
        let mut game = Game::open(0, addr(1), Some(addr(2)), COIN, Commitment::new([1; 32]), 0);
        game.set_commitment_b(Commitment::new([2; 32])).unwrap();
        game.pool = 2 * COIN;
        game.advance(GameState::AwaitingReveal).unwrap();
        game
    }

    #[test]
    fn test_win_pays_whole_pool() {
        let game = joined_game();
        assert_eq!(
            payouts(&game, Outcome::PartyB).unwrap(),
            vec![Transfer { to: addr(2), amount: 2 * COIN }]
        );
    }

    #[test]
    fn test_draw_splits_evenly() {
        let game = joined_game();
        assert_eq!(
            payouts(&game, Outcome::Draw).unwrap(),
            vec![
                Transfer { to: addr(1), amount: COIN },
                Transfer { to: addr(2), amount: COIN },
            ]
        );
    }

    #[test]
    fn test_unjoined_refund_goes_to_creator_only() {
        let game = Game::open(0, addr(1), None, COIN, Commitment::new([1; 32]), 0);
        assert_eq!(
            payouts(&game, Outcome::Draw).unwrap(),
            vec![Transfer { to: addr(1), amount: COIN }]
        );
    }

    #[test]
    fn test_settle_drains_pool() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(addr(1), COIN);
        ledger.fund(addr(2), COIN);
        ledger.collect(&addr(1), COIN).unwrap();
        ledger.collect(&addr(2), COIN).unwrap();

        let mut game = joined_game();
        let transfers = settle(&mut game, Outcome::PartyA, &mut ledger).unwrap();

        assert_eq!(transfers.len(), 1);
        assert_eq!(game.state, GameState::Completed);
        assert_eq!(game.winner, Some(Outcome::PartyA));
        assert_eq!(game.pool, 0);
        assert_eq!(ledger.balance_of(&addr(1)), 2 * COIN);
        assert_eq!(ledger.escrow_balance(), 0);
    }

    #[test]
    fn test_settle_refused_transfer_moves_nothing() {
        let mut ledger = InMemoryLedger::new();
        ledger.fund(addr(1), COIN);
        ledger.fund(addr(2), COIN);
        ledger.collect(&addr(1), COIN).unwrap();
        ledger.collect(&addr(2), COIN).unwrap();
        ledger.refuse_transfers_to(addr(2));

        let mut game = joined_game();
        let err = settle(&mut game, Outcome::Draw, &mut ledger).unwrap_err();

        assert!(matches!(err, GameError::Transfer(_)));
        assert_eq!(ledger.balance_of(&addr(1)), 0);
        assert_eq!(ledger.escrow_balance(), 2 * COIN);
    }
}
