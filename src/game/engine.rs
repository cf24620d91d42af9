//! Settlement Engine
//!
//! Owns the registry and drives every game from funding to payout.
//!
//! ## Atomicity
//!
//! Each operation clones the stored game, mutates the copy, moves funds
//! through the [`Ledger`] and only then writes the copy back and records
//! events. A rejection at any step drops the copy, so the stored game, the
//! escrow and the event log are exactly as they were.
//!
//! Methods take `&mut self`; concurrent callers go through
//! [`GameService`](crate::host::service::GameService).

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::game::error::GameError;
use crate::game::events::{GameEvent, GameEventData};
use crate::game::moves::{Move, Outcome};
use crate::game::registry::GameRegistry;
use crate::game::settlement;
use crate::game::state::{Address, Amount, Commitment, Game, GameId, GameState};
use crate::game::timeout;
use crate::host::clock::Clock;
use crate::host::ledger::{Ledger, LedgerError};
use crate::proof::commitment::{CommitmentScheme, Secret};
use crate::proof::resolution::{
    ProofResolution, ProofSubmission, ResolutionCommand, ResolutionStrategy, RevealResolution,
    RevealSubmission,
};
use crate::proof::verify::ProofVerifier;

/// Transaction context: who is calling and how much they attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call {
    /// Sender.
    pub caller: Address,
    /// Attached funds. Only `open_game` and `join_game` take any.
    pub value: Amount,
}

impl Call {
    /// A call with funds attached.
    pub fn new(caller: Address, value: Amount) -> Self {
        Self { caller, value }
    }

    /// A call with nothing attached.
    pub fn sender(caller: Address) -> Self {
        Self { caller, value: 0 }
    }
}

/// Two-party settlement engine, generic over how winners are decided.
#[derive(Debug)]
pub struct SettlementEngine<R, L, C> {
    strategy: R,
    ledger: L,
    clock: C,
    config: EngineConfig,
    registry: GameRegistry,
    events: Vec<GameEvent>,
}

impl<R: ResolutionStrategy, L: Ledger, C: Clock> SettlementEngine<R, L, C> {
    /// Create an engine with default timeout windows.
    pub fn new(strategy: R, ledger: L, clock: C) -> Self {
        Self::with_config(strategy, ledger, clock, EngineConfig::default())
    }

    /// Create an engine with explicit timeout windows.
    pub fn with_config(strategy: R, ledger: L, clock: C, config: EngineConfig) -> Self {
        Self {
            strategy,
            ledger,
            clock,
            config,
            registry: GameRegistry::new(),
            events: Vec::new(),
        }
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Open and fund a game. `call.value` is the per-side stake.
    ///
    /// `opponent` fixes party B for a private game; `None` opens it to anyone.
    pub fn open_game(
        &mut self,
        call: Call,
        opponent: Option<Address>,
        commitment: Commitment,
    ) -> Result<GameId, GameError> {
        if call.value == 0 {
            return Err(GameError::InvalidStake { expected: None, got: 0 });
        }
        if commitment.is_zero() || !self.strategy.accepts_commitment(&commitment) {
            return Err(GameError::InvalidCommitment);
        }
        if let Some(opponent) = opponent {
            if opponent == call.caller || opponent.is_zero() {
                return Err(GameError::Unauthorized);
            }
        }

        let now = self.clock.now();
        let id = self.registry.next_id();
        let game = Game::open(id, call.caller, opponent, call.value, commitment, now);

        self.ledger.collect(&call.caller, call.value)?;
        self.registry.insert(game);

        info!(
            game_id = id,
            creator = %call.caller.short(),
            stake = %call.value,
            private = opponent.is_some(),
            "Game opened"
        );

        self.emit(
            id,
            now,
            vec![GameEventData::GameCreated {
                creator: call.caller,
                opponent,
                stake: call.value,
                commitment,
            }],
        );
        Ok(id)
    }

    /// Join a game as party B, matching its stake exactly.
    pub fn join_game(
        &mut self,
        call: Call,
        id: GameId,
        commitment: Commitment,
    ) -> Result<(), GameError> {
        let now = self.clock.now();
        let mut game = self.registry.get(id)?.clone();

        if game.state != GameState::AwaitingOpponent {
            return Err(GameError::wrong_state(game.state));
        }
        game.bind_opponent(call.caller)?;
        if call.value != game.stake {
            return Err(GameError::InvalidStake {
                expected: Some(game.stake),
                got: call.value,
            });
        }
        if !self.strategy.accepts_commitment(&commitment) {
            return Err(GameError::InvalidCommitment);
        }
        game.set_commitment_b(commitment)?;
        game.pool = game.pool.checked_add(call.value).ok_or(LedgerError::Overflow)?;
        game.last_action_at = now;
        game.advance(self.strategy.awaiting_state())?;

        self.ledger.collect(&call.caller, call.value)?;

        info!(
            game_id = id,
            opponent = %call.caller.short(),
            pool = %game.pool,
            flow = self.strategy.name(),
            "Opponent joined"
        );

        let pool = game.pool;
        self.commit(game)?;
        self.emit(
            id,
            now,
            vec![GameEventData::OpponentJoined {
                opponent: call.caller,
                commitment,
                pool,
            }],
        );
        Ok(())
    }

    /// Apply a flow-specific submission from one of the parties.
    ///
    /// Returns the outcome once the game has been settled.
    pub fn resolve(
        &mut self,
        call: Call,
        id: GameId,
        submission: R::Submission,
    ) -> Result<Option<Outcome>, GameError> {
        let now = self.clock.now();
        let mut game = self.registry.get(id)?.clone();
        let party = game.party_of(&call.caller).ok_or(GameError::Unauthorized)?;

        let resolution = self.strategy.submit(&mut game, party, submission, now)?;
        let mut events = resolution.events;

        if let Some(outcome) = resolution.outcome {
            events.push(self.settle(&mut game, outcome)?);
        }

        self.commit(game)?;
        self.emit(id, now, events);
        Ok(resolution.outcome)
    }

    /// Decode and apply a wire-level resolution command.
    ///
    /// A command for the other flow is rejected with `WrongGameState`.
    pub fn submit(
        &mut self,
        call: Call,
        id: GameId,
        command: ResolutionCommand,
    ) -> Result<Option<Outcome>, GameError> {
        let state = self.registry.get(id)?.state;
        match self.strategy.decode(command) {
            Some(submission) => self.resolve(call, id, submission?),
            None => Err(GameError::wrong_state(state)),
        }
    }

    /// Force a stalled game to completion once its deadline has passed.
    pub fn claim_timeout(&mut self, call: Call, id: GameId) -> Result<Outcome, GameError> {
        let now = self.clock.now();
        let mut game = self.registry.get(id)?.clone();

        let ruling = timeout::adjudicate(&game, &call.caller, now, &self.config).map_err(|e| {
            warn!(game_id = id, claimant = %call.caller.short(), error = %e, "Timeout claim rejected");
            e
        })?;

        game.last_action_at = now;
        let completed = self.settle(&mut game, ruling.outcome)?;

        info!(
            game_id = id,
            claimant = %call.caller.short(),
            outcome = ?ruling.outcome,
            deadline = ruling.deadline,
            "Timeout claimed"
        );

        self.commit(game)?;
        self.emit(
            id,
            now,
            vec![
                GameEventData::TimeoutClaimed {
                    claimant: call.caller,
                    outcome: ruling.outcome,
                },
                completed,
            ],
        );
        Ok(ruling.outcome)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Snapshot of a game.
    pub fn get_game(&self, id: GameId) -> Result<Game, GameError> {
        self.registry.get(id).cloned()
    }

    /// Next id, which is also the number of games ever created.
    pub fn game_counter(&self) -> u64 {
        self.registry.game_counter()
    }

    /// Ids of games anyone may join.
    pub fn open_games(&self) -> Vec<GameId> {
        self.registry.open_games()
    }

    /// Ids of games `address` plays in.
    pub fn games_for(&self, address: &Address) -> Vec<GameId> {
        self.registry.games_for(address)
    }

    /// Every event recorded since the last drain.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take the recorded events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The custody backend.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable custody backend, for funding accounts from outside.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// The time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Active timeout windows.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The resolution strategy.
    pub fn strategy(&self) -> &R {
        &self.strategy
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    /// Pay out and complete a working copy. Returns its `GameCompleted` event.
    fn settle(&mut self, game: &mut Game, outcome: Outcome) -> Result<GameEventData, GameError> {
        let payouts = settlement::settle(game, outcome, &mut self.ledger).map_err(|e| {
            warn!(game_id = game.id, error = %e, "Settlement failed, rolled back");
            e
        })?;

        info!(
            game_id = game.id,
            outcome = ?outcome,
            winner = ?game.winner_address().map(|a| a.short()),
            "Game completed"
        );

        Ok(GameEventData::GameCompleted {
            outcome,
            winner: game.winner_address(),
            payouts,
        })
    }

    fn commit(&mut self, game: Game) -> Result<(), GameError> {
        #[cfg(feature = "debug-tracing")]
        tracing::trace!(
            game_id = game.id,
            state = ?game.state,
            hash = %hex::encode(game.compute_hash()),
            "Game record committed"
        );
        self.registry.replace(game)
    }

    fn emit(&mut self, game_id: GameId, now: u64, data: Vec<GameEventData>) {
        for data in data {
            let event = GameEvent::new(game_id, now, data);
            debug!(game_id, event = event.name(), "Event recorded");
            self.events.push(event);
        }
    }
}

// =============================================================================
// FLOW-SPECIFIC ENTRY POINTS
// =============================================================================

impl<S: CommitmentScheme, L: Ledger, C: Clock> SettlementEngine<RevealResolution<S>, L, C> {
    /// Disclose the caller's move.
    ///
    /// The second valid reveal resolves and settles the game.
    pub fn reveal_move(
        &mut self,
        call: Call,
        id: GameId,
        mv: Move,
        secret: Secret,
    ) -> Result<Option<Outcome>, GameError> {
        self.resolve(call, id, RevealSubmission { mv, secret })
    }
}

impl<V: ProofVerifier, L: Ledger, C: Clock> SettlementEngine<ProofResolution<V>, L, C> {
    /// Settle with a claimed outcome code and a proof of it.
    pub fn submit_proof(
        &mut self,
        call: Call,
        id: GameId,
        claimed_winner: u8,
        proof: Vec<u8>,
    ) -> Result<Outcome, GameError> {
        let outcome = self.resolve(
            call,
            id,
            ProofSubmission {
                winner_code: claimed_winner,
                proof,
            },
        )?;
        outcome.ok_or_else(|| GameError::InvalidProof("proof did not settle the game".to_string()))
    }
}
