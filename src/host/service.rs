//! Game Service
//!
//! Shares one engine between async callers. Every command holds the write
//! lock for its whole run, so two commands on the same game can never
//! interleave. Events are fanned out to subscribers after each command.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

use crate::game::engine::{Call, SettlementEngine};
use crate::game::error::GameError;
use crate::game::events::GameEvent;
use crate::game::state::{Address, Game, GameId};
use crate::host::clock::Clock;
use crate::host::command::{self, CommandOutcome, GameCommand};
use crate::host::ledger::Ledger;
use crate::proof::resolution::ResolutionStrategy;

/// Broadcast buffer per subscriber. Slow subscribers lag, they never block.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Single-writer async front for a [`SettlementEngine`].
pub struct GameService<R, L, C> {
    engine: Arc<RwLock<SettlementEngine<R, L, C>>>,
    event_tx: broadcast::Sender<GameEvent>,
}

impl<R, L, C> Clone for GameService<R, L, C> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            event_tx: self.event_tx.clone(),
        }
    }
}

impl<R, L, C> GameService<R, L, C>
where
    R: ResolutionStrategy,
    L: Ledger,
    C: Clock,
{
    /// Wrap an engine.
    pub fn new(engine: SettlementEngine<R, L, C>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            engine: Arc::new(RwLock::new(engine)),
            event_tx,
        }
    }

    /// Run one command to completion.
    pub async fn execute(&self, call: Call, command: GameCommand) -> Result<CommandOutcome, GameError> {
        let name = command.name();
        let game_id = command.game_id();

        let mut engine = self.engine.write().await;
        let result = command::apply(&mut *engine, call, command);

        match &result {
            Ok(outcome) => debug!(command = name, ?outcome, "Command applied"),
            Err(e) => warn!(
                command = name,
                ?game_id,
                caller = %call.caller.short(),
                error = %e,
                "Command rejected"
            ),
        }

        for event in engine.drain_events() {
            // No subscribers is fine
            let _ = self.event_tx.send(event);
        }

        result
    }

    /// Parse and run a JSON command.
    pub async fn execute_json(&self, call: Call, json: &str) -> anyhow::Result<CommandOutcome> {
        let command = GameCommand::from_json(json)?;
        Ok(self.execute(call, command).await?)
    }

    /// Subscribe to settlement events.
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.event_tx.subscribe()
    }

    /// Snapshot of a game.
    pub async fn get_game(&self, id: GameId) -> Result<Game, GameError> {
        self.engine.read().await.get_game(id)
    }

    /// Number of games ever created.
    pub async fn game_counter(&self) -> u64 {
        self.engine.read().await.game_counter()
    }

    /// Ids of games anyone may join.
    pub async fn open_games(&self) -> Vec<GameId> {
        self.engine.read().await.open_games()
    }

    /// Ids of games an address plays in.
    pub async fn games_for(&self, address: &Address) -> Vec<GameId> {
        self.engine.read().await.games_for(address)
    }

    /// Run a closure against the ledger under the write lock.
    pub async fn with_ledger<T>(&self, f: impl FnOnce(&mut L) -> T) -> T {
        f(self.engine.write().await.ledger_mut())
    }
}
