//! Game Registry
//!
//! Id-addressed arena of games. Ids are dense and sequential, so the id is
//! also the index. Games are never removed.

use crate::game::error::GameError;
use crate::game::state::{Address, Game, GameId};

/// Append-only game storage.
#[derive(Debug, Default, Clone)]
pub struct GameRegistry {
    games: Vec<Game>,
}

impl GameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next inserted game will receive.
    pub fn next_id(&self) -> GameId {
        self.games.len() as GameId
    }

    /// Number of games ever created.
    pub fn game_counter(&self) -> u64 {
        self.games.len() as u64
    }

    /// Store a new game. Its id must be [`next_id`](Self::next_id).
    pub(crate) fn insert(&mut self, game: Game) -> GameId {
        debug_assert_eq!(game.id, self.next_id(), "ids are allocated sequentially");
        let id = game.id;
        self.games.push(game);
        id
    }

    /// Look up a game.
    pub fn get(&self, id: GameId) -> Result<&Game, GameError> {
        usize::try_from(id)
            .ok()
            .and_then(|index| self.games.get(index))
            .ok_or(GameError::GameNotFound(id))
    }

    /// Overwrite a stored game with its updated working copy.
    pub(crate) fn replace(&mut self, game: Game) -> Result<(), GameError> {
        let slot = usize::try_from(game.id)
            .ok()
            .and_then(|index| self.games.get_mut(index))
            .ok_or(GameError::GameNotFound(game.id))?;
        *slot = game;
        Ok(())
    }

    /// Ids of games anyone may join.
    pub fn open_games(&self) -> Vec<GameId> {
        self.games
            .iter()
            .filter(|g| g.is_open())
            .map(|g| g.id)
            .collect()
    }

    /// Ids of games `address` is a party to, oldest first.
    pub fn games_for(&self, address: &Address) -> Vec<GameId> {
        self.games
            .iter()
            .filter(|g| g.party_of(address).is_some())
            .map(|g| g.id)
            .collect()
    }
}
