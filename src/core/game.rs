//! A loaded rule set.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

use super::config::{GameConfig, GameSource};
use super::gadelac;
use super::player::{GameId, Player};
use super::rng::GameRng;
use super::state::State;
use crate::engine::Engine;
use crate::error::Result;
use crate::gdl::GdlEngine;

/// One compiled rule set and its players.
///
/// A game owns its engine for its whole lifetime and cannot be cloned.
/// States borrow it. Every load gets a fresh [`GameId`], so objects of two
/// games loaded from the same text never mix except through the portable
/// layer.
///
/// ```
/// use gdl_play::Game;
/// use gdl_play::games::TICTACTOE;
///
/// let game = Game::new(TICTACTOE).unwrap();
/// assert_eq!(game.num_players(), 2);
/// assert_eq!(game.players()[0].name(), "white");
/// let state = game.init_state().unwrap();
/// assert!(!state.is_terminal());
/// ```
pub struct Game<E: Engine = GdlEngine> {
    id: GameId,
    engine: E,
    players: Vec<Player>,
    config: GameConfig,
    /// Next RNG stream handed to a state.
    streams: AtomicU64,
}

impl Game<GdlEngine> {
    /// Compile GDL text with the default configuration.
    pub fn new(text: &str) -> Result<Self> {
        Self::load(GameSource::text(text), GameConfig::default())
    }

    /// Compile a GDL file with the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(GameSource::file(path.as_ref()), GameConfig::default())
    }

    /// Compile rules from a source.
    pub fn load(source: GameSource, config: GameConfig) -> Result<Self> {
        let text = match source {
            GameSource::Text(text) => text,
            GameSource::File(path) => fs::read_to_string(path)?,
        };
        let text = if config.use_gadelac {
            gadelac::translate(&text, &config.gadelac_command)?
        } else {
            text
        };
        let engine = GdlEngine::compile(&text, &config.engine)?;
        Ok(Self::from_engine(engine, config))
    }
}

impl<E: Engine> Game<E> {
    /// Wrap an already compiled engine.
    pub fn from_engine(engine: E, config: GameConfig) -> Self {
        let id = GameId::next();
        let players: Vec<Player> = (0..engine.num_roles())
            .map(|role| Player::new(id, role, Arc::from(engine.role_name(role))))
            .collect();
        info!(
            game = %id,
            players = ?players.iter().map(Player::name).collect::<Vec<_>>(),
            seed = config.seed,
            "loaded game"
        );
        Self {
            id,
            engine,
            players,
            config,
            streams: AtomicU64::new(0),
        }
    }

    /// Identity of this game.
    #[must_use]
    pub fn id(&self) -> GameId {
        self.id
    }

    /// The compiled engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Configuration the game was loaded with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of roles.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Players in role order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look a player up by role name.
    #[must_use]
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    /// Player at a role index.
    #[must_use]
    pub fn player_at(&self, role: usize) -> Option<&Player> {
        self.players.get(role)
    }

    /// A new state at the initial position.
    pub fn init_state(&self) -> Result<State<'_, E>> {
        State::new(self)
    }

    /// Whether `player` belongs to this game.
    #[must_use]
    pub fn owns(&self, player: &Player) -> bool {
        player.game_id() == self.id
    }

    pub(crate) fn next_rng(&self) -> GameRng {
        let stream = self.streams.fetch_add(1, Ordering::Relaxed);
        GameRng::stream(self.config.seed, stream)
    }
}

impl<E: Engine> fmt::Debug for Game<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("players", &self.players)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
