//! Game loading configuration.
//!
//! - `GameSource`: where the rule text comes from
//! - `GameConfig`: pre-translation, playout seed and engine parameters

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::EngineParameters;

/// Where a rule set is read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameSource {
    /// GDL text held in memory.
    Text(String),
    /// Path to a GDL file.
    File(PathBuf),
}

impl GameSource {
    /// In-memory rule text.
    pub fn text(text: impl Into<String>) -> Self {
        GameSource::Text(text.into())
    }

    /// Rule file path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        GameSource::File(path.into())
    }
}

/// Configuration applied when a game is loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Run the rules through the external `gadelac` pre-translator before
    /// compiling.
    pub use_gadelac: bool,

    /// Executable invoked for pre-translation.
    pub gadelac_command: String,

    /// Seed for playout randomness. States of one game draw distinct
    /// streams from it.
    pub seed: u64,

    /// Parameters handed to the engine.
    pub engine: EngineParameters,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            use_gadelac: false,
            gadelac_command: "gadelac".to_string(),
            seed: 42,
            engine: EngineParameters::default(),
        }
    }
}

impl GameConfig {
    /// Request pre-translation through `gadelac`.
    #[must_use]
    pub fn with_gadelac(mut self, enabled: bool) -> Self {
        self.use_gadelac = enabled;
        self
    }

    /// Use a different pre-translator executable.
    #[must_use]
    pub fn with_gadelac_command(mut self, command: impl Into<String>) -> Self {
        self.gadelac_command = command.into();
        self
    }

    /// Set the playout seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the engine parameters.
    #[must_use]
    pub fn with_engine(mut self, engine: EngineParameters) -> Self {
        self.engine = engine;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert!(!config.use_gadelac);
        assert_eq!(config.gadelac_command, "gadelac");
        assert_eq!(config.engine, EngineParameters::default());
    }

    #[test]
    fn test_builder() {
        let config = GameConfig::default()
            .with_gadelac(true)
            .with_gadelac_command("/opt/bin/gadelac")
            .with_seed(7)
            .with_engine(EngineParameters::default().with_order_rules(false));
        assert!(config.use_gadelac);
        assert_eq!(config.gadelac_command, "/opt/bin/gadelac");
        assert_eq!(config.seed, 7);
        assert!(!config.engine.order_rules);
    }

    #[test]
    fn test_serde() {
        let config = GameConfig::default().with_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        let back: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);

        let source = GameSource::file("rules/ttt.gdl");
        let json = serde_json::to_string(&source).unwrap();
        assert_eq!(serde_json::from_str::<GameSource>(&json).unwrap(), source);
    }
}
