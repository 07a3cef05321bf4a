//! Session configuration.
//!
//! Sessions are configured at startup with:
//! - `PersistenceConfig`: field names used in the shared state document
//! - `TurnConfig`: turn numbering
//!
//! Settings come from (highest priority first):
//! 1. Environment variables (`DUEL_<SECTION>_<KEY>`)
//! 2. A TOML file
//! 3. Built-in defaults
//!
//! ```
//! use duel_session::core::SessionConfig;
//!
//! let config = SessionConfig::from_toml_str(r#"
//!     [persistence]
//!     lock_field = "exclusive_artifact"
//! "#).unwrap();
//!
//! assert_eq!(config.persistence.lock_field, "exclusive_artifact");
//! assert_eq!(config.persistence.effects_field, "turn_effects");
//! assert_eq!(config.turns.first_turn, 1);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::player::PeerRole;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Names of the fields this session writes into the shared document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Field holding the exclusive-mode lock state.
    pub lock_field: String,

    /// Field holding exported turn-scoped effect state.
    pub effects_field: String,

    /// Field holding the current turn number.
    pub turn_field: String,

    /// Field holding an open modal choice, written by card handlers that
    /// reopen their choice after a reconnect.
    pub pending_choice_field: String,

    /// Prefix every field with the peer role (`host_`, `guest_`), so both
    /// peers can share one document.
    pub prefix_with_role: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            lock_field: "exclusive_mode".to_string(),
            effects_field: "turn_effects".to_string(),
            turn_field: "turn".to_string(),
            pending_choice_field: "pending_choice".to_string(),
            prefix_with_role: true,
        }
    }
}

impl PersistenceConfig {
    /// Resolve a base field name to the name actually used in the document.
    #[must_use]
    pub fn field_name(&self, role: PeerRole, field: &str) -> String {
        if self.prefix_with_role {
            format!("{}_{}", role.field_prefix(), field)
        } else {
            field.to_string()
        }
    }
}

/// Turn numbering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Turn number of a fresh game. Must be at least 1.
    pub first_turn: u32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self { first_turn: 1 }
    }
}

/// Complete session configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub persistence: PersistenceConfig,
    pub turns: TurnConfig,
}

impl SessionConfig {
    /// Parse and validate a configuration from TOML text.
    ///
    /// Missing sections and keys fall back to defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, then apply environment overrides.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("Loading session config from {}", path.display());
        let config = apply_env_overrides(toml::from_str(&text)?);
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the session cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.persistence;
        let fields = [
            ("persistence.lock_field", &p.lock_field),
            ("persistence.effects_field", &p.effects_field),
            ("persistence.turn_field", &p.turn_field),
            ("persistence.pending_choice_field", &p.pending_choice_field),
        ];

        for (key, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: "field name must not be empty".to_string(),
                });
            }
        }

        for (i, (key, value)) in fields.iter().enumerate() {
            if let Some((other, _)) = fields[i + 1..].iter().find(|(_, v)| v == value) {
                return Err(ConfigError::InvalidValue {
                    key: *key,
                    reason: format!("field name \"{}\" is also used by {}", value, other),
                });
            }
        }

        if self.turns.first_turn == 0 {
            return Err(ConfigError::InvalidValue {
                key: "turns.first_turn",
                reason: "turns are numbered from 1".to_string(),
            });
        }

        Ok(())
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($lookup:expr, $config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Some(v) = $lookup($key) {
            debug!("{} overrides {}.{}", $key, stringify!($section), stringify!($field));
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, bool, ...)
    ($lookup:expr, $config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Some(v) = $lookup($key).and_then(|s: String| s.parse().ok()) {
            debug!("{} overrides {}.{}", $key, stringify!($section), stringify!($field));
            $config.$section.$field = v;
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: `DUEL_<SECTION>_<KEY>`.
pub fn apply_env_overrides(config: SessionConfig) -> SessionConfig {
    apply_overrides_from(config, |key| std::env::var(key).ok())
}

/// Apply overrides from an arbitrary key lookup. Unparseable values are ignored.
pub fn apply_overrides_from(
    mut config: SessionConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SessionConfig {
    env_override!(lookup, config, persistence.lock_field, "DUEL_PERSISTENCE_LOCK_FIELD");
    env_override!(lookup, config, persistence.effects_field, "DUEL_PERSISTENCE_EFFECTS_FIELD");
    env_override!(lookup, config, persistence.turn_field, "DUEL_PERSISTENCE_TURN_FIELD");
    env_override!(
        lookup,
        config,
        persistence.pending_choice_field,
        "DUEL_PERSISTENCE_PENDING_CHOICE_FIELD"
    );
    env_override!(
        lookup,
        config,
        persistence.prefix_with_role,
        "DUEL_PERSISTENCE_PREFIX_WITH_ROLE",
        parse
    );
    env_override!(lookup, config, turns.first_turn, "DUEL_TURNS_FIRST_TURN", parse);
    config
}
