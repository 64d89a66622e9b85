//! Server and dispatcher configuration.
//!
//! Everything has a default, so an empty JSON object (or no file at all)
//! yields a working 3×3 server on `127.0.0.1:8080`.

use std::fs;
use std::path::{Path, PathBuf};

use gridduel_room::RoomConfig;
use serde::{Deserialize, Serialize};

use crate::GridDuelError;

/// Where `RequestReplay` reads its records from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaySource {
    /// The requester's own session: its saved file if persisted, otherwise
    /// the moves recorded so far.
    #[default]
    OwnSession,
    /// Whichever replay was saved last, regardless of who asks.
    LastSaved,
}

/// Behavior of the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Applied to every new session.
    pub room: RoomConfig,

    pub replay_source: ReplaySource,

    /// On disconnect, also free the matchmaking slot and drop spectator
    /// registrations held by the connection. Sessions are kept either way.
    pub evict_on_disconnect: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            room: RoomConfig::default(),
            replay_source: ReplaySource::OwnSession,
            evict_on_disconnect: true,
        }
    }
}

/// Top-level server configuration, usually loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Directory holding replay files and the replay index.
    pub data_dir: PathBuf,

    /// `name,password` file backing the account store.
    pub accounts_file: PathBuf,

    pub dispatch: DispatchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            data_dir: PathBuf::from("data"),
            accounts_file: PathBuf::from("data/accounts.txt"),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads a JSON config file. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns [`GridDuelError::Config`] if the file can't be read or
    /// isn't valid JSON for this shape.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GridDuelError> {
        let path = path.as_ref();
        let config_error = |reason: String| GridDuelError::Config {
            path: path.to_path_buf(),
            reason,
        };

        let text = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| config_error(e.to_string()))
    }
}
