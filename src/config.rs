//! Configuration handling for redboard
//!
//! Configuration is read from `--config <path>` when given, otherwise from
//! `config.toml` in the platform config directory
//! (`~/.config/redboard/config.toml` on Linux). A missing file means defaults.
//!
//! ```toml
//! [timers]
//! heartbeat_seconds = 5
//! celebration_seconds = 5
//! tick_rate_ms = 250
//!
//! [heartbeat]
//! seed = 42
//! messages = ["Scanning for vulnerabilities..."]
//!
//! [[board.lanes]]
//! id = "recon"
//! title = "Reconnaissance"
//! cards = [{ id = "task1", content = "Scan target network" }]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Board, Card, CardId, EngineSettings, Heartbeat, Lane, LaneId, DEFAULT_HEARTBEAT_MESSAGES,
};

const MAX_TIMER_SECONDS: u64 = 86_400;
const MAX_TICK_RATE_MS: u64 = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Timer settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimerConfig {
    /// Seconds between heartbeat log lines
    pub heartbeat_seconds: u64,

    /// Seconds the completion celebration stays up
    pub celebration_seconds: u64,

    /// TUI input poll interval in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            heartbeat_seconds: 5,
            celebration_seconds: 5,
            tick_rate_ms: 250,
        }
    }
}

/// Heartbeat flavor text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub messages: Vec<String>,

    /// Fixed RNG seed, for reproducible runs
    pub seed: Option<u64>,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            messages: DEFAULT_HEARTBEAT_MESSAGES.iter().map(|s| s.to_string()).collect(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardConfig {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LaneConfig {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
}

/// Initial board layout; lanes appear in this order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoardConfig {
    pub lanes: Vec<LaneConfig>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        let lane = |id: &str, title: &str, cards: &[(&str, &str)]| LaneConfig {
            id: id.to_string(),
            title: title.to_string(),
            cards: cards
                .iter()
                .map(|(id, content)| CardConfig {
                    id: id.to_string(),
                    content: content.to_string(),
                })
                .collect(),
        };

        Self {
            lanes: vec![
                lane(
                    "recon",
                    "Reconnaissance",
                    &[("task1", "Scan target network"), ("task2", "Enumerate open services")],
                ),
                lane("exploit", "Exploitation", &[("task3", "Exploit vulnerable service")]),
                lane("escalate", "Privilege Escalation", &[("task4", "Dump credential store")]),
                lane("exfil", "Exfiltration", &[]),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub timers: TimerConfig,
    pub heartbeat: HeartbeatConfig,
    pub board: BoardConfig,
}

impl Config {
    /// Loads from `path`, or from the global location when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => match Self::global_config_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Returns the global config file location
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "redboard", "redboard")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Parses and validates TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let timers = [
            ("timers.heartbeat_seconds", self.timers.heartbeat_seconds, MAX_TIMER_SECONDS),
            ("timers.celebration_seconds", self.timers.celebration_seconds, MAX_TIMER_SECONDS),
            ("timers.tick_rate_ms", self.timers.tick_rate_ms, MAX_TICK_RATE_MS),
        ];
        for (name, value, max) in timers {
            if value == 0 || value > max {
                return Err(ConfigError::Invalid(format!("{} must be between 1 and {}", name, max)));
            }
        }
        if self.heartbeat.messages.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid("heartbeat.messages must not be empty".into()));
        }
        self.build_board()?;
        Ok(())
    }

    /// Builds the initial board described by `[board]`
    pub fn build_board(&self) -> Result<Board, ConfigError> {
        let invalid = |e: &dyn std::fmt::Display| ConfigError::Invalid(e.to_string());

        let lanes = self
            .board
            .lanes
            .iter()
            .map(|lane| {
                let id: LaneId = lane.id.parse().map_err(|e| invalid(&e))?;
                let cards = lane
                    .cards
                    .iter()
                    .map(|c| {
                        let card_id: CardId = c.id.parse().map_err(|e| invalid(&e))?;
                        Card::new(card_id, &c.content)
                            .map_err(|e| ConfigError::Invalid(format!("lane {}: {}", id, e)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Lane::new(id, lane.title.clone(), cards))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Board::new(lanes).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            heartbeat_every: seconds(self.timers.heartbeat_seconds),
            celebration_for: seconds(self.timers.celebration_seconds),
        }
    }

    pub fn heartbeat(&self) -> Heartbeat {
        let messages = self
            .heartbeat
            .messages
            .iter()
            .filter(|m| !m.trim().is_empty())
            .cloned()
            .collect();
        Heartbeat::new(messages, self.heartbeat.seed)
    }
}

fn seconds(value: u64) -> Duration {
    Duration::seconds(value.min(MAX_TIMER_SECONDS) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();

        assert_eq!(config.timers.heartbeat_seconds, 5);
        assert_eq!(config.timers.celebration_seconds, 5);
        assert!(config.validate().is_ok());

        let board = config.build_board().unwrap();
        let ids: Vec<_> = board.lane_ids().map(|l| l.to_string()).collect();
        assert_eq!(ids, vec!["recon", "exploit", "escalate", "exfil"]);
        assert_eq!(board.total_cards(), 4);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[timers]
heartbeat_seconds = 2

[heartbeat]
seed = 11
"#;

        let config = Config::from_toml(toml).unwrap();
        assert_eq!(config.timers.heartbeat_seconds, 2);
        assert_eq!(config.timers.celebration_seconds, 5);
        assert_eq!(config.heartbeat.seed, Some(11));
        assert_eq!(config.board, BoardConfig::default());
        assert_eq!(config.engine_settings().heartbeat_every, Duration::seconds(2));
    }

    #[test]
    fn parse_custom_board() {
        let toml = r#"
[[board.lanes]]
id = "todo"
title = "To Do"
cards = [{ id = "task1", content = "  Create mockup " }]

[[board.lanes]]
id = "done"
title = "Done"
"#;

        let config = Config::from_toml(toml).unwrap();
        let board = config.build_board().unwrap();
        assert_eq!(board.lanes().len(), 2);
        assert_eq!(board.lanes()[0].cards[0].content, "Create mockup");
        assert!(board.lanes()[1].is_empty());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            Config::from_toml("[timers]\nheartbeat_seconds = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[timers]\ntick_rate_ms = 60000"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[timers]\nheartbeat_seconds = -1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            Config::from_toml("[heartbeat]\nmessages = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[board]\nlanes = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml(
                "[[board.lanes]]\nid = \"a\"\ntitle = \"A\"\n[[board.lanes]]\nid = \"a\"\ntitle = \"B\""
            ),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[[board.lanes]]\nid = \"Bad Lane\"\ntitle = \"A\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml("[[board.lanes]]\nid = \"a\"\ntitle = \"A\"\ncards = [{ id = \"c1\", content = \"  \" }]"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[timers]\ncelebration_seconds = 9\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.timers.celebration_seconds, 9);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config"));
    }

    #[test]
    fn heartbeat_skips_blank_messages() {
        let mut config = Config::default();
        config.heartbeat.messages = vec!["ping".into(), "  ".into()];
        assert_eq!(config.heartbeat().messages(), &["ping".to_string()]);
    }
}
