//! Arena Configuration
//!
//! Read from environment variables with defaults for everything:
//!
//! | Variable             | Default              | Meaning                          |
//! |----------------------|----------------------|----------------------------------|
//! | `ARENA_DATA_PATH`    | unset (in memory)    | JSON snapshot file               |
//! | `ARENA_LOCK_SHARDS`  | 64                   | Shards per lock table            |
//! | `ARENA_BOARD_SIZES`  | `3x3,5x3,8x8,16x16`  | Sizes picked for matched games   |
//! | `ARENA_RNG_SEED`     | unset (entropy)      | Seed for reproducible runs       |
//! | `ARENA_DEMO_PLAYERS` | 4                    | Players registered by the demo   |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::core::locks::DEFAULT_LOCK_SHARDS;
use crate::game::board::MAX_BOARD_DIMENSION;

/// Board dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoardSize {
    /// Rows.
    pub rows: usize,
    /// Columns.
    pub cols: usize,
}

impl BoardSize {
    /// Create a board size.
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for BoardSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidBoardSize(s.to_string());
        let (rows, cols) = s.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
        let rows: usize = rows.trim().parse().map_err(|_| invalid())?;
        let cols: usize = cols.trim().parse().map_err(|_| invalid())?;

        // A single row is won by side B before the first move.
        if !(2..=MAX_BOARD_DIMENSION).contains(&rows)
            || !(1..=MAX_BOARD_DIMENSION).contains(&cols)
        {
            return Err(invalid());
        }
        Ok(Self { rows, cols })
    }
}

/// Sizes used for matched games when none are configured.
pub const DEFAULT_BOARD_SIZES: [BoardSize; 4] = [
    BoardSize::new(3, 3),
    BoardSize::new(5, 3),
    BoardSize::new(8, 8),
    BoardSize::new(16, 16),
];

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Not a playable `ROWSxCOLS` size within the supported range.
    #[error("invalid board size: {0:?}")]
    InvalidBoardSize(String),

    /// Board size list is empty.
    #[error("at least one board size is required")]
    NoBoardSizes,

    /// A numeric variable did not parse.
    #[error("invalid value for {name}: {value:?}")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Arena configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Snapshot file; `None` keeps everything in memory.
    pub data_path: Option<PathBuf>,
    /// Shards per lock table.
    pub lock_shards: usize,
    /// Sizes matched games are drawn from.
    pub board_sizes: Vec<BoardSize>,
    /// Seed for reproducible randomness.
    pub rng_seed: Option<u64>,
    /// Players registered by the demo binary.
    pub demo_players: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            lock_shards: DEFAULT_LOCK_SHARDS,
            board_sizes: DEFAULT_BOARD_SIZES.to_vec(),
            rng_seed: None,
            demo_players: 4,
        }
    }
}

impl ArenaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let board_sizes = match lookup("ARENA_BOARD_SIZES") {
            Some(list) => parse_board_sizes(&list)?,
            None => defaults.board_sizes,
        };

        Ok(Self {
            data_path: lookup("ARENA_DATA_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            lock_shards: parse_number(&lookup, "ARENA_LOCK_SHARDS")?
                .unwrap_or(defaults.lock_shards),
            board_sizes,
            rng_seed: parse_number(&lookup, "ARENA_RNG_SEED")?,
            demo_players: parse_number(&lookup, "ARENA_DEMO_PLAYERS")?
                .unwrap_or(defaults.demo_players),
        })
    }
}

/// Parse a comma-separated list such as `3x3,5x3`.
pub fn parse_board_sizes(list: &str) -> Result<Vec<BoardSize>, ConfigError> {
    let sizes = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(BoardSize::from_str)
        .collect::<Result<Vec<_>, _>>()?;
    if sizes.is_empty() {
        return Err(ConfigError::NoBoardSizes);
    }
    Ok(sizes)
}

fn parse_number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name, value })
        })
        .transpose()
}
