//! Game configuration
//!
//! Defaults reproduce the stock 11x8 board with the thirteen-kind tile table.
//! A JSON file (path in `GEMS_CONFIG`) can replace any part of it, and a few
//! environment variables override single fields on top of that.
//!
//! The tile table serializes as a list of `{ name, weight, special }` entries:
//!
//! ```json
//! { "width": 8, "tiles": [ { "name": "red", "weight": 10 }, { "name": "blue", "weight": 10 } ] }
//! ```
//!
//! Kinds left out of a custom table get weight 0 (never spawned) and their
//! default special flag.

use std::str::FromStr;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::scoring::ScoringRules;
use crate::types::{
    Error, Result, TileKind, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DEFAULT_HINT_DELAY_MS,
    DEFAULT_SPECIAL_THRESHOLD, MAX_BOARD_DIM, MIN_BOARD_DIM,
};

/// Spawn weight and special flag for one tile kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpec {
    pub weight: u32,
    pub special: bool,
}

/// Serialized form of one tile table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSpecEntry {
    pub name: String,
    pub weight: u32,
    #[serde(default)]
    pub special: Option<bool>,
}

/// Per-kind spawn weights and special flags, indexed by [`TileKind::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TileSpecEntry>", into = "Vec<TileSpecEntry>")]
pub struct TileTable {
    specs: [TileSpec; TileKind::COUNT],
}

impl Default for TileTable {
    fn default() -> Self {
        let mut specs = [TileSpec {
            weight: 0,
            special: true,
        }; TileKind::COUNT];
        for kind in TileKind::ALL {
            specs[kind.index()] = TileSpec {
                weight: kind.default_weight(),
                special: kind.is_special_by_default(),
            };
        }
        Self { specs }
    }
}

impl TileTable {
    pub fn spec(&self, kind: TileKind) -> TileSpec {
        self.specs[kind.index()]
    }

    pub fn weight(&self, kind: TileKind) -> u32 {
        self.specs[kind.index()].weight
    }

    pub fn is_special(&self, kind: TileKind) -> bool {
        self.specs[kind.index()].special
    }

    /// Builder-style override of one kind's weight.
    pub fn with_weight(mut self, kind: TileKind, weight: u32) -> Self {
        self.specs[kind.index()].weight = weight;
        self
    }

    /// Builder-style override of one kind's special flag.
    pub fn with_special(mut self, kind: TileKind, special: bool) -> Self {
        self.specs[kind.index()].special = special;
        self
    }

    /// Kinds that may spawn, paired with their weights, in table order.
    ///
    /// Zero-weight kinds never appear. Specials appear only when `allow_special`.
    pub fn candidates(&self, allow_special: bool) -> ArrayVec<(TileKind, u32), { TileKind::COUNT }> {
        TileKind::ALL
            .iter()
            .map(|&kind| (kind, self.spec(kind)))
            .filter(|(_, spec)| spec.weight > 0 && (allow_special || !spec.special))
            .map(|(kind, spec)| (kind, spec.weight))
            .collect()
    }

    /// Build a table from serialized rows, rejecting unknown or repeated names.
    pub fn from_entries(entries: &[TileSpecEntry]) -> Result<Self> {
        let mut specs = [TileSpec {
            weight: 0,
            special: true,
        }; TileKind::COUNT];
        let mut seen = [false; TileKind::COUNT];
        for kind in TileKind::ALL {
            specs[kind.index()].special = kind.is_special_by_default();
        }
        for entry in entries {
            let kind = TileKind::from_name(&entry.name).ok_or_else(|| {
                Error::InvalidConfiguration(format!("unknown tile kind {:?}", entry.name))
            })?;
            if seen[kind.index()] {
                return Err(Error::InvalidConfiguration(format!(
                    "tile kind {kind} listed twice"
                )));
            }
            seen[kind.index()] = true;
            specs[kind.index()] = TileSpec {
                weight: entry.weight,
                special: entry.special.unwrap_or(kind.is_special_by_default()),
            };
        }
        let table = Self { specs };
        table.validate()?;
        Ok(table)
    }

    /// Check the structural rules every usable table satisfies.
    pub fn validate(&self) -> Result<()> {
        let empty = self.spec(TileKind::Empty);
        if empty.weight != 0 || !empty.special {
            return Err(Error::InvalidConfiguration(
                "empty must have weight 0 and be special".to_string(),
            ));
        }
        if self.candidates(false).is_empty() {
            return Err(Error::InvalidConfiguration(
                "tile table needs at least one non-special kind with positive weight".to_string(),
            ));
        }
        Ok(())
    }
}

impl TryFrom<Vec<TileSpecEntry>> for TileTable {
    type Error = Error;

    fn try_from(entries: Vec<TileSpecEntry>) -> Result<Self> {
        Self::from_entries(&entries)
    }
}

impl From<TileTable> for Vec<TileSpecEntry> {
    fn from(table: TileTable) -> Self {
        TileKind::ALL
            .iter()
            .map(|&kind| {
                let spec = table.spec(kind);
                TileSpecEntry {
                    name: kind.name().to_string(),
                    weight: spec.weight,
                    special: Some(spec.special),
                }
            })
            .collect()
    }
}

/// Everything a game session needs to start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub tiles: TileTable,
    pub scoring: ScoringRules,
    /// Points per special wave.
    pub special_threshold: u32,
    /// Idle time before a hint is shown.
    pub hint_delay_ms: u64,
    pub seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            tiles: TileTable::default(),
            scoring: ScoringRules::default(),
            special_threshold: DEFAULT_SPECIAL_THRESHOLD,
            hint_delay_ms: DEFAULT_HINT_DELAY_MS,
            seed: 1,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_BOARD_DIM..=MAX_BOARD_DIM).contains(&value) {
                return Err(Error::InvalidConfiguration(format!(
                    "{label} {value} outside {MIN_BOARD_DIM}..={MAX_BOARD_DIM}"
                )));
            }
        }
        if self.special_threshold == 0 {
            return Err(Error::InvalidConfiguration(
                "special_threshold must be positive".to_string(),
            ));
        }
        self.tiles.validate()
    }

    /// Parse and validate a JSON document; missing fields keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::InvalidConfiguration(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `GEMS_CONFIG` (optional JSON path) and per-field overrides.
    ///
    /// Any variable that is set but unparsable is an error rather than being
    /// silently ignored.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("GEMS_CONFIG") {
            Ok(path) if !path.trim().is_empty() => {
                let path = path.trim();
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::InvalidConfiguration(format!("cannot read {path}: {e}"))
                })?;
                Self::from_json_str(&text)?
            }
            _ => Self::default(),
        };

        if let Some(width) = env_value("GEMS_WIDTH")? {
            config.width = width;
        }
        if let Some(height) = env_value("GEMS_HEIGHT")? {
            config.height = height;
        }
        if let Some(seed) = env_value("GEMS_SEED")? {
            config.seed = seed;
        }
        if let Some(threshold) = env_value("GEMS_SPECIAL_THRESHOLD")? {
            config.special_threshold = threshold;
        }
        if let Some(delay) = env_value("GEMS_HINT_DELAY_MS")? {
            config.hint_delay_ms = delay;
        }

        config.validate()?;
        Ok(config)
    }
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| Error::InvalidConfiguration(format!("{key}={raw:?} is not a valid value")))
}
