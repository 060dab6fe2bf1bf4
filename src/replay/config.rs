use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Games whose replays share this archive layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameKind {
    #[default]
    StarCraft2,
    Heroes,
}

impl GameKind {
    pub const ALL: [GameKind; 2] = [GameKind::StarCraft2, GameKind::Heroes];

    /// Selector name accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Self::StarCraft2 => "sc2",
            Self::Heroes => "hero",
        }
    }

    /// Program id embedded in toon handles
    pub fn program_id(self) -> &'static str {
        match self {
            Self::StarCraft2 => "S2",
            Self::Heroes => "Hero",
        }
    }
}

impl FromStr for GameKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|game| game.name() == s)
            .ok_or_else(|| Error::UnsupportedGame(s.to_string()))
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Replay session configuration
#[derive(Debug, Clone, Default)]
pub struct ReplayConfig {
    pub game: GameKind,
}

impl ReplayConfig {
    pub fn new(game: GameKind) -> Self {
        Self { game }
    }
}
