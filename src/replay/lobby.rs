//! Typed views over the lobby and player-list parts of decoded sections.

use serde::Serialize;

use crate::codec::Value;
use crate::error::{Error, Result};
use crate::text::{clean_name, strip_nul};

/// Who controls a lobby slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Control {
    Open = 0,
    Closed = 1,
    Human = 2,
    Ai = 3,
}

impl Control {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(Self::Open),
            1 => Some(Self::Closed),
            2 => Some(Self::Human),
            3 => Some(Self::Ai),
            _ => None,
        }
    }
}

/// Whether a slot plays or watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Observe {
    Player = 0,
    Spectator = 1,
    Referee = 2,
}

impl Observe {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(Self::Player),
            1 => Some(Self::Spectator),
            2 => Some(Self::Referee),
            // newer clients add roles; anything above zero watches
            v if v > 2 => Some(Self::Spectator),
            _ => None,
        }
    }
}

/// Outcome recorded for a competitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GameResult {
    #[default]
    Undecided = 0,
    Winner = 1,
    Loser = 2,
    Tie = 3,
}

impl GameResult {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(Self::Undecided),
            1 => Some(Self::Winner),
            2 => Some(Self::Loser),
            3 => Some(Self::Tie),
            _ => None,
        }
    }
}

/// Game speed chosen in the lobby
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GameSpeed {
    Slower = 0,
    Slow = 1,
    Normal = 2,
    Fast = 3,
    Faster = 4,
}

impl GameSpeed {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            0 => Some(Self::Slower),
            1 => Some(Self::Slow),
            2 => Some(Self::Normal),
            3 => Some(Self::Fast),
            4 => Some(Self::Faster),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Slower => "Slower",
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::Faster => "Faster",
        }
    }
}

fn enum_field<T>(value: &Value, key: &'static str, parse: fn(i64) -> Option<T>) -> Result<T> {
    let raw = value.int_field(key)?;
    parse(raw).ok_or_else(|| Error::InvalidValue {
        field: key,
        value: raw.to_string(),
    })
}

fn byte_field(value: &Value, key: &'static str) -> Result<u8> {
    let raw = value.int_field(key)?;
    u8::try_from(raw).map_err(|_| Error::InvalidValue {
        field: key,
        value: raw.to_string(),
    })
}

/// One lobby seat
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub control: Control,
    pub observe: Observe,
    pub working_set_slot_id: Option<i64>,
    /// Only set for human seats
    pub user_id: Option<i64>,
    pub toon_handle: String,
    pub team_id: i64,
}

impl Slot {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            control: enum_field(value, "m_control", Control::from_i64)?,
            observe: enum_field(value, "m_observe", Observe::from_i64)?,
            working_set_slot_id: value.opt_int_field("m_workingSetSlotId"),
            user_id: value.opt_int_field("m_userId"),
            toon_handle: strip_nul(&value.text_field("m_toonHandle")).to_string(),
            team_id: value.int_field("m_teamId")?,
        })
    }

    pub fn is_observer(&self) -> bool {
        self.observe > Observe::Player
    }
}

/// Account identifier split into its parts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ToonComponents {
    pub region: i64,
    pub program_id: String,
    pub realm: i64,
    pub id: i64,
}

impl ToonComponents {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            region: value.int_field("m_region")?,
            program_id: strip_nul(&value.text_field("m_programId")).to_string(),
            realm: value.int_field("m_realm")?,
            id: value.int_field("m_id")?,
        })
    }

    /// `region-programId-realm-id`
    pub fn handle(&self) -> String {
        format!("{}-{}-{}-{}", self.region, self.program_id, self.realm, self.id)
    }

    pub fn region_code(&self) -> Option<&'static str> {
        region_code(self.region)
    }
}

/// Battle.net region name for a region number
pub fn region_code(region: i64) -> Option<&'static str> {
    match region {
        1 => Some("us"),
        2 => Some("eu"),
        3 => Some("kr"),
        5 => Some("cn"),
        6 => Some("sea"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn from_value(value: &Value) -> Result<Self> {
        Ok(Self {
            r: byte_field(value, "m_r")?,
            g: byte_field(value, "m_g")?,
            b: byte_field(value, "m_b")?,
            a: byte_field(value, "m_a")?,
        })
    }
}

/// Entry of the details player list
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerResult {
    /// List position + 1
    pub player_id: i64,
    pub name: String,
    pub toon: ToonComponents,
    pub race: String,
    pub color: Color,
    pub result: GameResult,
    pub working_set_slot_id: Option<i64>,
    pub team_id: Option<i64>,
}

impl PlayerResult {
    pub fn from_value(value: &Value, index: usize) -> Result<Self> {
        let name = value
            .get("m_name")
            .and_then(Value::as_blob)
            .map(clean_name)
            .unwrap_or_default();
        Ok(Self {
            player_id: index as i64 + 1,
            name,
            toon: ToonComponents::from_value(value.field("m_toon")?)?,
            race: strip_nul(&value.text_field("m_race")).to_string(),
            color: Color::from_value(value.field("m_color")?)?,
            // only a win is ever acted on; unknown codes count as undecided
            result: GameResult::from_i64(value.int_field("m_result")?).unwrap_or_default(),
            working_set_slot_id: value.opt_int_field("m_workingSetSlotId"),
            team_id: value.opt_int_field("m_teamId"),
        })
    }
}

/// Details player list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerList {
    players: Vec<PlayerResult>,
}

impl PlayerList {
    pub fn from_details(details: &Value) -> Result<Self> {
        let players = details
            .array_field("m_playerList")?
            .iter()
            .enumerate()
            .map(|(i, v)| PlayerResult::from_value(v, i))
            .collect::<Result<_>>()?;
        Ok(Self { players })
    }

    /// First player seated in the given working-set slot
    pub fn for_slot(&self, working_set_slot_id: Option<i64>) -> Option<&PlayerResult> {
        let slot_id = working_set_slot_id?;
        self.players
            .iter()
            .find(|p| p.working_set_slot_id == Some(slot_id))
    }

    pub fn for_toon(&self, handle: &str) -> Option<&PlayerResult> {
        self.players.iter().find(|p| p.toon.handle() == handle)
    }

    /// First player with a winning result
    pub fn winner(&self) -> Option<&PlayerResult> {
        self.players.iter().find(|p| p.result == GameResult::Winner)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerResult> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Lobby user-init entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LobbyUser {
    pub name: String,
    pub clan_tag: String,
}

impl LobbyUser {
    pub fn from_value(value: &Value) -> Self {
        let text = |key| {
            value
                .get(key)
                .and_then(Value::as_blob)
                .map(clean_name)
                .unwrap_or_default()
        };
        Self {
            name: text("m_name"),
            clan_tag: text("m_clanTag"),
        }
    }
}

/// Lobby state from the init data
#[derive(Debug, Clone, PartialEq)]
pub struct Lobby {
    pub slots: Vec<Slot>,
    pub users: Vec<LobbyUser>,
    pub random_seed: i64,
    pub host_user_id: Option<i64>,
    pub game_speed: GameSpeed,
}

impl Lobby {
    pub fn from_init_data(init_data: &Value) -> Result<Self> {
        let sync = init_data.field("m_syncLobbyState")?;
        let state = sync.field("m_lobbyState")?;
        let slots = state
            .array_field("m_slots")?
            .iter()
            .map(Slot::from_value)
            .collect::<Result<_>>()?;
        let users = sync
            .array_field("m_userInitialData")?
            .iter()
            .map(LobbyUser::from_value)
            .collect();
        let game_speed = enum_field(
            sync.field("m_gameDescription")?,
            "m_gameSpeed",
            GameSpeed::from_i64,
        )?;
        Ok(Self {
            slots,
            users,
            random_seed: state.int_field("m_randomSeed")?,
            host_user_id: state.opt_int_field("m_hostUserId"),
            game_speed,
        })
    }

    /// User-init entry for a user id; `None` when the id is out of range
    pub fn user(&self, user_id: i64) -> Option<&LobbyUser> {
        usize::try_from(user_id).ok().and_then(|i| self.users.get(i))
    }
}
