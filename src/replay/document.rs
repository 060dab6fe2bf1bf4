use chrono::DateTime;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::fingerprint::match_fingerprint;
use super::lobby::Lobby;
use super::reconcile::{Participant, ReconciliationAnomaly, Roster};
use crate::codec::Value;
use crate::error::{Error, Result};
use crate::text::strip_nul;

/// Seconds between 1601-01-01 and 1970-01-01
const NT_EPOCH_OFFSET_SECS: i64 = 11_644_473_600;

/// 100ns ticks per second
const TICKS_PER_SECOND: i64 = 10_000_000;

/// 100ns ticks per hour
const TICKS_PER_HOUR: f64 = 36_000_000_000.0;

/// Game loops per real-time second at normal simulation rate
const LOOPS_PER_SECOND: i64 = 16;

/// Attribute scope holding match-wide settings
const GLOBAL_ATTRIBUTE_SCOPE: &str = "16";

/// Match size attribute ("1v1", "2v2", ...)
const GAME_MODE_ATTRIBUTE: &str = "2001";

pub const STARTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert a Windows NT timestamp (100ns ticks since 1601) to unix seconds
pub fn nt_to_unix(ticks: i64) -> i64 {
    ticks.div_euclid(TICKS_PER_SECOND) - NT_EPOCH_OFFSET_SECS
}

/// Convert a timezone offset in 100ns ticks to hours
pub fn offset_hours(ticks: i64) -> f64 {
    ticks as f64 / TICKS_PER_HOUR
}

/// Game loops to whole seconds, rounding halves up
pub fn duration_seconds(game_loops: i64) -> i64 {
    (game_loops + LOOPS_PER_SECOND / 2).div_euclid(LOOPS_PER_SECOND)
}

/// Format unix seconds as `YYYY-MM-DD HH:MM:SS` in UTC
pub fn format_utc(unix: i64) -> Result<String> {
    let time = DateTime::from_timestamp(unix, 0).ok_or_else(|| Error::InvalidValue {
        field: "m_timeUTC",
        value: unix.to_string(),
    })?;
    Ok(time.format(STARTED_AT_FORMAT).to_string())
}

/// Explicit match size from the attribute events, if recorded
pub fn game_mode_attribute(attribute_events: &Value) -> Option<String> {
    let value = attribute_events
        .get("scopes")?
        .get(GLOBAL_ATTRIBUTE_SCOPE)?
        .get(GAME_MODE_ATTRIBUTE)?
        .index(0)?
        .get("value")?
        .to_text()?;
    let mode = strip_nul(&value);
    (!mode.is_empty()).then(|| mode.to_string())
}

/// Guess the match size from the human count and the distinct team count.
///
/// Assumes equally sized teams; asymmetric games (2v1, FFA with observers on
/// their own team) come out wrong.
pub fn infer_game_mode(humans: usize, teams: usize) -> String {
    let per_team = humans.checked_div(teams).unwrap_or(0);
    format!("{per_team}v{per_team}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// `major.minor.revision`
    pub number: String,
    pub build: i64,
    pub base_build: i64,
}

impl VersionInfo {
    pub fn from_header(header: &Value) -> Result<Self> {
        let version = header.field("m_version")?;
        Ok(Self {
            number: format!(
                "{}.{}.{}",
                version.int_field("m_major")?,
                version.int_field("m_minor")?,
                version.int_field("m_revision")?
            ),
            build: version.int_field("m_build")?,
            base_build: version.int_field("m_baseBuild")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Players {
    pub humans: IndexMap<String, Participant>,
    pub computers: IndexMap<String, Participant>,
}

/// Canonical description of one match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDocument {
    pub mapname: String,
    pub replay_hash: String,
    pub started_at: String,
    pub started_at_unix: i64,
    pub utc_timezone: f64,
    pub duration: i64,
    /// Serialized as `-1` when nobody won
    #[serde(serialize_with = "handle_or_sentinel")]
    pub winner_toon_handle: Option<String>,
    pub winner_team_id: i64,
    pub version: VersionInfo,
    pub gamemode: String,
    pub gamespeed: &'static str,
    pub host_user_id: i64,
    pub players: Players,
    pub observers: IndexMap<String, Participant>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<ReconciliationAnomaly>,
}

fn handle_or_sentinel<S: Serializer>(handle: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match handle {
        Some(handle) => serializer.serialize_str(handle),
        None => serializer.serialize_i64(-1),
    }
}

impl MatchDocument {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Participants of every kind
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.players
            .humans
            .values()
            .chain(self.players.computers.values())
            .chain(self.observers.values())
    }
}

/// Assemble the match document from decoded sections and a reconciled roster
pub fn build_match_document(
    header: &Value,
    details: &Value,
    init_data: &Value,
    attribute_events: &Value,
    roster: Roster,
) -> Result<MatchDocument> {
    let lobby = Lobby::from_init_data(init_data)?;

    let gamemode = game_mode_attribute(attribute_events)
        .unwrap_or_else(|| infer_game_mode(roster.humans.len(), roster.team_ids.len()));
    let replay_hash = match_fingerprint(roster.humans.values(), lobby.random_seed);

    let started_at_unix = nt_to_unix(details.int_field("m_timeUTC")?);
    let winner_team_id = roster.winner_team_id();
    let Roster {
        humans,
        computers,
        observers,
        winner,
        anomalies,
        ..
    } = roster;

    Ok(MatchDocument {
        mapname: strip_nul(&details.text_field("m_title")).to_string(),
        replay_hash,
        started_at: format_utc(started_at_unix)?,
        started_at_unix,
        utc_timezone: offset_hours(details.opt_int_field("m_timeLocalOffset").unwrap_or(0)),
        duration: duration_seconds(header.int_field("m_elapsedGameLoops")?),
        winner_toon_handle: winner.map(|w| w.toon_handle),
        winner_team_id,
        version: VersionInfo::from_header(header)?,
        gamemode,
        gamespeed: lobby.game_speed.label(),
        host_user_id: lobby.host_user_id.unwrap_or(-1),
        players: Players { humans, computers },
        observers,
        anomalies,
    })
}
