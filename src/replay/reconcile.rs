//! Joins lobby slots, the details player list and lobby user data into one
//! participant per occupied slot.
//!
//! The three sources key players differently. Slots and player results share
//! the working-set slot id; slots and lobby users share the user id. AI seats
//! have no user id and observers have no player result, so each kind takes a
//! different path through [`reconcile`].

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::warn;

use super::config::GameKind;
use super::lobby::{Color, Control, GameResult, Lobby, PlayerList, PlayerResult, Slot, ToonComponents};
use crate::codec::Value;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    Human,
    Ai,
    Observer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toon {
    pub handle: String,
    #[serde(flatten)]
    pub components: Option<ToonComponents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_code: Option<&'static str>,
}

/// Fields only competitors carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Competitor {
    pub player_id: i64,
    pub race: String,
    pub result: GameResult,
    pub color: Color,
}

/// A reconciled lobby participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    #[serde(skip)]
    pub kind: ParticipantKind,
    /// -1 for AI
    pub user_id: i64,
    pub toon: Toon,
    pub name: String,
    pub clan_tag: String,
    pub fullname: String,
    pub team_id: i64,
    #[serde(flatten)]
    pub competitor: Option<Competitor>,
}

impl Participant {
    fn base(kind: ParticipantKind, user_id: i64, handle: String, name: String, clan_tag: String, team_id: i64) -> Self {
        let fullname = if clan_tag.is_empty() {
            name.clone()
        } else {
            format!("[{clan_tag}]{name}")
        };
        Self {
            kind,
            user_id,
            toon: Toon {
                handle,
                components: None,
                region_code: None,
            },
            name,
            clan_tag,
            fullname,
            team_id,
            competitor: None,
        }
    }

    fn with_result(mut self, player: &PlayerResult) -> Self {
        self.toon.region_code = player.toon.region_code();
        self.toon.components = Some(player.toon.clone());
        self.competitor = Some(Competitor {
            player_id: player.player_id,
            race: player.race.clone(),
            result: player.result,
            color: player.color,
        });
        self
    }

    pub fn handle(&self) -> &str {
        &self.toon.handle
    }

    pub fn result(&self) -> Option<GameResult> {
        self.competitor.as_ref().map(|c| c.result)
    }
}

/// Participant holding the winning result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    pub toon_handle: String,
    pub team_id: i64,
}

/// Structural oddity found while reconciling; the slot is skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconciliationAnomaly {
    AiWithoutPlayerResult {
        working_set_slot_id: Option<i64>,
    },
    CompetitorWithoutPlayerResult {
        working_set_slot_id: Option<i64>,
        toon_handle: String,
    },
    MissingLobbyUser {
        user_id: i64,
    },
}

impl fmt::Display for ReconciliationAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AiWithoutPlayerResult { working_set_slot_id } => {
                write!(f, "AI slot {working_set_slot_id:?} absent from player list")
            }
            Self::CompetitorWithoutPlayerResult { working_set_slot_id, toon_handle } => {
                write!(f, "user {toon_handle} (slot {working_set_slot_id:?}) absent from player list")
            }
            Self::MissingLobbyUser { user_id } => {
                write!(f, "user id {user_id} has no lobby user entry")
            }
        }
    }
}

/// Reconciled participants, keyed by toon handle in lobby order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub humans: IndexMap<String, Participant>,
    pub computers: IndexMap<String, Participant>,
    pub observers: IndexMap<String, Participant>,
    /// Distinct team ids of every participant, observers included
    pub team_ids: IndexSet<i64>,
    pub winner: Option<Winner>,
    pub anomalies: Vec<ReconciliationAnomaly>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.humans.len() + self.computers.len() + self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn winner_team_id(&self) -> i64 {
        self.winner.as_ref().map_or(-1, |w| w.team_id)
    }

    fn anomaly(&mut self, anomaly: ReconciliationAnomaly) {
        warn!(%anomaly, "skipping slot");
        self.anomalies.push(anomaly);
    }
}

/// Reconcile decoded details and init data
pub fn reconcile_players(details: &Value, init_data: &Value, game: GameKind) -> Result<Roster> {
    let players = PlayerList::from_details(details)?;
    let lobby = Lobby::from_init_data(init_data)?;
    Ok(reconcile(&lobby, &players, game))
}

pub fn reconcile(lobby: &Lobby, players: &PlayerList, game: GameKind) -> Roster {
    let mut roster = Roster::default();

    for slot in &lobby.slots {
        let Some(participant) = identify(slot, lobby, players, game, &mut roster) else {
            continue;
        };
        roster.team_ids.insert(participant.team_id);

        if slot.is_observer() {
            roster.observers.insert(participant.toon.handle.clone(), participant);
            continue;
        }

        let Some(player) = players.for_slot(slot.working_set_slot_id) else {
            roster.anomaly(ReconciliationAnomaly::CompetitorWithoutPlayerResult {
                working_set_slot_id: slot.working_set_slot_id,
                toon_handle: participant.toon.handle,
            });
            continue;
        };

        let participant = participant.with_result(player);
        if player.result == GameResult::Winner {
            roster.winner = Some(Winner {
                toon_handle: participant.toon.handle.clone(),
                team_id: participant.team_id,
            });
        }

        let handle = participant.toon.handle.clone();
        if slot.control == Control::Ai {
            roster.computers.insert(handle, participant);
        } else {
            roster.humans.insert(handle, participant);
        }
    }

    roster
}

/// Base participant for a slot, or `None` if the slot is skipped
fn identify(slot: &Slot, lobby: &Lobby, players: &PlayerList, game: GameKind, roster: &mut Roster) -> Option<Participant> {
    if slot.control == Control::Ai {
        let Some(player) = players.for_slot(slot.working_set_slot_id) else {
            roster.anomaly(ReconciliationAnomaly::AiWithoutPlayerResult {
                working_set_slot_id: slot.working_set_slot_id,
            });
            return None;
        };
        // AI seats have no account, synthesize a handle from the player id
        let handle = format!("0-{}-0-{}", game.program_id(), player.player_id);
        return Some(Participant::base(
            ParticipantKind::Ai,
            -1,
            handle,
            player.name.clone(),
            String::new(),
            slot.team_id,
        ));
    }

    let user_id = slot.user_id?;
    let Some(user) = lobby.user(user_id) else {
        roster.anomaly(ReconciliationAnomaly::MissingLobbyUser { user_id });
        return None;
    };
    let kind = if slot.is_observer() {
        ParticipantKind::Observer
    } else {
        ParticipantKind::Human
    };
    Some(Participant::base(
        kind,
        user_id,
        slot.toon_handle.clone(),
        user.name.clone(),
        user.clan_tag.clone(),
        slot.team_id,
    ))
}
