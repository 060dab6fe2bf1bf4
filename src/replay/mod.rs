pub mod config;
pub mod document;
pub mod fingerprint;
pub mod lobby;
pub mod reconcile;
pub mod sections;
pub mod session;

#[cfg(test)]
pub(crate) mod fixtures;

pub use config::{GameKind, ReplayConfig};
pub use document::{build_match_document, MatchDocument, Players, VersionInfo};
pub use fingerprint::match_fingerprint;
pub use lobby::{
    Color, Control, GameResult, GameSpeed, Lobby, LobbyUser,
    Observe, PlayerList, PlayerResult, Slot, ToonComponents,
};
pub use reconcile::{
    reconcile, reconcile_players, Competitor, Participant, ParticipantKind,
    ReconciliationAnomaly, Roster, Toon, Winner,
};
pub use sections::ReplaySection;
pub use session::{Replay, ReplayBuilder};
