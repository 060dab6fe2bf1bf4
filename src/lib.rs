//! Replay match documents
//!
//! Turns the decoded sections of a game replay archive into one canonical
//! match document: participants reconciled across the lobby and the player
//! list, the winner, game mode, timing and a fingerprint shared by every
//! recording of the same match.

pub mod archive;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod replay;
pub mod text;

pub use error::{Error, Result};
pub use archive::{ArchiveSource, DirectoryArchive, MemoryArchive};
pub use codec::Value;
pub use protocol::{Decoder, HeaderDecoder, JsonDecoder, ProtocolRegistry};
pub use replay::{
    GameKind, MatchDocument, Participant, ReconciliationAnomaly,
    Replay, ReplayBuilder, ReplayConfig, Roster,
};
