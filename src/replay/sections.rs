use std::cell::OnceCell;
use std::fmt;

use crate::codec::Value;
use crate::error::Result;

/// One decoded part of a replay archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplaySection {
    Header,
    Details,
    InitData,
    GameEvents,
    MessageEvents,
    TrackerEvents,
    AttributeEvents,
}

impl ReplaySection {
    pub const ALL: [ReplaySection; 7] = [
        ReplaySection::Header,
        ReplaySection::Details,
        ReplaySection::InitData,
        ReplaySection::GameEvents,
        ReplaySection::MessageEvents,
        ReplaySection::TrackerEvents,
        ReplaySection::AttributeEvents,
    ];

    /// Archive file holding the section. The header lives in the user-data
    /// block instead and has none.
    pub fn file_name(self) -> Option<&'static str> {
        match self {
            Self::Header => None,
            Self::Details => Some("replay.details"),
            Self::InitData => Some("replay.initData"),
            Self::GameEvents => Some("replay.game.events"),
            Self::MessageEvents => Some("replay.message.events"),
            Self::TrackerEvents => Some("replay.tracker.events"),
            Self::AttributeEvents => Some("replay.attributes.events"),
        }
    }

    pub fn name(self) -> &'static str {
        self.file_name().unwrap_or("replay.header")
    }
}

impl fmt::Display for ReplaySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-replay memo of decoded sections. Each cell is filled at most once.
#[derive(Debug, Default)]
pub(crate) struct SectionCache {
    pub details: OnceCell<Value>,
    pub init_data: OnceCell<Value>,
    pub game_events: OnceCell<Vec<Value>>,
    pub message_events: OnceCell<Vec<Value>>,
    pub tracker_events: OnceCell<Vec<Value>>,
    pub attribute_events: OnceCell<Value>,
}

impl SectionCache {
    pub fn is_cached(&self, section: ReplaySection) -> bool {
        match section {
            ReplaySection::Header => true,
            ReplaySection::Details => self.details.get().is_some(),
            ReplaySection::InitData => self.init_data.get().is_some(),
            ReplaySection::GameEvents => self.game_events.get().is_some(),
            ReplaySection::MessageEvents => self.message_events.get().is_some(),
            ReplaySection::TrackerEvents => self.tracker_events.get().is_some(),
            ReplaySection::AttributeEvents => self.attribute_events.get().is_some(),
        }
    }
}

/// Fill `cell` with `init` on first access. A failed decode leaves the cell
/// empty so the next access retries.
pub(crate) fn cached<T>(cell: &OnceCell<T>, init: impl FnOnce() -> Result<T>) -> Result<&T> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}
