use tracing::debug;

use super::config::{GameKind, ReplayConfig};
use super::document::{build_match_document, game_mode_attribute, infer_game_mode, MatchDocument};
use super::lobby::{PlayerList, PlayerResult};
use super::reconcile::{reconcile_players, Roster};
use super::sections::{cached, ReplaySection, SectionCache};
use crate::archive::ArchiveSource;
use crate::codec::Value;
use crate::error::{Error, Result};
use crate::protocol::{Decoder, ProtocolRegistry};

/// Builder for opening replays
pub struct ReplayBuilder<A> {
    archive: A,
    config: ReplayConfig,
}

impl<A: ArchiveSource> ReplayBuilder<A> {
    pub fn new(archive: A) -> Self {
        Self {
            archive,
            config: ReplayConfig::default(),
        }
    }

    /// Select the game by name (`sc2`, `hero`)
    pub fn game(mut self, selector: &str) -> Result<Self> {
        self.config.game = selector.parse()?;
        Ok(self)
    }

    pub fn game_kind(mut self, game: GameKind) -> Self {
        self.config.game = game;
        self
    }

    pub fn open(self, registry: &ProtocolRegistry) -> Result<Replay<A>> {
        Replay::with_config(self.archive, self.config, registry)
    }
}

/// An opened replay.
///
/// The header is decoded when the replay is opened and selects the decoder for
/// every other section. Sections decode on first access and stay cached for
/// the life of the replay.
pub struct Replay<A> {
    archive: A,
    config: ReplayConfig,
    decoder: Box<dyn Decoder>,
    base_build: u32,
    header: Value,
    sections: SectionCache,
}

impl<A: ArchiveSource> Replay<A> {
    pub fn open(archive: A, game: &str, registry: &ProtocolRegistry) -> Result<Self> {
        ReplayBuilder::new(archive).game(game)?.open(registry)
    }

    pub fn with_config(archive: A, config: ReplayConfig, registry: &ProtocolRegistry) -> Result<Self> {
        let blob = archive.user_data_header()?;
        let header = registry.latest_header_decoder().decode_header(&blob)?;

        let raw_build = header.path(&["m_version", "m_baseBuild"])?;
        let base_build = raw_build
            .as_i64()
            .and_then(|b| u32::try_from(b).ok())
            .ok_or_else(|| Error::InvalidValue {
                field: "m_baseBuild",
                value: format!("{raw_build:?}"),
            })?;
        let decoder = registry.resolve(base_build)?;
        debug!(game = %config.game, base_build, "opened replay");

        Ok(Self {
            archive,
            config,
            decoder,
            base_build,
            header,
            sections: SectionCache::default(),
        })
    }

    pub fn game(&self) -> GameKind {
        self.config.game
    }

    pub fn base_build(&self) -> u32 {
        self.base_build
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn is_cached(&self, section: ReplaySection) -> bool {
        self.sections.is_cached(section)
    }

    fn read_section(&self, section: ReplaySection) -> Result<Vec<u8>> {
        let name = section.name();
        let data = self
            .archive
            .read_file(name)?
            .ok_or(Error::MissingSection(name))?;
        debug!(section = name, bytes = data.len(), "decoding replay section");
        Ok(data)
    }

    pub fn header(&self) -> &Value {
        &self.header
    }

    pub fn details(&self) -> Result<&Value> {
        cached(&self.sections.details, || {
            let data = self.read_section(ReplaySection::Details)?;
            self.decoder.decode_details(&data)
        })
    }

    pub fn init_data(&self) -> Result<&Value> {
        cached(&self.sections.init_data, || {
            let data = self.read_section(ReplaySection::InitData)?;
            self.decoder.decode_init_data(&data)
        })
    }

    pub fn attribute_events(&self) -> Result<&Value> {
        cached(&self.sections.attribute_events, || {
            let data = self.read_section(ReplaySection::AttributeEvents)?;
            self.decoder.decode_attribute_events(&data)
        })
    }

    pub fn game_events(&self) -> Result<&[Value]> {
        let events = cached(&self.sections.game_events, || {
            let data = self.read_section(ReplaySection::GameEvents)?;
            let events = self.decoder.decode_game_events(&data)?;
            events.collect()
        })?;
        Ok(events)
    }

    pub fn message_events(&self) -> Result<&[Value]> {
        let events = cached(&self.sections.message_events, || {
            let data = self.read_section(ReplaySection::MessageEvents)?;
            let events = self.decoder.decode_message_events(&data)?;
            events.collect()
        })?;
        Ok(events)
    }

    /// Tracker events, each unit-carrying event extended with `_unit_tag`
    pub fn tracker_events(&self) -> Result<&[Value]> {
        let events = cached(&self.sections.tracker_events, || {
            let data = self.read_section(ReplaySection::TrackerEvents)?;
            let mut events = self
                .decoder
                .decode_tracker_events(&data)?
                .collect::<Result<Vec<_>>>()?;
            for event in &mut events {
                let (Some(index), Some(recycle)) = (
                    event.opt_int_field("m_unitTagIndex"),
                    event.opt_int_field("m_unitTagRecycle"),
                ) else {
                    continue;
                };
                event.insert("_unit_tag", Value::Int(self.decoder.unit_tag(index, recycle)));
            }
            Ok(events)
        })?;
        Ok(events)
    }

    /// Decoded player list
    pub fn players(&self) -> Result<PlayerList> {
        PlayerList::from_details(self.details()?)
    }

    /// First player whose result is a win
    pub fn match_winner(&self) -> Result<Option<PlayerResult>> {
        Ok(self.players()?.winner().cloned())
    }

    pub fn player_for_toon(&self, handle: &str) -> Result<Option<PlayerResult>> {
        Ok(self.players()?.for_toon(handle).cloned())
    }

    pub fn reconcile_players(&self) -> Result<Roster> {
        reconcile_players(self.details()?, self.init_data()?, self.config.game)
    }

    /// Recorded match size, or one inferred from the teams
    pub fn game_mode(&self) -> Result<String> {
        if let Some(mode) = game_mode_attribute(self.attribute_events()?) {
            return Ok(mode);
        }
        let roster = self.reconcile_players()?;
        Ok(infer_game_mode(roster.humans.len(), roster.team_ids.len()))
    }

    pub fn match_details(&self) -> Result<MatchDocument> {
        let roster = self.reconcile_players()?;
        build_match_document(
            &self.header,
            self.details()?,
            self.init_data()?,
            self.attribute_events()?,
            roster,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::archive::MemoryArchive;
    use crate::codec::versioned::encode;
    use crate::protocol::JsonDecoder;
    use crate::replay::fixtures;
    use crate::replay::lobby::GameResult;

    const BUILD: i64 = 75689;

    const TRACKER_EVENTS: &str = concat!(
        r#"{"_event":"NNet.Replay.Tracker.SUnitBornEvent","m_unitTagIndex":3,"m_unitTagRecycle":1}"#,
        "\n",
        r#"{"_event":"NNet.Replay.Tracker.SPlayerStatsEvent","m_playerId":1}"#,
        "\n",
    );

    /// Archive that records every file read
    struct CountingArchive {
        inner: MemoryArchive,
        reads: RefCell<Vec<String>>,
    }

    impl ArchiveSource for CountingArchive {
        fn user_data_header(&self) -> Result<Vec<u8>> {
            self.inner.user_data_header()
        }

        fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>> {
            self.reads.borrow_mut().push(name.to_string());
            self.inner.read_file(name)
        }
    }

    fn archive(header: Vec<u8>) -> MemoryArchive {
        let (details, init) = fixtures::one_v_one();
        MemoryArchive::new(header)
            .with_file("replay.details", details.to_string())
            .with_file("replay.initData", init.to_string())
            .with_file("replay.attributes.events", fixtures::attributes(Some("1v1")).to_string())
            .with_file("replay.tracker.events", TRACKER_EVENTS)
            .with_file("replay.game.events", "[]")
            .with_file("replay.message.events", r#"[{"m_string":"gg"}]"#)
    }

    fn json_archive() -> MemoryArchive {
        archive(fixtures::header(BUILD, 13440).to_string().into_bytes())
    }

    fn json_registry() -> ProtocolRegistry {
        ProtocolRegistry::new(JsonDecoder).with_build(BUILD as u32, JsonDecoder::factory)
    }

    #[test]
    fn test_open_with_json_header() {
        let replay = Replay::open(json_archive(), "sc2", &json_registry()).unwrap();
        assert_eq!(replay.base_build(), 75689);
        assert_eq!(replay.game(), GameKind::StarCraft2);
        assert_eq!(replay.header().int_field("m_elapsedGameLoops").unwrap(), 13440);
    }

    #[test]
    fn test_open_with_versioned_header() {
        let header = encode::header(4, 0, 2, 75689, 75689, 13440);
        let registry = ProtocolRegistry::default().with_build(75689, JsonDecoder::factory);
        let replay = ReplayBuilder::new(archive(header)).open(&registry).unwrap();

        let doc = replay.match_details().unwrap();
        assert_eq!(doc.version.number, "4.0.2");
        assert_eq!(doc.duration, 840);
    }

    #[test]
    fn test_unsupported_base_build() {
        let registry = ProtocolRegistry::new(JsonDecoder).with_build(88500, JsonDecoder::factory);
        match Replay::open(json_archive(), "sc2", &registry) {
            Err(Error::UnsupportedBaseBuild(build)) => assert_eq!(build, 75689),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("replay should not open"),
        }
    }

    #[test]
    fn test_malformed_header_is_error() {
        // vint whose magnitude overflows i64
        let mut blob = vec![9, 0x81];
        blob.extend([0x80; 8]);
        blob.push(0x02);

        let result = Replay::open(MemoryArchive::new(blob), "sc2", &ProtocolRegistry::default());
        assert!(matches!(result, Err(Error::InvalidValue { field: "vint", .. })));
    }

    #[test]
    fn test_unsupported_game() {
        let result = ReplayBuilder::new(json_archive()).game("wc3");
        assert!(matches!(result, Err(Error::UnsupportedGame(name)) if name == "wc3"));
    }

    #[test]
    fn test_missing_section_on_first_access() {
        let mut source = json_archive();
        source.remove("replay.game.events");
        let replay = Replay::open(source, "sc2", &json_registry()).unwrap();

        assert!(replay.details().is_ok());
        assert!(matches!(
            replay.game_events(),
            Err(Error::MissingSection("replay.game.events"))
        ));
    }

    #[test]
    fn test_sections_decode_once() {
        let source = CountingArchive {
            inner: json_archive(),
            reads: RefCell::new(Vec::new()),
        };
        let replay = ReplayBuilder::new(source).open(&json_registry()).unwrap();
        assert!(!replay.is_cached(ReplaySection::Details));

        let first = replay.details().unwrap();
        let second = replay.details().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(replay.is_cached(ReplaySection::Details));

        replay.match_details().unwrap();
        replay.match_details().unwrap();

        let reads = replay.archive().reads.borrow();
        assert_eq!(
            *reads,
            vec!["replay.details", "replay.initData", "replay.attributes.events"]
        );
    }

    #[test]
    fn test_tracker_unit_tags() {
        let replay = Replay::open(json_archive(), "sc2", &json_registry()).unwrap();
        let events = replay.tracker_events().unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].int_field("_unit_tag").unwrap(), (3 << 18) + 1);
        assert!(!events[1].contains_key("_unit_tag"));
    }

    #[test]
    fn test_event_streams() {
        let replay = Replay::open(json_archive(), "sc2", &json_registry()).unwrap();
        assert!(replay.game_events().unwrap().is_empty());
        assert_eq!(replay.message_events().unwrap()[0].text_field("m_string"), "gg");
    }

    #[test]
    fn test_match_winner_and_lookup() {
        let replay = Replay::open(json_archive(), "sc2", &json_registry()).unwrap();

        let winner = replay.match_winner().unwrap().unwrap();
        assert_eq!(winner.name, "Serral");
        assert_eq!(winner.result, GameResult::Winner);

        let maru = replay.player_for_toon("2-S2-1-222").unwrap().unwrap();
        assert_eq!(maru.player_id, 2);
        assert!(replay.player_for_toon("1-S2-1-999").unwrap().is_none());
    }

    #[test]
    fn test_game_mode() {
        let replay = Replay::open(json_archive(), "sc2", &json_registry()).unwrap();
        assert_eq!(replay.game_mode().unwrap(), "1v1");

        let mut source = json_archive();
        source.insert("replay.attributes.events", fixtures::attributes(None).to_string());
        let replay = Replay::open(source, "sc2", &json_registry()).unwrap();
        // the observer's team counts as a third team
        assert_eq!(replay.game_mode().unwrap(), "0v0");
    }

    #[test]
    fn test_match_details_json() {
        let replay = Replay::open(json_archive(), "hero", &json_registry()).unwrap();
        let doc = replay.match_details().unwrap();
        assert_eq!(doc.winner_toon_handle.as_deref(), Some("2-S2-1-111"));
        assert_eq!(doc.mapname, "Abyssal Reef LE");

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["gamemode"], "1v1");
        assert_eq!(json["winner_team_id"], 1);
        assert_eq!(json["observers"]["2-S2-1-333"]["name"], "Caster Tasteless");
    }
}
