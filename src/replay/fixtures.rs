//! Decoded-section builders shared by the replay tests.

use serde_json::{json, Value as Json};

pub const RANDOM_SEED: i64 = 3_735_928_559;

/// 2017-10-21 00:00:00 UTC as NT ticks
pub const TIME_UTC: i64 = 131_530_176_000_000_000;

/// UTC+2 in 100ns ticks
pub const LOCAL_OFFSET: i64 = 72_000_000_000;

pub fn human_slot(user_id: i64, slot_id: i64, toon: &str, team: i64) -> Json {
    json!({
        "m_control": 2,
        "m_observe": 0,
        "m_userId": user_id,
        "m_workingSetSlotId": slot_id,
        "m_toonHandle": toon,
        "m_teamId": team,
    })
}

pub fn observer_slot(user_id: i64, slot_id: i64, toon: &str, team: i64) -> Json {
    json!({
        "m_control": 2,
        "m_observe": 1,
        "m_userId": user_id,
        "m_workingSetSlotId": slot_id,
        "m_toonHandle": toon,
        "m_teamId": team,
    })
}

pub fn ai_slot(slot_id: i64, team: i64) -> Json {
    json!({
        "m_control": 3,
        "m_observe": 0,
        "m_userId": null,
        "m_workingSetSlotId": slot_id,
        "m_toonHandle": "",
        "m_teamId": team,
    })
}

pub fn open_slot(team: i64) -> Json {
    json!({
        "m_control": 0,
        "m_observe": 0,
        "m_userId": null,
        "m_workingSetSlotId": null,
        "m_toonHandle": "",
        "m_teamId": team,
    })
}

pub fn player(name: &str, slot_id: i64, region: i64, id: i64, race: &str, result: i64) -> Json {
    json!({
        "m_name": name,
        "m_toon": { "m_region": region, "m_programId": "S2", "m_realm": 1, "m_id": id },
        "m_race": race,
        "m_color": { "m_a": 255, "m_r": 180, "m_g": 20, "m_b": 30 },
        "m_result": result,
        "m_workingSetSlotId": slot_id,
    })
}

pub fn ai_player(name: &str, slot_id: i64, result: i64) -> Json {
    json!({
        "m_name": name,
        "m_toon": { "m_region": 0, "m_programId": "", "m_realm": 0, "m_id": 0 },
        "m_race": "Prot",
        "m_color": { "m_a": 255, "m_r": 0, "m_g": 66, "m_b": 255 },
        "m_result": result,
        "m_workingSetSlotId": slot_id,
    })
}

pub fn user(name: &str, clan: Option<&str>) -> Json {
    json!({ "m_name": name, "m_clanTag": clan })
}

pub fn init_data(users: Vec<Json>, slots: Vec<Json>) -> Json {
    json!({
        "m_syncLobbyState": {
            "m_userInitialData": users,
            "m_gameDescription": { "m_gameSpeed": 4 },
            "m_lobbyState": {
                "m_slots": slots,
                "m_randomSeed": RANDOM_SEED,
                "m_hostUserId": null,
            },
        }
    })
}

pub fn details(players: Vec<Json>) -> Json {
    json!({
        "m_playerList": players,
        "m_title": "Abyssal Reef LE",
        "m_timeUTC": TIME_UTC,
        "m_timeLocalOffset": LOCAL_OFFSET,
    })
}

pub fn header(base_build: i64, loops: i64) -> Json {
    json!({
        "m_signature": "StarCraft II replay\u{1b}11",
        "m_version": {
            "m_flags": 1, "m_major": 4, "m_minor": 0, "m_revision": 2,
            "m_build": base_build, "m_baseBuild": base_build,
        },
        "m_type": 2,
        "m_elapsedGameLoops": loops,
    })
}

pub fn attributes(game_mode: Option<&str>) -> Json {
    let mut scopes = json!({ "1": { "500": [{ "namespace": 999, "attrid": 500, "value": "Humn" }] } });
    if let Some(mode) = game_mode {
        scopes["16"] = json!({ "2001": [{ "namespace": 999, "attrid": 2001, "value": mode }] });
    }
    json!({ "source": 0, "mapNamespace": 999, "scopes": scopes })
}

/// Serral (winner, team 1) vs Maru (team 2), plus one observer
pub fn one_v_one() -> (Json, Json) {
    let init = init_data(
        vec![
            user("Serral", Some("BASK")),
            user("Maru", None),
            user("Caster<sp/>Tasteless", None),
        ],
        vec![
            human_slot(0, 0, "2-S2-1-111", 1),
            human_slot(1, 1, "2-S2-1-222", 2),
            observer_slot(2, 2, "2-S2-1-333", 0),
            open_slot(0),
        ],
    );
    let details = details(vec![
        player("Serral", 0, 2, 111, "Zerg", 1),
        player("Maru", 1, 2, 222, "Terr", 2),
    ]);
    (details, init)
}
