use sha2::{Digest, Sha256};

use super::reconcile::Participant;

/// Token separator inside the hashed string
const DELIMITER: &str = ";";

/// Digest bytes kept in the fingerprint (128 bits)
const FINGERPRINT_BYTES: usize = 16;

/// Hash grouping replay files recorded from the same match.
///
/// Every participant's copy of a replay carries the same human accounts and
/// the same lobby random seed, so hashing those yields one value per match.
/// Not globally unique; good enough to tell the games of a series apart.
pub fn match_fingerprint<'a>(humans: impl IntoIterator<Item = &'a Participant>, random_seed: i64) -> String {
    let mut tokens: Vec<(&str, String)> = humans
        .into_iter()
        .map(|p| (p.handle(), format!("{}:{}", p.user_id, p.handle())))
        .collect();
    // slot order differs between recordings of the same match
    tokens.sort();

    let mut joined: Vec<String> = tokens.into_iter().map(|(_, token)| token).collect();
    joined.push(random_seed.to_string());

    let mut hasher = Sha256::new();
    hasher.update(joined.join(DELIMITER).as_bytes());
    let digest = hasher.finalize();

    digest[..FINGERPRINT_BYTES]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Value;
    use crate::replay::config::GameKind;
    use crate::replay::fixtures;
    use crate::replay::reconcile::reconcile_players;

    fn humans(swap: bool) -> Vec<Participant> {
        let (details, mut init) = fixtures::one_v_one();
        if swap {
            let slots = init["m_syncLobbyState"]["m_lobbyState"]["m_slots"]
                .as_array_mut()
                .unwrap();
            slots.swap(0, 1);
        }
        let roster = reconcile_players(&Value::from(details), &Value::from(init), GameKind::StarCraft2).unwrap();
        roster.humans.into_values().collect()
    }

    #[test]
    fn test_fingerprint_shape() {
        let hash = match_fingerprint(&humans(false), fixtures::RANDOM_SEED);
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_is_idempotent() {
        let players = humans(false);
        assert_eq!(
            match_fingerprint(&players, fixtures::RANDOM_SEED),
            match_fingerprint(&players, fixtures::RANDOM_SEED)
        );
    }

    #[test]
    fn test_fingerprint_ignores_order() {
        let mut players = humans(false);
        let forward = match_fingerprint(&players, fixtures::RANDOM_SEED);
        players.reverse();
        assert_eq!(forward, match_fingerprint(&players, fixtures::RANDOM_SEED));

        // a recording whose lobby lists the slots the other way round
        assert_eq!(forward, match_fingerprint(&humans(true), fixtures::RANDOM_SEED));
    }

    #[test]
    fn test_fingerprint_depends_on_seed_and_players() {
        let players = humans(false);
        let base = match_fingerprint(&players, fixtures::RANDOM_SEED);
        assert_ne!(base, match_fingerprint(&players, fixtures::RANDOM_SEED + 1));
        assert_ne!(base, match_fingerprint(&players[..1], fixtures::RANDOM_SEED));
    }

    #[test]
    fn test_fingerprint_ignores_computers_and_observers() {
        let (details, init) = fixtures::one_v_one();
        let with_observer =
            reconcile_players(&Value::from(details), &Value::from(init), GameKind::StarCraft2).unwrap();
        assert_eq!(with_observer.observers.len(), 1);

        // same two humans, the observer seat replaced by an AI
        let init = fixtures::init_data(
            vec![fixtures::user("Serral", Some("BASK")), fixtures::user("Maru", None)],
            vec![
                fixtures::human_slot(0, 0, "2-S2-1-111", 1),
                fixtures::human_slot(1, 1, "2-S2-1-222", 2),
                fixtures::ai_slot(3, 2),
            ],
        );
        let details = fixtures::details(vec![
            fixtures::player("Serral", 0, 2, 111, "Zerg", 1),
            fixtures::player("Maru", 1, 2, 222, "Terr", 2),
            fixtures::ai_player("Computer (Elite)", 3, 2),
        ]);
        let with_computer =
            reconcile_players(&Value::from(details), &Value::from(init), GameKind::StarCraft2).unwrap();
        assert_eq!(with_computer.computers.len(), 1);
        assert!(with_computer.observers.is_empty());

        assert_eq!(
            match_fingerprint(with_observer.humans.values(), fixtures::RANDOM_SEED),
            match_fingerprint(with_computer.humans.values(), fixtures::RANDOM_SEED)
        );
    }

    #[test]
    fn test_fingerprint_without_humans() {
        // only the seed is hashed
        let empty: Vec<Participant> = Vec::new();
        assert_eq!(match_fingerprint(&empty, 1), match_fingerprint(&empty, 1));
        assert_ne!(match_fingerprint(&empty, 1), match_fingerprint(&empty, 2));
    }
}
