//! generator.rs：
//! - 隨機角色產生器（無限迭代器）與隊伍產生。
//! - 每次呼叫各自建立產生器，不使用全域狀態。
use crate::character::{Character, CharacterId, CharacterType, Side, MAX_CHARACTER_LEVEL};
use crate::error::{Error, Result};
use crate::team::Team;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashSet;

/// 從集合中產生唯一的隨機 ID
pub fn generate_unique_id<R: Rng>(used_ids: &mut HashSet<CharacterId>, rng: &mut R) -> CharacterId {
    loop {
        let new_id = CharacterId(rng.random());
        if used_ids.insert(new_id) {
            return new_id;
        }
    }
}

/// 無限產生隨機角色：類型從允許清單均勻選取，等級均勻落在 [1, max_level]
pub struct CharacterGenerator<'a, R: Rng> {
    allowed_types: &'a [CharacterType],
    max_level: u32,
    rng: &'a mut R,
    used_ids: &'a mut HashSet<CharacterId>,
}

impl<'a, R: Rng> CharacterGenerator<'a, R> {
    pub fn new(
        allowed_types: &'a [CharacterType],
        max_level: u32,
        rng: &'a mut R,
        used_ids: &'a mut HashSet<CharacterId>,
    ) -> Result<Self> {
        let func = "CharacterGenerator::new";

        if allowed_types.is_empty() {
            return Err(Error::InvalidParameter {
                func,
                detail: "允許的角色類型為空".to_string(),
            });
        }
        if max_level == 0 || max_level > MAX_CHARACTER_LEVEL {
            return Err(Error::InvalidLevel(max_level));
        }
        Ok(Self {
            allowed_types,
            max_level,
            rng,
            used_ids,
        })
    }
}

impl<R: Rng> Iterator for CharacterGenerator<'_, R> {
    type Item = Character;

    fn next(&mut self) -> Option<Character> {
        let kind = *self.allowed_types.choose(&mut *self.rng)?;
        let level = self.rng.random_range(1..=self.max_level);
        let id = generate_unique_id(&mut *self.used_ids, &mut *self.rng);
        // 類型清單非空且等級 >= 1，建構不會失敗
        Character::new(id, kind, level).ok()
    }
}

/// 產生 `count` 名角色組成的隊伍，`count` 為 0 時回傳空隊伍
pub fn generate_team<R: Rng>(
    allowed_types: &[CharacterType],
    max_level: u32,
    count: usize,
    rng: &mut R,
    used_ids: &mut HashSet<CharacterId>,
) -> Result<Team> {
    let func = "generate_team";

    let side = allowed_types
        .first()
        .map(|kind| kind.profile().side)
        .unwrap_or(Side::Player);
    if allowed_types.iter().any(|kind| kind.profile().side != side) {
        return Err(Error::InvalidParameter {
            func,
            detail: "允許的角色類型混雜了兩個陣營".to_string(),
        });
    }
    if count == 0 {
        return Ok(Team::new(side));
    }

    let characters: Vec<Character> =
        CharacterGenerator::new(allowed_types, max_level, rng, used_ids)?
            .take(count)
            .collect();
    if characters.len() != count {
        return Err(Error::InvalidParameter {
            func,
            detail: format!("只產生了 {} / {} 名角色", characters.len(), count),
        });
    }
    Team::from_characters(side, characters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generator_is_infinite_and_respects_constraints() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut used = HashSet::new();
        let allowed = CharacterType::player_types();
        let generator = CharacterGenerator::new(&allowed, 3, &mut rng, &mut used).unwrap();
        let characters: Vec<_> = generator.take(50).collect();
        assert_eq!(characters.len(), 50);
        for c in &characters {
            assert!(allowed.contains(&c.kind));
            assert!((1..=3).contains(&c.level));
        }
        let ids: HashSet<_> = characters.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn test_generate_team() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut used = HashSet::new();
        let allowed = CharacterType::enemy_types();
        let team = generate_team(&allowed, 4, 3, &mut rng, &mut used).unwrap();
        assert_eq!(team.len(), 3);
        assert_eq!(team.side, Side::Enemy);
        for c in team.iter() {
            assert!(allowed.contains(&c.kind));
            assert!((1..=4).contains(&c.level));
        }
    }

    #[test]
    fn test_generate_empty_team() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut used = HashSet::new();
        let team = generate_team(&CharacterType::enemy_types(), 4, 0, &mut rng, &mut used).unwrap();
        assert!(team.is_empty());
    }

    #[test]
    fn test_generate_team_invalid_input() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut used = HashSet::new();
        assert!(generate_team(&[], 4, 2, &mut rng, &mut used).is_err());
        assert!(matches!(
            generate_team(&CharacterType::player_types(), 0, 2, &mut rng, &mut used),
            Err(Error::InvalidLevel(0))
        ));
        assert!(matches!(
            generate_team(&CharacterType::player_types(), 21, 2, &mut rng, &mut used),
            Err(Error::InvalidLevel(21))
        ));
        let mixed = [CharacterType::Bowman, CharacterType::Daemon];
        assert!(generate_team(&mixed, 1, 2, &mut rng, &mut used).is_err());
    }

    #[test]
    fn test_single_type_team() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut used = HashSet::new();
        let team = generate_team(&[CharacterType::Vampire], 1, 4, &mut rng, &mut used).unwrap();
        assert!(team
            .iter()
            .all(|c| c.kind == CharacterType::Vampire && c.level == 1));
    }
}
