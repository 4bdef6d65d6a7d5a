//! team.rs：隊伍，一個陣營擁有的有序、不重複角色集合
use crate::character::{Character, CharacterId, Side};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub side: Side,
    characters: Vec<Character>,
}

impl Team {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            characters: Vec::new(),
        }
    }

    pub fn from_characters(side: Side, characters: Vec<Character>) -> Result<Self> {
        let mut team = Self::new(side);
        for character in characters {
            team.add(character)?;
        }
        Ok(team)
    }

    /// 加入角色；重複 id 或陣營不符時失敗
    pub fn add(&mut self, character: Character) -> Result<()> {
        let func = "Team::add";

        if character.side != self.side {
            return Err(Error::InvalidParameter {
                func,
                detail: format!("{} 不屬於 {} 陣營", character.id, self.side),
            });
        }
        if self.contains(character.id) {
            return Err(Error::InvalidParameter {
                func,
                detail: format!("{} 已在隊伍中", character.id),
            });
        }
        self.characters.push(character);
        Ok(())
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.characters.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id == id)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Character> {
        self.characters.iter_mut()
    }

    pub fn living(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter().filter(|c| c.is_alive())
    }

    /// 移除所有陣亡角色，回傳被移除的 id
    pub fn remove_dead(&mut self) -> Vec<CharacterId> {
        let dead = self
            .characters
            .iter()
            .filter(|c| c.is_dead)
            .map(|c| c.id)
            .collect();
        self.characters.retain(|c| c.is_alive());
        dead
    }

    /// 全員陣亡（空隊伍也算）
    pub fn is_defeated(&self) -> bool {
        self.living().next().is_none()
    }

    /// 還有角色剩下行動點數
    pub fn can_act(&self) -> bool {
        self.living().any(|c| c.current_action_points > 0)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterType;

    fn make(id: u32, kind: CharacterType) -> Character {
        Character::new(CharacterId(id), kind, 1).unwrap()
    }

    #[test]
    fn test_team_rejects_duplicates_and_foreign_side() {
        let mut team = Team::new(Side::Player);
        team.add(make(1, CharacterType::Bowman)).unwrap();
        assert!(team.add(make(1, CharacterType::Swordsman)).is_err());
        assert!(team.add(make(2, CharacterType::Daemon)).is_err());
        assert_eq!(team.len(), 1);
    }

    #[test]
    fn test_team_defeated() {
        let mut team = Team::from_characters(
            Side::Enemy,
            vec![
                make(1, CharacterType::Daemon),
                make(2, CharacterType::Undead),
            ],
        )
        .unwrap();
        assert!(!team.is_defeated());
        for c in team.iter_mut() {
            c.die();
        }
        assert!(team.is_defeated());
        assert!(!team.can_act());
        assert_eq!(team.remove_dead(), vec![CharacterId(1), CharacterId(2)]);
        assert!(team.is_empty());
        assert!(Team::new(Side::Enemy).is_defeated());
    }
}
