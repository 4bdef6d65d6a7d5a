//! state.rs：
//! - 遊戲狀態（GameState）：目前回合、分數、關卡、雙方隊伍與站位。
//! - 以 id 查詢角色與位置，並在讀檔後驗證所有不變式。
//! - 序列化格式即存檔格式（camelCase JSON）。
use crate::board::{Board, Theme};
use crate::character::{Character, CharacterId, Side};
use crate::error::{Error, Result};
use crate::position::{find_position_by_character, update_position, PositionedCharacter};
use crate::team::Team;
use crate::{CellIndex, Score};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_turn: Side,
    /// 本局目前分數
    #[serde(default)]
    pub score: Score,
    pub max_score: Score,
    pub current_level: u32,
    pub player_team: Team,
    pub enemy_team: Team,
    pub positioned_player_characters: Vec<PositionedCharacter>,
    pub positioned_enemy_characters: Vec<PositionedCharacter>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_turn: Side::Player,
            score: 0,
            max_score: 0,
            current_level: 1,
            player_team: Team::new(Side::Player),
            enemy_team: Team::new(Side::Enemy),
            positioned_player_characters: Vec::new(),
            positioned_enemy_characters: Vec::new(),
        }
    }
}

impl GameState {
    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Player => &self.player_team,
            Side::Enemy => &self.enemy_team,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Player => &mut self.player_team,
            Side::Enemy => &mut self.enemy_team,
        }
    }

    pub fn positioned(&self, side: Side) -> &[PositionedCharacter] {
        match side {
            Side::Player => &self.positioned_player_characters,
            Side::Enemy => &self.positioned_enemy_characters,
        }
    }

    pub fn positioned_mut(&mut self, side: Side) -> &mut Vec<PositionedCharacter> {
        match side {
            Side::Player => &mut self.positioned_player_characters,
            Side::Enemy => &mut self.positioned_enemy_characters,
        }
    }

    /// 雙方所有站位
    pub fn all_positioned(&self) -> impl Iterator<Item = &PositionedCharacter> {
        self.positioned_player_characters
            .iter()
            .chain(self.positioned_enemy_characters.iter())
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.player_team.get(id).or_else(|| self.enemy_team.get(id))
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        if self.player_team.contains(id) {
            return self.player_team.get_mut(id);
        }
        self.enemy_team.get_mut(id)
    }

    /// 取得角色，不存在時回傳一致性錯誤
    pub fn require(&self, func: &'static str, id: CharacterId) -> Result<&Character> {
        self.character(id)
            .ok_or(Error::UnknownCharacter { func, id })
    }

    pub fn require_mut(&mut self, func: &'static str, id: CharacterId) -> Result<&mut Character> {
        self.character_mut(id)
            .ok_or(Error::UnknownCharacter { func, id })
    }

    /// 角色所在格子；活著卻不在棋盤上屬於一致性錯誤
    pub fn position_of(&self, func: &'static str, id: CharacterId) -> Result<CellIndex> {
        let character = self.require(func, id)?;
        match find_position_by_character(self.positioned(character.side), id) {
            Some(index) => Ok(index),
            None => {
                if character.is_alive() {
                    tracing::error!(
                        %id,
                        kind = %character.kind,
                        func,
                        "living character is not positioned"
                    );
                }
                Err(Error::CharacterNotOnBoard { func, id })
            }
        }
    }

    /// 格子上的角色；同格有活著的角色時優先回傳，否則回傳屍體
    pub fn character_at(&self, index: CellIndex) -> Option<&Character> {
        let mut corpse = None;
        for pc in self.all_positioned().filter(|pc| pc.position == index) {
            match self.character(pc.character) {
                Some(c) if c.is_alive() => return Some(c),
                Some(c) => corpse = corpse.or(Some(c)),
                None => {}
            }
        }
        corpse
    }

    pub fn living_character_at(&self, index: CellIndex) -> Option<&Character> {
        self.character_at(index).filter(|c| c.is_alive())
    }

    /// 是否有活著的角色佔用；屍體不佔格
    pub fn is_occupied(&self, index: CellIndex) -> bool {
        self.living_character_at(index).is_some()
    }

    pub fn occupied_cells(&self) -> HashSet<CellIndex> {
        self.all_positioned()
            .filter(|pc| self.character(pc.character).is_some_and(|c| c.is_alive()))
            .map(|pc| pc.position)
            .collect()
    }

    /// 設定角色的新位置
    pub fn set_position(
        &mut self,
        func: &'static str,
        id: CharacterId,
        index: CellIndex,
    ) -> Result<()> {
        let side = self.require(func, id)?.side;
        update_position(self.positioned_mut(side), id, index);
        Ok(())
    }

    /// 移除陣亡角色與其站位
    pub fn remove_dead(&mut self, side: Side) {
        let dead = self.team_mut(side).remove_dead();
        self.positioned_mut(side)
            .retain(|pc| !dead.contains(&pc.character));
    }

    /// 目前所有角色 id，供產生新角色時避開
    pub fn used_ids(&self) -> HashSet<CharacterId> {
        self.player_team
            .iter()
            .chain(self.enemy_team.iter())
            .map(|c| c.id)
            .collect()
    }

    pub fn theme(&self) -> Theme {
        Theme::for_level(self.current_level)
    }

    /// 驗證讀入的狀態：站位與隊伍一一對應、座標在棋盤內、同格最多一名活著的角色
    pub fn validate(&self, board: &Board) -> Result<()> {
        if self.current_level == 0 {
            return Err(Error::Persistence("關卡必須從 1 開始".to_string()));
        }
        let mut ids = HashSet::new();
        for c in self.player_team.iter().chain(self.enemy_team.iter()) {
            if !ids.insert(c.id) {
                return Err(Error::Persistence(format!("角色 {} 重複", c.id)));
            }
        }
        if self.player_team.side != Side::Player || self.enemy_team.side != Side::Enemy {
            return Err(Error::Persistence("隊伍陣營錯誤".to_string()));
        }

        let mut living_cells = HashSet::new();
        for side in [Side::Player, Side::Enemy] {
            let team = self.team(side);
            let positioned = self.positioned(side);
            if let Some(stray) = team.iter().find(|c| c.side != side) {
                return Err(Error::Persistence(format!("角色 {} 不屬於 {} 隊伍", stray.id, side)));
            }
            let mut seen = HashSet::new();
            for pc in positioned {
                let Some(character) = team.get(pc.character) else {
                    return Err(Error::Persistence(format!(
                        "站位 {} 不屬於 {} 隊伍",
                        pc.character, side
                    )));
                };
                if !seen.insert(pc.character) {
                    return Err(Error::Persistence(format!("角色 {} 有多個站位", pc.character)));
                }
                if !board.contains(pc.position) {
                    return Err(Error::Persistence(format!(
                        "角色 {} 的位置 {} 超出棋盤",
                        pc.character, pc.position
                    )));
                }
                if character.is_alive() && !living_cells.insert(pc.position) {
                    return Err(Error::Persistence(format!("格子 {} 有兩名角色", pc.position)));
                }
            }
            if let Some(missing) = team.iter().find(|c| !seen.contains(&c.id)) {
                return Err(Error::Persistence(format!("角色 {} 沒有站位", missing.id)));
            }
        }
        Ok(())
    }
}
