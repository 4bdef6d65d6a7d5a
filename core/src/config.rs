//! 遊戲設定（TOML）
//!
//! 所有欄位都有預設值，設定檔只需寫要覆蓋的部分：
//!
//! ```toml
//! board_size = 8
//! team_size = 2
//! max_level = 4
//! player_types = ["swordsman", "bowman"]
//! ```
use crate::character::{CharacterType, Side, MAX_CHARACTER_LEVEL};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_size: usize,
    /// 每關雙方的角色數
    pub team_size: usize,
    /// 最終關卡
    pub max_level: u32,
    /// 新遊戲時玩家角色的最高等級
    pub initial_character_level: u32,
    pub player_types: Vec<CharacterType>,
    /// 過關後補充玩家隊伍時可用的類型
    pub reinforcement_types: Vec<CharacterType>,
    pub enemy_types: Vec<CharacterType>,
    pub player_columns: Vec<usize>,
    pub enemy_columns: Vec<usize>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 8,
            team_size: 2,
            max_level: 4,
            initial_character_level: 1,
            player_types: vec![CharacterType::Swordsman, CharacterType::Bowman],
            reinforcement_types: CharacterType::player_types(),
            enemy_types: CharacterType::enemy_types(),
            player_columns: vec![0, 1],
            enemy_columns: vec![6, 7],
        }
    }
}

impl GameConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let func = "GameConfig::from_toml_str";

        let config: GameConfig = toml::from_str(text).map_err(|e| Error::InvalidParameter {
            func,
            detail: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// 檢查設定是否能開出一局遊戲
    pub fn validate(&self) -> Result<()> {
        let func = "GameConfig::validate";
        let invalid = |detail: String| Err(Error::InvalidParameter { func, detail });

        if self.board_size < 2 {
            return invalid(format!("棋盤邊長至少為 2，收到 {}", self.board_size));
        }
        if self.team_size == 0 {
            return invalid("隊伍至少要有一名角色".to_string());
        }
        if self.max_level == 0 || self.max_level > MAX_CHARACTER_LEVEL {
            return Err(Error::InvalidLevel(self.max_level));
        }
        // 存活者每過一關升一級
        let top_level = self.max_level.saturating_add(self.initial_character_level) - 1;
        if self.initial_character_level == 0 || top_level > MAX_CHARACTER_LEVEL {
            return Err(Error::InvalidLevel(self.initial_character_level));
        }
        for (types, side) in [
            (&self.player_types, Side::Player),
            (&self.reinforcement_types, Side::Player),
            (&self.enemy_types, Side::Enemy),
        ] {
            if types.is_empty() {
                return invalid(format!("{side} 的角色類型清單為空"));
            }
            if let Some(kind) = types.iter().find(|k| k.profile().side != side) {
                return invalid(format!("{kind} 不屬於 {side} 陣營"));
            }
        }
        for columns in [&self.player_columns, &self.enemy_columns] {
            if columns.is_empty() {
                return invalid("佈陣欄位為空".to_string());
            }
            if let Some(c) = columns.iter().find(|&&c| c >= self.board_size) {
                return invalid(format!("欄位 {c} 超出棋盤"));
            }
        }
        if self
            .player_columns
            .iter()
            .any(|c| self.enemy_columns.contains(c))
        {
            return invalid("雙方佈陣欄位重疊".to_string());
        }
        Ok(())
    }
}
