//! 戰棋核心遊戲邏輯函式庫
//!
//! 此函式庫實作回合制戰棋的核心規則，包括：
//! - 角色屬性、行動點數與死亡/復活
//! - 隊伍產生與棋盤佈陣
//! - 移動路徑與移動成本
//! - 攻擊範圍、傷害擲骰與爆擊
//! - 回合切換、關卡推進與計分
//! - 敵方 AI 決策
//!
//! 畫面呈現不在此函式庫內，所有對外輸出都以 [`GameEvent`] 序列回傳。

pub mod action;
pub mod ai;
pub mod board;
pub mod character;
pub mod combat;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod generator;
pub mod movement;
pub mod position;
pub mod progression;
pub mod service;
pub mod state;
pub mod team;

// 重新導出常用類型
pub use action::{resolve_action, ActionKind, ActionOutcome};
pub use board::{health_level, Board, HealthLevel, Pos, Theme, TileType};
pub use character::{Character, CharacterId, CharacterType, Side};
pub use config::GameConfig;
pub use controller::{GameController, Phase, Selection};
pub use error::{Error, Rejection, Result};
pub use event::{Cursor, GameEvent, Highlight, Outcome};
pub use generator::{generate_team, CharacterGenerator};
pub use position::{find_character_by_position, find_position_by_character, PositionedCharacter};
pub use service::{FileStorage, GameStateService, MemoryStorage, Storage};
pub use state::GameState;
pub use team::Team;

/// 棋盤格索引（row * size + col）
pub type CellIndex = usize;
/// 行動點數
pub type ActionPoints = u32;
/// 分數
pub type Score = u32;
