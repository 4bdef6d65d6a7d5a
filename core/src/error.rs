//! 戰棋核心錯誤型別
//!
//! 分類：
//! - 參數錯誤（`InvalidLevel`、`InvalidParameter`）：建構時直接失敗
//! - 容量錯誤（`Capacity`）：佈陣格子不足，中止隊伍建立
//! - 行動被拒（`Rejected`）：顯示給玩家的短訊息，狀態不變
//! - 一致性錯誤（`CharacterNotOnBoard`、`UnknownCharacter`）：內部不變式被破壞，記錄後中止該行動
//! - 存檔錯誤（`Persistence`、`NoSavedState`、`Json`、`Io`）：顯示給玩家，讀檔失敗時改開新局
use crate::character::CharacterId;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("等級必須為正數，收到 {0}")]
    InvalidLevel(u32),

    #[error("`{func}`: 參數錯誤: {detail}")]
    InvalidParameter { func: &'static str, detail: String },

    #[error("棋盤空間不足：需要 {requested} 格，只有 {available} 格")]
    Capacity { requested: usize, available: usize },

    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("`{func}`: 角色 {id} 不在棋盤上")]
    CharacterNotOnBoard { func: &'static str, id: CharacterId },

    #[error("`{func}`: 找不到角色 {id}")]
    UnknownCharacter { func: &'static str, id: CharacterId },

    #[error("存檔資料錯誤: {0}")]
    Persistence(String),

    #[error("沒有存檔")]
    NoSavedState,

    #[error("存檔格式錯誤: {0}")]
    Json(#[from] serde_json::Error),

    #[error("存檔讀寫失敗: {0}")]
    Io(#[from] std::io::Error),
}

/// 行動被拒的原因，訊息會直接顯示給玩家
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("敵人太遠了！")]
    TooFar,
    #[error("行動點數不足")]
    NotEnoughPoints,
    #[error("路徑被阻擋")]
    PathBlocked,
    #[error("超出移動距離")]
    OutOfMoveRange,
    #[error("格子已被佔用")]
    CellOccupied,
    #[error("現在不是你的回合")]
    NotYourTurn,
    #[error("遊戲已結束")]
    GameOver,
    #[error("此角色無法執行這個行動")]
    NoSuchAction,
    #[error("這不是你的角色")]
    NotYourCharacter,
    #[error("無法復活這個角色")]
    NotResurrectable,
}

impl Error {
    /// 是否為一致性錯誤（內部不變式被破壞）
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            Error::CharacterNotOnBoard { .. } | Error::UnknownCharacter { .. }
        )
    }

    /// 取出行動被拒的原因
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Error::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}
