//! event.rs：
//! - 核心回傳給畫面層的事件。畫面層依序播放，播完才送出下一個輸入。
use crate::action::ActionKind;
use crate::board::{HealthLevel, Theme};
use crate::character::{CharacterId, CharacterType, Side};
use crate::{ActionPoints, CellIndex, Score};
use strum_macros::Display;

/// 格子高亮顏色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Highlight {
    /// 已選取的角色
    Yellow,
    /// 可移動的格子
    Green,
    /// 可攻擊的目標
    Red,
}

/// 游標提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Cursor {
    Default,
    Pointer,
    Crosshair,
    NotAllowed,
}

/// 一局的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
}

/// 重繪時單一格子上的角色
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub position: CellIndex,
    pub character: CharacterId,
    pub kind: CharacterType,
    pub side: Side,
    pub health: i32,
    pub health_level: HealthLevel,
    pub is_dead: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Redraw(Vec<CellView>),
    SelectCell {
        cell: CellIndex,
        color: Highlight,
        dashed: bool,
    },
    DeselectCell(CellIndex),
    DeselectAll,
    ShowTooltip {
        cell: CellIndex,
        text: String,
    },
    RemoveTooltip(CellIndex),
    SetCursor(Cursor),
    /// `end_turn` 為真時選單另外附上結束回合按鈕
    ShowActionMenu {
        cell: CellIndex,
        options: Vec<ActionKind>,
        end_turn: bool,
    },
    HideActionMenu,
    /// 逐格移動，`path` 包含起點
    CharacterMoved {
        character: CharacterId,
        path: Vec<CellIndex>,
    },
    Damage {
        cell: CellIndex,
        amount: i32,
        critical: bool,
    },
    CharacterDied {
        character: CharacterId,
        cell: CellIndex,
    },
    Resurrected {
        character: CharacterId,
        cell: CellIndex,
    },
    DefenceRaised {
        character: CharacterId,
        bonus: i32,
    },
    ActionPointsChanged {
        character: CharacterId,
        current: ActionPoints,
        max: ActionPoints,
    },
    Message(String),
    Error(String),
    TurnChanged(Side),
    StatsChanged {
        level: u32,
        score: Score,
        max_score: Score,
    },
    ThemeChanged(Theme),
    LevelCompleted {
        level: u32,
        bonus: Score,
    },
    GameOver {
        outcome: Outcome,
        score: Score,
    },
}
