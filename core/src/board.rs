//! board.rs：
//! - 棋盤幾何：格索引與座標互轉、Chebyshev 距離、邊界判斷。
//! - 不持有任何角色，佔用狀態由 position.rs 的 PositionedCharacter 推導。
//! - 另含顯示用的純函式（格子類型、血量等級、關卡主題）。
use crate::CellIndex;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 預設棋盤邊長
pub const DEFAULT_BOARD_SIZE: usize = 8;

#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Pos {
    /// 欄
    pub x: usize,
    /// 列
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Chebyshev 距離：max(|Δ列|, |Δ欄|)
    pub fn distance_to(&self, other: Pos) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// 正方形棋盤（size × size）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub size: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
        }
    }
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// 格子總數
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        index < self.cell_count()
    }

    pub fn to_pos(&self, index: CellIndex) -> Pos {
        Pos {
            x: index % self.size,
            y: index / self.size,
        }
    }

    /// 座標超出棋盤時回傳 None
    pub fn to_index(&self, pos: Pos) -> Option<CellIndex> {
        if pos.x >= self.size || pos.y >= self.size {
            return None;
        }
        Some(pos.y * self.size + pos.x)
    }

    /// 兩格之間的 Chebyshev 距離
    pub fn distance(&self, from: CellIndex, to: CellIndex) -> usize {
        self.to_pos(from).distance_to(self.to_pos(to))
    }

    /// 指定欄位上的所有格子
    pub fn column_cells(&self, column: usize) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.size).map(move |row| row * self.size + column)
    }

    /// 格子在棋盤上的外觀類型
    pub fn tile_type(&self, index: CellIndex) -> TileType {
        let top_right = self.size - 1;
        let bottom_right = self.cell_count() - 1;
        let bottom_left = bottom_right - (self.size - 1);

        if index == 0 {
            return TileType::TopLeft;
        }
        if index == top_right {
            return TileType::TopRight;
        }
        if index == bottom_left {
            return TileType::BottomLeft;
        }
        if index == bottom_right {
            return TileType::BottomRight;
        }
        if index < top_right {
            return TileType::Top;
        }
        if index > bottom_left {
            return TileType::Bottom;
        }
        match index % self.size {
            0 => TileType::Left,
            col if col == self.size - 1 => TileType::Right,
            _ => TileType::Center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TileType {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HealthLevel {
    Critical,
    Normal,
    High,
}

/// 血量顯示等級
pub fn health_level(health: i32) -> HealthLevel {
    if health < 15 {
        HealthLevel::Critical
    } else if health < 50 {
        HealthLevel::Normal
    } else {
        HealthLevel::High
    }
}

/// 關卡主題，每升一關換一次
#[derive(
    Debug, Deserialize, Serialize, Clone, Copy, Default, Display, EnumIter, PartialEq, Eq,
)]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Prairie,
    Desert,
    Arctic,
    Mountain,
}

impl Theme {
    /// 依關卡（從 1 開始）取得主題，超過四關後循環
    pub fn for_level(level: u32) -> Self {
        match level.saturating_sub(1) % 4 {
            0 => Theme::Prairie,
            1 => Theme::Desert,
            2 => Theme::Arctic,
            _ => Theme::Mountain,
        }
    }
}
