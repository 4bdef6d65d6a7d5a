//! position.rs：
//! - 角色與棋盤格的對應（PositionedCharacter）與查詢。
//! - 佈陣：在允許的欄位中隨機分配不重複的空格。
//! - 只持有角色 id，角色本體由 Team 擁有。
use crate::board::Board;
use crate::character::CharacterId;
use crate::error::{Error, Result};
use crate::CellIndex;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedCharacter {
    pub character: CharacterId,
    pub position: CellIndex,
}

impl PositionedCharacter {
    pub fn new(character: CharacterId, position: CellIndex) -> Self {
        Self {
            character,
            position,
        }
    }
}

/// 查詢格子上的角色（第一筆符合者）
pub fn find_character_by_position(
    positioned: &[PositionedCharacter],
    index: CellIndex,
) -> Option<CharacterId> {
    positioned
        .iter()
        .find(|pc| pc.position == index)
        .map(|pc| pc.character)
}

/// 查詢角色所在的格子
pub fn find_position_by_character(
    positioned: &[PositionedCharacter],
    id: CharacterId,
) -> Option<CellIndex> {
    positioned
        .iter()
        .find(|pc| pc.character == id)
        .map(|pc| pc.position)
}

/// 以新的紀錄取代角色原本的位置
pub fn update_position(
    positioned: &mut Vec<PositionedCharacter>,
    id: CharacterId,
    index: CellIndex,
) {
    positioned.retain(|pc| pc.character != id);
    positioned.push(PositionedCharacter::new(id, index));
}

/// 在允許的欄位內為每名角色隨機分配一個未被佔用的格子
///
/// 角色數超過 `board.size * allowed_columns.len()`，或扣掉已佔用格後不足時，回傳容量錯誤。
pub fn position_characters<R: Rng>(
    board: &Board,
    characters: &[CharacterId],
    allowed_columns: &[usize],
    occupied: &HashSet<CellIndex>,
    rng: &mut R,
) -> Result<Vec<PositionedCharacter>> {
    let func = "position_characters";

    if let Some(column) = allowed_columns.iter().find(|&&c| c >= board.size) {
        return Err(Error::InvalidParameter {
            func,
            detail: format!("欄位 {} 超出棋盤邊長 {}", column, board.size),
        });
    }
    let columns: Vec<usize> = {
        let mut seen = HashSet::new();
        allowed_columns
            .iter()
            .copied()
            .filter(|c| seen.insert(*c))
            .collect()
    };

    let capacity = board.size * columns.len();
    if characters.len() > capacity {
        return Err(Error::Capacity {
            requested: characters.len(),
            available: capacity,
        });
    }

    let mut free: Vec<CellIndex> = columns
        .iter()
        .flat_map(|&column| board.column_cells(column))
        .filter(|cell| !occupied.contains(cell))
        .collect();
    if characters.len() > free.len() {
        return Err(Error::Capacity {
            requested: characters.len(),
            available: free.len(),
        });
    }

    free.shuffle(rng);
    Ok(characters
        .iter()
        .zip(free)
        .map(|(&id, cell)| PositionedCharacter::new(id, cell))
        .collect())
}
