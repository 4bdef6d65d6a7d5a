//! 測試輔助：用 ASCII art 擺出棋盤局面
//!
//! 每行用空格分隔的符號，`.` 為空格子，其他為角色類型：
//! - 玩家：`S` 劍士、`B` 弓箭手、`M` 法師
//! - 敵方：`U` 不死者、`V` 吸血鬼、`D` 魔鬼
//!
//! 角色 id 依閱讀順序從 1 開始編號，等級皆為 1。
#![allow(dead_code)]

use tactics_core::{
    Board, Character, CharacterId, CharacterType, GameController, GameState, PositionedCharacter,
    Storage, Team,
};

pub fn kind_of(symbol: &str) -> Option<CharacterType> {
    match symbol {
        "S" => Some(CharacterType::Swordsman),
        "B" => Some(CharacterType::Bowman),
        "M" => Some(CharacterType::Magician),
        "U" => Some(CharacterType::Undead),
        "V" => Some(CharacterType::Vampire),
        "D" => Some(CharacterType::Daemon),
        _ => None,
    }
}

/// 從 ASCII 建立棋盤與遊戲狀態
pub fn state_from_ascii(ascii: &str) -> (Board, GameState) {
    let lines: Vec<&str> = ascii
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();
    let board = Board::new(lines.len());
    let mut state = GameState::default();
    let mut players = Vec::new();
    let mut enemies = Vec::new();
    let mut next_id = 1;

    for (y, line) in lines.iter().enumerate() {
        let symbols: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(symbols.len(), board.size, "第 {y} 行長度錯誤");
        for (x, symbol) in symbols.iter().enumerate() {
            if *symbol == "." {
                continue;
            }
            let kind = kind_of(symbol).unwrap_or_else(|| panic!("未知符號 {symbol}"));
            let id = CharacterId(next_id);
            next_id += 1;
            let character = Character::new(id, kind, 1).expect("Character::new 應成功");
            let placed = PositionedCharacter::new(id, y * board.size + x);
            if character.side == tactics_core::Side::Player {
                state.positioned_player_characters.push(placed);
                players.push(character);
            } else {
                state.positioned_enemy_characters.push(placed);
                enemies.push(character);
            }
        }
    }
    state.player_team = Team::from_characters(tactics_core::Side::Player, players)
        .expect("玩家隊伍應建立成功");
    state.enemy_team =
        Team::from_characters(tactics_core::Side::Enemy, enemies).expect("敵方隊伍應建立成功");
    (board, state)
}

/// 把 ASCII 局面放進 controller；棋盤邊長必須與設定一致
pub fn load_scenario<S: Storage>(controller: &mut GameController<S>, ascii: &str) {
    let (board, state) = state_from_ascii(ascii);
    assert_eq!(board.size, controller.board().size, "局面大小應與設定一致");
    state.validate(&board).expect("局面應通過驗證");
    *controller.state_mut() = state;
}
