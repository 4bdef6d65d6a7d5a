//! 事件與棋盤的文字輸出
use tactics_core::{Board, Character, GameEvent, GameState, Side};

pub fn print_events(events: &[GameEvent]) {
    for event in events {
        if let Some(line) = describe(event) {
            println!("{line}");
        }
    }
}

/// 只描述對文字介面有意義的事件，高亮與游標等略過
fn describe(event: &GameEvent) -> Option<String> {
    let line = match event {
        GameEvent::CharacterMoved { character, path } => {
            let (from, to) = (path.first()?, path.last()?);
            format!("{character} 移動 {from} → {to}")
        }
        GameEvent::Damage {
            cell,
            amount,
            critical,
        } => {
            let mark = if *critical { "（爆擊）" } else { "" };
            format!("格子 {cell} 受到 {amount} 點傷害{mark}")
        }
        GameEvent::CharacterDied { character, cell } => format!("{character} 在格子 {cell} 陣亡"),
        GameEvent::Resurrected { character, cell } => format!("{character} 在格子 {cell} 復活"),
        GameEvent::DefenceRaised { character, bonus } => format!("{character} 防禦 +{bonus}"),
        GameEvent::TurnChanged(side) => format!("輪到 {side}"),
        GameEvent::ThemeChanged(theme) => format!("地形：{theme}"),
        GameEvent::StatsChanged {
            level,
            score,
            max_score,
        } => format!("關卡 {level}，分數 {score}，最高分 {max_score}"),
        GameEvent::LevelCompleted { level, bonus } => format!("第 {level} 關完成，獎勵 {bonus}"),
        GameEvent::GameOver { outcome, score } => format!("遊戲結束：{outcome}（{score}）"),
        GameEvent::Message(message) => message.clone(),
        GameEvent::Error(message) => format!("錯誤：{message}"),
        _ => return None,
    };
    Some(line)
}

fn symbol(character: &Character) -> char {
    if character.is_dead {
        return 'x';
    }
    let c = character.kind.to_string().chars().next().unwrap_or('?');
    match character.side {
        Side::Player => c.to_ascii_uppercase(),
        Side::Enemy => c.to_ascii_lowercase(),
    }
}

/// 玩家大寫、敵方小寫、屍體為 x
pub fn board(state: &GameState, board: &Board) -> String {
    let mut grid = vec!['.'; board.cell_count()];
    for pc in state.all_positioned() {
        let Some(c) = state.character(pc.character) else {
            continue;
        };
        let Some(slot) = grid.get_mut(pc.position) else {
            continue;
        };
        // 活著的角色蓋過屍體
        if *slot == '.' || *slot == 'x' {
            *slot = symbol(c);
        }
    }
    grid.chunks(board.size)
        .map(|row| {
            row.iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
