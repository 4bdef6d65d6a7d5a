//! ai.rs：
//! - 簡單的貪婪決策：射程內有敵人就打血最少的，否則朝最近的敵人走。
//! - 只做決策不修改狀態，由 controller 執行並產生事件。
//! - 不限定陣營，玩家方的自動遊玩也用同一套。
use crate::action::ActionKind;
use crate::board::Board;
use crate::character::{CharacterId, Side};
use crate::combat::can_attack;
use crate::error::Result;
use crate::movement::{calculate_path, plan_move, MovePlan};
use crate::state::GameState;
use crate::CellIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiAction {
    Attack {
        target: CharacterId,
        kind: ActionKind,
    },
    Move(MovePlan),
}

/// 行動順序：射程遠的先動
pub fn unit_order(state: &GameState, side: Side) -> Vec<CharacterId> {
    let mut units: Vec<_> = state.team(side).living().collect();
    units.sort_by(|a, b| b.attack_distance.cmp(&a.attack_distance));
    units.into_iter().map(|c| c.id).collect()
}

/// 為單一角色決定下一個行動，沒有可做的事時回傳 None
pub fn plan_unit_action(
    state: &GameState,
    board: &Board,
    id: CharacterId,
) -> Result<Option<AiAction>> {
    let func = "plan_unit_action";

    let unit = state.require(func, id)?;
    if unit.is_dead || unit.current_action_points == 0 {
        return Ok(None);
    }
    let opponents: Vec<_> = state.team(unit.side.opposite()).living().collect();

    // 射程內血量最低者
    let target = opponents
        .iter()
        .filter(|t| can_attack(state, board, id, t.id).is_ok())
        .min_by_key(|t| t.health);
    if let Some(target) = target {
        let kind = if unit.current_action_points >= ActionKind::HardAttack.base_cost() {
            ActionKind::HardAttack
        } else {
            ActionKind::Attack
        };
        return Ok(Some(AiAction::Attack {
            target: target.id,
            kind,
        }));
    }

    let from = state.position_of(func, id)?;
    let mut nearest: Option<(usize, CellIndex)> = None;
    for opponent in &opponents {
        let cell = state.position_of(func, opponent.id)?;
        let distance = board.distance(from, cell);
        if nearest.map_or(true, |(best, _)| distance < best) {
            nearest = Some((distance, cell));
        }
    }
    let Some((_, goal)) = nearest else {
        return Ok(None);
    };

    // 沿路徑找最遠且付得起的格子
    let path = calculate_path(board, from, goal, unit.move_distance as usize, |cell| {
        state.is_occupied(cell)
    });
    let plan = path
        .iter()
        .skip(1)
        .rev()
        .find_map(|&cell| plan_move(state, board, id, cell).ok());
    Ok(plan.map(AiAction::Move))
}
