//! movement.rs：
//! - 負責角色移動：直線逐步路徑、移動成本、移動驗證與套用。
//! - 路徑遇到任何活著的角色（敵我皆同）即停止，不會繞路。
//! - 移動是原子的：驗證通過後一次扣點並設定終點，路徑只供畫面逐格播放。
use crate::board::{Board, Pos};
use crate::character::{Character, CharacterId};
use crate::error::{Rejection, Result};
use crate::state::GameState;
use crate::{ActionPoints, CellIndex};

/// 已驗證可執行的移動
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub character: CharacterId,
    pub from: CellIndex,
    pub to: CellIndex,
    /// 包含起點與終點
    pub path: Vec<CellIndex>,
    pub cost: ActionPoints,
}

/// 從 `from` 朝 `to` 逐步前進（每步列、欄各最多移動一格），最多 `max_distance` 步
///
/// 下一格被佔用或抵達終點時停止。回傳的路徑包含起點；若被阻擋，路徑不會包含 `to`，
/// 呼叫端必須自行檢查。
pub fn calculate_path<F>(
    board: &Board,
    from: CellIndex,
    to: CellIndex,
    max_distance: usize,
    is_occupied: F,
) -> Vec<CellIndex>
where
    F: Fn(CellIndex) -> bool,
{
    let mut path = vec![from];
    if !board.contains(from) || !board.contains(to) {
        return path;
    }
    let target = board.to_pos(to);
    let mut current = board.to_pos(from);

    for _ in 0..max_distance {
        if current == target {
            break;
        }
        let next = Pos {
            x: step_toward(current.x, target.x),
            y: step_toward(current.y, target.y),
        };
        let Some(index) = board.to_index(next) else {
            break;
        };
        if is_occupied(index) {
            break;
        }
        path.push(index);
        current = next;
    }
    path
}

/// 依直線位移計算移動成本：斜向步數 = min(|Δ列|, |Δ欄|)，其餘為直向步數
pub fn calculate_move_cost(
    board: &Board,
    from: CellIndex,
    to: CellIndex,
    character: &Character,
) -> ActionPoints {
    let a = board.to_pos(from);
    let b = board.to_pos(to);
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    let diagonal = dx.min(dy) as ActionPoints;
    let straight = (dx.max(dy) as ActionPoints) - diagonal;
    let cost = character.profile().move_cost;
    diagonal * cost.diagonal + straight * cost.straight
}

/// 驗證角色移動到 `to` 的合法性並產生移動計畫，不修改狀態
pub fn plan_move(
    state: &GameState,
    board: &Board,
    id: CharacterId,
    to: CellIndex,
) -> Result<MovePlan> {
    let func = "plan_move";

    let character = state.require(func, id)?;
    if character.is_dead {
        return Err(Rejection::NotEnoughPoints.into());
    }
    let from = state.position_of(func, id)?;
    if !board.contains(to) {
        return Err(Rejection::OutOfMoveRange.into());
    }
    if from == to || state.is_occupied(to) {
        return Err(Rejection::CellOccupied.into());
    }
    if board.distance(from, to) > character.move_distance as usize {
        return Err(Rejection::OutOfMoveRange.into());
    }

    let path = calculate_path(board, from, to, character.move_distance as usize, |cell| {
        state.is_occupied(cell)
    });
    if !path.contains(&to) {
        return Err(Rejection::PathBlocked.into());
    }

    let cost = calculate_move_cost(board, from, to, character);
    if cost > character.current_action_points {
        return Err(Rejection::NotEnoughPoints.into());
    }

    Ok(MovePlan {
        character: id,
        from,
        to,
        path,
        cost,
    })
}

/// 套用移動計畫：扣除成本並設定終點位置
pub fn apply_move(state: &mut GameState, plan: &MovePlan) -> Result<()> {
    let func = "apply_move";

    state.require_mut(func, plan.character)?.spend(plan.cost)?;
    state.set_position(func, plan.character, plan.to)?;
    tracing::debug!(
        id = %plan.character,
        from = plan.from,
        to = plan.to,
        cost = plan.cost,
        "character moved"
    );
    Ok(())
}

/// 角色目前可以移動到的所有格子
pub fn reachable_cells(state: &GameState, board: &Board, id: CharacterId) -> Vec<CellIndex> {
    (0..board.cell_count())
        .filter(|&cell| plan_move(state, board, id, cell).is_ok())
        .collect()
}

fn step_toward(current: usize, target: usize) -> usize {
    match current.cmp(&target) {
        std::cmp::Ordering::Less => current + 1,
        std::cmp::Ordering::Greater => current - 1,
        std::cmp::Ordering::Equal => current,
    }
}
