//! combat.rs：
//! - 負責戰鬥判定：攻擊範圍、行動點數檢查、傷害套用、死亡，以及防禦與復活。
//! - 所有檢查都在修改狀態前完成，被拒絕時狀態完全不變。
//! - 傷害擲骰本身在 action.rs。
use crate::action::{resolve_action, ActionKind};
use crate::board::Board;
use crate::character::CharacterId;
use crate::error::{Rejection, Result};
use crate::state::GameState;
use crate::{ActionPoints, CellIndex};
use rand::Rng;

/// 攻擊結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    pub attacker: CharacterId,
    pub target: CharacterId,
    pub target_cell: CellIndex,
    pub kind: ActionKind,
    /// 實際造成的傷害（已扣除目標的暫時防禦加成）
    pub damage: i32,
    pub is_critical: bool,
    pub cost: ActionPoints,
    pub target_died: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefenceReport {
    pub character: CharacterId,
    pub bonus: i32,
    pub cost: ActionPoints,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResurrectReport {
    pub caster: CharacterId,
    pub target: CharacterId,
    pub cell: CellIndex,
    pub health: i32,
}

/// 檢查攻擊者能否打到目標（距離與陣營），不擲骰也不修改狀態
pub fn can_attack(
    state: &GameState,
    board: &Board,
    attacker: CharacterId,
    target: CharacterId,
) -> Result<()> {
    let func = "can_attack";

    let a = state.require(func, attacker)?;
    let t = state.require(func, target)?;
    if a.is_dead {
        return Err(Rejection::NotEnoughPoints.into());
    }
    if t.is_dead || t.side == a.side {
        return Err(Rejection::NoSuchAction.into());
    }
    let from = state.position_of(func, attacker)?;
    let to = state.position_of(func, target)?;
    if board.distance(from, to) > a.attack_distance as usize {
        return Err(Rejection::TooFar.into());
    }
    Ok(())
}

/// 執行攻擊
///
/// 依序檢查：行動種類、距離（Chebyshev）、行動點數；全部通過後擲骰、套用傷害並扣點。
pub fn perform_attack<R: Rng>(
    state: &mut GameState,
    board: &Board,
    attacker: CharacterId,
    target: CharacterId,
    kind: ActionKind,
    rng: &mut R,
) -> Result<AttackReport> {
    let func = "perform_attack";

    if !kind.is_attack() {
        return Err(Rejection::NoSuchAction.into());
    }
    can_attack(state, board, attacker, target)?;
    let target_cell = state.position_of(func, target)?;

    let outcome = resolve_action(state.require(func, attacker)?, kind, rng)?;
    let target_character = state.require_mut(func, target)?;
    let damage = (outcome.damage - target_character.defence_bonus).max(1);
    target_character.take_damage(damage);
    let target_died = target_character.is_dead;

    state.require_mut(func, attacker)?.spend(outcome.cost)?;

    tracing::debug!(
        %attacker,
        %target,
        %kind,
        damage,
        critical = outcome.is_critical,
        target_died,
        "attack resolved"
    );
    Ok(AttackReport {
        attacker,
        target,
        target_cell,
        kind,
        damage,
        is_critical: outcome.is_critical,
        cost: outcome.cost,
        target_died,
    })
}

/// 防禦：用掉全部剩餘點數，換取到己方下回合開始前的防禦加成
pub fn perform_defence<R: Rng>(
    state: &mut GameState,
    id: CharacterId,
    rng: &mut R,
) -> Result<DefenceReport> {
    let func = "perform_defence";

    let character = state.require_mut(func, id)?;
    let outcome = resolve_action(character, ActionKind::Defence, rng)?;
    character.spend(outcome.cost)?;
    character.defence_bonus += outcome.defence_bonus;
    tracing::debug!(%id, bonus = outcome.defence_bonus, "defence raised");
    Ok(DefenceReport {
        character: id,
        bonus: outcome.defence_bonus,
        cost: outcome.cost,
    })
}

/// 復活：施法者在攻擊距離內復活時限內陣亡的隊友，該格不可有活著的角色
pub fn perform_resurrect<R: Rng>(
    state: &mut GameState,
    board: &Board,
    caster: CharacterId,
    target: CharacterId,
    rng: &mut R,
) -> Result<ResurrectReport> {
    let func = "perform_resurrect";

    let c = state.require(func, caster)?;
    let outcome = resolve_action(c, ActionKind::Resurrect, rng)?;
    let (caster_side, reach) = (c.side, c.attack_distance as usize);

    let t = state.require(func, target)?;
    if t.side != caster_side || !t.is_resurrectable() {
        return Err(Rejection::NotResurrectable.into());
    }
    let from = state.position_of(func, caster)?;
    let cell = state.position_of(func, target)?;
    if board.distance(from, cell) > reach {
        return Err(Rejection::TooFar.into());
    }
    if state.is_occupied(cell) {
        return Err(Rejection::CellOccupied.into());
    }

    state.require_mut(func, caster)?.spend(outcome.cost)?;
    let revived = state.require_mut(func, target)?;
    revived.revive(outcome.health_restored);
    let health = revived.health;
    tracing::debug!(%caster, %target, cell, "character resurrected");
    Ok(ResurrectReport {
        caster,
        target,
        cell,
        health,
    })
}
