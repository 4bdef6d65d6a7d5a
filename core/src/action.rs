//! action.rs：
//! - 角色行動表：依角色類型與行動種類決定傷害擲骰、成本與爆擊。
//! - 只計算結果（ActionOutcome），不修改任何角色或棋盤狀態。
use crate::character::{Character, DamageRange};
use crate::error::Rejection;
use crate::ActionPoints;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 一般攻擊爆擊率
pub const BASIC_CRITICAL_CHANCE: f64 = 0.15;
/// 重擊爆擊率
pub const HARD_CRITICAL_CHANCE: f64 = 0.10;
/// 防禦行動每點行動點數給的防禦加成
pub const DEFENCE_PER_POINT: i32 = 5;
/// 復活回復的血量
pub const RESURRECT_HEALTH: i32 = 50;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ActionKind {
    Attack,
    HardAttack,
    Defence,
    Resurrect,
}

impl ActionKind {
    /// 固定成本；防禦行動會用掉全部剩餘點數，這裡回傳最低需求
    pub fn base_cost(&self) -> ActionPoints {
        match self {
            Self::Attack => 1,
            Self::HardAttack => 2,
            Self::Defence => 1,
            Self::Resurrect => 2,
        }
    }

    pub fn is_attack(&self) -> bool {
        matches!(self, Self::Attack | Self::HardAttack)
    }

    /// 選單上顯示的名稱
    pub fn label(&self) -> &'static str {
        match self {
            Self::Attack => "攻擊",
            Self::HardAttack => "重擊",
            Self::Defence => "防禦",
            Self::Resurrect => "復活",
        }
    }
}

/// 行動結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    pub damage: i32,
    pub cost: ActionPoints,
    pub is_critical: bool,
    pub defence_bonus: i32,
    pub health_restored: i32,
}

/// 依角色類型與行動種類擲出行動結果
///
/// 不檢查距離，也不扣點數；點數不足或此類型沒有該行動時回傳拒絕原因。
pub fn resolve_action<R: Rng>(
    character: &Character,
    kind: ActionKind,
    rng: &mut R,
) -> Result<ActionOutcome, Rejection> {
    if character.is_dead {
        return Err(Rejection::NotEnoughPoints);
    }
    let profile = character.profile();
    let points = character.current_action_points;

    match kind {
        ActionKind::Attack | ActionKind::HardAttack => {
            let cost = kind.base_cost();
            if points < cost {
                return Err(Rejection::NotEnoughPoints);
            }
            let (range, chance, multiplier) = if kind == ActionKind::Attack {
                (
                    profile.basic_damage,
                    BASIC_CRITICAL_CHANCE,
                    Multiplier::OneAndHalf,
                )
            } else {
                (
                    profile.hard_damage,
                    HARD_CRITICAL_CHANCE,
                    Multiplier::Double,
                )
            };
            let base = roll_damage(rng, range, character.attack, profile.attack);
            let is_critical = rng.random_bool(chance);
            let damage = if is_critical {
                multiplier.apply(base)
            } else {
                base
            };
            Ok(ActionOutcome {
                damage,
                cost,
                is_critical,
                ..Default::default()
            })
        }
        ActionKind::Defence => {
            if points < kind.base_cost() {
                return Err(Rejection::NotEnoughPoints);
            }
            Ok(ActionOutcome {
                cost: points,
                defence_bonus: points as i32 * DEFENCE_PER_POINT,
                ..Default::default()
            })
        }
        ActionKind::Resurrect => {
            if !profile.can_resurrect {
                return Err(Rejection::NoSuchAction);
            }
            let cost = kind.base_cost();
            if points < cost {
                return Err(Rejection::NotEnoughPoints);
            }
            Ok(ActionOutcome {
                cost,
                health_restored: RESURRECT_HEALTH,
                ..Default::default()
            })
        }
    }
}

/// 角色目前點數足以執行的攻擊種類
pub fn available_attacks(character: &Character) -> Vec<ActionKind> {
    [ActionKind::Attack, ActionKind::HardAttack]
        .into_iter()
        .filter(|kind| character.current_action_points >= kind.base_cost())
        .collect()
}

#[derive(Debug, Clone, Copy)]
enum Multiplier {
    OneAndHalf,
    Double,
}

impl Multiplier {
    fn apply(self, damage: i32) -> i32 {
        let damage = i64::from(damage);
        let scaled = match self {
            Multiplier::OneAndHalf => damage * 3 / 2,
            Multiplier::Double => damage * 2,
        };
        i32::try_from(scaled).unwrap_or(i32::MAX)
    }
}

// 擲骰後依升級後攻擊力與基礎攻擊力的比例放大，等級 1 時不變
fn roll_damage<R: Rng>(rng: &mut R, range: DamageRange, attack: i32, base_attack: i32) -> i32 {
    let roll = rng.random_range(range.min..=range.max);
    if base_attack <= 0 {
        return roll;
    }
    let scaled = i64::from(roll) * i64::from(attack) / i64::from(base_attack);
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterId, CharacterType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make(kind: CharacterType) -> Character {
        Character::new(CharacterId(1), kind, 1).unwrap()
    }

    #[test]
    fn test_attack_damage_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let test_data = [
            (CharacterType::Bowman, 15, 30, 20, 50),
            (CharacterType::Swordsman, 30, 60, 40, 100),
            (CharacterType::Magician, 10, 30, 15, 50),
            (CharacterType::Daemon, 20, 45, 25, 70),
            (CharacterType::Undead, 30, 60, 40, 100),
            (CharacterType::Vampire, 10, 24, 15, 50),
        ];
        for (kind, basic_min, basic_max, hard_min, hard_max) in test_data {
            let c = make(kind);
            for _ in 0..200 {
                let basic = resolve_action(&c, ActionKind::Attack, &mut rng).unwrap();
                assert!(
                    basic.damage >= basic_min && basic.damage <= basic_max,
                    "{kind}"
                );
                assert_eq!(basic.cost, 1);

                let hard = resolve_action(&c, ActionKind::HardAttack, &mut rng).unwrap();
                assert!(hard.damage >= hard_min && hard.damage <= hard_max, "{kind}");
                assert_eq!(hard.cost, 2);
            }
        }
    }

    #[test]
    fn test_critical_hits_happen() {
        let mut rng = StdRng::seed_from_u64(1);
        let c = make(CharacterType::Bowman);
        let crits = (0..1000)
            .filter(|_| {
                resolve_action(&c, ActionKind::Attack, &mut rng)
                    .unwrap()
                    .is_critical
            })
            .count();
        assert!(crits > 50 && crits < 300, "crits = {crits}");
    }

    #[test]
    fn test_hard_attack_needs_two_points() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut c = make(CharacterType::Swordsman);
        c.current_action_points = 1;
        assert_eq!(
            resolve_action(&c, ActionKind::HardAttack, &mut rng),
            Err(Rejection::NotEnoughPoints)
        );
        assert_eq!(available_attacks(&c), vec![ActionKind::Attack]);
    }

    #[test]
    fn test_defence_uses_all_points() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut c = make(CharacterType::Swordsman);
        c.current_action_points = 3;
        let outcome = resolve_action(&c, ActionKind::Defence, &mut rng).unwrap();
        assert_eq!(outcome.cost, 3);
        assert_eq!(outcome.defence_bonus, 15);

        c.current_action_points = 0;
        assert_eq!(
            resolve_action(&c, ActionKind::Defence, &mut rng),
            Err(Rejection::NotEnoughPoints)
        );
    }

    #[test]
    fn test_resurrect_only_for_casters() {
        let mut rng = StdRng::seed_from_u64(3);
        let magician = make(CharacterType::Magician);
        let outcome = resolve_action(&magician, ActionKind::Resurrect, &mut rng).unwrap();
        assert_eq!(outcome.health_restored, 50);
        assert_eq!(outcome.cost, 2);

        let bowman = make(CharacterType::Bowman);
        assert_eq!(
            resolve_action(&bowman, ActionKind::Resurrect, &mut rng),
            Err(Rejection::NoSuchAction)
        );
    }

    #[test]
    fn test_leveled_character_hits_harder() {
        let mut rng = StdRng::seed_from_u64(11);
        let c = Character::new(CharacterId(1), CharacterType::Swordsman, 2).unwrap();
        for _ in 0..100 {
            let outcome = resolve_action(&c, ActionKind::Attack, &mut rng).unwrap();
            // 30..=40 乘 52/40
            assert!(outcome.damage >= 39, "damage = {}", outcome.damage);
        }
    }

    #[test]
    fn test_huge_attack_saturates() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut c = make(CharacterType::Swordsman);
        c.attack = i32::MAX;
        for _ in 0..50 {
            for kind in [ActionKind::Attack, ActionKind::HardAttack] {
                let outcome = resolve_action(&c, kind, &mut rng).unwrap();
                assert_eq!(outcome.damage, i32::MAX, "{kind}");
            }
        }
    }
}
