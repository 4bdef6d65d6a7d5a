//! character.rs：
//! - 定義角色（Character）、角色類型（CharacterType）與各類型的靜態屬性表（TypeProfile）。
//! - 負責角色自身的狀態變化：受傷、死亡、行動點數、升級、防禦加成、復活。
//! - 不負責距離/範圍判定與傷害擲骰（見 combat.rs、action.rs）。
use crate::action::DEFENCE_PER_POINT;
use crate::error::{Error, Rejection, Result};
use crate::ActionPoints;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// 新角色的初始血量
pub const BASE_HEALTH: i32 = 50;
/// 血量上限
pub const MAX_HEALTH: i32 = 100;
/// 每回合行動點數
pub const BASE_ACTION_POINTS: ActionPoints = 4;
/// 死亡後可被復活的回合切換次數
pub const RESURRECT_WINDOW: u32 = 2;
/// 升級時回復的血量
pub const LEVEL_UP_HEAL: i32 = 80;
/// 角色等級上限
pub const MAX_CHARACTER_LEVEL: u32 = 20;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 陣營
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CharacterType {
    Swordsman,
    Bowman,
    Magician,
    Daemon,
    Undead,
    Vampire,
}

/// 傷害擲骰範圍（含上下界）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRange {
    pub min: i32,
    pub max: i32,
}

/// 移動成本表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCost {
    pub straight: ActionPoints,
    pub diagonal: ActionPoints,
}

/// 各角色類型的靜態屬性與行為表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeProfile {
    pub side: Side,
    pub attack: i32,
    pub defence: i32,
    pub move_distance: u32,
    pub attack_distance: u32,
    pub basic_damage: DamageRange,
    pub hard_damage: DamageRange,
    pub move_cost: MoveCost,
    pub can_resurrect: bool,
}

const WALKER: MoveCost = MoveCost {
    straight: 1,
    diagonal: 2,
};
const CASTER: MoveCost = MoveCost {
    straight: 2,
    diagonal: 3,
};

const SWORDSMAN: TypeProfile = TypeProfile {
    side: Side::Player,
    attack: 40,
    defence: 10,
    move_distance: 4,
    attack_distance: 1,
    basic_damage: DamageRange { min: 30, max: 40 },
    hard_damage: DamageRange { min: 40, max: 50 },
    move_cost: WALKER,
    can_resurrect: false,
};

const BOWMAN: TypeProfile = TypeProfile {
    side: Side::Player,
    attack: 25,
    defence: 25,
    move_distance: 4,
    attack_distance: 3,
    basic_damage: DamageRange { min: 15, max: 20 },
    hard_damage: DamageRange { min: 20, max: 25 },
    move_cost: WALKER,
    can_resurrect: false,
};

const MAGICIAN: TypeProfile = TypeProfile {
    side: Side::Player,
    attack: 10,
    defence: 40,
    move_distance: 2,
    attack_distance: 4,
    basic_damage: DamageRange { min: 10, max: 20 },
    hard_damage: DamageRange { min: 15, max: 25 },
    move_cost: CASTER,
    can_resurrect: true,
};

const DAEMON: TypeProfile = TypeProfile {
    side: Side::Enemy,
    attack: 10,
    defence: 40,
    move_distance: 2,
    attack_distance: 2,
    basic_damage: DamageRange { min: 20, max: 30 },
    hard_damage: DamageRange { min: 25, max: 35 },
    move_cost: CASTER,
    can_resurrect: true,
};

const UNDEAD: TypeProfile = TypeProfile {
    side: Side::Enemy,
    attack: 40,
    defence: 10,
    move_distance: 4,
    attack_distance: 2,
    basic_damage: DamageRange { min: 30, max: 40 },
    hard_damage: DamageRange { min: 40, max: 50 },
    move_cost: WALKER,
    can_resurrect: false,
};

const VAMPIRE: TypeProfile = TypeProfile {
    side: Side::Enemy,
    attack: 25,
    defence: 25,
    move_distance: 2,
    attack_distance: 2,
    basic_damage: DamageRange { min: 10, max: 16 },
    hard_damage: DamageRange { min: 15, max: 25 },
    move_cost: WALKER,
    can_resurrect: false,
};

impl CharacterType {
    pub fn profile(&self) -> &'static TypeProfile {
        match self {
            Self::Swordsman => &SWORDSMAN,
            Self::Bowman => &BOWMAN,
            Self::Magician => &MAGICIAN,
            Self::Daemon => &DAEMON,
            Self::Undead => &UNDEAD,
            Self::Vampire => &VAMPIRE,
        }
    }

    /// 玩家可用的角色類型
    pub fn player_types() -> Vec<CharacterType> {
        vec![Self::Swordsman, Self::Bowman, Self::Magician]
    }

    /// 敵方可用的角色類型
    pub fn enemy_types() -> Vec<CharacterType> {
        vec![Self::Daemon, Self::Undead, Self::Vampire]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    #[serde(rename = "type")]
    pub kind: CharacterType,
    #[serde(rename = "team")]
    pub side: Side,
    pub level: u32,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defence: i32,
    /// 防禦行動給的暫時加成，己方下回合開始時清除
    pub defence_bonus: i32,
    pub move_distance: u32,
    pub attack_distance: u32,
    pub action_points: ActionPoints,
    pub current_action_points: ActionPoints,
    pub is_dead: bool,
    /// 死亡後經過的回合切換次數
    pub turns_dead: u32,
}

impl Character {
    /// 建立指定等級的角色，等級 N 的角色等同等級 1 升級 N-1 次
    pub fn new(id: CharacterId, kind: CharacterType, level: u32) -> Result<Self> {
        if level == 0 || level > MAX_CHARACTER_LEVEL {
            return Err(Error::InvalidLevel(level));
        }
        let profile = kind.profile();
        let mut character = Self {
            id,
            kind,
            side: profile.side,
            level: 1,
            health: BASE_HEALTH,
            max_health: MAX_HEALTH,
            attack: profile.attack,
            defence: profile.defence,
            defence_bonus: 0,
            move_distance: profile.move_distance,
            attack_distance: profile.attack_distance,
            action_points: BASE_ACTION_POINTS,
            current_action_points: BASE_ACTION_POINTS,
            is_dead: false,
            turns_dead: 0,
        };
        for _ in 1..level {
            character.level_up();
        }
        Ok(character)
    }

    pub fn profile(&self) -> &'static TypeProfile {
        self.kind.profile()
    }

    pub fn is_alive(&self) -> bool {
        !self.is_dead
    }

    /// 受到傷害，血量不低於 0，歸零時死亡
    pub fn take_damage(&mut self, amount: i32) {
        if self.is_dead {
            return;
        }
        self.health = (self.health - amount.max(0)).max(0);
        if self.health == 0 {
            self.die();
        }
    }

    pub fn die(&mut self) {
        self.health = 0;
        self.is_dead = true;
        self.current_action_points = 0;
        self.defence_bonus = 0;
        self.turns_dead = 0;
    }

    /// 回合開始：回復行動點數並清除暫時防禦加成
    pub fn reset_action_points(&mut self) {
        self.defence_bonus = 0;
        if self.is_dead {
            self.current_action_points = 0;
            return;
        }
        self.current_action_points = self.action_points;
    }

    /// 扣除行動點數，不足時拒絕且不扣
    pub fn spend(&mut self, cost: ActionPoints) -> Result<(), Rejection> {
        if self.is_dead || self.current_action_points < cost {
            return Err(Rejection::NotEnoughPoints);
        }
        self.current_action_points -= cost;
        Ok(())
    }

    /// 防禦總值（含暫時加成）
    pub fn total_defence(&self) -> i32 {
        self.defence + self.defence_bonus
    }

    /// 升級：攻防依剩餘血量成長，回復血量
    ///
    /// 已達 [`MAX_CHARACTER_LEVEL`] 時不變。
    pub fn level_up(&mut self) {
        if self.level >= MAX_CHARACTER_LEVEL {
            return;
        }
        let growth = 80 + self.health;
        self.attack = grow(self.attack, growth);
        self.defence = grow(self.defence, growth);
        self.health = (self.health + LEVEL_UP_HEAL).min(self.max_health);
        self.level += 1;
    }

    /// 是否仍在可復活的時限內
    pub fn is_resurrectable(&self) -> bool {
        self.is_dead && self.turns_dead <= RESURRECT_WINDOW
    }

    /// 復活並回復指定血量，本回合無行動點數
    pub fn revive(&mut self, health: i32) {
        self.is_dead = false;
        self.turns_dead = 0;
        self.health = health.clamp(1, self.max_health);
        self.current_action_points = 0;
    }

    /// 滑鼠停留時顯示的角色資訊
    pub fn tooltip(&self) -> String {
        format!(
            "\u{1F396}{} \u{2694}{} \u{1F6E1}{} \u{2764}{}",
            self.level,
            self.attack,
            self.total_defence(),
            self.health
        )
    }
}

// 成長後的屬性不低於原值，溢位時停在 i32::MAX
fn grow(stat: i32, growth: i32) -> i32 {
    let grown = i64::from(stat) * i64::from(growth) / 100;
    i32::try_from(grown).unwrap_or(i32::MAX).max(stat)
}

/// 指定等級下屬性的合理範圍：下限為基礎值，上限為每級都以滿血成長
fn stat_bounds(base: i32, level: u32) -> (i32, i32) {
    let ceiling = (1..level).fold(base, |stat, _| grow(stat, 80 + MAX_HEALTH));
    (base, ceiling)
}

/// 存檔中的角色資料，讀取時經過驗證再還原成 Character
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterRecord {
    id: CharacterId,
    #[serde(rename = "type")]
    kind: CharacterType,
    #[serde(rename = "team")]
    side: Side,
    level: u32,
    health: i32,
    max_health: i32,
    attack: i32,
    defence: i32,
    #[serde(default)]
    defence_bonus: i32,
    move_distance: u32,
    attack_distance: u32,
    action_points: ActionPoints,
    current_action_points: ActionPoints,
    is_dead: bool,
    #[serde(default)]
    turns_dead: u32,
}

impl TryFrom<CharacterRecord> for Character {
    type Error = Error;

    fn try_from(record: CharacterRecord) -> Result<Self> {
        let func = "Character::try_from";

        if record.level == 0 || record.level > MAX_CHARACTER_LEVEL {
            return Err(Error::InvalidLevel(record.level));
        }
        let profile = record.kind.profile();
        if record.side != profile.side {
            return Err(Error::Persistence(format!(
                "{} 的陣營 {} 與類型 {} 不符",
                record.id, record.side, record.kind
            )));
        }
        if record.max_health != MAX_HEALTH
            || record.health < 0
            || record.health > record.max_health
        {
            return Err(Error::Persistence(format!(
                "{} 的血量 {}/{} 不合法",
                record.id, record.health, record.max_health
            )));
        }
        if record.is_dead != (record.health == 0) {
            return Err(Error::Persistence(format!("{} 的死亡狀態與血量不一致", record.id)));
        }
        for (name, value, base) in [
            ("攻擊", record.attack, profile.attack),
            ("防禦", record.defence, profile.defence),
        ] {
            let (low, high) = stat_bounds(base, record.level);
            if !(low..=high).contains(&value) {
                return Err(Error::Persistence(format!(
                    "{} 的{name} {value} 超出等級 {} 的範圍 {low}..={high}",
                    record.id, record.level
                )));
            }
        }
        if record.move_distance != profile.move_distance
            || record.attack_distance != profile.attack_distance
        {
            return Err(Error::Persistence(format!(
                "{} 的移動或攻擊距離與類型 {} 不符",
                record.id, record.kind
            )));
        }
        let max_bonus = BASE_ACTION_POINTS as i32 * DEFENCE_PER_POINT;
        if !(0..=max_bonus).contains(&record.defence_bonus) {
            return Err(Error::Persistence(format!(
                "{} 的防禦加成 {} 不合法",
                record.id, record.defence_bonus
            )));
        }
        if record.action_points != BASE_ACTION_POINTS {
            return Err(Error::Persistence(format!(
                "{} 的行動點數上限 {} 不合法",
                record.id, record.action_points
            )));
        }
        if record.current_action_points > record.action_points {
            return Err(Error::InvalidParameter {
                func,
                detail: format!("{} 的行動點數超過上限", record.id),
            });
        }
        Ok(Character {
            id: record.id,
            kind: record.kind,
            side: record.side,
            level: record.level,
            health: record.health,
            max_health: record.max_health,
            attack: record.attack,
            defence: record.defence,
            defence_bonus: record.defence_bonus,
            move_distance: record.move_distance,
            attack_distance: record.attack_distance,
            action_points: record.action_points,
            current_action_points: record.current_action_points,
            is_dead: record.is_dead,
            turns_dead: record.turns_dead,
        })
    }
}

impl<'de> Deserialize<'de> for Character {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = CharacterRecord::deserialize(deserializer)?;
        Character::try_from(record).map_err(serde::de::Error::custom)
    }
}
