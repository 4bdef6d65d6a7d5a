//! progression.rs：
//! - 開新局、過關與計分。
//! - 過關：存活者升級、移除陣亡者、補滿玩家隊伍、重新產生敵方並重新佈陣。
use crate::board::Board;
use crate::character::{CharacterId, Side};
use crate::config::GameConfig;
use crate::error::Result;
use crate::generator::generate_team;
use crate::position::position_characters;
use crate::state::GameState;
use crate::Score;
use rand::Rng;
use std::collections::HashSet;

/// 過關獎勵
pub fn level_bonus(level: u32) -> Score {
    100 * level
}

/// 通關時的最終分數：目前分數加上每名存活玩家角色的 等級 × 血量
pub fn final_score(state: &GameState) -> Score {
    let survivors: Score = state
        .player_team
        .living()
        .map(|c| c.level * c.health.max(0) as u32)
        .sum();
    state.score + survivors
}

pub fn update_max_score(state: &mut GameState) {
    state.max_score = state.max_score.max(state.score);
}

/// 建立第一關的狀態，保留之前的最高分
pub fn new_game_state<R: Rng>(
    config: &GameConfig,
    board: &Board,
    max_score: Score,
    rng: &mut R,
) -> Result<GameState> {
    let mut used_ids = HashSet::new();
    let player_team = generate_team(
        &config.player_types,
        config.initial_character_level,
        config.team_size,
        rng,
        &mut used_ids,
    )?;
    let enemy_team = generate_team(&config.enemy_types, 1, config.team_size, rng, &mut used_ids)?;

    let mut state = GameState {
        max_score,
        player_team,
        enemy_team,
        ..Default::default()
    };
    place_teams(&mut state, config, board, rng)?;
    tracing::info!(
        players = state.player_team.len(),
        enemies = state.enemy_team.len(),
        "new game"
    );
    Ok(state)
}

/// 進入下一關
///
/// 呼叫前敵方應已全滅；`current_level` 會加一，回合交回玩家。
pub fn advance_level<R: Rng>(
    state: &mut GameState,
    config: &GameConfig,
    board: &Board,
    rng: &mut R,
) -> Result<()> {
    let completed = state.current_level;

    state.remove_dead(Side::Player);
    state.remove_dead(Side::Enemy);
    for character in state.player_team.iter_mut() {
        character.level_up();
        character.reset_action_points();
    }

    let mut used_ids = state.used_ids();
    let missing = config.team_size.saturating_sub(state.player_team.len());
    let reinforcements = generate_team(
        &config.reinforcement_types,
        completed,
        missing,
        rng,
        &mut used_ids,
    )?;
    for character in reinforcements.characters().iter().cloned() {
        state.player_team.add(character)?;
    }

    state.current_level = completed + 1;
    state.enemy_team = generate_team(
        &config.enemy_types,
        state.current_level,
        state.player_team.len(),
        rng,
        &mut used_ids,
    )?;
    state.current_turn = Side::Player;
    place_teams(state, config, board, rng)?;

    tracing::info!(
        level = state.current_level,
        players = state.player_team.len(),
        enemies = state.enemy_team.len(),
        theme = %state.theme(),
        "level advanced"
    );
    Ok(())
}

/// 清除所有站位，玩家佈在 `player_columns`，敵方佈在 `enemy_columns`
fn place_teams<R: Rng>(
    state: &mut GameState,
    config: &GameConfig,
    board: &Board,
    rng: &mut R,
) -> Result<()> {
    let players: Vec<CharacterId> = state.player_team.iter().map(|c| c.id).collect();
    let enemies: Vec<CharacterId> = state.enemy_team.iter().map(|c| c.id).collect();

    let placed = position_characters(
        board,
        &players,
        &config.player_columns,
        &HashSet::new(),
        rng,
    )?;
    let occupied: HashSet<_> = placed.iter().map(|pc| pc.position).collect();
    state.positioned_enemy_characters =
        position_characters(board, &enemies, &config.enemy_columns, &occupied, rng)?;
    state.positioned_player_characters = placed;
    Ok(())
}
