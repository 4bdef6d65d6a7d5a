//! 規則的性質測試

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use strum::IntoEnumIterator;
use tactics_core::combat::perform_attack;
use tactics_core::movement::{calculate_move_cost, calculate_path};
use tactics_core::{
    ActionKind, Board, Character, CharacterId, CharacterType, GameState, Pos, PositionedCharacter,
    Rejection, Side, Team,
};

fn any_kind() -> impl Strategy<Value = CharacterType> {
    prop::sample::select(CharacterType::iter().collect::<Vec<_>>())
}

proptest! {
    #[test]
    fn proptest_take_damage_clamps_health(
        kind in any_kind(),
        level in 1u32..6,
        hits in prop::collection::vec(-20i32..200, 1..6),
    ) {
        let mut c = Character::new(CharacterId(1), kind, level).expect("Character::new 應成功");
        for amount in hits {
            c.take_damage(amount);
            prop_assert!(c.health >= 0 && c.health <= c.max_health);
            prop_assert_eq!(c.is_dead, c.health == 0);
        }
    }

    #[test]
    fn proptest_path_respects_distance_and_blockers(
        from in 0usize..64,
        to in 0usize..64,
        max_distance in 0usize..8,
        blocked in prop::collection::hash_set(0usize..64, 0..20),
    ) {
        let board = Board::new(8);
        let path = calculate_path(&board, from, to, max_distance, |cell| blocked.contains(&cell));

        prop_assert!(path.len() <= max_distance + 1);
        prop_assert_eq!(path[0], from);
        for cell in &path[1..] {
            prop_assert!(!blocked.contains(cell));
        }
        for pair in path.windows(2) {
            prop_assert_eq!(board.distance(pair[0], pair[1]), 1);
        }
    }

    #[test]
    fn proptest_move_cost_bounded_by_distance(
        kind in any_kind(),
        from in 0usize..64,
        to in 0usize..64,
    ) {
        let board = Board::new(8);
        let c = Character::new(CharacterId(1), kind, 1).expect("Character::new 應成功");
        let cost = calculate_move_cost(&board, from, to, &c);
        let distance = board.distance(from, to) as u32;
        let profile = c.profile();

        prop_assert!(profile.move_cost.diagonal >= profile.move_cost.straight);
        prop_assert!(cost >= distance * profile.move_cost.straight);
        prop_assert!(cost <= distance * profile.move_cost.diagonal);
    }

    #[test]
    fn proptest_move_cost_grows_along_a_line(
        kind in any_kind(),
        dx in -1i32..=1,
        dy in -1i32..=1,
        steps in 1usize..7,
    ) {
        prop_assume!(dx != 0 || dy != 0);
        let board = Board::new(8);
        let c = Character::new(CharacterId(1), kind, 1).expect("Character::new 應成功");
        let start = Pos::new(3, 3);
        let mut previous = 0;
        for k in 1..=steps as i32 {
            let x = start.x as i32 + dx * k;
            let y = start.y as i32 + dy * k;
            if !(0..8).contains(&x) || !(0..8).contains(&y) {
                break;
            }
            let to = board
                .to_index(Pos::new(x as usize, y as usize))
                .expect("座標應在棋盤內");
            let from = board.to_index(start).expect("起點應在棋盤內");
            let cost = calculate_move_cost(&board, from, to, &c);
            prop_assert!(cost > previous);
            previous = cost;
        }
    }

    #[test]
    fn proptest_diagonal_move_costs_more_than_straight(
        kind in any_kind(),
        distance in 1usize..8,
        x in 0usize..8,
        y in 0usize..8,
    ) {
        let board = Board::new(8);
        let c = Character::new(CharacterId(1), kind, 1).expect("Character::new 應成功");
        let x = x % (8 - distance);
        let y = y % (8 - distance);
        let from = board.to_index(Pos::new(x, y)).expect("起點應在棋盤內");
        let straight = board.to_index(Pos::new(x + distance, y)).expect("終點應在棋盤內");
        let diagonal = board
            .to_index(Pos::new(x + distance, y + distance))
            .expect("終點應在棋盤內");
        prop_assert_eq!(board.distance(from, straight), board.distance(from, diagonal));

        let straight_cost = calculate_move_cost(&board, from, straight, &c);
        let diagonal_cost = calculate_move_cost(&board, from, diagonal, &c);
        prop_assert!(diagonal_cost > straight_cost, "{} vs {}", diagonal_cost, straight_cost);
    }

    #[test]
    fn proptest_out_of_range_attack_changes_nothing(
        attacker_kind in prop::sample::select(CharacterType::player_types()),
        target_kind in prop::sample::select(CharacterType::enemy_types()),
        from in 0usize..64,
        to in 0usize..64,
        hard in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let board = Board::new(8);
        let attacker = Character::new(CharacterId(1), attacker_kind, 1).expect("Character::new 應成功");
        prop_assume!(from != to);
        prop_assume!(board.distance(from, to) > attacker.attack_distance as usize);
        let target = Character::new(CharacterId(2), target_kind, 1).expect("Character::new 應成功");

        let mut state = GameState {
            player_team: Team::from_characters(Side::Player, vec![attacker]).expect("隊伍應建立成功"),
            enemy_team: Team::from_characters(Side::Enemy, vec![target]).expect("隊伍應建立成功"),
            positioned_player_characters: vec![PositionedCharacter::new(CharacterId(1), from)],
            positioned_enemy_characters: vec![PositionedCharacter::new(CharacterId(2), to)],
            ..Default::default()
        };
        let before = state.clone();
        let kind = if hard { ActionKind::HardAttack } else { ActionKind::Attack };
        let mut rng = StdRng::seed_from_u64(seed);

        let err = perform_attack(&mut state, &board, CharacterId(1), CharacterId(2), kind, &mut rng)
            .expect_err("超出射程應被拒絕");
        prop_assert_eq!(err.rejection(), Some(Rejection::TooFar));
        prop_assert_eq!(state, before);
    }

    #[test]
    fn proptest_generated_team_respects_bounds(
        max_level in 1u32..6,
        count in 0usize..10,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut used = HashSet::new();
        let types = CharacterType::enemy_types();
        let team = tactics_core::generate_team(&types, max_level, count, &mut rng, &mut used)
            .expect("generate_team 應成功");
        prop_assert_eq!(team.len(), count);
        for c in team.iter() {
            prop_assert!(c.level >= 1 && c.level <= max_level);
            prop_assert!(types.contains(&c.kind));
        }
    }
}
