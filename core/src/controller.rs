//! controller.rs：
//! - 回合狀態機：玩家回合 ⇄ 敵方回合，玩家回合內有「未選取 / 已選取 / 等待選擇行動」三種子狀態。
//! - 每個輸入處理到底才回傳，回傳的事件序列就是畫面要依序播放的內容。
//! - 行動被拒時只回傳錯誤事件，狀態不變；一致性錯誤會記錄並中止該行動。
use crate::action::{available_attacks, ActionKind};
use crate::ai::{plan_unit_action, unit_order, AiAction};
use crate::board::{health_level, Board};
use crate::character::{CharacterId, Side};
use crate::combat::{can_attack, perform_attack, perform_defence, perform_resurrect};
use crate::config::GameConfig;
use crate::error::{Error, Rejection, Result};
use crate::event::{CellView, Cursor, GameEvent, Highlight, Outcome};
use crate::movement::{apply_move, plan_move};
use crate::progression::{
    advance_level, final_score, level_bonus, new_game_state, update_max_score,
};
use crate::service::{GameStateService, Storage};
use crate::state::GameState;
use crate::CellIndex;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// 玩家回合內的選取狀態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Selected {
        character: CharacterId,
        cell: CellIndex,
    },
    /// 行動選單已開啟，`target` 可能是敵人、陣亡的隊友，或角色自己（防禦）
    AwaitingAction {
        character: CharacterId,
        target: CharacterId,
        target_cell: CellIndex,
        options: Vec<ActionKind>,
    },
}

impl Selection {
    pub fn character(&self) -> Option<CharacterId> {
        match self {
            Selection::None => None,
            Selection::Selected { character, .. } | Selection::AwaitingAction { character, .. } => {
                Some(*character)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Over(Outcome),
}

pub struct GameController<S: Storage> {
    config: GameConfig,
    board: Board,
    state: GameState,
    service: GameStateService<S>,
    rng: StdRng,
    selection: Selection,
    phase: Phase,
}

impl<S: Storage> GameController<S> {
    pub fn new(config: GameConfig, storage: S) -> Result<Self> {
        Self::with_rng(config, storage, StdRng::from_os_rng())
    }

    /// 固定亂數種子，測試與重播使用
    pub fn with_seed(config: GameConfig, storage: S, seed: u64) -> Result<Self> {
        Self::with_rng(config, storage, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, storage: S, mut rng: StdRng) -> Result<Self> {
        config.validate()?;
        let board = Board::new(config.board_size);
        let state = new_game_state(&config, &board, 0, &mut rng)?;
        Ok(Self {
            config,
            board,
            state,
            service: GameStateService::new(storage),
            rng,
            selection: Selection::None,
            phase: Phase::Playing,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// 直接修改狀態，只給測試與編輯工具使用
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn storage(&self) -> &S {
        self.service.storage()
    }

    pub fn is_playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// 畫面初次繪製需要的事件
    pub fn init(&self) -> Vec<GameEvent> {
        vec![
            GameEvent::ThemeChanged(self.state.theme()),
            self.stats_event(),
            GameEvent::TurnChanged(self.state.current_turn),
            self.redraw_event(),
        ]
    }

    pub fn on_cell_click(&mut self, index: CellIndex) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Err(rejection) = self.check_player_input() {
            self.report(rejection.into(), &mut events);
            return events;
        }
        if !self.board.contains(index) {
            return events;
        }
        // 點別的格子等於關掉選單
        if let Selection::AwaitingAction { character, .. } = self.selection {
            events.push(GameEvent::HideActionMenu);
            match self.state.position_of("on_cell_click", character) {
                Ok(cell) => self.selection = Selection::Selected { character, cell },
                Err(e) => {
                    self.selection = Selection::None;
                    self.report(e, &mut events);
                    return events;
                }
            }
        }

        let clicked = self
            .state
            .character_at(index)
            .map(|c| (c.id, c.side, c.is_alive()));
        match (clicked, self.selection.clone()) {
            (Some((id, Side::Player, true)), Selection::Selected { character, cell })
                if id == character =>
            {
                self.open_self_menu(character, cell, &mut events);
            }
            (Some((id, Side::Player, true)), _) => self.select(id, index, &mut events),
            (Some((id, Side::Enemy, true)), Selection::Selected { character, .. }) => {
                self.open_attack_menu(character, id, index, &mut events);
            }
            (Some((_, Side::Enemy, true)), Selection::None) => {
                self.report(Rejection::NotYourCharacter.into(), &mut events);
            }
            (Some((id, Side::Player, false)), Selection::Selected { character, .. })
                if self.can_resurrect(character) =>
            {
                self.open_resurrect_menu(character, id, index, &mut events);
            }
            (_, Selection::Selected { character, .. }) => {
                self.try_move(character, index, &mut events);
            }
            _ => {}
        }
        events
    }

    pub fn on_cell_enter(&mut self, index: CellIndex) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if !self.board.contains(index) {
            return events;
        }
        if let Some(c) = self.state.character_at(index) {
            events.push(GameEvent::ShowTooltip {
                cell: index,
                text: c.tooltip(),
            });
        }
        if self.check_player_input().is_err() {
            events.push(GameEvent::SetCursor(Cursor::NotAllowed));
            return events;
        }

        let hovered = self
            .state
            .character_at(index)
            .map(|c| (c.id, c.side, c.is_alive()));
        let cursor = match (hovered, self.selection.character()) {
            (Some((_, Side::Player, true)), _) => Cursor::Pointer,
            (Some((id, Side::Enemy, true)), Some(selected)) => {
                if can_attack(&self.state, &self.board, selected, id).is_ok() {
                    events.push(GameEvent::SelectCell {
                        cell: index,
                        color: Highlight::Red,
                        dashed: false,
                    });
                    Cursor::Crosshair
                } else {
                    Cursor::NotAllowed
                }
            }
            (Some((_, Side::Enemy, true)), None) => Cursor::NotAllowed,
            (_, Some(selected)) => {
                if plan_move(&self.state, &self.board, selected, index).is_ok() {
                    events.push(GameEvent::SelectCell {
                        cell: index,
                        color: Highlight::Green,
                        dashed: false,
                    });
                    Cursor::Pointer
                } else {
                    Cursor::NotAllowed
                }
            }
            (_, None) => Cursor::Default,
        };
        events.push(GameEvent::SetCursor(cursor));
        events
    }

    pub fn on_cell_leave(&mut self, index: CellIndex) -> Vec<GameEvent> {
        let mut events = vec![GameEvent::RemoveTooltip(index)];
        let (selected, selected_cell) = match self.selection {
            Selection::None => return events,
            Selection::Selected { character, cell } => (character, cell),
            Selection::AwaitingAction { character, .. } => {
                match self.state.position_of("on_cell_leave", character) {
                    Ok(cell) => (character, cell),
                    Err(_) => return events,
                }
            }
        };
        if index == selected_cell {
            return events;
        }
        events.push(GameEvent::DeselectCell(index));
        // 離開時恢復攻擊範圍標示
        if let Some(target) = self.state.living_character_at(index) {
            if can_attack(&self.state, &self.board, selected, target.id).is_ok() {
                events.push(GameEvent::SelectCell {
                    cell: index,
                    color: Highlight::Red,
                    dashed: true,
                });
            }
        }
        events
    }

    /// 執行選單上的行動
    pub fn choose_action(&mut self, kind: ActionKind) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Err(rejection) = self.check_player_input() {
            self.report(rejection.into(), &mut events);
            return events;
        }
        let Selection::AwaitingAction {
            character,
            target,
            target_cell,
            options,
        } = self.selection.clone()
        else {
            self.report(Rejection::NoSuchAction.into(), &mut events);
            return events;
        };
        if !options.contains(&kind) {
            self.report(Rejection::NoSuchAction.into(), &mut events);
            return events;
        }
        events.push(GameEvent::HideActionMenu);

        let result = match kind {
            ActionKind::Attack | ActionKind::HardAttack => {
                self.execute_attack(character, target, kind, &mut events)
            }
            ActionKind::Defence => self.execute_defence(character, &mut events),
            ActionKind::Resurrect => self.execute_resurrect(character, target, &mut events),
        };
        if let Err(e) = result {
            tracing::debug!(%character, %target, target_cell, "chosen action failed");
            self.report(e, &mut events);
        }
        self.after_player_action(character, &mut events);
        events
    }

    pub fn end_turn(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Err(rejection) = self.check_player_input() {
            self.report(rejection.into(), &mut events);
            return events;
        }
        self.switch_turn(&mut events);
        events
    }

    /// 由 AI 代替玩家走完這個回合
    pub fn autoplay_turn(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if let Err(rejection) = self.check_player_input() {
            self.report(rejection.into(), &mut events);
            return events;
        }
        let level = self.state.current_level;
        self.clear_selection(&mut events);
        self.run_side_turn(Side::Player, &mut events);
        if self.is_playing() && self.state.current_level == level {
            self.switch_turn(&mut events);
        }
        events
    }

    /// 開新局，保留最高分
    pub fn new_game(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        update_max_score(&mut self.state);
        match new_game_state(
            &self.config,
            &self.board,
            self.state.max_score,
            &mut self.rng,
        ) {
            Ok(state) => self.state = state,
            Err(e) => {
                self.report(e, &mut events);
                return events;
            }
        }
        self.phase = Phase::Playing;
        self.clear_selection(&mut events);
        events.extend(self.init());
        events.push(GameEvent::Message("新遊戲開始".to_string()));
        events
    }

    pub fn save_game(&mut self) -> Vec<GameEvent> {
        match self.service.save(&self.state) {
            Ok(()) => vec![GameEvent::Message("遊戲已儲存".to_string())],
            Err(e) => {
                tracing::error!(error = %e, "failed to save game");
                vec![GameEvent::Error(format!("儲存失敗：{e}"))]
            }
        }
    }

    /// 讀檔；失敗時回報錯誤並改開新局
    pub fn load_game(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        match self.service.load(&self.board) {
            Ok(mut state) => {
                state.max_score = state.max_score.max(self.state.max_score);
                self.state = state;
                self.phase = Phase::Playing;
                self.clear_selection(&mut events);
                events.extend(self.init());
                events.push(GameEvent::Message("遊戲已讀取".to_string()));
                self.check_outcome(&mut events);
                if self.is_playing() && self.state.current_turn == Side::Enemy {
                    self.run_enemy_turn(&mut events);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load game, starting a new one");
                events.push(GameEvent::Error(format!("讀取失敗：{e}")));
                events.extend(self.new_game());
            }
        }
        events
    }

    fn check_player_input(&self) -> Result<(), Rejection> {
        if !self.is_playing() {
            return Err(Rejection::GameOver);
        }
        if self.state.current_turn != Side::Player {
            return Err(Rejection::NotYourTurn);
        }
        Ok(())
    }

    fn report(&self, err: Error, events: &mut Vec<GameEvent>) {
        match &err {
            Error::Rejected(reason) => tracing::warn!(%reason, "action rejected"),
            e if e.is_consistency() => tracing::error!(error = %e, "inconsistent game state"),
            e => tracing::warn!(error = %e, "action failed"),
        }
        events.push(GameEvent::Error(err.to_string()));
    }

    fn clear_selection(&mut self, events: &mut Vec<GameEvent>) {
        self.selection = Selection::None;
        events.push(GameEvent::HideActionMenu);
        events.push(GameEvent::DeselectAll);
    }

    /// 選取角色並標示其攻擊範圍內的敵人
    fn select(&mut self, id: CharacterId, cell: CellIndex, events: &mut Vec<GameEvent>) {
        self.clear_selection(events);
        events.push(GameEvent::SelectCell {
            cell,
            color: Highlight::Yellow,
            dashed: false,
        });
        for pc in self.state.positioned(Side::Enemy) {
            if can_attack(&self.state, &self.board, id, pc.character).is_ok() {
                events.push(GameEvent::SelectCell {
                    cell: pc.position,
                    color: Highlight::Red,
                    dashed: true,
                });
            }
        }
        self.selection = Selection::Selected {
            character: id,
            cell,
        };
    }

    fn open_self_menu(&mut self, id: CharacterId, cell: CellIndex, events: &mut Vec<GameEvent>) {
        let points = self
            .state
            .character(id)
            .map_or(0, |c| c.current_action_points);
        let options = if points >= ActionKind::Defence.base_cost() {
            vec![ActionKind::Defence]
        } else {
            Vec::new()
        };
        events.push(GameEvent::ShowActionMenu {
            cell,
            options: options.clone(),
            end_turn: true,
        });
        self.selection = Selection::AwaitingAction {
            character: id,
            target: id,
            target_cell: cell,
            options,
        };
    }

    fn open_attack_menu(
        &mut self,
        attacker: CharacterId,
        target: CharacterId,
        cell: CellIndex,
        events: &mut Vec<GameEvent>,
    ) {
        if let Err(e) = can_attack(&self.state, &self.board, attacker, target) {
            self.report(e, events);
            return;
        }
        let options = self
            .state
            .character(attacker)
            .map(available_attacks)
            .unwrap_or_default();
        if options.is_empty() {
            self.report(Rejection::NotEnoughPoints.into(), events);
            return;
        }
        events.push(GameEvent::ShowActionMenu {
            cell,
            options: options.clone(),
            end_turn: false,
        });
        self.selection = Selection::AwaitingAction {
            character: attacker,
            target,
            target_cell: cell,
            options,
        };
    }

    fn can_resurrect(&self, id: CharacterId) -> bool {
        self.state
            .character(id)
            .is_some_and(|c| c.profile().can_resurrect)
    }

    fn open_resurrect_menu(
        &mut self,
        caster: CharacterId,
        target: CharacterId,
        cell: CellIndex,
        events: &mut Vec<GameEvent>,
    ) {
        let func = "open_resurrect_menu";

        let resurrectable = self
            .state
            .character(target)
            .is_some_and(|c| c.is_resurrectable());
        if !resurrectable {
            self.report(Rejection::NotResurrectable.into(), events);
            return;
        }
        let reach = match (
            self.state.position_of(func, caster),
            self.state.require(func, caster),
        ) {
            (Ok(from), Ok(c)) => self.board.distance(from, cell) <= c.attack_distance as usize,
            (Err(e), _) | (_, Err(e)) => {
                self.report(e, events);
                return;
            }
        };
        if !reach {
            self.report(Rejection::TooFar.into(), events);
            return;
        }
        events.push(GameEvent::ShowActionMenu {
            cell,
            options: vec![ActionKind::Resurrect],
            end_turn: false,
        });
        self.selection = Selection::AwaitingAction {
            character: caster,
            target,
            target_cell: cell,
            options: vec![ActionKind::Resurrect],
        };
    }

    fn try_move(&mut self, id: CharacterId, to: CellIndex, events: &mut Vec<GameEvent>) {
        let plan = match plan_move(&self.state, &self.board, id, to) {
            Ok(plan) => plan,
            Err(e) => {
                self.report(e, events);
                return;
            }
        };
        if let Err(e) = apply_move(&mut self.state, &plan) {
            self.report(e, events);
            return;
        }
        events.push(GameEvent::DeselectAll);
        events.push(GameEvent::CharacterMoved {
            character: id,
            path: plan.path,
        });
        self.push_points(id, events);
        events.push(self.redraw_event());
        self.after_player_action(id, events);
    }

    fn execute_attack(
        &mut self,
        attacker: CharacterId,
        target: CharacterId,
        kind: ActionKind,
        events: &mut Vec<GameEvent>,
    ) -> Result<()> {
        let report = perform_attack(
            &mut self.state,
            &self.board,
            attacker,
            target,
            kind,
            &mut self.rng,
        )?;
        events.push(GameEvent::Damage {
            cell: report.target_cell,
            amount: report.damage,
            critical: report.is_critical,
        });
        if report.target_died {
            tracing::info!(%attacker, %target, "character died");
            events.push(GameEvent::CharacterDied {
                character: target,
                cell: report.target_cell,
            });
        }
        self.push_points(attacker, events);
        events.push(self.redraw_event());
        Ok(())
    }

    fn execute_defence(&mut self, id: CharacterId, events: &mut Vec<GameEvent>) -> Result<()> {
        let report = perform_defence(&mut self.state, id, &mut self.rng)?;
        events.push(GameEvent::DefenceRaised {
            character: id,
            bonus: report.bonus,
        });
        self.push_points(id, events);
        Ok(())
    }

    fn execute_resurrect(
        &mut self,
        caster: CharacterId,
        target: CharacterId,
        events: &mut Vec<GameEvent>,
    ) -> Result<()> {
        let report =
            perform_resurrect(&mut self.state, &self.board, caster, target, &mut self.rng)?;
        tracing::info!(%caster, %target, "character resurrected");
        events.push(GameEvent::Resurrected {
            character: target,
            cell: report.cell,
        });
        self.push_points(caster, events);
        events.push(self.redraw_event());
        Ok(())
    }

    /// 玩家行動後：檢查勝負、更新選取，所有角色點數用完時自動換邊
    fn after_player_action(&mut self, id: CharacterId, events: &mut Vec<GameEvent>) {
        let level = self.state.current_level;
        if !self.check_outcome(events) || self.state.current_level != level {
            return;
        }
        let still_active = self
            .state
            .character(id)
            .is_some_and(|c| c.is_alive() && c.current_action_points > 0);
        match self.state.position_of("after_player_action", id) {
            Ok(cell) if still_active => self.select(id, cell, events),
            _ => self.clear_selection(events),
        }
        if !self.state.player_team.can_act() {
            tracing::info!("player side exhausted");
            self.switch_turn(events);
        }
    }

    /// 換邊；進入敵方回合時由 AI 走完，然後無條件交回玩家
    fn switch_turn(&mut self, events: &mut Vec<GameEvent>) {
        let incoming = self.state.current_turn.opposite();
        self.begin_turn(incoming, events);
        if incoming == Side::Enemy {
            self.run_enemy_turn(events);
        }
    }

    fn run_enemy_turn(&mut self, events: &mut Vec<GameEvent>) {
        self.run_side_turn(Side::Enemy, events);
        if self.is_playing() && self.state.current_turn == Side::Enemy {
            self.begin_turn(Side::Player, events);
        }
    }

    fn begin_turn(&mut self, side: Side, events: &mut Vec<GameEvent>) {
        self.state.current_turn = side;
        for c in self.state.team_mut(side).iter_mut() {
            c.reset_action_points();
        }
        for c in self
            .state
            .player_team
            .iter_mut()
            .chain(self.state.enemy_team.iter_mut())
            .filter(|c| c.is_dead)
        {
            c.turns_dead += 1;
        }
        tracing::info!(%side, level = self.state.current_level, "turn changed");
        self.clear_selection(events);
        events.push(GameEvent::TurnChanged(side));
        events.push(self.redraw_event());
    }

    /// 依射程由遠到近讓每名角色行動到沒事可做，每次行動後檢查勝負
    fn run_side_turn(&mut self, side: Side, events: &mut Vec<GameEvent>) {
        let level = self.state.current_level;
        for id in unit_order(&self.state, side) {
            loop {
                if !self.is_playing() || self.state.current_level != level {
                    return;
                }
                let action = match plan_unit_action(&self.state, &self.board, id) {
                    Ok(Some(action)) => action,
                    Ok(None) => break,
                    Err(e) => {
                        self.report(e, events);
                        break;
                    }
                };
                let before = self
                    .state
                    .character(id)
                    .map(|c| c.current_action_points);
                if let Err(e) = self.execute_ai_action(id, action, events) {
                    self.report(e, events);
                    break;
                }
                self.check_outcome(events);
                let after = self
                    .state
                    .character(id)
                    .map(|c| c.current_action_points);
                if before == after {
                    break;
                }
            }
        }
    }

    fn execute_ai_action(
        &mut self,
        id: CharacterId,
        action: AiAction,
        events: &mut Vec<GameEvent>,
    ) -> Result<()> {
        match action {
            AiAction::Attack { target, kind } => self.execute_attack(id, target, kind, events),
            AiAction::Move(plan) => {
                apply_move(&mut self.state, &plan)?;
                events.push(GameEvent::CharacterMoved {
                    character: id,
                    path: plan.path,
                });
                self.push_points(id, events);
                events.push(self.redraw_event());
                Ok(())
            }
        }
    }

    /// 檢查勝負；回傳遊戲是否仍在進行
    fn check_outcome(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if !self.is_playing() {
            return false;
        }
        if self.state.enemy_team.is_defeated() {
            self.on_victory(events);
        } else if self.state.player_team.is_defeated() {
            self.finish(Outcome::Defeat, events);
        }
        self.is_playing()
    }

    fn on_victory(&mut self, events: &mut Vec<GameEvent>) {
        let level = self.state.current_level;
        let bonus = level_bonus(level);
        self.state.score += bonus;
        update_max_score(&mut self.state);
        tracing::info!(level, bonus, score = self.state.score, "level completed");
        events.push(GameEvent::LevelCompleted { level, bonus });

        if level >= self.config.max_level {
            self.state.score = final_score(&self.state);
            self.finish(Outcome::Victory, events);
            return;
        }
        if let Err(e) = advance_level(&mut self.state, &self.config, &self.board, &mut self.rng) {
            self.report(e, events);
            self.state.score = final_score(&self.state);
            self.finish(Outcome::Victory, events);
            return;
        }
        self.clear_selection(events);
        events.push(GameEvent::ThemeChanged(self.state.theme()));
        events.push(self.stats_event());
        events.push(GameEvent::TurnChanged(Side::Player));
        events.push(self.redraw_event());
        let message = format!("第 {} 關", self.state.current_level);
        events.push(GameEvent::Message(message));
    }

    fn finish(&mut self, outcome: Outcome, events: &mut Vec<GameEvent>) {
        update_max_score(&mut self.state);
        self.phase = Phase::Over(outcome);
        tracing::info!(
            %outcome,
            score = self.state.score,
            max_score = self.state.max_score,
            "game over"
        );
        self.clear_selection(events);
        events.push(self.stats_event());
        events.push(GameEvent::GameOver {
            outcome,
            score: self.state.score,
        });
    }

    fn push_points(&self, id: CharacterId, events: &mut Vec<GameEvent>) {
        if let Some(c) = self.state.character(id) {
            events.push(GameEvent::ActionPointsChanged {
                character: id,
                current: c.current_action_points,
                max: c.action_points,
            });
        }
    }

    fn stats_event(&self) -> GameEvent {
        GameEvent::StatsChanged {
            level: self.state.current_level,
            score: self.state.score,
            max_score: self.state.max_score,
        }
    }

    /// 屍體先畫，活著的角色蓋在上面
    fn redraw_event(&self) -> GameEvent {
        let mut cells: Vec<CellView> = self
            .state
            .all_positioned()
            .filter_map(|pc| {
                let c = self.state.character(pc.character)?;
                Some(CellView {
                    position: pc.position,
                    character: c.id,
                    kind: c.kind,
                    side: c.side,
                    health: c.health,
                    health_level: health_level(c.health),
                    is_dead: c.is_dead,
                })
            })
            .collect();
        cells.sort_by_key(|cell| !cell.is_dead);
        GameEvent::Redraw(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Character, CharacterType};
    use crate::position::PositionedCharacter;
    use crate::service::MemoryStorage;
    use crate::team::Team;

    /// 弓箭手在 0，劍士在 1，魔鬼在 3（弓箭手射程內）
    fn scenario() -> GameController<MemoryStorage> {
        let mut controller =
            GameController::with_seed(GameConfig::default(), MemoryStorage::new(), 7).unwrap();
        let bowman = Character::new(CharacterId(1), CharacterType::Bowman, 1).unwrap();
        let swordsman = Character::new(CharacterId(2), CharacterType::Swordsman, 1).unwrap();
        let daemon = Character::new(CharacterId(3), CharacterType::Daemon, 1).unwrap();
        *controller.state_mut() = GameState {
            player_team: Team::from_characters(Side::Player, vec![bowman, swordsman]).unwrap(),
            enemy_team: Team::from_characters(Side::Enemy, vec![daemon]).unwrap(),
            positioned_player_characters: vec![
                PositionedCharacter::new(CharacterId(1), 0),
                PositionedCharacter::new(CharacterId(2), 1),
            ],
            positioned_enemy_characters: vec![PositionedCharacter::new(CharacterId(3), 3)],
            ..Default::default()
        };
        controller
    }

    fn has_error(events: &[GameEvent]) -> bool {
        events.iter().any(|e| matches!(e, GameEvent::Error(_)))
    }

    #[test]
    fn test_select_own_character() {
        let mut controller = scenario();
        let events = controller.on_cell_click(0);
        assert_eq!(
            controller.selection(),
            &Selection::Selected {
                character: CharacterId(1),
                cell: 0,
            }
        );
        assert!(events.contains(&GameEvent::SelectCell {
            cell: 0,
            color: Highlight::Yellow,
            dashed: false,
        }));
        // 魔鬼在射程 3 內
        assert!(events.contains(&GameEvent::SelectCell {
            cell: 3,
            color: Highlight::Red,
            dashed: true,
        }));
    }

    #[test]
    fn test_click_enemy_without_selection() {
        let mut controller = scenario();
        let events = controller.on_cell_click(3);
        assert_eq!(
            events,
            vec![GameEvent::Error(Rejection::NotYourCharacter.to_string())]
        );
    }

    #[test]
    fn test_attack_through_menu() {
        let mut controller = scenario();
        controller.on_cell_click(0);
        let events = controller.on_cell_click(3);
        assert!(events.contains(&GameEvent::ShowActionMenu {
            cell: 3,
            options: vec![ActionKind::Attack, ActionKind::HardAttack],
            end_turn: false,
        }));

        let events = controller.choose_action(ActionKind::Attack);
        let damage = events
            .iter()
            .find_map(|e| match e {
                GameEvent::Damage {
                    cell: 3,
                    amount,
                    ..
                } => Some(*amount),
                _ => None,
            })
            .unwrap();
        assert!((15..=30).contains(&damage));
        let daemon = controller.state().character(CharacterId(3)).unwrap();
        assert_eq!(daemon.health, 50 - damage);
        let bowman = controller.state().character(CharacterId(1)).unwrap();
        assert_eq!(bowman.current_action_points, 3);
        assert!(matches!(controller.selection(), Selection::Selected { .. }));
    }

    #[test]
    fn test_too_far_is_rejected_without_change() {
        let mut controller = scenario();
        let state = controller.state_mut();
        state.positioned_enemy_characters[0].position = 7;
        controller.on_cell_click(0);
        let before = controller.state().clone();
        let events = controller.on_cell_click(7);
        let too_far = GameEvent::Error("敵人太遠了！".to_string());
        assert!(events.contains(&too_far));
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_move_selected_character() {
        let mut controller = scenario();
        controller.on_cell_click(0);
        let events = controller.on_cell_click(16);
        assert!(events.contains(&GameEvent::CharacterMoved {
            character: CharacterId(1),
            path: vec![0, 8, 16],
        }));
        let position = controller.state().position_of("test", CharacterId(1));
        assert_eq!(position.unwrap(), 16);
        assert_eq!(
            controller.selection(),
            &Selection::Selected {
                character: CharacterId(1),
                cell: 16,
            }
        );
    }

    #[test]
    fn test_blocked_move_is_rejected() {
        let mut controller = scenario();
        controller.on_cell_click(0);
        let events = controller.on_cell_click(2);
        assert!(has_error(&events));
        let position = controller.state().position_of("test", CharacterId(1));
        assert_eq!(position.unwrap(), 0);
    }

    #[test]
    fn test_defence_menu_on_self() {
        let mut controller = scenario();
        controller.on_cell_click(0);
        let events = controller.on_cell_click(0);
        assert!(events.contains(&GameEvent::ShowActionMenu {
            cell: 0,
            options: vec![ActionKind::Defence],
            end_turn: true,
        }));
        let events = controller.choose_action(ActionKind::Defence);
        assert!(events.contains(&GameEvent::DefenceRaised {
            character: CharacterId(1),
            bonus: 20,
        }));
        assert_eq!(controller.selection(), &Selection::None);
    }

    #[test]
    fn test_choose_action_without_menu() {
        let mut controller = scenario();
        let events = controller.choose_action(ActionKind::Attack);
        assert!(has_error(&events));
    }

    #[test]
    fn test_end_turn_runs_enemy_and_returns() {
        let mut controller = scenario();
        let events = controller.end_turn();
        assert!(events.contains(&GameEvent::TurnChanged(Side::Enemy)));
        assert!(matches!(events.last(), Some(GameEvent::Redraw(_))));
        assert_eq!(controller.state().current_turn, Side::Player);
        let player_turns = events
            .iter()
            .filter(|e| **e == GameEvent::TurnChanged(Side::Player))
            .count();
        assert_eq!(player_turns, 1);
        // 魔鬼射程 2，劍士在 1、魔鬼在 3，會被攻擊
        let swordsman = controller.state().character(CharacterId(2)).unwrap();
        assert!(swordsman.health < 50 || !controller.is_playing());
        let bowman = controller.state().character(CharacterId(1)).unwrap();
        assert_eq!(bowman.current_action_points, bowman.action_points);
    }

    #[test]
    fn test_victory_advances_level() {
        let mut controller = scenario();
        controller.on_cell_click(0);
        controller.on_cell_click(3);
        let state = controller.state_mut();
        state.character_mut(CharacterId(3)).unwrap().health = 1;
        let events = controller.choose_action(ActionKind::HardAttack);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelCompleted { level: 1, .. })));
        assert_eq!(controller.state().current_level, 2);
        assert_eq!(controller.state().score, 100);
        assert!(controller.is_playing());
    }

    #[test]
    fn test_final_level_victory() {
        let mut controller = scenario();
        controller.config.max_level = 1;
        controller.on_cell_click(0);
        controller.on_cell_click(3);
        let state = controller.state_mut();
        state.character_mut(CharacterId(3)).unwrap().health = 1;
        let events = controller.choose_action(ActionKind::Attack);

        assert_eq!(controller.phase(), Phase::Over(Outcome::Victory));
        // 100 關卡獎勵 + 兩名等級 1、血量 50 的存活者
        assert_eq!(controller.state().score, 200);
        assert_eq!(controller.state().max_score, 200);
        assert!(events.contains(&GameEvent::GameOver {
            outcome: Outcome::Victory,
            score: 200,
        }));

        let events = controller.on_cell_click(0);
        assert_eq!(
            events,
            vec![GameEvent::Error(Rejection::GameOver.to_string())]
        );
    }

    #[test]
    fn test_save_and_load() {
        let mut controller = scenario();
        controller.on_cell_click(0);
        controller.on_cell_click(16);
        let saved = controller.state().clone();
        let events = controller.save_game();
        assert!(!has_error(&events));

        controller.new_game();
        assert_ne!(controller.state(), &saved);
        let events = controller.load_game();
        assert!(!has_error(&events));
        assert_eq!(controller.state(), &saved);
    }

    #[test]
    fn test_load_without_save_starts_new_game() {
        let mut controller = scenario();
        let events = controller.load_game();
        assert!(has_error(&events));
        let started = GameEvent::Message("新遊戲開始".to_string());
        assert!(events.contains(&started));
        assert_eq!(controller.state().player_team.len(), 2);
        assert!(controller.is_playing());
    }

    #[test]
    fn test_hover_hints() {
        let mut controller = scenario();
        let events = controller.on_cell_enter(3);
        assert!(events.contains(&GameEvent::SetCursor(Cursor::NotAllowed)));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::ShowTooltip { cell: 3, .. })));

        controller.on_cell_click(0);
        let events = controller.on_cell_enter(3);
        assert!(events.contains(&GameEvent::SetCursor(Cursor::Crosshair)));
        let events = controller.on_cell_enter(8);
        assert!(events.contains(&GameEvent::SelectCell {
            cell: 8,
            color: Highlight::Green,
            dashed: false,
        }));
        let events = controller.on_cell_leave(3);
        assert_eq!(
            events,
            vec![
                GameEvent::RemoveTooltip(3),
                GameEvent::DeselectCell(3),
                GameEvent::SelectCell {
                    cell: 3,
                    color: Highlight::Red,
                    dashed: true,
                }
            ]
        );
    }

    #[test]
    fn test_auto_switch_when_exhausted() {
        let mut controller = scenario();
        for c in controller.state_mut().player_team.iter_mut() {
            c.current_action_points = 1;
        }
        controller
            .state_mut()
            .character_mut(CharacterId(2))
            .unwrap()
            .current_action_points = 0;
        controller.on_cell_click(0);
        let events = controller.on_cell_click(8);
        assert!(events.contains(&GameEvent::TurnChanged(Side::Enemy)));
        assert_eq!(controller.state().current_turn, Side::Player);
    }
}
