//! Level lifecycle
//!
//! `Idle -> LevelActive -> {LevelComplete, GameOver, Victory}`. Level setup
//! rebuilds the board from [`LevelParams`]. Every terminal transition cancels
//! the level's deadlines before anything new is armed.

use super::geometry::Board;
use super::placement::place_obstacles;
use super::spawner::{LevelParams, arm_timers, dismiss_rooster, place_chickens};
use super::state::{GameEvent, GamePhase, GameState, LifeLossCause};
use crate::consts::*;
use crate::tuning::Tuning;

/// Begin a fresh run at level 1 (also used for restart)
pub fn start_game(state: &mut GameState, tuning: &Tuning) {
    state.level = 1;
    state.lives = tuning.lives;
    state.total_score = 0;
    log::info!("New game (seed {})", state.seed);
    setup_level(state, tuning);
}

/// Continue from a cleared level; ignored in any other phase
pub fn advance_level(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.phase != GamePhase::LevelComplete {
        log::warn!("Cannot advance level while {:?}", state.phase);
        return false;
    }
    state.level += 1;
    setup_level(state, tuning);
    true
}

/// Build the board for `state.level` and start ticking
pub fn setup_level(state: &mut GameState, tuning: &Tuning) {
    let params = LevelParams::for_level(tuning, state.level);

    state.clear_level();
    state.board = Board::from_cells(params.board_cells, CELL_SIZE);
    state.level_score = 0;
    state.eggs_collected = 0;
    state.eggs_needed = params.eggs_needed;
    state.snake_score = 0;
    state.snake_limit = params.snake_limit;
    state.chickens_eaten = 0;
    state.chicken_limit = tuning.weasel.chicken_limit;
    state.combo = 0;
    state.last_collect_ms = None;
    state.power_up = None;
    state.farmer.grace_until_ms = 0;
    state.reset_positions();

    let obstacles = place_obstacles(state, params.obstacles, tuning.placement_attempts);
    let mut chickens = place_chickens(state, tuning, params.chickens, None);
    if state.level <= tuning.chickens.helper_max_level {
        chickens += place_chickens(state, tuning, 1, Some(tuning.chickens.helper_cooldown_ms));
    }

    arm_timers(state, tuning);
    state.phase = GamePhase::LevelActive;
    state.emit(GameEvent::LevelStarted { level: state.level });
    log::info!(
        "Level {} started: {}x{} board, {} obstacles, {} chickens, {} eggs needed, snake limit {}",
        state.level,
        params.board_cells,
        params.board_cells,
        obstacles,
        chickens,
        params.eggs_needed,
        params.snake_limit
    );
}

/// Egg quota reached
pub fn complete_level(state: &mut GameState, tuning: &Tuning) {
    state.timers.clear();
    state.bullets.clear();
    if tuning.max_level.is_some_and(|max| state.level >= max) {
        state.phase = GamePhase::Victory;
        state.emit(GameEvent::Victory);
        log::info!("Final level {} cleared! Score {}", state.level, state.total_score);
    } else {
        state.phase = GamePhase::LevelComplete;
        state.emit(GameEvent::LevelComplete { level: state.level });
        log::info!("Level {} complete, score {}", state.level, state.total_score);
    }
}

/// End the run
pub fn game_over(state: &mut GameState, cause: LifeLossCause) {
    state.timers.clear();
    state.phase = GamePhase::GameOver;
    state.emit(GameEvent::GameOver { cause });
    log::info!(
        "Game over on level {} ({}), score {}",
        state.level,
        cause.describe(),
        state.total_score
    );
}

/// Take a life; ends the run at zero, otherwise resets positions and the
/// counters tied to the cause
pub fn lose_life(state: &mut GameState, tuning: &Tuning, cause: LifeLossCause) {
    state.lives = state.lives.saturating_sub(1);
    state.emit(GameEvent::LifeLost {
        cause,
        lives: state.lives,
    });
    log::info!("{} Lives left: {}", cause.describe(), state.lives);

    if state.lives == 0 {
        game_over(state, cause);
        return;
    }

    state.reset_positions();
    dismiss_rooster(state, tuning);

    match cause {
        LifeLossCause::SnakeAteTooMany => state.snake_score = 0,
        LifeLossCause::WeaselsAteTooMany => {
            state.chickens_eaten = 0;
            state.weasels.clear();
            place_chickens(state, tuning, 1, Some(tuning.chickens.helper_cooldown_ms));
        }
        LifeLossCause::AllChickensEaten => {
            let count = tuning.chickens.count.at(state.level).saturating_sub(1).max(2);
            state.weasels.clear();
            place_chickens(state, tuning, count, None);
        }
        LifeLossCause::SnakeBite | LifeLossCause::RoosterAttack => {}
    }
}

/// Count down the active power-up on its cadence
pub fn tick_power_up(state: &mut GameState, elapsed_ms: u64) {
    let Some(active) = state.power_up.as_mut() else {
        return;
    };
    active.remaining_ms = active.remaining_ms.saturating_sub(elapsed_ms);
    if active.remaining_ms == 0 {
        let kind = active.kind;
        state.power_up = None;
        state.emit(GameEvent::PowerUpExpired(kind));
        log::debug!("{} power-up expired", kind.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::PowerUpKind;
    use crate::sim::state::ActivePowerUp;
    use crate::tuning::TuningPreset;

    #[test]
    fn test_start_builds_level_one() {
        let tuning = Tuning::default();
        let mut state = GameState::new(12);
        start_game(&mut state, &tuning);

        assert_eq!(state.phase, GamePhase::LevelActive);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, 3);
        assert_eq!(state.eggs_needed, 5);
        assert_eq!(state.snake_limit, 5);
        assert_eq!(state.board.width, 540.0);
        assert!(state.obstacles.len() <= 3);
        // Two regular chickens plus the early-level helper
        assert!(state.chickens.len() <= 3);
        assert!(!state.chickens.is_empty());
        assert!(state.timers.power_up_spawn.is_some());
        assert_eq!(state.timers.rooster_spawn, None);
        assert!(state.events.contains(&GameEvent::LevelStarted { level: 1 }));
    }

    #[test]
    fn test_advance_only_from_level_complete() {
        let tuning = Tuning::default();
        let mut state = GameState::new(3);
        assert!(!advance_level(&mut state, &tuning));
        start_game(&mut state, &tuning);
        assert!(!advance_level(&mut state, &tuning));

        state.total_score = 40;
        complete_level(&mut state, &tuning);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert!(state.timers.is_idle());

        assert!(advance_level(&mut state, &tuning));
        assert_eq!(state.level, 2);
        assert_eq!(state.total_score, 40);
        assert_eq!(state.eggs_collected, 0);
        assert_eq!(state.eggs_needed, 8);
        assert_eq!(state.board.width, 19.0 * CELL_SIZE);
    }

    #[test]
    fn test_restart_resets_run() {
        let tuning = Tuning::default();
        let mut state = GameState::new(5);
        start_game(&mut state, &tuning);
        state.level = 4;
        state.lives = 1;
        state.total_score = 99;
        game_over(&mut state, LifeLossCause::SnakeBite);
        assert_eq!(state.phase, GamePhase::GameOver);

        start_game(&mut state, &tuning);
        assert_eq!(state.phase, GamePhase::LevelActive);
        assert_eq!((state.level, state.lives, state.total_score), (1, 3, 0));
    }

    #[test]
    fn test_victory_at_max_level() {
        let tuning = Tuning::from_preset(TuningPreset::Classic);
        let mut state = GameState::new(8);
        start_game(&mut state, &tuning);
        state.level = 10;
        complete_level(&mut state, &tuning);
        assert_eq!(state.phase, GamePhase::Victory);
        assert!(!advance_level(&mut state, &tuning));
    }

    #[test]
    fn test_life_loss_resets_positions() {
        let tuning = Tuning::default();
        let mut state = GameState::new(21);
        start_game(&mut state, &tuning);
        let home = state.farmer.pos;
        state.farmer.pos.x += 50.0;
        lose_life(&mut state, &tuning, LifeLossCause::SnakeBite);
        assert_eq!(state.lives, 2);
        assert_eq!(state.farmer.pos, home);
        assert!(state.is_active());
    }

    #[test]
    fn test_last_life_ends_game_and_cancels_timers() {
        let tuning = Tuning::default();
        let mut state = GameState::new(21);
        start_game(&mut state, &tuning);
        state.lives = 1;
        lose_life(&mut state, &tuning, LifeLossCause::RoosterAttack);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.timers.is_idle());
    }

    #[test]
    fn test_all_chickens_eaten_respawns_flock() {
        let tuning = Tuning::default();
        let mut state = GameState::new(2);
        start_game(&mut state, &tuning);
        state.chickens.clear();
        lose_life(&mut state, &tuning, LifeLossCause::AllChickensEaten);
        assert_eq!(state.lives, 2);
        // max(2, 2 - 1) at level 1
        assert!(!state.chickens.is_empty() && state.chickens.len() <= 2);
    }

    #[test]
    fn test_power_up_countdown() {
        let mut state = GameState::new(1);
        state.power_up = Some(ActivePowerUp {
            kind: PowerUpKind::Freeze,
            remaining_ms: 150,
        });
        tick_power_up(&mut state, 100);
        assert_eq!(state.power_up.map(|p| p.remaining_ms), Some(50));
        tick_power_up(&mut state, 100);
        assert_eq!(state.power_up, None);
        assert_eq!(
            state.events,
            vec![GameEvent::PowerUpExpired(PowerUpKind::Freeze)]
        );
    }
}
