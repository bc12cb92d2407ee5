//! Demo-mode pilot
//!
//! Plays the farmer when idle mode is on: heads for the nearest egg or
//! power-up, veers away from the snake and rooster when they get close, and
//! takes periodic shots at whatever enemy is nearest. Reads state only; it
//! never touches the RNG, so a demo run stays reproducible.

use glam::Vec2;

use super::collision::nearest_egg;
use super::entities::Hitbox;
use super::movement::DirectionKeys;
use super::state::GameState;
use crate::consts::*;

/// Distance at which the pilot starts dodging
const DANGER_CELLS: f32 = 3.0;
/// Enemies farther than this are left alone
const SHOT_RANGE_CELLS: f32 = 7.0;
const SHOT_INTERVAL_MS: u64 = 400;

/// What the pilot wants to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PilotCommand {
    pub keys: DirectionKeys,
    pub fire_at: Option<Vec2>,
}

fn nearest(points: impl Iterator<Item = Vec2>, from: Vec2) -> Option<Vec2> {
    points.min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
}

/// Decide keys and an optional shot for the current state
pub fn pilot(state: &GameState) -> PilotCommand {
    let farmer = state.farmer.pos;
    if !farmer.is_finite() {
        return PilotCommand::default();
    }

    let egg = nearest_egg(&state.eggs, farmer);
    let power_up = nearest(
        state.power_ups.iter().filter(|p| p.has_valid_pos()).map(|p| p.pos),
        farmer,
    );
    let goal = nearest(egg.into_iter().chain(power_up), farmer).unwrap_or(state.board.center());
    let mut desired = (goal - farmer).normalize_or_zero();

    let danger = DANGER_CELLS * CELL_SIZE;
    let snake = state.snake.is_active().then_some(state.snake.pos);
    let rooster = state.rooster.as_ref().map(|r| r.pos);
    for threat in snake.into_iter().chain(rooster) {
        let away = farmer - threat;
        let dist = away.length();
        if dist < danger && dist > f32::EPSILON {
            desired += away / dist * (danger / dist.max(1.0));
        }
    }

    let fire_at = if state.now_ms() % SHOT_INTERVAL_MS == 0 {
        let enemies = snake
            .into_iter()
            .chain(rooster)
            .chain(state.weasels.iter().map(|w| w.pos));
        nearest(enemies.filter(|p| p.is_finite()), farmer)
            .filter(|p| p.distance(farmer) <= SHOT_RANGE_CELLS * CELL_SIZE)
    } else {
        None
    };

    PilotCommand {
        keys: DirectionKeys::toward(desired.normalize_or_zero()),
        fire_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entities::{Egg, EggKind};
    use crate::sim::testing::quiet_level;

    #[test]
    fn test_heads_for_nearest_egg() {
        let (mut state, _) = quiet_level(1);
        state.eggs.push(Egg {
            id: 1,
            pos: state.farmer.pos + Vec2::new(100.0, 0.0),
            kind: EggKind::Normal,
        });
        let cmd = pilot(&state);
        assert!(cmd.keys.right);
        assert!(!cmd.keys.left && !cmd.keys.up && !cmd.keys.down);
    }

    #[test]
    fn test_dodges_close_snake() {
        let (mut state, _) = quiet_level(2);
        state.eggs.push(Egg {
            id: 1,
            pos: state.farmer.pos + Vec2::new(150.0, 0.0),
            kind: EggKind::Normal,
        });
        state.snake.pos = state.farmer.pos + Vec2::new(30.0, 0.0);
        let cmd = pilot(&state);
        assert!(cmd.keys.left);
        assert!(!cmd.keys.right);
    }

    #[test]
    fn test_shoots_on_interval_only() {
        let (mut state, _) = quiet_level(3);
        state.snake.pos = state.farmer.pos + Vec2::new(90.0, 0.0);
        state.time_ticks = SHOT_INTERVAL_MS / SIM_TICK_MS;
        assert_eq!(pilot(&state).fire_at, Some(state.snake.pos));
        state.time_ticks += 1;
        assert_eq!(pilot(&state).fire_at, None);
    }

    #[test]
    fn test_ignores_distant_enemies() {
        let (mut state, _) = quiet_level(4);
        state.time_ticks = 0;
        state.snake.pos = state.farmer.pos + Vec2::new(300.0, 300.0);
        assert_eq!(pilot(&state).fire_at, None);
    }
}
