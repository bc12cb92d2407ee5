//! Movement and steering
//!
//! Three primitives cover every creature: seek a point, wander with wall
//! bounce, and the farmer's key-driven step with per-axis sliding. The AI
//! passes pick a [`Steer`] for each creature and the dispatch applies it.
//! All distances come from [`displacement`] so speeds are per second no
//! matter which cadence drives the step.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, TAU};

use super::entities::{Egg, EntityKind, Gait, Hitbox, Obstacle, PowerUpKind, Snake, SnakeStatus};
use super::geometry::{Board, Rect, displacement, heading, normalize};
use super::placement::blocked_by_obstacle;
use super::state::GameState;
use super::{chance, random_ms};
use crate::consts::*;
use crate::tuning::Tuning;

/// Arrow / WASD direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Held direction keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionKeys {
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }

    /// Unit heading for the held keys (opposites cancel; diagonals normalized)
    pub fn heading(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        normalize(axis(self.left, self.right), axis(self.up, self.down))
    }

    /// Keys that best approximate a desired heading
    pub fn toward(dir: Vec2) -> Self {
        const DEADZONE: f32 = 0.38;
        Self {
            up: dir.y < -DEADZONE,
            down: dir.y > DEADZONE,
            left: dir.x < -DEADZONE,
            right: dir.x > DEADZONE,
        }
    }
}

/// How a seeker reacts when its step would land on an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleResponse {
    /// Walk through
    Ignore,
    /// Stay put
    Block,
    /// Try the other compass directions, closest to the desired heading first
    Probe,
}

/// What a creature wants to do this step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steer {
    Seek(Vec2),
    Wander { speed_factor: f32 },
    Hold,
}

/// Step from `pos` toward `target`, never overshooting, clamped to the board
#[allow(clippy::too_many_arguments)]
pub fn move_towards(
    pos: Vec2,
    size: Vec2,
    target: Vec2,
    speed: f32,
    interval_ms: u64,
    board: &Board,
    obstacles: &[Obstacle],
    response: ObstacleResponse,
) -> Vec2 {
    let delta = target - pos;
    let dist = delta.length();
    if dist < 1.0 {
        return pos;
    }
    let step = displacement(speed, interval_ms).min(dist);
    let dir = delta / dist;
    let next = board.clamp_center(pos + dir * step, size);

    let blocked = |p: Vec2| blocked_by_obstacle(obstacles, &Rect::centered(p, size));
    match response {
        ObstacleResponse::Ignore => next,
        _ if !blocked(next) => next,
        ObstacleResponse::Block => pos,
        ObstacleResponse::Probe => {
            let base = dir.y.atan2(dir.x);
            for k in [1.0, -1.0, 2.0, -2.0, 3.0, -3.0, 4.0] {
                let probe = board.clamp_center(pos + heading(base + k * FRAC_PI_4) * step, size);
                if !blocked(probe) {
                    return probe;
                }
            }
            pos
        }
    }
}

/// Wander along a persistent heading, bouncing off walls and obstacles
#[allow(clippy::too_many_arguments)]
pub fn move_randomly<R: Rng>(
    pos: &mut Vec2,
    dir: &mut Vec2,
    size: Vec2,
    speed: f32,
    interval_ms: u64,
    board: &Board,
    obstacles: &[Obstacle],
    turn_chance: f64,
    rng: &mut R,
) {
    if *dir == Vec2::ZERO || chance(rng, turn_chance) {
        *dir = heading(rng.random_range(0.0..TAU));
    }
    let step = displacement(speed, interval_ms);
    let half = size * 0.5;

    let next = *pos + *dir * step;
    if next.x - half.x < 0.0 || next.x + half.x > board.width {
        dir.x = -dir.x;
    }
    if next.y - half.y < 0.0 || next.y + half.y > board.height {
        dir.y = -dir.y;
    }

    let blocked = |p: Vec2| blocked_by_obstacle(obstacles, &Rect::centered(p, size));
    let next = board.clamp_center(*pos + *dir * step, size);
    if !blocked(next) {
        *pos = next;
        return;
    }

    *dir = -*dir;
    let back = board.clamp_center(*pos + *dir * step, size);
    if !blocked(back) {
        *pos = back;
    }
}

/// One farmer step: full move, else slide along X, else along Y, else stay
pub fn farmer_step(
    pos: Vec2,
    keys: &DirectionKeys,
    speed: f32,
    interval_ms: u64,
    board: &Board,
    obstacles: &[Obstacle],
) -> Vec2 {
    let dir = keys.heading();
    if dir == Vec2::ZERO {
        return pos;
    }
    let size = EntityKind::Farmer.size();
    let step = displacement(speed, interval_ms);
    let target = board.clamp_center(pos + dir * step, size);

    let blocked = |p: Vec2| blocked_by_obstacle(obstacles, &Rect::centered(p, size));
    [
        target,
        Vec2::new(target.x, pos.y),
        Vec2::new(pos.x, target.y),
    ]
    .into_iter()
    .find(|&p| !blocked(p))
    .unwrap_or(pos)
}

fn seek_response(tuning: &Tuning) -> ObstacleResponse {
    if tuning.probe_around_obstacles {
        ObstacleResponse::Probe
    } else {
        ObstacleResponse::Block
    }
}

/// Farmer movement pass
pub fn update_farmer(state: &mut GameState, tuning: &Tuning, keys: &DirectionKeys) {
    if !state.farmer.has_valid_pos() {
        log::warn!("Farmer has invalid position {:?}; skipping move", state.farmer.pos);
        return;
    }
    let mut speed = tuning.farmer_speed;
    if state.power_up_active(PowerUpKind::Speed) {
        speed *= tuning.power_ups.speed_multiplier;
    }
    state.farmer.pos = farmer_step(
        state.farmer.pos,
        keys,
        speed,
        FARMER_STEP_MS,
        &state.board,
        &state.obstacles,
    );
}

/// Snake target: nearest egg (usually) or the farmer
pub fn snake_steer<R: Rng>(
    snake: &Snake,
    farmer: Vec2,
    eggs: &[Egg],
    tuning: &Tuning,
    rng: &mut R,
) -> Steer {
    if !snake.is_active() {
        return Steer::Hold;
    }
    let here = snake.pos;
    let nearest_egg = eggs
        .iter()
        .filter(|e| e.has_valid_pos())
        .min_by(|a, b| a.pos.distance(here).total_cmp(&b.pos.distance(here)));

    match nearest_egg {
        Some(egg) if chance(rng, tuning.snake.egg_bias) => Steer::Seek(egg.pos),
        Some(_) => Steer::Seek(farmer),
        None => match tuning.snake.chase_radius {
            Some(radius) if farmer.distance(here) > radius => Steer::Wander { speed_factor: 1.0 },
            _ => Steer::Seek(farmer),
        },
    }
}

/// Snake movement pass
pub fn update_snake(state: &mut GameState, tuning: &Tuning) {
    if let SnakeStatus::Respawning { .. } = state.snake.status {
        return;
    }
    if !state.snake.has_valid_pos() {
        log::warn!("Snake has invalid position {:?}; skipping move", state.snake.pos);
        return;
    }
    let mut speed = tuning.snake.speed * tuning.enemy_speed_factor(state.level);
    if state.power_up_active(PowerUpKind::Freeze) {
        speed *= tuning.power_ups.freeze_snake_factor;
    }

    let GameState {
        snake,
        farmer,
        eggs,
        board,
        obstacles,
        rng,
        ..
    } = state;
    let size = snake.size();
    match snake_steer(snake, farmer.pos, eggs, tuning, rng) {
        Steer::Seek(target) => {
            snake.pos = move_towards(
                snake.pos,
                size,
                target,
                speed,
                ENEMY_STEP_MS,
                board,
                obstacles,
                seek_response(tuning),
            );
        }
        Steer::Wander { speed_factor } => move_randomly(
            &mut snake.pos,
            &mut snake.dir,
            size,
            speed * speed_factor,
            ENEMY_STEP_MS,
            board,
            obstacles,
            tuning.wander_turn_chance,
            rng,
        ),
        Steer::Hold => {}
    }
}

/// Roll a rest period; returns the new gait if the creature decides to stop
fn maybe_rest<R: Rng>(rng: &mut R, now_ms: u64, rest_chance: f64, min_ms: u64, max_ms: u64) -> Option<Gait> {
    chance(rng, rest_chance).then(|| Gait::Resting {
        until_ms: now_ms + random_ms(rng, min_ms, max_ms),
    })
}

fn jittered<R: Rng>(rng: &mut R, target: Vec2, jitter_chance: f64, jitter_px: f32) -> Vec2 {
    if jitter_px > 0.0 && chance(rng, jitter_chance) {
        target
            + Vec2::new(
                rng.random_range(-jitter_px..=jitter_px),
                rng.random_range(-jitter_px..=jitter_px),
            )
    } else {
        target
    }
}

/// Rooster movement pass: rest now and then, otherwise charge the farmer
pub fn update_rooster(state: &mut GameState, tuning: &Tuning) {
    let now = state.now_ms();
    let GameState {
        rooster,
        farmer,
        board,
        obstacles,
        rng,
        level,
        ..
    } = state;
    let Some(rooster) = rooster.as_mut() else {
        return;
    };
    if !rooster.has_valid_pos() {
        log::warn!("Rooster has invalid position {:?}; skipping move", rooster.pos);
        return;
    }
    if rooster.gait.is_resting(now) {
        return;
    }
    let rt = &tuning.rooster;
    if let Some(rest) = maybe_rest(rng, now, rt.rest_chance, rt.rest_min_ms, rt.rest_max_ms) {
        rooster.gait = rest;
        return;
    }
    rooster.gait = Gait::Moving;

    let target = jittered(rng, farmer.pos, rt.jitter_chance, rt.jitter_px);
    let speed = rt.speed * tuning.enemy_speed_factor(*level);
    rooster.pos = move_towards(
        rooster.pos,
        rooster.size(),
        target,
        speed,
        ENEMY_STEP_MS,
        board,
        obstacles,
        seek_response(tuning),
    );
}

/// Weasel movement pass: hunt the nearest chicken, wander if there are none
pub fn update_weasels(state: &mut GameState, tuning: &Tuning) {
    let now = state.now_ms();
    let GameState {
        weasels,
        chickens,
        board,
        obstacles,
        rng,
        level,
        ..
    } = state;
    let wt = &tuning.weasel;
    let speed = wt.speed * tuning.enemy_speed_factor(*level);

    for weasel in weasels.iter_mut() {
        if !weasel.has_valid_pos() {
            log::warn!("Weasel {} has invalid position; skipping move", weasel.id);
            continue;
        }
        if weasel.gait.is_resting(now) {
            continue;
        }
        if let Some(rest) = maybe_rest(rng, now, wt.rest_chance, wt.rest_min_ms, wt.rest_max_ms) {
            weasel.gait = rest;
            continue;
        }
        weasel.gait = Gait::Moving;

        let here = weasel.pos;
        let prey = chickens
            .iter()
            .filter(|c| c.has_valid_pos())
            .min_by(|a, b| a.pos.distance(here).total_cmp(&b.pos.distance(here)));

        let steer = match prey {
            Some(chicken) => {
                weasel.target = Some(chicken.id);
                Steer::Seek(jittered(rng, chicken.pos, wt.jitter_chance, wt.jitter_px))
            }
            None => {
                weasel.target = None;
                Steer::Wander { speed_factor: 0.5 }
            }
        };

        let size = weasel.size();
        match steer {
            Steer::Seek(target) => {
                weasel.pos = move_towards(
                    weasel.pos,
                    size,
                    target,
                    speed,
                    ENEMY_STEP_MS,
                    board,
                    obstacles,
                    seek_response(tuning),
                );
            }
            Steer::Wander { speed_factor } => move_randomly(
                &mut weasel.pos,
                &mut weasel.dir,
                size,
                speed * speed_factor,
                ENEMY_STEP_MS,
                board,
                obstacles,
                tuning.wander_turn_chance,
                rng,
            ),
            Steer::Hold => {}
        }
    }
}

/// Chicken movement pass (egg laying is handled by the spawner)
pub fn update_chickens(state: &mut GameState, tuning: &Tuning) {
    let GameState {
        chickens,
        board,
        obstacles,
        rng,
        ..
    } = state;
    for chicken in chickens.iter_mut() {
        if !chicken.has_valid_pos() {
            log::warn!("Chicken {} has invalid position; skipping move", chicken.id);
            continue;
        }
        let size = chicken.size();
        move_randomly(
            &mut chicken.pos,
            &mut chicken.dir,
            size,
            tuning.chickens.speed,
            ENEMY_STEP_MS,
            board,
            obstacles,
            tuning.wander_turn_chance,
            rng,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn board() -> Board {
        Board::new(540.0, 540.0)
    }

    fn keys(up: bool, down: bool, left: bool, right: bool) -> DirectionKeys {
        DirectionKeys {
            up,
            down,
            left,
            right,
        }
    }

    #[test]
    fn test_diagonal_speed_equals_axial() {
        let b = board();
        let start = Vec2::new(200.0, 200.0);
        let axial = farmer_step(start, &keys(false, false, false, true), 120.0, 50, &b, &[]);
        let diagonal = farmer_step(start, &keys(false, true, false, true), 120.0, 50, &b, &[]);
        assert!((axial.distance(start) - 6.0).abs() < 1e-4);
        assert!((diagonal.distance(start) - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        assert_eq!(keys(true, true, false, false).heading(), Vec2::ZERO);
        let b = board();
        let start = Vec2::new(100.0, 100.0);
        assert_eq!(
            farmer_step(start, &keys(false, false, true, true), 120.0, 50, &b, &[]),
            start
        );
    }

    #[test]
    fn test_farmer_slides_along_obstacle() {
        let b = board();
        // Obstacle directly to the right; moving down-right should slide down
        let obstacle = Obstacle {
            pos: Vec2::new(230.0, 200.0),
        };
        let start = Vec2::new(200.0, 200.0);
        let next = farmer_step(start, &keys(false, true, false, true), 120.0, 50, &b, &[obstacle]);
        assert_eq!(next.x, start.x);
        assert!(next.y > start.y);
    }

    #[test]
    fn test_farmer_blocked_head_on() {
        let b = board();
        let obstacle = Obstacle {
            pos: Vec2::new(229.0, 200.0),
        };
        let start = Vec2::new(200.0, 200.0);
        let next = farmer_step(start, &keys(false, false, false, true), 120.0, 50, &b, &[obstacle]);
        assert_eq!(next, start);
    }

    #[test]
    fn test_farmer_clamped_to_board() {
        let b = board();
        let size = EntityKind::Farmer.size();
        let start = b.clamp_center(Vec2::ZERO, size);
        let next = farmer_step(start, &keys(true, false, true, false), 120.0, 50, &b, &[]);
        assert!(b.contains(&Rect::centered(next, size)));
    }

    #[test]
    fn test_move_towards_does_not_overshoot() {
        let b = board();
        let size = EntityKind::Snake.size();
        let pos = Vec2::new(100.0, 100.0);
        let target = Vec2::new(103.0, 100.0);
        let next = move_towards(pos, size, target, 80.0, 75, &b, &[], ObstacleResponse::Ignore);
        assert!((next.x - 103.0).abs() < 1e-4);
        assert_eq!(
            move_towards(target, size, target, 80.0, 75, &b, &[], ObstacleResponse::Ignore),
            target
        );
    }

    #[test]
    fn test_move_towards_block_vs_probe() {
        let b = board();
        let size = EntityKind::Snake.size();
        let pos = Vec2::new(100.0, 100.0);
        let target = Vec2::new(300.0, 100.0);
        let wall = Obstacle {
            pos: Vec2::new(128.0, 100.0),
        };
        let blocked = move_towards(pos, size, target, 80.0, 75, &b, &[wall.clone()], ObstacleResponse::Block);
        assert_eq!(blocked, pos);

        let probed = move_towards(pos, size, target, 80.0, 75, &b, &[wall.clone()], ObstacleResponse::Probe);
        assert_ne!(probed, pos);
        assert!(!blocked_by_obstacle(&[wall], &Rect::centered(probed, size)));
    }

    #[test]
    fn test_wander_bounces_off_wall() {
        let b = board();
        let size = EntityKind::Chicken.size();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut pos = Vec2::new(b.width - size.x * 0.5, 200.0);
        let mut dir = Vec2::X;
        move_randomly(&mut pos, &mut dir, size, 60.0, 75, &b, &[], 0.0, &mut rng);
        assert_eq!(dir, Vec2::NEG_X);
        assert!(pos.x < b.width - size.x * 0.5);
        assert!(b.contains(&Rect::centered(pos, size)));
    }

    #[test]
    fn test_wander_picks_heading_when_still() {
        let b = board();
        let size = EntityKind::Chicken.size();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut pos = Vec2::new(270.0, 270.0);
        let mut dir = Vec2::ZERO;
        move_randomly(&mut pos, &mut dir, size, 60.0, 75, &b, &[], 0.0, &mut rng);
        assert!((dir.length() - 1.0).abs() < 1e-4);
        assert_ne!(pos, Vec2::new(270.0, 270.0));
    }

    #[test]
    fn test_keys_toward() {
        let k = DirectionKeys::toward(Vec2::new(0.7, -0.7));
        assert!(k.right && k.up && !k.left && !k.down);
        assert_eq!(DirectionKeys::toward(Vec2::ZERO), DirectionKeys::default());
    }
}
