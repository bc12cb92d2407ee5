//! Spawning and difficulty scaling
//!
//! Level-indexed parameters, weighted rolls for egg and power-up types, egg
//! laying, and the deadline-driven arrivals and departures of power-ups, the
//! rooster, weasels and the respawning snake. A failed placement never
//! errors: the spawn is skipped and re-armed for a later attempt.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::entities::*;
use super::geometry::{Rect, heading};
use super::placement::{PlacementQuery, blocked_by_obstacle, find_valid_position, place_each};
use super::random_ms;
use super::schedule::take_due;
use super::state::{GameEvent, GameState};
use crate::consts::*;
use crate::tuning::{EggTable, PowerUpTable, Tuning};

/// Everything that scales with the level number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelParams {
    pub level: u32,
    pub board_cells: u32,
    pub eggs_needed: u32,
    pub snake_limit: u32,
    pub chickens: u32,
    pub obstacles: u32,
    pub lay_min_ms: u64,
    pub lay_max_ms: u64,
    pub enemy_speed_factor: f32,
    pub power_up_interval_ms: u64,
    /// `None` below the rooster's first level
    pub rooster_interval_ms: Option<u64>,
    /// `None` below the weasel's first level
    pub weasel_interval_ms: Option<u64>,
    pub egg_odds: EggTable<u32>,
}

impl LevelParams {
    pub fn for_level(tuning: &Tuning, level: u32) -> Self {
        let level = level.max(1);
        Self {
            level,
            board_cells: tuning.board_cells.at(level),
            eggs_needed: tuning.eggs.needed.at(level),
            snake_limit: tuning.snake.limit.at(level),
            chickens: tuning.chickens.count.at(level),
            obstacles: tuning.obstacles.at(level),
            lay_min_ms: tuning.chickens.lay_min.at(level),
            lay_max_ms: tuning.chickens.lay_max.at(level),
            enemy_speed_factor: tuning.enemy_speed_factor(level),
            power_up_interval_ms: tuning.power_ups.spawn.at(level),
            rooster_interval_ms: (level >= tuning.rooster.min_level)
                .then(|| tuning.rooster.spawn.at(level)),
            weasel_interval_ms: (level >= tuning.weasel.min_level)
                .then(|| tuning.weasel.spawn.at(level)),
            egg_odds: tuning.egg_odds(level),
        }
    }
}

/// Weighted roll over the egg types (odds are percentages)
pub fn roll_egg_kind<R: Rng>(rng: &mut R, odds: &EggTable<u32>) -> EggKind {
    let total = odds.normal + odds.golden + odds.special;
    if total == 0 {
        return EggKind::Normal;
    }
    let mut roll = rng.random_range(0..total);
    for kind in EggKind::ALL {
        let weight = odds.get(kind);
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    EggKind::Normal
}

/// Weighted roll over the power-up types; `None` if every weight is zero
pub fn roll_power_up<R: Rng>(rng: &mut R, weights: &PowerUpTable<u32>) -> Option<PowerUpKind> {
    let total: u32 = PowerUpKind::ALL.iter().map(|&k| weights.get(k)).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for kind in PowerUpKind::ALL {
        let weight = weights.get(kind);
        if roll < weight {
            return Some(kind);
        }
        roll -= weight;
    }
    None
}

fn lay_cooldown(state: &mut GameState, tuning: &Tuning) -> i64 {
    let level = state.level;
    random_ms(
        &mut state.rng,
        tuning.chickens.lay_min.at(level),
        tuning.chickens.lay_max.at(level),
    ) as i64
}

/// Place up to `count` chickens; `first_lay_ms` overrides the rolled first cooldown
///
/// Returns how many were placed.
pub fn place_chickens(
    state: &mut GameState,
    tuning: &Tuning,
    count: u32,
    first_lay_ms: Option<u64>,
) -> u32 {
    let query =
        PlacementQuery::new(EntityKind::Chicken, tuning.placement_attempts).avoiding_entities();
    let odds = tuning.egg_odds(state.level);
    let placed = place_each(state, count, |state| {
        let Some(pos) = find_valid_position(state, &query) else {
            return false;
        };
        let id = state.next_entity_id();
        let dir = heading(state.rng.random_range(0.0..TAU));
        let egg_cooldown_ms = match first_lay_ms {
            Some(ms) => ms as i64,
            None => lay_cooldown(state, tuning),
        };
        let next_egg = roll_egg_kind(&mut state.rng, &odds);
        state.chickens.push(Chicken {
            id,
            pos,
            dir,
            egg_cooldown_ms,
            next_egg,
        });
        true
    });
    if placed < count {
        log::warn!("Placed {} of {} chickens; board is crowded", placed, count);
    }
    placed
}

/// Whether an egg can be dropped at `pos`
fn egg_spot_free(state: &GameState, pos: Vec2) -> bool {
    let rect = Rect::centered(pos, EntityKind::Egg.size());
    state.board.contains(&rect)
        && !blocked_by_obstacle(&state.obstacles, &rect)
        && !rect.overlaps(&state.farmer.rect())
        && !(state.snake.is_active() && rect.overlaps(&state.snake.rect()))
        && !state.eggs.iter().any(|e| rect.overlaps(&e.rect()))
        && !state.power_ups.iter().any(|p| rect.overlaps(&p.rect()))
}

/// Count down each chicken's cooldown and lay its pre-rolled egg when due
///
/// A chicken whose spot is taken (or that hits the egg cap) keeps trying on
/// later steps.
pub fn update_egg_laying(state: &mut GameState, tuning: &Tuning) {
    let odds = tuning.egg_odds(state.level);
    for i in 0..state.chickens.len() {
        let chicken = &mut state.chickens[i];
        chicken.egg_cooldown_ms -= ENEMY_STEP_MS as i64;
        if chicken.egg_cooldown_ms > 0 || !chicken.has_valid_pos() {
            continue;
        }
        if state.eggs.len() >= tuning.eggs.max_on_board {
            continue;
        }
        let (pos, kind) = (chicken.pos, chicken.next_egg);
        if !egg_spot_free(state, pos) {
            continue;
        }

        let id = state.next_entity_id();
        state.eggs.push(Egg { id, pos, kind });
        let cooldown = lay_cooldown(state, tuning);
        let next_egg = roll_egg_kind(&mut state.rng, &odds);
        let chicken = &mut state.chickens[i];
        chicken.egg_cooldown_ms = cooldown;
        chicken.next_egg = next_egg;
        log::debug!("Chicken {} laid a {} egg", chicken.id, kind.as_str());
    }
}

/// Drop a random power-up unless the board already holds the maximum
pub fn spawn_power_up(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.power_ups.len() >= tuning.power_ups.max_on_board {
        return false;
    }
    let Some(kind) = roll_power_up(&mut state.rng, &tuning.power_ups.weights) else {
        return false;
    };
    let query =
        PlacementQuery::new(EntityKind::PowerUp, tuning.placement_attempts).avoiding_entities();
    let Some(pos) = find_valid_position(state, &query) else {
        log::debug!("No room for a {} power-up", kind.as_str());
        return false;
    };
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp { id, pos, kind });
    log::debug!("Spawned {} power-up at {:?}", kind.as_str(), pos);
    true
}

/// Bring the rooster in, away from the farmer
pub fn spawn_rooster(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.rooster.is_some() {
        return false;
    }
    let query = PlacementQuery::new(EntityKind::Rooster, tuning.spawn_attempts)
        .avoiding_entities()
        .keeping_away(
            vec![state.farmer.pos],
            tuning.rooster.clearance_cells * CELL_SIZE,
        );
    let Some(pos) = find_valid_position(state, &query) else {
        return false;
    };
    state.rooster = Some(Rooster {
        pos,
        gait: Gait::Moving,
        leave_at_ms: state.now_ms() + tuning.rooster.active_ms,
    });
    state.emit(GameEvent::RoosterArrived);
    log::debug!("Rooster arrived at {:?}", pos);
    true
}

/// Remove the rooster (timeout, hit or shot) and arm its next visit
pub fn dismiss_rooster(state: &mut GameState, tuning: &Tuning) {
    if state.rooster.take().is_none() {
        return;
    }
    state.emit(GameEvent::RoosterLeft);
    if state.level >= tuning.rooster.min_level {
        state.timers.rooster_spawn = Some(state.now_ms() + tuning.rooster.spawn.at(state.level));
    }
}

/// Bring a weasel in, away from every chicken
pub fn spawn_weasel(state: &mut GameState, tuning: &Tuning) -> bool {
    if state.weasels.len() >= tuning.weasel.max_active || state.chickens.is_empty() {
        return false;
    }
    let chickens: Vec<Vec2> = state.chickens.iter().map(|c| c.pos).collect();
    let query = PlacementQuery::new(EntityKind::Weasel, tuning.spawn_attempts)
        .avoiding_entities()
        .keeping_away(chickens, tuning.weasel.clearance_cells * CELL_SIZE);
    let Some(pos) = find_valid_position(state, &query) else {
        return false;
    };
    let id = state.next_entity_id();
    state.weasels.push(Weasel {
        id,
        pos,
        dir: Vec2::ZERO,
        target: None,
        gait: Gait::Moving,
        leave_at_ms: state.now_ms() + tuning.weasel.active_ms,
    });
    state.emit(GameEvent::WeaselArrived);
    log::debug!("Weasel {} arrived at {:?}", id, pos);
    true
}

/// Take the snake off the board for its respawn delay
pub fn begin_snake_respawn(state: &mut GameState, tuning: &Tuning) {
    state.snake.status = SnakeStatus::Respawning {
        at_ms: state.now_ms() + tuning.snake.respawn_delay_ms,
    };
}

/// Put the snake back, well away from the farmer, or in the far corner
pub fn respawn_snake(state: &mut GameState, tuning: &Tuning) {
    let query = PlacementQuery::new(EntityKind::Snake, tuning.spawn_attempts).keeping_away(
        vec![state.farmer.pos],
        tuning.snake.respawn_clearance_cells * CELL_SIZE,
    );
    let pos = find_valid_position(state, &query).unwrap_or_else(|| {
        let board = state.board;
        board.clamp_center(Vec2::new(board.width, board.height), EntityKind::Snake.size())
    });
    state.snake.pos = pos;
    state.snake.dir = Vec2::ZERO;
    state.snake.status = SnakeStatus::Active;
    state.emit(GameEvent::SnakeReturned);
}

/// Arm the level's spawn deadlines
pub fn arm_timers(state: &mut GameState, tuning: &Tuning) {
    let now = state.now_ms();
    let params = LevelParams::for_level(tuning, state.level);
    state.timers.clear();
    state.timers.power_up_spawn = Some(now + params.power_up_interval_ms);
    // The first rooster of a level shows up in half the usual time
    state.timers.rooster_spawn = params.rooster_interval_ms.map(|ms| now + ms / 2);
    state.timers.weasel_spawn = params.weasel_interval_ms.map(|ms| now + ms);
}

/// Fire whatever deadlines are due at the current tick
pub fn run_timers(state: &mut GameState, tuning: &Tuning) {
    let now = state.now_ms();
    let level = state.level;

    if take_due(&mut state.timers.power_up_spawn, now) {
        spawn_power_up(state, tuning);
        state.timers.power_up_spawn = Some(now + tuning.power_ups.spawn.at(level));
    }

    if state.rooster.as_ref().is_some_and(|r| now >= r.leave_at_ms) {
        log::debug!("Rooster left");
        dismiss_rooster(state, tuning);
    }
    if take_due(&mut state.timers.rooster_spawn, now)
        && !spawn_rooster(state, tuning)
        && state.rooster.is_none()
    {
        state.timers.rooster_spawn = Some(now + tuning.rooster.retry_ms);
    }

    let before = state.weasels.len();
    state.weasels.retain(|w| now < w.leave_at_ms);
    if state.weasels.len() < before {
        log::debug!("{} weasel(s) left", before - state.weasels.len());
    }
    if take_due(&mut state.timers.weasel_spawn, now) {
        let next = if spawn_weasel(state, tuning) {
            tuning.weasel.spawn.at(level)
        } else {
            tuning.weasel.retry_ms
        };
        state.timers.weasel_spawn = Some(now + next);
    }

    if let SnakeStatus::Respawning { at_ms } = state.snake.status {
        if now >= at_ms {
            respawn_snake(state, tuning);
        }
    }
}
