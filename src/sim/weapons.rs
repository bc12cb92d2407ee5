//! Farmer's gun
//!
//! Shots leave the farmer toward an aim point, fly straight, and are removed
//! on their first hit, when they leave the board, or when they expire.

use glam::Vec2;

use super::entities::*;
use super::geometry::{Rect, displacement, normalize};
use super::spawner::{begin_snake_respawn, dismiss_rooster};
use super::state::{GameEvent, GameState};
use crate::tuning::Tuning;

/// What a bullet struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Snake,
    Rooster,
    Weasel(usize),
}

/// Fire toward `aim` (board coordinates); returns whether a bullet was spawned
///
/// Aiming at the farmer's own center has no direction and fires nothing.
pub fn fire(state: &mut GameState, tuning: &Tuning, aim: Vec2) -> bool {
    if !state.is_active() || !state.farmer.has_valid_pos() {
        return false;
    }
    let origin = state.farmer.pos;
    let dir = normalize(aim.x - origin.x, aim.y - origin.y);
    if dir == Vec2::ZERO {
        return false;
    }

    let muzzle = EntityKind::Farmer.size().x * tuning.bullets.muzzle_offset;
    let pos = origin + dir * muzzle;
    if !state.board.contains(&Rect::centered(pos, EntityKind::Bullet.size())) {
        log::trace!("Shot at {:?} would start off the board", aim);
        return false;
    }

    let id = state.next_entity_id();
    state.bullets.push(Bullet {
        id,
        pos,
        dir,
        speed: tuning.bullets.speed,
        age_ms: 0,
    });
    state.emit(GameEvent::ShotFired);
    true
}

fn hit_test(state: &GameState, rect: &Rect) -> Option<Target> {
    if state.snake.is_active() && state.snake.rect().overlaps(rect) {
        return Some(Target::Snake);
    }
    if state.rooster.as_ref().is_some_and(|r| r.rect().overlaps(rect)) {
        return Some(Target::Rooster);
    }
    state
        .weasels
        .iter()
        .position(|w| w.has_valid_pos() && w.rect().overlaps(rect))
        .map(Target::Weasel)
}

/// Advance every bullet by `elapsed_ms` and resolve hits
pub fn update_bullets(state: &mut GameState, tuning: &Tuning, elapsed_ms: u64) {
    let mut i = 0;
    while i < state.bullets.len() {
        let bullet = &mut state.bullets[i];
        bullet.pos += bullet.dir * displacement(bullet.speed, elapsed_ms);
        bullet.age_ms += elapsed_ms;

        let rect = bullet.rect();
        let expired = bullet.age_ms > tuning.bullets.max_age_ms;
        if expired || !bullet.has_valid_pos() || !state.board.contains(&rect) {
            state.bullets.remove(i);
            continue;
        }

        match hit_test(state, &rect) {
            Some(target) => {
                state.bullets.remove(i);
                shoot_down(state, tuning, target);
            }
            None => i += 1,
        }
    }
}

fn shoot_down(state: &mut GameState, tuning: &Tuning, target: Target) {
    let enemy = match target {
        Target::Snake => {
            begin_snake_respawn(state, tuning);
            EnemyKind::Snake
        }
        Target::Rooster => {
            dismiss_rooster(state, tuning);
            EnemyKind::Rooster
        }
        Target::Weasel(index) => {
            state.weasels.remove(index);
            EnemyKind::Weasel
        }
    };
    let points = tuning.bullets.points.get(enemy);
    state.level_score += u64::from(points);
    state.total_score += u64::from(points);
    state.emit(GameEvent::EnemyHit { enemy, points });
    log::debug!("Shot the {:?} for {} points", enemy, points);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::testing::quiet_level;

    #[test]
    fn test_fire_spawns_ahead_of_farmer() {
        let (mut state, tuning) = quiet_level(1);
        let farmer = state.farmer.pos;
        assert!(fire(&mut state, &tuning, farmer + Vec2::new(200.0, 0.0)));
        let bullet = &state.bullets[0];
        assert_eq!(bullet.dir, Vec2::X);
        assert!((bullet.pos.x - (farmer.x + 0.6 * 27.0)).abs() < 1e-3);
        assert_eq!(state.events, vec![GameEvent::ShotFired]);
    }

    #[test]
    fn test_zero_length_aim_does_nothing() {
        let (mut state, tuning) = quiet_level(1);
        let farmer = state.farmer.pos;
        assert!(!fire(&mut state, &tuning, farmer));
        assert!(state.bullets.is_empty());
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_no_fire_outside_active_level() {
        let (mut state, tuning) = quiet_level(1);
        state.phase = crate::sim::GamePhase::LevelComplete;
        assert!(!fire(&mut state, &tuning, Vec2::ZERO));
    }

    #[test]
    fn test_bullet_leaves_board() {
        let (mut state, tuning) = quiet_level(2);
        state.farmer.pos = Vec2::new(30.0, 100.0);
        assert!(fire(&mut state, &tuning, Vec2::new(0.0, 100.0)));
        update_bullets(&mut state, &tuning, BULLET_STEP_MS);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_bullet_expires() {
        let (mut state, mut tuning) = quiet_level(3);
        tuning.bullets.speed = 1.0;
        assert!(fire(&mut state, &tuning, Vec2::new(300.0, 100.0)));
        for _ in 0..40 {
            update_bullets(&mut state, &tuning, BULLET_STEP_MS);
        }
        assert_eq!(state.bullets.len(), 1);
        update_bullets(&mut state, &tuning, BULLET_STEP_MS);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_shooting_snake_sends_it_away() {
        let (mut state, tuning) = quiet_level(4);
        let snake = state.farmer.pos + Vec2::new(40.0, 0.0);
        state.snake.pos = snake;
        assert!(fire(&mut state, &tuning, snake));
        update_bullets(&mut state, &tuning, BULLET_STEP_MS);
        assert!(state.bullets.is_empty());
        assert!(!state.snake.is_active());
        assert_eq!(state.level_score, 5);
        assert_eq!(state.total_score, 5);
        assert!(state.events.contains(&GameEvent::EnemyHit {
            enemy: EnemyKind::Snake,
            points: 5,
        }));
    }

    #[test]
    fn test_one_hit_per_bullet() {
        let (mut state, tuning) = quiet_level(5);
        let ahead = state.farmer.pos + Vec2::new(45.0, 0.0);
        state.rooster = Some(Rooster {
            pos: ahead,
            gait: Gait::Moving,
            leave_at_ms: 60_000,
        });
        state.weasels.push(Weasel {
            id: 9,
            pos: ahead,
            dir: Vec2::ZERO,
            target: None,
            gait: Gait::Moving,
            leave_at_ms: 60_000,
        });
        assert!(fire(&mut state, &tuning, ahead));
        update_bullets(&mut state, &tuning, BULLET_STEP_MS);
        // The rooster is checked before weasels
        assert!(state.rooster.is_none());
        assert_eq!(state.weasels.len(), 1);
        assert_eq!(state.total_score, 8);
    }
}
