//! Collision resolution
//!
//! Runs on the collision cadence in a fixed order: farmer/egg, farmer/power-up,
//! snake/egg, farmer/snake, farmer/rooster, weasel/chicken. Any step may end
//! the level; once the phase leaves `LevelActive` nothing further is resolved
//! this pass. Bullets are handled separately in [`super::weapons`].

use glam::Vec2;

use super::entities::*;
use super::geometry::displacement;
use super::level::{complete_level, lose_life};
use super::spawner::dismiss_rooster;
use super::state::{ActivePowerUp, GameEvent, GameState, LifeLossCause};
use crate::consts::*;
use crate::tuning::Tuning;

/// Resolve one collision pass
pub fn resolve_collisions(state: &mut GameState, tuning: &Tuning) {
    if !state.is_active() {
        return;
    }
    if !state.farmer.has_valid_pos() {
        log::warn!("Farmer has invalid position {:?}; skipping collisions", state.farmer.pos);
        return;
    }

    let steps: [fn(&mut GameState, &Tuning); 6] = [
        collect_eggs,
        collect_power_ups,
        snake_eats_eggs,
        snake_meets_farmer,
        rooster_meets_farmer,
        weasels_eat_chickens,
    ];
    for step in steps {
        step(state, tuning);
        if !state.is_active() {
            return;
        }
    }
}

/// Drag nearby eggs toward the farmer while the magnet is active
fn magnet_pull(state: &mut GameState, tuning: &Tuning) {
    let cfg = &tuning.power_ups;
    let farmer = state.farmer.pos;
    let radius = cfg.magnet_pull_cells * CELL_SIZE;
    let step = displacement(cfg.magnet_pull_speed, COLLISION_STEP_MS);
    let board = state.board;
    for egg in state.eggs.iter_mut().filter(|e| e.has_valid_pos()) {
        let offset = farmer - egg.pos;
        let dist = offset.length();
        if dist > radius || dist < 1.0 {
            continue;
        }
        let moved = egg.pos + offset / dist * step.min(dist);
        egg.pos = board.clamp_center(moved, EntityKind::Egg.size());
    }
}

fn collect_eggs(state: &mut GameState, tuning: &Tuning) {
    let magnet = state.power_up_active(PowerUpKind::Magnet);
    if magnet {
        magnet_pull(state, tuning);
    }
    let farmer_rect = state.farmer.rect();
    let farmer_pos = state.farmer.pos;
    let reach = tuning.power_ups.magnet_reach * EntityKind::Farmer.size().x;

    let mut i = 0;
    while i < state.eggs.len() {
        let egg = &state.eggs[i];
        let touched = egg.has_valid_pos()
            && (egg.rect().overlaps(&farmer_rect)
                || (magnet && egg.pos.distance(farmer_pos) <= reach));
        if !touched {
            i += 1;
            continue;
        }
        let egg = state.eggs.remove(i);
        score_egg(state, tuning, egg.kind);
        if !state.is_active() {
            return;
        }
    }
}

/// Award an egg with the combo bonus; completes the level at the quota
pub fn score_egg(state: &mut GameState, tuning: &Tuning, kind: EggKind) {
    let now = state.now_ms();
    state.combo = match state.last_collect_ms {
        Some(last) if now.saturating_sub(last) <= tuning.combo.window_ms => state.combo + 1,
        _ => 1,
    };
    state.last_collect_ms = Some(now);

    let bonus = state.combo.saturating_sub(1).min(tuning.combo.max_bonus);
    let points = tuning.eggs.values.get(kind) + bonus;
    state.level_score += u64::from(points);
    state.total_score += u64::from(points);
    state.eggs_collected += 1;
    state.emit(GameEvent::EggCollected {
        kind,
        points,
        combo: state.combo,
    });

    if state.eggs_collected >= state.eggs_needed {
        complete_level(state, tuning);
    }
}

/// Every touched power-up is picked up in id order; the last one stays active
fn collect_power_ups(state: &mut GameState, tuning: &Tuning) {
    let farmer_rect = state.farmer.rect();
    let (picked, left): (Vec<PowerUp>, Vec<PowerUp>) = std::mem::take(&mut state.power_ups)
        .into_iter()
        .partition(|p| p.has_valid_pos() && p.rect().overlaps(&farmer_rect));
    state.power_ups = left;
    for power_up in picked {
        activate_power_up(state, tuning, power_up.kind);
    }
}

/// Replace whatever is active with a fresh `kind`
pub fn activate_power_up(state: &mut GameState, tuning: &Tuning, kind: PowerUpKind) {
    state.power_up = Some(ActivePowerUp {
        kind,
        remaining_ms: tuning.power_ups.durations_ms.get(kind),
    });
    state.emit(GameEvent::PowerUpCollected(kind));
    log::debug!("{} power-up active", kind.as_str());
}

fn snake_eats_eggs(state: &mut GameState, tuning: &Tuning) {
    if !state.snake.is_active() || !state.snake.has_valid_pos() {
        return;
    }
    let snake_rect = state.snake.rect();
    let mut i = 0;
    while i < state.eggs.len() {
        let egg = &state.eggs[i];
        if !egg.has_valid_pos() || !egg.rect().overlaps(&snake_rect) {
            i += 1;
            continue;
        }
        state.eggs.remove(i);
        state.snake_score += 1;
        state.emit(GameEvent::SnakeAteEgg {
            eaten: state.snake_score,
            limit: state.snake_limit,
        });
        if state.snake_score >= state.snake_limit {
            // Positions reset, so the snake is no longer where it was
            lose_life(state, tuning, LifeLossCause::SnakeAteTooMany);
            return;
        }
    }
}

/// Shield absorbs the hit and grants a short grace; otherwise a life is lost
fn enemy_contact(state: &mut GameState, tuning: &Tuning, cause: LifeLossCause) {
    if state.power_up_active(PowerUpKind::Shield) {
        state.power_up = None;
        state.farmer.grace_until_ms = state.now_ms() + tuning.power_ups.shield_grace_ms;
        state.emit(GameEvent::ShieldAbsorbed);
        log::debug!("Shield absorbed: {}", cause.describe());
    } else {
        lose_life(state, tuning, cause);
    }
}

fn snake_meets_farmer(state: &mut GameState, tuning: &Tuning) {
    let snake = &state.snake;
    if !snake.is_active() || !snake.has_valid_pos() || state.farmer.is_protected(state.now_ms()) {
        return;
    }
    if snake.overlaps(&state.farmer) {
        enemy_contact(state, tuning, LifeLossCause::SnakeBite);
    }
}

fn rooster_meets_farmer(state: &mut GameState, tuning: &Tuning) {
    let hit = state
        .rooster
        .as_ref()
        .is_some_and(|r| r.has_valid_pos() && r.overlaps(&state.farmer));
    if !hit || state.farmer.is_protected(state.now_ms()) {
        return;
    }
    dismiss_rooster(state, tuning);
    enemy_contact(state, tuning, LifeLossCause::RoosterAttack);
}

fn weasels_eat_chickens(state: &mut GameState, tuning: &Tuning) {
    let mut wi = 0;
    while wi < state.weasels.len() {
        let weasel = &state.weasels[wi];
        if !weasel.has_valid_pos() {
            wi += 1;
            continue;
        }
        let weasel_rect = weasel.rect();
        let Some(ci) = state
            .chickens
            .iter()
            .position(|c| c.has_valid_pos() && c.rect().overlaps(&weasel_rect))
        else {
            wi += 1;
            continue;
        };

        // A weasel leaves with its catch
        state.chickens.remove(ci);
        let weasel = state.weasels.remove(wi);
        state.chickens_eaten += 1;
        state.emit(GameEvent::ChickenEaten {
            remaining: state.chickens.len(),
        });
        log::debug!(
            "Weasel {} ate a chicken ({}/{})",
            weasel.id,
            state.chickens_eaten,
            state.chicken_limit
        );

        if state.chickens_eaten >= state.chicken_limit {
            lose_life(state, tuning, LifeLossCause::WeaselsAteTooMany);
            return;
        }
        if state.chickens.is_empty() {
            lose_life(state, tuning, LifeLossCause::AllChickensEaten);
            return;
        }
    }
}

/// Center of the nearest egg to `pos`, if any
pub fn nearest_egg(eggs: &[Egg], pos: Vec2) -> Option<Vec2> {
    eggs.iter()
        .filter(|e| e.has_valid_pos())
        .map(|e| e.pos)
        .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GamePhase;
    use crate::sim::testing::quiet_level;

    fn drop_egg(state: &mut GameState, pos: Vec2, kind: EggKind) {
        let id = state.next_entity_id();
        state.eggs.push(Egg { id, pos, kind });
    }

    fn at_ms(state: &mut GameState, ms: u64) {
        state.time_ticks = ms / SIM_TICK_MS;
    }

    #[test]
    fn test_five_spaced_eggs_complete_level() {
        let (mut state, tuning) = quiet_level(1);
        let farmer = state.farmer.pos;
        for k in 0..5 {
            at_ms(&mut state, k * 2500);
            drop_egg(&mut state, farmer, EggKind::Normal);
            resolve_collisions(&mut state, &tuning);
            if k < 4 {
                assert!(state.is_active());
            }
        }
        assert_eq!(state.level_score, 5);
        assert_eq!(state.eggs_collected, 5);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert!(state.timers.is_idle());
        assert!(state.events.contains(&GameEvent::LevelComplete { level: 1 }));
    }

    #[test]
    fn test_combo_window() {
        let (mut state, tuning) = quiet_level(2);
        let farmer = state.farmer.pos;
        let mut combos = Vec::new();
        for ms in [0, 500, 3000] {
            at_ms(&mut state, ms);
            drop_egg(&mut state, farmer, EggKind::Normal);
            resolve_collisions(&mut state, &tuning);
            combos.push(state.combo);
        }
        assert_eq!(combos, vec![1, 2, 1]);
        // 1 + (1 + 1 bonus) + 1
        assert_eq!(state.level_score, 4);
    }

    #[test]
    fn test_combo_bonus_caps() {
        let (mut state, mut tuning) = quiet_level(2);
        tuning.combo.max_bonus = 2;
        state.eggs_needed = 100;
        let farmer = state.farmer.pos;
        let mut last_points = 0;
        for k in 0..6 {
            at_ms(&mut state, k * 100);
            drop_egg(&mut state, farmer, EggKind::Golden);
            resolve_collisions(&mut state, &tuning);
            if let Some(GameEvent::EggCollected { points, .. }) = state.events.last() {
                last_points = *points;
            }
        }
        assert_eq!(state.combo, 6);
        assert_eq!(last_points, 3 + 2);
    }

    #[test]
    fn test_egg_collected_once() {
        let (mut state, tuning) = quiet_level(3);
        let farmer = state.farmer.pos;
        drop_egg(&mut state, farmer, EggKind::Special);
        resolve_collisions(&mut state, &tuning);
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.eggs_collected, 1);
        assert_eq!(state.level_score, 5);
        assert!(state.eggs.is_empty());
    }

    #[test]
    fn test_snake_limit_costs_a_life() {
        let (mut state, tuning) = quiet_level(4);
        let snake = state.snake.pos;
        for _ in 0..5 {
            drop_egg(&mut state, snake, EggKind::Normal);
            resolve_collisions(&mut state, &tuning);
        }
        assert_eq!(state.lives, 2);
        assert_eq!(state.snake_score, 0);
        assert_eq!(state.phase, GamePhase::LevelActive);
    }

    #[test]
    fn test_snake_bite_on_last_life() {
        let (mut state, tuning) = quiet_level(5);
        state.lives = 1;
        state.snake.pos = state.farmer.pos + Vec2::new(10.0, 0.0);
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.timers.is_idle());
    }

    #[test]
    fn test_snake_limit_on_last_life_ends_game() {
        let (mut state, tuning) = quiet_level(4);
        state.lives = 1;
        let snake = state.snake.pos;
        for _ in 0..state.snake_limit {
            drop_egg(&mut state, snake, EggKind::Normal);
            resolve_collisions(&mut state, &tuning);
        }
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.timers.is_idle());
        assert!(state.events.contains(&GameEvent::GameOver {
            cause: LifeLossCause::SnakeAteTooMany
        }));
    }

    #[test]
    fn test_shield_absorbs_rooster() {
        let (mut state, tuning) = quiet_level(6);
        activate_power_up(&mut state, &tuning, PowerUpKind::Shield);
        state.rooster = Some(Rooster {
            pos: state.farmer.pos,
            gait: Gait::Moving,
            leave_at_ms: 60_000,
        });
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 3);
        assert!(state.rooster.is_none());
        assert_eq!(state.power_up, None);
        assert!(state.farmer.is_protected(state.now_ms()));
        assert!(state.events.contains(&GameEvent::ShieldAbsorbed));
    }

    #[test]
    fn test_grace_ignores_snake() {
        let (mut state, tuning) = quiet_level(6);
        state.farmer.grace_until_ms = 1000;
        state.snake.pos = state.farmer.pos;
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 3);
        at_ms(&mut state, 1000);
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_rooster_attack_without_shield() {
        let (mut state, tuning) = quiet_level(7);
        state.rooster = Some(Rooster {
            pos: state.farmer.pos,
            gait: Gait::Moving,
            leave_at_ms: 60_000,
        });
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 2);
        assert!(state.rooster.is_none());
    }

    #[test]
    fn test_weasel_limit() {
        let (mut state, tuning) = quiet_level(8);
        state.chickens_eaten = 2;
        let spot = Vec2::new(300.0, 150.0);
        for (id, pos) in [(50, spot), (51, Vec2::new(450.0, 100.0))] {
            state.chickens.push(Chicken {
                id,
                pos,
                dir: Vec2::X,
                egg_cooldown_ms: 1000,
                next_egg: EggKind::Normal,
            });
        }
        for (id, pos) in [(60, spot), (61, Vec2::new(60.0, 480.0))] {
            state.weasels.push(Weasel {
                id,
                pos,
                dir: Vec2::ZERO,
                target: None,
                gait: Gait::Moving,
                leave_at_ms: 60_000,
            });
        }
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 2);
        assert_eq!(state.chickens_eaten, 0);
        assert!(state.weasels.is_empty());
        assert!(state.is_active());
    }

    #[test]
    fn test_weasel_takes_last_chicken() {
        let (mut state, tuning) = quiet_level(9);
        let spot = Vec2::new(300.0, 150.0);
        state.chickens.push(Chicken {
            id: 50,
            pos: spot,
            dir: Vec2::X,
            egg_cooldown_ms: 1000,
            next_egg: EggKind::Normal,
        });
        state.weasels.push(Weasel {
            id: 60,
            pos: spot,
            dir: Vec2::ZERO,
            target: None,
            gait: Gait::Moving,
            leave_at_ms: 60_000,
        });
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 2);
        assert!(!state.chickens.is_empty());
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::LifeLost {
                cause: LifeLossCause::AllChickensEaten,
                ..
            }
        )));
    }

    #[test]
    fn test_last_chicken_on_last_life_ends_game() {
        let (mut state, tuning) = quiet_level(9);
        state.lives = 1;
        let spot = Vec2::new(300.0, 150.0);
        state.chickens.push(Chicken {
            id: 50,
            pos: spot,
            dir: Vec2::X,
            egg_cooldown_ms: 1000,
            next_egg: EggKind::Normal,
        });
        state.weasels.push(Weasel {
            id: 60,
            pos: spot,
            dir: Vec2::ZERO,
            target: None,
            gait: Gait::Moving,
            leave_at_ms: 60_000,
        });
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.lives, 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.timers.is_idle());
        assert!(state.events.contains(&GameEvent::GameOver {
            cause: LifeLossCause::AllChickensEaten
        }));
    }

    #[test]
    fn test_every_touched_power_up_collected() {
        let (mut state, tuning) = quiet_level(10);
        let farmer = state.farmer.pos;
        for (id, kind) in [(70, PowerUpKind::Speed), (71, PowerUpKind::Magnet)] {
            state.power_ups.push(PowerUp {
                id,
                pos: farmer,
                kind,
            });
        }
        state.power_ups.push(PowerUp {
            id: 72,
            pos: farmer + Vec2::new(200.0, 0.0),
            kind: PowerUpKind::Shield,
        });
        resolve_collisions(&mut state, &tuning);
        let collected = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::PowerUpCollected(_)))
            .count();
        assert_eq!(collected, 2);
        assert_eq!(state.power_up.map(|p| p.kind), Some(PowerUpKind::Magnet));
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.power_ups[0].id, 72);
    }

    #[test]
    fn test_power_up_replaces_active() {
        let (mut state, tuning) = quiet_level(10);
        activate_power_up(&mut state, &tuning, PowerUpKind::Speed);
        state.power_ups.push(PowerUp {
            id: 70,
            pos: state.farmer.pos,
            kind: PowerUpKind::Freeze,
        });
        resolve_collisions(&mut state, &tuning);
        assert_eq!(
            state.power_up,
            Some(ActivePowerUp {
                kind: PowerUpKind::Freeze,
                remaining_ms: 4000,
            })
        );
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_magnet_reach() {
        let (mut state, tuning) = quiet_level(11);
        activate_power_up(&mut state, &tuning, PowerUpKind::Magnet);
        let farmer = state.farmer.pos;
        // Within two farmer widths but not touching
        drop_egg(&mut state, farmer + Vec2::new(45.0, 0.0), EggKind::Normal);
        // Inside the pull radius only
        drop_egg(&mut state, farmer + Vec2::new(0.0, 85.0), EggKind::Normal);
        resolve_collisions(&mut state, &tuning);
        assert_eq!(state.eggs_collected, 1);
        assert_eq!(state.eggs.len(), 1);
        assert!((state.eggs[0].pos.y - (farmer.y + 80.0)).abs() < 1e-3);
    }

    #[test]
    fn test_nearest_egg() {
        let eggs = vec![
            Egg {
                id: 1,
                pos: Vec2::new(100.0, 0.0),
                kind: EggKind::Normal,
            },
            Egg {
                id: 2,
                pos: Vec2::new(10.0, 0.0),
                kind: EggKind::Normal,
            },
        ];
        assert_eq!(nearest_egg(&eggs, Vec2::ZERO), Some(Vec2::new(10.0, 0.0)));
        assert_eq!(nearest_egg(&[], Vec2::ZERO), None);
    }
}
