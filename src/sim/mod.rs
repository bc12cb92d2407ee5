//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick clock, cadences and deadlines on top of it)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod entities;
pub mod geometry;
pub mod level;
pub mod movement;
pub mod placement;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapons;

pub use entities::{
    Bullet, Chicken, Egg, EggKind, EnemyKind, EntityKind, Farmer, Gait, Hitbox, Obstacle, PowerUp,
    PowerUpKind, Rooster, Snake, SnakeStatus, Weasel,
};
pub use geometry::{Board, Rect, clamp, displacement, distance, normalize, overlaps};
pub use level::{advance_level, start_game};
pub use movement::{Direction, DirectionKeys};
pub use placement::{PlacementQuery, find_valid_position};
pub use spawner::LevelParams;
pub use state::{ActivePowerUp, GameEvent, GamePhase, GameState, LifeLossCause};
pub use tick::{TickInput, tick};

use rand::Rng;

/// Bernoulli roll that tolerates out-of-range or NaN probabilities
pub(crate) fn chance<R: Rng>(rng: &mut R, p: f64) -> bool {
    if p >= 1.0 {
        true
    } else if p > 0.0 {
        rng.random_bool(p)
    } else {
        false
    }
}

/// Uniform duration in `[min_ms, max_ms]`; an inverted range collapses to `min_ms`
pub(crate) fn random_ms<R: Rng>(rng: &mut R, min_ms: u64, max_ms: u64) -> u64 {
    if max_ms > min_ms {
        rng.random_range(min_ms..=max_ms)
    } else {
        min_ms
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use glam::Vec2;

    use super::level::start_game;
    use super::state::GameState;
    use crate::tuning::Tuning;

    /// A started level with nothing on the board but the farmer and snake
    pub fn quiet_level(seed: u64) -> (GameState, Tuning) {
        let tuning = Tuning::default();
        let mut state = GameState::new(seed);
        start_game(&mut state, &tuning);
        state.clear_level();
        state.farmer.pos = Vec2::new(100.0, 100.0);
        state.snake.pos = Vec2::new(400.0, 400.0);
        state.events.clear();
        (state, tuning)
    }
}
