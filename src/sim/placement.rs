//! Random placement with bounded retries
//!
//! Candidates are sampled uniformly so the hitbox lies fully on the board and
//! rejected if they collide with obstacles (always) or other entities (on
//! request). Exhausting the attempt budget is a normal outcome; callers decide
//! whether to skip, retry later or relax the query.

use glam::Vec2;
use rand::Rng;

use super::entities::{EntityKind, Hitbox, Obstacle};
use super::geometry::Rect;
use super::state::GameState;

/// Constraints for one placement search
#[derive(Debug, Clone)]
pub struct PlacementQuery {
    pub size: Vec2,
    /// Also stay clear of farmer, snake, rooster, chickens, weasels, eggs and power-ups
    pub avoid_entities: bool,
    /// Centers the new entity must keep at least `clearance` away from
    pub keep_away: Vec<Vec2>,
    pub clearance: f32,
    pub max_attempts: u32,
}

impl PlacementQuery {
    pub fn new(kind: EntityKind, max_attempts: u32) -> Self {
        Self {
            size: kind.size(),
            avoid_entities: false,
            keep_away: Vec::new(),
            clearance: 0.0,
            max_attempts,
        }
    }

    pub fn avoiding_entities(mut self) -> Self {
        self.avoid_entities = true;
        self
    }

    pub fn keeping_away(mut self, points: Vec<Vec2>, clearance: f32) -> Self {
        self.keep_away = points;
        self.clearance = clearance;
        self
    }
}

/// Search for a free spot; `None` once the attempt budget is spent
pub fn find_valid_position(state: &mut GameState, query: &PlacementQuery) -> Option<Vec2> {
    let half = query.size * 0.5;
    let (min_x, max_x) = (half.x, state.board.width - half.x);
    let (min_y, max_y) = (half.y, state.board.height - half.y);
    if min_x > max_x || min_y > max_y {
        log::warn!(
            "Board {}x{} too small for a {}x{} hitbox",
            state.board.width,
            state.board.height,
            query.size.x,
            query.size.y
        );
        return None;
    }

    for _ in 0..query.max_attempts {
        let candidate = Vec2::new(
            state.rng.random_range(min_x..=max_x),
            state.rng.random_range(min_y..=max_y),
        );
        if is_clear(state, candidate, query) {
            return Some(candidate);
        }
    }
    None
}

/// Whether `pos` satisfies every constraint of `query`
pub fn is_clear(state: &GameState, pos: Vec2, query: &PlacementQuery) -> bool {
    let rect = Rect::centered(pos, query.size);
    if !state.board.contains(&rect) {
        return false;
    }
    if blocked_by_obstacle(&state.obstacles, &rect) {
        return false;
    }
    if query
        .keep_away
        .iter()
        .any(|p| p.distance(pos) < query.clearance)
    {
        return false;
    }
    if !query.avoid_entities {
        return true;
    }

    let hits = |other: Rect| rect.overlaps(&other);
    if hits(state.farmer.rect()) {
        return false;
    }
    if state.snake.is_active() && hits(state.snake.rect()) {
        return false;
    }
    if state.rooster.as_ref().is_some_and(|r| hits(r.rect())) {
        return false;
    }
    !(state.chickens.iter().any(|c| hits(c.rect()))
        || state.weasels.iter().any(|w| hits(w.rect()))
        || state.eggs.iter().any(|e| hits(e.rect()))
        || state.power_ups.iter().any(|p| hits(p.rect())))
}

/// Whether a hitbox collides with any obstacle
pub fn blocked_by_obstacle(obstacles: &[Obstacle], rect: &Rect) -> bool {
    obstacles.iter().any(|o| o.rect().overlaps(rect))
}

/// Run `count` independent placements and return how many succeeded
///
/// Each item gets its own attempt budget, so one failed search does not
/// cancel the rest.
pub fn place_each(
    state: &mut GameState,
    count: u32,
    mut place_one: impl FnMut(&mut GameState) -> bool,
) -> u32 {
    let mut placed = 0;
    for _ in 0..count {
        if place_one(state) {
            placed += 1;
        }
    }
    placed
}

/// Scatter up to `count` obstacles, keeping them off the farmer and snake
///
/// Returns how many were actually placed.
pub fn place_obstacles(state: &mut GameState, count: u32, max_attempts: u32) -> u32 {
    let query = PlacementQuery::new(EntityKind::Obstacle, max_attempts).avoiding_entities();
    let placed = place_each(state, count, |state| {
        let Some(pos) = find_valid_position(state, &query) else {
            return false;
        };
        state.obstacles.push(Obstacle { pos });
        true
    });
    if placed < count {
        log::warn!("Placed {} of {} obstacles; board is full", placed, count);
    }
    placed
}
