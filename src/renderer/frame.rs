//! Render snapshot
//!
//! A [`Frame`] is everything a view needs, copied out of the state so the
//! renderer never borrows the simulation. Sprites are in draw order with
//! top-left pixel rects.

use serde::Serialize;

use crate::sim::{Board, EggKind, EntityKind, Gait, GamePhase, GameState, Hitbox, PowerUpKind};

/// One drawable entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    pub kind: EntityKind,
    /// Subtype or status class (`golden`, `shield`, `resting`, ...)
    pub variant: Option<&'static str>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Sprite {
    fn of<H: Hitbox>(entity: &H, variant: Option<&'static str>) -> Self {
        let rect = entity.rect();
        let size = rect.size();
        Self {
            kind: H::KIND,
            variant,
            x: rect.min.x,
            y: rect.min.y,
            width: size.x,
            height: size.y,
        }
    }

    /// CSS class list, e.g. `egg egg-golden`
    pub fn class(&self) -> String {
        let base = self.kind.as_str();
        match self.variant {
            Some(variant) => format!("{base} {base}-{variant}"),
            None => base.to_string(),
        }
    }
}

/// Scoreboard values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub level: u32,
    pub lives: u8,
    pub total_score: u64,
    pub level_score: u64,
    pub eggs_collected: u32,
    pub eggs_needed: u32,
    pub snake_score: u32,
    pub snake_limit: u32,
    pub chickens_eaten: u32,
    pub chicken_limit: u32,
    pub combo: u32,
    /// Active power-up and seconds left (rounded up)
    pub power_up: Option<(PowerUpKind, u64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub board: Board,
    pub phase: GamePhase,
    pub hud: Hud,
    pub sprites: Vec<Sprite>,
}

fn resting(gait: &Gait, now_ms: u64) -> Option<&'static str> {
    gait.is_resting(now_ms).then_some("resting")
}

impl Frame {
    pub fn capture(state: &GameState) -> Self {
        let now = state.now_ms();
        let mut sprites = Vec::with_capacity(
            state.obstacles.len()
                + state.eggs.len()
                + state.power_ups.len()
                + state.chickens.len()
                + state.weasels.len()
                + state.bullets.len()
                + 3,
        );

        sprites.extend(state.obstacles.iter().map(|o| Sprite::of(o, None)));
        sprites.extend(state.eggs.iter().map(|e| {
            let variant = match e.kind {
                EggKind::Normal => None,
                kind => Some(kind.as_str()),
            };
            Sprite::of(e, variant)
        }));
        sprites.extend(
            state
                .power_ups
                .iter()
                .map(|p| Sprite::of(p, Some(p.kind.as_str()))),
        );
        sprites.extend(state.chickens.iter().map(|c| Sprite::of(c, None)));
        sprites.extend(
            state
                .weasels
                .iter()
                .map(|w| Sprite::of(w, resting(&w.gait, now))),
        );
        if state.snake.is_active() {
            let frozen = state.power_up_active(PowerUpKind::Freeze).then_some("frozen");
            sprites.push(Sprite::of(&state.snake, frozen));
        }
        if let Some(rooster) = &state.rooster {
            sprites.push(Sprite::of(rooster, resting(&rooster.gait, now)));
        }
        let farmer_variant = state.power_up.map(|p| p.kind.as_str());
        sprites.push(Sprite::of(&state.farmer, farmer_variant));
        sprites.extend(state.bullets.iter().map(|b| Sprite::of(b, None)));

        sprites.retain(|s| s.x.is_finite() && s.y.is_finite());

        Self {
            board: state.board,
            phase: state.phase,
            hud: Hud {
                level: state.level,
                lives: state.lives,
                total_score: state.total_score,
                level_score: state.level_score,
                eggs_collected: state.eggs_collected,
                eggs_needed: state.eggs_needed,
                snake_score: state.snake_score,
                snake_limit: state.snake_limit,
                chickens_eaten: state.chickens_eaten,
                chicken_limit: state.chicken_limit,
                combo: state.combo,
                power_up: state
                    .power_up
                    .map(|p| (p.kind, p.remaining_ms.div_ceil(1000))),
            },
            sprites,
        }
    }
}
