//! Entity model
//!
//! Every creature and item on the board is a plain record with a center
//! position. Shared positional behavior goes through [`Hitbox`]; kind-specific
//! data (rest timers, respawn state, egg types) lives on each record and is
//! matched on by the movement and collision passes.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::*;

/// Every kind of thing that can occupy the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Farmer,
    Snake,
    Rooster,
    Chicken,
    Weasel,
    Egg,
    Obstacle,
    PowerUp,
    Bullet,
}

impl EntityKind {
    /// Hitbox size in pixels
    pub fn size(self) -> Vec2 {
        let scale = match self {
            EntityKind::Farmer => FARMER_SCALE,
            EntityKind::Snake => SNAKE_SCALE,
            EntityKind::Rooster => ROOSTER_SCALE,
            EntityKind::Chicken => CHICKEN_SCALE,
            EntityKind::Weasel => WEASEL_SCALE,
            EntityKind::Egg => EGG_SCALE,
            EntityKind::Obstacle => OBSTACLE_SCALE,
            EntityKind::PowerUp => POWER_UP_SCALE,
            EntityKind::Bullet => BULLET_SCALE,
        };
        Vec2::splat(CELL_SIZE * scale)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Farmer => "farmer",
            EntityKind::Snake => "snake",
            EntityKind::Rooster => "rooster",
            EntityKind::Chicken => "chicken",
            EntityKind::Weasel => "weasel",
            EntityKind::Egg => "egg",
            EntityKind::Obstacle => "obstacle",
            EntityKind::PowerUp => "power-up",
            EntityKind::Bullet => "bullet",
        }
    }
}

/// Common positional view over all entities
pub trait Hitbox {
    const KIND: EntityKind;

    fn pos(&self) -> Vec2;

    fn size(&self) -> Vec2 {
        Self::KIND.size()
    }

    fn rect(&self) -> Rect {
        Rect::centered(self.pos(), self.size())
    }

    fn overlaps<H: Hitbox>(&self, other: &H) -> bool {
        self.rect().overlaps(&other.rect())
    }

    /// Positions can go NaN only through a bug; such entities sit out the tick
    fn has_valid_pos(&self) -> bool {
        self.pos().is_finite()
    }
}

macro_rules! impl_hitbox {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl Hitbox for $ty {
            const KIND: EntityKind = EntityKind::$kind;

            #[inline]
            fn pos(&self) -> Vec2 {
                self.pos
            }
        })*
    };
}

impl_hitbox! {
    Farmer => Farmer,
    Snake => Snake,
    Rooster => Rooster,
    Chicken => Chicken,
    Weasel => Weasel,
    Egg => Egg,
    Obstacle => Obstacle,
    PowerUp => PowerUp,
    Bullet => Bullet,
}

/// Egg rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EggKind {
    #[default]
    Normal,
    Golden,
    Special,
}

impl EggKind {
    pub const ALL: [EggKind; 3] = [EggKind::Normal, EggKind::Golden, EggKind::Special];

    pub fn as_str(self) -> &'static str {
        match self {
            EggKind::Normal => "normal",
            EggKind::Golden => "golden",
            EggKind::Special => "special",
        }
    }
}

/// Temporary farmer buffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Farmer moves faster
    Speed,
    /// Absorbs one enemy contact
    Shield,
    /// Pulls in and collects nearby eggs
    Magnet,
    /// Slows or halts the snake
    Freeze,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Speed,
        PowerUpKind::Shield,
        PowerUpKind::Magnet,
        PowerUpKind::Freeze,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PowerUpKind::Speed => "speed",
            PowerUpKind::Shield => "shield",
            PowerUpKind::Magnet => "magnet",
            PowerUpKind::Freeze => "freeze",
        }
    }
}

/// Enemies the farmer can shoot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Snake,
    Rooster,
    Weasel,
}

/// Rest substate shared by the rooster and weasels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gait {
    #[default]
    Moving,
    /// Standing still until the given simulation time
    Resting { until_ms: u64 },
}

impl Gait {
    pub fn is_resting(&self, now_ms: u64) -> bool {
        matches!(*self, Gait::Resting { until_ms } if now_ms < until_ms)
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farmer {
    pub pos: Vec2,
    /// Enemy contact is ignored until this time (set after a shield absorbs a hit)
    #[serde(default)]
    pub grace_until_ms: u64,
}

impl Farmer {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            grace_until_ms: 0,
        }
    }

    pub fn is_protected(&self, now_ms: u64) -> bool {
        now_ms < self.grace_until_ms
    }
}

/// Snake lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnakeStatus {
    #[default]
    Active,
    /// Shot; off the board until the deadline
    Respawning { at_ms: u64 },
}

/// The egg-stealing pursuer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    pub pos: Vec2,
    /// Wander heading, used when there is nothing worth chasing
    pub dir: Vec2,
    pub status: SnakeStatus,
}

impl Snake {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            dir: Vec2::ZERO,
            status: SnakeStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SnakeStatus::Active
    }
}

/// Periodic attacker that chases the farmer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rooster {
    pub pos: Vec2,
    pub gait: Gait,
    /// Leaves the board at this time
    pub leave_at_ms: u64,
}

/// Egg layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chicken {
    pub id: u32,
    pub pos: Vec2,
    pub dir: Vec2,
    /// Milliseconds until the next egg
    pub egg_cooldown_ms: i64,
    /// Type of the next egg, rolled ahead of time
    pub next_egg: EggKind,
}

/// Chicken hunter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weasel {
    pub id: u32,
    pub pos: Vec2,
    /// Wander heading, used when no chickens are left
    pub dir: Vec2,
    /// Id of the chicken being hunted
    pub target: Option<u32>,
    pub gait: Gait,
    pub leave_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Egg {
    pub id: u32,
    pub pos: Vec2,
    pub kind: EggKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub pos: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerUpKind,
}

/// Player projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub dir: Vec2,
    pub speed: f32,
    pub age_ms: u64,
}
