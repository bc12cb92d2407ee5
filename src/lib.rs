//! Farmer Skip - a farmyard egg-collecting arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, movement, collisions, spawning, level flow)
//! - `game`: Simulation controller owning the state and the external mutators
//! - `tuning`: Data-driven game balance
//! - `renderer`: Frame snapshots and the DOM renderer
//! - `audio`: Sound effect hook
//! - `error`: Configuration and startup errors

pub mod audio;
pub mod error;
pub mod game;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use audio::{AudioHook, SilentAudio, SoundEffect};
pub use error::{StartupError, TuningError};
pub use game::Game;
pub use tuning::{Tuning, TuningPreset};

/// Game configuration constants
pub mod consts {
    /// Base simulation tick in milliseconds; every cadence below is a multiple of it
    pub const SIM_TICK_MS: u64 = 25;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the controller will try to catch up on
    pub const MAX_FRAME_MS: f64 = 250.0;

    /// Farmer movement step
    pub const FARMER_STEP_MS: u64 = 50;
    /// Enemy movement / AI step (snake, rooster, weasels, chickens)
    pub const ENEMY_STEP_MS: u64 = 75;
    /// Bullet integration step
    pub const BULLET_STEP_MS: u64 = 25;
    /// Collision resolution and redraw step
    pub const COLLISION_STEP_MS: u64 = 50;
    /// Power-up countdown step
    pub const POWER_UP_STEP_MS: u64 = 100;

    /// Board grid cell in pixels; entity hitboxes are fractions of it
    pub const CELL_SIZE: f32 = 30.0;

    /// Hitbox scale factors (fraction of a cell)
    pub const FARMER_SCALE: f32 = 0.9;
    pub const SNAKE_SCALE: f32 = 0.9;
    pub const ROOSTER_SCALE: f32 = 0.95;
    pub const CHICKEN_SCALE: f32 = 0.85;
    pub const WEASEL_SCALE: f32 = 0.85;
    pub const EGG_SCALE: f32 = 0.7;
    pub const POWER_UP_SCALE: f32 = 0.75;
    pub const OBSTACLE_SCALE: f32 = 0.9;
    pub const BULLET_SCALE: f32 = 0.4;
}
