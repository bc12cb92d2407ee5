//! Game state and core simulation types
//!
//! The whole run lives in one [`GameState`] owned by the controller. Every
//! subsystem borrows it for the duration of a tick; nothing is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::*;
use super::geometry::Board;
use super::schedule::Timers;
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first start
    Idle,
    /// Ticking
    LevelActive,
    /// Egg quota reached, waiting for continue
    LevelComplete,
    /// Run ended
    GameOver,
    /// Final level cleared
    Victory,
}

/// Why a life was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeLossCause {
    /// Farmer touched the snake
    SnakeBite,
    /// Farmer touched the rooster
    RoosterAttack,
    /// Snake reached its egg limit
    SnakeAteTooMany,
    /// Weasels reached their chicken limit
    WeaselsAteTooMany,
    /// No chickens left on the board
    AllChickensEaten,
}

impl LifeLossCause {
    pub fn describe(&self) -> &'static str {
        match self {
            LifeLossCause::SnakeBite => "The snake got you!",
            LifeLossCause::RoosterAttack => "The rooster attacked you!",
            LifeLossCause::SnakeAteTooMany => "The snake ate too many eggs!",
            LifeLossCause::WeaselsAteTooMany => "The weasels ate too many chickens!",
            LifeLossCause::AllChickensEaten => "All your chickens were eaten!",
        }
    }
}

/// Things that happened during a tick, for audio and UI feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelStarted { level: u32 },
    EggCollected { kind: EggKind, points: u32, combo: u32 },
    SnakeAteEgg { eaten: u32, limit: u32 },
    PowerUpCollected(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    ShieldAbsorbed,
    ShotFired,
    EnemyHit { enemy: EnemyKind, points: u32 },
    ChickenEaten { remaining: usize },
    RoosterArrived,
    RoosterLeft,
    WeaselArrived,
    SnakeReturned,
    LifeLost { cause: LifeLossCause, lives: u8 },
    LevelComplete { level: u32 },
    GameOver { cause: LifeLossCause },
    Victory,
}

/// The power-up currently affecting the farmer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUpKind,
    pub remaining_ms: u64,
}

fn detached_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip, default = "detached_rng")]
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub level: u32,
    pub lives: u8,
    pub total_score: u64,
    pub level_score: u64,
    pub eggs_collected: u32,
    pub eggs_needed: u32,
    /// Eggs the snake has eaten this level
    pub snake_score: u32,
    pub snake_limit: u32,
    /// Chickens the weasels have eaten since the last penalty
    pub chickens_eaten: u32,
    pub chicken_limit: u32,
    pub combo: u32,
    pub last_collect_ms: Option<u64>,
    pub power_up: Option<ActivePowerUp>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub board: Board,
    pub farmer: Farmer,
    pub snake: Snake,
    pub rooster: Option<Rooster>,
    pub chickens: Vec<Chicken>,
    pub weasels: Vec<Weasel>,
    pub eggs: Vec<Egg>,
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    pub bullets: Vec<Bullet>,
    pub timers: Timers,
    /// Pending events, drained by the controller after each update
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create an idle game state with the given seed
    pub fn new(seed: u64) -> Self {
        let board = Board::from_cells(18, CELL_SIZE);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            level: 1,
            lives: 3,
            total_score: 0,
            level_score: 0,
            eggs_collected: 0,
            eggs_needed: 0,
            snake_score: 0,
            snake_limit: 0,
            chickens_eaten: 0,
            chicken_limit: 0,
            combo: 0,
            last_collect_ms: None,
            power_up: None,
            time_ticks: 0,
            farmer: Farmer::new(farmer_start(&board)),
            snake: Snake::new(snake_start(&board)),
            board,
            rooster: None,
            chickens: Vec::new(),
            weasels: Vec::new(),
            eggs: Vec::new(),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            bullets: Vec::new(),
            timers: Timers::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Current simulation time in milliseconds
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.time_ticks * SIM_TICK_MS
    }

    /// Whether the level loop is running
    #[inline]
    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::LevelActive
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn power_up_active(&self, kind: PowerUpKind) -> bool {
        self.power_up.is_some_and(|p| p.kind == kind)
    }

    /// Move farmer and snake back to their corners
    pub fn reset_positions(&mut self) {
        self.farmer.pos = farmer_start(&self.board);
        self.snake.pos = snake_start(&self.board);
        self.snake.dir = Vec2::ZERO;
        self.snake.status = SnakeStatus::Active;
    }

    /// Empty every per-level collection and cancel every pending deadline
    pub fn clear_level(&mut self) {
        self.rooster = None;
        self.chickens.clear();
        self.weasels.clear();
        self.eggs.clear();
        self.obstacles.clear();
        self.power_ups.clear();
        self.bullets.clear();
        self.timers.clear();
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.chickens.sort_by_key(|c| c.id);
        self.weasels.sort_by_key(|w| w.id);
        self.eggs.sort_by_key(|e| e.id);
        self.power_ups.sort_by_key(|p| p.id);
        self.bullets.sort_by_key(|b| b.id);
    }
}

/// Farmer spawn point: upper-left quarter of the board
pub fn farmer_start(board: &Board) -> Vec2 {
    board.clamp_center(
        Vec2::new(board.width * 0.25, board.height * 0.25),
        EntityKind::Farmer.size(),
    )
}

/// Snake spawn point: lower-right quarter of the board
pub fn snake_start(board: &Board) -> Vec2 {
    board.clamp_center(
        Vec2::new(board.width * 0.75, board.height * 0.75),
        EntityKind::Snake.size(),
    )
}
