//! Game balance
//!
//! Every scoring constant, level curve and AI probability lives here so the
//! two rule sets the game has shipped with can be selected (or tweaked from
//! JSON) instead of being baked into the simulation.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::entities::{EggKind, EnemyKind, PowerUpKind};

/// Rule set presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TuningPreset {
    /// Capped level curves, growing board, gentle freeze
    #[default]
    Standard,
    /// Slow fractional growth, fixed board, hard freeze, ends at level 10
    Classic,
}

impl TuningPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TuningPreset::Standard => "Standard",
            TuningPreset::Classic => "Classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "default" => Some(TuningPreset::Standard),
            "classic" | "legacy" => Some(TuningPreset::Classic),
            _ => None,
        }
    }
}

/// Level curve that grows and caps: `min(base + floor(per_level * (level-1)), cap)`,
/// never below `floor`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    pub base: u32,
    pub per_level: f32,
    pub cap: u32,
    #[serde(default)]
    pub floor: u32,
}

impl Growth {
    pub const fn new(base: u32, per_level: f32, cap: u32) -> Self {
        Self {
            base,
            per_level,
            cap,
            floor: 0,
        }
    }

    pub const fn with_floor(mut self, floor: u32) -> Self {
        self.floor = floor;
        self
    }

    pub fn at(&self, level: u32) -> u32 {
        let steps = level.saturating_sub(1) as f32;
        let grown = self.base.saturating_add((self.per_level * steps).floor().max(0.0) as u32);
        grown.min(self.cap).max(self.floor)
    }
}

/// Level curve that shrinks to a floor: `max(base - per_level * (level-1), floor)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decay {
    pub base_ms: u64,
    pub per_level_ms: u64,
    pub floor_ms: u64,
}

impl Decay {
    pub const fn new(base_ms: u64, per_level_ms: u64, floor_ms: u64) -> Self {
        Self {
            base_ms,
            per_level_ms,
            floor_ms,
        }
    }

    pub fn at(&self, level: u32) -> u64 {
        let steps = u64::from(level.saturating_sub(1));
        self.base_ms
            .saturating_sub(self.per_level_ms.saturating_mul(steps))
            .max(self.floor_ms)
    }

    /// First level at which the curve sits on its floor
    pub fn settled_level(&self) -> u32 {
        if self.per_level_ms == 0 {
            return 1;
        }
        let steps = self
            .base_ms
            .saturating_sub(self.floor_ms)
            .div_ceil(self.per_level_ms);
        u32::try_from(steps).unwrap_or(u32::MAX).saturating_add(1)
    }
}

/// One value per egg type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EggTable<T> {
    pub normal: T,
    pub golden: T,
    pub special: T,
}

impl<T: Copy> EggTable<T> {
    pub fn get(&self, kind: EggKind) -> T {
        match kind {
            EggKind::Normal => self.normal,
            EggKind::Golden => self.golden,
            EggKind::Special => self.special,
        }
    }
}

/// One value per power-up type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpTable<T> {
    pub speed: T,
    pub shield: T,
    pub magnet: T,
    pub freeze: T,
}

impl<T: Copy> PowerUpTable<T> {
    pub fn get(&self, kind: PowerUpKind) -> T {
        match kind {
            PowerUpKind::Speed => self.speed,
            PowerUpKind::Shield => self.shield,
            PowerUpKind::Magnet => self.magnet,
            PowerUpKind::Freeze => self.freeze,
        }
    }
}

/// One value per shootable enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyTable<T> {
    pub snake: T,
    pub rooster: T,
    pub weasel: T,
}

impl<T: Copy> EnemyTable<T> {
    pub fn get(&self, kind: EnemyKind) -> T {
        match kind {
            EnemyKind::Snake => self.snake,
            EnemyKind::Rooster => self.rooster,
            EnemyKind::Weasel => self.weasel,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EggTuning {
    /// Eggs to collect to clear a level
    pub needed: Growth,
    /// Base points per egg type
    pub values: EggTable<u32>,
    /// Level-1 odds in percent; must sum to 100
    pub odds: EggTable<u32>,
    /// Percent moved from normal to special per level
    pub special_shift_per_level: u32,
    pub max_special_shift: u32,
    /// Normal odds never drop below this
    pub normal_floor: u32,
    pub max_on_board: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    /// Collections at most this far apart keep the combo going
    pub window_ms: u64,
    /// Largest bonus added on top of the egg value
    pub max_bonus: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub weights: PowerUpTable<u32>,
    pub durations_ms: PowerUpTable<u64>,
    pub spawn: Decay,
    pub max_on_board: usize,
    /// Farmer speed factor under Speed
    pub speed_multiplier: f32,
    /// Magnet collects eggs whose centers are within this many farmer widths
    pub magnet_reach: f32,
    /// Magnet pulls eggs within this many cells
    pub magnet_pull_cells: f32,
    /// Pull speed in px/s
    pub magnet_pull_speed: f32,
    /// Snake speed factor under Freeze (0 halts it)
    pub freeze_snake_factor: f32,
    /// Enemy contact is ignored this long after a shield absorbs a hit
    pub shield_grace_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeTuning {
    pub speed: f32,
    /// Eggs the snake may eat before the farmer loses a life
    pub limit: Growth,
    /// Chance per AI step of chasing the nearest egg instead of the farmer
    pub egg_bias: f64,
    /// With no eggs around, only chase a farmer this close; wander otherwise
    pub chase_radius: Option<f32>,
    pub respawn_delay_ms: u64,
    /// Minimum distance from the farmer when reappearing, in cells
    pub respawn_clearance_cells: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoosterTuning {
    pub min_level: u32,
    pub speed: f32,
    pub spawn: Decay,
    pub active_ms: u64,
    pub rest_chance: f64,
    pub rest_min_ms: u64,
    pub rest_max_ms: u64,
    /// Chance of aiming at a jittered point near the farmer
    pub jitter_chance: f64,
    pub jitter_px: f32,
    /// Minimum spawn distance from the farmer, in cells
    pub clearance_cells: f32,
    pub retry_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaselTuning {
    pub min_level: u32,
    pub speed: f32,
    pub spawn: Decay,
    pub active_ms: u64,
    pub max_active: usize,
    /// Chickens eaten before the farmer loses a life
    pub chicken_limit: u32,
    pub rest_chance: f64,
    pub rest_min_ms: u64,
    pub rest_max_ms: u64,
    pub jitter_chance: f64,
    pub jitter_px: f32,
    /// Minimum spawn distance from every chicken, in cells
    pub clearance_cells: f32,
    pub retry_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChickenTuning {
    pub count: Growth,
    pub speed: f32,
    pub lay_min: Decay,
    pub lay_max: Decay,
    /// Levels up to this one get an extra quick-laying chicken
    pub helper_max_level: u32,
    pub helper_cooldown_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletTuning {
    pub speed: f32,
    pub max_age_ms: u64,
    /// Spawn offset from the farmer center, in farmer widths
    pub muzzle_offset: f32,
    pub points: EnemyTable<u32>,
}

/// Complete balance sheet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub lives: u8,
    /// Completing this level wins the game; `None` plays forever
    pub max_level: Option<u32>,
    pub board_cells: Growth,
    pub obstacles: Growth,
    pub farmer_speed: f32,
    /// Enemy speed grows by this fraction per level
    pub enemy_speed_scaling: f32,
    /// Chance per step that a wanderer picks a new heading
    pub wander_turn_chance: f64,
    /// Seekers try the eight compass directions around an obstacle instead of stopping
    pub probe_around_obstacles: bool,
    /// Attempts for level setup placement
    pub placement_attempts: u32,
    /// Attempts for timed spawns (rooster, weasel, respawning snake)
    pub spawn_attempts: u32,
    pub eggs: EggTuning,
    pub combo: ComboTuning,
    pub power_ups: PowerUpTuning,
    pub snake: SnakeTuning,
    pub rooster: RoosterTuning,
    pub weasel: WeaselTuning,
    pub chickens: ChickenTuning,
    pub bullets: BulletTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::standard()
    }
}

/// Sections missing from a JSON overlay fall back to the standard values
macro_rules! standard_sections {
    ($($section:ty => $field:ident),* $(,)?) => {
        $(
            impl Default for $section {
                fn default() -> Self {
                    Tuning::standard().$field
                }
            }
        )*
    };
}

standard_sections! {
    EggTuning => eggs,
    ComboTuning => combo,
    PowerUpTuning => power_ups,
    SnakeTuning => snake,
    RoosterTuning => rooster,
    WeaselTuning => weasel,
    ChickenTuning => chickens,
    BulletTuning => bullets,
}

impl Tuning {
    pub fn from_preset(preset: TuningPreset) -> Self {
        match preset {
            TuningPreset::Standard => Self::standard(),
            TuningPreset::Classic => Self::classic(),
        }
    }

    fn standard() -> Self {
        Self {
            lives: 3,
            max_level: None,
            board_cells: Growth::new(18, 1.0, 24),
            obstacles: Growth::new(3, 2.0, 15),
            farmer_speed: 120.0,
            enemy_speed_scaling: 0.05,
            wander_turn_chance: 0.02,
            probe_around_obstacles: true,
            placement_attempts: 20,
            spawn_attempts: 50,
            eggs: EggTuning {
                needed: Growth::new(5, 3.0, 20),
                values: EggTable {
                    normal: 1,
                    golden: 3,
                    special: 5,
                },
                odds: EggTable {
                    normal: 70,
                    golden: 20,
                    special: 10,
                },
                special_shift_per_level: 2,
                max_special_shift: 20,
                normal_floor: 40,
                max_on_board: 20,
            },
            combo: ComboTuning {
                window_ms: 2000,
                max_bonus: 5,
            },
            power_ups: PowerUpTuning {
                weights: PowerUpTable {
                    speed: 30,
                    shield: 25,
                    magnet: 25,
                    freeze: 20,
                },
                durations_ms: PowerUpTable {
                    speed: 5000,
                    shield: 7000,
                    magnet: 6000,
                    freeze: 4000,
                },
                spawn: Decay::new(10_000, 500, 5000),
                max_on_board: 3,
                speed_multiplier: 1.5,
                magnet_reach: 2.0,
                magnet_pull_cells: 3.0,
                magnet_pull_speed: 100.0,
                freeze_snake_factor: 0.3,
                shield_grace_ms: 1000,
            },
            snake: SnakeTuning {
                speed: 80.0,
                limit: Growth::new(5, 2.0, 15),
                egg_bias: 0.7,
                chase_radius: None,
                respawn_delay_ms: 500,
                respawn_clearance_cells: 5.0,
            },
            rooster: RoosterTuning {
                min_level: 3,
                speed: 105.0,
                spawn: Decay::new(20_000, 1000, 10_000),
                active_ms: 15_000,
                rest_chance: 0.05,
                rest_min_ms: 500,
                rest_max_ms: 1500,
                jitter_chance: 0.7,
                jitter_px: 80.0,
                clearance_cells: 4.0,
                retry_ms: 5000,
            },
            weasel: WeaselTuning {
                min_level: 4,
                speed: 95.0,
                spawn: Decay::new(15_000, 2000, 8000),
                active_ms: 20_000,
                max_active: 2,
                chicken_limit: 3,
                rest_chance: 0.03,
                rest_min_ms: 300,
                rest_max_ms: 1000,
                jitter_chance: 0.3,
                jitter_px: 40.0,
                clearance_cells: 5.0,
                retry_ms: 5000,
            },
            chickens: ChickenTuning {
                count: Growth::new(2, 1.0, 8),
                speed: 60.0,
                lay_min: Decay::new(1000, 100, 500),
                lay_max: Decay::new(3000, 200, 1500),
                helper_max_level: 3,
                helper_cooldown_ms: 1500,
            },
            bullets: BulletTuning {
                speed: 500.0,
                max_age_ms: 1000,
                muzzle_offset: 0.6,
                points: EnemyTable {
                    snake: 5,
                    rooster: 8,
                    weasel: 10,
                },
            },
        }
    }

    fn classic() -> Self {
        let mut tuning = Self::standard();
        tuning.max_level = Some(10);
        tuning.board_cells = Growth::new(18, 0.0, 18);
        tuning.obstacles = Growth::new(1, 1.0, 10).with_floor(2);
        tuning.probe_around_obstacles = false;
        tuning.eggs.needed = Growth::new(5, 1.5, u32::MAX);
        tuning.snake.limit = Growth::new(5, 1.0, u32::MAX);
        tuning.snake.egg_bias = 0.8;
        tuning.snake.chase_radius = Some(150.0);
        tuning.snake.respawn_delay_ms = 1000;
        tuning.chickens.count = Growth::new(2, 0.4, 8);
        tuning.chickens.lay_min = Decay::new(1000, 50, 600);
        tuning.chickens.lay_max = Decay::new(3000, 100, 2000);
        tuning.power_ups.freeze_snake_factor = 0.0;
        tuning.bullets.points = EnemyTable {
            snake: 10,
            rooster: 15,
            weasel: 20,
        };
        tuning
    }

    /// Parse a (possibly partial) JSON balance sheet over the defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a named preset, rejecting unknown names
    pub fn from_preset_name(name: &str) -> Result<Self, TuningError> {
        TuningPreset::from_str(name)
            .map(Self::from_preset)
            .ok_or_else(|| TuningError::UnknownPreset(name.to_string()))
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if !(1..=3).contains(&self.lives) {
            return Err(TuningError::Lives(self.lives));
        }

        let odds = self.eggs.odds;
        let sum = odds
            .normal
            .saturating_add(odds.golden)
            .saturating_add(odds.special);
        if sum != 100 {
            return Err(TuningError::EggOdds(sum));
        }

        let w = self.power_ups.weights;
        if [w.speed, w.shield, w.magnet, w.freeze].iter().all(|&x| x == 0) {
            return Err(TuningError::PowerUpWeights);
        }

        // Both bounds are linear until they settle, so the gap is extreme at a kink
        let (lay_min, lay_max) = (&self.chickens.lay_min, &self.chickens.lay_max);
        let mut levels = vec![1];
        for settled in [lay_min.settled_level(), lay_max.settled_level()] {
            levels.extend([settled.saturating_sub(1).max(1), settled]);
        }
        levels.push(u32::MAX);
        for level in levels {
            let (min_ms, max_ms) = (lay_min.at(level), lay_max.at(level));
            if min_ms > max_ms {
                return Err(TuningError::LayWindow {
                    level,
                    min_ms,
                    max_ms,
                });
            }
        }

        for (name, curve) in [
            ("board", &self.board_cells),
            ("obstacles", &self.obstacles),
            ("eggs needed", &self.eggs.needed),
            ("snake limit", &self.snake.limit),
            ("chickens", &self.chickens.count),
        ] {
            if curve.floor > curve.cap {
                return Err(TuningError::Curve {
                    name,
                    floor: curve.floor,
                    cap: curve.cap,
                });
            }
        }

        Ok(())
    }

    /// Enemy speed multiplier for a level
    pub fn enemy_speed_factor(&self, level: u32) -> f32 {
        1.0 + level.saturating_sub(1) as f32 * self.enemy_speed_scaling
    }

    /// Egg odds for a level; mass moves from normal to special, total stays 100
    pub fn egg_odds(&self, level: u32) -> EggTable<u32> {
        let base = self.eggs.odds;
        let wanted = level
            .saturating_sub(1)
            .saturating_mul(self.eggs.special_shift_per_level)
            .min(self.eggs.max_special_shift);
        let room = base.normal.saturating_sub(self.eggs.normal_floor);
        let shift = wanted.min(room);
        EggTable {
            normal: base.normal - shift,
            golden: base.golden,
            special: base.special + shift,
        }
    }
}
