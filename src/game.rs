//! Frame-driven controller
//!
//! Owns the [`GameState`] and the held input, converts wall-clock frame time
//! into fixed simulation ticks, and hands the tick's events back to the
//! caller for audio and UI.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::sim::{
    Direction, GameEvent, GamePhase, GameState, TickInput, advance_level, start_game, tick,
};
use crate::tuning::Tuning;

/// One running game
pub struct Game {
    state: GameState,
    tuning: Tuning,
    input: TickInput,
    accumulator_ms: f64,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(seed),
            tuning,
            input: TickInput::default(),
            accumulator_ms: 0.0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Start (or restart) the run on the current seed's RNG stream
    pub fn start(&mut self) {
        self.accumulator_ms = 0.0;
        self.input.clear_one_shots();
        start_game(&mut self.state, &self.tuning);
    }

    /// Throw the run away and start over
    ///
    /// The next seed is drawn from the current run's RNG, so a session stays
    /// replayable from its first seed.
    pub fn restart(&mut self) {
        let seed = self.state.rng.random::<u64>();
        self.restart_with_seed(seed);
    }

    /// Start over with an explicit seed
    pub fn restart_with_seed(&mut self, seed: u64) {
        self.state = GameState::new(seed);
        self.start();
        log::info!("Game restarted with seed: {}", seed);
    }

    /// Continue after a cleared level
    pub fn advance_level(&mut self) -> bool {
        self.accumulator_ms = 0.0;
        advance_level(&mut self.state, &self.tuning)
    }

    pub fn set_direction_key(&mut self, direction: Direction, pressed: bool) {
        self.input.set_direction_key(direction, pressed);
    }

    /// Release every held key (focus loss)
    pub fn release_keys(&mut self) {
        self.input.keys = Default::default();
    }

    /// Queue a shot at a board position; ignored unless a level is running
    pub fn fire_at(&mut self, x: f32, y: f32) {
        if self.state.is_active() {
            self.input.fire_at.push(Vec2::new(x, y));
        }
    }

    pub fn set_idle_mode(&mut self, enabled: bool) {
        if self.input.idle_mode != enabled {
            log::info!("Idle mode {}", if enabled { "on" } else { "off" });
        }
        self.input.idle_mode = enabled;
    }

    pub fn idle_mode(&self) -> bool {
        self.input.idle_mode
    }

    /// Run as many ticks as `elapsed_ms` of wall time covers
    ///
    /// Long frames are capped so a stalled tab does not replay seconds of
    /// simulation at once. Returns the events produced along the way.
    pub fn update(&mut self, elapsed_ms: f64) -> Vec<GameEvent> {
        if !self.state.is_active() {
            self.accumulator_ms = 0.0;
            return self.state.drain_events();
        }

        let elapsed = if elapsed_ms.is_finite() {
            elapsed_ms.clamp(0.0, MAX_FRAME_MS)
        } else {
            0.0
        };
        self.accumulator_ms += elapsed;

        let step = SIM_TICK_MS as f64;
        let mut substeps = 0;
        while self.accumulator_ms >= step && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.tuning, &self.input);
            self.accumulator_ms -= step;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_one_shots();

            if !self.state.is_active() {
                self.accumulator_ms = 0.0;
                break;
            }
        }
        // Drop backlog the substep cap could not absorb
        self.accumulator_ms = self.accumulator_ms.min(step);

        self.state.drain_events()
    }
}
