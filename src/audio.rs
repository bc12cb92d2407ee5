//! Sound effects
//!
//! The simulation never plays audio itself. Callers map drained
//! [`GameEvent`]s to [`SoundEffect`]s and hand them to an [`AudioHook`].
//! In the browser that is [`WebAudio`], which synthesizes every effect with
//! oscillators so no sound files are needed.

use crate::sim::{EggKind, GameEvent};

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Normal egg picked up
    Collect,
    GoldCollect,
    SpecialCollect,
    PowerUp,
    Shoot,
    EnemyHit,
    /// Snake swallowed an egg
    SnakeEat,
    /// Farmer took a hit
    Hit,
    LevelUp,
    GameOver,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 10] = [
        SoundEffect::Collect,
        SoundEffect::GoldCollect,
        SoundEffect::SpecialCollect,
        SoundEffect::PowerUp,
        SoundEffect::Shoot,
        SoundEffect::EnemyHit,
        SoundEffect::SnakeEat,
        SoundEffect::Hit,
        SoundEffect::LevelUp,
        SoundEffect::GameOver,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SoundEffect::Collect => "collect",
            SoundEffect::GoldCollect => "goldCollect",
            SoundEffect::SpecialCollect => "specialCollect",
            SoundEffect::PowerUp => "powerUp",
            SoundEffect::Shoot => "shoot",
            SoundEffect::EnemyHit => "enemyHit",
            SoundEffect::SnakeEat => "snakeEat",
            SoundEffect::Hit => "hit",
            SoundEffect::LevelUp => "levelUp",
            SoundEffect::GameOver => "gameOver",
        }
    }

    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::EggCollected { kind, .. } => Some(match kind {
                EggKind::Normal => SoundEffect::Collect,
                EggKind::Golden => SoundEffect::GoldCollect,
                EggKind::Special => SoundEffect::SpecialCollect,
            }),
            GameEvent::PowerUpCollected(_) => Some(SoundEffect::PowerUp),
            GameEvent::ShotFired => Some(SoundEffect::Shoot),
            GameEvent::EnemyHit { .. } => Some(SoundEffect::EnemyHit),
            GameEvent::SnakeAteEgg { .. } => Some(SoundEffect::SnakeEat),
            GameEvent::ShieldAbsorbed => Some(SoundEffect::Hit),
            // The last life is covered by the game-over cue
            GameEvent::LifeLost { lives, .. } if *lives > 0 => Some(SoundEffect::Hit),
            GameEvent::LevelComplete { .. } | GameEvent::Victory => Some(SoundEffect::LevelUp),
            GameEvent::GameOver { .. } => Some(SoundEffect::GameOver),
            _ => None,
        }
    }
}

/// Anything that can play a cue
pub trait AudioHook {
    fn play_effect(&mut self, effect: SoundEffect);

    /// Play the cue of every event that has one
    fn play_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play_effect(effect);
        }
    }
}

/// Hook that plays nothing (headless runs, tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioHook for SilentAudio {
    fn play_effect(&mut self, effect: SoundEffect) {
        log::trace!("(silent) {}", effect.name());
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioHook, SoundEffect};

    /// One oscillator blip: start pitch, optional end pitch, length, loudness
    struct Blip {
        freq: f32,
        sweep_to: Option<f32>,
        secs: f64,
        level: f32,
    }

    const fn blip(freq: f32, secs: f64, level: f32) -> Blip {
        Blip {
            freq,
            sweep_to: None,
            secs,
            level,
        }
    }

    const fn sweep(freq: f32, to: f32, secs: f64, level: f32) -> Blip {
        Blip {
            freq,
            sweep_to: Some(to),
            secs,
            level,
        }
    }

    /// Web Audio oscillator synth
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.6,
                muted: false,
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn osc(
            ctx: &AudioContext,
            freq: f32,
            wave: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;
            osc.set_type(wave);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;
            Some((osc, gain))
        }

        /// Play `blips` back to back, `gap` seconds apart
        fn sequence(&self, ctx: &AudioContext, wave: OscillatorType, gap: f64, blips: &[Blip]) {
            for (i, b) in blips.iter().enumerate() {
                let Some((osc, gain)) = Self::osc(ctx, b.freq, wave) else {
                    continue;
                };
                let t = ctx.current_time() + i as f64 * gap;
                gain.gain().set_value_at_time(self.volume * b.level, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + b.secs)
                    .ok();
                if let Some(to) = b.sweep_to {
                    osc.frequency().set_value_at_time(b.freq, t).ok();
                    osc.frequency()
                        .exponential_ramp_to_value_at_time(to, t + b.secs)
                        .ok();
                }
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + b.secs + 0.05).ok();
            }
        }
    }

    impl AudioHook for WebAudio {
        fn play_effect(&mut self, effect: SoundEffect) {
            if self.muted {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            // Browsers start the context suspended until a user gesture
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            use OscillatorType::{Sawtooth, Sine, Square, Triangle};
            match effect {
                SoundEffect::Collect => self.sequence(ctx, Sine, 0.0, &[sweep(520.0, 780.0, 0.1, 0.4)]),
                SoundEffect::GoldCollect => self.sequence(
                    ctx,
                    Triangle,
                    0.07,
                    &[blip(660.0, 0.12, 0.4), blip(880.0, 0.15, 0.4)],
                ),
                SoundEffect::SpecialCollect => self.sequence(
                    ctx,
                    Triangle,
                    0.06,
                    &[
                        blip(660.0, 0.1, 0.35),
                        blip(880.0, 0.1, 0.35),
                        blip(1320.0, 0.2, 0.35),
                    ],
                ),
                SoundEffect::PowerUp => {
                    self.sequence(ctx, Square, 0.0, &[sweep(300.0, 900.0, 0.25, 0.2)])
                }
                SoundEffect::Shoot => {
                    self.sequence(ctx, Square, 0.0, &[sweep(900.0, 250.0, 0.08, 0.15)])
                }
                SoundEffect::EnemyHit => {
                    self.sequence(ctx, Sawtooth, 0.0, &[sweep(400.0, 90.0, 0.18, 0.3)])
                }
                SoundEffect::SnakeEat => {
                    self.sequence(ctx, Sawtooth, 0.0, &[sweep(220.0, 110.0, 0.2, 0.25)])
                }
                SoundEffect::Hit => self.sequence(ctx, Square, 0.0, &[sweep(180.0, 60.0, 0.3, 0.4)]),
                SoundEffect::LevelUp => self.sequence(
                    ctx,
                    Triangle,
                    0.1,
                    &[
                        blip(440.0, 0.3, 0.3),
                        blip(554.0, 0.3, 0.3),
                        blip(659.0, 0.3, 0.3),
                        blip(880.0, 0.45, 0.3),
                    ],
                ),
                SoundEffect::GameOver => self.sequence(
                    ctx,
                    Sine,
                    0.2,
                    &[
                        blip(392.0, 0.3, 0.3),
                        blip(330.0, 0.3, 0.3),
                        blip(262.0, 0.3, 0.3),
                        blip(196.0, 0.5, 0.3),
                    ],
                ),
            }
        }
    }
}
