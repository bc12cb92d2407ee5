//! Tick cadences and deadlines
//!
//! The simulation has one clock: `time_ticks * SIM_TICK_MS`. Subsystems that
//! the browser would drive from separate intervals run on cadences that are
//! multiples of the base tick, and every delayed behavior is a deadline
//! compared against the clock. Clearing the deadlines is the only cancellation
//! needed; nothing can fire into a state that has since been reset.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Fixed-rate subsystem schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub period_ms: u64,
}

impl Cadence {
    pub const fn every(period_ms: u64) -> Self {
        Self { period_ms }
    }

    /// Whether this cadence runs at simulation time `now_ms`
    #[inline]
    pub fn fires(&self, now_ms: u64) -> bool {
        self.period_ms != 0 && now_ms % self.period_ms == 0
    }
}

pub const FARMER_CADENCE: Cadence = Cadence::every(FARMER_STEP_MS);
pub const ENEMY_CADENCE: Cadence = Cadence::every(ENEMY_STEP_MS);
pub const BULLET_CADENCE: Cadence = Cadence::every(BULLET_STEP_MS);
pub const COLLISION_CADENCE: Cadence = Cadence::every(COLLISION_STEP_MS);
pub const POWER_UP_CADENCE: Cadence = Cadence::every(POWER_UP_STEP_MS);

/// Level-scoped spawn deadlines (simulation ms)
///
/// Per-entity deadlines (rooster/weasel departure, snake respawn, rest
/// periods, shield grace) live on the entities themselves and disappear with
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timers {
    pub power_up_spawn: Option<u64>,
    pub rooster_spawn: Option<u64>,
    pub weasel_spawn: Option<u64>,
}

impl Timers {
    /// Cancel everything pending
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Fire a one-shot deadline: returns true (and disarms it) once `now_ms` reaches it
pub fn take_due(deadline: &mut Option<u64>, now_ms: u64) -> bool {
    match *deadline {
        Some(at) if now_ms >= at => {
            *deadline = None;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadences_align_with_base_tick() {
        for cadence in [
            FARMER_CADENCE,
            ENEMY_CADENCE,
            BULLET_CADENCE,
            COLLISION_CADENCE,
            POWER_UP_CADENCE,
        ] {
            assert_eq!(cadence.period_ms % SIM_TICK_MS, 0);
        }
    }

    #[test]
    fn test_cadence_fires() {
        let fired: Vec<u64> = (1..=12)
            .map(|t| t * SIM_TICK_MS)
            .filter(|&now| ENEMY_CADENCE.fires(now))
            .collect();
        assert_eq!(fired, vec![75, 150, 225, 300]);
        assert!(!Cadence::every(0).fires(0));
    }

    #[test]
    fn test_take_due_is_one_shot() {
        let mut deadline = Some(100);
        assert!(!take_due(&mut deadline, 99));
        assert!(take_due(&mut deadline, 100));
        assert_eq!(deadline, None);
        assert!(!take_due(&mut deadline, 1000));
    }

    #[test]
    fn test_clear_cancels_all() {
        let mut timers = Timers {
            power_up_spawn: Some(1),
            rooster_spawn: Some(2),
            weasel_spawn: None,
        };
        assert!(!timers.is_idle());
        timers.clear();
        assert!(timers.is_idle());
    }
}
