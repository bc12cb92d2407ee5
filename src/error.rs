//! Error types
//!
//! The simulation itself never fails: exhausted placement searches and bad
//! entity positions are logged and skipped. Errors only exist at the edges,
//! when loading balance data or mounting into the page.

use thiserror::Error;

/// Rejected balance configuration
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("egg odds must sum to 100, got {0}")]
    EggOdds(u32),

    #[error("power-up weights must not all be zero")]
    PowerUpWeights,

    #[error("lives must be between 1 and 3, got {0}")]
    Lives(u8),

    #[error("egg lay window is inverted at level {level}: min {min_ms}ms > max {max_ms}ms")]
    LayWindow { level: u32, min_ms: u64, max_ms: u64 },

    #[error("{name} floor {floor} exceeds its cap {cap}")]
    Curve {
        name: &'static str,
        floor: u32,
        cap: u32,
    },

    #[error("unknown tuning preset '{0}'")]
    UnknownPreset(String),
}

/// Fatal failures while attaching to the host page
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no browser window available")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("required element #{0} not found in the page")]
    MissingElement(&'static str),
}
