//! Game-specific error types.
//!
//! Core simulation code has no recoverable error paths by design: state-flag
//! guards turn invalid re-entry into no-ops, and persistence degrades to
//! defaults.  These types exist for the places where a bad value would
//! indicate a programming defect (table validation) or where persistence
//! wants a typed failure.

#![allow(dead_code)]
use std::fmt;

/// Top-level error enum for the game.
#[derive(Debug)]
pub enum GameError {
    /// A persisted file could not be read or parsed.
    Persistence {
        /// Which saves/ file was involved.
        file: &'static str,
        detail: String,
    },

    /// A tuning value is outside its safe operating range.
    /// Returned by validation helpers; not triggered at runtime by default.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Persistence { file, detail } => {
                write!(f, "persistence failure in '{}': {}", file, detail)
            }
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if the combo decay window is not strictly positive.
pub fn validate_combo_decay_window(value: f32) -> GameResult<()> {
    if value <= 0.0 {
        Err(GameError::UnsafeConstant {
            name: "COMBO_DECAY_WINDOW",
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if the spawn stagger would schedule spawns in the past.
pub fn validate_spawn_stagger(value: f32) -> GameResult<()> {
    if value < 0.0 {
        Err(GameError::UnsafeConstant {
            name: "WAVE_SPAWN_STAGGER",
            value,
            safe_range: "[0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_window_must_be_positive() {
        assert!(validate_combo_decay_window(2.0).is_ok());
        assert!(validate_combo_decay_window(0.0).is_err());
        assert!(validate_combo_decay_window(-1.0).is_err());
    }
}
