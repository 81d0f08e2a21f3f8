use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::adaptive::types::Difficulty;

pub const MASTERY_MIN: f64 = 0.0;
pub const MASTERY_MAX: f64 = 100.0;

pub const DEFAULT_LOCK_THRESHOLD: f64 = 70.0;
pub const DEFAULT_DECAY_GRACE_MINUTES: i64 = 60;
pub const DEFAULT_DECAY_RATE_DIVISOR: f64 = 150.0;
pub const DEFAULT_DECAY_DAILY_FACTOR: f64 = 3.0;
pub const DEFAULT_FAST_QUIZ_MS: f64 = 5000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryGains {
    pub quiz_easy: f64,
    pub quiz_medium: f64,
    pub quiz_hard: f64,
    pub challenge_easy: f64,
    pub challenge_medium: f64,
    pub challenge_hard: f64,
    pub incorrect_penalty: f64,
    pub explanation_read: f64,
}

impl Default for MasteryGains {
    fn default() -> Self {
        Self {
            quiz_easy: 10.0,
            quiz_medium: 12.0,
            quiz_hard: 15.0,
            challenge_easy: 15.0,
            challenge_medium: 17.0,
            challenge_hard: 20.0,
            incorrect_penalty: 5.0,
            explanation_read: 5.0,
        }
    }
}

impl MasteryGains {
    pub fn quiz_gain(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.quiz_easy,
            Difficulty::Medium => self.quiz_medium,
            Difficulty::Hard => self.quiz_hard,
        }
    }

    pub fn challenge_gain(&self, difficulty: Difficulty) -> f64 {
        match difficulty {
            Difficulty::Easy => self.challenge_easy,
            Difficulty::Medium => self.challenge_medium,
            Difficulty::Hard => self.challenge_hard,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecayParams {
    pub grace_minutes: i64,
    pub rate_divisor: f64,
    pub daily_factor: f64,
    pub decimals: i32,
}

impl Default for DecayParams {
    fn default() -> Self {
        Self {
            grace_minutes: DEFAULT_DECAY_GRACE_MINUTES,
            rate_divisor: DEFAULT_DECAY_RATE_DIVISOR,
            daily_factor: DEFAULT_DECAY_DAILY_FACTOR,
            decimals: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockParams {
    pub threshold: f64,
}

impl Default for LockParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LOCK_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveParams {
    pub focused_ratio: f64,
    pub drifting_ratio: f64,
    pub explain_differently_limit: u32,
    pub fast_quiz_ms: f64,
}

impl Default for CognitiveParams {
    fn default() -> Self {
        Self {
            focused_ratio: 0.3,
            drifting_ratio: 2.0,
            explain_differently_limit: 3,
            fast_quiz_ms: DEFAULT_FAST_QUIZ_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionParams {
    pub zpd_lower: f64,
    pub zpd_upper: f64,
    pub quiz_threshold: f64,
    pub challenge_lower: f64,
    pub challenge_upper: f64,
    pub deep_focus_dim: f64,
    pub drift_glow: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            zpd_lower: 30.0,
            zpd_upper: 70.0,
            quiz_threshold: 50.0,
            challenge_lower: 30.0,
            challenge_upper: 50.0,
            deep_focus_dim: 0.7,
            drift_glow: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    pub mastery: MasteryGains,
    pub decay: DecayParams,
    pub locks: LockParams,
    pub cognitive: CognitiveParams,
    pub selection: SelectionParams,
}

impl AdaptiveConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        override_from_env("ADAPTIVE_LOCK_THRESHOLD", &mut config.locks.threshold);
        override_from_env("ADAPTIVE_DECAY_GRACE_MINUTES", &mut config.decay.grace_minutes);
        override_from_env("ADAPTIVE_DECAY_RATE_DIVISOR", &mut config.decay.rate_divisor);
        override_from_env("ADAPTIVE_DECAY_DAILY_FACTOR", &mut config.decay.daily_factor);
        override_from_env("ADAPTIVE_FAST_QUIZ_MS", &mut config.cognitive.fast_quiz_ms);

        config.sanitize();
        config
    }

    /// Resets values the decay and cognitive math cannot work with back to
    /// their defaults.
    pub fn sanitize(&mut self) {
        if !(self.decay.rate_divisor.is_finite() && self.decay.rate_divisor > 0.0) {
            tracing::warn!(
                value = self.decay.rate_divisor,
                "decay rate divisor must be positive, using default"
            );
            self.decay.rate_divisor = DEFAULT_DECAY_RATE_DIVISOR;
        }
        if self.decay.grace_minutes < 0 {
            tracing::warn!(
                value = self.decay.grace_minutes,
                "decay grace period must not be negative, using default"
            );
            self.decay.grace_minutes = DEFAULT_DECAY_GRACE_MINUTES;
        }
        if !(self.decay.daily_factor.is_finite() && self.decay.daily_factor >= 0.0) {
            tracing::warn!(
                value = self.decay.daily_factor,
                "decay daily factor must not be negative, using default"
            );
            self.decay.daily_factor = DEFAULT_DECAY_DAILY_FACTOR;
        }
        if !self.locks.threshold.is_finite() {
            tracing::warn!("lock threshold must be finite, using default");
            self.locks.threshold = DEFAULT_LOCK_THRESHOLD;
        }
        if !(self.cognitive.fast_quiz_ms.is_finite() && self.cognitive.fast_quiz_ms >= 0.0) {
            tracing::warn!(
                value = self.cognitive.fast_quiz_ms,
                "fast quiz cutoff must not be negative, using default"
            );
            self.cognitive.fast_quiz_ms = DEFAULT_FAST_QUIZ_MS;
        }
    }
}

fn override_from_env<T: FromStr>(key: &str, slot: &mut T) {
    let Ok(raw) = std::env::var(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable adaptive config override")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_values() {
        let config = AdaptiveConfig::default();
        assert_eq!(config.locks.threshold, 70.0);
        assert_eq!(config.decay.grace_minutes, 60);
        assert_eq!(config.mastery.quiz_gain(Difficulty::Medium), 12.0);
        assert_eq!(config.mastery.challenge_gain(Difficulty::Hard), 20.0);
    }

    #[test]
    fn test_env_override_parses_and_ignores_garbage() {
        let mut threshold = 70.0;
        std::env::set_var("ADAPTIVE_TEST_THRESHOLD_OK", "65.5");
        override_from_env("ADAPTIVE_TEST_THRESHOLD_OK", &mut threshold);
        assert_eq!(threshold, 65.5);

        std::env::set_var("ADAPTIVE_TEST_THRESHOLD_BAD", "seventy");
        override_from_env("ADAPTIVE_TEST_THRESHOLD_BAD", &mut threshold);
        assert_eq!(threshold, 65.5);
    }

    #[test]
    fn test_sanitize_restores_unusable_decay_values() {
        let mut config = AdaptiveConfig::default();
        config.decay.rate_divisor = 0.0;
        config.decay.grace_minutes = -15;
        config.decay.daily_factor = f64::NAN;
        config.cognitive.fast_quiz_ms = -1.0;
        config.sanitize();

        assert_eq!(config.decay.rate_divisor, DEFAULT_DECAY_RATE_DIVISOR);
        assert_eq!(config.decay.grace_minutes, DEFAULT_DECAY_GRACE_MINUTES);
        assert_eq!(config.decay.daily_factor, DEFAULT_DECAY_DAILY_FACTOR);
        assert_eq!(config.cognitive.fast_quiz_ms, DEFAULT_FAST_QUIZ_MS);
    }

    #[test]
    fn test_sanitize_keeps_huge_grace_period() {
        let mut config = AdaptiveConfig::default();
        config.decay.grace_minutes = i64::MAX;
        config.decay.rate_divisor = -150.0;
        config.sanitize();

        assert_eq!(config.decay.grace_minutes, i64::MAX);
        assert_eq!(config.decay.rate_divisor, DEFAULT_DECAY_RATE_DIVISOR);
    }
}
