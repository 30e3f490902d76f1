//! Randomized A/B routing between the base and the challenger model.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Which of the two deployed models handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    /// The incumbent model.
    Base,
    /// The challenger model.
    Advanced,
}

impl ModelChoice {
    /// Name recorded in the audit log.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Advanced => "advanced",
        }
    }
}

/// Per-request model selection strategy.
pub trait ModelSelector: Send + Sync {
    /// Pick the model for one request.
    fn choose(&self) -> ModelChoice;
}

impl std::fmt::Debug for dyn ModelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModelSelector")
    }
}

/// Uniform random split: each request independently draws from `[0, 1)` and
/// routes to the base model when the draw falls below the threshold.
#[derive(Debug)]
pub struct UniformSplit {
    threshold: f64,
    rng: Mutex<StdRng>,
}

impl UniformSplit {
    /// Split with the given base-model share, OS-seeded.
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Split with a fixed seed, for reproducible routing in tests.
    pub fn seeded(threshold: f64, seed: u64) -> Self {
        Self {
            threshold,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ModelSelector for UniformSplit {
    fn choose(&self) -> ModelChoice {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if rng.gen_range(0.0..1.0) < self.threshold {
            ModelChoice::Base
        } else {
            ModelChoice::Advanced
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_thresholds() {
        let always_base = UniformSplit::seeded(1.1, 7);
        let always_advanced = UniformSplit::seeded(0.0, 7);
        for _ in 0..100 {
            assert_eq!(always_base.choose(), ModelChoice::Base);
            assert_eq!(always_advanced.choose(), ModelChoice::Advanced);
        }
    }

    #[test]
    fn test_split_roughly_matches_threshold() {
        let split = UniformSplit::seeded(0.5, 42);
        let base = (0..10_000)
            .filter(|_| split.choose() == ModelChoice::Base)
            .count();
        assert!((4_500..=5_500).contains(&base), "base share {base}");
    }

    #[test]
    fn test_choice_names() {
        assert_eq!(ModelChoice::Base.name(), "base");
        assert_eq!(ModelChoice::Advanced.name(), "advanced");
    }
}
