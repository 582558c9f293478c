//! Configuration, errors and statistics for the solver.

use serde::{Deserialize, Serialize};

use crate::kuhn::{Card, History};

/// Threshold below which average-strategy probabilities are clamped to zero.
///
/// Suppresses numerical noise left over from early iterations; the clamped
/// vector is renormalized afterwards.
pub const DEFAULT_AVERAGE_CLAMP: f64 = 0.001;

/// Configuration for the solver.
///
/// # Example
/// ```
/// use kuhn_cfr::cfr::SolverConfig;
///
/// let config = SolverConfig::default().with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Clamp threshold applied when averaging strategies.
    ///
    /// Average-strategy components below this value are zeroed and the rest
    /// renormalized. Must lie in `[0, 1)`; 0 disables clamping.
    pub average_clamp: f64,

    /// Start information sets from random strategies instead of uniform.
    ///
    /// The randomized variant draws each initial strategy from the seeded
    /// generator at construction time. With the same seed, two solvers are
    /// bit-identical after identical training.
    pub randomize_initial: bool,

    /// Seed for the random number generator.
    ///
    /// Only consulted when `randomize_initial` is set. `None` seeds from
    /// entropy, which makes runs non-reproducible.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            average_clamp: DEFAULT_AVERAGE_CLAMP,
            randomize_initial: false,
            seed: None,
        }
    }
}

impl SolverConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the average-strategy clamp threshold.
    pub fn with_average_clamp(mut self, clamp: f64) -> Self {
        self.average_clamp = clamp;
        self
    }

    /// Builder method: enable or disable randomized initial strategies.
    pub fn with_randomized_initial(mut self, enable: bool) -> Self {
        self.randomize_initial = enable;
        self
    }

    /// Builder method: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    /// [`SolverError::InvalidClamp`] when the clamp threshold is outside
    /// `[0, 1)` — a threshold of 1 or more would clamp every component.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !(0.0..1.0).contains(&self.average_clamp) {
            return Err(SolverError::InvalidClamp(self.average_clamp));
        }
        Ok(())
    }
}

/// Errors reported by the solver.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Both players were dealt the same card. Rejected before traversal.
    InvalidDeal(Card),
    /// The queried information set has zero accumulated reach probability,
    /// so no average strategy exists for it. Callers decide whether this is
    /// an error or something to skip.
    Unreached {
        /// The observing player's card.
        card: Card,
        /// The queried action history.
        history: History,
    },
    /// The average-strategy clamp threshold is outside `[0, 1)`.
    InvalidClamp(f64),
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::InvalidDeal(card) => {
                write!(f, "invalid deal: both players hold {}", card)
            }
            SolverError::Unreached { card, history } => {
                write!(f, "information set {}:{} was never reached", card, history)
            }
            SolverError::InvalidClamp(val) => {
                write!(f, "average clamp {} is out of range [0, 1)", val)
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// Statistics tracked during training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Mean per-iteration game value for the first player.
    pub average_game_value: f64,
}

impl TrainStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }
}
