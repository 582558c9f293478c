//! Storage for per-information-set regrets and strategies.
//!
//! An information set is a decision point as one player perceives it: their
//! own card plus the public action history, never the opponent's card. The
//! store maps each such observation to the experience accumulated for it —
//! regret totals, the current strategy, and the reach-weighted strategy sum
//! used for averaging.
//!
//! Training is single-threaded, so the store is a plain map owned by the
//! solver and passed by reference into the traversal; no interior
//! mutability is involved.

use rustc_hash::FxHashMap;

use crate::kuhn::{Card, History, NUM_ACTIONS};

/// Uniform distribution over the two actions.
pub(crate) const UNIFORM: [f64; NUM_ACTIONS] = [1.0 / NUM_ACTIONS as f64; NUM_ACTIONS];

/// Convert accumulated regret into a strategy by regret matching.
///
/// Each regret is clipped at zero; if the clipped regrets have positive
/// mass, the strategy is proportional to them, otherwise it falls back to
/// uniform. Pure function of the regret vector.
///
/// # Returns
/// Action probabilities summing to 1.0 for every input, including
/// all-negative and all-zero regret vectors.
pub fn regret_matching(regret_sum: &[f64; NUM_ACTIONS]) -> [f64; NUM_ACTIONS] {
    let clipped = regret_sum.map(|r| r.max(0.0));
    let total: f64 = clipped.iter().sum();
    if total > 0.0 {
        clipped.map(|r| r / total)
    } else {
        UNIFORM
    }
}

/// Renormalize a distribution, falling back to uniform on zero mass.
fn normalized(mut dist: [f64; NUM_ACTIONS]) -> [f64; NUM_ACTIONS] {
    let total: f64 = dist.iter().sum();
    if total > 0.0 {
        for v in dist.iter_mut() {
            *v /= total;
        }
        dist
    } else {
        UNIFORM
    }
}

/// Composite key identifying an information set.
///
/// A value-typed pair rather than a concatenated string, so equality and
/// hashing stay well defined if the card or action alphabets ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InfoKey {
    /// The observing player's own card.
    pub card: Card,
    /// The public action history.
    pub history: History,
}

impl InfoKey {
    /// Create a key from an observation.
    pub fn new(card: Card, history: History) -> Self {
        Self { card, history }
    }
}

impl std::fmt::Display for InfoKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.card, self.history)
    }
}

/// Accumulated experience for one information set.
///
/// `strategy` always sums to 1 within floating-point tolerance; `regret_sum`
/// is signed and unbounded. `reach_probability` collects the acting player's
/// reach over the current iteration and is folded into `strategy_sum` (and
/// reset) by [`InfoSet::next_strategy`].
#[derive(Debug, Clone, PartialEq)]
pub struct InfoSet {
    /// Cumulative, probability-weighted regret per action.
    regret_sum: [f64; NUM_ACTIONS],
    /// Current-iteration action probabilities.
    strategy: [f64; NUM_ACTIONS],
    /// Cumulative strategy weighted by reach probability.
    strategy_sum: [f64; NUM_ACTIONS],
    /// Reach probability accumulated during the current iteration.
    reach_probability: f64,
    /// Cumulative reach probability across iterations; the normalizer for
    /// the average strategy.
    reach_probability_sum: f64,
}

impl Default for InfoSet {
    fn default() -> Self {
        Self::new()
    }
}

impl InfoSet {
    /// Create an information set with the uniform initial strategy.
    pub fn new() -> Self {
        Self::with_strategy(UNIFORM)
    }

    /// Create an information set with a specific initial strategy.
    ///
    /// Used by the randomized-initialization variant; everything else
    /// starts at zero either way.
    pub fn with_strategy(strategy: [f64; NUM_ACTIONS]) -> Self {
        Self {
            regret_sum: [0.0; NUM_ACTIONS],
            strategy,
            strategy_sum: [0.0; NUM_ACTIONS],
            reach_probability: 0.0,
            reach_probability_sum: 0.0,
        }
    }

    /// The current-iteration strategy.
    pub fn strategy(&self) -> [f64; NUM_ACTIONS] {
        self.strategy
    }

    /// The accumulated regret per action.
    pub fn regret_sum(&self) -> [f64; NUM_ACTIONS] {
        self.regret_sum
    }

    /// Cumulative reach probability across completed iterations.
    pub fn reach_probability_sum(&self) -> f64 {
        self.reach_probability_sum
    }

    /// Record the acting player's reach probability for this visit.
    pub(crate) fn add_reach(&mut self, probability: f64) {
        self.reach_probability += probability;
    }

    /// Add a weighted counterfactual regret for one action.
    pub(crate) fn accumulate_regret(&mut self, action_index: usize, amount: f64) {
        self.regret_sum[action_index] += amount;
    }

    /// End-of-iteration bookkeeping.
    ///
    /// Folds the current strategy into `strategy_sum` weighted by the reach
    /// probability collected this iteration, recomputes the strategy from
    /// regret via [`regret_matching`], accumulates the reach probability into
    /// its running sum, and resets it for the next iteration.
    pub fn next_strategy(&mut self) {
        for (sum, prob) in self.strategy_sum.iter_mut().zip(self.strategy) {
            *sum += prob * self.reach_probability;
        }
        self.strategy = regret_matching(&self.regret_sum);
        self.reach_probability_sum += self.reach_probability;
        self.reach_probability = 0.0;
    }

    /// The average strategy across all iterations so far.
    ///
    /// Divides `strategy_sum` by the accumulated reach probability, zeroes
    /// components below `clamp` and renormalizes. The average strategy (not
    /// the last iteration's) is the one that converges to equilibrium.
    ///
    /// # Returns
    /// `None` when the information set was never reached — callers must
    /// treat that as a distinct "no data" outcome.
    pub fn average_strategy(&self, clamp: f64) -> Option<[f64; NUM_ACTIONS]> {
        if self.reach_probability_sum <= 0.0 {
            return None;
        }
        let mut avg = self.strategy_sum.map(|s| s / self.reach_probability_sum);
        for v in avg.iter_mut() {
            if *v < clamp {
                *v = 0.0;
            }
        }
        Some(normalized(avg))
    }
}

/// The mapping from observations to accumulated experience.
///
/// Holds at most one [`InfoSet`] per distinct `(card, history)` pair;
/// entries are created lazily on first visit and never deleted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoSetStore {
    map: FxHashMap<InfoKey, InfoSet>,
}

impl InfoSetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of information sets discovered so far.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// True before the first traversal (unless pre-seeded).
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Look up an information set without creating it.
    pub fn get(&self, key: &InfoKey) -> Option<&InfoSet> {
        self.map.get(key)
    }

    /// Fetch the information set for a key, creating it on first visit.
    pub(crate) fn get_or_insert(&mut self, key: InfoKey) -> &mut InfoSet {
        self.map.entry(key).or_default()
    }

    /// Pre-seed an information set with a chosen initial strategy.
    ///
    /// Only used by the randomized-initialization variant; an existing
    /// entry is left untouched.
    pub(crate) fn seed_initial(&mut self, key: InfoKey, strategy: [f64; NUM_ACTIONS]) {
        self.map
            .entry(key)
            .or_insert_with(|| InfoSet::with_strategy(strategy));
    }

    /// Run the end-of-iteration strategy update on every information set.
    pub(crate) fn apply_next_strategies(&mut self) {
        for info_set in self.map.values_mut() {
            info_set.next_strategy();
        }
    }

    /// Iterate over all stored information sets.
    pub fn iter(&self) -> impl Iterator<Item = (&InfoKey, &InfoSet)> {
        self.map.iter()
    }

    /// Drop all accumulated experience.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn assert_sums_to_one(dist: &[f64; NUM_ACTIONS]) {
        let total: f64 = dist.iter().sum();
        assert!((total - 1.0).abs() < TOLERANCE, "sum was {}", total);
    }

    #[test]
    fn test_regret_matching_positive_regrets() {
        let strategy = regret_matching(&[3.0, 1.0]);
        assert_sums_to_one(&strategy);
        assert!((strategy[0] - 0.75).abs() < TOLERANCE);
        assert!((strategy[1] - 0.25).abs() < TOLERANCE);
    }

    #[test]
    fn test_regret_matching_clips_negative_regret() {
        let strategy = regret_matching(&[-5.0, 2.0]);
        assert_eq!(strategy, [0.0, 1.0]);
    }

    #[test]
    fn test_regret_matching_degenerate_falls_back_to_uniform() {
        assert_eq!(regret_matching(&[0.0, 0.0]), UNIFORM);
        assert_eq!(regret_matching(&[-1.0, -7.5]), UNIFORM);
    }

    #[test]
    fn test_next_strategy_bookkeeping() {
        let mut info_set = InfoSet::new();
        info_set.add_reach(0.25);
        info_set.add_reach(0.25);
        info_set.accumulate_regret(1, 2.0);
        info_set.next_strategy();

        // Uniform strategy folded in at the collected reach of 0.5.
        assert_eq!(info_set.strategy_sum, [0.25, 0.25]);
        assert_eq!(info_set.reach_probability_sum(), 0.5);
        assert_eq!(info_set.reach_probability, 0.0);
        // New strategy follows the positive regret.
        assert_eq!(info_set.strategy(), [0.0, 1.0]);
    }

    #[test]
    fn test_average_strategy_unreached_is_none() {
        let info_set = InfoSet::new();
        assert!(info_set.average_strategy(0.001).is_none());
    }

    #[test]
    fn test_average_strategy_clamps_and_renormalizes() {
        let mut info_set = InfoSet::with_strategy([0.9995, 0.0005]);
        info_set.add_reach(1.0);
        info_set.next_strategy();

        let avg = info_set.average_strategy(0.001).unwrap();
        assert_eq!(avg, [1.0, 0.0]);

        // Without the clamp the trace survives.
        let raw = info_set.average_strategy(0.0).unwrap();
        assert!(raw[1] > 0.0);
        assert_sums_to_one(&raw);
    }

    #[test]
    fn test_store_creates_entries_lazily() {
        let mut store = InfoSetStore::new();
        assert!(store.is_empty());

        let key = InfoKey::new(Card::Queen, "pb".parse().unwrap());
        store.get_or_insert(key.clone());
        store.get_or_insert(key.clone());
        assert_eq!(store.len(), 1);
        assert!(store.get(&key).is_some());

        let other = InfoKey::new(Card::Queen, "b".parse().unwrap());
        assert!(store.get(&other).is_none());
    }

    #[test]
    fn test_seed_initial_does_not_overwrite() {
        let mut store = InfoSetStore::new();
        let key = InfoKey::new(Card::Jack, History::new());
        store.seed_initial(key.clone(), [0.8, 0.2]);
        store.seed_initial(key.clone(), [0.1, 0.9]);
        assert_eq!(store.get(&key).unwrap().strategy(), [0.8, 0.2]);
    }
}
