//! Counterfactual Regret Minimization solver for Kuhn poker.
//!
//! The solver walks the full game tree once per ordered deal per iteration,
//! accumulating counterfactual regrets in the information-set store, then
//! applies the regret-matching strategy update after each complete chance
//! sweep. The time-averaged strategy converges to a Nash equilibrium of this
//! zero-sum game.

use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::kuhn::{
    tree::{build_tree, payoff, GameNode},
    Action, Card, Deal, History, CHANCE_PROBABILITY, NUM_ACTIONS, NUM_PLAYERS,
};

use super::config::{SolverConfig, SolverError, TrainStats};
use super::range::{self, OpponentRange};
use super::storage::{InfoKey, InfoSetStore};

/// How often the training loop emits a debug progress line.
const LOG_INTERVAL: u64 = 10_000;

/// An information set's average strategy, exposed for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeStrategy {
    /// Probability of passing (checking, or folding to a bet).
    pub pass: f64,
    /// Probability of betting (or calling a bet).
    pub bet: f64,
}

/// The Kuhn poker CFR solver.
///
/// Owns the static game tree, the information-set store, and the training
/// bookkeeping. Multiple solvers are fully independent — all state lives in
/// the instance.
///
/// # Example
/// ```
/// use kuhn_cfr::cfr::{KuhnSolver, SolverConfig};
/// use kuhn_cfr::kuhn::{Card, History};
///
/// let mut solver = KuhnSolver::new(SolverConfig::default());
/// let value = solver.train(10_000);
/// assert!(value < 0.0); // the first player is at a disadvantage
///
/// let root = History::new();
/// let king = solver.average_strategy(Card::King, &root).unwrap();
/// assert!(king.bet > king.pass);
/// ```
pub struct KuhnSolver {
    /// The static decision tree, shared by all traversals.
    tree: GameNode,

    /// Accumulated experience per information set.
    store: InfoSetStore,

    /// Configuration for the solver.
    config: SolverConfig,

    /// Current iteration count.
    iteration: u64,

    /// Statistics tracking.
    stats: TrainStats,
}

impl KuhnSolver {
    /// Create a new solver.
    ///
    /// With `randomize_initial` set in the configuration, every decision
    /// information set is pre-seeded with a random strategy drawn from the
    /// (optionally seeded) generator; otherwise information sets appear
    /// lazily with the uniform strategy on first visit.
    pub fn new(config: SolverConfig) -> Self {
        let mut solver = Self {
            tree: build_tree(),
            store: InfoSetStore::new(),
            config,
            iteration: 0,
            stats: TrainStats::new(),
        };
        if solver.config.randomize_initial {
            solver.seed_random_strategies();
        }
        solver
    }

    fn seed_random_strategies(&mut self) {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut histories = Vec::new();
        collect_decision_histories(&self.tree, &mut histories);
        for history in histories {
            for card in Card::ALL {
                let bet: f64 = rng.gen();
                self.store
                    .seed_initial(InfoKey::new(card, history.clone()), [1.0 - bet, bet]);
            }
        }
    }

    /// Run a single training iteration: one traversal per ordered deal,
    /// then the strategy-update pass over every information set.
    ///
    /// # Returns
    /// The chance-averaged game value for the first player under the
    /// strategies in force during this iteration.
    pub fn run_iteration(&mut self) -> f64 {
        self.iteration += 1;

        let mut value = 0.0;
        for deal in Deal::all() {
            value += cfr(&self.tree, &mut self.store, &deal, [1.0; NUM_PLAYERS]);
        }
        value *= CHANCE_PROBABILITY;

        // Regret accumulation for the iteration is complete across all six
        // deals before any strategy moves.
        self.store.apply_next_strategies();

        value
    }

    /// Train the solver for a specified number of iterations.
    ///
    /// # Returns
    /// The mean per-iteration game value for the first player; the second
    /// player's value is its negation.
    pub fn train(&mut self, iterations: u64) -> f64 {
        self.train_with_callback(iterations, u64::MAX, |_| {})
    }

    /// Train with a callback for progress tracking.
    ///
    /// # Arguments
    /// * `iterations` - Number of iterations to run
    /// * `callback_interval` - How often to call the callback
    /// * `callback` - Function called every `callback_interval` iterations
    pub fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> f64
    where
        F: FnMut(&TrainStats),
    {
        let start_time = Instant::now();
        let mut total_value = 0.0;

        for i in 0..iterations {
            total_value += self.run_iteration();

            let completed = i + 1;
            if self.iteration % LOG_INTERVAL == 0 {
                debug!(
                    "iteration {}: mean game value {:+.4}",
                    self.iteration,
                    total_value / completed as f64
                );
            }
            if callback_interval != 0 && completed % callback_interval == 0 {
                self.update_stats(start_time, total_value / completed as f64);
                callback(&self.stats);
            }
        }

        let average = if iterations > 0 {
            total_value / iterations as f64
        } else {
            0.0
        };
        self.update_stats(start_time, average);
        info!(
            "trained {} iterations in {:.2}s ({:.0} it/s), {} info sets, value {:+.4}",
            self.stats.iterations,
            self.stats.elapsed_seconds,
            self.stats.iterations_per_second,
            self.stats.info_sets,
            average
        );

        average
    }

    fn update_stats(&mut self, start_time: Instant, average_game_value: f64) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.store.len();
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.average_game_value = average_game_value;
        self.stats.update_rate();
    }

    /// The trained average strategy for an information set.
    ///
    /// # Errors
    /// [`SolverError::Unreached`] when the `(card, history)` pair has zero
    /// accumulated reach probability — including pairs that cannot occur at
    /// all under the game rules, such as over-long histories.
    pub fn average_strategy(
        &self,
        card: Card,
        history: &History,
    ) -> Result<NodeStrategy, SolverError> {
        let key = InfoKey::new(card, history.clone());
        let average = self
            .store
            .get(&key)
            .and_then(|info_set| info_set.average_strategy(self.config.average_clamp))
            .ok_or_else(|| SolverError::Unreached {
                card,
                history: history.clone(),
            })?;
        Ok(NodeStrategy {
            pass: average[Action::Pass.index()],
            bet: average[Action::Bet.index()],
        })
    }

    /// The observer's posterior over the opponent's card after `history`.
    ///
    /// Uniform at the empty history; never fails (unreached candidate
    /// strategies fall back to their provisional values).
    pub fn opponent_range(&self, card: Card, history: &History) -> OpponentRange {
        range::opponent_range(&self.store, card, history, self.config.average_clamp)
    }

    /// Expected payoff for the observer at a node, recomputed from the
    /// posterior range and average-strategy playouts — independent of the
    /// CFR recursion and of regret state.
    pub fn expected_value(&self, card: Card, history: &History) -> f64 {
        range::expected_value(&self.store, card, history, self.config.average_clamp)
    }

    /// Expected value for the first player when both seats play the trained
    /// average strategy, exact over the six deals.
    pub fn game_value(&self) -> f64 {
        Deal::all()
            .iter()
            .map(|deal| {
                CHANCE_PROBABILITY
                    * range::playout(
                        &self.store,
                        &History::new(),
                        0,
                        [deal.card(0), deal.card(1)],
                        self.config.average_clamp,
                    )
            })
            .sum()
    }

    /// Expected value the given player achieves by best-responding to the
    /// opponent's trained average strategy, exactly integrated over the
    /// chance distribution of deals.
    ///
    /// The recursion carries unnormalized counterfactual weights over the
    /// opponent's two candidate cards, maximizing per information set at the
    /// responder's decision points.
    pub fn best_response_value(&self, player: usize) -> f64 {
        debug_assert!(player < NUM_PLAYERS);
        Card::ALL
            .iter()
            .map(|&card| {
                self.best_response(&self.tree, player, card, [CHANCE_PROBABILITY; 2])
            })
            .sum()
    }

    /// How much value an optimal opponent pair could gain over the trained
    /// strategy: the sum of both players' best-response values. Non-negative;
    /// zero exactly at a Nash equilibrium.
    pub fn exploitability(&self) -> f64 {
        self.best_response_value(0) + self.best_response_value(1)
    }

    fn best_response(
        &self,
        node: &GameNode,
        responder_seat: usize,
        responder_card: Card,
        weights: [f64; 2],
    ) -> f64 {
        let candidates = responder_card.others();
        match node {
            GameNode::Terminal { history } => {
                let mover = history.to_move();
                candidates
                    .iter()
                    .zip(weights)
                    .map(|(&candidate, weight)| {
                        let mut cards = [responder_card; NUM_PLAYERS];
                        cards[1 - responder_seat] = candidate;
                        let value = payoff(history, cards[mover], cards[1 - mover]);
                        weight * if mover == responder_seat { value } else { -value }
                    })
                    .sum()
            }
            GameNode::Decision { history, children } => {
                if history.to_move() == responder_seat {
                    children
                        .iter()
                        .map(|child| {
                            self.best_response(child, responder_seat, responder_card, weights)
                        })
                        .fold(f64::NEG_INFINITY, f64::max)
                } else {
                    Action::ALL
                        .iter()
                        .map(|&action| {
                            let mut scaled = weights;
                            for (weight, &candidate) in scaled.iter_mut().zip(candidates.iter()) {
                                *weight *= range::reporting_strategy(
                                    &self.store,
                                    &InfoKey::new(candidate, history.clone()),
                                    self.config.average_clamp,
                                )[action.index()];
                            }
                            self.best_response(
                                node.child(action),
                                responder_seat,
                                responder_card,
                                scaled,
                            )
                        })
                        .sum()
                }
            }
        }
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.store.len()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &TrainStats {
        &self.stats
    }

    /// Get reference to the store for analysis.
    pub fn store(&self) -> &InfoSetStore {
        &self.store
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Reset the solver to its initial state.
    pub fn reset(&mut self) {
        self.store.clear();
        self.iteration = 0;
        self.stats = TrainStats::new();
        if self.config.randomize_initial {
            self.seed_random_strategies();
        }
    }
}

fn collect_decision_histories(node: &GameNode, out: &mut Vec<History>) {
    if let GameNode::Decision { history, children } = node {
        out.push(history.clone());
        for child in children {
            collect_decision_histories(child, out);
        }
    }
}

/// One counterfactual-regret traversal for a fixed deal.
///
/// Returns the node's expected value relative to the player to move; child
/// values are negated because the mover alternates. Regret updates are
/// weighted by the *opponent's* reach probability and by the chance
/// probability of the deal — that weighting is what makes the accumulated
/// sum a valid proxy for counterfactual regret.
fn cfr(
    node: &GameNode,
    store: &mut InfoSetStore,
    deal: &Deal,
    reach: [f64; NUM_PLAYERS],
) -> f64 {
    let history = node.history();
    let mover = history.to_move();

    let children = match node {
        GameNode::Terminal { history } => {
            return payoff(history, deal.card(mover), deal.card(1 - mover));
        }
        GameNode::Decision { children, .. } => children,
    };

    let key = InfoKey::new(deal.card(mover), history.clone());
    let info_set = store.get_or_insert(key.clone());
    info_set.add_reach(reach[mover]);
    let strategy = info_set.strategy();

    let mut utilities = [0.0; NUM_ACTIONS];
    for (index, child) in children.iter().enumerate() {
        let mut child_reach = reach;
        child_reach[mover] *= strategy[index];
        utilities[index] = -cfr(child, store, deal, child_reach);
    }

    let node_utility: f64 = strategy
        .iter()
        .zip(utilities)
        .map(|(probability, utility)| probability * utility)
        .sum();

    let opponent_reach = reach[1 - mover];
    let info_set = store.get_or_insert(key);
    for (index, utility) in utilities.into_iter().enumerate() {
        info_set.accumulate_regret(
            index,
            opponent_reach * CHANCE_PROBABILITY * (utility - node_utility),
        );
    }

    node_utility
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME_VALUE: f64 = -1.0 / 18.0;

    fn h(s: &str) -> History {
        s.parse().unwrap()
    }

    #[test]
    fn test_discovers_all_info_sets() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(1);
        // 3 cards × 4 decision histories ("", "p", "b", "pb").
        assert_eq!(solver.num_info_sets(), 12);
    }

    #[test]
    fn test_unreached_query_reports_no_data() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(10);

        // Histories that cannot occur under the rules: too long, or past a
        // terminal. Both must report "no data", never crash or fabricate.
        for bogus in ["pppp", "ppb", "bpp"] {
            let err = solver
                .average_strategy(Card::Jack, &h(bogus))
                .unwrap_err();
            assert!(matches!(err, SolverError::Unreached { .. }), "{}", bogus);
        }
    }

    #[test]
    fn test_untrained_query_reports_no_data() {
        let solver = KuhnSolver::new(SolverConfig::default());
        assert!(solver
            .average_strategy(Card::Queen, &History::new())
            .is_err());
    }

    #[test]
    fn test_zero_sum_playouts_per_deal() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(1_000);

        let clamp = solver.config().average_clamp;
        for deal in Deal::all() {
            let cards = [deal.card(0), deal.card(1)];
            let first = range::playout(solver.store(), &History::new(), 0, cards, clamp);
            let second = range::playout(solver.store(), &History::new(), 1, cards, clamp);
            assert!(
                (first + second).abs() < 1e-12,
                "deal {}: {} vs {}",
                deal,
                first,
                second
            );
        }
    }

    #[test]
    fn test_best_response_dominates_average_strategy() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(2_000);

        let value = solver.game_value();
        assert!(solver.best_response_value(0) >= value - 1e-9);
        assert!(solver.best_response_value(1) >= -value - 1e-9);
        assert!(solver.exploitability() >= -1e-9);
    }

    #[test]
    fn test_determinism_with_fixed_seed() {
        let config = SolverConfig::default()
            .with_randomized_initial(true)
            .with_seed(7);

        let mut a = KuhnSolver::new(config.clone());
        let mut b = KuhnSolver::new(config);
        let value_a = a.train(500);
        let value_b = b.train(500);

        assert_eq!(value_a, value_b);
        assert_eq!(a.store(), b.store());
    }

    #[test]
    fn test_determinism_with_uniform_initialization() {
        let mut a = KuhnSolver::new(SolverConfig::default());
        let mut b = KuhnSolver::new(SolverConfig::default());
        a.train(200);
        b.train(200);
        assert_eq!(a.store(), b.store());
    }

    #[test]
    fn test_reset_clears_experience() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(50);
        assert!(solver.num_info_sets() > 0);

        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.num_info_sets(), 0);
    }

    #[test]
    fn test_train_zero_iterations_is_harmless() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        assert_eq!(solver.train(0), 0.0);
    }

    #[test]
    fn test_empty_history_range_is_uniform() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(5_000);
        for card in Card::ALL {
            let range = solver.opponent_range(card, &History::new());
            assert_eq!(range.low, 0.5);
            assert_eq!(range.high, 0.5);
        }
    }

    #[test]
    fn test_convergence_to_known_equilibrium() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        let value = solver.train(100_000);

        // Expected value of the game for the first player is -1/18.
        assert!(
            (value - GAME_VALUE).abs() < 0.01,
            "train value {} should be near {}",
            value,
            GAME_VALUE
        );
        assert!(
            (solver.game_value() - GAME_VALUE).abs() < 0.01,
            "average-strategy value {} should be near {}",
            solver.game_value(),
            GAME_VALUE
        );

        let root = History::new();

        // First player: King bets (almost) always, Jack bluffs near 1/3,
        // Queen checks.
        let king = solver.average_strategy(Card::King, &root).unwrap();
        assert!(king.bet > 0.97, "King bet probability {}", king.bet);

        let jack = solver.average_strategy(Card::Jack, &root).unwrap();
        assert!(
            (jack.bet - 1.0 / 3.0).abs() < 0.05,
            "Jack bluff probability {} should be near 1/3",
            jack.bet
        );

        let queen = solver.average_strategy(Card::Queen, &root).unwrap();
        assert!(queen.pass > 0.95, "Queen pass probability {}", queen.pass);

        // Second player facing a bet: fold Jack, call King, call Queen
        // about 1/3 of the time.
        let facing_bet = h("b");
        let jack_vs_bet = solver.average_strategy(Card::Jack, &facing_bet).unwrap();
        assert!(jack_vs_bet.pass > 0.95, "Jack fold {}", jack_vs_bet.pass);

        let king_vs_bet = solver.average_strategy(Card::King, &facing_bet).unwrap();
        assert!(king_vs_bet.bet > 0.95, "King call {}", king_vs_bet.bet);

        let queen_vs_bet = solver.average_strategy(Card::Queen, &facing_bet).unwrap();
        assert!(
            queen_vs_bet.bet > 0.2 && queen_vs_bet.bet < 0.5,
            "Queen call probability {} should be near 1/3",
            queen_vs_bet.bet
        );

        assert!(
            solver.exploitability() < 0.02,
            "exploitability {}",
            solver.exploitability()
        );
    }

    #[test]
    fn test_posterior_range_after_training() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(100_000);

        // Holding Jack and seeing a bet: the opponent's range is dominated
        // by the King (the Queen opens with a check at equilibrium).
        let range = solver.opponent_range(Card::Jack, &h("b"));
        assert!(
            range.high > 0.9,
            "posterior on King after a bet was {}",
            range.high
        );

        // Holding King and seeing a check, Jack and Queen stay plausible.
        let range = solver.opponent_range(Card::King, &h("p"));
        assert!(range.low > 0.2 && range.high > 0.2);
    }

    #[test]
    fn test_expected_value_tracks_game_value() {
        let mut solver = KuhnSolver::new(SolverConfig::default());
        solver.train(50_000);

        // Averaging the root expected value over the observer's possible
        // cards reproduces the first player's game value: each of the three
        // cards is equally likely and the root posterior is the deal prior.
        let mean: f64 = Card::ALL
            .iter()
            .map(|&card| solver.expected_value(card, &History::new()))
            .sum::<f64>()
            / 3.0;
        assert!(
            (mean - solver.game_value()).abs() < 1e-9,
            "{} vs {}",
            mean,
            solver.game_value()
        );
    }
}
