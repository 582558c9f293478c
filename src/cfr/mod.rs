//! CFR (Counterfactual Regret Minimization) solver module.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! Each iteration traverses the full game tree once per ordered deal (six
//! deals of three cards), so the regret estimates are exact rather than
//! sampled; the strategy update runs only after the complete chance sweep.
//!
//! # Theory
//!
//! **Regret**: The difference between the value of an action and the value
//! of the current strategy.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! **Convergence**: Average regret decreases as O(1/sqrt(T)), and the
//! average strategy converges to Nash equilibrium.
//!
//! Beyond training, the module derives posterior hand ranges from the
//! trained strategies by Bayes' rule ([`range`]) and evaluates them with an
//! exact best-response pass ([`KuhnSolver::exploitability`]).
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Neller, T., Lanctot, M. "An Introduction to Counterfactual Regret Minimization" (2013)

pub mod config;
pub mod range;
pub mod solver;
pub mod storage;

// Re-export main types for convenient access
pub use config::{SolverConfig, SolverError, TrainStats, DEFAULT_AVERAGE_CLAMP};
pub use range::OpponentRange;
pub use solver::{KuhnSolver, NodeStrategy};
pub use storage::{regret_matching, InfoKey, InfoSet, InfoSetStore};
