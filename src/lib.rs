//! # Kuhn CFR
//!
//! A Counterfactual Regret Minimization (CFR) solver that computes an
//! approximate Nash equilibrium strategy for two-player three-card Kuhn
//! poker, and derives posterior hand ranges from the trained strategies.
//!
//! ## Features
//!
//! - **Exact vanilla CFR**: Full tree traversal over all six ordered deals
//!   every iteration — no sampling noise
//! - **Average-strategy tracking**: Reach-weighted averaging, the quantity
//!   that provably converges to equilibrium
//! - **Belief inference**: Posterior opponent ranges by Bayes' rule over the
//!   trained strategies
//! - **Exact evaluation**: Game value and exploitability via a full
//!   best-response pass
//!
//! ## Quick Start
//!
//! ```
//! use kuhn_cfr::cfr::{KuhnSolver, SolverConfig};
//! use kuhn_cfr::kuhn::{Card, History};
//!
//! let mut solver = KuhnSolver::new(SolverConfig::default());
//!
//! // Train; the returned value converges to -1/18 for the first player.
//! let value = solver.train(10_000);
//! assert!(value < 0.0);
//!
//! // Equilibrium strategy and opponent range at the root.
//! let king = solver.average_strategy(Card::King, &History::new()).unwrap();
//! assert!(king.bet > 0.5);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Solver, information-set store, belief estimator
//! - [`kuhn`]: Cards, actions, histories, game tree, payoffs
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     KuhnSolver                            │
//! │  - regret accumulation        - strategy averaging        │
//! │  - tree traversal             - best-response evaluation  │
//! └───────────────────────────────────────────────────────────┘
//!        │                  │                    │
//!        ▼                  ▼                    ▼
//!  ┌───────────┐     ┌──────────────┐     ┌────────────┐
//!  │ Game Tree │     │ InfoSetStore │     │   Range    │
//!  │ (static)  │     │ (experience) │     │ (beliefs)  │
//!  └───────────┘     └──────────────┘     └────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// The training engine, the information-set store, and the belief estimator.
pub mod cfr;

/// Kuhn poker domain model.
///
/// Cards, actions, histories, the static game tree, and terminal payoffs.
pub mod kuhn;

// Re-export commonly used types at crate root for convenience
pub use cfr::{KuhnSolver, NodeStrategy, OpponentRange, SolverConfig, SolverError, TrainStats};
pub use kuhn::{Action, Card, Deal, History};
