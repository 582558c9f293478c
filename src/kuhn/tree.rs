//! Static game tree and terminal payoffs.
//!
//! The tree is the structure of all possible action sequences for one dealt
//! hand. It is built once, is independent of which cards were dealt (card
//! identities are bound at traversal time), and is shared read-only across
//! all traversals — the same tree serves all six ordered deals.

use super::{Action, Card, History, NUM_ACTIONS};

/// A node of the game tree: either a decision point with one child per
/// action, or a terminal.
///
/// Children are boxed and indexed by [`Action::index`]. Depth is at most 3,
/// so plain ownership is enough; every node has exactly one parent and no
/// cycles exist.
#[derive(Debug, Clone, PartialEq)]
pub enum GameNode {
    /// A decision point for the player identified by the history's parity.
    Decision {
        /// Actions taken to reach this node.
        history: History,
        /// Child per action, in [`Action::ALL`] order.
        children: [Box<GameNode>; NUM_ACTIONS],
    },
    /// A completed hand.
    Terminal {
        /// The terminal action sequence.
        history: History,
    },
}

impl GameNode {
    /// The history identifying this node.
    pub fn history(&self) -> &History {
        match self {
            GameNode::Decision { history, .. } => history,
            GameNode::Terminal { history } => history,
        }
    }

    /// The child reached by taking `action`.
    ///
    /// # Panics
    /// Terminals have no children; calling this on one is a logic error.
    pub fn child(&self, action: Action) -> &GameNode {
        match self {
            GameNode::Decision { children, .. } => &children[action.index()],
            GameNode::Terminal { history } => {
                panic!("no child {} below terminal history {}", action, history)
            }
        }
    }

    /// Total number of nodes in the subtree, terminals included.
    pub fn size(&self) -> usize {
        match self {
            GameNode::Terminal { .. } => 1,
            GameNode::Decision { children, .. } => {
                1 + children.iter().map(|c| c.size()).sum::<usize>()
            }
        }
    }
}

/// Build the full decision tree rooted at the empty history.
///
/// Deterministic and card-independent: two calls produce identical trees.
pub fn build_tree() -> GameNode {
    build_from(History::new())
}

fn build_from(history: History) -> GameNode {
    if history.is_terminal() {
        return GameNode::Terminal { history };
    }
    let children = Action::ALL.map(|action| Box::new(build_from(history.child(action))));
    GameNode::Decision { history, children }
}

/// Terminal payoff, relative to the player to move at the terminal's parity.
///
/// `mover` is the card held by the player whose turn it would be (even
/// history length → player 0, odd → player 1); `opponent` is the other card.
/// Callers needing the other seat's value negate the result.
///
/// Payoff table:
/// - `pp` — showdown for the antes: ±1 to the higher card
/// - `bp`, `pbp` — a fold; the player to move at both terminals is the
///   bettor, who collects the opponent's ante: +1
/// - `bb`, `pbb` — a called bet: ±2 to the higher card
pub fn payoff(history: &History, mover: Card, opponent: Card) -> f64 {
    use Action::{Bet, Pass};

    debug_assert!(history.is_terminal(), "payoff on non-terminal {}", history);
    debug_assert_ne!(mover, opponent);

    match history.actions() {
        [Pass, Pass] => {
            if mover > opponent {
                1.0
            } else {
                -1.0
            }
        }
        [Bet, Pass] | [Pass, Bet, Pass] => 1.0,
        [Bet, Bet] | [Pass, Bet, Bet] => {
            if mover > opponent {
                2.0
            } else {
                -2.0
            }
        }
        _ => 0.0,
    }
}
