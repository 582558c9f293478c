//! Kuhn Poker domain model.
//!
//! Kuhn Poker is a simplified poker game with a known, mathematically proven
//! Nash equilibrium, which makes it the standard validation target for CFR
//! implementations.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack, Queen, King
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card
//! - Player 0 acts first: Pass or Bet (1 chip)
//! - Player 1 responds based on Player 0's action
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! P0 (first to act)
//! ├── Pass
//! │   └── P1
//! │       ├── Pass → Showdown (pot = 2)
//! │       └── Bet
//! │           └── P0
//! │               ├── Pass → P1 wins (pot = 3)
//! │               └── Bet → Showdown (pot = 4)
//! └── Bet
//!     └── P1
//!         ├── Pass → P0 wins (pot = 3)
//!         └── Bet → Showdown (pot = 4)
//! ```
//!
//! ## Known Nash Equilibrium
//!
//! - **Player 0 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **Player 0 with Queen**: Always Pass
//! - **Player 0 with King**: Bet with probability 3α
//! - **Player 1 facing Bet with Jack**: Always Fold
//! - **Player 1 facing Bet with Queen**: Call with probability 1/3
//! - **Player 1 facing Bet with King**: Always Call
//!
//! **Expected Value**: Player 0 EV = -1/18 ≈ -0.0556

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cfr::config::SolverError;

pub mod tree;

/// Number of players. The whole design is specific to heads-up play.
pub const NUM_PLAYERS: usize = 2;

/// One of the three card ranks, ordered Jack < Queen < King.
///
/// The derived `Ord` is the showdown order: the higher card wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Card {
    /// The lowest rank.
    Jack,
    /// The middle rank.
    Queen,
    /// The highest rank.
    King,
}

impl Card {
    /// All three ranks in ascending order.
    pub const ALL: [Card; 3] = [Card::Jack, Card::Queen, Card::King];

    /// The two remaining ranks, in ascending order.
    ///
    /// These are exactly the cards the opponent can hold once a player has
    /// seen their own card.
    pub fn others(self) -> [Card; 2] {
        match self {
            Card::Jack => [Card::Queen, Card::King],
            Card::Queen => [Card::Jack, Card::King],
            Card::King => [Card::Jack, Card::Queen],
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Card::Jack => 'J',
            Card::Queen => 'Q',
            Card::King => 'K',
        };
        write!(f, "{}", c)
    }
}

impl FromStr for Card {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "J" | "j" => Ok(Card::Jack),
            "Q" | "q" => Ok(Card::Queen),
            "K" | "k" => Ok(Card::King),
            _ => Err(format!("unknown card '{}', expected J, Q or K", s)),
        }
    }
}

/// One of the two actions available at every decision point.
///
/// `Pass` checks when no bet is pending and folds when facing a bet;
/// `Bet` opens when no bet is pending and calls when facing one.
/// The derived `Ord` (Pass < Bet) fixes the iteration order everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    /// Check, or fold when facing a bet.
    Pass,
    /// Bet, or call when facing a bet.
    Bet,
}

/// Number of actions at every decision point.
pub const NUM_ACTIONS: usize = 2;

impl Action {
    /// Both actions in their fixed order.
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Pass, Action::Bet];

    /// Index of this action into two-element probability arrays.
    pub fn index(self) -> usize {
        match self {
            Action::Pass => 0,
            Action::Bet => 1,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Action::Pass => 'p',
            Action::Bet => 'b',
        };
        write!(f, "{}", c)
    }
}

/// An ordered sequence of actions taken so far in a hand.
///
/// The parity of the length determines whose turn it is: player 0 acts at
/// even length, player 1 at odd length. A history is terminal iff it matches
/// one of five fixed patterns (see [`History::is_terminal`]); in particular
/// every three-action history is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct History(Vec<Action>);

impl History {
    /// The empty history — the root of the game.
    pub fn new() -> Self {
        History(Vec::new())
    }

    /// The actions taken so far, in order.
    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    /// Number of actions taken so far.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True at the root, before any action.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the player to move (0 at even length, 1 at odd length).
    pub fn to_move(&self) -> usize {
        self.0.len() % 2
    }

    /// The history extended by one action.
    pub fn child(&self, action: Action) -> Self {
        let mut actions = self.0.clone();
        actions.push(action);
        History(actions)
    }

    /// The history with its last action removed, plus that action.
    ///
    /// `None` at the root. This is the lookup shape the belief estimator
    /// needs: the decision point the opponent just acted at, and the action
    /// they chose.
    pub fn split_last(&self) -> Option<(History, Action)> {
        let (&last, prefix) = self.0.split_last()?;
        Some((History(prefix.to_vec()), last))
    }

    /// Whether this history ends the hand.
    ///
    /// Terminal histories:
    /// - `pp` — both players passed, showdown for the antes
    /// - `bb` — bet and call, showdown for the doubled pot
    /// - `bp` — player 1 folded to a bet
    /// - `pbp` — player 0 folded after being bet into
    /// - `pbb` — player 0 called, showdown for the doubled pot
    pub fn is_terminal(&self) -> bool {
        use Action::{Bet, Pass};
        matches!(
            self.0.as_slice(),
            [Pass, Pass] | [Bet, Bet] | [Bet, Pass] | [Pass, Bet, Pass] | [Pass, Bet, Bet]
        )
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for action in &self.0 {
            write!(f, "{}", action)?;
        }
        Ok(())
    }
}

impl FromStr for History {
    type Err = String;

    /// Parses a compact history such as `"pb"`.
    ///
    /// Accepts any length: an over-long history is a legal *query* that the
    /// solver answers with its "no data" outcome rather than an error here.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                'p' => Ok(Action::Pass),
                'b' => Ok(Action::Bet),
                _ => Err(format!("unknown action '{}', expected 'p' or 'b'", c)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(History)
    }
}

/// An ordered pair of distinct cards dealt to the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deal {
    cards: [Card; NUM_PLAYERS],
}

/// Chance probability of each ordered deal (6 ordered pairs of 3 ranks).
pub const CHANCE_PROBABILITY: f64 = 1.0 / 6.0;

impl Deal {
    /// Create a deal, rejecting identical cards.
    ///
    /// # Errors
    /// [`SolverError::InvalidDeal`] when both players would hold the same
    /// card — there is only one of each rank in the deck.
    pub fn new(first: Card, second: Card) -> Result<Self, SolverError> {
        if first == second {
            return Err(SolverError::InvalidDeal(first));
        }
        Ok(Deal {
            cards: [first, second],
        })
    }

    /// All six ordered deals of distinct cards.
    pub fn all() -> [Deal; 6] {
        [
            (Card::Jack, Card::Queen),
            (Card::Jack, Card::King),
            (Card::Queen, Card::Jack),
            (Card::Queen, Card::King),
            (Card::King, Card::Jack),
            (Card::King, Card::Queen),
        ]
        .map(|(first, second)| Deal {
            cards: [first, second],
        })
    }

    /// The card held by the given player (0 or 1).
    pub fn card(&self, player: usize) -> Card {
        self.cards[player]
    }
}

impl fmt::Display for Deal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.cards[0], self.cards[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_order_is_showdown_order() {
        assert!(Card::King > Card::Queen);
        assert!(Card::Queen > Card::Jack);
        assert_eq!(Card::Queen.others(), [Card::Jack, Card::King]);
    }

    #[test]
    fn test_history_parity() {
        let root = History::new();
        assert_eq!(root.to_move(), 0);
        assert_eq!(root.child(Action::Pass).to_move(), 1);
        assert_eq!(
            root.child(Action::Pass).child(Action::Bet).to_move(),
            0,
            "player 0 responds to a bet after passing"
        );
    }

    #[test]
    fn test_terminal_patterns() {
        let terminal = ["pp", "bb", "bp", "pbp", "pbb"];
        for h in terminal {
            assert!(h.parse::<History>().unwrap().is_terminal(), "{}", h);
        }
        let decision = ["", "p", "b", "pb"];
        for h in decision {
            assert!(!h.parse::<History>().unwrap().is_terminal(), "{:?}", h);
        }
    }

    #[test]
    fn test_history_split_last() {
        let history: History = "pb".parse().unwrap();
        let (prefix, last) = history.split_last().unwrap();
        assert_eq!(prefix, "p".parse().unwrap());
        assert_eq!(last, Action::Bet);
        assert!(History::new().split_last().is_none());
    }

    #[test]
    fn test_history_round_trip() {
        let history: History = "pbb".parse().unwrap();
        assert_eq!(history.to_string(), "pbb");
        assert!("pxb".parse::<History>().is_err());
    }

    #[test]
    fn test_deal_rejects_identical_cards() {
        assert!(Deal::new(Card::Queen, Card::Queen).is_err());
        let deal = Deal::new(Card::King, Card::Jack).unwrap();
        assert_eq!(deal.card(0), Card::King);
        assert_eq!(deal.card(1), Card::Jack);
    }

    #[test]
    fn test_all_deals_are_distinct() {
        let deals = Deal::all();
        assert_eq!(deals.len(), 6);
        for (i, a) in deals.iter().enumerate() {
            assert_ne!(a.card(0), a.card(1));
            for b in deals.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
