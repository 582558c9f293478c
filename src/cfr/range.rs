//! Posterior belief about the opponent's hand.
//!
//! Once strategies are known, an observed action is evidence about the card
//! behind it. Given the observer's own card there are exactly two candidate
//! opponent cards; a Bayes update under the uniform deal prior weighs each
//! candidate by the probability its strategy assigns to the action that was
//! actually played. This is a posterior computation over the finished store,
//! not a game-tree recursion, and it never touches regret state.

use serde::{Deserialize, Serialize};

use crate::kuhn::{tree::payoff, Action, Card, History, NUM_ACTIONS, NUM_PLAYERS};

use super::storage::{InfoKey, InfoSetStore, UNIFORM};

/// Posterior probability of each candidate opponent card.
///
/// `low` and `high` refer to the lower and higher ranked of the two cards
/// the observer does not hold (see [`Card::others`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpponentRange {
    /// Probability the opponent holds the lower candidate card.
    pub low: f64,
    /// Probability the opponent holds the higher candidate card.
    pub high: f64,
}

impl OpponentRange {
    /// The uninformed prior: nothing revealed yet.
    pub fn uniform() -> Self {
        Self {
            low: 0.5,
            high: 0.5,
        }
    }
}

/// The strategy to report for an information set.
///
/// The trained average when the set has been reached, the current
/// (provisional) strategy when it exists but has no accumulated reach, and
/// uniform when it was never created. Reporting therefore never fails.
pub(crate) fn reporting_strategy(
    store: &InfoSetStore,
    key: &InfoKey,
    clamp: f64,
) -> [f64; NUM_ACTIONS] {
    match store.get(key) {
        Some(info_set) => info_set
            .average_strategy(clamp)
            .unwrap_or_else(|| info_set.strategy()),
        None => UNIFORM,
    }
}

/// The observer's posterior over the opponent's card after `history`.
///
/// At the empty history the prior is uniform — no action has revealed
/// anything. Otherwise the likelihood of each candidate card is that
/// candidate's strategy probability, at the history prefix, for the action
/// just played; the two likelihoods are normalized to sum to 1. Zero total
/// likelihood falls back to the uniform prior rather than dividing by zero.
pub(crate) fn opponent_range(
    store: &InfoSetStore,
    observer: Card,
    history: &History,
    clamp: f64,
) -> OpponentRange {
    let Some((prefix, last)) = history.split_last() else {
        return OpponentRange::uniform();
    };

    let likelihoods = observer.others().map(|candidate| {
        reporting_strategy(store, &InfoKey::new(candidate, prefix.clone()), clamp)[last.index()]
    });
    let total = likelihoods[0] + likelihoods[1];
    if total > 0.0 {
        OpponentRange {
            low: likelihoods[0] / total,
            high: likelihoods[1] / total,
        }
    } else {
        OpponentRange::uniform()
    }
}

/// Expected payoff for the observer at `history`, from beliefs alone.
///
/// Combines the posterior range with average-strategy playouts of the
/// remaining (≤ 3 deep) continuation: no CFR recursion, no regret state.
/// The observer is the player to move at `history`; the value is relative
/// to that seat.
pub(crate) fn expected_value(
    store: &InfoSetStore,
    observer: Card,
    history: &History,
    clamp: f64,
) -> f64 {
    let range = opponent_range(store, observer, history, clamp);
    let observer_seat = history.to_move();
    let [low, high] = observer.others();

    [(low, range.low), (high, range.high)]
        .iter()
        .map(|&(candidate, posterior)| {
            let mut cards = [observer; NUM_PLAYERS];
            cards[1 - observer_seat] = candidate;
            posterior * playout(store, history, observer_seat, cards, clamp)
        })
        .sum()
}

/// Value for `observer_seat` when both seats follow their reporting
/// strategies from `history` onward. `cards` is indexed by seat.
pub(crate) fn playout(
    store: &InfoSetStore,
    history: &History,
    observer_seat: usize,
    cards: [Card; NUM_PLAYERS],
    clamp: f64,
) -> f64 {
    let mover = history.to_move();
    if history.is_terminal() {
        let value = payoff(history, cards[mover], cards[1 - mover]);
        return if mover == observer_seat { value } else { -value };
    }

    let key = InfoKey::new(cards[mover], history.clone());
    let strategy = reporting_strategy(store, &key, clamp);
    Action::ALL
        .iter()
        .map(|&action| {
            strategy[action.index()]
                * playout(store, &history.child(action), observer_seat, cards, clamp)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLAMP: f64 = 0.001;

    fn h(s: &str) -> History {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_history_is_uniform_prior() {
        let store = InfoSetStore::new();
        for card in Card::ALL {
            let range = opponent_range(&store, card, &History::new(), CLAMP);
            assert_eq!(range, OpponentRange::uniform());
        }
    }

    #[test]
    fn test_untrained_store_gives_uniform_posterior() {
        // Provisional strategies are uniform, so the action carries no
        // information yet.
        let store = InfoSetStore::new();
        let range = opponent_range(&store, Card::Jack, &h("b"), CLAMP);
        assert_eq!(range, OpponentRange::uniform());
    }

    #[test]
    fn test_posterior_follows_bet_likelihoods() {
        let mut store = InfoSetStore::new();
        // Observer holds Jack; candidates are Queen (low) and King (high).
        store.seed_initial(InfoKey::new(Card::Queen, History::new()), [0.75, 0.25]);
        store.seed_initial(InfoKey::new(Card::King, History::new()), [0.25, 0.75]);

        let after_bet = opponent_range(&store, Card::Jack, &h("b"), CLAMP);
        assert!((after_bet.low - 0.25).abs() < 1e-12);
        assert!((after_bet.high - 0.75).abs() < 1e-12);

        let after_pass = opponent_range(&store, Card::Jack, &h("p"), CLAMP);
        assert!((after_pass.low - 0.75).abs() < 1e-12);
        assert!((after_pass.high - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_zero_likelihood_falls_back_to_uniform() {
        let mut store = InfoSetStore::new();
        // Neither candidate ever bets; observing a bet anyway must not
        // divide by zero.
        store.seed_initial(InfoKey::new(Card::Queen, History::new()), [1.0, 0.0]);
        store.seed_initial(InfoKey::new(Card::King, History::new()), [1.0, 0.0]);

        let range = opponent_range(&store, Card::Jack, &h("b"), CLAMP);
        assert_eq!(range, OpponentRange::uniform());
    }

    #[test]
    fn test_playout_terminal_sign_is_seat_relative() {
        let store = InfoSetStore::new();
        let cards = [Card::King, Card::Jack];
        // "pp": player 0 is to move at the terminal and holds the winner.
        assert_eq!(playout(&store, &h("pp"), 0, cards, CLAMP), 1.0);
        assert_eq!(playout(&store, &h("pp"), 1, cards, CLAMP), -1.0);
        // "pbp": player 1 bet and player 0 folded.
        assert_eq!(playout(&store, &h("pbp"), 1, cards, CLAMP), 1.0);
    }

    #[test]
    fn test_playout_mixes_by_strategy() {
        let mut store = InfoSetStore::new();
        // Player 1 holding King always bets after a pass; player 0 holding
        // Jack always folds to it.
        store.seed_initial(InfoKey::new(Card::King, h("p")), [0.0, 1.0]);
        store.seed_initial(InfoKey::new(Card::Jack, h("pb")), [1.0, 0.0]);

        let value = playout(&store, &h("p"), 0, [Card::Jack, Card::King], CLAMP);
        assert!((value - (-1.0)).abs() < 1e-12);
    }
}
