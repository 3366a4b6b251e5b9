//! Per-pair vote counting.

use serde::{Deserialize, Serialize};

use crate::model::db::{Pair, Vote};

/// Vote counts for the two options of one pair.
///
/// Votes whose selection matches neither option are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub votes_a: u64,
    pub votes_b: u64,
    pub total: u64,
    /// Share of `total` for option A, rounded to a whole percent.
    pub percent_a: u32,
    pub percent_b: u32,
}

impl Tally {
    /// Count `votes` against the options of `pair` by exact text match.
    pub fn count<'v>(pair: &Pair, votes: impl IntoIterator<Item = &'v Vote>) -> Self {
        let (votes_a, votes_b) = votes.into_iter().fold((0, 0), |(a, b), vote| {
            (
                a + u64::from(vote.selection == pair.option_a),
                b + u64::from(vote.selection == pair.option_b),
            )
        });
        let total = votes_a + votes_b;
        Self {
            votes_a,
            votes_b,
            total,
            percent_a: percent(votes_a, total),
            percent_b: percent(votes_b, total),
        }
    }
}

fn percent(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mongodb::Id;

    fn votes(pair: &Pair, selections: &[&str]) -> Vec<Vote> {
        selections
            .iter()
            .zip(1..)
            .map(|(selection, id)| Vote::new(Id::from(id), *selection, pair.id, Id::from(id)))
            .collect()
    }

    #[test]
    fn counts_exact_matches() {
        let pair = Pair::example(1, Id::from(1));
        let votes = votes(
            &pair,
            &["cookies", "chocolate", "cookies", "Cookies", "popcorn"],
        );
        let tally = Tally::count(&pair, &votes);
        assert_eq!(tally.votes_a, 2);
        assert_eq!(tally.votes_b, 1);
        assert_eq!(tally.total, 3);
        assert_eq!(tally.percent_a, 67);
        assert_eq!(tally.percent_b, 33);
    }

    #[test]
    fn no_votes() {
        let pair = Pair::example(1, Id::from(1));
        assert_eq!(Tally::count(&pair, &[]), Tally::default());
    }

    #[test]
    fn halves_round_up() {
        let pair = Pair::example(1, Id::from(1));
        let votes = votes(&pair, &["cookies", "chocolate"]);
        let tally = Tally::count(&pair, &votes);
        assert_eq!((tally.percent_a, tally.percent_b), (50, 50));

        let votes = self::votes(
            &pair,
            &[
                "cookies", "cookies", "cookies", "cookies", "cookies", "cookies", "cookies",
                "chocolate",
            ],
        );
        let tally = Tally::count(&pair, &votes);
        // 87.5% and 12.5%
        assert_eq!((tally.percent_a, tally.percent_b), (88, 13));
    }
}
