use proptest::prelude::*;

use solanid::scoring::{apply_diversity_bonus, replace_in_total, weighted_score};
use solanid::state::SOURCE_COUNT;

#[derive(Clone, Debug)]
enum Op {
    Submit { source: usize, base_score: u64 },
    Revoke { source: usize },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SOURCE_COUNT, 0u64..100_000u64)
            .prop_map(|(source, base_score)| Op::Submit { source, base_score }),
        (0..SOURCE_COUNT).prop_map(|source| Op::Revoke { source }),
    ]
}

/// Incrementally maintained aggregate, updated the way the submit and
/// revoke handlers update UserProof.
struct Aggregate {
    weights: [u64; SOURCE_COUNT],
    bonus_pct: u8,
    slots: [Option<u64>; SOURCE_COUNT],
    base_total: u64,
    aggregated: u64,
    active: u8,
}

impl Aggregate {
    fn new(weights: [u64; SOURCE_COUNT], bonus_pct: u8) -> Self {
        Aggregate {
            weights,
            bonus_pct,
            slots: [None; SOURCE_COUNT],
            base_total: 0,
            aggregated: 0,
            active: 0,
        }
    }

    fn submit(&mut self, source: usize, base_score: u64) {
        let weighted = weighted_score(base_score, self.weights[source]).unwrap();
        let previous = self.slots[source].unwrap_or(0);
        if self.slots[source].is_none() {
            self.active += 1;
        }
        self.base_total = replace_in_total(self.base_total, previous, weighted).unwrap();
        self.aggregated =
            apply_diversity_bonus(self.base_total, self.active, self.bonus_pct).unwrap();
        self.slots[source] = Some(weighted);
    }

    fn revoke(&mut self, source: usize) {
        let removed = match self.slots[source].take() {
            Some(weighted) => weighted,
            None => return,
        };
        self.active -= 1;
        self.base_total = self.base_total.checked_sub(removed).unwrap();
        self.aggregated =
            apply_diversity_bonus(self.base_total, self.active, self.bonus_pct).unwrap();
    }

    /// The deterministic recomputation over the current active slots.
    fn recompute(&self) -> (u64, u64, u8) {
        let active = self.slots.iter().flatten().count() as u8;
        let base_total: u64 = self.slots.iter().flatten().sum();
        let aggregated = apply_diversity_bonus(base_total, active, self.bonus_pct).unwrap();
        (base_total, aggregated, active)
    }
}

proptest! {
    /// After any submit/revoke sequence, the incrementally maintained
    /// counters equal the recomputation from the active slots alone.
    #[test]
    fn aggregate_matches_recomputation(
        weights in prop::array::uniform8(1u64..=200),
        bonus_pct in 0u8..=100,
        ops in prop::collection::vec(arb_op(), 1..40),
    ) {
        let mut agg = Aggregate::new(weights, bonus_pct);
        for op in ops {
            match op {
                Op::Submit { source, base_score } => agg.submit(source, base_score),
                Op::Revoke { source } => agg.revoke(source),
            }

            let (base_total, aggregated, active) = agg.recompute();
            prop_assert_eq!(agg.base_total, base_total);
            prop_assert_eq!(agg.aggregated, aggregated);
            prop_assert_eq!(agg.active, active);
        }
    }

    /// The aggregate never undercounts: it is at least the plain sum
    /// of active weighted scores, with equality below two sources.
    #[test]
    fn bonus_never_undercounts(
        weights in prop::array::uniform8(1u64..=200),
        bonus_pct in 0u8..=100,
        ops in prop::collection::vec(arb_op(), 1..40),
    ) {
        let mut agg = Aggregate::new(weights, bonus_pct);
        for op in ops {
            match op {
                Op::Submit { source, base_score } => agg.submit(source, base_score),
                Op::Revoke { source } => agg.revoke(source),
            }

            prop_assert!(agg.aggregated >= agg.base_total);
            if agg.active <= 1 {
                prop_assert_eq!(agg.aggregated, agg.base_total);
            }
        }
    }

    /// Refreshing the same source any number of times leaves exactly
    /// one contribution for it in the aggregate.
    #[test]
    fn refresh_never_double_counts(
        base_scores in prop::collection::vec(0u64..100_000u64, 1..10),
        source in 0..SOURCE_COUNT,
    ) {
        let mut agg = Aggregate::new([100; SOURCE_COUNT], 20);
        for base_score in &base_scores {
            agg.submit(source, *base_score);
        }

        let last = *base_scores.last().unwrap();
        prop_assert_eq!(agg.active, 1);
        prop_assert_eq!(agg.base_total, weighted_score(last, 100).unwrap());
    }
}
