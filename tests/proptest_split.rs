use std::collections::BTreeSet;

use proptest::prelude::*;
use wastekit::split::{partition_seeded, split_point};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn partition_covers_every_pair_exactly_once(
        stems in proptest_helpers::arb_stems(60),
        ratio in proptest_helpers::arb_ratio(),
        seed in any::<u64>(),
    ) {
        let partition = partition_seeded(proptest_helpers::pairs_for(&stems), ratio, Some(seed));

        let train: BTreeSet<_> = partition.train.iter().map(|p| p.stem.clone()).collect();
        let valid: BTreeSet<_> = partition.valid.iter().map(|p| p.stem.clone()).collect();

        prop_assert_eq!(train.len(), partition.train.len());
        prop_assert_eq!(valid.len(), partition.valid.len());
        prop_assert!(train.is_disjoint(&valid));

        let union: BTreeSet<_> = train.union(&valid).cloned().collect();
        prop_assert_eq!(union, stems.iter().cloned().collect::<BTreeSet<_>>());
    }

    #[test]
    fn train_size_is_floor_of_ratio(
        stems in proptest_helpers::arb_stems(60),
        ratio in proptest_helpers::arb_ratio(),
        seed in any::<u64>(),
    ) {
        let n = stems.len();
        let partition = partition_seeded(proptest_helpers::pairs_for(&stems), ratio, Some(seed));

        prop_assert_eq!(partition.train.len(), (n as f64 * ratio).floor() as usize);
        prop_assert_eq!(partition.valid.len(), n - split_point(n, ratio));
    }

    #[test]
    fn seeded_partition_ignores_input_order(
        stems in proptest_helpers::arb_stems(40),
        ratio in proptest_helpers::arb_ratio(),
        seed in any::<u64>(),
    ) {
        let forward = proptest_helpers::pairs_for(&stems);
        let mut reversed = forward.clone();
        reversed.reverse();

        prop_assert_eq!(
            partition_seeded(forward, ratio, Some(seed)),
            partition_seeded(reversed, ratio, Some(seed))
        );
    }
}
