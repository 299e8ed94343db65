#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use wastekit::discover::ImageLabelPair;
use wastekit::label::LabelRecord;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Distinct file stems such as `img_0042`, in sorted order.
pub fn arb_stems(max: usize) -> BoxedStrategy<Vec<String>> {
    prop::collection::btree_set(0u32..10_000, 0..=max)
        .prop_map(|ids: BTreeSet<u32>| ids.into_iter().map(|id| format!("img_{id:04}")).collect())
        .boxed()
}

/// In-memory pairs for the given stems; nothing is written to disk.
pub fn pairs_for(stems: &[String]) -> Vec<ImageLabelPair> {
    stems
        .iter()
        .map(|stem| ImageLabelPair {
            stem: stem.clone(),
            image: PathBuf::from(format!("{stem}.jpg")),
            label: PathBuf::from(format!("{stem}.txt")),
        })
        .collect()
}

pub fn arb_ratio() -> BoxedStrategy<f64> {
    (0.1f64..=0.9).boxed()
}

/// A record that passes every check for `num_classes`.
pub fn arb_valid_record(num_classes: usize) -> BoxedStrategy<LabelRecord> {
    (
        0..num_classes as i64,
        0.0f64..=1.0,
        0.0f64..=1.0,
        0.001f64..=1.0,
        0.001f64..=1.0,
    )
        .prop_map(|(class_id, cx, cy, w, h)| LabelRecord::new(class_id, cx, cy, w, h))
        .boxed()
}

/// A line with the wrong number of fields (never blank).
pub fn arb_wrong_field_count_line() -> BoxedStrategy<String> {
    prop_oneof![1usize..=4, 6usize..=9]
        .prop_map(|count| vec!["0.5"; count].join(" "))
        .boxed()
}
