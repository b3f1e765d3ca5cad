use medrisk_data::{classify, SizeBucket};
use proptest::prelude::*;

proptest! {
    #[test]
    fn classify_matches_thresholds(c in 0u64..1_000_000) {
        let expected = if c < 1000 {
            SizeBucket::Small
        } else if c < 3000 {
            SizeBucket::Medium
        } else {
            SizeBucket::Large
        };
        prop_assert_eq!(classify(c), expected);
    }

    #[test]
    fn classify_is_monotonic(a in 0u64..10_000, b in 0u64..10_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(classify(lo) <= classify(hi));
    }
}

#[test]
fn classify_exact_boundaries() {
    assert_eq!(classify(999), SizeBucket::Small);
    assert_eq!(classify(1000), SizeBucket::Medium);
    assert_eq!(classify(2999), SizeBucket::Medium);
    assert_eq!(classify(3000), SizeBucket::Large);
}
