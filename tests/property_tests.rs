//! Property-based tests for kernel invariants.

use std::collections::HashSet;

use arrow::array::{Array, AsArray, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Float64Type, Int64Type};
use colkit::aggregate::{count, count_null, variance};
use colkit::{count_values, filter, sort, sort_indices, take, unique_values, SortOrder};
use proptest::prelude::*;

fn nullable_ints() -> impl Strategy<Value = Vec<Option<i64>>> {
    proptest::collection::vec(proptest::option::of(-50i64..50), 0..64)
}

fn sort_order() -> impl Strategy<Value = SortOrder> {
    prop_oneof![Just(SortOrder::Ascending), Just(SortOrder::Descending)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: sort indices are a permutation of 0..n
    #[test]
    fn test_sort_indices_is_permutation(values in nullable_ints(), order in sort_order()) {
        let input = Int64Array::from(values.clone());
        let indices = sort_indices(&input, order).unwrap();
        let mut seen: Vec<i64> = indices.values().to_vec();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..values.len() as i64).collect::<Vec<_>>());
    }

    /// Property: nulls come first, then non-nulls in order, ties stay stable
    #[test]
    fn test_sort_nulls_first_and_stable(values in nullable_ints(), order in sort_order()) {
        let input = Int64Array::from(values.clone());
        let indices = sort_indices(&input, order).unwrap();
        let indices: Vec<usize> = indices.values().iter().map(|&i| i as usize).collect();

        let nulls = values.iter().filter(|v| v.is_none()).count();
        for (pos, pair) in indices.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            if pos + 1 < nulls {
                prop_assert!(values[a].is_none() && values[b].is_none());
                prop_assert!(a < b);
            } else if pos + 1 > nulls {
                let (va, vb) = (values[a].unwrap(), values[b].unwrap());
                let cmp = order.apply(va.cmp(&vb));
                prop_assert!(cmp.is_le());
                if va == vb {
                    prop_assert!(a < b);
                }
            }
        }
    }

    /// Property: take(sort_indices) equals sort
    #[test]
    fn test_take_of_indices_equals_sort(values in nullable_ints(), order in sort_order()) {
        let input = Int64Array::from(values);
        let via_take = take(&input, &sort_indices(&input, order).unwrap()).unwrap();
        let sorted = sort(&input, order).unwrap();
        prop_assert_eq!(
            via_take.as_primitive::<Int64Type>().iter().collect::<Vec<_>>(),
            sorted.as_primitive::<Int64Type>().iter().collect::<Vec<_>>()
        );
    }

    /// Property: unique is idempotent and matches the distinct set
    #[test]
    fn test_unique_idempotent(values in nullable_ints()) {
        let input = Int64Array::from(values.clone());
        let once = unique_values(&input).unwrap();
        let twice = unique_values(once.as_ref()).unwrap();
        let once: Vec<_> = once.as_primitive::<Int64Type>().iter().collect();
        let twice: Vec<_> = twice.as_primitive::<Int64Type>().iter().collect();
        prop_assert_eq!(&once, &twice);

        let distinct: HashSet<Option<i64>> = values.into_iter().collect();
        prop_assert_eq!(once.len(), distinct.len());
    }

    /// Property: value counts add up to the input length
    #[test]
    fn test_count_values_conserves_rows(values in nullable_ints()) {
        let input = Int64Array::from(values.clone());
        let (distinct, counts) = count_values(&input).unwrap();
        prop_assert_eq!(distinct.len(), counts.len());
        prop_assert_eq!(counts.values().iter().sum::<i64>(), values.len() as i64);
        prop_assert!(counts.values().iter().all(|&c| c > 0));
    }

    /// Property: count + count_null equals length
    #[test]
    fn test_counts_partition_length(values in nullable_ints()) {
        let input = Int64Array::from(values.clone());
        prop_assert_eq!(count(&input) + count_null(&input), values.len() as i64);
    }

    /// Property: variance is never negative
    #[test]
    fn test_variance_non_negative(values in proptest::collection::vec(-1.0e6f64..1.0e6, 2..64)) {
        let input = Float64Array::from(values);
        prop_assert!(variance(&input).unwrap() >= 0.0);
    }

    /// Property: filtering keeps exactly the rows whose mask is true
    #[test]
    fn test_filter_keeps_masked_rows(
        rows in proptest::collection::vec((proptest::option::of("[a-c]{0,3}"), any::<bool>()), 0..32)
    ) {
        let input: StringArray = rows.iter().map(|(v, _)| v.as_deref()).collect();
        let mask: BooleanArray = rows.iter().map(|(_, keep)| Some(*keep)).collect();
        let out = filter(&input, &mask).unwrap();
        let expected: Vec<Option<&str>> = rows
            .iter()
            .filter(|(_, keep)| *keep)
            .map(|(v, _)| v.as_deref())
            .collect();
        prop_assert_eq!(out.as_string::<i32>().iter().collect::<Vec<_>>(), expected);
    }

    /// Property: sorted floats are in total order with NaN last
    #[test]
    fn test_float_sort_total_order(values in proptest::collection::vec(prop_oneof![
        Just(f64::NAN),
        Just(-0.0),
        Just(0.0),
        -10.0f64..10.0,
    ], 0..32)) {
        let input = Float64Array::from(values);
        let sorted = sort(&input, SortOrder::Ascending).unwrap();
        let sorted = sorted.as_primitive::<Float64Type>();
        for pair in sorted.values().windows(2) {
            prop_assert!(pair[0].total_cmp(&pair[1]).is_le());
        }
        prop_assert_eq!(sorted.len(), input.len());
    }
}
