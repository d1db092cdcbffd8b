//! Integration tests for group-by and the batch wrapper.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Float64Type, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use colkit::{
    group_by, group_by_with_config, Aggregation, Aggregator, CancellationToken, ColumnBatch,
    FnAggregator, GroupOrder, KernelConfig, KernelError, RowCondition, Scalar, SortOrder,
};

/// Category / score / region sample: A and B both average 80.
fn scores() -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![
        Field::new("category", DataType::Utf8, true),
        Field::new("region", DataType::Int64, true),
        Field::new("score", DataType::Float64, true),
        Field::new("bonus", DataType::Int64, true),
    ]));
    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec!["A", "B", "A", "B", "A", "B"])),
            Arc::new(Int64Array::from(vec![
                Some(1),
                Some(2),
                Some(2),
                Some(2),
                Some(1),
                None,
            ])),
            Arc::new(Float64Array::from(vec![70.0, 90.0, 90.0, 70.0, 80.0, 80.0])),
            Arc::new(Int64Array::from(vec![
                Some(5),
                None,
                Some(10),
                Some(1),
                Some(5),
                Some(2),
            ])),
        ],
    )
    .unwrap()
}

fn floats(array: &ArrayRef) -> Vec<Option<f64>> {
    array.as_primitive::<Float64Type>().iter().collect()
}

fn strings(array: &ArrayRef) -> Vec<Option<&str>> {
    array.as_string::<i32>().iter().collect()
}

// =============================================================================
// Group-by Tests
// =============================================================================

mod group_by_tests {
    use super::*;

    #[test]
    fn test_mean_by_category() {
        let result = group_by(&scores(), &["category"], &[("score", &Aggregation::Mean)]).unwrap();
        assert_eq!(result.num_groups(), 2);
        assert_eq!(
            strings(result.key_column("category").unwrap()),
            vec![Some("A"), Some("B")]
        );
        assert_eq!(
            floats(result.aggregate_column("score").unwrap()),
            vec![Some(80.0), Some(80.0)]
        );
    }

    #[test]
    fn test_multiple_keys_and_aggregations() {
        let result = group_by(
            &scores(),
            &["category", "region"],
            &[("score", &Aggregation::Max), ("bonus", &Aggregation::Sum)],
        )
        .unwrap();
        // (A,1) (B,2) (A,2) (B,null)
        assert_eq!(result.num_groups(), 4);
        let regions = result.key_column("region").unwrap();
        assert_eq!(regions.data_type(), &DataType::Int64);
        assert_eq!(
            regions.as_primitive::<Int64Type>().iter().collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(2), None]
        );
        assert_eq!(
            floats(result.aggregate_column("score").unwrap()),
            vec![Some(80.0), Some(90.0), Some(90.0), Some(80.0)]
        );
        assert_eq!(
            floats(result.aggregate_column("bonus").unwrap()),
            vec![Some(10.0), Some(1.0), Some(10.0), Some(2.0)]
        );
    }

    #[test]
    fn test_sorted_by_key_order() {
        let config = KernelConfig::new().with_group_order(GroupOrder::SortedByKey);
        let result = group_by_with_config(
            &scores(),
            &["region", "category"],
            &[("score", &Aggregation::Count)],
            &config,
        )
        .unwrap();
        let regions = result.key_column("region").unwrap().as_primitive::<Int64Type>();
        assert_eq!(
            regions.iter().collect::<Vec<_>>(),
            vec![None, Some(1), Some(2), Some(2)]
        );
        assert_eq!(
            strings(result.key_column("category").unwrap()),
            vec![Some("B"), Some("A"), Some("A"), Some("B")]
        );
        assert_eq!(
            floats(result.aggregate_column("score").unwrap()),
            vec![Some(1.0), Some(2.0), Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn test_to_batch_layout() {
        let result = group_by(
            &scores(),
            &["category"],
            &[("score", &Aggregation::Median), ("bonus", &Aggregation::Count)],
        )
        .unwrap();
        let batch = result.to_batch().unwrap();
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["category", "score_agg", "bonus_agg"]);
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(
            floats(batch.column(2)),
            vec![Some(3.0), Some(2.0)]
        );
    }

    #[test]
    fn test_custom_aggregator() {
        let spread = FnAggregator::new("spread", |column: &dyn Array| {
            let lo = colkit::aggregate::min(column)?.as_f64().unwrap_or(0.0);
            let hi = colkit::aggregate::max(column)?.as_f64().unwrap_or(0.0);
            Ok(Scalar::Float64(hi - lo))
        });
        let result = group_by(&scores(), &["category"], &[("score", &spread)]).unwrap();
        assert_eq!(
            floats(result.aggregate_column("score").unwrap()),
            vec![Some(20.0), Some(20.0)]
        );
    }

    #[test]
    fn test_numeric_string_result_is_parsed() {
        let text = FnAggregator::new("text", |column: &dyn Array| {
            Ok(Scalar::String(format!("{}", column.len())))
        });
        let result = group_by(&scores(), &["category"], &[("score", &text)]).unwrap();
        assert_eq!(
            floats(result.aggregate_column("score").unwrap()),
            vec![Some(3.0), Some(3.0)]
        );
    }

    #[test]
    fn test_empty_batch_has_no_groups() {
        let batch = scores().slice(0, 0);
        let result = group_by(&batch, &["category"], &[("score", &Aggregation::Sum)]).unwrap();
        assert_eq!(result.num_groups(), 0);
        assert_eq!(result.to_batch().unwrap().num_rows(), 0);
    }

    #[test]
    fn test_unsupported_key_type() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("day", DataType::Date32, false),
            Field::new("v", DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(arrow::array::Date32Array::from(vec![1, 1])),
                Arc::new(Int64Array::from(vec![1, 2])),
            ],
        )
        .unwrap();
        let err = group_by(&batch, &["day"], &[("v", &Aggregation::Sum)]).unwrap_err();
        assert!(matches!(err, KernelError::NotImplemented { operation: "group_by", .. }));
    }

    #[test]
    fn test_unknown_value_column() {
        let err = group_by(&scores(), &["category"], &[("height", &Aggregation::Sum)])
            .unwrap_err();
        assert!(matches!(err, KernelError::ColumnNotFound(name) if name == "height"));
    }

    #[test]
    fn test_cancellation() {
        let token = CancellationToken::new();
        let config = KernelConfig::new().with_cancellation(token.clone());
        assert!(group_by_with_config(
            &scores(),
            &["category"],
            &[("score", &Aggregation::Sum)],
            &config
        )
        .is_ok());

        token.cancel();
        let err = group_by_with_config(
            &scores(),
            &["category"],
            &[("score", &Aggregation::Sum)],
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::Cancelled));
    }

    #[test]
    fn test_cancel_from_inside_aggregator() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        let cancelling = FnAggregator::new("cancelling", move |column: &dyn Array| {
            trigger.cancel();
            Aggregation::Sum.aggregate(column)
        });
        let config = KernelConfig::new().with_cancellation(token);
        let err = group_by_with_config(
            &scores(),
            &["category"],
            &[("score", &cancelling)],
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::Cancelled));
    }
}

// =============================================================================
// ColumnBatch Tests
// =============================================================================

mod column_batch_tests {
    use super::*;

    #[test]
    fn test_filter_then_group() {
        let batch = ColumnBatch::new(scores());
        let high = BooleanArray::from(vec![false, true, true, false, true, true]);
        let filtered = batch.filter_by_mask(&high).unwrap();
        assert_eq!(filtered.num_rows(), 4);

        let result = filtered
            .group_by(&["category"], &[("score", &Aggregation::Mean)])
            .unwrap();
        assert_eq!(
            floats(result.aggregate_column("score").unwrap()),
            vec![Some(85.0), Some(85.0)]
        );
        let keys = strings(result.key_column("category").unwrap());
        assert_eq!(keys, vec![Some("B"), Some("A")]);
    }

    #[test]
    fn test_sort_by_then_materialize() {
        let batch = ColumnBatch::from(scores());
        let sorted = batch.sort_by("score", SortOrder::Descending).unwrap();
        let out = sorted.materialize().unwrap();
        assert_eq!(
            out.column(2).as_primitive::<Float64Type>().values().to_vec(),
            vec![90.0, 90.0, 80.0, 80.0, 70.0, 70.0]
        );
        assert_eq!(strings(out.column(0)), vec![
            Some("B"),
            Some("A"),
            Some("A"),
            Some("B"),
            Some("A"),
            Some("B"),
        ]);
    }

    #[test]
    fn test_aggregate_selected_rows() {
        let batch = ColumnBatch::new(scores())
            .filter_by_mask(&BooleanArray::from(vec![true, true, true, false, false, false]))
            .unwrap();
        assert_eq!(
            batch.aggregate("bonus", &Aggregation::Sum).unwrap(),
            Scalar::Int64(15)
        );
        assert_eq!(
            batch.aggregate("bonus", &Aggregation::CountNull).unwrap(),
            Scalar::Int64(1)
        );
    }

    #[test]
    fn test_filter_rows_by_column_then_group() {
        let batch = ColumnBatch::new(scores())
            .filter_rows_by_column(
                "score",
                &RowCondition::Between(Scalar::Int64(75), Scalar::Float64(90.0)),
            )
            .unwrap();
        assert_eq!(batch.num_rows(), 4);

        let result = batch
            .group_by(&["category"], &[("bonus", &Aggregation::Sum)])
            .unwrap();
        assert_eq!(strings(result.key_column("category").unwrap()), vec![Some("B"), Some("A")]);
        assert_eq!(
            floats(result.aggregate_column("bonus").unwrap()),
            vec![Some(2.0), Some(15.0)]
        );
    }

    #[test]
    fn test_null_cells_never_match() {
        let batch = ColumnBatch::new(scores());
        let low = batch
            .filter_rows_by_column("region", &RowCondition::LessThan(Scalar::Int64(2)))
            .unwrap();
        assert_eq!(low.selection().unwrap().indices, vec![0, 4]);

        let not_one = batch.filter_rows(|pos| pos != 0);
        let equal = not_one
            .filter_rows_by_column("region", &RowCondition::Equal(Scalar::Int64(2)))
            .unwrap();
        assert_eq!(equal.selection().unwrap().indices, vec![1, 2, 3]);
        let mean = equal.aggregate("score", &Aggregation::Mean).unwrap();
        assert!((mean.as_f64().unwrap() - 250.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_filter_rows_unsupported_column_type() {
        let schema = Arc::new(Schema::new(vec![Field::new("day", DataType::Date32, false)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(arrow::array::Date32Array::from(vec![1, 2]))],
        )
        .unwrap();
        let err = ColumnBatch::new(batch)
            .filter_rows_by_column("day", &RowCondition::Equal(Scalar::Int32(1)))
            .unwrap_err();
        assert!(matches!(err, KernelError::NotImplemented { operation: "filter_rows", .. }));
    }
}
