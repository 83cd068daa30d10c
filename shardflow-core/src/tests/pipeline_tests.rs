use super::*;

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Int64Type, Schema};

use crate::config::KeyColumn;
use crate::error::ProcessorError;

fn schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("user", DataType::Utf8, false),
    ]))
}

/// `num_batches` batches of `rows` rows; ids count up across batches and
/// users cycle through `users` names.
fn batches(num_batches: usize, rows: usize, users: usize) -> Vec<RecordBatch> {
    (0..num_batches)
        .map(|b| {
            let start = (b * rows) as i64;
            let ids: Vec<i64> = (start..start + rows as i64).collect();
            let names: Vec<String> = ids
                .iter()
                .map(|i| format!("user-{}", *i as usize % users))
                .collect();
            RecordBatch::try_new(
                schema(),
                vec![
                    Arc::new(Int64Array::from(ids)) as ArrayRef,
                    Arc::new(StringArray::from(names)) as ArrayRef,
                ],
            )
            .unwrap()
        })
        .collect()
}

fn rows_of(output: &[RecordBatch]) -> Vec<(i64, String)> {
    output
        .iter()
        .flat_map(|batch| {
            let ids = batch.column(0).as_primitive::<Int64Type>();
            let users = batch.column(1).as_string::<i32>();
            (0..batch.num_rows())
                .map(|i| (ids.value(i), users.value(i).to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn test_pipeline_builds_expected_graph() {
    let config = RepartitionConfig::new(3, ["user"]);
    let repartition = hash_repartition(schema(), batches(1, 4, 2), &config).unwrap();

    assert_eq!(repartition.outputs().len(), 3);
    assert_eq!(
        repartition.executor().names(),
        vec![
            "BatchSource",
            "SplittingByHash",
            "ResizeByHash",
            "CollectSink",
            "CollectSink",
            "CollectSink"
        ]
    );
    assert_eq!(repartition.executor().edges().len(), 5);
}

#[test]
fn test_pipeline_rejects_bad_config() {
    let one_output = RepartitionConfig::new(1, ["user"]);
    let err = hash_repartition(schema(), Vec::new(), &one_output).unwrap_err();
    assert!(matches!(err, ProcessorError::Config(_)));

    let unknown = RepartitionConfig::new(2, ["country"]);
    let err = hash_repartition(schema(), Vec::new(), &unknown).unwrap_err();
    assert!(matches!(err, ProcessorError::Config(_)));

    let no_slots = RepartitionConfig::new(2, ["user"]).with_port_capacity(0);
    let err = hash_repartition(schema(), Vec::new(), &no_slots).unwrap_err();
    assert!(matches!(err, ProcessorError::Config(_)));

    let no_keys = RepartitionConfig::new(2, Vec::<KeyColumn>::new());
    let err = hash_repartition(schema(), Vec::new(), &no_keys).unwrap_err();
    assert!(matches!(err, ProcessorError::Config(_)));
}

#[test]
fn test_pipeline_conserves_and_colocates_rows() {
    let config = RepartitionConfig::new(4, ["user"]);
    let outputs = hash_repartition(schema(), batches(6, 50, 13), &config)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(outputs.len(), 4);

    let mut owner: HashMap<String, usize> = HashMap::new();
    let mut all_ids = Vec::new();
    for (index, output) in outputs.iter().enumerate() {
        let rows = rows_of(output);

        // Per-output order follows input order.
        let ids: Vec<i64> = rows.iter().map(|(id, _)| *id).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "output {index} out of order");

        for (_, user) in rows {
            assert_eq!(*owner.entry(user.clone()).or_insert(index), index, "{user}");
        }
        all_ids.extend(ids);

        // Empty sub-batches are never delivered.
        assert!(output.iter().all(|b| b.num_rows() > 0));
    }

    all_ids.sort_unstable();
    assert_eq!(all_ids, (0..300).collect::<Vec<i64>>());
    assert_eq!(owner.len(), 13);
}

#[test]
fn test_pipeline_empty_input() {
    let config = RepartitionConfig::new(2, [1usize]);
    let outputs = hash_repartition(schema(), Vec::new(), &config)
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(outputs, vec![Vec::<RecordBatch>::new(), Vec::new()]);
}

#[test]
fn test_pipeline_capacity_does_not_change_routing() {
    let single = RepartitionConfig::new(3, [1usize]);
    let wide = single.clone().with_port_capacity(8);

    let a = hash_repartition(schema(), batches(5, 20, 7), &single)
        .unwrap()
        .run()
        .unwrap();
    let b = hash_repartition(schema(), batches(5, 20, 7), &wide)
        .unwrap()
        .run()
        .unwrap();

    let rows_a: Vec<_> = a.iter().map(|o| rows_of(o)).collect();
    let rows_b: Vec<_> = b.iter().map(|o| rows_of(o)).collect();
    assert_eq!(rows_a, rows_b);
}

#[test]
fn test_pipeline_threaded_matches_single_threaded() {
    let config = RepartitionConfig::new(5, ["user", "id"]);

    let single = hash_repartition(schema(), batches(20, 32, 9), &config)
        .unwrap()
        .run()
        .unwrap();
    let threaded = hash_repartition(schema(), batches(20, 32, 9), &config)
        .unwrap()
        .run_threaded()
        .unwrap();

    for (s, t) in single.iter().zip(threaded.iter()) {
        assert_eq!(rows_of(s), rows_of(t));
    }
}
