use super::*;

use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Int32Array};
use arrow::datatypes::{DataType, Field, Int32Type, Schema};

use crate::port::channel;

fn batch(values: Vec<i32>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(values)) as ArrayRef]).unwrap()
}

fn values(batch: &RecordBatch) -> Vec<i32> {
    batch.column(0).as_primitive::<Int32Type>().values().to_vec()
}

fn split(parts: Vec<Vec<i32>>) -> SplitChunks {
    SplitChunks::new(parts.into_iter().map(batch).collect())
}

/// Stage with `n` single-slot outputs; returns the upstream port and the
/// consumer side of every output.
fn setup(
    n: usize,
) -> (
    ResizeByHashTransform,
    OutputPort<SplitChunks>,
    Vec<InputPort<RecordBatch>>,
) {
    let (upstream, input) = channel::<SplitChunks>(1);
    let (outputs, consumers): (Vec<_>, Vec<_>) = (0..n).map(|_| channel(1)).unzip();
    let stage = ResizeByHashTransform::try_new(input, outputs).unwrap();
    (stage, upstream, consumers)
}

#[test]
fn test_resize_rejects_single_output() {
    let (_upstream, input) = channel::<SplitChunks>(1);
    let (output, _consumer) = channel::<RecordBatch>(1);

    let err = ResizeByHashTransform::try_new(input, vec![output]).unwrap_err();
    assert!(matches!(err, ProcessorError::Config(_)));
}

#[test]
fn test_resize_needs_data_initially() {
    let (mut stage, upstream, consumers) = setup(2);

    assert_eq!(stage.prepare().unwrap(), Status::NeedData);
    assert!(!stage.is_generating());
    assert!(upstream.is_needed());
    assert!(consumers.iter().all(|c| !c.has_data()));
}

#[test]
fn test_resize_delivers_each_chunk_to_its_output() {
    let (mut stage, upstream, consumers) = setup(3);
    upstream.push(split(vec![vec![1, 2], vec![], vec![3]])).unwrap();

    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    assert!(stage.is_generating());
    stage.work().unwrap();

    // Both non-empty chunks go out; the empty one is skipped. Output 0 and 2
    // are now full but output 1 has room, so the stage goes back to waiting
    // for input in the same call.
    assert_eq!(stage.prepare().unwrap(), Status::NeedData);
    assert!(!stage.is_generating());

    assert_eq!(values(&consumers[0].pull().unwrap()), vec![1, 2]);
    assert!(consumers[1].pull().is_none());
    assert_eq!(values(&consumers[2].pull().unwrap()), vec![3]);
}

#[test]
fn test_resize_backpressure_eventually_delivers_once() {
    let (mut stage, upstream, consumers) = setup(2);

    // First payload fills both outputs.
    upstream.push(split(vec![vec![1], vec![2]])).unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    stage.work().unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::PortFull);

    // Consumer 0 drains, consumer 1 stalls.
    assert_eq!(values(&consumers[0].pull().unwrap()), vec![1]);

    upstream.push(split(vec![vec![10, 11], vec![20]])).unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    stage.work().unwrap();

    // Output 0 is served right away, output 1 is retried on every call.
    for _ in 0..5 {
        assert_eq!(stage.prepare().unwrap(), Status::PortFull);
        assert!(stage.is_generating());
    }
    assert_eq!(values(&consumers[0].pull().unwrap()), vec![10, 11]);

    // Output 0 got its chunk already; repeated calls must not resend it.
    for _ in 0..3 {
        assert_eq!(stage.prepare().unwrap(), Status::PortFull);
        assert!(!consumers[0].has_data());
    }

    // Consumer 1 frees its slot; the pending chunk is delivered.
    assert_eq!(values(&consumers[1].pull().unwrap()), vec![2]);
    assert_eq!(stage.prepare().unwrap(), Status::NeedData);
    assert!(!stage.is_generating());

    assert_eq!(values(&consumers[1].pull().unwrap()), vec![20]);
    assert!(!consumers[0].has_data());
    assert!(!consumers[1].has_data());
}

#[test]
fn test_resize_port_full_when_every_output_full() {
    let (mut stage, upstream, consumers) = setup(2);

    upstream.push(split(vec![vec![1], vec![2]])).unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    stage.work().unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::PortFull);

    // Next payload waits upstream while nothing has room.
    upstream.push(split(vec![vec![3], vec![4]])).unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::PortFull);
    assert!(!stage.is_generating());
    assert!(!upstream.can_push());

    consumers[1].pull().unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::Ready);
}

#[test]
fn test_resize_empty_payload_does_not_stall() {
    let (mut stage, upstream, consumers) = setup(3);
    upstream.push(split(vec![vec![], vec![], vec![]])).unwrap();

    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    stage.work().unwrap();

    // Everything is skippable: straight back to consuming in one call.
    assert_eq!(stage.prepare().unwrap(), Status::NeedData);
    assert!(consumers.iter().all(|c| !c.has_data()));
}

#[test]
fn test_resize_finishes_when_input_exhausted() {
    let (mut stage, upstream, consumers) = setup(2);

    upstream.push(split(vec![vec![1], vec![]])).unwrap();
    upstream.finish();

    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    stage.work().unwrap();
    // Output 1 still has room, input is now drained and finished.
    assert_eq!(stage.prepare().unwrap(), Status::Finished);

    // Data pushed before finishing is still readable.
    assert!(!consumers[0].is_finished());
    assert_eq!(values(&consumers[0].pull().unwrap()), vec![1]);
    assert!(consumers[0].is_finished());
    assert!(consumers[1].is_finished());

    // Polling again is harmless.
    assert_eq!(stage.prepare().unwrap(), Status::Finished);
}

#[test]
fn test_resize_closes_input_when_all_outputs_finished() {
    let (mut stage, upstream, consumers) = setup(2);

    for consumer in &consumers {
        consumer.close();
    }

    assert_eq!(stage.prepare().unwrap(), Status::Finished);
    assert!(upstream.is_finished());
}

#[test]
fn test_resize_skips_output_finished_mid_flight() {
    let (mut stage, upstream, consumers) = setup(2);

    upstream.push(split(vec![vec![1], vec![2]])).unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    stage.work().unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::PortFull);
    consumers[0].pull().unwrap();

    upstream.push(split(vec![vec![3], vec![4]])).unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    stage.work().unwrap();
    assert_eq!(stage.prepare().unwrap(), Status::PortFull);

    // Consumer 1 goes away while its chunk is pending.
    consumers[1].close();
    assert_eq!(stage.prepare().unwrap(), Status::PortFull);
    assert!(!stage.is_generating());

    // Once consumer 0 also leaves, the stage shuts its input.
    consumers[0].close();
    assert_eq!(stage.prepare().unwrap(), Status::Finished);
    assert!(upstream.is_finished());
}

#[test]
fn test_resize_rejects_chunk_count_mismatch() {
    let (mut stage, upstream, _consumers) = setup(2);
    upstream.push(split(vec![vec![1], vec![2], vec![3]])).unwrap();

    assert_eq!(stage.prepare().unwrap(), Status::Ready);
    let err = stage.work().unwrap_err();
    assert!(err.is_internal(), "unexpected error: {err}");
    assert!(err.to_string().contains("expected 2 chunks"));
}

#[test]
fn test_resize_work_without_payload_is_internal_error() {
    let (mut stage, _upstream, _consumers) = setup(2);
    let err = stage.work().unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn test_resize_preserves_payload_order_per_output() {
    let (mut stage, upstream, consumers) = setup(2);
    let mut received: Vec<Vec<i32>> = vec![Vec::new(), Vec::new()];

    let payloads = vec![
        split(vec![vec![1], vec![100]]),
        split(vec![vec![2, 3], vec![]]),
        split(vec![vec![], vec![101, 102]]),
        split(vec![vec![4], vec![103]]),
    ];
    let mut pending = payloads.into_iter();
    let mut upstream_done = false;

    for _ in 0..100 {
        if !upstream_done && upstream.can_push() {
            match pending.next() {
                Some(payload) => upstream.push(payload).unwrap(),
                None => {
                    upstream.finish();
                    upstream_done = true;
                }
            }
        }

        match stage.prepare().unwrap() {
            Status::Ready => stage.work().unwrap(),
            Status::Finished => break,
            Status::NeedData | Status::PortFull => {}
        }

        for (consumer, out) in consumers.iter().zip(received.iter_mut()) {
            if let Some(batch) = consumer.pull() {
                out.extend(values(&batch));
            }
        }
    }

    for (consumer, out) in consumers.iter().zip(received.iter_mut()) {
        while let Some(batch) = consumer.pull() {
            out.extend(values(&batch));
        }
        assert!(consumer.is_finished());
    }
    assert_eq!(received[0], vec![1, 2, 3, 4]);
    assert_eq!(received[1], vec![100, 101, 102, 103]);
}
