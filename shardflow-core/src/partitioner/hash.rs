//! 32-bit incremental row hashing over Arrow columns.
//!
//! Each row starts at [`WEAK_HASH_SEED`]. Key columns are then folded in one
//! at a time: the row's current 32-bit state and the column value are hashed
//! together and the 64-bit result is folded back to 32 bits. Because the
//! previous state is part of the hashed input, `[a, b]` and `[b, a]` produce
//! different hashes.

use std::hash::Hash;

use ahash::RandomState;
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Date64Type, Float32Type, Float64Type, Int8Type,
    Int16Type, Int32Type, Int64Type, TimeUnit, TimestampMicrosecondType,
    TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};

use crate::error::{ProcessorError, Result};

/// Initial per-row hash, before any key column is folded in.
pub const WEAK_HASH_SEED: u32 = u32::MAX;

// Fixed seeds: every splitter instance, on every thread, must agree on where
// a key goes.
const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

fn fixed_random_state() -> RandomState {
    RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3])
}

/// Per-row 32-bit hash accumulator.
///
/// Reused across batches so the buffer is allocated once per stage.
#[derive(Clone)]
pub struct WeakHash32 {
    data: Vec<u32>,
    random_state: RandomState,
}

impl WeakHash32 {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            random_state: fixed_random_state(),
        }
    }

    /// Size the buffer to `num_rows` and set every entry to [`WEAK_HASH_SEED`].
    pub fn reset(&mut self, num_rows: usize) {
        self.data.clear();
        self.data.resize(num_rows, WEAK_HASH_SEED);
    }

    /// Fold one column into the buffer.
    pub fn update(&mut self, column: &dyn Array) -> Result<()> {
        update_weak_hash32(column, &self.random_state, &mut self.data)
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for WeakHash32 {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WeakHash32 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakHash32")
            .field("rows", &self.data.len())
            .finish()
    }
}

/// Whether [`update_weak_hash32`] can hash columns of this type.
pub fn is_hashable(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Date32
            | DataType::Date64
            | DataType::Timestamp(_, _)
            | DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Binary
            | DataType::LargeBinary
    )
}

/// Fold `column` into `hashes`, one entry per row.
///
/// Floats are hashed by bit pattern. Nulls hash as a fixed marker distinct
/// from every value, so all null keys land together.
pub fn update_weak_hash32(
    column: &dyn Array,
    random_state: &RandomState,
    hashes: &mut [u32],
) -> Result<()> {
    if column.len() != hashes.len() {
        return Err(ProcessorError::internal(format!(
            "hash buffer has {} rows but column has {}",
            hashes.len(),
            column.len()
        )));
    }

    match column.data_type() {
        DataType::Boolean => fold_values(column.as_boolean().iter(), random_state, hashes),
        DataType::Int8 => fold_primitive::<Int8Type>(column, random_state, hashes),
        DataType::Int16 => fold_primitive::<Int16Type>(column, random_state, hashes),
        DataType::Int32 => fold_primitive::<Int32Type>(column, random_state, hashes),
        DataType::Int64 => fold_primitive::<Int64Type>(column, random_state, hashes),
        DataType::UInt8 => fold_primitive::<UInt8Type>(column, random_state, hashes),
        DataType::UInt16 => fold_primitive::<UInt16Type>(column, random_state, hashes),
        DataType::UInt32 => fold_primitive::<UInt32Type>(column, random_state, hashes),
        DataType::UInt64 => fold_primitive::<UInt64Type>(column, random_state, hashes),
        DataType::Float32 => fold_values(
            column
                .as_primitive::<Float32Type>()
                .iter()
                .map(|v| v.map(f32::to_bits)),
            random_state,
            hashes,
        ),
        DataType::Float64 => fold_values(
            column
                .as_primitive::<Float64Type>()
                .iter()
                .map(|v| v.map(f64::to_bits)),
            random_state,
            hashes,
        ),
        DataType::Date32 => fold_primitive::<Date32Type>(column, random_state, hashes),
        DataType::Date64 => fold_primitive::<Date64Type>(column, random_state, hashes),
        DataType::Timestamp(TimeUnit::Second, _) => {
            fold_primitive::<TimestampSecondType>(column, random_state, hashes)
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            fold_primitive::<TimestampMillisecondType>(column, random_state, hashes)
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            fold_primitive::<TimestampMicrosecondType>(column, random_state, hashes)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            fold_primitive::<TimestampNanosecondType>(column, random_state, hashes)
        }
        DataType::Utf8 => fold_values(column.as_string::<i32>().iter(), random_state, hashes),
        DataType::LargeUtf8 => fold_values(column.as_string::<i64>().iter(), random_state, hashes),
        DataType::Binary => fold_values(column.as_binary::<i32>().iter(), random_state, hashes),
        DataType::LargeBinary => {
            fold_values(column.as_binary::<i64>().iter(), random_state, hashes)
        }
        other => {
            return Err(ProcessorError::internal(format!(
                "cannot hash key column of type {other}"
            )));
        }
    }
    Ok(())
}

fn fold_primitive<T>(column: &dyn Array, random_state: &RandomState, hashes: &mut [u32])
where
    T: ArrowPrimitiveType,
    T::Native: Hash,
{
    fold_values(column.as_primitive::<T>().iter(), random_state, hashes)
}

#[inline]
fn fold_values<V, I>(values: I, random_state: &RandomState, hashes: &mut [u32])
where
    V: Hash,
    I: Iterator<Item = Option<V>>,
{
    for (hash, value) in hashes.iter_mut().zip(values) {
        *hash = fold_to_u32(random_state.hash_one((*hash, value)));
    }
}

#[inline]
fn fold_to_u32(wide: u64) -> u32 {
    ((wide >> 32) ^ wide) as u32
}
