//! # Shardflow Core
//!
//! Hash repartitioning for a cooperative, pull-based columnar pipeline.
//!
//! Rows of every incoming Arrow batch are spread over N output streams by a
//! hash of designated key columns, so all rows sharing a key end up on the
//! same output. The work is split between two processors:
//!
//! - [`SplittingByHashTransform`](processors::SplittingByHashTransform):
//!   one batch in, one [`SplitChunks`](types::SplitChunks) out.
//! - [`ResizeByHashTransform`](processors::ResizeByHashTransform): one
//!   `SplitChunks` in, its `i`-th batch out on port `i`, with per-output
//!   backpressure.
//!
//! Supporting modules:
//!
//! - [`partitioner`]: row hashing, bucket selection and the physical split.
//! - [`port`]: bounded single-producer/single-consumer ports.
//! - [`processor`]: the `prepare`/`work` contract.
//! - [`runtime`]: cooperative and threaded executors.
//! - [`config`]: serializable [`RepartitionConfig`](config::RepartitionConfig).
//! - [`pipeline`]: [`hash_repartition`](pipeline::hash_repartition), the
//!   whole graph in one call.

pub mod config;
pub mod error;
pub mod partitioner;
pub mod pipeline;
pub mod port;
pub mod processor;
pub mod processors;
pub mod runtime;
pub mod types;

pub use config::{KeyColumn, RepartitionConfig};
pub use error::{ProcessorError, Result};
pub use pipeline::{HashRepartition, hash_repartition};
pub use processor::{Processor, Status};
