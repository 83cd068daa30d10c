//! Ready-made graph: source → splitting stage → fan-out stage → N sinks.

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::config::RepartitionConfig;
use crate::error::Result;
use crate::port::channel;
use crate::processors::{
    BatchSource, CollectSink, CollectedBatches, ResizeByHashTransform, SplittingByHashTransform,
};
use crate::runtime::PipelineExecutor;

/// A built repartition pipeline and the handles of its output sinks.
#[derive(Debug)]
pub struct HashRepartition {
    executor: PipelineExecutor,
    outputs: Vec<CollectedBatches>,
}

impl HashRepartition {
    pub fn executor(&self) -> &PipelineExecutor {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut PipelineExecutor {
        &mut self.executor
    }

    /// One handle per output, in output order.
    pub fn outputs(&self) -> &[CollectedBatches] {
        &self.outputs
    }

    pub fn into_parts(self) -> (PipelineExecutor, Vec<CollectedBatches>) {
        (self.executor, self.outputs)
    }

    /// Run on the calling thread and return the batches of every output.
    pub fn run(mut self) -> anyhow::Result<Vec<Vec<RecordBatch>>> {
        self.executor.run()?;
        Ok(self.outputs.iter().map(CollectedBatches::batches).collect())
    }

    /// Run with one thread per processor and return the batches of every output.
    pub fn run_threaded(self) -> anyhow::Result<Vec<Vec<RecordBatch>>> {
        let (executor, outputs) = self.into_parts();
        executor.run_threaded()?;
        Ok(outputs.iter().map(CollectedBatches::batches).collect())
    }
}

/// Build a pipeline that spreads `batches` over `config.num_outputs` outputs
/// by the hash of the configured key columns.
///
/// Fails with [`ProcessorError::Config`](crate::error::ProcessorError::Config)
/// when the configuration does not fit `schema`.
pub fn hash_repartition<I>(
    schema: SchemaRef,
    batches: I,
    config: &RepartitionConfig,
) -> Result<HashRepartition>
where
    I: IntoIterator<Item = RecordBatch>,
    I::IntoIter: Send + 'static,
{
    config.validate()?;
    let key_columns = config.resolve_key_columns(&schema)?;
    let splitter = SplittingByHashTransform::try_new(schema, config.num_outputs, key_columns)?;
    let capacity = config.port_capacity;

    let (source_out, split_in) = channel(capacity);
    let (split_out, resize_in) = channel(capacity);
    let (resize_outs, sink_ins): (Vec<_>, Vec<_>) =
        (0..config.num_outputs).map(|_| channel(capacity)).unzip();

    let sinks: Vec<CollectSink> = sink_ins.into_iter().map(CollectSink::new).collect();
    let outputs = sinks.iter().map(CollectSink::handle).collect();

    let mut executor = PipelineExecutor::new();
    let source = executor.add_processor(BatchSource::new(batches, source_out));
    let split = executor.add_processor(splitter.into_processor(split_in, split_out));
    let resize = executor.add_processor(ResizeByHashTransform::try_new(resize_in, resize_outs)?);
    executor.connect(source, split)?;
    executor.connect(split, resize)?;
    for sink in sinks {
        let sink = executor.add_processor(sink);
        executor.connect(resize, sink)?;
    }

    debug!(
        outputs = config.num_outputs,
        capacity,
        processors = executor.len(),
        "built hash repartition pipeline"
    );
    Ok(HashRepartition { executor, outputs })
}

#[cfg(test)]
#[path = "tests/pipeline_tests.rs"]
mod tests;
