//! Host for one-in/one-out transforms.
//!
//! [`SimpleTransformProcessor`] owns the two ports and implements the
//! prepare/work protocol; a [`SimpleTransform`] only maps one input chunk to
//! one output chunk.

use tracing::trace;

use crate::error::Result;
use crate::port::{InputPort, OutputPort};
use crate::processor::{Processor, Status};

/// A synchronous chunk-to-chunk transform.
///
/// The host only calls `transform` once the previous output has been
/// accepted by the downstream port, so implementations need no backpressure
/// logic of their own.
pub trait SimpleTransform: Send {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &'static str;

    fn transform(&mut self, input: Self::Input) -> Result<Self::Output>;
}

/// Drives a [`SimpleTransform`] between an input and an output port.
pub struct SimpleTransformProcessor<T: SimpleTransform> {
    transform: T,
    input: InputPort<T::Input>,
    output: OutputPort<T::Output>,
    input_data: Option<T::Input>,
    output_data: Option<T::Output>,
}

impl<T: SimpleTransform> SimpleTransformProcessor<T> {
    pub fn new(transform: T, input: InputPort<T::Input>, output: OutputPort<T::Output>) -> Self {
        Self {
            transform,
            input,
            output,
            input_data: None,
            output_data: None,
        }
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }
}

impl<T: SimpleTransform> Processor for SimpleTransformProcessor<T> {
    fn name(&self) -> &'static str {
        self.transform.name()
    }

    fn prepare(&mut self) -> Result<Status> {
        // Downstream stopped listening: stop reading too.
        if self.output.is_finished() {
            self.input.close();
            return Ok(Status::Finished);
        }

        if !self.output.can_push() {
            self.input.set_not_needed();
            return Ok(Status::PortFull);
        }

        if let Some(chunk) = self.output_data.take() {
            self.output.push(chunk)?;
        }

        if self.input_data.is_some() {
            return Ok(Status::Ready);
        }

        if self.input.is_finished() {
            trace!(transform = self.transform.name(), "input exhausted");
            self.output.finish();
            return Ok(Status::Finished);
        }

        self.input.set_needed();
        match self.input.pull() {
            Some(chunk) => {
                self.input_data = Some(chunk);
                Ok(Status::Ready)
            }
            None => Ok(Status::NeedData),
        }
    }

    fn work(&mut self) -> Result<()> {
        if let Some(chunk) = self.input_data.take() {
            self.output_data = Some(self.transform.transform(chunk)?);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/simple_transform_tests.rs"]
mod tests;
