//! Ports connecting processors: a bounded slot plus finish/close/needed flags.

pub mod channel;
pub mod input_port;
pub mod output_port;

pub use channel::*;
pub use input_port::*;
pub use output_port::*;
