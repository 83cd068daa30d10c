//! Execution of processor graphs: ordering and the prepare/work drivers.

pub mod core;
pub mod executor;

pub use core::*;
pub use executor::*;
