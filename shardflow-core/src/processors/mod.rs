//! Processors: the hash repartitioning pair plus the source, sink and
//! transform host they are wired with.

pub mod resize_by_hash;
pub mod simple_transform;
pub mod sink;
pub mod source;
pub mod splitting_by_hash;

pub use resize_by_hash::*;
pub use simple_transform::*;
pub use sink::*;
pub use source::*;
pub use splitting_by_hash::*;
