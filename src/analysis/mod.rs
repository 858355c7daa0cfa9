//! Analysis stages.
//!
//! Filtering, grouping and partitioning of the loaded records. Every stage
//! is a pure function over the previous stage's output.

pub mod aggregator;
pub mod filter;
pub mod partition;

pub use aggregator::*;
pub use filter::*;
pub use partition::*;
