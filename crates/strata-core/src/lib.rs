//! Strata Core
//!
//! Shared utilities for the Strata render queue: hashing collections, the dense
//! slot index, geometry primitives, math re-exports, logging and profiling.

pub mod alloc;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod profiling;
