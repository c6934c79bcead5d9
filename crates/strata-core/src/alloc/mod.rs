//! Optimized allocation and collection types for Strata.
//!
//! This module provides:
//! - Re-exports of optimized hash collections using AHash
//! - [`DenseIndex`], which hands out small dense slots on first encounter

pub mod dense_index;

pub use dense_index::DenseIndex;

// Re-export optimized hash collections
pub use ahash::{AHashMap as HashMap, AHashSet as HashSet, RandomState};
