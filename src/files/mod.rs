//! Filesystem helpers

mod tree;

pub use tree::*;
