//! INI-style configuration store
//!
//! File layout:
//!
//! ```text
//! ; comment line
//! [Station]
//! callsign = AB3GY
//! power = 100
//! ```
//!
//! Keys before the first header belong to the [`DEFAULT_SECTION`].

pub mod parser;
mod section;
mod store;
mod value;

pub use section::*;
pub use store::*;
pub use value::*;
