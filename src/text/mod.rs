//! Plain text helpers
//!
//! - [`TextReader`] reads simple line-oriented files, skipping blanks and comments
//! - [`datetime`] converts compact log dates and times to display form and back

pub mod datetime;
mod reader;

pub use datetime::{
    format_date, format_time, format_timestamp, make_utf8, unformat_date, unformat_time,
};
pub use reader::*;
