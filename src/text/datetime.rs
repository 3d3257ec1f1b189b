//! Date and time string conversion
//!
//! Logging programs and callbook records carry dates as `YYYYMMDD` and times
//! as `HHMM` or `HHMMSS`. These helpers convert between that compact form and
//! the dashed/colon display form, rejecting values that are not real dates or
//! times.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveTime};

use crate::error::FormatError;

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_compact_date(date_in: &str) -> Result<NaiveDate, FormatError> {
    if date_in.len() != 8 || !all_digits(date_in) {
        return Err(FormatError::InvalidDate(date_in.to_string()));
    }
    NaiveDate::parse_from_str(date_in, "%Y%m%d")
        .map_err(|_| FormatError::InvalidDate(date_in.to_string()))
}

fn parse_compact_time(time_in: &str) -> Result<NaiveTime, FormatError> {
    let fmt = match time_in.len() {
        4 => "%H%M",
        6 => "%H%M%S",
        _ => return Err(FormatError::InvalidTime(time_in.to_string())),
    };
    if !all_digits(time_in) {
        return Err(FormatError::InvalidTime(time_in.to_string()));
    }
    NaiveTime::parse_from_str(time_in, fmt)
        .map_err(|_| FormatError::InvalidTime(time_in.to_string()))
}

/// Format a `YYYYMMDD` date as `YYYY-MM-DD`
pub fn format_date(date_in: &str) -> Result<String, FormatError> {
    Ok(parse_compact_date(date_in)?.format("%Y-%m-%d").to_string())
}

/// Format an `HHMM` or `HHMMSS` time as `HH:MM:SS` (seconds default to `00`)
pub fn format_time(time_in: &str) -> Result<String, FormatError> {
    Ok(parse_compact_time(time_in)?.format("%H:%M:%S").to_string())
}

/// Format a `YYYYMMDDHHMM[SS]` timestamp as `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(timestamp_in: &str) -> Result<String, FormatError> {
    let invalid = || FormatError::InvalidTimestamp(timestamp_in.to_string());

    if !timestamp_in.is_ascii() || timestamp_in.len() < 8 {
        return Err(invalid());
    }
    let (date_in, time_in) = timestamp_in.split_at(8);
    let date = format_date(date_in).map_err(|_| invalid())?;
    let time = format_time(time_in).map_err(|_| invalid())?;
    Ok(format!("{} {}", date, time))
}

/// Strip the dashes from a `YYYY-MM-DD` date, giving `YYYYMMDD`
pub fn unformat_date(date_in: &str) -> Result<String, FormatError> {
    let date = NaiveDate::parse_from_str(date_in, "%Y-%m-%d")
        .ok()
        .filter(|_| date_in.len() == 10)
        .ok_or_else(|| FormatError::InvalidDate(date_in.to_string()))?;
    Ok(date.format("%Y%m%d").to_string())
}

/// Strip the colons from an `HH:MM` or `HH:MM:SS` time, keeping its precision
pub fn unformat_time(time_in: &str) -> Result<String, FormatError> {
    let (parse_fmt, out_fmt) = match time_in.len() {
        5 => ("%H:%M", "%H%M"),
        8 => ("%H:%M:%S", "%H%M%S"),
        _ => return Err(FormatError::InvalidTime(time_in.to_string())),
    };
    let time = NaiveTime::parse_from_str(time_in, parse_fmt)
        .map_err(|_| FormatError::InvalidTime(time_in.to_string()))?;
    Ok(time.format(out_fmt).to_string())
}

/// Decode external text as UTF-8, replacing invalid sequences
///
/// Callbook lookups occasionally return names in a legacy encoding.
pub fn make_utf8(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
