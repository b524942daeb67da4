// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Timestamps from suite start/finish lines
//!
//! xcodebuild has printed several variants over the years:
//! - `2010-10-02 13:39:23 GMT 0000`
//! - `2010-10-02 13:39:23 +0000`
//! - `2019-09-10 15:32:44.347` (no zone, taken as UTC)

use chrono::{DateTime, FixedOffset, NaiveDateTime};

use crate::error::ReportError;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parse a suite timestamp
///
/// # Errors
///
/// Returns `ReportError::InvalidTimestamp` if the date or zone is malformed.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, ReportError> {
    let value = raw.trim();
    let (naive, rest) = NaiveDateTime::parse_and_remainder(value, DATE_FORMAT)
        .map_err(|e| invalid(value, e.to_string()))?;

    let zone = rest.trim();
    let offset =
        parse_zone(zone).ok_or_else(|| invalid(value, format!("unrecognised time zone '{zone}'")))?;

    naive
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| invalid(value, "ambiguous local time".to_string()))
}

fn invalid(value: &str, reason: String) -> ReportError {
    ReportError::InvalidTimestamp {
        value: value.to_string(),
        reason,
    }
}

/// `GMT`, `UTC`, `GMT 0000`, `GMT+01:00`, `+0000`, `-08:00` or nothing
fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let zone = zone
        .strip_prefix("GMT")
        .or_else(|| zone.strip_prefix("UTC"))
        .unwrap_or(zone)
        .trim();
    if zone.is_empty() {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = if let Some(rest) = zone.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = zone.strip_prefix('-') {
        (-1, rest)
    } else {
        (1, zone)
    };

    let digits: String = digits.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use similar_asserts::assert_eq;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_gmt_with_trailing_offset() {
        let ts = parse_timestamp("2010-10-02 13:39:23 GMT 0000").expect("Should parse");
        assert_eq!(ts.with_timezone(&Utc), utc(2010, 10, 2, 13, 39, 23));
    }

    #[test]
    fn test_parse_numeric_offset() {
        let ts = parse_timestamp("2010-10-02 13:39:23 -0800").expect("Should parse");
        assert_eq!(ts.with_timezone(&Utc), utc(2010, 10, 2, 21, 39, 23));

        let ts = parse_timestamp("2010-10-02 13:39:23 GMT+01:00").expect("Should parse");
        assert_eq!(ts.with_timezone(&Utc), utc(2010, 10, 2, 12, 39, 23));
    }

    #[test]
    fn test_parse_fractional_without_zone() {
        let ts = parse_timestamp("2019-09-10 15:32:44.347").expect("Should parse");
        assert_eq!(ts.offset().local_minus_utc(), 0);
        assert_eq!(ts.timestamp_subsec_millis(), 347);
    }

    #[test]
    fn test_parse_invalid_date() {
        let err = parse_timestamp("yesterday at noon").unwrap_err();
        assert!(matches!(err, ReportError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_parse_invalid_zone() {
        let err = parse_timestamp("2010-10-02 13:39:23 PST").unwrap_err();
        match err {
            ReportError::InvalidTimestamp { value, reason } => {
                assert_eq!(value, "2010-10-02 13:39:23 PST");
                assert!(reason.contains("PST"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
