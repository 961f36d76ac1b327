//! The provider's health feed writes timestamps as
//! `Fri, 27 Jan 2023 06:02:51 GMT`. It looks like RFC 1123, except that the day
//! of month is not zero padded and the weekday is never checked against the
//! date, so the chrono RFC 2822 parser cannot be used directly.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

use super::error::DecodeError;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Everything after `<weekday>, ` and before the zone abbreviation.
const DATE_TIME_LAYOUT: &str = "%d %b %Y %H:%M:%S";

const CANONICAL_LAYOUT: &str = "%a, %-d %b %Y %H:%M:%S UTC";

const HOUR: i32 = 3600;

const ZONES: [(&str, i32); 33] = [
    ("UT", 0),
    ("UTC", 0),
    ("GMT", 0),
    ("Z", 0),
    ("WET", 0),
    ("EST", -5 * HOUR),
    ("EDT", -4 * HOUR),
    ("CST", -6 * HOUR),
    ("CDT", -5 * HOUR),
    ("MST", -7 * HOUR),
    ("MDT", -6 * HOUR),
    ("PST", -8 * HOUR),
    ("PDT", -7 * HOUR),
    ("AKST", -9 * HOUR),
    ("AKDT", -8 * HOUR),
    ("HST", -10 * HOUR),
    ("BST", HOUR),
    ("WEST", HOUR),
    ("CET", HOUR),
    ("CEST", 2 * HOUR),
    ("EET", 2 * HOUR),
    ("EEST", 3 * HOUR),
    ("SGT", 8 * HOUR),
    ("HKT", 8 * HOUR),
    ("AWST", 8 * HOUR),
    ("JST", 9 * HOUR),
    ("KST", 9 * HOUR),
    ("ACST", 9 * HOUR + HOUR / 2),
    ("ACDT", 10 * HOUR + HOUR / 2),
    ("AEST", 10 * HOUR),
    ("AEDT", 11 * HOUR),
    ("NZST", 12 * HOUR),
    ("NZDT", 13 * HOUR),
];

/// Resolves a zone abbreviation from the fixed table. Matching is exact, so
/// `utc` is not `UTC`.
pub fn zone_offset(abbrev: &str) -> Option<FixedOffset> {
    ZONES
        .iter()
        .find(|(name, _)| *name == abbrev)
        .and_then(|(_, seconds)| FixedOffset::east_opt(*seconds))
}

/// Parses one timestamp field.
///
/// `""` and `"null"` mean the provider left the field out and give `Ok(None)`.
/// Anything else must match the provider grammar, otherwise the error names
/// `field` and keeps the raw value.
pub fn parse_timestamp(field: &str, raw: &str) -> Result<Option<DateTime<Utc>>, DecodeError> {
    if raw.is_empty() || raw == "null" {
        return Ok(None);
    }
    let malformed = || DecodeError::malformed_timestamp(field, raw);

    let (weekday, rest) = raw.split_once(", ").ok_or_else(malformed)?;
    if !WEEKDAYS.iter().any(|day| day.eq_ignore_ascii_case(weekday)) {
        return Err(malformed());
    }

    // space padded days (`Fri,  7 Jan`) are accepted as well
    let (date_time, zone) = rest.trim_start().rsplit_once(' ').ok_or_else(malformed)?;
    if !has_four_digit_year(date_time) {
        return Err(malformed());
    }
    let offset = zone_offset(zone).ok_or_else(malformed)?;

    let naive = NaiveDateTime::parse_from_str(date_time, DATE_TIME_LAYOUT)
        .map_err(|err| malformed().with_parse_error(err))?;
    let local = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(malformed)?;

    Ok(Some(local.with_timezone(&Utc)))
}

/// Writes `at` in the provider grammar, always in UTC.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(CANONICAL_LAYOUT).to_string()
}

fn has_four_digit_year(date_time: &str) -> bool {
    date_time
        .split(' ')
        .nth(2)
        .map_or(false, |year| {
            year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::healthevent::DecodeErrorKind;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parses_provider_format() {
        let parsed = parse_timestamp("startTime", "Fri, 27 Jan 2023 06:02:51 GMT").unwrap();
        assert_eq!(parsed, Some(utc(2023, 1, 27, 6, 2, 51)));
    }

    #[test]
    fn test_weekday_is_not_checked_against_date() {
        let parsed = parse_timestamp("startTime", "Mon, 27 Jan 2023 06:02:51 UTC").unwrap();
        assert_eq!(parsed, Some(utc(2023, 1, 27, 6, 2, 51)));
    }

    #[test]
    fn test_day_is_not_zero_padded() {
        let parsed = parse_timestamp("endTime", "Fri, 3 Jun 2022 05:30:57 GMT").unwrap();
        assert_eq!(parsed, Some(utc(2022, 6, 3, 5, 30, 57)));

        let spaced = parse_timestamp("endTime", "Fri,  3 Jun 2022 05:30:57 GMT").unwrap();
        assert_eq!(spaced, parsed);
    }

    #[test]
    fn test_zone_abbreviation_shifts_to_utc() {
        let parsed = parse_timestamp("startTime", "Thu, 9 Jun 2022 22:01:10 PDT").unwrap();
        assert_eq!(parsed, Some(utc(2022, 6, 10, 5, 1, 10)));

        let parsed = parse_timestamp("startTime", "Fri, 10 Jun 2022 15:31:10 ACST").unwrap();
        assert_eq!(parsed, Some(utc(2022, 6, 10, 6, 1, 10)));
    }

    #[test]
    fn test_names_match_regardless_of_case() {
        let parsed = parse_timestamp("startTime", "fri, 27 jan 2023 06:02:51 GMT").unwrap();
        assert_eq!(parsed, Some(utc(2023, 1, 27, 6, 2, 51)));

        let parsed = parse_timestamp("startTime", "FRI, 27 JAN 2023 06:02:51 GMT").unwrap();
        assert_eq!(parsed, Some(utc(2023, 1, 27, 6, 2, 51)));
    }

    #[test]
    fn test_empty_and_null_are_absent() {
        assert_eq!(parse_timestamp("startTime", "").unwrap(), None);
        assert_eq!(parse_timestamp("startTime", "null").unwrap(), None);
    }

    #[test]
    fn test_rejects_strings_outside_the_grammar() {
        let cases = [
            "not a date",
            "NULL",
            " ",
            "2023-01-27T06:02:51Z",
            "Fri 27 Jan 2023 06:02:51 GMT",
            "Fri, 27 Jan 2023 06:02:51",
            "Fri, 27 Jan 2023 06:02:51 GMT ",
            "Fri, 27 Jan 2023 06:02:51 XYZ",
            "Fri, 27 Jan 2023 06:02:51 utc",
            "Fri, 27 Jan 23 06:02:51 GMT",
            "Fri, 32 Jan 2023 06:02:51 GMT",
            "Fri, 27 Foo 2023 06:02:51 GMT",
            "Fri, 27 Jan 2023 25:02:51 GMT",
            "Friday, 27 Jan 2023 06:02:51 GMT",
            "Fri, 27 Jan 2023 06:02 GMT",
        ];
        for raw in cases.iter() {
            let err = parse_timestamp("lastUpdatedTime", raw).unwrap_err();
            assert_eq!(err.kind(), DecodeErrorKind::MalformedTimestamp, "{:?}", raw);
            match err {
                DecodeError::MalformedTimestamp { field, value, .. } => {
                    assert_eq!(field, "lastUpdatedTime");
                    assert_eq!(&value, raw);
                }
                other => panic!("unexpected error {:?}", other),
            }
        }
    }

    #[test]
    fn test_chrono_failure_is_kept_as_source() {
        let err = parse_timestamp("startTime", "Fri, 32 Jan 2023 06:02:51 GMT").unwrap_err();
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_canonical_form_parses_back_to_the_same_instant() {
        let cases = [
            "Fri, 27 Jan 2023 06:02:51 GMT",
            "Mon, 27 Jan 2023 06:02:51 UTC",
            "Fri, 3 Jun 2022 05:30:57 GMT",
            "Thu, 9 Jun 2022 22:01:10 PDT",
            "Sat, 31 Dec 2022 23:59:59 EST",
            "Sun, 1 Jan 2023 09:00:00 JST",
            "Tue, 29 Feb 2000 12:00:00 NZDT",
        ];
        for raw in cases.iter() {
            let parsed = parse_timestamp("startTime", raw).unwrap().unwrap();
            let formatted = format_timestamp(&parsed);
            let reparsed = parse_timestamp("startTime", &formatted).unwrap().unwrap();
            assert_eq!(reparsed, parsed, "{} -> {}", raw, formatted);
        }
    }

    #[test]
    fn test_format_uses_unpadded_day() {
        assert_eq!(
            format_timestamp(&utc(2022, 6, 3, 5, 30, 57)),
            "Fri, 3 Jun 2022 05:30:57 UTC"
        );
    }

    #[test]
    fn test_zone_table() {
        assert_eq!(zone_offset("GMT"), FixedOffset::east_opt(0));
        assert_eq!(zone_offset("PST"), FixedOffset::west_opt(8 * 3600));
        assert_eq!(zone_offset("ACDT"), FixedOffset::east_opt(10 * 3600 + 1800));
        assert_eq!(zone_offset("XYZ"), None);
    }
}
