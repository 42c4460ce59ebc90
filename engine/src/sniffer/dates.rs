//! Heuristic date recognition.
//!
//! A value is a date when it matches one of [`DATE_FORMATS`] *and*
//! [`decode_date`] turns it into a valid timestamp. The patterns only
//! decide the overall shape; the decoder does the calendar work and
//! rejects impossible values such as `02/30/2020`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Optional time-of-day suffix shared by the numeric and month-name shapes.
const TIME_SUFFIX: &str = r"([\sT]?(0?[0-9]|1[0-9]|2[0-4]):(0?[1-9]|[012345][0-9])(:(0?[1-9]|[012345][0-9])(\.[0-9]{1,3})?)?((\s*[+-](0?[0-9]|1[0-9]|2[0-4])(:)?(0?[1-9]|[012345][0-9]))|(\s*[A-Za-z]{1,3}))*?)?";

const SEP: &str = r"[-_./\s]";

/// Shapes a date value may take. Matched against the trimmed value.
pub static DATE_FORMATS: Lazy<Vec<Regex>> = Lazy::new(|| {
    let patterns = [
        // ISO 8601: 2020-05-01, 2020-05, 2020-05-01T10:00:00.000+02:00
        r"^[+-]?\d{4}(-(0[1-9]|1[0-2])(-(0[1-9]|[12]\d|3[01]))?)?([T\s](([01]\d|2[0-3])(:?[0-5]\d)?|24:?00)(:?[0-5]\d([.,]\d+)?)?([.,]\d+)?([zZ]|[+-]([01]\d|2[0-3]):?([0-5]\d)?)?)?$".to_string(),
        // month/day/year
        format!(r"^(0?[1-9]|1[012]){SEP}+(0?[1-9]|[12][0-9]|3[01]){SEP}+([0-9]{{2,4}}){TIME_SUFFIX}$"),
        // day/month/year
        format!(r"^(0?[1-9]|[12][0-9]|3[01]){SEP}+(0?[1-9]|1[012]){SEP}+([0-9]{{2,4}}){TIME_SUFFIX}$"),
        // [Weekday] Month 4th, 2020
        format!(r"^[A-Za-z]{{3,}},?{SEP}*([A-Za-z]{{3,}},?{SEP}+)?(0?[1-9]|[12][0-9]|3[01])([A-Za-z]{{2}})?,?{SEP}*([0-9]{{2,4}}){TIME_SUFFIX}$"),
        // [Weekday] [4th] Month 2020
        format!(r"^([A-Za-z]{{3,}},?{SEP}*)?((0?[1-9]|[12][0-9]|3[01])([A-Za-z]{{2}})?,?{SEP}*)?[A-Za-z]{{3,}},?{SEP}*([0-9]{{2,4}}){TIME_SUFFIX}$"),
        // Weekday Month 4 10:00:00 2020
        format!(r"^[A-Za-z]{{3,}},?\s+([A-Za-z]{{3,}},?\s+)?(0?[1-9]|[12][0-9]|3[01])?\s*{TIME_SUFFIX}\s+([0-9]{{2,4}})$"),
    ];
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
});

static ISO_DECODE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"^([+-]?\d{4})(?:-(\d{2})(?:-(\d{2}))?)?(?:[T\s](\d{2})(?::?(\d{2}))?(?::?(\d{2})(?:[.,](\d+))?)?\s*([zZ]|[+-]\d{2}(?::?\d{2})?)?)?$",
    )
    .ok()
});

static TIME_DECODE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(\d{1,2}):(\d{1,2})(?::(\d{1,2})(?:\.(\d{1,3}))?)?(?:\s*(am|pm)\b)?").ok()
});

static OFFSET_DECODE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\s*(?:gmt|utc|z)?\s*([+-])(\d{1,2}):?(\d{2})").ok());

static ORDINAL: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^(\d{1,2})(st|nd|rd|th)$").ok());

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Named zones understood by the decoder, in minutes east of UTC.
const ZONES: [(&str, i64); 11] = [
    ("gmt", 0),
    ("utc", 0),
    ("ut", 0),
    ("est", -300),
    ("edt", -240),
    ("cst", -360),
    ("cdt", -300),
    ("mst", -420),
    ("mdt", -360),
    ("pst", -480),
    ("pdt", -420),
];

/// True when `value` has a date shape and decodes to a valid timestamp.
///
/// A bare four-character value (`2020`) is never a date.
pub fn is_date(value: &str) -> bool {
    if value.chars().count() == 4 {
        return false;
    }
    let trimmed = value.trim();
    DATE_FORMATS.iter().any(|re| re.is_match(trimmed)) && decode_date(value).is_some()
}

/// Decode a date or date-time into a UTC timestamp.
///
/// ISO 8601 values are decoded strictly; everything else goes through a
/// token-based reading that understands month names, weekdays, ordinal
/// suffixes, numeric month/day/year (falling back to day/month/year when
/// the first number cannot be a month), a time of day with optional
/// `am`/`pm`, and a numeric or named zone.
pub fn decode_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(re) = ISO_DECODE.as_ref() {
        if let Some(caps) = re.captures(trimmed) {
            return decode_iso(&caps);
        }
    }
    decode_loose(&trimmed.to_lowercase())
}

/// Milliseconds since the Unix epoch.
pub fn to_epoch_millis(d: &NaiveDateTime) -> i64 {
    d.and_utc().timestamp_millis()
}

fn decode_iso(caps: &regex::Captures<'_>) -> Option<NaiveDateTime> {
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i64>().ok());

    let year = i32::try_from(num(1)?).ok()?;
    let month = num(2).unwrap_or(1) as u32;
    let day = num(3).unwrap_or(1) as u32;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let millis = caps
        .get(7)
        .map(|m| {
            let digits: String = m.as_str().chars().chain("000".chars()).take(3).collect();
            digits.parse::<u32>().unwrap_or(0)
        })
        .unwrap_or(0);
    let time = NaiveTime::from_hms_milli_opt(
        num(4).unwrap_or(0) as u32,
        num(5).unwrap_or(0) as u32,
        num(6).unwrap_or(0) as u32,
        millis,
    )?;

    let offset = match caps.get(8).map(|m| m.as_str()) {
        None | Some("Z") | Some("z") => 0,
        Some(zone) => parse_offset(zone)?,
    };
    Some(date.and_time(time) - Duration::minutes(offset))
}

/// `+02:00`, `-0530`, `+02` → minutes east of UTC.
fn parse_offset(zone: &str) -> Option<i64> {
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone.chars().filter(char::is_ascii_digit).collect();
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i64>().ok()?, 0),
        3 | 4 => {
            let split = digits.len() - 2;
            (digits[..split].parse::<i64>().ok()?, digits[split..].parse::<i64>().ok()?)
        }
        _ => return None,
    };
    Some(sign * (hours * 60 + minutes))
}

fn decode_loose(lower: &str) -> Option<NaiveDateTime> {
    let mut rest = lower.to_string();
    let mut time = NaiveTime::from_hms_opt(0, 0, 0)?;
    let mut offset = 0i64;

    if let Some(caps) = TIME_DECODE.as_ref().and_then(|re| re.captures(lower)) {
        let whole = caps.get(0)?;
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let mut hour = num(1)?;
        match caps.get(5).map(|m| m.as_str()) {
            Some("pm") if hour < 12 => hour += 12,
            Some("am") if hour == 12 => hour = 0,
            _ => {}
        }
        let millis = caps
            .get(4)
            .map(|m| {
                let digits: String = m.as_str().chars().chain("00".chars()).take(3).collect();
                digits.parse::<u32>().unwrap_or(0)
            })
            .unwrap_or(0);
        time = NaiveTime::from_hms_milli_opt(hour, num(2)?, num(3).unwrap_or(0), millis)?;

        let mut tail = &lower[whole.end()..];
        if let Some(off) = OFFSET_DECODE.as_ref().and_then(|re| re.captures(tail)) {
            let sign = if &off[1] == "-" { -1 } else { 1 };
            offset = sign * (off[2].parse::<i64>().ok()? * 60 + off[3].parse::<i64>().ok()?);
            tail = &tail[off.get(0)?.end()..];
        }
        rest = format!("{} {}", &lower[..whole.start()], tail);
    }

    let mut month: Option<u32> = None;
    let mut numbers: Vec<(u32, usize)> = Vec::new();

    for token in rest
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '_' | '.' | '/'))
        .filter(|t| !t.is_empty())
    {
        if let Some(caps) = ORDINAL.as_ref().and_then(|re| re.captures(token)) {
            numbers.push((caps[1].parse().ok()?, caps[1].len()));
        } else if token.chars().all(|c| c.is_ascii_digit()) {
            numbers.push((token.parse().ok()?, token.len()));
        } else if token.chars().all(|c| c.is_ascii_alphabetic()) {
            if let Some((_, minutes)) = ZONES.iter().find(|(name, _)| *name == token) {
                offset = *minutes;
            } else if token.len() >= 3 && WEEKDAYS.iter().any(|w| token.starts_with(w)) {
                continue;
            } else if let Some(m) = MONTHS.iter().position(|m| token.len() >= 3 && token.starts_with(m)) {
                if month.is_some() {
                    return None;
                }
                month = Some(m as u32 + 1);
            } else {
                return None;
            }
        } else {
            return None;
        }
    }

    let (year, month, day) = match (month, numbers.as_slice()) {
        (Some(m), [(y, _)]) => (*y, m, 1),
        (Some(m), [(a, _), (b, _)]) => {
            if *a > 31 {
                (*a, m, *b)
            } else {
                (*b, m, *a)
            }
        }
        (None, [(a, alen), (b, _), (c, _)]) => {
            if *alen >= 3 || *a > 31 {
                (*a, *b, *c)
            } else if *a <= 12 {
                (*c, *a, *b)
            } else {
                (*c, *b, *a)
            }
        }
        _ => return None,
    };

    let year = match year {
        0..=49 => 2000 + year,
        50..=99 => 1900 + year,
        y => y,
    };
    let date = NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)?;
    Some(date.and_time(time) - Duration::minutes(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert!(is_date("2020-05-01"));
        assert!(is_date("2020-05"));
        assert!(is_date("2020-05-01T10:30:00Z"));
        assert!(is_date("2020-05-01 10:30"));
        assert_eq!(decode_date("2020-05-01").unwrap(), ymd_hms(2020, 5, 1, 0, 0, 0));
        assert_eq!(
            decode_date("2020-05-01T10:30:00+02:00").unwrap(),
            ymd_hms(2020, 5, 1, 8, 30, 0)
        );
    }

    #[test]
    fn test_bare_year_is_not_a_date() {
        assert!(!is_date("2020"));
        assert!(!is_date("1999"));
    }

    #[test]
    fn test_numeric_dates() {
        assert!(is_date("05/01/2020"));
        assert_eq!(decode_date("05/01/2020").unwrap(), ymd_hms(2020, 5, 1, 0, 0, 0));
        // First number cannot be a month: day/month/year.
        assert!(is_date("25.12.2019"));
        assert_eq!(decode_date("25.12.2019").unwrap(), ymd_hms(2019, 12, 25, 0, 0, 0));
        assert_eq!(decode_date("1-2-20").unwrap(), ymd_hms(2020, 1, 2, 0, 0, 0));
        assert_eq!(
            decode_date("05/01/2020 14:05:09").unwrap(),
            ymd_hms(2020, 5, 1, 14, 5, 9)
        );
    }

    #[test]
    fn test_impossible_calendar_dates() {
        assert!(!is_date("02/30/2020"));
        assert!(!is_date("2020-02-30"));
    }

    #[test]
    fn test_month_name_dates() {
        assert!(is_date("May 4, 2020"));
        assert!(is_date("Monday, May 4th, 2020"));
        assert!(is_date("4 May 2020"));
        assert!(is_date("May 2020"));
        assert!(is_date("Mon May 4 10:00:00 2020"));
        assert_eq!(decode_date("May 4th, 2020").unwrap(), ymd_hms(2020, 5, 4, 0, 0, 0));
        assert_eq!(decode_date("4 May 2020").unwrap(), ymd_hms(2020, 5, 4, 0, 0, 0));
        assert_eq!(
            decode_date("Mon May 4 10:00:00 2020").unwrap(),
            ymd_hms(2020, 5, 4, 10, 0, 0)
        );
    }

    #[test]
    fn test_named_zone_shifts_to_utc() {
        assert_eq!(
            decode_date("May 4 2020 10:00 EST").unwrap(),
            ymd_hms(2020, 5, 4, 15, 0, 0)
        );
    }

    #[test]
    fn test_words_are_not_dates() {
        assert!(!is_date("Product 2020"));
        assert!(!is_date("hello"));
        assert!(!is_date("12.5"));
        assert!(!is_date(""));
    }

    #[test]
    fn test_epoch_millis() {
        let d = decode_date("1970-01-02").unwrap();
        assert_eq!(to_epoch_millis(&d), 86_400_000);
    }
}
