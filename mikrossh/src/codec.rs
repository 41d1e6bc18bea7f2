//! Conversions between RouterOS reply tokens and typed values.
//!
//! All functions trim their input. An empty numeric field is the router's
//! way of saying "unset" and maps to zero; every other malformed token is
//! a [`ParseError`].

use chrono::{NaiveDate, NaiveTime};

use crate::address::IpAddress;
use crate::error::ParseError;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// `true` / `false`, or `None` for an empty field.
pub fn parse_bool(text: &str) -> Result<Option<bool>, ParseError> {
    match text.trim() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        "" => Ok(None),
        other => Err(ParseError::InvalidBooleanLiteral(other.to_string())),
    }
}

/// Integer field; empty maps to 0.
pub fn parse_int(text: &str) -> Result<i64, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse().map_err(|_| ParseError::InvalidNumber {
        kind: "integer",
        value: text.to_string(),
    })
}

/// Floating-point field; empty maps to 0.0.
pub fn parse_float(text: &str) -> Result<f64, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::InvalidNumber {
            kind: "float",
            value: text.to_string(),
        }),
    }
}

/// A number optionally followed by a unit, e.g. `3.082 PPM` or `-0.915 ms`.
pub fn parse_measurement(text: &str) -> Result<f64, ParseError> {
    parse_float(text.split_whitespace().next().unwrap_or_default())
}

/// TCP/UDP port field.
pub fn parse_port(text: &str) -> Result<u16, ParseError> {
    let value = parse_int(text)?;
    u16::try_from(value).map_err(|_| ParseError::InvalidNumber {
        kind: "port",
        value: text.trim().to_string(),
    })
}

/// `;`-separated address list. An empty field is an empty list.
pub fn parse_ip_list(text: &str) -> Result<Vec<IpAddress>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    text.split(';').map(|token| token.trim().parse()).collect()
}

/// Single address, `None` for an empty field.
pub fn parse_optional_ip(text: &str) -> Result<Option<IpAddress>, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        Ok(None)
    } else {
        text.parse().map(Some)
    }
}

/// `;`-separated list of opaque tokens.
pub fn parse_list(text: &str) -> Vec<String> {
    text.trim()
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Router-local `HH:MM:SS`. No timezone conversion.
pub fn parse_time(text: &str) -> Result<NaiveTime, ParseError> {
    let text = text.trim();
    let invalid = || ParseError::InvalidTime(text.to_string());

    let parts = split_numbers(text, ':').ok_or_else(invalid)?;
    let &[hour, minute, second] = parts.as_slice() else {
        return Err(invalid());
    };
    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(invalid)
}

/// Router-local date, `YYYY-MM-DD` or the pre-7.10 `mmm/dd/yyyy`.
pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    let text = text.trim();
    let invalid = || ParseError::InvalidDate(text.to_string());

    let (year, month, day) = if text.contains('/') {
        let mut fields = text.splitn(3, '/');
        let month_name = fields.next().unwrap_or_default().to_ascii_lowercase();
        let month = MONTHS
            .iter()
            .position(|m| *m == month_name)
            .ok_or_else(invalid)? as u32
            + 1;
        let day: u32 = fields.next().and_then(|d| d.parse().ok()).ok_or_else(invalid)?;
        let year: i32 = fields.next().and_then(|y| y.parse().ok()).ok_or_else(invalid)?;
        (year, month, day)
    } else {
        let parts = split_numbers(text, '-').ok_or_else(invalid)?;
        let &[year, month, day] = parts.as_slice() else {
            return Err(invalid());
        };
        (year as i32, month, day)
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Render a flag the way `set` commands expect it.
pub fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn split_numbers(text: &str, separator: char) -> Option<Vec<u32>> {
    text.split(separator).map(|part| part.parse().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Ok(Some(true)));
        assert_eq!(parse_bool("false"), Ok(Some(false)));
        assert_eq!(parse_bool(""), Ok(None));
        assert_eq!(parse_bool("  true\r\n"), Ok(Some(true)));
        let err = parse_bool("test").unwrap_err();
        assert_eq!(err, ParseError::InvalidBooleanLiteral("test".to_string()));
        assert_eq!(err.to_string(), "Undefined boolean value: test");
        assert!(parse_bool("yes").is_err());
    }

    #[test]
    fn test_empty_numbers_are_zero() {
        assert_eq!(parse_int(""), Ok(0));
        assert_eq!(parse_int("   "), Ok(0));
        assert_eq!(parse_float(""), Ok(0.0));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(parse_int(" 42 "), Ok(42));
        assert_eq!(parse_int("-3"), Ok(-3));
        assert_eq!(parse_float("24.1"), Ok(24.1));
        assert!(parse_int("4.2").is_err());
        assert!(parse_float("abc").is_err());
        assert!(parse_float("inf").is_err());
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement("3.082 PPM"), Ok(3.082));
        assert_eq!(parse_measurement("-0.915ms"), Err(ParseError::InvalidNumber {
            kind: "float",
            value: "-0.915ms".to_string(),
        }));
        assert_eq!(parse_measurement("-0.915 ms"), Ok(-0.915));
        assert_eq!(parse_measurement(""), Ok(0.0));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8728"), Ok(8728));
        assert!(parse_port("70000").is_err());
        assert!(parse_port("-1").is_err());
    }

    #[test]
    fn test_parse_ip_list() {
        let ips = parse_ip_list("200.160.7.186;201.49.148.135").unwrap();
        assert_eq!(
            ips,
            vec![IpAddress::new([200, 160, 7, 186]), IpAddress::new([201, 49, 148, 135])]
        );
        assert_eq!(parse_ip_list(""), Ok(vec![]));
        assert_eq!(
            parse_ip_list("1.1.1.1;300.1.1.1"),
            Err(ParseError::InvalidIpAddress("300.1.1.1".to_string()))
        );
    }

    #[test]
    fn test_parse_optional_ip() {
        assert_eq!(parse_optional_ip(""), Ok(None));
        assert_eq!(parse_optional_ip("10.0.0.1"), Ok(Some(IpAddress::new([10, 0, 0, 1]))));
        assert!(parse_optional_ip("10.0.0").is_err());
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("10.0.0.0/8;192.168.88.0/24"), vec!["10.0.0.0/8", "192.168.88.0/24"]);
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("05:41:24"), Ok(NaiveTime::from_hms_opt(5, 41, 24).unwrap()));
        assert_eq!(parse_time("15:30:00").unwrap().to_string(), "15:30:00");
        assert!(parse_time("25:00:00").is_err());
        assert!(parse_time("12:00").is_err());
        assert!(parse_time("aa:bb:cc").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2020-12-31"), Ok(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap()));
        assert_eq!(parse_date("jan/02/2024"), Ok(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
        assert_eq!(parse_date("2020-12-31").unwrap().to_string(), "2020-12-31");
        assert!(parse_date("2020-13-01").is_err());
        assert!(parse_date("foo/02/2024").is_err());
        assert!(parse_date("2020-12").is_err());
    }

    #[test]
    fn test_yes_no() {
        assert_eq!(yes_no(true), "yes");
        assert_eq!(yes_no(false), "no");
    }
}
