//! Input checks run before any mutating command is composed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ValidationError;
use crate::model::NtpMode;

static IPV4_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])$")
        .expect("IPv4 pattern is valid")
});

/// Four dot-separated decimal octets in 0-255, nothing before or after.
pub fn is_valid_ip_address(text: &str) -> bool {
    IPV4_PATTERN.is_match(text)
}

/// Like [`is_valid_ip_address`], but as a gate returning the input.
pub fn validate_ip_address(text: &str) -> Result<&str, ValidationError> {
    if is_valid_ip_address(text) {
        Ok(text)
    } else {
        Err(ValidationError::InvalidIpAddress(text.to_string()))
    }
}

/// Accepts `1..=65535`. Port 0 is rejected even though some router
/// configurations read it as "any".
pub fn validate_port(port: i64) -> Result<u16, ValidationError> {
    match u16::try_from(port) {
        Ok(p) if p >= 1 => Ok(p),
        _ => Err(ValidationError::InvalidPort(port)),
    }
}

/// Case-insensitive match against the four NTP modes.
pub fn validate_ntp_mode(text: &str) -> Result<NtpMode, ValidationError> {
    text.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        for ip in ["0.0.0.0", "1.1.1.1", "192.168.88.1", "255.255.255.255", "10.0.0.254"] {
            assert!(is_valid_ip_address(ip), "{ip} should be valid");
        }
    }

    #[test]
    fn test_invalid_addresses() {
        for ip in [
            "",
            "256.1.1.1",
            "999.999.999.999",
            "1.2.3",
            "1.2.3.4.5",
            "01.2.3.4",
            " 1.2.3.4",
            "1.2.3.4 ",
            "1.2.3.4/24",
            "a.b.c.d",
        ] {
            assert!(!is_valid_ip_address(ip), "{ip:?} should be invalid");
        }
    }

    #[test]
    fn test_validate_ip_address_gate() {
        assert_eq!(validate_ip_address("8.8.8.8"), Ok("8.8.8.8"));
        assert_eq!(
            validate_ip_address("8.8.8"),
            Err(ValidationError::InvalidIpAddress("8.8.8".to_string()))
        );
    }

    #[test]
    fn test_port_boundaries() {
        assert_eq!(validate_port(1), Ok(1));
        assert_eq!(validate_port(65535), Ok(65535));
        assert_eq!(validate_port(0), Err(ValidationError::InvalidPort(0)));
        assert_eq!(validate_port(-1), Err(ValidationError::InvalidPort(-1)));
        assert_eq!(validate_port(65536), Err(ValidationError::InvalidPort(65536)));
        assert_eq!(validate_port(70000), Err(ValidationError::InvalidPort(70000)));
    }

    #[test]
    fn test_port_total_over_range() {
        for port in -70_000i64..=140_000 {
            let valid = (1..=65535).contains(&port);
            assert_eq!(validate_port(port).is_ok(), valid, "port {port}");
        }
        assert!(validate_port(i64::MIN).is_err());
        assert!(validate_port(i64::MAX).is_err());
    }

    #[test]
    fn test_ntp_mode() {
        assert_eq!(validate_ntp_mode("unicast"), Ok(NtpMode::Unicast));
        assert_eq!(validate_ntp_mode("BroadCast"), Ok(NtpMode::Broadcast));
        assert!(validate_ntp_mode("test").is_err());
        assert!(validate_ntp_mode("").is_err());
    }
}
