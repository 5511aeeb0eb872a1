use crate::utils::error::{EnumError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// 目標網域：英數與連字號標籤，結尾為類 TLD 標籤
static ROOT_DOMAIN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z][a-z0-9-]{0,61}[a-z0-9]$")
        .expect("root domain pattern")
});

// 來源回傳的名稱允許底線開頭的標籤 (_dmarc, _domainkey ...)
static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9_](?:[a-z0-9_-]{0,61}[a-z0-9_])?\.)+[a-z][a-z0-9-]{0,61}[a-z0-9]$")
        .expect("hostname pattern")
});

const MAX_DOMAIN_LENGTH: usize = 253;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Validates a user-supplied root domain and returns its canonical lower-case form.
pub fn validate_domain(input: &str) -> Result<String> {
    let candidate = input.trim().to_lowercase();

    if candidate.is_empty() {
        return Err(EnumError::ValidationError {
            message: "A domain is required".to_string(),
        });
    }

    if candidate.len() > MAX_DOMAIN_LENGTH || !ROOT_DOMAIN_REGEX.is_match(&candidate) {
        return Err(EnumError::ValidationError {
            message: format!("'{}' does not appear to be a valid domain.", input.trim()),
        });
    }

    Ok(candidate)
}

/// Syntactic check applied to normalized candidates. Expects lower-case input.
pub fn is_domain_like(name: &str) -> bool {
    name.len() <= MAX_DOMAIN_LENGTH && HOSTNAME_REGEX.is_match(name)
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EnumError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EnumError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EnumError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EnumError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list<T>(field_name: &str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(EnumError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "At least one entry is required".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EnumError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain() {
        assert_eq!(validate_domain("example.com").unwrap(), "example.com");
        assert_eq!(validate_domain("  Example.COM ").unwrap(), "example.com");
        assert_eq!(validate_domain("sub.example.co.uk").unwrap(), "sub.example.co.uk");
        assert_eq!(validate_domain("xn--80ak6aa92e.com").unwrap(), "xn--80ak6aa92e.com");

        assert!(validate_domain("").is_err());
        assert!(validate_domain("not_a_domain!!").is_err());
        assert!(validate_domain("localhost").is_err());
        assert!(validate_domain(".example.com").is_err());
        assert!(validate_domain("example.com.").is_err());
        assert!(validate_domain("-bad.example.com").is_err());
        assert!(validate_domain("example.c").is_err());
        assert!(validate_domain(&format!("{}.com", "a".repeat(64))).is_err());
    }

    #[test]
    fn test_validation_message_names_the_input() {
        let err = validate_domain("not_a_domain!!").unwrap_err();
        assert_eq!(
            err.user_friendly_message(),
            "'not_a_domain!!' does not appear to be a valid domain."
        );
    }

    #[test]
    fn test_is_domain_like() {
        assert!(is_domain_like("www.example.com"));
        assert!(is_domain_like("_dmarc.example.com"));
        assert!(!is_domain_like("bad@example.com"));
        assert!(!is_domain_like("example"));
        assert!(!is_domain_like("www.example.com/path"));
        assert!(!is_domain_like("www..example.com"));
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("dns.doh_endpoint", "https://dns.google.com/resolve").is_ok());
        assert!(validate_url("endpoints.archive", "http://web.archive.org/cdx/search/cdx").is_ok());
        assert!(validate_url("dns.doh_endpoint", "").is_err());
        assert!(validate_url("dns.doh_endpoint", "invalid-url").is_err());
        assert!(validate_url("dns.doh_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number_and_range() {
        assert!(validate_positive_number("resolve.concurrency", 5, 1).is_ok());
        assert!(validate_positive_number("resolve.concurrency", 0, 1).is_err());
        assert!(validate_range("dns.timeout_secs", 2, 1, 120).is_ok());
        assert!(validate_range("dns.timeout_secs", 0, 1, 120).is_err());
        assert!(validate_non_empty_list::<u8>("sources.enabled", &[]).is_err());
    }
}
