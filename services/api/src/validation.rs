//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Normalize an email for lookups, uniqueness checks, and store keys
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required.".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long.".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format.".to_string());
    }

    Ok(())
}

/// Validate phone number
pub fn validate_phone_number(phone_number: &str) -> Result<(), String> {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX
        .get_or_init(|| Regex::new(r"^[+]?[0-9]{7,15}$").expect("Failed to compile phone regex"));

    if !regex.is_match(phone_number) {
        return Err("Invalid phone number.".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required.".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long.".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long.".to_string());
    }

    Ok(())
}

/// Validate a reset code's shape before the store is ever consulted
pub fn validate_reset_code(code: &str) -> Result<(), String> {
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err("Reset code must consist of exactly 4 digits.".to_string());
    }

    Ok(())
}

/// Validate latitude
pub fn validate_latitude(value: f64) -> Result<(), String> {
    if !value.is_finite() || !(-90.0..=90.0).contains(&value) {
        return Err("Latitude is supposed to be between -90 and 90.".to_string());
    }

    Ok(())
}

/// Validate longitude
pub fn validate_longitude(value: f64) -> Result<(), String> {
    if !value.is_finite() || !(-180.0..=180.0).contains(&value) {
        return Err("Longitude is supposed to be between -180 and 180.".to_string());
    }

    Ok(())
}

/// Validate rating
pub fn validate_rating(value: f64) -> Result<(), String> {
    if !value.is_finite() || !(0.0..=5.0).contains(&value) {
        return Err("Rating is supposed to be from 0 to 5.".to_string());
    }

    Ok(())
}

/// Validate a distance filter in kilometers, bounded by Earth's circumference
pub fn validate_distance(value: f64) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 || value >= 40_076.0 {
        return Err("Distance must be between 0 and 40076 kilometers.".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_normalization_lowercases_and_trims() {
        assert_eq!(normalize_email("  John.Doe@Example.COM "), "john.doe@example.com");
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn phone_validation() {
        assert!(validate_phone_number("+375291506285").is_ok());
        assert!(validate_phone_number("80291506285").is_ok());
        assert!(validate_phone_number("+000000000").is_ok());
        assert!(validate_phone_number("  ").is_err());
        assert!(validate_phone_number("123").is_err());
        assert!(validate_phone_number("+1234567890123456").is_err());
        assert!(validate_phone_number("phone").is_err());
    }

    #[test]
    fn password_validation() {
        assert!(validate_password("123456789").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(129)).is_err());
    }

    #[test]
    fn reset_code_shape() {
        assert!(validate_reset_code("0427").is_ok());
        assert!(validate_reset_code("12345").is_err());
        assert!(validate_reset_code("123").is_err());
        assert!(validate_reset_code("12a4").is_err());
        assert!(validate_reset_code("").is_err());
    }

    #[test]
    fn coordinate_ranges() {
        assert!(validate_latitude(53.9063).is_ok());
        assert!(validate_latitude(-90.0).is_ok());
        assert!(validate_latitude(90.0).is_ok());
        assert!(validate_latitude(90.5).is_err());
        assert!(validate_latitude(f64::NAN).is_err());

        assert!(validate_longitude(27.5577).is_ok());
        assert!(validate_longitude(-180.0).is_ok());
        assert!(validate_longitude(180.0).is_ok());
        assert!(validate_longitude(-180.1).is_err());
    }

    #[test]
    fn rating_range() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(5.1).is_err());
        assert!(validate_rating(-0.1).is_err());
    }

    #[test]
    fn distance_range() {
        assert!(validate_distance(10.0).is_ok());
        assert!(validate_distance(0.0).is_err());
        assert!(validate_distance(40_076.0).is_err());
    }
}
