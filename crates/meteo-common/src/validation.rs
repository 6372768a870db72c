//! Field rules for user-supplied input. Each validator returns the normalized
//! value (trimmed, lower-cased where relevant) or a message suitable for the
//! client.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;

pub const CITY_MIN_LEN: usize = 2;
pub const CITY_MAX_LEN: usize = 100;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 30;
pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 100;

/// City names: letters (any script), spaces and hyphens.
pub fn validate_city_name(city: &str) -> Result<String> {
    let city = city.trim();
    if city.is_empty() {
        return Err(ValidationError::new("City name cannot be empty"));
    }

    let len = city.chars().count();
    if len < CITY_MIN_LEN {
        return Err(ValidationError::new(format!(
            "City name must contain at least {CITY_MIN_LEN} characters"
        )));
    }
    if len > CITY_MAX_LEN {
        return Err(ValidationError::new(format!(
            "City name is too long (maximum {CITY_MAX_LEN} characters)"
        )));
    }

    if !city
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-')
    {
        return Err(ValidationError::new(
            "City name contains invalid characters",
        ));
    }

    Ok(city.to_string())
}

/// Usernames: ASCII letters, digits and underscore.
pub fn validate_username(username: &str) -> Result<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::new("Username cannot be empty"));
    }

    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::new(format!(
            "Username must contain at least {USERNAME_MIN_LEN} characters"
        )));
    }
    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::new(format!(
            "Username is too long (maximum {USERNAME_MAX_LEN} characters)"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::new(
            "Username can only contain letters, numbers and underscore",
        ));
    }

    Ok(username.to_string())
}

/// Emails are lower-cased; the shape check mirrors
/// `local@domain.tld` with a TLD of at least two letters.
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::new("Email cannot be empty"));
    }

    let invalid = || ValidationError::new("Invalid email address format");

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    if !local_ok {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());
    if !host_ok || !tld_ok {
        return Err(invalid());
    }

    Ok(email)
}

/// Length-only password policy.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(ValidationError::new("Password cannot be empty"));
    }

    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(format!(
            "Password must contain at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(ValidationError::new(format!(
            "Password is too long (maximum {PASSWORD_MAX_LEN} characters)"
        )));
    }

    Ok(())
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(f64, f64)> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::new(format!(
            "Invalid latitude: {latitude}. Must be in range [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::new(format!(
            "Invalid longitude: {longitude}. Must be in range [-180, 180]"
        )));
    }
    Ok((latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_trimmed() {
        assert_eq!(validate_city_name("  New York ").unwrap(), "New York");
    }

    #[test]
    fn test_city_cyrillic_and_hyphen() {
        assert_eq!(validate_city_name("Санкт-Петербург").unwrap(), "Санкт-Петербург");
    }

    #[test]
    fn test_city_rejects_digits() {
        let err = validate_city_name("Area51").unwrap_err();
        assert_eq!(err.0, "City name contains invalid characters");
    }

    #[test]
    fn test_city_length_bounds() {
        assert!(validate_city_name("").is_err());
        assert!(validate_city_name("A").is_err());
        assert!(validate_city_name(&"a".repeat(101)).is_err());
        assert!(validate_city_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(validate_username("john_doe1").unwrap(), "john_doe1");
        assert!(validate_username("jo").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
        assert!(validate_username("john.doe").is_err());
        assert!(validate_username("   ").is_err());
    }

    #[test]
    fn test_email_lowercased() {
        assert_eq!(
            validate_email(" John.Doe+tag@Example.COM ").unwrap(),
            "john.doe+tag@example.com"
        );
    }

    #[test]
    fn test_email_rejects_bad_shapes() {
        for bad in ["", "plain", "@example.com", "a@b", "a@.com", "a@b.c", "a b@c.com", "a@b.c0m"] {
            assert!(validate_email(bad).is_err(), "expected '{bad}' to be rejected");
        }
    }

    #[test]
    fn test_email_subdomain() {
        assert!(validate_email("ops@mail.example.co.uk").is_ok());
    }

    #[test]
    fn test_password_length_only() {
        assert!(validate_password("abcdef").is_ok());
        // no digit/upper-case requirement
        assert!(validate_password("lowercase").is_ok());
        assert!(validate_password("abc").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_coordinates_bounds() {
        assert!(validate_coordinates(51.5, -0.12).is_ok());
        assert!(validate_coordinates(90.1, 0.0).is_err());
        assert!(validate_coordinates(0.0, -180.5).is_err());
    }
}
