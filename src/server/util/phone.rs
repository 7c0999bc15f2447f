use std::sync::LazyLock;

use regex::Regex;

use crate::server::error::AppError;

static UZ_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+998\d{9}$").expect("phone pattern is a valid regex"));

/// Validates an Uzbek phone number in `+998XXXXXXXXX` form.
///
/// Surrounding whitespace is ignored.
///
/// # Arguments
/// - `phone` - Phone number as entered by the client
///
/// # Returns
/// - `Ok(String)` - The trimmed phone number
/// - `Err(AppError::BadRequest)` - The value is not a valid Uzbek number
pub fn validate_phone(phone: &str) -> Result<String, AppError> {
    let phone = phone.trim();
    if !UZ_PHONE.is_match(phone) {
        return Err(AppError::BadRequest(
            "Phone number must be in format +998XXXXXXXXX".to_string(),
        ));
    }
    Ok(phone.to_string())
}

/// Strips everything but digits, the form SMS providers expect (`998901234567`).
pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Masks the middle of a phone number for display to other users.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() < 8 {
        return phone.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}*****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Expected: accepts a well formed number and trims whitespace
    #[test]
    fn accepts_valid_number() {
        assert_eq!(validate_phone(" +998901234567 ").unwrap(), "+998901234567");
    }

    /// Expected: rejects wrong country code, missing plus, and wrong length
    #[test]
    fn rejects_malformed_numbers() {
        for phone in ["+99890123456", "998901234567", "+7901234567890", "+99890123456a"] {
            assert!(validate_phone(phone).is_err(), "{phone} should be rejected");
        }
    }

    #[test]
    fn strips_plus_for_gateway() {
        assert_eq!(digits_only("+998901234567"), "998901234567");
    }

    #[test]
    fn masks_middle_digits() {
        assert_eq!(mask_phone("+998901234567"), "+99890*****67");
    }
}
