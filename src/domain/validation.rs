//! Input validation and sanitization
//!
//! Pure admission-gate checks applied to user-supplied strings before any
//! mutation. All predicates are total functions with no I/O.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix every API key value must carry
pub const API_KEY_PREFIX: &str = "api_";

/// Inclusive length bounds for an API key value (prefix included)
pub const MIN_API_KEY_LENGTH: usize = 20;
pub const MAX_API_KEY_LENGTH: usize = 200;

/// Inclusive length bounds for usernames
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Inclusive length bounds for passwords
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length of an API key name
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum length of an API key description
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .unwrap()
});

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9@._-]{3,100}$").unwrap());

/// Check that `s` is a canonically formatted UUID
///
/// Only the hyphenated 8-4-4-4-12 hexadecimal grouping is accepted,
/// case-insensitively. The compact 32-digit form is rejected.
pub fn is_valid_uuid(s: &str) -> bool {
    UUID_RE.is_match(s)
}

/// Trim surrounding whitespace, then truncate to at most `max_len` characters
///
/// Never fails; empty input stays empty.
pub fn sanitize_string(s: &str, max_len: usize) -> String {
    s.trim().chars().take(max_len).collect()
}

/// Check that `s` looks like an API key
///
/// Rules:
/// - Starts with the literal prefix `api_`
/// - Total length between 20 and 200 characters inclusive
pub fn is_valid_api_key_format(s: &str) -> bool {
    let len = s.chars().count();
    s.starts_with(API_KEY_PREFIX) && (MIN_API_KEY_LENGTH..=MAX_API_KEY_LENGTH).contains(&len)
}

/// Check that `s` is an acceptable username
///
/// Rules:
/// - Length between 3 and 100 characters inclusive
/// - Only letters, digits and `@`, `.`, `_`, `-`
pub fn is_valid_username(s: &str) -> bool {
    USERNAME_RE.is_match(s)
}

/// Check that `s` is an acceptable password
///
/// Only the length is constrained (6 to 128 characters inclusive).
pub fn is_valid_password(s: &str) -> bool {
    let len = s.chars().count();
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&len)
}
