//! Utility functions for Roost

use std::sync::LazyLock;

/// Characters that may appear in an uploaded object key segment
static UNSAFE_FILE_CHARS: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new("[^a-zA-Z0-9_.-]+").expect("Invalid regex pattern"));

/// Make a client-supplied file name safe to embed in an object key.
///
/// # Examples
///
/// ```
/// use roost_common::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("beach house.JPG"), "beach-house.jpg");
/// assert_eq!(sanitize_file_name("../../etc/passwd"), "etc-passwd");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    let replaced = UNSAFE_FILE_CHARS.replace_all(name, "-").to_lowercase();
    let trimmed = replaced.trim_matches(|c| c == '-' || c == '.');

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Emails are compared case-insensitively and without surrounding spaces.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Average of ratings rounded to two decimals, 0 when there are none.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    let avg = sum as f64 / ratings.len() as f64;
    (avg * 100.0).round() / 100.0
}
