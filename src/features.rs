//! Feature extraction from parsed email text

use crate::types::{FeatureVector, ParsedEmail};
use regex::Regex;
use tracing::debug;

/// Keywords whose presence in the body is counted, at most once each
pub const SUSPICIOUS_KEYWORDS: [&str; 8] = [
    "verify", "update", "login", "urgent", "account", "password", "suspend", "confirm",
];

// Regex patterns
static URL_SCHEME_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"https?://").unwrap());

static SPECIAL_CHAR_REGEX: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"[!$%^&*()]").unwrap());

impl FeatureVector {
    /// Derive the classifier features from a parsed email
    #[must_use]
    pub fn extract(parsed: &ParsedEmail) -> Self {
        let body = parsed.body.as_str();

        let features = Self {
            body_length: char_count(body),
            subject_length: char_count(parsed.subject_text()),
            suspicious_keyword_count: keyword_presence_count(body),
            url_count: count_u64(URL_SCHEME_REGEX.find_iter(body).count()),
            special_char_count: count_u64(SPECIAL_CHAR_REGEX.find_iter(body).count()),
        };

        debug!("Extracted features: {:?}", features);
        features
    }
}

fn char_count(text: &str) -> u64 {
    count_u64(text.chars().count())
}

/// Number of keywords contained in the lowercased text
///
/// Substring containment, so `"verify verify"` and `"reverify"` both count
/// `verify` once.
fn keyword_presence_count(text: &str) -> u64 {
    let lower = text.to_lowercase();
    count_u64(
        SUSPICIOUS_KEYWORDS
            .iter()
            .filter(|keyword| lower.contains(*keyword))
            .count(),
    )
}

fn count_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}
