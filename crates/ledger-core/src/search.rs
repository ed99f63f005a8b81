//! # Search Normalizer
//!
//! Diacritic and case folding for free-text matching and for deriving the
//! owner/customer keys of the side tables.
//!
//! ```text
//! "MILOŠ "  ──┐
//! "Miloš"   ──┼──► normalize() ──► "milos"
//! "milos"   ──┘
//!
//! "Đorđe"   ──────► normalize() ──► "djordje"   (đ has no decomposition)
//! ```

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Folds text for matching.
///
/// Steps: lowercase, `đ` → `dj`, canonical decomposition with combining
/// marks stripped, whitespace runs collapsed and trimmed. Total over all
/// strings, including the empty one.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase().replace('đ', "dj");
    let folded: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Substring match after normalizing both sides. An empty needle matches.
pub fn matches(haystack: &str, needle: &str) -> bool {
    let needle = normalize(needle);
    needle.is_empty() || normalize(haystack).contains(&needle)
}

/// Digits only, used as the customer dedup key.
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
