//! Locale-aware name ordering for the student grid.
//!
//! Names compare on three levels: base letters (accents and case folded
//! away), then accents, then case. `"émile"` sorts right after `"emile"`
//! and before `"Eva"`, not after `"Zoé"`.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Primary collation key: decomposed, marks stripped, lowercased.
pub fn base_key(name: &str) -> String {
    name.nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

fn accent_key(name: &str) -> String {
    name.nfd().flat_map(char::to_lowercase).collect()
}

/// Compares two display names in reading order.
pub fn compare_names(left: &str, right: &str) -> Ordering {
    base_key(left)
        .cmp(&base_key(right))
        .then_with(|| accent_key(left).cmp(&accent_key(right)))
        // Lowercase before uppercase at the last level.
        .then_with(|| right.cmp(left))
}
