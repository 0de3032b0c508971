//! Candidate word filter.

use std::collections::BTreeSet;

use crate::model::Hive;

/// Shortest word the puzzle accepts.
pub const MIN_WORD_LEN: usize = 4;

const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];

/// Every legal word in `dictionary` for `hive`, uppercased, sorted and deduplicated.
pub fn find_candidates<'a>(dictionary: impl IntoIterator<Item = &'a str>, hive: &Hive) -> Vec<String> {
    dictionary
        .into_iter()
        .filter(|word| is_candidate(word, hive))
        .map(str::to_ascii_uppercase)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Whether `word` is long enough, uses only hive letters, contains the
/// center letter, and has at least one vowel (`y` counts).
pub fn is_candidate(word: &str, hive: &Hive) -> bool {
    if word.chars().count() < MIN_WORD_LEN {
        return false;
    }

    let mut has_center = false;
    let mut has_vowel = false;
    for ch in word.chars() {
        if !hive.contains(ch) {
            return false;
        }
        let ch = ch.to_ascii_lowercase();
        has_center |= ch == hive.center();
        has_vowel |= VOWELS.contains(&ch);
    }

    has_center && has_vowel
}
