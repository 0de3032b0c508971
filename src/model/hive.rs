//! Hive: the seven letters of one puzzle.

use std::fmt;
use std::str::FromStr;

/// Number of letters on a hive board, center included.
pub const HIVE_SIZE: usize = 7;

/// Errors from turning operator input into a hive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HiveError {
    #[error("letters may only contain alphabetic characters (got '{0}')")]
    NonAlphabetic(char),

    #[error("letters must contain exactly 7 alphabetic characters, center letter last (got {0})")]
    WrongCount(usize),
}

/// Six outer letters around one center letter.
///
/// Every letter is stored lowercase. Outer letters are kept in the order
/// they were supplied or encountered on the page; they are not required
/// to be distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hive {
    outer: [char; 6],
    center: char,
}

impl Hive {
    /// Builds a hive from already-validated letters, folding them to lowercase.
    pub fn new(outer: [char; 6], center: char) -> Self {
        Self {
            outer: outer.map(|c| c.to_ascii_lowercase()),
            center: center.to_ascii_lowercase(),
        }
    }

    /// Parses operator input: seven alphabetic characters, center letter last.
    ///
    /// Whitespace is ignored and case is folded, so `"tropicA"` and
    /// `"t r o p i c a"` both produce outer `tropic` with center `a`.
    pub fn parse(raw: &str) -> Result<Self, HiveError> {
        let mut letters = Vec::with_capacity(HIVE_SIZE);
        for ch in raw.chars().filter(|c| !c.is_whitespace()) {
            if !ch.is_ascii_alphabetic() {
                return Err(HiveError::NonAlphabetic(ch));
            }
            letters.push(ch.to_ascii_lowercase());
        }

        let &[a, b, c, d, e, f, center] = letters.as_slice() else {
            return Err(HiveError::WrongCount(letters.len()));
        };

        Ok(Self::new([a, b, c, d, e, f], center))
    }

    /// The six outer letters, in source order.
    pub fn outer(&self) -> &[char; 6] {
        &self.outer
    }

    /// The letter every candidate word must contain.
    pub fn center(&self) -> char {
        self.center
    }

    /// All seven letters: the outer ring followed by the center.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.outer.iter().copied().chain(std::iter::once(self.center))
    }

    /// Whether `ch` (any case) is one of the seven hive letters.
    pub fn contains(&self, ch: char) -> bool {
        let ch = ch.to_ascii_lowercase();
        self.letters().any(|letter| letter == ch)
    }
}

impl FromStr for Hive {
    type Err = HiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders as the operator sees it: `TROPIC (center A)`.
impl fmt::Display for Hive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outer: String = self.outer().iter().map(char::to_ascii_uppercase).collect();
        write!(f, "{outer} (center {})", self.center().to_ascii_uppercase())
    }
}
