//! Word lists loaded from disk.
//!
//! A dictionary directory holds newline-delimited word list tiers:
//!
//! ```text
//! <dir>/
//!   `wlist_match1.txt`   # massive tier, required
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::{fs, io};

use tracing::{debug, info};

/// File name of the massive tier.
pub const MASSIVE_TIER: &str = "wlist_match1.txt";

/// Where word lists are looked for, relative to the working directory,
/// when no directory is configured.
const DEFAULT_DIRS: [&str; 3] = [
    "WordListerApp/target/classes/com/uestechnology",
    "WordListerApp/src/main/resources/com/uestechnology",
    "WordListerApp/extracted/com/uestechnology",
];

/// Errors that can occur while loading word lists.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("dictionary directory is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("word list is empty: {}", .0.display())]
    Empty(PathBuf),
}

pub type Result<T> = core::result::Result<T, DictionaryError>;

/// The massive word list, lowercased and deduplicated.
#[derive(Debug, Clone)]
pub struct Dictionary {
    words: BTreeSet<String>,
    source: PathBuf,
}

impl Dictionary {
    /// Loads the massive tier from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(DictionaryError::NotADirectory(dir.to_path_buf()));
        }

        let path = dir.join(MASSIVE_TIER);
        let contents = fs::read(&path).map_err(|source| DictionaryError::Read {
            path: path.clone(),
            source,
        })?;

        // Lines that aren't UTF-8 can't spell a hive word; drop them, not the list.
        let mut skipped = 0usize;
        let words: BTreeSet<String> = contents
            .split(|&b| b == b'\n')
            .filter_map(|line| {
                let line = std::str::from_utf8(line).ok();
                skipped += usize::from(line.is_none());
                line
            })
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();

        if skipped > 0 {
            debug!(path = %path.display(), skipped, "skipped word list lines that are not UTF-8");
        }

        if words.is_empty() {
            return Err(DictionaryError::Empty(path));
        }

        info!(path = %path.display(), words = words.len(), "loaded word list");
        Ok(Self {
            words,
            source: dir.to_path_buf(),
        })
    }

    /// A dictionary over the given words, without touching disk.
    #[cfg(test)]
    pub fn from_words<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            words: words.into_iter().map(str::to_lowercase).collect(),
            source: PathBuf::new(),
        }
    }

    /// Words in ascending order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Directory the words were loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// First existing default dictionary directory under the working directory.
pub fn find_default_dir() -> Option<PathBuf> {
    find_default_dir_in(Path::new("."))
}

/// First existing default dictionary directory under `root`.
pub fn find_default_dir_in(root: &Path) -> Option<PathBuf> {
    DEFAULT_DIRS
        .iter()
        .map(|rel| root.join(rel))
        .inspect(|candidate| debug!(path = %candidate.display(), "checking dictionary dir"))
        .find(|candidate| candidate.is_dir())
}
