//! Reading the hive off the puzzle page.
//!
//! The page renders seven `.hive-cell` elements. Which one is the center
//! is only visible through its class list or aria label, and the markers
//! below are matched as the page currently uses them. Class tokens win
//! over aria text. If the page markup changes, [`is_center_cell`] is the
//! place to update.

use std::fmt::Write as _;

use tracing::warn;

use crate::model::{HIVE_SIZE, Hive, SessionId};
use crate::webdriver::{Browser, WebDriverError};

/// The center cell, clicked to give the page keyboard focus.
pub const FOCUS_SELECTOR: &str = ".hive-cell:nth-child(4)";

/// Position (1-based) assumed to be the center when nothing is marked.
const FALLBACK_CENTER: usize = 4;

const CENTER_CLASS_TOKENS: [&str; 3] = ["hive-cell--center", "hive-cell_center", "is-center"];

/// Selector for the cell at 1-based `position`.
pub fn cell_selector(position: usize) -> String {
    format!(".hive-cell:nth-child({position})")
}

/// One scraped hive cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiveCell {
    pub letter: char,
    pub is_center: bool,
    pub class_attr: Option<String>,
    pub aria_attr: Option<String>,
}

/// Scrape failures. All of them are worth retrying once the page settles.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Remote(#[from] WebDriverError),

    #[error("no letter found for hive cell {0}")]
    MissingLetter(usize),

    #[error("unexpected hive character '{letter}' at cell {position}")]
    UnexpectedLetter { letter: char, position: usize },
}

/// The cells don't describe a single hive. Retrying won't change that.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("multiple differing center letters detected")]
    ConflictingCenters,

    #[error("multiple hive cells reported as center")]
    MultipleCenters,

    #[error("expected 6 outer hive letters but collected {0}")]
    OuterCount(usize),
}

/// Reads letter, class and aria label of all seven cells.
pub fn scrape_cells(
    browser: &impl Browser,
    session: &SessionId,
) -> Result<Vec<HiveCell>, ScrapeError> {
    let mut cells = Vec::with_capacity(HIVE_SIZE);
    for position in 1..=HIVE_SIZE {
        let element = browser.find_element_css(session, &cell_selector(position))?;

        let text = browser.element_text(session, &element)?;
        let letter = text
            .trim()
            .chars()
            .next()
            .ok_or(ScrapeError::MissingLetter(position))?;
        if !letter.is_ascii_alphabetic() {
            return Err(ScrapeError::UnexpectedLetter { letter, position });
        }

        let class_attr = browser.element_attribute(session, &element, "class")?;
        let aria_attr = browser.element_attribute(session, &element, "aria-label")?;

        cells.push(HiveCell {
            letter: letter.to_ascii_lowercase(),
            is_center: is_center_cell(class_attr.as_deref(), aria_attr.as_deref()),
            class_attr,
            aria_attr,
        });
    }
    Ok(cells)
}

/// Whether a cell's attributes mark it as the center. Case is ignored.
pub fn is_center_cell(class_attr: Option<&str>, aria_attr: Option<&str>) -> bool {
    if let Some(class) = class_attr.map(str::to_lowercase) {
        let has = |token: &str| class.split_whitespace().any(|t| t == token);
        if CENTER_CLASS_TOKENS.iter().any(|token| has(token)) || (has("center") && !has("outer")) {
            return true;
        }
    }

    aria_attr
        .map(str::to_lowercase)
        .is_some_and(|aria| aria.contains("center letter") || aria == "center")
}

/// Builds the hive from scraped cells.
///
/// With no cell marked, the fourth is taken as the center.
pub fn derive_hive(cells: &[HiveCell]) -> Result<Hive, BoardError> {
    let mut marked: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_center)
        .map(|(i, _)| i)
        .collect();

    if marked.is_empty() && cells.len() >= FALLBACK_CENTER {
        warn!(
            cells = %describe(cells),
            "no center marker found in hive; falling back to nth-child({FALLBACK_CENTER})"
        );
        marked.push(FALLBACK_CENTER - 1);
    }

    if let [first, rest @ ..] = marked.as_slice()
        && !rest.is_empty()
    {
        let letter = cells[*first].letter;
        warn!(cells = %describe(cells), "more than one hive cell marked as center");
        return Err(if rest.iter().any(|&i| cells[i].letter != letter) {
            BoardError::ConflictingCenters
        } else {
            BoardError::MultipleCenters
        });
    }

    let outer: Vec<char> = cells
        .iter()
        .enumerate()
        .filter(|(i, _)| !marked.contains(i))
        .map(|(_, cell)| cell.letter)
        .collect();

    let (Some(&center), Ok(outer)) = (marked.first(), <[char; 6]>::try_from(outer.as_slice()))
    else {
        warn!(cells = %describe(cells), "hive cells did not yield six outer letters");
        return Err(BoardError::OuterCount(outer.len()));
    };

    Ok(Hive::new(outer, cells[center].letter))
}

/// One line per cell, for diagnostics.
fn describe(cells: &[HiveCell]) -> String {
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        let _ = write!(
            out,
            "\n  #{} letter='{}' center={} classes='{}' aria='{}'",
            i + 1,
            cell.letter,
            cell.is_center,
            cell.class_attr.as_deref().unwrap_or(""),
            cell.aria_attr.as_deref().unwrap_or(""),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;
    use std::sync::{Arc, Mutex};

    use crate::webdriver::fake::{FakeBrowser, FakeCell};

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Runs `f` with a subscriber on this thread and returns what it logged.
    fn logs_of<T>(f: impl FnOnce() -> T) -> (T, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let result = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (result, logs)
    }

    fn cell(letter: char, is_center: bool) -> HiveCell {
        HiveCell {
            letter,
            is_center,
            class_attr: None,
            aria_attr: None,
        }
    }

    fn cells(letters: &str, centers: &[usize]) -> Vec<HiveCell> {
        letters
            .chars()
            .enumerate()
            .map(|(i, letter)| cell(letter, centers.contains(&i)))
            .collect()
    }

    #[test]
    fn class_tokens_mark_center() {
        assert!(is_center_cell(Some("hive-cell hive-cell--center"), None));
        assert!(is_center_cell(Some("hive-cell_center"), None));
        assert!(is_center_cell(Some("cell is-center"), None));
        assert!(is_center_cell(Some("hive-cell center"), None));
    }

    #[test]
    fn center_token_with_outer_is_not_center() {
        assert!(!is_center_cell(Some("hive-cell center outer"), None));
    }

    #[test]
    fn class_tokens_match_whole_words_only() {
        assert!(!is_center_cell(Some("hive-cell centered"), None));
    }

    #[test]
    fn aria_label_is_a_fallback() {
        assert!(is_center_cell(Some("hive-cell"), Some("center letter a")));
        assert!(is_center_cell(None, Some("center")));
        assert!(!is_center_cell(None, Some("centers")));
        assert!(!is_center_cell(Some("hive-cell outer"), Some("outer letter t")));
    }

    #[test]
    fn single_marked_cell_is_center() {
        let hive = derive_hive(&cells("troapic", &[3])).unwrap();

        assert_eq!(hive.center(), 'a');
        assert_eq!(hive.outer(), &['t', 'r', 'o', 'p', 'i', 'c']);
    }

    #[test]
    fn marked_center_need_not_be_fourth() {
        let hive = derive_hive(&cells("atropic", &[0])).unwrap();

        assert_eq!(hive.center(), 'a');
        assert_eq!(hive.outer(), &['t', 'r', 'o', 'p', 'i', 'c']);
    }

    #[test]
    fn no_marker_falls_back_to_fourth_cell() {
        let hive = derive_hive(&cells("tropaic", &[])).unwrap();

        assert_eq!(hive.center(), 'p');
        assert_eq!(hive.outer(), &['t', 'r', 'o', 'a', 'i', 'c']);
    }

    #[test]
    fn fallback_warns_with_every_cell() {
        let mut board = cells("tropaic", &[]);
        board[3].class_attr = Some("Hive-Cell".to_string());

        let (hive, logs) = logs_of(|| derive_hive(&board));

        assert_eq!(hive.unwrap().center(), 'p');
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("falling back to nth-child(4)"), "{logs}");
        assert!(logs.contains("#1 letter='t' center=false"), "{logs}");
        assert!(logs.contains("#4 letter='p' center=false classes='Hive-Cell'"), "{logs}");
        assert!(logs.contains("#7 letter='c'"), "{logs}");
    }

    #[test]
    fn ambiguous_board_warns_with_every_cell() {
        let (result, logs) = logs_of(|| derive_hive(&cells("troapic", &[3, 4])));

        assert_eq!(result, Err(BoardError::ConflictingCenters));
        assert!(logs.contains("more than one hive cell marked as center"), "{logs}");
        assert!(logs.contains("#4 letter='a' center=true"), "{logs}");
        assert!(logs.contains("#5 letter='p' center=true"), "{logs}");
    }

    #[test]
    fn differing_marked_letters_are_fatal() {
        assert_eq!(
            derive_hive(&cells("troapic", &[3, 4])),
            Err(BoardError::ConflictingCenters)
        );
    }

    #[test]
    fn repeated_marked_letter_is_fatal() {
        assert_eq!(
            derive_hive(&cells("troaaic", &[3, 4])),
            Err(BoardError::MultipleCenters)
        );
    }

    #[test]
    fn wrong_cell_count_is_fatal() {
        assert_eq!(
            derive_hive(&cells("troapi", &[3])),
            Err(BoardError::OuterCount(5))
        );
    }

    #[test]
    fn scrape_reads_seven_cells() {
        let browser = FakeBrowser::new();

        let scraped = scrape_cells(&browser, &SessionId::new("s")).unwrap();

        let letters: String = scraped.iter().map(|c| c.letter).collect();
        assert_eq!(letters, "troapic");
        assert_eq!(
            scraped.iter().filter(|c| c.is_center).count(),
            1,
            "only the fourth cell is marked"
        );
        assert!(scraped[3].is_center);
        assert_eq!(browser.count("element_text"), 7);
    }

    #[test]
    fn scrape_keeps_attributes_as_rendered() {
        let mut page = vec![FakeCell::outer("T"); 7];
        page[0] = FakeCell {
            text: Some("A".to_string()),
            class: Some("Hive-Cell Is-Center".to_string()),
            aria: Some("Center Letter A".to_string()),
        };
        let browser = FakeBrowser::with_cells(page);

        let scraped = scrape_cells(&browser, &SessionId::new("s")).unwrap();

        assert!(scraped[0].is_center);
        assert_eq!(scraped[0].class_attr.as_deref(), Some("Hive-Cell Is-Center"));
        assert_eq!(scraped[0].aria_attr.as_deref(), Some("Center Letter A"));
    }

    #[test]
    fn center_markers_ignore_case() {
        assert!(is_center_cell(Some("Hive-Cell HIVE-CELL--CENTER"), None));
        assert!(!is_center_cell(Some("hive-cell Center Outer"), None));
        assert!(is_center_cell(None, Some("Center")));
    }

    #[test]
    fn scrape_rejects_blank_cell() {
        let mut page = vec![FakeCell::outer("T"); 7];
        page[2].text = Some("  ".to_string());
        let browser = FakeBrowser::with_cells(page);

        let err = scrape_cells(&browser, &SessionId::new("s")).unwrap_err();

        assert!(matches!(err, ScrapeError::MissingLetter(3)));
    }

    #[test]
    fn scrape_rejects_non_letter() {
        let mut page = vec![FakeCell::outer("T"); 7];
        page[5].text = Some("?".to_string());
        let browser = FakeBrowser::with_cells(page);

        let err = scrape_cells(&browser, &SessionId::new("s")).unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::UnexpectedLetter {
                letter: '?',
                position: 6
            }
        ));
    }
}
