//! Scripted in-memory browser for exercising the solver without a driver.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use super::{Browser, Result, WebDriverError};
use crate::model::{ElementId, SessionId};

/// One hive cell as the fake page renders it.
#[derive(Debug, Clone)]
pub struct FakeCell {
    pub text: Option<String>,
    pub class: Option<String>,
    pub aria: Option<String>,
}

impl FakeCell {
    pub fn outer(letter: &str) -> Self {
        Self {
            text: Some(letter.to_string()),
            class: Some("hive-cell outer".to_string()),
            aria: None,
        }
    }

    pub fn center(letter: &str) -> Self {
        Self {
            text: Some(letter.to_string()),
            class: Some("hive-cell center".to_string()),
            aria: None,
        }
    }
}

/// Records every call and fails the ones it was told to.
///
/// Failures are queued per operation name (`"navigate"`, `"send_words"`, ...)
/// and consumed one per call, so a queue of two failures followed by a
/// success models "fail twice, then work".
pub struct FakeBrowser {
    calls: RefCell<Vec<String>>,
    failures: RefCell<HashMap<&'static str, VecDeque<WebDriverError>>>,
    cells: RefCell<Vec<FakeCell>>,
    typed: RefCell<Vec<Vec<String>>>,
    sessions_created: Cell<u32>,
}

impl Default for FakeBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBrowser {
    /// A page showing `T R O A P I C` with `A` marked as the center cell.
    pub fn new() -> Self {
        let cells = vec![
            FakeCell::outer("T"),
            FakeCell::outer("R"),
            FakeCell::outer("O"),
            FakeCell::center("A"),
            FakeCell::outer("P"),
            FakeCell::outer("I"),
            FakeCell::outer("C"),
        ];
        Self {
            calls: RefCell::new(Vec::new()),
            failures: RefCell::new(HashMap::new()),
            cells: RefCell::new(cells),
            typed: RefCell::new(Vec::new()),
            sessions_created: Cell::new(0),
        }
    }

    pub fn with_cells(cells: Vec<FakeCell>) -> Self {
        let fake = Self::new();
        *fake.cells.borrow_mut() = cells;
        fake
    }

    /// Makes the next `times` calls to `op` fail with a server error.
    pub fn fail(&self, op: &'static str, times: usize) {
        let mut failures = self.failures.borrow_mut();
        let queue = failures.entry(op).or_default();
        for _ in 0..times {
            queue.push_back(WebDriverError::Status {
                context: op.to_string(),
                status: 500,
                detail: "unknown error: scripted failure".to_string(),
            });
        }
    }

    /// Makes the next call to `op` report that the session is gone.
    pub fn lose_session(&self, op: &'static str) {
        self.failures
            .borrow_mut()
            .entry(op)
            .or_default()
            .push_back(WebDriverError::Status {
                context: op.to_string(),
                status: 404,
                detail: "invalid session id: session deleted".to_string(),
            });
    }

    /// Every call made so far, as `op` or `op:arg`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.split(':').next() == Some(op))
            .count()
    }

    /// Word lists handed to successful `send_words` calls.
    pub fn typed(&self) -> Vec<Vec<String>> {
        self.typed.borrow().clone()
    }

    fn record(&self, op: &'static str, arg: Option<&str>) -> Result<()> {
        let entry = match arg {
            Some(arg) => format!("{op}:{arg}"),
            None => op.to_string(),
        };
        self.calls.borrow_mut().push(entry);

        match self.failures.borrow_mut().get_mut(op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Cell for an element id of the form `cell-N` (1-based).
    fn cell(&self, element: &ElementId) -> Option<FakeCell> {
        let index: usize = element.as_str().strip_prefix("cell-")?.parse().ok()?;
        self.cells.borrow().get(index.checked_sub(1)?).cloned()
    }

    fn no_such_element(context: &str) -> WebDriverError {
        WebDriverError::Status {
            context: context.to_string(),
            status: 404,
            detail: "no such element: Unable to locate element".to_string(),
        }
    }
}

impl Browser for FakeBrowser {
    fn create_session(&self) -> Result<SessionId> {
        self.record("create_session", None)?;
        let n = self.sessions_created.get() + 1;
        self.sessions_created.set(n);
        Ok(SessionId::new(format!("session-{n}")))
    }

    fn delete_session(&self, session: &SessionId) -> Result<()> {
        self.record("delete_session", Some(session.as_str()))
    }

    fn navigate(&self, _session: &SessionId, url: &str) -> Result<()> {
        self.record("navigate", Some(url))
    }

    fn resize_window(&self, _session: &SessionId, width: u32, height: u32) -> Result<()> {
        self.record("resize_window", Some(&format!("{width}x{height}")))
    }

    fn find_element_css(&self, _session: &SessionId, selector: &str) -> Result<ElementId> {
        self.record("find_element", Some(selector))?;
        let index = selector
            .strip_prefix(".hive-cell:nth-child(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| Self::no_such_element(selector))?;
        Ok(ElementId::new(format!("cell-{index}")))
    }

    fn element_text(&self, _session: &SessionId, element: &ElementId) -> Result<String> {
        self.record("element_text", Some(element.as_str()))?;
        let cell = self
            .cell(element)
            .ok_or_else(|| Self::no_such_element(element.as_str()))?;
        Ok(cell.text.unwrap_or_default())
    }

    fn element_attribute(
        &self,
        _session: &SessionId,
        element: &ElementId,
        name: &str,
    ) -> Result<Option<String>> {
        self.record("element_attribute", Some(name))?;
        let cell = self
            .cell(element)
            .ok_or_else(|| Self::no_such_element(element.as_str()))?;
        Ok(match name {
            "class" => cell.class,
            "aria-label" => cell.aria,
            _ => None,
        })
    }

    fn click_element(&self, _session: &SessionId, element: &ElementId) -> Result<()> {
        self.record("click_element", Some(element.as_str()))
    }

    fn send_words(&self, _session: &SessionId, words: &[String]) -> Result<()> {
        self.record("send_words", None)?;
        self.typed.borrow_mut().push(words.to_vec());
        Ok(())
    }
}
