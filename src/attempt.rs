//! One pass over the puzzle: session, page, letters, words, keystrokes.
//!
//! Every browser operation runs guarded, so a failure pauses for the
//! operator instead of ending the attempt. Steps nothing later can run
//! without (session, page, focus, letters) end the attempt on skip as
//! well as quit; only submitting the words can be skipped on its own.

use std::cell::Cell;
use std::fmt::Display;
use std::io::{BufRead, Write};

use tracing::{info, warn};

use crate::board::{self, FOCUS_SELECTOR, ScrapeError};
use crate::config::PageSettings;
use crate::console::Console;
use crate::dictionary::Dictionary;
use crate::model::{AttemptOutcome, Hive, Session, SessionId, StepResult};
use crate::retry::{Guarded, run_guarded, run_guarded_value};
use crate::webdriver::{Browser, WebDriverError};
use crate::words::find_candidates;

const READY_BANNER: &str = "Browser ready? Clear modals/login, then press Enter to begin.";

/// Why an attempt stopped early.
enum Halt {
    Quit,
    Fatal(String),
}

/// Failures that can mean the remote session is gone.
trait SessionLoss {
    fn is_session_lost(&self) -> bool;
}

impl SessionLoss for WebDriverError {
    fn is_session_lost(&self) -> bool {
        WebDriverError::is_session_lost(self)
    }
}

impl SessionLoss for ScrapeError {
    fn is_session_lost(&self) -> bool {
        matches!(self, Self::Remote(err) if err.is_session_lost())
    }
}

/// Runs attempts against one browser with a fixed dictionary and page.
pub struct Orchestrator<'a, B> {
    browser: &'a B,
    dictionary: &'a Dictionary,
    page: &'a PageSettings,
    letters: Option<Hive>,
}

impl<'a, B: Browser> Orchestrator<'a, B> {
    /// With `letters` set, the board is never read.
    pub fn new(
        browser: &'a B,
        dictionary: &'a Dictionary,
        page: &'a PageSettings,
        letters: Option<Hive>,
    ) -> Self {
        Self {
            browser,
            dictionary,
            page,
            letters,
        }
    }

    pub fn browser(&self) -> &B {
        self.browser
    }

    /// Runs attempt number `attempt`.
    ///
    /// `full_setup` asks for navigation and resizing even when a session is
    /// already held; a newly created session always gets them.
    pub fn run_attempt<R: BufRead, W: Write>(
        &self,
        session: &mut Session,
        console: &mut Console<R, W>,
        full_setup: bool,
        attempt: u32,
    ) -> AttemptOutcome {
        info!(attempt, full_setup, "starting attempt");
        let result = self.drive(session, console, full_setup, attempt);
        let active = session.is_active();
        match result {
            Ok(()) => AttemptOutcome::finished(active),
            Err(Halt::Quit) => AttemptOutcome::quit(active),
            Err(Halt::Fatal(message)) => AttemptOutcome::fatal(active, message),
        }
    }

    fn drive<R: BufRead, W: Write>(
        &self,
        session: &mut Session,
        console: &mut Console<R, W>,
        mut full_setup: bool,
        attempt: u32,
    ) -> Result<(), Halt> {
        let id = if let Some(id) = session.id() {
            id.clone()
        } else {
            let Guarded::Done(id) =
                run_guarded_value(console, "start session", || self.browser.create_session())
            else {
                return Err(Halt::Quit);
            };
            info!(session = %id, endpoint = session.base_url(), "browser session started");
            session.attach(id.clone());
            full_setup = true;
            id
        };

        if full_setup {
            let url = &self.page.url;
            self.required(session, console, "navigate", || self.browser.navigate(&id, url))?;
            self.required(session, console, "resize window", || {
                self.browser
                    .resize_window(&id, self.page.width, self.page.height)
            })?;

            console.pause_banner(READY_BANNER);
            if console.prompt("> ").is_none() {
                return Err(Halt::Quit);
            }
        } else {
            console.say("");
            console.say(format!("--- Restarting word list (attempt {attempt}) ---"));
        }

        self.required(session, console, "focus hive", || {
            let cell = self.browser.find_element_css(&id, FOCUS_SELECTOR)?;
            self.browser.click_element(&id, &cell)
        })?;

        let hive = match &self.letters {
            Some(hive) => hive.clone(),
            None => self.read_hive(session, console, &id)?,
        };

        let candidates = find_candidates(self.dictionary.words(), &hive);
        console.say(format!("Letters: {hive}"));
        console.say(format!("Generated {} candidate words.", candidates.len()));

        if candidates.is_empty() {
            console.say("No words found to send.");
            return Ok(());
        }

        match self.guard_step(session, console, "send words", || {
            self.browser.send_words(&id, &candidates)
        }) {
            StepResult::Ok => console.say("All done typing."),
            StepResult::Skip => info!("word submission skipped"),
            StepResult::Quit => return Err(Halt::Quit),
        }
        Ok(())
    }

    /// Scrapes the board (guarded) and derives the hive from it.
    ///
    /// An ambiguous board is fatal: the page won't change on a retry.
    fn read_hive<R: BufRead, W: Write>(
        &self,
        session: &mut Session,
        console: &mut Console<R, W>,
        id: &SessionId,
    ) -> Result<Hive, Halt> {
        let lost = Cell::new(false);
        let scraped = run_guarded_value(console, "read hive letters", watch(&lost, || {
            board::scrape_cells(self.browser, id)
        }));
        forget_lost_session(session, lost.get() && scraped.step() != StepResult::Ok);

        let Guarded::Done(cells) = scraped else {
            return Err(Halt::Quit);
        };
        board::derive_hive(&cells).map_err(|err| Halt::Fatal(err.to_string()))
    }

    /// A guarded step the rest of the attempt depends on.
    fn required<E, R, W>(
        &self,
        session: &mut Session,
        console: &mut Console<R, W>,
        label: &str,
        op: impl FnMut() -> Result<(), E>,
    ) -> Result<(), Halt>
    where
        E: Display + SessionLoss,
        R: BufRead,
        W: Write,
    {
        match self.guard_step(session, console, label, op) {
            StepResult::Ok => Ok(()),
            StepResult::Skip | StepResult::Quit => Err(Halt::Quit),
        }
    }

    fn guard_step<E, R, W>(
        &self,
        session: &mut Session,
        console: &mut Console<R, W>,
        label: &str,
        op: impl FnMut() -> Result<(), E>,
    ) -> StepResult
    where
        E: Display + SessionLoss,
        R: BufRead,
        W: Write,
    {
        let lost = Cell::new(false);
        let step = run_guarded(console, label, watch(&lost, op));
        forget_lost_session(session, lost.get() && step != StepResult::Ok);
        step
    }
}

/// Wraps `op` to note whether its latest failure said the session is gone.
fn watch<'a, T, E: SessionLoss>(
    lost: &'a Cell<bool>,
    mut op: impl FnMut() -> Result<T, E> + 'a,
) -> impl FnMut() -> Result<T, E> + 'a {
    move || {
        let result = op();
        lost.set(matches!(&result, Err(err) if err.is_session_lost()));
        result
    }
}

/// Drops the session when the operator gave up on a step that lost it,
/// so the next attempt starts a new one.
fn forget_lost_session(session: &mut Session, gave_up_on_lost: bool) {
    if gave_up_on_lost && let Some(id) = session.clear() {
        warn!(session = %id, "browser session is gone; a new one will be started");
    }
}
