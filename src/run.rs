//! The run loop: attempts until the operator or the stop action says stop.

use std::io::{BufRead, Write};

use tracing::{error, info, warn};

use crate::attempt::Orchestrator;
use crate::console::Console;
use crate::model::{AttemptOutcome, Session, StopAction};
use crate::webdriver::Browser;

const CLOSE_PROMPT: &str =
    "\nClose the browser now?  (press Enter = close)  Type 'keep' to leave it open: ";
const RERUN_PROMPT: &str = "Press Enter to rerun from the beginning, or type 'quit' to exit, 'close' to close the browser and exit: ";
const RERUN_AFTER_FATAL_PROMPT: &str = "Fix any issues, then press Enter to rerun, 'quit' to exit, or 'close' to close the browser and exit: ";

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Attempts made, counting from 1.
    pub attempts: u32,

    /// Whether the browser session was closed on the way out.
    pub closed: bool,
}

/// What to do after an attempt.
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Rerun,
    Stop { close: bool },
}

/// Runs attempts until stopped, then closes the session if asked to.
///
/// The first attempt, and any attempt after a fatal one or one that ended
/// without a session, does the full setup; reruns on a live session go
/// straight to the word list.
pub fn run<B, R, W>(
    orchestrator: &Orchestrator<'_, B>,
    session: &mut Session,
    console: &mut Console<R, W>,
    stop_action: StopAction,
) -> RunReport
where
    B: Browser,
    R: BufRead,
    W: Write,
{
    let mut attempts = 0;
    let mut full_setup = true;

    let close = loop {
        attempts += 1;
        let outcome = orchestrator.run_attempt(session, console, full_setup, attempts);

        if let Some(message) = &outcome.fatal {
            error!(attempt = attempts, %message, "attempt failed");
            console.say("");
            console.say(format!("[FATAL] {message}"));
        }
        full_setup = outcome.is_fatal() || !outcome.session_active;

        match next_step(console, &outcome, stop_action) {
            Next::Rerun => info!(attempt = attempts, "rerunning"),
            Next::Stop { close } => break close,
        }
    };

    let closed = close && close_session(orchestrator.browser(), session);
    RunReport { attempts, closed }
}

fn next_step<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    outcome: &AttemptOutcome,
    stop_action: StopAction,
) -> Next {
    if outcome.user_quit {
        return Next::Stop { close: true };
    }

    match stop_action {
        StopAction::Prompt => {
            let answer = console.prompt(CLOSE_PROMPT);
            let keep = matches!(answer.as_deref(), Some("keep" | "k"));
            Next::Stop { close: !keep }
        }
        StopAction::Keep => Next::Stop { close: false },
        StopAction::Rerun => {
            let prompt = if outcome.is_fatal() {
                RERUN_AFTER_FATAL_PROMPT
            } else {
                RERUN_PROMPT
            };
            match console.prompt(prompt).as_deref() {
                // Nobody left to ask; leave the browser as it is.
                None => Next::Stop { close: false },
                Some("quit" | "q" | "close" | "c") => Next::Stop { close: true },
                Some(_) => Next::Rerun,
            }
        }
    }
}

/// Deletes the held session, if any. Failures are logged and ignored.
fn close_session(browser: &impl Browser, session: &mut Session) -> bool {
    let Some(id) = session.clear() else {
        return false;
    };

    match browser.delete_session(&id) {
        Ok(()) => {
            info!(session = %id, "browser session closed");
            true
        }
        Err(e) => {
            warn!(session = %id, error = %e, "failed to close browser session");
            false
        }
    }
}
