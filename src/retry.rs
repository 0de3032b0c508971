//! Interactive retry loop around one browser operation.
//!
//! A failed step pauses the workflow until the operator decides: press
//! Enter to retry, `skip` to move on without it, or `quit` to stop.
//! There is no retry limit; the operator is the limit.

use std::fmt::Display;
use std::io::{BufRead, Write};

use tracing::warn;

use crate::console::Console;
use crate::model::StepResult;

/// What a guarded step that produces a value ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Done(T),
    Skipped,
    Quit,
}

impl<T> Guarded<T> {
    /// The step result, dropping any value.
    pub fn step(&self) -> StepResult {
        match self {
            Self::Done(_) => StepResult::Ok,
            Self::Skipped => StepResult::Skip,
            Self::Quit => StepResult::Quit,
        }
    }
}

/// Runs `op` until it succeeds or the operator skips or quits.
pub fn run_guarded_value<T, E, R, W>(
    console: &mut Console<R, W>,
    label: &str,
    mut op: impl FnMut() -> Result<T, E>,
) -> Guarded<T>
where
    E: Display,
    R: BufRead,
    W: Write,
{
    loop {
        let err = match op() {
            Ok(value) => return Guarded::Done(value),
            Err(err) => err,
        };

        warn!(step = label, error = %err, "guarded step failed");
        console.say(format!("[WARN] {label} failed: {err}"));
        console.pause_banner(label);

        // A closed stdin can never answer, so treat it as quit.
        let Some(answer) = console.prompt("> ") else {
            return Guarded::Quit;
        };
        match answer.to_ascii_lowercase().as_str() {
            "quit" | "q" => return Guarded::Quit,
            "skip" | "s" => return Guarded::Skipped,
            _ => {}
        }
    }
}

/// Runs `op` until it succeeds or the operator skips or quits.
pub fn run_guarded<E, R, W>(
    console: &mut Console<R, W>,
    label: &str,
    op: impl FnMut() -> Result<(), E>,
) -> StepResult
where
    E: Display,
    R: BufRead,
    W: Write,
{
    run_guarded_value(console, label, op).step()
}
