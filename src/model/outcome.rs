//! Results reported up the call chain: per guarded step, per attempt,
//! and the policy the run loop applies between attempts.

use serde::Deserialize;

/// What a guarded step ended with.
///
/// Never persisted; returned to the caller of that one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The operation succeeded (possibly after retries).
    Ok,

    /// The operator chose to skip the step.
    Skip,

    /// The operator chose to stop the workflow.
    Quit,
}

/// How one attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    /// Whether a browser session is still held after the attempt.
    pub session_active: bool,

    /// Whether the operator stopped the workflow at a guarded step.
    pub user_quit: bool,

    /// Message for a non-retryable failure, if one ended the attempt.
    pub fatal: Option<String>,
}

impl AttemptOutcome {
    /// The attempt ran to the end.
    pub fn finished(session_active: bool) -> Self {
        Self {
            session_active,
            user_quit: false,
            fatal: None,
        }
    }

    /// The operator quit (or skipped a step nothing can proceed without).
    pub fn quit(session_active: bool) -> Self {
        Self {
            session_active,
            user_quit: true,
            fatal: None,
        }
    }

    /// A non-retryable failure ended the attempt.
    pub fn fatal(session_active: bool, message: impl Into<String>) -> Self {
        Self {
            session_active,
            user_quit: false,
            fatal: Some(message.into()),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.is_some()
    }
}

/// What the run loop does once an attempt ends without the operator quitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopAction {
    /// Ask whether to close the browser, then stop.
    Prompt,

    /// Stop and leave the browser open.
    Keep,

    /// Offer to run the word list again on the same page.
    #[default]
    Rerun,
}
