//! The operator's terminal.
//!
//! Everything the operator reads or types goes through [`Console`], so the
//! interactive flow can be driven from a script in tests.

use std::io::{self, BufRead, Write};

use tracing::warn;

const BANNER_TOP: &str = "=== PAUSED ======================================";
const BANNER_BOTTOM: &str = "=================================================";

/// Line-oriented operator I/O.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    /// Console over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints one line.
    ///
    /// A broken terminal is logged, not propagated: nothing the solver does
    /// next depends on the operator having seen the line.
    pub fn say(&mut self, line: impl AsRef<str>) {
        if let Err(e) = writeln!(self.output, "{}", line.as_ref()) {
            warn!(error = %e, "failed to write to console");
        }
    }

    /// Prints the pause banner for `reason` with the retry/skip/quit choices.
    pub fn pause_banner(&mut self, reason: &str) {
        self.say("");
        self.say(BANNER_TOP);
        self.say(reason);
        self.say("Fix the browser if needed, then:");
        self.say("  [Enter] retry  |  'skip' to skip  |  'quit' to stop workflow");
        self.say(BANNER_BOTTOM);
    }

    /// Prints `prompt` without a newline and blocks on one line of input.
    ///
    /// Returns the trimmed line, or `None` at end of input (or on a read error).
    pub fn prompt(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{prompt}").and_then(|()| self.output.flush()) {
            warn!(error = %e, "failed to write to console");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "failed to read from console");
                None
            }
        }
    }
}

#[cfg(test)]
impl Console<io::Cursor<Vec<u8>>, Vec<u8>> {
    /// Console that answers prompts with `script` and captures what is printed.
    pub fn scripted(script: &str) -> Self {
        Self::new(io::Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    /// Everything printed so far.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}
