//! CLI interface for the solver.
//!
//! One command, no subcommands: load the word list, drive the browser,
//! type every candidate word into the puzzle. The operator steps in at
//! pauses; flags only decide setup and what happens when a run stops.

use std::env;
use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::info;

use crate::attempt::Orchestrator;
use crate::config::{Config, Settings};
use crate::console::Console;
use crate::dictionary::{self, Dictionary};
use crate::model::{Hive, Session, StopAction};
use crate::run;
use crate::webdriver::WebDriver;

/// Solve the letter-hive puzzle in a live browser.
#[derive(Debug, Parser)]
#[command(name = "hive-solver", version, after_long_help = SETUP_HELP)]
pub struct Cli {
    /// Control what happens after the run stops.
    #[arg(long, value_enum, value_name = "ACTION")]
    pub stop_action: Option<StopActionArg>,

    /// Shortcut for --stop-action=keep.
    #[arg(long, conflicts_with_all = ["stop_action", "rerun_on_stop"])]
    pub keep_open_on_stop: bool,

    /// Shortcut for --stop-action=rerun.
    #[arg(long, conflicts_with = "stop_action")]
    pub rerun_on_stop: bool,

    /// Supply hive letters (center letter last) instead of reading the board.
    #[arg(long, value_name = "LETTERS")]
    pub letters: Option<Hive>,

    /// Directory holding `wlist_match1.txt`.
    #[arg(long, value_name = "PATH")]
    pub dictionary_dir: Option<PathBuf>,

    /// `WebDriver` endpoint (overrides `WEBDRIVER_URL`).
    #[arg(long, value_name = "URL")]
    pub webdriver_url: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

const SETUP_HELP: &str = r#"Setup:
  1. chromedriver --port=9515
  2. hive-solver --dictionary-dir ./words
  3. Log in / dismiss modals in the opened window, then press Enter.

Configuration (optional): ~/.hive-solver/config.toml
  webdriver-url = "http://localhost:9515"
  dictionary-dir = "/path/to/words"
  stop-action = "rerun""#;

#[derive(Debug, Clone, ValueEnum)]
pub enum StopActionArg {
    /// Ask whether to close the browser, then exit.
    Prompt,
    /// Exit and leave the browser open.
    Keep,
    /// Offer to type the word list again.
    Rerun,
}

impl StopActionArg {
    fn to_domain(&self) -> StopAction {
        match self {
            Self::Prompt => StopAction::Prompt,
            Self::Keep => StopAction::Keep,
            Self::Rerun => StopAction::Rerun,
        }
    }
}

impl Cli {
    /// The stop action named on the command line, by flag or shortcut.
    pub fn stop_action(&self) -> Option<StopAction> {
        if self.keep_open_on_stop {
            Some(StopAction::Keep)
        } else if self.rerun_on_stop {
            Some(StopAction::Rerun)
        } else {
            self.stop_action.as_ref().map(StopActionArg::to_domain)
        }
    }
}

pub fn run(cli: &Cli) -> Result<(), String> {
    let config = Config::load()?;
    let settings = Settings::resolve(
        cli,
        config,
        env::var("WEBDRIVER_URL").ok(),
        dictionary::find_default_dir,
    )?;

    let dictionary = Dictionary::load(&settings.dictionary_dir).map_err(|e| e.to_string())?;
    println!(
        "Loaded word lists from {} (massive set size: {})",
        dictionary.source().display(),
        dictionary.len()
    );

    let browser = WebDriver::new(settings.webdriver_url.as_str())
        .map_err(|e| format!("failed to initialise WebDriver client: {e}"))?;
    info!(endpoint = browser.base_url(), stop_action = ?settings.stop_action, "starting run");

    let orchestrator = Orchestrator::new(
        &browser,
        &dictionary,
        &settings.page,
        settings.letters.clone(),
    );
    let mut session = Session::new(browser.base_url());
    let mut console = Console::stdio();

    let report = run::run(&orchestrator, &mut session, &mut console, settings.stop_action);
    info!(
        attempts = report.attempts,
        closed = report.closed,
        "run finished"
    );
    Ok(())
}
