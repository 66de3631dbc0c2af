use std::fmt::Display;
use std::io::{self, stdin};
use std::process::ExitCode;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{enable_raw_mode, EnterAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info, warn};

use wikitype::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    error::AppResult,
    host, logging,
    passage::Passage,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    score::Score,
    session::TypingSession,
    source::{assemble, Passthrough, Transliterate, Unidecode, WikipediaSource},
};

/// typing practice on random wikipedia summaries
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type your way through random Wikipedia article summaries. Newlines are skipped for you; backspace to fix mistakes. Words per minute and accuracy are printed when you finish, Esc quits."
)]
pub struct Cli {
    /// custom prompt to type instead of fetching one
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// number of rows in the typing window
    #[clap(long)]
    rows: Option<usize>,

    /// number of columns in the typing window
    #[clap(long)]
    cols: Option<usize>,

    /// keep fetching summaries until the passage has more words than this
    #[clap(short = 'w', long)]
    min_words: Option<usize>,

    /// endpoint returning a random page summary as json
    #[clap(long)]
    url: Option<String>,

    /// skip converting fetched text to ascii with unidecode
    #[clap(long)]
    no_transliterate: bool,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn to_config(&self, mut config: Config) -> Config {
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.cols = cols;
        }
        if let Some(min_words) = self.min_words {
            config.min_words = min_words;
        }
        if let Some(url) = &self.url {
            config.summary_url = url.clone();
        }
        if self.no_transliterate {
            config.transliterate = false;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = AppDirs::log_dir().and_then(|dir| logging::init(&dir));

    let store = FileConfigStore::new();
    let config = cli.to_config(store.load());
    if cli.save_config {
        if let Err(e) = store.save(&config) {
            warn!(path = %store.path().display(), error = %e, "could not save config");
        }
    }

    // a bad prompt is reported before anything else is checked
    let prompt = match cli.prompt.as_deref().map(Passage::new).transpose() {
        Ok(prompt) => prompt,
        Err(e) => return startup_failure(e),
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let passage = match prompt {
        Some(passage) => passage,
        None => match fetch_passage(&config) {
            Ok(passage) => passage,
            Err(e) => return startup_failure(e),
        },
    };
    info!(
        chars = passage.len(),
        words = passage.word_count(),
        "passage ready"
    );

    match run(passage, &config) {
        Ok(Some(score)) => {
            info!(wpm = score.wpm, accuracy = score.accuracy, "session scored");
            println!("{score}");
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "session aborted");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn startup_failure(e: impl Display) -> ExitCode {
    error!(error = %e, "could not prepare a passage");
    eprintln!("{e}");
    ExitCode::FAILURE
}

fn fetch_passage(config: &Config) -> AppResult<Passage> {
    println!("Fetching summary from wiki...");

    let mut source = WikipediaSource::new(&config.summary_url, config.request_timeout_secs);
    let transliterator: Box<dyn Transliterate> = if config.transliterate {
        Box::new(Unidecode::locate()?)
    } else {
        Box::new(Passthrough)
    };

    let assembled = assemble(&mut source, transliterator.as_ref(), config.assembly_limits())?;

    for page in &assembled.pages {
        println!("Title: {}", page.title);
        if let Some(url) = &page.url {
            println!("Page: {url}");
        }
        println!();
    }

    Ok(Passage::new(&assembled.text)?)
}

fn run(passage: Passage, config: &Config) -> AppResult<Option<Score>> {
    let mut session = TypingSession::new(passage);

    host::install_panic_hook();
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.poll_interval()),
    );
    let result = host::run_session(
        &mut terminal,
        &mut session,
        &runner,
        config.rows,
        config.cols,
    );

    let restored = host::restore_terminal(&mut terminal);
    result?;
    restored?;
    Ok(session.score())
}
