use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const WIKIPEDIA_RANDOM_SUMMARY: &str =
    "https://en.wikipedia.org/api/rest_v1/page/random/summary";

const USER_AGENT: &str = concat!(
    "wikitype/",
    env!("CARGO_PKG_VERSION"),
    " (terminal typing practice)"
);

/// Errors from fetching and preparing passage text
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(#[from] minreq::Error),

    #[error("request returned status {code}: {reason}")]
    Status { code: i32, reason: String },

    #[error("failed parsing json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{tool}' is needed to convert unicode to the closest ASCII ({error}). Install with 'pip install unidecode'")]
    ToolMissing { tool: String, error: which::Error },

    #[error("failed converting unicode to ascii: {0}")]
    Transliterate(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("gave up after {attempts} fetches with only {words} words")]
    Exhausted { attempts: usize, words: usize },
}

/// The fields of a page summary we care about
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Summary {
    pub title: String,
    #[serde(default)]
    pub extract: String,
    #[serde(default)]
    content_urls: Option<ContentUrls>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct ContentUrls {
    desktop: Option<PageUrls>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct PageUrls {
    page: Option<String>,
}

impl Summary {
    pub fn new(title: impl Into<String>, extract: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            extract: extract.into(),
            content_urls: None,
        }
    }

    pub fn parse(body: &str) -> Result<Self, SourceError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Desktop URL of the page the summary came from
    pub fn page_url(&self) -> Option<&str> {
        self.content_urls
            .as_ref()
            .and_then(|urls| urls.desktop.as_ref())
            .and_then(|desktop| desktop.page.as_deref())
    }
}

/// Somewhere page summaries come from
pub trait SummarySource {
    fn fetch(&mut self) -> Result<Summary, SourceError>;
}

/// Random article summaries from the Wikipedia REST api
#[derive(Debug, Clone)]
pub struct WikipediaSource {
    url: String,
    timeout_secs: u64,
}

impl WikipediaSource {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            timeout_secs,
        }
    }
}

impl Default for WikipediaSource {
    fn default() -> Self {
        Self::new(WIKIPEDIA_RANDOM_SUMMARY, 10)
    }
}

impl SummarySource for WikipediaSource {
    fn fetch(&mut self) -> Result<Summary, SourceError> {
        debug!(url = %self.url, "fetching summary");
        let response = minreq::get(&self.url)
            .with_header("User-Agent", USER_AGENT)
            .with_header("Accept", "application/json")
            .with_timeout(self.timeout_secs)
            .send()?;

        if response.status_code != 200 {
            return Err(SourceError::Status {
                code: response.status_code,
                reason: response.reason_phrase.clone(),
            });
        }

        Summary::parse(response.as_str()?)
    }
}

/// Turns arbitrary text into something typeable on a plain keyboard
pub trait Transliterate {
    fn to_ascii(&self, text: &str) -> Result<String, SourceError>;
}

/// Leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Transliterate for Passthrough {
    fn to_ascii(&self, text: &str) -> Result<String, SourceError> {
        Ok(text.to_string())
    }
}

/// Shells out to the `unidecode` command line tool
#[derive(Debug, Clone)]
pub struct Unidecode {
    program: PathBuf,
}

impl Unidecode {
    pub const TOOL: &'static str = "unidecode";

    /// Finds the tool in `PATH`
    pub fn locate() -> Result<Self, SourceError> {
        let program = which::which(Self::TOOL).map_err(|error| SourceError::ToolMissing {
            tool: Self::TOOL.to_string(),
            error,
        })?;
        debug!(program = %program.display(), "found transliteration tool");
        Ok(Self { program })
    }
}

impl Transliterate for Unidecode {
    fn to_ascii(&self, text: &str) -> Result<String, SourceError> {
        let output = Command::new(&self.program).arg("-c").arg(text).output()?;

        if !output.status.success() {
            return Err(SourceError::Transliterate(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        String::from_utf8(output.stdout).map_err(|e| SourceError::Transliterate(e.to_string()))
    }
}

/// Limits for building a passage out of several summaries
#[derive(Debug, Clone, Copy)]
pub struct AssemblyLimits {
    /// Keep fetching until the passage has more words than this
    pub min_words: usize,
    /// Width of a display row; each new summary starts on a fresh row
    pub cols: usize,
    pub max_fetches: usize,
}

/// A page that contributed to a passage
#[derive(Debug, Clone, PartialEq)]
pub struct PageRef {
    pub title: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assembled {
    pub text: String,
    pub word_count: usize,
    pub pages: Vec<PageRef>,
}

/// Glue summaries together, newline padded to row boundaries, until there are
/// enough words to type.
pub fn assemble<S, T>(
    source: &mut S,
    transliterator: &T,
    limits: AssemblyLimits,
) -> Result<Assembled, SourceError>
where
    S: SummarySource + ?Sized,
    T: Transliterate + ?Sized,
{
    let cols = limits.cols.max(1);
    let mut text = String::new();
    let mut word_count = 0;
    let mut pages = vec![];

    for attempt in 1..=limits.max_fetches {
        let summary = source.fetch()?;
        let chunk = transliterator.to_ascii(&summary.extract)?;
        let chunk = chunk.trim_end().trim_start_matches('\n');

        if chunk.is_empty() {
            warn!(title = %summary.title, attempt, "summary had no text, skipping");
            continue;
        }

        if !text.is_empty() {
            let padding = cols - (text.chars().count() % cols);
            text.extend(std::iter::repeat('\n').take(padding));
        }

        text.push_str(chunk);
        word_count += chunk.chars().filter(|&c| c == ' ').count() + 1;
        pages.push(PageRef {
            url: summary.page_url().map(str::to_string),
            title: summary.title,
        });
        debug!(attempt, word_count, "appended summary");

        if word_count > limits.min_words {
            info!(pages = pages.len(), word_count, "passage assembled");
            return Ok(Assembled {
                text,
                word_count,
                pages,
            });
        }
    }

    Err(SourceError::Exhausted {
        attempts: limits.max_fetches,
        words: word_count,
    })
}
