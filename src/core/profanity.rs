use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while screening a message body
#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("Failed to read word list {path}: {source}")]
    WordList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome of screening a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    /// The body contains `word` as a literal substring
    Rejected { word: String },
}

impl Verdict {
    pub fn is_clean(&self) -> bool {
        matches!(self, Verdict::Clean)
    }
}

/// Where the disallowed substrings come from
#[derive(Debug, Clone)]
pub enum WordListSource {
    /// Newline-delimited file, re-read on every screen
    File(PathBuf),
    /// Fixed in-memory list
    Inline(Vec<String>),
}

/// All-or-nothing profanity screen
///
/// Matching is a case-sensitive substring test against every entry. There is
/// no redaction: one hit rejects the whole body.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    source: WordListSource,
}

impl ProfanityFilter {
    pub fn new(source: WordListSource) -> Self {
        Self { source }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(WordListSource::File(path.into()))
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words
            .into_iter()
            .map(Into::into)
            .filter(|w: &String| !w.is_empty())
            .collect();
        Self::new(WordListSource::Inline(words))
    }

    pub fn source(&self) -> &WordListSource {
        &self.source
    }

    /// Load the current word list
    ///
    /// File sources are read from disk on each call; nothing is cached.
    pub fn load_words(&self) -> Result<Vec<String>, ScreeningError> {
        match &self.source {
            WordListSource::File(path) => {
                let contents =
                    std::fs::read_to_string(path).map_err(|source| ScreeningError::WordList {
                        path: path.clone(),
                        source,
                    })?;
                Ok(parse_word_list(&contents))
            }
            WordListSource::Inline(words) => Ok(words.clone()),
        }
    }

    /// Screen a message body against the current word list
    pub fn screen(&self, body: &str) -> Result<Verdict, ScreeningError> {
        let words = self.load_words()?;
        Ok(screen_with(&words, body))
    }
}

/// Split word-list file contents into entries
///
/// Accepts `\n` and `\r\n` line endings. Blank lines are dropped since an empty
/// entry is a substring of every body.
pub fn parse_word_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Check `body` against an already loaded list
#[inline]
pub fn screen_with(words: &[String], body: &str) -> Verdict {
    words
        .iter()
        .find(|word| body.contains(word.as_str()))
        .map(|word| Verdict::Rejected { word: word.clone() })
        .unwrap_or(Verdict::Clean)
}
