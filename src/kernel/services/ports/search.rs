use std::sync::Arc;

use ropey::Rope;

use serde::{Deserialize, Serialize};

pub use crate::models::{IntervalStore, MatchInterval};

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    EmptyPattern,
    RegexSyntax(String),
    NoActiveQuery,
    SearchInProgress,
    ReplaceInProgress,
    ReplaceFailure(String),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::EmptyPattern => write!(f, "pattern length must be > 0"),
            SearchError::RegexSyntax(e) => write!(f, "Invalid regex: {}", e),
            SearchError::NoActiveQuery => write!(f, "pattern not set"),
            SearchError::SearchInProgress => write!(f, "search is still running"),
            SearchError::ReplaceInProgress => write!(f, "replace is still running"),
            SearchError::ReplaceFailure(msg) => write!(f, "Replace failed: {}", msg),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<regex::Error> for SearchError {
    fn from(e: regex::Error) -> Self {
        SearchError::RegexSyntax(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Literal,
    WholeWord,
    Regex,
}

/// Template syntax for group references in a replacement string.
///
/// With the default grammar `$1` inserts group 1, `\$` a literal dollar and
/// `\\` a literal backslash. Any other escaped char is kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackrefGrammar {
    pub escape_char: char,
    pub backref_start_char: char,
}

impl BackrefGrammar {
    pub const fn new(escape_char: char, backref_start_char: char) -> Self {
        Self {
            escape_char,
            backref_start_char,
        }
    }
}

impl Default for BackrefGrammar {
    fn default() -> Self {
        Self::new('\\', '$')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub mode: SearchMode,
    pub case_insensitive: bool,
    pub backref_grammar: Option<BackrefGrammar>,
}

impl SearchOptions {
    pub fn literal(case_insensitive: bool) -> Self {
        Self {
            mode: SearchMode::Literal,
            case_insensitive,
            backref_grammar: None,
        }
    }

    pub fn whole_word(case_insensitive: bool) -> Self {
        Self {
            mode: SearchMode::WholeWord,
            case_insensitive,
            backref_grammar: None,
        }
    }

    pub fn regex(case_insensitive: bool) -> Self {
        Self {
            mode: SearchMode::Regex,
            case_insensitive,
            backref_grammar: None,
        }
    }

    pub fn with_backrefs(mut self, grammar: BackrefGrammar) -> Self {
        self.backref_grammar = Some(grammar);
        self
    }

    pub fn is_regex(&self) -> bool {
        self.mode == SearchMode::Regex
    }

    /// Replacement templates are only expanded for regex searches.
    pub fn expands_backrefs(&self) -> bool {
        self.is_regex() && self.backref_grammar.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCause {
    Search,
    Replace,
}

/// Published on the owner's event channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    ResultsUpdated { generation: u64, match_count: usize },
    ReplaceCompleted { replaced: usize },
    ReplaceFailed { message: String },
}

/// Worker → owning context.
#[derive(Debug)]
pub enum SearchMessage {
    Finished {
        generation: u64,
        results: IntervalStore,
    },
    Failed {
        generation: u64,
        message: String,
    },
    Cancelled {
        generation: u64,
    },
    ReplaceFinished {
        ticket: u64,
        text: Rope,
        replaced: usize,
    },
    ReplaceFailed {
        ticket: u64,
        message: String,
    },
}

/// Read-only view of a published result set.
pub type SharedResults = Arc<IntervalStore>;
