use serde::{Deserialize, Serialize};

use super::search::{BackrefGrammar, SearchMode, SearchOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub cyclic_jumping: bool,
    pub case_insensitive: bool,
    pub worker_threads: usize,
    pub backref_grammar: BackrefGrammar,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            cyclic_jumping: true,
            case_insensitive: false,
            worker_threads: 2,
            backref_grammar: BackrefGrammar::default(),
        }
    }
}

impl SearchSettings {
    /// Options for `mode`; regex searches get the configured backref grammar.
    pub fn options(&self, mode: SearchMode) -> SearchOptions {
        let options = SearchOptions {
            mode,
            case_insensitive: self.case_insensitive,
            backref_grammar: None,
        };
        if mode == SearchMode::Regex {
            options.with_backrefs(self.backref_grammar)
        } else {
            options
        }
    }
}
