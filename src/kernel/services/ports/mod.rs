//! Service ports: traits + data contracts.

pub mod config;
pub mod host;
pub mod search;

pub use config::SearchSettings;
pub use host::TextHost;
pub use search::{
    BackrefGrammar, IntervalStore, MatchInterval, SearchError, SearchEvent, SearchMessage,
    SearchMode, SearchOptions, SelectionCause, SharedResults,
};
