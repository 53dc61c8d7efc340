//! Headless search core (ports/adapters).

pub mod services;

pub use services::adapters::search::EditorSearcher;
pub use services::ports::{SearchError, SearchEvent, SearchMode, SearchOptions, TextHost};
