//! Service adapters: runtime specific implementations.

pub mod runtime;
pub mod search;
pub mod settings;

pub use runtime::SearchRuntime;
pub use search::{
    replace_all_in_rope, scan_rope, BackrefContext, BackrefParser, CompiledPattern,
    EditorSearcher, ReplacementToken, ScanAbort, SearchTask,
};
pub use settings::{get_settings_path, load_settings, load_settings_from, parse_settings};
