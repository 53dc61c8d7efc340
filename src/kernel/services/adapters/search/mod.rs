//! 搜索服务模块
//!
//! - matcher: 后台匹配器 (Literal / WholeWord / Regex)
//! - backref: 替换模板解析
//! - replace: 单个/批量替换
//! - EditorSearcher: 编辑器内搜索协调者

mod backref;
mod matcher;
mod replace;
mod service;

pub use backref::{expand, BackrefParser, ReplacementToken};
pub use matcher::{scan_rope, scan_str, CompiledPattern, ScanAbort};
pub use replace::{replace_all_in_rope, BackrefContext};
pub use service::{EditorSearcher, SearchTask};
