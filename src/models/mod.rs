//! 数据模型层

pub mod interval_store;
pub mod text_buffer;

pub use interval_store::{IntervalStore, MatchInterval};
pub use text_buffer::{slice_to_cow, TextBuffer};
