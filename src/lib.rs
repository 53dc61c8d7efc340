//! zfind - 编辑器内增量搜索/替换引擎
//!
//! 模块结构：
//! - models: 数据模型（TextBuffer, IntervalStore）
//! - kernel: 搜索核心（ports: 契约与类型, adapters: 后台扫描/替换/配置）
//! - logging: tracing 初始化

pub mod kernel;
pub mod logging;
pub mod models;
