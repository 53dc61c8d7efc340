//! 后台匹配器
//!
//! - Literal 大小写敏感：memchr Finder，从上一个匹配的末尾继续查找
//! - Literal 大小写不敏感 / WholeWord / Regex：regex 引擎，`^`/`$` 识别 `\r\n` 行尾
//! - 结果为字符偏移，每次尝试匹配前检查取消标记

use crate::kernel::services::ports::search::{Result, SearchError, SearchMode, SearchOptions};
use crate::models::interval_store::{IntervalStore, MAX_OFFSET};
use memchr::memmem::Finder;
use regex::{Regex, RegexBuilder};
use ropey::Rope;
use std::sync::atomic::{AtomicBool, Ordering};

/// 编译好的搜索模式
#[derive(Clone)]
pub enum CompiledPattern {
    Literal {
        pattern: String,
        finder: Finder<'static>,
    },
    Regex {
        regex: Regex,
    },
}

impl std::fmt::Debug for CompiledPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal { pattern, .. } => f.debug_struct("Literal").field("pattern", pattern).finish(),
            Self::Regex { regex } => f.debug_struct("Regex").field("regex", &regex.as_str()).finish(),
        }
    }
}

impl CompiledPattern {
    /// 同步校验并编译，不读取任何文本
    pub fn compile(pattern: &str, options: &SearchOptions) -> Result<Self> {
        if pattern.is_empty() {
            return Err(SearchError::EmptyPattern);
        }

        match options.mode {
            SearchMode::Literal if !options.case_insensitive => {
                let finder = Finder::new(pattern.as_bytes()).into_owned();
                Ok(Self::Literal {
                    pattern: pattern.to_string(),
                    finder,
                })
            }
            SearchMode::Literal => {
                let regex = RegexBuilder::new(&regex::escape(pattern))
                    .case_insensitive(true)
                    .build()?;
                Ok(Self::Regex { regex })
            }
            SearchMode::WholeWord => {
                let wrapped = format!(r"\b{}\b", regex::escape(pattern));
                let regex = RegexBuilder::new(&wrapped)
                    .case_insensitive(options.case_insensitive)
                    .crlf(true)
                    .build()?;
                Ok(Self::Regex { regex })
            }
            SearchMode::Regex => {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(options.case_insensitive)
                    .multi_line(true)
                    .crlf(true)
                    .build()?;
                Ok(Self::Regex { regex })
            }
        }
    }

    pub fn regex(&self) -> Option<&Regex> {
        match self {
            Self::Regex { regex } => Some(regex),
            Self::Literal { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAbort {
    Cancelled,
    TooLarge,
}

/// 字节偏移 → 字符偏移，要求查询单调不减
struct CharCounter<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCounter<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn advance(&mut self, byte: usize) -> usize {
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

pub fn scan_rope(
    rope: &Rope,
    pattern: &CompiledPattern,
    cancelled: &AtomicBool,
) -> std::result::Result<IntervalStore, ScanAbort> {
    if rope.len_chars() > MAX_OFFSET {
        return Err(ScanAbort::TooLarge);
    }
    if cancelled.load(Ordering::Relaxed) {
        return Err(ScanAbort::Cancelled);
    }
    let text = rope.to_string();
    scan_str(&text, pattern, cancelled)
}

pub fn scan_str(
    text: &str,
    pattern: &CompiledPattern,
    cancelled: &AtomicBool,
) -> std::result::Result<IntervalStore, ScanAbort> {
    match pattern {
        CompiledPattern::Literal { pattern, finder } => {
            scan_literal(text, finder, pattern.len(), cancelled)
        }
        CompiledPattern::Regex { regex } => scan_regex(text, regex, cancelled),
    }
}

fn scan_literal(
    text: &str,
    finder: &Finder<'_>,
    pattern_len: usize,
    cancelled: &AtomicBool,
) -> std::result::Result<IntervalStore, ScanAbort> {
    let bytes = text.as_bytes();
    let mut results = IntervalStore::new();
    let mut counter = CharCounter::new(text);
    let mut pos = 0usize;

    while pos < bytes.len() {
        if cancelled.load(Ordering::Relaxed) {
            return Err(ScanAbort::Cancelled);
        }
        let Some(idx) = finder.find(&bytes[pos..]) else {
            break;
        };
        let start = pos + idx;
        let end = start + pattern_len;
        let char_start = counter.advance(start);
        let char_end = counter.advance(end);
        results.push(char_start, char_end);
        pos = end;
    }

    Ok(results)
}

fn scan_regex(
    text: &str,
    regex: &Regex,
    cancelled: &AtomicBool,
) -> std::result::Result<IntervalStore, ScanAbort> {
    let mut results = IntervalStore::new();
    let mut counter = CharCounter::new(text);
    let mut iter = regex.find_iter(text);

    loop {
        if cancelled.load(Ordering::Relaxed) {
            return Err(ScanAbort::Cancelled);
        }
        let Some(mat) = iter.next() else {
            break;
        };
        if mat.start() == mat.end() {
            continue;
        }
        let char_start = counter.advance(mat.start());
        let char_end = counter.advance(mat.end());
        results.push(char_start, char_end);
        if mat.end() == text.len() {
            break;
        }
    }

    Ok(results)
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/matcher.rs"]
mod tests;
