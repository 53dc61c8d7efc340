//! 替换引擎
//!
//! 批量替换在工作副本上进行：从原始快照读取匹配文本，写入副本，
//! 最后由调用方一次性换入，实时缓冲区只会看到替换前或替换后的完整状态。

use super::backref::{expand, BackrefParser, ReplacementToken};
use crate::kernel::services::ports::search::{BackrefGrammar, Result, SearchError};
use crate::models::IntervalStore;
use regex::Regex;
use ropey::Rope;

/// 分组引用展开所需的上下文
#[derive(Debug, Clone)]
pub struct BackrefContext {
    pub regex: Regex,
    pub grammar: BackrefGrammar,
}

impl BackrefContext {
    fn group_count(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }

    /// 在单个匹配文本上重新执行正则，得到新的分组
    pub fn expand_one(
        &self,
        matched: &str,
        template: &str,
        tokens: &mut Option<Vec<ReplacementToken>>,
    ) -> Option<String> {
        let caps = self.regex.captures(matched)?;
        let tokens = tokens.get_or_insert_with(|| {
            BackrefParser::new(self.grammar).parse(template, self.group_count())
        });
        Some(expand(tokens, &caps))
    }
}

/// 按升序替换所有区间，返回新文本与替换次数
pub fn replace_all_in_rope(
    original: &Rope,
    results: &IntervalStore,
    replacement: &str,
    backrefs: Option<&BackrefContext>,
) -> Result<(Rope, usize)> {
    let len = original.len_chars();
    let mut working = original.clone();
    let mut tokens: Option<Vec<ReplacementToken>> = None;
    let plain_len = replacement.chars().count() as isize;
    let mut delta: isize = 0;
    let mut replaced = 0usize;

    for interval in results.iter() {
        if interval.end > len {
            return Err(SearchError::ReplaceFailure(format!(
                "match {}..{} is outside the text ({} chars)",
                interval.start, interval.end, len
            )));
        }

        let expanded;
        let (text, text_len) = match backrefs {
            Some(ctx) => {
                let matched = original.slice(interval.start..interval.end).to_string();
                expanded = ctx
                    .expand_one(&matched, replacement, &mut tokens)
                    .ok_or_else(|| {
                        SearchError::ReplaceFailure(format!(
                            "match {}..{} does not match the pattern on its own",
                            interval.start, interval.end
                        ))
                    })?;
                (expanded.as_str(), expanded.chars().count() as isize)
            }
            None => (replacement, plain_len),
        };

        let start = (interval.start as isize + delta) as usize;
        let end = (interval.end as isize + delta) as usize;
        working.remove(start..end);
        if !text.is_empty() {
            working.insert(start, text);
        }
        delta += text_len - interval.len() as isize;
        replaced += 1;
    }

    Ok((working, replaced))
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/replace.rs"]
mod tests;
