//! 替换模板解析
//!
//! 把 `"$2@$1"` 这类模板拆成字面量与分组引用，每个 (pattern, template)
//! 只解析一次，批量替换时复用。

use crate::kernel::services::ports::search::BackrefGrammar;
use regex::Captures;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementToken {
    Literal(String),
    GroupRef(usize),
}

pub struct BackrefParser {
    grammar: BackrefGrammar,
}

impl BackrefParser {
    pub fn new(grammar: BackrefGrammar) -> Self {
        Self { grammar }
    }

    /// `group_count` excludes group 0. A reference is greedy over digits as
    /// long as the number stays a valid group (`$12` with 11 groups is `$1`
    /// followed by `2`); an invalid reference is kept as plain text.
    pub fn parse(&self, template: &str, group_count: usize) -> Vec<ReplacementToken> {
        let BackrefGrammar {
            escape_char,
            backref_start_char,
        } = self.grammar;

        let mut tokens = Vec::new();
        let mut text = String::new();
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch == escape_char {
                match chars.next() {
                    Some(next) if next == escape_char || next == backref_start_char => {
                        text.push(next);
                    }
                    Some(next) => {
                        text.push(ch);
                        text.push(next);
                    }
                    None => text.push(ch),
                }
                continue;
            }

            if ch == backref_start_char {
                let first = chars
                    .peek()
                    .and_then(|c| c.to_digit(10))
                    .map(|d| d as usize)
                    .filter(|&d| d <= group_count);
                let Some(mut group) = first else {
                    text.push(ch);
                    continue;
                };
                chars.next();

                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    let candidate = group
                        .checked_mul(10)
                        .and_then(|g| g.checked_add(d as usize));
                    match candidate {
                        Some(g) if g <= group_count => {
                            group = g;
                            chars.next();
                        }
                        _ => break,
                    }
                }

                if !text.is_empty() {
                    tokens.push(ReplacementToken::Literal(std::mem::take(&mut text)));
                }
                tokens.push(ReplacementToken::GroupRef(group));
                continue;
            }

            text.push(ch);
        }

        if !text.is_empty() {
            tokens.push(ReplacementToken::Literal(text));
        }
        tokens
    }
}

/// Groups that did not participate in the match expand to nothing.
pub fn expand(tokens: &[ReplacementToken], caps: &Captures<'_>) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            ReplacementToken::Literal(text) => out.push_str(text),
            ReplacementToken::GroupRef(group) => {
                if let Some(m) = caps.get(*group) {
                    out.push_str(m.as_str());
                }
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../../../../../tests/unit/kernel/services/adapters/search/backref.rs"]
mod tests;
