//! 文本缓冲区模型
//!
//! 职责：
//! - 文本存储（Rope）
//! - 选区管理（字符偏移）
//! - 行列 ↔ 字符偏移映射
//! - 内容版本号，供搜索器感知修改

use crate::kernel::services::ports::host::TextHost;
use crate::kernel::services::ports::search::SelectionCause;
use ropey::{Rope, RopeSlice};
use std::borrow::Cow;
use std::io::{self, Write};

/// 从 RopeSlice 获取字符串，优先零拷贝
pub fn slice_to_cow(slice: RopeSlice<'_>) -> Cow<'_, str> {
    match slice.as_str() {
        Some(s) => Cow::Borrowed(s),
        None => Cow::Owned(slice.to_string()),
    }
}

#[derive(Clone)]
pub struct TextBuffer {
    rope: Rope,
    anchor: usize,
    cursor: usize,
    version: u64,
    editable: bool,
    last_cause: Option<SelectionCause>,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::from_text("")
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            anchor: 0,
            cursor: 0,
            version: 0,
            editable: true,
            last_cause: None,
        }
    }

    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// 流式写入到 Writer，避免大文件 OOM
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for chunk in self.rope.chunks() {
            writer.write_all(chunk.as_bytes())?;
        }
        Ok(())
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// 光标位置（字符偏移）
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, offset: usize) {
        let offset = offset.min(self.rope.len_chars());
        self.anchor = offset;
        self.cursor = offset;
    }

    pub fn has_selection(&self) -> bool {
        self.anchor != self.cursor
    }

    pub fn selected_text(&self) -> String {
        let (left, right) = self.selection();
        self.rope.slice(left..right).to_string()
    }

    pub fn last_selection_cause(&self) -> Option<SelectionCause> {
        self.last_cause
    }

    /// 在光标处插入，替换选区
    pub fn insert_str(&mut self, s: &str) {
        let (left, right) = self.selection();
        self.splice(left, right, s);
    }

    pub fn line_len_chars(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let text = slice_to_cow(slice);
        let without_newline = text
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(text.as_ref());
        without_newline.chars().count()
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextHost for TextBuffer {
    fn snapshot(&self) -> Rope {
        self.rope.clone()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        (line, offset - self.rope.line_to_char(line))
    }

    fn line_col_to_offset(&self, line: usize, col: usize) -> usize {
        let last_line = self.rope.len_lines().saturating_sub(1);
        let line = line.min(last_line);
        self.rope.line_to_char(line) + col.min(self.line_len_chars(line))
    }

    fn selection(&self) -> (usize, usize) {
        (self.anchor.min(self.cursor), self.anchor.max(self.cursor))
    }

    fn set_selection(&mut self, left: usize, right: usize, cause: SelectionCause) {
        let len = self.rope.len_chars();
        self.anchor = left.min(len);
        self.cursor = right.min(len).max(self.anchor);
        self.last_cause = Some(cause);
    }

    fn splice(&mut self, start: usize, end: usize, text: &str) {
        let len = self.rope.len_chars();
        let end = end.min(len);
        let start = start.min(end);
        if start < end {
            self.rope.remove(start..end);
        }
        if !text.is_empty() {
            self.rope.insert(start, text);
        }
        let caret = start + text.chars().count();
        self.anchor = caret;
        self.cursor = caret;
        self.bump_version();
    }

    fn set_content(&mut self, text: Rope) {
        self.rope = text;
        let len = self.rope.len_chars();
        self.anchor = self.anchor.min(len);
        self.cursor = self.cursor.min(len);
        self.bump_version();
    }

    fn is_editable(&self) -> bool {
        self.editable
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/text_buffer.rs"]
mod tests;
