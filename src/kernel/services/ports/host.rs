//! Editing surface the search engine works against.
//!
//! All offsets are char offsets into the current text. Columns are char
//! columns within a line.

use ropey::Rope;

use super::search::SelectionCause;

pub trait TextHost {
    /// Copy-on-write snapshot of the current content.
    fn snapshot(&self) -> Rope;

    fn len_chars(&self) -> usize;

    /// Bumped on every content change.
    fn version(&self) -> u64;

    fn offset_to_line_col(&self, offset: usize) -> (usize, usize);

    /// Out-of-range positions clamp to the nearest valid offset.
    fn line_col_to_offset(&self, line: usize, col: usize) -> usize;

    /// `(left, right)` with `left <= right`.
    fn selection(&self) -> (usize, usize);

    fn set_selection(&mut self, left: usize, right: usize, cause: SelectionCause);

    fn splice(&mut self, start: usize, end: usize, text: &str);

    /// Replaces the whole content in one step.
    fn set_content(&mut self, text: Rope) {
        let len = self.len_chars();
        self.splice(0, len, &text.to_string());
    }

    fn is_editable(&self) -> bool {
        true
    }
}
