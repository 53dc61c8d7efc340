use super::*;

#[test]
fn test_text_buffer_basic() {
    let buffer = TextBuffer::from_text("hello\nworld");

    assert_eq!(buffer.len_lines(), 2);
    assert_eq!(buffer.len_chars(), 11);
    assert_eq!(buffer.selection(), (0, 0));
    assert_eq!(buffer.version(), 0);
}

#[test]
fn test_offset_line_col_roundtrip() {
    let buffer = TextBuffer::from_text("hello\nworld");

    assert_eq!(buffer.offset_to_line_col(0), (0, 0));
    assert_eq!(buffer.offset_to_line_col(6), (1, 0));
    assert_eq!(buffer.offset_to_line_col(8), (1, 2));
    assert_eq!(buffer.line_col_to_offset(1, 2), 8);
}

#[test]
fn test_line_col_to_offset_clamps() {
    let buffer = TextBuffer::from_text("ab\ncd");

    assert_eq!(buffer.line_col_to_offset(0, 10), 2);
    assert_eq!(buffer.line_col_to_offset(9, 1), 4);
    assert_eq!(buffer.line_col_to_offset(9, 9), 5);
}

#[test]
fn test_line_len_ignores_crlf() {
    let buffer = TextBuffer::from_text("ab\r\ncd");
    assert_eq!(buffer.line_len_chars(0), 2);
    assert_eq!(buffer.line_col_to_offset(0, 5), 2);
}

#[test]
fn test_selection_is_normalized() {
    let mut buffer = TextBuffer::from_text("hello world");
    buffer.set_selection(6, 11, SelectionCause::Search);

    assert!(buffer.has_selection());
    assert_eq!(buffer.selected_text(), "world");
    assert_eq!(buffer.last_selection_cause(), Some(SelectionCause::Search));
}

#[test]
fn test_splice_moves_caret_and_bumps_version() {
    let mut buffer = TextBuffer::from_text("hello world");
    buffer.splice(0, 5, "bye");

    assert_eq!(buffer.text(), "bye world");
    assert_eq!(buffer.selection(), (3, 3));
    assert_eq!(buffer.version(), 1);
}

#[test]
fn test_insert_str_replaces_selection() {
    let mut buffer = TextBuffer::from_text("héllo wörld");
    buffer.set_selection(6, 11, SelectionCause::Search);
    buffer.insert_str("there");

    assert_eq!(buffer.text(), "héllo there");
    assert_eq!(buffer.cursor(), 11);
}

#[test]
fn test_set_content_clamps_selection() {
    let mut buffer = TextBuffer::from_text("hello world");
    buffer.set_cursor(11);
    buffer.set_content(Rope::from_str("hi"));

    assert_eq!(buffer.text(), "hi");
    assert_eq!(buffer.selection(), (2, 2));
    assert_eq!(buffer.version(), 1);
}

#[test]
fn test_write_to() {
    let buffer = TextBuffer::from_text("hello\nworld");
    let mut out = Vec::new();
    buffer.write_to(&mut out).unwrap();
    assert_eq!(out, b"hello\nworld");
}
