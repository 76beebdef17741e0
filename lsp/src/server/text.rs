use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

// Convert LSP UTF-16 position to Rope char index (scalar values), clamped to the end of the line.
pub(crate) fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let target_utf16 = pos.character as usize;

    if let Some(s) = line_slice.as_str() {
        if s.is_ascii() {
            let content_len = s.trim_end_matches(['\n', '\r']).len();
            return line_start_char + target_utf16.min(content_len);
        }
    }

    let mut seen_utf16 = 0usize;
    let mut chars_in_line = 0usize;
    for ch in line_slice.chars() {
        if ch == '\n' || ch == '\r' {
            break;
        }
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target_utf16 {
            break;
        }
        seen_utf16 += u16_len;
        chars_in_line += 1;
    }
    line_start_char + chars_in_line
}

// Apply one LSP content change to a rope buffer; a change without a range replaces everything.
pub(crate) fn apply_change(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    let Some(range) = &change.range else {
        *text = Rope::from_str(&change.text);
        return;
    };
    let start_char = position_to_char_idx(text, range.start);
    let end_char = position_to_char_idx(text, range.end);
    let (s, e) = if start_char <= end_char {
        (start_char, end_char)
    } else {
        (end_char, start_char)
    };
    if s != e {
        text.remove(s..e);
    }
    if !change.text.is_empty() {
        text.insert(s, &change.text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Range;

    fn edit(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))),
            range_length: None,
            text: text.to_string(),
        }
    }

    #[test]
    fn utf16_columns_map_to_chars() {
        let rope = Rope::from_str("a😀b\nnext\n");
        assert_eq!(position_to_char_idx(&rope, Position::new(0, 3)), 2);
        assert_eq!(position_to_char_idx(&rope, Position::new(0, 40)), 3);
        assert_eq!(position_to_char_idx(&rope, Position::new(1, 2)), 6);
        assert_eq!(position_to_char_idx(&rope, Position::new(9, 0)), rope.len_chars());
    }

    #[test]
    fn incremental_edits_apply_in_order() {
        let mut rope = Rope::from_str("task a \"A\" {\n  depends b\n}\n");
        apply_change(&mut rope, &edit((1, 10), (1, 11), "plan"));
        apply_change(&mut rope, &edit((0, 5), (0, 6), "impl"));
        assert_eq!(rope.to_string(), "task impl \"A\" {\n  depends plan\n}\n");
    }

    #[test]
    fn full_replacement() {
        let mut rope = Rope::from_str("old");
        apply_change(
            &mut rope,
            &TextDocumentContentChangeEvent {
                range: None,
                range_length: None,
                text: "new text".to_string(),
            },
        );
        assert_eq!(rope.to_string(), "new text");
    }
}
