use super::{char_column, split_lines};

/// Lexical state carried from one line into the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Carry {
    Code,
    BlockComment,
    Quoted(u8),
    Scissors,
}

const SCISSORS_OPEN: &[u8] = b"-8<-";
const SCISSORS_CLOSE: &[u8] = b"->8-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Only comment text (`#`, `//`, `/* */`) on this line.
    Comment,
    /// Entirely inside a multi-line string literal.
    Text,
    Code,
}

/// One source line plus its masked code view.
///
/// `code` has exactly the byte length of `text`; comment bodies and string
/// contents are blanked with spaces while string delimiters are kept. Every
/// matcher runs on `code`, so a keyword or brace inside a comment or string
/// never counts, and byte offsets found in `code` index straight into `text`.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    pub index: usize,
    pub text: &'a str,
    pub code: String,
    pub kind: LineKind,
}

impl Line<'_> {
    pub fn is_code(&self) -> bool {
        self.kind == LineKind::Code
    }

    pub fn is_comment(&self) -> bool {
        self.kind == LineKind::Comment
    }

    /// Character column for a byte offset into this line.
    pub fn column(&self, byte: usize) -> u32 {
        char_column(self.text, byte)
    }

    /// Length of the line in characters.
    pub fn char_len(&self) -> u32 {
        self.text.chars().count() as u32
    }
}

/// Lazy line iterator. Restartable by calling [`scan_lines`] again.
pub struct LineScanner<'a> {
    lines: Box<dyn Iterator<Item = &'a str> + 'a>,
    index: usize,
    carry: Carry,
}

pub fn scan_lines(text: &str) -> LineScanner<'_> {
    LineScanner {
        lines: Box::new(split_lines(text)),
        index: 0,
        carry: Carry::Code,
    }
}

impl<'a> Iterator for LineScanner<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.lines.next()?;
        let index = self.index;
        self.index += 1;

        let (code, saw_comment) = mask_line(text, &mut self.carry);
        let kind = if text.trim().is_empty() {
            LineKind::Blank
        } else if !code.trim().is_empty() {
            LineKind::Code
        } else if saw_comment {
            LineKind::Comment
        } else {
            LineKind::Text
        };

        Some(Line { index, text, code, kind })
    }
}

fn mask_line(text: &str, carry: &mut Carry) -> (String, bool) {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut out: Vec<u8> = Vec::with_capacity(len);
    let mut saw_comment = false;
    let mut i = 0usize;

    while i < len {
        match *carry {
            Carry::BlockComment => {
                saw_comment = true;
                if bytes[i..].starts_with(b"*/") {
                    out.extend_from_slice(b"  ");
                    i += 2;
                    *carry = Carry::Code;
                } else {
                    out.push(b' ');
                    i += 1;
                }
            }
            Carry::Quoted(quote) => {
                if bytes[i] == b'\\' && i + 1 < len {
                    out.push(b' ');
                    i += 1;
                    // keep multi-byte characters aligned: blank every byte of the escaped char
                    let width = utf8_width(bytes[i]);
                    out.extend(std::iter::repeat_n(b' ', width));
                    i += width;
                } else if bytes[i] == quote {
                    out.push(quote);
                    i += 1;
                    *carry = Carry::Code;
                } else {
                    out.push(b' ');
                    i += 1;
                }
            }
            Carry::Scissors => {
                if bytes[i..].starts_with(SCISSORS_CLOSE) {
                    out.extend_from_slice(SCISSORS_CLOSE);
                    i += SCISSORS_CLOSE.len();
                    *carry = Carry::Code;
                } else {
                    out.push(b' ');
                    i += 1;
                }
            }
            Carry::Code => match bytes[i] {
                b'#' => {
                    saw_comment = true;
                    out.extend(std::iter::repeat_n(b' ', len - i));
                    i = len;
                }
                b'/' if bytes.get(i + 1) == Some(&b'/') => {
                    saw_comment = true;
                    out.extend(std::iter::repeat_n(b' ', len - i));
                    i = len;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    saw_comment = true;
                    out.extend_from_slice(b"  ");
                    i += 2;
                    *carry = Carry::BlockComment;
                }
                b'"' | b'\'' => {
                    out.push(bytes[i]);
                    *carry = Carry::Quoted(bytes[i]);
                    i += 1;
                }
                b'-' if bytes[i..].starts_with(SCISSORS_OPEN) => {
                    out.extend_from_slice(SCISSORS_OPEN);
                    i += SCISSORS_OPEN.len();
                    *carry = Carry::Scissors;
                }
                b => {
                    out.push(b);
                    i += 1;
                }
            },
        }
    }

    out.truncate(len);
    let code = match String::from_utf8(out) {
        Ok(code) => code,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    };
    (code, saw_comment)
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}
