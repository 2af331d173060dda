//! Token scanner for the hosts file.
//!
//! The scanner walks the loaded file contents with an explicit cursor. Records are
//! line oriented: the first token of a line is the address column, the remaining
//! tokens on the *same* line are host names. A saved [`Mark`] lets the matcher
//! re-walk a line's name tokens once it has decided the line matches.

/// Saved cursor position, restorable with [`LineScanner::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// A host name token read from the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameToken<'a> {
    /// Token bytes, with any `#` comment already cut off.
    pub text: &'a [u8],
    /// True when nothing but blanks (or a comment) follows on this line.
    pub line_ended: bool,
}

/// Cursor over hosts-file contents.
#[derive(Debug, Clone)]
pub struct LineScanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

/// C `isspace`: ASCII whitespace plus vertical tab.
#[inline]
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Separator that does not end the line.
#[inline]
fn is_blank(b: u8) -> bool {
    is_space(b) && b != b'\n'
}

impl<'a> LineScanner<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    #[must_use]
    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn rewind(&mut self, mark: Mark) {
        self.pos = mark.0.min(self.buf.len());
    }

    /// Return the first token of the next non-blank line.
    ///
    /// Leading whitespace, including empty lines, is consumed. Returns `None` at EOF.
    pub fn next_record_token(&mut self) -> Option<&'a [u8]> {
        while self.pos < self.buf.len() && is_space(self.buf[self.pos]) {
            self.pos += 1;
        }
        if self.is_eof() {
            return None;
        }
        Some(self.take_token())
    }

    /// Read the next name token on the current line.
    ///
    /// Returns `None` once the line has no further tokens; the cursor is then left on
    /// the line terminator. A `#` inside a token cuts it and ends the line; if the cut
    /// leaves nothing, this is reported as end of line.
    pub fn next_name(&mut self) -> Option<NameToken<'a>> {
        self.skip_blanks();
        if self.at_line_end() {
            return None;
        }
        let token = self.take_token();
        if let Some(hash) = token.iter().position(|&b| b == b'#') {
            self.skip_to_line_end();
            if hash == 0 {
                return None;
            }
            return Some(NameToken {
                text: &token[..hash],
                line_ended: true,
            });
        }
        let save = self.pos;
        self.skip_blanks();
        let line_ended = self.at_line_end() || self.buf[self.pos] == b'#';
        self.pos = save;
        Some(NameToken {
            text: token,
            line_ended,
        })
    }

    /// Move to the first byte after the next newline (or to EOF).
    pub fn skip_line(&mut self) {
        self.skip_to_line_end();
        if self.pos < self.buf.len() {
            self.pos += 1;
        }
    }

    fn take_token(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.pos < self.buf.len() && !is_space(self.buf[self.pos]) {
            self.pos += 1;
        }
        &self.buf[start..self.pos]
    }

    fn skip_blanks(&mut self) {
        while self.pos < self.buf.len() && is_blank(self.buf[self.pos]) {
            self.pos += 1;
        }
    }

    fn skip_to_line_end(&mut self) {
        while self.pos < self.buf.len() && self.buf[self.pos] != b'\n' {
            self.pos += 1;
        }
    }

    fn at_line_end(&self) -> bool {
        self.is_eof() || self.buf[self.pos] == b'\n'
    }
}
