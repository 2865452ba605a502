/// A forward-only position over a document's lines.
///
/// Lines handed out by `next_line` are consumed. `remaining` lets the
/// lookahead routines inspect what follows without consuming it; only
/// `skip` consumes on their behalf.
#[derive(Clone, Copy, Debug)]
pub struct ParseCursor<'a> {
    lines: &'a [String],
    pos: usize,
}

impl<'a> ParseCursor<'a> {
    pub fn new(lines: &'a [String]) -> ParseCursor<'a> {
        ParseCursor { lines, pos: 0 }
    }

    pub fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line.as_str())
    }

    /// The lines not yet consumed, in order.
    pub fn remaining(&self) -> &'a [String] {
        &self.lines[self.pos..]
    }

    /// Consumes up to n lines without returning them.
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.lines.len());
    }

    /// Index of the next line that would be returned.
    pub fn position(&self) -> usize {
        self.pos
    }
}
