use crate::error::{ParseError, Result};
use log::{debug, trace};
use std::io::{self, BufRead};

/// A line with its terminator removed, and how many bytes it took up in the
/// input including that terminator.
type RawLine = io::Result<(String, usize)>;

/// Line-at-a-time view over build output with a one-line push back.
///
/// Parsers read ahead to find where a block ends. The line that ended it
/// belongs to whoever comes next, so the parser hands it back with
/// [`push_back`](Self::push_back) and the following [`read_line`](Self::read_line)
/// delivers it again.
///
/// Line terminators (`\n` and `\r\n`) are stripped. The byte limit counts
/// them, so a limit means the same thing for text and streamed input.
pub struct OutputLineReader<'a> {
    lines: Box<dyn Iterator<Item = RawLine> + 'a>,
    last: Option<String>,
    pushed_back: Option<String>,
    lines_read: usize,
    bytes_read: usize,
    limit: Option<usize>,
}

impl<'a> OutputLineReader<'a> {
    /// Reads lines out of an in-memory string.
    pub fn from_text(text: &'a str) -> Self {
        Self::from_raw_lines(
            text.split_inclusive('\n')
                .map(|raw| Ok((strip_terminator(raw).to_owned(), raw.len()))),
        )
    }

    /// Reads lines from any buffered source. Invalid UTF-8 and other read
    /// failures surface as [`ParseError::Io`].
    pub fn from_reader<R: BufRead + 'a>(mut reader: R) -> Self {
        Self::from_raw_lines(std::iter::from_fn(move || {
            let mut buf = String::new();
            match reader.read_line(&mut buf) {
                Ok(0) => None,
                Ok(n) => Some(Ok((strip_terminator(&buf).to_owned(), n))),
                Err(e) => Some(Err(e)),
            }
        }))
    }

    fn from_raw_lines<I>(lines: I) -> Self
    where
        I: Iterator<Item = RawLine> + 'a,
    {
        Self {
            lines: Box::new(lines),
            last: None,
            pushed_back: None,
            lines_read: 0,
            bytes_read: 0,
            limit: None,
        }
    }

    /// Fails the read that takes the total consumed input past `limit` bytes.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns the next line, or `None` at end of stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let line = match self.pushed_back.take() {
            Some(line) => line,
            None => match self.lines.next() {
                Some(raw) => {
                    let (line, len) = raw?;
                    self.account(len)?;
                    line
                }
                None => {
                    self.last = None;
                    return Ok(None);
                }
            },
        };
        self.lines_read += 1;
        self.last = Some(line.clone());
        Ok(Some(line))
    }

    /// Rewinds the line returned by the previous [`read_line`](Self::read_line).
    ///
    /// Only one line can be rewound. A second call, or a call before anything
    /// was read, does nothing.
    pub fn push_back(&mut self) {
        if self.pushed_back.is_some() {
            debug!("push_back ignored: a line is already pushed back");
            return;
        }
        match self.last.take() {
            Some(line) => {
                trace!("pushed back line {}: {:?}", self.lines_read, line);
                self.lines_read -= 1;
                self.pushed_back = Some(line);
            }
            None => debug!("push_back ignored: no line to rewind"),
        }
    }

    /// Number of lines delivered so far, not counting a pushed back line.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    fn account(&mut self, len: usize) -> Result<()> {
        self.bytes_read += len;
        match self.limit {
            Some(limit) if self.bytes_read > limit => Err(ParseError::InputTooLarge {
                limit,
                actual: self.bytes_read,
            }),
            _ => Ok(()),
        }
    }
}

fn strip_terminator(raw: &str) -> &str {
    match raw.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => raw,
    }
}
