use crate::driver::PatternAwareOutputParser;
use crate::error::Result;
use crate::ir::{Message, MessageKind, SourceFilePosition, SourcePosition};
use crate::reader::OutputLineReader;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Match, Regex};

const CMAKE_ERROR: &str = "CMake Error";
const ERROR: &str = "Error";

/// Shifts one-based display numbers to zero-based storage.
const SOURCE_POSITION_OFFSET: i32 = -1;

/// Missing line/column in the `CMake Error at <path>` form.
pub const LABELLED_MISSING_NUMBER: i32 = 0;
/// Missing line/column in the bare `<path>:<line>:<column>` form.
pub const BARE_MISSING_NUMBER: i32 = -1;

static BLOCK_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*CMake (Error|Warning)(: (Error|Warning) in cmake code)? at.*")
        .expect("block start pattern")
});

static TRACE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-- .*").expect("trace line pattern"));

// severity, path, line, column, description
static LABELLED_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^\s*CMake (Error|Warning)(?:: (?:Error|Warning) in cmake code)? at\s*",
        r"((?:[A-Za-z]:)?[^:]+):([0-9]+)?(?:[^:]*:([0-9]+)?)?(.*)$",
    ))
    .expect("labelled location pattern")
});

// path, line, column, description
static BARE_LOCATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\s)((?:[A-Za-z]:)?[^\s:]+):([0-9]+)? *:([0-9]+)?(.*)$")
        .expect("bare location pattern")
});

/// What a line pulled while accumulating a block means for that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// A `-- ` status line. Reported on its own; the block continues.
    Trace,
    /// A blank line or the header of the next block. Ends the block and is
    /// handed back to the reader.
    Terminator,
    /// Part of the current block's message.
    Body,
}

impl LineRole {
    pub fn of(line: &str) -> Self {
        if TRACE_LINE.is_match(line) {
            LineRole::Trace
        } else if line.is_empty() || BLOCK_START.is_match(line) {
            LineRole::Terminator
        } else {
            LineRole::Body
        }
    }
}

/// What happened to a completed block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    Emitted,
    /// No structured form matched, or the location was relative.
    Discarded,
}

/// The lines of one block joined by single spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBlock {
    text: String,
}

impl ParseBlock {
    pub fn new(header: &str) -> Self {
        let mut block = Self {
            text: String::with_capacity(header.len() + 1),
        };
        block.append(header);
        block
    }

    pub fn append(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push(' ');
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Parses the `CMake Error` / `CMake Warning` blocks CMake prints while
/// configuring a project:
///
/// ```text
/// CMake Error at /src/app/CMakeLists.txt:12 (message):
///   Something failed
/// ```
///
/// The parser has no state of its own. One call consumes one block and
/// appends what it finds to the caller's message list.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmakeOutputParser;

impl CmakeOutputParser {
    pub fn new() -> Self {
        Self
    }

    /// Whether `line` opens a CMake diagnostic block.
    pub fn is_block_start(line: &str) -> bool {
        BLOCK_START.is_match(line)
    }

    /// Pulls the rest of the block that `header` opened.
    ///
    /// Trace lines met on the way are appended to `messages` immediately, so
    /// they keep their place ahead of the block's own diagnostic.
    pub fn accumulate(
        header: &str,
        reader: &mut OutputLineReader<'_>,
        messages: &mut Vec<Message>,
    ) -> Result<ParseBlock> {
        let mut block = ParseBlock::new(header);
        while let Some(line) = reader.read_line()? {
            match LineRole::of(&line) {
                LineRole::Trace => messages.push(Message::simple(line)),
                LineRole::Terminator => {
                    reader.push_back();
                    break;
                }
                LineRole::Body => block.append(&line),
            }
        }
        Ok(block)
    }

    /// Turns a finished block into at most one located message.
    ///
    /// The `at <path>` form is tried before the bare form, whose pattern is
    /// loose enough to match text the first form owns.
    pub fn emit(block: &ParseBlock, messages: &mut Vec<Message>) -> BlockOutcome {
        let text = block.text();
        let fields =
            match_labelled_location(text).or_else(|| match_bare_location(text, messages));
        match fields {
            Some(fields) => {
                messages.push(fields.into_message());
                BlockOutcome::Emitted
            }
            None => BlockOutcome::Discarded,
        }
    }
}

impl PatternAwareOutputParser for CmakeOutputParser {
    fn name(&self) -> &str {
        "cmake"
    }

    fn parse(
        &self,
        line: &str,
        reader: &mut OutputLineReader<'_>,
        messages: &mut Vec<Message>,
    ) -> Result<bool> {
        if !Self::is_block_start(line) {
            return Ok(false);
        }
        let header_line = reader.lines_read();
        let block = Self::accumulate(line, reader, messages)?;
        if Self::emit(&block, messages) == BlockOutcome::Discarded {
            debug!(
                "Discarded CMake block starting at line {}: no absolute location in {:?}",
                header_line,
                block.text()
            );
        }
        Ok(true)
    }
}

/// The pieces of a located diagnostic, before position normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorFields {
    pub kind: MessageKind,
    pub file: String,
    /// One-based, or the form's missing-number sentinel.
    pub line: i32,
    /// One-based, or the form's missing-number sentinel.
    pub column: i32,
    pub text: String,
}

impl ErrorFields {
    pub fn into_message(self) -> Message {
        let position = SourcePosition::new(
            self.line + SOURCE_POSITION_OFFSET,
            self.column + SOURCE_POSITION_OFFSET,
            SOURCE_POSITION_OFFSET,
        );
        Message::new(
            self.kind,
            self.text,
            SourceFilePosition::new(self.file, position),
        )
    }
}

/// Matches `CMake Error at /path/to/file:12 (command):3 description`.
///
/// Line or column missing: [`LABELLED_MISSING_NUMBER`]. Description missing:
/// the whole block text. Returns `None` for relative paths.
pub fn match_labelled_location(text: &str) -> Option<ErrorFields> {
    let caps = LABELLED_LOCATION.captures(text)?;
    let file = caps.get(2)?.as_str().trim();
    if !is_absolute_path(file) {
        debug!("Labelled CMake location {:?} is not absolute", file);
        return None;
    }
    let kind = if caps.get(1).is_some_and(|m| m.as_str() == ERROR) {
        MessageKind::Error
    } else {
        MessageKind::Warning
    };
    Some(ErrorFields {
        kind,
        file: file.to_string(),
        line: parse_number(caps.get(3), LABELLED_MISSING_NUMBER),
        column: parse_number(caps.get(4), LABELLED_MISSING_NUMBER),
        text: description(&caps, 5, text),
    })
}

/// Matches the first `/path/to/file:12:3 description` in `text`.
///
/// Line or column missing: [`BARE_MISSING_NUMBER`]. The severity comes from
/// `earlier`, see [`classify_from_siblings`].
pub fn match_bare_location(text: &str, earlier: &[Message]) -> Option<ErrorFields> {
    let caps = BARE_LOCATION.captures(text)?;
    let file = caps.get(1)?.as_str();
    if !is_absolute_path(file) {
        debug!("Bare location {:?} is not absolute", file);
        return None;
    }
    Some(ErrorFields {
        kind: classify_from_siblings(earlier),
        file: file.to_string(),
        line: parse_number(caps.get(2), BARE_MISSING_NUMBER),
        column: parse_number(caps.get(3), BARE_MISSING_NUMBER),
        text: description(&caps, 4, text),
    })
}

/// Severity for a bare location, which carries no keyword of its own.
///
/// Any earlier message whose text starts with `CMake Error` makes it an
/// error. Otherwise it is a warning, whether or not a `CMake Warning` was seen.
pub fn classify_from_siblings(earlier: &[Message]) -> MessageKind {
    if earlier.iter().any(|m| m.text.starts_with(CMAKE_ERROR)) {
        MessageKind::Error
    } else {
        MessageKind::Warning
    }
}

/// Recognises absolute paths of either platform regardless of the host:
/// `/unix`, `C:\windows`, `C:/windows` and `\\server\share`.
pub fn is_absolute_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    match bytes {
        [b'/', ..] => true,
        [b'\\', b'\\', ..] => true,
        [drive, b':', b'\\' | b'/', ..] => drive.is_ascii_alphabetic(),
        _ => std::path::Path::new(path).is_absolute(),
    }
}

fn parse_number(group: Option<Match<'_>>, missing: i32) -> i32 {
    group
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(missing)
}

fn description(caps: &Captures<'_>, group: usize, whole: &str) -> String {
    match caps.get(group).map(|m| m.as_str().trim()) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => whole.trim().to_string(),
    }
}
