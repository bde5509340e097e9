use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How serious a [`Message`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Error,
    Warning,
    Info,
    /// Context output (status and trace lines) that is neither an error nor a warning.
    Simple,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Error => "error",
            MessageKind::Warning => "warning",
            MessageKind::Info => "info",
            MessageKind::Simple => "simple",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A zero-based location inside a source file.
///
/// Negative values mean "not known". The parser never stores an unset field as
/// `0`, since `0` is a valid first line or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: i32,
    pub column: i32,
    pub offset: i32,
}

impl SourcePosition {
    pub const UNKNOWN: SourcePosition = SourcePosition {
        line: -1,
        column: -1,
        offset: -1,
    };

    pub fn new(line: i32, column: i32, offset: i32) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.line < 0 && self.column < 0 && self.offset < 0
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFile {
    Unknown,
    Path(PathBuf),
}

impl SourceFile {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceFile::Unknown => None,
            SourceFile::Path(path) => Some(path),
        }
    }
}

/// A file plus a position inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFilePosition {
    pub file: SourceFile,
    pub position: SourcePosition,
}

impl SourceFilePosition {
    pub fn new(file: impl Into<PathBuf>, position: SourcePosition) -> Self {
        Self {
            file: SourceFile::Path(file.into()),
            position,
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: SourceFile::Unknown,
            position: SourcePosition::UNKNOWN,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.file == SourceFile::Unknown && self.position.is_unknown()
    }
}

/// Renders `path[:line[:column]]` using one-based numbers.
impl fmt::Display for SourceFilePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            SourceFile::Unknown => f.write_str("unknown")?,
            SourceFile::Path(path) => write!(f, "{}", path.display())?,
        }
        if self.position.line >= 0 {
            write!(f, ":{}", self.position.line + 1)?;
            if self.position.column >= 0 {
                write!(f, ":{}", self.position.column + 1)?;
            }
        }
        Ok(())
    }
}

/// One diagnostic extracted from build output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub position: SourceFilePosition,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>, position: SourceFilePosition) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    /// A context line carried through verbatim with no location.
    pub fn simple(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Simple, text, SourceFilePosition::unknown())
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == MessageKind::Simple {
            return f.write_str(&self.text);
        }
        if self.position.file != SourceFile::Unknown {
            write!(f, "{}: ", self.position)?;
        }
        write!(f, "{}: {}", self.kind, self.text)
    }
}

/// Serialized form of one parse run, tagged with the schema it was written against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: String,
    pub messages: Vec<Message>,
}

impl Report {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            schema_version: crate::SCHEMA_VERSION.to_string(),
            messages,
        }
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.messages.iter().filter(|m| m.kind == kind).count()
    }
}
