//! # cxxblame Log Parser
//!
//! Turns the console output of native build tools into structured diagnostics.
//!
//! ## Overview
//!
//! Build tools such as CMake report problems as free-form, multi-line blocks of
//! text mixed in with progress chatter. This crate reads that output line by
//! line and produces [`Message`](ir::Message)s carrying a severity, a message
//! text and, where one can be found, an absolute file location. It handles:
//!
//! - **Multi-line blocks**: a `CMake Error at ...` header plus its indented body
//! - **Look-ahead**: the line that ends a block is pushed back for the next parser
//! - **Interleaved status lines**: `-- ...` lines inside a block are kept, in order
//! - **Two location styles**: `at /path:line (command):column` and bare `/path:line:column`
//!
//! ## Architecture
//!
//! ```text
//! +---------------+   read_line()   +------------------+   parse()   +-------------------+
//! | build output  | --------------> | OutputLineReader | ----------> | CmakeOutputParser |
//! | (text/stream) |                 |  (push back: 1)  | <---------- |  (and others)     |
//! +---------------+                 +------------------+  push_back  +-------------------+
//!                                            ^                                 |
//!                                            |          ToolOutputParser       v
//!                                            +------------------------ Vec<Message>
//! ```
//!
//! - [`OutputLineReader`](reader::OutputLineReader) delivers lines and can rewind one.
//! - [`CmakeOutputParser`](parser::CmakeOutputParser) recognises CMake blocks.
//! - [`ToolOutputParser`](driver::ToolOutputParser) offers each line to its
//!   parsers in order and keeps lines nobody claims as simple messages.
//!
//! ## Message IR
//!
//! The [`ir`] module defines the output schema:
//!
//! - [`Message`](ir::Message) - kind, text and position
//! - [`MessageKind`](ir::MessageKind) - `Error`, `Warning`, `Info`, `Simple`
//! - [`SourceFilePosition`](ir::SourceFilePosition) - absolute path (or unknown)
//!   plus a zero-based line/column
//! - [`Report`](ir::Report) - a run's messages tagged with [`SCHEMA_VERSION`]
//!
//! ## Examples
//!
//! ### Parsing captured output
//!
//! ```
//! use cxxblame_log::ir::MessageKind;
//!
//! let output = "\
//! -- Configuring incomplete, errors occurred!
//! CMake Error at /src/app/CMakeLists.txt:12 (message):
//!   Something failed
//! ";
//! let messages = cxxblame_log::parse(output)?;
//! let error = messages.iter().find(|m| m.kind == MessageKind::Error).unwrap();
//! assert_eq!(error.text, "Something failed");
//! assert_eq!(error.position.position.line, 11);
//! # Ok::<(), cxxblame_log::ParseError>(())
//! ```
//!
//! ### Streaming from a process
//!
//! ```no_run
//! use cxxblame_log::{Settings, ToolOutputParser};
//! use std::io::BufReader;
//! use std::process::{Command, Stdio};
//!
//! let mut child = Command::new("cmake")
//!     .args(["-S", ".", "-B", "build"])
//!     .stdout(Stdio::piped())
//!     .spawn()?;
//! let stdout = child.stdout.take().expect("piped stdout");
//! let messages = ToolOutputParser::new(Settings::default()).parse_reader(BufReader::new(stdout))?;
//! child.wait()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Exporting to JSON
//!
//! ```no_run
//! use cxxblame_log::ir::Report;
//! use std::fs;
//!
//! let output = fs::read_to_string("cmake.log")?;
//! let report = Report::new(cxxblame_log::parse(&output)?);
//! fs::write("messages.json", serde_json::to_string_pretty(&report)?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Multi-parser driver.
pub mod driver;
/// Error type shared by the crate.
pub mod error;
/// Message Intermediate Representation (IR).
pub mod ir;
/// CMake output parser.
pub mod parser;
/// Line source with single-line push back.
pub mod reader;
/// Run configuration.
pub mod settings;


pub use driver::{PatternAwareOutputParser, ToolOutputParser};
pub use error::ParseError;
pub use parser::CmakeOutputParser;
pub use reader::OutputLineReader;
pub use settings::Settings;

/// Schema version for the message IR.
///
/// This version follows semantic versioning:
/// - MAJOR: Breaking changes to message structure
/// - MINOR: New optional fields or message kinds
/// - PATCH: Bug fixes to parsing behavior
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Parses captured output with the default parsers and [`Settings`].
pub fn parse(text: &str) -> Result<Vec<ir::Message>, ParseError> {
    ToolOutputParser::default().parse_text(text)
}
