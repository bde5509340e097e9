use crate::error::{ParseError, Result};
use crate::ir::Message;
use crate::parser::CmakeOutputParser;
use crate::reader::OutputLineReader;
use crate::settings::Settings;
use log::{debug, trace};
use std::io::BufRead;

/// A parser for one tool's output format.
///
/// The driver offers every non-empty line to each parser in turn. A parser
/// that recognises the line may read further lines from `reader` (pushing back
/// the one that ends its block), appends its findings to `messages` and
/// returns `Ok(true)`. `Ok(false)` means "not mine" and must leave `reader`
/// untouched.
///
/// `messages` holds everything found so far in this run, so a parser can
/// look at what came before.
pub trait PatternAwareOutputParser: Send + Sync {
    fn name(&self) -> &str;

    fn parse(
        &self,
        line: &str,
        reader: &mut OutputLineReader<'_>,
        messages: &mut Vec<Message>,
    ) -> Result<bool>;
}

/// Runs a set of [`PatternAwareOutputParser`]s over a build tool's output.
pub struct ToolOutputParser {
    parsers: Vec<Box<dyn PatternAwareOutputParser>>,
    settings: Settings,
}

impl Default for ToolOutputParser {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl ToolOutputParser {
    /// A driver with the CMake parser installed.
    pub fn new(settings: Settings) -> Self {
        Self::with_parsers(vec![Box::new(CmakeOutputParser::new())], settings)
    }

    pub fn with_parsers(
        parsers: Vec<Box<dyn PatternAwareOutputParser>>,
        settings: Settings,
    ) -> Self {
        Self { parsers, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Parses a complete captured output.
    pub fn parse_text(&self, text: &str) -> Result<Vec<Message>> {
        let limit = self.settings.max_input_bytes;
        if text.len() > limit {
            return Err(ParseError::InputTooLarge {
                limit,
                actual: text.len(),
            });
        }
        self.run(OutputLineReader::from_text(text))
    }

    /// Parses output as it is read, stopping once more than
    /// `max_input_bytes` have been consumed.
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<Vec<Message>> {
        self.run(OutputLineReader::from_reader(reader).with_limit(self.settings.max_input_bytes))
    }

    fn run(&self, mut reader: OutputLineReader<'_>) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        while let Some(line) = reader.read_line()? {
            if line.is_empty() {
                continue;
            }
            let mut handled = false;
            for parser in &self.parsers {
                if parser.parse(&line, &mut reader, &mut messages)? {
                    trace!("{} parser claimed line {}", parser.name(), reader.lines_read());
                    handled = true;
                    break;
                }
            }
            if !handled && self.settings.report_unhandled {
                messages.push(Message::simple(line));
            }
        }
        debug!(
            "Parsed {} lines into {} messages",
            reader.lines_read(),
            messages.len()
        );
        Ok(messages)
    }
}
