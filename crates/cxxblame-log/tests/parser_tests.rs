use cxxblame_log::ir::{Message, MessageKind, SourceFile, SourcePosition};
use cxxblame_log::{
    CmakeOutputParser, OutputLineReader, PatternAwareOutputParser, Settings, ToolOutputParser,
};
use std::path::Path;

fn run_cmake_parser(input: &str) -> (Vec<bool>, Vec<Message>) {
    let parser = CmakeOutputParser::new();
    let mut reader = OutputLineReader::from_text(input);
    let mut consumed = Vec::new();
    let mut messages = Vec::new();
    while let Some(line) = reader.read_line().unwrap() {
        consumed.push(parser.parse(&line, &mut reader, &mut messages).unwrap());
    }
    (consumed, messages)
}

#[test]
fn test_only_headers_are_consumed() {
    let input = "\
-- Configuring done
CMake Error at /src/CMakeLists.txt:3 (message):
  bad

plain text
";
    let (consumed, messages) = run_cmake_parser(input);
    // header (plus body, pulled by the parser), blank, plain text
    assert_eq!(consumed, vec![false, true, false, false]);
    assert_eq!(messages.len(), 1);
}

#[test]
fn test_error_with_column_after_command() {
    let (_, messages) = run_cmake_parser(
        "CMake Error at /abs/path/CMakeLists.txt:12 (message):3\nSomething failed",
    );
    assert_eq!(messages.len(), 1);

    let message = &messages[0];
    assert_eq!(message.kind, MessageKind::Error);
    assert_eq!(
        message.position.file,
        SourceFile::Path("/abs/path/CMakeLists.txt".into())
    );
    assert_eq!(message.position.position, SourcePosition::new(11, 2, -1));
    assert!(message.text.contains("Something failed"));
}

#[test]
fn test_relative_location_emits_nothing() {
    let (consumed, messages) = run_cmake_parser("CMake Error at rel/CMakeLists.txt:12:3");
    assert_eq!(consumed, vec![true]);
    assert!(messages.is_empty());
}

#[test]
fn test_every_located_message_is_absolute() {
    let input = include_str!("fixtures/cmake_configure.txt");
    let messages = cxxblame_log::parse(input).unwrap();
    for message in &messages {
        if let Some(path) = message.position.file.path() {
            assert!(
                path.starts_with("/"),
                "Located message with relative path: {:?}",
                message
            );
        }
    }
    let top_level = Path::new("/home/dev/native-app/CMakeLists.txt");
    assert!(messages.iter().any(|m| m.position.file.path() == Some(top_level)));
}

#[test]
fn test_trace_lines_in_discovery_order() {
    let input = "\
CMake Warning at /src/CMakeLists.txt:40 (message):
-- Found Threads: TRUE
  Threads found late
-- Found ZLIB: /usr/lib/libz.so
";
    let (_, messages) = run_cmake_parser(input);
    let texts: Vec<&str> = messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "-- Found Threads: TRUE",
            "-- Found ZLIB: /usr/lib/libz.so",
            "Threads found late",
        ]
    );
    assert!(messages[0].position.is_unknown());
    assert!(messages[1].position.is_unknown());
}

#[test]
fn test_sibling_error_promotes_bare_location() {
    let input = "\
CMake Error at /abs/top/CMakeLists.txt:1:1

CMake Warning at CMakeLists.txt:9 (include):
  /abs/b/foo.cmake:7:2 unknown command
";
    let (_, messages) = run_cmake_parser(input);
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].kind, MessageKind::Error);

    // Same block on its own: nothing earlier, so it stays a warning.
    let (_, alone) = run_cmake_parser(
        "CMake Warning at CMakeLists.txt:9 (include):\n  /abs/b/foo.cmake:7:2 unknown command\n",
    );
    assert_eq!(alone.len(), 1);
    assert_eq!(alone[0].kind, MessageKind::Warning);
}

#[test]
fn test_parsing_is_repeatable() {
    let input = include_str!("fixtures/cmake_configure.txt");
    let driver = ToolOutputParser::new(Settings::default());
    let first = driver.parse_text(input).unwrap();
    let second = driver.parse_text(input).unwrap();
    assert_eq!(first, second);

    let (_, third) = run_cmake_parser(input);
    let (_, fourth) = run_cmake_parser(input);
    assert_eq!(third, fourth);
}

#[test]
fn test_block_cut_by_end_of_stream() {
    let (_, messages) = run_cmake_parser(
        "CMake Error at /src/CMakeLists.txt:7 (message):\n  no blank line follows",
    );
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "no blank line follows");
}

#[test]
fn test_windows_paths() {
    let input = "CMake Error at C:/work/app/CMakeLists.txt:3 (project):\r\n  \
                 No CMAKE_CXX_COMPILER could be found.\r\n\r\n";
    let messages = cxxblame_log::parse(input).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].position.to_string(), "C:/work/app/CMakeLists.txt:3");
    assert_eq!(messages[0].text, "No CMAKE_CXX_COMPILER could be found.");
}
