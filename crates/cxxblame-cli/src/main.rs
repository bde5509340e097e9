use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cxxblame_log::ir::{Message, MessageKind, Report};
use cxxblame_log::{Settings, ToolOutputParser};
use log::{debug, info, LevelFilter};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cxxblame")]
#[command(about = "Extract diagnostics from native build output", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse captured build output and print the diagnostics found
    Parse {
        /// Output to read; stdin when omitted or `-`
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,

        /// JSON settings file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Refuse input larger than this
        #[arg(long, value_name = "BYTES")]
        max_bytes: Option<usize>,

        /// Drop lines no parser recognises instead of reporting them
        #[arg(long)]
        no_unhandled: bool,

        /// Exit with status 1 when an error was found
        #[arg(long)]
        deny_errors: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse {
            path,
            format,
            config,
            max_bytes,
            no_unhandled,
            deny_errors,
        } => {
            let settings = load_settings(config.as_deref(), max_bytes, no_unhandled)?;
            let driver = ToolOutputParser::new(settings);
            debug!("Effective settings: {:?}", driver.settings());

            let messages = match path.as_deref() {
                Some(path) if path != Path::new("-") => {
                    let file = File::open(path)
                        .with_context(|| format!("Failed to open {}", path.display()))?;
                    driver
                        .parse_reader(BufReader::new(file))
                        .with_context(|| format!("Failed to parse {}", path.display()))?
                }
                _ => driver
                    .parse_reader(io::stdin().lock())
                    .context("Failed to parse stdin")?,
            };

            let report = Report::new(messages);
            let errors = report.count(MessageKind::Error);
            info!(
                "{} errors, {} warnings, {} other messages",
                errors,
                report.count(MessageKind::Warning),
                report.messages.len() - errors - report.count(MessageKind::Warning)
            );

            let mut out = io::stdout().lock();
            match format {
                Format::Json => writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?,
                Format::Text => out.write_all(render_text(&report.messages).as_bytes())?,
            }
            out.flush()?;

            if deny_errors && errors > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose > 0 {
        builder.filter_level(match verbose {
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        });
    }
    builder
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .init();
}

/// Settings file first, then flags on top.
fn load_settings(
    config: Option<&Path>,
    max_bytes: Option<usize>,
    no_unhandled: bool,
) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(limit) = max_bytes {
        settings.max_input_bytes = limit;
    }
    if no_unhandled {
        settings.report_unhandled = false;
    }
    Ok(settings)
}

fn render_text(messages: &[Message]) -> String {
    let mut text = String::new();
    for message in messages {
        text.push_str(&message.to_string());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "cxxblame",
            "-vv",
            "parse",
            "build.log",
            "--format",
            "text",
            "--max-bytes",
            "1024",
            "--no-unhandled",
            "--deny-errors",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Parse {
            path,
            format,
            max_bytes,
            no_unhandled,
            deny_errors,
            config,
        } = cli.command;
        assert_eq!(path, Some(PathBuf::from("build.log")));
        assert_eq!(format, Format::Text);
        assert_eq!(max_bytes, Some(1024));
        assert!(no_unhandled && deny_errors);
        assert!(config.is_none());
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = load_settings(None, Some(10), true).unwrap();
        assert_eq!(settings.max_input_bytes, 10);
        assert!(!settings.report_unhandled);
    }

    #[test]
    fn test_missing_config_file_fails() {
        let result = load_settings(Some(Path::new("/nonexistent/cxxblame.json")), None, false);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to load settings"));
    }

    #[test]
    fn test_render_text() {
        let messages = cxxblame_log::parse(
            "-- Configuring done\n\
             CMake Error at /src/CMakeLists.txt:12 (message):3\n  Something failed\n",
        )
        .unwrap();
        assert_eq!(
            render_text(&messages),
            "-- Configuring done\n/src/CMakeLists.txt:12:3: error: Something failed\n"
        );
    }
}
