//! Command-line argument definitions for the delimited importer
//!
//! This module defines the CLI interface using the clap derive API and maps
//! the parsed flags onto an [`ImportConfig`].

use crate::config::{DecodePolicy, Encoding, ImportConfig, QuotePolicy, SchemaPolicy};
use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_FIELD_DELIMITER, DEFAULT_LOG_LEVEL};
use crate::{Error, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the delimited importer
///
/// Reads a delimited text file, splits every line into fields with
/// quote-aware delimiter handling and prints the resulting records.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "delimited-import",
    version,
    about = "Import delimited text into records with quote-aware field splitting",
    long_about = "Reads a delimited text file in fixed-size chunks, splits each line into \
                  fields honouring quoted fields and doubled quotes, and prints the records \
                  as JSON lines or a tab-separated table. With --header the first line \
                  names the columns of every following record."
)]
pub struct Args {
    /// Delimited text file to import
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Field delimiter
    ///
    /// May be longer than one character. The escapes \t and \\ are accepted
    /// so tab-separated files can be imported without shell quoting tricks.
    #[arg(
        short = 'd',
        long = "delimiter",
        value_name = "DELIM",
        default_value = DEFAULT_FIELD_DELIMITER,
        help = "Field delimiter (\\t for tab)"
    )]
    pub delimiter: String,

    /// Treat the first line as a header naming the columns
    #[arg(long = "header", help = "Treat the first line as column names")]
    pub header: bool,

    /// Text encoding of the input file
    #[arg(
        short = 'e',
        long = "encoding",
        value_enum,
        default_value_t = EncodingArg::Utf8,
        help = "Text encoding of the input"
    )]
    pub encoding: EncodingArg,

    /// Bytes requested from the file per read
    #[arg(
        long = "chunk-size",
        value_name = "BYTES",
        default_value_t = DEFAULT_CHUNK_SIZE,
        help = "Bytes read per chunk"
    )]
    pub chunk_size: usize,

    /// Abort on the first undecodable line, unclosed quote or field count mismatch
    #[arg(long = "strict", help = "Fail on the first malformed line")]
    pub strict: bool,

    /// Output format for the imported records
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Json,
        help = "Output format for records"
    )]
    pub format: OutputFormat,

    /// Disable the progress bar
    #[arg(long = "no-progress", help = "Disable the progress bar")]
    pub no_progress: bool,

    /// Enable verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help = "Increase logging verbosity"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only errors are logged and no progress bar or summary is shown.
    /// Overrides verbose settings.
    #[arg(short = 'q', long = "quiet", help = "Only log errors")]
    pub quiet: bool,
}

/// Encodings selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EncodingArg {
    /// UTF-8
    Utf8,
    /// ISO-8859-1
    Latin1,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Latin1 => Encoding::Latin1,
        }
    }
}

/// Output formats for imported records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON value per record
    Json,
    /// Tab-separated rows
    Table,
}

impl Args {
    /// Get the appropriate log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => DEFAULT_LOG_LEVEL,
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show a progress bar
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }

    /// Build the import configuration described by these arguments
    pub fn to_config(&self) -> Result<ImportConfig> {
        let config = ImportConfig::default()
            .with_field_delimiter(unescape_delimiter(&self.delimiter))
            .with_encoding(self.encoding.into())
            .with_chunk_size(self.chunk_size);

        // Without --strict every malformed line is reported and skipped
        let config = if self.strict {
            config.strict()
        } else {
            config
                .with_decode_policy(DecodePolicy::Report)
                .with_quote_policy(QuotePolicy::Warn)
                .with_schema_policy(SchemaPolicy::SkipRecord)
        };

        config.validate().map_err(|e| match e {
            Error::Configuration { message } => {
                Error::configuration(format!("invalid command line: {}", message))
            }
            other => other,
        })?;
        Ok(config)
    }
}

/// Expand the `\t` and `\\` escapes in a delimiter given on the command line
pub fn unescape_delimiter(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let mut full = vec!["delimited-import"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["data.csv"]);
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.delimiter, ",");
        assert!(!args.header);
        assert_eq!(args.encoding, EncodingArg::Utf8);
        assert_eq!(args.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.show_progress());
        assert_eq!(args.get_log_level(), "warn");
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["-v", "f"]).get_log_level(), "info");
        assert_eq!(parse(&["-vv", "f"]).get_log_level(), "debug");
        assert_eq!(parse(&["-vvvv", "f"]).get_log_level(), "trace");
        assert_eq!(parse(&["-q", "f"]).get_log_level(), "error");
        assert!(!parse(&["-q", "f"]).show_progress());
        assert!(!parse(&["--no-progress", "f"]).show_progress());
    }

    #[test]
    fn test_to_config_lenient_by_default() {
        let config = parse(&["-d", ";", "--encoding", "latin1", "f"]).to_config().unwrap();
        assert_eq!(config.field_delimiter, ";");
        assert_eq!(config.encoding, Encoding::Latin1);
        assert_eq!(config.decode_policy, DecodePolicy::Report);
        assert_eq!(config.quote_policy, QuotePolicy::Warn);
        assert_eq!(config.schema_policy, SchemaPolicy::SkipRecord);
    }

    #[test]
    fn test_to_config_strict() {
        let config = parse(&["--strict", "f"]).to_config().unwrap();
        assert_eq!(config.decode_policy, DecodePolicy::Abort);
        assert_eq!(config.quote_policy, QuotePolicy::Reject);
        assert_eq!(config.schema_policy, SchemaPolicy::Abort);
    }

    #[test]
    fn test_to_config_rejects_bad_values() {
        assert!(matches!(
            parse(&["--chunk-size", "0", "f"]).to_config(),
            Err(Error::Configuration { .. })
        ));
        assert!(parse(&["-d", "\"", "f"]).to_config().is_err());
    }

    #[test]
    fn test_unescape_delimiter() {
        assert_eq!(unescape_delimiter("\\t"), "\t");
        assert_eq!(unescape_delimiter("\\\\"), "\\");
        assert_eq!(unescape_delimiter("::"), "::");
        assert_eq!(unescape_delimiter("a\\x"), "a\\x");
        assert_eq!(unescape_delimiter("\\"), "\\");
    }

    #[test]
    fn test_verbose_and_quiet_together_prefers_quiet() {
        let args = parse(&["-vv", "-q", "f"]);
        assert_eq!(args.get_log_level(), "error");
    }
}
