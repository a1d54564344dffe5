//! Command line interface for the `vrt` tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// vrt - VITA Radio Transport header packer and inspector
#[derive(Parser, Debug)]
#[command(
    name = "vrt",
    author,
    version,
    about = "Pack and inspect VITA Radio Transport packet headers",
    long_about = r#"
Builds VRT packet headers from metadata and decodes received headers.

EXAMPLES:
  Pack:    vrt pack --stream-id 0x1234 --payload-words 4 --count 7
  Unpack:  vrt unpack 0x10070006 0x00001234
  Layout:  vrt layout
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a header from metadata
    Pack(PackArgs),

    /// Decode a header from hex words
    Unpack(UnpackArgs),

    /// Show the field layout for every presence predicate
    Layout,

    /// Show the default configuration
    Config(ConfigArgs),
}

/// Pack command arguments
#[derive(Args, Debug)]
pub struct PackArgs {
    /// Stream identifier (decimal or 0x-prefixed hex)
    #[arg(long, value_parser = parse_u32)]
    pub stream_id: Option<u32>,

    /// Integer seconds of the timestamp
    #[arg(long)]
    pub secs: Option<u32>,

    /// Fractional part of the timestamp, in ticks
    #[arg(long, requires = "secs")]
    pub ticks: Option<u32>,

    /// Mark start of burst
    #[arg(long)]
    pub sob: bool,

    /// Mark end of burst
    #[arg(long)]
    pub eob: bool,

    /// Payload length in 32-bit words
    #[arg(short, long, default_value = "0")]
    pub payload_words: usize,

    /// Packet sequence count (low 4 bits are used)
    #[arg(long, default_value = "0")]
    pub count: u32,

    /// Tick rate in Hz (overrides config)
    #[arg(long)]
    pub tick_rate: Option<f64>,

    /// Print the header as a single big-endian hex string
    #[arg(long)]
    pub bytes: bool,
}

/// Unpack command arguments
#[derive(Args, Debug)]
pub struct UnpackArgs {
    /// Header words in host order (decimal or 0x-prefixed hex)
    #[arg(required = true, value_parser = parse_u32)]
    pub words: Vec<u32>,

    /// Words actually received; defaults to the length declared in word 0
    #[arg(long)]
    pub packet_words: Option<usize>,

    /// Tick rate in Hz (overrides config)
    #[arg(long)]
    pub tick_rate: Option<f64>,
}

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Parse a `u32` written in decimal or with a `0x` prefix.
pub fn parse_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.map_err(|e| format!("invalid 32-bit value '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32() {
        assert_eq!(parse_u32("0x1234"), Ok(0x1234));
        assert_eq!(parse_u32("0X1000_0006"), Ok(0x1000_0006));
        assert_eq!(parse_u32("42"), Ok(42));
        assert!(parse_u32("0x1_0000_0000").is_err());
        assert!(parse_u32("zz").is_err());
    }

    #[test]
    fn test_cli_parses_pack() {
        let cli = Cli::try_parse_from([
            "vrt",
            "pack",
            "--stream-id",
            "0x1234",
            "--payload-words",
            "4",
            "--count",
            "7",
        ])
        .unwrap();
        match cli.command {
            Commands::Pack(args) => {
                assert_eq!(args.stream_id, Some(0x1234));
                assert_eq!(args.payload_words, 4);
                assert_eq!(args.count, 7);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ticks_requires_secs() {
        assert!(Cli::try_parse_from(["vrt", "pack", "--ticks", "5"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
