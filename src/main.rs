//! vrt CLI - VITA Radio Transport header tool.

use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use tracing::debug;

use vrt_codec::cli::*;
use vrt_codec::config::{init_logging, Config, LoggingConfig};
use vrt_codec::error::Result;
use vrt_codec::protocol::{pack, unpack, Field, FieldLayout, HeaderView, LAYOUTS};
use vrt_codec::types::{PacketCount, TickRate, TimeSpec, TxMetadata};

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        color: !cli.no_color,
        ..Default::default()
    })?;

    // Load config if specified
    let config = if let Some(ref path) = cli.config {
        Config::load(path)?
    } else if Config::default_path().exists() {
        Config::load(Config::default_path())?
    } else {
        Config::default()
    };
    debug!(tick_rate = config.codec.tick_rate, "configuration loaded");

    match cli.command {
        Commands::Pack(args) => run_pack(args, &config, cli.format),
        Commands::Unpack(args) => run_unpack(args, &config, cli.format),
        Commands::Layout => run_layout(cli.format),
        Commands::Config(args) => run_config(args, &config),
    }
}

fn tick_rate(arg: Option<f64>, config: &Config) -> Result<TickRate> {
    match arg {
        Some(hz) => TickRate::new(hz),
        None => config.codec.tick_rate(),
    }
}

/// Build and print a header
fn run_pack(args: PackArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let rate = tick_rate(args.tick_rate, config)?;

    let mut md = TxMetadata::new();
    if let Some(sid) = args.stream_id.or(config.codec.default_stream_id) {
        md = md.with_stream_id(sid);
    }
    if let Some(secs) = args.secs {
        md = md.with_time_spec(TimeSpec::from_ticks(secs, args.ticks.unwrap_or(0), rate));
    }
    md.start_of_burst = args.sob;
    md.end_of_burst = args.eob;

    let hdr = pack(&md, args.payload_words, PacketCount::new(args.count), rate)?;
    let words: Vec<u32> = (0..hdr.header_words()).filter_map(|i| hdr.word(i)).collect();

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "metadata": md,
                "header_words": hdr.header_words(),
                "trailer_words": hdr.trailer_words(),
                "packet_words": hdr.packet_words(),
                "words": words.iter().map(|w| format!("{w:#010x}")).collect::<Vec<_>>(),
                "bytes": hex::encode(hdr.to_bytes()),
            });
            println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        }
        OutputFormat::Text if args.bytes => {
            println!("{}", hex::encode(hdr.to_bytes()));
        }
        OutputFormat::Text => {
            for (i, w) in words.iter().enumerate() {
                println!("{} {}", format!("[{i}]").dimmed(), format!("{w:#010x}").bright_green());
            }
            println!();
            println!(
                "{}: {}  {}: {}  {}: {}",
                "header".cyan(),
                hdr.header_words(),
                "trailer".cyan(),
                hdr.trailer_words(),
                "packet".cyan(),
                hdr.packet_words()
            );
        }
    }

    Ok(())
}

/// Decode and print a header
fn run_unpack(args: UnpackArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let rate = tick_rate(args.tick_rate, config)?;

    let view = HeaderView::new(args.words[0]);
    let packet_words = args.packet_words.unwrap_or_else(|| view.declared_words());
    let network: Vec<u32> = args.words.iter().map(|w| w.to_be()).collect();

    let out = unpack(&network, packet_words, rate)?;
    let md = out.metadata;

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "metadata": md,
                "ticks": md.has_time_spec.then(|| md.time_spec.to_ticks(rate).1),
                "start_of_burst": view.start_of_burst(),
                "end_of_burst": view.end_of_burst(),
                "header_words": out.info.header_words,
                "trailer_words": out.info.trailer_words,
                "payload_words": out.info.payload_words,
                "packet_words": out.info.packet_words,
                "packet_count": out.info.packet_count,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            println!("{}", "VRT header".bright_white().bold());
            println!("{}", "─".repeat(40));
            println!("  {:<14} {}", "word 0".cyan(), view);
            match md.stream_id() {
                Some(sid) => println!("  {:<14} {sid:#010x}", "stream id".cyan()),
                None => println!("  {:<14} {}", "stream id".cyan(), "-".dimmed()),
            }
            match md.time_spec() {
                Some(ts) => println!(
                    "  {:<14} {} ({} s + {} ticks)",
                    "time".cyan(),
                    ts,
                    ts.secs,
                    ts.get_ticks(rate)
                ),
                None => println!("  {:<14} {}", "time".cyan(), "-".dimmed()),
            }
            println!(
                "  {:<14} sob={} eob={}",
                "burst".cyan(),
                view.start_of_burst(),
                view.end_of_burst()
            );
            println!("  {:<14} {}", "count".cyan(), out.info.packet_count);
            println!(
                "  {:<14} header={} payload={} trailer={} total={}",
                "words".cyan(),
                out.info.header_words,
                out.info.payload_words,
                out.info.trailer_words,
                out.info.packet_words
            );
        }
    }

    Ok(())
}

/// Print the field-layout table
fn run_layout(format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let rows: Vec<_> = LAYOUTS
            .iter()
            .map(|l| {
                serde_json::json!({
                    "predicate": l.predicate().bits(),
                    "fields": l.fields(),
                    "header_words": l.header_words(),
                    "trailer_words": l.trailer_words(),
                    "flags": format!("{:#010x}", l.flags()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows).unwrap_or_default());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["predicate", "fields", "header", "trailer", "flags"]);

    for layout in &LAYOUTS {
        table.add_row(vec![
            Cell::new(layout.predicate()),
            Cell::new(describe_fields(layout)),
            Cell::new(layout.header_words()),
            Cell::new(layout.trailer_words()),
            Cell::new(format!("{:#010x}", layout.flags())),
        ]);
    }

    println!("{table}");
    println!(
        "{} predicates with class id or trailer are never produced by the packer",
        "note:".yellow()
    );
    Ok(())
}

fn describe_fields(layout: &FieldLayout) -> String {
    let mut parts: Vec<String> = layout
        .fields()
        .iter()
        .map(|f| match f {
            Field::StreamId | Field::IntegerTime => f.to_string(),
            Field::ClassId | Field::FractionalTime => format!("{f}[2]"),
        })
        .collect();
    if layout.trailer_words() > 0 {
        parts.push("trailer".into());
    }
    if parts.is_empty() {
        "-".into()
    } else {
        parts.join(", ")
    }
}

/// Print the active configuration
fn run_config(args: ConfigArgs, config: &Config) -> Result<()> {
    if let Some(ref path) = args.output {
        config.save(path)?;
        println!(
            "{} Configuration written to {}",
            "✓".green(),
            path.display()
        );
    } else {
        let output = toml::to_string_pretty(config)
            .map_err(|e| vrt_codec::Error::Config(format!("Failed to serialize config: {e}")))?;
        println!("{output}");
    }

    Ok(())
}
