use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use feedns::feed::{canonicalize, detect_format, CanonicalEvent, ReadOptions};
use feedns::Config;

/// Get the config directory path (~/.config/feedns/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedns"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedns",
    about = "Print a feed's elements and attributes under canonical namespace prefixes"
)]
struct Args {
    /// Feed document to read (RSS, Atom, RDF or OPML)
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Config file (defaults to ~/.config/feedns/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit one JSON object per event instead of an indented outline
    #[arg(long)]
    json: bool,

    /// Only print the detected feed format
    #[arg(long)]
    detect: bool,
}

fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let registry = config.registry();
    let options = ReadOptions {
        normalizer: config.normalizer_options(),
        max_depth: config.max_depth,
    };

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read feed file '{}'", args.file.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.detect {
        let format = detect_format(&content, &registry, &options)
            .with_context(|| format!("Failed to parse '{}'", args.file.display()))?;
        match format {
            Some(format) => writeln!(out, "{}", format)?,
            None => writeln!(out, "unknown")?,
        }
        return Ok(());
    }

    let events = canonicalize(&content, &registry, &options)
        .with_context(|| format!("Failed to parse '{}'", args.file.display()))?;
    tracing::debug!(events = events.len(), "Canonicalized document");

    if args.json {
        for event in &events {
            serde_json::to_writer(&mut out, event).context("Failed to encode event as JSON")?;
            writeln!(out)?;
        }
    } else {
        write_outline(&mut out, &events)?;
    }

    Ok(())
}

/// Writes events as an indented outline, one element or text run per line.
fn write_outline(out: &mut impl Write, events: &[CanonicalEvent]) -> Result<()> {
    let mut depth = 0usize;
    for event in events {
        match event {
            CanonicalEvent::Open {
                name,
                attributes,
                self_closing,
                ..
            } => {
                write!(out, "{:indent$}{}", "", name, indent = depth * 2)?;
                for attribute in attributes {
                    write!(out, " {}={:?}", attribute.name, attribute.value)?;
                }
                writeln!(out)?;
                if !self_closing {
                    depth += 1;
                }
            }
            CanonicalEvent::Close { .. } => depth = depth.saturating_sub(1),
            CanonicalEvent::Text { content } => {
                writeln!(out, "{:indent$}{:?}", "", content, indent = depth * 2)?;
            }
        }
    }
    Ok(())
}
