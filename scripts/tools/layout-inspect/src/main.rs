use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use layout_codec::{analyze, decode_with, encode, CodecConfig, Discriminator, DiscriminatorConfig};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

mod inputs;

use inputs::{load_config, load_layouts, load_record, parse_hex, pick};

#[derive(Parser)]
#[command(name = "layout-inspect")]
#[command(about = "Inspect layouts and classify unlabeled buffers")]
#[command(version)]
struct Cli {
    /// TOML codec configuration (defaults to environment overrides)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log discriminator synthesis at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print size bounds and fixed-byte facts for every layout
    Bounds {
        /// JSON array of layouts
        layouts: PathBuf,
    },
    /// List the layouts a buffer may conform to
    Classify {
        /// JSON array of layouts
        layouts: PathBuf,
        /// Buffer as hex
        hex: String,
        /// Accept layouts that cannot be fully told apart
        #[arg(long)]
        allow_ambiguous: bool,
    },
    /// Decode a buffer and print the record as JSON
    Decode {
        /// JSON array of layouts
        layouts: PathBuf,
        /// Buffer as hex
        hex: String,
        /// Layout to decode with; classified when omitted
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// Encode a JSON record and print the buffer as hex
    Encode {
        /// JSON array of layouts
        layouts: PathBuf,
        /// Record as JSON
        record: PathBuf,
        /// Layout to encode with
        #[arg(short, long)]
        index: usize,
    },
}

#[derive(Serialize)]
struct BoundsReport {
    index: usize,
    bounds: String,
    fixed_bytes: Vec<(usize, String)>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "layout_inspect=debug,layout_codec=debug"
    } else {
        "layout_inspect=info,layout_codec=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn discriminator(layouts: &[layout_types::Layout], config: &DiscriminatorConfig) -> Result<Discriminator> {
    let discriminator = Discriminator::with_config(layouts, config)
        .context("Failed to synthesize a discriminator")?;
    info!(
        layouts = discriminator.layout_count(),
        strategies = discriminator.strategy_count(),
        distinguishable = discriminator.is_distinguishable(),
        "discriminator ready"
    );
    Ok(discriminator)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config: CodecConfig = load_config(cli.config.as_deref())?;
    debug!(?config, "codec configuration");

    match cli.command {
        Commands::Bounds { layouts } => {
            let layouts = load_layouts(&layouts)?;
            let reports: Vec<BoundsReport> = layouts
                .iter()
                .enumerate()
                .map(|(index, layout)| {
                    let meta = analyze(layout);
                    BoundsReport {
                        index,
                        bounds: meta.bounds.to_string(),
                        fixed_bytes: meta
                            .fixed_bytes
                            .iter()
                            .map(|(offset, bytes)| (offset, hex::encode(bytes)))
                            .collect(),
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }

        Commands::Classify {
            layouts,
            hex,
            allow_ambiguous,
        } => {
            let layouts = load_layouts(&layouts)?;
            let buffer = parse_hex(&hex)?;
            let policy = DiscriminatorConfig {
                allow_ambiguous: allow_ambiguous || config.discriminator.allow_ambiguous,
            };
            let survivors = discriminator(&layouts, &policy)?.classify(&buffer);
            println!("{}", serde_json::to_string(&survivors)?);
        }

        Commands::Decode {
            layouts,
            hex,
            index,
        } => {
            let layouts = load_layouts(&layouts)?;
            let buffer = parse_hex(&hex)?;
            let index = match index {
                Some(index) => index,
                None => match discriminator(&layouts, &config.discriminator)?
                    .classify(&buffer)
                    .as_slice()
                {
                    [index] => *index,
                    [] => bail!("Buffer matches none of the layouts"),
                    many => bail!("Buffer is ambiguous between layouts {many:?}; pass --index"),
                },
            };
            let record = decode_with(pick(&layouts, index)?, &buffer, &config.decode)
                .with_context(|| format!("Failed to decode with layout {index}"))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Commands::Encode {
            layouts,
            record,
            index,
        } => {
            let layouts = load_layouts(&layouts)?;
            let record = load_record(&record)?;
            let encoded = encode(pick(&layouts, index)?, &record)
                .with_context(|| format!("Failed to encode with layout {index}"))?;
            println!("0x{}", hex::encode(encoded));
        }
    }

    Ok(())
}
