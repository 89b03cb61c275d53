use std::{fs, path::PathBuf, rc::Rc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use qrio::{fallback_text, CannedDetector, Config, ECLevel, EncodeOptions, Mode, QrDetector, Reader};

#[derive(Debug, Parser)]
#[command(name = "qrio", version, about = "Generate QR codes and scan images for QR codes")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode a message into a QR code
    Gen {
        text: String,
        /// Symbol version 1-40, 0 for automatic
        #[arg(long, default_value_t = 0)]
        version: i16,
        #[arg(long, default_value = "M")]
        ecl: ECLevel,
        #[arg(long, default_value = "byte")]
        mode: Mode,
        #[arg(long, default_value = "UTF-8")]
        charset: String,
        #[arg(long, default_value_t = qrio::generator::DEFAULT_CELL_SZ)]
        cell_size: u32,
        /// Target image size in pixels, overrides the cell size
        #[arg(long, default_value_t = 0)]
        size_px: u32,
        /// Write a PNG here instead of printing the symbol
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the PNG data URL
        #[arg(long)]
        data_url: bool,
    },
    /// Scan images as successive passes of one reader session
    Scan {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        /// Allow selecting more than one message
        #[arg(long)]
        multi: bool,
        /// Message indices to toggle after the last pass
        #[arg(long, value_delimiter = ',')]
        select: Vec<usize>,
        /// Write the overlay of the last pass as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Write the last image annotated with the overlay
        #[arg(long)]
        annotate: Option<PathBuf>,
        /// Use canned detections from a JSON file instead of the QR detector
        #[arg(long)]
        canned: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Gen { text, version, ecl, mode, charset, cell_size, size_px, output, data_url } => {
            let mut opts = EncodeOptions::new();
            opts.version(version).ec_level(ecl).mode(mode).charset(&charset).cell_size(cell_size).size_px(size_px);

            let sym = opts.build(&text)?;
            let cell = opts.resolve_cell_size(sym.module_count());
            info!("Generated version {} symbol, {} modules", sym.version(), sym.module_count());
            if let Some(path) = output {
                fs::write(&path, sym.to_png(cell, cell)?)
                    .with_context(|| format!("writing {}", path.display()))?;
            } else if data_url {
                println!("{}", sym.to_data_url(cell, cell)?);
            } else {
                print!("{}", sym.to_str(1));
            }
        }
        Command::Scan { images, multi, select, svg, annotate, canned } => {
            let cfg = Rc::new(cfg.with_multi_select(multi));
            let mut reader = Reader::new(cfg);
            reader = match canned {
                Some(path) => {
                    let json = fs::read_to_string(&path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    reader.with_platform_detector(Box::new(CannedDetector::new(serde_json::from_str(&json)?)))
                }
                None => reader.with_platform_detector(Box::new(QrDetector)),
            };

            reader.open(None, None);
            if !reader.init_capability().await {
                bail!("{}", reader.status());
            }

            for path in images.iter() {
                match reader.scan_file(path).await {
                    Ok(n) => info!("{}: {n} codes", path.display()),
                    Err(e) => warn!("{}: {e}", path.display()),
                }
                if let Some(alert) = reader.take_alert() {
                    eprintln!("{alert}");
                }
            }
            for i in select {
                if !reader.toggle(i) {
                    warn!("No message at index {i}");
                }
            }

            print_messages(&reader);
            if let Some(path) = svg {
                fs::write(&path, reader.overlay_svg())?;
            }
            if let (Some(path), Some(img)) = (annotate, reader.annotated_image()) {
                img.save(&path).with_context(|| format!("writing {}", path.display()))?;
            }

            let msgs = reader.close()?;
            println!("{}", fallback_text(&msgs)?);
        }
    }

    Ok(())
}

fn print_messages(reader: &Reader) {
    let cat = reader.catalog();
    if cat.is_empty() {
        eprintln!("{}", reader.status());
        return;
    }
    for (i, e) in cat.entries().iter().enumerate() {
        let mark = if reader.selection().is_checked(i) { "x" } else { " " };
        let slot = if e.stale { "-".to_string() } else { e.slot.to_string() };
        eprintln!("[{mark}] {i} ({slot}) {}", e.text);
    }
}
