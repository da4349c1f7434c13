//! MG24065 Control Tool
//!
//! CLI for uploading bitmaps to an MG24065G graphic LCD over USB HID or serial.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mg24065_hw::{
    Bitmap, CombineMode, Encoder, FileTransport, Frame, HidTransport, LcdDevice, Preset,
    SerialTransport, Transport, TransportKind,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{Config, DisplayConfig, TransportConfig};

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum DumpFormat {
    /// One line of hex bytes per frame
    #[default]
    Hex,
    /// One JSON object per frame
    Json,
}

#[derive(Parser)]
#[command(name = "mg24065ctl")]
#[command(about = "Upload bitmaps to an MG24065G graphic LCD")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a P1 bitmap on the display
    Send {
        /// Plain PBM (P1) file, 240x64
        input: PathBuf,

        #[command(flatten)]
        transport: TransportArgs,

        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Print the frames a bitmap encodes to without sending them
    Dump {
        /// Plain PBM (P1) file, 240x64
        input: PathBuf,

        #[command(flatten)]
        display: DisplayArgs,

        /// Output format
        #[arg(long, default_value = "hex", value_enum)]
        format: DumpFormat,
    },
    /// Reset the display controller
    Reset {
        #[command(flatten)]
        transport: TransportArgs,
    },
    /// List available presets
    Presets,
}

#[derive(Args)]
struct TransportArgs {
    /// Transport: hid, serial, file
    #[arg(short, long)]
    transport: Option<String>,

    /// Device path (hidraw node, tty, or file; "-" for stdout)
    #[arg(short, long)]
    device: Option<String>,

    /// Serial baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// HID vendor id in hex, used when no device path is given
    #[arg(long, value_parser = parse_hex_u16)]
    vid: Option<u16>,

    /// HID product id in hex, used when no device path is given
    #[arg(long, value_parser = parse_hex_u16)]
    pid: Option<u16>,

    /// Delay after reset in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Prefix frames with HID report number 0 (file transport)
    #[arg(long, overrides_with = "no_report_prefix")]
    report_prefix: bool,

    /// Write frames without a report number, even if the config asks for one
    #[arg(long, overrides_with = "report_prefix")]
    no_report_prefix: bool,
}

#[derive(Args)]
struct DisplayArgs {
    /// Preset: graphics-only-64, graphics-text-60-xor, graphics-text-60-blink
    #[arg(short, long)]
    preset: Option<String>,

    /// Row batching: bulk, per-byte (default depends on preset)
    #[arg(long)]
    batching: Option<String>,

    /// Combine mode: or, xor, and, text-attribute (default depends on preset)
    #[arg(long)]
    combine: Option<String>,

    /// Cursor height in lines, 1-8
    #[arg(long)]
    cursor_lines: Option<u8>,

    /// Send the cursor position (presets that show the cursor)
    #[arg(long, overrides_with = "no_cursor")]
    cursor: bool,

    /// Skip the cursor position frame
    #[arg(long, overrides_with = "cursor")]
    no_cursor: bool,

    /// Require exactly 240x64 instead of rejecting only when both sides differ
    #[arg(long, overrides_with = "no_strict_dimensions")]
    strict_dimensions: bool,

    /// Accept a bitmap when either side is 240 or 64 pixels
    #[arg(long, overrides_with = "strict_dimensions")]
    no_strict_dimensions: bool,
}

/// Resolves a `--flag`/`--no-flag` pair; None when neither was given.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl TransportArgs {
    fn apply(self, config: &mut TransportConfig) {
        if let Some(kind) = self.transport {
            config.kind = kind;
        }
        if let Some(device) = self.device {
            config.device = Some(device);
        }
        if let Some(baud) = self.baud {
            config.baud = baud;
        }
        if self.vid.is_some() {
            config.vid = self.vid;
        }
        if self.pid.is_some() {
            config.pid = self.pid;
        }
        if self.settle_ms.is_some() {
            config.settle_ms = self.settle_ms;
        }
        if let Some(prefix) = flag_pair(self.report_prefix, self.no_report_prefix) {
            config.report_prefix = prefix;
        }
    }
}

impl DisplayArgs {
    fn apply(self, config: &mut DisplayConfig) {
        if let Some(preset) = self.preset {
            config.preset = preset;
        }
        if self.batching.is_some() {
            config.batching = self.batching;
        }
        if self.combine.is_some() {
            config.combine = self.combine;
        }
        if self.cursor_lines.is_some() {
            config.cursor_lines = self.cursor_lines;
        }
        if let Some(show) = flag_pair(self.cursor, self.no_cursor) {
            config.show_cursor = show;
        }
        if let Some(strict) = flag_pair(self.strict_dimensions, self.no_strict_dimensions) {
            config.strict_dimensions = strict;
        }
    }
}

fn parse_hex_u16(s: &str) -> std::result::Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex id {:?}: {}", s, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::Send {
            input,
            transport,
            display,
        } => {
            transport.apply(&mut config.transport);
            display.apply(&mut config.display);
            handle_send(&input, &config)
        }
        Commands::Dump {
            input,
            display,
            format,
        } => {
            display.apply(&mut config.display);
            handle_dump(&input, &config.display, format)
        }
        Commands::Reset { transport } => {
            transport.apply(&mut config.transport);
            handle_reset(&config.transport)
        }
        Commands::Presets => {
            handle_presets();
            Ok(())
        }
    }
}

/// Opens the configured transport.
fn open_device(config: &TransportConfig) -> Result<LcdDevice<Box<dyn Transport>>> {
    let kind: TransportKind = config.kind.parse()?;
    let transport: Box<dyn Transport> = match kind {
        TransportKind::Hid => match (&config.device, config.vid, config.pid) {
            (Some(path), _, _) => Box::new(HidTransport::open_path(path)?),
            (None, Some(vid), Some(pid)) => Box::new(HidTransport::open(vid, pid)?),
            _ => anyhow::bail!("HID transport needs --device or both --vid and --pid"),
        },
        TransportKind::Serial => {
            let path = config
                .device
                .as_deref()
                .context("Serial transport needs --device")?;
            Box::new(SerialTransport::open(path, config.baud)?)
        }
        TransportKind::File => {
            let path = config.device.as_deref().unwrap_or("-");
            Box::new(FileTransport::open(path, config.report_prefix)?)
        }
    };

    let mut device = LcdDevice::new(transport);
    if let Some(ms) = config.settle_ms {
        device = device.with_settle_delay(Duration::from_millis(ms));
    }
    Ok(device)
}

fn load_bitmap(input: &Path, display: &DisplayConfig) -> Result<Bitmap> {
    Bitmap::load(input, display.load_options())
        .with_context(|| format!("Failed to load bitmap {}", input.display()))
}

fn handle_send(input: &Path, config: &Config) -> Result<()> {
    let bitmap = load_bitmap(input, &config.display)?;
    let session = config.display.session()?;

    let mut device = open_device(&config.transport).context("Failed to open transport")?;
    let count = device
        .draw(&bitmap, &session)
        .context("Failed to upload bitmap")?;

    println!(
        "Sent {} frames ({}, {}, {})",
        count,
        session.preset,
        session.batching(),
        session.combine_mode()
    );
    Ok(())
}

#[derive(Serialize)]
struct FrameRecord {
    index: usize,
    opcode: Option<u8>,
    kind: String,
    bytes: String,
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn frame_record(index: usize, frame: &Frame) -> FrameRecord {
    FrameRecord {
        index,
        opcode: frame.opcode().map(|op| op as u8),
        kind: frame
            .opcode()
            .map(|op| format!("{:?}", op))
            .unwrap_or_else(|| "Text".to_string()),
        bytes: hex(&frame.to_bytes()),
    }
}

fn handle_dump(input: &Path, display: &DisplayConfig, format: DumpFormat) -> Result<()> {
    let bitmap = load_bitmap(input, display)?;
    let session = display.session()?;
    let encoder = Encoder::new(&bitmap, &session)?;

    for (index, frame) in encoder.frames().enumerate() {
        let frame = frame?;
        match format {
            DumpFormat::Hex => println!("{}", hex(&frame.to_bytes())),
            DumpFormat::Json => println!("{}", serde_json::to_string(&frame_record(index, &frame))?),
        }
    }
    Ok(())
}

fn handle_reset(config: &TransportConfig) -> Result<()> {
    let mut device = open_device(config).context("Failed to open transport")?;
    device.reset().context("Failed to reset display")?;
    println!("Display reset");
    Ok(())
}

fn handle_presets() {
    println!("Available presets:");
    for preset in Preset::ALL {
        println!(
            "  {} - {} rows, {} by default, {} combine{}",
            preset,
            preset.rows(),
            preset.default_batching(),
            preset.combine_mode(),
            if preset.has_text_layer() {
                ", text layer"
            } else {
                ""
            }
        );
    }

    let modes: Vec<String> = CombineMode::ALL.iter().map(|m| m.to_string()).collect();
    println!("Combine modes: {}", modes.join(", "));
}
