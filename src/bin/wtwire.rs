//! wtwire CLI binary.
//!
//! Inspect and craft watchtower wire messages.
//!
//! # Commands
//!
//! - `decode` - Decode a base64 wire frame to JSON
//! - `encode` - Encode a JSON message to a base64 wire frame
//! - `inspect` - Show framing details and validation result of a frame
//! - `types` - List registered message types and their payload limits

use std::io::{self, Read};
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use clap::{Parser, Subcommand};
use wtwire::{
    config::Config,
    wire::{decode_message, encode_message, Message, MessageType, TYPE_PREFIX_SIZE},
    ProtocolVersion, Result, WtError, VERSION,
};

#[derive(Parser)]
#[command(name = "wtwire")]
#[command(version = VERSION)]
#[command(about = "Watchtower wire protocol codec", long_about = None)]
struct Cli {
    /// Config file (default: <config_dir>/wtwire/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Protocol version (overrides config and WTWIRE_PROTOCOL_VERSION)
    #[arg(short = 'p', long, global = true)]
    protocol_version: Option<ProtocolVersion>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a base64 wire frame to JSON
    Decode {
        /// Base64 input (or - for stdin)
        input: Option<String>,

        /// Input file path (raw binary frame)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output as pretty-printed JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Encode a JSON message to a base64 wire frame
    Encode {
        /// JSON input (or - for stdin)
        input: Option<String>,

        /// Input file path
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output file path (default: stdout, base64)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the raw binary frame instead of base64 (requires --output)
        #[arg(long, requires = "output")]
        raw: bool,
    },

    /// Show framing details of a base64 wire frame
    Inspect {
        /// Base64 input (or - for stdin)
        input: Option<String>,

        /// Input file path (raw binary frame)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// List registered message types
    Types,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;
    init_logging(&config, cli.verbose);

    let pver = cli.protocol_version.unwrap_or(config.protocol_version());
    tracing::debug!(pver, "using protocol version");

    let result = match cli.command {
        Commands::Decode {
            input,
            file,
            output,
            pretty,
        } => cmd_decode(input, file, output, pretty, pver),

        Commands::Encode {
            input,
            file,
            output,
            raw,
        } => cmd_encode(input, file, output, raw, pver),

        Commands::Inspect { input, file } => cmd_inspect(input, file, pver),

        Commands::Types => cmd_types(pver),
    };
    Ok(result?)
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let file_config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default()?,
    };
    Ok(file_config.merge(Config::from_env()))
}

fn init_logging(config: &Config, verbose: bool) {
    let log_level = if verbose {
        "debug"
    } else {
        config.log_level()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if config.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

fn cmd_decode(
    input: Option<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    pver: ProtocolVersion,
) -> Result<()> {
    let frame = read_frame(input, file)?;
    let msg = decode_message(&frame, pver)?;
    tracing::info!(msg_type = %msg.msg_type(), frame_len = frame.len(), "decoded message");

    let json = if pretty {
        serde_json::to_string_pretty(&msg)?
    } else {
        serde_json::to_string(&msg)?
    };
    write_output(output, json.as_bytes())
}

fn cmd_encode(
    input: Option<String>,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
    raw: bool,
    pver: ProtocolVersion,
) -> Result<()> {
    let content = read_input(input, file)?;
    let msg: Message = serde_json::from_str(&content)?;
    let frame = encode_message(&msg, pver)?;
    tracing::info!(msg_type = %msg.msg_type(), frame_len = frame.len(), "encoded message");

    if raw {
        write_output(output, &frame)
    } else {
        write_output(output, BASE64.encode(&frame).as_bytes())
    }
}

fn cmd_inspect(
    input: Option<String>,
    file: Option<PathBuf>,
    pver: ProtocolVersion,
) -> Result<()> {
    let frame = read_frame(input, file)?;

    println!("Frame length:   {} bytes", frame.len());
    if frame.len() < TYPE_PREFIX_SIZE {
        println!("Type code:      (missing)");
    } else {
        let code = u16::from_be_bytes([frame[0], frame[1]]);
        let payload_len = frame.len() - TYPE_PREFIX_SIZE;
        match MessageType::from_code(code) {
            Ok(kind) => {
                println!("Type:           {kind} ({code})");
                println!(
                    "Payload:        {payload_len} bytes (max {})",
                    kind.max_payload_length(pver)
                );
            },
            Err(_) => println!("Type:           unknown ({code})"),
        }
    }
    println!("Protocol:       v{pver}");

    match decode_message(&frame, pver) {
        Ok(msg) => {
            println!("Status:         valid");
            println!("{}", serde_json::to_string_pretty(&msg)?);
        },
        Err(e) => println!("Status:         invalid - {e}"),
    }
    Ok(())
}

fn cmd_types(pver: ProtocolVersion) -> Result<()> {
    println!("{:<20} {:>6} {:>12}", "TYPE", "CODE", "MAX PAYLOAD");
    for kind in MessageType::ALL {
        println!(
            "{:<20} {:>6} {:>12}",
            kind.name(),
            kind.code(),
            kind.max_payload_length(pver)
        );
    }
    Ok(())
}

/// Read a frame: raw bytes from a file, otherwise base64 text.
fn read_frame(input: Option<String>, file: Option<PathBuf>) -> Result<Vec<u8>> {
    if let Some(path) = file {
        return Ok(std::fs::read(path)?);
    }
    let text = read_input(input, None)?;
    let text = text.trim();
    if text.is_empty() {
        return Err(WtError::InvalidInput("no frame given".to_string()));
    }
    Ok(BASE64.decode(text)?)
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(path) = file {
        Ok(std::fs::read_to_string(path)?)
    } else if let Some(s) = input {
        if s == "-" {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        } else {
            Ok(s)
        }
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    }
}

fn write_output(output: Option<PathBuf>, content: &[u8]) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{}", String::from_utf8_lossy(content));
    }
    Ok(())
}
