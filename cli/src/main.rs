mod config;
mod error;
mod server;

use clap::{Parser, Subcommand};
use error::CliError;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tonelink_core::{wav, ModemConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tonelink")]
#[command(about = "Send short text messages as two-tone FSK audio")]
struct Cli {
    /// JSON file overriding the default modem configuration
    #[arg(long, global = true, value_name = "CONFIG.JSON")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a text message to a WAV audio file
    Encode {
        /// Message to transmit
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// Output WAV file
        #[arg(value_name = "OUTPUT.WAV")]
        output: PathBuf,
    },

    /// Decode a WAV audio file back to text
    Decode {
        /// Input WAV file (mono, 16-bit PCM)
        #[arg(value_name = "INPUT.WAV")]
        input: PathBuf,

        /// Write the decoded text to a file instead of stdout
        #[arg(short, long, value_name = "OUTPUT.TXT")]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    Config,

    /// Run the HTTP encode/decode service
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Encode { message, output } => encode_command(&config, &message, &output),
        Commands::Decode { input, output } => decode_command(&config, &input, output.as_deref()),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(config, bind))
        }
    }
}

fn encode_command(config: &ModemConfig, message: &str, output_path: &Path) -> Result<(), CliError> {
    let samples = tonelink_core::encode_text(config, message);
    tracing::info!(
        "Encoded {} characters to {} audio samples ({:.2} s)",
        message.chars().count(),
        samples.len(),
        samples.len() as f64 / config.sample_rate as f64
    );

    let wav_bytes = wav::encode(&samples, config.sample_rate);
    std::fs::write(output_path, &wav_bytes).map_err(|source| CliError::Write {
        path: output_path.to_path_buf(),
        source,
    })?;

    println!("Wrote {} bytes to {}", wav_bytes.len(), output_path.display());
    Ok(())
}

fn decode_command(
    config: &ModemConfig,
    input_path: &Path,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let bytes = std::fs::read(input_path).map_err(|source| CliError::Read {
        path: input_path.to_path_buf(),
        source,
    })?;

    let audio = wav::decode(&bytes).map_err(tonelink_core::ModemError::from)?;
    tracing::info!(
        "Read WAV: {} Hz, {} samples",
        audio.sample_rate,
        audio.samples.len()
    );

    let text = tonelink_core::decode_samples(config, &audio.samples, audio.sample_rate)?;
    tracing::info!("Decoded {} characters", text.chars().count());

    match output_path {
        Some(path) => {
            std::fs::write(path, &text).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            println!("Wrote {} characters to {}", text.chars().count(), path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}
