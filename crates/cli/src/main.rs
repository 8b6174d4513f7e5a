//! `hookc` entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Wire logging**: configure `tracing-subscriber` with an `EnvFilter`
//!    (`RUST_LOG`) and either the human-readable or the JSON formatter.
//! 2. **Load settings**: the optional [`extensibility::CompilerConfig`] file
//!    and the secret set (file plus `HOOKC_SECRET_<NAME>` variables).
//! 3. **Run a command**: list the known extensibility points, or push one
//!    request through a compiled echo extension and print the wire response.

mod settings;
mod simulate;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use extensibility::ExtensibilityPointType;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hookc")]
#[command(about = "Compile and simulate extensibility-point extensions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List every extensibility point with its positional parameters
    Points,

    /// Run a request file through an echo extension and print the response body
    Simulate {
        /// Extensibility point, e.g. `send-phone-message`
        #[arg(short, long)]
        point: ExtensibilityPointType,

        /// JSON request file: `{ method, headers, body?, rawBody? }`
        #[arg(short, long)]
        request: PathBuf,

        /// JSON object of secret names to values
        #[arg(short, long)]
        secrets: Option<PathBuf>,

        /// Compiler configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed by an embedding process.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Points => {
            for point in ExtensibilityPointType::ALL {
                println!("{}", simulate::describe(point));
            }
        }
        Commands::Simulate {
            point,
            request,
            secrets,
            config,
        } => {
            let config = settings::load_config(config.as_deref())?;
            let secrets = settings::load_secrets(secrets.as_deref(), std::env::vars())?;
            let request = simulate::RequestFile::load(&request)?;

            let response = simulate::run(point, config, secrets, request).await?;
            println!("{}", response.body);
        }
    }

    Ok(())
}
