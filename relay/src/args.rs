use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Transcription relay
#[derive(Debug, Parser)]
#[command(
    name = "relay",
    about = "Download remote media and relay it to a speech-to-text service"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "RELAY_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directive (e.g. "info" or "info,transcribe=debug")
    #[arg(long, default_value = "info", env = "RELAY_LOG")]
    pub log_level: String,
}
