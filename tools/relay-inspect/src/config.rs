use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};

/// default log filter, any valid RUST_LOG directive is accepted
pub const DEFAULT_LOG: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Standard,
    Json,
    Pretty,
}

/// parses from cli & environment var
#[derive(Debug, Clone, Parser)]
#[command(
    name = "relay-inspect",
    about = "Unwrap a DHCPv6 relay chain and build the matching RELAY_REPL"
)]
pub struct Cli {
    /// received packet, hex encoded
    #[arg(long, env = "RELAY_INSPECT_PACKET", conflicts_with = "packet_file")]
    pub packet: Option<String>,
    /// file holding the raw received packet
    #[arg(long, env = "RELAY_INSPECT_PACKET_FILE")]
    pub packet_file: Option<PathBuf>,
    /// server answer to wrap in RELAY_REPL layers, hex encoded
    #[arg(long, env = "RELAY_INSPECT_ANSWER")]
    pub answer: Option<String>,
    #[arg(long)]
    pub json: bool,
    /// log filter
    #[arg(long, env = "RELAY_INSPECT_LOG", default_value = DEFAULT_LOG)]
    pub log: String,
    #[arg(
        long,
        env = "RELAY_INSPECT_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Standard
    )]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub packet: Vec<u8>,
    pub answer: Option<Vec<u8>>,
    pub json: bool,
    pub log: String,
    pub log_format: LogFormat,
}

impl TryFrom<Cli> for InspectConfig {
    type Error = anyhow::Error;

    fn try_from(args: Cli) -> Result<Self> {
        let packet = match (&args.packet, &args.packet_file) {
            (Some(packet), None) => parse_hex(packet).context("--packet is not valid hex")?,
            (None, Some(path)) => std::fs::read(path)
                .with_context(|| format!("failed to read packet from `{}`", path.display()))?,
            (Some(_), Some(_)) => bail!("--packet and --packet-file are mutually exclusive"),
            (None, None) => bail!("one of --packet or --packet-file is required"),
        };
        if packet.is_empty() {
            bail!("packet is empty");
        }
        let answer = args
            .answer
            .as_deref()
            .map(|answer| parse_hex(answer).context("--answer is not valid hex"))
            .transpose()?;

        Ok(Self {
            packet,
            answer,
            json: args.json,
            log: args.log,
            log_format: args.log_format,
        })
    }
}

/// hex with optional whitespace, as copied from a packet capture
fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(hex::decode(digits)?)
}
