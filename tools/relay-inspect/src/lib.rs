pub mod config;
pub mod report;
pub mod trace;

use anyhow::{Context, Result};
use relay_chain::{Message, decapsulate_relay, new_relay_repl_from_relay_forw};
use tracing::{debug, info};

pub use config::{Cli, InspectConfig, LogFormat};
pub use report::{InspectReport, LayerReport};

/// Decode the configured packet, walk its relay layers and, when an answer is
/// configured, build the RELAY_REPL chain for it.
pub fn inspect(config: &InspectConfig) -> Result<InspectReport> {
    let msg = Message::decode(&config.packet).context("failed to decode packet")?;
    let depth = msg.relay_depth().context("failed to walk relay chain")?;
    debug!(depth, msg_type = ?msg.msg_type(), "decoded packet");

    let mut layers = Vec::with_capacity(depth);
    let mut cur = msg.clone();
    for _ in 0..depth {
        let next = decapsulate_relay(&cur)?;
        if let Some(relay) = cur.as_relay() {
            layers.push(LayerReport::from(relay));
        }
        cur = next;
    }

    let (inner_peer_addr, inner_peer_addr_error) = match msg.as_relay() {
        Some(relay) => match relay.inner_peer_addr() {
            Ok(addr) => (Some(addr), None),
            Err(err) => (None, Some(err.to_string())),
        },
        None => (None, None),
    };

    let reply = match &config.answer {
        Some(answer) => {
            let answer = Message::decode(answer).context("failed to decode answer")?;
            let repl = new_relay_repl_from_relay_forw(&msg, &answer)
                .context("failed to build RELAY_REPL chain")?;
            let bytes = repl.to_bytes()?;
            info!(len = bytes.len(), depth, "built RELAY_REPL chain");
            Some(hex::encode(bytes))
        }
        None => None,
    };

    Ok(InspectReport {
        packet_len: config.packet.len(),
        layers,
        inner_msg_type: format!("{:?}", cur.msg_type()),
        inner_peer_addr,
        inner_peer_addr_error,
        reply,
    })
}
