use serde::{Deserialize, Serialize};

use std::net::Ipv6Addr;

use relay_chain::RelayEnvelope;

/// One relay layer of the inspected packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerReport {
    pub msg_type: String,
    pub hop_count: u8,
    pub link_addr: Ipv6Addr,
    pub peer_addr: Ipv6Addr,
    pub option_codes: Vec<u16>,
}

impl From<&RelayEnvelope> for LayerReport {
    fn from(relay: &RelayEnvelope) -> Self {
        Self {
            msg_type: format!("{:?}", relay.msg_type()),
            hop_count: relay.hop_count(),
            link_addr: relay.link_addr(),
            peer_addr: relay.peer_addr(),
            option_codes: relay
                .options()
                .iter()
                .map(|opt| u16::from(opt.code()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectReport {
    pub packet_len: usize,
    /// outermost first
    pub layers: Vec<LayerReport>,
    pub inner_msg_type: String,
    pub inner_peer_addr: Option<Ipv6Addr>,
    pub inner_peer_addr_error: Option<String>,
    /// hex encoded RELAY_REPL chain
    pub reply: Option<String>,
}

impl InspectReport {
    pub fn human_summary(&self) -> String {
        let mut output = String::new();
        output.push_str("DHCPv6 relay chain report\n");
        output.push_str(&format!(
            "packet: {} bytes, {} relay layers\n",
            self.packet_len,
            self.layers.len()
        ));
        for (i, layer) in self.layers.iter().enumerate() {
            output.push_str(&format!(
                "layer {i}: {} hop_count={} link_addr={} peer_addr={} options={:?}\n",
                layer.msg_type,
                layer.hop_count,
                layer.link_addr,
                layer.peer_addr,
                layer.option_codes
            ));
        }
        output.push_str(&format!("inner message: {}\n", self.inner_msg_type));
        match (&self.inner_peer_addr, &self.inner_peer_addr_error) {
            (Some(addr), _) => output.push_str(&format!("inner peer address: {addr}\n")),
            (None, Some(err)) => output.push_str(&format!("inner peer address: error: {err}\n")),
            (None, None) => {}
        }
        if let Some(reply) = &self.reply {
            output.push_str(&format!("reply: {reply}\n"));
        }
        output
    }
}
