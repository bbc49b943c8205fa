//! Single-hop primitives: strip or add exactly one relay layer
use dhcproto::v6::MessageType;
use tracing::trace;

use std::net::Ipv6Addr;

use crate::{
    errors::{DecodeError, Error, Result},
    message::Message,
    option::{OPTION_RELAY_MSG, RelayOption},
    relay::RelayEnvelope,
};

/// Decode the message carried in the first `OPTION_RELAY_MSG` of `msg`.
pub fn decapsulate_relay(msg: &Message) -> Result<Message> {
    let relay = msg.as_relay().ok_or(Error::NotARelay(msg.msg_type()))?;
    decapsulate(relay)
}

pub(crate) fn decapsulate(relay: &RelayEnvelope) -> Result<Message> {
    let inner = relay
        .get_one_option(OPTION_RELAY_MSG)
        .ok_or(DecodeError::MissingRelayMsg)?;
    // slices the outer buffer, so a deep chain is not copied once per layer
    let inner = Message::decode_bytes(inner.data().clone())?;
    trace!(outer = %relay, inner = ?inner.msg_type(), "decapsulated relay layer");
    Ok(inner)
}

/// Wrap `msg` in a new relay envelope of type `msg_type`. The hop count is one
/// more than `msg`'s when `msg` is itself a relay, otherwise 0. Fails with
/// [`Error::OptionTooLarge`] when encoded `msg` is longer than a relay-msg
/// option can carry.
pub fn encapsulate_relay(
    msg: &Message,
    msg_type: MessageType,
    link_addr: Ipv6Addr,
    peer_addr: Ipv6Addr,
) -> Result<RelayEnvelope> {
    if !matches!(msg_type, MessageType::RelayForw | MessageType::RelayRepl) {
        return Err(Error::WrongMessageType {
            expected: MessageType::RelayForw,
            found: msg_type,
        });
    }
    let hop_count = match msg {
        Message::Relay(inner) => inner.hop_count().saturating_add(1),
        Message::Leaf(_) => 0,
    };
    let relay_msg = RelayOption::relay_msg(msg.to_bytes()?);
    relay_msg.wire_len()?;
    let mut outer = RelayEnvelope::new(msg_type, hop_count, link_addr, peer_addr);
    outer.add_option(relay_msg);
    Ok(outer)
}
