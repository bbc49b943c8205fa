//! A DHCPv6 message that is either a relay envelope or a leaf message
use bytes::Bytes;
use dhcproto::{
    Decodable, Decoder, Encodable,
    v6::{self, MessageType},
};

use crate::{
    errors::{DecodeError, Result},
    relay::RelayEnvelope,
};

/// Any DHCPv6 message. Relay envelopes are parsed here, everything else is
/// handed to `dhcproto`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// RELAY_FORW or RELAY_REPL
    Relay(RelayEnvelope),
    /// client or server message
    Leaf(v6::Message),
}

impl Message {
    /// Decode a message from the wire, dispatching on the message type byte.
    /// A relay envelope copies `buf` once, use [`Message::decode_bytes`] to
    /// avoid that.
    pub fn decode(buf: &[u8]) -> std::result::Result<Self, DecodeError> {
        if is_relay_type(buf)? {
            Ok(Message::Relay(RelayEnvelope::decode(
                Bytes::copy_from_slice(buf),
            )?))
        } else {
            decode_leaf(buf)
        }
    }

    /// Like [`Message::decode`], but relay options keep pointing into `buf`
    /// instead of copying it.
    pub fn decode_bytes(buf: Bytes) -> std::result::Result<Self, DecodeError> {
        if is_relay_type(&buf)? {
            Ok(Message::Relay(RelayEnvelope::decode(buf)?))
        } else {
            decode_leaf(&buf)
        }
    }

    /// Encode to wire format
    pub fn to_bytes(&self) -> Result<Bytes> {
        match self {
            Message::Relay(relay) => relay.to_bytes(),
            Message::Leaf(msg) => Ok(msg.to_vec()?.into()),
        }
    }

    pub fn is_relay(&self) -> bool {
        matches!(self, Message::Relay(_))
    }

    pub fn msg_type(&self) -> MessageType {
        match self {
            Message::Relay(relay) => relay.msg_type(),
            Message::Leaf(msg) => msg.msg_type(),
        }
    }

    pub fn as_relay(&self) -> Option<&RelayEnvelope> {
        match self {
            Message::Relay(relay) => Some(relay),
            Message::Leaf(_) => None,
        }
    }

    pub fn as_relay_mut(&mut self) -> Option<&mut RelayEnvelope> {
        match self {
            Message::Relay(relay) => Some(relay),
            Message::Leaf(_) => None,
        }
    }

    pub fn into_relay(self) -> Option<RelayEnvelope> {
        match self {
            Message::Relay(relay) => Some(relay),
            Message::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&v6::Message> {
        match self {
            Message::Leaf(msg) => Some(msg),
            Message::Relay(_) => None,
        }
    }

    pub fn into_leaf(self) -> Option<v6::Message> {
        match self {
            Message::Leaf(msg) => Some(msg),
            Message::Relay(_) => None,
        }
    }
}

fn is_relay_type(buf: &[u8]) -> std::result::Result<bool, DecodeError> {
    let msg_type = buf.first().copied().ok_or(DecodeError::Empty)?;
    Ok(matches!(
        MessageType::from(msg_type),
        MessageType::RelayForw | MessageType::RelayRepl
    ))
}

fn decode_leaf(buf: &[u8]) -> std::result::Result<Message, DecodeError> {
    Ok(Message::Leaf(v6::Message::decode(&mut Decoder::new(buf))?))
}

impl From<RelayEnvelope> for Message {
    fn from(relay: RelayEnvelope) -> Self {
        Message::Relay(relay)
    }
}

impl From<v6::Message> for Message {
    fn from(msg: v6::Message) -> Self {
        Message::Leaf(msg)
    }
}
