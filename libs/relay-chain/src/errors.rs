use dhcproto::v6::MessageType;

use std::net::Ipv6Addr;

/// Errors raised while walking or rebuilding a relay chain
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// a hop could not be decoded
    #[error("malformed relay chain: {0}")]
    MalformedChain(#[from] DecodeError),
    /// a relay envelope was required but a leaf message was found
    #[error("expected a relay message, found {0:?}")]
    NotARelay(MessageType),
    /// relay envelope of the wrong type for the operation
    #[error("wrong relay message type: expected {expected:?}, found {found:?}")]
    WrongMessageType {
        expected: MessageType,
        found: MessageType,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// the outer hop count promised more relay layers than the chain holds
    #[error("hop count {hop_count} exceeds chain depth {depth} (last peer {last_peer})")]
    HopCountMismatch {
        hop_count: u8,
        depth: usize,
        last_peer: Ipv6Addr,
    },
    /// option payload does not fit the 16 bit length field
    #[error("option {code} payload of {len} bytes exceeds 65535 bytes")]
    OptionTooLarge { code: u16, len: usize },
    #[error("failed to encode inner message: {0}")]
    Encode(#[from] dhcproto::error::EncodeError),
}

/// Reasons a single relay layer fails to decode
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("empty message buffer")]
    Empty,
    #[error("truncated {what}: need {needed} bytes, {remaining} remaining")]
    Truncated {
        what: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("relay message has no OPTION_RELAY_MSG")]
    MissingRelayMsg,
    #[error("relay chain deeper than its {len} byte buffer allows")]
    TooDeep { len: usize },
    #[error("leaf message: {0}")]
    Leaf(#[from] dhcproto::error::DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
