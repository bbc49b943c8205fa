//! Relay-forward / relay-reply envelopes
use bytes::{Buf, BufMut, Bytes, BytesMut};
use dhcproto::v6::{MessageType, OptionCode};

use std::{fmt, net::Ipv6Addr};

use crate::{
    errors::{DecodeError, Result},
    option::RelayOption,
};

/// msg-type (1) + hop-count (1) + link-address (16) + peer-address (16)
pub const RELAY_HEADER_SIZE: usize = 34;

/// One relay layer: the addressing of a single hop and the options that hop
/// attached. The inner message lives in the `OPTION_RELAY_MSG` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEnvelope {
    msg_type: MessageType,
    hop_count: u8,
    link_addr: Ipv6Addr,
    peer_addr: Ipv6Addr,
    opts: Vec<RelayOption>,
}

impl RelayEnvelope {
    /// New envelope with no options
    pub fn new(
        msg_type: MessageType,
        hop_count: u8,
        link_addr: Ipv6Addr,
        peer_addr: Ipv6Addr,
    ) -> Self {
        Self {
            msg_type,
            hop_count,
            link_addr,
            peer_addr,
            opts: Vec::new(),
        }
    }

    pub fn msg_type(&self) -> MessageType {
        self.msg_type
    }

    /// Set the message type. Nothing checks that it is `RelayForw` or
    /// `RelayRepl`; keeping the envelope valid is up to the caller.
    pub fn set_msg_type(&mut self, msg_type: MessageType) -> &mut Self {
        self.msg_type = msg_type;
        self
    }

    pub fn hop_count(&self) -> u8 {
        self.hop_count
    }

    pub fn set_hop_count(&mut self, hop_count: u8) -> &mut Self {
        self.hop_count = hop_count;
        self
    }

    pub fn link_addr(&self) -> Ipv6Addr {
        self.link_addr
    }

    pub fn set_link_addr(&mut self, link_addr: Ipv6Addr) -> &mut Self {
        self.link_addr = link_addr;
        self
    }

    pub fn peer_addr(&self) -> Ipv6Addr {
        self.peer_addr
    }

    pub fn set_peer_addr(&mut self, peer_addr: Ipv6Addr) -> &mut Self {
        self.peer_addr = peer_addr;
        self
    }

    /// all options, in wire order
    pub fn options(&self) -> &[RelayOption] {
        &self.opts
    }

    pub fn set_options(&mut self, opts: Vec<RelayOption>) -> &mut Self {
        self.opts = opts;
        self
    }

    /// every option with `code`, in wire order
    pub fn get_option<C: Into<OptionCode>>(&self, code: C) -> Vec<&RelayOption> {
        let code = code.into();
        self.opts.iter().filter(|opt| opt.code() == code).collect()
    }

    /// first option with `code`
    pub fn get_one_option<C: Into<OptionCode>>(&self, code: C) -> Option<&RelayOption> {
        let code = code.into();
        self.opts.iter().find(|opt| opt.code() == code)
    }

    /// append `opt`, duplicates are allowed
    pub fn add_option(&mut self, opt: RelayOption) -> &mut Self {
        self.opts.push(opt);
        self
    }

    /// Replace the first option with the same code as `opt`, or append it if
    /// there is none. Later duplicates are left alone.
    pub fn update_option(&mut self, opt: RelayOption) -> &mut Self {
        match self.opts.iter_mut().find(|cur| cur.code() == opt.code()) {
            Some(cur) => *cur = opt,
            None => self.opts.push(opt),
        }
        self
    }

    /// Encoded length, computed without encoding
    pub fn len(&self) -> usize {
        RELAY_HEADER_SIZE + self.opts.iter().map(RelayOption::encoded_len).sum::<usize>()
    }

    /// an envelope always has its fixed header
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Write header and options into `buf`. Fails with
    /// [`Error::OptionTooLarge`] before writing anything if an option payload
    /// does not fit its length field.
    ///
    /// [`Error::OptionTooLarge`]: crate::Error::OptionTooLarge
    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        for opt in &self.opts {
            opt.wire_len()?;
        }
        buf.reserve(self.len());
        buf.put_u8(u8::from(self.msg_type));
        buf.put_u8(self.hop_count);
        buf.put_slice(&self.link_addr.octets());
        buf.put_slice(&self.peer_addr.octets());
        for opt in &self.opts {
            opt.encode(buf)?;
        }
        Ok(())
    }

    /// Encode header and options
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode a relay envelope. The message type byte is taken as is.
    pub fn decode(mut buf: Bytes) -> std::result::Result<Self, DecodeError> {
        if buf.remaining() < RELAY_HEADER_SIZE {
            return Err(DecodeError::Truncated {
                what: "relay header",
                needed: RELAY_HEADER_SIZE,
                remaining: buf.remaining(),
            });
        }
        let msg_type = MessageType::from(buf.get_u8());
        let hop_count = buf.get_u8();
        let link_addr = Ipv6Addr::from(buf.get_u128());
        let peer_addr = Ipv6Addr::from(buf.get_u128());
        let opts = RelayOption::decode_all(buf)?;
        Ok(Self {
            msg_type,
            hop_count,
            link_addr,
            peer_addr,
            opts,
        })
    }

    /// Multi-line description of the envelope
    pub fn summary(&self) -> String {
        let mut out = String::from("RelayEnvelope\n");
        out.push_str(&format!("  msg_type={:?}\n", self.msg_type));
        out.push_str(&format!("  hop_count={}\n", self.hop_count));
        out.push_str(&format!("  link_addr={}\n", self.link_addr));
        out.push_str(&format!("  peer_addr={}\n", self.peer_addr));
        out.push_str(&format!("  options={:?}\n", self.opts));
        out
    }
}

impl fmt::Display for RelayEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelayEnvelope(msg_type={:?} hop_count={}, link_addr={}, peer_addr={}, {} options)",
            self.msg_type,
            self.hop_count,
            self.link_addr,
            self.peer_addr,
            self.opts.len()
        )
    }
}
