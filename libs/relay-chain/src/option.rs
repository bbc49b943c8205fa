//! Opaque DHCPv6 option TLVs as carried by relay envelopes
use bytes::{Buf, BufMut, Bytes, BytesMut};
use dhcproto::v6::OptionCode;

use std::fmt;

use crate::errors::{DecodeError, Error, Result};

/// size of the `code` + `len` header in front of every option payload
pub const OPTION_HEADER_SIZE: usize = 4;
/// OPTION_RELAY_MSG
pub const OPTION_RELAY_MSG: u16 = 9;
/// OPTION_INTERFACE_ID
pub const OPTION_INTERFACE_ID: u16 = 18;

/// A single option inside a relay envelope. The payload is never interpreted,
/// only carried.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayOption {
    code: OptionCode,
    data: Bytes,
}

impl RelayOption {
    /// Create an option from its code and raw payload
    pub fn new<C: Into<OptionCode>>(code: C, data: impl Into<Bytes>) -> Self {
        Self {
            code: code.into(),
            data: data.into(),
        }
    }

    /// OPTION_INTERFACE_ID with the given opaque id
    pub fn interface_id(id: impl Into<Bytes>) -> Self {
        Self::new(OPTION_INTERFACE_ID, id)
    }

    /// OPTION_RELAY_MSG carrying already-encoded message bytes
    pub fn relay_msg(encoded: impl Into<Bytes>) -> Self {
        Self::new(OPTION_RELAY_MSG, encoded)
    }

    pub fn code(&self) -> OptionCode {
        self.code
    }

    /// raw payload
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// payload length, excluding the 4 byte header
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// length on the wire, including the 4 byte header
    pub fn encoded_len(&self) -> usize {
        self.len() + OPTION_HEADER_SIZE
    }

    /// payload length as the 16 bit wire field
    pub(crate) fn wire_len(&self) -> Result<u16> {
        u16::try_from(self.len()).map_err(|_| Error::OptionTooLarge {
            code: u16::from(self.code),
            len: self.len(),
        })
    }

    /// write `code | len | payload` into `buf`. Nothing is written when the
    /// payload is longer than `u16::MAX`.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        let len = self.wire_len()?;
        buf.reserve(self.encoded_len());
        buf.put_u16(u16::from(self.code));
        buf.put_u16(len);
        buf.put_slice(&self.data);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decode options until `buf` is exhausted
    pub(crate) fn decode_all(
        mut buf: Bytes,
    ) -> std::result::Result<Vec<RelayOption>, DecodeError> {
        let mut opts = Vec::new();
        while buf.has_remaining() {
            if buf.remaining() < OPTION_HEADER_SIZE {
                return Err(DecodeError::Truncated {
                    what: "option header",
                    needed: OPTION_HEADER_SIZE,
                    remaining: buf.remaining(),
                });
            }
            let code = buf.get_u16();
            let len = buf.get_u16() as usize;
            if buf.remaining() < len {
                return Err(DecodeError::Truncated {
                    what: "option payload",
                    needed: len,
                    remaining: buf.remaining(),
                });
            }
            opts.push(RelayOption::new(code, buf.split_to(len)));
        }
        Ok(opts)
    }
}

impl fmt::Debug for RelayOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayOption")
            .field("code", &self.code)
            .field("len", &self.len())
            .finish()
    }
}
