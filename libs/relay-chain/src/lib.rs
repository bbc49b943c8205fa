//! # relay-chain
//!
//! DHCPv6 relay agents wrap a client message in one RELAY_FORW envelope per
//! hop. This crate encodes those envelopes, unwraps a chain to find the client
//! message and address, and wraps a server answer back up in the mirror-image
//! RELAY_REPL chain.
//!
//! ```
//! use relay_chain::{Message, encapsulate_relay, new_relay_repl_from_relay_forw};
//! use relay_chain::dhcproto::v6::{self, MessageType};
//! use std::net::Ipv6Addr;
//!
//! let solicit = Message::from(v6::Message::new(MessageType::Solicit));
//! let client: Ipv6Addr = "fe80::1".parse()?;
//! let link: Ipv6Addr = "2001:db8::1".parse()?;
//! let fwd = Message::from(encapsulate_relay(&solicit, MessageType::RelayForw, link, client)?);
//!
//! assert_eq!(fwd.as_relay().unwrap().inner_peer_addr()?, client);
//!
//! let answer = Message::from(v6::Message::new(MessageType::Advertise));
//! let repl = new_relay_repl_from_relay_forw(&fwd, &answer)?;
//! assert_eq!(repl.msg_type(), MessageType::RelayRepl);
//! assert_eq!(repl.inner_message()?, answer);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]
#![allow(clippy::cognitive_complexity)]
#![deny(rustdoc::broken_intra_doc_links)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]
pub use dhcproto;

mod chain;
mod encap;
mod errors;
mod message;
mod option;
mod relay;

pub use crate::chain::new_relay_repl_from_relay_forw;
pub use crate::encap::{decapsulate_relay, encapsulate_relay};
pub use crate::errors::{DecodeError, Error, Result};
pub use crate::message::Message;
pub use crate::option::{OPTION_HEADER_SIZE, OPTION_INTERFACE_ID, OPTION_RELAY_MSG, RelayOption};
pub use crate::relay::{RELAY_HEADER_SIZE, RelayEnvelope};
