//! Multi-hop algorithms over a relay chain: finding the client message and
//! address inside a RELAY_FORW chain, and building the matching RELAY_REPL
//! chain for a server answer.
//!
//! Every walk is a loop over single-hop [`decapsulate_relay`] calls. Each
//! layer is strictly shorter than the one around it, so decoding fails once
//! the bytes run out. As a guard on top of that, a walk gives up with
//! [`DecodeError::TooDeep`] after `len / MIN_LAYER_SIZE` layers of the
//! outermost envelope, the most a well-formed chain of that length can hold.
//!
//! [`decapsulate_relay`]: crate::decapsulate_relay
use dhcproto::v6::{self, MessageType};
use tracing::{debug, trace};

use std::net::Ipv6Addr;

use crate::{
    encap::{decapsulate, encapsulate_relay},
    errors::{DecodeError, Error, Result},
    message::Message,
    option::{OPTION_HEADER_SIZE, OPTION_INTERFACE_ID, RelayOption},
    relay::{RELAY_HEADER_SIZE, RelayEnvelope},
};

/// smallest relay layer: the header and an empty relay-msg option
const MIN_LAYER_SIZE: usize = RELAY_HEADER_SIZE + OPTION_HEADER_SIZE;

/// Visit every relay layer starting at `outer`, outermost first, and return
/// the leaf message at the bottom of the chain.
fn walk<F>(outer: &RelayEnvelope, visit: F) -> Result<v6::Message>
where
    F: FnMut(&RelayEnvelope),
{
    walk_at_most(outer, outer.len() / MIN_LAYER_SIZE, visit)
}

fn walk_at_most<F>(outer: &RelayEnvelope, limit: usize, mut visit: F) -> Result<v6::Message>
where
    F: FnMut(&RelayEnvelope),
{
    let mut next: Option<RelayEnvelope> = None;
    for _ in 0..limit {
        let current = next.as_ref().unwrap_or(outer);
        visit(current);
        match decapsulate(current)? {
            Message::Relay(inner) => next = Some(inner),
            Message::Leaf(leaf) => return Ok(leaf),
        }
    }
    Err(DecodeError::TooDeep { len: outer.len() }.into())
}

impl RelayEnvelope {
    /// Unwrap every relay layer and return the client (or server) message at
    /// the bottom of the chain.
    pub fn inner_message(&self) -> Result<Message> {
        walk(self, |_| {}).map(Message::Leaf)
    }

    /// Peer address of the innermost relay layer, usually the client's
    /// address. The outer `hop_count` is trusted as the chain depth: exactly
    /// `hop_count` layers are removed, and the chain may only end in a leaf
    /// message on the last of them.
    ///
    /// A hop count smaller than the real depth returns the peer address of an
    /// intermediate relay.
    pub fn inner_peer_addr(&self) -> Result<Ipv6Addr> {
        let hop_count = self.hop_count();
        let mut addr = self.peer_addr();
        let mut next: Option<RelayEnvelope> = None;
        for hop in 0..hop_count {
            let current = next.as_ref().unwrap_or(self);
            match decapsulate(current)? {
                Message::Relay(inner) => {
                    addr = inner.peer_addr();
                    next = Some(inner);
                }
                // ran out of relays on the final expected hop
                Message::Leaf(_) if hop + 1 == hop_count => break,
                Message::Leaf(_) => {
                    return Err(Error::HopCountMismatch {
                        hop_count,
                        depth: usize::from(hop) + 1,
                        last_peer: addr,
                    });
                }
            }
        }
        trace!(hop_count, %addr, "found inner peer address");
        Ok(addr)
    }
}

impl Message {
    /// The leaf message at the bottom of the chain, or a copy of `self` if it
    /// is already a leaf.
    pub fn inner_message(&self) -> Result<Message> {
        match self {
            Message::Relay(relay) => relay.inner_message(),
            Message::Leaf(_) => Ok(self.clone()),
        }
    }

    /// Number of relay layers above the leaf message
    pub fn relay_depth(&self) -> Result<usize> {
        match self {
            Message::Relay(relay) => {
                let mut depth = 0;
                walk(relay, |_| depth += 1)?;
                Ok(depth)
            }
            Message::Leaf(_) => Ok(0),
        }
    }
}

/// what each RELAY_FORW layer contributes to the reply
#[derive(Debug)]
struct Hop {
    link_addr: Ipv6Addr,
    peer_addr: Ipv6Addr,
    interface_id: Option<RelayOption>,
}

/// Build the RELAY_REPL chain answering `relay_forw`, with `answer` as the
/// innermost message.
///
/// Every RELAY_FORW layer gets a RELAY_REPL layer with the same link and peer
/// address, in the same order. Interface-id options are copied to the reply;
/// all other per-hop options are dropped.
pub fn new_relay_repl_from_relay_forw(
    relay_forw: &Message,
    answer: &Message,
) -> Result<Message> {
    let relay = relay_forw
        .as_relay()
        .ok_or(Error::NotARelay(relay_forw.msg_type()))?;
    if relay.msg_type() != MessageType::RelayForw {
        return Err(Error::WrongMessageType {
            expected: MessageType::RelayForw,
            found: relay.msg_type(),
        });
    }
    if answer.is_relay() {
        return Err(Error::InvalidArgument("answer message cannot be a relay"));
    }

    let mut hops = Vec::new();
    walk(relay, |layer| {
        hops.push(Hop {
            link_addr: layer.link_addr(),
            peer_addr: layer.peer_addr(),
            interface_id: layer.get_one_option(OPTION_INTERFACE_ID).cloned(),
        })
    })?;
    debug!(depth = hops.len(), answer = ?answer.msg_type(), "building RELAY_REPL chain");

    let mut msg = answer.clone();
    for hop in hops.into_iter().rev() {
        let mut repl =
            encapsulate_relay(&msg, MessageType::RelayRepl, hop.link_addr, hop.peer_addr)?;
        if let Some(id) = hop.interface_id {
            repl.add_option(id);
        }
        msg = repl.into();
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OPTION_RELAY_MSG;
    use tracing_test::traced_test;

    fn addr(s: &str) -> Ipv6Addr {
        s.parse().unwrap()
    }

    fn solicit() -> Message {
        let mut msg = v6::Message::new_with_id(MessageType::Solicit, [9, 8, 7]);
        msg.opts_mut()
            .insert(v6::DhcpOption::ClientId(vec![0, 3, 0, 1, 0xde, 0xad, 0xbe, 0xef, 0, 1]));
        msg.into()
    }

    fn reply() -> Message {
        v6::Message::new_with_id(MessageType::Reply, [9, 8, 7]).into()
    }

    /// wrap `msg` in one RELAY_FORW per `(link, peer)`, innermost first
    fn forward_chain(msg: Message, hops: &[(&str, &str)]) -> Message {
        hops.iter().fold(msg, |msg, (link, peer)| {
            encapsulate_relay(&msg, MessageType::RelayForw, addr(link), addr(peer))
                .unwrap()
                .into()
        })
    }

    #[test]
    fn test_inner_message_of_leaf() {
        assert_eq!(solicit().inner_message().unwrap(), solicit());
        assert_eq!(solicit().relay_depth().unwrap(), 0);
    }

    #[test]
    fn test_inner_message_deep_chain() {
        let hops: Vec<(String, String)> = (0..12)
            .map(|i| (format!("2001:db8:{i}::1"), format!("fe80::{i}")))
            .collect();
        let hops: Vec<(&str, &str)> = hops.iter().map(|(l, p)| (&l[..], &p[..])).collect();
        let chain = forward_chain(solicit(), &hops);

        assert_eq!(chain.relay_depth().unwrap(), 12);
        assert_eq!(chain.inner_message().unwrap(), solicit());
        // encapsulation counts from 0 at the client side
        assert_eq!(chain.as_relay().unwrap().hop_count(), 11);
    }

    #[test]
    fn test_walk_depth_limit() {
        let chain = forward_chain(
            solicit(),
            &[
                ("2001:db8:3::1", "fe80::c"),
                ("2001:db8:2::1", "fe80::b"),
                ("2001:db8:1::1", "fe80::a"),
            ],
        );
        let relay = chain.as_relay().unwrap();
        assert!(relay.len() / MIN_LAYER_SIZE >= 3);

        let mut seen = 0;
        assert!(matches!(
            walk_at_most(relay, 2, |_| seen += 1),
            Err(Error::MalformedChain(DecodeError::TooDeep { len })) if len == relay.len()
        ));
        assert_eq!(seen, 2);
        assert_eq!(walk_at_most(relay, 3, |_| {}).map(Message::Leaf).unwrap(), solicit());
    }

    #[test]
    fn test_minimal_layer_reaches_decapsulation() {
        // a 38 byte layer gets one iteration, the empty payload then fails to decode
        let mut relay = RelayEnvelope::new(
            MessageType::RelayForw,
            0,
            Ipv6Addr::UNSPECIFIED,
            Ipv6Addr::UNSPECIFIED,
        );
        relay.add_option(RelayOption::relay_msg(bytes::Bytes::new()));
        assert_eq!(relay.len(), MIN_LAYER_SIZE);
        assert!(matches!(
            relay.inner_message(),
            Err(Error::MalformedChain(DecodeError::Empty))
        ));
    }

    #[test]
    fn test_inner_peer_addr_zero_hops() {
        let chain = forward_chain(solicit(), &[("2001:db8::1", "fe80::c")]);
        let relay = chain.as_relay().unwrap();
        assert_eq!(relay.hop_count(), 0);
        assert_eq!(relay.inner_peer_addr().unwrap(), addr("fe80::c"));
    }

    #[test]
    fn test_inner_peer_addr_hop_count_depth() {
        let chain = forward_chain(
            solicit(),
            &[("2001:db8:2::1", "fe80::c"), ("2001:db8:1::1", "2001:db8:2::1")],
        );
        let mut relay = chain.into_relay().unwrap();
        // hop count as relays set it, one less than the depth
        assert_eq!(relay.hop_count(), 1);
        assert_eq!(relay.inner_peer_addr().unwrap(), addr("fe80::c"));

        // hop count equal to the depth ends on the leaf
        relay.set_hop_count(2);
        assert_eq!(relay.inner_peer_addr().unwrap(), addr("fe80::c"));

        // under-counted, stops at the outer relay's own peer
        relay.set_hop_count(0);
        assert_eq!(relay.inner_peer_addr().unwrap(), addr("2001:db8:2::1"));
    }

    #[test]
    fn test_inner_peer_addr_hop_count_too_large() {
        let chain = forward_chain(
            solicit(),
            &[("2001:db8:2::1", "fe80::c"), ("2001:db8:1::1", "2001:db8:2::1")],
        );
        let mut relay = chain.into_relay().unwrap();
        relay.set_hop_count(5);
        assert!(matches!(
            relay.inner_peer_addr(),
            Err(Error::HopCountMismatch {
                hop_count: 5,
                depth: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_reply_mirrors_forward_chain() {
        let mut inner = encapsulate_relay(
            &solicit(),
            MessageType::RelayForw,
            addr("2001:db8:2::1"),
            addr("fe80::c"),
        )
        .unwrap();
        inner.add_option(RelayOption::interface_id(&b"eth0.12"[..]));
        // per-hop options other than interface-id are not copied
        inner.add_option(RelayOption::new(37u16, &b"remote-id"[..]));
        let outer = encapsulate_relay(
            &inner.into(),
            MessageType::RelayForw,
            addr("2001:db8:1::1"),
            addr("2001:db8:2::1"),
        )
        .unwrap();

        let repl = new_relay_repl_from_relay_forw(&outer.into(), &reply()).unwrap();
        let outer_repl = repl.as_relay().unwrap();
        assert_eq!(outer_repl.msg_type(), MessageType::RelayRepl);
        assert_eq!(outer_repl.link_addr(), addr("2001:db8:1::1"));
        assert_eq!(outer_repl.peer_addr(), addr("2001:db8:2::1"));
        assert_eq!(outer_repl.hop_count(), 1);
        assert!(outer_repl.get_one_option(OPTION_INTERFACE_ID).is_none());

        let inner_repl = decapsulate(outer_repl).unwrap().into_relay().unwrap();
        assert_eq!(inner_repl.msg_type(), MessageType::RelayRepl);
        assert_eq!(inner_repl.link_addr(), addr("2001:db8:2::1"));
        assert_eq!(inner_repl.peer_addr(), addr("fe80::c"));
        assert_eq!(inner_repl.hop_count(), 0);
        assert_eq!(
            &inner_repl.get_one_option(OPTION_INTERFACE_ID).unwrap().data()[..],
            b"eth0.12"
        );
        assert!(inner_repl.get_one_option(37u16).is_none());
        // relay message first, then the interface-id
        assert_eq!(u16::from(inner_repl.options()[0].code()), OPTION_RELAY_MSG);

        assert_eq!(repl.inner_message().unwrap(), reply());
    }

    #[test]
    #[traced_test]
    fn test_reply_logs_depth() {
        let chain = forward_chain(solicit(), &[("2001:db8::1", "fe80::1")]);
        new_relay_repl_from_relay_forw(&chain, &reply()).unwrap();
        assert!(logs_contain("building RELAY_REPL chain"));
    }

    #[test]
    fn test_reply_rejects_relay_repl() {
        let chain = forward_chain(solicit(), &[("2001:db8::1", "fe80::1")]);
        let mut relay = chain.into_relay().unwrap();
        relay.set_msg_type(MessageType::RelayRepl);
        assert!(matches!(
            new_relay_repl_from_relay_forw(&relay.into(), &reply()),
            Err(Error::WrongMessageType {
                expected: MessageType::RelayForw,
                found: MessageType::RelayRepl,
            })
        ));
    }

    #[test]
    fn test_reply_rejects_leaf_forward() {
        assert!(matches!(
            new_relay_repl_from_relay_forw(&solicit(), &reply()),
            Err(Error::NotARelay(MessageType::Solicit))
        ));
    }

    #[test]
    fn test_reply_rejects_relay_answer() {
        let chain = forward_chain(solicit(), &[("2001:db8::1", "fe80::1")]);
        assert!(matches!(
            new_relay_repl_from_relay_forw(&chain, &chain),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_reply_malformed_forward() {
        let mut relay = RelayEnvelope::new(
            MessageType::RelayForw,
            0,
            addr("2001:db8::1"),
            addr("fe80::1"),
        );
        relay.add_option(RelayOption::interface_id(&b"eth0"[..]));
        assert!(matches!(
            new_relay_repl_from_relay_forw(&relay.into(), &reply()),
            Err(Error::MalformedChain(DecodeError::MissingRelayMsg))
        ));
    }
}
