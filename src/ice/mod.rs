
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::description::common::*;
use crate::error::{Error, Result};
use crate::lexer::{parse_u16, parse_u32, parse_u64, write_key_value, Line, END_LINE};

pub const CANDIDATE_COMPONENT_RTP: u16 = 1;
pub const CANDIDATE_COMPONENT_RTCP: u16 = 2;

const CANDIDATE_PATTERN: &str =
    "a=candidate:<id> <component> <proto> <priority> <addr> <port> typ <type> ...";

// foundation, component, transport, priority, address, port, "typ", type
const CANDIDATE_MIN_TOKENS: usize = 8;

const TCP_TYPE_KEY: &str = "tcptype";
const RELATED_ADDRESS_KEY: &str = "raddr";
const RELATED_PORT_KEY: &str = "rport";
const GENERATION_KEY: &str = "generation";

/// TransportProtocol is the transport a candidate is reachable over.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TransportProtocol {
    #[default]
    Udp,
    Tcp,
}

impl TransportProtocol {
    fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("udp") {
            Some(TransportProtocol::Udp)
        } else if raw.eq_ignore_ascii_case("tcp") {
            Some(TransportProtocol::Tcp)
        } else {
            None
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportProtocol::Udp => "udp",
            TransportProtocol::Tcp => "tcp",
        };
        write!(f, "{s}")
    }
}

/// HostType is the candidate type carried after `typ`.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HostType {
    /// A local interface address.
    #[default]
    Host,
    /// An address learned from a STUN server.
    ServerReflexive,
    /// An address allocated on a TURN server.
    Relay,
}

impl HostType {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "host" => Ok(HostType::Host),
            "srflx" => Ok(HostType::ServerReflexive),
            "relay" => Ok(HostType::Relay),
            _ => Err(Error::UnknownHostType(raw.to_owned())),
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostType::Host => "host",
            HostType::ServerReflexive => "srflx",
            HostType::Relay => "relay",
        };
        write!(f, "{s}")
    }
}

/// RelatedAddress is the `raddr`/`rport` pair of reflexive and relayed
/// candidates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelatedAddress {
    pub address: String,
    pub port: u16,
}

/// Candidate is a single `a=candidate:` line, or the `a=end-of-candidates`
/// marker when `end_of_candidates` is set.
///
/// `related` is Some exactly when `host_type` is `ServerReflexive` or
/// `Relay`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    pub id: u64,
    pub component: u16,
    pub protocol: TransportProtocol,
    pub priority: u32,
    pub address: String,
    pub port: u16,
    pub host_type: HostType,
    pub tcp_type: Option<String>,
    pub related: Option<RelatedAddress>,
    pub generation: Option<u32>,
    pub end_of_candidates: bool,
}

impl Candidate {
    pub fn end_of_candidates() -> Self {
        Candidate {
            end_of_candidates: true,
            ..Default::default()
        }
    }

    /// decode parses the value of an `a=candidate:` line.
    ///
    /// ```text
    /// 1467250027 1 udp 2122260223 192.168.0.196 46243 typ host generation 0
    /// 435653019 1 tcp 1845501695 192.168.0.196 0 typ host tcptype active generation 0
    /// 1853887674 1 udp 1518280447 47.61.61.61 36768 typ srflx raddr 192.168.0.196 rport 36768 generation 0
    /// ```
    pub fn decode(value: &str) -> Result<Self> {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        if tokens.len() < CANDIDATE_MIN_TOKENS || tokens[6] != "typ" {
            return Err(Error::line_format(CANDIDATE_PATTERN, value));
        }

        let protocol = TransportProtocol::parse(tokens[2])
            .ok_or_else(|| Error::line_format(CANDIDATE_PATTERN, value))?;
        let host_type = HostType::parse(tokens[7])?;

        let mut candidate = Candidate {
            id: parse_u64(tokens[0])?,
            component: parse_u16(tokens[1])?,
            protocol,
            priority: parse_u32(tokens[3])?,
            address: tokens[4].to_owned(),
            port: parse_u16(tokens[5])?,
            host_type,
            ..Default::default()
        };

        let mut cursor = CANDIDATE_MIN_TOKENS;
        match (host_type, protocol) {
            (HostType::Host, TransportProtocol::Udp) => {}
            (HostType::Host, TransportProtocol::Tcp) => {
                if let Some(tcp_type) = keyed_value(&tokens, cursor, TCP_TYPE_KEY, value)? {
                    candidate.tcp_type = Some(tcp_type.to_owned());
                    cursor += 2;
                }
            }
            (HostType::ServerReflexive | HostType::Relay, _) => {
                let address = keyed_value(&tokens, cursor, RELATED_ADDRESS_KEY, value)?
                    .ok_or_else(|| Error::line_format(CANDIDATE_PATTERN, value))?;
                let port = keyed_value(&tokens, cursor + 2, RELATED_PORT_KEY, value)?
                    .ok_or_else(|| Error::line_format(CANDIDATE_PATTERN, value))?;
                candidate.related = Some(RelatedAddress {
                    address: address.to_owned(),
                    port: parse_u16(port)?,
                });
                cursor += 4;
            }
        }

        if let Some(generation) = keyed_value(&tokens, cursor, GENERATION_KEY, value)? {
            candidate.generation = Some(parse_u32(generation)?);
        }

        Ok(candidate)
    }
}

/// keyed_value returns the token after `key` when `key` sits at `at`.
fn keyed_value<'a>(
    tokens: &[&'a str],
    at: usize,
    key: &str,
    value: &str,
) -> Result<Option<&'a str>> {
    match tokens.get(at) {
        Some(&k) if k == key => tokens
            .get(at + 1)
            .copied()
            .map(Some)
            .ok_or_else(|| Error::line_format(CANDIDATE_PATTERN, value)),
        _ => Ok(None),
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} typ {}",
            self.id,
            self.component,
            self.protocol,
            self.priority,
            self.address,
            self.port,
            self.host_type,
        )?;

        match self.host_type {
            HostType::Host => {
                if self.protocol == TransportProtocol::Tcp {
                    if let Some(tcp_type) = &self.tcp_type {
                        write!(f, " {TCP_TYPE_KEY} {tcp_type}")?;
                    }
                }
            }
            HostType::ServerReflexive | HostType::Relay => {
                if let Some(related) = &self.related {
                    write!(
                        f,
                        " {RELATED_ADDRESS_KEY} {} {RELATED_PORT_KEY} {}",
                        related.address, related.port
                    )?;
                }
            }
        }

        if let Some(generation) = self.generation {
            write!(f, " {GENERATION_KEY} {generation}")?;
        }

        Ok(())
    }
}

/// Ice holds the ICE credentials, options and candidates of a media
/// section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ice {
    pub ufrag: String,
    pub pwd: String,
    /// Raw `a=ice-options:` value, e.g. `trickle` or `trickle,renomination`.
    pub options: String,
    pub identity: String,
    /// In source order; an end-of-candidates marker is always last.
    pub candidates: Vec<Candidate>,
}

impl Ice {
    /// decode handles the `a=ice-*` credential and option lines.
    pub(crate) fn decode(&mut self, line: &Line<'_>) -> Result<()> {
        if !line.has(ATTR_ICE) && !line.has(ATTR_IDENTITY) {
            return Err(Error::UnrecognizedAttribute(line.to_string()));
        }

        if let Some(fields) = line.decode_if_has(ATTR_ICE_UFRAG, "a=ice-ufrag:%s") {
            let [ufrag] = fields?;
            self.ufrag = ufrag.to_owned();
        } else if let Some(fields) = line.decode_if_has(ATTR_ICE_PWD, "a=ice-pwd:%s") {
            let [pwd] = fields?;
            self.pwd = pwd.to_owned();
        } else if let Some(fields) = line.decode_if_has::<1>(ATTR_ICE_OPTIONS, "a=ice-options:%s") {
            fields?;
            // options may be space separated, keep all of them
            self.options = line
                .value_after(ATTR_ICE_OPTIONS)
                .unwrap_or_default()
                .trim()
                .to_owned();
        } else if let Some(fields) = line.decode_if_has(ATTR_ICE_IDENTITY, "a=ice-identity:%s") {
            let [identity] = fields?;
            self.identity = identity.to_owned();
        } else {
            return Err(Error::UnrecognizedAttribute(line.to_string()));
        }

        Ok(())
    }

    /// decode_candidate appends the candidate carried by an `a=candidate:`
    /// or `a=end-of-candidates` line.
    pub(crate) fn decode_candidate(&mut self, line: &Line<'_>) -> Result<()> {
        if self.is_complete() {
            log::debug!("dropping candidate after end-of-candidates: {line}");
            return Ok(());
        }

        if line.has(ATTR_END_OF_CANDIDATES) {
            self.candidates.push(Candidate::end_of_candidates());
            return Ok(());
        }

        let value = line
            .value_after(ATTR_CANDIDATE)
            .ok_or_else(|| Error::line_format(CANDIDATE_PATTERN, line.as_str()))?;
        self.candidates.push(Candidate::decode(value)?);

        Ok(())
    }

    /// is_complete reports whether an end-of-candidates marker was seen.
    pub fn is_complete(&self) -> bool {
        self.candidates.iter().any(|c| c.end_of_candidates)
    }

    /// has_trickle reports whether the options carry the trickle token.
    pub fn has_trickle(&self) -> bool {
        self.options
            .split(|c: char| c == ',' || c.is_whitespace())
            .any(|o| o == ICE_OPTION_TRICKLE)
    }

    /// write_candidates emits every candidate up to and including the first
    /// end-of-candidates marker.
    pub fn write_candidates<W: fmt::Write>(&self, writer: &mut W) -> fmt::Result {
        for candidate in &self.candidates {
            if candidate.end_of_candidates {
                return write!(writer, "{ATTR_END_OF_CANDIDATES}{END_LINE}");
            }
            write!(writer, "{ATTR_CANDIDATE}{candidate}{END_LINE}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Ice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key_value(f, ATTR_ICE_UFRAG, &self.ufrag)?;
        write_key_value(f, ATTR_ICE_PWD, &self.pwd)?;
        write_key_value(f, ATTR_ICE_OPTIONS, &self.options)?;
        write_key_value(f, ATTR_ICE_IDENTITY, &self.identity)
    }
}
