use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::common::*;
use crate::direction::Direction;
use crate::dtls::Dtls;
use crate::error::{Error, Result};
use crate::ice::Ice;
use crate::lexer::{parse_u32, write_flag, write_key_value, Line, END_LINE};
use crate::rtp::{decode_rtp_line, RtpLines, RtpTable, WILDCARD_PAYLOAD_TYPE};
use crate::sctp::SctpMap;
use crate::ssrc::{decode_ssrc_line, SsrcLines, SsrcTable};

/// MediaBase holds the attributes shared by every kind of media section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MediaBase {
    // m=<media> <port> <proto> <fmt> ...
    pub kind: MediaKind,
    pub port: String,
    pub proto: String,
    /// The single format token of a data channel, e.g. `webrtc-datachannel`.
    /// Audio and video carry their formats as the keys of the RTP table.
    pub format: String,

    pub connection: Connection,
    pub rtcp: Rtcp,
    pub rtcp_rsize: bool,
    pub mode: Direction,
    pub rtcp_mux: bool,
    pub rtcp_mux_only: bool,
    pub bundle_only: bool,
    pub ice: Ice,
    pub dtls: Dtls,
    pub mid: String,
    pub ssrcs: SsrcTable,
    /// `<stream id> [<track id>]` of `a=msid:`.
    pub msid: String,
}

impl MediaBase {
    fn new(kind: MediaKind) -> Self {
        MediaBase {
            kind,
            ..Default::default()
        }
    }

    /// decode_line applies the lines every media kind understands. None
    /// means the line is not one of them.
    fn decode_line(&mut self, line: &Line<'_>) -> Option<Result<()>> {
        if line.kind() == Some('c') {
            return Some(Connection::decode(line).map(|c| self.connection = c));
        }
        if line.has(ATTR_RTCP) {
            return Some(Rtcp::decode(line).map(|r| self.rtcp = r));
        }
        if line.has(ATTR_RTCP_RSIZE) {
            self.rtcp_rsize = true;
            return Some(Ok(()));
        }
        if line.has(ATTR_ICE) {
            return Some(self.ice.decode(line));
        }
        if line.has(ATTR_FINGERPRINT)
            || line.has(ATTR_SETUP)
            || line.has(ATTR_CONNECTION)
            || line.has(ATTR_TLS_ID)
        {
            return Some(self.dtls.decode(line));
        }
        if let Some(fields) = line.decode_if_has(ATTR_MID, "a=mid:%s") {
            return Some(fields.map(|[mid]| self.mid = mid.to_owned()));
        }
        if let Some(msid) = line.value_after(ATTR_MSID) {
            self.msid = msid.trim().to_owned();
            return Some(Ok(()));
        }

        let mode = line
            .as_str()
            .strip_prefix("a=")
            .map(Direction::new)
            .unwrap_or_default();
        if mode != Direction::Unspecified {
            self.mode = mode;
            return Some(Ok(()));
        }

        if line.has(ATTR_RTCP_MUX_ONLY) {
            self.rtcp_mux_only = true;
            return Some(Ok(()));
        }
        if line.has(ATTR_RTCP_MUX) {
            self.rtcp_mux = true;
            return Some(Ok(()));
        }
        if line.has(ATTR_BUNDLE_ONLY) {
            self.bundle_only = true;
            return Some(Ok(()));
        }

        None
    }

    /// decode_trailing_line applies the lines that come after the
    /// kind-specific ones in dispatch order.
    fn decode_trailing_line(&mut self, line: &Line<'_>) -> Option<Result<()>> {
        if line.has(ATTR_SSRC) || line.has(ATTR_SSRC_GROUP) {
            return Some(decode_ssrc_line(&mut self.ssrcs, line));
        }
        if line.has(ATTR_CANDIDATE) || line.has(ATTR_END_OF_CANDIDATES) {
            return Some(self.ice.decode_candidate(line));
        }
        None
    }

    fn write_attributes<W: fmt::Write>(&self, f: &mut W) -> fmt::Result {
        write_key_value(f, "c=", &self.connection)?;
        write_key_value(f, ATTR_MID, &self.mid)?;
        write_key_value(f, ATTR_MSID, &self.msid)?;
        write_key_value(f, "a=", self.mode)?;
        write_key_value(f, ATTR_RTCP, &self.rtcp)?;
        write_flag(f, ATTR_RTCP_RSIZE, self.rtcp_rsize)?;
        write_flag(f, ATTR_RTCP_MUX, self.rtcp_mux)?;
        write_flag(f, ATTR_RTCP_MUX_ONLY, self.rtcp_mux_only)?;
        write_flag(f, ATTR_BUNDLE_ONLY, self.bundle_only)
    }

    fn write_transport<W: fmt::Write>(&self, f: &mut W) -> fmt::Result {
        write!(f, "{}", self.ice)?;
        write!(f, "{}", self.dtls)
    }

    fn write_sources<W: fmt::Write>(&self, f: &mut W) -> fmt::Result {
        write!(f, "{}", SsrcLines(&self.ssrcs))?;
        self.ice.write_candidates(f)
    }
}

/// AvMedia is an audio or video media section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AvMedia {
    pub base: MediaBase,
    pub ext_maps: Vec<ExtMap>,
    pub rtp: RtpTable,
    pub max_ptime: String,
}

impl AvMedia {
    pub fn new(kind: MediaKind) -> Self {
        AvMedia {
            base: MediaBase::new(kind),
            ..Default::default()
        }
    }

    fn decode_line(&mut self, line: &Line<'_>) -> Option<Result<()>> {
        if line.kind() == Some('m') {
            return Some(self.decode_media_line(line));
        }
        if let Some(result) = self.base.decode_line(line) {
            return Some(result);
        }
        if line.has(ATTR_EXTMAP) {
            return Some(ExtMap::decode(line).map(|e| self.ext_maps.push(e)));
        }
        if line.has(ATTR_RTPMAP) || line.has(ATTR_RTCP_FB) || line.has(ATTR_FMTP) {
            return Some(decode_rtp_line(&mut self.rtp, self.base.kind, line));
        }
        if let Some(fields) = line.decode_if_has(ATTR_MAXPTIME, "a=maxptime:%s") {
            return Some(fields.map(|[max_ptime]| self.max_ptime = max_ptime.to_owned()));
        }
        self.base.decode_trailing_line(line)
    }

    /// decode_media_line reads `m=<media> <port> <proto> <fmt> ...`. Every
    /// listed format gets an empty RTP record so that the table keeps the
    /// order of the `m=` line.
    fn decode_media_line(&mut self, line: &Line<'_>) -> Result<()> {
        let [_, port, proto, _] = line.decode("m=%s %s %s %s")?;
        self.base.port = port.to_owned();
        self.base.proto = proto.to_owned();

        for format in line.as_str().split_whitespace().skip(3) {
            self.rtp.entry(format.to_owned()).or_default();
        }

        Ok(())
    }
}

impl fmt::Display for AvMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = &self.base;
        write!(f, "m={} {} {}", base.kind, base.port, base.proto)?;
        for format in self.rtp.keys().filter(|k| k.as_str() != WILDCARD_PAYLOAD_TYPE) {
            write!(f, " {format}")?;
        }
        write!(f, "{END_LINE}")?;

        base.write_attributes(f)?;
        write_key_value(f, ATTR_MAXPTIME, &self.max_ptime)?;
        base.write_transport(f)?;
        for ext_map in &self.ext_maps {
            write!(f, "{ATTR_EXTMAP}{ext_map}{END_LINE}")?;
        }
        write!(f, "{}", RtpLines(&self.rtp))?;
        base.write_sources(f)
    }
}

/// DataChannel is an `m=application` section carrying SCTP over DTLS.
///
/// ```text
/// m=application 9 UDP/DTLS/SCTP webrtc-datachannel
/// a=sctp-port:5000
/// a=max-message-size:262144
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataChannel {
    pub base: MediaBase,
    pub sctp_map: SctpMap,
    pub sctp_port: Option<u32>,
    pub max_message_size: Option<u32>,
}

impl Default for DataChannel {
    fn default() -> Self {
        DataChannel {
            base: MediaBase::new(MediaKind::Application),
            sctp_map: SctpMap::default(),
            sctp_port: None,
            max_message_size: None,
        }
    }
}

impl DataChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_line(&mut self, line: &Line<'_>) -> Option<Result<()>> {
        if line.kind() == Some('m') {
            return Some(self.decode_media_line(line));
        }
        if let Some(result) = self.base.decode_line(line) {
            return Some(result);
        }
        if let Some(fields) = line.decode_if_has(ATTR_SCTP_PORT, "a=sctp-port:%d") {
            return Some(decode_u32(fields).map(|port| self.sctp_port = Some(port)));
        }
        if let Some(fields) = line.decode_if_has(ATTR_MAX_MESSAGE_SIZE, "a=max-message-size:%d") {
            return Some(decode_u32(fields).map(|size| self.max_message_size = Some(size)));
        }
        if line.has(ATTR_SCTPMAP) {
            return Some(SctpMap::decode(line).map(|m| self.sctp_map = m));
        }
        self.base.decode_trailing_line(line)
    }

    fn decode_media_line(&mut self, line: &Line<'_>) -> Result<()> {
        let [_, port, proto, format] = line.decode("m=%s %s %s %s")?;
        self.base.port = port.to_owned();
        self.base.proto = proto.to_owned();
        self.base.format = format.to_owned();
        Ok(())
    }
}

fn decode_u32(fields: Result<[&str; 1]>) -> Result<u32> {
    let [value] = fields?;
    parse_u32(value)
}

impl fmt::Display for DataChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = &self.base;
        write!(
            f,
            "m={} {} {} {}{END_LINE}",
            base.kind, base.port, base.proto, base.format
        )?;

        base.write_attributes(f)?;
        if let Some(port) = self.sctp_port {
            write!(f, "{ATTR_SCTP_PORT}{port}{END_LINE}")?;
        }
        if let Some(size) = self.max_message_size {
            write!(f, "{ATTR_MAX_MESSAGE_SIZE}{size}{END_LINE}")?;
        }
        if !self.sctp_map.is_unset() {
            write!(f, "{ATTR_SCTPMAP}{}{END_LINE}", self.sctp_map)?;
        }
        base.write_transport(f)?;
        base.write_sources(f)
    }
}

/// Media is one `m=` section of a session, dispatched on its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Media {
    Av(AvMedia),
    DataChannel(DataChannel),
}

impl Media {
    /// new instantiates the variant that parses sections of `kind`.
    pub fn new(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Audio | MediaKind::Video => Media::Av(AvMedia::new(kind)),
            MediaKind::Application => Media::DataChannel(DataChannel::new()),
        }
    }

    /// from_header picks the variant for a section from the media token of
    /// its `m=` line.
    pub(crate) fn from_header(line: &Line<'_>) -> Result<Self> {
        let token = line
            .as_str()
            .strip_prefix("m=")
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or_default();
        MediaKind::new(token)
            .map(Media::new)
            .ok_or_else(|| Error::UnknownMediaType(token.to_owned()))
    }

    pub fn base(&self) -> &MediaBase {
        match self {
            Media::Av(m) => &m.base,
            Media::DataChannel(m) => &m.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut MediaBase {
        match self {
            Media::Av(m) => &mut m.base,
            Media::DataChannel(m) => &mut m.base,
        }
    }

    pub fn kind(&self) -> MediaKind {
        self.base().kind
    }

    pub fn mid(&self) -> &str {
        &self.base().mid
    }

    /// decode_line applies one line of this section. Lines no handler
    /// recognises are dropped.
    pub fn decode_line(&mut self, line: &Line<'_>) -> Result<()> {
        let handled = match self {
            Media::Av(m) => m.decode_line(line),
            Media::DataChannel(m) => m.decode_line(line),
        };
        match handled {
            Some(result) => result,
            None => {
                log::trace!("{} section drops line {}: {line}", self.kind(), line.number());
                Ok(())
            }
        }
    }

    /// decode_dtls_fingerprint applies a session level `a=fingerprint:` line.
    pub fn decode_dtls_fingerprint(&mut self, line: &Line<'_>) -> Result<()> {
        let [hash_algorithm, fingerprint] = line.decode("a=fingerprint:%s %s")?;
        let dtls = &mut self.base_mut().dtls;
        dtls.hash_algorithm = hash_algorithm.to_owned();
        dtls.fingerprint = fingerprint.to_owned();
        Ok(())
    }

    /// decode_ice_attribute applies a session level `a=ice-*` line.
    pub fn decode_ice_attribute(&mut self, line: &Line<'_>) -> Result<()> {
        self.base_mut().ice.decode(line)
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Media::Av(m) => write!(f, "{m}"),
            Media::DataChannel(m) => write!(f, "{m}"),
        }
    }
}
