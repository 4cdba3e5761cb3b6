use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::common::*;
use super::media::Media;
use crate::error::{Error, LineError, Result};
use crate::lexer::{
    append, parse_u32, parse_u64, split_lines, write_key_slice_of_values, write_key_value, Line, Unset,
    END_LINE,
};

const MAX_BUNDLE_MIDS: usize = 3;
const MAX_LS_MIDS: usize = 2;

/// Origin defines the structure for the "o=" field which provides the
/// originator of the session plus a session identifier and version number.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Origin {
    pub username: String,
    pub session_id: u64,
    pub session_version: u64,
    pub network_type: String,
    pub address_type: String,
    pub unicast_address: String,
}

impl Origin {
    pub(crate) fn decode(line: &Line<'_>) -> Result<Self> {
        let [username, session_id, session_version, network_type, address_type, unicast_address] =
            line.decode("o=%s %d %d %s %s %s")?;

        Ok(Origin {
            username: username.to_owned(),
            session_id: parse_u64(session_id)?,
            session_version: parse_u64(session_version)?,
            network_type: network_type.to_owned(),
            address_type: address_type.to_owned(),
            unicast_address: unicast_address.to_owned(),
        })
    }
}

impl Unset for Origin {
    fn is_unset(&self) -> bool {
        self.username.is_empty()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.username,
            self.session_id,
            self.session_version,
            self.network_type,
            self.address_type,
            self.unicast_address,
        )
    }
}

/// Timing defines the "t=" field's structured representation for the start and
/// stop times.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    pub start_time: u64,
    pub stop_time: u64,
}

impl Timing {
    pub(crate) fn decode(line: &Line<'_>) -> Result<Self> {
        let [start_time, stop_time] = line.decode("t=%d %d")?;
        Ok(Timing {
            start_time: parse_u64(start_time)?,
            stop_time: parse_u64(stop_time)?,
        })
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start_time, self.stop_time)
    }
}

/// Session is the structured form of a WebRTC session description.
///
/// ```text
/// v=0
/// o=- 4611731400430051336 2 IN IP4 127.0.0.1
/// s=-
/// t=0 0
/// a=group:BUNDLE 0 1
/// a=msid-semantic: WMS lgsCFqt9kN2fVKw5wg3NKqGdATQoltEwOdMS
/// m=audio 9 UDP/TLS/RTP/SAVPF 111
/// ...
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Session {
    /// v=0
    pub version: u32,
    pub origin: Origin,
    pub session_name: String,
    /// Session level `c=`, absent when every media section carries its own.
    pub connection: Option<Connection>,
    pub timing: Timing,
    /// At most three mids.
    pub group_bundle: Vec<String>,
    /// At most two mids.
    pub group_ls: Vec<String>,
    pub ice_trickle: bool,
    pub identity: String,
    /// The stream id following `WMS` in `a=msid-semantic:`.
    pub msid_semantic: String,
    /// Media sections in document order.
    pub media: Vec<Media>,
}

/// Decoded is the outcome of a best-effort decode: the session as far as
/// it could be recovered and every line that failed along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub session: Session,
    pub errors: Vec<LineError>,
}

impl Decoded {
    /// into_result discards the partial session when any line failed.
    pub fn into_result(self) -> Result<Session> {
        if self.errors.is_empty() {
            Ok(self.session)
        } else {
            Err(Error::Decode(self.errors.into()))
        }
    }
}

/// Session level lines that also apply to every media section. They are
/// held back until all sections exist.
enum Deferred<'a> {
    Fingerprint(Line<'a>),
    IceOptions(Line<'a>),
}

impl Session {
    /// decode parses an SDP document, continuing past line level failures.
    ///
    /// The only fatal conditions are an empty document and an `m=` section
    /// whose media type is not audio, video or application. Every other
    /// failure is recorded in [`Decoded::errors`] with its line number.
    pub fn decode(text: &str) -> Result<Decoded> {
        let lines = split_lines(text);
        if lines.is_empty() {
            return Err(Error::EmptyDescription);
        }

        let first_media = lines
            .iter()
            .position(|l| l.as_str().starts_with("m="))
            .unwrap_or(lines.len());
        let (global, rest) = lines.split_at(first_media);

        let mut sections: Vec<(Media, &[Line<'_>])> = vec![];
        for section in split_sections(rest) {
            let media = Media::from_header(&section[0])?;
            log::debug!(
                "line {}: {} media section",
                section[0].number(),
                media.kind()
            );
            sections.push((media, section));
        }

        let mut session = Session::default();
        let mut errors = vec![];
        let mut deferred = vec![];

        for line in global {
            match session.decode_global_line(line) {
                Ok(Some(d)) => deferred.push(d),
                Ok(None) => {}
                Err(err) => record(&mut errors, line, err),
            }
        }

        for (mut media, section) in sections {
            for line in section {
                if let Err(err) = media.decode_line(line) {
                    record(&mut errors, line, err);
                }
            }
            session.media.push(media);
        }

        for d in &deferred {
            session.broadcast(d, &mut errors);
        }

        Ok(Decoded { session, errors })
    }

    /// unmarshal is [`Session::decode`] that fails on any line error.
    pub fn unmarshal(text: &str) -> Result<Self> {
        Session::decode(text)?.into_result()
    }

    /// marshal encodes the session in canonical order.
    pub fn marshal(&self) -> String {
        self.to_string()
    }

    pub fn media_by_mid(&self, mid: &str) -> Option<&Media> {
        self.media.iter().find(|m| m.mid() == mid)
    }

    /// has_trickle reports whether trickle ICE was announced at session
    /// level or by any media section.
    pub fn has_trickle(&self) -> bool {
        self.ice_trickle || self.media.iter().any(|m| m.base().ice.has_trickle())
    }

    fn decode_global_line<'a>(&mut self, line: &Line<'a>) -> Result<Option<Deferred<'a>>> {
        match line.kind() {
            Some('v') => {
                let [version] = line.decode("v=%d")?;
                if version != "0" {
                    return Err(Error::InvalidVersion(version.to_owned()));
                }
                self.version = parse_u32(version)?;
            }
            Some('o') => self.origin = Origin::decode(line)?,
            Some('s') => {
                self.session_name = line.value_after("s=").unwrap_or_default().trim().to_owned();
            }
            Some('t') => self.timing = Timing::decode(line)?,
            Some('c') => self.connection = Some(Connection::decode(line)?),
            Some('a') => return self.decode_global_attribute(line),
            _ => return Err(Error::UnrecognizedAttribute(line.to_string())),
        }

        Ok(None)
    }

    fn decode_global_attribute<'a>(&mut self, line: &Line<'a>) -> Result<Option<Deferred<'a>>> {
        if line.has(ATTR_GROUP) {
            self.decode_group(line)?;
        } else if line.has(ATTR_MSID_SEMANTIC) {
            let value = line.value_after(ATTR_MSID_SEMANTIC).unwrap_or_default().trim();
            let id = value
                .strip_prefix(SEMANTIC_TOKEN_WEBRTC_MEDIA_STREAMS)
                .ok_or_else(|| Error::line_format("a=msid-semantic: WMS %s", line.as_str()))?;
            self.msid_semantic = id.trim().to_owned();
        } else if line.has(ATTR_FINGERPRINT) {
            line.decode::<2>("a=fingerprint:%s %s")?;
            return Ok(Some(Deferred::Fingerprint(*line)));
        } else if line.has(ATTR_ICE_OPTIONS) {
            line.decode::<1>("a=ice-options:%s")?;
            let options = line.value_after(ATTR_ICE_OPTIONS).unwrap_or_default();
            self.ice_trickle = options
                .split(|c: char| c == ',' || c.is_whitespace())
                .any(|o| o == ICE_OPTION_TRICKLE);
            return Ok(Some(Deferred::IceOptions(*line)));
        } else if line.has(ATTR_IDENTITY) {
            let [identity] = line.decode("a=identity:%s")?;
            self.identity = identity.to_owned();
        } else {
            return Err(Error::UnrecognizedAttribute(line.to_string()));
        }

        Ok(None)
    }

    fn decode_group(&mut self, line: &Line<'_>) -> Result<()> {
        let mut tokens = line.value_after(ATTR_GROUP).unwrap_or_default().split_whitespace();
        let (target, limit) = match tokens.next() {
            Some(SEMANTIC_TOKEN_BUNDLE) => (&mut self.group_bundle, MAX_BUNDLE_MIDS),
            Some(SEMANTIC_TOKEN_LIP_SYNCHRONIZATION) => (&mut self.group_ls, MAX_LS_MIDS),
            _ => return Err(Error::UnrecognizedAttribute(line.to_string())),
        };

        let mids: Vec<String> = tokens.map(str::to_owned).collect();
        if mids.len() > limit {
            log::warn!(
                "line {}: keeping {limit} of {} mids in `{line}`",
                line.number(),
                mids.len()
            );
        }
        *target = mids.into_iter().take(limit).collect();

        Ok(())
    }

    /// broadcast applies a deferred session level line to every media
    /// section that did not declare the value itself.
    fn broadcast(&mut self, deferred: &Deferred<'_>, errors: &mut Vec<LineError>) {
        for media in &mut self.media {
            let (line, result) = match deferred {
                Deferred::Fingerprint(line) => {
                    if !media.base().dtls.fingerprint.is_empty() {
                        continue;
                    }
                    (line, media.decode_dtls_fingerprint(line))
                }
                Deferred::IceOptions(line) => {
                    if !media.base().ice.options.is_empty() {
                        continue;
                    }
                    (line, media.decode_ice_attribute(line))
                }
            };
            if let Err(err) = result {
                record(errors, line, err);
            }
        }
    }
}

/// split_sections cuts the lines following the session section at every
/// `m=` line.
fn split_sections<'l, 'a>(lines: &'l [Line<'a>]) -> Vec<&'l [Line<'a>]> {
    let mut sections = vec![];
    let mut start = 0;
    for (i, line) in lines.iter().enumerate().skip(1) {
        if line.as_str().starts_with("m=") {
            sections.push(&lines[start..i]);
            start = i;
        }
    }
    if start < lines.len() {
        sections.push(&lines[start..]);
    }
    sections
}

fn record(errors: &mut Vec<LineError>, line: &Line<'_>, error: Error) {
    log::debug!("line {}: {error}", line.number());
    errors.push(LineError {
        line_number: line.number(),
        text: line.to_string(),
        error,
    });
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v={}{END_LINE}", self.version)?;
        append(f, &self.origin, format_args!("o={}{END_LINE}", self.origin))?;
        write!(f, "s={}{END_LINE}", self.session_name)?;
        write!(f, "t={}{END_LINE}", self.timing)?;
        if let Some(connection) = &self.connection {
            write!(f, "c={connection}{END_LINE}")?;
        }

        write_key_slice_of_values(f, "a=group:BUNDLE ", &self.group_bundle)?;
        write_key_slice_of_values(f, "a=group:LS ", &self.group_ls)?;
        write_key_value(f, "a=msid-semantic: WMS ", &self.msid_semantic)?;
        write_key_value(f, ATTR_IDENTITY, &self.identity)?;
        if self.ice_trickle {
            write!(f, "{ATTR_ICE_OPTIONS}{ICE_OPTION_TRICKLE}{END_LINE}")?;
        }

        for media in &self.media {
            write!(f, "{media}")?;
        }

        Ok(())
    }
}

impl FromStr for Session {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Session::unmarshal(s)
    }
}

impl TryFrom<String> for Session {
    type Error = Error;

    fn try_from(sdp: String) -> Result<Self> {
        Session::unmarshal(&sdp)
    }
}

impl From<Session> for String {
    fn from(session: Session) -> String {
        session.marshal()
    }
}
