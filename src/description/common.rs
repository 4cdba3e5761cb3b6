use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lexer::{Line, Unset};

/// Line markers recognised by the session and media dispatchers.
pub const ATTR_GROUP: &str = "a=group:";
pub const ATTR_MSID_SEMANTIC: &str = "a=msid-semantic:";
pub const ATTR_IDENTITY: &str = "a=identity:";
pub const ATTR_ICE: &str = "a=ice";
pub const ATTR_ICE_UFRAG: &str = "a=ice-ufrag:";
pub const ATTR_ICE_PWD: &str = "a=ice-pwd:";
pub const ATTR_ICE_OPTIONS: &str = "a=ice-options:";
pub const ATTR_ICE_IDENTITY: &str = "a=ice-identity:";
pub const ATTR_FINGERPRINT: &str = "a=fingerprint:";
pub const ATTR_SETUP: &str = "a=setup:";
pub const ATTR_CONNECTION: &str = "a=connection:";
pub const ATTR_TLS_ID: &str = "a=tls-id:";
pub const ATTR_RTCP: &str = "a=rtcp:";
pub const ATTR_RTCP_RSIZE: &str = "a=rtcp-rsize";
pub const ATTR_RTCP_MUX: &str = "a=rtcp-mux";
pub const ATTR_RTCP_MUX_ONLY: &str = "a=rtcp-mux-only";
pub const ATTR_BUNDLE_ONLY: &str = "a=bundle-only";
pub const ATTR_MID: &str = "a=mid:";
pub const ATTR_MSID: &str = "a=msid:";
pub const ATTR_EXTMAP: &str = "a=extmap:";
pub const ATTR_RTPMAP: &str = "a=rtpmap:";
pub const ATTR_RTCP_FB: &str = "a=rtcp-fb:";
pub const ATTR_FMTP: &str = "a=fmtp:";
pub const ATTR_MAXPTIME: &str = "a=maxptime:";
pub const ATTR_SSRC: &str = "a=ssrc:";
pub const ATTR_SSRC_GROUP: &str = "a=ssrc-group:";
pub const ATTR_CANDIDATE: &str = "a=candidate:";
pub const ATTR_END_OF_CANDIDATES: &str = "a=end-of-candidates";
pub const ATTR_SCTP_PORT: &str = "a=sctp-port:";
pub const ATTR_MAX_MESSAGE_SIZE: &str = "a=max-message-size:";
pub const ATTR_SCTPMAP: &str = "a=sctpmap:";

/// Constants for semantic tokens used in JSEP
pub const SEMANTIC_TOKEN_BUNDLE: &str = "BUNDLE";
pub const SEMANTIC_TOKEN_LIP_SYNCHRONIZATION: &str = "LS";
pub const SEMANTIC_TOKEN_FLOW_IDENTIFICATION: &str = "FID";
pub const SEMANTIC_TOKEN_WEBRTC_MEDIA_STREAMS: &str = "WMS";

pub const ICE_OPTION_TRICKLE: &str = "trickle";

/// MediaKind is the media type token of an `m=` line.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MediaKind {
    #[default]
    Audio,
    Video,
    Application,
}

pub(crate) const MEDIA_AUDIO_STR: &str = "audio";
pub(crate) const MEDIA_VIDEO_STR: &str = "video";
pub(crate) const MEDIA_APPLICATION_STR: &str = "application";

impl MediaKind {
    pub fn new(raw: &str) -> Option<Self> {
        match raw {
            MEDIA_AUDIO_STR => Some(MediaKind::Audio),
            MEDIA_VIDEO_STR => Some(MediaKind::Video),
            MEDIA_APPLICATION_STR => Some(MediaKind::Application),
            _ => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MediaKind::Audio => MEDIA_AUDIO_STR,
            MediaKind::Video => MEDIA_VIDEO_STR,
            MediaKind::Application => MEDIA_APPLICATION_STR,
        };
        write!(f, "{s}")
    }
}

/// Connection describes the `c=<nettype> <addrtype> <connection-address>`
/// line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connection {
    pub network_type: String,
    pub address_type: String,
    pub address: String,
}

impl Connection {
    pub(crate) fn decode(line: &Line<'_>) -> Result<Self> {
        let [network_type, address_type, address] = line.decode("c=%s %s %s")?;
        Ok(Connection {
            network_type: network_type.to_owned(),
            address_type: address_type.to_owned(),
            address: address.to_owned(),
        })
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.network_type, self.address_type, self.address
        )
    }
}

impl Unset for Connection {
    fn is_unset(&self) -> bool {
        self.network_type.is_empty()
    }
}

/// Rtcp is the explicit RTCP endpoint of `a=rtcp:<port> [<nettype>
/// <addrtype> <address>]`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rtcp {
    pub port: String,
    pub network_type: String,
    pub address_type: String,
    pub address: String,
}

impl Rtcp {
    pub(crate) fn decode(line: &Line<'_>) -> Result<Self> {
        if let Ok([port, network_type, address_type, address]) =
            line.decode("a=rtcp:%d %s %s %s")
        {
            return Ok(Rtcp {
                port: port.to_owned(),
                network_type: network_type.to_owned(),
                address_type: address_type.to_owned(),
                address: address.to_owned(),
            });
        }

        let [port] = line.decode("a=rtcp:%d")?;
        Ok(Rtcp {
            port: port.to_owned(),
            ..Default::default()
        })
    }
}

impl fmt::Display for Rtcp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.network_type.is_empty() {
            write!(f, "{}", self.port)
        } else {
            write!(
                f,
                "{} {} {} {}",
                self.port, self.network_type, self.address_type, self.address
            )
        }
    }
}

impl Unset for Rtcp {
    fn is_unset(&self) -> bool {
        self.port.is_empty()
    }
}

/// ExtMap is one `a=extmap:<value>[/<direction>] <uri> [<attributes>]`
/// line, kept as the key token and the verbatim remainder.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExtMap {
    pub key: String,
    pub value: String,
}

impl ExtMap {
    pub(crate) fn decode(line: &Line<'_>) -> Result<Self> {
        let [key, _] = line.decode("a=extmap:%s %s")?;
        let value = line
            .value_after(ATTR_EXTMAP)
            .and_then(|rest| rest.split_once(char::is_whitespace))
            .map(|(_, value)| value.trim())
            .ok_or_else(|| Error::line_format("a=extmap:%s %s", line.as_str()))?;

        Ok(ExtMap {
            key: key.to_owned(),
            value: value.to_owned(),
        })
    }
}

impl fmt::Display for ExtMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.key, self.value)
    }
}

/// ConnectionRole indicates which of the end points should initiate the connection establishment
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConnectionRole {
    #[default]
    Unspecified,

    /// ConnectionRoleActive indicates the endpoint will initiate an outgoing connection.
    Active,

    /// ConnectionRolePassive indicates the endpoint will accept an incoming connection.
    Passive,

    /// ConnectionRoleActpass indicates the endpoint is willing to accept an incoming connection or to initiate an outgoing connection.
    Actpass,

    /// ConnectionRoleHoldconn indicates the endpoint does not want the connection to be established for the time being.
    Holdconn,
}

const CONNECTION_ROLE_ACTIVE_STR: &str = "active";
const CONNECTION_ROLE_PASSIVE_STR: &str = "passive";
const CONNECTION_ROLE_ACTPASS_STR: &str = "actpass";
const CONNECTION_ROLE_HOLDCONN_STR: &str = "holdconn";

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionRole::Active => CONNECTION_ROLE_ACTIVE_STR,
            ConnectionRole::Passive => CONNECTION_ROLE_PASSIVE_STR,
            ConnectionRole::Actpass => CONNECTION_ROLE_ACTPASS_STR,
            ConnectionRole::Holdconn => CONNECTION_ROLE_HOLDCONN_STR,
            _ => "Unspecified",
        };
        write!(f, "{s}")
    }
}

impl From<&str> for ConnectionRole {
    fn from(raw: &str) -> Self {
        match raw {
            CONNECTION_ROLE_ACTIVE_STR => ConnectionRole::Active,
            CONNECTION_ROLE_PASSIVE_STR => ConnectionRole::Passive,
            CONNECTION_ROLE_ACTPASS_STR => ConnectionRole::Actpass,
            CONNECTION_ROLE_HOLDCONN_STR => ConnectionRole::Holdconn,
            _ => ConnectionRole::Unspecified,
        }
    }
}

impl Unset for ConnectionRole {
    fn is_unset(&self) -> bool {
        *self == ConnectionRole::Unspecified
    }
}
