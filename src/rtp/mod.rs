
use std::fmt;

use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::description::common::*;
use crate::error::{Error, RecordKind, Result};
use crate::lexer::{append, Line, END_LINE};

/// Payload type of `a=rtcp-fb:* ...`, feedback that applies to every format.
pub const WILDCARD_PAYLOAD_TYPE: &str = "*";

/// RtpTable maps a payload type to its parameters, in first-seen order.
pub type RtpTable = IndexMap<String, RtpParams>;

/// RtpParams collects everything declared for one payload type.
///
/// ```text
/// a=rtpmap:111 opus/48000/2
/// a=rtcp-fb:111 transport-cc
/// a=fmtp:111 minptime=10; useinbandfec=1
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RtpParams {
    /// `<encoding name>/<clock rate>[/<encoding parameters>]`
    pub codec: String,
    pub feedback: Vec<String>,
    pub format_params: String,
}

impl RtpParams {
    pub fn codec_name(&self) -> &str {
        self.codec.split('/').next().unwrap_or_default()
    }

    pub fn clock_rate(&self) -> Result<Option<u32>> {
        match self.codec.split('/').nth(1) {
            Some(rate) => Ok(Some(rate.parse::<u32>()?)),
            None => Ok(None),
        }
    }

    pub fn encoding_parameters(&self) -> Option<&str> {
        self.codec.split('/').nth(2)
    }

    fn push_format_params(&mut self, params: &str) {
        if !self.format_params.is_empty() {
            self.format_params.push(' ');
        }
        self.format_params.push_str(params);
    }
}

/// decode_rtp_line applies an `a=rtpmap:`, `a=rtcp-fb:` or `a=fmtp:` line to
/// the table of a media section of the given kind.
pub(crate) fn decode_rtp_line(table: &mut RtpTable, kind: MediaKind, line: &Line<'_>) -> Result<()> {
    if kind == MediaKind::Application {
        return Err(Error::UnknownMediaType(kind.to_string()));
    }

    if let Some(fields) = line.decode_if_has(ATTR_RTPMAP, "a=rtpmap:%s %s") {
        let [payload_type, codec] = fields?;
        table.entry(payload_type.to_owned()).or_default().codec = codec.to_owned();
        return Ok(());
    }

    if let Some(fields) = line.decode_if_has(ATTR_RTCP_FB, "a=rtcp-fb:%s %s") {
        let [payload_type, mechanism] = fields?;
        let feedback = match kind {
            MediaKind::Video => remainder_after_key(line, ATTR_RTCP_FB).unwrap_or(mechanism),
            _ => mechanism,
        };
        table
            .entry(payload_type.to_owned())
            .or_default()
            .feedback
            .push(feedback.to_owned());
        return Ok(());
    }

    if line.has(ATTR_FMTP) {
        let [payload_type] = line.decode("a=fmtp:%s")?;
        let params = line
            .value_after(ATTR_FMTP)
            .unwrap_or_default()
            .split_whitespace()
            .skip(1)
            .collect::<Vec<_>>()
            .join(" ");

        let record = match kind {
            MediaKind::Audio => table
                .get_mut(payload_type)
                .ok_or_else(|| Error::missing_record(RecordKind::PayloadType, payload_type))?,
            _ if params.is_empty() => return Ok(()),
            _ => table.entry(payload_type.to_owned()).or_default(),
        };
        if !params.is_empty() {
            record.push_format_params(&params);
        }
        return Ok(());
    }

    Err(Error::UnrecognizedAttribute(line.to_string()))
}

/// remainder_after_key returns the text that follows `<marker><key> `.
fn remainder_after_key<'a>(line: &Line<'a>, marker: &str) -> Option<&'a str> {
    line.value_after(marker)
        .and_then(|rest| rest.split_once(char::is_whitespace))
        .map(|(_, remainder)| remainder.trim())
}

/// RtpLines encodes a table as its rtpmap, rtcp-fb and fmtp lines.
pub struct RtpLines<'a>(pub &'a RtpTable);

impl fmt::Display for RtpLines<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (payload_type, params) in self.0 {
            append(
                f,
                &params.codec,
                format_args!("{ATTR_RTPMAP}{payload_type} {}{END_LINE}", params.codec),
            )?;
            for feedback in &params.feedback {
                write!(f, "{ATTR_RTCP_FB}{payload_type} {feedback}{END_LINE}")?;
            }
            append(
                f,
                &params.format_params,
                format_args!("{ATTR_FMTP}{payload_type} {}{END_LINE}", params.format_params),
            )?;
        }
        Ok(())
    }
}
