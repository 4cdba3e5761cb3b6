
use std::fmt;

use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::description::common::*;
use crate::error::{Error, RecordKind, Result};
use crate::lexer::{Line, END_LINE};

const SSRC_KEY_CNAME: &str = "cname";
const SSRC_KEY_MSID: &str = "msid";
const SSRC_KEY_MSLABEL: &str = "mslabel";
const SSRC_KEY_LABEL: &str = "label";

/// SsrcTable maps a synchronization source id to its record, in the order
/// the ids were first declared.
pub type SsrcTable = IndexMap<String, Ssrc>;

/// Ssrc holds the source attributes of one synchronization source.
///
/// ```text
/// a=ssrc:65275558 cname:+0VBE2jiQiCaYE/E
/// a=ssrc:65275558 msid:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ fdfe23cd-ad58-4029-8011-126b1c245296
/// a=ssrc:65275558 mslabel:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ
/// a=ssrc:65275558 label:fdfe23cd-ad58-4029-8011-126b1c245296
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ssrc {
    pub cname: String,
    /// `<stream id> <track id>`
    pub msid: String,
    pub mslabel: String,
    pub label: String,
}

/// decode_ssrc_line applies an `a=ssrc:` or `a=ssrc-group:` line.
///
/// A `cname` line creates the record for its id; every other key requires
/// the record to exist already. Group lines carry nothing that is not
/// derived again on encode, so they are accepted and dropped.
pub(crate) fn decode_ssrc_line(table: &mut SsrcTable, line: &Line<'_>) -> Result<()> {
    if line.has(ATTR_SSRC_GROUP) {
        return Ok(());
    }
    if !line.has(ATTR_SSRC) {
        return Err(Error::UnrecognizedAttribute(line.to_string()));
    }

    let [id, _] = line.decode("a=ssrc:%s %s")?;
    let (key, value) = line
        .value_after(ATTR_SSRC)
        .and_then(|rest| rest.split_once(char::is_whitespace))
        .and_then(|(_, attribute)| attribute.trim().split_once(':'))
        .ok_or_else(|| Error::line_format("a=ssrc:%s <key>:<value>", line.as_str()))?;

    if key == SSRC_KEY_CNAME {
        table.insert(
            id.to_owned(),
            Ssrc {
                cname: value.to_owned(),
                ..Default::default()
            },
        );
        return Ok(());
    }

    if ![SSRC_KEY_MSID, SSRC_KEY_MSLABEL, SSRC_KEY_LABEL].contains(&key) {
        log::trace!("ignoring ssrc attribute `{key}` for {id}");
        return Ok(());
    }

    let ssrc = table
        .get_mut(id)
        .ok_or_else(|| Error::missing_record(RecordKind::Ssrc, id))?;
    match key {
        SSRC_KEY_MSID => ssrc.msid = value.to_owned(),
        SSRC_KEY_MSLABEL => ssrc.mslabel = value.to_owned(),
        _ => ssrc.label = value.to_owned(),
    }

    Ok(())
}

/// SsrcLines encodes a table as an optional FID group line followed by the
/// four attribute lines of every source.
pub struct SsrcLines<'a>(pub &'a SsrcTable);

impl fmt::Display for SsrcLines<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.len() > 1 {
            write!(f, "{ATTR_SSRC_GROUP}{SEMANTIC_TOKEN_FLOW_IDENTIFICATION}")?;
            for id in self.0.keys() {
                write!(f, " {id}")?;
            }
            write!(f, "{END_LINE}")?;
        }

        for (id, ssrc) in self.0 {
            write!(f, "{ATTR_SSRC}{id} {SSRC_KEY_CNAME}:{}{END_LINE}", ssrc.cname)?;
            write!(f, "{ATTR_SSRC}{id} {SSRC_KEY_MSID}:{}{END_LINE}", ssrc.msid)?;
            write!(f, "{ATTR_SSRC}{id} {SSRC_KEY_MSLABEL}:{}{END_LINE}", ssrc.mslabel)?;
            write!(f, "{ATTR_SSRC}{id} {SSRC_KEY_LABEL}:{}{END_LINE}", ssrc.label)?;
        }

        Ok(())
    }
}
