
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::lexer::{parse_u32, Line};

/// SctpMap is the legacy `a=sctpmap:<number> <app> <max-message-size>
/// [<streams>]` attribute of a data channel section.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SctpMap {
    pub number: u32,
    pub app: String,
    pub max_message_size: u32,
    pub streams: Option<u32>,
}

impl SctpMap {
    pub(crate) fn decode(line: &Line<'_>) -> Result<Self> {
        if let Ok([number, app, max_message_size, streams]) =
            line.decode("a=sctpmap:%d %s %d %d")
        {
            return Ok(SctpMap {
                number: parse_u32(number)?,
                app: app.to_owned(),
                max_message_size: parse_u32(max_message_size)?,
                streams: Some(parse_u32(streams)?),
            });
        }

        let [number, app, max_message_size] = line.decode("a=sctpmap:%d %s %d")?;
        Ok(SctpMap {
            number: parse_u32(number)?,
            app: app.to_owned(),
            max_message_size: parse_u32(max_message_size)?,
            streams: None,
        })
    }

    /// is_unset reports whether no sctpmap line was decoded.
    pub fn is_unset(&self) -> bool {
        self.app.is_empty()
    }
}

impl fmt::Display for SctpMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.number, self.app, self.max_message_size)?;
        if let Some(streams) = self.streams {
            write!(f, " {streams}")?;
        }
        Ok(())
    }
}
