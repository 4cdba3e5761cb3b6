
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::description::common::*;
use crate::error::{Error, Result};
use crate::lexer::{append, write_key_value, Line, END_LINE};

pub const HASH_ALGORITHM_SHA256: &str = "sha-256";

/// Dtls holds the DTLS transport parameters of a media section.
///
/// ```text
/// a=fingerprint:sha-256 94:42:B8:B8:BA:B4:52:3D:...:AE:42
/// a=setup:actpass
/// a=connection:new
/// a=tls-id:89J2LRATQ3ULA24G9AHWVR31VJWSLB68
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Dtls {
    pub fingerprint: String,
    pub hash_algorithm: String,
    /// `a=connection:` value, `new` or `existing`.
    pub connection: String,
    pub setup: ConnectionRole,
    pub tls_id: String,
}

impl Dtls {
    pub(crate) fn decode(&mut self, line: &Line<'_>) -> Result<()> {
        if let Some(fields) = line.decode_if_has(ATTR_FINGERPRINT, "a=fingerprint:%s %s") {
            let [hash_algorithm, fingerprint] = fields?;
            self.hash_algorithm = hash_algorithm.to_owned();
            self.fingerprint = fingerprint.to_owned();
            return Ok(());
        }
        if let Some(fields) = line.decode_if_has(ATTR_SETUP, "a=setup:%s") {
            let [role] = fields?;
            self.setup = match ConnectionRole::from(role) {
                ConnectionRole::Unspecified => {
                    return Err(Error::line_format("a=setup:%s", line.as_str()))
                }
                role => role,
            };
            return Ok(());
        }
        if let Some(fields) = line.decode_if_has(ATTR_CONNECTION, "a=connection:%s") {
            let [connection] = fields?;
            self.connection = connection.to_owned();
            return Ok(());
        }
        if let Some(fields) = line.decode_if_has(ATTR_TLS_ID, "a=tls-id:%s") {
            let [tls_id] = fields?;
            self.tls_id = tls_id.to_owned();
            return Ok(());
        }

        Err(Error::UnrecognizedAttribute(line.to_string()))
    }
}

impl fmt::Display for Dtls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        append(
            f,
            &self.fingerprint,
            format_args!(
                "{ATTR_FINGERPRINT}{} {}{END_LINE}",
                self.hash_algorithm, self.fingerprint
            ),
        )?;
        write_key_value(f, ATTR_SETUP, self.setup)?;
        write_key_value(f, ATTR_CONNECTION, &self.connection)?;
        write_key_value(f, ATTR_TLS_ID, &self.tls_id)
    }
}
