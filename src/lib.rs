#![warn(rust_2018_idioms)]

pub mod description;
pub mod direction;
pub mod dtls;
pub mod ice;
pub mod rtp;
pub mod sctp;
pub mod ssrc;

mod error;
pub mod lexer;

pub use description::media::{AvMedia, DataChannel, Media, MediaBase};
pub use description::session::{Decoded, Session};
pub use error::{DecodeErrors, Error, LineError, RecordKind, Result};
