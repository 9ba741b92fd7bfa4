//! Record framing codecs
//!
//! Two interchangeable framings sit behind the [`Encoder`]/[`Decoder`] pair:
//!
//! - `line`: payload followed by `\n`, for text logs
//! - `length-prefixed`: 4-byte big-endian length then the payload, for
//!   binary records
//!
//! Writers and readers hold boxed trait objects chosen at construction.

mod buffer;
mod length_prefixed;
mod line;
mod traits;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use length_prefixed::{LengthPrefixedDecoder, LengthPrefixedEncoder, LENGTH_PREFIXED_CODEC_ID};
pub use line::{LineDecoder, LineEncoder, LINE_CODEC_ID};
pub use traits::{CodecError, Decoder, Encoder};

/// Framing selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodecKind {
    /// Newline-terminated records
    #[default]
    #[serde(rename = "line")]
    Line,
    /// 4-byte big-endian length prefix
    #[serde(rename = "length-prefixed")]
    LengthPrefixed,
}

impl CodecKind {
    /// Stable identifier, as written in configuration.
    pub fn id(&self) -> &'static str {
        match self {
            CodecKind::Line => LINE_CODEC_ID,
            CodecKind::LengthPrefixed => LENGTH_PREFIXED_CODEC_ID,
        }
    }

    /// Build a fresh encoder of this kind.
    pub fn encoder(&self) -> Box<dyn Encoder> {
        match self {
            CodecKind::Line => Box::new(LineEncoder::new()),
            CodecKind::LengthPrefixed => Box::new(LengthPrefixedEncoder::new()),
        }
    }

    /// Build a fresh decoder of this kind.
    pub fn decoder(&self) -> Box<dyn Decoder> {
        match self {
            CodecKind::Line => Box::new(LineDecoder::new()),
            CodecKind::LengthPrefixed => Box::new(LengthPrefixedDecoder::new()),
        }
    }
}

impl FromStr for CodecKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LINE_CODEC_ID => Ok(CodecKind::Line),
            LENGTH_PREFIXED_CODEC_ID => Ok(CodecKind::LengthPrefixed),
            other => Err(CodecError::UnknownCodec(other.to_string())),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Resolve an encoder by codec id.
pub fn get_encoder(codec_id: &str) -> Result<Box<dyn Encoder>, CodecError> {
    Ok(codec_id.parse::<CodecKind>()?.encoder())
}

/// Resolve a decoder by codec id.
pub fn get_decoder(codec_id: &str) -> Result<Box<dyn Decoder>, CodecError> {
    Ok(codec_id.parse::<CodecKind>()?.decoder())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_codec_by_id() {
        assert_eq!(get_encoder("line").unwrap().codec_id(), "line");
        assert_eq!(
            get_decoder("length-prefixed").unwrap().codec_id(),
            "length-prefixed"
        );
    }

    #[test]
    fn test_get_codec_unknown() {
        let err = get_encoder("gzip").err().unwrap();
        assert!(matches!(err, CodecError::UnknownCodec(ref id) if id == "gzip"));
        assert!(get_decoder("").is_err());
    }

    #[test]
    fn test_kind_id_round_trip() {
        for kind in [CodecKind::Line, CodecKind::LengthPrefixed] {
            assert_eq!(kind.id().parse::<CodecKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.id());
            assert_eq!(kind.encoder().codec_id(), kind.id());
            assert_eq!(kind.decoder().codec_id(), kind.id());
        }
    }

    #[test]
    fn test_default_is_line() {
        assert_eq!(CodecKind::default(), CodecKind::Line);
    }
}
