//! Error types for the VRT codec.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type.
#[derive(Error, Debug)]
pub enum Error {
    // Protocol errors
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("invalid tick rate: {0} (must be finite, positive and at most 2^32)")]
    InvalidTickRate(f64),

    // Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Header packing and unpacking errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("bad vrt header or packet fragment: header declares {declared} words, {available} available")]
    TruncatedOrMalformedHeader { declared: usize, available: usize },

    #[error("unsupported vrt packet type (header word {word0:#010x})")]
    UnsupportedPacketType { word0: u32 },

    #[error("header and trailer need {overhead} words but packet declares only {declared}")]
    PayloadUnderflow { declared: usize, overhead: usize },

    #[error("packet of {words} words does not fit the 16-bit size field")]
    PacketTooLarge { words: usize },

    #[error("buffer too small: {have} words, need {need}")]
    BufferTooSmall { have: usize, need: usize },
}

impl Error {
    /// Check if the packet itself is malformed (caller should drop it).
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::Protocol(
                ProtocolError::TruncatedOrMalformedHeader { .. }
                    | ProtocolError::PayloadUnderflow { .. }
            )
        )
    }

    /// Check if the packet is well formed but of a type this codec does not handle.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::Protocol(ProtocolError::UnsupportedPacketType { .. })
        )
    }

    /// The protocol error behind this error, if any.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Error::Protocol(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let err: Error = ProtocolError::TruncatedOrMalformedHeader {
            declared: 0,
            available: 4,
        }
        .into();
        assert!(err.is_malformed());
        assert!(!err.is_unsupported());

        let err: Error = ProtocolError::UnsupportedPacketType { word0: 0xE000_0001 }.into();
        assert!(err.is_unsupported());
        assert!(!err.is_malformed());

        let err = Error::InvalidTickRate(0.0);
        assert!(err.as_protocol().is_none());
    }

    #[test]
    fn test_display() {
        let err = ProtocolError::UnsupportedPacketType { word0: 0x2000_0003 };
        assert_eq!(
            err.to_string(),
            "unsupported vrt packet type (header word 0x20000003)"
        );
    }
}
