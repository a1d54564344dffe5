//! # vrt-codec
//!
//! Packer and unpacker for VITA Radio Transport style packet headers.
//!
//! A transmit path turns [`TxMetadata`] (stream id, timestamp, burst markers)
//! into the shortest header that carries it, plus the total packet length.
//! A receive path turns a header back into [`RxMetadata`] and the payload
//! length, rejecting malformed or unsupported packets.
//!
//! ## Architecture
//!
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Transport (sockets, buffers)                    │
//! ├────────────────────────────┬────────────────────────────────────┤
//! │     pack / pack_into       │     unpack / unpack_into           │
//! │  metadata → predicate      │  word 0 → predicate                │
//! ├────────────────────────────┴────────────────────────────────────┤
//! │              Field-layout table (32 predicates)                 │
//! └─────────────────────────────────────────────────────────────────┘
//!
//! ```
//! use vrt_codec::prelude::*;
//!
//! let rate = TickRate::new(1e6)?;
//! let md = TxMetadata::new().with_stream_id(0x1234);
//! let hdr = pack(&md, 4, PacketCount::new(7), rate)?;
//! assert_eq!(hdr.packet_words(), 6);
//!
//! let rx = unpack(hdr.as_words(), hdr.packet_words(), rate)?;
//! assert_eq!(rx.metadata.stream_id(), Some(0x1234));
//! assert_eq!(rx.info.payload_words, 4);
//! # Ok::<(), vrt_codec::Error>(())
//! ```

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]              // ASCII diagrams in docs
#![allow(clippy::unreadable_literal)]        // Header words read better unseparated
#![allow(clippy::cast_possible_truncation)]  // Fields are masked before narrowing
#![allow(clippy::cast_sign_loss)]            // Tick values are never negative
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_excessive_bools)]    // Metadata presence flags
#![allow(clippy::use_self)]

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::Config;
pub use error::{Error, ProtocolError, Result};
pub use protocol::{pack, pack_into, unpack, unpack_bytes, unpack_into};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tick rate used when nothing else is configured (100 MHz).
pub const DEFAULT_TICK_RATE: f64 = 100e6;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, ProtocolError, Result};
    pub use crate::protocol::{
        pack, pack_into, unpack, unpack_bytes, unpack_into, FieldLayout, HeaderView,
        HeaderWords, PackInfo, Predicate, UnpackInfo, Unpacked,
    };
    pub use crate::types::*;
}
