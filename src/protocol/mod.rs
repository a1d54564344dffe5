//! VRT header wire protocol.
//!
//! Defines the header layout, the presence flags, and the packer/unpacker.
//!
//! ## Header Format
//!
//! All words are 32 bits, network byte order.
//!
//! ```text
//!  31 29 28 27 26 25 24 23 22 21 20 19    16 15                     0
//! ┌─────┬──┬──┬──┬──┬──┬─────┬─────┬────────┬────────────────────────┐
//! │ rsv │S │C │T │SB│EB│ TSI │ TSF │ count  │   packet word count    │  word 0
//! ├─────┴──┴──┴──┴──┴──┴─────┴─────┴────────┴────────────────────────┤
//! │                    stream id              (if S)                  │
//! ├────────────────────────────────────────────────────────────────────┤
//! │                    class id, 2 words      (if C, reserved)        │
//! ├────────────────────────────────────────────────────────────────────┤
//! │                    integer seconds        (if TSI)                │
//! ├────────────────────────────────────────────────────────────────────┤
//! │                    fractional, 2 words    (if TSF: 0, ticks)      │
//! └────────────────────────────────────────────────────────────────────┘
//!              ... payload ...   [trailer, 1 word, if T]
//! ```

mod header;
mod layout;
mod view;

pub use header::{
    pack, pack_into, unpack, unpack_bytes, unpack_into, HeaderWords, PackInfo, UnpackInfo,
    Unpacked,
};
pub use layout::{Field, FieldLayout, Predicate, LAYOUTS};
pub use view::HeaderView;

/// Stream id present.
pub const FLAG_STREAM_ID: u32 = 1 << 28;

/// Class id present.
pub const FLAG_CLASS_ID: u32 = 1 << 27;

/// Trailer present.
pub const FLAG_TRAILER: u32 = 1 << 26;

/// Start of burst.
pub const FLAG_START_OF_BURST: u32 = 1 << 25;

/// End of burst.
pub const FLAG_END_OF_BURST: u32 = 1 << 24;

/// Integer-time type code written by the packer.
pub const TSI_PRESENT: u32 = 0x3 << 22;

/// Integer-time type field.
pub const MASK_INTEGER_TIME: u32 = 0x3 << 22;

/// Fractional-time type code written by the packer.
pub const TSF_PRESENT: u32 = 0x1 << 20;

/// Fractional-time type field.
pub const MASK_FRACTIONAL_TIME: u32 = 0x3 << 20;

/// Reserved packet-type bits; must be zero.
pub const MASK_RESERVED: u32 = 0x7 << 29;

/// Packet count field (shifted down by [`PACKET_COUNT_SHIFT`]).
pub const MASK_PACKET_COUNT: u32 = 0xF;

pub const PACKET_COUNT_SHIFT: u32 = 16;

/// Packet word count field.
pub const MASK_PACKET_WORDS: u32 = 0xFFFF;

/// Largest packet the 16-bit size field can describe.
pub const MAX_PACKET_WORDS: usize = 0xFFFF;

/// Longest possible header: word 0 plus every optional field.
pub const MAX_HEADER_WORDS: usize = 7;

/// Bytes per header word.
pub const WORD_SIZE: usize = 4;
