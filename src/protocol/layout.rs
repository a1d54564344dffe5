//! Field-layout table shared by the packer and unpacker.
//!
//! Every header shape is identified by a 5-bit [`Predicate`]. The table maps
//! each of the 32 predicates to the optional words that follow word 0, in
//! the one order both directions use: stream id, class id, integer time,
//! fractional time. The table is built at compile time and never changes.

use std::fmt;

use serde::Serialize;

use crate::types::TxMetadata;

use super::{
    FLAG_CLASS_ID, FLAG_STREAM_ID, FLAG_TRAILER, MASK_INTEGER_TIME, MASK_FRACTIONAL_TIME,
    TSF_PRESENT, TSI_PRESENT,
};

/// Presence predicate: which optional header fields are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Predicate(u8);

impl Predicate {
    /// No optional fields.
    pub const NONE: Self = Self(0);

    pub const STREAM_ID: u8 = 1 << 0;
    /// Reserved; never produced by the packer.
    pub const CLASS_ID: u8 = 1 << 1;
    pub const INTEGER_TIME: u8 = 1 << 2;
    pub const FRACTIONAL_TIME: u8 = 1 << 3;
    /// Reserved; never produced by the packer.
    pub const TRAILER: u8 = 1 << 4;

    /// Number of distinct predicates.
    pub const COUNT: usize = 32;

    /// Create a predicate from raw bits; bits above the low five are dropped.
    pub const fn new(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    /// Predicate for outgoing metadata.
    ///
    /// Time is always sent as both integer and fractional parts.
    pub fn from_tx(metadata: &TxMetadata) -> Self {
        let mut bits = 0;
        if metadata.has_stream_id {
            bits |= Self::STREAM_ID;
        }
        if metadata.has_time_spec {
            bits |= Self::INTEGER_TIME | Self::FRACTIONAL_TIME;
        }
        Self(bits)
    }

    /// Predicate from the flag bits of a host-order header word 0.
    pub fn from_header_word(word0: u32) -> Self {
        let mut bits = 0;
        if word0 & FLAG_STREAM_ID != 0 {
            bits |= Self::STREAM_ID;
        }
        if word0 & FLAG_CLASS_ID != 0 {
            bits |= Self::CLASS_ID;
        }
        if word0 & MASK_INTEGER_TIME != 0 {
            bits |= Self::INTEGER_TIME;
        }
        if word0 & MASK_FRACTIONAL_TIME != 0 {
            bits |= Self::FRACTIONAL_TIME;
        }
        if word0 & FLAG_TRAILER != 0 {
            bits |= Self::TRAILER;
        }
        Self(bits)
    }

    pub const fn has(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#07b}", self.0)
    }
}

/// Optional header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Stream identifier, one word.
    StreamId,
    /// Class identifier, two words. Content is not implemented: written as
    /// zero and skipped on read.
    ClassId,
    /// Integer seconds, one word.
    IntegerTime,
    /// Fractional time, two words: reserved high word, then ticks.
    FractionalTime,
}

impl Field {
    /// Fields in wire order.
    pub const ORDER: [Self; 4] = [
        Self::StreamId,
        Self::ClassId,
        Self::IntegerTime,
        Self::FractionalTime,
    ];

    /// Words occupied in the header.
    pub const fn words(self) -> usize {
        match self {
            Self::StreamId | Self::IntegerTime => 1,
            Self::ClassId | Self::FractionalTime => 2,
        }
    }

    /// Bits this field contributes to header word 0.
    pub const fn flags(self) -> u32 {
        match self {
            Self::StreamId => FLAG_STREAM_ID,
            Self::ClassId => FLAG_CLASS_ID,
            Self::IntegerTime => TSI_PRESENT,
            Self::FractionalTime => TSF_PRESENT,
        }
    }

    /// Predicate bit selecting this field.
    pub const fn predicate_bit(self) -> u8 {
        match self {
            Self::StreamId => Predicate::STREAM_ID,
            Self::ClassId => Predicate::CLASS_ID,
            Self::IntegerTime => Predicate::INTEGER_TIME,
            Self::FractionalTime => Predicate::FRACTIONAL_TIME,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamId => write!(f, "stream_id"),
            Self::ClassId => write!(f, "class_id"),
            Self::IntegerTime => write!(f, "integer_time"),
            Self::FractionalTime => write!(f, "fractional_time"),
        }
    }
}

/// Header shape for one predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    predicate: Predicate,
    fields: [Field; 4],
    num_fields: usize,
    header_words: usize,
    trailer_words: usize,
    flags: u32,
}

impl FieldLayout {
    const fn build(predicate: Predicate) -> Self {
        let mut fields = [Field::StreamId; 4];
        let mut num_fields = 0;
        let mut header_words = 1;
        let mut flags = 0;

        let mut i = 0;
        while i < Field::ORDER.len() {
            let field = Field::ORDER[i];
            if predicate.has(field.predicate_bit()) {
                fields[num_fields] = field;
                num_fields += 1;
                header_words += field.words();
                flags |= field.flags();
            }
            i += 1;
        }

        let trailer_words = if predicate.has(Predicate::TRAILER) {
            flags |= FLAG_TRAILER;
            1
        } else {
            0
        };

        Self {
            predicate,
            fields,
            num_fields,
            header_words,
            trailer_words,
            flags,
        }
    }

    /// Layout for a predicate.
    #[inline]
    pub fn for_predicate(predicate: Predicate) -> &'static Self {
        &LAYOUTS[predicate.index()]
    }

    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Present fields, in wire order.
    pub fn fields(&self) -> &[Field] {
        &self.fields[..self.num_fields]
    }

    /// Header words including word 0.
    pub fn header_words(&self) -> usize {
        self.header_words
    }

    /// Words appended after the payload.
    pub fn trailer_words(&self) -> usize {
        self.trailer_words
    }

    /// Words a packet spends on header and trailer.
    pub fn overhead_words(&self) -> usize {
        self.header_words + self.trailer_words
    }

    /// Presence flags for header word 0, without burst flags.
    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Header word index where `field` starts, if present.
    pub fn offset_of(&self, field: Field) -> Option<usize> {
        let mut offset = 1;
        for &f in self.fields() {
            if f == field {
                return Some(offset);
            }
            offset += f.words();
        }
        None
    }
}

const fn build_table() -> [FieldLayout; Predicate::COUNT] {
    let mut table = [FieldLayout::build(Predicate::NONE); Predicate::COUNT];
    let mut p = 0;
    while p < Predicate::COUNT {
        table[p] = FieldLayout::build(Predicate::new(p as u8));
        p += 1;
    }
    table
}

/// Layout for every predicate, indexed by predicate value.
pub static LAYOUTS: [FieldLayout; Predicate::COUNT] = build_table();
