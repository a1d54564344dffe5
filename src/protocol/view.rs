//! Read-only view over header word 0.

use std::fmt;

use crate::types::PacketCount;

use super::{
    Predicate, FLAG_END_OF_BURST, FLAG_START_OF_BURST, FLAG_TRAILER, MASK_PACKET_COUNT,
    MASK_PACKET_WORDS, MASK_RESERVED, PACKET_COUNT_SHIFT,
};

/// Accessors for the fields of a host-order header word 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderView(u32);

impl HeaderView {
    pub fn new(word0: u32) -> Self {
        Self(word0)
    }

    /// View a word as it arrived on the wire.
    pub fn from_network(raw: u32) -> Self {
        Self(u32::from_be(raw))
    }

    pub fn word(self) -> u32 {
        self.0
    }

    pub fn reserved_bits(self) -> u32 {
        self.0 & MASK_RESERVED
    }

    /// Flag bits: everything above the packet count.
    pub fn flags(self) -> u32 {
        self.0 & !(MASK_RESERVED | (MASK_PACKET_COUNT << PACKET_COUNT_SHIFT) | MASK_PACKET_WORDS)
    }

    pub fn packet_count(self) -> PacketCount {
        PacketCount::new(self.0 >> PACKET_COUNT_SHIFT)
    }

    /// Packet length the header claims, in words.
    pub fn declared_words(self) -> usize {
        (self.0 & MASK_PACKET_WORDS) as usize
    }

    pub fn start_of_burst(self) -> bool {
        self.0 & FLAG_START_OF_BURST != 0
    }

    pub fn end_of_burst(self) -> bool {
        self.0 & FLAG_END_OF_BURST != 0
    }

    pub fn has_trailer(self) -> bool {
        self.0 & FLAG_TRAILER != 0
    }

    pub fn predicate(self) -> Predicate {
        Predicate::from_header_word(self.0)
    }
}

impl fmt::Display for HeaderView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#010x} (predicate={}, count={}, words={})",
            self.0,
            self.predicate(),
            self.packet_count(),
            self.declared_words()
        )
    }
}
