//! Header packing and unpacking.
//!
//! Word slices handled here hold words in network byte order, exactly as
//! they sit in a receive or transmit buffer.

use byteorder::{BigEndian, ByteOrder};
use tracing::trace;

use crate::error::{ProtocolError, Result};
use crate::types::{PacketCount, RxMetadata, TickRate, TxMetadata};

use super::{
    Field, FieldLayout, HeaderView, Predicate, FLAG_END_OF_BURST, FLAG_START_OF_BURST,
    MASK_PACKET_WORDS, MAX_HEADER_WORDS, MAX_PACKET_WORDS, PACKET_COUNT_SHIFT, WORD_SIZE,
};

/// Sizes produced by the packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackInfo {
    /// Header words, including word 0.
    pub header_words: usize,
    /// Words the caller appends after the payload.
    pub trailer_words: usize,
    /// Header, payload and trailer words; the value written to word 0.
    pub packet_words: usize,
}

/// Sizes and counters recovered by the unpacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnpackInfo {
    pub header_words: usize,
    pub trailer_words: usize,
    pub payload_words: usize,
    /// Packet length declared in word 0.
    pub packet_words: usize,
    pub packet_count: PacketCount,
}

/// An unpacked header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unpacked {
    pub metadata: RxMetadata,
    pub info: UnpackInfo,
}

/// A packed header held inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderWords {
    words: [u32; MAX_HEADER_WORDS],
    info: PackInfo,
}

impl HeaderWords {
    /// Header words in network byte order.
    pub fn as_words(&self) -> &[u32] {
        &self.words[..self.info.header_words]
    }

    /// Header word `index` in host byte order.
    pub fn word(&self, index: usize) -> Option<u32> {
        self.as_words().get(index).map(|&w| u32::from_be(w))
    }

    pub fn info(&self) -> PackInfo {
        self.info
    }

    pub fn header_words(&self) -> usize {
        self.info.header_words
    }

    pub fn trailer_words(&self) -> usize {
        self.info.trailer_words
    }

    pub fn packet_words(&self) -> usize {
        self.info.packet_words
    }

    /// Header length in bytes.
    pub fn byte_len(&self) -> usize {
        self.info.header_words * WORD_SIZE
    }

    /// Write the header as big-endian bytes; returns the number of bytes written.
    pub fn write_bytes(&self, out: &mut [u8]) -> Result<usize> {
        let len = self.byte_len();
        if out.len() < len {
            return Err(ProtocolError::BufferTooSmall {
                have: out.len() / WORD_SIZE,
                need: self.info.header_words,
            }
            .into());
        }

        for (chunk, &word) in out.chunks_exact_mut(WORD_SIZE).zip(self.as_words()) {
            BigEndian::write_u32(chunk, u32::from_be(word));
        }
        Ok(len)
    }

    /// The header as big-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.byte_len()];
        for (chunk, &word) in buf.chunks_exact_mut(WORD_SIZE).zip(self.as_words()) {
            BigEndian::write_u32(chunk, u32::from_be(word));
        }
        buf
    }
}

/// Pack a header into a caller buffer of network-order words.
///
/// `buf` must hold at least as many words as the header needs (at most
/// [`MAX_HEADER_WORDS`]). The packet count is taken modulo 16 by
/// [`PacketCount`]; a packet longer than [`MAX_PACKET_WORDS`] is rejected.
pub fn pack_into(
    metadata: &TxMetadata,
    buf: &mut [u32],
    payload_words: usize,
    packet_count: PacketCount,
    tick_rate: TickRate,
) -> Result<PackInfo> {
    let layout = FieldLayout::for_predicate(Predicate::from_tx(metadata));

    if buf.len() < layout.header_words() {
        return Err(ProtocolError::BufferTooSmall {
            have: buf.len(),
            need: layout.header_words(),
        }
        .into());
    }

    let packet_words = layout
        .overhead_words()
        .checked_add(payload_words)
        .filter(|&words| words <= MAX_PACKET_WORDS)
        .ok_or(ProtocolError::PacketTooLarge {
            words: layout.overhead_words().saturating_add(payload_words),
        })?;

    let (secs, ticks) = metadata.time_spec.to_ticks(tick_rate);

    let mut i = 1;
    for &field in layout.fields() {
        match field {
            Field::StreamId => buf[i] = metadata.stream_id.to_be(),
            Field::ClassId => {
                buf[i] = 0;
                buf[i + 1] = 0;
            }
            Field::IntegerTime => buf[i] = secs.to_be(),
            Field::FractionalTime => {
                buf[i] = 0;
                buf[i + 1] = ticks.to_be();
            }
        }
        i += field.words();
    }
    debug_assert_eq!(i, layout.header_words());

    let mut flags = layout.flags();
    if metadata.start_of_burst {
        flags |= FLAG_START_OF_BURST;
    }
    if metadata.end_of_burst {
        flags |= FLAG_END_OF_BURST;
    }

    buf[0] = (flags
        | (u32::from(packet_count.get()) << PACKET_COUNT_SHIFT)
        | (packet_words as u32 & MASK_PACKET_WORDS))
        .to_be();

    Ok(PackInfo {
        header_words: layout.header_words(),
        trailer_words: layout.trailer_words(),
        packet_words,
    })
}

/// Pack a header into an inline buffer.
pub fn pack(
    metadata: &TxMetadata,
    payload_words: usize,
    packet_count: PacketCount,
    tick_rate: TickRate,
) -> Result<HeaderWords> {
    let mut words = [0u32; MAX_HEADER_WORDS];
    let info = pack_into(metadata, &mut words, payload_words, packet_count, tick_rate)?;
    Ok(HeaderWords { words, info })
}

/// Unpack a header of network-order words into `metadata`.
///
/// `metadata` is reset before anything else, so a reused record never keeps
/// values from a previous packet, including when this returns an error.
/// `packet_words` is the packet length the transport actually received.
pub fn unpack_into(
    metadata: &mut RxMetadata,
    header: &[u32],
    packet_words: usize,
    tick_rate: TickRate,
) -> Result<UnpackInfo> {
    *metadata = RxMetadata::default();

    let Some(&raw0) = header.first() else {
        trace!("empty vrt header");
        return Err(ProtocolError::TruncatedOrMalformedHeader {
            declared: 0,
            available: packet_words,
        }
        .into());
    };
    let view = HeaderView::from_network(raw0);

    if view.reserved_bits() != 0 {
        trace!(word0 = view.word(), "unsupported vrt packet type");
        return Err(ProtocolError::UnsupportedPacketType { word0: view.word() }.into());
    }

    let declared = view.declared_words();
    if declared == 0 || packet_words < declared {
        trace!(word0 = view.word(), packet_words, "bad vrt header or packet fragment");
        return Err(ProtocolError::TruncatedOrMalformedHeader {
            declared,
            available: packet_words,
        }
        .into());
    }

    let layout = FieldLayout::for_predicate(view.predicate());
    if header.len() < layout.header_words() {
        trace!(word0 = view.word(), header_len = header.len(), "vrt header cut short");
        return Err(ProtocolError::TruncatedOrMalformedHeader {
            declared: layout.header_words(),
            available: header.len(),
        }
        .into());
    }
    if layout.overhead_words() > declared {
        trace!(word0 = view.word(), "vrt header longer than its packet");
        return Err(ProtocolError::PayloadUnderflow {
            declared,
            overhead: layout.overhead_words(),
        }
        .into());
    }

    let mut i = 1;
    for &field in layout.fields() {
        match field {
            Field::StreamId => {
                metadata.has_stream_id = true;
                metadata.stream_id = u32::from_be(header[i]);
            }
            Field::ClassId => {}
            Field::IntegerTime => {
                metadata.has_time_spec = true;
                metadata.time_spec.secs = u32::from_be(header[i]);
            }
            Field::FractionalTime => {
                metadata.has_time_spec = true;
                metadata
                    .time_spec
                    .set_ticks(u32::from_be(header[i + 1]), tick_rate);
            }
        }
        i += field.words();
    }

    Ok(UnpackInfo {
        header_words: layout.header_words(),
        trailer_words: layout.trailer_words(),
        payload_words: declared - layout.overhead_words(),
        packet_words: declared,
        packet_count: view.packet_count(),
    })
}

/// Unpack a header of network-order words.
pub fn unpack(header: &[u32], packet_words: usize, tick_rate: TickRate) -> Result<Unpacked> {
    let mut metadata = RxMetadata::default();
    let info = unpack_into(&mut metadata, header, packet_words, tick_rate)?;
    Ok(Unpacked { metadata, info })
}

/// Unpack a header from the start of a big-endian byte buffer.
pub fn unpack_bytes(buf: &[u8], packet_words: usize, tick_rate: TickRate) -> Result<Unpacked> {
    let mut words = [0u32; MAX_HEADER_WORDS];
    let mut n = 0;
    for (slot, chunk) in words.iter_mut().zip(buf.chunks_exact(WORD_SIZE)) {
        *slot = BigEndian::read_u32(chunk).to_be();
        n += 1;
    }
    unpack(&words[..n], packet_words, tick_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeSpec;

    fn rate() -> TickRate {
        TickRate::new(1e6).unwrap()
    }

    #[test]
    fn test_pack_stream_id() {
        let md = TxMetadata::new().with_stream_id(0x1234);
        let hdr = pack(&md, 4, PacketCount::new(7), rate()).unwrap();

        assert_eq!(hdr.header_words(), 2);
        assert_eq!(hdr.packet_words(), 6);
        assert_eq!(hdr.as_words()[1], 0x0000_1234u32.to_be());

        let word0 = hdr.word(0).unwrap();
        assert_ne!(word0 & (1 << 28), 0);
        assert_eq!(word0 & 0xFFFF, 6);
        assert_eq!((word0 >> 16) & 0xF, 7);
    }

    #[test]
    fn test_pack_time_spec() {
        let md = TxMetadata::new().with_time_spec(TimeSpec::from_ticks(100, 500_000, rate()));
        let hdr = pack(&md, 0, PacketCount::ZERO, rate()).unwrap();

        assert_eq!(hdr.header_words(), 4);
        assert_eq!(hdr.word(0).unwrap(), 0x00D0_0004);
        assert_eq!(hdr.word(1), Some(100));
        assert_eq!(hdr.word(2), Some(0));
        assert_eq!(hdr.word(3), Some(500_000));
    }

    #[test]
    fn test_pack_time_rounding_carries_into_seconds() {
        let md = TxMetadata::new().with_time_spec(TimeSpec::new(5, 0.999_999_9));
        let hdr = pack(&md, 0, PacketCount::ZERO, rate()).unwrap();

        assert_eq!(hdr.word(1), Some(6));
        assert_eq!(hdr.word(3), Some(0));

        let out = unpack(hdr.as_words(), hdr.packet_words(), rate()).unwrap();
        assert_eq!(out.metadata.time_spec.secs, 6);
        assert_eq!(out.metadata.time_spec.get_ticks(rate()), 0);
    }

    #[test]
    fn test_pack_burst_flags() {
        let md = TxMetadata::new().start_of_burst().end_of_burst();
        let hdr = pack(&md, 10, PacketCount::ZERO, rate()).unwrap();
        assert_eq!(hdr.word(0).unwrap(), 0x0300_000B);
    }

    #[test]
    fn test_pack_buffer_too_small() {
        let md = TxMetadata::new().with_stream_id(1);
        let mut buf = [0u32; 1];
        let err = pack_into(&md, &mut buf, 0, PacketCount::ZERO, rate()).unwrap_err();
        assert!(matches!(
            err.as_protocol(),
            Some(ProtocolError::BufferTooSmall { have: 1, need: 2 })
        ));
    }

    #[test]
    fn test_pack_too_large() {
        let md = TxMetadata::new();
        assert!(pack(&md, MAX_PACKET_WORDS - 1, PacketCount::ZERO, rate()).is_ok());
        let err = pack(&md, MAX_PACKET_WORDS, PacketCount::ZERO, rate()).unwrap_err();
        assert!(matches!(
            err.as_protocol(),
            Some(ProtocolError::PacketTooLarge { words: 0x10000 })
        ));
        assert!(pack(&md, usize::MAX, PacketCount::ZERO, rate()).is_err());
    }

    #[test]
    fn test_unpack_round_trip() {
        let md = TxMetadata::new()
            .with_stream_id(0xDEAD_BEEF)
            .with_time_spec(TimeSpec::from_ticks(42, 250_000, rate()));
        let hdr = pack(&md, 100, PacketCount::new(3), rate()).unwrap();

        let out = unpack(hdr.as_words(), hdr.packet_words(), rate()).unwrap();
        assert_eq!(out.metadata.stream_id(), Some(0xDEAD_BEEF));
        assert_eq!(out.metadata.time_spec.secs, 42);
        assert_eq!(out.metadata.time_spec.get_ticks(rate()), 250_000);
        assert_eq!(out.info.header_words, 5);
        assert_eq!(out.info.payload_words, 100);
        assert_eq!(out.info.packet_count.get(), 3);
    }

    #[test]
    fn test_unpack_resets_metadata() {
        let mut md = RxMetadata {
            has_stream_id: true,
            stream_id: 99,
            has_time_spec: true,
            time_spec: TimeSpec::new(5, 0.5),
        };
        let hdr = pack(&TxMetadata::new(), 2, PacketCount::ZERO, rate()).unwrap();
        unpack_into(&mut md, hdr.as_words(), 3, rate()).unwrap();
        assert_eq!(md, RxMetadata::default());
    }

    #[test]
    fn test_unpack_errors() {
        let err = unpack(&[], 4, rate()).unwrap_err();
        assert!(err.is_malformed());

        let err = unpack(&[0u32.to_be()], 4, rate()).unwrap_err();
        assert!(err.is_malformed());

        let err = unpack(&[0x0000_0008u32.to_be()], 4, rate()).unwrap_err();
        assert!(err.is_malformed());

        let err = unpack(&[0x2000_0001u32.to_be()], 4, rate()).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_unpack_short_slice() {
        // Stream id flagged but only word 0 supplied.
        let err = unpack(&[0x1000_0004u32.to_be()], 4, rate()).unwrap_err();
        assert!(matches!(
            err.as_protocol(),
            Some(ProtocolError::TruncatedOrMalformedHeader { declared: 2, available: 1 })
        ));
    }

    #[test]
    fn test_unpack_underflow() {
        // Time flagged (4 header words) but packet declares 2.
        let words = [0x00D0_0002u32.to_be(), 0, 0, 0];
        let err = unpack(&words, 2, rate()).unwrap_err();
        assert!(matches!(
            err.as_protocol(),
            Some(ProtocolError::PayloadUnderflow { declared: 2, overhead: 4 })
        ));
    }

    #[test]
    fn test_unpack_class_id_and_trailer() {
        // Stream id, class id, trailer; 10 words declared.
        let words = [
            0x1C00_000Au32.to_be(),
            7u32.to_be(),
            0xFFFF_FFFFu32.to_be(),
            0xFFFF_FFFFu32.to_be(),
        ];
        let out = unpack(&words, 10, rate()).unwrap();
        assert_eq!(out.metadata.stream_id(), Some(7));
        assert!(!out.metadata.has_time_spec);
        assert_eq!(out.info.header_words, 4);
        assert_eq!(out.info.trailer_words, 1);
        assert_eq!(out.info.payload_words, 5);
    }

    #[test]
    fn test_bytes_round_trip() {
        let md = TxMetadata::new().with_stream_id(0x0102_0304);
        let hdr = pack(&md, 1, PacketCount::new(1), rate()).unwrap();
        let bytes = hdr.to_bytes();
        assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);

        let mut out = [0u8; 8];
        assert_eq!(hdr.write_bytes(&mut out).unwrap(), 8);
        assert_eq!(&out[..], &bytes[..]);
        assert!(hdr.write_bytes(&mut [0u8; 4]).is_err());

        let decoded = unpack_bytes(&bytes, hdr.packet_words(), rate()).unwrap();
        assert_eq!(decoded.metadata.stream_id(), Some(0x0102_0304));
        assert_eq!(decoded.info.payload_words, 1);
    }
}
