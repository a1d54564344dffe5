//! Timestamp conversion tests, including property-based round trips.

use proptest::prelude::*;

use vrt_codec::protocol::{pack, unpack};
use vrt_codec::types::{
    seconds_to_ticks, ticks_to_seconds, PacketCount, TickRate, TimeSpec, TxMetadata,
};

const RATES: [f64; 4] = [1e6, 25e6, 100e6, 200e6];

#[test]
fn test_representative_ticks() {
    for hz in RATES {
        let rate = TickRate::new(hz).unwrap();
        let max = hz as u32 - 1;
        for ticks in [0, 1, 2, max / 3, max / 2, max - 1, max] {
            let mut ts = TimeSpec::new(100, 0.0);
            ts.set_ticks(ticks, rate);
            assert_eq!(ts.get_ticks(rate), ticks, "rate {hz}, ticks {ticks}");
            assert_eq!(ts.secs, 100);
        }
    }
}

#[test]
fn test_half_second() {
    let rate = TickRate::new(1e6).unwrap();
    assert_eq!(TimeSpec::new(100, 0.5).get_ticks(rate), 500_000);

    let rate = TickRate::new(200e6).unwrap();
    assert_eq!(TimeSpec::new(100, 0.5).get_ticks(rate), 100_000_000);
}

#[test]
fn test_tiny_negative_fraction_normalizes() {
    let ts = TimeSpec::new(0, -1e-20);
    assert_eq!(ts.secs, 0);
    assert!(ts.frac_secs >= 0.0 && ts.frac_secs < 1.0);
}

#[test]
fn test_display() {
    assert_eq!(TimeSpec::new(3, 0.25).to_string(), "3.250000000s");
}

proptest! {
    #[test]
    fn prop_ticks_round_trip(raw in any::<u32>(), rate_idx in 0usize..RATES.len()) {
        let hz = RATES[rate_idx];
        let ticks = raw % hz as u32;
        let rate = TickRate::new(hz).unwrap();

        let mut ts = TimeSpec::default();
        ts.set_ticks(ticks, rate);
        prop_assert_eq!(ts.get_ticks(rate), ticks);
        prop_assert_eq!(ts.secs, 0);
    }

    #[test]
    fn prop_seconds_ticks_inverse(secs in 0u32..100_000, ticks in 0u32..1_000_000) {
        let rate = TickRate::new(1e6).unwrap();
        let real = ticks_to_seconds(secs, ticks, rate);
        prop_assert_eq!(seconds_to_ticks(real, rate), (secs, ticks));
    }

    #[test]
    fn prop_seconds_ticks_inverse_fast_clock(secs in 0u32..(1 << 20), ticks in 0u32..200_000_000) {
        let rate = TickRate::new(200e6).unwrap();
        let real = ticks_to_seconds(secs, ticks, rate);
        prop_assert_eq!(seconds_to_ticks(real, rate), (secs, ticks));
    }

    #[test]
    fn prop_packed_ticks_below_rate(secs in 0u32..u32::MAX, frac in 0.0f64..1.0) {
        let rate = TickRate::new(1e6).unwrap();
        let md = TxMetadata::new().with_time_spec(TimeSpec::new(secs, frac));

        let hdr = pack(&md, 0, PacketCount::ZERO, rate).unwrap();
        let ticks = hdr.word(3).unwrap();
        prop_assert!(ticks < 1_000_000);
        prop_assert!(hdr.word(1).unwrap() == secs || hdr.word(1).unwrap() == secs + 1);
    }

    #[test]
    fn prop_header_time_round_trip(
        secs in any::<u32>(),
        ticks in 0u32..200_000_000,
        payload in 0usize..1000,
    ) {
        let rate = TickRate::new(200e6).unwrap();
        let md = TxMetadata::new().with_time_spec(TimeSpec::from_ticks(secs, ticks, rate));

        let hdr = pack(&md, payload, PacketCount::ZERO, rate).unwrap();
        let out = unpack(hdr.as_words(), hdr.packet_words(), rate).unwrap();

        prop_assert_eq!(out.metadata.time_spec.secs, secs);
        prop_assert_eq!(out.metadata.time_spec.get_ticks(rate), ticks);
        prop_assert_eq!(out.info.payload_words, payload);
    }
}
