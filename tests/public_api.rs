//! Integration tests against the crate's public surface only (no `pub(crate)`
//! test seams reachable from here, unlike the unit tests next to
//! `StreamCore`). No fixture media ships with this crate, so the concrete
//! end-to-end scenarios from the specification's testable-properties section
//! are covered at the unit level (see `src/streamcore.rs`'s `tests` module,
//! which notes the scenario number each case corresponds to); what's
//! reachable here is the configuration, time-base, and pixel-format surface
//! a caller builds before ever opening a file.

use framecore::{DecoderOptions, EncoderOptions, HwType, PixelFormat, Rational, TimeMap};

#[test]
fn decoder_options_builder_round_trips_every_field() {
    let options = DecoderOptions::builder()
        .hw_type(HwType::Software)
        .buffer_length(16)
        .no_buffer_flush(true)
        .output_to_host(false)
        .device_index(2)
        .build();

    assert_eq!(options.buffer_length(), 16);
    assert!(options.no_buffer_flush());
    assert!(!options.output_to_host());
    assert_eq!(options.hw_type(), HwType::Software);
}

#[test]
fn decoder_options_defaults_match_the_spec_table() {
    // §6: buffer_length = 10, no_buffer_flush = false, output_to_host = true.
    let options = DecoderOptions::default();
    assert_eq!(options.buffer_length(), 10);
    assert!(!options.no_buffer_flush());
    assert!(options.output_to_host());
}

#[test]
fn encoder_quality_to_crf_matches_spec_formula() {
    // crf = (255 - quality) / 5, clamped to the codec's range.
    let low_quality = EncoderOptions {
        quality: 0,
        ..EncoderOptions::default()
    };
    let high_quality = EncoderOptions {
        quality: 255,
        ..EncoderOptions::default()
    };
    assert_eq!(low_quality.crf(), 51);
    assert_eq!(high_quality.crf(), 0);
}

#[test]
fn pixel_format_auto_has_no_concrete_av_format() {
    assert_eq!(PixelFormat::Auto.into_option(), None);
    assert!(PixelFormat::Yuv420P.into_option().is_some());
}

#[test]
fn time_map_round_trips_frame_index_over_a_full_feature_length_file() {
    // The spec's concrete scenario: CFR 30fps, 19034 frames.
    let map = TimeMap::new(
        Rational::new(1, 90_000),
        Rational::new(1, 90_000),
        Rational::new(30, 1),
        0,
    );
    for i in [0i64, 1, 80, 9517, 19033] {
        assert_eq!(map.time_to_frame(map.frame_to_time(i)), i);
    }
}

#[test]
fn time_map_frame_80_lands_on_the_expected_presentation_time() {
    let map = TimeMap::new(
        Rational::new(1, 90_000),
        Rational::new(1, 90_000),
        Rational::new(30, 1),
        0,
    );
    // frame 80 at 30fps is 80/30 s = 2_666_666.67us, rounds to 2_666_667.
    assert_eq!(map.frame_to_time(80), 2_666_667);
    assert_eq!(map.time_to_frame(2_666_667), 80);
}
