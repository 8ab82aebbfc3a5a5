use crate::rational::{Rational, MICROSECOND_TIME_BASE};

/// Bi-directional, total, pure conversions between the three time bases a
/// decoded frame is addressed in — presentation microseconds, the
/// container's stream time base, and the decoder's codec time base — plus
/// conversion to and from a zero-based frame index.
///
/// All rescaling happens through exact integer rationals (`Rational::rescale`,
/// backed by `av_rescale_q_rnd`); no step goes through a floating-point
/// intermediate, so repeated conversions over a multi-hour file do not drift.
/// Rounding is "nearest, ties away from zero" throughout.
#[derive(Debug, Clone, Copy)]
pub struct TimeMap {
    stream_time_base: Rational,
    codec_time_base: Rational,
    frame_rate: Rational,
    /// First packet's timestamp in stream timebase units, captured once at open.
    stream_start_ts: i64,
    /// `stream_start_ts` rescaled to microseconds, cached since every
    /// frame<->time conversion needs it.
    stream_start_time_us: i64,
}

impl TimeMap {
    pub fn new(stream_time_base: Rational, codec_time_base: Rational, frame_rate: Rational, stream_start_ts: i64) -> Self {
        let stream_start_time_us = stream_time_base.rescale(stream_start_ts, MICROSECOND_TIME_BASE);
        Self {
            stream_time_base,
            codec_time_base,
            frame_rate,
            stream_start_ts,
            stream_start_time_us,
        }
    }

    pub fn stream_time_base(&self) -> Rational {
        self.stream_time_base
    }

    pub fn codec_time_base(&self) -> Rational {
        self.codec_time_base
    }

    pub fn frame_rate(&self) -> Rational {
        self.frame_rate
    }

    pub fn stream_start_ts(&self) -> i64 {
        self.stream_start_ts
    }

    pub fn stream_start_time_us(&self) -> i64 {
        self.stream_start_time_us
    }

    /// `frame→time(i) = stream_start_time + i / frame_rate`, expressed in µs.
    pub fn frame_to_time(&self, index: i64) -> i64 {
        let num = index as i128 * self.frame_rate.denominator() as i128 * 1_000_000;
        let den = self.frame_rate.numerator() as i128;
        self.stream_start_time_us + round_div(num, den)
    }

    /// `time→frame(t) = round((t − stream_start_time_µs) × frame_rate)`.
    pub fn time_to_frame(&self, time_us: i64) -> i64 {
        let delta = (time_us - self.stream_start_time_us) as i128;
        let num = delta * self.frame_rate.numerator() as i128;
        let den = self.frame_rate.denominator() as i128 * 1_000_000;
        round_div(num, den)
    }

    /// `time→stream_ts(t)`: rational rescaling using the stream timebase.
    pub fn time_to_stream_ts(&self, time_us: i64) -> i64 {
        MICROSECOND_TIME_BASE.rescale(time_us, self.stream_time_base)
    }

    /// `stream_ts→time(ts)`: rational rescaling using the stream timebase.
    pub fn stream_ts_to_time(&self, stream_ts: i64) -> i64 {
        self.stream_time_base.rescale(stream_ts, MICROSECOND_TIME_BASE)
    }

    /// `time→codec_ts(t)`: rational rescaling using the codec timebase.
    pub fn time_to_codec_ts(&self, time_us: i64) -> i64 {
        MICROSECOND_TIME_BASE.rescale(time_us, self.codec_time_base)
    }

    /// `codec_ts→time(ts)`: rational rescaling using the codec timebase.
    pub fn codec_ts_to_time(&self, codec_ts: i64) -> i64 {
        self.codec_time_base.rescale(codec_ts, MICROSECOND_TIME_BASE)
    }

    /// Direct rational rescaling between stream and codec time bases, with
    /// no trip through microseconds (and hence no extra rounding step).
    pub fn stream_ts_to_codec_ts(&self, stream_ts: i64) -> i64 {
        self.stream_time_base.rescale(stream_ts, self.codec_time_base)
    }

    /// Direct rational rescaling between codec and stream time bases.
    pub fn codec_ts_to_stream_ts(&self, codec_ts: i64) -> i64 {
        self.codec_time_base.rescale(codec_ts, self.stream_time_base)
    }
}

/// Round `num / den` to the nearest integer, ties away from zero. Both
/// arguments carry the sign; this mirrors `av_rescale_q_rnd(..., AV_ROUND_NEAR_INF)`
/// for the pure-integer arithmetic done outside of `Rational::rescale`.
fn round_div(num: i128, den: i128) -> i64 {
    debug_assert!(den != 0);
    let sign = if (num < 0) != (den < 0) { -1 } else { 1 };
    let num = num.unsigned_abs();
    let den = den.unsigned_abs();
    let q = num / den;
    let r = num % den;
    let rounded = if r * 2 >= den { q + 1 } else { q };
    sign * rounded as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfr_30fps() -> TimeMap {
        TimeMap::new(
            Rational::new(1, 90_000),
            Rational::new(1, 90_000),
            Rational::new(30, 1),
            0,
        )
    }

    #[test]
    fn frame_time_round_trip_is_exact() {
        let map = cfr_30fps();
        for i in 0..19_034i64 {
            let t = map.frame_to_time(i);
            assert_eq!(map.time_to_frame(t), i, "frame {i} did not round-trip");
        }
    }

    #[test]
    fn total_frames_matches_spec_scenario() {
        // 19034 frames at 30fps -> duration 634466666us (from the spec's
        // concrete end-to-end scenario).
        let map = cfr_30fps();
        let duration_us = map.frame_to_time(19_034) - map.frame_to_time(0);
        // 19034 frames / 30fps = 634466666.67us, rounds to 634466667 per-frame
        // but the scenario reports the container's own duration figure which
        // is derived independently; this just checks our arithmetic is sane.
        assert!((duration_us - 634_466_667).abs() <= 1);
    }

    #[test]
    fn stream_start_offset_shifts_frame_zero() {
        let map = TimeMap::new(
            Rational::new(1, 90_000),
            Rational::new(1, 90_000),
            Rational::new(30, 1),
            90_000, // one second of start offset, in stream timebase ticks
        );
        assert_eq!(map.stream_start_time_us(), 1_000_000);
        assert_eq!(map.frame_to_time(0), 1_000_000);
        assert_eq!(map.time_to_frame(1_000_000), 0);
    }

    #[test]
    fn stream_codec_direct_rescale_matches_via_micros() {
        let map = TimeMap::new(
            Rational::new(1001, 30_000),
            Rational::new(1, 90_000),
            Rational::new(30_000, 1001),
            0,
        );
        let stream_ts = 12_345i64;
        let direct = map.stream_ts_to_codec_ts(stream_ts);
        let via_us = map.time_to_codec_ts(map.stream_ts_to_time(stream_ts));
        assert!((direct - via_us).abs() <= 1);
    }
}
