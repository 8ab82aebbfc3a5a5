use rsmpeg::ffi;
use std::fmt;

/// An exact rational number, used throughout for time base and frame rate
/// arithmetic so that rescaling never goes through a floating-point
/// intermediate.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rational(i32, i32);

impl Rational {
    /// Create a new `Rational` from a numerator and a denominator.
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self(numerator, denominator)
    }

    pub const fn numerator(&self) -> i32 {
        self.0
    }

    pub const fn denominator(&self) -> i32 {
        self.1
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / self.1 as f64
    }

    /// Rescale an integer timestamp expressed in `self` units into `to` units,
    /// rounding to nearest with ties away from zero. Uses `av_rescale_q_rnd`
    /// so the arithmetic happens in exact 64-bit rational form, never through
    /// a floating-point intermediate.
    pub fn rescale(&self, value: i64, to: Rational) -> i64 {
        unsafe {
            ffi::av_rescale_q_rnd(
                value,
                (*self).into(),
                to.into(),
                ffi::AV_ROUND_NEAR_INF,
            )
        }
    }
}

impl From<ffi::AVRational> for Rational {
    fn from(value: ffi::AVRational) -> Self {
        Self(value.num, value.den)
    }
}

impl From<Rational> for ffi::AVRational {
    fn from(value: Rational) -> Self {
        ffi::AVRational {
            num: value.0,
            den: value.1,
        }
    }
}

impl From<(i32, i32)> for Rational {
    fn from(value: (i32, i32)) -> Self {
        Self(value.0, value.1)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

/// Microsecond time base: one tick per microsecond, matching the canonical
/// external unit presentation timestamps are reported in.
pub const MICROSECOND_TIME_BASE: Rational = Rational::new(1, 1_000_000);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_identity_is_value() {
        let tb = Rational::new(1, 90_000);
        assert_eq!(tb.rescale(12345, tb), 12345);
    }

    #[test]
    fn rescale_stream_to_micros() {
        // 1/30 s timebase, tick 1 -> 33333 or 33334 us depending on rounding.
        let stream_tb = Rational::new(1, 30);
        let ts = stream_tb.rescale(1, MICROSECOND_TIME_BASE);
        assert_eq!(ts, 33_333);
    }

    #[test]
    fn rescale_round_trip_is_stable() {
        let stream_tb = Rational::new(1001, 30_000);
        let codec_tb = Rational::new(1, 90_000);
        let ts = 12_345i64;
        let forward = stream_tb.rescale(ts, codec_tb);
        let back = codec_tb.rescale(forward, stream_tb);
        // Round trips through a finer timebase lose at most the original
        // tick's worth of precision.
        assert!((back - ts).abs() <= 1);
    }
}
