use rsmpeg::error::RsmpegError;

/// Errors surfaced across the crate boundary, matching the error taxonomy of
/// the open/decode/seek/batch pipeline: one variant per category that a
/// caller can usefully match on, plus a catch-all for the underlying FFI
/// layer's own error codes.
///
/// Category 2 (decode transient) and category 6 (invariant violation) are
/// logged and absorbed at the `StreamCore` boundary rather than surfaced as
/// a distinct variant here — they never escape as an `Err`. Category 5
/// (batch partial) is likewise not an error: it is the documented
/// short-`Vec` return of the batch retrieval methods.
#[derive(Debug)]
pub enum MediaError {
    /// Category 1: container could not be opened, no video stream found,
    /// codec unsupported, hardware device unavailable, or filter graph
    /// construction failed.
    OpenFailed(String),
    /// Category 3: codec delay exceeded without the decoder producing a
    /// frame. Carries the number of packets supplied without output.
    DecodeStall { packets_without_output: u32 },
    /// Category 4: seek target was negative or at/beyond the stream duration.
    SeekOutOfRange { target_us: i64, duration_us: i64 },
    /// Category 6, when surfaced as a hard error rather than an empty vector
    /// (e.g. an unsorted batch request detected before any I/O is attempted).
    InvalidSequence(String),
    ReadExhausted,
    DecodeExhausted,
    InvalidFrameFormat,
    InvalidPixelFormat,
    UninitializedCodec,
    InvalidCodecParameters,
    UnsupportedHardwareDeviceType,
    FilterGraphFailed(String),
    /// Anything else from the FFI layer that does not map onto a category
    /// above.
    Backend(RsmpegError),
}

impl std::error::Error for MediaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MediaError::Backend(internal) => Some(internal),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MediaError::OpenFailed(msg) => write!(f, "failed to open stream: {msg}"),
            MediaError::DecodeStall {
                packets_without_output,
            } => write!(
                f,
                "decode stall: {packets_without_output} packets supplied without a frame"
            ),
            MediaError::SeekOutOfRange {
                target_us,
                duration_us,
            } => write!(
                f,
                "seek target {target_us}us out of range (duration {duration_us}us)"
            ),
            MediaError::InvalidSequence(msg) => write!(f, "invalid request sequence: {msg}"),
            MediaError::ReadExhausted => write!(f, "stream exhausted"),
            MediaError::DecodeExhausted => write!(f, "decoder exhausted"),
            MediaError::InvalidFrameFormat => write!(
                f,
                "decoded frame does not match the expected dimensions and/or pixel format"
            ),
            MediaError::InvalidPixelFormat => write!(f, "invalid pixel format"),
            MediaError::UninitializedCodec => write!(f, "codec context is not initialized"),
            MediaError::InvalidCodecParameters => write!(f, "invalid codec parameters"),
            MediaError::UnsupportedHardwareDeviceType => {
                write!(f, "codec does not support the requested hardware device type")
            }
            MediaError::FilterGraphFailed(msg) => write!(f, "filter graph construction failed: {msg}"),
            MediaError::Backend(internal) => internal.fmt(f),
        }
    }
}

impl From<RsmpegError> for MediaError {
    fn from(internal: RsmpegError) -> MediaError {
        MediaError::Backend(internal)
    }
}

pub type Result<T> = std::result::Result<T, MediaError>;

/// Mirrors the libav verbosity ladder (`AV_LOG_*`), exposed so callers can
/// pick how noisy the process-wide ffmpeg log callback should be. Orthogonal
/// to a `tracing` subscriber's own level filter, which callers configure
/// independently.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Quiet,
    Panic,
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    Debug,
}

impl LogLevel {
    /// Install this level as the process-wide ffmpeg log level and route
    /// ffmpeg's own log callback through `tracing`.
    pub fn install(self) {
        unsafe {
            rsmpeg::ffi::av_log_set_level(self.to_av_log_level());
        }
    }

    fn to_av_log_level(self) -> i32 {
        use rsmpeg::ffi::*;
        match self {
            LogLevel::Quiet => AV_LOG_QUIET,
            LogLevel::Panic => AV_LOG_PANIC,
            LogLevel::Fatal => AV_LOG_FATAL,
            LogLevel::Error => AV_LOG_ERROR,
            LogLevel::Warning => AV_LOG_WARNING,
            LogLevel::Info => AV_LOG_INFO,
            LogLevel::Verbose => AV_LOG_VERBOSE,
            LogLevel::Debug => AV_LOG_DEBUG,
        }
    }
}
