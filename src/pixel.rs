use rsmpeg::ffi;

/// The closed set of pixel formats this crate understands as a filter-chain
/// output target. `Auto` is not a real pixel format; it means "retain the
/// source format" and is resolved away before a `FilterChain` is built.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Auto,
    Yuv420P,
    Yuv422P,
    Yuv444P,
    Nv12,
    Rgb8,
    Bgr8,
    Gbr8P,
    Rgb8P,
    Rgb32FP,
}

impl PixelFormat {
    /// `None` for `Auto` ("keep the source format"), else the concrete
    /// libav pixel format.
    pub fn into_option(self) -> Option<ffi::AVPixelFormat> {
        self.into()
    }

    /// Bits per pixel, summed across planes at full resolution (chroma
    /// subsampling already accounted for). Used to compute
    /// `FilterChain::frame_size_bytes`.
    pub fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Auto => 0,
            PixelFormat::Yuv420P => 12,
            PixelFormat::Yuv422P => 16,
            PixelFormat::Yuv444P => 24,
            PixelFormat::Nv12 => 12,
            PixelFormat::Rgb8 | PixelFormat::Bgr8 | PixelFormat::Gbr8P | PixelFormat::Rgb8P => 24,
            PixelFormat::Rgb32FP => 96,
        }
    }
}

impl From<PixelFormat> for Option<ffi::AVPixelFormat> {
    fn from(value: PixelFormat) -> Self {
        match value {
            PixelFormat::Auto => None,
            PixelFormat::Yuv420P => Some(ffi::AV_PIX_FMT_YUV420P),
            PixelFormat::Yuv422P => Some(ffi::AV_PIX_FMT_YUV422P),
            PixelFormat::Yuv444P => Some(ffi::AV_PIX_FMT_YUV444P),
            PixelFormat::Nv12 => Some(ffi::AV_PIX_FMT_NV12),
            PixelFormat::Rgb8 => Some(ffi::AV_PIX_FMT_RGB24),
            PixelFormat::Bgr8 => Some(ffi::AV_PIX_FMT_BGR24),
            PixelFormat::Gbr8P => Some(ffi::AV_PIX_FMT_GBRP),
            PixelFormat::Rgb8P => Some(ffi::AV_PIX_FMT_GBRP),
            PixelFormat::Rgb32FP => Some(ffi::AV_PIX_FMT_GBRPF32),
        }
    }
}

impl TryFrom<ffi::AVPixelFormat> for PixelFormat {
    type Error = ();

    fn try_from(value: ffi::AVPixelFormat) -> Result<Self, Self::Error> {
        match value {
            x if x == ffi::AV_PIX_FMT_YUV420P => Ok(PixelFormat::Yuv420P),
            x if x == ffi::AV_PIX_FMT_YUV422P => Ok(PixelFormat::Yuv422P),
            x if x == ffi::AV_PIX_FMT_YUV444P => Ok(PixelFormat::Yuv444P),
            x if x == ffi::AV_PIX_FMT_NV12 => Ok(PixelFormat::Nv12),
            x if x == ffi::AV_PIX_FMT_RGB24 => Ok(PixelFormat::Rgb8),
            x if x == ffi::AV_PIX_FMT_BGR24 => Ok(PixelFormat::Bgr8),
            x if x == ffi::AV_PIX_FMT_GBRP => Ok(PixelFormat::Gbr8P),
            x if x == ffi::AV_PIX_FMT_GBRPF32 => Ok(PixelFormat::Rgb32FP),
            _ => Err(()),
        }
    }
}

/// Memory residency of a frame's pixel data.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Residency {
    Software,
    Cuda,
}
