use crate::ffi_hwaccel::HWDeviceContext;
use crate::pixel::{PixelFormat, Residency};

use rsmpeg::avutil::AVFrame;
use rsmpeg::ffi;

/// One decoded plane: a data pointer plus its row stride in bytes.
///
/// In `Cuda` residency the pointer is a device address; dereferencing it is
/// only valid after activating the originating device context (see
/// [`Frame::device_context`]). This crate never reads the bytes itself.
#[derive(Debug, Copy, Clone)]
pub struct Plane {
    pub data: *const u8,
    pub stride: i32,
}

/// An immutable decoded image, addressed by both its presentation
/// timestamp and its zero-based frame index (§3). Cheap to clone: the
/// underlying `AVFrame` buffer is reference-counted by libav, so cloning a
/// `Frame` never copies pixel data.
///
/// A `Frame` never holds a reference back to the `Stream` that produced it
/// (§9 cyclic ownership note) — only to the hardware device context it may
/// need to stay alive, so callers can hold frames after the `Stream` itself
/// has been dropped.
#[derive(Clone)]
pub struct Frame {
    av_frame: AVFrame,
    timestamp_us: i64,
    index: i64,
    width: u32,
    height: u32,
    aspect_ratio: f64,
    pixel_format: PixelFormat,
    residency: Residency,
    device_context: Option<HWDeviceContext>,
}

impl Frame {
    pub(crate) fn new(
        av_frame: AVFrame,
        timestamp_us: i64,
        index: i64,
        width: u32,
        height: u32,
        aspect_ratio: f64,
        pixel_format: PixelFormat,
        residency: Residency,
        device_context: Option<HWDeviceContext>,
    ) -> Self {
        Self {
            av_frame,
            timestamp_us,
            index,
            width,
            height,
            aspect_ratio,
            pixel_format,
            residency,
            device_context,
        }
    }

    /// Presentation timestamp in microseconds, the canonical external unit.
    pub fn timestamp_us(&self) -> i64 {
        self.timestamp_us
    }

    /// Zero-based frame index in the stream.
    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    /// Whether this frame's pixel bytes live in host memory or in the
    /// memory space of a hardware accelerator.
    pub fn residency(&self) -> Residency {
        self.residency
    }

    /// The device context backing a `Cuda`-resident frame's memory. `None`
    /// for host-resident frames. Must be activated before the planes
    /// returned by [`Frame::plane`] are dereferenced.
    pub fn device_context(&self) -> Option<&HWDeviceContext> {
        self.device_context.as_ref()
    }

    pub fn num_planes(&self) -> usize {
        unsafe { ffi::av_pix_fmt_count_planes(self.av_frame.format).max(0) as usize }
    }

    /// Data pointer and row stride for `plane`, or `None` if out of range.
    pub fn plane(&self, plane: usize) -> Option<Plane> {
        if plane >= self.num_planes() {
            return None;
        }
        Some(Plane {
            data: self.av_frame.data[plane] as *const u8,
            stride: self.av_frame.linesize[plane],
        })
    }

    /// Access to the underlying `AVFrame`, for callers that need to hand
    /// the frame to an external pixel-conversion helper (§1, out of scope
    /// for this crate) without an extra copy.
    pub fn raw(&self) -> &AVFrame {
        &self.av_frame
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("timestamp_us", &self.timestamp_us)
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_format", &self.pixel_format)
            .field("residency", &self.residency)
            .finish()
    }
}

unsafe impl Send for Frame {}
unsafe impl Sync for Frame {}
