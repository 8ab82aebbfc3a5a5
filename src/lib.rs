pub mod config;
pub mod decode;
pub mod demux;
pub mod encode;
pub mod error;
mod ffi_hwaccel;
mod flags;
pub mod filter;
pub mod hwaccel;
pub mod manager;
pub mod options;
pub mod packet;
pub mod pixel;
pub mod rational;
pub mod stream;
pub mod streamcore;
pub mod time;
pub mod videoframe;

pub use config::{DecoderOptions, EncoderOptions, HwType};
pub use decode::{DecodeOutcome, Decoder};
pub use demux::{Demuxer, DemuxerBuilder, Muxer, MuxerBuilder};
pub use encode::{Encoder, EncoderBuilder};
pub use error::{LogLevel, MediaError};
pub use ffi_hwaccel::HWDeviceContext;
pub use filter::{Crop, Scale};
pub use hwaccel::HWDeviceType;
pub use manager::Manager;
pub use options::Options;
pub use packet::Packet;
pub use pixel::{PixelFormat, Residency};
pub use rational::Rational;
pub use rsmpeg::ffi;
pub use streamcore::Stream;
pub use time::TimeMap;
pub use videoframe::{Frame, Plane};

/// Re-export of the underlying decoded frame type, for callers that need to
/// hand a frame to an external pixel-conversion helper (§1 Non-goals) without
/// an extra copy.
pub type RawFrame = rsmpeg::avutil::AVFrame;

pub const PIXEL_FORMAT_RGB24: ffi::AVPixelFormat = ffi::AV_PIX_FMT_RGB24;
pub const PIXEL_FORMAT_YUV420P: ffi::AVPixelFormat = ffi::AV_PIX_FMT_YUV420P;
pub const PIXEL_FORMAT_NV12: ffi::AVPixelFormat = ffi::AV_PIX_FMT_NV12;
