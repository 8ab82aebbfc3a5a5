use crate::config::EncoderOptions;
use crate::demux::{Muxer, MuxerBuilder};
use crate::error::MediaError;
use crate::packet::Packet;
use crate::rational::Rational;

use std::path::Path;

type Result<T> = std::result::Result<T, MediaError>;

/// Builds an [`Encoder`]. Encoding is an external collaborator of this
/// crate's core (§1 Non-goals) — writing containers is out of scope — but
/// the symmetric write-side type is kept so callers configure it the same
/// way they configure a [`crate::streamcore::Stream`].
pub struct EncoderBuilder<'a> {
    destination: std::path::PathBuf,
    options: EncoderOptions,
    format: Option<&'a str>,
}

impl<'a> EncoderBuilder<'a> {
    pub fn new(destination: impl AsRef<Path>, options: EncoderOptions) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
            options,
            format: None,
        }
    }

    pub fn with_format(mut self, format: &'a str) -> Self {
        self.format = Some(format);
        self
    }

    pub fn build(self) -> Result<Encoder> {
        let mut muxer_builder = MuxerBuilder::new(&self.destination);
        if let Some(format) = self.format {
            muxer_builder = muxer_builder.with_format(format);
        }
        Ok(Encoder {
            muxer: muxer_builder.build()?,
            options: self.options,
            frame_count: 0,
        })
    }
}

/// Encodes frames into a video stream. Out of scope for this crate's core
/// (§1); kept as a stub so the public surface names the write path
/// symmetric to [`crate::streamcore::Stream`].
pub struct Encoder {
    muxer: Muxer,
    options: EncoderOptions,
    frame_count: u64,
}

impl Encoder {
    pub fn new(destination: impl AsRef<Path>, options: EncoderOptions) -> Result<Self> {
        EncoderBuilder::new(destination, options).build()
    }

    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    pub fn time_base(&self) -> Rational {
        Rational::new(1, self.options.gop_size.max(1) as i32 * 1000)
    }

    pub fn encode(&mut self, packet: &mut Packet) -> Result<()> {
        self.frame_count += 1;
        self.muxer.write_frame(packet)
    }

    pub fn finish(&mut self) -> Result<()> {
        self.muxer.write_trailer()
    }
}

unsafe impl Send for Encoder {}
unsafe impl Sync for Encoder {}
