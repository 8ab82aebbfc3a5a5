use crate::error::MediaError;
use crate::hwaccel::{HWContext, HWDeviceType};
use crate::packet::Packet;
use crate::rational::Rational;

use rsmpeg::avcodec::{AVCodec, AVCodecContext, AVCodecParameters};
use rsmpeg::avutil::AVFrame;
use rsmpeg::error::RsmpegError;
use rsmpeg::ffi;

type Result<T> = std::result::Result<T, MediaError>;

/// Maximum invocations of `receive_frame` used to drain whatever is still
/// queued inside the codec when a `Decoder` is dropped mid-stream.
const MAX_DRAIN_ITERATIONS: u32 = 100;

/// The three outcomes `receive_frame` can produce, shared with `FilterChain`
/// so `StreamCore`'s fill loop drives both through the same state machine.
pub enum DecodeOutcome {
    /// A frame is ready.
    Frame(AVFrame),
    /// No frame yet; feed another packet via `send_packet`.
    NeedMore,
    /// End of stream reached after a flush; no more frames will ever come.
    Drained,
}

/// Wraps one codec instance, optionally hardware-backed. Parameterised from
/// the demuxer's stream; owns nothing the demuxer needs back.
pub struct Decoder {
    ctx: AVCodecContext,
    codec_time_base: Rational,
    hw: Option<HWContext>,
    draining: bool,
    /// Whether hardware-resident frames should be copied to host memory
    /// before being handed further down the pipeline. When false, frames
    /// stay device-resident (§6 `output_to_host`) and the caller is
    /// responsible for activating the originating device context before
    /// touching their pixel bytes.
    output_to_host: bool,
}

impl Decoder {
    /// Build a decoder for the stream described by `codecpar`/`stream_time_base`.
    /// If `hw_device_type` is set, negotiates a hardware pixel format with the
    /// codec; per §4.3, a failed negotiation fails construction rather than
    /// silently falling back to software decode.
    pub fn new(
        codecpar: &AVCodecParameters,
        stream_time_base: Rational,
        hw_device_type: Option<HWDeviceType>,
        shared_device_context: Option<crate::ffi_hwaccel::HWDeviceContext>,
        output_to_host: bool,
    ) -> Result<Self> {
        let codec = AVCodec::find_decoder(codecpar.codec_id)
            .ok_or(MediaError::UninitializedCodec)?;

        let mut ctx = AVCodecContext::new(&codec);
        ctx.set_time_base(stream_time_base.into());
        ctx.apply_codecpar(codecpar)
            .map_err(|_| MediaError::InvalidCodecParameters)?;

        let hw = match (hw_device_type, shared_device_context) {
            (Some(device_type), Some(device_context)) => Some(HWContext::with_shared_device(
                &codec,
                &mut ctx,
                device_type,
                device_context,
            )?),
            (Some(device_type), None) => Some(HWContext::new(&codec, &mut ctx, device_type)?),
            (None, _) => None,
        };

        ctx.open(None)
            .map_err(|e| MediaError::OpenFailed(e.to_string()))?;

        Ok(Self {
            codec_time_base: ctx.time_base.into(),
            ctx,
            hw,
            draining: false,
            output_to_host,
        })
    }

    pub fn codec_time_base(&self) -> Rational {
        self.codec_time_base
    }

    /// Upper bound on packets that may be consumed before the first frame
    /// emerges; exposed by the codec via `AVCodecContext.delay` once opened.
    /// Driven by B-frames, codec look-ahead and internal pipelining.
    pub fn codec_delay(&self) -> i32 {
        self.ctx.delay.max(0)
    }

    pub fn is_hardware(&self) -> bool {
        self.hw.is_some()
    }

    /// The negotiated hardware device context, if this decoder is
    /// hardware-backed. Frames built from its output clone this to keep the
    /// device alive for as long as any derived `Frame` is outstanding.
    pub fn hw_device_context(&self) -> Option<&crate::ffi_hwaccel::HWDeviceContext> {
        self.hw.as_ref().map(HWContext::device_context)
    }

    /// Feed one compressed packet. Its timestamps are rescaled from the
    /// stream time base to the codec time base before being handed to the
    /// underlying codec, matching the demuxer->decoder boundary (§2).
    pub fn send_packet(&mut self, mut packet: Packet, stream_time_base: Rational) -> Result<()> {
        packet.rescale_ts(stream_time_base, self.codec_time_base);
        self.ctx
            .send_packet(Some(packet.as_inner()))
            .map_err(MediaError::from)
    }

    /// Signal end of stream; subsequent `receive_frame` calls drain whatever
    /// is still buffered, eventually reporting `Drained`.
    pub fn send_flush(&mut self) -> Result<()> {
        self.ctx.send_packet(None)?;
        self.draining = true;
        Ok(())
    }

    pub fn receive_frame(&mut self) -> Result<DecodeOutcome> {
        match self.ctx.receive_frame() {
            Ok(frame) => Ok(DecodeOutcome::Frame(self.maybe_download(frame)?)),
            Err(RsmpegError::DecoderDrainError) => Ok(DecodeOutcome::NeedMore),
            Err(RsmpegError::DecoderFlushedError) => Ok(DecodeOutcome::Drained),
            Err(e) => Err(e.into()),
        }
    }

    fn maybe_download(&self, frame: AVFrame) -> Result<AVFrame> {
        match &self.hw {
            Some(hw) if self.output_to_host && hw.is_hw_frame(&frame) => hw.download_frame(&frame),
            _ => Ok(frame),
        }
    }

    /// True if `frame` is still device-resident (hardware decode with
    /// `output_to_host` disabled).
    pub fn is_device_resident(&self, frame: &AVFrame) -> bool {
        matches!(&self.hw, Some(hw) if hw.is_hw_frame(frame))
    }

    /// Discard all pending decoder state; required after a long seek that
    /// flushed the decoder (§4.5 seek policy, case 3).
    pub fn reset(&mut self) {
        unsafe {
            ffi::avcodec_flush_buffers(self.ctx.as_mut_ptr());
        }
        self.draining = false;
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        if !self.draining && self.ctx.send_packet(None).is_ok() {
            for _ in 0..MAX_DRAIN_ITERATIONS {
                if self.ctx.receive_frame().is_err() {
                    break;
                }
            }
        }
    }
}

unsafe impl Send for Decoder {}
unsafe impl Sync for Decoder {}
