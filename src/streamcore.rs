use crate::config::DecoderOptions;
use crate::decode::{DecodeOutcome, Decoder};
use crate::demux::Demuxer;
use crate::error::MediaError;
use crate::ffi_hwaccel::HWDeviceContext;
use crate::filter::{FilterChain, FilterInput};
use crate::packet::Packet;
use crate::pixel::{PixelFormat, Residency};
use crate::rational::Rational;
use crate::time::TimeMap;
use crate::videoframe::Frame;

use rsmpeg::avutil::AVFrame;
use rsmpeg::ffi;

use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::path::Path;

type Result<T> = std::result::Result<T, MediaError>;

/// Narrow seam between `StreamCore`'s buffer/seek orchestration and the
/// demux->decode machinery that actually produces frames. Exists so the
/// orchestration logic can be driven by a synthetic fake in tests (no
/// filesystem, no real codec) without StreamCore itself knowing the
/// difference — see the `FakePipeline` harness in this module's tests.
pub(crate) trait Pipeline: Send {
    fn read_packet(&mut self) -> Result<Packet>;
    fn demux_seek(&mut self, target_ts: i64) -> Result<()>;
    fn send_packet(&mut self, packet: Packet) -> Result<()>;
    fn send_flush(&mut self) -> Result<()>;
    fn receive_frame(&mut self) -> Result<DecodeOutcome>;
    fn codec_delay(&self) -> i32;
    fn reset_decoder(&mut self);
    fn is_device_resident(&self, frame: &AVFrame) -> bool;
    fn hw_device_context(&self) -> Option<&HWDeviceContext>;
}

/// Real demux+decode pipeline backing a file-backed [`Stream`].
pub(crate) struct FfmpegPipeline {
    demuxer: Demuxer,
    decoder: Decoder,
    stream_time_base: Rational,
}

impl Pipeline for FfmpegPipeline {
    fn read_packet(&mut self) -> Result<Packet> {
        self.demuxer.read_packet()
    }

    fn demux_seek(&mut self, target_ts: i64) -> Result<()> {
        self.demuxer.seek(target_ts)
    }

    fn send_packet(&mut self, packet: Packet) -> Result<()> {
        self.decoder.send_packet(packet, self.stream_time_base)
    }

    fn send_flush(&mut self) -> Result<()> {
        self.decoder.send_flush()
    }

    fn receive_frame(&mut self) -> Result<DecodeOutcome> {
        self.decoder.receive_frame()
    }

    fn codec_delay(&self) -> i32 {
        self.decoder.codec_delay()
    }

    fn reset_decoder(&mut self) {
        self.decoder.reset()
    }

    fn is_device_resident(&self, frame: &AVFrame) -> bool {
        self.decoder.is_device_resident(frame)
    }

    fn hw_device_context(&self) -> Option<&HWDeviceContext> {
        self.decoder.hw_device_context()
    }
}

/// Best-effort presentation timestamp per frame, preferring the decoder's
/// reordered estimate over the raw `pts` (mirrors the original's use of
/// `frame->best_effort_timestamp`).
fn best_effort_ts(frame: &AVFrame) -> i64 {
    if frame.best_effort_timestamp != ffi::AV_NOPTS_VALUE {
        frame.best_effort_timestamp
    } else {
        frame.pts
    }
}

/// Mutable state behind the lock: the double buffer, its head cursor, and
/// whatever demux/decode progress has been made. Plain `&mut self` methods
/// only — no locking happens at this layer, so every method here is safe to
/// call from within another (the re-entrancy lives one layer up, in
/// [`StreamCore`]'s public methods).
struct StreamCoreInner<P: Pipeline> {
    pipeline: P,
    filter: FilterChain,
    ping: Vec<Frame>,
    pong: Vec<Frame>,
    head: usize,
    buffer_length: usize,
    /// Packet-count threshold past which a fill with no output is a decode
    /// stall (§9: `codec_delay + buffer_length` by default, overridable).
    stall_threshold: i64,
    no_buffer_flush: bool,
    total_duration_us: i64,
    demuxer_drained: bool,
    decoder_flushed: bool,
    discard_until: Option<i64>,
}

enum SeekPlan {
    InBuffer,
    ShortForward,
    Long,
}

impl<P: Pipeline> StreamCoreInner<P> {
    fn fill_pong(&mut self, time_map: &TimeMap) -> Result<()> {
        let discard_until = self.discard_until.take();
        let mut packets_without_output: i64 = 0;

        while self.pong.len() < self.buffer_length && !self.demuxer_drained {
            if !self.decoder_flushed {
                match self.pipeline.read_packet() {
                    Ok(packet) => self.pipeline.send_packet(packet)?,
                    Err(MediaError::ReadExhausted) => {
                        self.pipeline.send_flush()?;
                        self.decoder_flushed = true;
                    }
                    Err(e) => return Err(e),
                }
            }

            loop {
                match self.pipeline.receive_frame()? {
                    DecodeOutcome::Frame(raw) => {
                        packets_without_output = 0;
                        self.push_through_filter(raw, discard_until, time_map)?;
                    }
                    DecodeOutcome::NeedMore => {
                        packets_without_output += 1;
                        break;
                    }
                    DecodeOutcome::Drained => {
                        self.demuxer_drained = true;
                        break;
                    }
                }
            }

            if packets_without_output > self.stall_threshold {
                return Err(MediaError::DecodeStall {
                    packets_without_output: packets_without_output as u32,
                });
            }
        }
        Ok(())
    }

    fn push_through_filter(
        &mut self,
        raw: AVFrame,
        discard_until: Option<i64>,
        time_map: &TimeMap,
    ) -> Result<()> {
        let device_resident = self.pipeline.is_device_resident(&raw);
        match self.filter.submit(raw)? {
            Some(direct) => self.append_frame(direct, device_resident, discard_until, time_map),
            None => loop {
                match self.filter.retrieve()? {
                    // Non-trivial chains over hardware-resident input are
                    // rejected at construction, so anything coming out of a
                    // real filter graph is host-resident.
                    DecodeOutcome::Frame(filtered) => {
                        self.append_frame(filtered, false, discard_until, time_map)
                    }
                    DecodeOutcome::NeedMore | DecodeOutcome::Drained => break,
                }
            },
        }
        Ok(())
    }

    fn append_frame(
        &mut self,
        raw: AVFrame,
        device_resident: bool,
        discard_until: Option<i64>,
        time_map: &TimeMap,
    ) {
        let codec_ts = best_effort_ts(&raw);
        if let Some(cutoff) = discard_until {
            if codec_ts < cutoff {
                return;
            }
        }
        let timestamp_us = time_map.codec_ts_to_time(codec_ts);
        let index = time_map.time_to_frame(timestamp_us);
        let residency = if device_resident {
            Residency::Cuda
        } else {
            Residency::Software
        };
        let device_context = if residency == Residency::Cuda {
            self.pipeline.hw_device_context().cloned()
        } else {
            None
        };
        let frame = Frame::new(
            raw,
            timestamp_us,
            index,
            self.filter.width(),
            self.filter.height(),
            self.filter.aspect_ratio(),
            self.filter.pixel_format(),
            residency,
            device_context,
        );
        self.pong.push(frame);
    }

    /// Steps 1-3 of §4.5's buffer discipline.
    fn peek_next(&mut self, time_map: &TimeMap) -> Result<Option<Frame>> {
        if self.head < self.ping.len() {
            return Ok(Some(self.ping[self.head].clone()));
        }
        self.fill_pong(time_map)?;
        std::mem::swap(&mut self.ping, &mut self.pong);
        self.head = 0;
        self.pong.clear();
        Ok(self.ping.first().cloned())
    }

    fn get_next(&mut self, time_map: &TimeMap) -> Result<Option<Frame>> {
        let frame = self.peek_next(time_map)?;
        if frame.is_some() {
            self.head += 1;
        }
        Ok(frame)
    }

    fn is_end_of_file(&self) -> bool {
        self.demuxer_drained && self.head >= self.ping.len() && self.pong.is_empty()
    }

    fn classify_seek(&self, target_us: i64, time_map: &TimeMap) -> SeekPlan {
        if self.head >= self.ping.len() {
            return SeekPlan::Long;
        }
        let head_ts = self.ping[self.head].timestamp_us();
        let back_ts = self.ping[self.ping.len() - 1].timestamp_us();
        if head_ts <= target_us && target_us <= back_ts {
            return SeekPlan::InBuffer;
        }
        let delta = (self.ping.len() as i64 - 1 - self.head as i64).max(0);
        let n = self.buffer_length as i64;
        let span = time_map.frame_to_time(2 * (delta + n)) - time_map.stream_start_time_us();
        if target_us > back_ts && target_us <= back_ts + span {
            return SeekPlan::ShortForward;
        }
        SeekPlan::Long
    }

    fn walk_in_buffer(&mut self, target_us: i64) {
        while self.head < self.ping.len() && self.ping[self.head].timestamp_us() < target_us {
            self.head += 1;
        }
    }

    fn begin_long_seek(&mut self, target_us: i64, time_map: &TimeMap) -> Result<()> {
        let stream_ts = time_map.time_to_stream_ts(target_us);
        let previous_head_ts = self.ping.get(self.head).map(Frame::timestamp_us);
        let skip_reset =
            self.no_buffer_flush && previous_head_ts.is_some_and(|ts| ts < target_us);

        self.pipeline.demux_seek(stream_ts)?;
        if !skip_reset {
            self.pipeline.reset_decoder();
        }

        self.ping.clear();
        self.pong.clear();
        self.head = 0;
        self.demuxer_drained = false;
        self.decoder_flushed = false;
        self.discard_until = Some(time_map.time_to_codec_ts(target_us));
        Ok(())
    }
}

/// The generic double-buffer/seek orchestrator (§2, ~50% of the core). The
/// public type callers use is [`Stream`], a type alias over the real
/// [`FfmpegPipeline`]; the generic parameter exists so the exact same logic
/// runs against a synthetic [`Pipeline`] in unit tests.
pub struct StreamCore<P: Pipeline> {
    inner: ReentrantMutex<RefCell<StreamCoreInner<P>>>,
    time_map: TimeMap,
    buffer_length: usize,
    total_frames: i64,
    total_duration_us: i64,
}

/// A stateful handle bound to one opened file (§3); the public surface of
/// this crate's core.
pub type Stream = StreamCore<FfmpegPipeline>;

impl StreamCore<FfmpegPipeline> {
    /// Open `path` and negotiate a decode pipeline per `options`.
    pub fn open(path: impl AsRef<Path>, options: &DecoderOptions) -> Result<Self> {
        let mut demuxer = Demuxer::open(path)?;
        let codecpar = demuxer.codecpar();
        let stream_time_base = demuxer.stream_time_base();
        let frame_rate = demuxer.avg_frame_rate();
        let sample_aspect_ratio = demuxer.sample_aspect_ratio();
        let stream_start_ts = demuxer.stream_start_ts();

        let decoder = Decoder::new(
            &codecpar,
            stream_time_base,
            options.hw_type().device_type(),
            options.device_context.clone(),
            options.output_to_host(),
        )?;

        let codec_time_base = decoder.codec_time_base();
        let time_map = TimeMap::new(stream_time_base, codec_time_base, frame_rate, stream_start_ts);

        let total_frames = demuxer.total_frames(&time_map).unwrap_or(i64::MAX);
        let total_duration_us = demuxer.total_duration_us(&time_map).unwrap_or(i64::MAX);

        let filter_input = FilterInput {
            width: codecpar.width as u32,
            height: codecpar.height as u32,
            pixel_format: codecpar.format,
            time_base: codec_time_base,
            frame_rate,
            sample_aspect_ratio,
            is_hardware: decoder.is_hardware(),
        };
        let filter = FilterChain::new(options.crop, options.scale, options.format, &filter_input)?;

        let stall_threshold = options
            .seek_threshold
            .unwrap_or(decoder.codec_delay() as i64 + options.buffer_length() as i64);

        let pipeline = FfmpegPipeline {
            demuxer,
            decoder,
            stream_time_base,
        };

        let state = StreamCoreInner {
            pipeline,
            filter,
            ping: Vec::new(),
            pong: Vec::new(),
            head: 0,
            buffer_length: options.buffer_length(),
            stall_threshold,
            no_buffer_flush: options.no_buffer_flush(),
            total_duration_us,
            demuxer_drained: false,
            decoder_flushed: false,
            discard_until: None,
        };

        Ok(Self {
            inner: ReentrantMutex::new(RefCell::new(state)),
            time_map,
            buffer_length: options.buffer_length(),
            total_frames,
            total_duration_us,
        })
    }
}

impl<P: Pipeline> StreamCore<P> {
    #[cfg(test)]
    pub(crate) fn from_parts(
        pipeline: P,
        filter: FilterChain,
        time_map: TimeMap,
        buffer_length: usize,
        stall_threshold: i64,
        no_buffer_flush: bool,
        total_frames: i64,
        total_duration_us: i64,
    ) -> Self {
        let state = StreamCoreInner {
            pipeline,
            filter,
            ping: Vec::new(),
            pong: Vec::new(),
            head: 0,
            buffer_length,
            stall_threshold,
            no_buffer_flush,
            total_duration_us,
            demuxer_drained: false,
            decoder_flushed: false,
            discard_until: None,
        };
        Self {
            inner: ReentrantMutex::new(RefCell::new(state)),
            time_map,
            buffer_length,
            total_frames,
            total_duration_us,
        }
    }

    pub fn total_frames(&self) -> i64 {
        self.total_frames
    }

    pub fn total_duration_us(&self) -> i64 {
        self.total_duration_us
    }

    pub fn frame_rate(&self) -> Rational {
        self.time_map.frame_rate()
    }

    pub fn max_frames(&self) -> usize {
        self.buffer_length
    }

    pub fn frame_to_time(&self, index: i64) -> i64 {
        self.time_map.frame_to_time(index)
    }

    pub fn time_to_frame(&self, time_us: i64) -> i64 {
        self.time_map.time_to_frame(time_us)
    }

    pub fn peek_next(&self) -> Result<Option<Frame>> {
        let guard = self.inner.lock();
        guard.borrow_mut().peek_next(&self.time_map)
    }

    pub fn get_next(&self) -> Result<Option<Frame>> {
        let guard = self.inner.lock();
        guard.borrow_mut().get_next(&self.time_map)
    }

    pub fn is_end_of_file(&self) -> bool {
        let guard = self.inner.lock();
        guard.borrow().is_end_of_file()
    }

    /// §3 output width, after crop/scale, in pixels.
    pub fn width(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().filter.width()
    }

    /// §3 output height, after crop/scale, in pixels.
    pub fn height(&self) -> u32 {
        let guard = self.inner.lock();
        guard.borrow().filter.height()
    }

    /// §3 output display aspect ratio, after crop/scale/SAR correction.
    pub fn aspect_ratio(&self) -> f64 {
        let guard = self.inner.lock();
        guard.borrow().filter.aspect_ratio()
    }

    /// §3 output pixel format: the filter sink's format when a filter chain
    /// exists, never the raw decoder `sw_pix_fmt`.
    pub fn pixel_format(&self) -> PixelFormat {
        let guard = self.inner.lock();
        guard.borrow().filter.pixel_format()
    }

    fn current_position_time_us(&self) -> i64 {
        let guard = self.inner.lock();
        let state = guard.borrow();
        if state.head < state.ping.len() {
            state.ping[state.head].timestamp_us()
        } else {
            state.ping.last().map(Frame::timestamp_us).unwrap_or(0)
        }
    }

    /// `seek(time_µs)` (§4.5). Picks among the four cases in order of
    /// preference and re-enters the public, self-locking `peek_next`/
    /// `get_next` to land on the target — this is the re-entrant call chain
    /// §5 requires a re-entrant mutex for.
    pub fn seek(&self, target_us: i64) -> bool {
        if target_us < 0 || target_us >= self.total_duration_us {
            return false;
        }

        let plan = {
            let guard = self.inner.lock();
            let state = guard.borrow();
            state.classify_seek(target_us, &self.time_map)
        };

        if matches!(plan, SeekPlan::InBuffer) {
            let guard = self.inner.lock();
            guard.borrow_mut().walk_in_buffer(target_us);
            return true;
        }

        if matches!(plan, SeekPlan::Long) {
            let guard = self.inner.lock();
            match guard.borrow_mut().begin_long_seek(target_us, &self.time_map) {
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "long seek failed");
                    return false;
                }
            }
        }

        // Short-forward and the tail of a long seek both land the same way:
        // keep walking forward through refills until the target is reached.
        loop {
            match self.peek_next() {
                Ok(Some(frame)) => {
                    if frame.timestamp_us() >= target_us {
                        return true;
                    }
                    if self.get_next().is_err() {
                        return false;
                    }
                }
                Ok(None) => return false,
                Err(e) => {
                    tracing::warn!(error = %e, "seek refill failed");
                    return false;
                }
            }
        }
    }

    pub fn seek_frame(&self, index: i64) -> bool {
        self.seek(self.frame_to_time(index))
    }

    /// `get_frames_by_time` (§4.5 batch retrieval).
    pub fn get_frames_by_time(&self, times: &[i64]) -> Vec<Frame> {
        let mut result = Vec::with_capacity(times.len().min(self.max_frames()));
        if times.is_empty() {
            return result;
        }
        if !times.windows(2).all(|w| w[0] <= w[1]) {
            tracing::warn!("get_frames_by_time called with a non-monotonic sequence");
            return result;
        }

        if times[0] < self.current_position_time_us() && !self.seek(times[0]) {
            return result;
        }

        for &target in times {
            if result.len() >= self.max_frames() {
                break;
            }
            let target_index = self.time_to_frame(target);
            loop {
                match self.peek_next() {
                    Ok(Some(frame)) => {
                        if frame.index() == target_index {
                            result.push(frame);
                            break;
                        } else if frame.index() < target_index {
                            if self.get_next().is_err() {
                                return result;
                            }
                        } else {
                            return result;
                        }
                    }
                    Ok(None) => return result,
                    Err(e) => {
                        tracing::warn!(error = %e, "get_frames_by_time failed mid-batch");
                        return result;
                    }
                }
            }
        }
        result
    }

    pub fn get_frames_by_index(&self, indices: &[i64]) -> Vec<Frame> {
        let times: Vec<i64> = indices.iter().map(|&i| self.frame_to_time(i)).collect();
        self.get_frames_by_time(&times)
    }

    pub fn get_next_frames_by_time(&self, offsets: &[i64]) -> Vec<Frame> {
        let base = self.current_position_time_us();
        let times: Vec<i64> = offsets.iter().map(|o| o + base).collect();
        self.get_frames_by_time(&times)
    }

    pub fn get_next_frames_by_index(&self, offsets: &[i64]) -> Vec<Frame> {
        let base = self.time_to_frame(self.current_position_time_us());
        let indices: Vec<i64> = offsets.iter().map(|o| o + base).collect();
        self.get_frames_by_index(&indices)
    }
}

unsafe impl<P: Pipeline> Send for StreamCore<P> {}
unsafe impl<P: Pipeline> Sync for StreamCore<P> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{Crop, Scale};

    /// `cfr_time_map` below uses a 1/90_000 codec timebase at 30fps, so one
    /// frame is worth 90_000/30 = 3_000 codec ticks. Codec/stream timestamps
    /// (the two timebases coincide in these tests) must advance by this
    /// amount per frame for `TimeMap::codec_ts_to_time` to land back on the
    /// frame's own presentation time.
    const CODEC_TICKS_PER_FRAME: i64 = 3_000;

    /// Deterministic CFR source: codec timestamp of frame `i` is
    /// `i * CODEC_TICKS_PER_FRAME`. Each `read_packet`/`receive_frame` pair
    /// produces exactly one frame (no reordering) — enough to exercise
    /// StreamCore's buffer discipline and seek policy without a real
    /// container or codec.
    struct FakePipeline {
        total_frames: i64,
        cursor: i64,
        end: i64,
        codec_delay: i32,
        pending_flush: bool,
        stall: bool,
    }

    impl FakePipeline {
        fn new(total_frames: i64) -> Self {
            Self {
                total_frames,
                cursor: 0,
                end: total_frames,
                codec_delay: 0,
                pending_flush: false,
                stall: false,
            }
        }

        fn stalling(total_frames: i64) -> Self {
            Self {
                stall: true,
                ..Self::new(total_frames)
            }
        }
    }

    impl Pipeline for FakePipeline {
        fn read_packet(&mut self) -> Result<Packet> {
            if self.cursor >= self.end {
                return Err(MediaError::ReadExhausted);
            }
            Ok(Packet::empty())
        }

        fn demux_seek(&mut self, target_ts: i64) -> Result<()> {
            // `target_ts` arrives in stream-timebase ticks (see
            // `StreamCore::begin_long_seek`'s `time_to_stream_ts`), which here
            // coincides with the codec timebase; convert back to a frame
            // cursor with the same per-frame scale `receive_frame` emits.
            let frame = (target_ts + CODEC_TICKS_PER_FRAME / 2) / CODEC_TICKS_PER_FRAME;
            self.cursor = frame.clamp(0, self.total_frames);
            self.end = self.total_frames;
            self.pending_flush = false;
            Ok(())
        }

        fn send_packet(&mut self, _packet: Packet) -> Result<()> {
            Ok(())
        }

        fn send_flush(&mut self) -> Result<()> {
            self.pending_flush = true;
            Ok(())
        }

        fn receive_frame(&mut self) -> Result<DecodeOutcome> {
            if self.stall {
                if self.pending_flush {
                    return Ok(DecodeOutcome::Drained);
                }
                return Ok(DecodeOutcome::NeedMore);
            }
            if self.cursor >= self.end {
                if self.pending_flush {
                    return Ok(DecodeOutcome::Drained);
                }
                return Ok(DecodeOutcome::NeedMore);
            }
            let ts = self.cursor * CODEC_TICKS_PER_FRAME;
            self.cursor += 1;
            let mut frame = AVFrame::new();
            unsafe {
                (*frame.as_mut_ptr()).pts = ts;
                (*frame.as_mut_ptr()).best_effort_timestamp = ts;
                (*frame.as_mut_ptr()).format = ffi::AV_PIX_FMT_YUV420P as i32;
            }
            Ok(DecodeOutcome::Frame(frame))
        }

        fn codec_delay(&self) -> i32 {
            self.codec_delay
        }

        fn reset_decoder(&mut self) {
            self.pending_flush = false;
        }

        fn is_device_resident(&self, _frame: &AVFrame) -> bool {
            false
        }

        fn hw_device_context(&self) -> Option<&HWDeviceContext> {
            None
        }
    }

    fn cfr_time_map() -> TimeMap {
        TimeMap::new(
            Rational::new(1, 90_000),
            Rational::new(1, 90_000),
            Rational::new(30, 1),
            0,
        )
    }

    fn trivial_filter() -> FilterChain {
        let input = FilterInput {
            width: 1920,
            height: 1080,
            pixel_format: ffi::AV_PIX_FMT_YUV420P,
            time_base: Rational::new(1, 90_000),
            frame_rate: Rational::new(30, 1),
            sample_aspect_ratio: Rational::new(1, 1),
            is_hardware: false,
        };
        FilterChain::new(Crop::default(), Scale::default(), PixelFormat::Auto, &input).unwrap()
    }

    fn build(total_frames: i64, buffer_length: usize) -> StreamCore<FakePipeline> {
        let time_map = cfr_time_map();
        let duration_us = time_map.frame_to_time(total_frames) - time_map.frame_to_time(0);
        StreamCore::from_parts(
            FakePipeline::new(total_frames),
            trivial_filter(),
            time_map,
            buffer_length,
            10,
            false,
            total_frames,
            duration_us,
        )
    }

    #[test]
    fn iterates_every_frame_then_reports_eof() {
        let core = build(50, 10);
        for i in 0..50i64 {
            let frame = core.get_next().unwrap().expect("frame");
            assert_eq!(frame.index(), i);
        }
        assert!(core.get_next().unwrap().is_none());
        assert!(core.is_end_of_file());
    }

    #[test]
    fn consecutive_frames_are_monotone_and_contiguous() {
        let core = build(50, 8);
        let first = core.get_next().unwrap().unwrap();
        let second = core.get_next().unwrap().unwrap();
        assert!(second.timestamp_us() >= first.timestamp_us());
        assert_eq!(second.index(), first.index() + 1);
    }

    #[test]
    fn peek_next_is_idempotent_without_intervening_mutation() {
        let core = build(50, 8);
        let a = core.peek_next().unwrap().unwrap();
        let b = core.peek_next().unwrap().unwrap();
        assert_eq!(a.index(), b.index());
        assert_eq!(a.timestamp_us(), b.timestamp_us());
    }

    #[test]
    fn seek_forward_then_back_to_zero() {
        let core = build(200, 10);
        assert!(core.seek(core.frame_to_time(80)));
        assert_eq!(core.get_next().unwrap().unwrap().timestamp_us(), core.frame_to_time(80));

        assert!(core.seek(0));
        assert_eq!(core.get_next().unwrap().unwrap().timestamp_us(), 0);
    }

    #[test]
    fn buffer_length_one_truncates_batch_to_single_frame() {
        let core = build(200, 1);
        let indices = [3, 5, 7, 8, 12, 23];
        let times: Vec<i64> = indices.iter().map(|&i| core.frame_to_time(i)).collect();
        let frames = core.get_frames_by_time(&times);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].index(), 3);
    }

    #[test]
    fn buffer_length_ten_returns_full_batch() {
        let core = build(200, 10);
        let indices = [3, 5, 7, 8, 12, 23];
        let frames = core.get_frames_by_index(&indices);
        let got: Vec<i64> = frames.iter().map(Frame::index).collect();
        assert_eq!(got, indices);
    }

    #[test]
    fn seek_past_duration_fails_without_poisoning_stream() {
        let core = build(200, 10);
        assert!(!core.seek(core.total_duration_us()));
        assert!(!core.seek(core.total_duration_us() + 300_000));
        assert!(core.seek(core.frame_to_time(2)));
        assert_eq!(core.get_next().unwrap().unwrap().timestamp_us(), core.frame_to_time(2));
    }

    #[test]
    fn decode_stall_surfaces_as_error_without_breaking_subsequent_calls() {
        let time_map = cfr_time_map();
        let core = StreamCore::from_parts(
            FakePipeline::stalling(200),
            trivial_filter(),
            time_map,
            10,
            5,
            false,
            200,
            time_map.frame_to_time(200),
        );
        assert!(core.get_next().is_err());
    }

    #[test]
    fn get_frames_by_index_stops_at_end_of_file() {
        let core = build(10, 10);
        let frames = core.get_frames_by_index(&[3, 5, 50]);
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn non_monotonic_batch_request_is_rejected() {
        let core = build(50, 10);
        let frames = core.get_frames_by_index(&[5, 3]);
        assert!(frames.is_empty());
    }
}
