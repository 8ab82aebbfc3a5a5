use crate::error::MediaError;
use crate::options::{Dictionary, Options};
use crate::packet::{Packet, PacketIter};
use crate::rational::Rational;
use crate::time::TimeMap;

use libc::c_int;
use rsmpeg::avcodec::AVCodecParameters;
use rsmpeg::avformat::AVFormatContextInput as AvInput;
use rsmpeg::avformat::AVFormatContextOutput as AvOutput;
use rsmpeg::error::RsmpegError;

use std::ffi::CString;
use std::ops::Bound;
use std::path::Path;
use std::ptr;

type Result<T> = std::result::Result<T, MediaError>;

/// Literal probe constant used by the scan-to-end fallback in `total_frames`.
/// Matches the large stream-timebase seek target the original implementation
/// used to force the demuxer to the last GOP of the file.
const SCAN_PROBE_TS: i64 = 1 << 29;

/// Builds a [`Demuxer`].
pub struct DemuxerBuilder<'a> {
    source: std::path::PathBuf,
    options: Option<&'a Options>,
}

impl<'a> DemuxerBuilder<'a> {
    pub fn new(source: impl AsRef<Path>) -> Self {
        Self {
            source: source.as_ref().to_path_buf(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: &'a Options) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> Result<Demuxer> {
        let input = match self.options {
            None => Self::input(&self.source)?,
            Some(options) => Self::input_with_dictionary(&self.source, options.to_dict())?,
        };
        Demuxer::from_input(input)
    }

    fn from_path<P: AsRef<Path> + ?Sized>(path: &P) -> CString {
        CString::new(path.as_ref().as_os_str().to_str().unwrap()).unwrap()
    }

    fn input<P: AsRef<Path> + ?Sized>(path: &P) -> Result<AvInput> {
        unsafe {
            let mut ps = ptr::null_mut();
            let path = Self::from_path(path);

            match rsmpeg::ffi::avformat_open_input(
                &mut ps,
                path.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
            ) {
                0 => match rsmpeg::ffi::avformat_find_stream_info(ps, ptr::null_mut()) {
                    r if r >= 0 => Ok(AvInput::from_raw(ptr::NonNull::new(ps).unwrap())),
                    e => {
                        rsmpeg::ffi::avformat_close_input(&mut ps);
                        Err(MediaError::OpenFailed(RsmpegError::from(e).to_string()))
                    }
                },
                e => Err(MediaError::OpenFailed(RsmpegError::from(e).to_string())),
            }
        }
    }

    fn input_with_dictionary<P: AsRef<Path> + ?Sized>(
        path: &P,
        options: Dictionary,
    ) -> Result<AvInput> {
        unsafe {
            let mut ps = ptr::null_mut();
            let path = Self::from_path(path);
            let opts = options.disown();
            let res = rsmpeg::ffi::avformat_open_input(
                &mut ps,
                path.as_ptr(),
                ptr::null_mut(),
                opts as *mut _,
            );
            Dictionary::own(opts);

            match res {
                0 => match rsmpeg::ffi::avformat_find_stream_info(ps, ptr::null_mut()) {
                    r if r >= 0 => Ok(AvInput::from_raw(ptr::NonNull::new(ps).unwrap())),
                    e => {
                        rsmpeg::ffi::avformat_close_input(&mut ps);
                        Err(MediaError::OpenFailed(RsmpegError::from(e).to_string()))
                    }
                },
                e => Err(MediaError::OpenFailed(RsmpegError::from(e).to_string())),
            }
        }
    }
}

/// Demuxes one container down to compressed packets for the chosen video
/// stream, and answers the frame-count/duration/start-offset questions a
/// `Stream` needs before it can build its `TimeMap`.
pub struct Demuxer {
    pub(crate) input: AvInput,
    video_stream_index: usize,
    stream_time_base: Rational,
    avg_frame_rate: Rational,
    sample_aspect_ratio: Rational,
    stream_start_ts: i64,
}

impl Demuxer {
    pub fn open(source: impl AsRef<Path>) -> Result<Self> {
        DemuxerBuilder::new(source).build()
    }

    fn from_input(mut input: AvInput) -> Result<Self> {
        let video_stream_index = input
            .find_best_stream(rsmpeg::ffi::AVMEDIA_TYPE_VIDEO)?
            .ok_or_else(|| MediaError::OpenFailed("no video stream found".into()))?
            .0;

        let (stream_time_base, avg_frame_rate, sample_aspect_ratio) = {
            let stream = &input.streams()[video_stream_index];
            (
                stream.time_base.into(),
                stream.avg_frame_rate.into(),
                stream.sample_aspect_ratio.into(),
            )
        };

        let stream_start_ts = Self::resolve_stream_start_ts(&mut input, video_stream_index)?;

        Ok(Self {
            input,
            video_stream_index,
            stream_time_base,
            avg_frame_rate,
            sample_aspect_ratio,
            stream_start_ts,
        })
    }

    /// If the container reports a start time for the stream, use it;
    /// otherwise rewind to the first byte and read packets until one
    /// belonging to the video stream carries a valid timestamp, preferring
    /// pts over dts.
    fn resolve_stream_start_ts(input: &mut AvInput, video_stream_index: usize) -> Result<i64> {
        let reported = input.streams()[video_stream_index].start_time;
        if reported != rsmpeg::ffi::AV_NOPTS_VALUE {
            return Ok(reported);
        }

        unsafe {
            rsmpeg::ffi::avformat_seek_file(
                input.as_mut_ptr(),
                -1,
                i64::MIN,
                0,
                i64::MAX,
                0,
            );
        }

        let start = loop {
            let mut packet = Packet::empty();
            match packet.read(input.as_mut_ptr()) {
                Ok(()) => {
                    if packet.stream_index() != video_stream_index {
                        continue;
                    }
                    if let Some(pts) = packet.pts() {
                        break pts;
                    }
                    if let Some(dts) = packet.dts() {
                        break dts;
                    }
                }
                Err(_) => break 0,
            }
        };

        unsafe {
            rsmpeg::ffi::avformat_seek_file(input.as_mut_ptr(), -1, i64::MIN, 0, i64::MAX, 0);
        }

        Ok(start)
    }

    pub fn video_stream_index(&self) -> usize {
        self.video_stream_index
    }

    pub fn stream_time_base(&self) -> Rational {
        self.stream_time_base
    }

    pub fn avg_frame_rate(&self) -> Rational {
        self.avg_frame_rate
    }

    pub fn sample_aspect_ratio(&self) -> Rational {
        self.sample_aspect_ratio
    }

    pub fn stream_start_ts(&self) -> i64 {
        self.stream_start_ts
    }

    pub fn codecpar(&self) -> AVCodecParameters {
        self.input.streams()[self.video_stream_index]
            .codecpar()
            .to_owned()
    }

    fn nb_frames(&self) -> i64 {
        self.input.streams()[self.video_stream_index].nb_frames
    }

    fn stream_duration(&self) -> Option<i64> {
        let duration = self.input.streams()[self.video_stream_index].duration;
        (duration != rsmpeg::ffi::AV_NOPTS_VALUE).then_some(duration)
    }

    fn container_duration_us(&self) -> Option<i64> {
        let duration = unsafe { (*self.input.as_ptr()).duration };
        (duration != rsmpeg::ffi::AV_NOPTS_VALUE).then_some(
            duration * 1_000_000 / i64::from(rsmpeg::ffi::AV_TIME_BASE),
        )
    }

    /// Resolution order per the container/stream/scan priority: container
    /// duration if reported, else the stream's own frame count if positive,
    /// else stream duration converted through the frame rate, else a
    /// best-effort scan to end of file.
    pub fn total_frames(&mut self, time_map: &TimeMap) -> Option<i64> {
        if let Some(container_us) = self.container_duration_us() {
            return Some(time_map.time_to_frame(container_us));
        }
        let nb_frames = self.nb_frames();
        if nb_frames > 0 {
            return Some(nb_frames);
        }
        if let Some(duration) = self.stream_duration() {
            let us = time_map.stream_ts_to_time(duration);
            return Some(time_map.time_to_frame(us));
        }
        self.scan_total_frames(time_map)
    }

    pub fn total_duration_us(&mut self, time_map: &TimeMap) -> Option<i64> {
        if let Some(container_us) = self.container_duration_us() {
            return Some(container_us);
        }
        if let Some(duration) = self.stream_duration() {
            return Some(time_map.stream_ts_to_time(duration));
        }
        let frames = self.total_frames(time_map)?;
        Some(time_map.frame_to_time(frames))
    }

    /// Scan to the end of the file tracking the maximum observed timestamp.
    /// Degrades to `None` on failure rather than propagating an error, per
    /// the "not available" contract for this fallback. Always restores
    /// demuxer position afterwards.
    fn scan_total_frames(&mut self, time_map: &TimeMap) -> Option<i64> {
        let _ = self.seek(SCAN_PROBE_TS);

        let mut max_ts = i64::MIN;
        loop {
            match self.read_packet() {
                Ok(packet) => {
                    if let Some(ts) = packet.pts().or_else(|| packet.dts()) {
                        max_ts = max_ts.max(ts);
                    }
                }
                Err(_) => break,
            }
        }

        let _ = self.seek(self.stream_start_ts);

        (max_ts != i64::MIN).then(|| {
            let us = time_map.stream_ts_to_time(max_ts);
            1 + time_map.time_to_frame(us)
        })
    }

    /// Next compressed packet belonging to the video stream; packets for
    /// other streams are discarded internally.
    pub fn read_packet(&mut self) -> Result<Packet> {
        loop {
            let mut packet = Packet::empty();
            match packet.read(self.input.as_mut_ptr()) {
                Ok(()) => {
                    if packet.stream_index() == self.video_stream_index {
                        return Ok(Packet::new(
                            packet.into_inner(),
                            self.stream_time_base,
                        ));
                    }
                }
                Err(RsmpegError::BufferSinkEofError) => return Err(MediaError::ReadExhausted),
                Err(e) => return Err(MediaError::from(e)),
            }
        }
    }

    /// Best-effort seek to a stream-timebase target. Succeeds as soon as
    /// libav reports a valid seek; it is the caller's job (`StreamCore`) to
    /// discard frames before the true target after refilling.
    pub fn seek(&mut self, target_ts: i64) -> Result<()> {
        unsafe {
            match rsmpeg::ffi::avformat_seek_file(
                self.input.as_mut_ptr(),
                self.video_stream_index as c_int,
                i64::MIN,
                target_ts,
                i64::MAX,
                rsmpeg::ffi::AVSEEK_FLAG_BACKWARD,
            ) {
                s if s >= 0 => Ok(()),
                e => Err(MediaError::from(RsmpegError::from(e))),
            }
        }
    }

    fn _seek_range<R: std::ops::RangeBounds<i64>>(&mut self, ts: i64, range: R) -> Result<()> {
        let start = match range.start_bound().cloned() {
            Bound::Included(i) => i,
            Bound::Excluded(i) => i.saturating_add(1),
            Bound::Unbounded => i64::MIN,
        };
        let end = match range.end_bound().cloned() {
            Bound::Included(i) => i,
            Bound::Excluded(i) => i.saturating_sub(1),
            Bound::Unbounded => i64::MAX,
        };

        unsafe {
            match rsmpeg::ffi::avformat_seek_file(
                self.input.as_mut_ptr(),
                -1,
                start,
                ts,
                end,
                0,
            ) {
                s if s >= 0 => Ok(()),
                e => Err(MediaError::from(RsmpegError::from(e))),
            }
        }
    }

    pub fn packets(&mut self) -> PacketIter {
        PacketIter::new(&mut self.input)
    }
}

unsafe impl Send for Demuxer {}
unsafe impl Sync for Demuxer {}

/// Build a [`Muxer`]. Kept as an external-collaborator stub: container
/// writing is out of scope for the core, but the type is carried forward so
/// the crate's public surface still names the symmetric write path.
pub struct MuxerBuilder<'a> {
    destination: std::path::PathBuf,
    format: Option<&'a str>,
    options: Option<&'a Options>,
}

impl<'a> MuxerBuilder<'a> {
    pub fn new(destination: impl AsRef<Path>) -> Self {
        Self {
            destination: destination.as_ref().to_path_buf(),
            format: None,
            options: None,
        }
    }

    pub fn with_format(mut self, format: &'a str) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_options(mut self, options: &'a Options) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> Result<Muxer> {
        let path = CString::new(self.destination.to_str().unwrap()).unwrap();
        let output = match self.format {
            Some(format) => {
                let format = CString::new(format).unwrap();
                unsafe {
                    let mut ps = ptr::null_mut();
                    match rsmpeg::ffi::avformat_alloc_output_context2(
                        &mut ps,
                        ptr::null_mut(),
                        format.as_ptr(),
                        path.as_ptr(),
                    ) {
                        0 => match rsmpeg::ffi::avio_open(
                            &mut (*ps).pb,
                            path.as_ptr(),
                            rsmpeg::ffi::AVIO_FLAG_WRITE as c_int,
                        ) {
                            0 => AvOutput::from_raw(ptr::NonNull::new(ps).unwrap()),
                            e => return Err(MediaError::from(RsmpegError::from(e))),
                        },
                        e => return Err(MediaError::from(RsmpegError::from(e))),
                    }
                }
            }
            None => AvOutput::create(&path, None).map_err(MediaError::from)?,
        };

        Ok(Muxer {
            destination: self.destination,
            output,
        })
    }
}

pub struct Muxer {
    pub destination: std::path::PathBuf,
    pub output: AvOutput,
}

impl Muxer {
    pub(crate) fn write_header(&self) -> Result<()> {
        todo!("container writing is out of scope for the core; see MuxerBuilder")
    }

    pub(crate) fn write_trailer(&self) -> Result<()> {
        todo!("container writing is out of scope for the core; see MuxerBuilder")
    }

    pub(crate) fn write_interleaved(&self, _packet: &mut Packet) -> Result<()> {
        todo!("container writing is out of scope for the core; see MuxerBuilder")
    }

    pub(crate) fn write_frame(&self, _packet: &mut Packet) -> Result<()> {
        todo!("container writing is out of scope for the core; see MuxerBuilder")
    }
}
