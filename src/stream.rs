use crate::flags::AvDispositionFlags;
use crate::options::DictionaryRef;
use crate::packet::Packet;
use crate::Rational;

use rsmpeg::avformat::AVFormatContextInput;
use rsmpeg::ffi;

use libc::{c_int, c_uint};
use std::marker::PhantomData;

pub struct StreamSideData<'a> {
    ptr: *mut ffi::AVPacketSideData,
    _marker: PhantomData<&'a Packet>,
}

impl StreamSideData<'_> {
    pub fn wrap(ptr: *mut ffi::AVPacketSideData) -> Self {
        StreamSideData {
            ptr,
            _marker: PhantomData,
        }
    }

    pub fn as_ptr(&self) -> *const ffi::AVPacketSideData {
        self.ptr as *const _
    }
}

impl StreamSideData<'_> {
    pub fn kind(&self) -> ffi::AVPacketSideDataType {
        unsafe { ffi::AVPacketSideDataType::from((*self.as_ptr()).type_) }
    }

    pub fn data(&self) -> &[u8] {
        #[allow(clippy::unnecessary_cast)]
        unsafe {
            std::slice::from_raw_parts((*self.as_ptr()).data, (*self.as_ptr()).size as usize)
        }
    }
}

/// A read-only view of one `AVStream`, borrowed from the demuxer that owns
/// it. Used internally by [`crate::packet::PacketIter`]; the per-stream
/// facts a `Stream` (the spec's core type, `crate::streamcore::Stream`)
/// needs are captured once at open time instead, since that type must
/// outlive the demuxer's borrow.
pub struct Stream<'a> {
    context: &'a AVFormatContextInput,
    index: usize,
}

impl Stream<'_> {
    pub fn wrap(context: &AVFormatContextInput, index: usize) -> Stream {
        Stream { context, index }
    }

    pub fn as_ptr(&self) -> *const ffi::AVStream {
        unsafe { *(*self.context.as_ptr()).streams.add(self.index) }
    }
}

impl Stream<'_> {
    pub fn id(&self) -> i32 {
        unsafe { (*self.as_ptr()).id }
    }

    pub fn index(&self) -> usize {
        unsafe { (*self.as_ptr()).index as usize }
    }

    pub fn time_base(&self) -> Rational {
        unsafe { Rational::from((*self.as_ptr()).time_base) }
    }

    pub fn start_time(&self) -> i64 {
        unsafe { (*self.as_ptr()).start_time }
    }

    pub fn duration(&self) -> i64 {
        unsafe { (*self.as_ptr()).duration }
    }

    pub fn frames(&self) -> i64 {
        unsafe { (*self.as_ptr()).nb_frames }
    }

    pub fn disposition(&self) -> AvDispositionFlags {
        unsafe { AvDispositionFlags::from_bits_truncate((*self.as_ptr()).disposition as c_uint) }
    }

    pub fn discard(&self) -> ffi::AVDiscard {
        unsafe { ffi::AVDiscard::from((*self.as_ptr()).discard) }
    }

    pub fn side_data(&self) -> StreamSideDataIter {
        StreamSideDataIter::new(self)
    }

    pub fn rate(&self) -> Rational {
        unsafe { Rational::from((*self.as_ptr()).r_frame_rate) }
    }

    pub fn avg_frame_rate(&self) -> Rational {
        unsafe { Rational::from((*self.as_ptr()).avg_frame_rate) }
    }

    pub fn metadata(&self) -> DictionaryRef {
        unsafe { DictionaryRef::wrap((*self.as_ptr()).metadata) }
    }
}

impl PartialEq for Stream<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ptr() == other.as_ptr()
    }
}

impl Eq for Stream<'_> {}

pub struct StreamSideDataIter<'a> {
    stream: &'a Stream<'a>,
    current: c_int,
}

impl StreamSideDataIter<'_> {
    pub fn new<'sd, 's: 'sd>(stream: &'s Stream) -> StreamSideDataIter<'sd> {
        StreamSideDataIter { stream, current: 0 }
    }
}

impl<'a> Iterator for StreamSideDataIter<'a> {
    type Item = StreamSideData<'a>;

    fn next(&mut self) -> Option<<Self as Iterator>::Item> {
        unsafe {
            if self.current >= (*self.stream.as_ptr()).nb_side_data {
                return None;
            }

            self.current += 1;

            Some(StreamSideData::wrap(
                (*self.stream.as_ptr())
                    .side_data
                    .offset((self.current - 1) as isize),
            ))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        unsafe {
            let length = (*self.stream.as_ptr()).nb_side_data as usize;

            (
                length - self.current as usize,
                Some(length - self.current as usize),
            )
        }
    }
}

impl ExactSizeIterator for StreamSideDataIter<'_> {}
