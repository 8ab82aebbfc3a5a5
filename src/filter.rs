use crate::decode::DecodeOutcome;
use crate::error::MediaError;
use crate::pixel::PixelFormat;
use crate::rational::Rational;

use rsmpeg::avutil::AVFrame;
use rsmpeg::ffi;

use std::ffi::CString;

type Result<T> = std::result::Result<T, MediaError>;

/// Crop border, in pixels, applied before any scale stage. All-zero means
/// no cropping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Crop {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Crop {
    fn is_required(self) -> bool {
        self.top != 0 || self.bottom != 0 || self.left != 0 || self.right != 0
    }
}

/// Target output resolution. Either dimension zero means "keep the
/// post-crop value for that dimension".
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Scale {
    pub width: u32,
    pub height: u32,
}

/// Everything a `FilterChain` needs to know about the frames it will
/// receive, gathered from the `Decoder`/`Demuxer` pair that feeds it.
pub struct FilterInput {
    pub width: u32,
    pub height: u32,
    pub pixel_format: ffi::AVPixelFormat,
    pub time_base: Rational,
    pub frame_rate: Rational,
    pub sample_aspect_ratio: Rational,
    /// Present when the source frames are hardware-resident; non-trivial
    /// chains over such input are rejected at construction.
    pub is_hardware: bool,
}

/// Optional crop -> scale -> pixel-format conversion chain applied to each
/// decoded frame before `StreamCore` buffers it. A trivial chain is a
/// pass-through: frames are handed back unchanged and no filter graph is
/// built at all.
pub struct FilterChain {
    graph: Option<FilterGraph>,
    width: u32,
    height: u32,
    sample_aspect_ratio: Rational,
    frame_rate: Rational,
    pixel_format: PixelFormat,
}

struct FilterGraph {
    graph: *mut ffi::AVFilterGraph,
    source: *mut ffi::AVFilterContext,
    sink: *mut ffi::AVFilterContext,
}

unsafe impl Send for FilterGraph {}
unsafe impl Sync for FilterGraph {}

impl Drop for FilterGraph {
    fn drop(&mut self) {
        unsafe {
            ffi::avfilter_graph_free(&mut self.graph);
        }
    }
}

impl FilterChain {
    pub fn new(crop: Crop, scale: Scale, format: PixelFormat, input: &FilterInput) -> Result<Self> {
        let crop_required = crop.is_required();

        let mut post_width = scale.width;
        let mut post_height = scale.height;
        if crop_required {
            let width = input.width - crop.left - crop.right;
            let height = input.height - crop.top - crop.bottom;
            if width == post_width {
                post_width = 0;
            }
            if height == post_height {
                post_height = 0;
            }
        }
        if post_width == input.width {
            post_width = 0;
        }
        if post_height == input.height {
            post_height = 0;
        }
        let scale_required = post_width != 0 || post_height != 0;

        let input_format = PixelFormat::try_from(input.pixel_format).ok();
        let format_required = format != PixelFormat::Auto && Some(format) != input_format;

        if !crop_required && !scale_required && !format_required {
            return Ok(Self::trivial(input));
        }

        if input.is_hardware {
            return Err(MediaError::FilterGraphFailed(
                "non-trivial filter chains over hardware-resident frames are not supported".into(),
            ));
        }

        let final_width = if post_width != 0 { post_width } else { input.width - crop.left - crop.right };
        let final_height = if post_height != 0 { post_height } else { input.height - crop.top - crop.bottom };
        let sink_format = format.into_option().unwrap_or(input.pixel_format);

        let graph = FilterGraph::build(
            crop,
            crop_required,
            post_width,
            post_height,
            scale_required || format_required,
            sink_format,
            input,
        )?;

        Ok(Self {
            graph: Some(graph),
            width: final_width,
            height: final_height,
            sample_aspect_ratio: input.sample_aspect_ratio,
            frame_rate: input.frame_rate,
            pixel_format: PixelFormat::try_from(sink_format).unwrap_or(PixelFormat::Auto),
        })
    }

    fn trivial(input: &FilterInput) -> Self {
        Self {
            graph: None,
            width: input.width,
            height: input.height,
            sample_aspect_ratio: input.sample_aspect_ratio,
            frame_rate: input.frame_rate,
            pixel_format: PixelFormat::try_from(input.pixel_format).unwrap_or(PixelFormat::Auto),
        }
    }

    pub fn is_trivial(&self) -> bool {
        self.graph.is_none()
    }

    pub fn submit(&self, frame: AVFrame) -> Result<Option<AVFrame>> {
        match &self.graph {
            None => Ok(Some(frame)),
            Some(graph) => unsafe {
                match ffi::av_buffersrc_add_frame(graph.source, frame.into_raw().as_ptr()) {
                    e if e < 0 => Err(MediaError::from(rsmpeg::error::RsmpegError::from(e))),
                    _ => Ok(None),
                }
            },
        }
    }

    pub fn retrieve(&self) -> Result<DecodeOutcome> {
        let graph = match &self.graph {
            None => return Ok(DecodeOutcome::NeedMore),
            Some(graph) => graph,
        };

        let mut frame = AVFrame::new();
        unsafe {
            match ffi::av_buffersink_get_frame(graph.sink, frame.as_mut_ptr()) {
                0 => Ok(DecodeOutcome::Frame(frame)),
                ffi::AVERROR_EOF => Ok(DecodeOutcome::Drained),
                e if e == ffi::AVERROR(ffi::EAGAIN) => Ok(DecodeOutcome::NeedMore),
                e => Err(MediaError::from(rsmpeg::error::RsmpegError::from(e))),
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_rate(&self) -> Rational {
        self.frame_rate
    }

    /// The sink's own pixel format when a filter exists, never the raw
    /// decoder `sw_pix_fmt`.
    pub fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    pub fn aspect_ratio(&self) -> f64 {
        let sar = self.sample_aspect_ratio.as_f64();
        if sar != 0.0 {
            self.width as f64 / self.height as f64 * sar
        } else {
            self.width as f64 / self.height as f64
        }
    }

    pub fn frame_size_bytes(&self) -> usize {
        (self.width as usize * self.height as usize * self.pixel_format.bits_per_pixel() as usize) / 8
    }
}

impl FilterGraph {
    #[allow(clippy::too_many_arguments)]
    fn build(
        crop: Crop,
        crop_required: bool,
        post_width: u32,
        post_height: u32,
        scale_or_format_required: bool,
        sink_format: ffi::AVPixelFormat,
        input: &FilterInput,
    ) -> Result<Self> {
        unsafe {
            let graph = ffi::avfilter_graph_alloc();
            if graph.is_null() {
                return Err(MediaError::FilterGraphFailed("unable to allocate filter graph".into()));
            }

            let buffer_in = ffi::avfilter_get_by_name(c"buffer".as_ptr());
            let buffer_out = ffi::avfilter_get_by_name(c"buffersink".as_ptr());
            if buffer_in.is_null() || buffer_out.is_null() {
                ffi::avfilter_graph_free(&mut { graph });
                return Err(MediaError::FilterGraphFailed("buffer/buffersink filters unavailable".into()));
            }

            let source = ffi::avfilter_graph_alloc_filter(graph, buffer_in, c"src".as_ptr());
            let sink = ffi::avfilter_graph_alloc_filter(graph, buffer_out, c"sink".as_ptr());
            if source.is_null() || sink.is_null() {
                let mut graph = graph;
                ffi::avfilter_graph_free(&mut graph);
                return Err(MediaError::FilterGraphFailed("unable to allocate filter instances".into()));
            }

            let params = ffi::av_buffersrc_parameters_alloc();
            (*params).format = input.pixel_format as i32;
            (*params).width = input.width as i32;
            (*params).height = input.height as i32;
            (*params).frame_rate = input.frame_rate.into();
            (*params).sample_aspect_ratio = input.sample_aspect_ratio.into();
            (*params).time_base = input.time_base.into();

            let set_result = ffi::av_buffersrc_parameters_set(source, params);
            ffi::av_free(params as *mut _);
            if set_result < 0 {
                let mut graph = graph;
                ffi::avfilter_graph_free(&mut graph);
                return Err(MediaError::FilterGraphFailed("failed setting filter input parameters".into()));
            }

            if ffi::avfilter_init_str(source, std::ptr::null()) < 0 {
                let mut graph = graph;
                ffi::avfilter_graph_free(&mut graph);
                return Err(MediaError::FilterGraphFailed("could not initialize filter source".into()));
            }

            if scale_or_format_required || sink_format != input.pixel_format {
                let formats = [sink_format, ffi::AV_PIX_FMT_NONE];
                let bytes = std::slice::from_raw_parts(
                    formats.as_ptr() as *const u8,
                    std::mem::size_of_val(&formats),
                );
                let key = CString::new("pix_fmts").unwrap();
                if ffi::av_opt_set_bin(
                    sink as *mut _,
                    key.as_ptr(),
                    bytes.as_ptr(),
                    bytes.len() as i32,
                    ffi::AV_OPT_SEARCH_CHILDREN,
                ) < 0
                {
                    let mut graph = graph;
                    ffi::avfilter_graph_free(&mut graph);
                    return Err(MediaError::FilterGraphFailed("failed setting sink pix_fmts".into()));
                }
            }

            // `av_opt_set_bin` only stages the option; the sink filter still needs
            // initializing regardless of which branch above ran, mirroring
            // FFFRFilter.cpp's unconditional `avfilter_init_str` after its own
            // pix_fmts option set.
            if ffi::avfilter_init_str(sink, std::ptr::null()) < 0 {
                let mut graph = graph;
                ffi::avfilter_graph_free(&mut graph);
                return Err(MediaError::FilterGraphFailed("could not initialize filter sink".into()));
            }

            let mut next = source;

            if crop_required {
                let crop_filter = ffi::avfilter_get_by_name(c"crop".as_ptr());
                if crop_filter.is_null() {
                    let mut graph = graph;
                    ffi::avfilter_graph_free(&mut graph);
                    return Err(MediaError::FilterGraphFailed("crop filter unavailable".into()));
                }
                let crop_ctx = ffi::avfilter_graph_alloc_filter(graph, crop_filter, c"crop".as_ptr());
                if crop_ctx.is_null() {
                    let mut graph = graph;
                    ffi::avfilter_graph_free(&mut graph);
                    return Err(MediaError::FilterGraphFailed("unable to allocate crop filter".into()));
                }
                if crop.top != 0 || crop.bottom != 0 {
                    let height = input.height - crop.top - crop.bottom;
                    set_opt(crop_ctx, "h", &height.to_string());
                    set_opt(crop_ctx, "y", &crop.top.to_string());
                }
                if crop.left != 0 || crop.right != 0 {
                    let width = input.width - crop.left - crop.right;
                    set_opt(crop_ctx, "w", &width.to_string());
                    set_opt(crop_ctx, "x", &crop.left.to_string());
                }
                if ffi::avfilter_link(next, 0, crop_ctx, 0) < 0 {
                    let mut graph = graph;
                    ffi::avfilter_graph_free(&mut graph);
                    return Err(MediaError::FilterGraphFailed("unable to link crop filter".into()));
                }
                next = crop_ctx;
            }

            if scale_or_format_required {
                let scale_filter = ffi::avfilter_get_by_name(c"scale".as_ptr());
                if scale_filter.is_null() {
                    let mut graph = graph;
                    ffi::avfilter_graph_free(&mut graph);
                    return Err(MediaError::FilterGraphFailed("scale filter unavailable".into()));
                }
                let scale_ctx = ffi::avfilter_graph_alloc_filter(graph, scale_filter, c"scale".as_ptr());
                if scale_ctx.is_null() {
                    let mut graph = graph;
                    ffi::avfilter_graph_free(&mut graph);
                    return Err(MediaError::FilterGraphFailed("unable to allocate scale filter".into()));
                }
                let width = if post_width != 0 { post_width } else { input.width - crop.left - crop.right };
                let height = if post_height != 0 { post_height } else { input.height - crop.top - crop.bottom };
                set_opt(scale_ctx, "w", &width.to_string());
                set_opt(scale_ctx, "h", &height.to_string());
                set_opt(scale_ctx, "out_color_matrix", "bt709");
                set_opt(scale_ctx, "out_range", "full");

                if ffi::avfilter_link(next, 0, scale_ctx, 0) < 0 {
                    let mut graph = graph;
                    ffi::avfilter_graph_free(&mut graph);
                    return Err(MediaError::FilterGraphFailed("unable to link scale filter".into()));
                }
                next = scale_ctx;
            }

            if ffi::avfilter_link(next, 0, sink, 0) < 0 {
                let mut graph = graph;
                ffi::avfilter_graph_free(&mut graph);
                return Err(MediaError::FilterGraphFailed("unable to link filter sink".into()));
            }

            if ffi::avfilter_graph_config(graph, std::ptr::null_mut()) < 0 {
                let mut graph = graph;
                ffi::avfilter_graph_free(&mut graph);
                return Err(MediaError::FilterGraphFailed("failed configuring filter graph".into()));
            }

            Ok(FilterGraph { graph, source, sink })
        }
    }
}

unsafe fn set_opt(ctx: *mut ffi::AVFilterContext, key: &str, value: &str) {
    let key = CString::new(key).unwrap();
    let value = CString::new(value).unwrap();
    ffi::av_opt_set(ctx as *mut _, key.as_ptr(), value.as_ptr(), ffi::AV_OPT_SEARCH_CHILDREN);
}
