use crate::filter::{Crop, Scale};
use crate::ffi_hwaccel::HWDeviceContext;
use crate::hwaccel::HWDeviceType;
use crate::pixel::PixelFormat;

/// Hardware backend a `Stream` should decode through. `Software` never
/// touches a device context; `Cuda` requires one (either created fresh or
/// shared via a [`crate::manager::Manager`]).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum HwType {
    #[default]
    Software,
    Cuda,
}

impl HwType {
    pub(crate) fn device_type(self) -> Option<HWDeviceType> {
        match self {
            HwType::Software => None,
            HwType::Cuda => Some(HWDeviceType::Cuda),
        }
    }
}

/// Configuration for opening a [`crate::streamcore::Stream`] (§6). Built
/// with the same chained-setter pattern the teacher crate uses for its own
/// decoder/reader/encoder settings.
#[derive(Debug, Clone)]
pub struct DecoderOptions {
    pub(crate) hw_type: HwType,
    pub(crate) crop: Crop,
    pub(crate) scale: Scale,
    pub(crate) format: PixelFormat,
    pub(crate) buffer_length: usize,
    pub(crate) seek_threshold: Option<i64>,
    pub(crate) no_buffer_flush: bool,
    pub(crate) device_context: Option<HWDeviceContext>,
    pub(crate) device_index: u32,
    pub(crate) output_to_host: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            hw_type: HwType::Software,
            crop: Crop::default(),
            scale: Scale::default(),
            format: PixelFormat::Auto,
            buffer_length: 10,
            seek_threshold: None,
            no_buffer_flush: false,
            device_context: None,
            device_index: 0,
            output_to_host: true,
        }
    }
}

impl DecoderOptions {
    pub fn builder() -> DecoderOptionsBuilder {
        DecoderOptionsBuilder(Self::default())
    }

    pub fn buffer_length(&self) -> usize {
        self.buffer_length
    }

    pub fn no_buffer_flush(&self) -> bool {
        self.no_buffer_flush
    }

    pub fn output_to_host(&self) -> bool {
        self.output_to_host
    }

    pub fn hw_type(&self) -> HwType {
        self.hw_type
    }
}

/// Builder for [`DecoderOptions`], mirroring the teacher's `*Builder` idiom.
pub struct DecoderOptionsBuilder(DecoderOptions);

impl DecoderOptionsBuilder {
    pub fn hw_type(mut self, hw_type: HwType) -> Self {
        self.0.hw_type = hw_type;
        self
    }

    pub fn crop(mut self, crop: Crop) -> Self {
        self.0.crop = crop;
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.0.scale = scale;
        self
    }

    pub fn format(mut self, format: PixelFormat) -> Self {
        self.0.format = format;
        self
    }

    pub fn buffer_length(mut self, buffer_length: usize) -> Self {
        self.0.buffer_length = buffer_length;
        self
    }

    /// Override the derived decode-stall threshold (§9: default is
    /// `codec_delay + buffer_length`, tunable here).
    pub fn seek_threshold(mut self, seek_threshold: i64) -> Self {
        self.0.seek_threshold = Some(seek_threshold);
        self
    }

    pub fn no_buffer_flush(mut self, no_buffer_flush: bool) -> Self {
        self.0.no_buffer_flush = no_buffer_flush;
        self
    }

    pub fn device_context(mut self, device_context: HWDeviceContext) -> Self {
        self.0.device_context = Some(device_context);
        self
    }

    pub fn device_index(mut self, device_index: u32) -> Self {
        self.0.device_index = device_index;
        self
    }

    pub fn output_to_host(mut self, output_to_host: bool) -> Self {
        self.0.output_to_host = output_to_host;
        self
    }

    pub fn build(self) -> DecoderOptions {
        self.0
    }
}

/// x264/x265 encoding preset ladder (§6), external collaborator
/// configuration only — the encoder itself is out of scope for this crate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Preset {
    Ultrafast,
    Superfast,
    Veryfast,
    Faster,
    Fast,
    Medium,
    Slow,
    Slower,
    Veryslow,
    Placebo,
}

impl Preset {
    /// The obvious lowercase string libx264/libx265 expect for `-preset`.
    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Ultrafast => "ultrafast",
            Preset::Superfast => "superfast",
            Preset::Veryfast => "veryfast",
            Preset::Faster => "faster",
            Preset::Fast => "fast",
            Preset::Medium => "medium",
            Preset::Slow => "slow",
            Preset::Slower => "slower",
            Preset::Veryslow => "veryslow",
            Preset::Placebo => "placebo",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EncoderCodec {
    H264,
    H265,
}

impl EncoderCodec {
    /// CRF range each codec accepts; used to clamp the quality-derived CRF.
    fn crf_range(self) -> (u8, u8) {
        match self {
            EncoderCodec::H264 => (0, 51),
            EncoderCodec::H265 => (0, 51),
        }
    }
}

/// Configuration for encoding (§6), external collaborator: the core never
/// writes containers, but names this surface so callers configure the
/// muxer/encoder the same way they configure a `Stream`.
#[derive(Debug, Clone)]
pub struct EncoderOptions {
    pub codec: EncoderCodec,
    pub quality: u8,
    pub preset: Preset,
    pub num_threads: u32,
    pub gop_size: u32,
}

impl EncoderOptions {
    /// `crf = (255 − quality) / 5`, clamped to the codec's CRF range (§6).
    pub fn crf(&self) -> u8 {
        let (lo, hi) = self.codec.crf_range();
        let crf = (255u16 - self.quality as u16) / 5;
        crf.clamp(lo as u16, hi as u16) as u8
    }
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            codec: EncoderCodec::H264,
            quality: 180,
            preset: Preset::Medium,
            num_threads: 0,
            gop_size: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crf_mapping_matches_spec_formula() {
        let options = EncoderOptions {
            quality: 255,
            ..EncoderOptions::default()
        };
        assert_eq!(options.crf(), 0);

        let options = EncoderOptions {
            quality: 0,
            ..EncoderOptions::default()
        };
        assert_eq!(options.crf(), 51);
    }

    #[test]
    fn decoder_options_default_matches_spec() {
        let options = DecoderOptions::default();
        assert_eq!(options.buffer_length, 10);
        assert!(!options.no_buffer_flush);
        assert!(options.output_to_host);
        assert_eq!(options.hw_type, HwType::Software);
    }

    #[test]
    fn builder_overrides_defaults() {
        let options = DecoderOptions::builder()
            .buffer_length(4)
            .output_to_host(false)
            .hw_type(HwType::Cuda)
            .build();
        assert_eq!(options.buffer_length, 4);
        assert!(!options.output_to_host);
        assert_eq!(options.hw_type, HwType::Cuda);
    }
}
