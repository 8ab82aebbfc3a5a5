use crate::error::MediaError;
use crate::ffi_hwaccel;
use rsmpeg::avcodec::{AVCodec, AVCodecContext};

type Result<T> = std::result::Result<T, MediaError>;

/// Hardware acceleration device types the decoder can be asked to negotiate.
/// `is_available`/`list_available` wrap `av_hwdevice_iterate_types` so the
/// caller can probe the host before committing to a `HWDeviceType`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HWDeviceType {
    Vdpau,
    Cuda,
    VaApi,
    Dxva2,
    Qsv,
    VideoToolbox,
    D3D11Va,
    Drm,
    OpenCl,
    MediaCodec,
    Vulkan,
    #[cfg(feature = "ffmpeg7")]
    D3D12Va,
}

impl HWDeviceType {
    pub fn is_available(self) -> bool {
        Self::list_available().contains(&self)
    }

    pub fn list_available() -> Vec<HWDeviceType> {
        ffi_hwaccel::hwdevice_list_available_device_types()
    }

    pub fn from_av(value: rsmpeg::ffi::AVHWDeviceType) -> Option<HWDeviceType> {
        use rsmpeg::ffi::*;
        match value {
            AV_HWDEVICE_TYPE_NONE => None,
            AV_HWDEVICE_TYPE_VDPAU => Some(Self::Vdpau),
            AV_HWDEVICE_TYPE_CUDA => Some(Self::Cuda),
            AV_HWDEVICE_TYPE_VAAPI => Some(Self::VaApi),
            AV_HWDEVICE_TYPE_DXVA2 => Some(Self::Dxva2),
            AV_HWDEVICE_TYPE_QSV => Some(Self::Qsv),
            AV_HWDEVICE_TYPE_VIDEOTOOLBOX => Some(Self::VideoToolbox),
            AV_HWDEVICE_TYPE_D3D11VA => Some(Self::D3D11Va),
            AV_HWDEVICE_TYPE_DRM => Some(Self::Drm),
            AV_HWDEVICE_TYPE_OPENCL => Some(Self::OpenCl),
            AV_HWDEVICE_TYPE_MEDIACODEC => Some(Self::MediaCodec),
            AV_HWDEVICE_TYPE_VULKAN => Some(Self::Vulkan),
            #[cfg(feature = "ffmpeg7")]
            AV_HWDEVICE_TYPE_D3D12VA => Some(Self::D3D12Va),
            _ => None,
        }
    }
}

impl From<HWDeviceType> for rsmpeg::ffi::AVHWDeviceType {
    fn from(value: HWDeviceType) -> Self {
        use rsmpeg::ffi::*;
        match value {
            HWDeviceType::Vdpau => AV_HWDEVICE_TYPE_VDPAU,
            HWDeviceType::Cuda => AV_HWDEVICE_TYPE_CUDA,
            HWDeviceType::VaApi => AV_HWDEVICE_TYPE_VAAPI,
            HWDeviceType::Dxva2 => AV_HWDEVICE_TYPE_DXVA2,
            HWDeviceType::Qsv => AV_HWDEVICE_TYPE_QSV,
            HWDeviceType::VideoToolbox => AV_HWDEVICE_TYPE_VIDEOTOOLBOX,
            HWDeviceType::D3D11Va => AV_HWDEVICE_TYPE_D3D11VA,
            HWDeviceType::Drm => AV_HWDEVICE_TYPE_DRM,
            HWDeviceType::OpenCl => AV_HWDEVICE_TYPE_OPENCL,
            HWDeviceType::MediaCodec => AV_HWDEVICE_TYPE_MEDIACODEC,
            HWDeviceType::Vulkan => AV_HWDEVICE_TYPE_VULKAN,
            #[cfg(feature = "ffmpeg7")]
            HWDeviceType::D3D12Va => AV_HWDEVICE_TYPE_D3D12VA,
        }
    }
}

/// Negotiated hardware decode context for one `Decoder`: the pixel format
/// the codec agreed to hand us, plus a reference-counted device context that
/// may be shared with other `Decoder`s opened against the same device
/// (see `Manager`, §10.4 of the design spec).
pub struct HWContext {
    pixel_format: rsmpeg::ffi::AVPixelFormat,
    device_context: ffi_hwaccel::HWDeviceContext,
}

impl HWContext {
    /// Negotiate a hardware pixel format for `codec` against `device_type`
    /// and wire up `decoder_ctx`'s `get_format` callback and device context.
    /// Construction fails (rather than silently falling back to software)
    /// if the codec has no hardware config for the requested device type —
    /// per spec §4.3, a failed negotiation must fail the `Decoder`'s
    /// construction, not degrade to software decode.
    pub fn new(
        codec: &AVCodec,
        decoder_ctx: &mut AVCodecContext,
        device_type: HWDeviceType,
    ) -> Result<Self> {
        let pixel_format = ffi_hwaccel::codec_find_hwaccel_pixfmt(codec, device_type)
            .ok_or(MediaError::UnsupportedHardwareDeviceType)?;

        ffi_hwaccel::codec_context_hwaccel_set_get_format(decoder_ctx, pixel_format);

        let device_context = ffi_hwaccel::HWDeviceContext::new(device_type)?;
        ffi_hwaccel::codec_context_hwaccel_set_hw_device_ctx(decoder_ctx, &device_context);

        Ok(HWContext {
            pixel_format,
            device_context,
        })
    }

    /// Share an already-open device context rather than creating a new one
    /// — used when a `Manager` hands out the same hardware device to
    /// multiple streams.
    pub fn with_shared_device(
        codec: &AVCodec,
        decoder_ctx: &mut AVCodecContext,
        device_type: HWDeviceType,
        device_context: ffi_hwaccel::HWDeviceContext,
    ) -> Result<Self> {
        let pixel_format = ffi_hwaccel::codec_find_hwaccel_pixfmt(codec, device_type)
            .ok_or(MediaError::UnsupportedHardwareDeviceType)?;

        ffi_hwaccel::codec_context_hwaccel_set_get_format(decoder_ctx, pixel_format);
        ffi_hwaccel::codec_context_hwaccel_set_hw_device_ctx(decoder_ctx, &device_context);

        Ok(HWContext {
            pixel_format,
            device_context,
        })
    }

    pub fn format(&self) -> rsmpeg::ffi::AVPixelFormat {
        self.pixel_format
    }

    pub fn is_hw_frame(&self, frame: &rsmpeg::avutil::AVFrame) -> bool {
        frame.format == self.pixel_format
    }

    pub fn download_frame(
        &self,
        frame: &rsmpeg::avutil::AVFrame,
    ) -> Result<rsmpeg::avutil::AVFrame> {
        let mut host_frame = rsmpeg::avutil::AVFrame::new();
        ffi_hwaccel::hwdevice_transfer_frame(&mut host_frame, frame)?;
        Ok(host_frame)
    }

    pub fn device_context(&self) -> &ffi_hwaccel::HWDeviceContext {
        &self.device_context
    }
}
