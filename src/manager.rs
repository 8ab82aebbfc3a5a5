use crate::config::{DecoderOptions, HwType};
use crate::error::MediaError;
use crate::ffi_hwaccel::HWDeviceContext;
use crate::streamcore::Stream;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

type Result<T> = std::result::Result<T, MediaError>;

/// Owns one hardware device context and hands it out to every [`Stream`] it
/// opens, so N streams decoding on the same GPU share a single device
/// instead of each negotiating (and holding open) their own (§5, §9).
///
/// Mirrors the original library's `Manager`: a cache of named streams plus
/// the shared device, behind a plain (non-reentrant) mutex since nothing in
/// `Manager` itself re-enters through another `Manager` method.
pub struct Manager {
    device_context: Option<HWDeviceContext>,
    hw_type: HwType,
    buffer_length: usize,
    streams: Mutex<HashMap<String, Arc<Stream>>>,
}

impl Manager {
    /// Create a manager that opens every stream against `hw_type`, sharing
    /// one device context across them when `hw_type` is hardware-backed.
    pub fn new(hw_type: HwType, buffer_length: usize) -> Result<Self> {
        let device_context = match hw_type.device_type() {
            Some(device_type) => Some(HWDeviceContext::new(device_type)?),
            None => None,
        };
        Ok(Self {
            device_context,
            hw_type,
            buffer_length,
            streams: Mutex::new(HashMap::new()),
        })
    }

    /// Return the cached stream for `filename`, opening it (against the
    /// shared device context) on first request.
    pub fn get_stream(&self, filename: impl AsRef<Path>) -> Result<Arc<Stream>> {
        let key = filename.as_ref().to_string_lossy().into_owned();

        let mut streams = self.streams.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(stream) = streams.get(&key) {
            return Ok(Arc::clone(stream));
        }

        let mut builder = DecoderOptions::builder()
            .hw_type(self.hw_type)
            .buffer_length(self.buffer_length);
        if let Some(device_context) = &self.device_context {
            builder = builder.device_context(device_context.clone());
        }
        let options = builder.build();

        let stream = Arc::new(Stream::open(&key, &options)?);
        streams.insert(key, Arc::clone(&stream));
        Ok(stream)
    }

    /// Drop the manager's reference to a previously opened stream. Any
    /// `Arc<Stream>` clones already held by callers keep it alive.
    pub fn release_stream(&self, filename: impl AsRef<Path>) {
        let key = filename.as_ref().to_string_lossy().into_owned();
        let mut streams = self.streams.lock().unwrap_or_else(|e| e.into_inner());
        streams.remove(&key);
    }

    pub fn stream_count(&self) -> usize {
        self.streams.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

unsafe impl Send for Manager {}
unsafe impl Sync for Manager {}
