//! Byte and frame sources.
//!
//! The core never talks to the network directly; it goes through the
//! [`ByteSource`] and [`VideoFrameSource`] traits so tests (and embedders
//! with their own transport) can substitute implementations. The default
//! [`HttpByteSource`] wraps `reqwest` with explicit timeouts and bounded
//! retries for transient failures.

mod http;
mod retry;

pub use http::HttpByteSource;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error_handling::FetchError;

/// Response metadata from a HEAD request.
#[derive(Debug, Clone, Default)]
pub struct HeadInfo {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lowercased names.
    pub headers: HashMap<String, String>,
}

impl HeadInfo {
    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(|s| s.as_str())
    }

    /// Content-Type header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Content-Length header parsed as bytes, if present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }
}

/// Supplies response metadata and bounded byte prefixes for a URL.
///
/// Both operations carry an enforced timeout; implementations must never
/// block past it.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Issues a HEAD request for the URL.
    async fn head(&self, url: &str) -> Result<HeadInfo, FetchError>;

    /// Fetches the byte range `[start, end)` of the URL. Implementations may
    /// return fewer bytes than requested (short file, server ignoring the
    /// range header); callers must tolerate that.
    async fn range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>, FetchError>;
}

/// Video metadata reported by a frame source.
#[derive(Debug, Clone, Copy)]
pub struct VideoMetadata {
    /// Duration in seconds.
    pub duration: f64,
    /// Native frame width in pixels.
    pub width: u32,
    /// Native frame height in pixels.
    pub height: u32,
}

/// A single raster frame, grayscale, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// `width * height` luma bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Pixel at (x, y). Out-of-range coordinates clamp to the edge.
    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        self.data[(y * self.width + x) as usize]
    }
}

/// Supplies decoded video frames for loop analysis.
///
/// Implementations are expected to wrap a decoder or a page-side video
/// element; each operation must be bounded by its own timeout.
#[async_trait]
pub trait VideoFrameSource: Send + Sync {
    /// Loads duration and native dimensions.
    async fn load_metadata(&self) -> Result<VideoMetadata, FetchError>;

    /// Seeks to `time` (seconds) and captures one frame scaled to roughly
    /// `target` (width, height). Sources may return a different size;
    /// analysis resizes as needed.
    async fn seek_and_capture(&self, time: f64, target: (u32, u32)) -> Result<Frame, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_info_header_lookup() {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "image/jpeg".to_string());
        headers.insert("content-length".to_string(), "1024".to_string());
        let info = HeadInfo {
            status: 200,
            headers,
        };
        assert_eq!(info.header("Content-Type"), Some("image/jpeg"));
        assert_eq!(info.content_type(), Some("image/jpeg"));
        assert_eq!(info.content_length(), Some(1024));
        assert_eq!(info.header("x-missing"), None);
    }

    #[test]
    fn test_head_info_bad_content_length() {
        let mut headers = HashMap::new();
        headers.insert("content-length".to_string(), "not-a-number".to_string());
        let info = HeadInfo {
            status: 200,
            headers,
        };
        assert_eq!(info.content_length(), None);
    }

    #[test]
    fn test_frame_pixel_clamps() {
        let frame = Frame {
            width: 2,
            height: 2,
            data: vec![10, 20, 30, 40],
        };
        assert_eq!(frame.pixel(0, 0), 10);
        assert_eq!(frame.pixel(1, 1), 40);
        // Out of range clamps to the last column/row
        assert_eq!(frame.pixel(5, 0), 20);
        assert_eq!(frame.pixel(0, 5), 30);
    }
}
