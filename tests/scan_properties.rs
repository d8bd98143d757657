//! End-to-end scan behavior through the public API, with substitute byte
//! and frame sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use media_sentry::error_handling::FetchError;
use media_sentry::{
    ByteSource, Config, Frame, HeadInfo, ScanScheduler, ScanStatus, Verdict, VideoFrameSource,
    VideoMetadata,
};

fn image_head() -> HeadInfo {
    let mut headers = HashMap::new();
    headers.insert("content-type".to_string(), "image/jpeg".to_string());
    headers.insert("content-length".to_string(), "50000".to_string());
    HeadInfo {
        status: 200,
        headers,
    }
}

fn config() -> Config {
    Config::default()
}

/// Serves a plain camera JPEG prefix.
struct CleanSource;

#[async_trait]
impl ByteSource for CleanSource {
    async fn head(&self, _url: &str) -> Result<HeadInfo, FetchError> {
        Ok(image_head())
    }

    async fn range(&self, _url: &str, _start: u64, _end: u64) -> Result<Vec<u8>, FetchError> {
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        bytes.extend_from_slice(b"JFIF\0Exif\0\0Canon EOS R5");
        bytes.extend_from_slice(&[0u8; 512]);
        Ok(bytes)
    }
}

/// Serves a JPEG with an embedded, structurally clean manifest.
struct SignedSource;

const CLEAN_MANIFEST: &str = r#"{
    "claim_generator": "acme-cam/2.0",
    "timestamp": "2025-03-01T10:00:00Z",
    "assertions": [{"label": "c2pa.actions"}],
    "signature": {
        "algorithm": "es256",
        "signature_value": "sig",
        "certificates": [
            {"subject": "CN=leaf", "issuer": "CN=Adobe Root CA",
             "valid_from": "2024-01-01T00:00:00Z",
             "valid_to": "2066-01-01T00:00:00Z"}
        ]
    }
}"#;

#[async_trait]
impl ByteSource for SignedSource {
    async fn head(&self, _url: &str) -> Result<HeadInfo, FetchError> {
        Ok(image_head())
    }

    async fn range(&self, _url: &str, _start: u64, _end: u64) -> Result<Vec<u8>, FetchError> {
        let mut bytes = vec![0xFF, 0xD8];
        bytes.extend_from_slice(b"\x00\x00\x00\x40jumb");
        bytes.extend_from_slice(CLEAN_MANIFEST.as_bytes());
        Ok(bytes)
    }
}

/// Never answers; simulates a hung upstream.
struct HangingSource;

#[async_trait]
impl ByteSource for HangingSource {
    async fn head(&self, _url: &str) -> Result<HeadInfo, FetchError> {
        std::future::pending().await
    }

    async fn range(&self, _url: &str, _start: u64, _end: u64) -> Result<Vec<u8>, FetchError> {
        std::future::pending().await
    }
}

/// Takes a measurable amount of time per prefix fetch.
struct SlowSource;

#[async_trait]
impl ByteSource for SlowSource {
    async fn head(&self, _url: &str) -> Result<HeadInfo, FetchError> {
        Ok(image_head())
    }

    async fn range(&self, url: &str, start: u64, end: u64) -> Result<Vec<u8>, FetchError> {
        tokio::time::sleep(Duration::from_millis(150)).await;
        CleanSource.range(url, start, end).await
    }
}

/// Serves an MP4 prefix with video headers.
struct Mp4Source;

#[async_trait]
impl ByteSource for Mp4Source {
    async fn head(&self, _url: &str) -> Result<HeadInfo, FetchError> {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "video/mp4".to_string());
        Ok(HeadInfo {
            status: 200,
            headers,
        })
    }

    async fn range(&self, _url: &str, _start: u64, _end: u64) -> Result<Vec<u8>, FetchError> {
        let mut bytes = vec![0x00, 0x00, 0x00, 0x18];
        bytes.extend_from_slice(b"ftypmp42");
        bytes.extend_from_slice(&[0u8; 256]);
        Ok(bytes)
    }
}

/// Frame source producing a perfect synthetic loop: a vertically periodic
/// pattern cyclically shifted by a constant step.
struct LoopFrames {
    calls: AtomicUsize,
}

fn looping_frame(shift: u32) -> Frame {
    let (width, height) = (64u32, 64u32);
    let data = (0..height)
        .flat_map(|y| {
            (0..width).map(move |x| {
                let row = (y + shift) % 20;
                ((x * x * 7 + x * 3 + row * 11) % 251) as u8
            })
        })
        .collect();
    Frame {
        width,
        height,
        data,
    }
}

#[async_trait]
impl VideoFrameSource for LoopFrames {
    async fn load_metadata(&self) -> Result<VideoMetadata, FetchError> {
        Ok(VideoMetadata {
            duration: 30.0,
            width: 640,
            height: 360,
        })
    }

    async fn seek_and_capture(
        &self,
        _time: f64,
        _target: (u32, u32),
    ) -> Result<Frame, FetchError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst) as u32;
        Ok(looping_frame(index * 5))
    }
}

#[tokio::test]
async fn scan_returns_within_budget_even_when_upstream_hangs() {
    let scheduler = ScanScheduler::new(config(), Arc::new(HangingSource));
    let budget = Duration::from_millis(1300);

    let started = Instant::now();
    let result = scheduler
        .scan_with("https://cdn.photos.example/a.jpg", None, Some(budget))
        .await;
    let elapsed = started.elapsed();

    // Budget plus per-task slack, with scheduling headroom
    assert!(elapsed < Duration::from_millis(3000), "took {elapsed:?}");
    assert_eq!(result.status, ScanStatus::Timeout);
    assert_eq!(result.verdict, Verdict::Warning);
    assert!(result.error.is_some());
    assert!(result.confidence <= 0.4);
}

#[tokio::test]
async fn valid_manifest_from_malicious_domain_is_danger() {
    let scheduler = ScanScheduler::new(config(), Arc::new(SignedSource));
    let result = scheduler.scan("https://malware-test.org/signed.jpg").await;

    assert_eq!(result.status, ScanStatus::Complete);
    assert_eq!(result.verdict, Verdict::Danger);
    assert!(result
        .signals
        .iter()
        .any(|s| s == "manifest-forgery-suspected"));
    // The manifest itself parsed as structurally valid
    let manifest = result.manifest.expect("manifest check should have run");
    assert!(manifest.errors.is_empty());
}

#[tokio::test]
async fn trusted_domain_with_clean_bytes_is_safe() {
    let scheduler = ScanScheduler::new(config(), Arc::new(CleanSource));
    let result = scheduler.scan("https://wikipedia.org/commons/cat.jpg").await;

    assert_eq!(result.verdict, Verdict::Safe);
    assert!(result.confidence >= 0.6);
}

#[tokio::test]
async fn neutral_domain_with_clean_camera_bytes_is_safe() {
    let scheduler = ScanScheduler::new(config(), Arc::new(CleanSource));
    let result = scheduler.scan("https://cdn.photos.example/cat.jpg").await;

    assert_eq!(result.status, ScanStatus::Complete);
    assert_eq!(result.verdict, Verdict::Safe);
    assert!(result.confidence >= 0.6);
    assert!(result.bytes_downloaded > 0);
}

#[tokio::test]
async fn repeat_scan_is_served_from_cache() {
    let scheduler = ScanScheduler::new(config(), Arc::new(SlowSource));
    let url = "https://cdn.photos.example/cat.jpg";

    let first = scheduler.scan(url).await;
    assert!(first.scan_time >= Duration::from_millis(100));

    let second = scheduler.scan(url).await;
    assert_eq!(second.verdict, first.verdict);
    assert_eq!(second.confidence, first.confidence);
    assert!(second.scan_time < Duration::from_millis(50));
}

#[tokio::test]
async fn looping_video_flags_loop_artifact() {
    let scheduler = ScanScheduler::new(config(), Arc::new(Mp4Source));
    let frames = Arc::new(LoopFrames {
        calls: AtomicUsize::new(0),
    });
    let result = scheduler
        .scan_with("https://videos.example/clip.mp4", Some(frames), None)
        .await;

    assert_eq!(result.status, ScanStatus::Complete);
    let analysis = result.loop_analysis.expect("video analysis should have run");
    assert!(analysis.is_loop);
    assert!(result.signals.iter().any(|s| s == "loop-artifact"));
    // One suspicious task out of three lands in the warning band
    assert_eq!(result.verdict, Verdict::Warning);
}
