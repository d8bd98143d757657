//! Frame-level math for loop detection.
//!
//! All functions here are pure over in-memory grayscale frames: timestamp
//! planning, nearest-neighbor resize, normalized cross-correlation,
//! block-matching optical flow, and the circular-motion score. Nothing in
//! this module does IO, so everything is testable with synthetic frames.

use crate::config::{FLOW_MAGNITUDE_MAX, FLOW_MAGNITUDE_MIN};
use crate::fetch::Frame;

use super::pool::FramePool;

/// Side length of the blocks used for coarse motion estimation.
const MOTION_BLOCK_SIZE: u32 = 16;
/// Search radius (px) for coarse motion block matching.
const MOTION_SEARCH_RADIUS: i32 = 7;
/// Magnitudes are normalized by this before comparing consecutive pairs.
const MOTION_NORMALIZER: f64 = 10.0;
/// Half-width of the patch matched around each feature point.
const FEATURE_PATCH_RADIUS: u32 = 4;
/// Search radius (px) for per-feature flow; must cover the plausible
/// loop-motion magnitude range.
const FEATURE_SEARCH_RADIUS: i32 = 21;
/// Variance floor for a block to count as a trackable feature.
const FEATURE_VARIANCE_MIN: f64 = 100.0;
/// Cap on tracked feature points per frame.
const MAX_FEATURE_POINTS: usize = 64;

/// Plans `count` capture timestamps across the video, biased away from
/// the first and last moments where black or transition frames are common.
pub(crate) fn plan_timestamps(duration: f64, count: usize) -> Vec<f64> {
    if count == 0 || duration <= 0.0 {
        return Vec::new();
    }
    let margin = (duration * 0.05).max(0.1).min(duration / 4.0);
    let span = (duration - 2.0 * margin).max(0.0);
    if count == 1 || span == 0.0 {
        return vec![duration / 2.0];
    }
    (0..count)
        .map(|i| margin + span * i as f64 / (count - 1) as f64)
        .collect()
}

/// Nearest-neighbor resize into a pool-backed buffer.
pub(crate) fn resize(frame: &Frame, width: u32, height: u32, pool: &FramePool) -> Frame {
    let mut data = pool.checkout((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let src_x = x * frame.width / width.max(1);
            let src_y = y * frame.height / height.max(1);
            data[(y * width + x) as usize] = frame.pixel(src_x, src_y);
        }
    }
    Frame {
        width,
        height,
        data,
    }
}

/// Normalized cross-correlation between two equally sized frames,
/// clamped to `[0, 1]`. Anti-correlated content scores 0.
pub(crate) fn similarity(a: &Frame, b: &Frame) -> f64 {
    debug_assert_eq!((a.width, a.height), (b.width, b.height));
    let n = a.data.len().min(b.data.len());
    if n == 0 {
        return 0.0;
    }
    let mean_a = a.data[..n].iter().map(|p| f64::from(*p)).sum::<f64>() / n as f64;
    let mean_b = b.data[..n].iter().map(|p| f64::from(*p)).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..n {
        let da = f64::from(a.data[i]) - mean_a;
        let db = f64::from(b.data[i]) - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    let denom = (var_a * var_b).sqrt();
    if denom < 1e-9 {
        // Flat frames: identical brightness counts as a match
        return if (mean_a - mean_b).abs() < 1.0 { 1.0 } else { 0.0 };
    }
    (cov / denom).max(0.0)
}

/// Sum of absolute differences between a block in `a` at (x, y) and the
/// block in `b` shifted by (dx, dy).
fn block_sad(a: &Frame, b: &Frame, x: u32, y: u32, size: u32, dx: i32, dy: i32) -> u64 {
    let mut sad = 0u64;
    for oy in 0..size {
        for ox in 0..size {
            let ax = x + ox;
            let ay = y + oy;
            let bx = (ax as i32 + dx).max(0) as u32;
            let by = (ay as i32 + dy).max(0) as u32;
            sad += u64::from(a.pixel(ax, ay).abs_diff(b.pixel(bx, by)));
        }
    }
    sad
}

/// Best-match displacement of the block at (x, y) from `a` into `b`.
fn block_match(a: &Frame, b: &Frame, x: u32, y: u32, size: u32, radius: i32) -> (i32, i32) {
    let mut best = (0, 0);
    let mut best_sad = u64::MAX;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let sad = block_sad(a, b, x, y, size, dx, dy);
            if sad < best_sad {
                best_sad = sad;
                best = (dx, dy);
            }
        }
    }
    best
}

/// Average optical-flow magnitude (px) between two frames, from coarse
/// block matching over a regular grid.
pub(crate) fn average_flow_magnitude(a: &Frame, b: &Frame) -> f64 {
    let mut total = 0.0;
    let mut blocks = 0usize;
    let mut y = 0;
    while y + MOTION_BLOCK_SIZE <= a.height {
        let mut x = 0;
        while x + MOTION_BLOCK_SIZE <= a.width {
            let (dx, dy) = block_match(a, b, x, y, MOTION_BLOCK_SIZE, MOTION_SEARCH_RADIUS);
            total += f64::from(dx * dx + dy * dy).sqrt();
            blocks += 1;
            x += MOTION_BLOCK_SIZE;
        }
        y += MOTION_BLOCK_SIZE;
    }
    if blocks == 0 {
        return 0.0;
    }
    total / blocks as f64
}

/// Motion-consistency score over the per-pair flow magnitudes.
///
/// Genuine footage has irregular motion between samples; loops repeat the
/// same displacement. Each consecutive magnitude pair contributes
/// `1 - |m_i - m_{i+1}|` after normalization.
pub(crate) fn motion_consistency(magnitudes: &[f64]) -> f64 {
    if magnitudes.len() < 2 {
        return 0.0;
    }
    let scores: Vec<f64> = magnitudes
        .windows(2)
        .map(|pair| {
            let a = (pair[0] / MOTION_NORMALIZER).clamp(0.0, 1.0);
            let b = (pair[1] / MOTION_NORMALIZER).clamp(0.0, 1.0);
            1.0 - (a - b).abs()
        })
        .collect();
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// Trackable feature points: centers of blocks with enough local variance
/// to make a match meaningful.
pub(crate) fn feature_points(frame: &Frame) -> Vec<(u32, u32)> {
    let block = FEATURE_PATCH_RADIUS * 2;
    let mut points = Vec::new();
    let mut y = 0;
    while y + block <= frame.height && points.len() < MAX_FEATURE_POINTS {
        let mut x = 0;
        while x + block <= frame.width && points.len() < MAX_FEATURE_POINTS {
            if block_variance(frame, x, y, block) >= FEATURE_VARIANCE_MIN {
                points.push((x + block / 2, y + block / 2));
            }
            x += block;
        }
        y += block;
    }
    points
}

fn block_variance(frame: &Frame, x: u32, y: u32, size: u32) -> f64 {
    let n = f64::from(size * size);
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for oy in 0..size {
        for ox in 0..size {
            let p = f64::from(frame.pixel(x + ox, y + oy));
            sum += p;
            sum_sq += p * p;
        }
    }
    let mean = sum / n;
    sum_sq / n - mean * mean
}

/// Per-feature flow vectors from `a` to `b`.
pub(crate) fn flow_vectors(points: &[(u32, u32)], a: &Frame, b: &Frame) -> Vec<(f64, f64)> {
    points
        .iter()
        .map(|(cx, cy)| {
            let x = cx.saturating_sub(FEATURE_PATCH_RADIUS);
            let y = cy.saturating_sub(FEATURE_PATCH_RADIUS);
            let (dx, dy) =
                block_match(a, b, x, y, FEATURE_PATCH_RADIUS * 2, FEATURE_SEARCH_RADIUS);
            (f64::from(dx), f64::from(dy))
        })
        .collect()
}

/// True when a flow vector falls in one of the two opposing angular bands
/// characteristic of circular loop motion, with plausible magnitude.
pub(crate) fn in_circular_band(dx: f64, dy: f64) -> bool {
    let magnitude = (dx * dx + dy * dy).sqrt();
    if !(FLOW_MAGNITUDE_MIN..=FLOW_MAGNITUDE_MAX).contains(&magnitude) {
        return false;
    }
    let mut angle = dy.atan2(dx).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    (45.0..=135.0).contains(&angle) || (225.0..=315.0).contains(&angle)
}

/// Fraction of flow vectors showing circular loop motion.
pub(crate) fn circularity_score(vectors: &[(f64, f64)]) -> f64 {
    if vectors.is_empty() {
        return 0.0;
    }
    let hits = vectors.iter().filter(|(dx, dy)| in_circular_band(*dx, *dy)).count();
    hits as f64 / vectors.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| ((x * 3 + y * 5) % 256) as u8))
            .collect();
        Frame {
            width,
            height,
            data,
        }
    }

    fn shifted_frame(frame: &Frame, dx: u32) -> Frame {
        let data = (0..frame.height)
            .flat_map(|y| {
                (0..frame.width).map(move |x| frame.pixel(x.saturating_sub(dx), y))
            })
            .collect();
        Frame {
            width: frame.width,
            height: frame.height,
            data,
        }
    }

    #[test]
    fn test_plan_timestamps_avoids_edges() {
        let times = plan_timestamps(10.0, 5);
        assert_eq!(times.len(), 5);
        assert!(times[0] >= 0.1);
        assert!(*times.last().unwrap() <= 10.0 - 0.1);
        for pair in times.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_plan_timestamps_degenerate_inputs() {
        assert!(plan_timestamps(0.0, 5).is_empty());
        assert!(plan_timestamps(10.0, 0).is_empty());
        assert_eq!(plan_timestamps(10.0, 1), vec![5.0]);
    }

    #[test]
    fn test_identical_frames_fully_similar() {
        let frame = gradient_frame(32, 32);
        assert!((similarity(&frame, &frame) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_frame_not_similar() {
        let frame = gradient_frame(32, 32);
        let inverted = Frame {
            width: 32,
            height: 32,
            data: frame.data.iter().map(|p| 255 - p).collect(),
        };
        assert!(similarity(&frame, &inverted) < 0.1);
    }

    #[test]
    fn test_flat_frames_similarity() {
        let white = Frame {
            width: 8,
            height: 8,
            data: vec![200; 64],
        };
        let black = Frame {
            width: 8,
            height: 8,
            data: vec![10; 64],
        };
        assert_eq!(similarity(&white, &white.clone()), 1.0);
        assert_eq!(similarity(&white, &black), 0.0);
    }

    #[test]
    fn test_resize_preserves_flat_content() {
        let pool = FramePool::new(4);
        let frame = Frame {
            width: 16,
            height: 16,
            data: vec![77; 256],
        };
        let small = resize(&frame, 8, 8, &pool);
        assert_eq!((small.width, small.height), (8, 8));
        assert!(small.data.iter().all(|p| *p == 77));
    }

    #[test]
    fn test_block_match_recovers_known_shift() {
        let frame = gradient_frame(64, 64);
        let shifted = shifted_frame(&frame, 3);
        let magnitude = average_flow_magnitude(&frame, &shifted);
        assert!(
            (magnitude - 3.0).abs() < 1.0,
            "expected ~3px flow, got {magnitude}"
        );
    }

    #[test]
    fn test_motion_consistency_rewards_steady_motion() {
        let steady = motion_consistency(&[3.0, 3.0, 3.0, 3.0]);
        let erratic = motion_consistency(&[1.0, 9.0, 2.0, 8.0]);
        assert!((steady - 1.0).abs() < 1e-9);
        assert!(erratic < 0.5);
        assert_eq!(motion_consistency(&[3.0]), 0.0);
    }

    #[test]
    fn test_feature_points_skip_flat_regions() {
        let flat = Frame {
            width: 64,
            height: 64,
            data: vec![128; 64 * 64],
        };
        assert!(feature_points(&flat).is_empty());
        assert!(!feature_points(&gradient_frame(64, 64)).is_empty());
    }

    #[test]
    fn test_circular_band_membership() {
        // Straight up (screen coordinates: +y is down, still in band)
        assert!(in_circular_band(0.0, 5.0));
        assert!(in_circular_band(0.0, -5.0));
        // Horizontal motion is not circular-band motion
        assert!(!in_circular_band(5.0, 0.0));
        // Magnitude out of the plausible range
        assert!(!in_circular_band(0.0, 1.0));
        assert!(!in_circular_band(0.0, 25.0));
    }

    #[test]
    fn test_circularity_score_fraction() {
        let vectors = vec![(0.0, 5.0), (0.0, -5.0), (5.0, 0.0), (0.0, 30.0)];
        assert!((circularity_score(&vectors) - 0.5).abs() < 1e-9);
        assert_eq!(circularity_score(&[]), 0.0);
    }
}
