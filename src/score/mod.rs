//! Color fitting and the normalized RMS score.
//!
//! The score of a canvas against the target is `sqrt(Σ(t - c)² / (W·H·3)) / 255` over the
//! RGB channels of every pixel, so it lies in `[0, 1]`.

use {
  crate::{
    drawing::{Color, line_bytes},
    raster::Scanline
  },
  image::RgbaImage
};


/// Energy of a rejected candidate; the largest score possible.
pub const WORST_ENERGY: f64 = 1.0;

/// Least-squares fill color that, composited at `alpha` over `current`, best matches
/// `target` on the covered pixels. Degenerate input yields black at `alpha`.
pub fn compute_color(
  target: &RgbaImage,
  current: &RgbaImage,
  lines: &[Scanline],
  alpha: u8
) -> Color {
  let fallback = Color::BLACK.with_alpha(alpha);
  if alpha == 0 {
    return fallback;
  }
  let a = alpha as f64 / 255.0;
  let width = target.width();
  let target: &[u8] = target;
  let current: &[u8] = current;
  let mut num = [0.0f64; 3];
  let mut den = 0.0;
  for line in lines {
    let w = line.coverage;
    let range = line_bytes(line, width);
    let pixels = target[range.clone()].chunks_exact(4).zip(current[range].chunks_exact(4));
    for (t, c) in pixels {
      for ch in 0..3 {
        let (t, c) = (t[ch] as f64, c[ch] as f64);
        num[ch] += w * w * c + w * (t - c) / a;
      }
      den += w * w;
    }
  }
  if den <= f64::EPSILON {
    return fallback;
  }
  let channel = |n: f64| (n / den).clamp(0.0, 255.0).round() as u8;
  Color::new(channel(num[0]), channel(num[1]), channel(num[2]), alpha)
}

/// Euclidean RGB distance, normalized to `[0, 1]`.
pub fn color_distance(a: Color, b: Color) -> f64 {
  let d = |x: u8, y: u8| (x as f64 - y as f64).powi(2);
  (d(a.r, b.r) + d(a.g, b.g) + d(a.b, b.b)).sqrt() / (255.0 * 3f64.sqrt())
}

fn samples(image: &RgbaImage) -> f64 {
  image.width() as f64 * image.height() as f64 * 3.0
}

fn squared_diff(a: &[u8], b: &[u8]) -> f64 {
  a.chunks_exact(4)
    .zip(b.chunks_exact(4))
    .map(|(p, q)| (0..3).map(|ch| (p[ch] as f64 - q[ch] as f64).powi(2)).sum::<f64>())
    .sum()
}

/// Score of `b` against `a`, from scratch.
pub fn difference_full(a: &RgbaImage, b: &RgbaImage) -> f64 {
  debug_assert_eq!(a.dimensions(), b.dimensions());
  let total = squared_diff(a, b);
  (total / samples(a)).sqrt() / 255.0
}

/// Score of `after` against `target`, given that `before` scored `score` and the two differ
/// only on `lines`.
pub fn difference_partial(
  target: &RgbaImage,
  before: &RgbaImage,
  after: &RgbaImage,
  score: f64,
  lines: &[Scanline]
) -> f64 {
  let n = samples(target);
  let width = target.width();
  let mut total = (score * 255.0).powi(2) * n;
  let target: &[u8] = target;
  let before: &[u8] = before;
  let after: &[u8] = after;
  for line in lines {
    let range = line_bytes(line, width);
    total -= squared_diff(&target[range.clone()], &before[range.clone()]);
    total += squared_diff(&target[range.clone()], &after[range]);
  }
  (total.max(0.0) / n).sqrt() / 255.0
}
