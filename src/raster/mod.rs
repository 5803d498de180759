//! Scanline rasterization with antialiasing.
//!
//! Every edge of the outline deposits its signed area into a per-row accumulator; a running
//! sum along the row then gives the coverage of each pixel (non-zero rule). Adjacent pixels
//! with equal coverage are merged into one [`Scanline`].

use {
  crate::geometry::{Bounds, P2},
  std::ops::Range
};


/// Coverage is quantized to this many levels, so interior runs merge into one span.
const COVERAGE_LEVELS: f64 = 65535.0;

/// Covered pixels `x1..x2` of row `y`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scanline {
  pub y: u32,
  pub x1: u32,
  /// exclusive
  pub x2: u32,
  /// Fraction of each pixel covered by the shape, `(0, 1]`
  pub coverage: f64
}

impl Scanline {
  pub fn pixels(&self) -> Range<u32> {
    self.x1..self.x2
  }
  pub fn len(&self) -> u32 {
    self.x2 - self.x1
  }
  pub fn is_empty(&self) -> bool {
    self.x2 <= self.x1
  }
}

/// Coverage-weighted pixel count of a set of scanlines.
pub fn covered_area(lines: &[Scanline]) -> f64 {
  lines.iter()
    .map(|l| l.len() as f64 * l.coverage)
    .sum()
}

/// Reusable fill state for one canvas size.
pub struct Rasterizer {
  bounds: Bounds,
  acc: Vec<f64>,
  stride: usize,
  rows: usize
}

impl Rasterizer {
  pub fn new(bounds: Bounds) -> Self {
    Self { bounds, acc: vec![], stride: 0, rows: 0 }
  }

  pub fn bounds(&self) -> Bounds {
    self.bounds
  }

  /// Fill the closed polygon `outline`, clipped to the canvas.
  pub fn fill(&mut self, outline: &[P2]) -> Vec<Scanline> {
    if outline.len() < 3 || !outline.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
      return vec![];
    }
    let (w, h) = (self.bounds.width as f64, self.bounds.height as f64);
    let (mut min, mut max) = (outline[0], outline[0]);
    for p in outline {
      min = min.min(*p);
      max = max.max(*p);
    }
    // pixel window touched by the outline, clipped to the canvas
    let x0 = min.x.floor().max(0.0);
    let x1 = max.x.ceil().min(w);
    let y0 = min.y.floor().max(0.0);
    let y1 = max.y.ceil().min(h);
    if x0 >= x1 || y0 >= y1 {
      return vec![];
    }
    let cols = (x1 - x0) as usize;
    self.rows = (y1 - y0) as usize;
    self.stride = cols + 2;
    self.acc.clear();
    self.acc.resize(self.rows * self.stride, 0.0);

    let origin = P2::new(x0, y0);
    let n = outline.len();
    for i in 0..n {
      let a = (outline[i] - origin).to_point();
      let b = (outline[(i + 1) % n] - origin).to_point();
      for (a, b) in clip_columns(a, b, cols as f64) {
        self.accumulate(a, b, cols as f64);
      }
    }
    self.collect_spans(x0 as u32, y0 as u32, cols)
  }

  /// Deposit the signed area of the edge `p0 -> p1`, with `x` already in `[0, cols]`.
  fn accumulate(&mut self, p0: P2, p1: P2, cols: f64) {
    if (p0.y - p1.y).abs() <= f64::EPSILON {
      return;
    }
    let (dir, p0, p1) = if p0.y < p1.y { (1.0, p0, p1) } else { (-1.0, p1, p0) };
    let dxdy = (p1.x - p0.x) / (p1.y - p0.y);
    let mut x = if p0.y < 0.0 { p0.x - p0.y * dxdy } else { p0.x };
    let y_start = p0.y.max(0.0).floor() as usize;
    let y_end = (p1.y.ceil().max(0.0) as usize).min(self.rows);

    for y in y_start..y_end {
      let row = &mut self.acc[y * self.stride..(y + 1) * self.stride];
      let dy = ((y + 1) as f64).min(p1.y) - (y as f64).max(p0.y);
      let x_next = x + dxdy * dy;
      let d = dy * dir;
      let (xa, xb) = if x < x_next { (x, x_next) } else { (x_next, x) };
      let (xa, xb) = (xa.clamp(0.0, cols), xb.clamp(0.0, cols));
      let xa_floor = xa.floor();
      let xai = xa_floor as usize;
      let xb_ceil = xb.ceil();
      let xbi = xb_ceil as usize;

      if xbi <= xai + 1 {
        // within a single pixel
        let xmf = 0.5 * (xa + xb) - xa_floor;
        row[xai] += d * (1.0 - xmf);
        row[xai + 1] += d * xmf;
      } else {
        let s = (xb - xa).recip();
        let xaf = xa - xa_floor;
        let a0 = 0.5 * s * (1.0 - xaf) * (1.0 - xaf);
        let xbf = xb - xb_ceil + 1.0;
        let am = 0.5 * s * xbf * xbf;
        row[xai] += d * a0;
        if xbi == xai + 2 {
          row[xai + 1] += d * (1.0 - a0 - am);
        } else {
          let a1 = s * (1.5 - xaf);
          row[xai + 1] += d * (a1 - a0);
          for xi in xai + 2..xbi - 1 {
            row[xi] += d * s;
          }
          let a2 = a1 + (xbi - xai - 3) as f64 * s;
          row[xbi - 1] += d * (1.0 - a2 - am);
        }
        row[xbi] += d * am;
      }
      x = x_next;
    }
  }

  fn collect_spans(&self, x0: u32, y0: u32, cols: usize) -> Vec<Scanline> {
    let mut lines = vec![];
    for (y, row) in self.acc.chunks_exact(self.stride).enumerate() {
      let mut acc = 0.0;
      let mut run: Option<(usize, u32)> = None;
      for x in 0..=cols {
        let level = if x < cols {
          acc += row[x];
          (acc.abs().min(1.0) * COVERAGE_LEVELS).round() as u32
        } else {
          0
        };
        match run {
          Some((_, l)) if l == level => {}
          _ => {
            if let Some((start, l)) = run.take() {
              if l > 0 {
                lines.push(Scanline {
                  y: y0 + y as u32,
                  x1: x0 + start as u32,
                  x2: x0 + x as u32,
                  coverage: l as f64 / COVERAGE_LEVELS
                });
              }
            }
            run = Some((x, level));
          }
        }
      }
    }
    lines
  }
}

/// Split `a -> b` at `x = 0` and `x = max`; the parts outside are projected onto the
/// boundary, which leaves the coverage of the columns in between unchanged.
fn clip_columns(a: P2, b: P2, max: f64) -> impl Iterator<Item = (P2, P2)> {
  let mut ts = vec![0.0, 1.0];
  let dx = b.x - a.x;
  if dx.abs() > f64::EPSILON {
    for edge in [0.0, max] {
      let t = (edge - a.x) / dx;
      if t > 0.0 && t < 1.0 {
        ts.push(t);
      }
    }
  }
  ts.sort_by(|l, r| l.total_cmp(r));
  let at = move |t: f64| a.lerp(b, t);
  (0..ts.len() - 1)
    .map(move |i| {
      let (p, q) = (at(ts[i]), at(ts[i + 1]));
      (P2::new(p.x.clamp(0.0, max), p.y), P2::new(q.x.clamp(0.0, max), q.y))
    })
    .collect::<Vec<_>>()
    .into_iter()
}
