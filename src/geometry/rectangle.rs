use super::{Bounds, Context, Primitive, P2, clamp, svg_points};

/// Axis-aligned rectangle spanned by two opposite corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
  pub a: P2,
  pub b: P2
}

impl Rectangle {
  pub fn new(a: P2, b: P2) -> Self {
    Self { a, b }
  }

  pub fn random(ctx: &mut Context) -> Self {
    let a = P2::new(ctx.uniform() * (ctx.width() - 1.0), ctx.uniform() * (ctx.height() - 1.0));
    let b = P2::new(
      clamp(a.x + 1.0 + ctx.uniform() * 31.0, 0.0, ctx.width()),
      clamp(a.y + 1.0 + ctx.uniform() * 31.0, 0.0, ctx.height())
    );
    Self { a, b }
  }

  /// `(min, max)` corners
  pub fn corners(&self) -> (P2, P2) {
    (self.a.min(self.b), self.a.max(self.b))
  }
}

impl Primitive for Rectangle {
  fn name(&self) -> &'static str { "rectangle" }

  fn perturb(&mut self, ctx: &mut Context) {
    let (w, h) = (ctx.width(), ctx.height());
    let (dx, dy) = (ctx.normal() * 16.0, ctx.normal() * 16.0);
    let p = if ctx.below(2) == 0 { &mut self.a } else { &mut self.b };
    p.x = clamp(p.x + dx, 0.0, w);
    p.y = clamp(p.y + dy, 0.0, h);
  }

  fn valid(&self, bounds: Bounds) -> bool {
    let (min, max) = self.corners();
    min.x >= 0.0 && min.y >= 0.0
      && max.x <= bounds.width as f64 && max.y <= bounds.height as f64
      && max.x - min.x >= 1.0 && max.y - min.y >= 1.0
  }

  fn outline(&self) -> Vec<P2> {
    let (min, max) = self.corners();
    vec![min, P2::new(max.x, min.y), max, P2::new(min.x, max.y)]
  }

  fn area(&self) -> Option<f64> {
    let (min, max) = self.corners();
    Some((max.x - min.x) * (max.y - min.y))
  }

  fn svg(&self, attrs: &str) -> String {
    let (min, max) = self.corners();
    format!(
      "<rect {attrs} x=\"{:.6}\" y=\"{:.6}\" width=\"{:.6}\" height=\"{:.6}\" />",
      min.x, min.y, max.x - min.x, max.y - min.y
    )
  }
}

/// Rectangle of size `sx × sy` centred on `center`, rotated by `angle` degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedRectangle {
  pub center: P2,
  pub sx: f64,
  pub sy: f64,
  pub angle: f64,
  pub max_aspect: f64
}

impl RotatedRectangle {
  pub fn new(center: P2, sx: f64, sy: f64, angle: f64) -> Self {
    Self { center, sx, sy, angle, max_aspect: 5.0 }
  }

  pub fn random(ctx: &mut Context) -> Self {
    let center = ctx.point();
    let sx = 1.0 + ctx.uniform() * 31.0;
    let sy = 1.0 + ctx.uniform() * 31.0;
    let angle = ctx.uniform() * 360.0;
    Self::new(center, sx, sy, angle)
  }
}

impl Primitive for RotatedRectangle {
  fn name(&self) -> &'static str { "rotated rectangle" }

  fn perturb(&mut self, ctx: &mut Context) {
    let (w, h) = (ctx.width(), ctx.height());
    match ctx.below(3) {
      0 => {
        self.center.x = clamp(self.center.x + ctx.normal() * 16.0, 0.0, w - 1.0);
        self.center.y = clamp(self.center.y + ctx.normal() * 16.0, 0.0, h - 1.0);
      }
      1 => {
        self.sx = clamp(self.sx + ctx.normal() * 16.0, 1.0, w - 1.0);
        self.sy = clamp(self.sy + ctx.normal() * 16.0, 1.0, h - 1.0);
      }
      _ => self.angle += ctx.normal() * 32.0
    }
  }

  fn valid(&self, _: Bounds) -> bool {
    let (long, short) = (self.sx.max(self.sy), self.sx.min(self.sy));
    self.center.x.is_finite() && self.center.y.is_finite() && self.angle.is_finite()
      && short >= 1.0 && long / short <= self.max_aspect
  }

  fn outline(&self) -> Vec<P2> {
    let (sin, cos) = self.angle.to_radians().sin_cos();
    let (hx, hy) = (self.sx / 2.0, self.sy / 2.0);
    [(-hx, -hy), (hx, -hy), (hx, hy), (-hx, hy)].iter()
      .map(|&(x, y)| P2::new(
        self.center.x + x * cos - y * sin,
        self.center.y + x * sin + y * cos
      ))
      .collect()
  }

  fn area(&self) -> Option<f64> {
    Some(self.sx * self.sy)
  }

  fn svg(&self, attrs: &str) -> String {
    format!("<polygon {attrs} points=\"{}\" />", svg_points(&self.outline()))
  }
}
