use super::{
  Bounds, Context, Primitive, P2,
  clamp, angle_between, shoelace, svg_points
};

/// Triangle with a vertical left edge `top -> bottom` and an apex to its right.
///
/// Moving either end of the edge mirrors the other one about the horizontal centre line
/// of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct RightTriangle {
  pub top: P2,
  pub bottom: P2,
  pub apex: P2,
  /// Standard deviation of vertex jitter
  pub step: f64,
  /// Apex rows start this fraction of the edge length below `top`
  pub y_tolerance: f64,
  pub min_angle: f64
}

impl RightTriangle {
  pub fn new(top: P2, bottom: P2, apex: P2) -> Self {
    Self { top, bottom, apex, step: 10.0, y_tolerance: 0.2, min_angle: 15.0 }
  }

  pub fn random(ctx: &mut Context) -> Self {
    let (w, h) = (ctx.width(), ctx.height());
    let x = ctx.uniform() * (w - 31.0).max(1.0);
    let y1 = ctx.uniform() * h / 2.0;
    let y2 = y1 + ctx.uniform() * h / 2.0 + 1.0;
    let span = y2 - y1;
    let apex = P2::new(
      x + ctx.uniform() * 31.0,
      y1 + 0.2 * span + ctx.uniform() * span
    );
    Self::new(P2::new(x, y1), P2::new(x, y2), apex)
  }

  fn points(&self) -> [P2; 3] {
    [self.top, self.bottom, self.apex]
  }
}

impl Primitive for RightTriangle {
  fn name(&self) -> &'static str { "right-facing triangle" }

  fn perturb(&mut self, ctx: &mut Context) {
    let (xmax, ymax) = (ctx.width() - 1.0, ctx.height() - 1.0);
    let step = self.step;
    match ctx.below(3) {
      0 => {
        self.top.x = clamp(self.top.x + ctx.normal() * step, 0.0, xmax);
        self.top.y = clamp(self.top.y + ctx.normal() * step, 0.0, ymax);
        self.bottom = P2::new(self.top.x, ymax - self.top.y);
      }
      1 => {
        self.bottom.x = clamp(self.bottom.x + ctx.normal() * step, 0.0, xmax);
        self.bottom.y = clamp(self.bottom.y + ctx.normal() * step, 0.0, ymax);
        self.top = P2::new(self.bottom.x, ymax - self.bottom.y);
      }
      _ => {
        self.apex.x = clamp(self.apex.x + ctx.normal() * step, 0.0, xmax);
        let span = self.bottom.y - self.top.y;
        self.apex.y = self.top.y + self.y_tolerance * span + ctx.uniform() * span;
      }
    }
  }

  fn valid(&self, bounds: Bounds) -> bool {
    let [a, b, c] = self.points();
    let (w, h) = (bounds.width as f64, bounds.height as f64);
    let on_canvas = self.points().iter()
      .all(|p| p.x >= 0.0 && p.x <= w && p.y >= 0.0 && p.y <= h);
    on_canvas
      && a.x == b.x
      && c.x >= a.x
      && c.y >= a.y && c.y <= b.y
      && angle_between(c, a, b) >= self.min_angle
      && angle_between(a, b, c) >= self.min_angle
      && angle_between(b, c, a) >= self.min_angle
  }

  fn outline(&self) -> Vec<P2> {
    self.points().to_vec()
  }

  fn area(&self) -> Option<f64> {
    Some(shoelace(&self.points()))
  }

  fn svg(&self, attrs: &str) -> String {
    format!("<polygon {attrs} points=\"{}\" />", svg_points(&self.points()))
  }
}
