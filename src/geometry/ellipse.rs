use {
  super::{Bounds, Context, Primitive, P2, clamp, ellipse_ring},
  std::f64::consts::PI
};

/// Axis-aligned ellipse. With `circle` set the two radii move together.
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipse {
  pub center: P2,
  pub rx: f64,
  pub ry: f64,
  pub circle: bool
}

impl Ellipse {
  pub fn new(center: P2, rx: f64, ry: f64) -> Self {
    Self { center, rx, ry, circle: false }
  }

  pub fn circle(center: P2, r: f64) -> Self {
    Self { center, rx: r, ry: r, circle: true }
  }

  pub fn random(ctx: &mut Context) -> Self {
    let center = ctx.point();
    let rx = 1.0 + ctx.uniform() * 31.0;
    let ry = 1.0 + ctx.uniform() * 31.0;
    Self::new(center, rx, ry)
  }

  pub fn random_circle(ctx: &mut Context) -> Self {
    let center = ctx.point();
    Self::circle(center, 1.0 + ctx.uniform() * 31.0)
  }
}

impl Primitive for Ellipse {
  fn name(&self) -> &'static str {
    if self.circle { "circle" } else { "ellipse" }
  }

  fn perturb(&mut self, ctx: &mut Context) {
    let (w, h) = (ctx.width(), ctx.height());
    match ctx.below(3) {
      0 => {
        self.center.x = clamp(self.center.x + ctx.normal() * 16.0, 0.0, w - 1.0);
        self.center.y = clamp(self.center.y + ctx.normal() * 16.0, 0.0, h - 1.0);
      }
      1 => {
        self.rx = clamp(self.rx + ctx.normal() * 16.0, 1.0, w - 1.0);
        if self.circle { self.ry = self.rx; }
      }
      _ => {
        self.ry = clamp(self.ry + ctx.normal() * 16.0, 1.0, h - 1.0);
        if self.circle { self.rx = self.ry; }
      }
    }
  }

  fn valid(&self, bounds: Bounds) -> bool {
    self.rx >= 1.0 && self.ry >= 1.0
      && (!self.circle || self.rx == self.ry)
      && self.center.x >= 0.0 && self.center.x <= bounds.width as f64
      && self.center.y >= 0.0 && self.center.y <= bounds.height as f64
  }

  fn outline(&self) -> Vec<P2> {
    ellipse_ring(self.center, self.rx, self.ry, 0.0)
  }

  fn area(&self) -> Option<f64> {
    Some(PI * self.rx * self.ry)
  }

  fn svg(&self, attrs: &str) -> String {
    format!(
      "<ellipse {attrs} cx=\"{:.6}\" cy=\"{:.6}\" rx=\"{:.6}\" ry=\"{:.6}\" />",
      self.center.x, self.center.y, self.rx, self.ry
    )
  }
}

/// Ellipse rotated by `angle` degrees about its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedEllipse {
  pub center: P2,
  pub rx: f64,
  pub ry: f64,
  pub angle: f64
}

impl RotatedEllipse {
  pub fn new(center: P2, rx: f64, ry: f64, angle: f64) -> Self {
    Self { center, rx, ry, angle }
  }

  pub fn random(ctx: &mut Context) -> Self {
    let center = ctx.point();
    let rx = 1.0 + ctx.uniform() * 32.0;
    let ry = 1.0 + ctx.uniform() * 32.0;
    let angle = ctx.uniform() * 360.0;
    Self::new(center, rx, ry, angle)
  }
}

impl Primitive for RotatedEllipse {
  fn name(&self) -> &'static str { "rotated ellipse" }

  fn perturb(&mut self, ctx: &mut Context) {
    let (w, h) = (ctx.width(), ctx.height());
    match ctx.below(3) {
      0 => {
        self.center.x = clamp(self.center.x + ctx.normal() * 16.0, 0.0, w - 1.0);
        self.center.y = clamp(self.center.y + ctx.normal() * 16.0, 0.0, h - 1.0);
      }
      1 => {
        self.rx = clamp(self.rx + ctx.normal() * 16.0, 1.0, w - 1.0);
        self.ry = clamp(self.ry + ctx.normal() * 16.0, 1.0, w - 1.0);
      }
      _ => self.angle += ctx.normal() * 32.0
    }
  }

  fn valid(&self, bounds: Bounds) -> bool {
    self.rx >= 1.0 && self.ry >= 1.0 && self.angle.is_finite()
      && self.center.x >= 0.0 && self.center.x <= bounds.width as f64
      && self.center.y >= 0.0 && self.center.y <= bounds.height as f64
  }

  fn outline(&self) -> Vec<P2> {
    ellipse_ring(self.center, self.rx, self.ry, self.angle)
  }

  fn area(&self) -> Option<f64> {
    Some(PI * self.rx * self.ry)
  }

  fn svg(&self, attrs: &str) -> String {
    format!(
      "<ellipse {attrs} cx=\"{:.6}\" cy=\"{:.6}\" rx=\"{:.6}\" ry=\"{:.6}\" \
       transform=\"rotate({:.6} {:.6} {:.6})\" />",
      self.center.x, self.center.y, self.rx, self.ry,
      self.angle, self.center.x, self.center.y
    )
  }
}
