use super::{Bounds, Context, Primitive, P2, V2, clamp};

/// Stroked quadratic Bézier curve `p1 -> p3` with control point `p2`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadratic {
  pub p1: P2,
  pub p2: P2,
  pub p3: P2,
  pub width: f64
}

const SLACK: f64 = 16.0;

impl Quadratic {
  pub fn new(p1: P2, p2: P2, p3: P2) -> Self {
    Self { p1, p2, p3, width: 0.5 }
  }

  pub fn random(ctx: &mut Context) -> Self {
    let p1 = ctx.point();
    let p2 = P2::new(p1.x + ctx.uniform() * 40.0 - 20.0, p1.y + ctx.uniform() * 40.0 - 20.0);
    let p3 = P2::new(p2.x + ctx.uniform() * 40.0 - 20.0, p2.y + ctx.uniform() * 40.0 - 20.0);
    Self::new(p1, p2, p3)
  }

  pub fn at(&self, t: f64) -> P2 {
    let u = 1.0 - t;
    (self.p1.to_vector() * (u * u)
      + self.p2.to_vector() * (2.0 * u * t)
      + self.p3.to_vector() * (t * t)).to_point()
  }

  fn flatten(&self) -> Vec<P2> {
    let length = (self.p2 - self.p1).length() + (self.p3 - self.p2).length();
    let segments = (length / 2.0).ceil().clamp(4.0, 64.0) as usize;
    (0..=segments)
      .map(|i| self.at(i as f64 / segments as f64))
      .collect()
  }
}

impl Primitive for Quadratic {
  fn name(&self) -> &'static str { "quadratic curve" }

  fn perturb(&mut self, ctx: &mut Context) {
    let (hi_x, hi_y) = (ctx.width() - 1.0 + SLACK, ctx.height() - 1.0 + SLACK);
    let p = match ctx.below(3) {
      0 => &mut self.p1,
      1 => &mut self.p2,
      _ => &mut self.p3
    };
    p.x = clamp(p.x + ctx.normal() * 16.0, -SLACK, hi_x);
    p.y = clamp(p.y + ctx.normal() * 16.0, -SLACK, hi_y);
  }

  fn valid(&self, _: Bounds) -> bool {
    let d12 = self.p1.distance_to(self.p2);
    let d23 = self.p2.distance_to(self.p3);
    let d13 = self.p1.distance_to(self.p3);
    d13 > d12 && d13 > d23
  }

  /// The stroke of the flattened curve as one closed polygon.
  fn outline(&self) -> Vec<P2> {
    let points = self.flatten();
    let n = points.len();
    let hw = self.width / 2.0;
    let mut normal = V2::new(0.0, 1.0);
    let offsets = (0..n)
      .map(|i| {
        let tangent = points[(i + 1).min(n - 1)] - points[i.saturating_sub(1)];
        if tangent.length() > 1e-9 {
          let t = tangent.normalize();
          normal = V2::new(-t.y, t.x);
        }
        normal * hw
      })
      .collect::<Vec<_>>();
    let left = points.iter().zip(&offsets).map(|(p, o)| *p + *o);
    let right = points.iter().zip(&offsets).rev().map(|(p, o)| *p - *o);
    left.chain(right).collect()
  }

  fn area(&self) -> Option<f64> {
    None
  }

  fn svg(&self, attrs: &str) -> String {
    let attrs = attrs.replace("fill", "stroke");
    format!(
      "<path {attrs} fill=\"none\" d=\"M {:.6} {:.6} Q {:.6} {:.6}, {:.6} {:.6}\" \
       stroke-width=\"{:.6}\" />",
      self.p1.x, self.p1.y, self.p2.x, self.p2.y, self.p3.x, self.p3.y, self.width
    )
  }
}
