use {
  super::{
    Bounds, Context, Primitive, P2,
    clamp, cross3, angle_between, shoelace, svg_points
  },
  itertools::Itertools
};

/// How vertices move relative to each other.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VertexPolicy {
  /// Any vertex jitters on its own, occasionally two vertices swap.
  Free,
  /// Four vertices `top, right, bottom, left`: top and bottom share their x, left and
  /// right share their y.
  Diamond
}

/// Parameters of the polygon engine. All lengths are in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolygonSpec {
  pub order: usize,
  pub convex: bool,
  /// Minimum interior angle, in degrees
  pub min_angle: f64,
  /// Initial spread of the vertices around the anchor; mutation step scale
  pub size_factor: f64,
  /// How far outside the canvas a vertex may go
  pub bounds_slack: f64,
  pub policy: VertexPolicy,
  pub name: &'static str
}

impl PolygonSpec {
  pub fn triangle() -> Self {
    Self {
      order: 3,
      convex: true,
      min_angle: 15.0,
      size_factor: 32.0,
      bounds_slack: 16.0,
      policy: VertexPolicy::Free,
      name: "triangle"
    }
  }
  pub fn polygon(order: usize) -> Self {
    Self {
      order: order.max(3),
      size_factor: 40.0,
      bounds_slack: 0.0,
      name: "polygon",
      ..Self::triangle()
    }
  }
  pub fn diamond() -> Self {
    Self {
      order: 4,
      size_factor: 20.0,
      bounds_slack: 0.0,
      policy: VertexPolicy::Diamond,
      name: "diamond",
      ..Self::triangle()
    }
  }
  /// Diamond layout with a tighter step, so the shape stays small and squat.
  pub fn bounded_aspect() -> Self {
    Self {
      size_factor: 10.0,
      bounds_slack: 0.0,
      policy: VertexPolicy::Diamond,
      name: "bounded-aspect polygon",
      ..Self::diamond()
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
  pub spec: PolygonSpec,
  pub points: Vec<P2>
}

impl Polygon {
  pub fn new(spec: PolygonSpec, points: Vec<P2>) -> Self {
    Self { spec, points }
  }

  /// Unvalidated placement around a uniform anchor; see [`super::Shape::random`].
  pub fn random(spec: PolygonSpec, ctx: &mut Context) -> Self {
    let sf = spec.size_factor;
    let anchor = ctx.point();
    let points = match spec.policy {
      VertexPolicy::Free => {
        let (lo, hi_x, hi_y) = spec.limits(ctx);
        let mut points = vec![anchor];
        for _ in 1..spec.order {
          let x = anchor.x + ctx.uniform() * sf - sf / 2.0;
          let y = anchor.y + ctx.uniform() * sf - sf / 2.0;
          points.push(P2::new(clamp(x, lo, hi_x), clamp(y, lo, hi_y)));
        }
        points
      }
      VertexPolicy::Diamond => {
        let right = P2::new(anchor.x + ctx.uniform() * sf, anchor.y + ctx.uniform() * sf);
        let bottom = P2::new(anchor.x, right.y + ctx.uniform() * sf);
        let left = P2::new(anchor.x - ctx.uniform() * 0.5 * sf - 0.3 * sf, right.y);
        vec![anchor, right, bottom, left]
      }
    };
    Self { spec, points }
  }

  fn perturb_free(&mut self, ctx: &mut Context) {
    let n = self.points.len();
    if ctx.uniform() < 0.25 {
      let (i, j) = (ctx.below(n), ctx.below(n));
      self.points.swap(i, j);
    } else {
      let (lo, hi_x, hi_y) = self.spec.limits(ctx);
      let step = self.spec.size_factor / 2.0;
      let i = ctx.below(n);
      let p = &mut self.points[i];
      p.x = clamp(p.x + ctx.normal() * step, lo, hi_x);
      p.y = clamp(p.y + ctx.normal() * step, lo, hi_y);
    }
  }

  // indices: 0 top, 1 right, 2 bottom, 3 left
  fn perturb_diamond(&mut self, ctx: &mut Context) {
    let (lo, hi_x, hi_y) = self.spec.limits(ctx);
    let sf = self.spec.size_factor;
    let idx = ctx.below(4);
    let p = self.points.clone();
    if idx % 2 == 0 {
      let x = clamp(p[idx].x + ctx.normal() * sf, p[3].x + 0.5 * sf, p[1].x - 0.5 * sf);
      let y = clamp(p[idx].y + ctx.normal() * sf, lo, hi_y);
      self.points[idx] = P2::new(x, y);
      self.points[(idx + 2) % 4].x = x;
    } else {
      let x = if idx == 1 {
        clamp(p[1].x + ctx.normal() * sf, lo, hi_x)
      } else {
        clamp(p[3].x + ctx.normal() * sf, lo, p[0].x - 0.5 * sf)
      };
      let y = clamp(p[idx].y + ctx.normal() * sf, p[0].y + 0.5 * sf, p[2].y - 0.5 * sf);
      self.points[idx] = P2::new(x, y);
      self.points[(idx + 2) % 4].y = y;
    }
  }

  fn convex(&self) -> bool {
    let mut signs = self.points.iter()
      .circular_tuple_windows::<(&P2, &P2, &P2)>()
      .map(|(a, b, c)| cross3(*a, *b, *c))
      .map(|c| if c > 0.0 { 1 } else if c < 0.0 { -1 } else { 0 });
    match signs.next() {
      Some(first) => first != 0 && signs.all(|s| s == first),
      None => false
    }
  }

  fn angles_ok(&self) -> bool {
    self.points.iter()
      .circular_tuple_windows::<(&P2, &P2, &P2)>()
      .all(|(a, b, c)| angle_between(*a, *b, *c) >= self.spec.min_angle)
  }

  fn in_bounds(&self, bounds: Bounds) -> bool {
    let m = self.spec.bounds_slack;
    let (w, h) = (bounds.width as f64, bounds.height as f64);
    self.points.iter()
      .all(|p| p.x >= -m && p.x <= w + m && p.y >= -m && p.y <= h + m)
  }

  fn diamond_ok(&self) -> bool {
    let p = &self.points;
    p[0].x == p[2].x
      && p[1].y == p[3].y
      && p[0].x - p[3].x <= p[1].x - p[0].x
  }
}

impl PolygonSpec {
  /// `(low, high_x, high_y)` coordinate limits on the given canvas
  fn limits(&self, ctx: &Context) -> (f64, f64, f64) {
    let m = self.bounds_slack;
    (-m, ctx.width() - 1.0 + m, ctx.height() - 1.0 + m)
  }
}

impl Primitive for Polygon {
  fn name(&self) -> &'static str { self.spec.name }

  fn perturb(&mut self, ctx: &mut Context) {
    match self.spec.policy {
      VertexPolicy::Free => self.perturb_free(ctx),
      VertexPolicy::Diamond => self.perturb_diamond(ctx)
    }
  }

  fn valid(&self, bounds: Bounds) -> bool {
    if self.points.len() != self.spec.order || self.points.len() < 3 {
      return false;
    }
    if !self.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
      return false;
    }
    if self.spec.convex && !self.convex() {
      return false;
    }
    if self.spec.policy == VertexPolicy::Diamond && !(self.points.len() == 4 && self.diamond_ok()) {
      return false;
    }
    self.angles_ok() && self.in_bounds(bounds)
  }

  fn outline(&self) -> Vec<P2> {
    self.points.clone()
  }

  fn area(&self) -> Option<f64> {
    Some(shoelace(&self.points))
  }

  fn svg(&self, attrs: &str) -> String {
    format!("<polygon {attrs} points=\"{}\" />", svg_points(&self.points))
  }
}
