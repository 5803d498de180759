//! Shape family.
//!
//! The origin of coordinate system is in top-left corner, coordinates are in pixels of the
//! working canvas. Every shape keeps itself valid: construction and [`Primitive::mutate`]
//! only ever leave behind geometry that passes [`Primitive::valid`].

use {
  crate::{
    error::{Error, Result, config_bail},
    raster::{Rasterizer, Scanline}
  },
  euclid::{Point2D, Vector2D, Size2D, Box2D},
  rand::Rng,
  rand_distr::StandardNormal,
  rand_pcg::Pcg64
};

mod polygon;
mod triangle;
mod rectangle;
mod ellipse;
mod quadratic;
#[cfg(test)] mod tests;

pub use {
  polygon::{Polygon, PolygonSpec, VertexPolicy},
  triangle::RightTriangle,
  rectangle::{Rectangle, RotatedRectangle},
  ellipse::{Ellipse, RotatedEllipse},
  quadratic::Quadratic
};

/// Pixel coordinate basis
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PixelSpace;

pub type P2 = Point2D<f64, PixelSpace>;
pub type V2 = Vector2D<f64, PixelSpace>;
/// Canvas size, in pixels
pub type Bounds = Size2D<u32, PixelSpace>;

/// Upper bound on perturbations tried by a single [`Primitive::mutate`].
pub const MAX_MUTATION_ATTEMPTS: usize = 1000;

/// Everything a shape needs from the worker that spawned it.
pub struct Context<'a> {
  pub bounds: Bounds,
  pub rng: &'a mut Pcg64
}

impl<'a> Context<'a> {
  pub fn new(bounds: Bounds, rng: &'a mut Pcg64) -> Self {
    Self { bounds, rng }
  }
  pub fn width(&self) -> f64 { self.bounds.width as f64 }
  pub fn height(&self) -> f64 { self.bounds.height as f64 }
  /// Uniform sample in `[0, 1)`
  pub fn uniform(&mut self) -> f64 { self.rng.gen() }
  /// Standard normal sample
  pub fn normal(&mut self) -> f64 { self.rng.sample(StandardNormal) }
  /// Uniform integer in `[0, n)`
  pub fn below(&mut self, n: usize) -> usize { self.rng.gen_range(0..n) }
  /// Uniform point on the canvas
  pub fn point(&mut self) -> P2 {
    P2::new(self.uniform() * self.width(), self.uniform() * self.height())
  }
}

pub trait Primitive: Clone {
  fn name(&self) -> &'static str;
  /// One randomized move. May leave the shape invalid.
  fn perturb(&mut self, ctx: &mut Context);
  fn valid(&self, bounds: Bounds) -> bool;
  /// Closed outline, flattened to line segments.
  fn outline(&self) -> Vec<P2>;
  /// `None` when the variant has no meaningful area.
  fn area(&self) -> Option<f64>;
  fn svg(&self, attrs: &str) -> String;

  /// Perturb until the shape is valid again. On failure `self` is left untouched.
  fn mutate(&mut self, ctx: &mut Context) -> Result<()> {
    let mut next = self.clone();
    for _ in 0..MAX_MUTATION_ATTEMPTS {
      next.perturb(ctx);
      if next.valid(ctx.bounds) {
        *self = next;
        return Ok(());
      }
    }
    Err(Error::ValiditySearchExhausted {
      kind: self.name(),
      attempts: MAX_MUTATION_ATTEMPTS
    })
  }

  fn rasterize(&self, rasterizer: &mut Rasterizer) -> Vec<Scanline> {
    rasterizer.fill(&self.outline())
  }

  fn bounding_box(&self) -> Box2D<f64, PixelSpace> {
    Box2D::from_points(self.outline())
  }
}

/// Numeric shape codes, as accepted from configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShapeKind {
  /// One of the codes `1..=8`, drawn uniformly per shape
  Any = 0,
  Triangle = 1,
  Rectangle = 2,
  Ellipse = 3,
  Circle = 4,
  RotatedRectangle = 5,
  Quadratic = 6,
  RotatedEllipse = 7,
  Polygon = 8,
  RightTriangle = 9,
  Diamond = 10,
  BoundedPolygon = 11
}

impl TryFrom<u8> for ShapeKind {
  type Error = Error;

  fn try_from(code: u8) -> Result<Self> {
    const KINDS: [ShapeKind; 12] = [
      ShapeKind::Any,
      ShapeKind::Triangle,
      ShapeKind::Rectangle,
      ShapeKind::Ellipse,
      ShapeKind::Circle,
      ShapeKind::RotatedRectangle,
      ShapeKind::Quadratic,
      ShapeKind::RotatedEllipse,
      ShapeKind::Polygon,
      ShapeKind::RightTriangle,
      ShapeKind::Diamond,
      ShapeKind::BoundedPolygon,
    ];
    match KINDS.get(code as usize) {
      Some(kind) => Ok(*kind),
      None => config_bail!("unknown shape code {code}")
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
  /// Triangles, polygons, diamonds and bounded-aspect polygons
  Polygon(Polygon),
  Rectangle(Rectangle),
  /// Ellipses and circles
  Ellipse(Ellipse),
  RotatedRectangle(RotatedRectangle),
  Quadratic(Quadratic),
  RotatedEllipse(RotatedEllipse),
  RightTriangle(RightTriangle)
}

macro_rules! dispatch {
  ($self: expr, $s: ident => $body: expr) => {
    match $self {
      Shape::Polygon($s) => $body,
      Shape::Rectangle($s) => $body,
      Shape::Ellipse($s) => $body,
      Shape::RotatedRectangle($s) => $body,
      Shape::Quadratic($s) => $body,
      Shape::RotatedEllipse($s) => $body,
      Shape::RightTriangle($s) => $body,
    }
  };
}

impl Shape {
  /// Draw a fresh valid shape of the given kind.
  pub fn random(kind: ShapeKind, ctx: &mut Context) -> Result<Shape> {
    let mut shape = match kind {
      ShapeKind::Any => {
        let kind = ShapeKind::try_from(ctx.below(8) as u8 + 1)?;
        return Shape::random(kind, ctx);
      }
      ShapeKind::Triangle => Shape::Polygon(Polygon::random(PolygonSpec::triangle(), ctx)),
      ShapeKind::Rectangle => Shape::Rectangle(Rectangle::random(ctx)),
      ShapeKind::Ellipse => Shape::Ellipse(Ellipse::random(ctx)),
      ShapeKind::Circle => Shape::Ellipse(Ellipse::random_circle(ctx)),
      ShapeKind::RotatedRectangle => Shape::RotatedRectangle(RotatedRectangle::random(ctx)),
      ShapeKind::Quadratic => Shape::Quadratic(Quadratic::random(ctx)),
      ShapeKind::RotatedEllipse => Shape::RotatedEllipse(RotatedEllipse::random(ctx)),
      ShapeKind::Polygon => Shape::Polygon(Polygon::random(PolygonSpec::polygon(4), ctx)),
      ShapeKind::RightTriangle => Shape::RightTriangle(RightTriangle::random(ctx)),
      ShapeKind::Diamond => Shape::Polygon(Polygon::random(PolygonSpec::diamond(), ctx)),
      ShapeKind::BoundedPolygon => Shape::Polygon(Polygon::random(PolygonSpec::bounded_aspect(), ctx)),
    };
    shape.mutate(ctx)?;
    Ok(shape)
  }
}

impl Primitive for Shape {
  fn name(&self) -> &'static str { dispatch!(self, s => s.name()) }
  fn perturb(&mut self, ctx: &mut Context) { dispatch!(self, s => s.perturb(ctx)) }
  fn valid(&self, bounds: Bounds) -> bool { dispatch!(self, s => s.valid(bounds)) }
  fn outline(&self) -> Vec<P2> { dispatch!(self, s => s.outline()) }
  fn area(&self) -> Option<f64> { dispatch!(self, s => s.area()) }
  fn svg(&self, attrs: &str) -> String { dispatch!(self, s => s.svg(attrs)) }
  fn mutate(&mut self, ctx: &mut Context) -> Result<()> { dispatch!(self, s => s.mutate(ctx)) }
}

/// Clamp that never panics. On an empty interval `v < lo` gives `lo`, anything else `hi`.
pub(crate) fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
  if v < lo { lo } else if v > hi { hi } else { v }
}

/// z-component of `(b - a) × (c - b)`
pub(crate) fn cross3(a: P2, b: P2, c: P2) -> f64 {
  (b - a).cross(c - b)
}

/// Angle at `b` between `b -> a` and `b -> c`, in degrees. NaN for degenerate input.
pub(crate) fn angle_between(a: P2, b: P2, c: P2) -> f64 {
  let (u, v) = (a - b, c - b);
  (u.dot(v) / (u.length() * v.length())).acos().to_degrees()
}

/// Shoelace formula
pub(crate) fn shoelace(points: &[P2]) -> f64 {
  use itertools::Itertools;
  points.iter()
    .circular_tuple_windows::<(&P2, &P2)>()
    .map(|(a, b)| a.x * b.y - b.x * a.y)
    .sum::<f64>()
    .abs() / 2.0
}

/// Closed ring of `segments` points around an (optionally rotated) ellipse.
pub(crate) fn ellipse_ring(center: P2, rx: f64, ry: f64, angle_deg: f64) -> Vec<P2> {
  use std::f64::consts::TAU;
  let segments = ((rx.max(ry) * 4.0).ceil() as usize).clamp(32, 360);
  let (sin, cos) = angle_deg.to_radians().sin_cos();
  (0..segments)
    .map(|i| {
      let t = TAU * i as f64 / segments as f64;
      let (x, y) = (rx * t.cos(), ry * t.sin());
      P2::new(center.x + x * cos - y * sin, center.y + x * sin + y * cos)
    })
    .collect()
}

pub(crate) fn svg_points(points: &[P2]) -> String {
  points.iter()
    .map(|p| format!("{:.6},{:.6}", p.x, p.y))
    .collect::<Vec<_>>()
    .join(" ")
}
