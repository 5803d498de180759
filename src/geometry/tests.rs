use {
  super::*,
  anyhow::Result,
  approx::assert_relative_eq,
  rand::SeedableRng
};

const ALL_KINDS: std::ops::RangeInclusive<u8> = 0..=11;

fn rng(seed: u64) -> Pcg64 {
  Pcg64::seed_from_u64(seed)
}

/// Like a worker: redraw when construction runs out of attempts.
fn spawn(kind: ShapeKind, ctx: &mut Context) -> Result<Shape> {
  let mut last = None;
  for _ in 0..64 {
    match Shape::random(kind, ctx) {
      Ok(shape) => return Ok(shape),
      Err(e) => last = Some(e)
    }
  }
  Err(last.map(anyhow::Error::from).unwrap_or_else(|| anyhow::anyhow!("no attempts")))
}

fn mutate_many(mut shape: Shape, ctx: &mut Context, n: usize) -> Shape {
  for i in 0..n {
    let _ = shape.mutate(ctx);
    assert!(shape.valid(ctx.bounds), "{} invalid after {i} mutations: {shape:?}", shape.name());
  }
  shape
}

#[test] fn shoelace_area() {
  let square = Polygon::new(PolygonSpec::polygon(4), vec![
    P2::new(0.0, 0.0), P2::new(10.0, 0.0), P2::new(10.0, 10.0), P2::new(0.0, 10.0)
  ]);
  assert_eq!(square.area(), Some(100.0));
  let reversed = Polygon::new(PolygonSpec::polygon(4), square.points.iter().rev().copied().collect());
  assert_eq!(reversed.area(), Some(100.0));
}

#[test] fn clamp_never_panics() {
  assert_eq!(clamp(5.0, 1.0, 9.0), 5.0);
  assert_eq!(clamp(-2.0, 1.0, 9.0), 1.0);
  // empty interval
  assert_eq!(clamp(5.0, 1.0, 0.0), 0.0);
  assert_eq!(clamp(0.5, 1.0, 0.0), 1.0);
}

#[test] fn shape_codes() {
  for code in ALL_KINDS {
    assert_eq!(ShapeKind::try_from(code).map(|k| k as u8).ok(), Some(code));
  }
  for code in [12, 13, 200, 255] {
    assert!(matches!(ShapeKind::try_from(code), Err(Error::Configuration(_))));
  }
}

#[test] fn every_kind_spawns_valid() -> Result<()> {
  for (w, h) in [(64, 64), (200, 120), (40, 90)] {
    let mut rng = rng(w as u64 * h as u64);
    let mut ctx = Context::new(Bounds::new(w, h), &mut rng);
    for code in ALL_KINDS {
      for _ in 0..20 {
        let shape = spawn(ShapeKind::try_from(code)?, &mut ctx)?;
        assert!(shape.valid(ctx.bounds), "{shape:?}");
      }
    }
  }
  Ok(())
}

#[test] fn convex_polygons_stay_valid() -> Result<()> {
  let mut rng = rng(1);
  let mut ctx = Context::new(Bounds::new(128, 96), &mut rng);
  for kind in [ShapeKind::Triangle, ShapeKind::Polygon, ShapeKind::Diamond, ShapeKind::BoundedPolygon] {
    let shape = spawn(kind, &mut ctx)?;
    mutate_many(shape, &mut ctx, 10_000);
  }
  Ok(())
}

#[test] fn other_kinds_stay_valid() -> Result<()> {
  let mut rng = rng(2);
  let mut ctx = Context::new(Bounds::new(100, 80), &mut rng);
  for kind in [
    ShapeKind::Rectangle, ShapeKind::Ellipse, ShapeKind::Circle, ShapeKind::RotatedRectangle,
    ShapeKind::Quadratic, ShapeKind::RotatedEllipse, ShapeKind::RightTriangle
  ] {
    let shape = spawn(kind, &mut ctx)?;
    mutate_many(shape, &mut ctx, 2_000);
  }
  Ok(())
}

#[test] fn diamond_keeps_its_axes() -> Result<()> {
  let mut rng = rng(3);
  let mut ctx = Context::new(Bounds::new(128, 128), &mut rng);
  for kind in [ShapeKind::Diamond, ShapeKind::BoundedPolygon] {
    let mut shape = spawn(kind, &mut ctx)?;
    for _ in 0..1000 {
      let _ = shape.mutate(&mut ctx);
      match &shape {
        Shape::Polygon(p) => {
          let [top, right, bottom, left] = [p.points[0], p.points[1], p.points[2], p.points[3]];
          assert_eq!(top.x, bottom.x);
          assert_eq!(left.y, right.y);
          assert!(top.x - left.x <= right.x - top.x);
        }
        other => panic!("not a diamond: {other:?}")
      }
    }
  }
  Ok(())
}

#[test] fn right_triangle_shape() -> Result<()> {
  let mut rng = rng(4);
  let mut ctx = Context::new(Bounds::new(120, 120), &mut rng);
  let mut shape = spawn(ShapeKind::RightTriangle, &mut ctx)?;
  for _ in 0..1000 {
    let _ = shape.mutate(&mut ctx);
    match &shape {
      Shape::RightTriangle(t) => {
        assert_eq!(t.top.x, t.bottom.x);
        assert!(t.apex.x >= t.top.x);
        assert!(t.top.y <= t.apex.y && t.apex.y <= t.bottom.y);
      }
      other => panic!("not a right triangle: {other:?}")
    }
  }
  Ok(())
}

#[test] fn aspect_limits() -> Result<()> {
  let mut rng = rng(5);
  let mut ctx = Context::new(Bounds::new(128, 128), &mut rng);
  for _ in 0..200 {
    if let Shape::RotatedRectangle(r) = spawn(ShapeKind::RotatedRectangle, &mut ctx)? {
      assert!(r.sx.max(r.sy) / r.sx.min(r.sy) <= 5.0);
    }
    match spawn(ShapeKind::BoundedPolygon, &mut ctx)? {
      Shape::Polygon(p) => {
        assert_eq!(p.spec, PolygonSpec::bounded_aspect());
        assert_eq!(p.points[0].x, p.points[2].x);
        assert_eq!(p.points[1].y, p.points[3].y);
      }
      other => panic!("not a bounded-aspect polygon: {other:?}")
    }
  }
  let thin = RotatedRectangle::new(P2::new(50.0, 50.0), 60.0, 2.0, 0.0);
  assert!(!thin.valid(Bounds::new(100, 100)));
  Ok(())
}

#[test] fn any_kind_draws_basic_shapes() -> Result<()> {
  let mut rng = rng(6);
  let mut ctx = Context::new(Bounds::new(96, 96), &mut rng);
  let mut names = std::collections::HashSet::new();
  for _ in 0..400 {
    names.insert(spawn(ShapeKind::Any, &mut ctx)?.name());
  }
  for excluded in ["right-facing triangle", "diamond", "bounded-aspect polygon"] {
    assert!(!names.contains(excluded));
  }
  for expected in [
    "triangle", "rectangle", "ellipse", "circle", "rotated rectangle",
    "quadratic curve", "rotated ellipse", "polygon"
  ] {
    assert!(names.contains(expected), "{expected} never drawn");
  }
  Ok(())
}

#[test] fn exhausted_mutation_leaves_shape_untouched() {
  let mut rng = rng(7);
  let mut ctx = Context::new(Bounds::new(64, 64), &mut rng);
  // four points never make a valid triangle
  let mut shape = Shape::Polygon(Polygon::new(PolygonSpec::triangle(), vec![
    P2::new(1.0, 1.0), P2::new(20.0, 1.0), P2::new(20.0, 20.0), P2::new(1.0, 20.0)
  ]));
  let before = shape.clone();
  match shape.mutate(&mut ctx) {
    Err(Error::ValiditySearchExhausted { kind, attempts }) => {
      assert_eq!(kind, "triangle");
      assert_eq!(attempts, MAX_MUTATION_ATTEMPTS);
    }
    other => panic!("unexpected {other:?}")
  }
  assert_eq!(shape, before);
}

#[test] fn quadratic_outline() {
  let q = Quadratic::new(P2::new(10.0, 10.0), P2::new(30.0, 5.0), P2::new(50.0, 10.0));
  assert!(q.valid(Bounds::new(64, 64)));
  assert_eq!(q.area(), None);
  assert_eq!(q.at(0.0), q.p1);
  assert_eq!(q.at(1.0), q.p3);
  let outline = q.outline();
  assert_eq!(outline.len() % 2, 0);
  // half a pixel wide
  let bbox = q.bounding_box();
  assert!(bbox.min.x >= 9.0 && bbox.max.x <= 51.0);
  let kinked = Quadratic::new(P2::new(10.0, 10.0), P2::new(60.0, 60.0), P2::new(12.0, 10.0));
  assert!(!kinked.valid(Bounds::new(64, 64)));
}

#[test] fn ellipse_geometry() {
  let e = Ellipse::new(P2::new(20.0, 20.0), 10.0, 5.0);
  assert_relative_eq!(e.area().unwrap_or_default(), std::f64::consts::PI * 50.0);
  let bbox = e.bounding_box();
  assert_relative_eq!(bbox.min.x, 10.0, epsilon = 1e-9);
  assert_relative_eq!(bbox.max.y, 25.0, epsilon = 1e-2);
  let r = RotatedEllipse::new(P2::new(20.0, 20.0), 10.0, 5.0, 90.0);
  let bbox = r.bounding_box();
  assert_relative_eq!(bbox.max.y, 30.0, epsilon = 1e-9);
  assert!(!Ellipse::circle(P2::new(5.0, 5.0), 0.5).valid(Bounds::new(10, 10)));
}

#[test] fn svg_elements() {
  let attrs = "fill=\"#ff0000\" fill-opacity=\"0.500000\"";
  let rect = Rectangle::new(P2::new(3.0, 4.0), P2::new(1.0, 2.0));
  assert_eq!(
    rect.svg(attrs),
    "<rect fill=\"#ff0000\" fill-opacity=\"0.500000\" x=\"1.000000\" y=\"2.000000\" width=\"2.000000\" height=\"2.000000\" />"
  );
  let tri = Polygon::new(PolygonSpec::triangle(), vec![P2::new(0.0, 0.0), P2::new(4.0, 0.0), P2::new(0.0, 3.0)]);
  assert_eq!(
    tri.svg(attrs),
    "<polygon fill=\"#ff0000\" fill-opacity=\"0.500000\" points=\"0.000000,0.000000 4.000000,0.000000 0.000000,3.000000\" />"
  );
  let q = Quadratic::new(P2::new(0.0, 0.0), P2::new(1.0, 1.0), P2::new(2.0, 0.0));
  let svg = q.svg(attrs);
  assert!(svg.starts_with("<path stroke=\"#ff0000\" stroke-opacity=\"0.500000\" fill=\"none\""));
  assert!(svg.contains("Q 1.000000 1.000000, 2.000000 0.000000"));
}
