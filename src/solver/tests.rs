use {
  super::*,
  crate::{
    drawing::Color,
    error::Error,
    geometry::{Context, P2, Primitive, Rectangle, Shape, ShapeKind},
    score::{WORST_ENERGY, color_distance, difference_full}
  },
  anyhow::Result,
  approx::assert_relative_eq,
  image::{Rgba, RgbaImage},
  rand::{Rng, SeedableRng},
  rand_pcg::Pcg64,
  std::sync::Arc
};

/// Integer on a line, energy `|x - goal|`, mutation a ±1 step.
#[derive(Debug, Clone, PartialEq)]
struct Walker {
  x: i64
}

struct Line {
  goal: i64,
  rng: Pcg64,
  evaluations: usize,
  /// every mutation fails when set
  frozen: bool
}

impl Line {
  fn new(goal: i64) -> Self {
    Self { goal, rng: Pcg64::seed_from_u64(7), evaluations: 0, frozen: false }
  }
}

impl Candidate<Line> for Walker {
  fn energy(&mut self, ctx: &mut Line) -> f64 {
    ctx.evaluations += 1;
    (self.x - ctx.goal).abs() as f64
  }

  fn mutate(&mut self, ctx: &mut Line) -> crate::error::Result<()> {
    if ctx.frozen {
      return Err(Error::ValiditySearchExhausted { kind: "walker", attempts: 1 });
    }
    self.x += if ctx.rng.gen::<bool>() { 1 } else { -1 };
    Ok(())
  }
}

#[test] fn hill_climb_never_worsens() {
  let mut ctx = Line::new(0);
  for start in [-50, -3, 0, 8, 1000] {
    for age in [0, 1, 10, 200] {
      let mut s = Walker { x: start };
      let before = s.energy(&mut ctx);
      let mut best = hill_climb(s.clone(), age, &mut ctx);
      assert!(best.energy(&mut ctx) <= before);
    }
  }
  let mut s = hill_climb(Walker { x: 40 }, 500, &mut ctx);
  assert_eq!(s.energy(&mut ctx), 0.0);
}

#[test] fn failed_mutations_are_skipped() {
  let mut ctx = Line::new(0);
  ctx.frozen = true;
  let best = hill_climb(Walker { x: 5 }, 100, &mut ctx);
  assert_eq!(best, Walker { x: 5 });
  // only the initial state is ever evaluated
  assert_eq!(ctx.evaluations, 1);
}

#[test] fn best_random_ties_keep_earliest() -> Result<()> {
  let mut ctx = Line::new(0);
  let mut next = [3, -2, 2, -2, 5].into_iter();
  let (best, energy) = best_random(5, &mut ctx, |_| Ok(Walker { x: next.next().unwrap_or(99) }))?;
  assert_eq!(best, Walker { x: -2 });
  assert_eq!(energy, 2.0);
  assert_eq!(ctx.evaluations, 5);
  Ok(())
}

#[test] fn best_random_propagates_spawn_errors() {
  let mut ctx = Line::new(0);
  let result = best_random(3, &mut ctx, |_: &mut Line| -> crate::error::Result<Walker> {
    Err(Error::Configuration("nope".into()))
  });
  assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test] fn best_hill_climb_keeps_minimum() -> Result<()> {
  let mut ctx = Line::new(17);
  let (mut best, energy) = best_hill_climb(4, 400, 3, &mut ctx, |ctx| {
    Ok(Walker { x: ctx.rng.gen_range(-100..100) })
  })?;
  assert_eq!(best.energy(&mut ctx), energy);
  assert_eq!(energy, 0.0);
  Ok(())
}

fn two_tone(w: u32, h: u32) -> RgbaImage {
  RgbaImage::from_fn(w, h, |x, y| {
    if x > w / 4 && x < 3 * w / 4 && y > h / 4 && y < 3 * h / 4 {
      Rgba([230, 40, 40, 255])
    } else {
      Rgba([20, 30, 90, 255])
    }
  })
}

fn quick_step(kind: ShapeKind, slot: usize) -> StepConfig {
  StepConfig::default()
    .with_policy(kind)
    .with_trials(30)
    .with_age(30)
    .with_restarts(2)
    .with_slot(slot)
}

#[test] fn score_never_increases() -> Result<()> {
  let mut model = Model::new(two_tone(48, 40), ModelConfig::default().with_workers(2).with_seed(3))?;
  let mut previous = model.score();
  assert_relative_eq!(previous, difference_full(model.target(), model.current()));
  for (slot, kind) in [ShapeKind::Rectangle, ShapeKind::Triangle, ShapeKind::Ellipse].into_iter().enumerate() {
    let evaluations = model.step(&quick_step(kind, slot))?;
    assert!(evaluations > 0);
    assert!(model.score() <= previous);
    previous = model.score();
  }
  assert!(!model.shapes().is_empty());
  assert!(model.scores().zip(model.scores().skip(1)).all(|(a, b)| b < a));
  Ok(())
}

#[test] fn committed_score_matches_full_recompute() -> Result<()> {
  let mut model = Model::new(two_tone(40, 40), ModelConfig::default().with_workers(1).with_seed(11))?;
  for slot in 0..3 {
    model.step(&quick_step(ShapeKind::RotatedRectangle, slot).with_repeat(1))?;
    let full = difference_full(model.target(), model.current());
    assert_relative_eq!(model.score(), full, max_relative = 1e-9);
  }
  Ok(())
}

#[test] fn deterministic_for_fixed_seed() -> Result<()> {
  let run = || -> Result<Vec<Committed>> {
    let mut model = Model::new(two_tone(32, 32), ModelConfig::default().with_workers(1).with_seed(42))?;
    for slot in 0..3 {
      model.step(&quick_step(ShapeKind::Any, slot))?;
    }
    Ok(model.shapes().to_vec())
  };
  assert_eq!(run()?, run()?);
  Ok(())
}

#[test] fn evaluations_are_counted() -> Result<()> {
  let mut model = Model::new(two_tone(24, 24), ModelConfig::default().with_workers(2))?;
  // 2 workers, 1 restart each: 10 random draws and at most 5 climbs
  let spent = model.step(&quick_step(ShapeKind::Rectangle, 0).with_trials(10).with_age(5))?;
  assert!((20..=2 * 15).contains(&spent), "{spent}");
  Ok(())
}

#[test] fn add_commits_unconditionally() -> Result<()> {
  let mut model = Model::new(two_tone(32, 32), ModelConfig::default().with_workers(1))?;
  let inside = Shape::Rectangle(Rectangle::new(P2::new(9.0, 9.0), P2::new(23.0, 23.0)));
  model.add(inside, 255)?;
  let committed = &model.shapes()[0];
  assert_eq!(committed.color, Color::new(230, 40, 40, 255));
  assert_relative_eq!(model.score(), difference_full(model.target(), model.current()));

  let outside = Shape::Rectangle(Rectangle::new(P2::new(40.0, 40.0), P2::new(50.0, 50.0)));
  assert!(matches!(model.add(outside, 255), Err(Error::Configuration(_))));
  assert_eq!(model.shapes().len(), 1);
  Ok(())
}

#[test] fn render_and_svg_at_output_size() -> Result<()> {
  let config = ModelConfig::default()
    .with_workers(1)
    .with_output_size(64)
    .with_background(Color::new(0, 0, 0, 255));
  let mut model = Model::new(two_tone(32, 16), config)?;
  model.add(Shape::Rectangle(Rectangle::new(P2::new(0.0, 0.0), P2::new(8.0, 8.0))), 255)?;

  let image = model.render();
  assert_eq!(image.dimensions(), (64, 32));
  assert_eq!(image.get_pixel(5, 5).0, [20, 30, 90, 255]);
  assert_eq!(image.get_pixel(20, 20).0, [0, 0, 0, 255]);

  let svg = model.svg();
  assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"64\" height=\"32\">"));
  assert!(svg.contains("fill=\"#000000\""));
  assert!(svg.contains("<g transform=\"scale(2.000000)\">"));
  assert!(svg.contains("<rect fill=\"#141e5a\" fill-opacity=\"1.000000\" x=\"0.000000\""));
  assert!(svg.trim_end().ends_with("</svg>"));
  Ok(())
}

#[test] fn invalid_configuration() -> Result<()> {
  let target = two_tone(16, 16);
  for config in [
    ModelConfig::default().with_workers(0),
    ModelConfig::default().with_black_threshold(1.5),
    ModelConfig::default().with_area(0.5, 0.2),
    ModelConfig::default().with_area(f64::NAN, 0.2),
    ModelConfig::default().with_output_size(0)
  ] {
    assert!(matches!(Model::new(target.clone(), config), Err(Error::Configuration(_))));
  }
  assert!(matches!(Model::new(RgbaImage::new(0, 4), ModelConfig::default()), Err(Error::Configuration(_))));

  let mut model = Model::new(target, ModelConfig::default().with_workers(1))?;
  for step in [
    StepConfig::default().with_alpha(0),
    StepConfig::default().with_trials(0),
    StepConfig::default().with_restarts(0),
  ] {
    assert!(matches!(model.step(&step), Err(Error::Configuration(_))));
  }
  assert!(model.shapes().is_empty());
  Ok(())
}

#[test] fn area_threshold_rejects_everything() -> Result<()> {
  // no rectangle can cover less than 0.01% of a 32×32 canvas
  let config = ModelConfig::default().with_workers(1).with_area(0.0, 0.0001);
  let mut model = Model::new(two_tone(32, 32), config)?;
  let before = model.score();
  model.step(&quick_step(ShapeKind::Rectangle, 0))?;
  assert!(model.shapes().is_empty());
  assert_eq!(model.score(), before);
  Ok(())
}

/// Black, with a white top-left quarter.
fn white_corner(side: u32) -> RgbaImage {
  RgbaImage::from_fn(side, side, |x, y| {
    if x < side / 2 && y < side / 2 { Rgba([255, 255, 255, 255]) } else { Rgba([0, 0, 0, 255]) }
  })
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Shape {
  Shape::Rectangle(Rectangle::new(P2::new(x0, y0), P2::new(x1, y1)))
}

#[test] fn worker_rejection_rules() -> Result<()> {
  let target = Arc::new(white_corner(32));
  let current = RgbaImage::from_pixel(32, 32, Rgba([128, 128, 128, 255]));
  let policy = ShapePolicy::from(ShapeKind::Rectangle);
  let job = Job {
    current: &current,
    score: difference_full(&target, &current),
    policy: &policy,
    alpha: 128,
    slot: 0,
    draw: 0.5
  };
  let (white, black, large) = (rect(0.0, 0.0, 8.0, 8.0), rect(20.0, 20.0, 28.0, 28.0), rect(0.0, 0.0, 24.0, 24.0));

  let mut open = Worker::new(target.clone(), Thresholds::default(), 1);
  assert_eq!(open.bounds(), crate::geometry::Bounds::new(32, 32));
  assert!(open.energy(&job, &white, 128) < job.score);
  assert!(open.energy(&job, &black, 128) < job.score);
  assert_eq!(open.evaluations(), 2);

  let mut dark = Worker::new(target.clone(), Thresholds { black: 0.3, ..Thresholds::default() }, 1);
  assert!(dark.energy(&job, &white, 128) < job.score);
  assert_eq!(dark.energy(&job, &black, 128), WORST_ENERGY);

  // white covers 1/16 of the canvas, large a bit over half
  let mut sized = Worker::new(target, Thresholds { black: 0.0, lower_area: 0.5, upper_area: 1.0 }, 1);
  assert_eq!(sized.energy(&job, &white, 128), WORST_ENERGY);
  assert!(sized.energy(&job, &large, 128) < WORST_ENERGY);
  Ok(())
}

#[test] fn best_random_state_caches_energy() -> Result<()> {
  let target = Arc::new(two_tone(24, 24));
  let current = RgbaImage::from_pixel(24, 24, Rgba([20, 30, 90, 255]));
  let policy = ShapePolicy::from(ShapeKind::Ellipse);
  let job = Job {
    current: &current,
    score: difference_full(&target, &current),
    policy: &policy,
    alpha: 200,
    slot: 0,
    draw: 0.5
  };
  let mut worker = Worker::new(target, Thresholds::default(), 5);
  assert_eq!(State::new(rect(1.0, 1.0, 4.0, 4.0), 200).cached_energy(), None);
  let (state, energy) = worker.best_random_state(&job, 12)?;
  assert_eq!(worker.evaluations(), 12);
  assert_eq!(state.cached_energy(), Some(energy));
  assert_eq!(state.alpha, 200);
  assert!(state.shape.valid(worker.bounds()));
  Ok(())
}

#[test] fn black_threshold_rejects_dark_colors() -> Result<()> {
  let config = ModelConfig::default()
    .with_workers(1)
    .with_seed(9)
    .with_black_threshold(0.3)
    .with_background(Color::new(128, 128, 128, 255));
  let mut model = Model::new(white_corner(24), config)?;
  for slot in 0..4 {
    model.step(&quick_step(ShapeKind::Rectangle, slot))?;
  }
  for c in model.shapes() {
    assert!(color_distance(c.color, Color::BLACK) >= 0.3, "{:?}", c.color);
  }
  Ok(())
}

#[test] fn area_threshold_lower_bound() -> Result<()> {
  let config = ModelConfig::default().with_workers(1).with_seed(4).with_area(0.5, 1.0);
  let mut model = Model::new(two_tone(32, 32), config)?;
  for slot in 0..3 {
    model.step(&quick_step(ShapeKind::Rectangle, slot))?;
  }
  for c in model.shapes() {
    assert!(c.shape.area().unwrap_or_default() >= 0.5 * 32.0 * 32.0, "{:?}", c.shape);
  }
  Ok(())
}

#[test] fn mixture_policy_follows_draw() -> Result<()> {
  let policy = ShapePolicy::mixture(&[(ShapeKind::Rectangle, 1.0), (ShapeKind::Circle, 3.0)])?;
  assert_eq!(policy.kind(0, 0.0), Some(ShapeKind::Rectangle));
  assert_eq!(policy.kind(0, 0.25), Some(ShapeKind::Rectangle));
  assert_eq!(policy.kind(0, 0.26), Some(ShapeKind::Circle));
  assert_eq!(policy.kind(0, 0.999), Some(ShapeKind::Circle));

  assert!(ShapePolicy::mixture(&[]).is_err());
  assert!(ShapePolicy::mixture(&[(ShapeKind::Circle, -1.0)]).is_err());
  assert!(ShapePolicy::mixture(&[(ShapeKind::Circle, 0.0)]).is_err());
  Ok(())
}

#[test] fn slot_range_policy() -> Result<()> {
  let policy = ShapePolicy::slot_range(ShapeKind::Rectangle, 5..15, ShapeKind::Circle.into());
  assert_eq!(policy.kind(4, 0.5), Some(ShapeKind::Circle));
  assert_eq!(policy.kind(5, 0.5), Some(ShapeKind::Rectangle));
  assert_eq!(policy.kind(14, 0.5), Some(ShapeKind::Rectangle));
  assert_eq!(policy.kind(15, 0.5), Some(ShapeKind::Circle));

  let mut rng = Pcg64::seed_from_u64(1);
  let mut ctx = Context::new(crate::geometry::Bounds::new(64, 64), &mut rng);
  assert!(matches!(policy.spawn(&mut ctx, 128, 7, 0.5)?, Shape::Rectangle(_)));
  assert!(matches!(policy.spawn(&mut ctx, 128, 0, 0.5)?, Shape::Ellipse(e) if e.circle));
  Ok(())
}

#[test] fn custom_policy_sees_slot_and_draw() -> Result<()> {
  let policy = ShapePolicy::custom(|ctx: &mut Context, alpha, slot, draw| {
    assert_eq!(alpha, 99);
    let side = 2.0 + slot as f64 + draw;
    let a = P2::new(1.0, 1.0);
    let mut shape = Shape::Rectangle(Rectangle::new(a, P2::new(a.x + side, a.y + side)));
    if !shape.valid(ctx.bounds) {
      shape.mutate(ctx)?;
    }
    Ok(shape)
  });
  assert_eq!(policy.kind(3, 0.5), None);
  let mut rng = Pcg64::seed_from_u64(1);
  let mut ctx = Context::new(crate::geometry::Bounds::new(64, 64), &mut rng);
  let shape = policy.spawn(&mut ctx, 99, 3, 0.5)?;
  assert_eq!(shape.area(), Some(5.5 * 5.5));

  // a factory yielding invalid shapes is a configuration error
  let broken = ShapePolicy::custom(|_: &mut Context, _, _, _| {
    Ok(Shape::Rectangle(Rectangle::new(P2::new(-50.0, -50.0), P2::new(-40.0, -40.0))))
  });
  let mut model = Model::new(two_tone(16, 16), ModelConfig::default().with_workers(1))?;
  let step = StepConfig::default().with_policy(broken).with_trials(2).with_restarts(1);
  assert!(matches!(model.step(&step), Err(Error::Configuration(_))));
  Ok(())
}
