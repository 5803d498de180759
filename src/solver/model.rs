use {
  super::{Outcome, ShapePolicy, Job, Thresholds, Worker},
  crate::{
    drawing::{Color, draw_lines, draw_outline},
    error::{Error, Result, config_bail},
    geometry::{Bounds, Primitive, Shape},
    raster::Rasterizer,
    score::{compute_color, difference_full}
  },
  image::RgbaImage,
  log::{debug, warn},
  rand::{Rng, SeedableRng},
  rand_pcg::Pcg64,
  rayon::prelude::*,
  std::sync::Arc
};

/// Settings fixed for the lifetime of a [`Model`].
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
  pub black_threshold: f64,
  pub lower_area: f64,
  /// `0` disables the area rule
  pub upper_area: f64,
  pub workers: usize,
  pub seed: u64,
  /// Target's average color when `None`
  pub background: Option<Color>,
  /// Long side of [`Model::render`] and [`Model::svg`] output, in pixels
  pub output_size: u32
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      black_threshold: 0.0,
      lower_area: 0.0,
      upper_area: 0.0,
      workers: rayon::current_num_threads(),
      seed: 0,
      background: None,
      output_size: 1024
    }
  }
}

impl ModelConfig {
  pub fn with_black_threshold(self, black_threshold: f64) -> Self {
    Self { black_threshold, ..self }
  }
  pub fn with_area(self, lower_area: f64, upper_area: f64) -> Self {
    Self { lower_area, upper_area, ..self }
  }
  pub fn with_workers(self, workers: usize) -> Self {
    Self { workers, ..self }
  }
  pub fn with_seed(self, seed: u64) -> Self {
    Self { seed, ..self }
  }
  pub fn with_background(self, background: Color) -> Self {
    Self { background: Some(background), ..self }
  }
  pub fn with_output_size(self, output_size: u32) -> Self {
    Self { output_size, ..self }
  }

  pub fn validate(&self) -> Result<()> {
    let unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
    if !unit(self.black_threshold) {
      config_bail!("black threshold {} outside [0, 1]", self.black_threshold);
    }
    if !unit(self.lower_area) || !unit(self.upper_area) {
      config_bail!("area thresholds {}, {} outside [0, 1]", self.lower_area, self.upper_area);
    }
    if self.upper_area > 0.0 && self.lower_area > self.upper_area {
      config_bail!("lower area threshold {} above upper {}", self.lower_area, self.upper_area);
    }
    if self.workers == 0 {
      config_bail!("worker count must be positive");
    }
    if self.output_size == 0 {
      config_bail!("output size must be positive");
    }
    Ok(())
  }

  fn thresholds(&self) -> Thresholds {
    Thresholds {
      black: self.black_threshold,
      lower_area: self.lower_area,
      upper_area: self.upper_area
    }
  }
}

/// Search budget and shape selection of one [`Model::step`].
#[derive(Debug, Clone)]
pub struct StepConfig {
  pub policy: ShapePolicy,
  pub alpha: u8,
  /// Random shapes drawn per restart
  pub trials: usize,
  /// Hill-climb mutations per restart
  pub age: usize,
  /// Restarts per step, shared between the workers
  pub restarts: usize,
  /// Reduced-budget re-searches after the first
  pub repeat: usize,
  pub slot: usize
}

impl Default for StepConfig {
  fn default() -> Self {
    Self {
      policy: ShapePolicy::default(),
      alpha: 128,
      trials: 1000,
      age: 100,
      restarts: 16,
      repeat: 0,
      slot: 0
    }
  }
}

impl StepConfig {
  pub fn with_policy(self, policy: impl Into<ShapePolicy>) -> Self {
    Self { policy: policy.into(), ..self }
  }
  pub fn with_alpha(self, alpha: u8) -> Self {
    Self { alpha, ..self }
  }
  pub fn with_trials(self, trials: usize) -> Self {
    Self { trials, ..self }
  }
  pub fn with_age(self, age: usize) -> Self {
    Self { age, ..self }
  }
  pub fn with_restarts(self, restarts: usize) -> Self {
    Self { restarts, ..self }
  }
  pub fn with_repeat(self, repeat: usize) -> Self {
    Self { repeat, ..self }
  }
  pub fn with_slot(self, slot: usize) -> Self {
    Self { slot, ..self }
  }

  pub fn validate(&self) -> Result<()> {
    if self.alpha == 0 {
      config_bail!("alpha must be positive");
    }
    if self.trials == 0 || self.restarts == 0 {
      config_bail!("trials ({}) and restarts ({}) must be positive", self.trials, self.restarts);
    }
    self.policy.validate()
  }
}

/// One accepted shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
  pub shape: Shape,
  pub color: Color,
  pub alpha: u8,
  /// Canvas score right after this shape was drawn
  pub score: f64
}

/// Greedy approximation of a target image by a sequence of shapes.
pub struct Model {
  target: Arc<RgbaImage>,
  current: RgbaImage,
  background: Color,
  score: f64,
  shapes: Vec<Committed>,
  workers: Vec<Worker>,
  rng: Pcg64,
  rasterizer: Rasterizer,
  config: ModelConfig
}

impl Model {
  pub fn new(target: RgbaImage, config: ModelConfig) -> Result<Self> {
    config.validate()?;
    if target.width() == 0 || target.height() == 0 {
      config_bail!("target image is empty");
    }
    let bounds = Bounds::new(target.width(), target.height());
    let background = config.background.unwrap_or_else(|| Color::average(&target));
    let current = RgbaImage::from_pixel(bounds.width, bounds.height, background.into());
    let score = difference_full(&target, &current);

    let target = Arc::new(target);
    let mut rng = Pcg64::seed_from_u64(config.seed);
    let workers = (0..config.workers)
      .map(|_| Worker::new(target.clone(), config.thresholds(), rng.gen()))
      .collect();
    debug!(
      "model {}x{}, background {background}, {} workers, score {score:.6}",
      bounds.width, bounds.height, config.workers
    );
    Ok(Self {
      target,
      current,
      background,
      score,
      shapes: vec![],
      workers,
      rng,
      rasterizer: Rasterizer::new(bounds),
      config
    })
  }

  pub fn target(&self) -> &RgbaImage { &self.target }
  /// The committed canvas, at working resolution.
  pub fn current(&self) -> &RgbaImage { &self.current }
  pub fn background(&self) -> Color { self.background }
  pub fn score(&self) -> f64 { self.score }
  pub fn shapes(&self) -> &[Committed] { &self.shapes }
  pub fn config(&self) -> &ModelConfig { &self.config }

  pub fn bounds(&self) -> Bounds {
    Bounds::new(self.current.width(), self.current.height())
  }

  /// Score after each committed shape, oldest first.
  pub fn scores(&self) -> impl Iterator<Item = f64> + '_ {
    self.shapes.iter().map(|c| c.score)
  }

  /// Search for one shape and commit it when it lowers the score. Returns the number of
  /// energy evaluations spent.
  pub fn step(&mut self, config: &StepConfig) -> Result<usize> {
    config.validate()?;
    let draw = self.rng.gen::<f64>();
    let job = Job {
      current: &self.current,
      score: self.score,
      policy: &config.policy,
      alpha: config.alpha,
      slot: config.slot,
      draw
    };
    let workers = self.workers.len();
    let (mut best, mut evaluations) = search(
      &mut self.workers, &job, config.trials, config.age, config.restarts.div_ceil(workers)
    )?;
    let trials = (config.trials / 2).max(1);
    let restarts = config.restarts.div_ceil(2).max(1).div_ceil(workers);
    for _ in 0..config.repeat {
      let (candidate, spent) = search(&mut self.workers, &job, trials, config.age, restarts)?;
      evaluations += spent;
      if candidate.energy < best.energy {
        best = candidate;
      }
    }

    if best.energy < self.score {
      let Outcome { state, energy, .. } = best;
      self.commit(state.shape, state.alpha, Some(energy));
      debug!(
        "slot {}: committed {}, score {:.6}, {evaluations} evaluations",
        config.slot, self.shapes.len(), self.score
      );
    } else {
      warn!(
        "slot {}: no improving shape ({:.6} >= {:.6}), {evaluations} evaluations",
        config.slot, best.energy, self.score
      );
    }
    Ok(evaluations)
  }

  /// Commit `shape` unconditionally, at its best-fitting color.
  pub fn add(&mut self, shape: Shape, alpha: u8) -> Result<()> {
    if alpha == 0 {
      config_bail!("alpha must be positive");
    }
    if !shape.valid(self.bounds()) {
      return Err(Error::Configuration(format!("invalid {} for this canvas", shape.name())));
    }
    self.commit(shape, alpha, None);
    Ok(())
  }

  fn commit(&mut self, shape: Shape, alpha: u8, energy: Option<f64>) {
    let lines = shape.rasterize(&mut self.rasterizer);
    let color = compute_color(&self.target, &self.current, &lines, alpha);
    draw_lines(&mut self.current, color, &lines);
    self.score = energy.unwrap_or_else(|| difference_full(&self.target, &self.current));
    self.shapes.push(Committed { shape, color, alpha, score: self.score });
  }

  /// Ratio of output pixels to working pixels.
  pub fn output_scale(&self) -> f64 {
    let bounds = self.bounds();
    self.config.output_size as f64 / bounds.width.max(bounds.height) as f64
  }

  fn output_bounds(&self) -> Bounds {
    let (bounds, scale) = (self.bounds(), self.output_scale());
    Bounds::new(
      ((bounds.width as f64 * scale).round() as u32).max(1),
      ((bounds.height as f64 * scale).round() as u32).max(1)
    )
  }

  /// All committed shapes redrawn over the background at output size.
  pub fn render(&self) -> RgbaImage {
    let (bounds, scale) = (self.output_bounds(), self.output_scale());
    let mut image = RgbaImage::from_pixel(bounds.width, bounds.height, self.background.into());
    let mut rasterizer = Rasterizer::new(bounds);
    for c in &self.shapes {
      draw_outline(&mut image, &mut rasterizer, &c.shape.outline(), scale, c.color);
    }
    image
  }

  /// SVG document of the committed shapes at output size.
  pub fn svg(&self) -> String {
    let (bounds, scale) = (self.output_bounds(), self.output_scale());
    let mut svg = format!(
      "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}\" height=\"{h}\">\n\
       <rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{fill}\" />\n\
       <g transform=\"scale({scale:.6})\">\n",
      w = bounds.width,
      h = bounds.height,
      fill = self.background.hex()
    );
    for c in &self.shapes {
      svg.push_str(&c.shape.svg(&c.color.svg_attrs()));
      svg.push('\n');
    }
    svg.push_str("</g>\n</svg>\n");
    svg
  }
}

/// Run every worker on `job` and keep the lowest-energy outcome; ties go to the lower index.
fn search(
  workers: &mut [Worker],
  job: &Job,
  n: usize,
  age: usize,
  restarts: usize
) -> Result<(Outcome, usize)> {
  let outcomes = workers.par_iter_mut()
    .map(|worker| worker.run(job, n, age, restarts))
    .collect::<Result<Vec<_>>>()?;
  let evaluations = outcomes.iter().map(|o| o.evaluations).sum();
  let best = outcomes.into_iter()
    .reduce(|best, next| if next.energy < best.energy { next } else { best })
    .ok_or_else(|| Error::Configuration("no workers".into()))?;
  Ok((best, evaluations))
}
