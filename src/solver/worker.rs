use {
  super::{Candidate, ShapePolicy, hill_climb},
  crate::{
    drawing::{Color, copy_lines, draw_lines},
    error::{Error, Result},
    geometry::{Bounds, Context, Primitive, Shape},
    raster::Rasterizer,
    score::{WORST_ENERGY, color_distance, compute_color, difference_partial}
  },
  image::RgbaImage,
  log::{trace, warn},
  rand::SeedableRng,
  rand_pcg::Pcg64,
  std::sync::Arc
};

/// Fresh shapes drawn before a construction failure is surfaced.
pub const MAX_REDRAWS: usize = 64;

/// Energy rejection rules. All zero disables them.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Thresholds {
  /// Fitted colors closer than this to black are rejected
  pub black: f64,
  /// Canvas fraction a shape's area must stay within; only applies when `upper_area > 0`
  pub lower_area: f64,
  pub upper_area: f64
}

/// A shape at a fixed alpha, with its energy cached once computed.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
  pub shape: Shape,
  pub alpha: u8,
  energy: Option<f64>
}

impl State {
  pub fn new(shape: Shape, alpha: u8) -> Self {
    Self { shape, alpha, energy: None }
  }

  pub fn cached_energy(&self) -> Option<f64> {
    self.energy
  }
}

/// What a worker searches against: a snapshot of the committed canvas and its score.
pub struct Job<'a> {
  pub current: &'a RgbaImage,
  pub score: f64,
  pub policy: &'a ShapePolicy,
  pub alpha: u8,
  pub slot: usize,
  /// Uniform sample in `[0, 1)`, shared by all workers of a step
  pub draw: f64
}

#[derive(Debug, Clone)]
pub struct Outcome {
  pub state: State,
  pub energy: f64,
  /// Energy evaluations spent in this run
  pub evaluations: usize
}

/// Search context handed to [`Candidate`] methods.
pub struct Session<'s, 'a> {
  pub worker: &'s mut Worker,
  pub job: &'s Job<'a>
}

impl<'s, 'a> Candidate<Session<'s, 'a>> for State {
  fn energy(&mut self, session: &mut Session<'s, 'a>) -> f64 {
    if let Some(energy) = self.energy {
      return energy;
    }
    let energy = session.worker.energy(session.job, &self.shape, self.alpha);
    self.energy = Some(energy);
    energy
  }

  fn mutate(&mut self, session: &mut Session<'s, 'a>) -> Result<()> {
    self.shape.mutate(&mut session.worker.context())?;
    self.energy = None;
    Ok(())
  }
}

/// One search thread's scratch state and random stream.
pub struct Worker {
  bounds: Bounds,
  target: Arc<RgbaImage>,
  buffer: RgbaImage,
  rasterizer: Rasterizer,
  rng: Pcg64,
  thresholds: Thresholds,
  counter: usize
}

impl Worker {
  pub fn new(target: Arc<RgbaImage>, thresholds: Thresholds, seed: u64) -> Self {
    let bounds = Bounds::new(target.width(), target.height());
    Self {
      bounds,
      buffer: RgbaImage::new(bounds.width, bounds.height),
      rasterizer: Rasterizer::new(bounds),
      rng: Pcg64::seed_from_u64(seed),
      target,
      thresholds,
      counter: 0
    }
  }

  pub fn bounds(&self) -> Bounds {
    self.bounds
  }

  /// Energy evaluations since the last [`Worker::run`] started.
  pub fn evaluations(&self) -> usize {
    self.counter
  }

  pub fn context(&mut self) -> Context<'_> {
    Context::new(self.bounds, &mut self.rng)
  }

  /// Score the canvas would have with `shape` composited at its best color.
  pub fn energy(&mut self, job: &Job, shape: &Shape, alpha: u8) -> f64 {
    self.counter += 1;
    let lines = shape.rasterize(&mut self.rasterizer);
    let color = compute_color(&self.target, job.current, &lines, alpha);
    if color_distance(color, Color::BLACK) < self.thresholds.black {
      return WORST_ENERGY;
    }
    let Thresholds { lower_area, upper_area, .. } = self.thresholds;
    if upper_area > 0.0 {
      if let Some(area) = shape.area() {
        let fraction = area / (self.bounds.width as f64 * self.bounds.height as f64);
        if fraction < lower_area || fraction > upper_area {
          return WORST_ENERGY;
        }
      }
    }
    copy_lines(&mut self.buffer, job.current, &lines);
    draw_lines(&mut self.buffer, color, &lines);
    difference_partial(&self.target, job.current, &self.buffer, job.score, &lines)
  }

  /// A fresh valid shape from the job's policy. Construction failures are redrawn up to
  /// [`MAX_REDRAWS`] times.
  pub fn random_state(&mut self, job: &Job) -> Result<State> {
    let bounds = self.bounds;
    let mut last = None;
    for redraw in 0..MAX_REDRAWS {
      let spawned = job.policy.spawn(&mut self.context(), job.alpha, job.slot, job.draw);
      match spawned {
        Ok(shape) if shape.valid(bounds) => return Ok(State::new(shape, job.alpha)),
        Ok(shape) => return Err(Error::Configuration(
          format!("shape policy produced an invalid {}", shape.name())
        )),
        Err(err @ Error::ValiditySearchExhausted { .. }) => {
          warn!("redraw {redraw}: {err}");
          last = Some(err);
        }
        Err(err) => return Err(err)
      }
    }
    Err(last.unwrap_or(Error::ValiditySearchExhausted { kind: "shape", attempts: MAX_REDRAWS }))
  }

  pub fn best_random_state(&mut self, job: &Job, n: usize) -> Result<(State, f64)> {
    let mut session = Session { worker: self, job };
    hill_climb::best_random(n, &mut session, |s| s.worker.random_state(s.job))
  }

  pub fn best_hill_climb_state(
    &mut self,
    job: &Job,
    n: usize,
    age: usize,
    restarts: usize
  ) -> Result<(State, f64)> {
    let mut session = Session { worker: self, job };
    hill_climb::best_hill_climb(n, age, restarts, &mut session, |s| s.worker.random_state(s.job))
  }

  /// Full nested search for one slot.
  pub fn run(&mut self, job: &Job, n: usize, age: usize, restarts: usize) -> Result<Outcome> {
    self.counter = 0;
    let (state, energy) = self.best_hill_climb_state(job, n, age, restarts)?;
    trace!("worker done: {} at {energy:.6} after {} evaluations", state.shape.name(), self.counter);
    Ok(Outcome { state, energy, evaluations: self.counter })
  }
}
