use {
  anyhow::{Context as _, Result, bail},
  clap::Parser,
  env_logger::Env,
  log::info,
  primitive_fill::{
    drawing::Color,
    geometry::ShapeKind,
    solver::{Model, ModelConfig, ShapePolicy, StepConfig}
  },
  std::{path::PathBuf, time::Instant}
};

/// Approximate an image with geometric primitives
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
  /// Input image
  #[clap(short, long)]
  input: PathBuf,

  /// Output files; `.svg` writes vector output, anything else a raster
  #[clap(short, long, required = true)]
  output: Vec<PathBuf>,

  /// Number of shapes
  #[clap(short, long)]
  number: usize,

  /// Shape code; `code:start:end` uses rectangles for slots in `start..end`
  #[clap(short, long, default_value = "1")]
  mode: String,

  #[clap(short, long, default_value = "128")]
  alpha: u8,

  /// Background color (hex), target average when omitted
  #[clap(long)]
  background: Option<String>,

  /// Reject shapes whose color is this close to black
  #[clap(long, default_value = "0")]
  black_threshold: f64,

  /// `upper` or `lower,upper` canvas fraction limits on shape area
  #[clap(long, default_value = "0")]
  area_threshold: String,

  /// Downscale the input so its long side is at most this many pixels
  #[clap(short, long, default_value = "256")]
  resize: u32,

  /// Long side of the outputs
  #[clap(short, long, default_value = "1024")]
  size: u32,

  /// Worker count, all cores when omitted
  #[clap(short, long)]
  jobs: Option<usize>,

  /// Random shapes per restart
  #[clap(long, default_value = "1000")]
  trials: usize,

  /// Hill-climb restarts per shape
  #[clap(long, default_value = "16")]
  restarts: usize,

  #[clap(long, default_value = "100")]
  age: usize,

  /// Reduced-budget re-searches per shape
  #[clap(long, default_value = "0")]
  repeat: usize,

  #[clap(long, default_value = "0")]
  seed: u64
}

fn parse_policy(mode: &str) -> Result<ShapePolicy> {
  let parts = mode.split(':').collect::<Vec<_>>();
  let kind = ShapeKind::try_from(parts[0].parse::<u8>().context("shape code")?)?;
  match parts[..] {
    [_] => Ok(kind.into()),
    [_, start, end] => Ok(ShapePolicy::slot_range(
      ShapeKind::Rectangle,
      start.parse()?..end.parse()?,
      kind.into()
    )),
    _ => bail!("malformed mode {mode:?}")
  }
}

fn parse_area(s: &str) -> Result<(f64, f64)> {
  match s.split(',').map(str::parse::<f64>).collect::<Result<Vec<_>, _>>()?[..] {
    [upper] => Ok((0.0, upper)),
    [lower, upper] => Ok((lower, upper)),
    _ => bail!("malformed area threshold {s:?}")
  }
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
  let args = Args::parse();

  let mut target = image::open(&args.input)
    .with_context(|| format!("reading {}", args.input.display()))?
    .to_rgba8();
  if args.resize > 0 && target.width().max(target.height()) > args.resize {
    target = image::imageops::thumbnail(
      &target,
      (target.width() as u64 * args.resize as u64 / target.width().max(target.height()) as u64) as u32,
      (target.height() as u64 * args.resize as u64 / target.width().max(target.height()) as u64) as u32
    );
  }

  let (lower, upper) = parse_area(&args.area_threshold)?;
  let mut config = ModelConfig::default()
    .with_black_threshold(args.black_threshold)
    .with_area(lower, upper)
    .with_output_size(args.size)
    .with_seed(args.seed);
  if let Some(jobs) = args.jobs {
    config = config.with_workers(jobs);
  }
  if let Some(bg) = &args.background {
    config = config.with_background(bg.parse::<Color>()?);
  }
  let mut model = Model::new(target, config)?;
  info!("0: score={:.6}", model.score());

  let step = StepConfig::default()
    .with_policy(parse_policy(&args.mode)?)
    .with_alpha(args.alpha)
    .with_trials(args.trials)
    .with_restarts(args.restarts)
    .with_age(args.age)
    .with_repeat(args.repeat);
  let start = Instant::now();
  for slot in 0..args.number {
    let t = Instant::now();
    let n = model.step(&step.clone().with_slot(slot))?;
    info!(
      "{}: t={:.3}, score={:.6}, n={n}, n/s={:.0}",
      slot + 1,
      start.elapsed().as_secs_f64(),
      model.score(),
      n as f64 / t.elapsed().as_secs_f64()
    );
  }

  for path in &args.output {
    let svg = path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("svg"));
    if svg {
      std::fs::write(path, model.svg())?;
    } else {
      model.render().save(path)?;
    }
    info!("wrote {}", path.display());
  }
  Ok(())
}
