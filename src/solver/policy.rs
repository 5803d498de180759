use {
  crate::{
    error::{Result, config_bail},
    geometry::{Context, Shape, ShapeKind}
  },
  std::{fmt, ops::Range, sync::Arc}
};

/// `(context, alpha, slot, draw) -> shape`, where `draw` is the step's uniform sample in `[0, 1)`.
pub type ShapeFactory = dyn Fn(&mut Context, u8, usize, f64) -> Result<Shape> + Send + Sync;

/// Which shape family a step samples from.
#[derive(Clone)]
pub enum ShapePolicy {
  Kind(ShapeKind),
  /// Discrete distribution over kinds; `cumulative` is normalized to end at 1.
  Mixture {
    kinds: Vec<ShapeKind>,
    cumulative: Vec<f64>
  },
  /// `kind` for slots in `slots`, `otherwise` elsewhere.
  SlotRange {
    kind: ShapeKind,
    slots: Range<usize>,
    otherwise: Box<ShapePolicy>
  },
  Custom(Arc<ShapeFactory>)
}

impl ShapePolicy {
  pub fn mixture(weights: &[(ShapeKind, f64)]) -> Result<Self> {
    if weights.is_empty() {
      config_bail!("shape mixture is empty");
    }
    if let Some((kind, w)) = weights.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
      config_bail!("invalid weight {w} for {kind:?}");
    }
    let total = weights.iter().map(|(_, w)| w).sum::<f64>();
    if total <= 0.0 {
      config_bail!("shape mixture weights sum to zero");
    }
    let mut acc = 0.0;
    let cumulative = weights.iter()
      .map(|(_, w)| {
        acc += w / total;
        acc
      })
      .collect();
    Ok(ShapePolicy::Mixture {
      kinds: weights.iter().map(|(k, _)| *k).collect(),
      cumulative
    })
  }

  pub fn slot_range(kind: ShapeKind, slots: Range<usize>, otherwise: ShapePolicy) -> Self {
    ShapePolicy::SlotRange { kind, slots, otherwise: Box::new(otherwise) }
  }

  pub fn custom<F>(factory: F) -> Self
    where F: Fn(&mut Context, u8, usize, f64) -> Result<Shape> + Send + Sync + 'static
  {
    ShapePolicy::Custom(Arc::new(factory))
  }

  pub fn validate(&self) -> Result<()> {
    match self {
      ShapePolicy::Mixture { kinds, cumulative } => {
        if kinds.is_empty() || kinds.len() != cumulative.len() {
          config_bail!("malformed shape mixture");
        }
        Ok(())
      }
      ShapePolicy::SlotRange { otherwise, .. } => otherwise.validate(),
      ShapePolicy::Kind(_) | ShapePolicy::Custom(_) => Ok(())
    }
  }

  /// The kind this policy picks for `slot` and `draw`; `None` for custom factories.
  pub fn kind(&self, slot: usize, draw: f64) -> Option<ShapeKind> {
    match self {
      ShapePolicy::Kind(kind) => Some(*kind),
      ShapePolicy::Mixture { kinds, cumulative } => cumulative.iter()
        .position(|c| draw <= *c)
        .and_then(|i| kinds.get(i))
        .or(kinds.last())
        .copied(),
      ShapePolicy::SlotRange { kind, slots, otherwise } => {
        if slots.contains(&slot) { Some(*kind) } else { otherwise.kind(slot, draw) }
      }
      ShapePolicy::Custom(_) => None
    }
  }

  pub fn spawn(&self, ctx: &mut Context, alpha: u8, slot: usize, draw: f64) -> Result<Shape> {
    match self {
      ShapePolicy::Custom(factory) => factory(ctx, alpha, slot, draw),
      ShapePolicy::SlotRange { slots, otherwise, .. } if !slots.contains(&slot) =>
        otherwise.spawn(ctx, alpha, slot, draw),
      _ => match self.kind(slot, draw) {
        Some(kind) => Shape::random(kind, ctx),
        None => config_bail!("shape policy selects no kind")
      }
    }
  }
}

impl Default for ShapePolicy {
  fn default() -> Self {
    ShapePolicy::Kind(ShapeKind::Triangle)
  }
}

impl From<ShapeKind> for ShapePolicy {
  fn from(kind: ShapeKind) -> Self {
    ShapePolicy::Kind(kind)
  }
}

impl fmt::Debug for ShapePolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShapePolicy::Kind(kind) => f.debug_tuple("Kind").field(kind).finish(),
      ShapePolicy::Mixture { kinds, cumulative } => f.debug_struct("Mixture")
        .field("kinds", kinds)
        .field("cumulative", cumulative)
        .finish(),
      ShapePolicy::SlotRange { kind, slots, otherwise } => f.debug_struct("SlotRange")
        .field("kind", kind)
        .field("slots", slots)
        .field("otherwise", otherwise)
        .finish(),
      ShapePolicy::Custom(_) => f.write_str("Custom(..)")
    }
  }
}
