//! Shape search and the model that commits its results.

pub mod hill_climb;
pub use hill_climb::{best_hill_climb, best_random, hill_climb};

pub mod policy;
pub use policy::{ShapeFactory, ShapePolicy};

pub mod worker;
pub use worker::{Job, Outcome, State, Thresholds, Worker, MAX_REDRAWS};

pub mod model;
pub use model::{Committed, Model, ModelConfig, StepConfig};

#[cfg(test)] mod tests;

use crate::error::Result;

/// A point of a search space. Lower energy is better.
///
/// Both methods receive the evaluation context explicitly, so candidates stay plain data
/// and can be cloned freely.
pub trait Candidate<Ctx>: Clone {
  fn energy(&mut self, ctx: &mut Ctx) -> f64;
  /// Move to a neighbouring point. On error the candidate is unchanged.
  fn mutate(&mut self, ctx: &mut Ctx) -> Result<()>;
}
