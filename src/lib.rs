//! This is a library for approximating raster images with geometric primitives.
//!
//! Shapes are added one at a time. For every new shape, a pool of workers runs random-restart
//! hill climbing over candidate geometry; a candidate's energy is the score the canvas would
//! have with the shape composited at its best-fitting color. The best candidate is committed
//! only if it lowers the score.
//!
//! The crate is split into:
//! - [`geometry`]: the shape family and its mutation rules,
//! - [`raster`]: antialiased scanline conversion of shape outlines,
//! - [`drawing`] and [`score`]: compositing, color fitting and the RMS objective,
//! - [`solver`]: the generic optimizer, the worker and the [`Model`](solver::Model).
//!
//! # Basic usage
//! ```no_run
//! # use primitive_fill::{
//! #   error::Result,
//! #   geometry::ShapeKind,
//! #   solver::{Model, ModelConfig, StepConfig}
//! # };
//! # fn main() -> Result<()> {
//! let target = image::RgbaImage::new(256, 256); // normally a downscaled photo
//! let mut model = Model::new(target, ModelConfig::default().with_seed(1))?;
//! let step = StepConfig::default()
//!   .with_policy(ShapeKind::Triangle)
//!   .with_alpha(128);
//! for slot in 0..100 {
//!   // number of energy evaluations spent on this slot
//!   let _evaluations = model.step(&step.clone().with_slot(slot))?;
//! }
//! let picture = model.render(); // at `output_size`
//! let svg = model.svg();
//! # Ok(())
//! # }
//! ```
//!
//! The shape family of a step is a [`ShapePolicy`](solver::ShapePolicy): a fixed kind, a
//! weighted mixture of kinds, a kind restricted to a range of slots, or any closure
//! `(context, alpha, slot, draw) -> Shape`.
//!
//! Results are reproducible for a fixed seed, configuration and worker count.

pub mod error;
pub mod geometry;
pub mod raster;
pub mod drawing;
pub mod score;
pub mod solver;
