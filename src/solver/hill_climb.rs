//! Random-restart hill climbing over any [`Candidate`].

use {
  super::Candidate,
  crate::error::Result,
  log::trace
};

/// Greedy strict-improvement search: `age` mutations of the best state so far, each kept
/// only when it lowers the energy. A mutation that fails is skipped.
pub fn hill_climb<C, Ctx>(state: C, age: usize, ctx: &mut Ctx) -> C
  where C: Candidate<Ctx>
{
  let mut best = state;
  let mut best_energy = best.energy(ctx);
  for _ in 0..age {
    let mut candidate = best.clone();
    if candidate.mutate(ctx).is_err() {
      continue;
    }
    let energy = candidate.energy(ctx);
    if energy < best_energy {
      best = candidate;
      best_energy = energy;
    }
  }
  best
}

/// Lowest-energy of `n` spawned states (at least one); ties keep the earliest.
pub fn best_random<C, Ctx>(
  n: usize,
  ctx: &mut Ctx,
  mut spawn: impl FnMut(&mut Ctx) -> Result<C>
) -> Result<(C, f64)>
  where C: Candidate<Ctx>
{
  let mut best = spawn(ctx)?;
  let mut best_energy = best.energy(ctx);
  for _ in 1..n {
    let mut state = spawn(ctx)?;
    let energy = state.energy(ctx);
    if energy < best_energy {
      best = state;
      best_energy = energy;
    }
  }
  Ok((best, best_energy))
}

/// `restarts` rounds (at least one) of [`best_random`] followed by [`hill_climb`];
/// the lowest-energy result across rounds wins.
pub fn best_hill_climb<C, Ctx>(
  n: usize,
  age: usize,
  restarts: usize,
  ctx: &mut Ctx,
  mut spawn: impl FnMut(&mut Ctx) -> Result<C>
) -> Result<(C, f64)>
  where C: Candidate<Ctx>
{
  let mut restart = |i: usize, ctx: &mut Ctx| -> Result<(C, f64)> {
    let (state, before) = best_random(n, ctx, &mut spawn)?;
    let mut state = hill_climb(state, age, ctx);
    let energy = state.energy(ctx);
    trace!("restart {i}: {n}x random: {before:.6} -> {age}x hill climb: {energy:.6}");
    Ok((state, energy))
  };
  let mut best = restart(0, ctx)?;
  for i in 1..restarts {
    let next = restart(i, ctx)?;
    if next.1 < best.1 {
      best = next;
    }
  }
  Ok(best)
}
