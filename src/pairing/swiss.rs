//! Score-bracket (Swiss) pairing and its narrow-bracket variant.
//!
//! Brackets are processed top-down. Inside a bracket the top half meets the
//! bottom half (fold pairing). When the fold partner is ruled out, the next
//! lower candidate is tried, then the candidates above it; a competitor with
//! no valid partner floats into the next bracket. Whatever is left after the
//! last bracket gets one repair pass that swaps partners with already-made
//! pairs from the bottom up.
//!
//! This is greedy, not exhaustive backtracking: if the repair pass cannot
//! place everyone the round fails with `PairingError::Unmatched`.

use tracing::{debug, warn};

use super::{Pairer, PairingContext, PairingError, Proposal};

/// Swiss pairer. `narrow` selects the Fonte-Swiss variant where every
/// bracket is two adjacent ranks.
#[derive(Debug, Clone, Copy)]
pub struct SwissPairer {
    narrow: bool,
}

impl SwissPairer {
    /// Brackets by point total.
    pub fn brackets() -> Self {
        Self { narrow: false }
    }

    /// Brackets of two adjacent ranks.
    pub fn narrow() -> Self {
        Self { narrow: true }
    }
}

impl Pairer for SwissPairer {
    fn name(&self) -> &'static str {
        if self.narrow {
            "fonte-swiss"
        } else {
            "swiss"
        }
    }

    fn propose(&self, ctx: &PairingContext<'_>) -> Result<Proposal, PairingError> {
        let bye = ctx.select_bye();
        let field: Vec<usize> = (0..ctx.standings.len())
            .filter(|&i| Some(i) != bye)
            .collect();

        let brackets: Vec<Vec<usize>> = if self.narrow {
            field.chunks(2).map(<[usize]>::to_vec).collect()
        } else {
            score_brackets(ctx, &field)
        };
        debug!("{}: {} brackets", self.name(), brackets.len());

        let mut pairs = Vec::with_capacity(field.len() / 2);
        let mut floaters: Vec<usize> = Vec::new();
        for bracket in brackets {
            let mut pool = floaters;
            pool.extend(bracket);
            floaters = pair_pool(ctx, pool, &mut pairs);
        }

        if !floaters.is_empty() {
            repair(ctx, &mut pairs, floaters)?;
        }

        Ok(Proposal { pairs, bye })
    }
}

/// Split the field into runs of equal points.
fn score_brackets(ctx: &PairingContext<'_>, field: &[usize]) -> Vec<Vec<usize>> {
    let mut brackets: Vec<Vec<usize>> = Vec::new();
    for &i in field {
        let points = ctx.standings[i].half_points();
        match brackets.last_mut() {
            Some(last) if ctx.standings[last[0]].half_points() == points => last.push(i),
            _ => brackets.push(vec![i]),
        }
    }
    brackets
}

/// Fold-pair one pool, returning whoever floats down.
fn pair_pool(
    ctx: &PairingContext<'_>,
    mut pool: Vec<usize>,
    pairs: &mut Vec<(usize, usize)>,
) -> Vec<usize> {
    pool.sort_unstable();
    let mut floaters = Vec::new();

    while pool.len() >= 2 {
        let top = pool.remove(0);
        // Fold partner sits at the first index of the bottom half.
        let fold = (pool.len() + 1) / 2 - 1;
        let partner = (fold..pool.len())
            .chain((0..fold).rev())
            .find(|&j| ctx.allows(top, pool[j]));

        match partner {
            Some(j) => {
                let other = pool.remove(j);
                pairs.push((top, other));
            }
            None => floaters.push(top),
        }
    }

    floaters.extend(pool);
    floaters
}

/// Place leftovers by pairing them directly or by swapping partners with an
/// existing pair, searching from the bottom board up.
fn repair(
    ctx: &PairingContext<'_>,
    pairs: &mut Vec<(usize, usize)>,
    mut leftovers: Vec<usize>,
) -> Result<(), PairingError> {
    while !leftovers.is_empty() {
        let x = leftovers.remove(0);

        if let Some(j) = leftovers.iter().position(|&y| ctx.allows(x, y)) {
            let y = leftovers.remove(j);
            pairs.push((x, y));
            continue;
        }

        let swap = (0..pairs.len()).rev().find_map(|p| {
            let (a, b) = pairs[p];
            leftovers.iter().enumerate().find_map(|(j, &y)| {
                [(a, b), (b, a)]
                    .into_iter()
                    .find(|&(u, v)| ctx.allows(x, u) && ctx.allows(y, v))
                    .map(|(u, v)| (p, j, u, v))
            })
        });

        match swap {
            Some((p, j, u, v)) => {
                let y = leftovers.remove(j);
                warn!(
                    "Round {}: re-paired table of {} and {} to place {} and {}",
                    ctx.round,
                    ctx.id(u),
                    ctx.id(v),
                    ctx.id(x),
                    ctx.id(y)
                );
                pairs[p] = (x, u);
                pairs.push((y, v));
            }
            None => {
                leftovers.insert(0, x);
                return Err(PairingError::Unmatched {
                    round: ctx.round,
                    competitors: leftovers.iter().map(|&i| ctx.id(i).clone()).collect(),
                });
            }
        }
    }

    Ok(())
}
