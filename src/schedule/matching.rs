//! Seeded perfect matching over a compatibility relation.
//!
//! First a bounded number of shuffled greedy first-fit passes, then a
//! depth-first search that always expands the entity with the fewest free
//! partners left. The search has a step budget so a call finishes in bounded
//! time; running out of budget is reported the same way as an impossible
//! matching.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

/// Upper bound on search nodes visited after the greedy passes fail.
pub const BACKTRACK_BUDGET: u64 = 250_000;

/// Pair up all of `0..n` so that every pair satisfies `compatible`.
///
/// On failure returns the entities left over by the best greedy pass.
pub fn perfect_matching<R, F>(
    n: usize,
    compatible: F,
    max_shuffles: u32,
    rng: &mut R,
) -> Result<Vec<(usize, usize)>, Vec<usize>>
where
    R: Rng + ?Sized,
    F: Fn(usize, usize) -> bool,
{
    let mut order: Vec<usize> = (0..n).collect();
    let mut best_unmatched: Option<Vec<usize>> = None;

    for attempt in 1..=max_shuffles.max(1) {
        order.shuffle(rng);
        let (pairs, unmatched) = greedy(&order, &compatible);
        if unmatched.is_empty() {
            debug!("Greedy matching succeeded on shuffle {}", attempt);
            return Ok(pairs);
        }
        if best_unmatched
            .as_ref()
            .map_or(true, |best| unmatched.len() < best.len())
        {
            best_unmatched = Some(unmatched);
        }
    }

    let unmatched = best_unmatched.unwrap_or_default();
    if n % 2 == 1 {
        return Err(unmatched);
    }

    warn!(
        "{} greedy shuffles left entities unmatched, falling back to search",
        max_shuffles
    );

    // Neighbour lists follow the last shuffle so the search is seeded too.
    let adjacency: Vec<Vec<usize>> = (0..n)
        .map(|v| {
            order
                .iter()
                .copied()
                .filter(|&u| u != v && compatible(v, u))
                .collect()
        })
        .collect();

    let mut matched = vec![false; n];
    let mut pairs = Vec::with_capacity(n / 2);
    let mut budget = BACKTRACK_BUDGET;

    if search(&adjacency, &mut matched, &mut pairs, &mut budget) {
        debug!(
            "Search found a matching after {} steps",
            BACKTRACK_BUDGET - budget
        );
        Ok(pairs)
    } else {
        if budget == 0 {
            warn!("Matching search budget exhausted");
        }
        Err(unmatched)
    }
}

/// One first-fit pass in `order`. Anyone without a free compatible partner
/// further down the order is left unmatched.
fn greedy<F>(order: &[usize], compatible: &F) -> (Vec<(usize, usize)>, Vec<usize>)
where
    F: Fn(usize, usize) -> bool,
{
    let n = order.len();
    let mut taken = vec![false; n];
    let mut pairs = Vec::with_capacity(n / 2);
    let mut unmatched = Vec::new();

    for (pos, &x) in order.iter().enumerate() {
        if taken[x] {
            continue;
        }
        taken[x] = true;

        let partner = order[pos + 1..]
            .iter()
            .copied()
            .find(|&y| !taken[y] && compatible(x, y));
        match partner {
            Some(y) => {
                taken[y] = true;
                pairs.push((x, y));
            }
            None => unmatched.push(x),
        }
    }

    (pairs, unmatched)
}

fn search(
    adjacency: &[Vec<usize>],
    matched: &mut [bool],
    pairs: &mut Vec<(usize, usize)>,
    budget: &mut u64,
) -> bool {
    if *budget == 0 {
        return false;
    }
    *budget -= 1;

    // Most constrained free entity first.
    let mut pick: Option<(usize, usize)> = None;
    for v in (0..adjacency.len()).filter(|&v| !matched[v]) {
        let options = adjacency[v].iter().filter(|&&u| !matched[u]).count();
        if options == 0 {
            return false;
        }
        if pick.map_or(true, |(_, fewest)| options < fewest) {
            pick = Some((v, options));
        }
    }

    let Some((v, _)) = pick else {
        return true;
    };

    matched[v] = true;
    for &u in &adjacency[v] {
        if matched[u] {
            continue;
        }
        matched[u] = true;
        pairs.push((v, u));
        if search(adjacency, matched, pairs, budget) {
            return true;
        }
        pairs.pop();
        matched[u] = false;
    }
    matched[v] = false;

    false
}
