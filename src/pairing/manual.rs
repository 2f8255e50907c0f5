//! Manual pairing: externally supplied pairs, validated and passed through.

use std::collections::{HashMap, HashSet};

use super::{Pairer, PairingContext, PairingError, Proposal};
use crate::models::CompetitorId;

#[derive(Debug, Clone, Copy)]
pub struct ManualPairer<'a> {
    pairs: &'a [(CompetitorId, CompetitorId)],
}

impl<'a> ManualPairer<'a> {
    pub fn new(pairs: &'a [(CompetitorId, CompetitorId)]) -> Self {
        Self { pairs }
    }
}

impl Pairer for ManualPairer<'_> {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn propose(&self, ctx: &PairingContext<'_>) -> Result<Proposal, PairingError> {
        let index: HashMap<&CompetitorId, usize> = ctx
            .standings
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id(), i))
            .collect();
        let lookup = |id: &CompetitorId| {
            index
                .get(id)
                .copied()
                .ok_or_else(|| PairingError::UnknownCompetitor(id.clone()))
        };

        let mut used = HashSet::new();
        let mut pairs = Vec::with_capacity(self.pairs.len());

        for (a, b) in self.pairs {
            if a == b {
                return Err(PairingError::InvalidPairing(format!(
                    "{} cannot be paired with itself",
                    a
                )));
            }
            let (ia, ib) = (lookup(a)?, lookup(b)?);
            for (i, id) in [(ia, a), (ib, b)] {
                if !used.insert(i) {
                    return Err(PairingError::InvalidPairing(format!(
                        "{} is listed in more than one pair",
                        id
                    )));
                }
            }
            pairs.push((ia, ib));
        }

        let unpaired: Vec<usize> = (0..ctx.standings.len())
            .filter(|i| !used.contains(i))
            .collect();

        let bye = match unpaired.as_slice() {
            [] => None,
            [only] => Some(*only),
            _ => {
                return Err(PairingError::Unmatched {
                    round: ctx.round,
                    competitors: unpaired.iter().map(|&i| ctx.id(i).clone()).collect(),
                })
            }
        };

        Ok(Proposal { pairs, bye })
    }
}
