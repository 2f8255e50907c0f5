//! Extremal pairing ("King of the Hill"): rank 1 vs rank n, 2 vs n-1, ...
//!
//! Maximizes the rating gap at every table. Rematch and same-team rules are
//! ignored on purpose.

use super::{Pairer, PairingContext, PairingError, Proposal};

#[derive(Debug, Clone, Copy, Default)]
pub struct KingOfTheHillPairer;

impl Pairer for KingOfTheHillPairer {
    fn name(&self) -> &'static str {
        "king-of-the-hill"
    }

    fn propose(&self, ctx: &PairingContext<'_>) -> Result<Proposal, PairingError> {
        let bye = ctx.select_bye();
        let field: Vec<usize> = (0..ctx.standings.len())
            .filter(|&i| Some(i) != bye)
            .collect();

        let half = field.len() / 2;
        let pairs = field[..half]
            .iter()
            .zip(field[half..].iter().rev())
            .map(|(&top, &bottom)| (top, bottom))
            .collect();

        Ok(Proposal { pairs, bye })
    }
}
