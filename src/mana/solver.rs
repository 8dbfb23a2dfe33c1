//! Allocation solver: assigns mana sources to a cost.
//!
//! ## Algorithm
//!
//! 1. **Colored pips, scarcest color first.** While colored pips remain,
//!    pick the color whose willing (uncommitted, able to pay it) sources are
//!    fewest, ties broken in WUBRG order. Commit the least flexible willing
//!    source, exact color before `Any`.
//! 2. **Explicit colorless pips.** Sources that produce colorless go first,
//!    then the least flexible of whatever is left, `Any` last.
//! 3. **Generic.** Any uncommitted source. Payable iff enough remain; the
//!    least flexible ones are committed so flexible sources stay in the pool.
//!
//! This is a greedy approximation of bipartite matching. It is exact for
//! pools of single-color sources, `Any` sources and colorless sources, and for
//! pools with at most one multi-color source per color conflict. Adversarial
//! pools of several overlapping multi-color sources can be rejected even
//! when a payment exists.
//!
//! ```
//! use rust_goldfish::mana::{can_pay, spend, ManaColor, ManaCost, ManaSource};
//!
//! let cost = ManaCost::parse("{1}{W}{W}").unwrap();
//! let pool = [
//!     ManaSource::land(ManaColor::White),
//!     ManaSource::land(ManaColor::Any),
//!     ManaSource::land(ManaColor::Colorless),
//! ];
//! assert!(can_pay(&cost, &pool));
//! assert!(spend(&cost, &pool).unwrap().is_empty());
//!
//! let short = [
//!     ManaSource::land(ManaColor::White),
//!     ManaSource::land(ManaColor::Blue),
//!     ManaSource::land(ManaColor::Colorless),
//! ];
//! assert!(!can_pay(&cost, &short));
//! ```

use smallvec::SmallVec;

use super::color::ManaColor;
use super::cost::ManaCost;
use super::source::ManaSource;
use crate::core::{SimError, SimResult};

/// Indices into the source slice committed by a payment.
pub type Assignment = SmallVec<[usize; 8]>;

/// Can `sources` pay `cost`?
#[must_use]
pub fn can_pay(cost: &ManaCost, sources: &[ManaSource]) -> bool {
    plan_payment(cost, sources).is_ok()
}

/// Pay `cost`, returning the sources left over.
///
/// On failure nothing is consumed and `UnpayableCost` is returned.
pub fn spend(cost: &ManaCost, sources: &[ManaSource]) -> SimResult<Vec<ManaSource>> {
    let assignment = plan_payment(cost, sources)?;
    Ok(sources
        .iter()
        .enumerate()
        .filter(|(i, _)| !assignment.contains(i))
        .map(|(_, s)| *s)
        .collect())
}

/// Compute which sources pay `cost`, without consuming anything.
///
/// The returned indices are distinct and their count equals
/// `cost.pips_required()`.
pub fn plan_payment(cost: &ManaCost, sources: &[ManaSource]) -> SimResult<Assignment> {
    let unpayable = || SimError::UnpayableCost {
        cost: cost.to_string(),
    };

    if cost.pips_required() > sources.len() {
        return Err(unpayable());
    }

    let mut used: SmallVec<[bool; 16]> = SmallVec::from_elem(false, sources.len());
    let mut committed = Assignment::new();
    let mut remaining = cost.colored;

    // Colored pips, scarcest color first.
    loop {
        let mut scarcest: Option<(usize, usize)> = None;
        for (ci, color) in ManaColor::COLORS.iter().enumerate() {
            if remaining[ci] == 0 {
                continue;
            }
            let willing = sources
                .iter()
                .enumerate()
                .filter(|(i, s)| !used[*i] && s.colors.satisfies(*color))
                .count();
            if scarcest.map_or(true, |(_, best)| willing < best) {
                scarcest = Some((ci, willing));
            }
        }

        let Some((ci, willing)) = scarcest else {
            break;
        };
        if willing == 0 {
            return Err(unpayable());
        }

        let color = ManaColor::COLORS[ci];
        let idx = pick(sources, &used, |s| s.colors.satisfies(color), |s| {
            (s.colors.is_any(), s.flexibility())
        })
        .ok_or_else(unpayable)?;
        used[idx] = true;
        committed.push(idx);
        remaining[ci] -= 1;
    }

    // Explicit colorless pips: colorless producers, then anything left.
    for _ in 0..cost.colorless {
        let idx = pick(
            sources,
            &used,
            |_| true,
            |s| (!s.colors.satisfies(ManaColor::Colorless), s.flexibility()),
        )
        .ok_or_else(unpayable)?;
        used[idx] = true;
        committed.push(idx);
    }

    // Generic from whatever is left, least flexible first.
    let generic = usize::from(cost.generic);
    if generic > 0 {
        let mut free: SmallVec<[usize; 16]> = (0..sources.len()).filter(|&i| !used[i]).collect();
        if free.len() < generic {
            return Err(unpayable());
        }
        free.sort_by_key(|&i| (sources[i].flexibility(), sources[i].colors.is_any(), i));
        committed.extend(free.into_iter().take(generic));
    }

    debug_assert_eq!(committed.len(), cost.pips_required());
    Ok(committed)
}

/// Lowest-keyed willing, uncommitted source. Ties go to the lower index.
fn pick(
    sources: &[ManaSource],
    used: &[bool],
    willing: impl Fn(&ManaSource) -> bool,
    key: impl Fn(&ManaSource) -> (bool, u32),
) -> Option<usize> {
    sources
        .iter()
        .enumerate()
        .filter(|(i, s)| !used[*i] && willing(*s))
        .min_by_key(|(i, s)| (key(*s), *i))
        .map(|(i, _)| i)
}
