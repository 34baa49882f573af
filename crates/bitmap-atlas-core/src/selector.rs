//! Runs every ordering through a fresh oracle and picks the winner.

use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::ScoreMetric;
use crate::error::{AtlasError, Result};
use crate::model::{AttemptOutcome, Block, PackResult};
use crate::ordering::Ordering;
use crate::packer::{OracleFactory, PackingOracle};

/// Winner of a search plus how many attempts were made and succeeded.
#[derive(Debug, Clone)]
pub struct Selection {
    pub best: PackResult,
    pub attempts: usize,
    pub successful: usize,
}

/// Packs one ordering with `oracle` and applies the fail-fast rule.
///
/// The first block left without a placement discards the whole attempt, even
/// if the oracle placed blocks after it.
pub fn run_attempt<O: PackingOracle + ?Sized>(
    ordering: Ordering,
    oracle: &mut O,
    metric: ScoreMetric,
) -> AttemptOutcome {
    let Ordering {
        label,
        generation,
        mut blocks,
    } = ordering;
    for b in blocks.iter_mut() {
        b.reset();
    }
    oracle.fit(&mut blocks);

    if let Some(first_failure) = blocks.iter().position(|b| b.placement.is_none()) {
        debug!(%label, first_failure, "noFit");
        return AttemptOutcome::NoFit {
            label,
            generation,
            first_failure,
        };
    }

    let score = score(&blocks, metric);
    debug!(%label, score, "fit");
    AttemptOutcome::Fit(PackResult {
        label,
        generation,
        placements: blocks,
        score,
    })
}

/// Score of a fully placed sequence; lower is better.
pub fn score(blocks: &[Block], metric: ScoreMetric) -> u64 {
    match metric {
        ScoreMetric::BlockArea => blocks.iter().map(Block::area).sum(),
        ScoreMetric::BoundingArea => {
            let (w, h) = blocks
                .iter()
                .filter_map(Block::rect)
                .fold((0u32, 0u32), |(w, h), r| (w.max(r.right()), h.max(r.bottom())));
            w as u64 * h as u64
        }
    }
}

/// Runs all `orderings` sequentially and returns the best result.
#[instrument(skip_all)]
pub fn select_best<F: OracleFactory>(
    orderings: Vec<Ordering>,
    factory: &F,
    metric: ScoreMetric,
) -> Result<Selection> {
    select_best_with(orderings, factory, metric, |_| {})
}

/// Like [`select_best`], calling `on_attempt` after each attempt.
pub fn select_best_with<F, P>(
    orderings: Vec<Ordering>,
    factory: &F,
    metric: ScoreMetric,
    mut on_attempt: P,
) -> Result<Selection>
where
    F: OracleFactory,
    P: FnMut(&AttemptOutcome),
{
    let attempts = orderings.len();
    let blocks = orderings.first().map_or(0, |o| o.blocks.len());
    let mut results: Vec<PackResult> = Vec::new();
    for ordering in orderings {
        let mut oracle = factory.create();
        let outcome = run_attempt(ordering, &mut oracle, metric);
        on_attempt(&outcome);
        if let AttemptOutcome::Fit(r) = outcome {
            results.push(r);
        }
    }
    pick(results, attempts, blocks)
}

/// Runs all `orderings` on the rayon pool, one fresh oracle per attempt.
/// The winner is the same as the sequential path would pick.
#[cfg(feature = "parallel")]
#[instrument(skip_all)]
pub fn select_best_parallel<F>(
    orderings: Vec<Ordering>,
    factory: &F,
    metric: ScoreMetric,
) -> Result<Selection>
where
    F: OracleFactory + Sync,
{
    let attempts = orderings.len();
    let blocks = orderings.first().map_or(0, |o| o.blocks.len());
    let results: Vec<PackResult> = orderings
        .into_par_iter()
        .filter_map(|ordering| {
            let mut oracle = factory.create();
            match run_attempt(ordering, &mut oracle, metric) {
                AttemptOutcome::Fit(r) => Some(r),
                AttemptOutcome::NoFit { .. } => None,
            }
        })
        .collect();
    pick(results, attempts, blocks)
}

/// Stable ascending sort on (score, generation); the first entry wins.
fn pick(mut results: Vec<PackResult>, attempts: usize, blocks: usize) -> Result<Selection> {
    let successful = results.len();
    results.sort_by_key(|r| (r.score, r.generation));
    let best = results
        .into_iter()
        .next()
        .ok_or(AtlasError::PackingExhausted { blocks, attempts })?;
    info!(
        winner = %best.label,
        score = best.score,
        attempts,
        successful,
        "selected layout"
    );
    Ok(Selection {
        best,
        attempts,
        successful,
    })
}
