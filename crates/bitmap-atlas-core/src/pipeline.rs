use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, instrument};

use crate::collector::AssetCollector;
use crate::config::PackerConfig;
use crate::document::Document;
use crate::error::Result;
use crate::export::commit;
use crate::model::{AtlasLayout, AttemptOutcome, Block};
use crate::ordering::generate_orderings;
use crate::packer::OracleFactory;
use crate::selector::{select_best, select_best_with};

/// Output of a document run: the collector (placements committed) and the layout.
pub struct PackOutput {
    pub collector: AssetCollector,
    pub layout: AtlasLayout,
}

impl PackOutput {
    /// Convenience accessor for `layout.stats`.
    pub fn stats(&self) -> crate::model::LayoutStats {
        self.layout.stats
    }
}

/// Random source for the shuffles: seeded when `cfg.seed` is set.
pub fn search_rng(cfg: &PackerConfig) -> StdRng {
    match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Searches every candidate ordering of `blocks` with the oracle selected by `cfg`.
///
/// Notes:
/// - `N + 29` attempts are made for `N` blocks; the count is not configurable.
/// - With `parallel` (feature + config) attempts run on rayon; the winner is unchanged.
/// - Fails with `PackingExhausted` when no ordering places every block.
#[instrument(skip_all)]
pub fn pack_blocks(blocks: &[Block], cfg: &PackerConfig) -> Result<AtlasLayout> {
    cfg.validate()?;
    let mut rng = search_rng(cfg);
    let orderings = generate_orderings(blocks, &mut rng);
    info!(blocks = blocks.len(), orderings = orderings.len(), "searching");

    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            let selection =
                crate::selector::select_best_parallel(orderings, cfg, cfg.score_metric)?;
            return Ok(commit(selection, cfg));
        }
    }

    let selection = select_best(orderings, cfg, cfg.score_metric)?;
    Ok(commit(selection, cfg))
}

/// [`pack_blocks`] with an injected oracle factory, random source and per-attempt callback.
/// Always sequential.
pub fn pack_blocks_with<F, R, P>(
    blocks: &[Block],
    cfg: &PackerConfig,
    factory: &F,
    rng: &mut R,
    on_attempt: P,
) -> Result<AtlasLayout>
where
    F: OracleFactory,
    R: Rng + ?Sized,
    P: FnMut(&AttemptOutcome),
{
    cfg.validate()?;
    let orderings = generate_orderings(blocks, rng);
    let selection = select_best_with(orderings, factory, cfg.score_metric, on_attempt)?;
    Ok(commit(selection, cfg))
}

/// Collects every bitmap of `doc` and packs them.
pub fn pack_document(doc: &Document, cfg: &PackerConfig) -> Result<PackOutput> {
    let mut collector = AssetCollector::new();
    for (index, item) in doc.items.iter().enumerate() {
        collector.check_item(index, item)?;
    }
    let layout = pack_blocks(collector.blocks(), cfg)?;
    collector.commit(&layout);
    Ok(PackOutput { collector, layout })
}
