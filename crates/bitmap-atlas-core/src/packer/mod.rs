use crate::config::{AlgorithmFamily, PackerConfig};
use crate::model::{Block, Placement, Rect};

pub mod guillotine;
pub mod maxrects;
pub mod skyline;

/// A packer reserves slots in a single canvas.
///
/// Implementations must ensure reserved slots never overlap and stay inside the
/// usable area they were built with. `pack` returns `None` when no slot of the
/// requested size is left; the packer state is unchanged in that case.
pub trait Packer {
    fn pack(&mut self, w: u32, h: u32) -> Option<Rect>;
}

/// Assigns placements to an ordered block sequence, in place.
///
/// Blocks are processed in the given order, without re-sorting, and the result
/// must be deterministic for a fixed order. A block that does not fit keeps
/// `placement == None`. Callers must not trust any placement after the first
/// absent one.
pub trait PackingOracle {
    fn fit(&mut self, blocks: &mut [Block]);
}

impl<O: PackingOracle + ?Sized> PackingOracle for Box<O> {
    fn fit(&mut self, blocks: &mut [Block]) {
        (**self).fit(blocks)
    }
}

/// Produces a fresh oracle (empty free space) for every attempt.
pub trait OracleFactory {
    type Oracle: PackingOracle;
    fn create(&self) -> Self::Oracle;
}

impl<F, O> OracleFactory for F
where
    F: Fn() -> O,
    O: PackingOracle,
{
    type Oracle = O;
    fn create(&self) -> O {
        self()
    }
}

/// Oracle backed by one of the bundled free-space packers.
///
/// Each block reserves `width + texture_padding` by `height + texture_padding`;
/// the block itself sits half the padding inside its slot. Placement continues
/// past a failed block.
pub struct RectOracle {
    packer: Box<dyn Packer>,
    padding: u32,
}

impl RectOracle {
    pub fn new(cfg: &PackerConfig) -> Self {
        let packer: Box<dyn Packer> = match cfg.family {
            AlgorithmFamily::Skyline => Box::new(skyline::SkylinePacker::new(cfg.usable_rect())),
            AlgorithmFamily::MaxRects => Box::new(maxrects::MaxRectsPacker::new(
                cfg.usable_rect(),
                cfg.mr_heuristic.clone(),
            )),
            AlgorithmFamily::Guillotine => Box::new(guillotine::GuillotinePacker::new(
                cfg.usable_rect(),
                cfg.g_choice.clone(),
                cfg.g_split.clone(),
            )),
        };
        Self {
            packer,
            padding: cfg.texture_padding,
        }
    }
}

impl PackingOracle for RectOracle {
    fn fit(&mut self, blocks: &mut [Block]) {
        let off = self.padding / 2;
        for block in blocks.iter_mut() {
            let w = block.width.saturating_add(self.padding);
            let h = block.height.saturating_add(self.padding);
            block.placement = self.packer.pack(w, h).map(|slot| Placement {
                x: slot.x + off,
                y: slot.y + off,
            });
        }
    }
}

impl OracleFactory for PackerConfig {
    type Oracle = RectOracle;
    fn create(&self) -> RectOracle {
        RectOracle::new(self)
    }
}
