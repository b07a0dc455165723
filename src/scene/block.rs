use serde::Serialize;

use crate::foundation::core::{Dim, ModelShape, Vec3};

/// Stable handle to a block owned by a [`Layout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BlockId(pub(crate) usize);

/// What a block represents in the visualized computation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    /// Activations flowing through the model.
    Data,
    /// Learned parameters; excluded from simulated-compute sweeps.
    Weight,
    /// Per-column aggregate values (mean, variance).
    Agg,
}

/// Continuous visual attributes, reset to defaults at the top of every frame
/// and re-derived from window progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BlockAttrs {
    /// Overall opacity in `[0, 1]`.
    pub opacity: f64,
    /// Highlight intensity in `[0, 1]`.
    pub highlight: f64,
    /// Displacement from the block's home position.
    pub offset: Vec3,
    /// When set, the block does not participate in the simulated
    /// read/write access visualization.
    pub access_disabled: bool,
}

impl Default for BlockAttrs {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            highlight: 0.0,
            offset: Vec3::ZERO,
            access_disabled: false,
        }
    }
}

/// One addressable rectangular region of the model layout.
#[derive(Clone, Debug, Serialize)]
pub struct SceneBlock {
    /// Role of this block.
    pub kind: BlockKind,
    /// Home position (minimum corner), in scene units.
    pub pos: Vec3,
    /// Cell counts along X/Y/Z.
    pub cells: [u32; 3],
    /// Per-frame visual attributes.
    pub attrs: BlockAttrs,
}

impl SceneBlock {
    /// Number of cells along `dim`.
    pub fn extent(&self, dim: Dim) -> u32 {
        match dim {
            Dim::X => self.cells[0],
            Dim::Y => self.cells[1],
            Dim::Z => self.cells[2],
        }
    }
}

/// Handles to the layer-normalization blocks of one transformer layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerNormHandles {
    /// Per-column mean aggregate.
    pub ln_agg1: BlockId,
    /// Per-column variance aggregate.
    pub ln_agg2: BlockId,
    /// Normalized output matrix.
    pub ln_resid: BlockId,
    /// Learned bias vector (beta).
    pub ln_mu: BlockId,
    /// Learned scale vector (gamma).
    pub ln_sigma: BlockId,
}

impl LayerNormHandles {
    /// All blocks in this group, in layout order.
    pub fn cubes(&self) -> [BlockId; 5] {
        [
            self.ln_mu,
            self.ln_sigma,
            self.ln_agg1,
            self.ln_agg2,
            self.ln_resid,
        ]
    }
}

/// Handles to the blocks of one transformer layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerHandles {
    /// First layer-norm group of the layer.
    pub ln1: LayerNormHandles,
}

/// Registry of all scene blocks for the active computation.
///
/// A walkthrough step only mutates attributes of blocks it reaches through
/// the registry; it never creates or destroys blocks. Attributes are reset by
/// [`Layout::begin_frame`], keeping the whole frame a pure function of the
/// clock.
#[derive(Clone, Debug)]
pub struct Layout {
    /// Grid dimensions of the visualized model.
    pub shape: ModelShape,
    /// Uniform cell size in scene units.
    pub cell: f64,
    /// Input embedding matrix feeding the first layer.
    pub residual0: BlockId,
    /// Per-layer block handles.
    pub layers: Vec<LayerHandles>,
    blocks: Vec<SceneBlock>,
    order: Vec<BlockId>,
}

impl Layout {
    /// Build the standard transformer-layer arrangement.
    pub fn build(shape: ModelShape, n_layers: usize) -> Self {
        let mut builder = LayoutBuilder::default();
        let t = shape.t;
        let c = shape.c;

        let residual0 = builder.push(BlockKind::Data, Vec3::ZERO, [t, c, 1]);
        let mut layers = Vec::with_capacity(n_layers);
        for l in 0..n_layers {
            let y0 = (l as f64 + 1.0) * (f64::from(c) + 6.0);
            let ln1 = LayerNormHandles {
                ln_mu: builder.push(BlockKind::Weight, Vec3::new(-4.0, y0 + 4.0, 0.0), [1, c, 1]),
                ln_sigma: builder.push(
                    BlockKind::Weight,
                    Vec3::new(-2.0, y0 + 4.0, 0.0),
                    [1, c, 1],
                ),
                ln_agg1: builder.push(BlockKind::Agg, Vec3::new(0.0, y0, 0.0), [t, 1, 1]),
                ln_agg2: builder.push(BlockKind::Agg, Vec3::new(0.0, y0 + 2.0, 0.0), [t, 1, 1]),
                ln_resid: builder.push(BlockKind::Data, Vec3::new(0.0, y0 + 4.0, 0.0), [t, c, 1]),
            };
            layers.push(LayerHandles { ln1 });
        }

        Self {
            shape,
            cell: 1.0,
            residual0,
            layers,
            order: builder.order,
            blocks: builder.blocks,
        }
    }

    /// Reset every block's attributes to defaults for a new frame.
    pub fn begin_frame(&mut self) {
        for blk in &mut self.blocks {
            blk.attrs = BlockAttrs::default();
        }
    }

    /// Borrow a block.
    pub fn block(&self, id: BlockId) -> &SceneBlock {
        &self.blocks[id.0]
    }

    /// Mutably borrow a block.
    pub fn block_mut(&mut self, id: BlockId) -> &mut SceneBlock {
        &mut self.blocks[id.0]
    }

    /// All blocks in computation order.
    pub fn cubes(&self) -> &[BlockId] {
        &self.order
    }
}

#[derive(Default)]
struct LayoutBuilder {
    blocks: Vec<SceneBlock>,
    order: Vec<BlockId>,
}

impl LayoutBuilder {
    fn push(&mut self, kind: BlockKind, pos: Vec3, cells: [u32; 3]) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(SceneBlock {
            kind,
            pos,
            cells,
            attrs: BlockAttrs::default(),
        });
        self.order.push(id);
        id
    }
}
