use serde::Serialize;

use crate::{
    foundation::core::{Dim, Vec3},
    scene::block::{BlockAttrs, BlockId, Layout},
};

/// Reference to either a base layout block or a sub-region derived this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BlockRef {
    /// Block owned by the [`Layout`].
    Base(BlockId),
    /// Transient sub-region owned by the current [`SceneFrame`].
    Sub(SubId),
}

impl From<BlockId> for BlockRef {
    fn from(id: BlockId) -> Self {
        Self::Base(id)
    }
}

/// Handle to a sub-region node within the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SubId(usize);

#[derive(Clone, Debug)]
struct SubNode {
    parent: BlockRef,
    dim: Dim,
    /// Cell range `[a, b)` along `dim`, in the parent view's own index coordinates.
    range: (u32, u32),
    /// World-space displacement along `dim` (the split gap).
    shift: f64,
    attrs: BlockAttrs,
    partition: bool,
}

/// World-space bounds and effective attributes of a resolved region.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ResolvedRegion {
    /// Minimum corner.
    pub min: Vec3,
    /// Extent along each axis.
    pub size: Vec3,
    /// Effective visual attributes.
    pub attrs: BlockAttrs,
}

/// Per-frame partition tree over the layout's blocks.
///
/// Rebuilt from scratch every frame: sub-regions are re-derived from
/// (parent, axis, position, amount) and carry no state across frames.
/// Enumeration is deterministic, so a node reached twice with identical
/// arguments is the same node, which is what makes per-cell attribute writes
/// land on the same visual element frame after frame.
#[derive(Clone, Debug, Default)]
pub struct SceneFrame {
    nodes: Vec<SubNode>,
}

impl SceneFrame {
    /// Create an empty frame scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all sub-regions for a new frame.
    pub fn begin_frame(&mut self) {
        self.nodes.clear();
    }

    /// Partition `parent` along `dim` around the cell containing `position`.
    ///
    /// `position` is in the parent view's own index coordinates (3.5 means
    /// the cell at index 3); a position outside the open extent returns
    /// `None` and mutates nothing; callers treat that as "nothing to
    /// visualize yet". `amount` linearly scales the world-space gap the
    /// outer partitions are displaced by; 0 produces a logical-only
    /// partition with the parent's original bounds. Children snapshot the
    /// parent's attributes at split time. Returns the middle (single-cell)
    /// partition, which may itself be split along another axis.
    pub fn split_grid(
        &mut self,
        layout: &Layout,
        parent: BlockRef,
        dim: Dim,
        position: f64,
        amount: f64,
    ) -> Option<BlockRef> {
        let extent = self.extent(layout, parent, dim);
        if !(position > 0.0 && position < f64::from(extent)) {
            return None;
        }
        let cell = (position.floor() as u32).min(extent - 1);
        let gap = amount * 0.5 * layout.cell;

        if cell > 0 {
            self.get_or_insert(layout, parent, dim, (0, cell), -gap, true);
        }
        let mid = self.get_or_insert(layout, parent, dim, (cell, cell + 1), 0.0, true);
        if cell + 1 < extent {
            self.get_or_insert(layout, parent, dim, (cell + 1, extent), gap, true);
        }
        Some(BlockRef::Sub(mid))
    }

    /// Enumerate the unit cells `from..=to` along `dim` within `parent`.
    ///
    /// Cells share identity with [`SceneFrame::split_grid`] middles keyed on
    /// (parent, axis, index); out-of-range indices are clamped to the
    /// parent's extent and an inverted range yields no cells.
    pub fn find_sub_blocks(
        &mut self,
        layout: &Layout,
        parent: BlockRef,
        dim: Dim,
        from: u32,
        to: u32,
    ) -> Vec<BlockRef> {
        let extent = self.extent(layout, parent, dim);
        if extent == 0 {
            return Vec::new();
        }
        let hi = to.min(extent - 1);
        (from..=hi)
            .map(|i| BlockRef::Sub(self.get_or_insert(layout, parent, dim, (i, i + 1), 0.0, false)))
            .collect()
    }

    /// Mutable attribute slot for a base block or sub-region.
    pub fn attrs_mut<'a>(&'a mut self, layout: &'a mut Layout, r: BlockRef) -> &'a mut BlockAttrs {
        match r {
            BlockRef::Base(id) => &mut layout.block_mut(id).attrs,
            BlockRef::Sub(SubId(i)) => &mut self.nodes[i].attrs,
        }
    }

    /// Effective attributes of a region.
    pub fn attrs(&self, layout: &Layout, r: BlockRef) -> BlockAttrs {
        match r {
            BlockRef::Base(id) => layout.block(id).attrs,
            BlockRef::Sub(SubId(i)) => self.nodes[i].attrs,
        }
    }

    /// World bounds and effective attributes of a region.
    ///
    /// A base block's position offset displaces its bounds; sub-region
    /// bounds derive from the parent's (already displaced) bounds plus the
    /// split gap along the partition axis.
    pub fn resolve(&self, layout: &Layout, r: BlockRef) -> ResolvedRegion {
        match r {
            BlockRef::Base(id) => {
                let blk = layout.block(id);
                ResolvedRegion {
                    min: blk.pos.add(blk.attrs.offset),
                    size: Vec3::new(
                        f64::from(blk.cells[0]) * layout.cell,
                        f64::from(blk.cells[1]) * layout.cell,
                        f64::from(blk.cells[2]) * layout.cell,
                    ),
                    attrs: blk.attrs,
                }
            }
            BlockRef::Sub(SubId(i)) => {
                let node = &self.nodes[i];
                let parent = self.resolve(layout, node.parent);
                let (a, b) = node.range;
                let min_d =
                    parent.min.get(node.dim) + f64::from(a) * layout.cell + node.shift;
                let size_d = f64::from(b - a) * layout.cell;
                ResolvedRegion {
                    min: parent.min.with(node.dim, min_d),
                    size: parent.size.with(node.dim, size_d),
                    attrs: node.attrs,
                }
            }
        }
    }

    /// Per-frame draw list: partition leaves for every base block, followed
    /// by cell-view patches.
    pub fn flatten(&self, layout: &Layout) -> Vec<(BlockRef, ResolvedRegion)> {
        let mut out = Vec::new();
        for &id in layout.cubes() {
            self.flatten_into(layout, BlockRef::Base(id), &mut out);
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if !node.partition {
                let r = BlockRef::Sub(SubId(i));
                out.push((r, self.resolve(layout, r)));
            }
        }
        out
    }

    fn flatten_into(
        &self,
        layout: &Layout,
        r: BlockRef,
        out: &mut Vec<(BlockRef, ResolvedRegion)>,
    ) {
        let children: Vec<BlockRef> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.partition && n.parent == r)
            .map(|(i, _)| BlockRef::Sub(SubId(i)))
            .collect();
        if children.is_empty() {
            out.push((r, self.resolve(layout, r)));
        } else {
            for child in children {
                self.flatten_into(layout, child, out);
            }
        }
    }

    fn extent(&self, layout: &Layout, r: BlockRef, dim: Dim) -> u32 {
        match r {
            BlockRef::Base(id) => layout.block(id).extent(dim),
            BlockRef::Sub(SubId(i)) => {
                let node = &self.nodes[i];
                if node.dim == dim {
                    node.range.1 - node.range.0
                } else {
                    self.extent(layout, node.parent, dim)
                }
            }
        }
    }

    fn get_or_insert(
        &mut self,
        layout: &Layout,
        parent: BlockRef,
        dim: Dim,
        range: (u32, u32),
        shift: f64,
        partition: bool,
    ) -> SubId {
        if let Some(i) = self
            .nodes
            .iter()
            .position(|n| n.parent == parent && n.dim == dim && n.range == range)
        {
            // Last split wins for the gap; attribute writes already made to
            // the node are kept, and a cell-view lookup never clears a gap.
            if partition {
                self.nodes[i].shift = shift;
            }
            self.nodes[i].partition |= partition;
            return SubId(i);
        }
        let mut attrs = self.attrs(layout, parent);
        attrs.offset = Vec3::ZERO;
        self.nodes.push(SubNode {
            parent,
            dim,
            range,
            shift,
            attrs,
            partition,
        });
        SubId(self.nodes.len() - 1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/split.rs"]
mod tests;
