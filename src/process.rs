//! Bulk completion driver: the "fast-forward" sweep that collapses the
//! column-by-column reveal into a single progress-driven pass over the
//! layout once a late window activates.

use crate::{
    foundation::core::Dim,
    foundation::error::{CuelineError, CuelineResult},
    scene::block::{BlockId, BlockKind, Layout},
    scene::split::SceneFrame,
    schedule::scheduler::{Scheduler, TimeWindow},
};

/// Sweep cursor over the layout's computation order.
///
/// Rebuilt by the step each frame; carries no state across frames.
#[derive(Clone, Copy, Debug)]
pub struct ProcessInfo {
    cursor: usize,
}

/// Start a sweep whose first unprocessed block is `start`.
///
/// Everything earlier in the layout's computation order is presumed already
/// shown in full.
pub fn start_process_before(layout: &Layout, start: BlockId) -> CuelineResult<ProcessInfo> {
    let cursor = layout
        .cubes()
        .iter()
        .position(|&b| b == start)
        .ok_or_else(|| CuelineError::process("start block is not in the layout"))?;
    Ok(ProcessInfo { cursor })
}

/// Sweep access markers from the cursor through `target` by `w`'s progress.
///
/// Weight blocks are skipped (parameters are read, not computed). Fully
/// swept blocks get their access marker enabled wholesale; the frontier
/// block is revealed column by column with the frontier column highlighted.
/// Once the window completes, the cursor advances past `target` so a later
/// call can sweep the next span.
pub fn process_up_to(
    layout: &mut Layout,
    scene: &mut SceneFrame,
    sched: &Scheduler,
    w: TimeWindow,
    target: BlockId,
    info: &mut ProcessInfo,
) -> CuelineResult<()> {
    let target_idx = layout
        .cubes()
        .iter()
        .position(|&b| b == target)
        .ok_or_else(|| CuelineError::process("target block is not in the layout"))?;
    if target_idx < info.cursor {
        return Err(CuelineError::process(
            "target block precedes the sweep cursor",
        ));
    }

    let span: Vec<BlockId> = layout.cubes()[info.cursor..=target_idx]
        .iter()
        .copied()
        .filter(|&b| layout.block(b).kind != BlockKind::Weight)
        .collect();
    let total_cols: u32 = span.iter().map(|&b| layout.block(b).extent(Dim::X)).sum();
    if total_cols == 0 {
        return Ok(());
    }

    let t = sched.t(w);
    let frontier = t * f64::from(total_cols);
    let mut acc = 0.0;
    for &b in &span {
        let cols = layout.block(b).extent(Dim::X);
        let local = (frontier - acc).clamp(0.0, f64::from(cols));
        acc += f64::from(cols);
        if local <= 0.0 {
            continue;
        }
        if local >= f64::from(cols) {
            layout.block_mut(b).attrs.access_disabled = false;
            continue;
        }
        let col = (local.floor() as u32).min(cols - 1);
        for cell in scene.find_sub_blocks(layout, b.into(), Dim::X, 0, col) {
            scene.attrs_mut(layout, cell).access_disabled = false;
        }
        if let Some(&frontier_cell) = scene
            .find_sub_blocks(layout, b.into(), Dim::X, col, col)
            .first()
        {
            scene.attrs_mut(layout, frontier_cell).highlight = 0.3;
        }
    }

    if t >= 1.0 {
        info.cursor = target_idx + 1;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/process/driver.rs"]
mod tests;
