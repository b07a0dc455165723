//! Frame driver and the scripted walkthrough steps.

pub(crate) mod layer_norm;

use serde::Serialize;

use crate::{
    narrative::Narrative,
    overlay::RenderState,
    scene::block::{BlockId, Layout},
    scene::split::SceneFrame,
    schedule::scheduler::Scheduler,
};

/// Identifies which scripted step is currently active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Input token/position embedding detail.
    InputEmbedding,
    /// Layer-normalization detail of the first transformer layer.
    LayerNorm,
    /// Self-attention detail.
    SelfAttention,
}

/// Shared walkthrough state consumed by every step.
#[derive(Clone, Debug)]
pub struct Walkthrough {
    /// Active step.
    pub phase: Phase,
    /// Frame clock in seconds.
    pub time: f64,
    /// Blocks whose dimension labels stay highlighted this step.
    pub dim_highlight_blocks: Vec<BlockId>,
}

/// Outcome of the bulk completion driver for one frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ProcessStatus {
    /// The fast-forward sweep was not requested.
    Idle,
    /// The sweep ran.
    Ran,
    /// The sweep failed; the rest of the frame's effects still applied.
    Degraded(String),
}

/// What one frame of a step produced, for the outer driver.
#[derive(Clone, Debug, Serialize)]
pub struct StepReport {
    /// Phase that produced the frame (the active one, even for no-op steps).
    pub phase: Phase,
    /// Bulk-completion outcome; the driver decides whether to log it.
    pub process: ProcessStatus,
}

/// Mutable per-frame context handed to a step.
///
/// Single-writer discipline: the step mutates block attributes and render
/// state through this bundle only, and never swaps out the bundle's
/// components.
pub struct StepArgs<'a> {
    /// Shared walkthrough state.
    pub wt: &'a mut Walkthrough,
    /// Block registry for the active computation.
    pub layout: &'a mut Layout,
    /// Per-frame partition tree.
    pub scene: &'a mut SceneFrame,
    /// Camera and overlay requests.
    pub render: &'a mut RenderState,
    /// Window scheduler.
    pub sched: &'a mut Scheduler,
    /// Narrative sink.
    pub narrative: &'a mut Narrative,
}

/// Owns everything a walkthrough frame touches and drives the steps.
#[derive(Clone, Debug)]
pub struct Stage {
    /// Shared walkthrough state.
    pub wt: Walkthrough,
    /// Block registry.
    pub layout: Layout,
    /// Per-frame partition tree.
    pub scene: SceneFrame,
    /// Camera and overlay requests.
    pub render: RenderState,
    /// Window scheduler.
    pub sched: Scheduler,
    /// Narrative sink.
    pub narrative: Narrative,
}

impl Stage {
    /// Create a stage over `layout` with the given active phase.
    pub fn new(layout: Layout, phase: Phase) -> Self {
        Self {
            wt: Walkthrough {
                phase,
                time: 0.0,
                dim_highlight_blocks: Vec::new(),
            },
            layout,
            scene: SceneFrame::new(),
            render: RenderState::default(),
            sched: Scheduler::new(),
            narrative: Narrative::new(),
        }
    }

    /// Run one frame at the given clock.
    ///
    /// Resets all per-frame state first, so the resulting attributes depend
    /// on `clock` alone: jumping the clock anywhere reproduces the state
    /// sequential playback would have reached.
    #[tracing::instrument(skip(self))]
    pub fn run_frame(&mut self, clock: f64) -> StepReport {
        self.wt.time = clock;
        self.sched.begin_frame(clock);
        self.layout.begin_frame();
        self.scene.begin_frame();
        self.render.begin_frame();
        self.narrative.begin_frame();
        self.wt.dim_highlight_blocks.clear();

        let report = layer_norm::step(StepArgs {
            wt: &mut self.wt,
            layout: &mut self.layout,
            scene: &mut self.scene,
            render: &mut self.render,
            sched: &mut self.sched,
            narrative: &mut self.narrative,
        });

        if let ProcessStatus::Degraded(msg) = &report.process {
            tracing::warn!(phase = ?report.phase, %msg, "bulk completion driver degraded");
        }
        report
    }
}

#[cfg(test)]
#[path = "../../tests/unit/walkthrough/stage.rs"]
mod tests;
