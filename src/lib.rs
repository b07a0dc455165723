//! Cueline is a deterministic choreography engine for educational data-grid
//! walkthroughs.
//!
//! A walkthrough step runs once per rendered frame and declares overlapping,
//! dependency-ordered **time windows** on a single logical timeline; every
//! visual attribute (opacity, highlight, camera pose, overlay requests) is a
//! pure function of the windows' progress at the current clock. Rectangular
//! scene blocks can be partitioned into addressable sub-regions for partial
//! highlighting and reassembled, with the partition tree rebuilt from scratch
//! each frame.
//!
//! # Frame pipeline
//!
//! 1. **Reset**: [`Stage::run_frame`] clears all per-frame state
//! 2. **Declare**: the active step re-declares its windows in fixed source order
//! 3. **Derive**: block attributes, camera pose, and overlay requests are
//!    computed from window progress
//! 4. **Report**: the step returns a [`StepReport`] the outer driver can log
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Replay-deterministic**: state at clock T never depends on history,
//!   only on T, so the clock may jump anywhere.
//! - **Positional window identity**: windows have no names; declaring them in
//!   identical order every frame is the identity scheme, and it is
//!   load-bearing.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod narrative;
mod overlay;
mod process;
mod scene;
mod schedule;
mod walkthrough;

pub use foundation::core::{Dim, ModelShape, Vec3, lerp, lerp_vec3};
pub use foundation::error::{CuelineError, CuelineResult};
pub use narrative::{DimStyle, Fragment, Narrative, Paragraph, ParagraphBuilder};
pub use overlay::{OverlayRequest, RenderState, draw_data_flow, draw_dependences};
pub use process::{ProcessInfo, process_up_to, start_process_before};
pub use scene::block::{
    BlockAttrs, BlockId, BlockKind, LayerHandles, LayerNormHandles, Layout, SceneBlock,
};
pub use scene::camera::{Camera, move_camera_to, set_initial_camera};
pub use scene::split::{BlockRef, ResolvedRegion, SceneFrame, SubId};
pub use schedule::scheduler::{Scheduler, TimeWindow};
pub use walkthrough::{Phase, ProcessStatus, Stage, StepArgs, StepReport, Walkthrough};
