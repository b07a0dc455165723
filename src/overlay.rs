//! Per-frame render requests: camera pose and data-flow overlays.
//!
//! Overlay requests are fire-and-forget: the step re-issues them every frame
//! while the owning window is active, and an overlay disappears the frame its
//! call stops being made. [`RenderState`] is cleared at the top of each frame.

use serde::Serialize;

use crate::{foundation::core::Vec3, scene::block::BlockId, scene::camera::Camera};

/// One draw request for the external rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum OverlayRequest {
    /// Dependency arrow from a source block to a layout-space coordinate.
    Dependence {
        /// Source block.
        src: BlockId,
        /// Destination cell in layout-space index coordinates.
        dest: Vec3,
    },
    /// Animated flow indicator from a source block through a pin point.
    Flow {
        /// Source block.
        src: BlockId,
        /// Destination cell in layout-space index coordinates.
        dest: Vec3,
        /// Anchor pin, allowed to lie outside the data grid.
        pin: Vec3,
    },
}

/// Shared mutable render state for the current frame.
#[derive(Clone, Debug, Default)]
pub struct RenderState {
    /// Camera pose, derived fresh each frame from window progress.
    pub camera: Camera,
    /// Overlay requests issued this frame, in call order.
    pub overlays: Vec<OverlayRequest>,
}

impl RenderState {
    /// Clear per-frame requests.
    pub fn begin_frame(&mut self) {
        self.overlays.clear();
    }
}

/// Request a dependency arrow from `src` to `dest`.
pub fn draw_dependences(render: &mut RenderState, src: BlockId, dest: Vec3) {
    render.overlays.push(OverlayRequest::Dependence { src, dest });
}

/// Request an animated flow indicator from `src` to `dest` via `pin`.
pub fn draw_data_flow(render: &mut RenderState, src: BlockId, dest: Vec3, pin: Vec3) {
    render.overlays.push(OverlayRequest::Flow { src, dest, pin });
}
