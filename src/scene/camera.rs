use serde::Serialize;

use crate::{
    foundation::core::{Vec3, lerp_vec3},
    overlay::RenderState,
    schedule::scheduler::{Scheduler, TimeWindow},
};

/// Camera pose: position plus the point looked at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Camera {
    /// Eye position in scene space.
    pub pos: Vec3,
    /// Look-at target in scene space.
    pub target: Vec3,
}

/// Establish the step's base camera pose for this frame.
///
/// Called unconditionally at the top of the step; later
/// [`move_camera_to`] calls interpolate away from it.
pub fn set_initial_camera(render: &mut RenderState, pos: Vec3, target: Vec3) {
    render.camera = Camera { pos, target };
}

/// Move the camera toward a destination pose by `w`'s progress.
///
/// Interpolates from whatever pose the render state currently holds, so
/// successive calls chain in source order within the frame. No state
/// carries across frames: the pose is re-derived from window progress
/// every frame.
pub fn move_camera_to(
    render: &mut RenderState,
    sched: &Scheduler,
    w: TimeWindow,
    pos: Vec3,
    target: Vec3,
) {
    let t = sched.t(w);
    render.camera.pos = lerp_vec3(render.camera.pos, pos, t);
    render.camera.target = lerp_vec3(render.camera.target, target, t);
}

#[cfg(test)]
#[path = "../../tests/unit/scene/camera.rs"]
mod tests;
