pub(crate) mod block;
pub(crate) mod camera;
pub(crate) mod split;
