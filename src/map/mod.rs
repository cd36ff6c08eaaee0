mod camera;
mod geometry;
mod markers;
mod picking;
mod renderer;

pub use camera::{Camera, CameraState, Orbit, Ray, Viewport, FOV_Y_DEGREES};
pub use markers::{MarkerId, MarkerRecord, MarkerRegistry};
pub use picking::{pick_marker, ray_sphere, CursorStyle, HitTester};
pub use renderer::{GlobeLayers, GlobeRenderer, PinGlyph};
