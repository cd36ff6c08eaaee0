use glam::DVec2;

use crate::map::Camera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { button: PointerButton, pos: DVec2 },
    Move { pos: DVec2 },
    Up,
    Wheel { delta_y: f64 },
}

/// What a pointer event did to the camera, or what it asks of the hit tester.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEffect {
    None,
    /// Orbit deltas applied this event.
    Rotate { pitch: f64, yaw: f64 },
    Zoom { distance: f64, atmosphere_scale: f64 },
    /// Pointer moved without dragging; hit-test at `ndc`.
    Hover { ndc: DVec2 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragState {
    pub active: bool,
    pub last_pos: Option<DVec2>,
}

/// Glow ring scale for a camera distance.
pub fn atmosphere_scale(distance: f64) -> f64 {
    1.1 + distance / 100.0
}

/// Turns pointer input into camera rotation, zoom steps and hover requests.
#[derive(Debug, Clone)]
pub struct PointerController {
    drag: DragState,
    /// Radians of yaw per pixel of horizontal drag.
    pub sensitivity_x: f64,
    /// Radians of pitch per pixel of vertical drag.
    pub sensitivity_y: f64,
    pub zoom_step: f64,
}

impl PointerController {
    pub fn new(sensitivity_x: f64, sensitivity_y: f64, zoom_step: f64) -> Self {
        Self {
            drag: DragState::default(),
            sensitivity_x,
            sensitivity_y,
            zoom_step,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.active
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn handle(&mut self, camera: &mut Camera, event: PointerEvent) -> PointerEffect {
        match event {
            PointerEvent::Down { button, pos } => {
                if button == PointerButton::Primary {
                    self.drag.active = true;
                    self.drag.last_pos = Some(camera.viewport.clamp(pos));
                }
                PointerEffect::None
            }
            PointerEvent::Move { pos } => {
                let pos = camera.viewport.clamp(pos);
                if !self.drag.active {
                    return PointerEffect::Hover {
                        ndc: camera.viewport.to_ndc(pos),
                    };
                }

                let delta = self.drag.last_pos.map_or(DVec2::ZERO, |last| pos - last);
                self.drag.last_pos = Some(pos);

                let pitch = delta.y * self.sensitivity_y;
                let yaw = delta.x * self.sensitivity_x;
                camera.state.orbit.rotate(pitch, yaw);
                PointerEffect::Rotate { pitch, yaw }
            }
            PointerEvent::Up => {
                self.drag = DragState::default();
                PointerEffect::None
            }
            PointerEvent::Wheel { delta_y } => {
                // Only the direction matters; pixel and line deltas step alike.
                if delta_y == 0.0 || !delta_y.is_finite() {
                    return PointerEffect::None;
                }
                let distance = camera.state.step(delta_y, self.zoom_step);
                PointerEffect::Zoom {
                    distance,
                    atmosphere_scale: atmosphere_scale(distance),
                }
            }
        }
    }
}
