use glam::{DMat3, DMat4, DVec2, DVec3, DVec4};

/// Vertical field of view in degrees.
pub const FOV_Y_DEGREES: f64 = 75.0;
pub const NEAR: f64 = 0.1;
pub const FAR: f64 = 1000.0;

/// Drawable area in pixels (braille dots for the terminal host).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Clamp a pixel position into the viewport.
    pub fn clamp(&self, pos: DVec2) -> DVec2 {
        DVec2::new(pos.x.clamp(0.0, self.width), pos.y.clamp(0.0, self.height))
    }

    /// Pixel position to normalized device coordinates (y up).
    pub fn to_ndc(&self, pos: DVec2) -> DVec2 {
        let pos = self.clamp(pos);
        DVec2::new(pos.x / self.width * 2.0 - 1.0, -pos.y / self.height * 2.0 + 1.0)
    }

    pub fn to_pixel(&self, ndc: DVec2) -> DVec2 {
        DVec2::new((ndc.x + 1.0) * 0.5 * self.width, (1.0 - ndc.y) * 0.5 * self.height)
    }
}

/// Rotation of the globe group, applied as Rx(pitch) * Ry(yaw) * Rz(tilt).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub pitch: f64,
    pub yaw: f64,
    pub tilt: f64,
}

impl Orbit {
    pub fn matrix(&self) -> DMat3 {
        DMat3::from_rotation_x(self.pitch) * DMat3::from_rotation_y(self.yaw) * DMat3::from_rotation_z(self.tilt)
    }

    pub fn rotate(&mut self, pitch: f64, yaw: f64) {
        self.pitch += pitch;
        self.yaw += yaw;
    }
}

impl Default for Orbit {
    /// Europe faces the camera.
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: -1.57,
            tilt: -0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub orbit: Orbit,
}

impl CameraState {
    pub fn new(distance: f64, min_distance: f64, max_distance: f64) -> Self {
        let mut state = Self {
            distance: min_distance,
            min_distance,
            max_distance,
            orbit: Orbit::default(),
        };
        state.set_distance(distance);
        state
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn set_distance(&mut self, distance: f64) {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
    }

    /// Move one zoom step in the direction of `sign`. Returns the new distance.
    pub fn step(&mut self, sign: f64, step: f64) -> f64 {
        if sign != 0.0 && sign.is_finite() {
            self.set_distance(self.distance + sign.signum() * step);
        }
        self.distance
    }
}

/// Half-line used for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit direction.
    pub dir: DVec3,
}

impl Ray {
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }
}

/// Perspective camera on +Z looking at the origin.
#[derive(Debug, Clone)]
pub struct Camera {
    pub state: CameraState,
    pub viewport: Viewport,
}

impl Camera {
    pub fn new(state: CameraState, viewport: Viewport) -> Self {
        Self { state, viewport }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn position(&self) -> DVec3 {
        DVec3::new(0.0, 0.0, self.state.distance())
    }

    pub fn view_proj(&self) -> DMat4 {
        let proj = DMat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), self.viewport.aspect(), NEAR, FAR);
        let view = DMat4::look_at_rh(self.position(), DVec3::ZERO, DVec3::Y);
        proj * view
    }

    /// Ray from the camera through an NDC position.
    pub fn ray_from_ndc(&self, ndc: DVec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let near = inverse.project_point3(DVec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(DVec3::new(ndc.x, ndc.y, 1.0));
        Ray {
            origin: self.position(),
            dir: (far - near).normalize(),
        }
    }

    /// World point to NDC (x, y, depth). `None` when behind the camera.
    pub fn project(&self, world: DVec3) -> Option<DVec3> {
        let clip = self.view_proj() * DVec4::new(world.x, world.y, world.z, 1.0);
        if clip.w <= NEAR {
            return None;
        }
        Some(clip.truncate() / clip.w)
    }

    /// World point to viewport pixels.
    pub fn project_to_pixel(&self, world: DVec3) -> Option<DVec2> {
        self.project(world).map(|ndc| self.viewport.to_pixel(ndc.truncate()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(CameraState::new(10.0, 6.0, 40.0), Viewport::new(200.0, 100.0))
    }

    #[test]
    fn ndc_round_trips_through_pixels() {
        let viewport = Viewport::new(200.0, 100.0);
        assert_eq!(viewport.to_ndc(DVec2::new(100.0, 50.0)), DVec2::ZERO);
        assert_eq!(viewport.to_ndc(DVec2::new(0.0, 0.0)), DVec2::new(-1.0, 1.0));
        let p = DVec2::new(37.0, 81.0);
        assert!((viewport.to_pixel(viewport.to_ndc(p)) - p).length() < 1e-9);
    }

    #[test]
    fn positions_outside_viewport_are_clamped() {
        let viewport = Viewport::new(200.0, 100.0);
        assert_eq!(viewport.clamp(DVec2::new(-5.0, 300.0)), DVec2::new(0.0, 100.0));
        assert_eq!(viewport.to_ndc(DVec2::new(900.0, -4.0)), DVec2::new(1.0, 1.0));
    }

    #[test]
    fn distance_stays_in_range() {
        let mut state = CameraState::new(10.0, 6.0, 40.0);
        for _ in 0..100 {
            state.step(1.0, 0.5);
        }
        assert_eq!(state.distance(), 40.0);
        for _ in 0..100 {
            state.step(-1.0, 0.5);
        }
        assert_eq!(state.distance(), 6.0);
        assert_eq!(CameraState::new(1.0, 6.0, 40.0).distance(), 6.0);
    }

    #[test]
    fn center_ray_points_at_origin() {
        let cam = camera();
        let ray = cam.ray_from_ndc(DVec2::ZERO);
        assert_eq!(ray.origin, DVec3::new(0.0, 0.0, 10.0));
        assert!((ray.dir - DVec3::NEG_Z).length() < 1e-9);
    }

    #[test]
    fn projection_inverts_ray() {
        let cam = camera();
        let ndc = DVec2::new(0.3, -0.4);
        let ray = cam.ray_from_ndc(ndc);
        let projected = cam.project(ray.at(7.0)).unwrap();
        assert!((projected.truncate() - ndc).length() < 1e-6);
    }

    #[test]
    fn points_behind_camera_do_not_project() {
        let cam = camera();
        assert!(cam.project(DVec3::new(0.0, 0.0, 20.0)).is_none());
        assert!(cam.project(DVec3::ZERO).is_some());
    }

    #[test]
    fn default_orbit_faces_europe() {
        // The point facing the camera after rotation should be central Europe-ish.
        let inverse = Orbit::default().matrix().transpose();
        let facing = crate::geo::unproject(inverse * DVec3::Z);
        assert!(facing.latitude > 20.0 && facing.latitude < 60.0, "{facing:?}");
        assert!(facing.longitude > -20.0 && facing.longitude < 30.0, "{facing:?}");
    }
}
