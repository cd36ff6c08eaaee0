use glam::{DMat3, DVec2, DVec3};

use crate::map::camera::{Camera, Ray};
use crate::map::markers::{MarkerId, MarkerRecord, MarkerRegistry};

/// Distance along `ray` to the first intersection with a sphere, if any.
/// A ray starting inside the sphere reports the exit point.
pub fn ray_sphere(ray: &Ray, center: DVec3, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let (near, far) = (-b - sqrt_disc, -b + sqrt_disc);
    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Nearest marker whose bounding sphere the ray crosses. Ties go to the lower id.
///
/// With `occluder` set to the globe radius, markers whose hit lies behind the
/// globe surface are skipped.
pub fn pick_marker(
    ray: &Ray,
    markers: &[MarkerRecord],
    rotation: DMat3,
    pin_radius: f64,
    occluder: Option<f64>,
) -> Option<MarkerId> {
    let globe_t = occluder.and_then(|radius| ray_sphere(ray, DVec3::ZERO, radius));

    let mut best: Option<(f64, MarkerId)> = None;
    for marker in markers {
        let center = rotation * marker.position;
        let Some(t) = ray_sphere(ray, center, pin_radius) else {
            continue;
        };
        if let Some(globe_t) = globe_t {
            if globe_t + pin_radius < t {
                continue;
            }
        }
        // strict < keeps the earlier (lower) id on equal distance
        if best.map_or(true, |(best_t, _)| t < best_t) {
            best = Some((t, marker.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Braille cell size in viewport pixels.
const CELL: DVec2 = DVec2::new(2.0, 4.0);

/// First front-facing marker whose projected centre falls in the same
/// braille cell as `pos`. Pins are drawn one glyph per cell, so this covers
/// pins whose bounding sphere projects smaller than the cell they occupy.
pub fn pick_in_cell(pos: DVec2, camera: &Camera, markers: &[MarkerRecord]) -> Option<MarkerId> {
    let rotation = camera.state.orbit.matrix();
    let eye = camera.position();
    let cell = (pos / CELL).floor();

    markers
        .iter()
        .find(|marker| {
            let world = rotation * marker.position;
            // same horizon test the renderer uses before drawing a pin
            if world.dot(eye) <= world.length_squared() {
                return false;
            }
            camera
                .project_to_pixel(world)
                .is_some_and(|px| (px / CELL).floor() == cell)
        })
        .map(|marker| marker.id)
}

/// Pointer affordance over the globe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    #[default]
    Default,
    Pointer,
}

impl CursorStyle {
    pub fn from_hit(hit: Option<MarkerId>) -> Self {
        if hit.is_some() {
            CursorStyle::Pointer
        } else {
            CursorStyle::Default
        }
    }
}

/// Maps viewport positions to markers and keeps highlight flags in sync.
#[derive(Debug, Clone, Copy)]
pub struct HitTester {
    pub pin_radius: f64,
    /// Globe radius used for occlusion; `None` disables it.
    pub globe_radius: Option<f64>,
}

impl HitTester {
    pub fn new(pin_radius: f64, globe_radius: Option<f64>) -> Self {
        Self {
            pin_radius,
            globe_radius,
        }
    }

    /// Pick at an NDC position. Every call clears all highlights first, then
    /// highlights the hit marker.
    pub fn hit_test(&self, ndc: DVec2, camera: &Camera, registry: &mut MarkerRegistry) -> Option<MarkerId> {
        let ray = camera.ray_from_ndc(ndc);
        let hit = pick_marker(
            &ray,
            registry.all(),
            camera.state.orbit.matrix(),
            self.pin_radius,
            self.globe_radius,
        );

        Self::highlight(registry, hit)
    }

    /// Pick at a viewport pixel. A ray miss falls back to the pin drawn in the
    /// braille cell under the pointer.
    pub fn hit_test_at(&self, pos: DVec2, camera: &Camera, registry: &mut MarkerRegistry) -> Option<MarkerId> {
        let pos = camera.viewport.clamp(pos);
        let hit = self
            .hit_test(camera.viewport.to_ndc(pos), camera, registry)
            .or_else(|| pick_in_cell(pos, camera, registry.all()));
        Self::highlight(registry, hit)
    }

    fn highlight(registry: &mut MarkerRegistry, hit: Option<MarkerId>) -> Option<MarkerId> {
        registry.clear_highlights();
        if let Some(id) = hit {
            registry.set_highlight(id, true);
        }
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Country;
    use crate::geo::GLOBE_RADIUS;
    use crate::map::camera::{CameraState, Orbit, Viewport};

    fn still_camera() -> Camera {
        let mut state = CameraState::new(10.0, 6.0, 40.0);
        state.orbit = Orbit {
            pitch: 0.0,
            yaw: 0.0,
            tilt: 0.0,
        };
        Camera::new(state, Viewport::new(200.0, 200.0))
    }

    fn ndc_of(camera: &Camera, world: DVec3) -> DVec2 {
        camera.project(world).unwrap().truncate()
    }

    fn record(id: usize, position: DVec3) -> MarkerRecord {
        MarkerRecord {
            id: MarkerId(id),
            display_name: format!("m{id}"),
            flag_asset_ref: String::new(),
            coordinate: crate::geo::unproject(position),
            position,
            highlighted: false,
        }
    }

    #[test]
    fn ray_sphere_hits_and_misses() {
        let ray = Ray {
            origin: DVec3::new(0.0, 0.0, 10.0),
            dir: DVec3::NEG_Z,
        };
        assert_eq!(ray_sphere(&ray, DVec3::ZERO, 5.0), Some(5.0));
        assert_eq!(ray_sphere(&ray, DVec3::new(3.0, 0.0, 0.0), 1.0), None);
        // sphere behind the origin
        assert_eq!(ray_sphere(&ray, DVec3::new(0.0, 0.0, 20.0), 1.0), None);
        // origin inside: exit point
        let inside = Ray {
            origin: DVec3::ZERO,
            dir: DVec3::X,
        };
        assert_eq!(ray_sphere(&inside, DVec3::ZERO, 2.0), Some(2.0));
    }

    #[test]
    fn empty_registry_never_hits() {
        let camera = still_camera();
        let mut registry = MarkerRegistry::build(&[], GLOBE_RADIUS);
        let tester = HitTester::new(0.1, Some(GLOBE_RADIUS));
        assert_eq!(tester.hit_test(DVec2::ZERO, &camera, &mut registry), None);
    }

    #[test]
    fn miss_returns_none_and_clears_highlight() {
        let camera = still_camera();
        // lng -90 sits on +Z, straight in front of the camera
        let mut registry = MarkerRegistry::build(&[Country::new("Front", 0.0, -90.0, "xx.svg")], GLOBE_RADIUS);
        let tester = HitTester::new(0.1, Some(GLOBE_RADIUS));

        assert_eq!(tester.hit_test(DVec2::ZERO, &camera, &mut registry), Some(MarkerId(0)));
        assert_eq!(registry.highlighted(), Some(MarkerId(0)));

        assert_eq!(tester.hit_test(DVec2::new(0.9, 0.9), &camera, &mut registry), None);
        assert_eq!(registry.highlighted(), None);
    }

    #[test]
    fn overlapping_spheres_pick_the_nearest() {
        let camera = still_camera();
        let markers = vec![record(0, DVec3::new(0.0, 0.0, 4.9)), record(1, DVec3::new(0.0, 0.0, 5.0))];
        let ray = camera.ray_from_ndc(DVec2::ZERO);
        assert_eq!(pick_marker(&ray, &markers, DMat3::IDENTITY, 0.1, None), Some(MarkerId(1)));
    }

    #[test]
    fn ties_go_to_the_lower_id() {
        let camera = still_camera();
        let p = DVec3::new(0.0, 0.0, 5.0);
        let markers = vec![record(0, p), record(1, p)];
        let ray = camera.ray_from_ndc(DVec2::ZERO);
        assert_eq!(pick_marker(&ray, &markers, DMat3::IDENTITY, 0.1, None), Some(MarkerId(0)));
    }

    #[test]
    fn pins_behind_the_globe_are_occluded() {
        let camera = still_camera();
        let back = DVec3::new(0.0, 0.0, -5.0);
        let markers = vec![record(0, back)];
        let ray = camera.ray_from_ndc(ndc_of(&camera, back));
        assert_eq!(pick_marker(&ray, &markers, DMat3::IDENTITY, 0.1, None), Some(MarkerId(0)));
        assert_eq!(pick_marker(&ray, &markers, DMat3::IDENTITY, 0.1, Some(GLOBE_RADIUS)), None);
    }

    #[test]
    fn picking_follows_the_orbit() {
        let mut camera = still_camera();
        let mut registry = MarkerRegistry::build(&[Country::new("Prime", 0.0, 0.0, "xx.svg")], GLOBE_RADIUS);
        let tester = HitTester::new(0.1, Some(GLOBE_RADIUS));

        // (0, 0) starts on +X; a negative quarter turn of yaw swings it round to +Z
        camera.state.orbit.yaw = -std::f64::consts::FRAC_PI_2;
        let world = registry.world_position(MarkerId(0), &camera.state.orbit).unwrap();
        assert!((world - DVec3::new(0.0, 0.0, GLOBE_RADIUS)).length() < 1e-9);
        assert_eq!(tester.hit_test(DVec2::ZERO, &camera, &mut registry), Some(MarkerId(0)));
    }

    #[test]
    fn cell_fallback_finds_pins_smaller_than_a_cell() {
        // 40x20 pixel viewport: a 0.1 pin covers well under one braille cell
        let mut camera = still_camera();
        camera.set_viewport(Viewport::new(40.0, 20.0));
        let mut registry = MarkerRegistry::build(&[Country::new("Front", 20.0, -80.0, "xx.svg")], GLOBE_RADIUS);
        let tester = HitTester::new(0.1, Some(GLOBE_RADIUS));

        let world = registry.world_position(MarkerId(0), &camera.state.orbit).unwrap();
        let px = camera.project_to_pixel(world).unwrap();
        let corner = (px / CELL).floor() * CELL + DVec2::new(0.1, 0.1);

        assert_eq!(tester.hit_test(camera.viewport.to_ndc(corner), &camera, &mut registry), None);
        assert_eq!(tester.hit_test_at(corner, &camera, &mut registry), Some(MarkerId(0)));
        assert_eq!(registry.highlighted(), Some(MarkerId(0)));

        // one cell over is empty space
        let next = corner + DVec2::new(CELL.x * 3.0, 0.0);
        assert_eq!(tester.hit_test_at(next, &camera, &mut registry), None);
        assert_eq!(registry.highlighted(), None);
    }

    #[test]
    fn cell_fallback_skips_the_far_side() {
        let camera = still_camera();
        // straight behind the globe, projects onto the centre cell
        let markers = vec![record(0, DVec3::new(0.0, 0.0, -5.0))];
        let centre = camera.viewport.to_pixel(DVec2::ZERO);
        assert_eq!(pick_in_cell(centre, &camera, &markers), None);

        let front = vec![record(3, DVec3::new(0.0, 0.0, 5.0)), record(4, DVec3::new(0.0, 0.0, 5.0))];
        assert_eq!(pick_in_cell(centre, &camera, &front), Some(MarkerId(3)));
    }

    #[test]
    fn cursor_follows_hit() {
        assert_eq!(CursorStyle::from_hit(Some(MarkerId(2))), CursorStyle::Pointer);
        assert_eq!(CursorStyle::from_hit(None), CursorStyle::Default);
    }
}
