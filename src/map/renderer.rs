use glam::DVec3;

use crate::braille::BrailleCanvas;
use crate::data::LineString;
use crate::geo::project;
use crate::hash::centered;
use crate::map::camera::{Camera, Ray, FOV_Y_DEGREES};
use crate::map::geometry::{draw_line, draw_ring};
use crate::map::markers::{MarkerId, MarkerRegistry};
use crate::map::picking::ray_sphere;

/// Half extent of the cube the star field is scattered in.
const STAR_FIELD_HALF: f64 = 100.0;

/// Longest surface segment, in degrees, before it is subdivided.
const MAX_SEGMENT_DEGREES: f64 = 2.0;

/// A pin that landed inside the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinGlyph {
    pub id: MarkerId,
    pub col: u16,
    pub row: u16,
    pub highlighted: bool,
}

/// One frame of the scene, back to front.
pub struct GlobeLayers {
    pub stars: BrailleCanvas,
    pub atmosphere: BrailleCanvas,
    pub surface: BrailleCanvas,
    pub pins: Vec<PinGlyph>,
}

/// Rasterises the globe scene into braille layers.
pub struct GlobeRenderer {
    /// Coastlines in the unrotated globe frame.
    surface: Vec<Vec<DVec3>>,
    /// Fixed in world space; they do not turn with the globe.
    stars: Vec<DVec3>,
    radius: f64,
}

impl GlobeRenderer {
    pub fn new(lines: &[LineString], radius: f64, star_count: usize) -> Self {
        let surface = lines
            .iter()
            .filter(|line| line.len() >= 2)
            .map(|line| densify(line, radius))
            .collect::<Vec<_>>();

        let stars = (0..star_count as u64)
            .map(|i| {
                DVec3::new(
                    centered(i, 0, STAR_FIELD_HALF),
                    centered(i, 1, STAR_FIELD_HALF),
                    centered(i, 2, STAR_FIELD_HALF),
                )
            })
            .collect();

        log::debug!("globe surface: {} lines, {star_count} stars", surface.len());
        Self { surface, stars, radius }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Render all layers into a `cols` x `rows` character area. The camera's
    /// viewport is expected to match the area's pixel size.
    pub fn render(
        &self,
        cols: usize,
        rows: usize,
        camera: &Camera,
        markers: &MarkerRegistry,
        atmosphere_scale: f64,
    ) -> GlobeLayers {
        let mut layers = GlobeLayers {
            stars: BrailleCanvas::new(cols, rows),
            atmosphere: BrailleCanvas::new(cols, rows),
            surface: BrailleCanvas::new(cols, rows),
            pins: Vec::new(),
        };

        self.draw_stars(&mut layers.stars, camera);
        self.draw_rings(&mut layers, camera, atmosphere_scale);
        self.draw_surface(&mut layers.surface, camera);
        layers.pins = self.place_pins(cols, rows, camera, markers);
        layers
    }

    fn draw_stars(&self, canvas: &mut BrailleCanvas, camera: &Camera) {
        let eye = camera.position();
        for &star in &self.stars {
            let to_star = star - eye;
            let star_t = to_star.length();
            if star_t <= f64::EPSILON {
                continue;
            }
            let ray = Ray {
                origin: eye,
                dir: to_star / star_t,
            };
            if ray_sphere(&ray, DVec3::ZERO, self.radius).is_some_and(|t| t < star_t) {
                continue;
            }
            if let Some(px) = camera.project_to_pixel(star) {
                canvas.set_pixel_signed(px.x as i32, px.y as i32);
            }
        }
    }

    fn draw_rings(&self, layers: &mut GlobeLayers, camera: &Camera, atmosphere_scale: f64) {
        let Some(center) = camera.project_to_pixel(DVec3::ZERO) else {
            return;
        };
        let (cx, cy) = (center.x as i32, center.y as i32);

        if let Some(limb) = screen_radius(self.radius, camera) {
            draw_ring(&mut layers.surface, cx, cy, limb.round() as i32, 1);
        }
        if let Some(glow) = screen_radius(self.radius * atmosphere_scale, camera) {
            draw_ring(&mut layers.atmosphere, cx, cy, glow.round() as i32, 2);
        }
    }

    fn draw_surface(&self, canvas: &mut BrailleCanvas, camera: &Camera) {
        let rotation = camera.state.orbit.matrix();
        let eye = camera.position();
        let horizon = self.radius * self.radius;

        for line in &self.surface {
            let mut prev: Option<(i32, i32)> = None;
            for &point in line {
                let world = rotation * point;
                // front hemisphere as seen from the eye
                let projected = if world.dot(eye) > horizon {
                    camera.project_to_pixel(world).map(|p| (p.x as i32, p.y as i32))
                } else {
                    None
                };

                if let (Some((x0, y0)), Some((x1, y1))) = (prev, projected) {
                    draw_line(canvas, x0, y0, x1, y1);
                }
                prev = projected;
            }
        }
    }

    fn place_pins(&self, cols: usize, rows: usize, camera: &Camera, markers: &MarkerRegistry) -> Vec<PinGlyph> {
        let rotation = camera.state.orbit.matrix();
        let eye = camera.position();
        let horizon = self.radius * self.radius;

        markers
            .all()
            .iter()
            .filter_map(|marker| {
                let world = rotation * marker.position;
                if world.dot(eye) <= horizon {
                    return None;
                }
                let px = camera.project_to_pixel(world)?;
                if px.x < 0.0 || px.y < 0.0 {
                    return None;
                }
                let (col, row) = ((px.x / 2.0) as usize, (px.y / 4.0) as usize);
                if col >= cols || row >= rows {
                    return None;
                }
                Some(PinGlyph {
                    id: marker.id,
                    col: col as u16,
                    row: row as u16,
                    highlighted: marker.highlighted,
                })
            })
            .collect()
    }
}

/// Pixel radius of the outline of a sphere centred on the view axis.
/// `None` when the camera is inside it.
fn screen_radius(radius: f64, camera: &Camera) -> Option<f64> {
    let distance = camera.state.distance();
    if radius >= distance {
        return None;
    }
    let half_fov = (FOV_Y_DEGREES.to_radians() / 2.0).tan();
    let angular = (radius / distance).asin();
    Some(angular.tan() / half_fov * camera.viewport.height / 2.0)
}

/// Project a lon/lat line onto the sphere, subdividing long segments along
/// the great circle so chords do not cut through the globe.
fn densify(line: &LineString, radius: f64) -> Vec<DVec3> {
    let mut points = Vec::with_capacity(line.len());
    let mut prev: Option<DVec3> = None;

    for &(lon, lat) in line {
        let next = project(lat, lon, radius);
        if let Some(start) = prev {
            let angle = (start.dot(next) / (radius * radius)).clamp(-1.0, 1.0).acos();
            let steps = (angle.to_degrees() / MAX_SEGMENT_DEGREES).ceil() as usize;
            for i in 1..steps {
                let t = i as f64 / steps as f64;
                let mid = start.lerp(next, t);
                if mid.length_squared() > f64::EPSILON {
                    points.push(mid.normalize() * radius);
                }
            }
        }
        points.push(next);
        prev = Some(next);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{default_countries, simple_world};
    use crate::geo::GLOBE_RADIUS;
    use crate::map::camera::{CameraState, Orbit, Viewport};

    const COLS: usize = 80;
    const ROWS: usize = 40;

    fn camera() -> Camera {
        let viewport = Viewport::new((COLS * 2) as f64, (ROWS * 4) as f64);
        Camera::new(CameraState::new(10.0, 6.0, 40.0), viewport)
    }

    #[test]
    fn densified_points_stay_on_sphere() {
        let line = vec![(0.0, 0.0), (60.0, 0.0), (60.0, 45.0)];
        let points = densify(&line, GLOBE_RADIUS);
        assert!(points.len() > 30);
        for p in points {
            assert!((p.length() - GLOBE_RADIUS).abs() < 1e-9);
        }
    }

    #[test]
    fn stars_are_deterministic_and_in_the_cube() {
        let a = GlobeRenderer::new(&[], GLOBE_RADIUS, 1000);
        let b = GlobeRenderer::new(&[], GLOBE_RADIUS, 1000);
        assert_eq!(a.stars, b.stars);
        assert_eq!(a.stars.len(), 1000);
        assert!(a.stars.iter().all(|s| s.abs().max_element() <= STAR_FIELD_HALF));
    }

    #[test]
    fn limb_ring_matches_perspective() {
        let cam = camera();
        let radius = screen_radius(GLOBE_RADIUS, &cam).unwrap();
        // asin(0.5) = 30 degrees
        let expected = (30f64).to_radians().tan() / (37.5f64).to_radians().tan() * 80.0;
        assert!((radius - expected).abs() < 1e-9);
        assert!(screen_radius(20.0, &cam).is_none());
    }

    #[test]
    fn front_pins_are_placed_and_back_pins_dropped() {
        let mut cam = camera();
        cam.state.orbit = Orbit {
            pitch: 0.0,
            yaw: 0.0,
            tilt: 0.0,
        };
        let countries = vec![
            crate::data::Country::new("Front", 0.0, -90.0, "a.svg"),
            crate::data::Country::new("Back", 0.0, 90.0, "b.svg"),
        ];
        let markers = MarkerRegistry::build(&countries, GLOBE_RADIUS);
        let renderer = GlobeRenderer::new(&[], GLOBE_RADIUS, 0);
        let layers = renderer.render(COLS, ROWS, &cam, &markers, 1.2);

        assert_eq!(layers.pins.len(), 1);
        assert_eq!(layers.pins[0].id, MarkerId(0));
        // dead centre of an 80x40 area
        assert!((39..=40).contains(&layers.pins[0].col));
        assert!((19..=20).contains(&layers.pins[0].row));
    }

    #[test]
    fn default_view_draws_every_layer() {
        let cam = camera();
        let markers = MarkerRegistry::build(&default_countries(), GLOBE_RADIUS);
        let renderer = GlobeRenderer::new(&simple_world(), GLOBE_RADIUS, 1000);
        let layers = renderer.render(COLS, ROWS, &cam, &markers, 1.2);

        let lit = |canvas: &BrailleCanvas| {
            (0..ROWS).flat_map(|r| (0..COLS).map(move |c| (c, r))).filter(|&(c, r)| canvas.is_cell_set(c, r)).count()
        };
        assert!(lit(&layers.stars) > 0);
        assert!(lit(&layers.atmosphere) > 0);
        assert!(lit(&layers.surface) > 0);
        // the default orbit faces Europe, so every pin is on the near side
        assert_eq!(layers.pins.len(), default_countries().len());
    }
}
