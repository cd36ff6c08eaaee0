use glam::{DVec2, DVec3};

use crate::config::GlobeConfig;
use crate::data::{flag_emoji, Country, LineString};
use crate::geo::{unproject, GeoCoordinate};
use crate::interaction::{PointerButton, PointerController, PointerEffect, PointerEvent};
use crate::map::{Camera, CameraState, CursorStyle, GlobeRenderer, HitTester, MarkerId, MarkerRegistry, Viewport};
use crate::selection::{SelectionEvent, SelectionMachine, SelectionState};

/// Glow ring scale before the first zoom.
const INITIAL_ATMOSPHERE_SCALE: f64 = 1.2;

/// Draws one frame of the application.
pub trait FrameRenderer {
    type Error;

    fn render_frame(&mut self, app: &App) -> Result<(), Self::Error>;
}

/// What the label overlay should show this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelView<'a> {
    pub marker: MarkerId,
    pub name: &'a str,
    pub flag: &'a str,
    /// Click position in viewport pixels.
    pub anchor: DVec2,
    /// Animated scale; overshoots 1 while popping in.
    pub scale: f64,
}

impl LabelView<'_> {
    /// Text lines of the label body.
    pub fn lines(&self) -> [String; 2] {
        let title = match flag_emoji(self.flag) {
            Some(emoji) => format!("{emoji} {}", self.name),
            None => self.name.to_string(),
        };
        [title, self.flag.to_string()]
    }
}

/// Label box in map cells, relative to the map area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRect {
    pub col: u16,
    pub row: u16,
    pub width: u16,
    pub height: u16,
}

impl LabelRect {
    pub fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.col && col < self.col + self.width && row >= self.row && row < self.row + self.height
    }

    /// Shrink around the centre. Scales past 1 are clamped since the full
    /// box is already the largest that fits.
    pub fn scaled(self, scale: f64) -> LabelRect {
        let scale = scale.clamp(0.0, 1.0);
        let width = (self.width as f64 * scale).round() as u16;
        let height = (self.height as f64 * scale).round() as u16;
        LabelRect {
            col: self.col + (self.width - width) / 2,
            row: self.row + (self.height - height) / 2,
            width,
            height,
        }
    }
}

/// Application state
pub struct App {
    pub camera: Camera,
    pub markers: MarkerRegistry,
    pub globe: GlobeRenderer,
    controller: PointerController,
    hit_tester: HitTester,
    selection: SelectionMachine,
    pub cursor: CursorStyle,
    /// Last pointer position in viewport pixels
    pub pointer: Option<DVec2>,
    /// Where the primary button went down, for click detection
    press_origin: Option<DVec2>,
    pub atmosphere_scale: f64,
    idle_rotation: f64,
    /// Map area in characters
    pub cols: usize,
    pub rows: usize,
    pub should_quit: bool,
    /// Frame counter
    pub frame: u64,
    config: GlobeConfig,
}

impl App {
    pub fn new(
        config: GlobeConfig,
        countries: &[Country],
        surface: &[LineString],
        width: usize,
        height: usize,
    ) -> Self {
        let (cols, rows) = map_area(width, height);
        let camera = Camera::new(initial_camera(&config), pixel_viewport(cols, rows));
        let occluder = config.occlude_hidden_pins.then_some(config.globe_radius);

        Self {
            camera,
            markers: MarkerRegistry::build(countries, config.globe_radius),
            globe: GlobeRenderer::new(surface, config.globe_radius, config.star_count),
            controller: PointerController::new(
                config.drag_sensitivity_x,
                config.drag_sensitivity_y,
                config.zoom_step,
            ),
            hit_tester: HitTester::new(config.pin_radius, occluder),
            selection: SelectionMachine::new(
                config.reopen_policy,
                config.label_open_secs,
                config.label_close_secs,
                config.pause_on_hover,
            ),
            cursor: CursorStyle::Default,
            pointer: None,
            press_origin: None,
            atmosphere_scale: INITIAL_ATMOSPHERE_SCALE,
            idle_rotation: config.idle_rotation,
            cols,
            rows,
            should_quit: false,
            frame: 0,
            config,
        }
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        let (cols, rows) = map_area(width, height);
        self.cols = cols;
        self.rows = rows;
        self.camera.set_viewport(pixel_viewport(cols, rows));
        log::debug!("resized map area to {cols}x{rows}");
    }

    pub fn pointer_down(&mut self, button: PointerButton, pos: DVec2) {
        self.pointer = Some(pos);
        if button == PointerButton::Primary {
            self.press_origin = Some(pos);
        }
        self.controller
            .handle(&mut self.camera, PointerEvent::Down { button, pos });
    }

    pub fn pointer_move(&mut self, pos: DVec2) {
        self.pointer = Some(pos);
        match self.controller.handle(&mut self.camera, PointerEvent::Move { pos }) {
            PointerEffect::Hover { .. } => {
                let hit = self.hit_tester.hit_test_at(pos, &self.camera, &mut self.markers);
                self.cursor = CursorStyle::from_hit(hit);
                self.selection.handle(SelectionEvent::Hover(hit));
            }
            PointerEffect::Rotate { .. } | PointerEffect::Zoom { .. } | PointerEffect::None => {}
        }
    }

    /// Release. A primary press released within the same braille cell is a click.
    pub fn pointer_up(&mut self, pos: DVec2) {
        self.pointer = Some(pos);
        self.controller.handle(&mut self.camera, PointerEvent::Up);

        if let Some(origin) = self.press_origin.take() {
            let delta = (pos - origin).abs();
            if delta.x < 2.0 && delta.y < 4.0 {
                self.click(pos);
            }
        }
    }

    pub fn wheel(&mut self, delta_y: f64) {
        if let PointerEffect::Zoom {
            atmosphere_scale, ..
        } = self.controller.handle(&mut self.camera, PointerEvent::Wheel { delta_y })
        {
            self.atmosphere_scale = atmosphere_scale;
        }
    }

    /// Click at a viewport pixel position.
    pub fn click(&mut self, pos: DVec2) {
        let pos = self.camera.viewport.clamp(pos);
        let cell = ((pos.x / 2.0) as u16, (pos.y / 4.0) as u16);
        if self.drawn_label_rect().is_some_and(|rect| rect.contains(cell.0, cell.1)) {
            self.selection.handle(SelectionEvent::LabelClicked);
            return;
        }

        let hit = self.hit_tester.hit_test_at(pos, &self.camera, &mut self.markers);
        self.cursor = CursorStyle::from_hit(hit);
        if let Some(effect) = self.selection.handle(SelectionEvent::Click { hit, pos }) {
            log::debug!("label effect {effect:?}");
        }
    }

    /// Advance animations by `dt` seconds, apply idle rotation, then draw.
    pub fn frame<R: FrameRenderer>(&mut self, dt: f64, renderer: &mut R) -> Result<(), R::Error> {
        if let Some(effect) = self.selection.handle(SelectionEvent::Tick(dt)) {
            log::debug!("label effect {effect:?}");
        }
        if self.selection.idle_rotation_active() && !self.controller.is_dragging() {
            self.camera.state.orbit.yaw += self.idle_rotation;
        }
        self.frame += 1;
        renderer.render_frame(self)
    }

    /// Restore the initial orbit, distance and glow.
    pub fn reset_view(&mut self) {
        self.camera.state = initial_camera(&self.config);
        self.atmosphere_scale = INITIAL_ATMOSPHERE_SCALE;
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn label(&self) -> Option<LabelView<'_>> {
        let target = self.selection.label_target()?;
        let record = self.markers.find_by_id(target.marker)?;
        Some(LabelView {
            marker: target.marker,
            name: &record.display_name,
            flag: &record.flag_asset_ref,
            anchor: target.anchor,
            scale: self.selection.label_scale(),
        })
    }

    /// Full-size label box next to its anchor, kept inside the map area.
    pub fn label_rect(&self) -> Option<LabelRect> {
        let label = self.label()?;
        let [title, flag] = label.lines();
        // emoji take two columns but count as two chars, so char count is close enough
        let text_width = title.chars().count().max(flag.chars().count());

        let cols = self.cols as u16;
        let rows = self.rows as u16;
        let width = (text_width + 4).min(cols as usize) as u16;
        let height = 4u16.min(rows);

        let anchor_col = (label.anchor.x / 2.0) as u16;
        let anchor_row = (label.anchor.y / 4.0) as u16;
        let col = if anchor_col.saturating_add(width).saturating_add(2) <= cols {
            anchor_col + 2
        } else {
            anchor_col.saturating_sub(width + 1)
        };
        let col = col.min(cols - width);
        let row = anchor_row.saturating_sub(1).min(rows - height);

        Some(LabelRect {
            col,
            row,
            width,
            height,
        })
    }

    /// Label box as drawn this frame, scaled by its animation. `None` while
    /// it is too small to draw a bordered box.
    pub fn drawn_label_rect(&self) -> Option<LabelRect> {
        let scale = self.label()?.scale;
        let rect = self.label_rect()?.scaled(scale);
        (rect.width >= 3 && rect.height >= 3).then_some(rect)
    }

    pub fn distance_text(&self) -> String {
        format!("{:.1}", self.camera.state.distance())
    }

    /// Globe coordinate currently facing the camera.
    pub fn facing(&self) -> GeoCoordinate {
        let inverse = self.camera.state.orbit.matrix().transpose();
        unproject(inverse * DVec3::Z)
    }

    /// Get facing coordinates as a string
    pub fn facing_coords(&self) -> String {
        let facing = self.facing();
        format!(
            "{:.1}°{}, {:.1}°{}",
            facing.latitude.abs(),
            if facing.latitude >= 0.0 { "N" } else { "S" },
            facing.longitude.abs(),
            if facing.longitude >= 0.0 { "E" } else { "W" }
        )
    }

    pub fn hovered_name(&self) -> Option<&str> {
        let id = self.markers.highlighted()?;
        self.markers.find_by_id(id).map(|m| m.display_name.as_str())
    }
}

fn initial_camera(config: &GlobeConfig) -> CameraState {
    CameraState::new(config.camera_distance, config.min_distance, config.max_distance)
}

/// Account for border (2 chars horizontal, 2 chars vertical) and status bar
fn map_area(width: usize, height: usize) -> (usize, usize) {
    (width.saturating_sub(2), height.saturating_sub(3))
}

/// Braille gives 2x4 resolution per character
fn pixel_viewport(cols: usize, rows: usize) -> Viewport {
    Viewport::new((cols * 2) as f64, (rows * 4) as f64)
}
